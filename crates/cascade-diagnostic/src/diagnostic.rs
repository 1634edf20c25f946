//! The diagnostic record shared by every compiler stage.
//! 各编译阶段共用的诊断记录。

use crate::ErrorCode;
use cascade_common::Span;

/// How serious a diagnostic is. Only errors stop a build.
/// 诊断的严重程度；只有错误会中止构建。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    /// `@warn` output and project-level oddities.
    Warning,
    /// `@debug` output.
    Note,
}

/// Which stage a diagnostic comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Syntax,
    Resolution,
    Binding,
    Type,
    Argument,
    Structural,
}

/// A secondary span with its own message.
#[derive(Debug, Clone)]
pub struct Label {
    pub span: Span,
    pub message: String,
}

impl Label {
    pub fn new(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    pub code: Option<ErrorCode>,
    pub message: String,
    /// Primary location. [`Span::DUMMY`] for project-level diagnostics.
    pub span: Span,
    pub labels: Vec<Label>,
    pub notes: Vec<String>,
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn new(severity: Severity, kind: DiagnosticKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            severity,
            kind,
            code: None,
            message: message.into(),
            span,
            labels: Vec::new(),
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn error(kind: DiagnosticKind, span: Span, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, kind, span, message)
    }

    pub fn warning(kind: DiagnosticKind, span: Span, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, kind, span, message)
    }

    pub fn note(kind: DiagnosticKind, span: Span, message: impl Into<String>) -> Self {
        Self::new(Severity::Note, kind, span, message)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Attach `code`. Its stock suggestion fills `help` unless one is set.
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = Some(code);
        if self.help.is_none() {
            self.help = code.suggestion().map(str::to_string);
        }
        self
    }

    pub fn with_label(mut self, label: Label) -> Self {
        self.labels.push(label);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}
