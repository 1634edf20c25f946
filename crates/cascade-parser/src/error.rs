//! Parse errors.

use cascade_common::{LineIndex, Span};
use cascade_diagnostic::{Diagnostic, DiagnosticKind, ErrorCode, Label};
use thiserror::Error;

/// A syntax error. Parsing stops at the first one.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct ParseError {
    pub code: ErrorCode,
    pub message: String,
    pub span: Span,
}

pub type ParseResult<T> = Result<T, ParseError>;

impl ParseError {
    pub fn new(code: ErrorCode, span: Span, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            span,
        }
    }

    /// Adopt the first diagnostic reported by the lexer.
    pub(crate) fn from_diagnostic(diagnostic: Diagnostic) -> Self {
        Self {
            code: diagnostic.code.unwrap_or(ErrorCode::UnexpectedCharacter),
            message: diagnostic.message,
            span: diagnostic.span,
        }
    }

    /// The source line the error points at.
    pub fn excerpt<'a>(&self, source: &'a str) -> &'a str {
        LineIndex::new(source).line_text(source, self.span.start)
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(DiagnosticKind::Syntax, self.span, &self.message)
            .with_code(self.code)
            .with_label(Label::new(self.span, "here"))
    }
}
