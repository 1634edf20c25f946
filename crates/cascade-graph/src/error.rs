//! Module graph errors.
//! 模块图错误。

use std::io;
use std::path::{Path, PathBuf};

use cascade_common::{LineCol, LineIndex, Span};
use cascade_diagnostic::{Diagnostic, DiagnosticKind, ErrorCode};
use cascade_eval::EvalError;
use cascade_parser::ParseError;
use thiserror::Error;

/// An error that stops a file and everything that depends on it.
/// 使文件及其所有依赖方失败的错误。
#[derive(Debug, Clone, Error)]
pub enum GraphError {
    /// No resolver produced a path. / 无法解析的模块请求
    #[error("{}:{location}: cannot resolve `{request}`", file.display())]
    Unresolved {
        request: String,
        file: PathBuf,
        location: LineCol,
    },

    /// Files that depend on each other. / 循环依赖
    #[error("circular dependency: {}", display_chain(.chain))]
    Cycle { file: PathBuf, chain: Vec<PathBuf> },

    /// The source could not be read. / 读取源文件失败
    #[error("cannot load {}: {message}", file.display())]
    Io { file: PathBuf, message: String },

    #[error("{}:{location}: {error}", file.display())]
    Parse {
        file: PathBuf,
        location: LineCol,
        error: ParseError,
    },

    #[error("{}:{location}: {error}", file.display())]
    Eval {
        file: PathBuf,
        location: LineCol,
        error: EvalError,
    },

    /// An unusable configuration file. / 配置无效
    #[error("invalid configuration: {0}")]
    Config(String),
}

fn display_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Line and column of `span` in `source`.
pub(crate) fn locate(source: &str, span: Span) -> LineCol {
    LineIndex::new(source).line_col(span.start)
}

impl GraphError {
    pub(crate) fn io(file: &Path, error: &io::Error) -> Self {
        GraphError::Io {
            file: file.to_path_buf(),
            message: error.to_string(),
        }
    }

    pub(crate) fn parse(file: &Path, source: &str, error: ParseError) -> Self {
        GraphError::Parse {
            file: file.to_path_buf(),
            location: locate(source, error.span),
            error,
        }
    }

    pub(crate) fn eval(file: &Path, source: &str, error: EvalError) -> Self {
        GraphError::Eval {
            file: file.to_path_buf(),
            location: locate(source, error.span()),
            error,
        }
    }

    /// The file the error originates from.
    /// 错误来源的文件。
    pub fn file(&self) -> Option<&Path> {
        match self {
            GraphError::Unresolved { file, .. }
            | GraphError::Cycle { file, .. }
            | GraphError::Io { file, .. }
            | GraphError::Parse { file, .. }
            | GraphError::Eval { file, .. } => Some(file),
            GraphError::Config(_) => None,
        }
    }

    /// Line and column within [`file`](Self::file), when known.
    pub fn location(&self) -> Option<LineCol> {
        match self {
            GraphError::Unresolved { location, .. }
            | GraphError::Parse { location, .. }
            | GraphError::Eval { location, .. } => Some(*location),
            _ => None,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            GraphError::Unresolved { .. } => ErrorCode::UnresolvedRequest,
            GraphError::Cycle { .. } => ErrorCode::CircularDependency,
            GraphError::Io { .. } | GraphError::Config(_) => ErrorCode::LoadFailed,
            GraphError::Parse { error, .. } => error.code,
            GraphError::Eval { error, .. } => error.code(),
        }
    }

    /// Convert to a diagnostic pointing into the originating file.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            GraphError::Parse { error, .. } => error.to_diagnostic(),
            GraphError::Eval { error, .. } => error.to_diagnostic(),
            GraphError::Cycle { chain, .. } => {
                let mut diagnostic =
                    Diagnostic::error(DiagnosticKind::Resolution, Span::DUMMY, self.to_string())
                        .with_code(self.code());
                for path in chain {
                    diagnostic = diagnostic.with_note(format!("imports {}", path.display()));
                }
                diagnostic
            }
            _ => Diagnostic::error(DiagnosticKind::Resolution, Span::DUMMY, self.to_string())
                .with_code(self.code()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_names_chain() {
        let error = GraphError::Cycle {
            file: PathBuf::from("a.cas"),
            chain: vec!["a.cas".into(), "b.cas".into(), "a.cas".into()],
        };
        assert_eq!(error.to_string(), "circular dependency: a.cas -> b.cas -> a.cas");
        assert_eq!(error.code(), ErrorCode::CircularDependency);
        assert_eq!(error.file(), Some(Path::new("a.cas")));
    }

    #[test]
    fn test_parse_error_location() {
        let source = "a {\n  b: c;\n  $: 1;\n}";
        let error = cascade_parser::parse(source).unwrap_err();
        let error = GraphError::parse(Path::new("x.cas"), source, error);
        assert_eq!(error.location().map(|l| l.line), Some(3));
        assert!(error.to_string().starts_with("x.cas:3:"));
    }
}
