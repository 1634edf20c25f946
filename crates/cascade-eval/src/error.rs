//! Evaluation errors.
//! 求值错误。

use cascade_common::Span;
use cascade_diagnostic::{Diagnostic, DiagnosticKind, ErrorCode, Label};
use cascade_parser::ParseError;
use cascade_value::ValueError;
use thiserror::Error;

use crate::MemberTag;

/// An error that aborts evaluation of the current file.
/// 中止当前文件求值的错误。
#[derive(Debug, Clone, Error)]
pub enum EvalError {
    /// Unknown reference. / 未知引用
    #[error("undefined {kind} `{name}`")]
    Undefined {
        kind: MemberTag,
        name: String,
        suggestion: Option<String>,
        span: Span,
    },

    /// Operand or argument of the wrong shape. / 操作数或参数类型错误
    #[error("{message}")]
    Type {
        code: ErrorCode,
        message: String,
        span: Span,
    },

    /// Missing, unconsumed or conflicting arguments. / 参数错误
    #[error("{message}")]
    Argument {
        code: ErrorCode,
        message: String,
        span: Span,
    },

    /// A directive used outside the context it requires. / 指令位置错误
    #[error("{message}")]
    Structural {
        code: ErrorCode,
        message: String,
        span: Span,
    },

    /// Unknown module or missing export. / 模块错误
    #[error("{message}")]
    Module {
        code: ErrorCode,
        message: String,
        span: Span,
    },

    /// `@error` raised by the stylesheet. / 样式表主动抛出的错误
    #[error("{message}")]
    User { message: String, span: Span },

    /// An interpolated selector that does not parse. / 插值后的选择器无法解析
    #[error("{0}")]
    Syntax(ParseError),
}

pub type EvalResult<T> = Result<T, EvalError>;

impl EvalError {
    pub fn type_error(message: impl Into<String>) -> Self {
        EvalError::Type {
            code: ErrorCode::InvalidOperand,
            message: message.into(),
            span: Span::DUMMY,
        }
    }

    pub fn argument(code: ErrorCode, message: impl Into<String>) -> Self {
        EvalError::Argument {
            code,
            message: message.into(),
            span: Span::DUMMY,
        }
    }

    pub fn structural(code: ErrorCode, message: impl Into<String>, span: Span) -> Self {
        EvalError::Structural {
            code,
            message: message.into(),
            span,
        }
    }

    pub fn module(code: ErrorCode, message: impl Into<String>, span: Span) -> Self {
        EvalError::Module {
            code,
            message: message.into(),
            span,
        }
    }

    /// Wrap a value-model error raised at `span`.
    pub fn from_value(error: ValueError, span: Span) -> Self {
        let code = match &error {
            ValueError::IncompatibleUnits { .. } => ErrorCode::IncompatibleUnits,
            ValueError::DivisionByZero => ErrorCode::DivisionByZero,
            _ => ErrorCode::InvalidOperand,
        };
        EvalError::Type {
            code,
            message: error.to_string(),
            span,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            EvalError::Undefined { span, .. }
            | EvalError::Type { span, .. }
            | EvalError::Argument { span, .. }
            | EvalError::Structural { span, .. }
            | EvalError::Module { span, .. }
            | EvalError::User { span, .. } => *span,
            EvalError::Syntax(error) => error.span,
        }
    }

    /// Attach `span` unless the error already points somewhere.
    pub fn at(mut self, at: Span) -> Self {
        let slot = match &mut self {
            EvalError::Undefined { span, .. }
            | EvalError::Type { span, .. }
            | EvalError::Argument { span, .. }
            | EvalError::Structural { span, .. }
            | EvalError::Module { span, .. }
            | EvalError::User { span, .. } => span,
            EvalError::Syntax(error) => &mut error.span,
        };
        if *slot == Span::DUMMY {
            *slot = at;
        }
        self
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            EvalError::Undefined { kind, .. } => match kind {
                MemberTag::Variable => ErrorCode::UndefinedVariable,
                MemberTag::Class => ErrorCode::UndefinedClass,
                MemberTag::Function => ErrorCode::UndefinedFunction,
                MemberTag::Mixin => ErrorCode::UndefinedMixin,
            },
            EvalError::Type { code, .. }
            | EvalError::Argument { code, .. }
            | EvalError::Structural { code, .. }
            | EvalError::Module { code, .. } => *code,
            EvalError::User { .. } => ErrorCode::UserError,
            EvalError::Syntax(error) => error.code,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let kind = match self {
            EvalError::Undefined { .. } => DiagnosticKind::Binding,
            EvalError::Type { .. } => DiagnosticKind::Type,
            EvalError::Argument { .. } => DiagnosticKind::Argument,
            EvalError::Structural { .. } | EvalError::User { .. } => DiagnosticKind::Structural,
            EvalError::Module { .. } => DiagnosticKind::Resolution,
            EvalError::Syntax(_) => DiagnosticKind::Syntax,
        };
        let span = self.span();
        let mut diagnostic = Diagnostic::error(kind, span, self.to_string())
            .with_code(self.code())
            .with_label(Label::new(span, "here"));
        if let EvalError::Undefined {
            suggestion: Some(name),
            ..
        } = self
        {
            diagnostic = diagnostic.with_help(format!("did you mean `{name}`?"));
        }
        diagnostic
    }
}

impl From<ParseError> for EvalError {
    fn from(error: ParseError) -> Self {
        EvalError::Syntax(error)
    }
}
