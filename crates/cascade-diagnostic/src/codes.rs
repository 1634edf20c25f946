//! Error codes for Cascade diagnostics.

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Syntax errors (E0001 - E0099)
    UnexpectedCharacter,
    UnterminatedString,
    UnterminatedComment,
    UnclosedDelimiter,
    UnexpectedToken,
    ExpectedExpression,
    InvalidSelector,

    // Resolution errors (E0100 - E0199)
    UnresolvedRequest,
    CircularDependency,
    LoadFailed,

    // Binding errors (E0200 - E0299)
    UndefinedVariable,
    UndefinedFunction,
    UndefinedMixin,
    UndefinedClass,
    UnknownModule,
    MissingExport,

    // Type errors (E0300 - E0399)
    IncompatibleUnits,
    InvalidOperand,
    DivisionByZero,

    // Argument errors (E0400 - E0499)
    MissingArgument,
    UnexpectedArgument,
    DuplicateArgument,

    // Structural errors (E0500 - E0599)
    MisplacedDirective,
    MissingReturn,
    InvalidParentSelector,
    UserError,
    RecursionLimit,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::UnexpectedCharacter => "E0001",
            ErrorCode::UnterminatedString => "E0002",
            ErrorCode::UnterminatedComment => "E0003",
            ErrorCode::UnclosedDelimiter => "E0004",
            ErrorCode::UnexpectedToken => "E0005",
            ErrorCode::ExpectedExpression => "E0006",
            ErrorCode::InvalidSelector => "E0007",

            ErrorCode::UnresolvedRequest => "E0100",
            ErrorCode::CircularDependency => "E0101",
            ErrorCode::LoadFailed => "E0102",

            ErrorCode::UndefinedVariable => "E0200",
            ErrorCode::UndefinedFunction => "E0201",
            ErrorCode::UndefinedMixin => "E0202",
            ErrorCode::UndefinedClass => "E0203",
            ErrorCode::UnknownModule => "E0204",
            ErrorCode::MissingExport => "E0205",

            ErrorCode::IncompatibleUnits => "E0300",
            ErrorCode::InvalidOperand => "E0301",
            ErrorCode::DivisionByZero => "E0302",

            ErrorCode::MissingArgument => "E0400",
            ErrorCode::UnexpectedArgument => "E0401",
            ErrorCode::DuplicateArgument => "E0402",

            ErrorCode::MisplacedDirective => "E0500",
            ErrorCode::MissingReturn => "E0501",
            ErrorCode::InvalidParentSelector => "E0502",
            ErrorCode::UserError => "E0503",
            ErrorCode::RecursionLimit => "E0504",
        }
    }

    /// Get a human-readable description of the error.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::UnexpectedCharacter => "unexpected character in input",
            ErrorCode::UnterminatedString => "string literal is not terminated",
            ErrorCode::UnterminatedComment => "comment is not terminated",
            ErrorCode::UnclosedDelimiter => "unclosed delimiter",
            ErrorCode::UnexpectedToken => "unexpected token",
            ErrorCode::ExpectedExpression => "expected an expression",
            ErrorCode::InvalidSelector => "invalid selector",

            ErrorCode::UnresolvedRequest => "module request could not be resolved",
            ErrorCode::CircularDependency => "modules depend on each other",
            ErrorCode::LoadFailed => "module source could not be loaded",

            ErrorCode::UndefinedVariable => "cannot find variable in this scope",
            ErrorCode::UndefinedFunction => "cannot find function in this scope",
            ErrorCode::UndefinedMixin => "cannot find mixin in this scope",
            ErrorCode::UndefinedClass => "cannot find class in this file",
            ErrorCode::UnknownModule => "module is not available here",
            ErrorCode::MissingExport => "module does not export this name",

            ErrorCode::IncompatibleUnits => "operands have incompatible units",
            ErrorCode::InvalidOperand => "operator cannot be applied to this value",
            ErrorCode::DivisionByZero => "division by zero",

            ErrorCode::MissingArgument => "missing argument",
            ErrorCode::UnexpectedArgument => "argument was not consumed by any parameter",
            ErrorCode::DuplicateArgument => "argument passed both by position and by name",

            ErrorCode::MisplacedDirective => "directive is not allowed here",
            ErrorCode::MissingReturn => "function finished without @return",
            ErrorCode::InvalidParentSelector => "parent selector cannot be used here",
            ErrorCode::UserError => "@error raised by the stylesheet",
            ErrorCode::RecursionLimit => "calls nested too deeply",
        }
    }

    /// Get a suggested fix for the error, if available.
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            ErrorCode::UnterminatedString => Some("add a closing quote to terminate the string"),
            ErrorCode::UnterminatedComment => Some("add `*/` to close the comment"),
            ErrorCode::UnclosedDelimiter => Some("add the matching closing delimiter"),
            ErrorCode::UnresolvedRequest => Some("check the path or register a resolver for it"),
            ErrorCode::IncompatibleUnits => Some("wrap the expression in calc() to defer it to the browser"),
            ErrorCode::MissingReturn => Some("add an @return statement to every path"),
            ErrorCode::MisplacedDirective => Some("move the directive into a style rule"),
            _ => None,
        }
    }
}
