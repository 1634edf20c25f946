//! Expression AST definitions.

use cascade_common::Span;

/// An expression.
#[derive(Debug, Clone)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// An unquoted string expression holding `text` verbatim.
    pub fn unquoted(text: impl Into<String>, span: Span) -> Self {
        Self::new(
            ExprKind::String {
                text: Interpolation::literal(text, span),
                quote: None,
            },
            span,
        )
    }
}

/// Quote style of a string literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
    Double,
    Single,
}

/// Separator of a list literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListSeparator {
    Space,
    Comma,
    Slash,
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
            BinaryOp::Pow => "**",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
        }
    }

    /// Binding power; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Eq | BinaryOp::Ne => 3,
            BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => 4,
            BinaryOp::Add | BinaryOp::Sub => 5,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => 6,
            BinaryOp::Pow => 7,
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
}

/// A reference to a variable, optionally through a namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableRef {
    pub namespace: Option<String>,
    pub name: String,
}

/// Kind of expression.
#[derive(Debug, Clone)]
pub enum ExprKind {
    Null,
    Bool(bool),
    Number {
        value: f64,
        unit: Option<String>,
    },
    /// Quoted string, or an unquoted identifier when `quote` is `None`.
    String {
        text: Interpolation,
        quote: Option<Quote>,
    },
    /// Hex color literal, text without the `#`.
    Color(String),
    Variable(VariableRef),
    /// `&`
    Parent,
    /// `.name` or `ns.name`
    ClassRef {
        namespace: Option<String>,
        name: String,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Call(Box<CallExpr>),
    List {
        items: Vec<Expr>,
        separator: ListSeparator,
        bracketed: bool,
    },
    Map(Vec<(Expr, Expr)>),
    /// `a to b` / `a through b`
    Range {
        start: Box<Expr>,
        end: Box<Expr>,
        inclusive: bool,
    },
    Paren(Box<Expr>),
}

/// A function call.
#[derive(Debug, Clone)]
pub struct CallExpr {
    pub namespace: Option<String>,
    pub name: String,
    pub args: ArgList,
}

/// Call-site arguments.
#[derive(Debug, Clone, Default)]
pub struct ArgList {
    pub positional: Vec<Expr>,
    pub keywords: Vec<(String, Expr)>,
    /// `$list...` spread.
    pub rest: Option<Box<Expr>>,
    pub span: Span,
}

impl ArgList {
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keywords.is_empty() && self.rest.is_none()
    }
}

/// A piece of interpolated text.
#[derive(Debug, Clone)]
pub enum InterpPart {
    Literal(String),
    Expr(Expr),
}

/// Text with `#{}` interpolations.
#[derive(Debug, Clone)]
pub struct Interpolation {
    pub parts: Vec<InterpPart>,
    pub span: Span,
}

impl Interpolation {
    pub fn literal(text: impl Into<String>, span: Span) -> Self {
        Self {
            parts: vec![InterpPart::Literal(text.into())],
            span,
        }
    }

    /// The text when there is no interpolated expression.
    pub fn as_plain(&self) -> Option<String> {
        let mut out = String::new();
        for part in &self.parts {
            match part {
                InterpPart::Literal(text) => out.push_str(text),
                InterpPart::Expr(_) => return None,
            }
        }
        Some(out)
    }

    pub fn is_plain(&self) -> bool {
        self.parts.iter().all(|p| matches!(p, InterpPart::Literal(_)))
    }

    /// Append literal text, merging with a trailing literal.
    pub fn push_literal(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(InterpPart::Literal(last)) = self.parts.last_mut() {
            last.push_str(text);
        } else {
            self.parts.push(InterpPart::Literal(text.to_string()));
        }
    }
}
