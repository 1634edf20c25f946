//! Irreducible CSS math functions.

use crate::Value;

/// Name of a deferred math function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathName {
    Calc,
    Min,
    Max,
    Clamp,
}

impl MathName {
    pub fn as_str(self) -> &'static str {
        match self {
            MathName::Calc => "calc",
            MathName::Min => "min",
            MathName::Max => "max",
            MathName::Clamp => "clamp",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "calc" => Some(MathName::Calc),
            "min" => Some(MathName::Min),
            "max" => Some(MathName::Max),
            "clamp" => Some(MathName::Clamp),
            _ => None,
        }
    }
}

/// Operator inside a calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalcOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl CalcOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CalcOp::Add => "+",
            CalcOp::Sub => "-",
            CalcOp::Mul => "*",
            CalcOp::Div => "/",
        }
    }

    pub(crate) fn precedence(self) -> u8 {
        match self {
            CalcOp::Add | CalcOp::Sub => 1,
            CalcOp::Mul | CalcOp::Div => 2,
        }
    }
}

/// A node of a calculation tree.
#[derive(Debug, Clone, PartialEq)]
pub enum CalcNode {
    /// A number, an opaque unquoted string such as `var(--x)`, or a nested
    /// math function.
    Value(Value),
    Operation {
        op: CalcOp,
        lhs: Box<CalcNode>,
        rhs: Box<CalcNode>,
    },
}

impl CalcNode {
    /// Wrap a value, unwrapping a single-argument `calc()` into its body.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Math(MathFunction {
                name: MathName::Calc,
                mut args,
            }) if args.len() == 1 => args.remove(0),
            other => CalcNode::Value(other),
        }
    }

    pub fn operation(op: CalcOp, lhs: Value, rhs: Value) -> Self {
        CalcNode::Operation {
            op,
            lhs: Box::new(CalcNode::from_value(lhs)),
            rhs: Box::new(CalcNode::from_value(rhs)),
        }
    }
}

/// `calc()`, `min()`, `max()` or `clamp()` that could not be reduced.
#[derive(Debug, Clone, PartialEq)]
pub struct MathFunction {
    pub name: MathName,
    pub args: Vec<CalcNode>,
}

impl MathFunction {
    pub fn new(name: MathName, args: Vec<CalcNode>) -> Self {
        Self { name, args }
    }

    /// `calc(lhs op rhs)`.
    pub fn calc(op: CalcOp, lhs: Value, rhs: Value) -> Self {
        Self::new(MathName::Calc, vec![CalcNode::operation(op, lhs, rhs)])
    }

    /// `min()`/`max()`/`clamp()` over already evaluated values.
    pub fn of_values(name: MathName, values: Vec<Value>) -> Self {
        Self::new(name, values.into_iter().map(CalcNode::from_value).collect())
    }
}

/// How arithmetic treats operands that cannot be reduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reduction {
    /// Incompatible units and symbolic operands are errors.
    Strict,
    /// Incompatible units defer into `calc()`; strings concatenate.
    #[default]
    Defer,
    /// Inside a math function: unquoted strings and math values defer too.
    Calc,
}

impl Reduction {
    pub fn is_strict(self) -> bool {
        self == Reduction::Strict
    }
}
