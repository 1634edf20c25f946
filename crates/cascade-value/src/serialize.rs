//! CSS and debug serialization of values.
//!
//! `to_css` produces what ends up in a stylesheet. `inspect` produces a
//! form that parses back to an equal value: `null` and empty lists are
//! visible, single-element comma lists keep their trailing comma and
//! nested lists are parenthesised where the separators would otherwise
//! merge.

use std::fmt;

use crate::{CalcNode, List, Map, MathFunction, Separator, Str, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Css,
    Inspect,
}

impl Value {
    pub fn to_css(&self) -> String {
        let mut out = String::new();
        write_value(&mut out, self, Mode::Css);
        out
    }

    pub fn inspect(&self) -> String {
        let mut out = String::new();
        write_value(&mut out, self, Mode::Inspect);
        out
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

fn write_value(out: &mut String, value: &Value, mode: Mode) {
    match value {
        Value::Null => {
            if mode == Mode::Inspect {
                out.push_str("null");
            }
        }
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => write_string(out, s),
        Value::Color(c) => out.push_str(&c.to_string()),
        Value::List(list) => write_list(out, list, mode),
        Value::Map(map) => write_map(out, map),
        Value::ArgList(args) => {
            let list = List::new(args.positional.clone(), Separator::Comma);
            write_list(out, &list, mode);
        }
        Value::Math(math) => write_math(out, math, mode),
    }
}

fn write_string(out: &mut String, s: &Str) {
    let Some(quote) = s.quote else {
        out.push_str(&s.text);
        return;
    };
    let q = quote.char();
    out.push(q);
    for c in s.text.chars() {
        if c == q || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push(q);
}

/// Whether `item` must be parenthesised inside a list separated by `parent`.
fn needs_parens(item: &Value, parent: Separator) -> bool {
    match item {
        Value::List(list) => {
            !list.bracketed
                && list.items.len() >= 2
                && list.separator.rank() <= parent.rank()
        }
        Value::ArgList(args) => args.positional.len() >= 2,
        _ => false,
    }
}

fn write_item(out: &mut String, item: &Value, parent: Separator, mode: Mode) {
    if mode == Mode::Inspect && needs_parens(item, parent) {
        out.push('(');
        write_value(out, item, mode);
        out.push(')');
    } else {
        write_value(out, item, mode);
    }
}

fn write_list(out: &mut String, list: &List, mode: Mode) {
    let (open, close) = if list.bracketed { ("[", "]") } else { ("(", ")") };
    if list.items.is_empty() {
        if list.bracketed || mode == Mode::Inspect {
            out.push_str(open);
            out.push_str(close);
        }
        return;
    }
    let single_comma = list.items.len() == 1 && list.separator == Separator::Comma;
    let wrap = list.bracketed || (mode == Mode::Inspect && single_comma);
    if wrap {
        out.push_str(open);
    }
    let mut first = true;
    for item in &list.items {
        if mode == Mode::Css && item.is_null() {
            continue;
        }
        if !first {
            out.push_str(list.separator.joiner());
        }
        first = false;
        write_item(out, item, list.separator, mode);
    }
    if mode == Mode::Inspect && single_comma {
        out.push(',');
    }
    if wrap {
        out.push_str(close);
    }
}

/// Maps have no CSS form; both modes print the re-parseable one.
fn write_map(out: &mut String, map: &Map) {
    out.push('(');
    for (i, (key, value)) in map.pairs().iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_item(out, key, Separator::Comma, Mode::Inspect);
        out.push_str(": ");
        write_item(out, value, Separator::Comma, Mode::Inspect);
    }
    out.push(')');
}

fn write_math(out: &mut String, math: &MathFunction, mode: Mode) {
    out.push_str(math.name.as_str());
    out.push('(');
    for (i, arg) in math.args.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_node(out, arg, mode);
    }
    out.push(')');
}

fn write_node(out: &mut String, node: &CalcNode, mode: Mode) {
    match node {
        CalcNode::Value(value) => write_value(out, value, mode),
        CalcNode::Operation { op, lhs, rhs } => {
            write_operand(out, lhs, op.precedence(), false, mode);
            out.push(' ');
            out.push_str(op.symbol());
            out.push(' ');
            let strict_rhs = matches!(op, crate::CalcOp::Sub | crate::CalcOp::Div);
            write_operand(out, rhs, op.precedence(), strict_rhs, mode);
        }
    }
}

/// Parenthesise a child operation binding looser than its parent, or
/// equally tight on the right of `-` and `/`.
fn write_operand(out: &mut String, node: &CalcNode, parent: u8, strict_rhs: bool, mode: Mode) {
    let wrap = match node {
        CalcNode::Operation { op, .. } => {
            op.precedence() < parent || (strict_rhs && op.precedence() == parent)
        }
        CalcNode::Value(_) => false,
    };
    if wrap {
        out.push('(');
        write_node(out, node, mode);
        out.push(')');
    } else {
        write_node(out, node, mode);
    }
}
