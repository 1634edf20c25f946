//! The runtime value type.

use crate::{ArgList, Color, List, Map, MathFunction, Number, Separator, ValueError, ValueResult};

/// Quote style of a quoted string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
    Double,
    Single,
}

impl Quote {
    pub fn char(self) -> char {
        match self {
            Quote::Double => '"',
            Quote::Single => '\'',
        }
    }
}

/// A string, quoted or unquoted.
#[derive(Debug, Clone)]
pub struct Str {
    pub text: String,
    pub quote: Option<Quote>,
}

impl Str {
    pub fn is_quoted(&self) -> bool {
        self.quote.is_some()
    }
}

/// A runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(Str),
    Color(Color),
    List(List),
    Map(Map),
    ArgList(ArgList),
    /// An irreducible `calc()`, `min()`, `max()` or `clamp()`.
    Math(MathFunction),
}

impl Value {
    pub fn number(value: f64, unit: Option<&str>) -> Self {
        Value::Number(Number::new(value, unit))
    }

    pub fn unitless(value: f64) -> Self {
        Value::Number(Number::unitless(value))
    }

    pub fn unquoted(text: impl Into<String>) -> Self {
        Value::String(Str {
            text: text.into(),
            quote: None,
        })
    }

    pub fn quoted(text: impl Into<String>) -> Self {
        Value::String(Str {
            text: text.into(),
            quote: Some(Quote::Double),
        })
    }

    pub fn list(items: Vec<Value>, separator: Separator) -> Self {
        Value::List(List::new(items, separator))
    }

    pub fn empty_list() -> Self {
        Value::list(Vec::new(), Separator::Space)
    }

    /// `false` and `null` are falsy; everything else is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Null | Value::Bool(false))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Color(_) => "color",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::ArgList(_) => "arglist",
            Value::Math(_) => "calculation",
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn expect_number(&self) -> ValueResult<&Number> {
        self.as_number().ok_or_else(|| self.mismatch("a number"))
    }

    pub fn expect_string(&self) -> ValueResult<&Str> {
        match self {
            Value::String(s) => Ok(s),
            _ => Err(self.mismatch("a string")),
        }
    }

    pub fn expect_color(&self) -> ValueResult<&Color> {
        match self {
            Value::Color(c) => Ok(c),
            _ => Err(self.mismatch("a color")),
        }
    }

    pub fn expect_map(&self) -> ValueResult<Map> {
        match self {
            Value::Map(m) => Ok(m.clone()),
            Value::List(l) if l.items.is_empty() => Ok(Map::new()),
            Value::ArgList(args) => Ok(Map::from_pairs(
                args.keywords
                    .iter()
                    .map(|(k, v)| (Value::unquoted(k.clone()), v.clone()))
                    .collect(),
            )),
            _ => Err(self.mismatch("a map")),
        }
    }

    /// An integer-valued number, e.g. a list index.
    pub fn expect_int(&self) -> ValueResult<i64> {
        let n = self.expect_number()?;
        if crate::fuzzy_is_int(n.value) {
            Ok(n.value.round() as i64)
        } else {
            Err(self.mismatch("an integer"))
        }
    }

    pub fn mismatch(&self, expected: &'static str) -> ValueError {
        ValueError::Expected {
            expected,
            found: self.inspect(),
        }
    }

    /// The value seen as a list: lists and argument lists yield their
    /// items, maps yield `key value` pairs, anything else is a
    /// one-element list.
    pub fn as_items(&self) -> Vec<Value> {
        match self {
            Value::List(list) => list.items.clone(),
            Value::ArgList(args) => args.positional.clone(),
            Value::Map(map) => map
                .pairs()
                .iter()
                .map(|(k, v)| Value::list(vec![k.clone(), v.clone()], Separator::Space))
                .collect(),
            other => vec![other.clone()],
        }
    }

    pub fn separator(&self) -> Separator {
        match self {
            Value::List(list) => list.separator,
            Value::ArgList(_) | Value::Map(_) => Separator::Comma,
            _ => Separator::Space,
        }
    }

    /// Text of a string without quotes; other values serialize as CSS.
    pub fn unquoted_text(&self) -> String {
        match self {
            Value::String(s) => s.text.clone(),
            other => other.to_css(),
        }
    }

    /// `start to end` / `start through end`, stepping by one.
    pub fn range(start: &Value, end: &Value, inclusive: bool) -> ValueResult<Value> {
        let first = start.expect_number()?;
        let last = end.expect_number()?;
        let last_value = last.value_in(first.unit()).ok_or_else(|| ValueError::IncompatibleUnits {
            lhs: first.to_string(),
            rhs: last.to_string(),
        })?;
        let (from, to) = (start.expect_int()?, Value::unitless(last_value).expect_int()?);
        let step = if to >= from { 1 } else { -1 };
        let mut items = Vec::new();
        let mut i = from;
        while (step > 0 && (i < to || (inclusive && i == to))) || (step < 0 && (i > to || (inclusive && i == to))) {
            items.push(Value::Number(first.with_value(i as f64)));
            i += step;
        }
        Ok(Value::list(items, Separator::Space))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a.same_quantity(b),
            (Value::String(a), Value::String(b)) => a.text == b.text,
            (Value::Color(a), Value::Color(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::List(l), Value::Map(m)) | (Value::Map(m), Value::List(l)) => {
                l.items.is_empty() && !l.bracketed && m.is_empty()
            }
            (Value::ArgList(a), Value::ArgList(b)) => a == b,
            // An argument list without keywords reads back as a comma list.
            (Value::ArgList(a), Value::List(l)) | (Value::List(l), Value::ArgList(a)) => {
                a.keywords.is_empty()
                    && !l.bracketed
                    && (a.positional.len() < 2 || l.separator == Separator::Comma)
                    && a.positional == l.items
            }
            (Value::Math(a), Value::Math(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<Color> for Value {
    fn from(c: Color) -> Self {
        Value::Color(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(Value::unitless(0.0).is_truthy());
        assert!(Value::quoted("").is_truthy());
        assert!(Value::empty_list().is_truthy());
    }

    #[test]
    fn test_equality() {
        assert_eq!(Value::quoted("a"), Value::unquoted("a"));
        assert_eq!(Value::number(1.0, Some("in")), Value::number(96.0, Some("px")));
        assert_ne!(Value::unitless(1.0), Value::number(1.0, Some("px")));
        let single_space = Value::list(vec![Value::unitless(1.0)], Separator::Space);
        let single_comma = Value::list(vec![Value::unitless(1.0)], Separator::Comma);
        assert_eq!(single_space, single_comma);
        let a = Map::from_pairs(vec![
            (Value::unquoted("x"), Value::unitless(1.0)),
            (Value::unquoted("y"), Value::unitless(2.0)),
        ]);
        let b = Map::from_pairs(vec![
            (Value::unquoted("y"), Value::unitless(2.0)),
            (Value::unquoted("x"), Value::unitless(1.0)),
        ]);
        assert_eq!(Value::Map(a), Value::Map(b));
        assert_eq!(Value::Map(Map::new()), Value::empty_list());
    }

    #[test]
    fn test_arglist_equals_its_comma_list() {
        let args = Value::ArgList(ArgList {
            positional: vec![Value::unitless(1.0), Value::number(2.0, Some("px"))],
            keywords: Vec::new(),
        });
        let comma = Value::list(
            vec![Value::unitless(1.0), Value::number(2.0, Some("px"))],
            Separator::Comma,
        );
        let space = Value::list(comma.as_items(), Separator::Space);
        assert_eq!(args, comma);
        assert_eq!(comma, args);
        assert_ne!(args, space);

        let keyed = Value::ArgList(ArgList {
            positional: vec![Value::unitless(1.0), Value::number(2.0, Some("px"))],
            keywords: vec![("k".to_string(), Value::Null)],
        });
        assert_ne!(keyed, comma);
    }

    #[test]
    fn test_range() {
        let up = Value::range(&Value::number(1.0, Some("px")), &Value::unitless(3.0), true).unwrap();
        assert_eq!(up.to_css(), "1px 2px 3px");
        let exclusive = Value::range(&Value::unitless(1.0), &Value::unitless(3.0), false).unwrap();
        assert_eq!(exclusive.to_css(), "1 2");
        let down = Value::range(&Value::unitless(3.0), &Value::unitless(1.0), true).unwrap();
        assert_eq!(down.to_css(), "3 2 1");
        let empty = Value::range(&Value::unitless(1.0), &Value::unitless(1.0), false).unwrap();
        assert_eq!(empty.as_items().len(), 0);
    }

    #[test]
    fn test_type_names() {
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::Color(Color::rgb(0.0, 0.0, 0.0, 1.0)).type_name(), "color");
        assert_eq!(Value::ArgList(ArgList::default()).type_name(), "arglist");
    }
}
