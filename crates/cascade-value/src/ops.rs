//! Unit-aware arithmetic, comparison and math-function reduction.

use std::cmp::Ordering;

use crate::{
    CalcNode, CalcOp, MathFunction, MathName, Number, Reduction, Str, Value, ValueError,
    ValueResult, fuzzy_eq,
};

// ========== Helpers ==========

fn undefined(op: &'static str, lhs: &Value, rhs: &Value) -> ValueError {
    ValueError::UndefinedOperation {
        op,
        lhs: lhs.inspect(),
        rhs: rhs.inspect(),
    }
}

fn incompatible(lhs: &Number, rhs: &Number) -> ValueError {
    ValueError::IncompatibleUnits {
        lhs: lhs.to_string(),
        rhs: rhs.to_string(),
    }
}

/// Whether a value may appear inside a calculation.
fn is_symbolic(value: &Value, mode: Reduction) -> bool {
    match value {
        Value::Number(_) | Value::Math(_) => true,
        Value::String(s) => s.quote.is_none() && mode == Reduction::Calc,
        _ => false,
    }
}

/// Non-numeric operands that defer into `calc()` rather than fail.
fn defers(lhs: &Value, rhs: &Value, mode: Reduction) -> bool {
    !mode.is_strict() && is_symbolic(lhs, mode) && is_symbolic(rhs, mode)
}

fn deferred(op: CalcOp, lhs: &Value, rhs: &Value) -> Value {
    Value::Math(MathFunction::calc(op, lhs.clone(), rhs.clone()))
}

fn is_string(value: &Value) -> bool {
    matches!(value, Value::String(_))
}

/// `a + b` on strings: the left string decides the quoting.
fn concat(lhs: &Value, rhs: &Value) -> Value {
    let quote = match (lhs, rhs) {
        (Value::String(s), _) => s.quote,
        (_, Value::String(s)) => s.quote,
        _ => None,
    };
    Value::String(Str {
        text: format!("{}{}", lhs.unquoted_text(), rhs.unquoted_text()),
        quote,
    })
}

fn joined(lhs: &Value, sep: &str, rhs: &Value) -> Value {
    Value::unquoted(format!("{}{}{}", lhs.to_css(), sep, rhs.to_css()))
}

/// `lhs ± rhs` for compatible numbers; a unitless lhs adopts rhs's unit.
fn sum(lhs: &Number, rhs: &Number, sign: f64) -> Option<Number> {
    if lhs.is_unitless() {
        return Some(Number::new(lhs.value + sign * rhs.value, rhs.unit()));
    }
    let value = rhs.value_in(lhs.unit())?;
    Some(lhs.with_value(lhs.value + sign * value))
}

// ========== Arithmetic ==========

pub fn add(lhs: &Value, rhs: &Value, mode: Reduction) -> ValueResult<Value> {
    additive(lhs, rhs, mode, CalcOp::Add)
}

pub fn sub(lhs: &Value, rhs: &Value, mode: Reduction) -> ValueResult<Value> {
    additive(lhs, rhs, mode, CalcOp::Sub)
}

fn additive(lhs: &Value, rhs: &Value, mode: Reduction, op: CalcOp) -> ValueResult<Value> {
    let sign = if op == CalcOp::Add { 1.0 } else { -1.0 };
    match (lhs, rhs) {
        (Value::Number(l), Value::Number(r)) => match sum(l, r, sign) {
            Some(n) => Ok(Value::Number(n)),
            None if mode.is_strict() => Err(incompatible(l, r)),
            None => Ok(deferred(op, lhs, rhs)),
        },
        _ if defers(lhs, rhs, mode) => Ok(deferred(op, lhs, rhs)),
        _ if !mode.is_strict() && (is_string(lhs) || is_string(rhs)) => Ok(match op {
            CalcOp::Add => concat(lhs, rhs),
            _ => joined(lhs, "-", rhs),
        }),
        _ => Err(undefined(op.symbol(), lhs, rhs)),
    }
}

pub fn mul(lhs: &Value, rhs: &Value, mode: Reduction) -> ValueResult<Value> {
    match (lhs, rhs) {
        (Value::Number(l), Value::Number(r)) => {
            if !l.is_unitless() && !r.is_unitless() {
                return Err(ValueError::SquaredUnit {
                    lhs: l.to_string(),
                    rhs: r.to_string(),
                });
            }
            let unit = l.unit().or(r.unit());
            Ok(Value::number(l.value * r.value, unit))
        }
        _ if defers(lhs, rhs, mode) => Ok(deferred(CalcOp::Mul, lhs, rhs)),
        _ => Err(undefined("*", lhs, rhs)),
    }
}

pub fn div(lhs: &Value, rhs: &Value, mode: Reduction) -> ValueResult<Value> {
    match (lhs, rhs) {
        (Value::Number(l), Value::Number(r)) => {
            if r.value == 0.0 {
                return Err(ValueError::DivisionByZero);
            }
            if r.is_unitless() {
                return Ok(Value::Number(l.with_value(l.value / r.value)));
            }
            match (l.unit(), r.value_in(l.unit())) {
                (Some(_), Some(divisor)) => Ok(Value::unitless(l.value / divisor)),
                _ => Err(incompatible(l, r)),
            }
        }
        _ if defers(lhs, rhs, mode) => Ok(deferred(CalcOp::Div, lhs, rhs)),
        _ if !mode.is_strict() && (is_string(lhs) || is_string(rhs)) => Ok(joined(lhs, "/", rhs)),
        _ => Err(undefined("/", lhs, rhs)),
    }
}

/// Floored modulo; the modulus must be unitless.
pub fn rem(lhs: &Value, rhs: &Value) -> ValueResult<Value> {
    let (Value::Number(l), Value::Number(r)) = (lhs, rhs) else {
        return Err(undefined("%", lhs, rhs));
    };
    if !r.is_unitless() {
        return Err(ValueError::NotUnitless {
            role: "modulus",
            value: r.to_string(),
        });
    }
    if r.value == 0.0 {
        return Err(ValueError::DivisionByZero);
    }
    let value = l.value - r.value * (l.value / r.value).floor();
    Ok(Value::Number(l.with_value(value)))
}

/// Exponentiation; base and exponent must be unitless.
pub fn pow(lhs: &Value, rhs: &Value) -> ValueResult<Value> {
    let (Value::Number(base), Value::Number(exponent)) = (lhs, rhs) else {
        return Err(undefined("**", lhs, rhs));
    };
    if !exponent.is_unitless() {
        return Err(ValueError::NotUnitless {
            role: "exponent",
            value: exponent.to_string(),
        });
    }
    if !base.is_unitless() {
        return Err(ValueError::NotUnitless {
            role: "base",
            value: base.to_string(),
        });
    }
    Ok(Value::unitless(base.value.powf(exponent.value)))
}

/// Unary minus.
pub fn neg(value: &Value, mode: Reduction) -> ValueResult<Value> {
    match value {
        Value::Number(n) => Ok(Value::Number(n.with_value(-n.value))),
        Value::Math(_) if !mode.is_strict() => {
            Ok(deferred(CalcOp::Mul, &Value::unitless(-1.0), value))
        }
        _ if mode.is_strict() => Err(value.mismatch("a number")),
        Value::String(s) if s.quote.is_none() => Ok(Value::unquoted(format!("-{}", s.text))),
        other => Ok(Value::unquoted(format!("-{}", other.to_css()))),
    }
}

/// Unary plus.
pub fn plus(value: &Value) -> Value {
    match value {
        Value::Number(_) | Value::Math(_) => value.clone(),
        other => Value::unquoted(format!("+{}", other.to_css())),
    }
}

// ========== Comparison ==========

/// Order two numbers, converting the right side into the left's unit.
pub fn compare(lhs: &Value, rhs: &Value) -> ValueResult<Ordering> {
    let (Value::Number(l), Value::Number(r)) = (lhs, rhs) else {
        return Err(undefined("<", lhs, rhs));
    };
    let right = r.value_in(l.unit()).ok_or_else(|| incompatible(l, r))?;
    Ok(order(l.value, right))
}

fn order(a: f64, b: f64) -> Ordering {
    if fuzzy_eq(a, b) {
        Ordering::Equal
    } else if a < b {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

// ========== Math functions ==========

/// `min()` / `max()`: a running extremum over compatible numbers.
///
/// Every unit must convert to the first unit seen; unitless terms fit any
/// unit. The first term that breaks this defers the whole call (or fails
/// under [`Reduction::Strict`]).
pub fn min_max(name: MathName, args: &[Value], mode: Reduction) -> ValueResult<Value> {
    let wanted = match name {
        MathName::Min => Ordering::Less,
        MathName::Max => Ordering::Greater,
        _ => return Err(ValueError::OutOfRange(format!("`{}` is not min or max", name.as_str()))),
    };
    if args.is_empty() {
        return Err(ValueError::OutOfRange(format!(
            "{}() requires at least one argument",
            name.as_str()
        )));
    }
    let mut best: Option<&Number> = None;
    let mut anchor: Option<&Number> = None;
    for arg in args {
        let candidate = match arg {
            Value::Number(n) => n,
            other => return defer_math(name, args, mode, other.mismatch("a number")),
        };
        if candidate.unit().is_some() {
            match anchor {
                None => anchor = Some(candidate),
                Some(first) if candidate.value_in(first.unit()).is_none() => {
                    return defer_math(name, args, mode, incompatible(first, candidate));
                }
                Some(_) => {}
            }
        }
        best = match best {
            None => Some(candidate),
            Some(current) => match candidate.value_in(current.unit()) {
                Some(value) if order(value, current.value) == wanted => Some(candidate),
                Some(_) => Some(current),
                None => return defer_math(name, args, mode, incompatible(current, candidate)),
            },
        };
    }
    match best {
        Some(n) => Ok(Value::Number(n.clone())),
        None => Err(ValueError::OutOfRange(format!("empty {}()", name.as_str()))),
    }
}

fn defer_math(
    name: MathName,
    args: &[Value],
    mode: Reduction,
    error: ValueError,
) -> ValueResult<Value> {
    let calculable = args.iter().all(|arg| is_symbolic(arg, Reduction::Calc));
    if mode.is_strict() || !calculable {
        return Err(error);
    }
    Ok(Value::Math(MathFunction::of_values(name, args.to_vec())))
}

/// `clamp(min, value, max) = max(min(max, value), min)`.
pub fn clamp(lo: &Value, value: &Value, hi: &Value, mode: Reduction) -> ValueResult<Value> {
    let all = [lo.clone(), value.clone(), hi.clone()];
    let reducible = match (lo, value, hi) {
        (Value::Number(a), Value::Number(b), Value::Number(c)) => {
            a.is_compatible(b) && b.is_compatible(c) && a.is_compatible(c)
        }
        _ => false,
    };
    if !reducible {
        let error = match all.iter().find(|v| v.as_number().is_none()) {
            Some(other) => other.mismatch("a number"),
            None => ValueError::IncompatibleUnits {
                lhs: lo.to_css(),
                rhs: hi.to_css(),
            },
        };
        return defer_math(MathName::Clamp, &all, mode, error);
    }
    let upper = min_max(MathName::Min, &[hi.clone(), value.clone()], Reduction::Strict)?;
    min_max(MathName::Max, &[upper, lo.clone()], Reduction::Strict)
}

/// Build `calc(...)` around an already reduced value: numbers pass through.
pub fn calc(value: Value) -> Value {
    match value {
        Value::String(s) if s.quote.is_none() => {
            Value::Math(MathFunction::new(MathName::Calc, vec![CalcNode::Value(Value::String(s))]))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn px(v: f64) -> Value {
        Value::number(v, Some("px"))
    }

    fn em(v: f64) -> Value {
        Value::number(v, Some("em"))
    }

    #[test]
    fn test_add_same_unit() {
        assert_eq!(add(&px(1.0), &px(1.0), Reduction::Defer).unwrap(), px(2.0));
    }

    #[test]
    fn test_add_converts_to_left_unit() {
        let sum = add(&Value::number(1.0, Some("in")), &px(48.0), Reduction::Defer).unwrap();
        assert_eq!(sum.to_css(), "1.5in");
        let sum = add(&Value::unitless(1.0), &px(2.0), Reduction::Defer).unwrap();
        assert_eq!(sum.to_css(), "3px");
    }

    #[test]
    fn test_incompatible_add_defers() {
        let sum = add(&em(1.0), &px(1.0), Reduction::Defer).unwrap();
        assert_eq!(sum.to_css(), "calc(1em + 1px)");
        assert!(matches!(
            add(&em(1.0), &px(1.0), Reduction::Strict),
            Err(ValueError::IncompatibleUnits { .. })
        ));
    }

    #[test]
    fn test_nested_calc_is_unwrapped() {
        let inner = add(&em(1.0), &px(1.0), Reduction::Defer).unwrap();
        let outer = sub(&inner, &Value::number(2.0, Some("%")), Reduction::Defer).unwrap();
        assert_eq!(outer.to_css(), "calc(1em + 1px - 2%)");
        let outer = sub(&px(4.0), &inner, Reduction::Defer).unwrap();
        assert_eq!(outer.to_css(), "calc(4px - (1em + 1px))");
    }

    #[test]
    fn test_string_concatenation() {
        let joined = add(&Value::quoted("a"), &Value::unquoted("b"), Reduction::Defer).unwrap();
        assert_eq!(joined.to_css(), "\"ab\"");
        let joined = add(&Value::unquoted("a"), &px(1.0), Reduction::Defer).unwrap();
        assert_eq!(joined.to_css(), "a1px");
        let joined = sub(&Value::unquoted("a"), &Value::unquoted("b"), Reduction::Defer).unwrap();
        assert_eq!(joined.to_css(), "a-b");
    }

    #[test]
    fn test_calc_mode_defers_symbols() {
        let var = Value::unquoted("var(--gap)");
        let sum = add(&px(1.0), &var, Reduction::Calc).unwrap();
        assert_eq!(sum.to_css(), "calc(1px + var(--gap))");
        let product = mul(&Value::unitless(2.0), &var, Reduction::Calc).unwrap();
        assert_eq!(product.to_css(), "calc(2 * var(--gap))");
    }

    #[test]
    fn test_mul_rejects_squared_units() {
        assert_eq!(mul(&px(2.0), &Value::unitless(3.0), Reduction::Defer).unwrap(), px(6.0));
        assert_eq!(mul(&Value::unitless(3.0), &px(2.0), Reduction::Defer).unwrap(), px(6.0));
        assert!(matches!(
            mul(&px(2.0), &px(3.0), Reduction::Defer),
            Err(ValueError::SquaredUnit { .. })
        ));
    }

    #[test]
    fn test_div_units() {
        assert_eq!(div(&px(10.0), &Value::unitless(4.0), Reduction::Defer).unwrap(), px(2.5));
        assert_eq!(div(&px(10.0), &px(5.0), Reduction::Defer).unwrap(), Value::unitless(2.0));
        assert_eq!(
            div(&Value::number(1.0, Some("in")), &px(48.0), Reduction::Defer).unwrap(),
            Value::unitless(2.0)
        );
        assert!(matches!(
            div(&px(1.0), &em(1.0), Reduction::Defer),
            Err(ValueError::IncompatibleUnits { .. })
        ));
        assert!(matches!(
            div(&Value::unitless(1.0), &px(1.0), Reduction::Defer),
            Err(ValueError::IncompatibleUnits { .. })
        ));
        assert_eq!(
            div(&px(1.0), &Value::unitless(0.0), Reduction::Defer),
            Err(ValueError::DivisionByZero)
        );
    }

    #[test]
    fn test_rem_and_pow() {
        assert_eq!(rem(&px(10.0), &Value::unitless(3.0)).unwrap(), px(1.0));
        assert_eq!(rem(&Value::unitless(-1.0), &Value::unitless(3.0)).unwrap(), Value::unitless(2.0));
        assert!(matches!(rem(&px(10.0), &px(3.0)), Err(ValueError::NotUnitless { .. })));
        assert_eq!(pow(&Value::unitless(2.0), &Value::unitless(10.0)).unwrap(), Value::unitless(1024.0));
        assert!(matches!(
            pow(&Value::unitless(2.0), &px(1.0)),
            Err(ValueError::NotUnitless { role: "exponent", .. })
        ));
    }

    #[test]
    fn test_negation() {
        assert_eq!(neg(&px(2.0), Reduction::Defer).unwrap(), px(-2.0));
        assert_eq!(neg(&Value::unquoted("foo"), Reduction::Defer).unwrap().to_css(), "-foo");
        let math = add(&em(1.0), &px(1.0), Reduction::Defer).unwrap();
        assert_eq!(neg(&math, Reduction::Defer).unwrap().to_css(), "calc(-1 * (1em + 1px))");
        assert!(neg(&Value::unquoted("foo"), Reduction::Strict).is_err());
    }

    #[test]
    fn test_compare_converts() {
        assert_eq!(compare(&Value::number(1.0, Some("in")), &px(96.0)).unwrap(), Ordering::Equal);
        assert_eq!(compare(&px(1.0), &px(2.0)).unwrap(), Ordering::Less);
        assert!(compare(&px(1.0), &em(2.0)).is_err());
        assert!(compare(&px(1.0), &Value::quoted("a")).is_err());
    }

    #[test]
    fn test_min_max_reduce() {
        let args = [px(40.0), px(20.0), px(35.0)];
        assert_eq!(min_max(MathName::Min, &args, Reduction::Defer).unwrap(), px(20.0));
        assert_eq!(min_max(MathName::Max, &args, Reduction::Defer).unwrap(), px(40.0));
        let mixed = [px(1.0), Value::number(1.0, Some("in"))];
        assert_eq!(
            min_max(MathName::Max, &mixed, Reduction::Defer).unwrap().to_css(),
            "1in"
        );
    }

    #[test]
    fn test_min_max_defer() {
        let args = [px(10.0), Value::number(50.0, Some("%"))];
        let deferred = min_max(MathName::Min, &args, Reduction::Defer).unwrap();
        assert_eq!(deferred.to_css(), "min(10px, 50%)");
        assert!(min_max(MathName::Min, &args, Reduction::Strict).is_err());
        assert!(min_max(MathName::Min, &[px(1.0), Value::quoted("a")], Reduction::Defer).is_err());
        assert!(min_max(MathName::Min, &[], Reduction::Defer).is_err());
    }

    #[test]
    fn test_min_max_unitless_does_not_hide_incompatible_units() {
        let orders = [
            [px(2.0), Value::unitless(1.0), em(3.0)],
            [Value::unitless(1.0), px(2.0), em(3.0)],
            [em(3.0), px(2.0), Value::unitless(1.0)],
        ];
        for args in &orders {
            let deferred = min_max(MathName::Min, args, Reduction::Defer).unwrap();
            assert!(matches!(deferred, Value::Math(_)), "{args:?}");
            assert!(matches!(
                min_max(MathName::Max, args, Reduction::Strict),
                Err(ValueError::IncompatibleUnits { .. })
            ));
        }
        assert_eq!(
            min_max(MathName::Min, &[px(2.0), Value::unitless(1.0), em(3.0)], Reduction::Defer)
                .unwrap()
                .to_css(),
            "min(2px, 1, 3em)"
        );
        let compatible = [Value::unitless(5.0), px(2.0), Value::number(1.0, Some("in"))];
        assert_eq!(min_max(MathName::Min, &compatible, Reduction::Strict).unwrap(), px(2.0));
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(&px(40.0), &px(70.0), &px(60.0), Reduction::Defer).unwrap(), px(60.0));
        assert_eq!(clamp(&px(40.0), &px(10.0), &px(60.0), Reduction::Defer).unwrap(), px(40.0));
        assert_eq!(clamp(&px(40.0), &px(50.0), &px(60.0), Reduction::Defer).unwrap(), px(50.0));
        let deferred = clamp(&px(10.0), &Value::number(5.0, Some("vw")), &px(60.0), Reduction::Defer).unwrap();
        assert_eq!(deferred.to_css(), "clamp(10px, 5vw, 60px)");
    }

    #[test]
    fn test_calc_fence() {
        assert_eq!(calc(px(3.0)), px(3.0));
        assert_eq!(calc(Value::unquoted("var(--x)")).to_css(), "calc(var(--x))");
    }
}
