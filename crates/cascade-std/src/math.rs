//! The `math` module.
//! 数学模块。

use std::f64::consts::{E, PI};

use cascade_eval::{Args, EvalResult, Member, ModuleExports, NativeCallable, NativeParam, optional, required};
use cascade_value::{MathName, Number, Reduction, Value, conversion_factor, ops};

use crate::{native, value_error, variadic};

const NUMBER: &[NativeParam] = &[required("number")];
const PAIR: &[NativeParam] = &[required("number1"), required("number2")];

/// Functions plus the `$pi` and `$e` constants.
pub fn module() -> ModuleExports {
    let mut exports = ModuleExports::native(builtins());
    exports.insert(Member::variable("pi", Value::unitless(PI)));
    exports.insert(Member::variable("e", Value::unitless(E)));
    exports
}

/// Returns all math builtins.
/// 返回所有数学内置函数。
pub fn builtins() -> Vec<NativeCallable> {
    vec![
        // Rounding keeps the unit / 取整保留单位
        native("abs", NUMBER, |args| rounding(args, f64::abs)),
        native("ceil", NUMBER, |args| rounding(args, f64::ceil)),
        native("floor", NUMBER, |args| rounding(args, f64::floor)),
        native("round", NUMBER, |args| rounding(args, round_half_up)),
        native("sqrt", NUMBER, |args| {
            let n = unitless(args, "number")?;
            Ok(Value::unitless(n.sqrt()))
        }),
        native("pow", const { &[required("base"), required("exponent")] }, |args| {
            let (base, exponent) = (args.value("base")?, args.value("exponent")?);
            ops::pow(base, exponent).map_err(|e| value_error(args, e))
        }),
        native("log", const { &[required("number"), optional("base")] }, |args| {
            let n = unitless(args, "number")?;
            match args.get_non_null("base") {
                Some(_) => Ok(Value::unitless(n.log(unitless(args, "base")?))),
                None => Ok(Value::unitless(n.ln())),
            }
        }),
        native("div", PAIR, |args| {
            let (lhs, rhs) = (args.value("number1")?, args.value("number2")?);
            ops::div(lhs, rhs, Reduction::Strict).map_err(|e| value_error(args, e))
        }),
        native("percentage", NUMBER, |args| {
            let n = unitless(args, "number")?;
            Ok(Value::number(n * 100.0, Some("%")))
        }),
        // Extremes over any number of arguments / 任意个参数的极值
        variadic("min", &[], "numbers", |args| extremum(args, MathName::Min)),
        variadic("max", &[], "numbers", |args| extremum(args, MathName::Max)),
        native("clamp", const { &[required("min"), required("number"), required("max")] }, |args| {
            let (lo, value, hi) = (args.value("min")?, args.value("number")?, args.value("max")?);
            ops::clamp(lo, value, hi, Reduction::Strict).map_err(|e| value_error(args, e))
        }),
        variadic("hypot", &[], "numbers", |args| {
            let items = args.rest_items();
            let Some(first) = items.first() else {
                return Err(args.fail("at least one argument is required"));
            };
            let first = first.expect_number().map_err(|e| value_error(args, e))?;
            let mut sum = 0.0;
            for item in items {
                let n = item.expect_number().map_err(|e| value_error(args, e))?;
                let value = n
                    .value_in(first.unit())
                    .ok_or_else(|| args.fail(format!("`{n}` and `{first}` have incompatible units")))?;
                sum += value * value;
            }
            Ok(Value::Number(first.with_value(sum.sqrt())))
        }),
        // Trigonometry takes angles or unitless radians / 三角函数
        native("sin", NUMBER, |args| trig(args, f64::sin)),
        native("cos", NUMBER, |args| trig(args, f64::cos)),
        native("tan", NUMBER, |args| trig(args, f64::tan)),
        // Units / 单位
        native("unit", NUMBER, |args| {
            let n = args.number("number")?;
            Ok(Value::quoted(n.unit().unwrap_or_default()))
        }),
        native("is-unitless", NUMBER, |args| Ok(Value::Bool(args.number("number")?.is_unitless()))),
        native("compatible", PAIR, |args| {
            let (a, b) = (args.number("number1")?, args.number("number2")?);
            Ok(Value::Bool(a.is_compatible(&b)))
        }),
    ]
}

fn rounding(args: &mut Args, f: fn(f64) -> f64) -> EvalResult<Value> {
    let n = args.number("number")?;
    Ok(Value::Number(n.with_value(f(n.value))))
}

/// CSS rounds halves towards positive infinity.
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

fn unitless(args: &Args, name: &str) -> EvalResult<f64> {
    let n = args.number(name)?;
    if !n.is_unitless() {
        return Err(args.fail(format!("${name} `{n}` must be unitless")));
    }
    Ok(n.value)
}

fn extremum(args: &mut Args, name: MathName) -> EvalResult<Value> {
    ops::min_max(name, args.rest_items(), Reduction::Strict).map_err(|e| value_error(args, e))
}

fn trig(args: &mut Args, f: fn(f64) -> f64) -> EvalResult<Value> {
    let n: Number = args.number("number")?;
    let radians = match n.unit() {
        None => n.value,
        Some(unit) => {
            let factor = conversion_factor(unit, "rad")
                .ok_or_else(|| args.fail(format!("`{n}` is not an angle")))?;
            n.value * factor
        }
    };
    Ok(Value::unitless(f(radians)))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::testing::{css, eval};

    #[test]
    fn test_rounding_keeps_units() {
        assert_eq!(css("math.floor(2.7px)"), "2px");
        assert_eq!(css("math.ceil(2.1em)"), "3em");
        assert_eq!(css("math.round(2.5%)"), "3%");
        assert_eq!(css("math.round(-2.5)"), "-2");
        assert_eq!(css("math.abs(-3in)"), "3in");
    }

    #[test]
    fn test_units() {
        assert_eq!(css("math.unit(3px)"), "\"px\"");
        assert_eq!(css("math.is-unitless(3)"), "true");
        assert_eq!(css("math.compatible(1in, 2cm)"), "true");
        assert_eq!(css("math.compatible(1px, 2s)"), "false");
        assert_eq!(css("math.percentage(0.25)"), "25%");
        assert!(eval("math.percentage(1px)").is_err());
    }

    #[test]
    fn test_strict_extremes() {
        assert_eq!(css("math.max(1px, 1in, 3px)"), "1in");
        assert_eq!(css("math.min(4, 2, 3)"), "2");
        assert_eq!(css("math.clamp(0px, 20px, 10px)"), "10px");
        assert!(eval("math.max(1px, 1em)").is_err());
    }

    #[test]
    fn test_powers_and_roots() {
        assert_eq!(css("math.pow(2, 10)"), "1024");
        assert_eq!(css("math.sqrt(16)"), "4");
        assert_eq!(css("math.hypot(3px, 4px)"), "5px");
        assert_eq!(css("math.log(100, 10)"), "2");
        assert_eq!(css("math.div(10px, 4)"), "2.5px");
        assert!(eval("math.div(1px, 0)").is_err());
    }

    #[test]
    fn test_constants_and_trig() {
        assert_eq!(css("math.cos(0)"), "1");
        assert_eq!(css("math.sin(90deg)"), "1");
        assert_eq!(css("math.round(math.$pi * 100)"), "314");
    }
}
