//! Global color constructors: `rgb()`, `hsl()`, `hwb()`, `lab()`, `lch()`.
//! 全局颜色构造函数。

use cascade_value::{Color, ColorModel, Number, Separator, Value};

use crate::{Args, EvalResult, NativeCallable};

/// Functions callable without a namespace in every file.
pub fn builtins() -> Vec<NativeCallable> {
    vec![
        constructor("rgb", |args| construct(args, ColorModel::Rgb)),
        constructor("rgba", |args| construct(args, ColorModel::Rgb)),
        constructor("hsl", |args| construct(args, ColorModel::Hsl)),
        constructor("hsla", |args| construct(args, ColorModel::Hsl)),
        constructor("hwb", |args| construct(args, ColorModel::Hwb)),
        constructor("lab", |args| construct(args, ColorModel::Lab)),
        constructor("lch", |args| construct(args, ColorModel::Lch)),
    ]
}

fn constructor(name: &'static str, func: fn(&mut Args) -> EvalResult<Value>) -> NativeCallable {
    NativeCallable {
        name,
        params: &[],
        rest: Some("args"),
        func,
    }
}

/// Channels and alpha as written, before conversion.
struct Written {
    channels: Vec<Value>,
    alpha: Option<Value>,
}

fn construct(args: &mut Args, model: ColorModel) -> EvalResult<Value> {
    if let [Value::Color(color), alpha] = args.rest.positional.as_slice() {
        if args.rest.keywords.is_empty() {
            let alpha = alpha_value(args, alpha)?;
            return Ok(Value::Color(color.with_alpha(alpha)));
        }
    }
    let written = written(args, model)?;
    let symbolic = written
        .channels
        .iter()
        .chain(written.alpha.iter())
        .any(|v| v.as_number().is_none());
    if symbolic {
        return Ok(Value::unquoted(plain_call(args.callee, &written)));
    }
    let mut channels = [0.0; 3];
    for (i, value) in written.channels.iter().enumerate() {
        channels[i] = channel_value(args, model, i, value)?;
    }
    let alpha = match &written.alpha {
        Some(alpha) => alpha_value(args, alpha)?,
        None => 1.0,
    };
    Ok(Value::Color(Color::new(model, channels, alpha)))
}

/// Accepts `f(a, b, c[, alpha])`, `f(a b c)`, `f(a b c / alpha)` and the
/// keyword forms named after the model's channels.
fn written(args: &Args, model: ColorModel) -> EvalResult<Written> {
    let names = model.channel_names();
    if !args.rest.keywords.is_empty() {
        let mut channels = Vec::with_capacity(3);
        for name in names {
            match args.rest.keywords.iter().find(|(k, _)| k == name) {
                Some((_, value)) => channels.push(value.clone()),
                None => return Err(args.fail(format_args!("missing argument `${name}`"))),
            }
        }
        let alpha = args
            .rest
            .keywords
            .iter()
            .find(|(k, _)| k == "alpha")
            .map(|(_, v)| v.clone());
        if let Some((extra, _)) = args
            .rest
            .keywords
            .iter()
            .find(|(k, _)| k != "alpha" && !names.contains(&k.as_str()))
        {
            return Err(args.fail(format_args!("no parameter named `${extra}`")));
        }
        return Ok(Written { channels, alpha });
    }

    let positional = args.rest_items();
    match positional {
        [Value::List(list)] if list.separator == Separator::Space && list.items.len() == 3 => {
            let mut channels = list.items.clone();
            let alpha = match &list.items[2] {
                Value::List(last) if last.separator == Separator::Slash && last.items.len() == 2 => {
                    channels[2] = last.items[0].clone();
                    Some(last.items[1].clone())
                }
                _ => None,
            };
            Ok(Written { channels, alpha })
        }
        [Value::List(list)] if list.separator == Separator::Slash && list.items.len() == 2 => {
            let channels = list.items[0].as_items();
            if channels.len() != 3 {
                return Err(args.fail("expected three channels before `/`"));
            }
            Ok(Written {
                channels,
                alpha: Some(list.items[1].clone()),
            })
        }
        [a, b, c] => Ok(Written {
            channels: vec![a.clone(), b.clone(), c.clone()],
            alpha: None,
        }),
        [a, b, c, alpha] => Ok(Written {
            channels: vec![a.clone(), b.clone(), c.clone()],
            alpha: Some(alpha.clone()),
        }),
        _ => Err(args.fail(format_args!(
            "expected {} channels and an optional alpha, got {} arguments",
            names.len(),
            positional.len()
        ))),
    }
}

/// A channel in the model's native scale.
fn channel_value(args: &Args, model: ColorModel, index: usize, value: &Value) -> EvalResult<f64> {
    let Some(number) = value.as_number() else {
        return Err(args.error(model.channel_names()[index], value.mismatch("a number")));
    };
    let hue = matches!((model, index), (ColorModel::Hsl | ColorModel::Hwb, 0) | (ColorModel::Lch, 2));
    if hue {
        return degrees(args, number);
    }
    let (lo, hi) = model.channel_range(index);
    match number.unit() {
        None => Ok(number.value),
        Some("%") => {
            let full = if lo < 0.0 { hi } else { hi - lo };
            Ok(number.value * full / 100.0)
        }
        Some(unit) => Err(args.fail(format_args!(
            "${} must be unitless or a percentage, not `{unit}`",
            model.channel_names()[index]
        ))),
    }
}

fn degrees(args: &Args, number: &Number) -> EvalResult<f64> {
    number
        .value_in(Some("deg"))
        .ok_or_else(|| args.fail(format_args!("`{number}` is not an angle")))
}

fn alpha_value(args: &Args, value: &Value) -> EvalResult<f64> {
    let number = value.expect_number().map_err(|e| args.error("alpha", e))?;
    match number.unit() {
        None => Ok(number.value),
        Some("%") => Ok(number.value / 100.0),
        Some(unit) => Err(args.fail(format_args!("$alpha must be unitless, not `{unit}`"))),
    }
}

/// The call re-emitted as plain CSS, e.g. `rgb(var(--r), 0, 0)`.
fn plain_call(name: &str, written: &Written) -> String {
    let channels: Vec<String> = written.channels.iter().map(Value::to_css).collect();
    match &written.alpha {
        Some(alpha) => format!("{name}({} / {})", channels.join(" "), alpha.to_css()),
        None => format!("{name}({})", channels.join(" ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CallArgs, Scope};
    use cascade_common::Span;

    fn call(name: &str, positional: Vec<Value>) -> EvalResult<Value> {
        let native = builtins().into_iter().find(|b| b.name == name).unwrap();
        let mut args = Args::bind(&native, CallArgs::positional(positional), Scope::root(), Span::DUMMY)?;
        (native.func)(&mut args)
    }

    fn n(v: f64) -> Value {
        Value::unitless(v)
    }

    fn pct(v: f64) -> Value {
        Value::number(v, Some("%"))
    }

    #[test]
    fn test_comma_and_space_forms_agree() {
        let comma = call("rgb", vec![n(255.0), n(0.0), n(0.0)]).unwrap();
        let space = call(
            "rgb",
            vec![Value::list(vec![n(255.0), n(0.0), n(0.0)], Separator::Space)],
        )
        .unwrap();
        assert_eq!(comma, space);
        assert_eq!(comma.to_css(), "#ff0000");
    }

    #[test]
    fn test_slash_alpha() {
        let value = call(
            "hsl",
            vec![Value::list(
                vec![
                    Value::number(120.0, Some("deg")),
                    pct(100.0),
                    Value::list(vec![pct(50.0), n(0.5)], Separator::Slash),
                ],
                Separator::Space,
            )],
        )
        .unwrap();
        let Value::Color(color) = value else {
            panic!("expected a color");
        };
        assert_eq!(color.alpha(), 0.5);
        assert_eq!(color.rgb_channels().map(f64::round), [0.0, 255.0, 0.0]);
    }

    #[test]
    fn test_rgba_with_color() {
        let red = Value::Color(Color::rgb(255.0, 0.0, 0.0, 1.0));
        let value = call("rgba", vec![red, n(0.25)]).unwrap();
        assert_eq!(value.to_css(), "rgba(255, 0, 0, 0.25)");
    }

    #[test]
    fn test_symbolic_channel_stays_css() {
        let value = call("rgb", vec![Value::unquoted("var(--r)"), n(0.0), n(0.0)]).unwrap();
        assert_eq!(value.to_css(), "rgb(var(--r) 0 0)");
    }

    #[test]
    fn test_wrong_arity() {
        assert!(call("rgb", vec![n(1.0), n(2.0)]).is_err());
    }
}
