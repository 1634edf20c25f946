//! The `color` module.
//! 颜色模块。

use cascade_eval::{Args, EvalResult, NativeCallable, NativeParam, optional, required};
use cascade_value::{Color, ColorModel, Value};

use crate::{native, variadic};

const COLOR: &[NativeParam] = &[required("color")];
const AMOUNT: &[NativeParam] = &[required("color"), required("amount")];

/// Returns all color builtins.
/// 返回所有颜色内置函数。
pub fn builtins() -> Vec<NativeCallable> {
    vec![
        // Channels / 通道
        native("red", COLOR, |args| channel_of(args, ColorModel::Rgb, 0)),
        native("green", COLOR, |args| channel_of(args, ColorModel::Rgb, 1)),
        native("blue", COLOR, |args| channel_of(args, ColorModel::Rgb, 2)),
        native("hue", COLOR, |args| channel_of(args, ColorModel::Hsl, 0)),
        native("saturation", COLOR, |args| channel_of(args, ColorModel::Hsl, 1)),
        native("lightness", COLOR, |args| channel_of(args, ColorModel::Hsl, 2)),
        native("whiteness", COLOR, |args| channel_of(args, ColorModel::Hwb, 1)),
        native("blackness", COLOR, |args| channel_of(args, ColorModel::Hwb, 2)),
        native("alpha", COLOR, |args| Ok(Value::unitless(args.color("color")?.alpha()))),
        native("channel", const { &[required("color"), required("channel"), optional("space")] }, |args| {
            let color = args.color("color")?;
            let name = args.string("channel")?.text;
            let model = match args.get_non_null("space") {
                Some(_) => model_named(args, "space")?,
                None => color.model(),
            };
            if name == "alpha" {
                return Ok(Value::unitless(color.alpha()));
            }
            let index = model
                .channel_names()
                .iter()
                .position(|n| *n == name)
                .ok_or_else(|| args.fail(format!("color space `{}` has no channel `{name}`", model.name())))?;
            Ok(channel_value(&color.to_model(model), index))
        }),
        native("space", COLOR, |args| Ok(Value::unquoted(args.color("color")?.model().name()))),
        native("to-space", const { &[required("color"), required("space")] }, |args| {
            let color = args.color("color")?;
            Ok(Value::Color(color.to_model(model_named(args, "space")?)))
        }),
        // Adjustments / 调整
        variadic("adjust", COLOR, "channels", |args| edit(args, Edit::Adjust)),
        variadic("change", COLOR, "channels", |args| edit(args, Edit::Change)),
        native("lighten", AMOUNT, |args| shift(args, 2, 1.0)),
        native("darken", AMOUNT, |args| shift(args, 2, -1.0)),
        native("saturate", AMOUNT, |args| shift(args, 1, 1.0)),
        native("desaturate", AMOUNT, |args| shift(args, 1, -1.0)),
        native("complement", COLOR, |args| {
            let color = args.color("color")?;
            let hsl = color.to_model(ColorModel::Hsl);
            let [hue, ..] = hsl.channels();
            Ok(Value::Color(hsl.with_channel(0, hue + 180.0).to_model(color.model())))
        }),
        native("grayscale", COLOR, |args| {
            let color = args.color("color")?;
            let gray = color.to_model(ColorModel::Hsl).with_channel(1, 0.0);
            Ok(Value::Color(gray.to_model(color.model())))
        }),
        native("invert", const { &[required("color"), optional("weight")] }, |args| {
            let color = args.color("color")?;
            let [r, g, b] = color.rgb_channels();
            let inverted = Color::rgb(255.0 - r, 255.0 - g, 255.0 - b, color.alpha());
            let weight = weight(args, 1.0)?;
            Ok(Value::Color(mix(&inverted, &color, weight).to_model(color.model())))
        }),
        native("mix", const { &[required("color1"), required("color2"), optional("weight")] }, |args| {
            let (first, second) = (args.color("color1")?, args.color("color2")?);
            Ok(Value::Color(mix(&first, &second, weight(args, 0.5)?)))
        }),
    ]
}

fn channel_of(args: &mut Args, model: ColorModel, index: usize) -> EvalResult<Value> {
    Ok(channel_value(&args.color("color")?.to_model(model), index))
}

/// A channel as a number: percentages for saturation-like channels,
/// degrees for hues.
fn channel_value(color: &Color, index: usize) -> Value {
    let model = color.model();
    let value = color.channels()[index];
    let unit = match (model, index) {
        (ColorModel::Rgb, _) | (ColorModel::Lab, 1 | 2) | (ColorModel::Lch, 1) => None,
        (ColorModel::Hsl | ColorModel::Hwb, 0) | (ColorModel::Lch, 2) => Some("deg"),
        _ => Some("%"),
    };
    Value::number(value, unit)
}

fn model_named(args: &Args, name: &str) -> EvalResult<ColorModel> {
    let text = args.string(name)?.text;
    ColorModel::from_name(&text).ok_or_else(|| args.fail(format!("unknown color space `{text}`")))
}

/// `$weight` as a fraction.
fn weight(args: &Args, default: f64) -> EvalResult<f64> {
    match args.get_non_null("weight") {
        None => Ok(default),
        Some(_) => {
            let n = args.number("weight")?;
            let fraction = if n.unit() == Some("%") { n.value / 100.0 } else { n.value };
            if !(0.0..=1.0).contains(&fraction) {
                return Err(args.fail(format!("$weight `{n}` must be between 0% and 100%")));
            }
            Ok(fraction)
        }
    }
}

/// Weighted average in sRGB where the alpha difference shifts the weight.
fn mix(first: &Color, second: &Color, weight: f64) -> Color {
    let normalized = weight * 2.0 - 1.0;
    let alpha_delta = first.alpha() - second.alpha();
    let combined = if normalized * alpha_delta == -1.0 {
        normalized
    } else {
        (normalized + alpha_delta) / (1.0 + normalized * alpha_delta)
    };
    let w1 = (combined + 1.0) / 2.0;
    let w2 = 1.0 - w1;
    let (a, b) = (first.rgb_channels(), second.rgb_channels());
    Color::rgb(
        a[0] * w1 + b[0] * w2,
        a[1] * w1 + b[1] * w2,
        a[2] * w1 + b[2] * w2,
        first.alpha() * weight + second.alpha() * (1.0 - weight),
    )
}

/// Add `sign * $amount` to one HSL channel.
fn shift(args: &mut Args, index: usize, sign: f64) -> EvalResult<Value> {
    let color = args.color("color")?;
    let amount = args.number("amount")?.value;
    let hsl = color.to_model(ColorModel::Hsl);
    let current = hsl.channels()[index];
    Ok(Value::Color(hsl.with_channel(index, current + sign * amount).to_model(color.model())))
}

#[derive(Clone, Copy, PartialEq)]
enum Edit {
    Adjust,
    Change,
}

/// `adjust($color, $red: 10)` / `change($color, $lightness: 50%)`.
///
/// Channels are looked up in `$space` when given, else in the color's own
/// model, else in rgb, hsl and hwb in that order. The result is expressed
/// in the original model.
fn edit(args: &mut Args, mode: Edit) -> EvalResult<Value> {
    let original = args.color("color")?;
    if !args.rest.positional.is_empty() {
        return Err(args.fail("channels must be passed by name"));
    }
    let mut space = None;
    let mut alpha = None;
    let mut channels = Vec::new();
    for (name, value) in &args.rest.keywords {
        let number = || value.as_number().ok_or_else(|| args.fail(format!("${name} must be a number")));
        match name.as_str() {
            "space" => {
                let text = value.unquoted_text();
                space = Some(
                    ColorModel::from_name(&text).ok_or_else(|| args.fail(format!("unknown color space `{text}`")))?,
                );
            }
            "alpha" => {
                let n = number()?;
                alpha = Some(if n.unit() == Some("%") { n.value / 100.0 } else { n.value });
            }
            _ => channels.push((name.clone(), number()?.value)),
        }
    }
    let candidates: Vec<ColorModel> = match space {
        Some(model) => vec![model],
        None => vec![original.model(), ColorModel::Rgb, ColorModel::Hsl, ColorModel::Hwb],
    };
    let mut color = original.clone();
    if let Some((first, _)) = channels.first() {
        let model = candidates
            .iter()
            .copied()
            .find(|m| m.channel_names().contains(&first.as_str()))
            .ok_or_else(|| args.fail(format!("unknown channel `${first}`")))?;
        color = color.to_model(model);
        for (name, value) in &channels {
            let index = model
                .channel_names()
                .iter()
                .position(|n| *n == name.as_str())
                .ok_or_else(|| args.fail(format!("`${name}` is not a channel of {}", model.name())))?;
            let next = match mode {
                Edit::Adjust => color.channels()[index] + value,
                Edit::Change => *value,
            };
            color = color.with_channel(index, next);
        }
    }
    if let Some(alpha) = alpha {
        let next = match mode {
            Edit::Adjust => color.alpha() + alpha,
            Edit::Change => alpha,
        };
        color = color.with_alpha(next);
    }
    Ok(Value::Color(color.to_model(original.model())))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::testing::{css, eval};

    #[test]
    fn test_channels() {
        assert_eq!(css("color.red(#ff8000)"), "255");
        assert_eq!(css("color.green(#ff8000)"), "128");
        assert_eq!(css("color.hue(#ff0000)"), "0deg");
        assert_eq!(css("color.lightness(#ff0000)"), "50%");
        assert_eq!(css("color.alpha(rgba(0, 0, 0, 0.5))"), "0.5");
        assert_eq!(css("color.channel(hsl(120, 50%, 50%), \"hue\")"), "120deg");
        assert_eq!(css("color.space(hsl(120, 50%, 50%))"), "hsl");
    }

    #[test]
    fn test_adjust_and_change() {
        assert_eq!(css("color.adjust(#000000, $red: 255)"), "#ff0000");
        assert_eq!(css("color.change(#ff0000, $blue: 255)"), "#ff00ff");
        assert_eq!(css("color.change(#ff0000, $alpha: 0.5)"), "rgba(255, 0, 0, 0.5)");
        assert_eq!(css("color.adjust(#ff0000, $red: 100)"), "#ff0000");
        assert!(eval("color.adjust(#000, $bogus: 1)").is_err());
    }

    #[test]
    fn test_hsl_helpers() {
        assert_eq!(css("color.lighten(hsl(0, 100%, 20%), 30%)"), "hsl(0, 100%, 50%)");
        assert_eq!(css("color.darken(hsl(0, 100%, 50%), 60%)"), "hsl(0, 100%, 0%)");
        assert_eq!(css("color.complement(hsl(30, 50%, 50%))"), "hsl(210, 50%, 50%)");
        assert_eq!(css("color.grayscale(hsl(30, 50%, 50%))"), "hsl(30, 0%, 50%)");
    }

    #[test]
    fn test_mix_and_invert() {
        assert_eq!(css("color.mix(#ff0000, #0000ff)"), "rgb(127.5, 0, 127.5)");
        assert_eq!(css("color.mix(#ff0000, #0000ff, 100%)"), "#ff0000");
        assert_eq!(css("color.invert(#ffffff)"), "#000000");
        assert!(eval("color.mix(#fff, #000, 150%)").is_err());
    }
}
