//! Colors in five models with sRGB / CIE XYZ (D65) / CIELab conversion.

use std::fmt;

use crate::number::{format_number, fuzzy_eq, fuzzy_is_int};

/// Color model of a [`Color`]'s channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorModel {
    /// red, green, blue in `[0, 255]`
    Rgb,
    /// hue in degrees, saturation and lightness in `[0, 100]`
    Hsl,
    /// hue in degrees, whiteness and blackness in `[0, 100]`
    Hwb,
    /// lightness in `[0, 100]`, a and b in `[-125, 125]`
    Lab,
    /// lightness in `[0, 100]`, chroma in `[0, 150]`, hue in degrees
    Lch,
}

impl ColorModel {
    pub fn name(self) -> &'static str {
        match self {
            ColorModel::Rgb => "rgb",
            ColorModel::Hsl => "hsl",
            ColorModel::Hwb => "hwb",
            ColorModel::Lab => "lab",
            ColorModel::Lch => "lch",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "rgb" => ColorModel::Rgb,
            "hsl" => ColorModel::Hsl,
            "hwb" => ColorModel::Hwb,
            "lab" => ColorModel::Lab,
            "lch" => ColorModel::Lch,
            _ => return None,
        })
    }

    /// Channel names in order.
    pub fn channel_names(self) -> [&'static str; 3] {
        match self {
            ColorModel::Rgb => ["red", "green", "blue"],
            ColorModel::Hsl => ["hue", "saturation", "lightness"],
            ColorModel::Hwb => ["hue", "whiteness", "blackness"],
            ColorModel::Lab => ["lightness", "a", "b"],
            ColorModel::Lch => ["lightness", "chroma", "hue"],
        }
    }

    fn is_hue(self, index: usize) -> bool {
        matches!((self, index), (ColorModel::Hsl | ColorModel::Hwb, 0) | (ColorModel::Lch, 2))
    }

    /// Valid range of a non-hue channel.
    pub fn channel_range(self, index: usize) -> (f64, f64) {
        match (self, index) {
            (ColorModel::Rgb, _) => (0.0, 255.0),
            (ColorModel::Lab, 1 | 2) => (-125.0, 125.0),
            (ColorModel::Lch, 1) => (0.0, 150.0),
            _ => (0.0, 100.0),
        }
    }
}

/// A color value. The literal spelling (`#abc`, `red`) is kept until the
/// color is modified.
#[derive(Debug, Clone)]
pub struct Color {
    model: ColorModel,
    channels: [f64; 3],
    alpha: f64,
    literal: Option<String>,
}

impl Color {
    /// Build a color, clamping channels and alpha into range.
    pub fn new(model: ColorModel, channels: [f64; 3], alpha: f64) -> Self {
        let mut color = Self {
            model,
            channels,
            alpha: clamp_alpha(alpha),
            literal: None,
        };
        for i in 0..3 {
            color.channels[i] = color.clamp_channel(i, channels[i]);
        }
        color
    }

    pub fn rgb(red: f64, green: f64, blue: f64, alpha: f64) -> Self {
        Self::new(ColorModel::Rgb, [red, green, blue], alpha)
    }

    pub fn hsl(hue: f64, saturation: f64, lightness: f64, alpha: f64) -> Self {
        Self::new(ColorModel::Hsl, [hue, saturation, lightness], alpha)
    }

    pub fn hwb(hue: f64, whiteness: f64, blackness: f64, alpha: f64) -> Self {
        Self::new(ColorModel::Hwb, [hue, whiteness, blackness], alpha)
    }

    pub fn lab(lightness: f64, a: f64, b: f64, alpha: f64) -> Self {
        Self::new(ColorModel::Lab, [lightness, a, b], alpha)
    }

    pub fn lch(lightness: f64, chroma: f64, hue: f64, alpha: f64) -> Self {
        Self::new(ColorModel::Lch, [lightness, chroma, hue], alpha)
    }

    /// Parse hex digits (without `#`); the literal is preserved.
    pub fn from_hex(hex: &str) -> Option<Self> {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let digit = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|d| f64::from(d * 17));
        let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok().map(f64::from);
        let (r, g, b, a) = match hex.len() {
            3 => (digit(0)?, digit(1)?, digit(2)?, 255.0),
            4 => (digit(0)?, digit(1)?, digit(2)?, digit(3)?),
            6 => (pair(0)?, pair(2)?, pair(4)?, 255.0),
            8 => (pair(0)?, pair(2)?, pair(4)?, pair(6)?),
            _ => return None,
        };
        let mut color = Self::rgb(r, g, b, a / 255.0);
        color.literal = Some(format!("#{hex}"));
        Some(color)
    }

    /// Look up a CSS named color; the name is kept as the literal.
    pub fn named(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        let &(_, [r, g, b], a) = NAMED_COLORS.iter().find(|(n, _, _)| *n == lower)?;
        let mut color = Self::rgb(f64::from(r), f64::from(g), f64::from(b), a);
        color.literal = Some(name.to_string());
        Some(color)
    }

    pub fn model(&self) -> ColorModel {
        self.model
    }

    pub fn channels(&self) -> [f64; 3] {
        self.channels
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn literal(&self) -> Option<&str> {
        self.literal.as_deref()
    }

    /// Attach a literal spelling, e.g. for a color built by `rgb()`.
    pub fn with_literal(mut self, literal: impl Into<String>) -> Self {
        self.literal = Some(literal.into());
        self
    }

    /// Replace one channel, clamped to the model's range.
    pub fn with_channel(&self, index: usize, value: f64) -> Self {
        let mut channels = self.channels;
        channels[index.min(2)] = value;
        Self::new(self.model, channels, self.alpha)
    }

    pub fn with_alpha(&self, alpha: f64) -> Self {
        Self::new(self.model, self.channels, alpha)
    }

    fn clamp_channel(&self, index: usize, value: f64) -> f64 {
        if value.is_nan() {
            return 0.0;
        }
        if self.model.is_hue(index) {
            return value.rem_euclid(360.0);
        }
        let (lo, hi) = self.model.channel_range(index);
        value.clamp(lo, hi)
    }

    /// The same color expressed in `model`.
    pub fn to_model(&self, model: ColorModel) -> Self {
        if model == self.model {
            return self.clone();
        }
        let [r, g, b] = self.rgb_channels();
        let channels = match model {
            ColorModel::Rgb => [r, g, b],
            ColorModel::Hsl => rgb_to_hsl(r, g, b),
            ColorModel::Hwb => rgb_to_hwb(r, g, b),
            ColorModel::Lab => rgb_to_lab(r, g, b),
            ColorModel::Lch => lab_to_lch(rgb_to_lab(r, g, b)),
        };
        Self::new(model, channels, self.alpha)
    }

    /// Unclamped sRGB channels in `[0, 255]`.
    pub fn rgb_channels(&self) -> [f64; 3] {
        let [x, y, z] = self.channels;
        match self.model {
            ColorModel::Rgb => self.channels,
            ColorModel::Hsl => hsl_to_rgb(x, y, z),
            ColorModel::Hwb => hwb_to_rgb(x, y, z),
            ColorModel::Lab => lab_to_rgb(self.channels),
            ColorModel::Lch => lab_to_rgb(lch_to_lab(self.channels)),
        }
    }

    fn write_css(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(literal) = &self.literal {
            return f.write_str(literal);
        }
        let [x, y, z] = self.channels;
        let opaque = fuzzy_eq(self.alpha, 1.0);
        let alpha = format_number(self.alpha);
        match self.model {
            ColorModel::Rgb if opaque && self.channels.iter().all(|c| fuzzy_is_int(*c)) => {
                write!(f, "#{:02x}{:02x}{:02x}", x.round() as u8, y.round() as u8, z.round() as u8)
            }
            ColorModel::Rgb if opaque => {
                write!(f, "rgb({}, {}, {})", format_number(x), format_number(y), format_number(z))
            }
            ColorModel::Rgb => write!(
                f,
                "rgba({}, {}, {}, {alpha})",
                format_number(x),
                format_number(y),
                format_number(z)
            ),
            ColorModel::Hsl if opaque => {
                write!(f, "hsl({}, {}%, {}%)", format_number(x), format_number(y), format_number(z))
            }
            ColorModel::Hsl => write!(
                f,
                "hsla({}, {}%, {}%, {alpha})",
                format_number(x),
                format_number(y),
                format_number(z)
            ),
            ColorModel::Hwb => {
                write!(f, "hwb({} {}% {}%", format_number(x), format_number(y), format_number(z))?;
                write_alpha(f, opaque, &alpha)
            }
            ColorModel::Lab => {
                write!(f, "lab({}% {} {}", format_number(x), format_number(y), format_number(z))?;
                write_alpha(f, opaque, &alpha)
            }
            ColorModel::Lch => {
                write!(f, "lch({}% {} {}", format_number(x), format_number(y), format_number(z))?;
                write_alpha(f, opaque, &alpha)
            }
        }
    }
}

fn write_alpha(f: &mut fmt::Formatter<'_>, opaque: bool, alpha: &str) -> fmt::Result {
    if opaque {
        f.write_str(")")
    } else {
        write!(f, " / {alpha})")
    }
}

fn clamp_alpha(alpha: f64) -> f64 {
    if alpha.is_nan() { 1.0 } else { alpha.clamp(0.0, 1.0) }
}

impl PartialEq for Color {
    /// Colors are equal when they denote the same sRGB color and alpha.
    fn eq(&self, other: &Self) -> bool {
        let a = self.rgb_channels();
        let b = other.rgb_channels();
        (0..3).all(|i| (a[i] - b[i]).abs() < 5e-4) && fuzzy_eq(self.alpha, other.alpha)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_css(f)
    }
}

// ========== Conversions ==========

fn rgb_to_hsl(r: f64, g: f64, b: f64) -> [f64; 3] {
    let (r, g, b) = (r / 255.0, g / 255.0, b / 255.0);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;
    let lightness = (max + min) / 2.0;
    let hue = hue_of(r, g, b, max, delta);
    let saturation = if delta == 0.0 {
        0.0
    } else {
        delta / (1.0 - (2.0 * lightness - 1.0).abs())
    };
    [hue, saturation * 100.0, lightness * 100.0]
}

fn hue_of(r: f64, g: f64, b: f64, max: f64, delta: f64) -> f64 {
    if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    }
}

fn hsl_to_rgb(hue: f64, saturation: f64, lightness: f64) -> [f64; 3] {
    let s = saturation / 100.0;
    let l = lightness / 100.0;
    let f = |n: f64| {
        let k = (n + hue / 30.0).rem_euclid(12.0);
        let a = s * l.min(1.0 - l);
        (l - a * (k - 3.0).min(9.0 - k).clamp(-1.0, 1.0)) * 255.0
    };
    [f(0.0), f(8.0), f(4.0)]
}

fn rgb_to_hwb(r: f64, g: f64, b: f64) -> [f64; 3] {
    let hue = rgb_to_hsl(r, g, b)[0];
    let whiteness = r.min(g).min(b) / 255.0;
    let blackness = 1.0 - r.max(g).max(b) / 255.0;
    [hue, whiteness * 100.0, blackness * 100.0]
}

fn hwb_to_rgb(hue: f64, whiteness: f64, blackness: f64) -> [f64; 3] {
    let mut w = whiteness / 100.0;
    let mut b = blackness / 100.0;
    if w + b >= 1.0 {
        let gray = w / (w + b) * 255.0;
        return [gray, gray, gray];
    }
    let base = hsl_to_rgb(hue, 100.0, 50.0);
    let scale = 1.0 - w - b;
    w *= 255.0;
    b = scale;
    base.map(|c| c * b + w)
}

const WHITE_D65: [f64; 3] = [0.95047, 1.0, 1.08883];

fn to_linear(c: f64) -> f64 {
    let c = c / 255.0;
    if c <= 0.04045 { c / 12.92 } else { ((c + 0.055) / 1.055).powf(2.4) }
}

fn from_linear(c: f64) -> f64 {
    let v = if c <= 0.0031308 { c * 12.92 } else { 1.055 * c.powf(1.0 / 2.4) - 0.055 };
    v * 255.0
}

fn rgb_to_lab(r: f64, g: f64, b: f64) -> [f64; 3] {
    let (r, g, b) = (to_linear(r), to_linear(g), to_linear(b));
    let x = 0.4124564 * r + 0.3575761 * g + 0.1804375 * b;
    let y = 0.2126729 * r + 0.7151522 * g + 0.0721750 * b;
    let z = 0.0193339 * r + 0.1191920 * g + 0.9503041 * b;
    let f = |t: f64| {
        if t > 216.0 / 24389.0 { t.cbrt() } else { (24389.0 / 27.0 * t + 16.0) / 116.0 }
    };
    let fx = f(x / WHITE_D65[0]);
    let fy = f(y / WHITE_D65[1]);
    let fz = f(z / WHITE_D65[2]);
    [116.0 * fy - 16.0, 500.0 * (fx - fy), 200.0 * (fy - fz)]
}

fn lab_to_rgb([l, a, b]: [f64; 3]) -> [f64; 3] {
    let fy = (l + 16.0) / 116.0;
    let fx = fy + a / 500.0;
    let fz = fy - b / 200.0;
    let inv = |t: f64| {
        if t.powi(3) > 216.0 / 24389.0 { t.powi(3) } else { (116.0 * t - 16.0) / (24389.0 / 27.0) }
    };
    let x = inv(fx) * WHITE_D65[0];
    let y = inv(fy) * WHITE_D65[1];
    let z = inv(fz) * WHITE_D65[2];
    let r = 3.2404542 * x - 1.5371385 * y - 0.4985314 * z;
    let g = -0.9692660 * x + 1.8760108 * y + 0.0415560 * z;
    let bl = 0.0556434 * x - 0.2040259 * y + 1.0572252 * z;
    [from_linear(r), from_linear(g), from_linear(bl)]
}

fn lab_to_lch([l, a, b]: [f64; 3]) -> [f64; 3] {
    let chroma = (a * a + b * b).sqrt();
    let hue = if chroma < 1e-9 { 0.0 } else { b.atan2(a).to_degrees().rem_euclid(360.0) };
    [l, chroma, hue]
}

fn lch_to_lab([l, c, h]: [f64; 3]) -> [f64; 3] {
    let rad = h.to_radians();
    [l, c * rad.cos(), c * rad.sin()]
}

/// `(name, rgb, alpha)`
const NAMED_COLORS: &[(&str, [u8; 3], f64)] = &[
    ("black", [0, 0, 0], 1.0),
    ("white", [255, 255, 255], 1.0),
    ("red", [255, 0, 0], 1.0),
    ("green", [0, 128, 0], 1.0),
    ("blue", [0, 0, 255], 1.0),
    ("yellow", [255, 255, 0], 1.0),
    ("cyan", [0, 255, 255], 1.0),
    ("aqua", [0, 255, 255], 1.0),
    ("magenta", [255, 0, 255], 1.0),
    ("fuchsia", [255, 0, 255], 1.0),
    ("gray", [128, 128, 128], 1.0),
    ("grey", [128, 128, 128], 1.0),
    ("silver", [192, 192, 192], 1.0),
    ("maroon", [128, 0, 0], 1.0),
    ("olive", [128, 128, 0], 1.0),
    ("lime", [0, 255, 0], 1.0),
    ("teal", [0, 128, 128], 1.0),
    ("navy", [0, 0, 128], 1.0),
    ("purple", [128, 0, 128], 1.0),
    ("orange", [255, 165, 0], 1.0),
    ("pink", [255, 192, 203], 1.0),
    ("brown", [165, 42, 42], 1.0),
    ("gold", [255, 215, 0], 1.0),
    ("indigo", [75, 0, 130], 1.0),
    ("violet", [238, 130, 238], 1.0),
    ("coral", [255, 127, 80], 1.0),
    ("salmon", [250, 128, 114], 1.0),
    ("tomato", [255, 99, 71], 1.0),
    ("crimson", [220, 20, 60], 1.0),
    ("khaki", [240, 230, 140], 1.0),
    ("beige", [245, 245, 220], 1.0),
    ("ivory", [255, 255, 240], 1.0),
    ("lavender", [230, 230, 250], 1.0),
    ("rebeccapurple", [102, 51, 153], 1.0),
    ("transparent", [0, 0, 0], 0.0),
];
