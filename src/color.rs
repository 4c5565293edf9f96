//! Color math: hex/RGB conversions, CSS color parsing and WCAG contrast.

use std::fmt;

/// An opaque 8-bit RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// An RGB color with an alpha channel in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

/// Returned by [`parse_rgb_string`] for input it does not recognize.
pub const OPAQUE_BLACK: Rgba = Rgba { r: 0, g: 0, b: 0, a: 1.0 };

pub const WHITE: Rgb = Rgb { r: 255, g: 255, b: 255 };

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Lowercase `#rrggbb` form
    pub fn to_hex(self) -> String {
        rgb_to_hex(self.r, self.g, self.b)
    }
}

impl Rgba {
    pub fn rgb(self) -> Rgb {
        Rgb::new(self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Encode a color as `#rrggbb`.
pub fn rgb_to_hex(r: u8, g: u8, b: u8) -> String {
    format!("#{}", hex::encode([r, g, b]))
}

/// Parse `rgb(r, g, b)` or `rgba(r, g, b, a)`, returning `None` when the
/// string is not in either form.
pub fn try_parse_rgb(s: &str) -> Option<Rgba> {
    let s = s.trim();
    let rest = s.strip_prefix("rgba").or_else(|| s.strip_prefix("rgb"))?;
    let inner = rest.trim_start().strip_prefix('(')?.trim_end().strip_suffix(')')?;
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();

    let (r, g, b, a) = match parts.as_slice() {
        [r, g, b] => (r, g, b, None),
        [r, g, b, a] => (r, g, b, Some(a)),
        _ => return None,
    };

    let a = match a {
        Some(a) => a.parse::<f64>().ok().filter(|v| v.is_finite())?,
        None => 1.0,
    };

    Some(Rgba {
        r: channel(r)?,
        g: channel(g)?,
        b: channel(b)?,
        a,
    })
}

/// A numeric channel, rounded and clamped into `0..=255`
fn channel(s: &str) -> Option<u8> {
    let v = s.parse::<f64>().ok().filter(|v| v.is_finite())?;
    Some(v.round().clamp(0.0, 255.0) as u8)
}

/// Parse a CSS `rgb()`/`rgba()` string. Unrecognized input yields
/// [`OPAQUE_BLACK`]; callers treat that as "unparseable, assume opaque black".
pub fn parse_rgb_string(s: &str) -> Rgba {
    try_parse_rgb(s).unwrap_or(OPAQUE_BLACK)
}

/// Parse a 3- or 6-digit hex color, with or without the leading `#`.
pub fn parse_hex_color(s: &str) -> Option<Rgb> {
    let digits = s.trim();
    let digits = digits.strip_prefix('#').unwrap_or(digits);

    let expanded = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect::<String>(),
        6 => digits.to_string(),
        _ => return None,
    };

    let bytes = hex::decode(expanded).ok()?;
    Some(Rgb::new(bytes[0], bytes[1], bytes[2]))
}

/// True if `s` looks like a hex color this module can parse.
pub fn is_hex_color(s: &str) -> bool {
    let s = s.trim();
    s.starts_with('#') && parse_hex_color(s).is_some()
}

fn linear_channel(c: u8) -> f64 {
    let c = c as f64 / 255.0;
    if c <= 0.03928 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// WCAG relative luminance (BT.709 coefficients over linearized sRGB)
pub fn relative_luminance(c: Rgb) -> f64 {
    0.2126 * linear_channel(c.r) + 0.7152 * linear_channel(c.g) + 0.0722 * linear_channel(c.b)
}

/// WCAG contrast ratio, in `[1, 21]`. Symmetric in its arguments.
pub fn contrast_ratio(fg: Rgb, bg: Rgb) -> f64 {
    let l1 = relative_luminance(fg);
    let l2 = relative_luminance(bg);
    (l1.max(l2) + 0.05) / (l1.min(l2) + 0.05)
}
