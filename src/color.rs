//! Hue/saturation/value color model with byte-exact RGB projection.
//!
//! [`HsvColor`] stores H in degrees and S/V as fractions, and keeps its RGB
//! projection up to date on every change. The projection uses the classic
//! six-sector formula with round-half-to-even, so converting any RGB triple
//! into HSV and back yields the same bytes.
//!
//! Two string encodings are supported:
//!
//! - `RRGGBB`: six hex digits.
//! - `HHHSSSVVV`: nine decimal digits, with S and V stored as percentages.

use std::fmt;
use std::ops::{Add, Mul, Sub};
use std::str::FromStr;

use palette::Srgb;
use thiserror::Error;

/// The 8-bit sRGB color exchanged with the host.
pub type Rgb = Srgb<u8>;

/// Pure white, used by the host for the dash flash.
pub const WHITE: Rgb = Rgb::new(255, 255, 255);

/// Pure black.
pub const BLACK: Rgb = Rgb::new(0, 0, 0);

// ============================================================================
// ColorParseError
// ============================================================================

/// Error returned when a color code cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    /// The code is neither 6 (RGB) nor 9 (HSV) characters long.
    #[error("invalid color code length {0}, expected 6 or 9")]
    InvalidLength(usize),

    /// The code has the right length but contains invalid digits.
    #[error("invalid digits in color code {0:?}")]
    InvalidDigits(String),
}

// ============================================================================
// HsvColor
// ============================================================================

/// A color expressed as hue, saturation and value.
///
/// `h` is in degrees (normally `[0, 360)`), `s` and `v` are normally in
/// `[0, 1]`. Arithmetic operators work component-wise and do not clamp;
/// the RGB projection clamps each channel to `[0, 255]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HsvColor {
    h: f32,
    s: f32,
    v: f32,
    rgb: Rgb,
}

impl Default for HsvColor {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

impl HsvColor {
    /// Creates a color from hue (degrees), saturation and value.
    pub fn new(h: f32, s: f32, v: f32) -> Self {
        Self {
            h,
            s,
            v,
            rgb: hsv_to_rgb(h, s, v),
        }
    }

    /// Creates a color from 8-bit RGB channels.
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        let (h, s, v) = rgb_to_hsv(r, g, b);
        Self::new(h, s, v)
    }

    /// Creates a color from the host's RGB type.
    pub fn from_color(color: Rgb) -> Self {
        Self::from_rgb(color.red, color.green, color.blue)
    }

    /// Creates a color from a color code, falling back to black on failure.
    ///
    /// Intended for compile-time defaults; user input should go through
    /// [`HsvColor::assign_from_str`] or [`str::parse`].
    pub fn from_code_or_default(code: &str) -> Self {
        code.parse().unwrap_or_default()
    }

    /// Hue in degrees.
    pub fn h(&self) -> f32 {
        self.h
    }

    /// Saturation as a fraction.
    pub fn s(&self) -> f32 {
        self.s
    }

    /// Value as a fraction.
    pub fn v(&self) -> f32 {
        self.v
    }

    /// Red channel of the RGB projection.
    pub fn r(&self) -> u8 {
        self.rgb.red
    }

    /// Green channel of the RGB projection.
    pub fn g(&self) -> u8 {
        self.rgb.green
    }

    /// Blue channel of the RGB projection.
    pub fn b(&self) -> u8 {
        self.rgb.blue
    }

    /// Returns the RGB projection of this color.
    pub fn to_rgb(&self) -> Rgb {
        self.rgb
    }

    /// Replaces all three components, recomputing the RGB projection.
    pub fn set_hsv(&mut self, h: f32, s: f32, v: f32) {
        *self = Self::new(h, s, v);
    }

    /// Replaces this color with the one described by `code`.
    ///
    /// Returns `false` and leaves the color untouched when the code is
    /// invalid. A warning is logged unless `quiet` is set.
    pub fn assign_from_str(&mut self, code: &str, quiet: bool) -> bool {
        match code.parse::<HsvColor>() {
            Ok(parsed) => {
                *self = parsed;
                true
            }
            Err(e) => {
                if !quiet {
                    tracing::warn!("Invalid color string {code:?}: {e}");
                }
                false
            }
        }
    }

    /// Formats the color as nine digits: `HHHSSSVVV`, S and V as percentages.
    pub fn to_hsv_string(&self) -> String {
        format!(
            "{:03}{:03}{:03}",
            self.h.round() as i32,
            (self.s * 100.0).round() as i32,
            (self.v * 100.0).round() as i32
        )
    }
}

impl fmt::Display for HsvColor {
    /// Formats the RGB projection as six uppercase hex digits.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02X}{:02X}{:02X}",
            self.rgb.red, self.rgb.green, self.rgb.blue
        )
    }
}

impl FromStr for HsvColor {
    type Err = ColorParseError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        let invalid = || ColorParseError::InvalidDigits(code.to_string());

        match code.len() {
            6 => {
                if !code.bytes().all(|b| b.is_ascii_hexdigit()) {
                    return Err(invalid());
                }
                let channel =
                    |range: std::ops::Range<usize>| u8::from_str_radix(&code[range], 16);
                let r = channel(0..2).map_err(|_| invalid())?;
                let g = channel(2..4).map_err(|_| invalid())?;
                let b = channel(4..6).map_err(|_| invalid())?;
                Ok(Self::from_rgb(r, g, b))
            }
            9 => {
                if !code.is_ascii() {
                    return Err(invalid());
                }
                let field = |range: std::ops::Range<usize>| code[range].parse::<i32>();
                let h = field(0..3).map_err(|_| invalid())?;
                let s = field(3..6).map_err(|_| invalid())?;
                let v = field(6..9).map_err(|_| invalid())?;
                Ok(Self::new(h as f32, s as f32 / 100.0, v as f32 / 100.0))
            }
            len => Err(ColorParseError::InvalidLength(len)),
        }
    }
}

impl From<HsvColor> for Rgb {
    fn from(color: HsvColor) -> Self {
        color.rgb
    }
}

impl From<Rgb> for HsvColor {
    fn from(color: Rgb) -> Self {
        Self::from_color(color)
    }
}

impl Add for HsvColor {
    type Output = HsvColor;

    fn add(self, rhs: Self) -> Self::Output {
        HsvColor::new(self.h + rhs.h, self.s + rhs.s, self.v + rhs.v)
    }
}

impl Sub for HsvColor {
    type Output = HsvColor;

    fn sub(self, rhs: Self) -> Self::Output {
        HsvColor::new(self.h - rhs.h, self.s - rhs.s, self.v - rhs.v)
    }
}

impl Mul<f32> for HsvColor {
    type Output = HsvColor;

    fn mul(self, rhs: f32) -> Self::Output {
        HsvColor::new(self.h * rhs, self.s * rhs, self.v * rhs)
    }
}

// ============================================================================
// Conversion Functions
// ============================================================================

/// Converts 8-bit RGB to (hue degrees, saturation, value).
///
/// Black maps to `(0, 0, 0)`; grays (zero chroma) get hue 0.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
    let r = f32::from(r) / 255.0;
    let g = f32::from(g) / 255.0;
    let b = f32::from(b) / 255.0;
    let min = r.min(g).min(b);
    let max = r.max(g).max(b);
    let delta = max - min;

    let v = max;
    let (mut h, mut s) = if max != 0.0 {
        let s = delta / max;
        let sector = if r == max {
            (g - b) / delta
        } else if g == max {
            2.0 + (b - r) / delta
        } else {
            4.0 + (r - g) / delta
        };
        let mut h = sector * 60.0;
        if h < 0.0 {
            h += 360.0;
        }
        (h, s)
    } else {
        (0.0, 0.0)
    };

    // Zero chroma divides by zero above
    if h.is_nan() {
        h = 0.0;
    }
    if s.is_nan() {
        s = 0.0;
    }

    (h, s, if v.is_nan() { 0.0 } else { v })
}

/// Converts (hue degrees, saturation, value) to 8-bit RGB.
///
/// Uses sector `floor(h / 60) mod 6`; channel values are rounded half to
/// even and clamped to `[0, 255]`.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> Rgb {
    let scaled = h / 60.0;
    let floor = scaled.floor();
    let sector = (floor as i64).rem_euclid(6);
    let f = scaled - floor;

    let vf = v * 255.0;
    let quantize = |x: f32| x.round_ties_even().clamp(0.0, 255.0) as u8;
    let v = quantize(vf);
    let p = quantize(vf * (1.0 - s));
    let q = quantize(vf * (1.0 - f * s));
    let t = quantize(vf * (1.0 - (1.0 - f) * s));

    match sector {
        0 => Rgb::new(v, t, p),
        1 => Rgb::new(q, v, p),
        2 => Rgb::new(p, v, t),
        3 => Rgb::new(p, q, v),
        4 => Rgb::new(t, p, v),
        _ => Rgb::new(v, p, q),
    }
}

// ============================================================================
// Tests
// ============================================================================
