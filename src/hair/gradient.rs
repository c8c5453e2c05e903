//! Two-color gradient hair.

use std::io::Read;

use byteorder::ReadBytesExt;

use super::{
    HairType, compact_color, compact_tokens, read_bool_child, read_clamped_child,
    read_color_child,
};
use crate::color::{HsvColor, Rgb};
use crate::element::Element;
use crate::error::Result;
use crate::hashing::fnv1_hash;
use crate::settings::{FormatVersion, legacy};

pub const MIN_CYCLES: i32 = 1;
pub const MAX_CYCLES: i32 = 10;

/// Hair that blends between two colors along its length.
///
/// The blend runs `cycles` times per phase period. With `color_return` set
/// the ramp is folded so each cycle goes start, end, start.
#[derive(Debug, Clone, PartialEq)]
pub struct GradientHair {
    pub color1: HsvColor,
    pub color2: HsvColor,
    /// Interpolate RGB channels instead of H, S and V.
    pub rgb_mode: bool,
    pub cycles: i32,
    pub color_return: bool,
}

impl Default for GradientHair {
    fn default() -> Self {
        Self {
            color1: HsvColor::default(),
            color2: HsvColor::default(),
            rgb_mode: false,
            cycles: MIN_CYCLES,
            color_return: true,
        }
    }
}

impl GradientHair {
    pub const ID: &'static str = "Hyperline_GradientHair";
    pub const HASH: u32 = fnv1_hash(Self::ID);

    pub fn new(color1: HsvColor, color2: HsvColor) -> Self {
        Self {
            color1,
            color2,
            ..Self::default()
        }
    }

    pub fn with_rgb_mode(mut self, rgb_mode: bool) -> Self {
        self.rgb_mode = rgb_mode;
        self
    }

    pub fn with_cycles(mut self, cycles: i32) -> Self {
        self.cycles = cycles.clamp(MIN_CYCLES, MAX_CYCLES);
        self
    }

    pub fn with_color_return(mut self, color_return: bool) -> Self {
        self.color_return = color_return;
        self
    }

    /// Maps a phase onto the blend factor between the two colors.
    fn blend_factor(&self, phase: f32) -> f32 {
        let scaled = phase * self.cycles as f32;
        let t = scaled - scaled.trunc();
        if self.color_return {
            1.0 - (1.0 - 2.0 * t).abs()
        } else {
            t
        }
    }
}

impl HairType for GradientHair {
    fn display_name_key(&self) -> &str {
        "MODOPTIONS_HYPERLINE_GRADIENT"
    }

    fn id(&self) -> &str {
        Self::ID
    }

    fn hash(&self) -> u32 {
        Self::HASH
    }

    fn color_at_phase(&self, _original: Rgb, phase: f32) -> Rgb {
        let t = self.blend_factor(phase);

        if self.rgb_mode {
            let lerp = |a: u8, b: u8| (f32::from(a) + (f32::from(b) - f32::from(a)) * t) as u8;
            let (a, b) = (self.color1.to_rgb(), self.color2.to_rgb());
            return Rgb::new(
                lerp(a.red, b.red),
                lerp(a.green, b.green),
                lerp(a.blue, b.blue),
            );
        }

        let (a, b) = (self.color1, self.color2);
        HsvColor::new(
            a.h() + (b.h() - a.h()) * t,
            a.s() + (b.s() - a.s()) * t,
            a.v() + (b.v() - a.v()) * t,
        )
        .to_rgb()
    }

    fn clone_box(&self) -> Box<dyn HairType> {
        Box::new(self.clone())
    }

    fn create_default(&self) -> Box<dyn HairType> {
        Box::new(Self::default())
    }

    /// Format: `color1,color2[,rgb_mode]`. Fewer than two tokens yields defaults.
    fn parse_compact(&self, compact: &str) -> Box<dyn HairType> {
        let tokens = compact_tokens(compact);
        if tokens.len() < 2 {
            return Box::new(Self::default());
        }

        let defaults = Self::default();
        let mut hair = Self::new(
            compact_color(tokens.first().copied(), defaults.color1),
            compact_color(tokens.get(1).copied(), defaults.color2),
        );
        if let Some(token) = tokens.get(2) {
            match token.to_ascii_lowercase().as_str() {
                "true" => hair.rgb_mode = true,
                "false" => hair.rgb_mode = false,
                _ => tracing::warn!("Invalid rgb flag {token:?} in gradient hair string"),
            }
        }
        Box::new(hair)
    }

    fn read_element(&mut self, element: &Element) {
        read_color_child(element, "color1", &mut self.color1);
        read_color_child(element, "color2", &mut self.color2);
        self.cycles = read_clamped_child(element, "cycles", self.cycles, MIN_CYCLES, MAX_CYCLES);
        self.rgb_mode = read_bool_child(element, "doRgbGradient", self.rgb_mode);
        self.color_return = read_bool_child(element, "colorReturn", self.color_return);
    }

    fn write_element(&self, element: &mut Element) {
        element.add_text_child("color1", self.color1.to_hsv_string());
        element.add_text_child("color2", self.color2.to_hsv_string());
        element.add_bool_child("doRgbGradient", self.rgb_mode);
        element.add_text_child("cycles", self.cycles);
        element.add_bool_child("colorReturn", self.color_return);
    }

    /// Two colors, then an rgb-mode byte from 0.1.8 onward.
    fn read_legacy(&mut self, reader: &mut dyn Read, version: FormatVersion) -> Result<()> {
        self.color1 = legacy::read_color(reader)?;
        self.color2 = legacy::read_color(reader)?;
        if version.has_gradient_rgb_flag() {
            self.rgb_mode = reader.read_u8()? != 0;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGINAL: Rgb = Rgb::new(9, 9, 9);

    fn red_to_blue() -> GradientHair {
        GradientHair::new(
            HsvColor::from_rgb(255, 0, 0),
            HsvColor::from_rgb(0, 0, 255),
        )
    }

    #[test]
    fn ping_pong_is_symmetric() {
        let hair = red_to_blue();
        assert!(hair.color_return);
        assert_eq!(hair.cycles, 1);

        assert_eq!(
            hair.color_at_phase(ORIGINAL, 0.25),
            hair.color_at_phase(ORIGINAL, 0.75)
        );
        assert_eq!(hair.color_at_phase(ORIGINAL, 0.0), Rgb::new(255, 0, 0));
        assert_eq!(
            hair.color_at_phase(ORIGINAL, 0.0),
            hair.color_at_phase(ORIGINAL, 1.0)
        );
        // The fold peaks at the end color
        assert_eq!(hair.color_at_phase(ORIGINAL, 0.5), Rgb::new(0, 0, 255));
    }

    #[test]
    fn without_return_ramps_once() {
        let hair = red_to_blue().with_color_return(false).with_rgb_mode(true);
        assert_eq!(hair.color_at_phase(ORIGINAL, 0.0), Rgb::new(255, 0, 0));
        // 255 * 0.5 = 127.5, truncated
        assert_eq!(hair.color_at_phase(ORIGINAL, 0.5), Rgb::new(127, 0, 127));
    }

    #[test]
    fn rgb_mode_interpolates_channels() {
        let hair = GradientHair::new(
            HsvColor::from_rgb(0, 100, 200),
            HsvColor::from_rgb(200, 100, 0),
        )
        .with_rgb_mode(true)
        .with_color_return(false);

        assert_eq!(hair.color_at_phase(ORIGINAL, 0.25), Rgb::new(50, 100, 150));
    }

    #[test]
    fn hsv_mode_interpolates_components() {
        let hair = GradientHair::new(HsvColor::new(0.0, 1.0, 1.0), HsvColor::new(240.0, 1.0, 1.0))
            .with_color_return(false);
        // Halfway is hue 120
        assert_eq!(hair.color_at_phase(ORIGINAL, 0.5), Rgb::new(0, 255, 0));
    }

    #[test]
    fn cycles_repeat_the_ramp() {
        let hair = red_to_blue().with_cycles(2);
        assert_eq!(
            hair.color_at_phase(ORIGINAL, 0.125),
            hair.color_at_phase(ORIGINAL, 0.625)
        );
        assert_eq!(red_to_blue().with_cycles(50).cycles, MAX_CYCLES);
    }

    #[test]
    fn element_clamps_cycles() {
        let mut e = Element::new(GradientHair::ID);
        e.add_text_child("color1", "000100100");
        e.add_text_child("cycles", "0");
        e.add_text_child("doRgbGradient", "true");

        let mut hair = GradientHair::default();
        hair.read_element(&e);
        assert_eq!(hair.cycles, MIN_CYCLES);
        assert!(hair.rgb_mode);
        assert!(hair.color_return, "missing colorReturn keeps the default");
        assert_eq!(hair.color1.to_rgb(), Rgb::new(255, 0, 0));
    }

    #[test]
    fn element_round_trip() {
        let hair = red_to_blue().with_cycles(3).with_rgb_mode(true).with_color_return(false);
        let mut e = Element::new(GradientHair::ID);
        hair.write_element(&mut e);

        let mut read = GradientHair::default();
        read.read_element(&e);
        assert_eq!(read.cycles, 3);
        assert!(read.rgb_mode);
        assert!(!read.color_return);
        assert_eq!(read.color1.to_rgb(), hair.color1.to_rgb());
        assert_eq!(read.color2.to_rgb(), hair.color2.to_rgb());
    }

    #[test]
    fn compact_string() {
        let proto = GradientHair::default();

        let parsed = proto.parse_compact("FF0000,0000FF,true");
        assert_eq!(parsed.color_at_phase(ORIGINAL, 0.0), Rgb::new(255, 0, 0));
        assert_eq!(parsed.color_at_phase(ORIGINAL, 0.5), Rgb::new(0, 0, 255));

        // A single token is not enough
        let parsed = proto.parse_compact("FF0000");
        assert_eq!(parsed.color_at_phase(ORIGINAL, 0.0), Rgb::new(0, 0, 0));
    }
}
