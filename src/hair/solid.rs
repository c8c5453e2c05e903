//! Single-color hair.

use std::io::Read;

use super::{HairType, compact_color, compact_tokens, read_color_child};
use crate::color::{HsvColor, Rgb};
use crate::element::Element;
use crate::error::Result;
use crate::hashing::fnv1_hash;
use crate::settings::{FormatVersion, legacy};

/// Default colors by `dashes % 3`: blue, red, pink.
const DEFAULT_COLORS: [&str; 3] = ["44B7FF", "AC3232", "FF6DEF"];

/// Hair that is one color along its whole length.
#[derive(Debug, Clone, PartialEq)]
pub struct SolidHair {
    pub color: HsvColor,
}

impl Default for SolidHair {
    fn default() -> Self {
        Self::for_dash(0)
    }
}

impl SolidHair {
    pub const ID: &'static str = "Hyperline_SolidHair";
    pub const HASH: u32 = fnv1_hash(Self::ID);

    pub fn new(color: HsvColor) -> Self {
        Self { color }
    }

    /// Creates solid hair with the built-in color for a dash count.
    pub fn for_dash(dashes: usize) -> Self {
        Self::new(HsvColor::from_code_or_default(
            DEFAULT_COLORS[dashes % DEFAULT_COLORS.len()],
        ))
    }
}

impl HairType for SolidHair {
    fn display_name_key(&self) -> &str {
        "MODOPTIONS_HYPERLINE_SOLID"
    }

    fn id(&self) -> &str {
        Self::ID
    }

    fn hash(&self) -> u32 {
        Self::HASH
    }

    fn color_at_phase(&self, _original: Rgb, _phase: f32) -> Rgb {
        self.color.to_rgb()
    }

    fn clone_box(&self) -> Box<dyn HairType> {
        Box::new(self.clone())
    }

    fn create_default(&self) -> Box<dyn HairType> {
        Box::new(Self::default())
    }

    fn create_for_dash(&self, dashes: usize) -> Box<dyn HairType> {
        Box::new(Self::for_dash(dashes))
    }

    /// Format: `color`.
    fn parse_compact(&self, compact: &str) -> Box<dyn HairType> {
        let tokens = compact_tokens(compact);
        let color = compact_color(tokens.first().copied(), Self::default().color);
        Box::new(Self::new(color))
    }

    fn read_element(&mut self, element: &Element) {
        read_color_child(element, "color", &mut self.color);
    }

    fn write_element(&self, element: &mut Element) {
        element.add_text_child("color", self.color.to_hsv_string());
    }

    fn read_legacy(&mut self, reader: &mut dyn Read, _version: FormatVersion) -> Result<()> {
        self.color = legacy::read_color(reader)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_phase() {
        let hair = SolidHair::new("44B7FF".parse().unwrap());
        for phase in [0.0, 0.25, 0.5, 0.999] {
            assert_eq!(
                hair.color_at_phase(Rgb::new(1, 2, 3), phase),
                Rgb::new(0x44, 0xB7, 0xFF)
            );
        }
    }

    #[test]
    fn defaults_cycle_by_dash_count() {
        assert_eq!(SolidHair::for_dash(0).color.to_string(), "44B7FF");
        assert_eq!(SolidHair::for_dash(1).color.to_string(), "AC3232");
        assert_eq!(SolidHair::for_dash(2).color.to_string(), "FF6DEF");
        assert_eq!(SolidHair::for_dash(3).color.to_string(), "44B7FF");
        assert_eq!(SolidHair::for_dash(7).color.to_string(), "AC3232");
    }

    #[test]
    fn compact_string() {
        let proto = SolidHair::default();
        let parsed = proto.parse_compact("FF0000");
        assert_eq!(parsed.color_at_phase(Rgb::new(0, 0, 0), 0.0), Rgb::new(255, 0, 0));

        // Malformed input keeps the default
        let parsed = proto.parse_compact("zz");
        assert_eq!(
            parsed.color_at_phase(Rgb::new(0, 0, 0), 0.0),
            Rgb::new(0x44, 0xB7, 0xFF)
        );
    }

    #[test]
    fn element_round_trip() {
        let hair = SolidHair::new("12AB34".parse().unwrap());
        let mut e = Element::new(SolidHair::ID);
        hair.write_element(&mut e);
        assert_eq!(e.child_text("color"), Some(hair.color.to_hsv_string().as_str()));

        let mut read = SolidHair::default();
        read.read_element(&e);
        assert_eq!(read.color.to_hsv_string(), hair.color.to_hsv_string());
    }

    #[test]
    fn missing_color_keeps_current() {
        let mut hair = SolidHair::for_dash(1);
        hair.read_element(&Element::new(SolidHair::ID));
        assert_eq!(hair.color.to_string(), "AC3232");
    }
}
