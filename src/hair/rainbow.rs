//! Full-spectrum rainbow hair.

use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};

use super::{HairType, compact_int, compact_tokens, read_clamped_child};
use crate::color::{HsvColor, Rgb};
use crate::element::Element;
use crate::error::Result;
use crate::hashing::fnv1_hash;
use crate::settings::FormatVersion;

pub const MAX_LEVEL: i32 = 10;

/// Hair that sweeps the hue wheel once per phase period.
///
/// Saturation and value are slider levels in `[0, 10]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RainbowHair {
    pub saturation: i32,
    pub value: i32,
}

impl Default for RainbowHair {
    fn default() -> Self {
        Self {
            saturation: MAX_LEVEL,
            value: MAX_LEVEL,
        }
    }
}

impl RainbowHair {
    pub const ID: &'static str = "Hyperline_RainbowHair";
    pub const HASH: u32 = fnv1_hash(Self::ID);

    pub fn new(saturation: i32, value: i32) -> Self {
        Self {
            saturation: saturation.clamp(0, MAX_LEVEL),
            value: value.clamp(0, MAX_LEVEL),
        }
    }
}

impl HairType for RainbowHair {
    fn display_name_key(&self) -> &str {
        "MODOPTIONS_HYPERLINE_RAINBOW"
    }

    fn id(&self) -> &str {
        Self::ID
    }

    fn hash(&self) -> u32 {
        Self::HASH
    }

    fn color_at_phase(&self, _original: Rgb, phase: f32) -> Rgb {
        HsvColor::new(
            359.0 * phase,
            self.saturation as f32 / MAX_LEVEL as f32,
            self.value as f32 / MAX_LEVEL as f32,
        )
        .to_rgb()
    }

    fn clone_box(&self) -> Box<dyn HairType> {
        Box::new(self.clone())
    }

    fn create_default(&self) -> Box<dyn HairType> {
        Box::new(Self::default())
    }

    /// Format: `saturation[,value]`.
    fn parse_compact(&self, compact: &str) -> Box<dyn HairType> {
        let tokens = compact_tokens(compact);
        Box::new(Self::new(
            compact_int(tokens.first().copied(), MAX_LEVEL),
            compact_int(tokens.get(1).copied(), MAX_LEVEL),
        ))
    }

    fn read_element(&mut self, element: &Element) {
        self.saturation = read_clamped_child(element, "saturation", self.saturation, 0, MAX_LEVEL);
        self.value = read_clamped_child(element, "value", self.value, 0, MAX_LEVEL);
    }

    fn write_element(&self, element: &mut Element) {
        element.add_text_child("saturation", self.saturation);
        element.add_text_child("value", self.value);
    }

    /// Two `i32` levels: saturation, then value.
    fn read_legacy(&mut self, reader: &mut dyn Read, _version: FormatVersion) -> Result<()> {
        let saturation = reader.read_i32::<LittleEndian>()?;
        let value = reader.read_i32::<LittleEndian>()?;
        *self = Self::new(saturation, value);
        Ok(())
    }
}
