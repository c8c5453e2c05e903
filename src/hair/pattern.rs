//! Repeating color pattern hair.

use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};

use super::{HairType, compact_color, compact_int, compact_tokens, read_clamped_child};
use crate::color::{HsvColor, Rgb};
use crate::element::Element;
use crate::error::Result;
use crate::hashing::fnv1_hash;
use crate::settings::{FormatVersion, legacy};

/// Number of color slots a pattern carries.
pub const MAX_PATTERN_COUNT: usize = 10;

/// Hair that splits each phase period into equal bands of flat color.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternHair {
    /// All color slots; only the first `count` are shown.
    pub colors: [HsvColor; MAX_PATTERN_COUNT],
    count: usize,
}

impl Default for PatternHair {
    fn default() -> Self {
        Self {
            colors: [HsvColor::default(); MAX_PATTERN_COUNT],
            count: 1,
        }
    }
}

impl PatternHair {
    pub const ID: &'static str = "Hyperline_PatternHair";
    pub const HASH: u32 = fnv1_hash(Self::ID);

    /// Creates a pattern from the given colors; extra colors are ignored.
    pub fn new(colors: &[HsvColor]) -> Self {
        let mut hair = Self::default();
        for (slot, color) in hair.colors.iter_mut().zip(colors) {
            *slot = *color;
        }
        hair.set_count(colors.len());
        hair
    }

    /// Number of active bands.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Sets the number of active bands, clamped to `[1, MAX_PATTERN_COUNT]`.
    pub fn set_count(&mut self, count: usize) {
        self.count = count.clamp(1, MAX_PATTERN_COUNT);
    }

    /// Index of the band containing `phase`.
    pub fn band_index(&self, phase: f32) -> usize {
        let index = (self.count as f32 * phase).max(0.0) as usize;
        index.min(self.count - 1)
    }
}

impl HairType for PatternHair {
    fn display_name_key(&self) -> &str {
        "MODOPTIONS_HYPERLINE_PATTERN"
    }

    fn id(&self) -> &str {
        Self::ID
    }

    fn hash(&self) -> u32 {
        Self::HASH
    }

    fn color_at_phase(&self, _original: Rgb, phase: f32) -> Rgb {
        self.colors[self.band_index(phase)].to_rgb()
    }

    fn clone_box(&self) -> Box<dyn HairType> {
        Box::new(self.clone())
    }

    fn create_default(&self) -> Box<dyn HairType> {
        Box::new(Self::default())
    }

    /// Format: `count,color1,color2,...`.
    fn parse_compact(&self, compact: &str) -> Box<dyn HairType> {
        let tokens = compact_tokens(compact);
        let mut hair = Self::default();
        if tokens.is_empty() {
            return Box::new(hair);
        }

        let count = compact_int(tokens.first().copied(), 1);
        hair.set_count(usize::try_from(count).unwrap_or(1));
        for i in 0..hair.count {
            if let Some(token) = tokens.get(i + 1) {
                hair.colors[i] = compact_color(Some(*token), hair.colors[i]);
            }
        }
        Box::new(hair)
    }

    fn read_element(&mut self, element: &Element) {
        let count = read_clamped_child(
            element,
            "patternCount",
            self.count as i32,
            1,
            MAX_PATTERN_COUNT as i32,
        );
        self.count = count as usize;

        for (slot, child) in self.colors.iter_mut().zip(element.children_named("color")) {
            slot.assign_from_str(child.text.trim(), false);
        }
    }

    fn write_element(&self, element: &mut Element) {
        element.add_text_child("patternCount", self.count);
        for color in &self.colors {
            element.add_text_child("color", color.to_hsv_string());
        }
    }

    /// An `i32` count, then all ten color slots.
    fn read_legacy(&mut self, reader: &mut dyn Read, _version: FormatVersion) -> Result<()> {
        let count = reader.read_i32::<LittleEndian>()?;
        self.set_count(usize::try_from(count).unwrap_or(1));
        for slot in &mut self.colors {
            *slot = legacy::read_color(reader)?;
        }
        Ok(())
    }
}
