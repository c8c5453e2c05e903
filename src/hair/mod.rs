//! Hair color strategies.
//!
//! A hair type maps a cyclic phase in `[0, 1)` to a color. Every type is
//! identified by a stable string id and the FNV-1 hash of that id; the hash
//! is what save files and presets store. Built-in types are listed in
//! [`BuiltinHair`]; other plugins add their own by implementing [`HairType`]
//! and registering it through [`Hyperline::add_hair_type`](crate::Hyperline::add_hair_type).
//!
//! # Example
//!
//! ```
//! use hyperline::hair::{HairType, RainbowHair};
//! use hyperline::Rgb;
//!
//! let rainbow = RainbowHair::default();
//! let color = rainbow.color_at_phase(Rgb::new(0, 0, 0), 0.0);
//! assert_eq!(color, Rgb::new(255, 0, 0));
//! ```

mod default;
mod gradient;
mod pattern;
mod rainbow;
mod registry;
mod solid;

use std::fmt;
use std::io::Read;

pub use default::DefaultHair;
pub use gradient::GradientHair;
pub use pattern::PatternHair;
pub use rainbow::RainbowHair;
pub use registry::{HairList, HairTypeRegistry};
pub use solid::SolidHair;

use crate::color::{HsvColor, Rgb};
use crate::element::Element;
use crate::error::Result;
use crate::host::{PlayerHost, PlayerState};
use crate::hyperline::Hyperline;
use crate::settings::FormatVersion;

// ============================================================================
// HairType Trait
// ============================================================================

/// A pluggable hair color strategy.
///
/// Implementations own their configuration. [`color_at_phase`](Self::color_at_phase)
/// must depend only on that configuration and its arguments; all time
/// dependence is folded into the phase by the caller.
pub trait HairType: fmt::Debug {
    /// Localization key of the display name.
    fn display_name_key(&self) -> &str;

    /// Stable id, conventionally `ModName_TypeName`.
    fn id(&self) -> &str;

    /// FNV-1 hash of [`id`](Self::id).
    ///
    /// Built-in types return a precomputed constant.
    fn hash(&self) -> u32 {
        crate::hashing::fnv1_hash(self.id())
    }

    /// Computes the color of a hair segment at `phase` in `[0, 1)`.
    ///
    /// `original` is the color the host would have drawn.
    fn color_at_phase(&self, original: Rgb, phase: f32) -> Rgb;

    /// Deep-copies this instance and its configuration.
    fn clone_box(&self) -> Box<dyn HairType>;

    /// Creates a fresh, default-configured instance.
    fn create_default(&self) -> Box<dyn HairType>;

    /// Creates a fresh instance whose defaults may depend on the dash count.
    fn create_for_dash(&self, _dashes: usize) -> Box<dyn HairType> {
        self.create_default()
    }

    /// Creates an instance from a comma-separated compact string.
    ///
    /// Malformed or short input yields defaults for the missing parts; this
    /// never fails. The format never uses `;`.
    fn parse_compact(&self, compact: &str) -> Box<dyn HairType>;

    /// Reads configuration from named child elements.
    ///
    /// Missing children keep their current value; out-of-range numbers are
    /// clamped.
    fn read_element(&mut self, element: &Element);

    /// Writes configuration as named child elements of `element`.
    fn write_element(&self, element: &mut Element);

    /// Reads the configuration blob of a legacy binary settings file.
    fn read_legacy(&mut self, _reader: &mut dyn Read, _version: FormatVersion) -> Result<()> {
        Ok(())
    }

    /// Runs after the host updates hair physics.
    ///
    /// The default writes the resolved bangs color into the live hair color,
    /// unless the player is flying with feather coloring disabled.
    fn after_hair_update(&self, hyperline: &Hyperline, player: &mut dyn PlayerHost) {
        if player.state() == PlayerState::StarFly && !hyperline.settings().do_feather_color {
            return;
        }
        let color = hyperline.current_color(hyperline.last_color(), player.dashes(), 0);
        player.set_hair_color(color);
    }

    /// Runs at the start of each player update.
    ///
    /// The default publishes the resolved bangs color as the override color.
    fn player_update(&self, hyperline: &Hyperline, player: &mut dyn PlayerHost) {
        let color = hyperline.current_color(hyperline.last_color(), player.dashes(), 0);
        player.set_override_hair_color(Some(color));
    }
}

impl Clone for Box<dyn HairType> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

// ============================================================================
// Built-in Types
// ============================================================================

/// The hair types that ship with hyperline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinHair {
    Gradient,
    Pattern,
    Solid,
    Rainbow,
    Default,
}

impl BuiltinHair {
    /// Registration order.
    pub const ALL: [BuiltinHair; 5] = [
        BuiltinHair::Gradient,
        BuiltinHair::Pattern,
        BuiltinHair::Solid,
        BuiltinHair::Rainbow,
        BuiltinHair::Default,
    ];

    /// Fixed type table of settings files up to version 0.1.15, indexed by
    /// the stored type byte.
    pub const LEGACY_LAYOUT: [BuiltinHair; 3] = [
        BuiltinHair::Gradient,
        BuiltinHair::Pattern,
        BuiltinHair::Solid,
    ];

    pub const fn id(self) -> &'static str {
        match self {
            BuiltinHair::Gradient => GradientHair::ID,
            BuiltinHair::Pattern => PatternHair::ID,
            BuiltinHair::Solid => SolidHair::ID,
            BuiltinHair::Rainbow => RainbowHair::ID,
            BuiltinHair::Default => DefaultHair::ID,
        }
    }

    pub const fn hash(self) -> u32 {
        match self {
            BuiltinHair::Gradient => GradientHair::HASH,
            BuiltinHair::Pattern => PatternHair::HASH,
            BuiltinHair::Solid => SolidHair::HASH,
            BuiltinHair::Rainbow => RainbowHair::HASH,
            BuiltinHair::Default => DefaultHair::HASH,
        }
    }

    /// Looks a built-in up by its stable hash.
    pub fn from_hash(hash: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.hash() == hash)
    }

    /// Creates the registry prototype for this type.
    pub fn prototype(self) -> Box<dyn HairType> {
        match self {
            BuiltinHair::Gradient => Box::new(GradientHair::default()),
            BuiltinHair::Pattern => Box::new(PatternHair::default()),
            BuiltinHair::Solid => Box::new(SolidHair::default()),
            BuiltinHair::Rainbow => Box::new(RainbowHair::default()),
            BuiltinHair::Default => Box::new(DefaultHair),
        }
    }
}

// ============================================================================
// Shared Helpers
// ============================================================================

/// Reads a color child into `color`, keeping the old value on failure.
pub(crate) fn read_color_child(element: &Element, name: &str, color: &mut HsvColor) {
    if let Some(text) = element.child_text(name) {
        color.assign_from_str(text, false);
    }
}

/// Reads an integer child clamped to `[min, max]`, keeping `current` when
/// the child is absent or unparseable.
pub(crate) fn read_clamped_child(
    element: &Element,
    name: &str,
    current: i32,
    min: i32,
    max: i32,
) -> i32 {
    let value = match element.child_parsed::<i32>(name) {
        Some(Ok(v)) => v,
        Some(Err(_)) => {
            tracing::warn!("Invalid integer in <{name}>, keeping {current}");
            current
        }
        None => current,
    };
    value.clamp(min, max)
}

/// Reads a boolean child, keeping `current` when absent or invalid.
pub(crate) fn read_bool_child(element: &Element, name: &str, current: bool) -> bool {
    element.child_bool(name).unwrap_or(current)
}

/// Splits a compact hair string into trimmed comma-separated tokens.
pub(crate) fn compact_tokens(compact: &str) -> Vec<&str> {
    if compact.trim().is_empty() {
        return Vec::new();
    }
    compact.split(',').map(str::trim).collect()
}

/// Parses a compact color token, falling back to `fallback`.
pub(crate) fn compact_color(token: Option<&str>, fallback: HsvColor) -> HsvColor {
    let mut color = fallback;
    if let Some(token) = token {
        color.assign_from_str(token, false);
    }
    color
}

/// Parses a compact integer token, falling back to `fallback`.
pub(crate) fn compact_int(token: Option<&str>, fallback: i32) -> i32 {
    match token {
        Some(token) => token.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid number {token:?} in compact hair string");
            fallback
        }),
        None => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_ids_and_hashes_agree() {
        for builtin in BuiltinHair::ALL {
            let prototype = builtin.prototype();
            assert_eq!(prototype.id(), builtin.id());
            assert_eq!(prototype.hash(), builtin.hash());
            assert_eq!(prototype.hash(), crate::hashing::fnv1_hash(builtin.id()));
            assert_eq!(BuiltinHair::from_hash(builtin.hash()), Some(builtin));
        }
        assert_eq!(BuiltinHair::from_hash(0xdead_beef), None);
    }

    #[test]
    fn boxed_clone_is_deep() {
        let original: Box<dyn HairType> = Box::new(SolidHair::new("AC3232".parse().unwrap()));
        let copy = original.clone();
        assert_eq!(copy.id(), original.id());
        assert_eq!(
            copy.color_at_phase(Rgb::new(0, 0, 0), 0.0),
            Rgb::new(0xAC, 0x32, 0x32)
        );
    }

    #[test]
    fn compact_token_helpers() {
        assert!(compact_tokens("").is_empty());
        assert_eq!(compact_tokens("3, a ,b"), vec!["3", "a", "b"]);
        assert_eq!(compact_int(Some("x"), 7), 7);
        assert_eq!(compact_int(Some("4"), 7), 4);
        assert_eq!(compact_int(None, 7), 7);

        let fallback = HsvColor::from_rgb(1, 2, 3);
        assert_eq!(compact_color(Some("FF0000"), fallback).to_rgb(), Rgb::new(255, 0, 0));
        assert_eq!(compact_color(Some("nope"), fallback), fallback);
        assert_eq!(compact_color(None, fallback), fallback);
    }

    #[test]
    fn clamped_child_reading() {
        let mut e = Element::new("hair");
        e.add_text_child("cycles", "99");
        e.add_text_child("bad", "x");
        assert_eq!(read_clamped_child(&e, "cycles", 1, 1, 10), 10);
        assert_eq!(read_clamped_child(&e, "bad", 3, 1, 10), 3);
        assert_eq!(read_clamped_child(&e, "missing", 5, 1, 10), 5);
    }
}
