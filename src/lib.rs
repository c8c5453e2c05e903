//! hyperline: layered hair color engine for a platformer's player character
//!
//! This crate resolves the color of every hair segment from a stack of
//! sources: a map-triggered preset, then the player's saved per-dash
//! settings, then the host's own color. Each dash count selects a pluggable
//! [`HairType`](hair::HairType) that maps a cyclic phase to a color.
//!
//! # Example
//!
//! ```
//! use hyperline::hair::RainbowHair;
//! use hyperline::{Hyperline, HyperlineOptions, Rgb};
//!
//! let mut hyperline = Hyperline::new(HyperlineOptions::new("settings"));
//!
//! // Rainbow hair for one dash
//! let dash = hyperline.settings_mut().dash_mut(1).unwrap();
//! dash.set_hair_type(RainbowHair::HASH);
//!
//! // Bangs are red at rest, later segments walk around the hue circle
//! let original = Rgb::new(0xAC, 0x32, 0x32);
//! assert_eq!(hyperline.current_color(original, 1, 0), Rgb::new(255, 0, 0));
//! assert_ne!(hyperline.current_color(original, 1, 2), Rgb::new(255, 0, 0));
//!
//! // Dash counts hyperline does not manage keep the host's color
//! assert_eq!(hyperline.current_color(original, 12, 0), original);
//! ```
//!
//! # Persistence
//!
//! Settings round-trip through an XML document. Binary files written by
//! older versions are detected by their header and migrated on read:
//!
//! ```
//! use hyperline::{Hyperline, HyperlineOptions};
//!
//! let mut hyperline = Hyperline::new(HyperlineOptions::new("settings"));
//! hyperline.settings_mut().dash_mut(0).unwrap().hair_speed = 10;
//!
//! let saved = hyperline.save_settings().unwrap();
//!
//! let mut restored = Hyperline::new(HyperlineOptions::new("settings"));
//! assert!(restored.load_settings(&saved));
//! assert_eq!(restored.settings().dashes[0].hair_speed, 10);
//! ```

pub mod color;
pub mod element;
pub mod error;
pub mod hair;
pub mod hashing;
pub mod host;
mod hyperline;
pub mod preset;
mod preview;
pub mod settings;
pub mod source;
pub mod trigger;

#[cfg(test)]
mod test_support;

pub use color::{HsvColor, Rgb};
pub use error::{Error, Result};
pub use hair::{BuiltinHair, HairType, HairTypeRegistry};
pub use host::{BundledAsset, PlayerHost, PlayerState, SpriteId, TextureAtlas, TextureId};
pub use hyperline::{
    DASH_FLASH_DURATION, FLASH_HAIR_COLOR, Hyperline, HyperlineOptions, MissingHairPolicy,
    strand_phase,
};
pub use preset::{Preset, PresetStore};
pub use preview::{PreviewOptions, render_strand_preview};
pub use settings::{DashSettings, HyperlineSettings};
pub use source::{HairSource, HairSourceChain};
pub use trigger::{HairColorTrigger, TriggerManager};
