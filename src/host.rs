//! Interfaces the host game implements for hyperline.
//!
//! Hyperline never touches engine objects directly. The host integration
//! layer wraps its player, texture atlas and content loader in these traits
//! and passes them into the frame hooks on [`Hyperline`](crate::Hyperline).

use crate::color::Rgb;

/// Player state machine states that hyperline reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerState {
    /// Red-bubble dash; the hair collapses to a single segment.
    RedDash,
    /// Death animation.
    Dead,
    /// Feather flight; the hair is drawn with seven segments.
    StarFly,
    /// Any other state, by its raw index.
    Other(i32),
}

impl PlayerState {
    /// Maps the host's raw state index.
    pub fn from_index(index: i32) -> Self {
        match index {
            5 => Self::RedDash,
            14 => Self::Dead,
            19 => Self::StarFly,
            n => Self::Other(n),
        }
    }

    pub fn index(self) -> i32 {
        match self {
            Self::RedDash => 5,
            Self::Dead => 14,
            Self::StarFly => 19,
            Self::Other(n) => n,
        }
    }
}

/// Opaque handle to a sprite component owned by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteId(pub u32);

/// Opaque handle to a texture owned by the host's atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

/// The player entity as seen by the frame hooks.
pub trait PlayerHost {
    /// Current dash count.
    fn dashes(&self) -> i32;

    /// Current state machine state.
    fn state(&self) -> PlayerState;

    /// Sets the live hair color used by hair physics and rendering.
    fn set_hair_color(&mut self, color: Rgb);

    /// Sets or clears the override color consumed by other player effects.
    fn set_override_hair_color(&mut self, color: Option<Rgb>);

    /// Sets the number of rendered hair segments.
    fn set_hair_count(&mut self, count: usize);

    /// Finds a sprite on the player that has a `crown` animation.
    fn find_crown_sprite(&self) -> Option<SpriteId> {
        None
    }

    /// Tints a sprite previously returned by [`find_crown_sprite`](Self::find_crown_sprite).
    fn tint_sprite(&mut self, _sprite: SpriteId, _color: Rgb) {}

    /// Whether the invisible-motion assist is on.
    fn invisible_motion(&self) -> bool {
        false
    }
}

/// Read access to the host's game texture atlas.
pub trait TextureAtlas {
    /// Whether a texture exists at exactly this path.
    fn has(&self, path: &str) -> bool;

    /// All animation frames stored under a path prefix, in frame order.
    fn subtextures(&self, path: &str) -> Vec<TextureId>;
}

/// A file shipped inside a content package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundledAsset {
    /// Virtual path inside the package, using `/` separators.
    pub path_virtual: String,
    pub data: Vec<u8>,
}

impl BundledAsset {
    pub fn new(path_virtual: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            path_virtual: path_virtual.into(),
            data: data.into(),
        }
    }
}
