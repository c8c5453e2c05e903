//! Pass-through hair that leaves the host's color alone.

use super::HairType;
use crate::color::Rgb;
use crate::element::Element;
use crate::hashing::fnv1_hash;
use crate::host::PlayerHost;
use crate::hyperline::Hyperline;

/// Hair that returns the host's own color. Selecting it turns hyperline off
/// for one dash count while keeping lengths and textures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultHair;

impl DefaultHair {
    pub const ID: &'static str = "Hyperline_DefaultHair";
    pub const HASH: u32 = fnv1_hash(Self::ID);
}

impl HairType for DefaultHair {
    fn display_name_key(&self) -> &str {
        "MODOPTIONS_HYPERLINE_DEFAULT"
    }

    fn id(&self) -> &str {
        Self::ID
    }

    fn hash(&self) -> u32 {
        Self::HASH
    }

    fn color_at_phase(&self, original: Rgb, _phase: f32) -> Rgb {
        original
    }

    fn clone_box(&self) -> Box<dyn HairType> {
        Box::new(*self)
    }

    fn create_default(&self) -> Box<dyn HairType> {
        Box::new(DefaultHair)
    }

    fn parse_compact(&self, _compact: &str) -> Box<dyn HairType> {
        Box::new(DefaultHair)
    }

    fn read_element(&mut self, _element: &Element) {}

    fn write_element(&self, _element: &mut Element) {}

    fn after_hair_update(&self, _hyperline: &Hyperline, _player: &mut dyn PlayerHost) {}

    fn player_update(&self, _hyperline: &Hyperline, player: &mut dyn PlayerHost) {
        player.set_override_hair_color(None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_original_through() {
        let original = Rgb::new(12, 34, 56);
        for phase in [0.0, 0.5, 0.99] {
            assert_eq!(DefaultHair.color_at_phase(original, phase), original);
        }
    }

    #[test]
    fn writes_nothing() {
        let mut e = Element::new(DefaultHair::ID);
        DefaultHair.write_element(&mut e);
        assert!(e.children.is_empty());
    }
}
