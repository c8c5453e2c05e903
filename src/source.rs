//! Layered lookup of per-dash configuration.
//!
//! A [`HairSource`] answers "which record governs this dash count". The
//! [`HairSourceChain`] asks each layer in priority order and the first
//! answer wins: an active map trigger before the player's own settings.

use crate::hair::HairType;
use crate::settings::{DEFAULT_HAIR_LENGTH, DashSettings, HyperlineSettings, MAX_DASH_COUNT};
use crate::trigger::TriggerManager;

/// Speed used when no layer has a record.
pub const DEFAULT_HAIR_SPEED: i32 = 0;
/// Phase used when no layer has a record.
pub const DEFAULT_HAIR_PHASE: i32 = 0;

/// Converts a host dash count into a record index.
pub(crate) fn dash_index(dashes: i32) -> Option<usize> {
    usize::try_from(dashes).ok().filter(|&d| d < MAX_DASH_COUNT)
}

// ============================================================================
// HairSource Trait
// ============================================================================

/// A layer that may provide the record for a dash count.
pub trait HairSource {
    /// Returns the record governing `dashes`, or `None` to defer.
    fn dash(&self, dashes: i32) -> Option<&DashSettings>;

    /// The selected hair of the governing record.
    fn hair(&self, dashes: i32) -> Option<&dyn HairType> {
        self.dash(dashes).and_then(DashSettings::selected_hair)
    }

    fn hair_length(&self, dashes: i32) -> i32 {
        self.dash(dashes).map_or(DEFAULT_HAIR_LENGTH, |d| d.hair_length)
    }

    fn hair_speed(&self, dashes: i32) -> i32 {
        self.dash(dashes).map_or(DEFAULT_HAIR_SPEED, |d| d.hair_speed)
    }

    fn hair_phase(&self, dashes: i32) -> i32 {
        self.dash(dashes).map_or(DEFAULT_HAIR_PHASE, |d| d.hair_phase)
    }
}

// ============================================================================
// Layers
// ============================================================================

/// The player's persisted settings.
#[derive(Debug, Clone, Copy)]
pub struct SettingsHairSource<'a> {
    settings: &'a HyperlineSettings,
}

impl<'a> SettingsHairSource<'a> {
    pub fn new(settings: &'a HyperlineSettings) -> Self {
        Self { settings }
    }
}

impl HairSource for SettingsHairSource<'_> {
    fn dash(&self, dashes: i32) -> Option<&DashSettings> {
        self.settings.dash(dash_index(dashes)?)
    }
}

/// The preset forced by an active map trigger.
///
/// Inactive triggers and names that matched no preset defer to the next
/// layer.
#[derive(Debug, Clone, Copy)]
pub struct TriggerHairSource<'a> {
    trigger: &'a TriggerManager,
}

impl<'a> TriggerHairSource<'a> {
    pub fn new(trigger: &'a TriggerManager) -> Self {
        Self { trigger }
    }
}

impl HairSource for TriggerHairSource<'_> {
    fn dash(&self, dashes: i32) -> Option<&DashSettings> {
        let preset = self.trigger.current_preset()?;
        preset.dashes.get(dash_index(dashes)?)
    }
}

// ============================================================================
// HairSourceChain
// ============================================================================

/// Layers consulted in priority order.
#[derive(Default)]
pub struct HairSourceChain<'a> {
    sources: Vec<Box<dyn HairSource + 'a>>,
}

impl<'a> HairSourceChain<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a layer with lower priority than every existing one.
    pub fn with_source(mut self, source: impl HairSource + 'a) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl HairSource for HairSourceChain<'_> {
    fn dash(&self, dashes: i32) -> Option<&DashSettings> {
        self.sources.iter().find_map(|source| source.dash(dashes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hair::SolidHair;
    use crate::preset::{Preset, PresetStore};
    use crate::test_support::builtin_registry;

    fn chain<'a>(trigger: &'a TriggerManager, settings: &'a HyperlineSettings) -> HairSourceChain<'a> {
        HairSourceChain::new()
            .with_source(TriggerHairSource::new(trigger))
            .with_source(SettingsHairSource::new(settings))
    }

    #[test]
    fn dash_index_bounds() {
        assert_eq!(dash_index(-1), None);
        assert_eq!(dash_index(0), Some(0));
        assert_eq!(dash_index(9), Some(9));
        assert_eq!(dash_index(10), None);
    }

    #[test]
    fn empty_chain_yields_defaults() {
        let chain = HairSourceChain::new();
        assert!(chain.dash(0).is_none());
        assert!(chain.hair(0).is_none());
        assert_eq!(chain.hair_length(0), 4);
        assert_eq!(chain.hair_speed(0), 0);
        assert_eq!(chain.hair_phase(0), 0);
    }

    #[test]
    fn trigger_layer_wins_when_resolved() {
        let registry = builtin_registry();
        let mut settings = HyperlineSettings::new(&registry);
        settings.dashes[1].hair_speed = 3;

        let mut preset = Preset::new(&registry);
        preset.dashes[1].hair_speed = 17;
        preset.dashes[1].set_hair_type(SolidHair::HASH);
        let mut presets = PresetStore::new("unused", "Hyperline/");
        presets.insert("Fast", preset);

        let mut trigger = TriggerManager::new();
        assert_eq!(chain(&trigger, &settings).hair_speed(1), 3);

        trigger.trigger(Some("Fast"), &presets);
        let active = chain(&trigger, &settings);
        assert_eq!(active.hair_speed(1), 17);
        assert_eq!(active.hair(1).map(|h| h.hash()), Some(SolidHair::HASH));
        drop(active);

        // Unknown names fall through to the settings layer
        trigger.trigger(Some("nonexistent"), &presets);
        let fallthrough = chain(&trigger, &settings);
        for dash in 0..10 {
            assert_eq!(fallthrough.dash(dash).map(|d| d.dash), Some(dash as usize));
        }
        assert_eq!(fallthrough.hair_speed(1), 3);
    }

    #[test]
    fn out_of_range_dashes_have_no_record() {
        let registry = builtin_registry();
        let settings = HyperlineSettings::new(&registry);
        let source = SettingsHairSource::new(&settings);
        assert!(source.dash(10).is_none());
        assert!(source.dash(-3).is_none());
        assert_eq!(source.hair_length(10), 4);
        assert_eq!(source.hair_length(2), 5);
    }
}
