//! Map-driven preset overrides.
//!
//! A level can switch the player to a preset for a while through a
//! [`HairColorTrigger`]. The preset is looked up in the [`PresetStore`]
//! once, when the trigger fires. A name that matches no preset still
//! activates the trigger but contributes nothing, even if a preset of that
//! name is saved later.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::preset::{Preset, PresetStore};

// ============================================================================
// TriggerManager
// ============================================================================

/// Tracks the preset currently forced by the map, if any.
#[derive(Debug, Clone, Default)]
pub struct TriggerManager {
    active: Option<ActiveTrigger>,
}

#[derive(Debug, Clone)]
struct ActiveTrigger {
    name: String,
    /// Snapshot taken when the trigger fired. `None` for unknown names.
    preset: Option<Preset>,
}

/// Session document, `<root><preset>NAME</preset></root>`.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename = "root")]
struct SessionDocument {
    #[serde(default)]
    preset: String,
}

impl TriggerManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Activates the named preset. An empty or missing name deactivates.
    ///
    /// The preset is copied out of `presets` now. Unknown names leave the
    /// trigger active with no preset.
    pub fn trigger(&mut self, preset: Option<&str>, presets: &PresetStore) {
        self.active = preset.filter(|name| !name.is_empty()).map(|name| {
            let preset = presets.get(name).cloned();
            if preset.is_some() {
                tracing::debug!("Hair trigger activated preset {name}");
            } else {
                tracing::warn!("Hair trigger names unknown preset {name}");
            }
            ActiveTrigger {
                name: name.to_string(),
                preset,
            }
        });
        if self.active.is_none() {
            tracing::debug!("Hair trigger cleared");
        }
    }

    /// Deactivates any override.
    pub fn reset(&mut self) {
        self.active = None;
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn current_preset_name(&self) -> Option<&str> {
        self.active.as_ref().map(|active| active.name.as_str())
    }

    /// The preset captured when the trigger fired.
    pub fn current_preset(&self) -> Option<&Preset> {
        self.active.as_ref()?.preset.as_ref()
    }

    /// Clears the override on a fresh level entry.
    ///
    /// Resuming from save data keeps whatever the session restored.
    pub fn on_level_entry(&mut self, enabled: bool, from_save_data: bool) {
        if enabled && !from_save_data {
            self.reset();
        }
    }

    // ========================================================================
    // Session Persistence
    // ========================================================================

    /// Restores the override from session data, looking the stored name up
    /// in `presets`.
    ///
    /// # Errors
    /// Returns an error if the document is not valid UTF-8 or XML.
    pub fn read_session(&mut self, data: &[u8], presets: &PresetStore) -> Result<()> {
        let text = String::from_utf8(data.to_vec())?;
        let text = text.trim_start_matches('\u{feff}');
        if text.trim().is_empty() {
            self.reset();
            return Ok(());
        }

        let document: SessionDocument = quick_xml::de::from_str(text)?;
        self.trigger(Some(document.preset.trim()), presets);
        Ok(())
    }

    /// Serializes the override for session data.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn write_session(&self) -> Result<Vec<u8>> {
        let document = SessionDocument {
            preset: self.current_preset_name().unwrap_or_default().to_string(),
        };
        Ok(quick_xml::se::to_string(&document)?.into_bytes())
    }
}

// ============================================================================
// HairColorTrigger
// ============================================================================

/// A map-authored trigger volume that switches presets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HairColorTrigger {
    /// Clear the override when the player leaves the volume.
    pub reset_on_leave: bool,
    /// Preset to activate on entry. Empty clears the override.
    pub preset: String,
}

impl HairColorTrigger {
    pub fn new(preset: impl Into<String>, reset_on_leave: bool) -> Self {
        Self {
            reset_on_leave,
            preset: preset.into(),
        }
    }

    pub fn on_enter(&self, manager: &mut TriggerManager, presets: &PresetStore) {
        manager.trigger(Some(&self.preset), presets);
    }

    pub fn on_leave(&self, manager: &mut TriggerManager) {
        if self.reset_on_leave {
            manager.reset();
        }
    }
}
