//! The hyperline context and its frame hooks.

use std::path::PathBuf;

use crate::color::{BLACK, Rgb, WHITE};
use crate::hair::{BuiltinHair, HairType, HairTypeRegistry};
use crate::host::{BundledAsset, PlayerHost, PlayerState, SpriteId, TextureAtlas, TextureId};
use crate::preset::{Preset, PresetStore};
use crate::settings::{DEFAULT_HAIR_LENGTH, HyperlineSettings};
use crate::source::{
    HairSource, HairSourceChain, SettingsHairSource, TriggerHairSource, dash_index,
};
use crate::trigger::TriggerManager;

/// How long the hair flashes after the dash count changes, in seconds.
pub const DASH_FLASH_DURATION: f32 = 0.12;

/// Color of the hair during a dash flash.
pub const FLASH_HAIR_COLOR: Rgb = WHITE;

// ============================================================================
// Options
// ============================================================================

/// What [`Hyperline::current_color`] returns when no hair type resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingHairPolicy {
    /// Return the host's own color.
    #[default]
    PassThrough,
    /// Return black, making the gap obvious.
    Black,
}

/// Host-supplied configuration for [`Hyperline::new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HyperlineOptions {
    /// The host's settings directory.
    pub settings_root: PathBuf,
    /// Folder under `settings_root` holding user presets.
    pub preset_folder: String,
    /// Virtual path prefix of bundled presets.
    pub bundled_prefix: String,
    pub missing_hair_policy: MissingHairPolicy,
}

impl HyperlineOptions {
    pub fn new(settings_root: impl Into<PathBuf>) -> Self {
        Self {
            settings_root: settings_root.into(),
            preset_folder: "Hyperline".to_string(),
            bundled_prefix: "Hyperline/".to_string(),
            missing_hair_policy: MissingHairPolicy::default(),
        }
    }

    pub fn with_preset_folder(mut self, folder: impl Into<String>) -> Self {
        self.preset_folder = folder.into();
        self
    }

    pub fn with_bundled_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.bundled_prefix = prefix.into();
        self
    }

    pub fn with_missing_hair_policy(mut self, policy: MissingHairPolicy) -> Self {
        self.missing_hair_policy = policy;
        self
    }

    /// Directory user presets are loaded from and saved to.
    pub fn preset_dir(&self) -> PathBuf {
        self.settings_root.join(&self.preset_folder)
    }
}

// ============================================================================
// Phase
// ============================================================================

/// Position within one color cycle of strand segment `index`.
///
/// `phase` is added to the index before dividing by `length`, so it reads
/// as a shift measured in segments. Speed is in twentieths of a cycle per
/// second of `time`. The result is in `[0, 1)`.
pub fn strand_phase(index: usize, length: i32, phase: i32, speed: i32, time: f32) -> f32 {
    let length = length.max(1) as f32;
    let shift = ((index as f32 + phase as f32) / length).abs();
    let phase = shift + speed as f32 / 20.0 * time;
    phase - phase.floor()
}

// ============================================================================
// Hyperline
// ============================================================================

/// The hair color engine.
///
/// One instance lives for the whole process. The host creates it at load,
/// calls [`load_content`](Self::load_content) once assets are available,
/// forwards its frame events to the hook methods and calls
/// [`unload`](Self::unload) at shutdown.
///
/// # Example
///
/// ```
/// use hyperline::hair::SolidHair;
/// use hyperline::{Hyperline, HyperlineOptions, Rgb};
///
/// let mut hyperline = Hyperline::new(HyperlineOptions::new("settings"));
/// let dash = hyperline.settings_mut().dash_mut(0).unwrap();
/// dash.set_hair_type(SolidHair::HASH);
///
/// let color = hyperline.current_color(Rgb::new(0, 0, 0), 0, 0);
/// assert_eq!(color, Rgb::new(0x44, 0xB7, 0xFF));
/// ```
#[derive(Debug)]
pub struct Hyperline {
    options: HyperlineOptions,
    registry: HairTypeRegistry,
    settings: HyperlineSettings,
    presets: PresetStore,
    trigger: TriggerManager,

    /// Bangs color of the last rendered frame.
    last_color: Rgb,
    last_hair_length: i32,
    /// Seconds accumulated while hooked and enabled.
    time: f32,
    crown_sprite: Option<SpriteId>,
    flash_timer: f32,
    last_dashes: i32,
    clear_override: bool,
}

impl Hyperline {
    /// Creates the engine with the built-in hair types and default settings.
    pub fn new(options: HyperlineOptions) -> Self {
        let mut registry = HairTypeRegistry::new();
        for builtin in BuiltinHair::ALL {
            registry.register(builtin.prototype());
        }

        let settings = HyperlineSettings::new(&registry);
        let presets = PresetStore::new(options.preset_dir(), options.bundled_prefix.clone());

        Self {
            options,
            registry,
            settings,
            presets,
            trigger: TriggerManager::new(),
            last_color: BLACK,
            last_hair_length: DEFAULT_HAIR_LENGTH,
            time: 0.0,
            crown_sprite: None,
            flash_timer: 0.0,
            last_dashes: 0,
            clear_override: false,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn options(&self) -> &HyperlineOptions {
        &self.options
    }

    pub fn registry(&self) -> &HairTypeRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &HyperlineSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut HyperlineSettings {
        &mut self.settings
    }

    pub fn presets(&self) -> &PresetStore {
        &self.presets
    }

    pub fn trigger(&self) -> &TriggerManager {
        &self.trigger
    }

    pub fn trigger_mut(&mut self) -> &mut TriggerManager {
        &mut self.trigger
    }

    /// Bangs color of the last rendered frame.
    pub fn last_color(&self) -> Rgb {
        self.last_color
    }

    /// Seconds of animation time accumulated so far.
    pub fn elapsed(&self) -> f32 {
        self.time
    }

    pub fn is_flashing(&self) -> bool {
        self.flash_timer > 0.0
    }

    /// Turns the engine on or off.
    ///
    /// Turning it off clears the player's override color on the next
    /// [`player_update`](Self::player_update).
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.settings.enabled && !enabled {
            self.clear_override = true;
        }
        self.settings.enabled = enabled;
    }

    /// The layers consulted for a dash count, highest priority first.
    pub fn sources(&self) -> HairSourceChain<'_> {
        let mut chain = HairSourceChain::new();
        if self.settings.allow_map_hair_color {
            chain = chain.with_source(TriggerHairSource::new(&self.trigger));
        }
        chain.with_source(SettingsHairSource::new(&self.settings))
    }

    // ========================================================================
    // Color Resolution
    // ========================================================================

    /// Resolves the color of strand segment `index` for `dashes`.
    ///
    /// Dash counts outside the configured range return `original`. When no
    /// record or hair type resolves, the configured [`MissingHairPolicy`]
    /// decides.
    pub fn current_color(&self, original: Rgb, dashes: i32, index: usize) -> Rgb {
        if dash_index(dashes).is_none() {
            return original;
        }

        let sources = self.sources();
        let Some(dash) = sources.dash(dashes) else {
            return self.missing_hair(original);
        };

        let phase = strand_phase(index, dash.hair_length, dash.hair_phase, dash.hair_speed, self.time);
        match dash.selected_hair() {
            Some(hair) => hair.color_at_phase(original, phase),
            None => self.missing_hair(original),
        }
    }

    fn missing_hair(&self, original: Rgb) -> Rgb {
        match self.options.missing_hair_policy {
            MissingHairPolicy::PassThrough => original,
            MissingHairPolicy::Black => BLACK,
        }
    }

    // ========================================================================
    // Frame Hooks
    // ========================================================================

    /// Per-segment hair color query.
    pub fn hair_color(&mut self, original: Rgb, player: &mut dyn PlayerHost, index: usize) -> Rgb {
        if !self.settings.enabled {
            return original;
        }

        let dashes = player.dashes();
        let feather_off = !self.settings.do_feather_color && player.state() == PlayerState::StarFly;
        if dash_index(dashes).is_none() || feather_off {
            return original;
        }

        let color = self.current_color(original, dashes, index);
        if index == 0 {
            self.update_crown(player, color);
            self.last_color = color;
            let length = self.sources().hair_length(dashes);
            self.last_hair_length = length;
        }

        if self.is_flashing() && self.settings.do_dash_flash {
            return FLASH_HAIR_COLOR;
        }
        color
    }

    fn update_crown(&mut self, player: &mut dyn PlayerHost, color: Rgb) {
        if !self.settings.do_maddy_crown {
            return;
        }
        if self.crown_sprite.is_none() {
            self.crown_sprite = player.find_crown_sprite();
        }
        if let Some(sprite) = self.crown_sprite {
            player.tint_sprite(sprite, color);
        }
    }

    /// Texture override for strand segment `index`.
    ///
    /// `None` means the host draws its own texture.
    pub fn hair_texture(&self, dashes: i32, index: usize, hair_frame: usize) -> Option<TextureId> {
        if !self.settings.enabled {
            return None;
        }

        let sources = self.sources();
        let dash = sources.dash(dashes)?;
        let (textures, frame) = if index == 0 {
            (dash.hair_bangs.as_deref()?, hair_frame)
        } else {
            (dash.hair_textures.as_deref()?, index)
        };
        if textures.is_empty() {
            return None;
        }
        Some(textures[frame % textures.len()])
    }

    /// Runs after the host updates hair physics.
    pub fn after_hair_update(&mut self, player: &mut dyn PlayerHost, dt: f32) {
        let dashes = player.dashes();
        if !self.settings.enabled || dash_index(dashes).is_none() {
            return;
        }

        self.time += dt;
        self.crown_sprite = None;
        player.set_hair_count(match player.state() {
            PlayerState::RedDash => 1,
            PlayerState::StarFly => 7,
            _ => self.last_hair_length.max(1) as usize,
        });

        let sources = self.sources();
        match sources.hair(dashes) {
            Some(hair) => hair.after_hair_update(self, player),
            None => tracing::debug!("No hair type resolved for {dashes} dashes"),
        }
    }

    /// Runs at the start of each player update.
    pub fn player_update(&mut self, player: &mut dyn PlayerHost) {
        if self.settings.enabled {
            if !self.settings.do_feather_color && player.state() == PlayerState::StarFly {
                player.set_override_hair_color(None);
            } else {
                self.crown_sprite = None;
                let sources = self.sources();
                if let Some(hair) = sources.hair(player.dashes()) {
                    hair.player_update(self, player);
                }
            }
        }

        if self.clear_override {
            self.clear_override = false;
            player.set_override_hair_color(None);
        }
    }

    /// Advances the dash flash timer.
    ///
    /// A change in dash count restarts the flash.
    pub fn update_hair(&mut self, dashes: i32, dt: f32) {
        if !self.settings.enabled || dash_index(dashes).is_none() {
            return;
        }

        if self.last_dashes != dashes {
            self.flash_timer = DASH_FLASH_DURATION;
        }
        if self.flash_timer > 0.0 {
            self.flash_timer -= dt;
        }
        self.last_dashes = dashes;
    }

    /// Color of the dash trail.
    pub fn trail_color(&self, original: Rgb, dashes: i32) -> Rgb {
        if !self.settings.enabled {
            return original;
        }
        self.current_color(self.last_color, dashes, 0)
    }

    /// Color for dash particles, or `None` for the host's own.
    pub fn dash_particle_color(&self) -> Option<Rgb> {
        self.settings.enabled.then_some(self.last_color)
    }

    /// Color to draw the death effect in, or `None` to let the host draw it.
    pub fn death_effect_color(&mut self, player: &dyn PlayerHost) -> Option<Rgb> {
        if !self.settings.enabled
            || player.invisible_motion()
            || player.state() != PlayerState::Dead
        {
            return None;
        }
        self.crown_sprite = None;
        Some(self.last_color)
    }

    /// Forgets the cached crown sprite when a new player is added.
    pub fn on_player_added(&mut self) {
        self.crown_sprite = None;
    }

    /// Handles entering a level.
    pub fn on_level_enter(&mut self, from_save_data: bool) {
        self.trigger
            .on_level_entry(self.settings.enabled, from_save_data);
    }

    // ========================================================================
    // Session
    // ========================================================================

    /// Restores the trigger state from session data. Failures are logged.
    pub fn read_session(&mut self, data: &[u8]) {
        if let Err(e) = self.trigger.read_session(data, &self.presets) {
            tracing::error!("Failed to read session data: {e}");
            self.trigger.reset();
        }
    }

    /// Serializes the trigger state for session data.
    ///
    /// Returns an empty buffer if serialization fails.
    pub fn write_session(&self) -> Vec<u8> {
        self.trigger.write_session().unwrap_or_else(|e| {
            tracing::error!("Failed to write session data: {e}");
            Vec::new()
        })
    }

    // ========================================================================
    // Settings and Presets
    // ========================================================================

    /// Loads the save slot's settings. On failure the current settings stay.
    pub fn load_settings(&mut self, data: &[u8]) -> bool {
        match self.settings.read(data, &self.registry) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Failed to load settings: {e}");
                false
            }
        }
    }

    /// Serializes the settings for the save slot.
    pub fn save_settings(&self) -> Option<Vec<u8>> {
        self.settings
            .write()
            .inspect_err(|e| tracing::error!("Failed to save settings: {e}"))
            .ok()
    }

    /// Saves the current per-dash settings as a named preset.
    pub fn save_preset(&mut self, name: &str) -> bool {
        let preset = Preset::from_settings(&self.settings);
        match self.presets.save(name, preset) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Failed to save preset {name}: {e}");
                false
            }
        }
    }

    pub fn delete_preset(&mut self, name: &str) -> bool {
        match self.presets.delete(name) {
            Ok(()) => true,
            Err(e) => {
                tracing::error!("Failed to delete preset {name}: {e}");
                false
            }
        }
    }

    /// Copies a preset into the settings.
    pub fn apply_preset(&mut self, name: &str, atlas: &dyn TextureAtlas) -> bool {
        match self
            .presets
            .apply(name, &mut self.settings, &self.registry, atlas)
        {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to apply preset {name}: {e}");
                false
            }
        }
    }

    // ========================================================================
    // Plugin Exports
    // ========================================================================

    /// Registers a hair type from another plugin.
    ///
    /// Every existing dash record gets a fresh instance so the type can be
    /// selected right away. Returns `false` if the id was already taken.
    pub fn add_hair_type(&mut self, hair: Box<dyn HairType>) -> bool {
        let hash = hair.hash();
        if !self.registry.register(hair) {
            return false;
        }

        if let Some(prototype) = self.registry.get(hash) {
            for dash in &mut self.settings.dashes {
                dash.hair_list
                    .entry(hash)
                    .or_insert_with(|| prototype.create_for_dash(dash.dash));
            }
        }
        true
    }

    /// Forces a preset by name, or clears the override with `None`.
    pub fn set_trigger_preset(&mut self, preset: Option<&str>) {
        self.trigger.trigger(preset, &self.presets);
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Resolves textures and loads every preset.
    pub fn load_content(&mut self, bundled: &[BundledAsset], atlas: &dyn TextureAtlas) {
        self.settings.load_textures(atlas);
        let count =
            self.presets
                .load_all(bundled, &self.registry, self.settings.hair_length_soft_cap);
        self.presets.load_textures(atlas);
        tracing::info!("Loaded {count} presets");
    }

    /// Clears per-session state.
    pub fn unload(&mut self) {
        self.trigger.reset();
        self.time = 0.0;
        self.crown_sprite = None;
        self.flash_timer = 0.0;
        self.last_dashes = 0;
        self.clear_override = false;
    }
}
