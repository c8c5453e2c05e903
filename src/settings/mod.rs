//! Persisted per-save hair settings.
//!
//! [`HyperlineSettings`] holds the global toggles and one [`DashSettings`]
//! record per dash count. The current on-disk form is an XML document:
//!
//! ```xml
//! <root>
//!   <version>0.3.4</version>
//!   <enabled>true</enabled>
//!   ...
//!   <dashes>
//!     <dash count="0">
//!       <hairLength>4</hairLength>
//!       ...
//!       <type>Hyperline_SolidHair</type>
//!       <types>
//!         <Hyperline_SolidHair><color>202075100</color></Hyperline_SolidHair>
//!       </types>
//!     </dash>
//!   </dashes>
//! </root>
//! ```
//!
//! Older binary files are detected by their magic header and migrated by
//! [`legacy`].

pub mod legacy;

use std::fmt;

use crate::element::Element;
use crate::error::Result;
use crate::hair::{DefaultHair, HairList, HairType, HairTypeRegistry, SolidHair};
use crate::hashing::fnv1_hash;
use crate::host::{TextureAtlas, TextureId};

// ============================================================================
// Constants
// ============================================================================

/// Number of dash counts hyperline configures (0 through 9).
pub const MAX_DASH_COUNT: usize = 10;

pub const MIN_HAIR_LENGTH: i32 = 1;
/// Upper bound of the configurable length soft cap.
pub const MAX_HAIR_LENGTH: i32 = 1000;
pub const DEFAULT_HAIR_LENGTH: i32 = 4;
pub const DEFAULT_HAIR_LENGTH_SOFT_CAP: i32 = 100;

pub const MIN_HAIR_SPEED: i32 = -40;
pub const MAX_HAIR_SPEED: i32 = 40;

pub const MIN_HAIR_PHASE: i32 = 0;
pub const MAX_HAIR_PHASE: i32 = 100;

/// Version written into new settings files.
pub const CURRENT_VERSION: FormatVersion = FormatVersion::new(0, 3, 4);

/// Atlas folder that custom hair textures are looked up in.
pub const TEXTURE_ROOT: &str = "hyperline/";

pub(crate) fn clamp_speed(speed: i32) -> i32 {
    speed.clamp(MIN_HAIR_SPEED, MAX_HAIR_SPEED)
}

// ============================================================================
// FormatVersion
// ============================================================================

/// A settings file format version, `major.minor.sub`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FormatVersion {
    pub major: u8,
    pub minor: u8,
    pub sub: u8,
}

impl FormatVersion {
    pub const fn new(major: u8, minor: u8, sub: u8) -> Self {
        Self { major, minor, sub }
    }

    /// Whether this binary version uses the fixed three-type layout.
    pub fn uses_fixed_layout(self) -> bool {
        self.major == 0 && self.minor <= 1 && self.sub <= 15
    }

    /// Whether legacy gradient blobs carry the rgb-mode byte.
    pub fn has_gradient_rgb_flag(self) -> bool {
        self.minor >= 1 && self.sub >= 8
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.sub)
    }
}

// ============================================================================
// DashSettings
// ============================================================================

/// Hair configuration for one dash count.
///
/// `hair_list` holds a live instance of every registered hair type, so edits
/// to a type survive switching the selection away and back.
#[derive(Debug, Clone)]
pub struct DashSettings {
    /// The dash count this record configures.
    pub dash: usize,
    /// Stable hash of the selected hair type.
    pub hair_type: u32,
    /// Animation speed in twentieths of a cycle per second.
    pub hair_speed: i32,
    /// Number of segments one color cycle spans.
    pub hair_length: i32,
    /// Strand offset added before dividing by the length.
    pub hair_phase: i32,
    /// Atlas name of the custom hair texture, relative to [`TEXTURE_ROOT`].
    pub hair_texture_source: String,
    /// Atlas name of the custom bangs texture, relative to [`TEXTURE_ROOT`].
    pub hair_bangs_source: String,
    /// Resolved hair texture frames; `None` draws the host's texture.
    pub hair_textures: Option<Vec<TextureId>>,
    /// Resolved bangs texture frames; `None` draws the host's texture.
    pub hair_bangs: Option<Vec<TextureId>>,
    pub hair_list: HairList,
    /// Id read from disk that did not resolve to a registered type.
    unresolved_type_id: Option<String>,
}

impl DashSettings {
    /// Creates the default record for a dash count.
    pub fn new(dash: usize, registry: &HairTypeRegistry) -> Self {
        Self {
            dash,
            hair_type: DefaultHair::HASH,
            hair_speed: 0,
            hair_length: if dash < 2 { 4 } else { 5 },
            hair_phase: 0,
            hair_texture_source: String::new(),
            hair_bangs_source: String::new(),
            hair_textures: None,
            hair_bangs: None,
            hair_list: registry.clone_all_for_dash(dash),
            unresolved_type_id: None,
        }
    }

    /// Selects a hair type by hash.
    pub fn set_hair_type(&mut self, hash: u32) {
        self.hair_type = hash;
        self.unresolved_type_id = None;
    }

    /// Id of the selected type as it will be written to disk.
    pub fn hair_type_id(&self) -> &str {
        if let Some(hair) = self.hair_list.get(&self.hair_type) {
            return hair.id();
        }
        self.unresolved_type_id.as_deref().unwrap_or(SolidHair::ID)
    }

    /// The live instance of the selected type.
    ///
    /// An unknown selection resolves to this record's solid hair.
    pub fn selected_hair(&self) -> Option<&dyn HairType> {
        self.hair_list
            .get(&self.hair_type)
            .or_else(|| self.hair_list.get(&SolidHair::HASH))
            .map(|h| h.as_ref())
    }

    /// Mutable access to the live instance of the type with `hash`.
    pub fn hair_mut(&mut self, hash: u32) -> Option<&mut Box<dyn HairType>> {
        self.hair_list.get_mut(&hash)
    }

    /// Reads a `<dash>` element.
    ///
    /// Absent fields keep their current values. Out-of-range numbers fall
    /// back or clamp with a warning. Unknown `types` children are dropped.
    pub fn read_element(
        &mut self,
        element: &Element,
        registry: &HairTypeRegistry,
        length_soft_cap: i32,
    ) {
        match element.child_parsed::<i32>("hairLength") {
            Some(Ok(length)) if (MIN_HAIR_LENGTH..=length_soft_cap).contains(&length) => {
                self.hair_length = length;
            }
            Some(Ok(length)) => {
                tracing::warn!(
                    "Hair length {length} for dash {} outside [{MIN_HAIR_LENGTH}, {length_soft_cap}], using {DEFAULT_HAIR_LENGTH}",
                    self.dash
                );
                self.hair_length = DEFAULT_HAIR_LENGTH;
            }
            Some(Err(_)) => {
                tracing::warn!("Invalid hair length for dash {}", self.dash);
            }
            None => {
                tracing::warn!("Settings XML missing hair length for dash {}", self.dash);
            }
        }

        self.hair_speed = self.read_ranged(element, "hairSpeed", self.hair_speed, MIN_HAIR_SPEED, MAX_HAIR_SPEED);
        self.hair_phase = self.read_ranged(element, "hairPhase", self.hair_phase, MIN_HAIR_PHASE, MAX_HAIR_PHASE);

        if let Some(bangs) = element.child_text("bangsTexture") {
            self.hair_bangs_source = bangs.to_string();
        }
        if let Some(texture) = element.child_text("hairTexture") {
            self.hair_texture_source = texture.to_string();
        }

        let chosen = element.child_text("type").unwrap_or(SolidHair::ID);
        let chosen_hash = fnv1_hash(chosen);
        self.hair_type = chosen_hash;
        if registry.contains(chosen_hash) {
            self.unresolved_type_id = None;
        } else {
            tracing::error!(
                "Settings chose hair type {chosen} for dash {}, which is not registered",
                self.dash
            );
            self.unresolved_type_id = Some(chosen.to_string());
        }

        let Some(types) = element.child("types") else {
            tracing::warn!("Settings XML missing types for dash {}", self.dash);
            return;
        };

        for type_element in &types.children {
            let hash = fnv1_hash(&type_element.name);
            if let Some(hair) = self.hair_list.get_mut(&hash) {
                hair.read_element(type_element);
            } else if let Some(mut hair) = registry.create_new(hash) {
                hair.read_element(type_element);
                self.hair_list.insert(hash, hair);
            } else {
                tracing::warn!(
                    "Discarding unknown hair type {} in dash {}",
                    type_element.name,
                    self.dash
                );
            }
        }
    }

    fn read_ranged(&self, element: &Element, name: &str, current: i32, min: i32, max: i32) -> i32 {
        match element.child_parsed::<i32>(name) {
            Some(Ok(value)) if (min..=max).contains(&value) => value,
            Some(Ok(value)) => {
                let clamped = value.clamp(min, max);
                tracing::warn!(
                    "{name} {value} for dash {} outside [{min}, {max}], clamped to {clamped}",
                    self.dash
                );
                clamped
            }
            Some(Err(_)) => {
                tracing::warn!("Invalid {name} for dash {}", self.dash);
                current
            }
            None => current,
        }
    }

    /// Writes this record's fields as children of a `<dash>` element.
    pub fn write_element(&self, element: &mut Element) {
        element.add_text_child("hairLength", self.hair_length);
        element.add_text_child("hairSpeed", self.hair_speed);
        element.add_text_child("hairPhase", self.hair_phase);
        element.add_text_child("bangsTexture", &self.hair_bangs_source);
        element.add_text_child("hairTexture", &self.hair_texture_source);
        element.add_text_child("type", self.hair_type_id());

        let types = element.add_child(Element::new("types"));
        for hair in self.hair_list.values() {
            let child = types.add_child(Element::new(hair.id()));
            hair.write_element(child);
        }
    }

    /// Builds a complete `<dash count="N">` element.
    pub fn to_element(&self) -> Element {
        let mut element = Element::new("dash").with_attribute("count", self.dash);
        self.write_element(&mut element);
        element
    }

    // ========================================================================
    // Texture Overrides
    // ========================================================================

    /// Resolves both texture names against the atlas.
    ///
    /// Names that do not resolve are cleared with a warning.
    pub fn load_textures(&mut self, atlas: &dyn TextureAtlas) {
        self.hair_textures = resolve_texture(atlas, &mut self.hair_texture_source, "hair");
        self.hair_bangs = resolve_texture(atlas, &mut self.hair_bangs_source, "bangs");
    }

    /// Sets the hair texture name and resolves it.
    pub fn set_hair_texture(&mut self, source: &str, atlas: &dyn TextureAtlas) {
        self.hair_texture_source = source.to_string();
        self.hair_textures = resolve_texture(atlas, &mut self.hair_texture_source, "hair");
    }

    /// Sets the bangs texture name and resolves it.
    pub fn set_bangs_texture(&mut self, source: &str, atlas: &dyn TextureAtlas) {
        self.hair_bangs_source = source.to_string();
        self.hair_bangs = resolve_texture(atlas, &mut self.hair_bangs_source, "bangs");
    }
}

/// Whether the atlas has `path` with zero to five trailing `0`s appended.
pub fn has_atlas_subtexture(atlas: &dyn TextureAtlas, path: &str) -> bool {
    let mut candidate = path.to_string();
    for _ in 0..=5 {
        if atlas.has(&candidate) {
            return true;
        }
        candidate.push('0');
    }
    false
}

fn resolve_texture(
    atlas: &dyn TextureAtlas,
    source: &mut String,
    kind: &str,
) -> Option<Vec<TextureId>> {
    if source.is_empty() {
        return None;
    }

    let path = format!("{TEXTURE_ROOT}{source}");
    if !has_atlas_subtexture(atlas, &path) {
        tracing::warn!("Invalid custom {kind} texture {source:?}");
        source.clear();
        return None;
    }

    Some(atlas.subtextures(&path))
}

// ============================================================================
// HyperlineSettings
// ============================================================================

/// All persisted settings of one save slot.
#[derive(Debug, Clone)]
pub struct HyperlineSettings {
    pub enabled: bool,
    /// Let map triggers override the player's colors.
    pub allow_map_hair_color: bool,
    /// Tint the crown sprite with the bangs color.
    pub do_maddy_crown: bool,
    /// Color the hair during feather flight.
    pub do_feather_color: bool,
    /// Upper bound for per-dash hair length, in `[1, MAX_HAIR_LENGTH]`.
    pub hair_length_soft_cap: i32,
    /// Flash white when the dash count changes.
    pub do_dash_flash: bool,
    /// Exactly [`MAX_DASH_COUNT`] records, indexed by dash count.
    pub dashes: Vec<DashSettings>,
}

impl HyperlineSettings {
    pub fn new(registry: &HairTypeRegistry) -> Self {
        Self {
            enabled: true,
            allow_map_hair_color: true,
            do_maddy_crown: true,
            do_feather_color: true,
            hair_length_soft_cap: DEFAULT_HAIR_LENGTH_SOFT_CAP,
            do_dash_flash: true,
            dashes: default_dashes(registry),
        }
    }

    /// Rebuilds every dash record from defaults. Global flags are kept.
    pub fn reset(&mut self, registry: &HairTypeRegistry) {
        self.dashes = default_dashes(registry);
    }

    /// Returns the record for `dash`, if in range.
    pub fn dash(&self, dash: usize) -> Option<&DashSettings> {
        self.dashes.get(dash)
    }

    pub fn dash_mut(&mut self, dash: usize) -> Option<&mut DashSettings> {
        self.dashes.get_mut(dash)
    }

    /// Resolves the texture overrides of every dash record.
    pub fn load_textures(&mut self, atlas: &dyn TextureAtlas) {
        for dash in &mut self.dashes {
            dash.load_textures(atlas);
        }
    }

    // ========================================================================
    // Reading
    // ========================================================================

    /// Loads settings from a save slot blob, binary or XML.
    ///
    /// The blob is parsed into a copy that replaces `self` only on success,
    /// so a failed read leaves the current settings untouched.
    ///
    /// # Errors
    /// Returns an error for an unreadable binary blob or malformed XML.
    pub fn read(&mut self, data: &[u8], registry: &HairTypeRegistry) -> Result<()> {
        let mut loaded = self.clone();
        loaded.reset(registry);

        if legacy::is_legacy(data) {
            legacy::read_settings(data, &mut loaded, registry)?;
        } else {
            let root = Element::parse_bytes(data)?;
            loaded.read_root(&root, registry);
        }

        *self = loaded;
        Ok(())
    }

    /// Applies a parsed `<root>` element.
    pub fn read_root(&mut self, root: &Element, registry: &HairTypeRegistry) {
        if root.name != "root" {
            tracing::warn!("Settings XML missing root element");
            return;
        }

        if let Some(version) = root.child_text("version") {
            tracing::debug!("Reading settings version {version}");
        }

        self.enabled = root.child_bool("enabled").unwrap_or(self.enabled);
        self.do_dash_flash = root.child_bool("doDashFlash").unwrap_or(self.do_dash_flash);
        self.allow_map_hair_color = root
            .child_bool("allowMapHairColor")
            .unwrap_or(self.allow_map_hair_color);
        self.do_maddy_crown = root.child_bool("doMaddyCrown").unwrap_or(self.do_maddy_crown);
        self.do_feather_color = root
            .child_bool("doFeatherColor")
            .unwrap_or(self.do_feather_color);
        if let Some(Ok(cap)) = root.child_parsed::<i32>("hairLengthSoftCap") {
            self.hair_length_soft_cap = cap.clamp(MIN_HAIR_LENGTH, MAX_HAIR_LENGTH);
        }

        match root.child("dashes") {
            Some(dashes) => read_dashes(&mut self.dashes, dashes, registry, self.hair_length_soft_cap),
            None => tracing::warn!("Settings XML missing dashes element"),
        }
    }

    // ========================================================================
    // Writing
    // ========================================================================

    /// Builds the `<root>` element of the settings document.
    pub fn to_element(&self) -> Element {
        let mut root = Element::new("root");
        root.add_text_child("version", CURRENT_VERSION);
        root.add_bool_child("enabled", self.enabled);
        root.add_bool_child("allowMapHairColor", self.allow_map_hair_color);
        root.add_bool_child("doMaddyCrown", self.do_maddy_crown);
        root.add_bool_child("doFeatherColor", self.do_feather_color);
        root.add_text_child("hairLengthSoftCap", self.hair_length_soft_cap);
        root.add_bool_child("doDashFlash", self.do_dash_flash);
        root.add_child(dashes_element(&self.dashes));
        root
    }

    /// Serializes the settings as an XML document.
    ///
    /// # Errors
    /// Returns an error if XML serialization fails.
    pub fn write(&self) -> Result<Vec<u8>> {
        Ok(self.to_element().to_document()?.into_bytes())
    }
}

/// Builds [`MAX_DASH_COUNT`] default dash records.
pub fn default_dashes(registry: &HairTypeRegistry) -> Vec<DashSettings> {
    (0..MAX_DASH_COUNT)
        .map(|dash| DashSettings::new(dash, registry))
        .collect()
}

/// Reads every `<dash count="N">` child of a `<dashes>` element.
pub fn read_dashes(
    dashes: &mut [DashSettings],
    element: &Element,
    registry: &HairTypeRegistry,
    length_soft_cap: i32,
) {
    for dash_element in element.children_named("dash") {
        let Some(count) = dash_element.attribute("count") else {
            continue;
        };
        let Ok(index) = count.trim().parse::<usize>() else {
            tracing::warn!("Invalid dash count attribute {count:?}");
            continue;
        };
        if let Some(dash) = dashes.get_mut(index) {
            dash.read_element(dash_element, registry, length_soft_cap);
        }
    }
}

/// Builds a `<dashes>` element holding one `<dash>` per record.
pub fn dashes_element(dashes: &[DashSettings]) -> Element {
    let mut element = Element::new("dashes");
    for dash in dashes {
        element.add_child(dash.to_element());
    }
    element
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::hair::{GradientHair, RainbowHair};
    use crate::test_support::{builtin_registry as registry, capture_logs};
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    struct FakeAtlas(HashMap<String, Vec<TextureId>>);

    impl TextureAtlas for FakeAtlas {
        fn has(&self, path: &str) -> bool {
            self.0.contains_key(path)
        }

        fn subtextures(&self, path: &str) -> Vec<TextureId> {
            self.0
                .iter()
                .filter(|(k, _)| k.starts_with(path))
                .flat_map(|(_, v)| v.clone())
                .collect()
        }
    }

    #[test]
    fn dash_defaults() {
        let registry = registry();
        let settings = HyperlineSettings::new(&registry);
        assert_eq!(settings.dashes.len(), MAX_DASH_COUNT);

        let lengths: Vec<_> = settings.dashes.iter().map(|d| d.hair_length).collect();
        assert_eq!(lengths, vec![4, 4, 5, 5, 5, 5, 5, 5, 5, 5]);
        for (i, dash) in settings.dashes.iter().enumerate() {
            assert_eq!(dash.dash, i);
            assert_eq!(dash.hair_type, DefaultHair::HASH);
            assert_eq!(dash.hair_list.len(), registry.len());
        }
    }

    #[test]
    fn speed_is_clamped_with_warning() {
        let registry = registry();
        let mut dash = DashSettings::new(0, &registry);
        let mut e = Element::new("dash");
        e.add_text_child("hairLength", "4");
        e.add_text_child("hairSpeed", "9999");
        e.add_child(Element::new("types"));

        let logs = capture_logs(|| dash.read_element(&e, &registry, 100));
        assert_eq!(dash.hair_speed, MAX_HAIR_SPEED);
        assert!(logs.contains("WARN"), "expected a warning, got {logs:?}");
        assert!(logs.contains("hairSpeed"));
    }

    #[test]
    fn length_outside_soft_cap_falls_back() {
        let registry = registry();
        let mut dash = DashSettings::new(3, &registry);
        let mut e = Element::new("dash");
        e.add_text_child("hairLength", "150");
        e.add_text_child("hairPhase", "-5");
        dash.read_element(&e, &registry, 100);
        assert_eq!(dash.hair_length, DEFAULT_HAIR_LENGTH);
        assert_eq!(dash.hair_phase, MIN_HAIR_PHASE);

        dash.read_element(&e, &registry, 200);
        assert_eq!(dash.hair_length, 150);
    }

    #[test]
    fn unknown_chosen_type_is_retained() {
        let registry = registry();
        let mut dash = DashSettings::new(0, &registry);
        let mut e = Element::new("dash");
        e.add_text_child("type", "Gone_PluginHair");

        let logs = capture_logs(|| dash.read_element(&e, &registry, 100));
        assert!(logs.contains("ERROR"));
        assert_eq!(dash.hair_type, fnv1_hash("Gone_PluginHair"));
        assert_eq!(dash.hair_type_id(), "Gone_PluginHair");

        // Rendering falls back to solid
        assert_eq!(dash.selected_hair().map(|h| h.hash()), Some(SolidHair::HASH));

        dash.set_hair_type(RainbowHair::HASH);
        assert_eq!(dash.hair_type_id(), RainbowHair::ID);
    }

    #[test]
    fn unknown_type_children_are_discarded() {
        let registry = registry();
        let mut dash = DashSettings::new(0, &registry);
        let mut e = Element::new("dash");
        let types = e.add_child(Element::new("types"));
        types.add_child(Element::new("Gone_PluginHair"));
        let rainbow = types.add_child(Element::new(RainbowHair::ID));
        rainbow.add_text_child("saturation", "3");

        let logs = capture_logs(|| dash.read_element(&e, &registry, 100));
        assert!(logs.contains("Gone_PluginHair"));
        assert!(!dash.hair_list.contains_key(&fnv1_hash("Gone_PluginHair")));
        assert_eq!(dash.hair_list.len(), registry.len());

        let mut out = Element::new("r");
        dash.hair_list[&RainbowHair::HASH].write_element(&mut out);
        assert_eq!(out.child_text("saturation"), Some("3"));
    }

    #[test]
    fn document_round_trip() {
        let registry = registry();
        let mut settings = HyperlineSettings::new(&registry);
        settings.do_feather_color = false;
        settings.hair_length_soft_cap = 300;
        settings.dashes[2].hair_length = 250;
        settings.dashes[2].hair_speed = -7;
        settings.dashes[2].hair_phase = 33;
        settings.dashes[2].set_hair_type(GradientHair::HASH);
        settings.dashes[2].hair_texture_source = "braid".to_string();
        let gradient = GradientHair::new("FF0000".parse().unwrap(), "00FF00".parse().unwrap())
            .with_cycles(4);
        settings.dashes[2].hair_list.insert(GradientHair::HASH, Box::new(gradient));

        let bytes = settings.write().unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.contains("<version>0.3.4</version>"));
        assert!(text.contains("<doFeatherColor>false</doFeatherColor>"));

        let mut loaded = HyperlineSettings::new(&registry);
        loaded.read(&bytes, &registry).unwrap();
        assert!(!loaded.do_feather_color);
        assert_eq!(loaded.hair_length_soft_cap, 300);

        let dash = &loaded.dashes[2];
        assert_eq!(dash.hair_length, 250);
        assert_eq!(dash.hair_speed, -7);
        assert_eq!(dash.hair_phase, 33);
        assert_eq!(dash.hair_type, GradientHair::HASH);
        assert_eq!(dash.hair_texture_source, "braid");
        let hair = dash.selected_hair().unwrap();
        assert_eq!(hair.color_at_phase(Rgb::new(0, 0, 0), 0.0), Rgb::new(255, 0, 0));

        // Every record survives, including untouched ones
        assert_eq!(
            loaded.to_element().to_document().unwrap(),
            settings.to_element().to_document().unwrap()
        );
    }

    #[test]
    fn malformed_xml_leaves_settings_untouched() {
        let registry = registry();
        let mut settings = HyperlineSettings::new(&registry);
        settings.enabled = false;
        settings.dashes[0].hair_speed = 12;

        assert!(settings.read(b"<root><enabled>true</enabled>", &registry).is_err());
        assert!(!settings.enabled);
        assert_eq!(settings.dashes[0].hair_speed, 12);
    }

    #[test]
    fn missing_fields_keep_defaults() {
        let registry = registry();
        let mut settings = HyperlineSettings::new(&registry);
        settings
            .read(b"<root><enabled>false</enabled></root>", &registry)
            .unwrap();
        assert!(!settings.enabled);
        assert!(settings.allow_map_hair_color);
        assert_eq!(settings.dashes[4].hair_length, 5);
    }

    #[test]
    fn out_of_range_dash_counts_are_skipped() {
        let registry = registry();
        let mut settings = HyperlineSettings::new(&registry);
        let xml = br#"<root><dashes>
            <dash count="12"><hairSpeed>5</hairSpeed></dash>
            <dash><hairSpeed>6</hairSpeed></dash>
            <dash count="1"><hairSpeed>7</hairSpeed></dash>
        </dashes></root>"#;
        settings.read(xml, &registry).unwrap();
        assert_eq!(settings.dashes[1].hair_speed, 7);
        assert!(settings.dashes.iter().filter(|d| d.hair_speed != 0).count() == 1);
    }

    #[test]
    fn texture_lookup_probes_trailing_zeros() {
        let mut atlas = FakeAtlas(HashMap::new());
        atlas
            .0
            .insert("hyperline/braid00".to_string(), vec![TextureId(1), TextureId(2)]);

        assert!(has_atlas_subtexture(&atlas, "hyperline/braid"));
        assert!(!has_atlas_subtexture(&atlas, "hyperline/bun"));

        let registry = registry();
        let mut dash = DashSettings::new(0, &registry);
        dash.hair_texture_source = "braid".to_string();
        dash.hair_bangs_source = "bun".to_string();

        let logs = capture_logs(|| dash.load_textures(&atlas));
        assert_eq!(dash.hair_textures, Some(vec![TextureId(1), TextureId(2)]));
        assert_eq!(dash.hair_bangs, None);
        assert_eq!(dash.hair_bangs_source, "", "unresolved names are cleared");
        assert!(logs.contains("bun"));
    }

    #[test]
    fn format_version_rules() {
        assert!(FormatVersion::new(0, 1, 15).uses_fixed_layout());
        assert!(!FormatVersion::new(0, 1, 16).uses_fixed_layout());
        assert!(!FormatVersion::new(0, 2, 0).uses_fixed_layout());
        assert!(FormatVersion::new(0, 1, 8).has_gradient_rgb_flag());
        assert!(!FormatVersion::new(0, 1, 7).has_gradient_rgb_flag());
        assert_eq!(CURRENT_VERSION.to_string(), "0.3.4");
    }
}
