//! Named snapshots of the per-dash configuration.
//!
//! A preset holds the same per-dash records as
//! [`HyperlineSettings`](crate::settings::HyperlineSettings), without the
//! global flags. Presets come from two places, scanned in order:
//!
//! 1. Bundled content under a virtual prefix (`Hyperline/<name>.preset`).
//! 2. The user folder (`<settings root>/Hyperline/<name>.preset`).
//!
//! A later source replaces an earlier preset of the same name.

use std::ffi::OsStr;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tempfile::NamedTempFile;

use crate::element::Element;
use crate::error::{Error, Result};
use crate::hair::HairTypeRegistry;
use crate::host::{BundledAsset, TextureAtlas};
use crate::settings::{DashSettings, HyperlineSettings, dashes_element, default_dashes, read_dashes};

/// File extension of preset files.
pub const PRESET_EXTENSION: &str = "preset";

// ============================================================================
// Preset
// ============================================================================

/// A full set of per-dash records.
#[derive(Debug, Clone)]
pub struct Preset {
    pub dashes: Vec<DashSettings>,
}

impl Preset {
    /// Creates a preset of default records.
    pub fn new(registry: &HairTypeRegistry) -> Self {
        Self {
            dashes: default_dashes(registry),
        }
    }

    /// Snapshots the records of `settings`.
    pub fn from_settings(settings: &HyperlineSettings) -> Self {
        Self {
            dashes: settings.dashes.clone(),
        }
    }

    /// Parses a preset document.
    ///
    /// Records missing from the document keep their defaults. Hair lengths
    /// outside `[1, length_soft_cap]` fall back to the default length.
    ///
    /// # Errors
    /// Returns an error for invalid UTF-8 or malformed XML.
    pub fn read(data: &[u8], registry: &HairTypeRegistry, length_soft_cap: i32) -> Result<Self> {
        let root = Element::parse_bytes(data)?;
        let mut preset = Self::new(registry);

        if root.name != "root" {
            tracing::warn!("Preset XML missing root element");
            return Ok(preset);
        }

        match root.child("dashes") {
            Some(dashes) => read_dashes(&mut preset.dashes, dashes, registry, length_soft_cap),
            None => tracing::warn!("Preset XML missing dashes element"),
        }
        Ok(preset)
    }

    pub fn to_element(&self) -> Element {
        let mut root = Element::new("root");
        root.add_child(dashes_element(&self.dashes));
        root
    }

    /// Serializes the preset as an XML document.
    ///
    /// # Errors
    /// Returns an error if XML serialization fails.
    pub fn write(&self) -> Result<Vec<u8>> {
        Ok(self.to_element().to_document()?.into_bytes())
    }

    /// Copies this preset into `settings`.
    ///
    /// The settings are reset first, then every record is deep-copied.
    /// Hair types registered after this preset was read keep their fresh
    /// defaults.
    pub fn apply_to(&self, settings: &mut HyperlineSettings, registry: &HairTypeRegistry) {
        settings.reset(registry);
        for (target, source) in settings.dashes.iter_mut().zip(&self.dashes) {
            let defaults = std::mem::replace(target, source.clone());
            for (hash, hair) in defaults.hair_list {
                target.hair_list.entry(hash).or_insert(hair);
            }
        }
    }
}

// ============================================================================
// PresetStore
// ============================================================================

/// Catalog of loaded presets, backed by a user folder.
#[derive(Debug, Clone)]
pub struct PresetStore {
    folder: PathBuf,
    bundled_prefix: String,
    presets: IndexMap<String, Preset>,
}

impl PresetStore {
    /// Creates an empty catalog that saves into `folder`.
    pub fn new(folder: impl Into<PathBuf>, bundled_prefix: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            bundled_prefix: bundled_prefix.into(),
            presets: IndexMap::new(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Preset> {
        self.presets.get(name)
    }

    /// Preset names in load order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.presets.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Preset)> {
        self.presets.iter().map(|(name, preset)| (name.as_str(), preset))
    }

    /// Adds or replaces a preset in memory only.
    pub fn insert(&mut self, name: impl Into<String>, preset: Preset) {
        self.presets.insert(name.into(), preset);
    }

    // ========================================================================
    // Loading
    // ========================================================================

    /// Rebuilds the catalog from bundled content and the user folder.
    ///
    /// The user folder is created when missing. Unreadable files are
    /// skipped with a log line. Hair lengths are checked against
    /// `length_soft_cap`. Returns the number of presets loaded.
    pub fn load_all(
        &mut self,
        bundled: &[BundledAsset],
        registry: &HairTypeRegistry,
        length_soft_cap: i32,
    ) -> usize {
        tracing::info!("Loading presets");
        self.presets.clear();

        for asset in bundled {
            let Some(name) = self.bundled_name(&asset.path_virtual) else {
                continue;
            };
            match Preset::read(&asset.data, registry, length_soft_cap) {
                Ok(preset) => {
                    tracing::info!("Loaded preset {name} from {}", asset.path_virtual);
                    self.presets.insert(name.to_string(), preset);
                }
                Err(e) => tracing::warn!("Failed to read preset {}: {e}", asset.path_virtual),
            }
        }

        if let Err(e) = self.load_folder(registry, length_soft_cap) {
            tracing::error!("Failed to scan preset folder {}: {e}", self.folder.display());
        }

        self.presets.len()
    }

    fn load_folder(&mut self, registry: &HairTypeRegistry, length_soft_cap: i32) -> Result<()> {
        fs::create_dir_all(&self.folder)?;

        let mut paths = fs::read_dir(&self.folder)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && has_preset_extension(path))
            .collect::<Vec<_>>();
        paths.sort();

        for path in paths {
            let Some(name) = path.file_stem().and_then(OsStr::to_str) else {
                continue;
            };
            let preset = fs::read(&path)
                .map_err(Error::from)
                .and_then(|data| Preset::read(&data, registry, length_soft_cap));
            match preset {
                Ok(preset) => {
                    tracing::info!("Loaded preset {name} from {}", path.display());
                    self.presets.insert(name.to_string(), preset);
                }
                Err(e) => tracing::warn!("Failed to read preset {}: {e}", path.display()),
            }
        }
        Ok(())
    }

    /// Preset name of a bundled asset path, if it is a preset.
    fn bundled_name<'a>(&self, path_virtual: &'a str) -> Option<&'a str> {
        let rest = path_virtual.strip_prefix(self.bundled_prefix.as_str())?;
        if !has_preset_extension(Path::new(rest)) {
            return None;
        }
        let stem = &rest[..rest.len() - PRESET_EXTENSION.len() - 1];
        (!stem.is_empty()).then_some(stem)
    }

    /// Resolves the texture overrides of every loaded preset.
    pub fn load_textures(&mut self, atlas: &dyn TextureAtlas) {
        for preset in self.presets.values_mut() {
            for dash in &mut preset.dashes {
                dash.load_textures(atlas);
            }
        }
    }

    // ========================================================================
    // Saving
    // ========================================================================

    /// Writes `preset` to `<folder>/<name>.preset` and adds it to the catalog.
    ///
    /// The file is written to a temporary sibling and renamed into place, so
    /// a failed save leaves both the old file and the catalog unchanged.
    ///
    /// # Errors
    /// Returns an error for an invalid name or any I/O failure.
    pub fn save(&mut self, name: &str, preset: Preset) -> Result<()> {
        validate_name(name)?;
        let bytes = preset.write()?;

        fs::create_dir_all(&self.folder)?;
        let mut file = NamedTempFile::new_in(&self.folder)?;
        file.write_all(&bytes)?;
        file.as_file().sync_all()?;
        file.persist(self.preset_path(name))?;

        tracing::info!("Saved preset {name}");
        self.presets.insert(name.to_string(), preset);
        Ok(())
    }

    /// Removes a preset's file and catalog entry.
    ///
    /// Deleting a preset that does not exist is not an error.
    ///
    /// # Errors
    /// Returns an error for an invalid name or if the file cannot be removed.
    pub fn delete(&mut self, name: &str) -> Result<()> {
        validate_name(name)?;
        match fs::remove_file(self.preset_path(name)) {
            Ok(()) => tracing::info!("Deleted preset {name}"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        self.presets.shift_remove(name);
        Ok(())
    }

    /// Applies the named preset to `settings` and re-resolves textures.
    ///
    /// # Errors
    /// Returns [`Error::PresetNotFound`] if no preset has that name.
    pub fn apply(
        &self,
        name: &str,
        settings: &mut HyperlineSettings,
        registry: &HairTypeRegistry,
        atlas: &dyn TextureAtlas,
    ) -> Result<()> {
        let preset = self
            .presets
            .get(name)
            .ok_or_else(|| Error::PresetNotFound(name.to_string()))?;
        preset.apply_to(settings, registry);
        settings.load_textures(atlas);
        Ok(())
    }

    fn preset_path(&self, name: &str) -> PathBuf {
        self.folder.join(format!("{name}.{PRESET_EXTENSION}"))
    }
}

fn has_preset_extension(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case(PRESET_EXTENSION))
}

/// Rejects names that are empty or would escape the preset folder.
fn validate_name(name: &str) -> Result<()> {
    let invalid = name.trim().is_empty()
        || name.starts_with('.')
        || name
            .chars()
            .any(|c| matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') || c.is_control());
    if invalid {
        return Err(Error::InvalidPresetName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{HsvColor, Rgb};
    use crate::hair::{GradientHair, HairType, SolidHair};
    use crate::host::TextureId;
    use crate::settings::{
        DEFAULT_HAIR_LENGTH, DEFAULT_HAIR_LENGTH_SOFT_CAP, MAX_HAIR_PHASE, MAX_HAIR_SPEED,
        MIN_HAIR_PHASE, MIN_HAIR_SPEED,
    };
    use crate::test_support::{builtin_registry, capture_logs};
    use pretty_assertions::assert_eq;

    struct EmptyAtlas;

    impl TextureAtlas for EmptyAtlas {
        fn has(&self, _path: &str) -> bool {
            false
        }

        fn subtextures(&self, _path: &str) -> Vec<TextureId> {
            Vec::new()
        }
    }

    fn solid_preset(registry: &HairTypeRegistry, code: &str) -> Preset {
        let mut preset = Preset::new(registry);
        for dash in &mut preset.dashes {
            dash.set_hair_type(SolidHair::HASH);
            dash.hair_list
                .insert(SolidHair::HASH, Box::new(SolidHair::new(code.parse().unwrap())));
        }
        preset
    }

    fn bangs(settings: &HyperlineSettings, dash: usize) -> Rgb {
        settings.dashes[dash]
            .selected_hair()
            .unwrap()
            .color_at_phase(Rgb::new(0, 0, 0), 0.0)
    }

    #[test]
    fn bundled_then_user_folder_last_wins() {
        let registry = builtin_registry();
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("Hyperline");

        let bundled = vec![
            BundledAsset::new("Hyperline/Blue.preset", solid_preset(&registry, "0000FF").write().unwrap()),
            BundledAsset::new("Hyperline/Shared.PRESET", solid_preset(&registry, "00FF00").write().unwrap()),
            BundledAsset::new("Graphics/Other.preset", solid_preset(&registry, "FFFFFF").write().unwrap()),
            BundledAsset::new("Hyperline/readme.txt", b"hello".to_vec()),
        ];

        fs::create_dir_all(&folder).unwrap();
        fs::write(folder.join("Shared.preset"), solid_preset(&registry, "FF0000").write().unwrap()).unwrap();

        let mut store = PresetStore::new(&folder, "Hyperline/");
        assert_eq!(store.load_all(&bundled, &registry, DEFAULT_HAIR_LENGTH_SOFT_CAP), 2);

        let names: Vec<_> = store.names().collect();
        assert_eq!(names, vec!["Blue", "Shared"]);

        let mut settings = HyperlineSettings::new(&registry);
        store.apply("Shared", &mut settings, &registry, &EmptyAtlas).unwrap();
        assert_eq!(bangs(&settings, 0), Rgb::new(255, 0, 0));
    }

    #[test]
    fn preset_lengths_respect_soft_cap() {
        let registry = builtin_registry();
        let doc = br#"<root><dashes><dash count="0"><hairLength>500</hairLength></dash></dashes></root>"#;

        let logs = capture_logs(|| {
            let preset = Preset::read(doc, &registry, DEFAULT_HAIR_LENGTH_SOFT_CAP).unwrap();
            assert_eq!(preset.dashes[0].hair_length, DEFAULT_HAIR_LENGTH);

            let mut settings = HyperlineSettings::new(&registry);
            preset.apply_to(&mut settings, &registry);
            assert!(settings.dashes[0].hair_length <= settings.hair_length_soft_cap);
        });
        assert!(logs.contains("WARN"));
        assert!(logs.contains("500"));

        // A raised cap admits the same length
        let preset = Preset::read(doc, &registry, 600).unwrap();
        assert_eq!(preset.dashes[0].hair_length, 500);
    }

    #[test]
    fn load_all_applies_soft_cap_to_every_source() {
        let registry = builtin_registry();
        let dir = tempfile::tempdir().unwrap();
        let doc = br#"<root><dashes><dash count="1"><hairLength>250</hairLength></dash></dashes></root>"#;
        fs::write(dir.path().join("Long.preset"), doc).unwrap();
        let bundled = vec![BundledAsset::new("Hyperline/Bundled.preset", doc.to_vec())];

        let mut store = PresetStore::new(dir.path(), "Hyperline/");
        store.load_all(&bundled, &registry, DEFAULT_HAIR_LENGTH_SOFT_CAP);
        assert_eq!(store.get("Long").unwrap().dashes[1].hair_length, DEFAULT_HAIR_LENGTH);
        assert_eq!(store.get("Bundled").unwrap().dashes[1].hair_length, DEFAULT_HAIR_LENGTH);

        store.load_all(&bundled, &registry, 300);
        assert_eq!(store.get("Long").unwrap().dashes[1].hair_length, 250);
    }

    #[test]
    fn out_of_range_preset_fields_are_clamped() {
        let registry = builtin_registry();
        let doc = br#"<root><dashes>
            <dash count="2"><hairLength>4</hairLength><hairSpeed>99</hairSpeed><hairPhase>250</hairPhase></dash>
            <dash count="3"><hairLength>0</hairLength><hairSpeed>-75</hairSpeed><hairPhase>-8</hairPhase></dash>
        </dashes></root>"#;

        let mut preset = None;
        let logs = capture_logs(|| {
            preset = Some(Preset::read(doc, &registry, DEFAULT_HAIR_LENGTH_SOFT_CAP).unwrap());
        });
        let preset = preset.unwrap();

        assert_eq!(preset.dashes[2].hair_speed, MAX_HAIR_SPEED);
        assert_eq!(preset.dashes[2].hair_phase, MAX_HAIR_PHASE);
        assert_eq!(preset.dashes[3].hair_length, DEFAULT_HAIR_LENGTH);
        assert_eq!(preset.dashes[3].hair_speed, MIN_HAIR_SPEED);
        assert_eq!(preset.dashes[3].hair_phase, MIN_HAIR_PHASE);

        assert!(logs.contains("hairSpeed"));
        assert!(logs.contains("hairPhase"));
        assert!(logs.contains("Hair length 0"));
    }

    #[test]
    fn missing_user_folder_is_created() {
        let registry = builtin_registry();
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("Hyperline");

        let mut store = PresetStore::new(&folder, "Hyperline/");
        assert_eq!(store.load_all(&[], &registry, DEFAULT_HAIR_LENGTH_SOFT_CAP), 0);
        assert!(folder.is_dir());
    }

    #[test]
    fn save_then_reload() {
        let registry = builtin_registry();
        let dir = tempfile::tempdir().unwrap();

        let mut store = PresetStore::new(dir.path(), "Hyperline/");
        let mut preset = solid_preset(&registry, "123456");
        preset.dashes[3].hair_speed = 11;
        store.save("Mine", preset).unwrap();
        assert!(dir.path().join("Mine.preset").is_file());
        assert!(store.get("Mine").is_some());

        let mut reloaded = PresetStore::new(dir.path(), "Hyperline/");
        reloaded.load_all(&[], &registry, DEFAULT_HAIR_LENGTH_SOFT_CAP);
        let preset = reloaded.get("Mine").unwrap();
        assert_eq!(preset.dashes[3].hair_speed, 11);
        assert_eq!(preset.dashes[3].hair_type, SolidHair::HASH);
    }

    #[test]
    fn invalid_names_leave_catalog_unchanged() {
        let registry = builtin_registry();
        let dir = tempfile::tempdir().unwrap();
        let mut store = PresetStore::new(dir.path(), "Hyperline/");

        for name in ["", "../escape", "a/b", ".hidden"] {
            let result = store.save(name, Preset::new(&registry));
            assert!(matches!(result, Err(Error::InvalidPresetName(_))), "{name:?}");
        }
        assert!(store.is_empty());
    }

    #[test]
    fn delete_is_idempotent() {
        let registry = builtin_registry();
        let dir = tempfile::tempdir().unwrap();
        let mut store = PresetStore::new(dir.path(), "Hyperline/");

        store.save("Gone", Preset::new(&registry)).unwrap();
        store.delete("Gone").unwrap();
        assert!(!dir.path().join("Gone.preset").exists());
        assert!(store.get("Gone").is_none());

        store.delete("Gone").unwrap();
        store.delete("NeverExisted").unwrap();
    }

    #[test]
    fn apply_unknown_preset_fails() {
        let registry = builtin_registry();
        let store = PresetStore::new("unused", "Hyperline/");
        let mut settings = HyperlineSettings::new(&registry);
        let result = store.apply("nope", &mut settings, &registry, &EmptyAtlas);
        assert!(matches!(result, Err(Error::PresetNotFound(_))));
    }

    #[test]
    fn apply_deep_copies() {
        let registry = builtin_registry();
        let mut store = PresetStore::new("unused", "Hyperline/");

        let mut preset = Preset::new(&registry);
        preset.dashes[0].set_hair_type(GradientHair::HASH);
        preset.dashes[0].hair_list.insert(
            GradientHair::HASH,
            Box::new(GradientHair::new("FF0000".parse().unwrap(), "0000FF".parse().unwrap())),
        );
        store.insert("A", preset);

        let mut settings = HyperlineSettings::new(&registry);
        store.apply("A", &mut settings, &registry, &EmptyAtlas).unwrap();
        assert_eq!(bangs(&settings, 0), Rgb::new(255, 0, 0));

        // Edit the applied gradient in place
        let mut edited = Element::new(GradientHair::ID);
        edited.add_text_child("color1", HsvColor::from_rgb(0, 255, 0).to_hsv_string());
        settings.dashes[0]
            .hair_mut(GradientHair::HASH)
            .unwrap()
            .read_element(&edited);
        assert_eq!(bangs(&settings, 0), Rgb::new(0, 255, 0));

        let stored = store.get("A").unwrap().dashes[0].selected_hair().unwrap();
        assert_eq!(stored.color_at_phase(Rgb::new(0, 0, 0), 0.0), Rgb::new(255, 0, 0));
    }

    #[test]
    fn apply_resets_unlisted_fields() {
        let registry = builtin_registry();
        let mut settings = HyperlineSettings::new(&registry);
        settings.enabled = false;
        settings.dashes[5].hair_speed = 30;

        let preset = Preset::new(&registry);
        preset.apply_to(&mut settings, &registry);
        assert_eq!(settings.dashes[5].hair_speed, 0);
        assert!(!settings.enabled, "global flags are not part of a preset");
    }
}
