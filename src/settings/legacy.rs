//! Readers for the binary settings formats used before the XML format.
//!
//! Two envelopes exist, told apart by a 4-byte magic:
//!
//! - `DE AD BE EF`: no version bytes follow; treated as version 0.1.7.
//! - `BE EF DE AD`: followed by three version bytes (major, minor, sub).
//!
//! Files at or below 0.1.15 use a fixed three-type layout. Later files store
//! a per-dash dictionary of hair type blobs keyed by stable hash.
//!
//! All integers are little-endian. Strings carry a 7-bit variable-length
//! byte count followed by UTF-8 bytes.

use std::io::{Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};

use super::{DashSettings, FormatVersion, HyperlineSettings};
use crate::color::HsvColor;
use crate::error::{Error, Result};
use crate::hair::{BuiltinHair, HairTypeRegistry, SolidHair};

/// Magic of the original unversioned binary format.
pub const OLD_HEADER: [u8; 4] = [0xDE, 0xAD, 0xBE, 0xEF];

/// Magic of the versioned binary format.
pub const NEW_HEADER: [u8; 4] = [0xBE, 0xEF, 0xDE, 0xAD];

/// Version assumed for files with [`OLD_HEADER`].
pub const OLD_HEADER_VERSION: FormatVersion = FormatVersion::new(0, 1, 7);

/// Hair length bounds of the binary formats.
const LEGACY_MIN_HAIR_LENGTH: i32 = 1;
const LEGACY_MAX_HAIR_LENGTH: i32 = 100;
const LEGACY_DEFAULT_HAIR_LENGTH: i32 = 4;

/// Returns true if `data` starts with either binary magic.
pub fn is_legacy(data: &[u8]) -> bool {
    data.starts_with(&OLD_HEADER) || data.starts_with(&NEW_HEADER)
}

/// Reads a binary settings blob into `settings`.
///
/// `settings` should be freshly reset; fields the format does not carry keep
/// their current values.
///
/// # Errors
/// Returns [`Error::InvalidHeader`] for an unknown magic and [`Error::Io`]
/// for truncated data.
pub fn read_settings(
    data: &[u8],
    settings: &mut HyperlineSettings,
    registry: &HairTypeRegistry,
) -> Result<FormatVersion> {
    let mut cursor = Cursor::new(data);

    let mut magic = [0u8; 4];
    cursor.read_exact(&mut magic)?;

    let version = if magic == OLD_HEADER {
        OLD_HEADER_VERSION
    } else if magic == NEW_HEADER {
        let mut bytes = [0u8; 3];
        cursor.read_exact(&mut bytes)?;
        FormatVersion::new(bytes[0], bytes[1], bytes[2])
    } else {
        return Err(Error::InvalidHeader(magic));
    };

    tracing::info!("Reading binary settings version {version}");

    if version.uses_fixed_layout() {
        read_fixed_layout(&mut cursor, version, settings)?;
    } else {
        read_dictionary_layout(&mut cursor, version, settings, registry)?;
    }

    Ok(version)
}

/// Versions up to 0.1.15: a type byte indexing [`BuiltinHair::LEGACY_LAYOUT`].
fn read_fixed_layout<R: Read>(
    reader: &mut R,
    version: FormatVersion,
    settings: &mut HyperlineSettings,
) -> Result<()> {
    settings.enabled = read_bool(reader)?;
    settings.allow_map_hair_color = read_bool(reader)?;

    for dash in settings.dashes.iter_mut() {
        let type_index = usize::from(reader.read_u8()?);
        dash.hair_length = legacy_length(reader.read_i32::<LittleEndian>()?);
        dash.hair_speed = super::clamp_speed(reader.read_i32::<LittleEndian>()?);

        for builtin in BuiltinHair::LEGACY_LAYOUT {
            let mut hair = builtin.prototype().create_default();
            hair.read_legacy(reader, version)?;
            dash.hair_list.insert(builtin.hash(), hair);
        }

        let selected = match BuiltinHair::LEGACY_LAYOUT.get(type_index) {
            Some(builtin) => builtin.hash(),
            None => {
                tracing::warn!(
                    "Legacy hair type index {type_index} out of range for dash {}, using solid",
                    dash.dash
                );
                SolidHair::HASH
            }
        };
        dash.set_hair_type(selected);
    }

    settings.do_maddy_crown = read_bool(reader)?;
    for dash in settings.dashes.iter_mut() {
        dash.hair_texture_source = read_string(reader)?;
    }
    for dash in settings.dashes.iter_mut() {
        dash.hair_bangs_source = read_string(reader)?;
    }

    Ok(())
}

/// Versions 0.1.16 and later: per-dash blobs keyed by stable hash.
fn read_dictionary_layout<R: Read>(
    reader: &mut R,
    version: FormatVersion,
    settings: &mut HyperlineSettings,
    registry: &HairTypeRegistry,
) -> Result<()> {
    settings.enabled = read_bool(reader)?;
    settings.allow_map_hair_color = read_bool(reader)?;
    settings.do_maddy_crown = read_bool(reader)?;

    for dash in settings.dashes.iter_mut() {
        let hair_type = reader.read_u32::<LittleEndian>()?;
        if registry.contains(hair_type) {
            dash.set_hair_type(hair_type);
        } else {
            tracing::warn!(
                "Unknown hair type {hair_type:#010x} for dash {}, using solid",
                dash.dash
            );
            dash.set_hair_type(SolidHair::HASH);
        }

        dash.hair_length = legacy_length(reader.read_i32::<LittleEndian>()?);
        dash.hair_speed = super::clamp_speed(reader.read_i32::<LittleEndian>()?);
        dash.hair_bangs_source = read_string(reader)?;
        dash.hair_texture_source = read_string(reader)?;

        let entry_count = reader.read_u32::<LittleEndian>()?;
        for _ in 0..entry_count {
            let id = reader.read_u32::<LittleEndian>()?;
            let byte_count = reader.read_u32::<LittleEndian>()?;
            let blob = read_bytes(reader, byte_count)?;
            read_hair_blob(dash, id, &blob, version);
        }
    }

    Ok(())
}

fn read_hair_blob(dash: &mut DashSettings, id: u32, blob: &[u8], version: FormatVersion) {
    let Some(hair) = dash.hair_list.get_mut(&id) else {
        tracing::warn!("Discarding unknown hair type {id:#010x} in dash {}", dash.dash);
        return;
    };

    let mut blob_reader = Cursor::new(blob);
    if let Err(e) = hair.read_legacy(&mut blob_reader, version) {
        tracing::warn!(
            "Failed to read {} for dash {}: {e}",
            hair.id(),
            dash.dash
        );
    }
}

fn legacy_length(length: i32) -> i32 {
    if (LEGACY_MIN_HAIR_LENGTH..=LEGACY_MAX_HAIR_LENGTH).contains(&length) {
        length
    } else {
        LEGACY_DEFAULT_HAIR_LENGTH
    }
}

// ============================================================================
// Primitive Readers
// ============================================================================

/// Reads a one-byte boolean; any non-zero byte is true.
pub fn read_bool<R: Read + ?Sized>(reader: &mut R) -> Result<bool> {
    Ok(reader.read_u8()? != 0)
}

/// Reads a color stored as three `f32` values: H, S, V.
pub fn read_color<R: Read + ?Sized>(reader: &mut R) -> Result<HsvColor> {
    let h = reader.read_f32::<LittleEndian>()?;
    let s = reader.read_f32::<LittleEndian>()?;
    let v = reader.read_f32::<LittleEndian>()?;
    Ok(HsvColor::new(h, s, v))
}

/// Reads a string prefixed with its 7-bit variable-length byte count.
///
/// # Errors
/// Returns [`Error::InvalidString`] if the length prefix runs past five
/// bytes, and [`Error::Utf8`] for invalid UTF-8.
pub fn read_string<R: Read + ?Sized>(reader: &mut R) -> Result<String> {
    let mut length: u32 = 0;
    let mut shift = 0;
    loop {
        if shift >= 35 {
            return Err(Error::InvalidString);
        }
        let byte = reader.read_u8()?;
        length |= u32::from(byte & 0x7F) << shift;
        if byte & 0x80 == 0 {
            break;
        }
        shift += 7;
    }

    Ok(String::from_utf8(read_bytes(reader, length)?)?)
}

/// Reads exactly `len` bytes without trusting `len` for the allocation.
fn read_bytes<R: Read + ?Sized>(reader: &mut R, len: u32) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    reader.take(u64::from(len)).read_to_end(&mut bytes)?;
    if bytes.len() != len as usize {
        return Err(std::io::Error::from(std::io::ErrorKind::UnexpectedEof).into());
    }
    Ok(bytes)
}
