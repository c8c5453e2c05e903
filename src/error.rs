//! Error types for hyperline.

use thiserror::Error;

/// The error type for hyperline persistence and registry operations.
///
/// Nothing in this enum ever reaches the host's frame loop: the hook entry
/// points on [`Hyperline`](crate::Hyperline) log and fall back instead.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A temporary preset file could not be moved into place.
    #[error("failed to persist file: {0}")]
    Persist(#[from] tempfile::PersistError),

    // ==================== XML Errors ====================
    /// XML parsing or writing error.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// XML attribute error.
    #[error("XML attribute error: {0}")]
    XmlAttr(String),

    /// XML (de)serialization error from the serde bridge.
    #[error("XML serde error: {0}")]
    XmlSerde(#[from] quick_xml::DeError),

    /// The document has no root element, or more than one.
    #[error("malformed XML document: {0}")]
    MalformedDocument(String),

    /// UTF-8 conversion error.
    #[error("UTF-8 conversion error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    // ==================== Legacy Binary Errors ====================
    /// The legacy settings blob did not start with a known magic header.
    #[error("invalid settings header: {0:02X?}")]
    InvalidHeader([u8; 4]),

    /// A legacy length-prefixed string was malformed.
    #[error("invalid length-prefixed string")]
    InvalidString,

    // ==================== Registry / Preset Errors ====================
    /// A hair type id or hash is not registered.
    #[error("unknown hair type: {0}")]
    UnknownHairType(String),

    /// No preset with the given name is loaded.
    #[error("preset not found: {0}")]
    PresetNotFound(String),

    /// The preset name cannot be used as a file name.
    #[error("invalid preset name: {0:?}")]
    InvalidPresetName(String),
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlAttr(err.to_string())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
