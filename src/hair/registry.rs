//! Catalog of registered hair type prototypes.

use indexmap::IndexMap;

use super::HairType;
use crate::hashing::fnv1_hash;

/// Live hair instances keyed by stable hash, in registration order.
pub type HairList = IndexMap<u32, Box<dyn HairType>>;

/// Maps stable hashes to prototype hair types.
///
/// Prototypes are read-only templates; every instance handed out is a fresh
/// copy owned by the caller. Iteration follows registration order.
#[derive(Debug, Default, Clone)]
pub struct HairTypeRegistry {
    prototypes: IndexMap<u32, Box<dyn HairType>>,
}

impl HairTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a prototype. Returns `false` if its hash is already taken,
    /// in which case the existing entry is kept.
    pub fn register(&mut self, prototype: Box<dyn HairType>) -> bool {
        let hash = prototype.hash();
        if self.prototypes.contains_key(&hash) {
            tracing::debug!("Hair type {} already registered", prototype.id());
            return false;
        }
        tracing::debug!("Registered hair type {} ({hash:#010x})", prototype.id());
        self.prototypes.insert(hash, prototype);
        true
    }

    pub fn len(&self) -> usize {
        self.prototypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prototypes.is_empty()
    }

    pub fn contains(&self, hash: u32) -> bool {
        self.prototypes.contains_key(&hash)
    }

    /// Returns the prototype registered under `hash`.
    pub fn get(&self, hash: u32) -> Option<&dyn HairType> {
        self.prototypes.get(&hash).map(|p| p.as_ref())
    }

    /// Returns the prototype whose id is `id`.
    pub fn find_by_name(&self, id: &str) -> Option<&dyn HairType> {
        self.get(fnv1_hash(id))
    }

    /// Creates a default-configured instance of the type registered under `hash`.
    pub fn create_new(&self, hash: u32) -> Option<Box<dyn HairType>> {
        self.get(hash).map(|p| p.create_default())
    }

    /// Creates a default-configured instance of the type with id `id`.
    pub fn create_by_name(&self, id: &str) -> Option<Box<dyn HairType>> {
        self.create_new(fnv1_hash(id))
    }

    /// Lists `(hash, display name key)` pairs in registration order.
    pub fn enumerate(&self) -> Vec<(u32, &str)> {
        self.prototypes
            .iter()
            .map(|(&hash, p)| (hash, p.display_name_key()))
            .collect()
    }

    /// Iterates over the registered prototypes in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn HairType> {
        self.prototypes.values().map(|p| p.as_ref())
    }

    /// Position of `hash` in registration order.
    pub fn reverse_index_of(&self, hash: u32) -> Option<usize> {
        self.prototypes.get_index_of(&hash)
    }

    /// Copies every prototype into a new hair list.
    pub fn clone_all(&self) -> HairList {
        self.prototypes
            .iter()
            .map(|(&hash, p)| (hash, p.clone_box()))
            .collect()
    }

    /// Creates one fresh instance of every type, with defaults for `dashes`.
    pub fn clone_all_for_dash(&self, dashes: usize) -> HairList {
        self.prototypes
            .iter()
            .map(|(&hash, p)| (hash, p.create_for_dash(dashes)))
            .collect()
    }
}
