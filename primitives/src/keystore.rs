//! Local key storage used by authoring nodes.

use parking_lot::RwLock;
use std::collections::HashMap;
use thiserror::Error;

use crate::crypto::{NimbusId, NimbusPair, NimbusSignature};

/// Four-byte tag naming a family of keys.
pub type KeyTypeId = [u8; 4];

/// Keystore error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeystoreError {
    #[error("keystore is unavailable: {0}")]
    Unavailable(String),
}

/// A store of author keys able to sign on their behalf.
pub trait Keystore: Send + Sync {
    /// Public keys of the given type, in insertion order.
    fn keys(&self, key_type: KeyTypeId) -> Vec<NimbusId>;

    /// Whether the keystore holds the private half of `public`.
    fn has_key(&self, key_type: KeyTypeId, public: &NimbusId) -> bool;

    /// Sign `message` with the key. `Ok(None)` if the key is not held.
    fn sign_with(
        &self,
        key_type: KeyTypeId,
        public: &NimbusId,
        message: &[u8],
    ) -> Result<Option<NimbusSignature>, KeystoreError>;
}

#[derive(Default)]
struct KeySet {
    order: Vec<NimbusId>,
    pairs: HashMap<NimbusId, NimbusPair>,
}

/// In-memory keystore.
#[derive(Default)]
pub struct MemoryKeystore {
    keys: RwLock<HashMap<KeyTypeId, KeySet>>,
}

impl MemoryKeystore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a key pair. Re-inserting an existing key keeps its position.
    pub fn insert(&self, key_type: KeyTypeId, pair: NimbusPair) -> NimbusId {
        let public = pair.public();
        let mut keys = self.keys.write();
        let set = keys.entry(key_type).or_default();

        if set.pairs.insert(public, pair).is_none() {
            set.order.push(public);
        }

        public
    }

    pub fn insert_seed(&self, key_type: KeyTypeId, seed: &[u8; 32]) -> NimbusId {
        self.insert(key_type, NimbusPair::from_seed(seed))
    }

    pub fn generate(&self, key_type: KeyTypeId) -> NimbusId {
        self.insert(key_type, NimbusPair::generate())
    }
}

impl Keystore for MemoryKeystore {
    fn keys(&self, key_type: KeyTypeId) -> Vec<NimbusId> {
        self.keys
            .read()
            .get(&key_type)
            .map(|set| set.order.clone())
            .unwrap_or_default()
    }

    fn has_key(&self, key_type: KeyTypeId, public: &NimbusId) -> bool {
        self.keys
            .read()
            .get(&key_type)
            .map_or(false, |set| set.pairs.contains_key(public))
    }

    fn sign_with(
        &self,
        key_type: KeyTypeId,
        public: &NimbusId,
        message: &[u8],
    ) -> Result<Option<NimbusSignature>, KeystoreError> {
        Ok(self
            .keys
            .read()
            .get(&key_type)
            .and_then(|set| set.pairs.get(public))
            .map(|pair| pair.sign(message)))
    }
}
