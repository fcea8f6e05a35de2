//! Runtime storage.
//!
//! Items are addressed by a pallet prefix and an item name, the same pair a
//! migration uses to reach storage left behind by an older pallet version.
//! Values are stored `bincode`-encoded.

use parking_lot::RwLock;
use serde::{de::DeserializeOwned, Serialize};
use std::{collections::HashMap, sync::Arc};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("failed to decode {item}: {reason}")]
    Decode { item: String, reason: String },
    #[error("failed to encode {item}: {reason}")]
    Encode { item: String, reason: String },
}

fn item_name(prefix: &[u8], item: &[u8]) -> String {
    format!(
        "{}::{}",
        String::from_utf8_lossy(prefix),
        String::from_utf8_lossy(item)
    )
}

/// Raw key-value storage.
pub trait Storage {
    fn get(&self, prefix: &[u8], item: &[u8]) -> Option<Vec<u8>>;
    fn put(&self, prefix: &[u8], item: &[u8], value: Vec<u8>);
    fn kill(&self, prefix: &[u8], item: &[u8]);

    fn exists(&self, prefix: &[u8], item: &[u8]) -> bool {
        self.get(prefix, item).is_some()
    }

    /// Decode a value. `Ok(None)` if absent.
    fn get_value<T: DeserializeOwned>(
        &self,
        prefix: &[u8],
        item: &[u8],
    ) -> Result<Option<T>, StorageError>
    where
        Self: Sized,
    {
        self.get(prefix, item)
            .map(|raw| {
                bincode::deserialize(&raw).map_err(|e| StorageError::Decode {
                    item: item_name(prefix, item),
                    reason: e.to_string(),
                })
            })
            .transpose()
    }

    fn put_value<T: Serialize>(
        &self,
        prefix: &[u8],
        item: &[u8],
        value: &T,
    ) -> Result<(), StorageError>
    where
        Self: Sized,
    {
        let raw = bincode::serialize(value).map_err(|e| StorageError::Encode {
            item: item_name(prefix, item),
            reason: e.to_string(),
        })?;
        self.put(prefix, item, raw);

        Ok(())
    }
}

type Key = (Vec<u8>, Vec<u8>);

/// Storage that resides entirely in memory. Clones share the same data, so
/// several pallets of one runtime can hold a handle each.
#[derive(Clone, Default, Debug)]
pub struct MemoryStorage {
    items: Arc<RwLock<HashMap<Key, Vec<u8>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, prefix: &[u8], item: &[u8]) -> Option<Vec<u8>> {
        self.items
            .read()
            .get(&(prefix.to_vec(), item.to_vec()))
            .cloned()
    }

    fn put(&self, prefix: &[u8], item: &[u8], value: Vec<u8>) {
        self.items
            .write()
            .insert((prefix.to_vec(), item.to_vec()), value);
    }

    fn kill(&self, prefix: &[u8], item: &[u8]) {
        self.items.write().remove(&(prefix.to_vec(), item.to_vec()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_items() {
        let storage = MemoryStorage::new();
        let handle = storage.clone();

        storage.put_value(b"Pallet", b"Item", &42u32).unwrap();
        assert_eq!(handle.get_value::<u32>(b"Pallet", b"Item"), Ok(Some(42)));
        assert_eq!(handle.get_value::<u32>(b"Pallet", b"Other"), Ok(None));

        handle.kill(b"Pallet", b"Item");
        assert!(!storage.exists(b"Pallet", b"Item"));
        assert!(storage.is_empty());
    }

    #[test]
    fn decode_failure_names_item() {
        let storage = MemoryStorage::new();
        storage.put(b"Pallet", b"Item", vec![1]);

        match storage.get_value::<u64>(b"Pallet", b"Item") {
            Err(StorageError::Decode { item, .. }) => assert_eq!(item, "Pallet::Item"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
