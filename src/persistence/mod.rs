//! Snapshot persistence for the stores
//!
//! Each store is written as one JSON value under its own key. Stores opt in
//! by implementing [`Snapshot`].

mod file;
mod memory;
mod traits;

pub use file::FileBlobStore;
pub use memory::MemoryBlobStore;
pub use traits::{BlobStore, StorageError};

#[cfg(test)]
pub use traits::MockBlobStore;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// State that is saved and restored as a whole under a fixed key
pub trait Snapshot: Serialize + DeserializeOwned + Default {
    const KEY: &'static str;

    /// Restore from `store`, or the default state when nothing was saved
    fn load(store: &dyn BlobStore) -> Result<Self, StorageError> {
        let Some(raw) = store.get(Self::KEY)? else {
            return Ok(Self::default());
        };
        serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt {
            key: Self::KEY.to_string(),
            source,
        })
    }

    fn save(&self, store: &mut dyn BlobStore) -> Result<(), StorageError> {
        let raw = serde_json::to_string(self).map_err(|source| StorageError::Encode {
            key: Self::KEY.to_string(),
            source,
        })?;
        store.set(Self::KEY, &raw)
    }
}
