//! Whole-tree load/save under one storage key.
//!
//! # Responsibility
//! - Encode `HomeworkData` as the JSON record shared with older clients.
//! - Decode it back, treating an absent record as an empty tree.
//!
//! # Invariants
//! - `save` then `load` yields a structurally equal tree.
//! - Log lines carry sizes and counts only, never task content.

use super::{KeyValueStore, StoreError, StoreResult};
use crate::model::homework::HomeworkData;
use log::{error, info};
use std::time::Instant;

/// Storage key shared with previously stored records.
pub const DEFAULT_STORAGE_KEY: &str = "homeworkData";

/// Tree persistence handle over a key-value backend.
pub struct HomeworkStore<S: KeyValueStore> {
    kv: S,
    key: String,
}

impl<S: KeyValueStore> HomeworkStore<S> {
    /// Uses `DEFAULT_STORAGE_KEY`.
    pub fn new(kv: S) -> Self {
        Self::with_key(kv, DEFAULT_STORAGE_KEY)
    }

    pub fn with_key(kv: S, key: impl Into<String>) -> Self {
        Self {
            kv,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Reads the full tree.
    ///
    /// # Errors
    /// - Backend failures are returned unchanged.
    /// - `StoreError::InvalidData` when the record is not valid JSON of the
    ///   expected shape.
    pub fn load(&self) -> StoreResult<HomeworkData> {
        let Some(raw) = self.kv.get(&self.key)? else {
            info!(
                "event=store_load module=store status=ok key={} found=false",
                self.key
            );
            return Ok(HomeworkData::default());
        };

        let data = serde_json::from_str::<HomeworkData>(&raw).map_err(|err| {
            error!(
                "event=store_load module=store status=error key={} bytes={} error_code=decode_failed",
                self.key,
                raw.len()
            );
            StoreError::InvalidData {
                key: self.key.clone(),
                message: err.to_string(),
            }
        })?;

        info!(
            "event=store_load module=store status=ok key={} found=true bytes={} subjects={}",
            self.key,
            raw.len(),
            data.subjects.len()
        );
        Ok(data)
    }

    /// Overwrites the stored record with the full tree.
    pub fn save(&self, data: &HomeworkData) -> StoreResult<()> {
        let started_at = Instant::now();
        let encoded = serde_json::to_string(data).map_err(StoreError::Encode)?;

        match self.kv.set(&self.key, &encoded) {
            Ok(()) => {
                info!(
                    "event=store_save module=store status=ok key={} bytes={} duration_ms={}",
                    self.key,
                    encoded.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=store_save module=store status=error key={} duration_ms={} error={}",
                    self.key,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{HomeworkStore, DEFAULT_STORAGE_KEY};
    use crate::model::homework::HomeworkData;
    use crate::store::{KeyValueStore, MemoryKvStore, StoreError};

    #[test]
    fn missing_record_loads_empty_tree() {
        let store = HomeworkStore::new(MemoryKvStore::new());
        assert_eq!(store.load().unwrap(), HomeworkData::default());
        assert_eq!(store.key(), DEFAULT_STORAGE_KEY);
    }

    #[test]
    fn corrupt_record_is_invalid_data() {
        let kv = MemoryKvStore::new();
        kv.set(DEFAULT_STORAGE_KEY, "{not json").unwrap();
        let store = HomeworkStore::new(kv);
        let err = store.load().unwrap_err();
        assert!(matches!(err, StoreError::InvalidData { ref key, .. } if key == "homeworkData"));
    }

    #[test]
    fn empty_object_loads_empty_tree() {
        let kv = MemoryKvStore::new();
        kv.set("custom", "{}").unwrap();
        let store = HomeworkStore::with_key(kv, "custom");
        assert!(store.load().unwrap().subjects.is_empty());
    }
}
