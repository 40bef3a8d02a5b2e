// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Config service and storage port for the seeker client.
//!
//! The same port backs user preferences and durable session material; callers
//! keep the two apart by giving each its own store (namespace).

use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use std::sync::Mutex;
use thiserror::Error;

/// Storage port for raw config blobs (keyed by logical name).
pub trait ConfigStore {
    /// Load a raw config blob. Returns `NotFound` when missing.
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError>;
    /// Persist a raw config blob.
    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError>;
    /// Remove a single blob. Removing a missing key is not an error.
    fn remove_raw(&self, key: &str) -> Result<(), ConfigError>;
    /// Remove every blob held by this store.
    fn clear(&self) -> Result<(), ConfigError>;
}

/// Error type for config operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Key not present in store.
    #[error("not found")]
    NotFound,
    /// I/O error while reading/writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization/deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Catch-all error variant.
    #[error("other: {0}")]
    Other(String),
}

/// Thin service that serializes config values and delegates storage to a `ConfigStore`.
pub struct ConfigService<S> {
    store: S,
}

impl<S> ConfigService<S> {
    /// Create a new service using the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrow the inner store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Consume the service and return the inner store.
    pub fn into_inner(self) -> S {
        self.store
    }
}

impl<S> ConfigService<S>
where
    S: ConfigStore,
{
    /// Load and deserialize a config value for `key`. Returns `Ok(None)` if missing.
    pub fn load<T>(&self, key: &str) -> Result<Option<T>, ConfigError>
    where
        T: DeserializeOwned,
    {
        match self.store.load_raw(key) {
            Ok(bytes) => {
                if bytes.is_empty() {
                    return Ok(None);
                }
                let value = serde_json::from_slice(&bytes)?;
                Ok(Some(value))
            }
            Err(ConfigError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Serialize and persist a config value for `key`.
    pub fn save<T>(&self, key: &str, value: &T) -> Result<(), ConfigError>
    where
        T: Serialize,
    {
        let data = serde_json::to_vec_pretty(value)?;
        self.store.save_raw(key, &data)
    }

    /// Drop the value stored under `key`.
    pub fn remove(&self, key: &str) -> Result<(), ConfigError> {
        self.store.remove_raw(key)
    }

    /// Drop every value in the underlying store.
    pub fn clear(&self) -> Result<(), ConfigError> {
        self.store.clear()
    }
}

/// In-memory `ConfigStore` for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemConfigStore {
    blobs: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemConfigStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of blobs currently held.
    pub fn len(&self) -> usize {
        self.blobs.lock().map(|b| b.len()).unwrap_or(0)
    }

    /// True when no blobs are held.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned<T>(_: T) -> ConfigError {
    ConfigError::Other("memory store lock poisoned".into())
}

impl ConfigStore for MemConfigStore {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
        let blobs = self.blobs.lock().map_err(poisoned)?;
        blobs.get(key).cloned().ok_or(ConfigError::NotFound)
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        let mut blobs = self.blobs.lock().map_err(poisoned)?;
        blobs.insert(key.to_string(), data.to_vec());
        Ok(())
    }

    fn remove_raw(&self, key: &str) -> Result<(), ConfigError> {
        let mut blobs = self.blobs.lock().map_err(poisoned)?;
        blobs.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), ConfigError> {
        let mut blobs = self.blobs.lock().map_err(poisoned)?;
        blobs.clear();
        Ok(())
    }
}

impl<S: ConfigStore + ?Sized> ConfigStore for &S {
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
        (**self).load_raw(key)
    }

    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
        (**self).save_raw(key, data)
    }

    fn remove_raw(&self, key: &str) -> Result<(), ConfigError> {
        (**self).remove_raw(key)
    }

    fn clear(&self) -> Result<(), ConfigError> {
        (**self).clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Blob {
        name: String,
    }

    #[test]
    fn missing_key_loads_as_none() {
        let svc = ConfigService::new(MemConfigStore::new());
        let got: Option<Blob> = svc.load("nope").unwrap();
        assert!(got.is_none());
    }

    #[test]
    fn save_then_clear_drops_everything() {
        let svc = ConfigService::new(MemConfigStore::new());
        svc.save("a", &Blob { name: "x".into() }).unwrap();
        svc.save("b", &"plain string").unwrap();
        assert_eq!(
            svc.load::<Blob>("a").unwrap(),
            Some(Blob { name: "x".into() })
        );
        assert_eq!(svc.store().len(), 2);

        svc.clear().unwrap();
        assert!(svc.store().is_empty());
        assert!(svc.load::<Blob>("a").unwrap().is_none());
    }

    #[test]
    fn remove_is_idempotent() {
        let svc = ConfigService::new(MemConfigStore::new());
        svc.save("a", &1u32).unwrap();
        svc.remove("a").unwrap();
        svc.remove("a").unwrap();
        assert!(svc.load::<u32>("a").unwrap().is_none());
    }

    #[test]
    fn empty_blob_is_treated_as_missing() {
        let store = MemConfigStore::new();
        store.save_raw("a", b"").unwrap();
        let svc = ConfigService::new(store);
        assert!(svc.load::<u32>("a").unwrap().is_none());
    }
}
