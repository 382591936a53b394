//! Session Storage
//!
//! A small key/value abstraction standing in for browser local storage. The cart and the
//! signed-in user are each persisted as one JSON document under a fixed key.

use std::io;

use rustc_hash::FxHashMap;
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

/// Key holding the serialized cart.
pub const CART_KEY: &str = "cart";

/// Key holding the serialized signed-in user.
pub const USER_KEY: &str = "user";

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not be read or written.
    #[error("storage I/O error")]
    Io(#[from] io::Error),

    /// A stored document could not be encoded or decoded.
    #[error("stored document is not valid JSON")]
    Json(#[from] serde_json::Error),
}

/// Durable key/value storage for session state.
pub trait Storage {
    /// Read the raw value stored under `key`, if any.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend cannot be read.
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend cannot be written.
    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the backend cannot be written.
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// Load and decode the JSON document stored under `key`.
///
/// # Errors
///
/// Returns a [`StorageError`] if the backend fails or the document does not decode.
pub fn load_json<T: DeserializeOwned>(
    storage: &impl Storage,
    key: &str,
) -> Result<Option<T>, StorageError> {
    storage
        .load(key)?
        .map(|raw| serde_json::from_str(&raw))
        .transpose()
        .map_err(StorageError::from)
}

/// Encode `value` as JSON and store it under `key`.
///
/// # Errors
///
/// Returns a [`StorageError`] if encoding or the backend fails.
pub fn save_json<T: Serialize + ?Sized>(
    storage: &mut impl Storage,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw = serde_json::to_string(value)?;

    storage.save(key, &raw)
}

/// In-memory storage, used in tests and for throwaway sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: FxHashMap<String, String>,
}

impl MemoryStorage {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());

        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn load_missing_key_returns_none() -> TestResult {
        let storage = MemoryStorage::new();

        assert_eq!(storage.load(CART_KEY)?, None);

        Ok(())
    }

    #[test]
    fn json_round_trip() -> TestResult {
        let mut storage = MemoryStorage::new();

        save_json(&mut storage, USER_KEY, &vec![1, 2, 3])?;

        let loaded: Option<Vec<i32>> = load_json(&storage, USER_KEY)?;

        assert_eq!(loaded, Some(vec![1, 2, 3]));

        Ok(())
    }

    #[test]
    fn remove_deletes_key() -> TestResult {
        let mut storage = MemoryStorage::new();

        storage.save(CART_KEY, "[]")?;
        storage.remove(CART_KEY)?;
        storage.remove(CART_KEY)?;

        assert_eq!(storage.load(CART_KEY)?, None);

        Ok(())
    }

    #[test]
    fn corrupt_document_is_a_json_error() -> TestResult {
        let mut storage = MemoryStorage::new();

        storage.save(CART_KEY, "{not json")?;

        let loaded: Result<Option<Vec<i32>>, StorageError> = load_json(&storage, CART_KEY);

        assert!(matches!(loaded, Err(StorageError::Json(_))));

        Ok(())
    }
}
