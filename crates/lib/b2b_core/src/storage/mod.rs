//! Persisted key/value storage for tokens, the user record and the active
//! customer.
//!
//! Values are plain strings; structured values are stored as JSON text,
//! the same way browser local storage holds them.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use thiserror::Error;

/// Keys written by the session and active-customer contexts.
pub mod keys {
    pub const TOKEN: &str = "token";
    pub const USER: &str = "user";
    pub const USER_TYPE: &str = "userType";
    pub const ACTIVE_CUSTOMER: &str = "activeCustomer";
    /// Written by the older login flow; only read to migrate it to [`TOKEN`].
    pub const LEGACY_AUTH_TOKEN: &str = "authToken";

    /// Everything that belongs to a signed-in session.
    pub const SESSION: &[&str] = &[TOKEN, USER, USER_TYPE, LEGACY_AUTH_TOKEN];
}

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("Storage lock poisoned")]
    Poisoned,
}

/// String key/value storage shared by the session and active-customer
/// contexts.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Remove every key in `keys`, stopping at the first failure.
pub fn remove_all(store: &dyn KeyValueStore, keys: &[&str]) -> Result<(), StorageError> {
    for key in keys {
        store.remove(key)?;
    }
    Ok(())
}
