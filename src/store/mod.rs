use serde::de::DeserializeOwned;
use serde::Serialize;

pub mod file;
pub mod memory;

/// The edited document, serialized wholesale.
pub const DATA_KEY: &str = "fyfa-admin-data";
/// Admin account: username and password hash.
pub const ACCOUNT_KEY: &str = "fyfa-admin-session";
/// Admin UI preferences.
pub const PREFERENCES_KEY: &str = "fyfa-admin-preferences";

/// String key-value persistence. Every admin write goes through here.
/// Implementations: `FileStore` (one JSON file on disk) and `MemoryStore`.
///
/// Readers must tolerate a missing key: the first run has nothing stored.
pub trait Store: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), String>;

    fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

/// Read and decode a JSON value. Absent or malformed values read as `None`.
pub fn read_json<T: DeserializeOwned>(store: &dyn Store, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(v) => Some(v),
        Err(e) => {
            log::warn!("Ignoring malformed value under {}: {}", key, e);
            None
        }
    }
}

pub fn write_json<T: Serialize>(store: &dyn Store, key: &str, value: &T) -> Result<(), String> {
    let raw = serde_json::to_string(value).map_err(|e| e.to_string())?;
    store.set(key, &raw)
}
