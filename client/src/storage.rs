//! Persisted preferences: a single JSON object on disk, one entry per key.
//!
//! The display name lives under [`NAME_KEY`]; when absent a guest name is
//! synthesized instead.

use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;

use log::warn;
use rand::Rng;
use shared::constants::GUEST_NAME_RANGE;
use thiserror::Error;

/// Preference key for the display name.
pub const NAME_KEY: &str = "name";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read preference file: {0}")]
    Io(#[from] io::Error),
    #[error("preference file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Get/set of a named string. The `game` context only sees this seam.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
}

/// Disk-backed store. Writes are best-effort: a failed flush is logged, not
/// propagated, since losing a preference write is not fatal to the session.
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(text) => serde_json::from_str(&text)?,
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self { path, entries })
    }

    fn flush(&self) {
        let text = match serde_json::to_string_pretty(&self.entries) {
            Ok(text) => text,
            Err(err) => {
                warn!("could not serialize preferences: {err}");
                return;
            }
        };
        if let Err(err) = std::fs::write(&self.path, text) {
            warn!("could not persist preferences to {}: {err}", self.path.display());
        }
    }
}

impl PreferenceStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush();
    }
}

/// Ephemeral in-memory store for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore(BTreeMap<String, String>);

#[cfg(test)]
impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.0.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.0.insert(key.to_string(), value.to_string());
    }
}

/// Synthesize a `Guest<0..999>` name.
pub fn guest_name() -> String {
    format!("Guest{}", rand::thread_rng().gen_range(0..GUEST_NAME_RANGE))
}

/// Resolve the display name: persisted preference first, guest fallback.
pub fn display_name(store: &dyn PreferenceStore) -> String {
    store.get(NAME_KEY).unwrap_or_else(guest_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persisted_name_wins_over_the_guest_fallback() {
        let mut store = MemoryStore::default();
        store.set(NAME_KEY, "Alice");
        assert_eq!(display_name(&store), "Alice");
    }

    #[test]
    fn missing_name_yields_a_guest_name_in_range() {
        let store = MemoryStore::default();
        let name = display_name(&store);
        let suffix: u32 = name
            .strip_prefix("Guest")
            .expect("guest prefix")
            .parse()
            .expect("numeric suffix");
        assert!(suffix < GUEST_NAME_RANGE);
    }

    #[test]
    fn file_store_round_trips_through_disk() {
        let dir = std::env::temp_dir().join(format!("prefs-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("prefs.json");

        {
            let mut store = JsonFileStore::open(&path).unwrap();
            store.set(NAME_KEY, "Bob");
        }
        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.get(NAME_KEY).as_deref(), Some("Bob"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn opening_a_missing_file_starts_empty() {
        let store = JsonFileStore::open("/nonexistent/never-created.json");
        // The parent directory does not exist either, but reads only see
        // NotFound at open time.
        match store {
            Ok(store) => assert_eq!(store.get(NAME_KEY), None),
            Err(StorageError::Io(_)) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
}
