//! Client-local persisted state: reading history and bookmarks.

pub mod bookmarks;
pub mod history;

use log::{debug, warn};
use serde::{de::DeserializeOwned, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

pub use bookmarks::BookmarkEntry;
pub use history::{HistoryEntry, HistoryUpdate};

pub const STORAGE_HISTORY: &str = "comic_history";
pub const STORAGE_BOOKMARKS: &str = "comic_bookmarks";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// String key-value storage with JSON helpers on top.
pub trait KeyValueStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>>;
    fn set_raw(&self, key: &str, value: &str) -> Result<()>;

    fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get_raw(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        self.set_raw(key, &serde_json::to_string(value)?)
    }
}

/// One `<key>.json` file per key under a directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// History and bookmarks over a [`KeyValueStore`].
///
/// Unreadable data reads as empty and failed writes are logged, so local
/// storage problems never abort a navigation.
pub struct LocalState<S> {
    store: S,
}

impl<S: KeyValueStore> LocalState<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        match self.store.get::<Vec<T>>(key) {
            Ok(entries) => entries.unwrap_or_default(),
            Err(e) => {
                warn!("Unable to read {}: {}, starting empty", key, e);
                Vec::new()
            }
        }
    }

    fn save<T: Serialize>(&self, key: &str, entries: &[T]) {
        if let Err(e) = self.store.set(key, entries) {
            warn!("Unable to write {}: {}", key, e);
        }
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.load(STORAGE_HISTORY)
    }

    pub fn last_read(&self, slug: &str) -> Option<HistoryEntry> {
        history::find(&self.history(), slug).cloned()
    }

    pub fn save_history(&self, update: HistoryUpdate) {
        debug!("Recording history for {}", update.slug);
        let mut entries = self.history();
        history::record(&mut entries, update, now_millis());
        self.save(STORAGE_HISTORY, &entries);
    }

    pub fn bookmarks(&self) -> Vec<BookmarkEntry> {
        self.load(STORAGE_BOOKMARKS)
    }

    pub fn is_bookmarked(&self, slug: &str) -> bool {
        bookmarks::contains(&self.bookmarks(), slug)
    }

    /// Returns whether the comic is bookmarked afterwards.
    pub fn toggle_bookmark(&self, entry: BookmarkEntry) -> bool {
        let mut entries = self.bookmarks();
        let added = bookmarks::toggle(&mut entries, entry);
        self.save(STORAGE_BOOKMARKS, &entries);
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_roundtrips_json() {
        let store = MemoryStore::default();
        assert_eq!(store.get::<Vec<u32>>("k").unwrap(), None);
        store.set("k", &[1u32, 2]).unwrap();
        assert_eq!(store.get::<Vec<u32>>("k").unwrap(), Some(vec![1, 2]));
    }

    #[test]
    fn file_store_persists_between_instances() {
        let dir = std::env::temp_dir().join(format!("comic-state-{}", uuid::Uuid::new_v4()));

        let state = LocalState::new(FileStore::new(dir.clone()));
        state.save_history(HistoryUpdate::comic("one-piece", Some("One Piece"), None));
        assert!(state.toggle_bookmark(BookmarkEntry {
            slug: "one-piece".into(),
            title: "One Piece".into(),
            image: "op.jpg".into(),
        }));

        let reopened = LocalState::new(FileStore::new(dir.clone()));
        assert_eq!(reopened.history()[0].title, "One Piece");
        assert!(reopened.is_bookmarked("one-piece"));

        fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn corrupt_data_reads_as_empty() {
        let store = MemoryStore::default();
        store.set_raw(STORAGE_HISTORY, "{not json").unwrap();
        let state = LocalState::new(store);
        assert!(state.history().is_empty());

        state.save_history(HistoryUpdate::comic("x", None, None));
        assert_eq!(state.history().len(), 1);
    }
}
