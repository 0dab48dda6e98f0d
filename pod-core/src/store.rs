//! File-backed persistence ports and stores.
//!
//! A [`DataPort`] moves an opaque byte blob in and out of storage. Stores sit
//! on top of a port and hold the decoded value: [`JsonStore`] for any serde
//! type, [`TextStore`] for UTF-8 text. [`FileStoreManager`] maps path-like
//! names onto files under the application home directory.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{AppError, Require};
use crate::location;

/// Name of the application home directory under the platform data root.
pub const APP_HOME_DIR: &str = "PrintOnDemand";

/// Errors that can occur during store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// A file name escapes the home directory or is empty.
    #[error("Invalid file name: {0}")]
    InvalidName(String),
    /// An application-level failure, such as saving an empty store.
    #[error(transparent)]
    App(#[from] AppError),
}

/// Byte-level access to a single stored blob.
pub trait DataPort: Send + Sync {
    /// Human-readable description of the backing location.
    fn meta(&self) -> String;

    /// Read the whole blob.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob cannot be read.
    fn pull(&self) -> Result<Vec<u8>, StoreError>;

    /// Replace the whole blob.
    ///
    /// # Errors
    ///
    /// Returns an error if the blob cannot be written.
    fn push(&self, data: &[u8]) -> Result<(), StoreError>;
}

/// A [`DataPort`] backed by a single file. Failures are logged, then returned.
#[derive(Debug, Clone)]
pub struct FileDataPort {
    path: PathBuf,
}

impl FileDataPort {
    /// Create a port for `path`. The file need not exist yet.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataPort for FileDataPort {
    fn meta(&self) -> String {
        self.path.display().to_string()
    }

    fn pull(&self) -> Result<Vec<u8>, StoreError> {
        fs::read(&self.path).map_err(|e| {
            tracing::error!(port = %self.meta(), error = %e, "pull failed");
            StoreError::Io(e)
        })
    }

    fn push(&self, data: &[u8]) -> Result<(), StoreError> {
        fs::write(&self.path, data).map_err(|e| {
            tracing::error!(port = %self.meta(), error = %e, "push failed");
            StoreError::Io(e)
        })
    }
}

/// In-memory [`DataPort`], handy for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryDataPort {
    blob: Mutex<Option<Vec<u8>>>,
}

impl MemoryDataPort {
    /// Create an empty port.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl DataPort for MemoryDataPort {
    fn meta(&self) -> String {
        "memory".to_string()
    }

    fn pull(&self) -> Result<Vec<u8>, StoreError> {
        let guard = self.blob.lock().map_err(|_| poisoned())?;
        guard.clone().ok_or_else(|| {
            StoreError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "nothing stored",
            ))
        })
    }

    fn push(&self, data: &[u8]) -> Result<(), StoreError> {
        let mut guard = self.blob.lock().map_err(|_| poisoned())?;
        *guard = Some(data.to_vec());
        Ok(())
    }
}

fn poisoned() -> StoreError {
    StoreError::App(AppError::runtime("memory port lock poisoned", location!()))
}

/// A JSON document held in memory and synchronized through a [`DataPort`].
pub struct JsonStore<T> {
    port: Box<dyn DataPort>,
    data: Option<T>,
}

impl<T> std::fmt::Debug for JsonStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonStore")
            .field("port", &self.port.meta())
            .field("loaded", &self.data.is_some())
            .finish()
    }
}

impl<T: Serialize + DeserializeOwned> JsonStore<T> {
    /// Create an empty store over `port`. Call [`load`](Self::load) to read it.
    #[must_use]
    pub fn new(port: Box<dyn DataPort>) -> Self {
        Self { port, data: None }
    }

    /// The current value.
    #[must_use]
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Mutable access to the current value.
    pub fn data_mut(&mut self) -> Option<&mut T> {
        self.data.as_mut()
    }

    /// Replace the current value without saving.
    pub fn set(&mut self, value: T) {
        self.data = Some(value);
    }

    /// Read and decode from the port.
    ///
    /// On failure the error is logged and the current value is kept.
    /// Returns whether the load succeeded.
    pub fn load(&mut self) -> bool {
        let decoded = self
            .port
            .pull()
            .and_then(|bytes| serde_json::from_slice(&bytes).map_err(StoreError::from));
        match decoded {
            Ok(value) => {
                self.data = Some(value);
                true
            }
            Err(e) => {
                tracing::error!(store = %self.port.meta(), error = %e, "load failed");
                false
            }
        }
    }

    /// Encode and write the current value.
    ///
    /// # Errors
    ///
    /// Returns an error (after logging it) if there is no value to save or the
    /// port rejects the write.
    pub fn save(&self) -> Result<(), StoreError> {
        let result = self
            .data
            .as_ref()
            .require(location!())
            .map_err(StoreError::from)
            .and_then(|value| serde_json::to_vec_pretty(value).map_err(StoreError::from))
            .and_then(|bytes| self.port.push(&bytes));
        if let Err(e) = &result {
            tracing::error!(store = %self.port.meta(), error = %e, "save failed");
        }
        result
    }
}

/// UTF-8 text held in memory and synchronized through a [`DataPort`].
pub struct TextStore {
    port: Box<dyn DataPort>,
    data: String,
}

impl std::fmt::Debug for TextStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextStore")
            .field("port", &self.port.meta())
            .field("len", &self.data.len())
            .finish()
    }
}

impl TextStore {
    /// Create an empty store over `port`.
    #[must_use]
    pub fn new(port: Box<dyn DataPort>) -> Self {
        Self {
            port,
            data: String::new(),
        }
    }

    /// The current text.
    #[must_use]
    pub fn data(&self) -> &str {
        &self.data
    }

    /// Replace the current text without saving.
    pub fn set(&mut self, text: impl Into<String>) {
        self.data = text.into();
    }

    /// Read from the port. Invalid UTF-8 loads as empty text.
    ///
    /// On failure the error is logged and the current text is kept.
    pub fn load(&mut self) -> bool {
        match self.port.pull() {
            Ok(bytes) => {
                self.data = String::from_utf8(bytes).unwrap_or_default();
                true
            }
            Err(e) => {
                tracing::error!(store = %self.port.meta(), error = %e, "load failed");
                false
            }
        }
    }

    /// Write the current text.
    ///
    /// # Errors
    ///
    /// Returns an error (after logging it) if the port rejects the write.
    pub fn save(&self) -> Result<(), StoreError> {
        self.port.push(self.data.as_bytes()).inspect_err(|e| {
            tracing::error!(store = %self.port.meta(), error = %e, "save failed");
        })
    }
}

/// Resolves slash-separated names to files under the application home.
#[derive(Debug, Clone)]
pub struct FileStoreManager {
    home: PathBuf,
}

impl FileStoreManager {
    /// Use `root/PrintOnDemand` as the home directory, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, StoreError> {
        let home = root.as_ref().join(APP_HOME_DIR);
        fs::create_dir_all(&home).inspect_err(|e| {
            tracing::error!(home = %home.display(), error = %e, "cannot create home directory");
        })?;
        Ok(Self { home })
    }

    /// The home directory.
    #[must_use]
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Resolve `name` (e.g. `"history/submissions.json"`) and create its parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty, tries to leave the home
    /// directory, or the parent directories cannot be created.
    pub fn file_path(&self, name: &str) -> Result<PathBuf, StoreError> {
        let mut path = self.home.clone();
        let mut segments = 0usize;
        for segment in name.split('/').filter(|s| !s.is_empty()) {
            if !matches!(Path::new(segment).components().next(), Some(Component::Normal(_)))
                || Path::new(segment).components().count() != 1
            {
                return Err(StoreError::InvalidName(name.to_string()));
            }
            path.push(segment);
            segments += 1;
        }
        if segments == 0 {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(path)
    }

    /// A [`FileDataPort`] for `name`.
    ///
    /// # Errors
    ///
    /// Same as [`file_path`](Self::file_path).
    pub fn port(&self, name: &str) -> Result<FileDataPort, StoreError> {
        self.file_path(name).map(FileDataPort::new)
    }

    /// Delete the file for `name` if it exists.
    ///
    /// Returns whether a file was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or the file cannot be removed.
    pub fn remove_file(&self, name: &str) -> Result<bool, StoreError> {
        let path = self.file_path(name)?;
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).inspect_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "remove failed");
        })?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Prefs {
        color: String,
        count: u32,
    }

    #[test]
    fn test_json_store_round_trip_through_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let manager = FileStoreManager::new(dir.path()).expect("manager");
        let port = manager.port("prefs/editor.json").expect("port");

        let mut store = JsonStore::new(Box::new(port.clone()));
        store.set(Prefs {
            color: "navy".to_string(),
            count: 3,
        });
        store.save().expect("save");

        let mut reloaded: JsonStore<Prefs> = JsonStore::new(Box::new(port));
        assert!(reloaded.load());
        assert_eq!(reloaded.data(), store.data());
    }

    #[test]
    fn test_json_store_failed_load_keeps_state() {
        let port = MemoryDataPort::new();
        port.push(b"not json").expect("push");
        let mut store = JsonStore::new(Box::new(port));
        store.set(Prefs {
            color: "red".to_string(),
            count: 1,
        });
        assert!(!store.load());
        assert_eq!(store.data().map(|p| p.count), Some(1));
    }

    #[test]
    fn test_json_store_save_without_value_is_nil() {
        let store: JsonStore<Prefs> = JsonStore::new(Box::new(MemoryDataPort::new()));
        match store.save() {
            Err(StoreError::App(e)) => assert_eq!(e.kind(), ErrorKind::Nil),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_text_store_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let manager = FileStoreManager::new(dir.path()).expect("manager");
        let mut store = TextStore::new(Box::new(manager.port("notes.txt").expect("port")));
        store.set("hello");
        store.save().expect("save");

        let mut reloaded = TextStore::new(Box::new(manager.port("notes.txt").expect("port")));
        assert!(reloaded.load());
        assert_eq!(reloaded.data(), "hello");
    }

    #[test]
    fn test_file_port_pull_missing_file_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let port = FileDataPort::new(dir.path().join("missing.bin"));
        assert!(matches!(port.pull(), Err(StoreError::Io(_))));
    }

    #[test]
    fn test_manager_nests_and_creates_parents() {
        let dir = tempfile::tempdir().expect("tempdir");
        let manager = FileStoreManager::new(dir.path()).expect("manager");
        let path = manager.file_path("a/b/c.json").expect("path");
        assert_eq!(path, dir.path().join(APP_HOME_DIR).join("a").join("b").join("c.json"));
        assert!(path.parent().expect("parent").is_dir());
    }

    #[test]
    fn test_manager_rejects_escaping_names() {
        let dir = tempfile::tempdir().expect("tempdir");
        let manager = FileStoreManager::new(dir.path()).expect("manager");
        assert!(matches!(
            manager.file_path("../outside.json"),
            Err(StoreError::InvalidName(_))
        ));
        assert!(matches!(manager.file_path("//"), Err(StoreError::InvalidName(_))));
    }

    #[test]
    fn test_remove_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let manager = FileStoreManager::new(dir.path()).expect("manager");
        assert!(!manager.remove_file("gone.txt").expect("remove"));
        manager.port("gone.txt").expect("port").push(b"x").expect("push");
        assert!(manager.remove_file("gone.txt").expect("remove"));
    }
}
