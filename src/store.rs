//! Backing-store abstraction.
//!
//! The core's only I/O dependency. Anything satisfying [`DocStore`] — local
//! disk, an in-memory map, a remote blob store behind a synchronous adapter —
//! is usable unmodified by the builder and resolver.

use std::{collections::BTreeMap, fs, path::PathBuf};

use crate::{error::InlayError, paths::os_path_to_string};

/// Synchronous read-only document store.
///
/// Locations are `/`-separated strings relative to the store root.
pub trait DocStore {
    fn read(&self, location: &str) -> Result<Vec<u8>, InlayError>;
    fn exists(&self, location: &str) -> bool;

    /// Read and decode as UTF-8. Default built on [`DocStore::read`].
    fn read_string(&self, location: &str) -> Result<String, InlayError> {
        let bytes = self.read(location)?;
        String::from_utf8(bytes).map_err(|e| {
            InlayError::Serialization(format!("'{location}' is not valid UTF-8: {e}"))
        })
    }
}

/// Local-disk store rooted at a directory.
#[derive(Debug, Clone)]
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DiskStore { root: root.into() }
    }

    fn full_path(&self, location: &str) -> PathBuf {
        self.root.join(location)
    }
}

impl DocStore for DiskStore {
    fn read(&self, location: &str) -> Result<Vec<u8>, InlayError> {
        let path = self.full_path(location);
        tracing::debug!("Reading {}", os_path_to_string(&path));
        Ok(fs::read(path)?)
    }

    fn exists(&self, location: &str) -> bool {
        self.full_path(location).is_file()
    }
}

/// In-memory store.
///
/// Primarily a test double, but also the shape a virtual filesystem or
/// pre-fetched remote snapshot takes when handed to the builder.
#[derive(Debug, Default, Clone)]
pub struct MemStore {
    files: BTreeMap<String, Vec<u8>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, location: impl Into<String>, content: impl Into<Vec<u8>>) {
        self.files.insert(location.into(), content.into());
    }

    /// Builder-style convenience for test setup.
    pub fn with(mut self, location: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        self.insert(location, content);
        self
    }
}

impl DocStore for MemStore {
    fn read(&self, location: &str) -> Result<Vec<u8>, InlayError> {
        self.files
            .get(location)
            .cloned()
            .ok_or_else(|| InlayError::NotFound(format!("'{location}' not present in store")))
    }

    fn exists(&self, location: &str) -> bool {
        self.files.contains_key(location)
    }
}
