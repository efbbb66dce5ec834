//! Configuration management
//!
//! [`ConfigStore`] mirrors one INI file: every poll reloads a fresh snapshot,
//! every write is a synchronous read-modify-write of the whole file.

pub mod document;
pub mod error;
pub mod settings;

pub use document::Document;
pub use error::StoreError;
pub use settings::{AssetPaths, OverlaySettings, resolve_config_path};

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, info, trace, warn};

/// Text-backed section/key/value store
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    snapshot: Document,
}

impl ConfigStore {
    /// Open a store and take an initial snapshot. A missing or unreadable file
    /// leaves the snapshot empty; reads fall back until a later `load` succeeds.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let mut store = Self {
            path: path.into(),
            snapshot: Document::default(),
        };
        if let Err(e) = store.load() {
            warn!(error = %e, "Initial config load failed, using fallbacks");
        }
        store
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the backing file. On failure the previous snapshot is kept.
    pub fn load(&mut self) -> Result<&Document, StoreError> {
        self.snapshot = self.read_document()?;
        trace!(sections = ?self.snapshot.section_names(), "Config snapshot loaded");
        Ok(&self.snapshot)
    }

    /// Last successfully loaded snapshot
    pub fn snapshot(&self) -> &Document {
        &self.snapshot
    }

    /// Value of `section`/`key` in the current snapshot, or `fallback`
    pub fn get(&self, section: &str, key: &str, fallback: &str) -> String {
        self.snapshot
            .get(section, key)
            .unwrap_or(fallback)
            .to_string()
    }

    /// Write `value` and persist the whole file before returning. Values that
    /// would not read back unchanged (line breaks, surrounding whitespace, an
    /// inline comment marker after whitespace) are rejected.
    pub fn set(&mut self, section: &str, key: &str, value: &str) -> Result<(), StoreError> {
        check_storable(section, key, value)?;
        let mut doc = self.read_existing()?;
        doc.set(section, key, value);
        self.persist(&doc)?;
        self.snapshot = doc;

        debug!(section = %section, key = %key, value = %value, "Config value written");
        Ok(())
    }

    /// Reset `section`/`key` to `default` if it exists. Returns whether a write
    /// happened.
    pub fn reset_to_default(
        &mut self,
        section: &str,
        key: &str,
        default: &str,
    ) -> Result<bool, StoreError> {
        check_storable(section, key, default)?;
        let mut doc = self.read_existing()?;
        if doc.get(section, key).is_none() {
            debug!(section = %section, key = %key, "Reset skipped, key not present");
            self.snapshot = doc;
            return Ok(false);
        }

        doc.set(section, key, default);
        self.persist(&doc)?;
        self.snapshot = doc;
        info!(section = %section, key = %key, "Config value reset to default");
        Ok(true)
    }

    /// Strict existence check before any write, then a fresh read
    fn read_existing(&self) -> Result<Document, StoreError> {
        if !self.path.exists() {
            return Err(StoreError::NotFound {
                path: self.path.clone(),
            });
        }
        self.read_document()
    }

    fn read_document(&self) -> Result<Document, StoreError> {
        let bytes = fs::read(&self.path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => StoreError::NotFound {
                path: self.path.clone(),
            },
            _ => StoreError::Read {
                path: self.path.clone(),
                source,
            },
        })?;
        Ok(Document::parse(&String::from_utf8_lossy(&bytes)))
    }

    /// Full rewrite through a temp file next to the real file, so a failed
    /// write never leaves a truncated config behind. Symlinks are resolved
    /// first and the file they point to is replaced, not the link.
    fn persist(&self, doc: &Document) -> Result<(), StoreError> {
        let write_err = |source: std::io::Error| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        let target = fs::canonicalize(&self.path).unwrap_or_else(|_| self.path.clone());
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
        tmp.write_all(doc.render().as_bytes()).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;

        if let Ok(metadata) = fs::metadata(&target) {
            tmp.as_file()
                .set_permissions(metadata.permissions())
                .map_err(write_err)?;
        }

        tmp.persist(&target).map_err(|e| write_err(e.error))?;
        Ok(())
    }
}

fn check_storable(section: &str, key: &str, value: &str) -> Result<(), StoreError> {
    if Document::stores_verbatim(value) {
        return Ok(());
    }
    Err(StoreError::Unstorable {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Read-only directories for write-failure tests
#[cfg(all(test, unix))]
pub(crate) mod readonly {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    /// Make `dir` read-only. Returns false when the current user can still
    /// create files in it (running as root), in which case the caller should
    /// skip its assertions.
    pub fn lock(dir: &Path) -> bool {
        fs::set_permissions(dir, fs::Permissions::from_mode(0o555)).unwrap();
        let check = dir.join(".write-check");
        if fs::File::create(&check).is_ok() {
            let _ = fs::remove_file(&check);
            unlock(dir);
            return false;
        }
        true
    }

    pub fn unlock(dir: &Path) {
        fs::set_permissions(dir, fs::Permissions::from_mode(0o755)).unwrap();
    }
}
