use std::io;
use std::path::PathBuf;

/// Errors raised by [`super::ConfigStore`]
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("value {value:?} for [{section}] {key} would not read back unchanged")]
    Unstorable {
        section: String,
        key: String,
        value: String,
    },

    #[error("failed to write config file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}
