//! Error types for the registry layer
//!
//! - Scan failures are per subtree and never stop a scan
//! - Store failures are per record; write failures are fatal to a pass

use std::path::{Path, PathBuf};

/// A directory (or entry) that could not be enumerated
#[derive(Debug, thiserror::Error)]
#[error("failed to scan {}: {source}", .path.display())]
pub struct ScanError {
    /// Entry the walker was visiting
    pub path: PathBuf,
    /// Underlying walker error
    #[source]
    pub source: walkdir::Error,
}

impl ScanError {
    /// Wrap a walker error, falling back to the scan root for its location
    pub fn from_walk(root: &Path, source: walkdir::Error) -> Self {
        let path = source
            .path()
            .map_or_else(|| root.to_path_buf(), Path::to_path_buf);
        Self { path, source }
    }
}

/// Errors from the metadata store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// IO error during a read, write, rename or directory listing
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Record could not be encoded
    #[error("failed to serialize record {id}: {source}")]
    Serialize {
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
