//! Error types for imglib Core
//!
//! Only failures that stop a pass surface here. Everything recoverable
//! (unreadable subtrees, unreadable assets, corrupt records, identifier
//! conflicts) is carried in the [`SyncReport`](crate::SyncReport) instead.

use imglib_registry::StoreError;
use std::path::PathBuf;

/// Fatal reconciliation error
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// Configuration rejected before the pass started
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Registry could not be written or listed
    #[error("registry error: {0}")]
    Store(#[from] StoreError),

    /// Scanner task did not complete
    #[error("scan aborted: {0}")]
    ScanAborted(String),
}

impl ReconcileError {
    /// Whether the registry may hold a partially applied pass
    #[inline]
    #[must_use]
    pub fn is_partial_write(&self) -> bool {
        matches!(self, Self::Store(_))
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for this shape
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Worker count of zero
    #[error("concurrency must be at least 1")]
    ZeroConcurrency,

    /// Assets and registry share a root
    #[error("assets and registry directories are the same: {0}")]
    SameDirectory(PathBuf),

    /// Registry lives inside the assets tree and would be scanned as assets
    #[error("registry directory {registry} is inside assets directory {assets}")]
    RegistryInsideAssets { assets: PathBuf, registry: PathBuf },
}

impl ConfigError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        assert_eq!(
            ConfigError::ZeroConcurrency.to_string(),
            "concurrency must be at least 1"
        );
    }

    #[test]
    fn error_conversions() {
        let err: ReconcileError = ConfigError::ZeroConcurrency.into();
        assert!(matches!(err, ReconcileError::Config(_)));
        assert!(!err.is_partial_write());

        let store = StoreError::io_error(
            "/registry",
            std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
        );
        let err: ReconcileError = store.into();
        assert!(err.is_partial_write());
        assert!(err.to_string().contains("disk full"));
    }
}
