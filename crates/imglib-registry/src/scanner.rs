//! Asset tree scanner
//!
//! Walks the assets root with `walkdir`, collecting every regular file. A
//! subtree that cannot be read is recorded as a [`ScanError`] and skipped;
//! the rest of the walk goes on.
//!
//! Symbolic links are not followed and are not treated as assets, and neither
//! are sockets, FIFOs or device nodes. Output order follows the walk and is
//! not sorted.

use crate::error::ScanError;
use imglib_asset::{AssetId, AssetPath};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A regular file found under the assets root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedAsset {
    /// Path relative to the assets root, forward slashes
    pub path: AssetPath,
    /// Host path of the file
    pub absolute: PathBuf,
}

impl ScannedAsset {
    /// Derived store identifier
    #[inline]
    #[must_use]
    pub fn id(&self) -> AssetId {
        self.path.id()
    }
}

/// Everything one walk produced
#[derive(Debug, Default)]
pub struct ScanOutcome {
    /// Files found, in walk order
    pub assets: Vec<ScannedAsset>,
    /// Subtrees that could not be enumerated
    pub errors: Vec<ScanError>,
}

impl ScanOutcome {
    /// Sort assets by relative path
    pub fn sort(&mut self) {
        self.assets.sort_by(|a, b| a.path.cmp(&b.path));
    }

    /// Whether every directory was read
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Recursively collect every regular file under `root`
///
/// Blocking; run it off the async executor.
#[must_use]
pub fn scan(root: &Path) -> ScanOutcome {
    let mut outcome = ScanOutcome::default();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let err = ScanError::from_walk(root, e);
                tracing::warn!("{err}");
                outcome.errors.push(err);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };

        outcome.assets.push(ScannedAsset {
            path: AssetPath::from_relative(relative),
            absolute: entry.path().to_path_buf(),
        });
    }

    tracing::debug!(
        root = %root.display(),
        assets = outcome.assets.len(),
        errors = outcome.errors.len(),
        "scan finished"
    );
    outcome
}
