//! Flat JSON metadata store
//!
//! The registry root holds one `<identifier>.json` file per asset. The
//! identifier is the file stem; it is never read back from inside the record.

use crate::error::StoreError;
use crate::record::MetadataRecord;
use imglib_asset::AssetId;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// File extension of record files
pub const RECORD_EXTENSION: &str = "json";

/// Suffix appended to a record file that failed to parse
pub const CORRUPT_SUFFIX: &str = "corrupt";

/// Result of looking up one record
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// No record file for this identifier
    Missing,
    /// Record parsed successfully
    Found(MetadataRecord),
    /// Record file exists but is unreadable or not a JSON object
    Corrupt {
        /// Reader or parser message
        reason: String,
    },
}

impl LoadOutcome {
    /// Parsed record, if any
    #[inline]
    #[must_use]
    pub fn record(self) -> Option<MetadataRecord> {
        match self {
            Self::Found(record) => Some(record),
            Self::Missing | Self::Corrupt { .. } => None,
        }
    }
}

/// Keyed record store over a registry directory
#[derive(Debug, Clone)]
pub struct MetadataStore {
    root: PathBuf,
}

impl MetadataStore {
    /// Create a store rooted at `root` (not touched until used)
    #[inline]
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Registry root directory
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Location of the record file for `id`
    #[must_use]
    pub fn record_path(&self, id: &AssetId) -> PathBuf {
        self.root.join(format!("{id}.{RECORD_EXTENSION}"))
    }

    fn temp_path(&self, id: &AssetId) -> PathBuf {
        self.root.join(format!(".{id}.{RECORD_EXTENSION}.tmp"))
    }

    /// Create the registry root if it does not exist
    ///
    /// # Errors
    /// Returns `StoreError::Io` if the directory cannot be created
    pub async fn ensure_root(&self) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StoreError::io_error(&self.root, e))
    }

    /// Load the record for `id`
    ///
    /// Never fails: a missing file is [`LoadOutcome::Missing`], anything
    /// unreadable, unparsable or not a JSON object is [`LoadOutcome::Corrupt`].
    pub async fn load(&self, id: &AssetId) -> LoadOutcome {
        let path = self.record_path(id);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return LoadOutcome::Missing,
            Err(e) => {
                return LoadOutcome::Corrupt {
                    reason: e.to_string(),
                }
            }
        };

        match serde_json::from_str(&content) {
            Ok(record) => LoadOutcome::Found(record),
            Err(e) => LoadOutcome::Corrupt {
                reason: e.to_string(),
            },
        }
    }

    /// Write the record for `id`, replacing any previous content
    ///
    /// The record is written to a hidden temp file in the registry root and
    /// renamed over the target, so readers see either the old or the new
    /// record in full.
    ///
    /// # Errors
    /// Returns `StoreError::Serialize` or `StoreError::Io`
    pub async fn save(&self, id: &AssetId, record: &MetadataRecord) -> Result<(), StoreError> {
        let mut content =
            serde_json::to_string_pretty(record).map_err(|source| StoreError::Serialize {
                id: id.to_string(),
                source,
            })?;
        content.push('\n');

        let tmp = self.temp_path(id);
        let target = self.record_path(id);

        if let Err(e) = tokio::fs::write(&tmp, content.as_bytes()).await {
            return Err(StoreError::io_error(&tmp, e));
        }
        if let Err(e) = tokio::fs::rename(&tmp, &target).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(StoreError::io_error(&target, e));
        }

        tracing::trace!(id = %id, path = %target.display(), "saved record");
        Ok(())
    }

    /// Move an unparsable record aside as `<id>.json.corrupt`
    ///
    /// Returns the new location, or `None` if there was nothing to move.
    ///
    /// # Errors
    /// Returns `StoreError::Io` if the rename fails
    pub async fn quarantine(&self, id: &AssetId) -> Result<Option<PathBuf>, StoreError> {
        let from = self.record_path(id);
        let to = self
            .root
            .join(format!("{id}.{RECORD_EXTENSION}.{CORRUPT_SUFFIX}"));

        match tokio::fs::rename(&from, &to).await {
            Ok(()) => Ok(Some(to)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io_error(&from, e)),
        }
    }

    /// All identifiers currently held by the store, sorted
    ///
    /// Only `*.json` files directly under the root count. A missing root is
    /// an empty store.
    ///
    /// # Errors
    /// Returns `StoreError::Io` if the root exists but cannot be listed
    pub async fn keys(&self) -> Result<Vec<AssetId>, StoreError> {
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io_error(&self.root, e)),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::io_error(&self.root, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(RECORD_EXTENSION) {
                continue;
            }
            let is_file = entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            if !is_file {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                tracing::warn!(path = %path.display(), "skipping record with non UTF-8 name");
                continue;
            };
            match AssetId::from_key(stem) {
                Ok(id) => keys.push(id),
                Err(e) => tracing::debug!(path = %path.display(), "skipping registry entry: {e}"),
            }
        }

        keys.sort();
        Ok(keys)
    }
}
