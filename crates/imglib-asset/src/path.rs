//! Asset paths relative to the assets root
//!
//! Provides [`AssetPath`], the forward-slash form of an asset location that
//! is persisted in the `image` field of a metadata record.

use crate::id::AssetId;
use std::fmt::{self, Display, Formatter};
use std::path::{Component, Path};

/// Path of an asset relative to the assets root
///
/// Always uses `/` as the separator, whatever the host convention.
///
/// # Examples
/// - `images\products\case.jpg` → `images/products/case.jpg`
/// - `dogs/rex.jpg` → `dogs/rex.jpg`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct AssetPath(String);

impl AssetPath {
    /// Create from a relative path string, normalizing separators
    #[inline]
    #[must_use]
    pub fn new(relative: impl AsRef<str>) -> Self {
        Self(relative.as_ref().replace('\\', "/"))
    }

    /// Build from a host path relative to the assets root
    ///
    /// Only normal components are kept; `.` and root/prefix components are
    /// dropped. Non-UTF-8 names are converted lossily.
    #[must_use]
    pub fn from_relative(path: &Path) -> Self {
        let segments: Vec<_> = path
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => Some(name.to_string_lossy()),
                _ => None,
            })
            .collect();
        Self::new(segments.join("/"))
    }

    /// Get as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Final segment (file name)
    #[inline]
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Extension of the final segment, without the dot
    ///
    /// A name made only of leading dots (`.hidden`, `..`) has no extension.
    /// A trailing dot (`name.`) yields an empty extension.
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name();
        let dot = name.rfind('.')?;
        if name[..dot].chars().all(|c| c == '.') {
            return None;
        }
        Some(&name[dot + 1..])
    }

    /// Path with the final segment's extension (and its dot) removed
    #[must_use]
    pub fn without_extension(&self) -> &str {
        match self.extension() {
            Some(ext) => &self.0[..self.0.len() - ext.len() - 1],
            None => &self.0,
        }
    }

    /// Derive the store identifier for this asset
    #[inline]
    #[must_use]
    pub fn id(&self) -> AssetId {
        AssetId::derive(self)
    }

    /// Resolve against an assets root on the host filesystem
    #[must_use]
    pub fn to_host_path(&self, root: &Path) -> std::path::PathBuf {
        self.0
            .split('/')
            .filter(|s| !s.is_empty())
            .fold(root.to_path_buf(), |acc, seg| acc.join(seg))
    }
}

impl Display for AssetPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AssetPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for AssetPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
