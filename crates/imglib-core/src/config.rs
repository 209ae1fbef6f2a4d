//! Pass configuration

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default assets root, relative to the project root
pub const DEFAULT_ASSETS_DIR: &str = "./src/assets/library";

/// Default registry root, relative to the project root
pub const DEFAULT_REGISTRY_DIR: &str = "./src/content/library";

/// Default number of assets processed at once
pub const DEFAULT_CONCURRENCY: usize = 8;

/// Reconciliation pass configuration
///
/// Loadable from TOML:
///
/// ```toml
/// assets_dir = "./src/assets/library"
/// registry_dir = "./src/content/library"
/// concurrency = 8
/// dry_run = false
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Root of the asset tree
    pub assets_dir: PathBuf,
    /// Root of the metadata registry
    pub registry_dir: PathBuf,
    /// Maximum assets fingerprinted/written at the same time
    pub concurrency: usize,
    /// Compute the report without touching the registry
    pub dry_run: bool,
}

impl RegistryConfig {
    /// Create configuration for two roots
    #[inline]
    #[must_use]
    pub fn new(assets_dir: impl Into<PathBuf>, registry_dir: impl Into<PathBuf>) -> Self {
        Self {
            assets_dir: assets_dir.into(),
            registry_dir: registry_dir.into(),
            ..Self::default()
        }
    }

    /// With max concurrent assets
    #[inline]
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// With dry-run mode
    #[inline]
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// Returns `ConfigError::Parse` on malformed input or unknown keys
    pub fn from_toml_str(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Load from a TOML file
    ///
    /// Relative paths inside the file are resolved against the file's
    /// directory.
    ///
    /// # Errors
    /// Returns `ConfigError::Io` or `ConfigError::Parse`
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io_error(path, e))?;
        let config = Self::from_toml_str(&text, path)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.resolve_against(base))
    }

    /// Make both roots absolute relative to `base`
    ///
    /// Already-absolute roots are left alone. Leading `./` components are
    /// dropped.
    #[must_use]
    pub fn resolve_against(mut self, base: &Path) -> Self {
        self.assets_dir = resolve(base, &self.assets_dir);
        self.registry_dir = resolve(base, &self.registry_dir);
        self
    }

    /// Reject configurations that cannot produce a sound pass
    ///
    /// # Errors
    /// - `ConfigError::ZeroConcurrency`
    /// - `ConfigError::SameDirectory` if both roots are equal
    /// - `ConfigError::RegistryInsideAssets` if records would be scanned as assets
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if self.assets_dir == self.registry_dir {
            return Err(ConfigError::SameDirectory(self.assets_dir.clone()));
        }
        if self.registry_dir.starts_with(&self.assets_dir) {
            return Err(ConfigError::RegistryInsideAssets {
                assets: self.assets_dir.clone(),
                registry: self.registry_dir.clone(),
            });
        }
        Ok(())
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from(DEFAULT_ASSETS_DIR),
            registry_dir: PathBuf::from(DEFAULT_REGISTRY_DIR),
            concurrency: DEFAULT_CONCURRENCY,
            dry_run: false,
        }
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    path.components()
        .filter(|c| !matches!(c, std::path::Component::CurDir))
        .fold(base.to_path_buf(), |acc, c| acc.join(c))
}
