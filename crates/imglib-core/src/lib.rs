//! imglib Core - Registry Reconciliation
//!
//! Keeps one sidecar metadata record per asset:
//! - Scans the assets root for every regular file
//! - Derives an identifier and fingerprint per asset
//! - Creates, updates or touches records while preserving user-edited fields
//! - Reports additions, updates, orphans, conflicts and failures
//!
//! # Example
//!
//! ```rust,no_run
//! use imglib_core::{generate_registry, RegistryConfig, TracingLogger};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RegistryConfig::new("/site/src/assets/library", "/site/src/content/library");
//! let report = generate_registry(&config, &TracingLogger).await?;
//!
//! println!("{} added, {} orphaned", report.added.len(), report.orphaned.len());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod error;
pub mod logger;
pub mod reconciler;
pub mod report;

// Re-exports for convenience
pub use config::RegistryConfig;
pub use error::{ConfigError, ReconcileError};
pub use logger::{Level, Logger, NullLogger, TracingLogger};
pub use reconciler::{generate_registry, Reconciler};
pub use report::{AssetFailure, AssetOutcome, FailureStage, IdentifierConflict, SyncReport};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with imglib Core
    pub use crate::{
        generate_registry, Logger, Reconciler, RegistryConfig, SyncReport, TracingLogger,
    };
    pub use imglib_asset::{AssetId, AssetPath, Fingerprint};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
