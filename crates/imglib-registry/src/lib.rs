//! imglib Registry Layer
//!
//! The boundary between the filesystem and the reconciler.
//!
//! # Core Operations
//!
//! - **Scan**: enumerate every regular file under the assets root
//! - **Load**: read one metadata record by identifier
//! - **Save**: atomically replace one metadata record
//! - **Keys**: list every identifier currently held by the registry
//!
//! # Architecture
//!
//! ```text
//! assets root ──scan──▶ [AssetPath] ──▶ reconciler ──save──▶ registry root/<id>.json
//!                                           ▲                        │
//!                                           └─────────load/keys──────┘
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod record;
pub mod scanner;
pub mod store;

pub use error::{ScanError, StoreError};
pub use record::{timestamp, MetadataRecord, RecordChange};
pub use scanner::{scan, ScanOutcome, ScannedAsset};
pub use store::{LoadOutcome, MetadataStore, RECORD_EXTENSION};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the registry layer
    pub use crate::error::{ScanError, StoreError};
    pub use crate::record::MetadataRecord;
    pub use crate::store::{LoadOutcome, MetadataStore};
    pub use imglib_asset::{AssetId, AssetPath, Fingerprint};
}
