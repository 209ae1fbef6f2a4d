//! imglib Asset Primitives
//!
//! Pure building blocks shared by the registry and the reconciler.
//!
//! # Core Concepts
//!
//! - [`AssetPath`]: Forward-slash path of an asset relative to the assets root
//! - [`AssetId`]: Deterministic slug derived from an [`AssetPath`], used as the store key
//! - [`Fingerprint`]: 32-byte Blake3 digest of an asset's bytes
//!
//! # Example
//!
//! ```rust
//! use imglib_asset::{AssetPath, Fingerprint};
//!
//! let path = AssetPath::new("images/products/Case-A.jpg");
//! assert_eq!(path.id().as_str(), "images-products-case-a");
//!
//! let fingerprint = Fingerprint::compute(b"raw bytes");
//! assert_eq!(fingerprint.to_string().len(), 64);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod fingerprint;
mod id;
mod path;

pub use fingerprint::{Fingerprint, FingerprintError};
pub use id::{AssetId, IdentifierError};
pub use path::AssetPath;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
