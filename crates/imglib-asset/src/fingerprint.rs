//! Content fingerprints
//!
//! Provides [`Fingerprint`], a strongly-typed 32-byte Blake3 digest used to
//! detect asset content changes independent of path or name.

use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Length of a fingerprint in bytes
pub const FINGERPRINT_LEN: usize = 32;

/// A 32-byte content fingerprint (Blake3)
///
/// Rendered as 64 lowercase hex characters, which is the form persisted in
/// metadata records. Immutable and cheap to clone (Copy).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fingerprint([u8; FINGERPRINT_LEN]);

impl Fingerprint {
    /// Create a fingerprint from raw digest bytes
    #[inline]
    #[must_use]
    pub const fn new(bytes: [u8; FINGERPRINT_LEN]) -> Self {
        Self(bytes)
    }

    /// Get reference to the underlying bytes
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; FINGERPRINT_LEN] {
        &self.0
    }

    /// Create fingerprint from byte slice
    ///
    /// # Errors
    /// Returns error if slice length is not exactly 32 bytes
    pub fn from_slice(bytes: &[u8]) -> Result<Self, FingerprintError> {
        let arr: [u8; FINGERPRINT_LEN] =
            bytes.try_into().map_err(|_| FingerprintError::InvalidLength {
                expected: FINGERPRINT_LEN,
                actual: bytes.len(),
            })?;
        Ok(Self(arr))
    }

    /// Compute the fingerprint of in-memory content
    #[inline]
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        Self::new(*blake3::hash(data).as_bytes())
    }

    /// Read a whole file and fingerprint its bytes
    ///
    /// # Errors
    /// Returns `FingerprintError::Io` if the file cannot be read
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, FingerprintError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| FingerprintError::io_error(path, e))?;
        Ok(Self::compute(&bytes))
    }

    /// Short string representation (first 16 hex chars)
    #[inline]
    #[must_use]
    pub fn short(&self) -> String {
        hex::encode(&self.0[..8])
    }

    /// Check whether a persisted checksum string refers to this fingerprint
    ///
    /// Comparison is case-insensitive; anything that does not parse (an
    /// older digest format, a hand-edited value) never matches.
    #[must_use]
    pub fn matches(&self, stored: &str) -> bool {
        stored
            .parse::<Self>()
            .map(|other| other == *self)
            .unwrap_or(false)
    }
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl FromStr for Fingerprint {
    type Err = FingerprintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s)?;
        Self::from_slice(&bytes)
    }
}

impl AsRef<[u8; FINGERPRINT_LEN]> for Fingerprint {
    fn as_ref(&self) -> &[u8; FINGERPRINT_LEN] {
        &self.0
    }
}

impl serde::Serialize for Fingerprint {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> serde::Deserialize<'de> for Fingerprint {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// Errors that can occur when computing or parsing fingerprints
#[derive(Debug, thiserror::Error)]
pub enum FingerprintError {
    /// Invalid digest length
    #[error("invalid fingerprint length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Hex encoding error
    #[error("hex decode error: {0}")]
    HexDecode(#[from] hex::FromHexError),

    /// IO error while reading the asset
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FingerprintError {
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
    fn fingerprint_from_slice_valid() {
        let bytes = vec![2u8; 32];
        let fp = Fingerprint::from_slice(&bytes).unwrap();
        assert_eq!(fp.as_bytes(), &[2u8; 32]);
    }

    #[test]
    fn fingerprint_from_slice_invalid_length() {
        let result = Fingerprint::from_slice(&[1u8; 16]);
        assert!(matches!(
            result,
            Err(FingerprintError::InvalidLength { expected: 32, actual: 16 })
        ));
    }

    #[test]
    fn fingerprint_compute_deterministic() {
        assert_eq!(
            Fingerprint::compute(b"hello world"),
            Fingerprint::compute(b"hello world")
        );
    }

    #[test]
    fn fingerprint_compute_different_data() {
        assert_ne!(Fingerprint::compute(b"data1"), Fingerprint::compute(b"data2"));
    }

    #[test]
    fn fingerprint_known_vector() {
        // Blake3 of the empty input
        assert_eq!(
            Fingerprint::compute(b"").to_string(),
            "af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262"
        );
    }

    #[test]
    fn fingerprint_display_is_lowercase_hex() {
        let s = Fingerprint::compute(b"test").to_string();
        assert_eq!(s.len(), 64);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn fingerprint_display_and_parse() {
        let fp = Fingerprint::compute(b"test");
        let parsed: Fingerprint = fp.to_string().parse().unwrap();
        assert_eq!(fp, parsed);
    }

    #[test]
    fn fingerprint_short() {
        let fp = Fingerprint::compute(b"test");
        assert_eq!(fp.short().len(), 16);
        assert!(fp.to_string().starts_with(&fp.short()));
    }

    #[test]
    fn fingerprint_matches_stored_checksum() {
        let fp = Fingerprint::compute(b"rex");
        assert!(fp.matches(&fp.to_string()));
        assert!(fp.matches(&fp.to_string().to_uppercase()));
        assert!(!fp.matches(&Fingerprint::compute(b"tom").to_string()));
        // 32-char md5 style digest from an older registry
        assert!(!fp.matches("0cc175b9c0f1b6a831c399e269772661"));
        assert!(!fp.matches(""));
    }

    #[test]
    fn fingerprint_serde_json_is_hex_string() {
        let fp = Fingerprint::compute(b"test");
        let json = serde_json::to_string(&fp).unwrap();
        assert_eq!(json, format!("\"{fp}\""));
        let decoded: Fingerprint = serde_json::from_str(&json).unwrap();
        assert_eq!(fp, decoded);
    }

    #[tokio::test]
    async fn fingerprint_ignores_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.jpg");
        let b = dir.path().join("nested-b.png");
        std::fs::write(&a, b"same bytes").unwrap();
        std::fs::write(&b, b"same bytes").unwrap();

        assert_eq!(
            Fingerprint::from_file(&a).await.unwrap(),
            Fingerprint::from_file(&b).await.unwrap()
        );
    }

    #[tokio::test]
    async fn fingerprint_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = Fingerprint::from_file(dir.path().join("missing.jpg")).await;
        assert!(matches!(result, Err(FingerprintError::Io { .. })));
    }
}
