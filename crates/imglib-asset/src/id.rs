//! Asset identifiers
//!
//! An [`AssetId`] is the kebab-case slug that names an asset's metadata
//! record in the registry. It is derived from the asset's relative path and
//! nothing else, so the same path always yields the same identifier.

use crate::path::AssetPath;
use std::borrow::Borrow;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Character kept verbatim besides ASCII letters and digits
pub const CONNECTOR: char = '+';

/// Replacement for every other character
pub const REPLACEMENT: char = '-';

/// Store key for one asset
///
/// # Examples
/// - `images/products/Case-A.jpg` → `images-products-case-a`
/// - `dogs/rex.jpg` → `dogs-rex`
/// - `a\b.jpg` → `a-b`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct AssetId(String);

impl AssetId {
    /// Derive the identifier for an asset path
    ///
    /// 1. Separators are normalized (already guaranteed by [`AssetPath`])
    /// 2. The final segment's extension is stripped
    /// 3. Every char other than `[A-Za-z0-9+]` becomes `-`, one per char
    /// 4. The result is lower-cased
    #[must_use]
    pub fn derive(path: &AssetPath) -> Self {
        let slug: String = path
            .without_extension()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == CONNECTOR {
                    c.to_ascii_lowercase()
                } else {
                    REPLACEMENT
                }
            })
            .collect();
        Self(slug)
    }

    /// Rebuild an identifier from a registry storage key (file stem)
    ///
    /// Keys are accepted as-is so that hand-written records can still be
    /// enumerated; use [`AssetId::is_canonical`] to tell whether a key could
    /// have come from [`AssetId::derive`].
    ///
    /// # Errors
    /// Returns error if the key is empty, hidden, or contains a separator
    pub fn from_key(key: &str) -> Result<Self, IdentifierError> {
        if key.is_empty() {
            return Err(IdentifierError::Empty);
        }
        if key.starts_with('.') || key.contains(['/', '\\']) {
            return Err(IdentifierError::InvalidKey(key.to_string()));
        }
        Ok(Self(key.to_string()))
    }

    /// Whether every char is in the derived alphabet `[a-z0-9+-]`
    #[must_use]
    pub fn is_canonical(&self) -> bool {
        !self.0.is_empty()
            && self.0.chars().all(|c| {
                c.is_ascii_lowercase() || c.is_ascii_digit() || c == CONNECTOR || c == REPLACEMENT
            })
    }

    /// Get as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the inner string
    #[inline]
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl Display for AssetId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for AssetId {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s)
    }
}

impl From<&AssetPath> for AssetId {
    fn from(path: &AssetPath) -> Self {
        Self::derive(path)
    }
}

impl AsRef<str> for AssetId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for AssetId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Errors related to identifiers
#[derive(Debug, thiserror::Error)]
pub enum IdentifierError {
    /// Empty storage key
    #[error("identifier is empty")]
    Empty,

    /// Key that cannot name a flat registry entry
    #[error("invalid identifier key: '{0}'")]
    InvalidKey(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn derive(path: &str) -> String {
        AssetId::derive(&AssetPath::new(path)).into_string()
    }

    #[test]
    fn derive_documented_example() {
        assert_eq!(derive("images/products/Case-A.jpg"), "images-products-case-a");
    }

    #[test]
    fn derive_simple() {
        assert_eq!(derive("dogs/rex.jpg"), "dogs-rex");
        assert_eq!(derive("rex.jpg"), "rex");
    }

    #[test]
    fn derive_keeps_connector() {
        assert_eq!(derive("c++/Logo+Dark.svg"), "c++-logo+dark");
    }

    #[test]
    fn derive_replaces_each_char() {
        assert_eq!(derive("My Photos/img 01 (copy).png"), "my-photos-img-01--copy-");
        assert_eq!(derive("café.jpg"), "caf-");
    }

    #[test]
    fn derive_strips_only_last_extension() {
        assert_eq!(derive("archive/backup.tar.gz"), "archive-backup-tar");
        assert_eq!(derive("v1.2/readme"), "v1-2-readme");
    }

    #[test]
    fn derive_extensionless_and_dotfiles() {
        assert_eq!(derive("notes/LICENSE"), "notes-license");
        assert_eq!(derive("notes/.hidden"), "notes--hidden");
    }

    #[test]
    fn derive_separator_insensitive() {
        assert_eq!(derive("a\\b.jpg"), derive("a/b.jpg"));
    }

    #[test]
    fn derive_collision_is_possible() {
        assert_eq!(derive("dogs/rex.jpg"), derive("dogs-rex.png"));
        assert_eq!(derive("Dogs/Rex.jpg"), derive("dogs/rex.jpg"));
    }

    #[test]
    fn derived_ids_are_canonical() {
        assert!(AssetId::derive(&AssetPath::new("Dogs/Rex 2.JPG")).is_canonical());
    }

    #[test]
    fn from_key_valid() {
        let id = AssetId::from_key("dogs-rex").unwrap();
        assert_eq!(id.as_str(), "dogs-rex");
        assert!(id.is_canonical());
    }

    #[test]
    fn from_key_hand_written_is_not_canonical() {
        let id = AssetId::from_key("Dogs_Rex").unwrap();
        assert!(!id.is_canonical());
    }

    #[test]
    fn from_key_rejects_bad_keys() {
        assert!(matches!(AssetId::from_key(""), Err(IdentifierError::Empty)));
        assert!(matches!(AssetId::from_key(".tmp"), Err(IdentifierError::InvalidKey(_))));
        assert!(matches!(AssetId::from_key("a/b"), Err(IdentifierError::InvalidKey(_))));
    }

    #[test]
    fn from_str_parses_key() {
        let id: AssetId = "cats-tom".parse().unwrap();
        assert_eq!(id.to_string(), "cats-tom");
    }

    proptest! {
        #[test]
        fn prop_derive_is_deterministic(path in "[A-Za-z0-9 ._+/-]{1,40}") {
            prop_assert_eq!(derive(&path), derive(&path));
        }

        #[test]
        fn prop_derive_ignores_separator_style(path in "[A-Za-z0-9_+-]{1,8}(/[A-Za-z0-9_+-]{1,8}){0,4}\\.[a-z]{1,4}") {
            let windows = path.replace('/', "\\");
            prop_assert_eq!(derive(&windows), derive(&path));
        }

        #[test]
        fn prop_derive_output_alphabet(path in "\\PC{0,40}") {
            let id = derive(&path);
            prop_assert!(id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '+' || c == '-'));
        }

        #[test]
        fn prop_derive_one_char_per_char(stem in "[^./\\\\]{1,20}", ext in "[a-z]{1,4}") {
            let path = format!("{stem}.{ext}");
            prop_assert_eq!(derive(&path).chars().count(), stem.chars().count());
        }
    }
}
