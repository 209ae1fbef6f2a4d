//! Persisted metadata records
//!
//! One [`MetadataRecord`] per asset identifier. Fields are split by owner:
//!
//! | field        | owner  | rule                                        |
//! |--------------|--------|---------------------------------------------|
//! | `image`      | system | refreshed when content or path changes      |
//! | `alt`        | user   | empty on creation, never overwritten        |
//! | `credit`     | user   | empty on creation, never overwritten        |
//! | `dateAdded`  | user   | set once at creation                        |
//! | extra fields | user   | carried through verbatim                    |
//! | `_checksum`  | system | refreshed when content or path changes      |
//! | `_lastSync`  | system | refreshed on every pass touching the record |

use chrono::{DateTime, SecondsFormat, Utc};
use imglib_asset::{AssetPath, Fingerprint};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Render a timestamp the way records store it (`2024-05-01T09:30:00.000Z`)
#[must_use]
pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Sidecar metadata for one asset
///
/// Serialized as a JSON object in the registry. Any JSON object is accepted:
/// unknown keys (for example a `title` added by a content schema) land in
/// [`MetadataRecord::extra`] and are written back unchanged, and so does a
/// user field holding something other than a string (`"alt": null`).
/// System fields of the wrong type are dropped; the next write replaces them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Map<String, Value>")]
pub struct MetadataRecord {
    /// Asset path relative to the assets root at last sync; empty if the
    /// stored record had none
    pub image: AssetPath,
    /// Alternative text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    /// Attribution
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit: Option<String>,
    /// Creation timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_added: Option<String>,
    /// User-defined fields outside the base shape
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
    /// Fingerprint of the asset at last sync
    #[serde(rename = "_checksum", skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    /// Timestamp of the last pass that touched this record
    #[serde(rename = "_lastSync", skip_serializing_if = "Option::is_none")]
    pub last_sync: Option<String>,
}

/// Take `key` out of `fields` if it holds a string
fn take_string(fields: &mut Map<String, Value>, key: &str) -> Option<String> {
    match fields.remove(key)? {
        Value::String(s) => Some(s),
        _ => None,
    }
}

/// Take a user-owned `key` if it holds a string; other values stay in `fields`
fn take_user_string(fields: &mut Map<String, Value>, key: &str) -> Option<String> {
    if !fields.get(key).is_some_and(Value::is_string) {
        return None;
    }
    take_string(fields, key)
}

impl From<Map<String, Value>> for MetadataRecord {
    fn from(mut fields: Map<String, Value>) -> Self {
        let image = AssetPath::new(take_string(&mut fields, "image").unwrap_or_default());
        let checksum = take_string(&mut fields, "_checksum");
        let last_sync = take_string(&mut fields, "_lastSync");
        let alt = take_user_string(&mut fields, "alt");
        let credit = take_user_string(&mut fields, "credit");
        let date_added = take_user_string(&mut fields, "dateAdded");

        Self {
            image,
            alt,
            credit,
            date_added,
            extra: fields.into_iter().collect(),
            checksum,
            last_sync,
        }
    }
}

/// What differs between a stored record and the asset on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordChange {
    /// Stored checksum is missing or differs from the current fingerprint
    pub content: bool,
    /// Stored `image` differs from the current relative path
    pub path: bool,
}

impl RecordChange {
    /// Whether anything besides `_lastSync` needs rewriting
    #[inline]
    #[must_use]
    pub fn any(self) -> bool {
        self.content || self.path
    }
}

impl MetadataRecord {
    /// Fresh record for a newly discovered asset
    #[must_use]
    pub fn new(image: AssetPath, fingerprint: &Fingerprint, now: DateTime<Utc>) -> Self {
        let ts = timestamp(now);
        Self {
            image,
            alt: Some(String::new()),
            credit: Some(String::new()),
            date_added: Some(ts.clone()),
            extra: BTreeMap::new(),
            checksum: Some(fingerprint.to_string()),
            last_sync: Some(ts),
        }
    }

    /// Compare against the asset as currently observed
    #[must_use]
    pub fn diff(&self, image: &AssetPath, fingerprint: &Fingerprint) -> RecordChange {
        RecordChange {
            content: !self
                .checksum
                .as_deref()
                .is_some_and(|stored| fingerprint.matches(stored)),
            path: self.image != *image,
        }
    }

    /// Copy with system-owned fields refreshed and user fields carried forward
    #[must_use]
    pub fn refreshed(&self, image: AssetPath, fingerprint: &Fingerprint, now: DateTime<Utc>) -> Self {
        Self {
            image,
            checksum: Some(fingerprint.to_string()),
            last_sync: Some(timestamp(now)),
            ..self.clone()
        }
    }

    /// Copy with only `_lastSync` refreshed
    #[must_use]
    pub fn touched(&self, now: DateTime<Utc>) -> Self {
        Self {
            last_sync: Some(timestamp(now)),
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn timestamp_format() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        assert_eq!(timestamp(ts), "2024-05-01T09:30:00.000Z");
    }

    #[test]
    fn new_record_defaults() {
        let fp = Fingerprint::compute(b"rex");
        let record = MetadataRecord::new(AssetPath::new("dogs/rex.jpg"), &fp, at(0));

        assert_eq!(record.image.as_str(), "dogs/rex.jpg");
        assert_eq!(record.alt.as_deref(), Some(""));
        assert_eq!(record.credit.as_deref(), Some(""));
        assert_eq!(record.date_added, Some(timestamp(at(0))));
        assert_eq!(record.last_sync.as_deref(), Some(timestamp(at(0)).as_str()));
        assert_eq!(record.checksum, Some(fp.to_string()));
    }

    #[test]
    fn serialized_field_names_and_order() {
        let fp = Fingerprint::compute(b"rex");
        let mut record = MetadataRecord::new(AssetPath::new("dogs/rex.jpg"), &fp, at(0));
        record
            .extra
            .insert("title".to_string(), Value::String("Rex".to_string()));

        let json = serde_json::to_string(&record).unwrap();
        let keys = ["\"image\"", "\"alt\"", "\"credit\"", "\"dateAdded\"", "\"title\"", "\"_checksum\"", "\"_lastSync\""];
        let positions: Vec<usize> = keys.iter().map(|k| json.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{json}");
    }

    #[test]
    fn deserialize_minimal_hand_written_record() {
        let record: MetadataRecord =
            serde_json::from_str(r#"{ "image": "dogs/rex.jpg", "alt": "Rex" }"#).unwrap();
        assert_eq!(record.alt.as_deref(), Some("Rex"));
        assert!(record.credit.is_none());
        assert!(record.date_added.is_none());
        assert!(record.checksum.is_none());
        assert!(record.extra.is_empty());
    }

    #[test]
    fn missing_image_reads_as_empty_path() {
        let record: MetadataRecord = serde_json::from_str(r#"{ "alt": "Rex" }"#).unwrap();
        assert_eq!(record.image.as_str(), "");
        assert!(record.diff(&AssetPath::new("rex.jpg"), &Fingerprint::compute(b"rex")).path);
    }

    #[test]
    fn non_string_user_fields_pass_through() {
        let raw = r#"{"image":"dogs/rex.jpg","alt":null,"credit":null,"dateAdded":42,"title":"Rex"}"#;
        let record: MetadataRecord = serde_json::from_str(raw).unwrap();

        assert!(record.alt.is_none());
        assert!(record.credit.is_none());
        assert!(record.date_added.is_none());
        assert_eq!(record.extra["alt"], Value::Null);
        assert_eq!(record.extra["credit"], Value::Null);
        assert_eq!(record.extra["dateAdded"], 42);

        let again: Value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            again,
            serde_json::json!({
                "image": "dogs/rex.jpg",
                "alt": null,
                "credit": null,
                "dateAdded": 42,
                "title": "Rex"
            })
        );
    }

    #[test]
    fn wrongly_typed_system_fields_are_dropped() {
        let raw = r#"{"image":7,"_checksum":[1,2],"_lastSync":false,"alt":"Rex"}"#;
        let record: MetadataRecord = serde_json::from_str(raw).unwrap();

        assert_eq!(record.image.as_str(), "");
        assert!(record.checksum.is_none());
        assert!(record.last_sync.is_none());
        assert!(record.extra.is_empty());
    }

    #[test]
    fn non_object_is_rejected() {
        assert!(serde_json::from_str::<MetadataRecord>("[1, 2]").is_err());
        assert!(serde_json::from_str::<MetadataRecord>("\"dogs/rex.jpg\"").is_err());
    }

    #[test]
    fn missing_date_added_is_not_written_back() {
        let record: MetadataRecord =
            serde_json::from_str(r#"{ "image": "dogs/rex.jpg", "alt": "Rex" }"#).unwrap();
        let updated =
            record.refreshed(AssetPath::new("dogs/rex.jpg"), &Fingerprint::compute(b"rex"), at(0));

        let json = serde_json::to_value(&updated).unwrap();
        assert!(json.get("dateAdded").is_none(), "{json}");
        assert!(json.get("credit").is_none(), "{json}");
        assert_eq!(json["alt"], "Rex");
    }

    #[test]
    fn extra_fields_round_trip() {
        let raw = r#"{"image":"a.jpg","alt":"","dateAdded":"x","title":"T","tags":["a","b"],"_checksum":"c"}"#;
        let record: MetadataRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.extra.len(), 2);

        let again: Value = serde_json::to_value(&record).unwrap();
        assert_eq!(again["title"], "T");
        assert_eq!(again["tags"][1], "b");
    }

    #[test]
    fn diff_detects_content_and_path() {
        let fp = Fingerprint::compute(b"v1");
        let record = MetadataRecord::new(AssetPath::new("dogs/rex.jpg"), &fp, at(0));

        assert!(!record.diff(&AssetPath::new("dogs/rex.jpg"), &fp).any());

        let change = record.diff(&AssetPath::new("dogs/rex.jpg"), &Fingerprint::compute(b"v2"));
        assert_eq!(change, RecordChange { content: true, path: false });

        let change = record.diff(&AssetPath::new("Dogs/rex.jpg"), &fp);
        assert_eq!(change, RecordChange { content: false, path: true });
    }

    #[test]
    fn diff_missing_checksum_counts_as_content_change() {
        let fp = Fingerprint::compute(b"v1");
        let mut record = MetadataRecord::new(AssetPath::new("a.jpg"), &fp, at(0));
        record.checksum = None;
        assert!(record.diff(&AssetPath::new("a.jpg"), &fp).content);
    }

    #[test]
    fn refreshed_preserves_user_fields() {
        let mut record =
            MetadataRecord::new(AssetPath::new("dogs/rex.jpg"), &Fingerprint::compute(b"v1"), at(0));
        record.alt = Some("A golden retriever".to_string());
        record.credit = Some("Jane".to_string());
        record.extra.insert("title".to_string(), Value::from("Rex"));

        let fp2 = Fingerprint::compute(b"v2");
        let updated = record.refreshed(AssetPath::new("dogs/rex.jpg"), &fp2, at(60));

        assert_eq!(updated.alt.as_deref(), Some("A golden retriever"));
        assert_eq!(updated.credit.as_deref(), Some("Jane"));
        assert_eq!(updated.date_added, record.date_added);
        assert_eq!(updated.extra, record.extra);
        assert_eq!(updated.checksum, Some(fp2.to_string()));
        assert_eq!(updated.last_sync, Some(timestamp(at(60))));
    }

    #[test]
    fn touched_only_changes_last_sync() {
        let record =
            MetadataRecord::new(AssetPath::new("dogs/rex.jpg"), &Fingerprint::compute(b"v1"), at(0));
        let touched = record.touched(at(120));

        assert_eq!(touched.last_sync, Some(timestamp(at(120))));
        assert_eq!(
            MetadataRecord { last_sync: record.last_sync.clone(), ..touched },
            record
        );
    }
}
