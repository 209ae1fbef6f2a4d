//! Testing utilities for imglib workspace
//!
//! Shared fixtures: a throwaway assets/registry pair and a logger that
//! remembers what it was told.

#![allow(missing_docs)]

use imglib_asset::{AssetId, Fingerprint};
use imglib_core::{Level, Logger, RegistryConfig};
use imglib_registry::MetadataRecord;
use parking_lot::Mutex;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Logger that keeps every message
#[derive(Debug, Default)]
pub struct RecordingLogger {
    messages: Mutex<Vec<(Level, String)>>,
}

impl RecordingLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages logged at `level`, in order
    pub fn at(&self, level: Level) -> Vec<String> {
        self.messages
            .lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// Whether any message at `level` contains `needle`
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.messages
            .lock()
            .iter()
            .any(|(l, m)| *l == level && m.contains(needle))
    }

    pub fn clear(&self) {
        self.messages.lock().clear();
    }
}

impl Logger for RecordingLogger {
    fn log(&self, level: Level, message: &str) {
        self.messages.lock().push((level, message.to_string()));
    }
}

/// Temporary `assets/` + `registry/` pair
#[derive(Debug)]
pub struct TestLibrary {
    dir: TempDir,
    assets: PathBuf,
    registry: PathBuf,
}

impl TestLibrary {
    /// Empty library; the registry directory is not created
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let assets = dir.path().join("assets");
        let registry = dir.path().join("registry");
        fs::create_dir_all(&assets).unwrap();
        Self {
            dir,
            assets,
            registry,
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn assets(&self) -> &Path {
        &self.assets
    }

    pub fn registry(&self) -> &Path {
        &self.registry
    }

    pub fn config(&self) -> RegistryConfig {
        RegistryConfig::new(&self.assets, &self.registry)
    }

    /// Write an asset at a forward-slash relative path
    pub fn add_asset(&self, relative: &str, bytes: &[u8]) -> PathBuf {
        let path = self.assets.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, bytes).unwrap();
        path
    }

    pub fn remove_asset(&self, relative: &str) {
        fs::remove_file(self.assets.join(relative)).unwrap();
    }

    pub fn rename_asset(&self, from: &str, to: &str) {
        let target = self.assets.join(to);
        fs::create_dir_all(target.parent().unwrap()).unwrap();
        fs::rename(self.assets.join(from), target).unwrap();
    }

    pub fn record_path(&self, id: &str) -> PathBuf {
        self.registry.join(format!("{id}.json"))
    }

    /// Parsed record, or `None` if absent
    pub fn record(&self, id: &str) -> Option<MetadataRecord> {
        let text = fs::read_to_string(self.record_path(id)).ok()?;
        Some(serde_json::from_str(&text).unwrap())
    }

    /// Raw record JSON as a value
    pub fn record_json(&self, id: &str) -> serde_json::Value {
        let text = fs::read_to_string(self.record_path(id)).unwrap();
        serde_json::from_str(&text).unwrap()
    }

    pub fn write_record(&self, id: &str, record: &MetadataRecord) {
        self.write_raw_record(id, &serde_json::to_string_pretty(record).unwrap());
    }

    pub fn write_raw_record(&self, id: &str, text: &str) {
        fs::create_dir_all(&self.registry).unwrap();
        fs::write(self.record_path(id), text).unwrap();
    }

    /// Record file names in the registry, sorted
    pub fn registry_files(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.registry) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        names.sort();
        names
    }
}

impl Default for TestLibrary {
    fn default() -> Self {
        Self::new()
    }
}

pub fn id(key: &str) -> AssetId {
    AssetId::from_key(key).unwrap()
}

pub fn ids(keys: &[&str]) -> Vec<AssetId> {
    keys.iter().map(|k| id(k)).collect()
}

pub fn fingerprint(bytes: &[u8]) -> String {
    Fingerprint::compute(bytes).to_string()
}
