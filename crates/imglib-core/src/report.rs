//! Pass report
//!
//! A [`SyncReport`] is reduced from per-asset [`AssetOutcome`]s after the
//! concurrent phase finishes, so no report state is shared between tasks.

use imglib_asset::{AssetId, AssetPath};
use imglib_registry::RecordChange;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Two asset paths that derive the same identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifierConflict {
    /// Contested identifier
    pub id: AssetId,
    /// Path that was skipped
    pub path: AssetPath,
    /// Path that owns the identifier for this pass
    pub claimed_by: AssetPath,
}

/// Where a recoverable failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FailureStage {
    /// Enumerating the asset tree
    Scan,
    /// Reading an asset for fingerprinting
    Fingerprint,
}

/// A path the pass could not process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetFailure {
    /// Relative asset path, or the host path of an unreadable directory
    pub path: String,
    /// Stage that failed
    pub stage: FailureStage,
    /// Underlying error message
    pub reason: String,
}

/// Decision taken for one asset
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetOutcome {
    /// New record created
    Added,
    /// Content and/or path changed; system fields refreshed
    Updated(RecordChange),
    /// Stored record was unreadable and has been rebuilt
    Recreated,
    /// Only `_lastSync` refreshed
    Unchanged,
    /// Asset could not be processed
    Failed(AssetFailure),
}

/// Summary of one reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    /// Identifiers whose record was created
    pub added: Vec<AssetId>,
    /// Identifiers whose record was rewritten for a content or path change
    pub updated: Vec<AssetId>,
    /// Identifiers whose corrupt record was replaced
    pub recreated: Vec<AssetId>,
    /// Identifiers in the registry with no asset in this pass
    pub orphaned: Vec<AssetId>,
    /// Orphan detection did not run because the scan was incomplete
    pub orphans_skipped: bool,
    /// Records that only had `_lastSync` refreshed
    pub unchanged: usize,
    /// Assets skipped because their identifier was already claimed
    pub conflicts: Vec<IdentifierConflict>,
    /// Recoverable scan and read failures
    pub failures: Vec<AssetFailure>,
    /// Nothing was written
    pub dry_run: bool,
}

impl SyncReport {
    /// Empty report
    #[inline]
    #[must_use]
    pub fn new(dry_run: bool) -> Self {
        Self {
            dry_run,
            ..Self::default()
        }
    }

    /// Fold one asset outcome into the report
    pub fn record(&mut self, id: AssetId, outcome: AssetOutcome) {
        match outcome {
            AssetOutcome::Added => self.added.push(id),
            AssetOutcome::Updated(_) => self.updated.push(id),
            AssetOutcome::Recreated => self.recreated.push(id),
            AssetOutcome::Unchanged => self.unchanged += 1,
            AssetOutcome::Failed(failure) => self.failures.push(failure),
        }
    }

    /// Sort every list so reports compare equal regardless of task order
    pub fn finish(&mut self) {
        self.added.sort();
        self.updated.sort();
        self.recreated.sort();
        self.orphaned.sort();
        self.conflicts
            .sort_by(|a, b| (&a.id, &a.path).cmp(&(&b.id, &b.path)));
        self.failures.sort_by(|a, b| a.path.cmp(&b.path));
    }

    /// Assets that ended with a record in this pass
    #[inline]
    #[must_use]
    pub fn total_assets(&self) -> usize {
        self.added.len() + self.updated.len() + self.recreated.len() + self.unchanged
    }

    /// Whether anything needs a human look
    #[inline]
    #[must_use]
    pub fn has_problems(&self) -> bool {
        !self.conflicts.is_empty() || !self.failures.is_empty() || !self.recreated.is_empty()
    }
}

impl Display for SyncReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let prefix = if self.dry_run { "[dry run] " } else { "" };
        writeln!(
            f,
            "{prefix}{} added, {} updated, {} unchanged, {} recreated, {} orphaned",
            self.added.len(),
            self.updated.len(),
            self.unchanged,
            self.recreated.len(),
            self.orphaned.len(),
        )?;

        let sections: [(&str, &[AssetId]); 4] = [
            ("added", &self.added),
            ("updated", &self.updated),
            ("recreated", &self.recreated),
            ("orphaned", &self.orphaned),
        ];
        for (label, ids) in sections {
            for id in ids {
                writeln!(f, "  {label:<9} {id}")?;
            }
        }
        if self.orphans_skipped {
            writeln!(f, "  orphan check skipped: asset scan was incomplete")?;
        }
        for conflict in &self.conflicts {
            writeln!(
                f,
                "  conflict  {} ({} already used by {})",
                conflict.path, conflict.id, conflict.claimed_by
            )?;
        }
        for failure in &self.failures {
            writeln!(f, "  failed    {}: {}", failure.path, failure.reason)?;
        }
        Ok(())
    }
}
