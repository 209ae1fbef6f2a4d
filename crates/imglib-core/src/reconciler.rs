//! Reconciliation pass
//!
//! One pass runs in four phases:
//!
//! 1. **Scan** the assets root (blocking walk, off the executor)
//! 2. **Claim** identifiers; when several paths derive one identifier, the
//!    path its stored record names keeps it, otherwise the first in sorted
//!    order. The others become conflicts and are not written
//! 3. **Reconcile** every claimed asset with bounded fan-out: fingerprint,
//!    load, decide, save
//! 4. **Orphans**: registry keys not claimed in this pass, only when the scan
//!    saw the whole tree
//!
//! Claiming happens before fan-out, so no two in-flight tasks share a store
//! key and the report is a plain reduction over task results.

use crate::config::RegistryConfig;
use crate::error::ReconcileError;
use crate::logger::Logger;
use crate::report::{AssetFailure, AssetOutcome, FailureStage, IdentifierConflict, SyncReport};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt, TryStreamExt};
use imglib_asset::{AssetId, AssetPath, Fingerprint};
use imglib_registry::{scan, LoadOutcome, MetadataRecord, MetadataStore, ScanOutcome, ScannedAsset, StoreError};
use std::collections::{BTreeMap, BTreeSet};

/// Run one reconciliation pass
///
/// Validates `config`, then reconciles its assets root against its registry
/// root, logging through `logger`.
///
/// # Errors
/// - `ReconcileError::Config` if the configuration is rejected
/// - `ReconcileError::Store` if the registry cannot be created, written or listed
pub async fn generate_registry(
    config: &RegistryConfig,
    logger: &dyn Logger,
) -> Result<SyncReport, ReconcileError> {
    config.validate()?;
    Reconciler::new(config.clone(), logger).run().await
}

/// Reconciles one assets root against one registry
pub struct Reconciler<'a> {
    config: RegistryConfig,
    store: MetadataStore,
    logger: &'a dyn Logger,
}

impl std::fmt::Debug for Reconciler<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("config", &self.config)
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}

/// Asset that won its identifier in the claim phase
#[derive(Debug)]
struct Claim {
    id: AssetId,
    asset: ScannedAsset,
}

impl<'a> Reconciler<'a> {
    /// Create a reconciler; the configuration is used as given
    #[must_use]
    pub fn new(config: RegistryConfig, logger: &'a dyn Logger) -> Self {
        let store = MetadataStore::new(&config.registry_dir);
        Self {
            config,
            store,
            logger,
        }
    }

    /// Registry this reconciler writes to
    #[inline]
    #[must_use]
    pub fn store(&self) -> &MetadataStore {
        &self.store
    }

    /// Run a pass stamped with the current time
    ///
    /// # Errors
    /// See [`generate_registry`]
    pub async fn run(&self) -> Result<SyncReport, ReconcileError> {
        self.run_at(Utc::now()).await
    }

    /// Run a pass, stamping every written record with `now`
    ///
    /// # Errors
    /// See [`generate_registry`]
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<SyncReport, ReconcileError> {
        let mut report = SyncReport::new(self.config.dry_run);

        if !self.config.dry_run {
            self.store.ensure_root().await?;
        }

        let scanned = self.scan().await?;
        self.logger.info(&format!(
            "Found {} assets in {}",
            scanned.assets.len(),
            self.config.assets_dir.display()
        ));
        for err in &scanned.errors {
            self.logger.error(&format!("Error scanning directory: {err}"));
            report.failures.push(AssetFailure {
                path: err.path.display().to_string(),
                stage: FailureStage::Scan,
                reason: err.source.to_string(),
            });
        }

        let complete = scanned.is_complete();
        let (claims, conflicts) = self.claim(scanned.assets).await;
        report.conflicts = conflicts;
        let seen: BTreeSet<AssetId> = claims.iter().map(|c| c.id.clone()).collect();

        let outcomes: Vec<(AssetId, AssetOutcome)> = stream::iter(claims)
            .map(|claim| self.reconcile_asset(claim, now))
            .buffer_unordered(self.config.concurrency.max(1))
            .try_collect()
            .await?;
        for (id, outcome) in outcomes {
            report.record(id, outcome);
        }

        if complete {
            report.orphaned = self
                .store
                .keys()
                .await?
                .into_iter()
                .filter(|id| !seen.contains(id))
                .collect();
            for id in &report.orphaned {
                self.logger
                    .warn(&format!("Registry entry {id} has no matching asset (orphaned)"));
            }
        } else {
            report.orphans_skipped = true;
            self.logger
                .warn("Asset scan was incomplete; skipping orphan detection");
        }

        report.finish();
        self.logger.info(&format!(
            "Registry sync complete: {} added, {} updated, {} unchanged, {} recreated, {} orphaned, {} conflicts, {} failures",
            report.added.len(),
            report.updated.len(),
            report.unchanged,
            report.recreated.len(),
            report.orphaned.len(),
            report.conflicts.len(),
            report.failures.len(),
        ));
        Ok(report)
    }

    async fn scan(&self) -> Result<ScanOutcome, ReconcileError> {
        let root = self.config.assets_dir.clone();
        let mut outcome = tokio::task::spawn_blocking(move || scan(&root))
            .await
            .map_err(|e| ReconcileError::ScanAborted(e.to_string()))?;
        outcome.sort();
        Ok(outcome)
    }

    /// Decide which path owns each identifier
    ///
    /// A contested identifier stays with the path its stored record already
    /// names; with no such record the first contender in input order wins.
    async fn claim(&self, assets: Vec<ScannedAsset>) -> (Vec<Claim>, Vec<IdentifierConflict>) {
        let mut contested: BTreeMap<AssetId, Vec<ScannedAsset>> = BTreeMap::new();
        for asset in assets {
            contested.entry(asset.id()).or_default().push(asset);
        }

        let mut claims = Vec::with_capacity(contested.len());
        let mut conflicts = Vec::new();

        for (id, mut contenders) in contested {
            let winner = if contenders.len() > 1 {
                self.recorded_owner(&id, &contenders).await
            } else {
                0
            };
            let asset = contenders.remove(winner);

            for other in contenders {
                self.logger.error(&format!(
                    "Conflicting IDs for {}: {id} is already used by {}. Ensure file names in each directory are different.",
                    other.path, asset.path
                ));
                conflicts.push(IdentifierConflict {
                    id: id.clone(),
                    path: other.path,
                    claimed_by: asset.path.clone(),
                });
            }
            claims.push(Claim { id, asset });
        }

        (claims, conflicts)
    }

    /// Index of the contender the stored record for `id` points at, or 0
    async fn recorded_owner(&self, id: &AssetId, contenders: &[ScannedAsset]) -> usize {
        match self.store.load(id).await {
            LoadOutcome::Found(record) => contenders
                .iter()
                .position(|c| c.path == record.image)
                .unwrap_or(0),
            LoadOutcome::Missing | LoadOutcome::Corrupt { .. } => 0,
        }
    }

    async fn reconcile_asset(
        &self,
        claim: Claim,
        now: DateTime<Utc>,
    ) -> Result<(AssetId, AssetOutcome), StoreError> {
        let Claim { id, asset } = claim;

        let fingerprint = match Fingerprint::from_file(&asset.absolute).await {
            Ok(fp) => fp,
            Err(e) => {
                self.logger
                    .error(&format!("Failed to fingerprint {}: {e}", asset.path));
                let failure = AssetFailure {
                    path: asset.path.to_string(),
                    stage: FailureStage::Fingerprint,
                    reason: e.to_string(),
                };
                return Ok((id, AssetOutcome::Failed(failure)));
            }
        };

        let outcome = match self.store.load(&id).await {
            LoadOutcome::Missing => {
                let record = MetadataRecord::new(asset.path, &fingerprint, now);
                self.persist(&id, &record).await?;
                self.logger.info(&format!("Added registry entry for: {id}"));
                AssetOutcome::Added
            }
            LoadOutcome::Corrupt { reason } => {
                self.logger.warn(&format!(
                    "Registry entry for {id} could not be read ({reason}); recreating"
                ));
                if !self.config.dry_run {
                    if let Some(kept) = self.store.quarantine(&id).await? {
                        self.logger.warn(&format!(
                            "Previous entry for {id} kept at {}",
                            kept.display()
                        ));
                    }
                }
                let record = MetadataRecord::new(asset.path, &fingerprint, now);
                self.persist(&id, &record).await?;
                AssetOutcome::Recreated
            }
            LoadOutcome::Found(existing) => {
                let change = existing.diff(&asset.path, &fingerprint);
                if change.any() {
                    let record = existing.refreshed(asset.path, &fingerprint, now);
                    self.persist(&id, &record).await?;
                    self.logger.info(&format!(
                        "Updated registry entry for: {id} (Image Changed: {}, Path Changed: {})",
                        change.content, change.path
                    ));
                    AssetOutcome::Updated(change)
                } else {
                    self.persist(&id, &existing.touched(now)).await?;
                    self.logger.debug(&format!("Registry entry unchanged: {id}"));
                    AssetOutcome::Unchanged
                }
            }
        };

        Ok((id, outcome))
    }

    async fn persist(&self, id: &AssetId, record: &MetadataRecord) -> Result<(), StoreError> {
        if self.config.dry_run {
            return Ok(());
        }
        self.store.save(id, record).await
    }
}
