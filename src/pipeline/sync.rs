// src/pipeline/sync.rs

//! Snapshot refresh.
//!
//! A refresh pages through the upstream list for one `(region, category)`
//! pair, filters rows to the category, enriches thumbnails and replaces the
//! stored snapshot. A cycle runs the refresh for every pair, isolating
//! failures per pair.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::catalog::{Category, CategoryMap, Region, RegionCatalog};
use crate::error::Result;
use crate::models::{ArticleRow, CategorySnapshot, SnapshotKey, UpstreamConfig};
use crate::pipeline::diff::{SnapshotDiff, calculate_diff};
use crate::services::{EnrichOutcome, NewsUpstream, ThumbnailResolver};
use crate::storage::CategorySnapshotStore;
use crate::utils::clock::Clock;

/// Result of one successful refresh.
#[derive(Debug, Clone)]
pub struct Refreshed {
    pub snapshot: CategorySnapshot,
    pub diff: SnapshotDiff,
    pub thumbnails: EnrichOutcome,
}

/// Per-pair entry of a [`SyncReport`].
#[derive(Debug, Clone)]
pub struct PairSummary {
    pub key: SnapshotKey,
    pub rows: usize,
    pub diff: SnapshotDiff,
    pub thumbnails: EnrichOutcome,
}

/// A pair that failed to refresh. Its previous snapshot is left as is.
#[derive(Debug, Clone)]
pub struct PairFailure {
    pub key: SnapshotKey,
    pub error: String,
}

/// Outcome of a sync cycle.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub refreshed: Vec<PairSummary>,
    pub failures: Vec<PairFailure>,
}

impl SyncReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn total_rows(&self) -> usize {
        self.refreshed.iter().map(|p| p.rows).sum()
    }

    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }

    /// All failures on one line, `None` when the cycle was clean.
    pub fn failures_summary(&self) -> Option<String> {
        if self.failures.is_empty() {
            return None;
        }
        let parts: Vec<String> = self
            .failures
            .iter()
            .map(|f| format!("{}: {}", f.key, f.error))
            .collect();
        Some(parts.join("; "))
    }
}

/// Drives refreshes of category snapshots.
pub struct Synchronizer {
    regions: Arc<RegionCatalog>,
    categories: Arc<CategoryMap>,
    upstream: Arc<dyn NewsUpstream>,
    resolver: Arc<ThumbnailResolver>,
    store: CategorySnapshotStore,
    clock: Arc<dyn Clock>,
    page_size: u32,
    max_pages: u32,
}

impl Synchronizer {
    pub fn new(
        regions: Arc<RegionCatalog>,
        categories: Arc<CategoryMap>,
        upstream: Arc<dyn NewsUpstream>,
        resolver: Arc<ThumbnailResolver>,
        store: CategorySnapshotStore,
        clock: Arc<dyn Clock>,
        config: &UpstreamConfig,
    ) -> Self {
        Self {
            regions,
            categories,
            upstream,
            resolver,
            store,
            clock,
            page_size: config.page_size.max(1),
            max_pages: config.max_pages.max(1),
        }
    }

    pub fn regions(&self) -> &RegionCatalog {
        &self.regions
    }

    pub fn categories(&self) -> &CategoryMap {
        &self.categories
    }

    pub fn store(&self) -> &CategorySnapshotStore {
        &self.store
    }

    /// Page through the upstream list until a short page.
    ///
    /// The stop condition looks at the upstream row count, before rows are
    /// filtered to the category.
    pub async fn fetch_all(&self, region: &Region, category: &Category) -> Result<Vec<ArticleRow>> {
        let mut collected = Vec::new();
        let page_size = self.page_size as usize;

        for index in 1..=self.max_pages {
            let page = self
                .upstream
                .fetch_list_page(region, &category.news_type, index, self.page_size)
                .await?;

            let upstream_count = page.upstream_count;
            let (rows, missing_id): (Vec<_>, Vec<_>) =
                page.rows.into_iter().partition(|row| row.id().is_some());
            if !missing_id.is_empty() {
                log::debug!(
                    "Dropped {} rows without id from {}:{} page {}",
                    missing_id.len(),
                    region.code,
                    category.name,
                    index
                );
            }
            collected.extend(category.filter_rows(rows));

            if upstream_count < page_size {
                return Ok(collected);
            }
        }

        log::warn!(
            "Stopped paging {}:{} after {} full pages",
            region.code,
            category.name,
            self.max_pages
        );
        Ok(collected)
    }

    /// Refresh one pair and replace its snapshot.
    ///
    /// Nothing is written unless every page was fetched; thumbnail failures
    /// do not fail the refresh.
    pub async fn refresh(&self, region: &Region, category: &Category) -> Result<Refreshed> {
        let key = SnapshotKey::new(&region.code, &category.name);

        let previous = match self.store.load(&key).await {
            Ok(previous) => previous,
            Err(e) => {
                log::warn!("Could not load previous snapshot {}: {}", key, e);
                None
            }
        };

        let mut rows = self.fetch_all(region, category).await?;
        let thumbnails = self.resolver.enrich(region, &mut rows).await;
        let snapshot = self.store.save(&key, rows).await?;

        let previous_rows = previous.map(|s| s.rows).unwrap_or_default();
        let diff = calculate_diff(&previous_rows, &snapshot.rows);

        log::info!(
            "Refreshed {}: {} rows (+{} -{} ~{}), thumbnails {}/{} updated, {} failed",
            key,
            snapshot.len(),
            diff.added.len(),
            diff.removed.len(),
            diff.rethumbnailed.len(),
            thumbnails.updated,
            thumbnails.attempted,
            thumbnails.failed
        );

        Ok(Refreshed {
            snapshot,
            diff,
            thumbnails,
        })
    }

    /// Refresh every region × category pair.
    pub async fn run_cycle(&self) -> SyncReport {
        let pairs: Vec<(&Region, &Category)> = self
            .regions
            .iter()
            .flat_map(|region| self.categories.iter().map(move |category| (region, category)))
            .collect();
        self.run_pairs(pairs).await
    }

    /// Refresh a subset: one region, one category, or both.
    ///
    /// `region` accepts a region code or a language tag.
    pub async fn run_selected(&self, region: Option<&str>, category: Option<&str>) -> Result<SyncReport> {
        let regions: Vec<&Region> = match region {
            Some(tag) => vec![self.regions.resolve(tag)?],
            None => self.regions.iter().collect(),
        };
        let categories: Vec<&Category> = match category {
            Some(name) => vec![self.categories.resolve(name)?],
            None => self.categories.iter().collect(),
        };

        let pairs = regions
            .iter()
            .flat_map(|region| categories.iter().map(move |category| (*region, *category)))
            .collect();
        Ok(self.run_pairs(pairs).await)
    }

    async fn run_pairs(&self, pairs: Vec<(&Region, &Category)>) -> SyncReport {
        let started_at = self.clock.now();
        log::info!("Sync cycle started for {} pairs", pairs.len());

        let mut refreshed = Vec::new();
        let mut failures = Vec::new();

        for (region, category) in pairs {
            let key = SnapshotKey::new(&region.code, &category.name);
            match self.refresh(region, category).await {
                Ok(done) => refreshed.push(PairSummary {
                    key,
                    rows: done.snapshot.len(),
                    diff: done.diff,
                    thumbnails: done.thumbnails,
                }),
                Err(e) => failures.push(PairFailure {
                    key,
                    error: e.to_string(),
                }),
            }
        }

        let report = SyncReport {
            started_at,
            finished_at: self.clock.now(),
            refreshed,
            failures,
        };

        match report.failures_summary() {
            None => log::info!(
                "Sync cycle finished: {} pairs, {} rows",
                report.refreshed.len(),
                report.total_rows()
            ),
            Some(summary) => log::error!(
                "Sync cycle finished with {} of {} pairs failed: {}",
                report.failures.len(),
                report.failures.len() + report.refreshed.len(),
                summary
            ),
        }

        report
    }
}
