// src/services/query.rs

//! Request handling over stored snapshots.

use std::sync::Arc;

use crate::catalog::{Category, Region};
use crate::error::{AppError, Result};
use crate::models::{ArticleRow, CategorySnapshot, NewsListResponse, NewsPage, QueryConfig, SnapshotKey};
use crate::pipeline::Synchronizer;
use crate::utils::clock::Clock;

/// Validates a request, loads (or builds) the snapshot and pages it.
pub struct QueryService {
    synchronizer: Arc<Synchronizer>,
    clock: Arc<dyn Clock>,
    config: QueryConfig,
}

impl QueryService {
    pub fn new(synchronizer: Arc<Synchronizer>, clock: Arc<dyn Clock>, config: QueryConfig) -> Self {
        Self {
            synchronizer,
            clock,
            config,
        }
    }

    /// Answer one page of a category.
    ///
    /// `lang` is a language tag or a region code; blank means the configured
    /// default. `index` and `size` are the raw parameters: blank means the
    /// default, anything else must be a positive integer.
    ///
    /// A pair that was never synced is refreshed inline before answering.
    pub async fn handle(
        &self,
        category: &str,
        lang: Option<&str>,
        index: Option<&str>,
        size: Option<&str>,
    ) -> Result<NewsPage> {
        let category = self.synchronizer.categories().resolve(category)?;

        let tag = lang
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .unwrap_or(self.config.default_lang.as_str());
        let region = self.synchronizer.regions().resolve(tag)?;

        let index = parse_positive("index", index, self.config.default_index)?;
        let size = parse_positive("size", size, self.config.default_size)?;

        let snapshot = self.load_or_refresh(region, category).await?;
        Ok(NewsPage::new(paginate(&snapshot.rows, index, size)))
    }

    /// [`handle`](Self::handle) wrapped in the response envelope.
    pub async fn respond(
        &self,
        category: &str,
        lang: Option<&str>,
        index: Option<&str>,
        size: Option<&str>,
    ) -> Result<NewsListResponse> {
        let page = self.handle(category, lang, index, size).await?;
        Ok(NewsListResponse::ok(page, self.clock.now().timestamp_millis()))
    }

    async fn load_or_refresh(&self, region: &Region, category: &Category) -> Result<CategorySnapshot> {
        let key = SnapshotKey::new(&region.code, &category.name);

        match self.synchronizer.store().load(&key).await {
            Ok(Some(snapshot)) => Ok(snapshot),
            Ok(None) => {
                log::info!("No snapshot for {}, refreshing on demand", key);
                self.synchronizer
                    .refresh(region, category)
                    .await
                    .map(|done| done.snapshot)
                    .map_err(|e| {
                        log::error!("On-demand refresh of {} failed: {}", key, e);
                        AppError::cache_unavailable(key.to_string(), e)
                    })
            }
            Err(e) => {
                log::error!("Snapshot load for {} failed: {}", key, e);
                Err(AppError::cache_unavailable(key.to_string(), e))
            }
        }
    }
}

/// Parse an optional positive integer parameter.
fn parse_positive(name: &str, raw: Option<&str>, default: usize) -> Result<usize> {
    match raw.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(value) => match value.parse::<usize>() {
            Ok(n) if n > 0 => Ok(n),
            _ => Err(AppError::invalid_parameter(name)),
        },
    }
}

/// The `index`-th page (1-based) of `size` rows.
///
/// A page starting past the end is empty.
pub fn paginate(rows: &[ArticleRow], index: usize, size: usize) -> Vec<ArticleRow> {
    let start = index.saturating_sub(1).saturating_mul(size);
    if start >= rows.len() {
        return Vec::new();
    }
    let end = start.saturating_add(size).min(rows.len());
    rows[start..end].to_vec()
}
