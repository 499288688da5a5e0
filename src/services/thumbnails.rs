// src/services/thumbnails.rs

//! Hero thumbnail resolution.
//!
//! The hero image of an article is the first `<img src>` of its detail body,
//! falling back to the upstream `thumbnail` field. Resolutions are kept in a
//! TTL cache keyed by `region:id` so repeated syncs within the window skip
//! the detail fetch.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use futures::stream::{self, StreamExt};
use scraper::{Html, Selector};
use tokio::sync::RwLock;

use crate::catalog::Region;
use crate::error::Result;
use crate::models::{ArticleRow, NewsDetail};
use crate::services::NewsUpstream;
use crate::utils::clock::Clock;

/// A cached resolution.
#[derive(Debug, Clone)]
struct CacheEntry {
    detail: NewsDetail,
    hero_thumbnail: String,
    expires: DateTime<Utc>,
}

/// TTL cache of resolved thumbnails.
///
/// Entries are evicted lazily: an expired entry is removed by the read that
/// discovers it.
pub struct ThumbnailCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    ttl: ChronoDuration,
    clock: Arc<dyn Clock>,
}

impl ThumbnailCache {
    pub fn new(ttl: std::time::Duration, clock: Arc<dyn Clock>) -> Self {
        let ttl = ChronoDuration::from_std(ttl).unwrap_or(ChronoDuration::minutes(10));
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    fn key(region: &str, id: i64) -> String {
        format!("{}:{}", region, id)
    }

    /// Cached detail and hero thumbnail, if present and not expired.
    pub async fn get(&self, region: &str, id: i64) -> Option<(NewsDetail, String)> {
        let key = Self::key(region, id);
        let now = self.clock.now();

        {
            let entries = self.entries.read().await;
            match entries.get(&key) {
                None => return None,
                Some(entry) if now <= entry.expires => {
                    return Some((entry.detail.clone(), entry.hero_thumbnail.clone()));
                }
                Some(_) => {}
            }
        }

        // Re-check under the write lock; a concurrent resolve may have
        // refreshed the entry in between.
        let mut entries = self.entries.write().await;
        if entries.get(&key).is_some_and(|entry| now > entry.expires) {
            entries.remove(&key);
        }
        None
    }

    /// Store a resolution. An empty hero falls back to the detail thumbnail.
    pub async fn insert(&self, region: &str, id: i64, detail: NewsDetail, hero: String) {
        let hero_thumbnail = if hero.is_empty() {
            detail.thumbnail.clone()
        } else {
            hero
        };
        let entry = CacheEntry {
            detail,
            hero_thumbnail,
            expires: self.clock.now() + self.ttl,
        };
        self.entries
            .write()
            .await
            .insert(Self::key(region, id), entry);
    }

    /// Number of stored entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

/// Counts from one enrichment batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichOutcome {
    pub attempted: usize,
    pub updated: usize,
    pub failed: usize,
}

/// Resolves hero thumbnails through the cache and a bounded detail fan-out.
pub struct ThumbnailResolver {
    upstream: Arc<dyn NewsUpstream>,
    cache: Arc<ThumbnailCache>,
    concurrency: usize,
}

impl ThumbnailResolver {
    pub fn new(upstream: Arc<dyn NewsUpstream>, cache: Arc<ThumbnailCache>, concurrency: usize) -> Self {
        Self {
            upstream,
            cache,
            concurrency: concurrency.max(1),
        }
    }

    /// Resolve one article's detail and hero thumbnail, cache first.
    pub async fn resolve_one(&self, region: &Region, id: i64) -> Result<(NewsDetail, String)> {
        if let Some(hit) = self.cache.get(&region.code, id).await {
            return Ok(hit);
        }

        let detail = self.upstream.fetch_detail(region, id).await?;
        let hero = extract_first_image(&detail.content).unwrap_or_else(|| detail.thumbnail.clone());

        self.cache
            .insert(&region.code, id, detail.clone(), hero.clone())
            .await;
        Ok((detail, hero))
    }

    /// Set each row's `thumbnail` to its hero image.
    ///
    /// Runs at most `concurrency` detail fetches at once. A row whose
    /// resolution fails or comes back empty keeps its original thumbnail;
    /// failures are logged and never fail the batch.
    pub async fn enrich(&self, region: &Region, rows: &mut [ArticleRow]) -> EnrichOutcome {
        let jobs: Vec<(usize, i64)> = rows
            .iter()
            .enumerate()
            .filter_map(|(idx, row)| row.id().map(|id| (idx, id)))
            .collect();

        let mut outcome = EnrichOutcome {
            attempted: jobs.len(),
            ..EnrichOutcome::default()
        };
        if jobs.is_empty() {
            return outcome;
        }

        let results: Vec<(usize, i64, Result<(NewsDetail, String)>)> = stream::iter(jobs)
            .map(|(idx, id)| async move { (idx, id, self.resolve_one(region, id).await) })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        for (idx, id, result) in results {
            match result {
                Ok((_, hero)) if !hero.is_empty() => {
                    rows[idx].set_thumbnail(hero);
                    outcome.updated += 1;
                }
                Ok(_) => {}
                Err(error) => {
                    outcome.failed += 1;
                    log::warn!(
                        "Thumbnail resolution failed for {}:{}: {}",
                        region.code,
                        id,
                        error
                    );
                }
            }
        }

        outcome
    }
}

/// First `<img src>` in an HTML fragment, entity-decoded.
pub fn extract_first_image(content: &str) -> Option<String> {
    if content.is_empty() {
        return None;
    }
    let selector = Selector::parse("img[src]").ok()?;
    let fragment = Html::parse_fragment(content);
    fragment
        .select(&selector)
        .filter_map(|img| img.value().attr("src"))
        .map(str::trim)
        .find(|src| !src.is_empty())
        .map(str::to_string)
}
