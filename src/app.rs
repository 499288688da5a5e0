// src/app.rs

//! Component wiring.
//!
//! One `NewsApp` owns the catalogs, thumbnail cache, snapshot store,
//! synchronizer and query service for the life of the process. Nothing is
//! global, so tests can build as many isolated instances as they like.

use std::sync::Arc;
use std::time::Duration;

use crate::catalog::{CategoryMap, RegionCatalog};
use crate::error::Result;
use crate::models::Config;
use crate::pipeline::{SchedulerHandle, SyncScheduler, Synchronizer};
use crate::services::{NewsUpstream, QueryService, ThumbnailCache, ThumbnailResolver, UpstreamNewsClient};
use crate::storage::{CategorySnapshotStore, DocumentStore};
use crate::utils::clock::{Clock, SystemClock};

/// The assembled news cache.
pub struct NewsApp {
    config: Config,
    clock: Arc<dyn Clock>,
    store: CategorySnapshotStore,
    synchronizer: Arc<Synchronizer>,
    query: QueryService,
}

impl NewsApp {
    /// Wire the production components over the given document backend.
    pub fn new(config: Config, backend: Arc<dyn DocumentStore>) -> Result<Self> {
        let upstream = Arc::new(UpstreamNewsClient::new(&config.upstream)?);
        Self::with_parts(config, upstream, backend, Arc::new(SystemClock))
    }

    /// Wire with explicit upstream and clock.
    pub fn with_parts(
        config: Config,
        upstream: Arc<dyn NewsUpstream>,
        backend: Arc<dyn DocumentStore>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;

        let regions = Arc::new(RegionCatalog::from_config(&config)?);
        let categories = Arc::new(CategoryMap::from_config(&config));

        let cache = Arc::new(ThumbnailCache::new(
            Duration::from_secs(config.cache.thumbnail_ttl_secs),
            clock.clone(),
        ));
        let resolver = Arc::new(ThumbnailResolver::new(
            upstream.clone(),
            cache,
            config.upstream.detail_concurrency,
        ));

        let store = CategorySnapshotStore::new(backend, clock.clone());
        let synchronizer = Arc::new(Synchronizer::new(
            regions,
            categories,
            upstream,
            resolver,
            store.clone(),
            clock.clone(),
            &config.upstream,
        ));
        let query = QueryService::new(synchronizer.clone(), clock.clone(), config.query.clone());

        log::info!(
            "News cache ready: {} regions, {} categories, snapshots in {}",
            synchronizer.regions().len(),
            synchronizer.categories().len(),
            store.location()
        );

        Ok(Self {
            config,
            clock,
            store,
            synchronizer,
            query,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &CategorySnapshotStore {
        &self.store
    }

    pub fn synchronizer(&self) -> &Arc<Synchronizer> {
        &self.synchronizer
    }

    pub fn query(&self) -> &QueryService {
        &self.query
    }

    /// Start the periodic resync, unless disabled in config.
    pub fn start_scheduler(&self) -> Option<SchedulerHandle> {
        if !self.config.scheduler.enabled {
            log::info!("Scheduler disabled by configuration");
            return None;
        }
        let scheduler = SyncScheduler::new(
            self.synchronizer.clone(),
            self.clock.clone(),
            self.config.scheduler.interval_minutes,
        );
        Some(scheduler.start())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::testing::{FakeUpstream, ManualClock, MemoryStore, rows};

    fn app(config: Config, upstream: FakeUpstream) -> NewsApp {
        NewsApp::with_parts(
            config,
            Arc::new(upstream),
            Arc::new(MemoryStore::default()),
            Arc::new(ManualClock::at("2026-01-01T10:00:00Z")),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_query_through_app() {
        let upstream = FakeUpstream::new().with_pages("global", "latest", vec![rows(1, 3, "news")]);
        let app = app(Config::default(), upstream);

        let page = app.query().handle("updates", None, None, None).await.unwrap();
        assert_eq!(page.count, 3);
        assert_eq!(app.store().keys().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_disabled_scheduler_does_not_start() {
        let mut config = Config::default();
        config.scheduler.enabled = false;
        let app = app(config, FakeUpstream::new());
        assert!(app.start_scheduler().is_none());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = Config::default();
        config.regions.clear();
        let result = NewsApp::with_parts(
            config,
            Arc::new(FakeUpstream::new()),
            Arc::new(MemoryStore::default()),
            Arc::new(ManualClock::at("2026-01-01T10:00:00Z")),
        );
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
