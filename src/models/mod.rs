// src/models/mod.rs

//! Domain models for the news cache.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod article;
mod config;
mod response;
mod snapshot;

// Re-export all public types
pub use article::{ArticleRow, DetailData, ListData, NewsDetail, UpstreamEnvelope};
pub use config::{
    CacheConfig, CategoryInfo, Config, LanguageAlias, QueryConfig, RegionInfo, SchedulerConfig,
    StorageConfig, UpstreamConfig,
};
pub use response::{ErrorResponse, NewsListResponse, NewsPage};
pub use snapshot::{CategorySnapshot, SnapshotKey};
