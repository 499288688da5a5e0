//! Application configuration structures.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Upstream HTTP and paging behavior
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Thumbnail cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Background resync timer
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Request defaults
    #[serde(default)]
    pub query: QueryConfig,

    /// Snapshot persistence
    #[serde(default)]
    pub storage: StorageConfig,

    /// Region code to upstream base URL
    #[serde(default = "defaults::regions")]
    pub regions: Vec<RegionInfo>,

    /// Public category to upstream type filter
    #[serde(default = "defaults::categories")]
    pub categories: Vec<CategoryInfo>,

    /// Language tag to region code aliases
    #[serde(default = "defaults::languages")]
    pub languages: Vec<LanguageAlias>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.upstream.user_agent.trim().is_empty() {
            return Err(AppError::validation("upstream.user_agent is empty"));
        }
        if self.upstream.timeout_secs == 0 {
            return Err(AppError::validation("upstream.timeout_secs must be > 0"));
        }
        if self.upstream.page_size == 0 {
            return Err(AppError::validation("upstream.page_size must be > 0"));
        }
        if self.upstream.max_pages == 0 {
            return Err(AppError::validation("upstream.max_pages must be > 0"));
        }
        if self.upstream.detail_concurrency == 0 {
            return Err(AppError::validation(
                "upstream.detail_concurrency must be > 0",
            ));
        }
        if self.cache.thumbnail_ttl_secs == 0 {
            return Err(AppError::validation("cache.thumbnail_ttl_secs must be > 0"));
        }
        let interval = self.scheduler.interval_minutes;
        if interval == 0 || (24 * 60) % interval != 0 {
            return Err(AppError::validation(
                "scheduler.interval_minutes must be > 0 and divide a day",
            ));
        }
        if self.query.default_index == 0 || self.query.default_size == 0 {
            return Err(AppError::validation(
                "query.default_index and query.default_size must be > 0",
            ));
        }

        if self.regions.is_empty() {
            return Err(AppError::validation("No regions defined"));
        }
        let mut codes = HashSet::new();
        for region in &self.regions {
            let code = region.code.trim();
            if code.is_empty() || code != code.to_lowercase() {
                return Err(AppError::validation(format!(
                    "region code {:?} must be a lowercase identifier",
                    region.code
                )));
            }
            if !codes.insert(code) {
                return Err(AppError::validation(format!(
                    "duplicate region code {code}"
                )));
            }
            Url::parse(&region.base_url).map_err(|e| {
                AppError::validation(format!(
                    "region {code} has invalid base_url {}: {e}",
                    region.base_url
                ))
            })?;
        }

        if self.categories.is_empty() {
            return Err(AppError::validation("No categories defined"));
        }
        let mut names = HashSet::new();
        for category in &self.categories {
            let name = category.name.trim().to_lowercase();
            if name.is_empty() || category.news_type.trim().is_empty() {
                return Err(AppError::validation(
                    "category name and news_type must not be empty",
                ));
            }
            if !names.insert(name) {
                return Err(AppError::validation(format!(
                    "duplicate category {}",
                    category.name
                )));
            }
        }

        for alias in &self.languages {
            if !codes.contains(alias.region.trim()) {
                return Err(AppError::validation(format!(
                    "language {} points at unknown region {}",
                    alias.tag, alias.region
                )));
            }
        }

        let default_lang = self.query.default_lang.trim().to_lowercase();
        let resolves = codes.contains(default_lang.as_str())
            || self
                .languages
                .iter()
                .any(|alias| alias.tag.trim().to_lowercase() == default_lang);
        if !resolves {
            return Err(AppError::validation(format!(
                "query.default_lang {} is neither a language tag nor a region code",
                self.query.default_lang
            )));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upstream: UpstreamConfig::default(),
            cache: CacheConfig::default(),
            scheduler: SchedulerConfig::default(),
            query: QueryConfig::default(),
            storage: StorageConfig::default(),
            regions: defaults::regions(),
            categories: defaults::categories(),
            languages: defaults::languages(),
        }
    }
}

/// Upstream HTTP client and paging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Per-call timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Rows requested per list page during a sync
    #[serde(default = "defaults::page_size")]
    pub page_size: u32,

    /// Upper bound on list pages fetched per category
    #[serde(default = "defaults::max_pages")]
    pub max_pages: u32,

    /// Detail fetches allowed in flight during enrichment
    #[serde(default = "defaults::detail_concurrency")]
    pub detail_concurrency: usize,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            page_size: defaults::page_size(),
            max_pages: defaults::max_pages(),
            detail_concurrency: defaults::detail_concurrency(),
        }
    }
}

/// Thumbnail cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Lifetime of a resolved thumbnail in seconds
    #[serde(default = "defaults::thumbnail_ttl")]
    pub thumbnail_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            thumbnail_ttl_secs: defaults::thumbnail_ttl(),
        }
    }
}

/// Background resync settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "defaults::enabled")]
    pub enabled: bool,

    /// Minutes between runs, aligned to wall-clock multiples
    #[serde(default = "defaults::interval_minutes")]
    pub interval_minutes: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::enabled(),
            interval_minutes: defaults::interval_minutes(),
        }
    }
}

/// Request parameter defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    #[serde(default = "defaults::default_index")]
    pub default_index: usize,

    #[serde(default = "defaults::default_size")]
    pub default_size: usize,

    /// Language used when the request carries none
    #[serde(default = "defaults::default_lang")]
    pub default_lang: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_index: defaults::default_index(),
            default_size: defaults::default_size(),
            default_lang: defaults::default_lang(),
        }
    }
}

/// Local snapshot storage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding `snapshots/{region}/{category}.json`
    #[serde(default = "defaults::root_dir")]
    pub root_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_dir: defaults::root_dir(),
        }
    }
}

/// Region definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionInfo {
    /// Lowercase region code (e.g., "global", "jp")
    pub code: String,

    /// Upstream site root
    pub base_url: String,
}

/// Category definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryInfo {
    /// Public category name (e.g., "notices")
    pub name: String,

    /// Upstream `type` filter; "latest" disables filtering
    pub news_type: String,
}

/// Language tag alias for a region.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageAlias {
    pub tag: String,
    pub region: String,
}

mod defaults {
    use super::{CategoryInfo, LanguageAlias, RegionInfo};

    // Upstream defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; stella-news/0.1)".into()
    }
    pub fn timeout() -> u64 {
        10
    }
    pub fn page_size() -> u32 {
        30
    }
    pub fn max_pages() -> u32 {
        100
    }
    pub fn detail_concurrency() -> usize {
        4
    }

    // Cache defaults
    pub fn thumbnail_ttl() -> u64 {
        10 * 60
    }

    // Scheduler defaults
    pub fn enabled() -> bool {
        true
    }
    pub fn interval_minutes() -> u32 {
        30
    }

    // Query defaults
    pub fn default_index() -> usize {
        1
    }
    pub fn default_size() -> usize {
        6
    }
    pub fn default_lang() -> String {
        "en".into()
    }

    // Storage defaults
    pub fn root_dir() -> String {
        "storage".into()
    }

    pub fn regions() -> Vec<RegionInfo> {
        [
            ("global", "https://stellasora.global"),
            ("jp", "https://stellasora.jp"),
            ("tw", "https://stellasora.stargazer-games.com"),
            ("cn", "https://stellasora.yostar.cn"),
        ]
        .into_iter()
        .map(|(code, base_url)| RegionInfo {
            code: code.to_string(),
            base_url: base_url.to_string(),
        })
        .collect()
    }

    pub fn categories() -> Vec<CategoryInfo> {
        [
            ("updates", "latest"),
            ("notices", "notice"),
            ("news", "news"),
            ("events", "activity"),
        ]
        .into_iter()
        .map(|(name, news_type)| CategoryInfo {
            name: name.to_string(),
            news_type: news_type.to_string(),
        })
        .collect()
    }

    pub fn languages() -> Vec<LanguageAlias> {
        [
            ("en", "global"),
            ("us", "global"),
            ("jp", "jp"),
            ("ja", "jp"),
            ("tw", "tw"),
            ("zh-tw", "tw"),
            ("cn", "cn"),
            ("zh-cn", "cn"),
            ("zh", "cn"),
        ]
        .into_iter()
        .map(|(tag, region)| LanguageAlias {
            tag: tag.to_string(),
            region: region.to_string(),
        })
        .collect()
    }
}
