// src/config.rs

//! Configuration loading utilities.
//!
//! Configuration comes from a TOML file (local disk or a document store),
//! with `NEWS_*` environment variables applied on top.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::Config;
use crate::storage::DocumentStore;

/// Document path of the config file inside a document store.
pub const CONFIG_DOCUMENT: &str = "config/config.toml";

/// Loads the config file from a document store (S3 for Lambda).
pub struct LambdaConfigLoader {
    store: Arc<dyn DocumentStore>,
    path: String,
}

impl LambdaConfigLoader {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            path: CONFIG_DOCUMENT.to_string(),
        }
    }

    /// Load the stored config, or defaults if the document is absent.
    pub async fn load_config(&self) -> Result<Config> {
        log::info!("Loading config file from {}: {}", self.store.location(), self.path);

        let Some(bytes) = self.store.get(&self.path).await? else {
            log::warn!("Config file {} not found, using defaults", self.path);
            return Ok(Config::default());
        };

        let text = String::from_utf8(bytes).map_err(|e| {
            AppError::config(format!("Config file {} is not valid UTF-8: {}", self.path, e))
        })?;
        Ok(toml::from_str(&text)?)
    }
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file is missing or unreadable; environment
/// overrides are applied and the result validated either way.
pub fn load_config(path: &Path) -> Result<Config> {
    let mut config = Config::load_or_default(path);
    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    config.validate()?;
    Ok(config)
}

/// Apply `NEWS_*` overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = parse_var(&lookup, "NEWS_TIMEOUT_SECS")? {
        config.upstream.timeout_secs = v;
    }
    if let Some(v) = parse_var(&lookup, "NEWS_PAGE_SIZE")? {
        config.upstream.page_size = v;
    }
    if let Some(v) = parse_var(&lookup, "NEWS_DETAIL_CONCURRENCY")? {
        config.upstream.detail_concurrency = v;
    }
    if let Some(v) = parse_var(&lookup, "NEWS_THUMBNAIL_TTL_SECS")? {
        config.cache.thumbnail_ttl_secs = v;
    }
    if let Some(dir) = lookup("NEWS_STORAGE_DIR").filter(|d| !d.trim().is_empty()) {
        config.storage.root_dir = dir;
    }
    Ok(())
}

fn parse_var<F, T>(lookup: &F, name: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| AppError::config(format!("{} is not a valid number: {:?}", name, raw))),
    }
}
