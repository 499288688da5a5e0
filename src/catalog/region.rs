//! Region catalog: region code to upstream site, plus language aliases.

use std::collections::HashMap;

use url::Url;

use crate::error::{AppError, Result};
use crate::models::Config;

/// An upstream deployment with its own base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub code: String,
    pub base_url: Url,
}

/// Known regions in configuration order.
#[derive(Debug, Clone)]
pub struct RegionCatalog {
    regions: Vec<Region>,
    aliases: HashMap<String, String>,
}

impl RegionCatalog {
    /// Build the catalog from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let regions = config
            .regions
            .iter()
            .map(|info| {
                let base_url = Url::parse(info.base_url.trim()).map_err(|e| {
                    AppError::config(format!(
                        "region {} has invalid base_url {}: {e}",
                        info.code, info.base_url
                    ))
                })?;
                Ok(Region {
                    code: info.code.trim().to_lowercase(),
                    base_url,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let aliases = config
            .languages
            .iter()
            .map(|alias| {
                (
                    alias.tag.trim().to_lowercase(),
                    alias.region.trim().to_lowercase(),
                )
            })
            .collect();

        Ok(Self { regions, aliases })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Look up a region by exact code.
    pub fn get(&self, code: &str) -> Option<&Region> {
        self.regions.iter().find(|r| r.code == code)
    }

    /// Resolve a language or region tag.
    ///
    /// Language aliases win; a tag that is itself a region code is accepted
    /// directly.
    pub fn resolve(&self, tag: &str) -> Result<&Region> {
        let tag = tag.trim().to_lowercase();
        let code = self.aliases.get(&tag).map(String::as_str).unwrap_or(tag.as_str());
        self.get(code)
            .ok_or_else(|| AppError::UnsupportedRegion(tag.clone()))
    }
}
