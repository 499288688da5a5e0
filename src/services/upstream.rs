// src/services/upstream.rs

//! Upstream news API client.
//!
//! Fetches list pages and single-article details from a region's site.
//! Every call is a single attempt bounded by the client timeout; retrying
//! is left to the next sync.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::catalog::Region;
use crate::error::{AppError, Result};
use crate::models::{ArticleRow, DetailData, ListData, NewsDetail, UpstreamConfig, UpstreamEnvelope};
use crate::utils::{build_detail_url, build_list_url, http::create_async_client};

/// One page of the upstream list endpoint.
#[derive(Debug, Clone, Default)]
pub struct ListPage {
    pub rows: Vec<ArticleRow>,

    /// Rows the upstream returned before any filtering; drives paging
    pub upstream_count: usize,
}

/// Source of news lists and article details.
#[async_trait]
pub trait NewsUpstream: Send + Sync {
    /// Fetch page `index` (1-based) of `size` rows of the given upstream type.
    async fn fetch_list_page(
        &self,
        region: &Region,
        news_type: &str,
        index: u32,
        size: u32,
    ) -> Result<ListPage>;

    /// Fetch one article, including its HTML body.
    async fn fetch_detail(&self, region: &Region, id: i64) -> Result<NewsDetail>;
}

/// HTTP implementation of [`NewsUpstream`].
pub struct UpstreamNewsClient {
    client: Client,
}

impl UpstreamNewsClient {
    /// Create a client with the configured user agent and timeout.
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| AppError::unreachable(url.as_str(), e))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(AppError::UpstreamStatus {
                code: status.as_u16(),
                url: url.to_string(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::unreachable(url.as_str(), e))?;

        serde_json::from_slice(&bytes).map_err(|e| AppError::decode(url.as_str(), e))
    }
}

#[async_trait]
impl NewsUpstream for UpstreamNewsClient {
    async fn fetch_list_page(
        &self,
        region: &Region,
        news_type: &str,
        index: u32,
        size: u32,
    ) -> Result<ListPage> {
        let url = build_list_url(&region.base_url, news_type, index, size)?;
        log::debug!("Fetching news list: {}", url);

        let envelope: UpstreamEnvelope<ListData> = self.get_json(url).await?;
        let rows = envelope.data.rows;
        Ok(ListPage {
            upstream_count: rows.len(),
            rows,
        })
    }

    async fn fetch_detail(&self, region: &Region, id: i64) -> Result<NewsDetail> {
        let url = build_detail_url(&region.base_url, id)?;
        log::debug!("Fetching news detail: {}", url);

        let envelope: UpstreamEnvelope<DetailData> = self.get_json(url).await?;
        Ok(envelope.data.news)
    }
}
