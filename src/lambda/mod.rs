// src/lambda/mod.rs

//! AWS Lambda handler for the news cache.
//!
//! Each invocation runs one sync cycle against S3:
//! 1. Loads `config/config.toml` from the bucket prefix (defaults if absent)
//! 2. Applies `NEWS_*` environment overrides
//! 3. Refreshes every selected region × category snapshot
//!
//! Schedule invocations with an EventBridge rule at `:00` and `:30`. The
//! scheduled event's own `region` field is the AWS region the rule lives
//! in, so the sync filters use the `newsRegion` and `newsCategory` keys.

use std::sync::Arc;

use lambda_runtime::{Error as LambdaError, LambdaEvent};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::app::NewsApp;
use crate::config::{LambdaConfigLoader, apply_env_overrides};
use crate::error::Result;
use crate::pipeline::SyncReport;
use crate::storage::S3Storage;

/// Lambda invocation payload. An empty payload, or a scheduled event,
/// syncs everything.
#[derive(Debug, Default, Deserialize)]
pub struct SyncRequest {
    /// Region code or language tag to restrict the sync to
    #[serde(default, rename = "newsRegion")]
    pub region: Option<String>,

    /// Category name to restrict the sync to
    #[serde(default, rename = "newsCategory")]
    pub category: Option<String>,
}

/// Lambda response payload.
#[derive(Debug, Default, Serialize)]
pub struct SyncResponse {
    /// True when every selected pair refreshed
    pub success: bool,

    /// Pairs refreshed
    pub refreshed: usize,

    /// Pairs that failed
    pub failed: usize,

    /// `region:category: message` per failure, or the setup error
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,

    /// Execution time in milliseconds
    pub execution_time_ms: u64,
}

impl From<&SyncReport> for SyncResponse {
    fn from(report: &SyncReport) -> Self {
        Self {
            success: report.is_success(),
            refreshed: report.refreshed.len(),
            failed: report.failures.len(),
            errors: report
                .failures
                .iter()
                .map(|f| format!("{}: {}", f.key, f.error))
                .collect(),
            execution_time_ms: 0,
        }
    }
}

/// Main Lambda handler function.
#[instrument(skip(event))]
pub async fn handler(event: LambdaEvent<SyncRequest>) -> std::result::Result<SyncResponse, LambdaError> {
    let start = std::time::Instant::now();
    let (request, _context) = event.into_parts();

    info!(
        "Starting sync: region={:?}, category={:?}",
        request.region, request.category
    );

    let mut response = match run_sync(&request).await {
        Ok(report) => SyncResponse::from(&report),
        Err(e) => {
            error!("Sync failed before any refresh: {}", e);
            SyncResponse {
                errors: vec![e.to_string()],
                ..Default::default()
            }
        }
    };
    response.execution_time_ms = start.elapsed().as_millis() as u64;

    info!(
        "Sync finished: {} refreshed, {} failed in {}ms",
        response.refreshed, response.failed, response.execution_time_ms
    );
    Ok(response)
}

/// Internal sync logic.
async fn run_sync(request: &SyncRequest) -> Result<SyncReport> {
    let storage = Arc::new(S3Storage::from_env().await?);

    let mut config = LambdaConfigLoader::new(storage.clone()).load_config().await?;
    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;

    let app = NewsApp::new(config, storage)?;
    app.synchronizer()
        .run_selected(request.region.as_deref(), request.category.as_deref())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::models::SnapshotKey;
    use crate::pipeline::{PairFailure, PairSummary};
    use crate::testing::{Fixture, FakeUpstream, rows};

    #[test]
    fn test_empty_payload_selects_everything() {
        let request: SyncRequest = serde_json::from_str("{}").unwrap();
        assert!(request.region.is_none());
        assert!(request.category.is_none());
    }

    #[tokio::test]
    async fn test_scheduled_event_syncs_every_pair() {
        let event = serde_json::json!({
            "version": "0",
            "id": "53dc4d37-cffa-4f76-80c9-8b7d4a4d2eaa",
            "detail-type": "Scheduled Event",
            "source": "aws.events",
            "account": "123456789012",
            "time": "2026-01-01T10:30:00Z",
            "region": "us-east-1",
            "resources": ["arn:aws:events:us-east-1:123456789012:rule/stella-news"],
            "detail": {}
        });
        let request: SyncRequest = serde_json::from_value(event).unwrap();
        assert!(request.region.is_none());
        assert!(request.category.is_none());

        let upstream = FakeUpstream::new().with_pages("jp", "news", vec![rows(1, 3, "news")]);
        let fixture = Fixture::new(upstream);
        let report = fixture
            .synchronizer
            .run_selected(request.region.as_deref(), request.category.as_deref())
            .await
            .unwrap();
        assert!(report.failures.is_empty());
        assert_eq!(
            report.refreshed.len(),
            fixture.config.regions.len() * fixture.config.categories.len()
        );
    }

    #[test]
    fn test_news_filters_are_read_from_own_keys() {
        let request: SyncRequest = serde_json::from_value(serde_json::json!({
            "region": "us-east-1",
            "newsRegion": "ja",
            "newsCategory": "notices"
        }))
        .unwrap();
        assert_eq!(request.region.as_deref(), Some("ja"));
        assert_eq!(request.category.as_deref(), Some("notices"));
    }

    #[test]
    fn test_response_from_report() {
        let now = Utc::now();
        let report = SyncReport {
            started_at: now,
            finished_at: now,
            refreshed: vec![PairSummary {
                key: SnapshotKey::new("global", "news"),
                rows: 12,
                diff: Default::default(),
                thumbnails: Default::default(),
            }],
            failures: vec![PairFailure {
                key: SnapshotKey::new("jp", "news"),
                error: "upstream status 502".to_string(),
            }],
        };

        let response = SyncResponse::from(&report);
        assert!(!response.success);
        assert_eq!(response.refreshed, 1);
        assert_eq!(response.failed, 1);
        assert_eq!(response.errors, vec!["jp:news: upstream status 502"]);
    }
}
