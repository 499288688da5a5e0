//! Response envelopes handed to the outer HTTP shell.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::ArticleRow;

/// One page of rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsPage {
    pub count: usize,
    pub rows: Vec<ArticleRow>,
}

impl NewsPage {
    pub fn new(rows: Vec<ArticleRow>) -> Self {
        Self {
            count: rows.len(),
            rows,
        }
    }
}

/// `{code, message, data:{count, rows}, timestamp}`, mirroring the upstream shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsListResponse {
    pub code: i64,
    pub message: String,
    pub data: NewsPage,
    /// Epoch millis at which the response was built
    pub timestamp: i64,
}

impl NewsListResponse {
    pub fn ok(data: NewsPage, timestamp: i64) -> Self {
        Self {
            code: 0,
            message: "ok".to_string(),
            data,
            timestamp,
        }
    }
}

/// Body for a failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        let error = match err {
            AppError::CacheUnavailable { .. } => "news cache unavailable".to_string(),
            other => other.to_string(),
        };
        Self { error }
    }
}
