// src/storage/s3.rs

//! AWS S3 document store.
//!
//! Documents live under `s3://{bucket}/{prefix}/`; a snapshot therefore ends
//! up at `{prefix}/snapshots/{region}/{category}.json`. A single `PutObject`
//! replaces the whole object, which gives the same replace-or-nothing
//! semantics as the local temp-file rename.

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;

use crate::error::{AppError, Result};
use crate::storage::DocumentStore;

/// S3-backed document store.
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
    prefix: String,
}

impl S3Storage {
    /// Create a new S3 storage instance.
    pub fn new(client: Client, bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            prefix: prefix.into().trim_matches('/').to_string(),
        }
    }

    /// Create S3 storage from the ambient AWS configuration and
    /// `S3_BUCKET` / `S3_PREFIX`.
    pub async fn from_env() -> Result<Self> {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let client = Client::new(&config);

        let bucket = std::env::var("S3_BUCKET")
            .map_err(|_| AppError::config("S3_BUCKET environment variable not set"))?;
        let prefix = std::env::var("S3_PREFIX").unwrap_or_else(|_| "stella-news".to_string());

        Ok(Self::new(client, bucket, prefix))
    }

    /// Full object key for a path relative to the prefix.
    pub fn object_key(&self, path: &str) -> String {
        if self.prefix.is_empty() {
            path.to_string()
        } else {
            format!("{}/{}", self.prefix, path)
        }
    }

    fn relative<'a>(&self, key: &'a str) -> &'a str {
        if self.prefix.is_empty() {
            return key;
        }
        key.strip_prefix(&self.prefix)
            .and_then(|rest| rest.strip_prefix('/'))
            .unwrap_or(key)
    }
}

#[async_trait]
impl DocumentStore for S3Storage {
    async fn get(&self, path: &str) -> Result<Option<Vec<u8>>> {
        let key = self.object_key(path);
        let result = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await;

        match result {
            Ok(output) => {
                let bytes = output
                    .body
                    .collect()
                    .await
                    .map_err(|e| AppError::storage(&key, e))?;
                Ok(Some(bytes.into_bytes().to_vec()))
            }
            Err(err) => {
                let service_err = err.into_service_error();
                if service_err.is_no_such_key() {
                    log::debug!("No object at s3://{}/{}", self.bucket, key);
                    Ok(None)
                } else {
                    Err(AppError::storage(&key, service_err))
                }
            }
        }
    }

    async fn put(&self, path: &str, bytes: &[u8]) -> Result<()> {
        let key = self.object_key(path);
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(bytes.to_vec()))
            .content_type("application/json")
            .send()
            .await
            .map_err(|e| AppError::storage(&key, e.into_service_error()))?;

        log::debug!("Wrote {} bytes to s3://{}/{}", bytes.len(), self.bucket, key);
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let full_prefix = format!("{}/", self.object_key(prefix.trim_end_matches('/')));
        let mut paths = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let output = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(&full_prefix)
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(|e| AppError::storage(&full_prefix, e.into_service_error()))?;

            for object in output.contents() {
                if let Some(key) = object.key() {
                    paths.push(self.relative(key).to_string());
                }
            }

            match output.next_continuation_token() {
                Some(token) if output.is_truncated().unwrap_or(false) => {
                    continuation = Some(token.to_string());
                }
                _ => break,
            }
        }

        paths.sort();
        Ok(paths)
    }

    fn location(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::config::{BehaviorVersion, Region};

    fn storage(prefix: &str) -> S3Storage {
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("ap-northeast-1"))
            .build();
        S3Storage::new(Client::from_conf(config), "news-bucket", prefix)
    }

    #[test]
    fn test_object_key_joins_prefix() {
        let prefixed = storage("/stella-news/");
        assert_eq!(
            prefixed.object_key("snapshots/jp/news.json"),
            "stella-news/snapshots/jp/news.json"
        );
        assert_eq!(prefixed.location(), "s3://news-bucket/stella-news");
    }

    #[test]
    fn test_relative_strips_prefix() {
        let prefixed = storage("stella-news");
        assert_eq!(
            prefixed.relative("stella-news/snapshots/jp/news.json"),
            "snapshots/jp/news.json"
        );

        let bare = storage("");
        assert_eq!(bare.relative("snapshots/a/b.json"), "snapshots/a/b.json");
        assert_eq!(bare.object_key("snapshots/a/b.json"), "snapshots/a/b.json");
    }
}
