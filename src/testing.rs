// src/testing.rs

//! Test doubles shared by the unit test modules.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use url::Url;

use crate::catalog::{CategoryMap, Region, RegionCatalog};
use crate::error::{AppError, Result};
use crate::models::{ArticleRow, Config, NewsDetail};
use crate::pipeline::Synchronizer;
use crate::services::{ListPage, NewsUpstream, ThumbnailCache, ThumbnailResolver};
use crate::storage::{CategorySnapshotStore, DocumentStore};
use crate::utils::clock::Clock;

/// Region with a placeholder base URL.
pub fn region(code: &str) -> Region {
    Region {
        code: code.to_string(),
        base_url: Url::parse(&format!("https://{}.news.test", code)).unwrap(),
    }
}

/// `n` rows of the given upstream type with ids starting at `first_id`.
pub fn rows(first_id: i64, n: usize, news_type: &str) -> Vec<ArticleRow> {
    (0..n as i64)
        .map(|offset| {
            let id = first_id + offset;
            ArticleRow::from(serde_json::json!({
                "id": id,
                "title": format!("Article {}", id),
                "type": news_type,
                "thumbnail": format!("list-{}.png", id),
            }))
        })
        .collect()
}

// ============================================================================
// One-shot HTTP responder
// ============================================================================

/// A local server that answers exactly one request.
pub struct OneShotServer {
    pub base_url: String,
    request: oneshot::Receiver<String>,
}

impl OneShotServer {
    /// The request line the server received, e.g. `GET /path?q HTTP/1.1`.
    pub async fn request_line(self) -> String {
        self.request.await.unwrap_or_default()
    }
}

/// Serve one response with the given status and body.
pub async fn serve_once(status: u16, body: &str) -> OneShotServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let body = body.to_string();
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let Ok((mut socket, _)) = listener.accept().await else {
            return;
        };

        let mut received = Vec::new();
        let mut buf = [0u8; 1024];
        while !received.windows(4).any(|w| w == b"\r\n\r\n") {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => received.extend_from_slice(&buf[..n]),
            }
        }

        let text = String::from_utf8_lossy(&received);
        let line = text.lines().next().unwrap_or_default().to_string();

        let response = format!(
            "HTTP/1.1 {} Test\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;
        let _ = tx.send(line);
    });

    OneShotServer {
        base_url: format!("http://{}", addr),
        request: rx,
    }
}

/// Base URL of a port nothing listens on.
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

// ============================================================================
// Clock
// ============================================================================

/// Clock that only moves when told to.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn at(rfc3339: &str) -> Self {
        let now = DateTime::parse_from_rfc3339(rfc3339)
            .unwrap()
            .with_timezone(&Utc);
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn advance(&self, by: ChronoDuration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Wall clock that follows tokio's timer, so it moves with paused time.
/// `shift` simulates a clock correction.
pub struct RuntimeClock {
    base: DateTime<Utc>,
    start: tokio::time::Instant,
    offset: Mutex<ChronoDuration>,
}

impl RuntimeClock {
    pub fn at(rfc3339: &str) -> Self {
        Self {
            base: DateTime::parse_from_rfc3339(rfc3339)
                .unwrap()
                .with_timezone(&Utc),
            start: tokio::time::Instant::now(),
            offset: Mutex::new(ChronoDuration::zero()),
        }
    }

    pub fn shift(&self, by: ChronoDuration) {
        *self.offset.lock().unwrap() += by;
    }
}

impl Clock for RuntimeClock {
    fn now(&self) -> DateTime<Utc> {
        let elapsed = ChronoDuration::from_std(self.start.elapsed()).unwrap();
        self.base + elapsed + *self.offset.lock().unwrap()
    }
}

// ============================================================================
// Upstream
// ============================================================================

/// Scripted upstream.
///
/// List pages are keyed by `(region, type)`; a page index past the scripted
/// pages returns an empty page.
#[derive(Default)]
pub struct FakeUpstream {
    pages: Mutex<HashMap<(String, String), Vec<Vec<ArticleRow>>>>,
    details: Mutex<HashMap<i64, NewsDetail>>,
    failing_regions: Mutex<HashSet<String>>,
    failing_details: Mutex<HashSet<i64>>,
    detail_delay: Option<Duration>,
    list_calls: AtomicUsize,
    detail_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pages(self, region: &str, news_type: &str, pages: Vec<Vec<ArticleRow>>) -> Self {
        self.set_pages(region, news_type, pages);
        self
    }

    pub fn with_detail(self, id: i64, detail: NewsDetail) -> Self {
        self.details.lock().unwrap().insert(id, detail);
        self
    }

    pub fn with_failing_detail(self, id: i64) -> Self {
        self.failing_details.lock().unwrap().insert(id);
        self
    }

    pub fn with_failing_region(self, region: &str) -> Self {
        self.failing_regions.lock().unwrap().insert(region.to_string());
        self
    }

    pub fn with_detail_delay(mut self, delay: Duration) -> Self {
        self.detail_delay = Some(delay);
        self
    }

    /// Replace the scripted pages after construction.
    pub fn set_pages(&self, region: &str, news_type: &str, pages: Vec<Vec<ArticleRow>>) {
        self.pages
            .lock()
            .unwrap()
            .insert((region.to_string(), news_type.to_string()), pages);
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NewsUpstream for FakeUpstream {
    async fn fetch_list_page(
        &self,
        region: &Region,
        news_type: &str,
        index: u32,
        _size: u32,
    ) -> Result<ListPage> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        if self.failing_regions.lock().unwrap().contains(&region.code) {
            return Err(AppError::unreachable(region.base_url.as_str(), "connection refused"));
        }

        let rows = self
            .pages
            .lock()
            .unwrap()
            .get(&(region.code.clone(), news_type.to_string()))
            .and_then(|pages| pages.get(index.saturating_sub(1) as usize).cloned())
            .unwrap_or_default();

        Ok(ListPage {
            upstream_count: rows.len(),
            rows,
        })
    }

    async fn fetch_detail(&self, region: &Region, id: i64) -> Result<NewsDetail> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if let Some(delay) = self.detail_delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.failing_details.lock().unwrap().contains(&id) {
            return Err(AppError::UpstreamStatus {
                code: 500,
                url: format!("{}api/resource/news/detail?id={}", region.base_url, id),
            });
        }

        Ok(self
            .details
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .unwrap_or_else(|| NewsDetail {
                id,
                ..NewsDetail::default()
            }))
    }
}

// ============================================================================
// Document store
// ============================================================================

/// In-memory document store that can be switched into a failing state.
#[derive(Default)]
pub struct MemoryStore {
    docs: Mutex<BTreeMap<String, Vec<u8>>>,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self, path: &str) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Io(std::io::Error::other(format!(
                "store offline: {}",
                path
            ))));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &str) -> Result<Option<Vec<u8>>> {
        self.check(path)?;
        Ok(self.docs.lock().unwrap().get(path).cloned())
    }

    async fn put(&self, path: &str, bytes: &[u8]) -> Result<()> {
        self.check(path)?;
        self.docs
            .lock()
            .unwrap()
            .insert(path.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        self.check(prefix)?;
        Ok(self
            .docs
            .lock()
            .unwrap()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

// ============================================================================
// Wiring
// ============================================================================

/// Components wired the way the app wires them, over test doubles.
///
/// The clock starts at 2026-01-01T10:20:00Z.
pub struct Fixture {
    pub config: Config,
    pub upstream: Arc<FakeUpstream>,
    pub backend: Arc<MemoryStore>,
    pub store: CategorySnapshotStore,
    pub clock: Arc<ManualClock>,
    pub synchronizer: Arc<Synchronizer>,
}

impl Fixture {
    pub fn new(upstream: FakeUpstream) -> Self {
        Self::with_config(Config::default(), upstream)
    }

    pub fn with_config(config: Config, upstream: FakeUpstream) -> Self {
        let upstream = Arc::new(upstream);
        let backend = Arc::new(MemoryStore::default());
        let clock = Arc::new(ManualClock::at("2026-01-01T10:20:00Z"));

        let store = CategorySnapshotStore::new(backend.clone(), clock.clone());
        let cache = Arc::new(ThumbnailCache::new(
            Duration::from_secs(config.cache.thumbnail_ttl_secs),
            clock.clone(),
        ));
        let resolver = Arc::new(ThumbnailResolver::new(
            upstream.clone(),
            cache,
            config.upstream.detail_concurrency,
        ));
        let synchronizer = Arc::new(Synchronizer::new(
            Arc::new(RegionCatalog::from_config(&config).unwrap()),
            Arc::new(CategoryMap::from_config(&config)),
            upstream.clone(),
            resolver,
            store.clone(),
            clock.clone(),
            &config.upstream,
        ));

        Self {
            config,
            upstream,
            backend,
            store,
            clock,
            synchronizer,
        }
    }
}
