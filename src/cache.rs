// Load-once-per-window dataset cache
use crate::analyzer::derive_all;
use crate::feed::{FeedSource, RetryPolicy, fetch_with_retry};
use crate::model::{Dataset, LoadError};
use crate::normalizer::normalize;
use crate::parser::{CsvFeedParser, Parser};
use crate::registry::Registry;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::{debug, error, info};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Fetch → parse → normalize → derive, in one pass.
pub struct DatasetLoader {
    source: Box<dyn FeedSource>,
    parser: CsvFeedParser,
    registry: Arc<Registry>,
    retry: RetryPolicy,
}

impl DatasetLoader {
    pub fn new(source: Box<dyn FeedSource>, registry: Arc<Registry>, retry: RetryPolicy) -> Self {
        Self {
            source,
            parser: CsvFeedParser::new(),
            registry,
            retry,
        }
    }

    pub async fn load(&self) -> Result<Dataset, LoadError> {
        let body = fetch_with_retry(self.source.as_ref(), &self.retry).await?;
        let table = self.parser.parse(&body)?;
        let dataset = normalize(&table, &self.registry)?;
        Ok(derive_all(dataset, &self.registry))
    }
}

struct CacheEntry {
    dataset: Arc<Dataset>,
    loaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheStatus {
    pub loaded_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub rows: usize,
}

/// A window too long to represent never ends.
fn expiry(loaded_at: DateTime<Utc>, ttl: Duration) -> DateTime<Utc> {
    loaded_at
        .checked_add_signed(ttl)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Holds the canonical dataset for one time window.
///
/// There is no invalidation call: a new load happens only once `now` passes
/// `loaded_at + ttl`. Failed loads are not cached, so the next interaction
/// tries again.
pub struct DatasetCache {
    loader: DatasetLoader,
    ttl: Duration,
    entry: Option<CacheEntry>,
}

impl DatasetCache {
    pub fn new(loader: DatasetLoader, ttl: Duration) -> Self {
        Self {
            loader,
            ttl,
            entry: None,
        }
    }

    pub async fn get_or_refresh(&mut self, now: DateTime<Utc>) -> Result<Arc<Dataset>, LoadError> {
        if let Some(entry) = &self.entry {
            if now < expiry(entry.loaded_at, self.ttl) {
                debug!("Dataset cache hit ({} rows)", entry.dataset.len());
                return Ok(entry.dataset.clone());
            }
            info!("Dataset cache expired (loaded at {})", entry.loaded_at);
            self.entry = None;
        }

        match self.loader.load().await {
            Ok(dataset) => {
                let dataset = Arc::new(dataset);
                info!("Dataset loaded: {} rows", dataset.len());
                self.entry = Some(CacheEntry {
                    dataset: dataset.clone(),
                    loaded_at: now,
                });
                Ok(dataset)
            }
            Err(e) => {
                error!("Dataset load failed: {}", e);
                Err(e)
            }
        }
    }

    pub fn status(&self) -> Option<CacheStatus> {
        self.entry.as_ref().map(|entry| CacheStatus {
            loaded_at: entry.loaded_at,
            expires_at: expiry(entry.loaded_at, self.ttl),
            rows: entry.dataset.len(),
        })
    }
}
