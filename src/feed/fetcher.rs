use crate::feed::traits::FeedSource;
use crate::model::FetchError;

use reqwest::{Client, StatusCode};
use scraper::{Html, Selector};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};

/// Fetches the CSV export of the procurement spreadsheet over HTTP.
pub struct HttpFeed {
    client: Client,
    url: String,
}

impl HttpFeed {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent("Mozilla/5.0 (compatible; ProcureDash/0.1)")
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait::async_trait]
impl FeedSource for HttpFeed {
    async fn fetch(&self) -> Result<String, FetchError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        if response.status() != StatusCode::OK {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}

/// Attempt count and linear backoff step (`backoff * attempt` between tries).
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(1500),
        }
    }
}

/// Rejects bodies that are an HTML page (login or permission wall) rather
/// than tabular data.
pub fn check_body(body: String) -> Result<String, FetchError> {
    if body.trim_start().starts_with('<') {
        return Err(FetchError::HtmlResponse {
            title: html_title(&body),
        });
    }
    Ok(body)
}

fn html_title(body: &str) -> Option<String> {
    let document = Html::parse_document(body);
    let selector = Selector::parse("title").ok()?;
    document
        .select(&selector)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Fetches with retries on transport and status failures. HTML bodies fail
/// immediately.
pub async fn fetch_with_retry(source: &dyn FeedSource, policy: &RetryPolicy) -> Result<String, FetchError> {
    let attempts = policy.max_attempts.max(1);
    let mut last_error = None;

    for attempt in 1..=attempts {
        info!("Fetching feed from {} (attempt {}/{})", source.describe(), attempt, attempts);
        match source.fetch().await.and_then(check_body) {
            Ok(body) => {
                info!("Feed fetched: {} bytes", body.len());
                return Ok(body);
            }
            Err(e) if !e.is_retryable() => {
                warn!("Feed fetch failed without retry: {}", e);
                return Err(e);
            }
            Err(e) => {
                warn!("Feed fetch attempt {} failed: {}", attempt, e);
                last_error = Some(e);
                if attempt < attempts {
                    sleep(policy.backoff * attempt).await;
                }
            }
        }
    }

    Err(FetchError::RetriesExhausted {
        attempts,
        last: Box::new(last_error.unwrap_or_else(|| FetchError::Transport("no attempt made".into()))),
    })
}
