use crate::model::FetchError;

/// Anything that can hand back the raw feed body in one attempt.
#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch(&self) -> Result<String, FetchError>;

    /// Human-readable origin for log lines.
    fn describe(&self) -> String;
}
