pub mod fetcher;
pub mod traits;

pub use fetcher::{HttpFeed, RetryPolicy, fetch_with_retry};
pub use traits::FeedSource;
