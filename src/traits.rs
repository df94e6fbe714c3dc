use async_trait::async_trait;

use crate::error::Error;

/// A source of raw iCalendar text.
///
/// This is the seam between the [`Schedule`](crate::Schedule) orchestrator and
/// the network: production code plugs in a [`FeedFetcher`](crate::FeedFetcher),
/// tests plug in a scripted source that fails on demand.
#[async_trait]
pub trait EventSource {
    /// Return the raw text of the feed.
    /// This can be a long process (the fetcher retries with a delay), and it can fail entirely.
    async fn fetch_raw(&self) -> Result<String, Error>;
}
