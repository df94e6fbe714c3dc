//! This crate keeps an eye on a published iCalendar feed.
//!
//! It downloads the feed over HTTP with a [`FeedFetcher`](fetch::FeedFetcher), that can be used as a stand-alone module, and turns the raw text into normalized [`CalendarEvent`]s with the [`ical`] module, flagging pairs of events whose time spans overlap.
//!
//! Because the feed host may be slow or down, and a user-friendly app may want to quickly display data on startup, this crate also provides a local cache for feed data in the [`cache`] module.
//!
//! These two "data sources" (actual feed and local cache) can be used together in a [`Schedule`]. \
//! A `Schedule` abstracts these two sources by merging them into one virtual source. \
//! It serves the cache while it is fresh, refreshes from the network when it is not, and falls back to stale cached data when every network path fails.

pub mod traits;

pub mod error;
pub use error::Error;
mod event;
pub use event::{CalendarEvent, EventId};
mod conflict;
pub use conflict::{find_conflicts, ConflictPair};
pub mod ical;

pub mod fetch;
pub use fetch::FeedFetcher;
pub mod cache;
pub use cache::Cache;
pub mod schedule;
pub use schedule::{Origin, RefreshEvent, Schedule, Snapshot};

pub mod settings;
pub mod utils;
