//! This module combines a feed source and a local cache into one virtual data source
//!
//! It owns the refresh policy: serve the cache while it is fresh, hit the
//! network when it is not, and fall back to whatever the cache still holds
//! when every network path is down.

use std::fmt::{Display, Formatter};
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};

use crate::cache::{Cache, CacheEntry, DEFAULT_CACHE_TTL};
use crate::conflict::{find_conflicts, ConflictPair};
use crate::error::Error;
use crate::event::CalendarEvent;
use crate::ical;
use crate::traits::EventSource;

/// Events further in the future than this are not interesting
pub const DEFAULT_HORIZON_DAYS: i64 = 30;

/// Where the data of a [`Snapshot`] came from
#[derive(Clone, Debug, PartialEq)]
pub enum Origin {
    /// Straight from the network
    Network,
    /// From a cache entry that was still fresh; no network call was made
    FreshCache,
    /// Every network path failed; this is the last known state of the feed
    StaleCache { warning: String },
}

/// A read-only view over the current state of a feed.
///
/// Events are sorted chronologically by start time; conflicts are listed in
/// discovery order.
#[derive(Clone, Debug)]
pub struct Snapshot {
    events: Vec<CalendarEvent>,
    conflicts: Vec<ConflictPair>,
    fetched_at: DateTime<Utc>,
    origin: Origin,
}

impl Snapshot {
    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    pub fn conflicts(&self) -> &[ConflictPair] {
        &self.conflicts
    }

    /// When the events were last fetched from the network.
    /// For cached snapshots this is the original fetch time, not the read time.
    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }

    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Whether this snapshot was served from the cache instead of the network
    pub fn served_from_cache(&self) -> bool {
        match self.origin {
            Origin::Network => false,
            Origin::FreshCache | Origin::StaleCache { .. } => true,
        }
    }
}

/// An event that happens during a refresh
#[derive(Clone, Debug)]
pub enum RefreshEvent {
    /// No refresh has happened yet
    Idle,
    /// A refresh is in progress
    Loading,
    /// The last refresh produced a usable snapshot
    Success {
        origin: Origin,
        n_events: usize,
        n_conflicts: usize,
    },
    /// The last refresh failed and no cached data could stand in
    Failed { message: String },
}

impl Display for RefreshEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            RefreshEvent::Idle => write!(f, "Idle"),
            RefreshEvent::Loading => write!(f, "Refreshing..."),
            RefreshEvent::Success {
                origin,
                n_events,
                n_conflicts,
            } => match origin {
                Origin::StaleCache { warning } => write!(
                    f,
                    "Showing {} cached events ({})",
                    n_events, warning
                ),
                _ => write!(f, "Loaded {} events, {} conflicts", n_events, n_conflicts),
            },
            RefreshEvent::Failed { message } => write!(f, "Refresh failed: {}", message),
        }
    }
}

impl Default for RefreshEvent {
    fn default() -> Self {
        Self::Idle
    }
}

/// See [`feedback_channel`]
pub type FeedbackSender = tokio::sync::watch::Sender<RefreshEvent>;
/// See [`feedback_channel`]
pub type FeedbackReceiver = tokio::sync::watch::Receiver<RefreshEvent>;

/// Create a feedback channel, that can be used to follow the progress of a [`Schedule`] being watched
pub fn feedback_channel() -> (FeedbackSender, FeedbackReceiver) {
    tokio::sync::watch::channel(RefreshEvent::default())
}

/// A data source that combines a remote feed and a local cache.
///
/// `source` is usually a [`FeedFetcher`](crate::FeedFetcher), but it is
/// generic so that tests can mock the network with a scripted source. The
/// cache is exclusively owned here; consumers only ever see [`Snapshot`]s.
pub struct Schedule<S: EventSource> {
    source: S,
    cache: Cache,
    ttl: StdDuration,
    horizon: Option<Duration>,
}

impl<S: EventSource + Send + Sync> Schedule<S> {
    pub fn new(source: S, cache: Cache) -> Self {
        Self {
            source,
            cache,
            ttl: DEFAULT_CACHE_TTL,
            horizon: Some(Duration::days(DEFAULT_HORIZON_DAYS)),
        }
    }

    /// Override how long cached data is served without hitting the network
    pub fn with_ttl(mut self, ttl: StdDuration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Override the rolling window of upcoming days to keep, or `None` to keep every event
    pub fn with_horizon_days(mut self, days: Option<i64>) -> Self {
        self.horizon = days.map(Duration::days);
        self
    }

    /// Returns the underlying feed source.
    ///
    /// Apart from tests, there are very few (if any) reasons to access it directly.
    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Return the current state of the feed, refreshing from the network when needed.
    ///
    /// A fresh cache entry short-circuits the network entirely unless `force`
    /// is set. When the network and the parser both let us down, a cache entry
    /// of any age is served instead, flagged as [`Origin::StaleCache`] so the
    /// caller can surface a non-fatal warning; the underlying error only
    /// propagates when there is no cached data at all.
    pub async fn refresh(&mut self, force: bool) -> Result<Snapshot, Error> {
        if force == false && self.cache.is_fresh(self.ttl) {
            if let Some(entry) = self.cache.entry() {
                log::debug!("Cache is fresh, skipping the network");
                return Ok(snapshot_from_entry(entry, Origin::FreshCache));
            }
        }

        match self.refresh_from_network().await {
            Ok(snapshot) => Ok(snapshot),
            Err(err) => match self.cache.entry() {
                // Serving yesterday's feed beats serving an error message
                Some(entry) => {
                    log::warn!("Refresh failed, serving cached data instead: {}", err);
                    let origin = Origin::StaleCache {
                        warning: err.to_string(),
                    };
                    Ok(snapshot_from_entry(entry, origin))
                }
                None => Err(err),
            },
        }
    }

    async fn refresh_from_network(&mut self) -> Result<Snapshot, Error> {
        let raw = self.source.fetch_raw().await?;
        let mut events = ical::parse(&raw)?;

        let now = Utc::now();
        if let Some(horizon) = self.horizon {
            events.retain(|event| event.start() >= now && event.start() <= now + horizon);
        }
        events.sort_by_key(|event| event.start());

        let conflicts = find_conflicts(&events);
        self.cache.store_at(events.clone(), now);

        Ok(Snapshot {
            events,
            conflicts,
            fetched_at: now,
            origin: Origin::Network,
        })
    }

    /// Keep the feed up to date, re-checking once per TTL, and report progress
    /// on the feedback channel.
    ///
    /// The first refresh happens immediately. This never returns on its own:
    /// drop the future (or the task running it) to stop watching. Note that a
    /// refresh already in flight is not aborted by cancellation; its result
    /// simply goes unobserved.
    pub async fn watch_with_feedback(&mut self, feedback: FeedbackSender) {
        // an interval period must be non-zero
        let period = std::cmp::max(self.ttl, StdDuration::from_millis(1));
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            let _ = feedback.send(RefreshEvent::Loading);

            match self.refresh(false).await {
                Ok(snapshot) => {
                    let _ = feedback.send(RefreshEvent::Success {
                        origin: snapshot.origin().clone(),
                        n_events: snapshot.events().len(),
                        n_conflicts: snapshot.conflicts().len(),
                    });
                }
                Err(err) => {
                    let _ = feedback.send(RefreshEvent::Failed {
                        message: err.to_string(),
                    });
                }
            }
        }
    }

    /// Keep the feed up to date, without reporting progress.
    ///
    /// See [`Self::watch_with_feedback`]
    pub async fn watch(&mut self) {
        let (sender, _receiver) = feedback_channel();
        self.watch_with_feedback(sender).await
    }
}

fn snapshot_from_entry(entry: &CacheEntry, origin: Origin) -> Snapshot {
    let events = entry.events().to_vec();
    let conflicts = find_conflicts(&events);
    Snapshot {
        events,
        conflicts,
        fetched_at: entry.fetched_at(),
        origin,
    }
}
