//! This module provides a local cache for feed data
//!
//! The feed host may be slow or down, and an app usually wants to display
//! something immediately on startup, so the last successfully parsed event
//! list is kept in a JSON file together with its fetch timestamp.

use std::path::{Path, PathBuf};
use std::time::Duration as StdDuration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Error;
use crate::event::CalendarEvent;

/// How long a cache entry stays fresh
pub const DEFAULT_CACHE_TTL: StdDuration = StdDuration::from_secs(5 * 60);

/// The last successfully fetched state of a feed
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    events: Vec<CalendarEvent>,
    fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    pub fn fetched_at(&self) -> DateTime<Utc> {
        self.fetched_at
    }
}

/// A feed data source that stores its events in a local file
#[derive(Debug, PartialEq)]
pub struct Cache {
    backing_file: PathBuf,
    data: Option<CacheEntry>,
}

impl Cache {
    /// The default cache file for a given feed.
    ///
    /// The file name is derived from the feed URL, so that two feeds cached
    /// under the same directory never clobber each other.
    pub fn default_file_for(cache_dir: &Path, feed_url: &Url) -> PathBuf {
        let name = sanitize_filename::sanitize(feed_url.as_str());
        cache_dir.join(format!("{}.json", name))
    }

    /// Initialize a cache from the content of a backing file.
    ///
    /// A missing file yields an empty cache (first run). A file that cannot be
    /// decoded is logged and treated the same way, not as an error: the next
    /// successful fetch overwrites it.
    pub fn load(path: &Path) -> Self {
        let data = match std::fs::read_to_string(path) {
            Err(_) => None,
            Ok(raw) => match serde_json::from_str::<CacheEntry>(&raw) {
                Ok(entry) => Some(entry),
                Err(err) => {
                    let err = Error::CacheCorrupt(err.to_string());
                    log::warn!("Ignoring cache file {:?}: {}", path, err);
                    None
                }
            },
        };

        Self {
            backing_file: PathBuf::from(path),
            data,
        }
    }

    /// Initialize an empty cache
    pub fn new(path: &Path) -> Self {
        Self {
            backing_file: PathBuf::from(path),
            data: None,
        }
    }

    /// The cached entry, if there is one
    pub fn entry(&self) -> Option<&CacheEntry> {
        self.data.as_ref()
    }

    /// Whether the cached entry is recent enough to be served without a network call
    pub fn is_fresh(&self, ttl: StdDuration) -> bool {
        self.is_fresh_at(Utc::now(), ttl)
    }

    pub fn is_fresh_at(&self, now: DateTime<Utc>, ttl: StdDuration) -> bool {
        match &self.data {
            None => false,
            Some(entry) => match (now - entry.fetched_at).to_std() {
                Ok(age) => age < ttl,
                // fetched_at is in the future, don't trust it
                Err(_) => false,
            },
        }
    }

    /// Overwrite the cached entry with a new event list, stamped now.
    ///
    /// Last writer wins; there is no merging.
    pub fn store(&mut self, events: Vec<CalendarEvent>) {
        self.store_at(events, Utc::now());
    }

    /// Overwrite the cached entry with a new event list and an explicit fetch time
    pub fn store_at(&mut self, events: Vec<CalendarEvent>, fetched_at: DateTime<Utc>) {
        self.data = Some(CacheEntry { events, fetched_at });
        self.save_to_file();
    }

    /// Store the current Cache to its backing file
    fn save_to_file(&mut self) {
        let entry = match &self.data {
            None => return,
            Some(entry) => entry,
        };

        let path = &self.backing_file;
        if let Some(dir) = path.parent() {
            if let Err(err) = std::fs::create_dir_all(dir) {
                log::warn!("Unable to create cache directory {:?}: {}", dir, err);
                return;
            }
        }

        let file = match std::fs::File::create(path) {
            Err(err) => {
                log::warn!("Unable to save file {:?}: {}", path, err);
                return;
            }
            Ok(f) => f,
        };

        if let Err(err) = serde_json::to_writer(file, entry) {
            log::warn!("Unable to serialize: {}", err);
        }
    }
}
