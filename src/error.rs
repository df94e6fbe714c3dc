//! Error types for feed watching operations

use thiserror::Error;

/// Everything that can go wrong while fetching, parsing or caching a feed.
///
/// Only [`Error::FetchExhausted`], [`Error::InvalidFormat`] and
/// [`Error::Config`] ever cross the public API. `MalformedEvent` is consumed
/// by the parser (the offending event is dropped and logged) and
/// `CacheCorrupt` is consumed by the cache (the entry is treated as absent),
/// so neither aborts an operation on its own.
#[derive(Error, Debug)]
pub enum Error {
    #[error("every feed endpoint failed ({attempts} attempts, last error: {last_error})")]
    FetchExhausted { attempts: u32, last_error: String },

    #[error("not an iCalendar document: {0}")]
    InvalidFormat(String),

    #[error("unusable event {summary:?}: {reason}")]
    MalformedEvent { summary: String, reason: String },

    #[error("unusable cache file: {0}")]
    CacheCorrupt(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
