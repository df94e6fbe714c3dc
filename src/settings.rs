//! Support for library configuration options
//!
//! Everything is read from the environment once, at startup. Only the feed
//! URL is mandatory; every other knob has a default matching the constants of
//! the modules it configures. An unset optional variable falls back silently,
//! but a value that is present and unparseable aborts, since running with a
//! half-understood configuration is worse than not starting.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::cache::DEFAULT_CACHE_TTL;
use crate::error::Error;
use crate::fetch::{DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY};
use crate::schedule::DEFAULT_HORIZON_DAYS;

/// The feed to watch. Required.
pub const FEED_URL_VAR: &str = "CORKBOARD_FEED_URL";
/// Comma-separated fallback endpoints, tried in order after the feed URL
pub const FEED_FALLBACKS_VAR: &str = "CORKBOARD_FEED_FALLBACKS";
/// Directory holding the cache files
pub const CACHE_DIR_VAR: &str = "CORKBOARD_CACHE_DIR";
/// Cache freshness, in seconds
pub const CACHE_TTL_VAR: &str = "CORKBOARD_CACHE_TTL_SECONDS";
/// Extra attempts per endpoint after the first failure
pub const MAX_RETRIES_VAR: &str = "CORKBOARD_MAX_RETRIES";
/// Pause between attempts, in milliseconds
pub const RETRY_DELAY_VAR: &str = "CORKBOARD_RETRY_DELAY_MS";
/// Rolling window of upcoming days to keep
pub const HORIZON_DAYS_VAR: &str = "CORKBOARD_HORIZON_DAYS";

/// The knobs of a feed watcher, as read from the environment
#[derive(Clone, Debug)]
pub struct Settings {
    pub feed_url: Url,
    pub fallback_urls: Vec<Url>,
    pub cache_dir: PathBuf,
    pub cache_ttl: Duration,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub horizon_days: i64,
}

impl Settings {
    pub fn from_env() -> Result<Self, Error> {
        let feed_url = match env::var(FEED_URL_VAR) {
            Err(_) => return Err(Error::Config(format!("{} is not set", FEED_URL_VAR))),
            Ok(raw) => parse_url(FEED_URL_VAR, &raw)?,
        };

        let fallback_urls = match env::var(FEED_FALLBACKS_VAR) {
            Err(_) => Vec::new(),
            Ok(raw) => parse_url_list(FEED_FALLBACKS_VAR, &raw)?,
        };

        let cache_dir = match env::var(CACHE_DIR_VAR) {
            Err(_) => env::temp_dir().join("corkboard"),
            Ok(raw) => PathBuf::from(raw),
        };

        let cache_ttl = match env::var(CACHE_TTL_VAR) {
            Err(_) => DEFAULT_CACHE_TTL,
            Ok(raw) => Duration::from_secs(parse_number(CACHE_TTL_VAR, &raw)?),
        };

        let max_retries = match env::var(MAX_RETRIES_VAR) {
            Err(_) => DEFAULT_MAX_RETRIES,
            Ok(raw) => parse_number(MAX_RETRIES_VAR, &raw)? as u32,
        };

        let retry_delay = match env::var(RETRY_DELAY_VAR) {
            Err(_) => DEFAULT_RETRY_DELAY,
            Ok(raw) => Duration::from_millis(parse_number(RETRY_DELAY_VAR, &raw)?),
        };

        let horizon_days = match env::var(HORIZON_DAYS_VAR) {
            Err(_) => DEFAULT_HORIZON_DAYS,
            Ok(raw) => parse_number(HORIZON_DAYS_VAR, &raw)? as i64,
        };

        Ok(Self {
            feed_url,
            fallback_urls,
            cache_dir,
            cache_ttl,
            max_retries,
            retry_delay,
            horizon_days,
        })
    }
}

fn parse_url(var: &str, raw: &str) -> Result<Url, Error> {
    Url::parse(raw).map_err(|err| Error::Config(format!("{} is not a valid URL: {}", var, err)))
}

fn parse_url_list(var: &str, raw: &str) -> Result<Vec<Url>, Error> {
    raw.split(',')
        .map(|part| part.trim())
        .filter(|part| part.is_empty() == false)
        .map(|part| parse_url(var, part))
        .collect()
}

fn parse_number(var: &str, raw: &str) -> Result<u64, Error> {
    raw.trim()
        .parse()
        .map_err(|err| Error::Config(format!("{} is not a valid number: {}", var, err)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_lists_are_comma_separated() {
        let urls = parse_url_list(
            FEED_FALLBACKS_VAR,
            "https://mirror-a.example.com/basic.ics, https://mirror-b.example.com/basic.ics,",
        )
        .unwrap();

        assert_eq!(urls.len(), 2);
        assert_eq!(urls[0].host_str(), Some("mirror-a.example.com"));
        assert_eq!(urls[1].host_str(), Some("mirror-b.example.com"));
    }

    #[test]
    fn empty_url_list_is_fine() {
        assert!(parse_url_list(FEED_FALLBACKS_VAR, "").unwrap().is_empty());
    }

    #[test]
    fn broken_values_abort() {
        assert!(matches!(
            parse_url(FEED_URL_VAR, "not a url"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            parse_number(CACHE_TTL_VAR, "soon"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn numbers_tolerate_whitespace() {
        assert_eq!(parse_number(CACHE_TTL_VAR, " 300 ").unwrap(), 300);
    }
}
