//! This module handles conversion from iCal feeds to internal representations
//!
//! It is a wrapper around a third-party library, since decoding the iCalendar
//! grammar (line folding, property parameters...) is not something worth
//! re-implementing.

mod parser;
pub use parser::parse;

/// Every iCalendar document starts with this marker.
///
/// It doubles as the success criterion when downloading a feed: a 200 response
/// without it (e.g. an HTML error page) is not a feed.
pub const CALENDAR_MARKER: &str = "BEGIN:VCALENDAR";
