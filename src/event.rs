//! Calendar events extracted from a feed

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::format_duration;

/// The identifier of an event.
///
/// This is usually the iCalendar UID, but feeds are allowed to omit it, in
/// which case a random stand-in is generated at parse time.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId {
    content: String,
}

impl EventId {
    /// Generate a random EventId, for events whose feed does not carry a UID
    pub fn random() -> Self {
        let random = uuid::Uuid::new_v4().to_hyphenated().to_string();
        Self { content: random }
    }

    pub fn as_str(&self) -> &str {
        &self.content
    }
}

impl From<String> for EventId {
    fn from(content: String) -> Self {
        Self { content }
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.content)
    }
}

/// A single calendar event, normalized from a VEVENT block.
///
/// Both time bounds are guaranteed to be present (the parser drops events it
/// cannot resolve), but `start <= end` is not independently enforced.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    id: EventId,
    title: String,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    location: Option<String>,
    description: Option<String>,
    duration_label: String,
}

impl CalendarEvent {
    pub fn new(
        id: EventId,
        title: String,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        location: Option<String>,
        description: Option<String>,
    ) -> Self {
        let duration_label = format_duration(end - start);
        Self {
            id,
            title,
            start,
            end,
            location,
            description,
            duration_label,
        }
    }

    pub fn id(&self) -> &EventId {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// A short human-readable duration, computed once when the event was parsed
    pub fn duration_label(&self) -> &str {
        &self.duration_label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn duration_label_is_computed_at_creation() {
        let start = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2026, 3, 3, 11, 30, 0).unwrap();
        let event = CalendarEvent::new(
            EventId::from("uid-1".to_string()),
            "Offsite".to_string(),
            start,
            end,
            None,
            None,
        );
        assert_eq!(event.duration_label(), "1d 2h 30m");
    }

    #[test]
    fn random_ids_differ() {
        assert_ne!(EventId::random(), EventId::random());
    }
}
