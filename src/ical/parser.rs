//! A module to parse ICal feeds

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use ical::parser::ical::component::IcalEvent;
use ical::property::Property;

use super::CALENDAR_MARKER;
use crate::error::Error;
use crate::event::{CalendarEvent, EventId};

/// Parse an iCal feed into the events it contains.
///
/// A text that is not an iCalendar document at all fails with
/// [`Error::InvalidFormat`]. A single event whose dates cannot be resolved is
/// dropped (and logged), so that one malformed event does not block the rest
/// of the feed.
///
/// Events are returned in feed order; sorting them is up to the caller.
pub fn parse(content: &str) -> Result<Vec<CalendarEvent>, Error> {
    if content.trim().is_empty() {
        return Err(Error::InvalidFormat("empty document".to_string()));
    }
    if content.contains(CALENDAR_MARKER) == false {
        return Err(Error::InvalidFormat(format!(
            "missing the {} marker",
            CALENDAR_MARKER
        )));
    }

    let mut events = Vec::new();
    let reader = ical::IcalParser::new(content.as_bytes());
    for calendar in reader {
        let calendar = calendar
            .map_err(|err| Error::InvalidFormat(format!("unable to decode document: {}", err)))?;
        for vevent in &calendar.events {
            match event_from_vevent(vevent) {
                Ok(event) => events.push(event),
                Err(err) => log::warn!("Dropping an event from the feed: {}", err),
            }
        }
    }

    Ok(events)
}

fn event_from_vevent(vevent: &IcalEvent) -> Result<CalendarEvent, Error> {
    let title = prop_value(&vevent.properties, "SUMMARY")
        .unwrap_or_else(|| "Untitled Event".to_string());
    let malformed = |reason: &str| Error::MalformedEvent {
        summary: title.clone(),
        reason: reason.to_string(),
    };

    let start_prop = find_prop(&vevent.properties, "DTSTART")
        .ok_or_else(|| malformed("missing DTSTART"))?;
    let start = resolve_date(start_prop).ok_or_else(|| malformed("unresolvable DTSTART"))?;

    let end = match find_prop(&vevent.properties, "DTEND") {
        Some(end_prop) => resolve_date(end_prop).ok_or_else(|| malformed("unresolvable DTEND"))?,
        // An all-day event with no DTEND spans exactly one day (RFC 5545 §3.6.1)
        None if is_date_only(start_prop) => start + chrono::Duration::days(1),
        None => return Err(malformed("missing DTEND")),
    };

    let id = match prop_value(&vevent.properties, "UID") {
        Some(uid) => EventId::from(uid),
        None => EventId::random(),
    };

    Ok(CalendarEvent::new(
        id,
        title,
        start,
        end,
        prop_value(&vevent.properties, "LOCATION"),
        prop_value(&vevent.properties, "DESCRIPTION"),
    ))
}

fn find_prop<'a>(properties: &'a [Property], name: &str) -> Option<&'a Property> {
    properties.iter().find(|prop| prop.name == name)
}

fn prop_value(properties: &[Property], name: &str) -> Option<String> {
    find_prop(properties, name)
        .and_then(|prop| prop.value.clone())
        .filter(|value| value.is_empty() == false)
}

/// Resolve a date-time property into a UTC timestamp.
///
/// Handles the three RFC 5545 forms: UTC (`...Z` suffix), zoned (`TZID=`
/// parameter) and floating (taken as UTC, since a library has no ambient
/// timezone worth guessing), as well as all-day `VALUE=DATE` values, which
/// resolve to midnight at the start of that day.
fn resolve_date(prop: &Property) -> Option<DateTime<Utc>> {
    let value = prop.value.as_deref()?;

    if let Some(stripped) = value.strip_suffix('Z') {
        let naive = NaiveDateTime::parse_from_str(stripped, "%Y%m%dT%H%M%S").ok()?;
        return Some(Utc.from_utc_datetime(&naive));
    }

    if value.len() == 8 {
        let date = NaiveDate::parse_from_str(value, "%Y%m%d").ok()?;
        return Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?));
    }

    let naive = NaiveDateTime::parse_from_str(value, "%Y%m%dT%H%M%S").ok()?;
    match tzid_param(prop) {
        Some(tzid) => {
            let zone: Tz = tzid.parse().ok()?;
            // `earliest` settles DST transitions where a local time is ambiguous
            zone.from_local_datetime(&naive)
                .earliest()
                .map(|zoned| zoned.with_timezone(&Utc))
        }
        None => Some(Utc.from_utc_datetime(&naive)),
    }
}

fn is_date_only(prop: &Property) -> bool {
    match prop.value.as_deref() {
        Some(value) => value.len() == 8,
        None => false,
    }
}

fn tzid_param(prop: &Property) -> Option<String> {
    prop.params
        .as_ref()?
        .iter()
        .find(|(name, _)| name == "TZID")
        .and_then(|(_, values)| values.first().cloned())
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE_FEED: &str = r#"BEGIN:VCALENDAR
VERSION:2.0
PRODID:-//Google Inc//Google Calendar 70.9054//EN
BEGIN:VEVENT
UID:standup-20260302@example.com
DTSTAMP:20260301T120000Z
DTSTART:20260302T090000Z
DTEND:20260302T093000Z
SUMMARY:Standup
LOCATION:Room 2
END:VEVENT
BEGIN:VEVENT
UID:planning-20260302@example.com
DTSTAMP:20260301T120000Z
DTSTART:20260302T091500Z
DTEND:20260302T100000Z
SUMMARY:Planning
DESCRIPTION:Sprint 12 planning
END:VEVENT
END:VCALENDAR
"#;

    const FEED_WITH_BROKEN_EVENT: &str = r#"BEGIN:VCALENDAR
VERSION:2.0
BEGIN:VEVENT
UID:broken@example.com
DTSTART:not-a-date
DTEND:20260302T100000Z
SUMMARY:Broken
END:VEVENT
BEGIN:VEVENT
UID:fine@example.com
DTSTART:20260302T110000Z
DTEND:20260302T120000Z
SUMMARY:Fine
END:VEVENT
END:VCALENDAR
"#;

    const BARE_FEED: &str = r#"BEGIN:VCALENDAR
VERSION:2.0
BEGIN:VEVENT
DTSTART:20260302T090000Z
DTEND:20260302T100000Z
END:VEVENT
END:VCALENDAR
"#;

    const ALL_DAY_FEED: &str = r#"BEGIN:VCALENDAR
VERSION:2.0
BEGIN:VEVENT
UID:holiday@example.com
DTSTART;VALUE=DATE:20260302
SUMMARY:Public holiday
END:VEVENT
END:VCALENDAR
"#;

    const ZONED_FEED: &str = r#"BEGIN:VCALENDAR
VERSION:2.0
BEGIN:VEVENT
UID:zoned@example.com
DTSTART;TZID=Europe/Paris:20260610T090000
DTEND;TZID=Europe/Paris:20260610T100000
SUMMARY:Paris morning
END:VEVENT
END:VCALENDAR
"#;

    #[test]
    fn parses_every_well_formed_event() {
        let events = parse(EXAMPLE_FEED).unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].title(), "Standup");
        assert_eq!(events[0].id().as_str(), "standup-20260302@example.com");
        assert_eq!(events[0].location(), Some("Room 2"));
        assert_eq!(events[0].duration_label(), "30m");
        assert_eq!(events[1].title(), "Planning");
        assert_eq!(events[1].description(), Some("Sprint 12 planning"));
        assert_eq!(
            events[1].end() - events[1].start(),
            chrono::Duration::minutes(45)
        );
    }

    #[test]
    fn parsing_twice_yields_the_same_events() {
        assert_eq!(parse(EXAMPLE_FEED).unwrap(), parse(EXAMPLE_FEED).unwrap());
    }

    #[test]
    fn a_malformed_event_does_not_block_the_feed() {
        let events = parse(FEED_WITH_BROKEN_EVENT).unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title(), "Fine");
    }

    #[test]
    fn missing_summary_and_uid_get_defaults() {
        let events = parse(BARE_FEED).unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].title(), "Untitled Event");
        assert!(events[0].id().as_str().is_empty() == false);
    }

    #[test]
    fn all_day_events_span_one_day() {
        let events = parse(ALL_DAY_FEED).unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].start(),
            Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap()
        );
        assert_eq!(
            events[0].end() - events[0].start(),
            chrono::Duration::days(1)
        );
    }

    #[test]
    fn zoned_times_are_converted_to_utc() {
        let events = parse(ZONED_FEED).unwrap();

        // Paris is UTC+2 in June
        assert_eq!(
            events[0].start(),
            Utc.with_ymd_and_hms(2026, 6, 10, 7, 0, 0).unwrap()
        );
    }

    #[test]
    fn garbage_is_rejected_outright() {
        assert!(matches!(parse(""), Err(Error::InvalidFormat(_))));
        assert!(matches!(parse("   \n  "), Err(Error::InvalidFormat(_))));
        assert!(matches!(
            parse("this is not a calendar"),
            Err(Error::InvalidFormat(_))
        ));
    }
}
