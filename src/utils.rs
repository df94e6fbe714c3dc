//! Some utility functions

use chrono::Duration;

use crate::schedule::Snapshot;
use crate::CalendarEvent;

/// Render a duration as a short human-readable label, e.g. `1d 2h 30m`.
///
/// Zero and negative durations both come out as `0m`.
pub fn format_duration(duration: Duration) -> String {
    let days = duration.num_days();
    let hours = duration.num_hours() - days * 24;
    let minutes = duration.num_minutes() - duration.num_hours() * 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{}d", days));
    }
    if hours > 0 {
        parts.push(format!("{}h", hours));
    }
    if minutes > 0 {
        parts.push(format!("{}m", minutes));
    }

    if parts.is_empty() {
        String::from("0m")
    } else {
        parts.join(" ")
    }
}

/// A debug utility that pretty-prints the result of a refresh
pub fn print_snapshot(snapshot: &Snapshot) {
    println!(
        "{} events as of {} ({:?})",
        snapshot.events().len(),
        snapshot.fetched_at(),
        snapshot.origin()
    );
    for event in snapshot.events() {
        print_event(event);
    }

    if snapshot.conflicts().is_empty() == false {
        println!("{} conflicts:", snapshot.conflicts().len());
        for conflict in snapshot.conflicts() {
            println!(
                "    ! {} overlaps {} for {}m",
                conflict.first().title(),
                conflict.second().title(),
                conflict.overlap_minutes()
            );
        }
    }
}

/// A debug utility that pretty-prints a single event
pub fn print_event(event: &CalendarEvent) {
    let location = match event.location() {
        Some(location) => format!("\t@ {}", location),
        None => String::new(),
    };
    println!(
        "    * {} ({})\t{}{}",
        event.title(),
        event.duration_label(),
        event.start(),
        location
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_duration_combines_units() {
        assert_eq!(format_duration(Duration::minutes(30)), "30m");
        assert_eq!(format_duration(Duration::minutes(90)), "1h 30m");
        assert_eq!(format_duration(Duration::hours(26)), "1d 2h");
        assert_eq!(
            format_duration(Duration::days(1) + Duration::hours(2) + Duration::minutes(30)),
            "1d 2h 30m"
        );
    }

    #[test]
    fn format_duration_handles_degenerate_spans() {
        assert_eq!(format_duration(Duration::zero()), "0m");
        assert_eq!(format_duration(Duration::minutes(-10)), "0m");
        assert_eq!(format_duration(Duration::seconds(59)), "0m");
    }
}
