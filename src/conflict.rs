//! Detect overlapping events in a schedule

use serde::{Deserialize, Serialize};

use crate::event::CalendarEvent;

/// Two events whose time spans strictly overlap.
///
/// Back-to-back events, where one ends exactly when the other starts, are not
/// conflicts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConflictPair {
    first: CalendarEvent,
    second: CalendarEvent,
    overlap_minutes: i64,
}

impl ConflictPair {
    pub fn first(&self) -> &CalendarEvent {
        &self.first
    }

    pub fn second(&self) -> &CalendarEvent {
        &self.second
    }

    /// Length of the shared time span, in minutes
    pub fn overlap_minutes(&self) -> i64 {
        self.overlap_minutes
    }
}

/// Find all pairs of events whose time spans overlap.
///
/// Every `(i, j)` pair with `i < j` is tested, so the result lists pairs in
/// the order they are discovered, which is deterministic for a given input
/// order. The scan is quadratic; feeds are windowed to a few dozen events
/// before they get here.
pub fn find_conflicts(events: &[CalendarEvent]) -> Vec<ConflictPair> {
    let mut conflicts = Vec::new();

    for i in 0..events.len() {
        for j in (i + 1)..events.len() {
            let a = &events[i];
            let b = &events[j];

            // Two intervals overlap iff a.start < b.end AND b.start < a.end.
            // This excludes the adjacent case where a.end == b.start.
            if a.start() < b.end() && b.start() < a.end() {
                let overlap_start = a.start().max(b.start());
                let overlap_end = a.end().min(b.end());

                conflicts.push(ConflictPair {
                    first: a.clone(),
                    second: b.clone(),
                    overlap_minutes: (overlap_end - overlap_start).num_minutes(),
                });
            }
        }
    }

    conflicts
}
