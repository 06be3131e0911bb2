//! Dashboard aggregation

use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use crate::models::{ApplicationStatus, Attendee, Event, EventApplication};

/// Per-event counters shown on dashboards
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EventStats {
    pub total: usize,
    pub pending: usize,
    pub approved: usize,
    pub denied: usize,
    pub waitlisted: usize,
    pub checked_in: usize,
    pub flagged: usize,
}

impl EventStats {
    fn count_application(&mut self, application: &EventApplication) {
        self.total += 1;
        match application.status {
            ApplicationStatus::Pending => self.pending += 1,
            ApplicationStatus::Approved => self.approved += 1,
            ApplicationStatus::Denied => self.denied += 1,
            ApplicationStatus::Waitlisted => self.waitlisted += 1,
        }
    }

    fn count_attendee(&mut self, attendee: &Attendee) {
        if attendee.checked_in {
            self.checked_in += 1;
        }
        if attendee.flagged {
            self.flagged += 1;
        }
    }
}

/// Stats for one event. Records belonging to other events are skipped.
pub fn compute_stats(
    event: &Event,
    applications: &[EventApplication],
    attendees: &[Attendee],
) -> EventStats {
    let mut stats = EventStats::default();

    for application in applications.iter().filter(|a| a.event_id == event.id) {
        stats.count_application(application);
    }
    for attendee in attendees.iter().filter(|a| a.event_id == event.id) {
        stats.count_attendee(attendee);
    }

    stats
}

/// Stats for many events in one pass over the records.
///
/// Events with no records get zeroed stats; records for events not in
/// `events` are dropped.
pub fn compute_stats_for_events(
    events: &[Event],
    applications: &[EventApplication],
    attendees: &[Attendee],
) -> HashMap<Uuid, EventStats> {
    let mut by_event: HashMap<Uuid, EventStats> =
        events.iter().map(|e| (e.id, EventStats::default())).collect();

    for application in applications {
        if let Some(stats) = by_event.get_mut(&application.event_id) {
            stats.count_application(application);
        }
    }
    for attendee in attendees {
        if let Some(stats) = by_event.get_mut(&attendee.event_id) {
            stats.count_attendee(attendee);
        }
    }

    by_event
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::{application_for, attendee_for, event_by};

    #[test]
    fn test_compute_stats_fixture() {
        let event = event_by("host@example.com");
        let other = event_by("other@example.com");

        let applications = vec![
            application_for(&event, "a@example.com", ApplicationStatus::Pending),
            application_for(&event, "b@example.com", ApplicationStatus::Pending),
            application_for(&event, "c@example.com", ApplicationStatus::Approved),
            application_for(&event, "d@example.com", ApplicationStatus::Approved),
            application_for(&event, "e@example.com", ApplicationStatus::Denied),
            application_for(&other, "f@example.com", ApplicationStatus::Approved),
        ];

        let mut inside = attendee_for(&event, "c@example.com");
        inside.checked_in = true;
        let mut flagged = attendee_for(&event, "d@example.com");
        flagged.flagged = true;
        let mut elsewhere = attendee_for(&other, "f@example.com");
        elsewhere.checked_in = true;
        let attendees = vec![inside, flagged, elsewhere];

        let stats = compute_stats(&event, &applications, &attendees);
        assert_eq!(
            stats,
            EventStats {
                total: 5,
                pending: 2,
                approved: 2,
                denied: 1,
                waitlisted: 0,
                checked_in: 1,
                flagged: 1,
            }
        );
    }

    #[test]
    fn test_grouped_stats_match_per_event_stats() {
        let first = event_by("host@example.com");
        let second = event_by("host@example.com");
        let empty = event_by("host@example.com");

        let applications = vec![
            application_for(&first, "a@example.com", ApplicationStatus::Waitlisted),
            application_for(&second, "a@example.com", ApplicationStatus::Approved),
            application_for(&first, "b@example.com", ApplicationStatus::Approved),
            application_for(&second, "c@example.com", ApplicationStatus::Pending),
        ];
        let mut checked = attendee_for(&second, "a@example.com");
        checked.checked_in = true;
        let attendees = vec![attendee_for(&first, "b@example.com"), checked];

        let events = vec![first.clone(), second.clone(), empty.clone()];
        let grouped = compute_stats_for_events(&events, &applications, &attendees);

        assert_eq!(grouped.len(), 3);
        for event in &events {
            assert_eq!(grouped[&event.id], compute_stats(event, &applications, &attendees));
        }
        assert_eq!(grouped[&empty.id], EventStats::default());
        assert_eq!(grouped[&second.id].checked_in, 1);
    }
}
