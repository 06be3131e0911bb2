//! Application review workflow rules
//!
//! Pure transition checks for the application lifecycle:
//!
//! ```text
//! pending (unverified) --verify--> pending (verified) --decide--> approved | denied | waitlisted
//!                                                  waitlisted --decide--> approved | denied | waitlisted
//! ```
//!
//! Services load the records, call into this module to validate and plan
//! the transition, then persist the result through the gateway.

use chrono::{DateTime, Utc};

use crate::{
    constants::{AUTO_APPROVAL_REVIEWER, FLAG_NOTE_PREFIX, VERIFICATION_CODE_LENGTH},
    error::{AppError, AppResult},
    models::{
        ApplicationStatus, Attendee, AttendeeNote, CheckIn, Decision, Event, EventApplication,
        Review,
    },
};

/// Validate a new application against its event. Returns the trimmed message.
pub fn validate_submission(
    event: &Event,
    application_message: &str,
    guests_requested: i32,
) -> AppResult<String> {
    if !event.status.accepts_applications() {
        return Err(AppError::Validation(format!(
            "Event is {} and not accepting applications",
            event.status
        )));
    }

    let message = application_message.trim();
    if message.is_empty() {
        return Err(AppError::Validation(
            "Application message is required".to_string(),
        ));
    }

    if guests_requested < 0 || guests_requested > event.guest_passes_per_attendee {
        return Err(AppError::Validation(format!(
            "Guests requested must be between 0 and {}",
            event.guest_passes_per_attendee
        )));
    }

    Ok(message.to_string())
}

/// A verification code is exactly six ASCII digits
pub fn validate_code_format(input: &str) -> AppResult<()> {
    if input.len() == VERIFICATION_CODE_LENGTH && input.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Verification code must be {} digits",
            VERIFICATION_CODE_LENGTH
        )))
    }
}

/// Check an organizer decision and build the review stamp to persist.
///
/// `approved_count` is the number of applications already approved for the
/// event; approval is refused once it reaches `event.capacity`.
pub fn plan_decision(
    application: &EventApplication,
    event: &Event,
    decision: Decision,
    approved_count: i64,
    reviewer: &str,
    now: DateTime<Utc>,
) -> AppResult<Review> {
    if application.status.is_terminal() {
        return Err(AppError::Conflict(format!(
            "Application has already been {}",
            application.status
        )));
    }

    if decision != Decision::Deny && !application.verified {
        return Err(AppError::Validation(
            "Application has not completed phone verification".to_string(),
        ));
    }

    if decision == Decision::Approve && approved_count >= i64::from(event.capacity) {
        return Err(AppError::CapacityExceeded {
            capacity: event.capacity,
        });
    }

    Ok(Review {
        status: decision.target_status(),
        reviewed_by: reviewer.to_string(),
        reviewed_at: now,
    })
}

/// Review applied on verification when the event skips screening:
/// approve while there is room, waitlist once full.
pub fn plan_auto_review(event: &Event, approved_count: i64, now: DateTime<Utc>) -> Review {
    let status = if approved_count < i64::from(event.capacity) {
        ApplicationStatus::Approved
    } else {
        ApplicationStatus::Waitlisted
    };

    Review {
        status,
        reviewed_by: AUTO_APPROVAL_REVIEWER.to_string(),
        reviewed_at: now,
    }
}

/// What a check-in request should do
#[derive(Debug, Clone, PartialEq)]
pub enum CheckInPlan {
    /// Already inside; return the stored record untouched
    AlreadyCheckedIn,
    /// Write this stamp
    Stamp(CheckIn),
}

pub fn plan_check_in(attendee: &Attendee, actor: &str, now: DateTime<Utc>) -> AppResult<CheckInPlan> {
    if attendee.status != ApplicationStatus::Approved {
        return Err(AppError::Validation(
            "Only approved attendees can be checked in".to_string(),
        ));
    }

    if attendee.checked_in {
        return Ok(CheckInPlan::AlreadyCheckedIn);
    }

    Ok(CheckInPlan::Stamp(CheckIn {
        at: now,
        by: actor.to_string(),
    }))
}

/// Build a door note; text must be non-empty after trimming
pub fn door_note(actor: &str, text: &str, now: DateTime<Utc>) -> AppResult<AttendeeNote> {
    let text = text.trim();
    if text.is_empty() {
        return Err(AppError::Validation("Note text is required".to_string()));
    }

    Ok(AttendeeNote {
        by: actor.to_string(),
        text: text.to_string(),
        timestamp: now,
    })
}

/// Build the flag reason and the note recording it
pub fn plan_flag(actor: &str, reason: &str, now: DateTime<Utc>) -> AppResult<(String, AttendeeNote)> {
    let reason = reason.trim();
    if reason.is_empty() {
        return Err(AppError::Validation("Flag reason is required".to_string()));
    }

    let note = AttendeeNote {
        by: actor.to_string(),
        text: format!("{}{}", FLAG_NOTE_PREFIX, reason),
        timestamp: now,
    };

    Ok((reason.to_string(), note))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::{application_for, attendee_for, event_by};
    use crate::models::EventStatus;

    #[test]
    fn test_submission_requires_message() {
        let event = event_by("host@example.com");
        assert!(matches!(
            validate_submission(&event, "", 0),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_submission(&event, "   \n", 0),
            Err(AppError::Validation(_))
        ));
        assert_eq!(
            validate_submission(&event, "  I run the zine  ", 0).unwrap(),
            "I run the zine"
        );
    }

    #[test]
    fn test_submission_guest_range() {
        let mut event = event_by("host@example.com");
        event.guest_passes_per_attendee = 2;

        assert!(validate_submission(&event, "hi", 2).is_ok());
        assert!(matches!(
            validate_submission(&event, "hi", 3),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_submission(&event, "hi", -1),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_submission_rejected_for_closed_events() {
        let mut event = event_by("host@example.com");
        event.status = EventStatus::Draft;
        assert!(validate_submission(&event, "hi", 0).is_err());
        event.status = EventStatus::Ended;
        assert!(validate_submission(&event, "hi", 0).is_err());
        event.status = EventStatus::Live;
        assert!(validate_submission(&event, "hi", 0).is_ok());
    }

    #[test]
    fn test_code_format() {
        assert!(validate_code_format("123456").is_ok());
        assert!(validate_code_format("12345").is_err());
        assert!(validate_code_format("1234567").is_err());
        assert!(validate_code_format("12a456").is_err());
        assert!(validate_code_format("١٢٣٤٥٦").is_err());
    }

    #[test]
    fn test_approve_at_capacity_fails() {
        let mut event = event_by("host@example.com");
        event.capacity = 2;
        let application = application_for(&event, "guest@example.com", ApplicationStatus::Pending);

        let result = plan_decision(&application, &event, Decision::Approve, 2, "host@example.com", Utc::now());
        assert!(matches!(result, Err(AppError::CapacityExceeded { capacity: 2 })));
    }

    #[test]
    fn test_approve_below_capacity_stamps_review() {
        let mut event = event_by("host@example.com");
        event.capacity = 2;
        let application = application_for(&event, "guest@example.com", ApplicationStatus::Pending);
        let now = Utc::now();

        let review = plan_decision(&application, &event, Decision::Approve, 1, "host@example.com", now).unwrap();
        assert_eq!(review.status, ApplicationStatus::Approved);
        assert_eq!(review.reviewed_by, "host@example.com");
        assert_eq!(review.reviewed_at, now);
    }

    #[test]
    fn test_deny_and_waitlist_ignore_capacity() {
        let mut event = event_by("host@example.com");
        event.capacity = 1;
        let application = application_for(&event, "guest@example.com", ApplicationStatus::Pending);

        let deny = plan_decision(&application, &event, Decision::Deny, 1, "host@example.com", Utc::now());
        assert_eq!(deny.unwrap().status, ApplicationStatus::Denied);
        let waitlist = plan_decision(&application, &event, Decision::Waitlist, 1, "host@example.com", Utc::now());
        assert_eq!(waitlist.unwrap().status, ApplicationStatus::Waitlisted);
    }

    #[test]
    fn test_terminal_applications_cannot_be_redecided() {
        let event = event_by("host@example.com");
        for status in [ApplicationStatus::Approved, ApplicationStatus::Denied] {
            let application = application_for(&event, "guest@example.com", status);
            let result = plan_decision(&application, &event, Decision::Waitlist, 0, "host@example.com", Utc::now());
            assert!(matches!(result, Err(AppError::Conflict(_))));
        }

        let waitlisted = application_for(&event, "guest@example.com", ApplicationStatus::Waitlisted);
        assert!(plan_decision(&waitlisted, &event, Decision::Approve, 0, "host@example.com", Utc::now()).is_ok());
    }

    #[test]
    fn test_unverified_applications_can_only_be_denied() {
        let event = event_by("host@example.com");
        let mut application = application_for(&event, "guest@example.com", ApplicationStatus::Pending);
        application.verified = false;

        assert!(matches!(
            plan_decision(&application, &event, Decision::Approve, 0, "host@example.com", Utc::now()),
            Err(AppError::Validation(_))
        ));
        assert!(plan_decision(&application, &event, Decision::Deny, 0, "host@example.com", Utc::now()).is_ok());
    }

    #[test]
    fn test_auto_review_waitlists_when_full() {
        let mut event = event_by("host@example.com");
        event.capacity = 3;

        assert_eq!(plan_auto_review(&event, 2, Utc::now()).status, ApplicationStatus::Approved);
        let full = plan_auto_review(&event, 3, Utc::now());
        assert_eq!(full.status, ApplicationStatus::Waitlisted);
        assert_eq!(full.reviewed_by, AUTO_APPROVAL_REVIEWER);
    }

    #[test]
    fn test_check_in_plan() {
        let event = event_by("host@example.com");
        let mut attendee = attendee_for(&event, "guest@example.com");

        match plan_check_in(&attendee, "door@example.com", Utc::now()).unwrap() {
            CheckInPlan::Stamp(stamp) => assert_eq!(stamp.by, "door@example.com"),
            other => panic!("expected a stamp, got {other:?}"),
        }

        attendee.checked_in = true;
        assert_eq!(
            plan_check_in(&attendee, "door@example.com", Utc::now()).unwrap(),
            CheckInPlan::AlreadyCheckedIn
        );

        attendee.status = ApplicationStatus::Waitlisted;
        assert!(plan_check_in(&attendee, "door@example.com", Utc::now()).is_err());
    }

    #[test]
    fn test_flag_requires_reason() {
        assert!(matches!(
            plan_flag("door@example.com", "", Utc::now()),
            Err(AppError::Validation(_))
        ));

        let (reason, note) = plan_flag("door@example.com", " suspicious ID ", Utc::now()).unwrap();
        assert_eq!(reason, "suspicious ID");
        assert_eq!(note.text, "FLAGGED: suspicious ID");
        assert_eq!(note.by, "door@example.com");
    }
}
