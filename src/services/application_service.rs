//! Application service
//!
//! Drives an application from submission through phone verification to
//! the organizer's decision. Approval materializes the attendee record.

use chrono::Utc;
use uuid::Uuid;

use crate::{
    constants::{verification_status, VERIFIED_WRITE_ATTEMPTS},
    db::Gateway,
    domain::review::{plan_auto_review, plan_decision, validate_code_format, validate_submission},
    error::{AppError, AppResult},
    models::{
        ApplicationChanges, ApplicationStatus, Attendee, Decision, Event, EventApplication,
        NewApplication, NewAttendee, Permission, Review,
    },
    verification::CodeIssuer,
};

use super::TeamService;

/// Result of recording a decision
#[derive(Debug, Clone)]
pub struct Decided {
    pub application: EventApplication,
    /// Present when the application ended up approved
    pub attendee: Option<Attendee>,
}

/// Application service for the review workflow
pub struct ApplicationService;

impl ApplicationService {
    /// Apply to an event. Returns the new application and the id of the
    /// verification code that was sent to the applicant's phone.
    pub async fn submit(
        gw: &dyn Gateway,
        issuer: &dyn CodeIssuer,
        user_email: &str,
        event_id: Uuid,
        application_message: &str,
        guests_requested: i32,
    ) -> AppResult<(EventApplication, String)> {
        let user = gw.find_user(user_email).await?.ok_or(AppError::Unauthorized)?;
        let event = TeamService::load_event(gw, event_id).await?;

        let message = validate_submission(&event, application_message, guests_requested)?;
        if Self::existing(gw, event_id, user_email).await?.is_some() {
            return Err(AppError::AlreadyExists(
                "Already applied to this event".to_string(),
            ));
        }

        let code_id = issuer.issue(&user).await?;

        let application = gw
            .create_application(NewApplication {
                event_id,
                user_email: user_email.to_string(),
                application_message: message,
                guests_requested,
            })
            .await?;
        let application = gw
            .update_application(
                application.id,
                application.version,
                ApplicationChanges {
                    verification_code_id: Some(code_id.clone()),
                    ..ApplicationChanges::default()
                },
            )
            .await?;

        tracing::info!(
            event_id = %event_id,
            application_id = %application.id,
            user_email,
            "Application submitted"
        );

        Ok((application, code_id))
    }

    /// Confirm the applicant's phone with the code they received
    pub async fn verify(
        gw: &dyn Gateway,
        issuer: &dyn CodeIssuer,
        user_email: &str,
        application_id: Uuid,
        code: &str,
    ) -> AppResult<EventApplication> {
        let application = Self::owned(gw, user_email, application_id).await?;
        if application.verified {
            return Ok(application);
        }

        let code = code.trim();
        validate_code_format(code)?;

        let code_id = application.verification_code_id.as_deref().ok_or_else(|| {
            AppError::Validation("No verification code has been issued".to_string())
        })?;
        if !issuer.verify(code_id, code).await? {
            return Err(AppError::Validation(
                "Invalid or expired verification code".to_string(),
            ));
        }

        // the code is spent now, so a concurrent edit must not lose the result
        let application = Self::mark_verified(gw, application).await?;
        gw.set_verification_status(user_email, verification_status::VERIFIED)
            .await?;

        tracing::info!(application_id = %application.id, user_email, "Application verified");

        let event = TeamService::load_event(gw, application.event_id).await?;
        if event.screening_required || application.status != ApplicationStatus::Pending {
            return Ok(application);
        }

        Self::auto_review(gw, &event, application).await
    }

    /// Send a fresh code for an application that is not verified yet
    pub async fn resend_code(
        gw: &dyn Gateway,
        issuer: &dyn CodeIssuer,
        user_email: &str,
        application_id: Uuid,
    ) -> AppResult<String> {
        let application = Self::owned(gw, user_email, application_id).await?;
        if application.verified {
            return Err(AppError::Conflict(
                "Application is already verified".to_string(),
            ));
        }

        let user = gw.find_user(user_email).await?.ok_or(AppError::Unauthorized)?;
        let code_id = issuer.issue(&user).await?;

        gw.update_application(
            application.id,
            application.version,
            ApplicationChanges {
                verification_code_id: Some(code_id.clone()),
                ..ApplicationChanges::default()
            },
        )
        .await?;

        Ok(code_id)
    }

    /// Record an organizer decision.
    ///
    /// With `expected_version` set, a decision taken on an out-of-date view
    /// of the application fails with `Conflict`.
    pub async fn decide(
        gw: &dyn Gateway,
        reviewer: &str,
        application_id: Uuid,
        decision: Decision,
        expected_version: Option<i32>,
    ) -> AppResult<Decided> {
        let application = Self::load(gw, application_id).await?;
        let (event, _) =
            TeamService::authorize(gw, reviewer, application.event_id, Permission::ScreenAttendees)
                .await?;

        let version = expected_version.unwrap_or(application.version);
        if version != application.version {
            return Err(AppError::Conflict(
                "Application changed since it was loaded".to_string(),
            ));
        }

        let approved = gw.count_approved(event.id).await?;
        let review = plan_decision(&application, &event, decision, approved, reviewer, Utc::now())?;
        let enforce_capacity = decision == Decision::Approve;

        let application = gw
            .record_review(application.id, version, review, enforce_capacity)
            .await?;

        tracing::info!(
            event_id = %event.id,
            application_id = %application.id,
            actor = reviewer,
            status = %application.status,
            "Application decided"
        );

        let attendee = match application.status {
            ApplicationStatus::Approved => Some(Self::ensure_attendee(gw, &application).await?),
            _ => None,
        };

        Ok(Decided {
            application,
            attendee,
        })
    }

    /// Withdraw a pending application
    pub async fn withdraw(gw: &dyn Gateway, user_email: &str, application_id: Uuid) -> AppResult<()> {
        let application = Self::owned(gw, user_email, application_id).await?;
        if application.status != ApplicationStatus::Pending {
            return Err(AppError::Conflict(format!(
                "Application has already been {}",
                application.status
            )));
        }

        gw.delete_application(application.id, application.version)
            .await?;

        tracing::info!(application_id = %application_id, user_email, "Application withdrawn");
        Ok(())
    }

    /// Applications to one event, for screening
    pub async fn list_for_event(
        gw: &dyn Gateway,
        actor: &str,
        event_id: Uuid,
    ) -> AppResult<Vec<EventApplication>> {
        TeamService::authorize(gw, actor, event_id, Permission::ScreenAttendees).await?;
        gw.list_applications_by_events(&[event_id]).await
    }

    /// The caller's own applications
    pub async fn mine(gw: &dyn Gateway, user_email: &str) -> AppResult<Vec<EventApplication>> {
        gw.list_applications_by_user(user_email).await
    }

    /// Attendee record of an approved application, created on first use
    pub async fn ensure_attendee(gw: &dyn Gateway, application: &EventApplication) -> AppResult<Attendee> {
        if let Some(attendee) = gw.find_attendee_by_application(application.id).await? {
            return Ok(attendee);
        }

        let created = gw
            .create_attendee(NewAttendee {
                event_id: application.event_id,
                application_id: application.id,
                user_email: application.user_email.clone(),
                guests_brought: application.guests_requested,
            })
            .await;

        match created {
            Ok(attendee) => Ok(attendee),
            // lost a race with another approval path
            Err(AppError::AlreadyExists(_)) => gw
                .find_attendee_by_application(application.id)
                .await?
                .ok_or_else(|| {
                    AppError::DataIntegrity(format!(
                        "attendee for application {} vanished",
                        application.id
                    ))
                }),
            Err(e) => Err(e),
        }
    }

    /// Set the verified flag, reloading and retrying when the row moved on
    async fn mark_verified(
        gw: &dyn Gateway,
        mut application: EventApplication,
    ) -> AppResult<EventApplication> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            let changes = ApplicationChanges {
                verified: Some(true),
                ..ApplicationChanges::default()
            };
            match gw
                .update_application(application.id, application.version, changes)
                .await
            {
                Err(AppError::Conflict(_)) if attempts < VERIFIED_WRITE_ATTEMPTS => {
                    application = Self::load(gw, application.id).await?;
                    if application.verified {
                        return Ok(application);
                    }
                }
                other => return other,
            }
        }
    }

    async fn auto_review(
        gw: &dyn Gateway,
        event: &Event,
        application: EventApplication,
    ) -> AppResult<EventApplication> {
        let approved = gw.count_approved(event.id).await?;
        let review = plan_auto_review(event, approved, Utc::now());

        let enforce_capacity = review.status == ApplicationStatus::Approved;
        let result = gw
            .record_review(application.id, application.version, review.clone(), enforce_capacity)
            .await;

        let reviewed = match result {
            Err(AppError::CapacityExceeded { .. }) => {
                let waitlist = Review {
                    status: ApplicationStatus::Waitlisted,
                    ..review
                };
                gw.record_review(application.id, application.version, waitlist, false)
                    .await?
            }
            other => other?,
        };

        tracing::info!(
            event_id = %event.id,
            application_id = %reviewed.id,
            status = %reviewed.status,
            "Application reviewed automatically"
        );

        if reviewed.status == ApplicationStatus::Approved {
            Self::ensure_attendee(gw, &reviewed).await?;
        }
        Ok(reviewed)
    }

    async fn load(gw: &dyn Gateway, application_id: Uuid) -> AppResult<EventApplication> {
        gw.find_application(application_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Application not found".to_string()))
    }

    async fn owned(gw: &dyn Gateway, user_email: &str, application_id: Uuid) -> AppResult<EventApplication> {
        let application = Self::load(gw, application_id).await?;
        if application.user_email != user_email {
            return Err(AppError::Forbidden(
                "Application belongs to another user".to_string(),
            ));
        }
        Ok(application)
    }

    /// The single application of a pair; more than one is corrupt data
    pub(crate) async fn existing(
        gw: &dyn Gateway,
        event_id: Uuid,
        user_email: &str,
    ) -> AppResult<Option<EventApplication>> {
        let mut found = gw.applications_for(event_id, user_email).await?;
        if found.len() > 1 {
            tracing::error!(
                event_id = %event_id,
                user_email,
                count = found.len(),
                "Multiple applications for one user on one event"
            );
            return Err(AppError::DataIntegrity(format!(
                "{} has {} applications for event {}",
                user_email,
                found.len(),
                event_id
            )));
        }
        Ok(found.pop())
    }
}
