//! Attendee request DTOs

use serde::Deserialize;
use validator::Validate;

use crate::constants::MAX_NOTE_LENGTH;

/// Flag an attendee
#[derive(Debug, Deserialize, Validate)]
pub struct FlagRequest {
    #[validate(length(min = 1, max = MAX_NOTE_LENGTH))]
    pub reason: String,
}

/// Free-form door note
#[derive(Debug, Deserialize, Validate)]
pub struct NoteRequest {
    #[validate(length(min = 1, max = MAX_NOTE_LENGTH))]
    pub text: String,
}
