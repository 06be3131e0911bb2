//! User request DTOs

use serde::Deserialize;
use validator::Validate;

use crate::constants::{MAX_BIO_LENGTH, MAX_FULL_NAME_LENGTH};

/// Update profile request; omitted fields stay unchanged
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = MAX_FULL_NAME_LENGTH))]
    pub full_name: Option<String>,

    /// Changing the number resets phone verification
    #[validate(length(max = 32))]
    pub phone: Option<String>,

    #[validate(length(max = MAX_BIO_LENGTH))]
    pub bio: Option<String>,
}
