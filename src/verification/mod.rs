//! Phone verification codes
//!
//! Applications are confirmed with a one-time numeric code sent to the
//! applicant's phone. [`CodeIssuer`] is the capability the workflow talks
//! to; [`CodeSender`] is the delivery channel behind it.

pub mod memory;
pub mod redis_issuer;
pub mod sender;

use async_trait::async_trait;

use crate::{error::AppResult, models::User, utils::crypto::verify_hash};

pub use memory::MemoryCodeIssuer;
pub use redis_issuer::RedisCodeIssuer;
pub use sender::{CodeSender, LogCodeSender, WebhookCodeSender};

#[cfg(test)]
pub use sender::MockCodeSender;

/// Issues and checks one-time codes
#[async_trait]
pub trait CodeIssuer: Send + Sync {
    /// Send a fresh code to the user's phone and return its id.
    ///
    /// Fails with `Validation` when the user has no phone number and with
    /// `TooManyRequests` inside the resend cooldown.
    async fn issue(&self, user: &User) -> AppResult<String>;

    /// Check `input` against the code behind `code_id`.
    ///
    /// A code is accepted once. Unknown, expired, and exhausted codes are
    /// rejected.
    async fn verify(&self, code_id: &str, input: &str) -> AppResult<bool>;
}

/// Outcome of one guess against a stored code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Verdict {
    Accepted,
    Rejected,
    /// Wrong guess that used up the last attempt
    Exhausted,
}

/// Judge the `attempt`-th guess (1-based) against a stored code hash
pub(crate) fn judge(stored_hash: &str, input: &str, attempt: u32, max_attempts: u32) -> Verdict {
    if attempt > max_attempts {
        return Verdict::Exhausted;
    }
    if verify_hash(input, stored_hash) {
        Verdict::Accepted
    } else if attempt == max_attempts {
        Verdict::Exhausted
    } else {
        Verdict::Rejected
    }
}

/// Phone number a code is sent to
pub(crate) fn destination(user: &User) -> AppResult<&str> {
    user.phone
        .as_deref()
        .filter(|phone| !phone.trim().is_empty())
        .ok_or_else(|| {
            crate::error::AppError::Validation(
                "A phone number is required for verification".to_string(),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::crypto::hash_string;

    #[test]
    fn test_judge_accepts_matching_code() {
        let hash = hash_string("123456");
        assert_eq!(judge(&hash, "123456", 1, 5), Verdict::Accepted);
    }

    #[test]
    fn test_judge_exhausts_on_last_wrong_guess() {
        let hash = hash_string("123456");
        assert_eq!(judge(&hash, "000000", 4, 5), Verdict::Rejected);
        assert_eq!(judge(&hash, "000000", 5, 5), Verdict::Exhausted);
    }

    #[test]
    fn test_judge_refuses_after_limit_even_if_correct() {
        let hash = hash_string("123456");
        assert_eq!(judge(&hash, "123456", 6, 5), Verdict::Exhausted);
    }
}
