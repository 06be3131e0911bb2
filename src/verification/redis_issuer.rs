//! Redis-backed code issuer
//!
//! Keys:
//! - `verification:code:{code_id}` holds the SHA-256 of the code, expires with the code
//! - `verification:attempts:{code_id}` counts guesses
//! - `verification:cooldown:{email}` blocks re-issuing until it expires

use std::sync::Arc;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use uuid::Uuid;

use crate::{
    config::VerificationConfig,
    constants::VERIFICATION_CODE_LENGTH,
    error::{AppError, AppResult},
    models::User,
    utils::crypto::{generate_numeric_code, hash_string},
};

use super::{destination, judge, CodeIssuer, CodeSender, Verdict};

fn code_key(code_id: &str) -> String {
    format!("verification:code:{}", code_id)
}

fn attempts_key(code_id: &str) -> String {
    format!("verification:attempts:{}", code_id)
}

fn cooldown_key(email: &str) -> String {
    format!("verification:cooldown:{}", email)
}

/// Code issuer storing hashed codes in Redis
pub struct RedisCodeIssuer {
    redis: ConnectionManager,
    sender: Arc<dyn CodeSender>,
    config: VerificationConfig,
}

impl RedisCodeIssuer {
    pub fn new(redis: ConnectionManager, sender: Arc<dyn CodeSender>, config: VerificationConfig) -> Self {
        Self {
            redis,
            sender,
            config,
        }
    }

    /// Claim the resend slot for `email`; false while the cooldown runs
    async fn claim_cooldown(&self, email: &str) -> AppResult<bool> {
        if self.config.resend_cooldown_secs == 0 {
            return Ok(true);
        }

        let mut redis = self.redis.clone();
        let claimed: Option<String> = redis::cmd("SET")
            .arg(cooldown_key(email))
            .arg("1")
            .arg("NX")
            .arg("EX")
            .arg(self.config.resend_cooldown_secs)
            .query_async(&mut redis)
            .await?;

        Ok(claimed.is_some())
    }

    async fn discard(&self, code_id: &str) -> AppResult<()> {
        let mut redis = self.redis.clone();
        redis
            .del::<_, ()>(vec![code_key(code_id), attempts_key(code_id)])
            .await?;
        Ok(())
    }
}

#[async_trait]
impl CodeIssuer for RedisCodeIssuer {
    async fn issue(&self, user: &User) -> AppResult<String> {
        let phone = destination(user)?;

        if !self.claim_cooldown(&user.email).await? {
            return Err(AppError::TooManyRequests);
        }

        let code = generate_numeric_code(VERIFICATION_CODE_LENGTH);
        let code_id = Uuid::new_v4().to_string();

        let mut redis = self.redis.clone();
        redis
            .set_ex::<_, _, ()>(code_key(&code_id), hash_string(&code), self.config.code_ttl_secs)
            .await?;

        if let Err(e) = self.sender.send(phone, &code).await {
            tracing::warn!(email = %user.email, error = %e, "Verification code delivery failed");
            self.discard(&code_id).await?;
            redis.del::<_, ()>(cooldown_key(&user.email)).await?;
            return Err(e);
        }

        tracing::info!(email = %user.email, code_id = %code_id, "Verification code issued");
        Ok(code_id)
    }

    async fn verify(&self, code_id: &str, input: &str) -> AppResult<bool> {
        let mut redis = self.redis.clone();

        let stored: Option<String> = redis.get(code_key(code_id)).await?;
        let Some(stored) = stored else {
            return Ok(false);
        };

        let attempt: u32 = redis.incr(attempts_key(code_id), 1).await?;
        if attempt == 1 {
            redis
                .expire::<_, ()>(attempts_key(code_id), self.config.code_ttl_secs as i64)
                .await?;
        }

        match judge(&stored, input, attempt, self.config.max_attempts) {
            Verdict::Accepted => {
                self.discard(code_id).await?;
                Ok(true)
            }
            Verdict::Rejected => Ok(false),
            Verdict::Exhausted => {
                tracing::warn!(code_id, "Verification code exhausted its attempts");
                self.discard(code_id).await?;
                Ok(false)
            }
        }
    }
}
