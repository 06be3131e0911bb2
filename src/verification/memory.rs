//! In-process code issuer

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::{
    config::VerificationConfig,
    constants::VERIFICATION_CODE_LENGTH,
    error::{AppError, AppResult},
    models::User,
    utils::crypto::{generate_numeric_code, hash_string},
};

use super::{destination, judge, CodeIssuer, CodeSender, Verdict};

struct StoredCode {
    hash: String,
    attempts: u32,
    expires_at: DateTime<Utc>,
}

#[derive(Default)]
struct IssuerState {
    codes: HashMap<String, StoredCode>,
    last_issued: HashMap<String, DateTime<Utc>>,
}

/// Code issuer keeping codes in memory, with the same rules as
/// [`RedisCodeIssuer`](super::RedisCodeIssuer)
pub struct MemoryCodeIssuer {
    sender: Arc<dyn CodeSender>,
    config: VerificationConfig,
    state: Mutex<IssuerState>,
}

impl MemoryCodeIssuer {
    pub fn new(sender: Arc<dyn CodeSender>, config: VerificationConfig) -> Self {
        Self {
            sender,
            config,
            state: Mutex::new(IssuerState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, IssuerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl CodeIssuer for MemoryCodeIssuer {
    async fn issue(&self, user: &User) -> AppResult<String> {
        let phone = destination(user)?;
        let now = Utc::now();
        let cooldown = Duration::seconds(self.config.resend_cooldown_secs as i64);

        {
            let mut state = self.lock();
            if let Some(last) = state.last_issued.get(&user.email) {
                if now - *last < cooldown {
                    return Err(AppError::TooManyRequests);
                }
            }
            state.last_issued.insert(user.email.clone(), now);
        }

        let code = generate_numeric_code(VERIFICATION_CODE_LENGTH);
        let code_id = Uuid::new_v4().to_string();

        if let Err(e) = self.sender.send(phone, &code).await {
            self.lock().last_issued.remove(&user.email);
            return Err(e);
        }

        self.lock().codes.insert(
            code_id.clone(),
            StoredCode {
                hash: hash_string(&code),
                attempts: 0,
                expires_at: now + Duration::seconds(self.config.code_ttl_secs as i64),
            },
        );

        Ok(code_id)
    }

    async fn verify(&self, code_id: &str, input: &str) -> AppResult<bool> {
        let mut state = self.lock();
        let Some(stored) = state.codes.get_mut(code_id) else {
            return Ok(false);
        };

        if stored.expires_at <= Utc::now() {
            state.codes.remove(code_id);
            return Ok(false);
        }

        stored.attempts += 1;
        match judge(&stored.hash, input, stored.attempts, self.config.max_attempts) {
            Verdict::Accepted => {
                state.codes.remove(code_id);
                Ok(true)
            }
            Verdict::Rejected => Ok(false),
            Verdict::Exhausted => {
                state.codes.remove(code_id);
                Ok(false)
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::capturing_issuer;
    use super::*;
    use crate::verification::MockCodeSender;

    fn user_with_phone(phone: Option<&str>) -> User {
        let now = Utc::now();
        User {
            email: "guest@example.com".to_string(),
            full_name: "Guest".to_string(),
            phone: phone.map(str::to_string),
            bio: None,
            role: "user".to_string(),
            verification_status: "pending".to_string(),
            password_hash: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_issue_and_verify_once() {
        let (issuer, outbox) = capturing_issuer();
        let user = user_with_phone(Some("+15550101"));

        let code_id = issuer.issue(&user).await.unwrap();
        let code = outbox.last_code("+15550101").unwrap();

        assert!(!issuer.verify(&code_id, "not-it").await.unwrap());
        assert!(issuer.verify(&code_id, &code).await.unwrap());
        // consumed
        assert!(!issuer.verify(&code_id, &code).await.unwrap());
    }

    #[tokio::test]
    async fn test_code_burned_after_max_attempts() {
        let (issuer, outbox) = capturing_issuer();
        let user = user_with_phone(Some("+15550101"));

        let code_id = issuer.issue(&user).await.unwrap();
        let code = outbox.last_code("+15550101").unwrap();
        let wrong = if code == "000000" { "111111" } else { "000000" };

        for _ in 0..VerificationConfig::default().max_attempts {
            assert!(!issuer.verify(&code_id, wrong).await.unwrap());
        }
        assert!(!issuer.verify(&code_id, &code).await.unwrap());
    }

    #[tokio::test]
    async fn test_issue_requires_phone() {
        let (issuer, outbox) = capturing_issuer();
        let result = issuer.issue(&user_with_phone(None)).await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(outbox.len(), 0);
    }

    #[tokio::test]
    async fn test_resend_cooldown() {
        let mut sender = MockCodeSender::new();
        sender.expect_send().times(1).returning(|_, _| Ok(()));
        let issuer = MemoryCodeIssuer::new(Arc::new(sender), VerificationConfig::default());
        let user = user_with_phone(Some("+15550101"));

        issuer.issue(&user).await.unwrap();
        let again = issuer.issue(&user).await;

        assert!(matches!(again, Err(AppError::TooManyRequests)));
    }

    #[tokio::test]
    async fn test_failed_delivery_does_not_start_cooldown() {
        let mut sender = MockCodeSender::new();
        let mut calls = 0;
        sender.expect_send().times(2).returning(move |_, _| {
            calls += 1;
            if calls == 1 {
                Err(AppError::Delivery("gateway down".to_string()))
            } else {
                Ok(())
            }
        });
        let issuer = MemoryCodeIssuer::new(Arc::new(sender), VerificationConfig::default());
        let user = user_with_phone(Some("+15550101"));

        assert!(matches!(issuer.issue(&user).await, Err(AppError::Delivery(_))));
        assert!(issuer.issue(&user).await.is_ok());
    }
}
