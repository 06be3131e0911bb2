//! Code delivery channels

use async_trait::async_trait;
use serde::Serialize;

use crate::error::AppResult;

/// Delivers a verification code to a phone number
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CodeSender: Send + Sync {
    async fn send(&self, phone: &str, code: &str) -> AppResult<()>;
}

#[derive(Debug, Serialize)]
struct SmsPayload<'a> {
    to: &'a str,
    body: String,
}

/// Posts codes to an SMS gateway webhook
pub struct WebhookCodeSender {
    client: reqwest::Client,
    url: String,
}

impl WebhookCodeSender {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl CodeSender for WebhookCodeSender {
    async fn send(&self, phone: &str, code: &str) -> AppResult<()> {
        let payload = SmsPayload {
            to: phone,
            body: format!("Your guestlist verification code is {}", code),
        };

        self.client
            .post(&self.url)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;

        tracing::debug!(to = %mask_phone(phone), "Verification code handed to SMS gateway");
        Ok(())
    }
}

/// Writes codes to the log instead of sending them (local development)
#[derive(Debug, Default)]
pub struct LogCodeSender;

#[async_trait]
impl CodeSender for LogCodeSender {
    async fn send(&self, phone: &str, code: &str) -> AppResult<()> {
        tracing::warn!(to = %mask_phone(phone), code, "SMS delivery disabled, verification code logged");
        Ok(())
    }
}

/// Keep only the last four digits of a phone number
fn mask_phone(phone: &str) -> String {
    let digits: Vec<char> = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    let tail: String = digits[digits.len().saturating_sub(4)..].iter().collect();
    format!("***{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_phone() {
        assert_eq!(mask_phone("+1 (555) 010-9999"), "***9999");
        assert_eq!(mask_phone("12"), "***12");
    }

    #[tokio::test]
    async fn test_log_sender_never_fails() {
        assert!(LogCodeSender.send("+15550100", "123456").await.is_ok());
    }
}
