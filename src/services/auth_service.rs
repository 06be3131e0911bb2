//! Authentication service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};

use crate::{
    config::Config,
    constants::REFRESH_TOKEN_LENGTH,
    db::Gateway,
    error::{AppError, AppResult},
    models::{NewUser, User},
    utils::{
        crypto::generate_secure_token,
        validation::{normalize_email, normalize_phone, sanitize_string, validate_email, validate_password},
    },
};

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user email
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Issued token pair
#[derive(Debug)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

fn refresh_key(token: &str) -> String {
    format!("refresh_token:{}", token)
}

fn sessions_key(email: &str) -> String {
    format!("refresh_tokens:{}", email)
}

/// Authentication service
pub struct AuthService;

impl AuthService {
    /// Register a new user
    pub async fn register(
        gw: &dyn Gateway,
        email: &str,
        password: &str,
        full_name: &str,
        phone: Option<&str>,
    ) -> AppResult<User> {
        let email = normalize_email(email);
        validate_email(&email).map_err(|e| AppError::Validation(e.to_string()))?;
        validate_password(password).map_err(|e| AppError::Validation(e.to_string()))?;

        let full_name = sanitize_string(full_name);
        if full_name.is_empty() {
            return Err(AppError::Validation("Full name is required".to_string()));
        }
        let phone = phone
            .map(normalize_phone)
            .transpose()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let password_hash = Self::hash_password(password)?;

        let user = gw
            .create_user(NewUser {
                email,
                full_name,
                phone,
                password_hash,
            })
            .await?;

        tracing::info!(email = %user.email, "User registered");
        Ok(user)
    }

    /// Login with email and password
    pub async fn login(
        gw: &dyn Gateway,
        redis: ConnectionManager,
        config: &Config,
        email: &str,
        password: &str,
    ) -> AppResult<(User, TokenPair)> {
        let user = gw
            .find_user(&normalize_email(email))
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !Self::verify_password(password, &user.password_hash)? {
            return Err(AppError::InvalidCredentials);
        }

        let tokens = Self::issue_tokens(redis, config, &user).await?;
        Ok((user, tokens))
    }

    /// Exchange a refresh token for a new token pair. Each refresh token works once.
    pub async fn refresh_token(
        gw: &dyn Gateway,
        mut redis: ConnectionManager,
        config: &Config,
        refresh_token: &str,
    ) -> AppResult<TokenPair> {
        let email: Option<String> = redis.get_del(refresh_key(refresh_token)).await?;
        let email = email.ok_or(AppError::InvalidToken)?;
        redis
            .srem::<_, _, ()>(sessions_key(&email), refresh_token)
            .await?;

        let user = gw.find_user(&email).await?.ok_or(AppError::InvalidToken)?;

        Self::issue_tokens(redis, config, &user).await
    }

    /// Logout: drop one refresh token, or every session of the user
    pub async fn logout(
        mut redis: ConnectionManager,
        email: &str,
        refresh_token: Option<&str>,
        all_sessions: bool,
    ) -> AppResult<()> {
        if all_sessions {
            let tokens: Vec<String> = redis.smembers(sessions_key(email)).await?;
            let mut keys: Vec<String> = tokens.iter().map(|t| refresh_key(t)).collect();
            keys.push(sessions_key(email));
            redis.del::<_, ()>(keys).await?;
        } else if let Some(token) = refresh_token {
            redis.del::<_, ()>(refresh_key(token)).await?;
            redis.srem::<_, _, ()>(sessions_key(email), token).await?;
        }

        Ok(())
    }

    /// Verify JWT token and extract claims
    pub fn verify_token(token: &str, secret: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }

    async fn issue_tokens(mut redis: ConnectionManager, config: &Config, user: &User) -> AppResult<TokenPair> {
        let (access_token, expires_in) = Self::generate_access_token(user, &config.jwt.secret, config.jwt.expiry_hours)?;
        let refresh_token = generate_secure_token(REFRESH_TOKEN_LENGTH);

        let expiry = (config.jwt.refresh_token_expiry_days * 24 * 60 * 60) as u64;
        redis
            .set_ex::<_, _, ()>(refresh_key(&refresh_token), &user.email, expiry)
            .await?;
        redis
            .sadd::<_, _, ()>(sessions_key(&user.email), &refresh_token)
            .await?;
        redis
            .expire::<_, ()>(sessions_key(&user.email), expiry as i64)
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            expires_in,
        })
    }

    /// Hash password using Argon2
    fn hash_password(password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {}", e)))?
            .to_string();

        Ok(hash)
    }

    /// Verify password against hash
    fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Invalid password hash: {}", e)))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Generate access token
    fn generate_access_token(user: &User, secret: &str, expiry_hours: i64) -> AppResult<(String, i64)> {
        let now = Utc::now();
        let expires_at = now + Duration::hours(expiry_hours);

        let claims = Claims {
            sub: user.email.clone(),
            role: user.role.clone(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Token generation failed: {}", e)))?;

        Ok((token, expiry_hours * 3600))
    }
}
