//! Input validation utilities

use std::sync::LazyLock;

use regex::Regex;

use crate::constants;

/// E.164-style phone numbers: optional `+`, 7 to 15 digits
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9]{7,15}$").expect("phone regex is valid"));

/// Normalize an email for use as an identifier
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Validate email format (basic validation)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err("Invalid email format");
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err("Invalid email format");
    }
    if !domain.contains('.') {
        return Err("Invalid email domain");
    }
    Ok(())
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < constants::MIN_PASSWORD_LENGTH as usize {
        return Err("Password must be at least 8 characters");
    }
    if password.len() > constants::MAX_PASSWORD_LENGTH as usize {
        return Err("Password must be at most 128 characters");
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        return Err("Password must contain at least one lowercase letter");
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        return Err("Password must contain at least one uppercase letter");
    }
    if !password.chars().any(|c| c.is_numeric()) {
        return Err("Password must contain at least one number");
    }
    Ok(())
}

/// Strip formatting from a phone number and validate what remains
pub fn normalize_phone(phone: &str) -> Result<String, &'static str> {
    let compact: String = phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
        .collect();
    if PHONE_RE.is_match(&compact) {
        Ok(compact)
    } else {
        Err("Phone number must contain 7 to 15 digits")
    }
}

/// Lowercase, deduplicate and check genre tags against the known list
pub fn normalize_genres(genres: &[String]) -> Result<Vec<String>, String> {
    let mut normalized: Vec<String> = Vec::with_capacity(genres.len());
    for genre in genres {
        let genre = genre.trim().to_lowercase();
        if !constants::GENRES.contains(&genre.as_str()) {
            return Err(format!("Unknown genre: {}", genre));
        }
        if !normalized.contains(&genre) {
            normalized.push(genre);
        }
    }
    Ok(normalized)
}

/// Sanitize string input (remove control characters, trim whitespace)
pub fn sanitize_string(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect::<String>()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("a@b@c.com").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("Password123").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password("nouppercase123").is_err());
        assert!(validate_password("NoNumbers").is_err());
    }

    #[test]
    fn test_normalize_phone() {
        assert_eq!(normalize_phone("+1 (555) 010-1234").unwrap(), "+15550101234");
        assert!(normalize_phone("12345").is_err());
        assert!(normalize_phone("call me").is_err());
    }

    #[test]
    fn test_normalize_genres() {
        let genres = vec!["Techno".to_string(), "house".to_string(), "techno".to_string()];
        assert_eq!(normalize_genres(&genres).unwrap(), vec!["techno", "house"]);
        assert!(normalize_genres(&["polka".to_string()]).is_err());
    }

    #[test]
    fn test_sanitize_string() {
        assert_eq!(sanitize_string("  hi\u{0}there \n"), "hithere");
        assert_eq!(normalize_email(" Host@Example.COM "), "host@example.com");
    }
}
