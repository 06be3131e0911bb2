//! Utility functions

pub mod crypto;
pub mod validation;

pub use crypto::{generate_numeric_code, generate_secure_token, hash_string};
pub use validation::{normalize_email, normalize_phone, sanitize_string};
