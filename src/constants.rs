//! Application-wide constants
//!
//! This module contains all constant values used throughout the application.
//! Constants are grouped by their purpose for better organization.

// =============================================================================
// SERVER DEFAULTS
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 8080;

// =============================================================================
// DATABASE DEFAULTS
// =============================================================================

/// Default maximum database connections in the pool
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 20;

// =============================================================================
// AUTHENTICATION DEFAULTS
// =============================================================================

/// Default JWT token expiry in hours
pub const DEFAULT_JWT_EXPIRY_HOURS: i64 = 24;

/// Default refresh token expiry in days
pub const DEFAULT_REFRESH_TOKEN_EXPIRY_DAYS: i64 = 7;

/// Length of generated refresh tokens
pub const REFRESH_TOKEN_LENGTH: usize = 64;

/// Minimum password length
pub const MIN_PASSWORD_LENGTH: u64 = 8;

/// Maximum password length
pub const MAX_PASSWORD_LENGTH: u64 = 128;

/// Maximum full name length
pub const MAX_FULL_NAME_LENGTH: u64 = 100;

/// Maximum bio length
pub const MAX_BIO_LENGTH: u64 = 2000;

// =============================================================================
// VERIFICATION CODES
// =============================================================================

/// Number of digits in a verification code
pub const VERIFICATION_CODE_LENGTH: usize = 6;

/// Default lifetime of an issued code in seconds
pub const DEFAULT_VERIFICATION_CODE_TTL_SECS: u64 = 600;

/// Default number of wrong guesses before a code is burned
pub const DEFAULT_VERIFICATION_MAX_ATTEMPTS: u32 = 5;

/// Default minimum delay between two codes for the same user
pub const DEFAULT_VERIFICATION_RESEND_COOLDOWN_SECS: u64 = 60;

/// Writes of the verified flag tried after the code was accepted
pub const VERIFIED_WRITE_ATTEMPTS: usize = 3;

/// Reviewer recorded when an event without screening approves on its own
pub const AUTO_APPROVAL_REVIEWER: &str = "system:auto-approval";

// =============================================================================
// USER ROLES
// =============================================================================

/// Account-level role identifiers
pub mod roles {
    pub const ADMIN: &str = "admin";
    pub const USER: &str = "user";
}

/// Account verification states
pub mod verification_status {
    pub const PENDING: &str = "pending";
    pub const VERIFIED: &str = "verified";
}

// =============================================================================
// EVENT SETTINGS
// =============================================================================

/// Maximum guest passes an event may grant each attendee
pub const MAX_GUEST_PASSES_PER_ATTENDEE: i32 = 3;

/// Maximum event name length
pub const MAX_EVENT_NAME_LENGTH: u64 = 200;

/// Maximum event description length
pub const MAX_EVENT_DESCRIPTION_LENGTH: u64 = 10000;

/// Maximum location field length
pub const MAX_LOCATION_LENGTH: u64 = 500;

/// Genre tags an event may carry
pub const GENRES: &[&str] = &[
    "house",
    "techno",
    "drum-and-bass",
    "dubstep",
    "trance",
    "hardstyle",
    "ambient",
    "breakbeat",
];

/// Capacity used when an organizer does not set one
pub const DEFAULT_EVENT_CAPACITY: i32 = 50;

/// Guest passes used when an organizer does not set them
pub const DEFAULT_GUEST_PASSES: i32 = 1;

// =============================================================================
// APPLICATIONS & DOOR
// =============================================================================

/// Maximum application message length
pub const MAX_APPLICATION_MESSAGE_LENGTH: u64 = 4000;

/// Maximum flag reason / note length
pub const MAX_NOTE_LENGTH: u64 = 1000;

/// Prefix written on the note appended when an attendee is flagged
pub const FLAG_NOTE_PREFIX: &str = "FLAGGED: ";

// =============================================================================
// RATE LIMITING
// =============================================================================

/// Per-IP request limits, counted in fixed windows
pub mod rate_limits {
    /// Auth endpoint - max requests
    pub const AUTH_MAX_REQUESTS: i64 = 5;
    /// Auth endpoint - window in seconds
    pub const AUTH_WINDOW_SECS: i64 = 60;

    /// Application submission and code endpoints - max requests
    pub const APPLICATION_MAX_REQUESTS: i64 = 10;
    /// Application endpoints - window in seconds
    pub const APPLICATION_WINDOW_SECS: i64 = 60;

    /// General API - max requests
    pub const GENERAL_MAX_REQUESTS: i64 = 100;
    /// General API - window in seconds
    pub const GENERAL_WINDOW_SECS: i64 = 60;
}

// =============================================================================
// API
// =============================================================================

/// API base path
pub const API_BASE_PATH: &str = "/api/v1";
