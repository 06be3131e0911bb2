//! Domain models
//!
//! This module contains all domain models used throughout the application.

pub mod application;
pub mod attendee;
pub mod event;
pub mod permission;
pub mod role;
pub mod user;

pub use application::*;
pub use attendee::*;
pub use event::*;
pub use permission::*;
pub use role::*;
pub use user::*;
