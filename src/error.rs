//! Error code contract shared by every service error.
//!
//! Each module owns its own `thiserror` enum; this trait gives those enums a
//! stable machine-readable code for API responses and logs.

/// Stable error code + retry hint for a domain error.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

