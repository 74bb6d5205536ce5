//! Utility modules.

/// Log sanitization utilities to keep long record payloads out of logs.
pub mod log_sanitizer;
