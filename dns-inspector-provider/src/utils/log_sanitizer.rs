//! Log sanitization utilities
//!
//! DoH responses can carry long TXT payloads (DKIM public keys, SPF includes,
//! verification tokens). Keep them out of debug/error logs in full.

/// Maximum number of bytes of a response body included in log output.
const TRUNCATE_LIMIT: usize = 256;
/// Maximum number of bytes of a single record payload included in log output.
const RECORD_DATA_LIMIT: usize = 64;

/// Largest char boundary at or below `index`.
fn floor_char_boundary(s: &str, index: usize) -> usize {
    if index >= s.len() {
        return s.len();
    }
    (0..=index).rev().find(|&i| s.is_char_boundary(i)).unwrap_or(0)
}

fn truncate_to(s: &str, limit: usize) -> String {
    if s.len() <= limit {
        s.to_string()
    } else {
        format!(
            "{}... [truncated, total {} bytes]",
            &s[..floor_char_boundary(s, limit)],
            s.len()
        )
    }
}

/// Truncate a response body for safe logging.
pub fn truncate_for_log(s: &str) -> String {
    truncate_to(s, TRUNCATE_LIMIT)
}

/// Truncate one record payload (e.g. a DKIM TXT value) for trace logging.
pub fn truncate_record_data(s: &str) -> String {
    truncate_to(s, RECORD_DATA_LIMIT)
}
