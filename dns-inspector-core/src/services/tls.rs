//! TLS usage summary derived from the page URL.
//!
//! No connection is opened and no certificate is read. For `https://` URLs the
//! expiry is a fixed estimate and the summary is marked `placeholder`.

use chrono::{DateTime, Duration, SecondsFormat, Utc};
use url::Url;

use crate::types::TlsSummary;

/// Days added to "now" for the estimated expiry of an HTTPS site.
pub const ESTIMATED_VALIDITY_DAYS: i64 = 90;

impl TlsSummary {
    /// Summarize TLS usage for `url` at instant `now`.
    pub fn from_url(url: &str, now: DateTime<Utc>) -> Self {
        let secure = url.trim_start().to_ascii_lowercase().starts_with("https://");
        if !secure {
            return Self::default();
        }

        let host = Url::parse(url.trim())
            .ok()
            .and_then(|u| u.host_str().map(str::to_string));
        log::trace!(
            "[Tls] Estimating certificate validity for {}",
            host.as_deref().unwrap_or(url)
        );

        Self {
            secure: true,
            valid_until: Some(
                (now + Duration::days(ESTIMATED_VALIDITY_DAYS))
                    .to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
            issuer: None,
            placeholder: true,
        }
    }
}
