//! Presentation strings for aggregated records.
//!
//! Pure functions; payloads that do not parse fall back to the raw data.

use serde::Serialize;

use dns_inspector_provider::RecordType;

use crate::types::{AggregatedRecord, NameserverAddresses};

/// One display row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedRecord {
    #[serde(rename = "type")]
    pub record_type: RecordType,
    pub value: String,
    pub ttl: String,
    pub sources: String,
}

/// Human-readable payload of one record.
pub fn format_record(record: &AggregatedRecord) -> String {
    let data = record.data.as_str();
    let formatted = match record.record_type {
        RecordType::A | RecordType::Aaaa | RecordType::Cname | RecordType::Ptr => None,
        RecordType::Ns => Some(format_ns(data, record.nameserver.as_ref())),
        RecordType::Mx => format_mx(data),
        RecordType::Txt => Some(format_txt(data)),
        RecordType::Soa => format_soa(data),
        RecordType::Caa => format_caa(data),
    };
    formatted.unwrap_or_else(|| data.to_string())
}

fn format_ns(host: &str, addresses: Option<&NameserverAddresses>) -> String {
    match addresses {
        None => host.to_string(),
        Some(NameserverAddresses::Resolved(ips)) => format!("{host} ({})", ips.join(", ")),
        Some(NameserverAddresses::NotFound) => format!("{host} (no address)"),
        Some(NameserverAddresses::LookupFailed(_)) => format!("{host} (address lookup failed)"),
    }
}

fn format_mx(data: &str) -> Option<String> {
    let (priority, host) = data.trim().split_once(char::is_whitespace)?;
    let priority: u16 = priority.parse().ok()?;
    let host = host.trim().trim_end_matches('.');
    if host.is_empty() {
        return None;
    }
    Some(format!("{host} (priority {priority})"))
}

/// `"a" "b"` → `ab`, `\"` → `"`. Unquoted input is kept as-is.
pub(crate) fn format_txt(data: &str) -> String {
    let trimmed = data.trim();
    if !trimmed.starts_with('"') {
        return trimmed.to_string();
    }

    let mut out = String::with_capacity(trimmed.len());
    let mut in_quotes = false;
    let mut chars = trimmed.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' if in_quotes => {
                if let Some(next) = chars.next() {
                    out.push(next);
                }
            }
            '"' => in_quotes = !in_quotes,
            c if in_quotes => out.push(c),
            // whitespace between chunks
            _ => {}
        }
    }
    out
}

fn format_soa(data: &str) -> Option<String> {
    let fields: Vec<&str> = data.split_whitespace().collect();
    let [mname, rname, serial, refresh, retry, expire, minimum] = fields.as_slice() else {
        return None;
    };
    for number in [serial, refresh, retry, expire, minimum] {
        number.parse::<u32>().ok()?;
    }
    Some(format!(
        "Primary NS: {}, Admin: {}, Serial: {serial}, Refresh: {refresh}s, Retry: {retry}s, Expire: {expire}s, Minimum TTL: {minimum}s",
        mname.trim_end_matches('.'),
        rname.trim_end_matches('.'),
    ))
}

fn format_caa(data: &str) -> Option<String> {
    let mut parts = data.trim().splitn(3, ' ');
    let flags: u8 = parts.next()?.parse().ok()?;
    let tag = parts.next()?;
    let value = parts.next()?.trim().trim_matches('"');
    if tag.is_empty() {
        return None;
    }
    Some(format!("{tag} {value} (flags {flags})"))
}

/// `45s`, `5m`, `1h 30m`, `2d`, `1d 6h`.
pub fn format_ttl(ttl: u32) -> String {
    const MINUTE: u32 = 60;
    const HOUR: u32 = 60 * MINUTE;
    const DAY: u32 = 24 * HOUR;

    if ttl < MINUTE {
        return format!("{ttl}s");
    }

    let days = ttl / DAY;
    let hours = ttl % DAY / HOUR;
    let minutes = ttl % HOUR / MINUTE;
    let seconds = ttl % MINUTE;

    // two most significant non-zero units
    let parts: Vec<String> = [(days, "d"), (hours, "h"), (minutes, "m"), (seconds, "s")]
        .iter()
        .skip_while(|(n, _)| *n == 0)
        .take(2)
        .filter(|(n, _)| *n > 0)
        .map(|(n, unit)| format!("{n}{unit}"))
        .collect();
    parts.join(" ")
}

pub fn format_sources(sources: &[String]) -> String {
    sources.join(", ")
}

/// Display rows for a list of records, in the given order.
pub fn render_records(records: &[AggregatedRecord]) -> Vec<RenderedRecord> {
    records
        .iter()
        .map(|record| RenderedRecord {
            record_type: record.record_type,
            value: format_record(record),
            ttl: format_ttl(record.ttl),
            sources: format_sources(&record.sources),
        })
        .collect()
}
