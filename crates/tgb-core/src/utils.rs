use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::{errors::Error, Result};

// ============== Timestamp Helpers ==============

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Parse an ISO 8601 timestamp given on the command line.
///
/// Offsets are honoured; naive values are taken as UTC; a bare date means
/// midnight.
pub fn parse_iso_timestamp(value: &str) -> Result<DateTime<Utc>> {
    let s = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(naive.and_utc());
        }
    }
    if let Some(midnight) = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
    {
        return Ok(midnight.and_utc());
    }

    Err(Error::InvalidInput(
        "Invalid date format. Use ISO 8601 (YYYY-MM-DDTHH:MM:SS)".to_string(),
    ))
}

/// RFC3339 rendering used in every JSON document (`+00:00` offset).
pub fn iso_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

// ============== File Name Helpers ==============

/// Keep `[A-Za-z0-9._-]`, replace everything else with `_`.
pub fn sanitize_filename(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-') {
            out.push(ch);
        } else {
            out.push('_');
        }
    }
    // "." and ".." would escape the output directory.
    if out.is_empty() || out.chars().all(|c| c == '.') {
        "media".to_string()
    } else {
        out
    }
}
