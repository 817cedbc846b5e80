//! Utility functions for rendezvous

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::time::Duration;

/// Percent-encoding set for keys used as a single path segment
const KEY_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b'/')
    .add(b'%')
    .add(b' ')
    .add(b'?')
    .add(b'#')
    .add(b'&');

/// Encode a key so it fits in one URL path segment.
///
/// The controller stores the segment as sent, so a key containing any of
/// these characters is listed in its encoded form.
pub fn encode_key(key: &str) -> String {
    utf8_percent_encode(key, KEY_ENCODE_SET).to_string()
}

/// Extract the key addressed by a request path.
///
/// Only the first segment counts and it is taken verbatim, without
/// percent-decoding: `/a/b` addresses `a`, `/%41` addresses `%41`, and `/`
/// and `//x` address the empty key.
pub fn key_from_path(path: &str) -> String {
    path.split('/').nth(1).unwrap_or_default().to_string()
}

/// Parse duration string (e.g., "500ms", "30s", "5m", "1h", "7d")
pub fn parse_duration(s: &str) -> crate::Result<Duration> {
    let s = s.trim();
    if s.is_empty() {
        return Err(crate::Error::InvalidConfig("empty duration".into()));
    }

    let (num_str, unit) = match s.strip_suffix("ms") {
        Some(num) => (num, "ms"),
        None => s.split_at(s.len() - s.chars().last().map_or(0, char::len_utf8)),
    };

    let num: u64 = num_str
        .parse()
        .map_err(|_| crate::Error::InvalidConfig(format!("invalid duration: {}", s)))?;

    let secs_per_unit = match unit {
        "ms" => return Ok(Duration::from_millis(num)),
        "s" => 1,
        "m" => 60,
        "h" => 3600,
        "d" => 86400,
        _ => {
            return Err(crate::Error::InvalidConfig(format!(
                "unknown duration unit: {}",
                unit
            )))
        }
    };

    num.checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| crate::Error::InvalidConfig(format!("duration out of range: {}", s)))
}
