//! Duration parsing for application timeouts.
//!
//! Timeouts are written the way operators write them in YAML: `"800ms"`,
//! `"5s"`, `"1m30s"`. A bare integer is read as seconds.

use std::time::Duration;

use serde::{Deserialize, Deserializer};

/// Parses a duration string made of one or more `<number><unit>` pairs.
///
/// Supported units are `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`. Numbers may
/// carry a fractional part (`"1.5s"`). A lone `"0"` is accepted.
///
/// # Errors
///
/// Returns a description of the problem if the string is empty, contains an
/// unknown unit, or a number without a unit.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let s = input.trim();
    if s.is_empty() {
        return Err("empty duration".to_string());
    }
    if s == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total_nanos: f64 = 0.0;
    let mut rest = s;
    while !rest.is_empty() {
        let number_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if number_len == 0 {
            return Err(format!("invalid duration {input:?}: expected a number"));
        }
        let value: f64 = rest[..number_len]
            .parse()
            .map_err(|_| format!("invalid duration {input:?}: bad number"))?;
        rest = &rest[number_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let unit_nanos = match &rest[..unit_len] {
            "ns" => 1.0,
            "us" | "µs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60.0 * 1e9,
            "h" => 3600.0 * 1e9,
            "" => return Err(format!("invalid duration {input:?}: missing unit")),
            unit => return Err(format!("invalid duration {input:?}: unknown unit {unit:?}")),
        };
        rest = &rest[unit_len..];
        total_nanos += value * unit_nanos;
    }

    Ok(Duration::from_nanos(total_nanos.round() as u64))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimeout {
    Seconds(u64),
    Text(String),
}

/// Serde adapter for the optional `timeout` field of an application.
pub(crate) fn deserialize_timeout<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<RawTimeout>::deserialize(deserializer)? {
        None => Ok(None),
        Some(RawTimeout::Seconds(secs)) => Ok(Some(Duration::from_secs(secs))),
        Some(RawTimeout::Text(text)) => parse_duration(&text)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
