//! Wire Timestamps
//!
//! Written as ISO-8601 UTC with millisecond precision. Read back as either
//! RFC 3339 or RFC 2822 (the authority echoes stored datetimes as HTTP-dates,
//! e.g. `Mon, 19 Oct 2026 11:51:00 GMT`).

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serializer};

pub fn format(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc3339(raw)
        .or_else(|_| DateTime::parse_from_rfc2822(raw))
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
}

pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format(ts))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", raw)))
}

pub mod option {
    use super::*;

    pub fn serialize<S: Serializer>(ts: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error> {
        match ts {
            Some(ts) => serializer.serialize_str(&super::format(ts)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(s) if s.trim().is_empty() => Ok(None),
            Some(s) => super::parse(&s)
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {}", s))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_matches_iso_instant() {
        let ts = Utc.with_ymd_and_hms(2026, 10, 19, 11, 51, 0).unwrap();
        assert_eq!(format(&ts), "2026-10-19T11:51:00.000Z");
    }

    #[test]
    fn test_parse_accepts_http_date() {
        let expected = Utc.with_ymd_and_hms(2026, 10, 19, 11, 51, 0).unwrap();
        assert_eq!(parse("Mon, 19 Oct 2026 11:51:00 GMT"), Some(expected));
        assert_eq!(parse("2026-10-19T11:51:00.000Z"), Some(expected));
        assert_eq!(parse("yesterday"), None);
    }
}
