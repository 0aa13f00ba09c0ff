//! RFC 3339 timestamp helpers
//!
//! All persisted timestamps are RFC 3339 strings in UTC with second
//! precision, so string comparison agrees with chronological order.

use chrono::{SecondsFormat, Utc};

/// The current time as an RFC 3339 UTC string
pub fn now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Whether a string parses as an RFC 3339 timestamp
pub fn is_valid(s: &str) -> bool {
    chrono::DateTime::parse_from_rfc3339(s).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_is_valid_rfc3339() {
        let ts = now();
        assert!(is_valid(&ts));
        assert!(ts.ends_with('Z'));
    }

    #[test]
    fn test_is_valid() {
        assert!(is_valid("2025-01-01T00:00:00Z"));
        assert!(is_valid("2025-01-01T00:00:00.123Z"));
        assert!(!is_valid("yesterday"));
        assert!(!is_valid(""));
    }

    #[test]
    fn test_lexicographic_order_matches_time_order() {
        assert!("2025-01-01T00:00:00Z" < "2025-01-02T00:00:00Z");
        assert!("2025-01-01T09:00:00Z" < "2025-01-01T10:00:00Z");
    }
}
