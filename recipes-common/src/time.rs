//! Timestamp utilities

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};

use crate::{Error, Result};

/// Get current UTC timestamp, truncated to millisecond precision
///
/// Stored timestamps keep milliseconds, so a freshly created recipe
/// compares equal to the same recipe read back from the database.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Format a timestamp for storage (RFC 3339, UTC, `Z` suffix)
pub fn to_storage(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse a stored RFC 3339 timestamp
pub fn from_storage(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| Error::Corrupt(format!("invalid timestamp '{}': {}", value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use std::time::Duration;

    #[test]
    fn test_now_returns_valid_timestamp() {
        let timestamp = now();
        // Should be a reasonable timestamp (after year 2000)
        assert!(timestamp.timestamp() > 946_684_800); // 2000-01-01 00:00:00 UTC
    }

    #[test]
    fn test_now_is_millisecond_precision() {
        let timestamp = now();
        assert_eq!(timestamp.nanosecond() % 1_000_000, 0);
    }

    #[tokio::test]
    async fn test_now_successive_calls_advance() {
        let time1 = now();
        tokio::time::sleep(Duration::from_millis(10)).await;
        let time2 = now();
        assert!(time2 > time1);
    }

    #[test]
    fn test_storage_format_round_trips() {
        let timestamp = now();
        let stored = to_storage(&timestamp);
        assert!(stored.ends_with('Z'));
        assert_eq!(from_storage(&stored).unwrap(), timestamp);
    }

    #[test]
    fn test_from_storage_rejects_garbage() {
        let err = from_storage("yesterday").unwrap_err();
        assert!(matches!(err, Error::Corrupt(_)));
    }
}
