// Timestamp rendering for Doris DATETIME(6) columns

use chrono::{DateTime, FixedOffset};

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

/// Render unix nanoseconds as `YYYY-MM-DD HH:MM:SS.ffffff` in `offset`.
pub fn format_timestamp(unix_nanos: u64, offset: &FixedOffset) -> String {
    let nanos = i64::try_from(unix_nanos).unwrap_or(i64::MAX);
    DateTime::from_timestamp_nanos(nanos)
        .with_timezone(offset)
        .format(DATETIME_FORMAT)
        .to_string()
}

/// Microseconds between two unix-nanosecond timestamps, zero when inverted.
pub fn duration_micros(start_nanos: u64, end_nanos: u64) -> i64 {
    let micros = end_nanos.saturating_sub(start_nanos) / 1_000;
    i64::try_from(micros).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp_utc() {
        let utc = FixedOffset::east_opt(0).unwrap();
        // 2024-01-15 14:30:00.123456789 UTC
        assert_eq!(
            format_timestamp(1_705_329_000_123_456_789, &utc),
            "2024-01-15 14:30:00.123456"
        );
        assert_eq!(format_timestamp(0, &utc), "1970-01-01 00:00:00.000000");
    }

    #[test]
    fn test_format_timestamp_with_offset() {
        let shanghai = FixedOffset::east_opt(8 * 3600).unwrap();
        assert_eq!(
            format_timestamp(1_705_329_000_000_000_000, &shanghai),
            "2024-01-15 22:30:00.000000"
        );
    }

    #[test]
    fn test_duration_micros() {
        assert_eq!(duration_micros(1_000_000, 61_000_000), 60_000);
        assert_eq!(duration_micros(10, 5), 0);
    }
}
