use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};

/// Payment completion time as reported by the notify URL.
pub type Timestamp = DateTime<FixedOffset>;

pub type TimeParseError = Box<dyn std::error::Error + Send + Sync>;

/// Parser for the `time_end` parameter.
pub type TimeParser = fn(&str) -> Result<Timestamp, TimeParseError>;

/// `time_end` layout, e.g. `20090415103000`.
pub const TIME_FORMAT: &str = "%Y%m%d%H%M%S";

const BEIJING_UTC_OFFSET_SECS: i32 = 8 * 3600;

/// Parse a `yyyyMMddHHmmss` time in Beijing time (UTC+08:00).
pub fn parse_time(value: &str) -> Result<Timestamp, TimeParseError> {
    let naive = NaiveDateTime::parse_from_str(value, TIME_FORMAT)?;
    let beijing =
        FixedOffset::east_opt(BEIJING_UTC_OFFSET_SECS).ok_or("invalid UTC+08:00 offset")?;
    beijing
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(|| format!("ambiguous local time: {value}").into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike, Utc};

    #[test]
    fn test_parse_time_valid() {
        let t = parse_time("20090415103059").unwrap();
        assert_eq!((t.year(), t.month(), t.day()), (2009, 4, 15));
        assert_eq!((t.hour(), t.minute(), t.second()), (10, 30, 59));
        assert_eq!(t.offset().local_minus_utc(), 8 * 3600);
    }

    #[test]
    fn test_parse_time_is_beijing_time() {
        let t = parse_time("20090101000000").unwrap();
        let utc = t.with_timezone(&Utc);
        assert_eq!((utc.year(), utc.month(), utc.day()), (2008, 12, 31));
        assert_eq!(utc.hour(), 16);
    }

    #[test]
    fn test_parse_time_rejects_other_layouts() {
        assert!(parse_time("2009-01-01 00:00:00").is_err());
        assert!(parse_time("20090101").is_err());
        assert!(parse_time("20091301000000").is_err());
        assert!(parse_time("").is_err());
    }
}
