use crate::Result;

use jiff::{civil, tz::TimeZone, Timestamp};

/// Formats a timestamp the way it is stored in text columns: RFC 3339 in UTC
/// with microsecond precision, so lexical and chronological order agree.
pub fn format_time(ts: Timestamp) -> String {
    format!("{ts:.6}")
}

/// Parses an RFC 3339 timestamp. A civil datetime without an offset (as
/// stored by databases without time zone support) is interpreted as UTC.
pub fn parse_time(s: &str) -> Result<Timestamp> {
    if let Ok(ts) = s.parse::<Timestamp>() {
        return Ok(ts);
    }

    let datetime: civil::DateTime = s.trim().parse()?;
    Ok(datetime.to_zoned(TimeZone::UTC)?.timestamp())
}
