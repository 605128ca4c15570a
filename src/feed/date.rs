//! RFC3339 timestamps with an explicit UTC offset suffix.

use chrono::{DateTime, Local, Offset, TimeZone, Utc};
use std::fmt::Display;

/// Formats an instant in its own zone as `YYYY-MM-DDTHH:mm:ss` followed by
/// `Z` for a zero offset or `±HH:MM` otherwise.
///
/// The offset is the zone's total offset at that instant (base offset plus
/// any daylight-saving adjustment), truncated to whole minutes. Fractional
/// seconds are not emitted.
pub fn rfc3339<Tz>(instant: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let offset_minutes = instant.offset().fix().local_minus_utc() / 60;
    let wall_clock = instant.format("%Y-%m-%dT%H:%M:%S");

    if offset_minutes == 0 {
        return format!("{wall_clock}Z");
    }

    let sign = if offset_minutes > 0 { '+' } else { '-' };
    let magnitude = offset_minutes.unsigned_abs();
    format!(
        "{wall_clock}{sign}{:02}:{:02}",
        magnitude / 60,
        magnitude % 60
    )
}

/// Formats an instant in the process's local time zone.
pub fn rfc3339_local(instant: DateTime<Utc>) -> String {
    rfc3339(&instant.with_timezone(&Local))
}
