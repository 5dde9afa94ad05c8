//! Time representation shared by both playback backends.
//! All positions are nanoseconds (i64); user-facing values are seconds (f64).

use std::time::Duration;

/// Time in nanoseconds from the start of the media
pub type Time = i64;

/// Time constants for conversions
pub mod constants {
    use super::Time;

    pub const NANOS_PER_SECOND: Time = 1_000_000_000;
    pub const NANOS_PER_MILLI: Time = 1_000_000;
}

/// Time zero constant
pub const ZERO: Time = 0;

/// Convert seconds (f64) to nanoseconds, rounding to the nearest nanosecond.
/// Non-finite input maps to zero.
#[inline]
pub fn from_seconds(seconds: f64) -> Time {
    if !seconds.is_finite() {
        return ZERO;
    }
    (seconds * constants::NANOS_PER_SECOND as f64).round() as Time
}

/// Convert nanoseconds to seconds (f64)
#[inline]
pub fn to_seconds(nanos: Time) -> f64 {
    nanos as f64 / constants::NANOS_PER_SECOND as f64
}

/// Convert milliseconds to nanoseconds
#[inline]
pub fn from_millis(millis: i64) -> Time {
    millis * constants::NANOS_PER_MILLI
}

/// Convert a wall-clock duration to nanoseconds, saturating at `Time::MAX`.
#[inline]
pub fn from_duration(duration: Duration) -> Time {
    Time::try_from(duration.as_nanos()).unwrap_or(Time::MAX)
}

/// Clamp a position so it never goes before the start of the media.
#[inline]
pub fn clamp_non_negative(time: Time) -> Time {
    time.max(ZERO)
}

/// Whole seconds, rounded down. Embedded players only accept integer start positions.
#[inline]
pub fn whole_seconds(time: Time) -> u64 {
    (clamp_non_negative(time) / constants::NANOS_PER_SECOND) as u64
}

/// Format time as M:SS for the transport display
pub fn format_time(nanos: Time) -> String {
    let total = whole_seconds(nanos);
    format!("{}:{:02}", total / 60, total % 60)
}
