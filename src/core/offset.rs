//! The user-adjustable time offset between the primary and overlay streams.
//!
//! The overlay runs ahead of the primary: for a primary position `t` the
//! overlay is positioned at `max(0, t + offset)`.

use std::fmt;

use crate::core::time::{self, Time};

/// Largest offset the user may select, in seconds.
pub const MAX_OFFSET_SECONDS: f64 = 20.0;

/// Offset granularity (0.1s).
pub const OFFSET_STEP: Time = 100 * time::constants::NANOS_PER_MILLI;

/// Error type for offset input
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OffsetError {
    #[error("offset is not a number: {input:?} (keeping {revert_to})")]
    InvalidInput {
        input: String,
        revert_to: PlaybackOffset,
    },
}

/// Offset in the range `[0, 20]` seconds, quantized to 0.1s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PlaybackOffset(Time);

impl PlaybackOffset {
    pub const ZERO: PlaybackOffset = PlaybackOffset(0);
    pub const MAX: PlaybackOffset = PlaybackOffset(20 * time::constants::NANOS_PER_SECOND);

    /// Build an offset from seconds, clamping into range and snapping to the
    /// nearest 0.1s step. Non-finite values collapse to zero.
    pub fn from_seconds(seconds: f64) -> Self {
        let seconds = if seconds.is_finite() {
            seconds.clamp(0.0, MAX_OFFSET_SECONDS)
        } else {
            0.0
        };
        let steps = (seconds * 10.0).round() as Time;
        PlaybackOffset(steps * OFFSET_STEP)
    }

    /// Parse free-form user text. Anything non-numeric is rejected and the
    /// caller keeps `current`.
    pub fn parse_or_revert(input: &str, current: PlaybackOffset) -> Result<Self, OffsetError> {
        match input.trim().parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(Self::from_seconds(value)),
            _ => Err(OffsetError::InvalidInput {
                input: input.to_string(),
                revert_to: current,
            }),
        }
    }

    pub fn as_time(self) -> Time {
        self.0
    }

    pub fn as_seconds(self) -> f64 {
        time::to_seconds(self.0)
    }

    /// Overlay position for a given primary position. Never negative.
    pub fn overlay_target(self, primary: Time) -> Time {
        time::clamp_non_negative(primary.saturating_add(self.0))
    }
}

impl fmt::Display for PlaybackOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}s", self.as_seconds())
    }
}
