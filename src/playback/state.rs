//! Controller state machine and the display snapshot.

use crate::core::time::{Time, ZERO};

/// Lifecycle of a managed primary/overlay pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerState {
    /// No source attached
    #[default]
    Idle,
    /// Backends constructed; playing or paused
    Attached { playing: bool },
}

impl ControllerState {
    pub fn is_attached(&self) -> bool {
        matches!(self, ControllerState::Attached { .. })
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, ControllerState::Attached { playing: true })
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, ControllerState::Idle)
    }
}

/// Whether the duration of the current source is known
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DurationStatus {
    #[default]
    Pending,
    Resolved,
    /// Resolution failed; shown as unknown
    Unavailable,
}

/// What the transport display shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub primary_time: Time,
    /// Zero until resolved
    pub duration: Time,
    pub duration_status: DurationStatus,
}

impl PlaybackState {
    /// Record a resolved duration. The first resolution wins and a known
    /// duration never goes back to zero.
    pub fn resolve_duration(&mut self, duration: Time) -> bool {
        if self.duration_status == DurationStatus::Resolved || duration <= ZERO {
            return false;
        }
        self.duration = duration;
        self.duration_status = DurationStatus::Resolved;
        true
    }

    pub fn mark_duration_unavailable(&mut self) -> bool {
        if self.duration_status != DurationStatus::Pending {
            return false;
        }
        self.duration_status = DurationStatus::Unavailable;
        true
    }
}
