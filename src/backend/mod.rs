//! Playable backend contract shared by local and remote players.
//!
//! Backends never talk to the controller directly: they publish
//! [`BackendEvent`]s through an [`EventSink`] into the controller's single
//! event queue, which is drained in queue order.

pub mod factory;
pub mod local;
pub mod remote;

use std::fmt;
use std::time::Instant;

use crossbeam::channel::Sender;

use crate::core::source::VideoSource;
use crate::core::time::Time;

pub use factory::{HostBackendFactory, MediaHost};
pub use local::{LocalBackend, MediaElement};
pub use remote::RemoteBackend;

/// Which half of the managed pair a backend plays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Primary,
    Overlay,
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Primary => write!(f, "primary"),
            Slot::Overlay => write!(f, "overlay"),
        }
    }
}

/// Backend family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Local,
    Remote,
}

/// Notification published by a backend
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackendEvent {
    /// Current position changed (native event or clock tick)
    TimeUpdate(Time),
    /// Duration became known; published at most once per backend
    DurationResolved(Time),
    /// Duration will never be known for this backend instance
    DurationUnavailable,
}

/// Native media element notification, forwarded by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaEvent {
    TimeChanged,
    MetadataLoaded,
}

/// Event tagged with the slot and attach generation that produced it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotEvent {
    pub slot: Slot,
    pub generation: u64,
    pub event: BackendEvent,
}

/// Sending half of the controller's event queue, bound to one backend.
#[derive(Debug, Clone)]
pub struct EventSink {
    slot: Slot,
    generation: u64,
    tx: Sender<SlotEvent>,
}

impl EventSink {
    pub fn new(slot: Slot, generation: u64, tx: Sender<SlotEvent>) -> Self {
        Self { slot, generation, tx }
    }

    pub fn slot(&self) -> Slot {
        self.slot
    }

    pub fn publish(&self, event: BackendEvent) {
        let tagged = SlotEvent {
            slot: self.slot,
            generation: self.generation,
            event,
        };
        if self.tx.send(tagged).is_err() {
            tracing::trace!(slot = %self.slot, ?event, "event queue closed; dropping event");
        }
    }
}

/// Error type for backend construction
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("No media element available for the {0} slot")]
    NoMediaElement(Slot),
    #[error("No embedding surface available for the {0} slot")]
    NoSurface(Slot),
    #[error("Host error: {0}")]
    Host(String),
}

/// Uniform playback contract. Positions are best-effort: a remote backend
/// reports a clock estimate, not ground truth.
pub trait PlaybackBackend {
    fn kind(&self) -> BackendKind;

    /// Begin or resume playback. No-op when already playing.
    fn play(&mut self);

    /// Stop playback. No-op when already paused.
    fn pause(&mut self);

    /// Move the playback position. The caller clamps `time` to `>= 0`.
    fn seek_to(&mut self, time: Time);

    fn current_time(&self) -> Time;

    /// Zero until resolved.
    fn duration(&self) -> Time;

    fn is_playing(&self) -> bool;

    /// Cooperative turn for timer-driven work.
    fn poll(&mut self, _now: Instant) {}

    fn on_media_event(&mut self, _event: MediaEvent) {}

    /// Release external instances. Safe to call more than once.
    fn destroy(&mut self);
}

/// Parameters for constructing a backend in a slot
#[derive(Debug, Clone)]
pub struct BackendInit {
    pub slot: Slot,
    /// Initial position
    pub start: Time,
    pub sink: EventSink,
}

/// Builds backends for a source. The controller destroys the previous
/// occupant of a slot before asking for its replacement.
pub trait BackendFactory {
    fn create(
        &mut self,
        source: &VideoSource,
        init: BackendInit,
    ) -> Result<Box<dyn PlaybackBackend>, BackendError>;
}
