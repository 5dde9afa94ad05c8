//! Offset and synchronization controller for a primary/overlay pair.
//!
//! The primary is authoritative: every seek goes to the primary first and
//! then to the overlay at `max(0, time + offset)`. Primary time updates only
//! refresh the displayed position; the overlay free-runs between explicit
//! seeks so a reload-based backend is not re-seeked on every tick.

use std::sync::Arc;
use std::time::Instant;

use crossbeam::channel::{self, Receiver, Sender};

use crate::backend::{
    BackendError, BackendEvent, BackendFactory, BackendInit, EventSink, MediaEvent,
    PlaybackBackend, Slot, SlotEvent,
};
use crate::config::SyncSettings;
use crate::core::clock::Clock;
use crate::core::offset::{OffsetError, PlaybackOffset};
use crate::core::source::{SourceError, VideoSource};
use crate::core::time::{self, Time, ZERO};
use crate::playback::state::{ControllerState, PlaybackState};

/// Error type for controller operations
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("Failed to construct primary backend: {0}")]
    Backend(#[from] BackendError),
    #[error(transparent)]
    Offset(#[from] OffsetError),
}

/// Synchronization controller
pub struct SyncController {
    factory: Box<dyn BackendFactory>,
    clock: Arc<dyn Clock>,
    autoplay: bool,
    state: ControllerState,
    playback: PlaybackState,
    offset: PlaybackOffset,
    overlay_visible: bool,
    source: Option<VideoSource>,
    primary: Option<Box<dyn PlaybackBackend>>,
    overlay: Option<Box<dyn PlaybackBackend>>,
    /// Bumped on every teardown so late events from old backends are dropped
    generation: u64,
    events_tx: Sender<SlotEvent>,
    events_rx: Receiver<SlotEvent>,
}

impl SyncController {
    /// Create a new controller with no source attached
    pub fn new(
        factory: Box<dyn BackendFactory>,
        clock: Arc<dyn Clock>,
        settings: &SyncSettings,
    ) -> Self {
        let (events_tx, events_rx) = channel::unbounded();
        Self {
            factory,
            clock,
            autoplay: settings.autoplay,
            state: ControllerState::Idle,
            playback: PlaybackState::default(),
            offset: PlaybackOffset::from_seconds(settings.default_offset),
            overlay_visible: true,
            source: None,
            primary: None,
            overlay: None,
            generation: 0,
            events_tx,
            events_rx,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Values for display
    pub fn snapshot(&self) -> PlaybackState {
        self.playback
    }

    pub fn offset(&self) -> PlaybackOffset {
        self.offset
    }

    pub fn source(&self) -> Option<&VideoSource> {
        self.source.as_ref()
    }

    pub fn is_overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    pub fn has_overlay(&self) -> bool {
        self.overlay.is_some()
    }

    /// Best-effort live position of a slot's backend
    pub fn position(&self, slot: Slot) -> Option<Time> {
        self.backend(slot).map(|b| b.current_time())
    }

    fn backend(&self, slot: Slot) -> Option<&dyn PlaybackBackend> {
        match slot {
            Slot::Primary => self.primary.as_deref(),
            Slot::Overlay => self.overlay.as_deref(),
        }
    }

    fn backend_mut(&mut self, slot: Slot) -> Option<&mut (dyn PlaybackBackend + 'static)> {
        match slot {
            Slot::Primary => self.primary.as_deref_mut(),
            Slot::Overlay => self.overlay.as_deref_mut(),
        }
    }

    /// Replace the current source.
    pub fn on_source_change(&mut self, locator: &str) -> Result<(), SyncError> {
        self.on_source_change_at(locator, ZERO)
    }

    /// Replace the current source, starting no earlier than `requested`.
    /// A deep-linked start later than `requested` wins.
    pub fn on_source_change_at(&mut self, locator: &str, requested: Time) -> Result<(), SyncError> {
        let classified = VideoSource::classify(locator);
        self.teardown();
        self.source = None;

        let source = match classified {
            Ok(source) => source,
            Err(err) => {
                tracing::warn!(error = %err, "source cleared");
                return Err(err.into());
            }
        };
        self.attach(source, requested)
    }

    fn sink(&self, slot: Slot) -> EventSink {
        EventSink::new(slot, self.generation, self.events_tx.clone())
    }

    fn attach(&mut self, source: VideoSource, requested: Time) -> Result<(), SyncError> {
        let start = source.start_position(requested);
        let primary_sink = self.sink(Slot::Primary);
        let overlay_sink = self.sink(Slot::Overlay);

        let primary = self.factory.create(
            &source,
            BackendInit {
                slot: Slot::Primary,
                start,
                sink: primary_sink,
            },
        )?;
        self.primary = Some(primary);
        self.playback.primary_time = start;

        let overlay_start = self.offset.overlay_target(start);
        match self.factory.create(
            &source,
            BackendInit {
                slot: Slot::Overlay,
                start: overlay_start,
                sink: overlay_sink,
            },
        ) {
            Ok(overlay) => self.overlay = Some(overlay),
            Err(err) => {
                tracing::warn!(error = %err, "overlay unavailable for this source");
            }
        }

        tracing::info!(
            kind = %source.kind(),
            start = time::to_seconds(start),
            overlay = self.overlay.is_some(),
            "source attached"
        );
        self.source = Some(source);
        self.state = ControllerState::Attached { playing: false };
        if self.autoplay {
            self.set_playing(true);
        }
        Ok(())
    }

    /// Destroy primary then overlay and return to idle.
    fn teardown(&mut self) {
        if let Some(mut primary) = self.primary.take() {
            primary.destroy();
        }
        if let Some(mut overlay) = self.overlay.take() {
            overlay.destroy();
        }
        if self.state.is_attached() {
            tracing::debug!(generation = self.generation, "backends torn down");
        }
        self.generation += 1;
        self.state = ControllerState::Idle;
        self.playback = PlaybackState::default();
        while self.events_rx.try_recv().is_ok() {}
    }

    /// Unmount: release every backend.
    pub fn detach(&mut self) {
        self.teardown();
        self.source = None;
    }

    /// Flip play/pause on both backends. Returns the new playing state.
    pub fn on_play_pause_toggle(&mut self) -> bool {
        match self.state {
            ControllerState::Idle => {
                tracing::debug!("play/pause ignored: no source");
                false
            }
            ControllerState::Attached { playing } => {
                self.set_playing(!playing);
                !playing
            }
        }
    }

    /// Fan play or pause out to primary then overlay.
    pub fn set_playing(&mut self, playing: bool) {
        if self.state.is_idle() {
            return;
        }
        for slot in [Slot::Primary, Slot::Overlay] {
            if let Some(backend) = self.backend_mut(slot) {
                if playing {
                    backend.play();
                } else {
                    backend.pause();
                }
            }
        }
        self.state = ControllerState::Attached { playing };
        self.playback.is_playing = playing;
    }

    /// Seek both backends; the overlay lands at the offset target.
    pub fn on_scrub(&mut self, requested: Time) {
        if self.state.is_idle() {
            return;
        }
        let mut target = time::clamp_non_negative(requested);
        if self.playback.duration > ZERO {
            target = target.min(self.playback.duration);
        }
        self.playback.primary_time = target;

        let overlay_target = self.offset.overlay_target(target);
        if let Some(primary) = self.primary.as_deref_mut() {
            primary.seek_to(target);
        }
        if let Some(overlay) = self.overlay.as_deref_mut() {
            overlay.seek_to(overlay_target);
        }
    }

    /// Apply a new offset in seconds (clamped and snapped to 0.1s).
    pub fn on_offset_change(&mut self, seconds: f64) -> PlaybackOffset {
        self.apply_offset(PlaybackOffset::from_seconds(seconds));
        self.offset
    }

    /// Apply an offset typed by the user. Non-numeric text leaves the
    /// current offset in place.
    pub fn on_offset_input(&mut self, input: &str) -> Result<PlaybackOffset, SyncError> {
        match PlaybackOffset::parse_or_revert(input, self.offset) {
            Ok(offset) => {
                self.apply_offset(offset);
                Ok(offset)
            }
            Err(err) => {
                tracing::debug!(error = %err, "offset input rejected");
                Err(err.into())
            }
        }
    }

    fn apply_offset(&mut self, offset: PlaybackOffset) {
        if offset == self.offset {
            return;
        }
        self.offset = offset;
        if !self.state.is_attached() {
            return;
        }
        let target = offset.overlay_target(self.playback.primary_time);
        if let Some(overlay) = self.overlay.as_deref_mut() {
            overlay.seek_to(target);
        }
    }

    /// Show or hide the overlay. The overlay backend keeps running either way.
    pub fn on_visibility_toggle(&mut self, visible: bool) {
        self.overlay_visible = visible;
    }

    /// Forward a native media element event to the slot's backend.
    pub fn on_media_event(&mut self, slot: Slot, event: MediaEvent) {
        if let Some(backend) = self.backend_mut(slot) {
            backend.on_media_event(event);
        }
        self.drain_events();
    }

    /// Give backends a turn, then apply queued events in order.
    pub fn poll(&mut self, now: Instant) {
        if let Some(primary) = self.primary.as_deref_mut() {
            primary.poll(now);
        }
        if let Some(overlay) = self.overlay.as_deref_mut() {
            overlay.poll(now);
        }
        self.drain_events();
    }

    /// Poll using the controller's own clock.
    pub fn tick(&mut self) {
        let now = self.clock.now();
        self.poll(now);
    }

    fn drain_events(&mut self) {
        while let Ok(tagged) = self.events_rx.try_recv() {
            self.apply_event(tagged);
        }
    }

    fn apply_event(&mut self, tagged: SlotEvent) {
        if tagged.generation != self.generation {
            tracing::debug!(
                slot = %tagged.slot,
                event = ?tagged.event,
                "dropping event from a replaced backend"
            );
            return;
        }
        match (tagged.slot, tagged.event) {
            (Slot::Primary, BackendEvent::TimeUpdate(t)) => self.playback.primary_time = t,
            (Slot::Overlay, BackendEvent::TimeUpdate(_)) => {}
            (slot, BackendEvent::DurationResolved(duration)) => {
                if self.playback.resolve_duration(duration) {
                    tracing::debug!(
                        %slot,
                        duration = time::to_seconds(duration),
                        "duration resolved"
                    );
                }
            }
            (slot, BackendEvent::DurationUnavailable) => {
                if self.playback.mark_duration_unavailable() {
                    tracing::warn!(%slot, "duration unavailable for this source");
                }
            }
        }
    }
}

impl Drop for SyncController {
    fn drop(&mut self) {
        self.teardown();
    }
}
