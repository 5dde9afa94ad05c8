//! Playback engine: hosts a [`SyncController`] on an async task.
//! UI commands arrive over a tokio channel; backends get a poll turn on a
//! fixed interval and every visible state change is sent back as a response.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::backend::{HostBackendFactory, MediaEvent, MediaHost, Slot};
use crate::config::Settings;
use crate::core::clock::{Clock, SystemClock};
use crate::core::offset::PlaybackOffset;
use crate::core::time::Time;
use crate::playback::state::PlaybackState;
use crate::playback::sync::{SyncController, SyncError};

/// Command sent to playback engine
#[derive(Debug, Clone)]
pub enum PlaybackCommand {
    SourceChange(String),
    PlayPauseToggle,
    Scrub(Time),
    OffsetChange(f64),
    /// Raw text from the offset field
    OffsetInput(String),
    VisibilityToggle(bool),
    MediaEvent(Slot, MediaEvent),
    Shutdown,
}

/// Response from playback engine
#[derive(Debug, Clone)]
pub enum PlaybackResponse {
    StateChanged(PlaybackState),
    OffsetChanged(PlaybackOffset),
    VisibilityChanged(bool),
    Error(String),
}

/// Error type for playback engine
#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("Sync error: {0}")]
    Sync(#[from] SyncError),
}

/// Main playback engine
pub struct PlaybackEngine {
    controller: SyncController,
    poll_interval: Duration,
    last_state: PlaybackState,
}

impl PlaybackEngine {
    /// Create a new playback engine
    pub fn new(controller: SyncController, poll_interval: Duration) -> Self {
        let last_state = controller.snapshot();
        Self {
            controller,
            poll_interval,
            last_state,
        }
    }

    /// Build an engine over `host` on the process clock, configured by
    /// `settings`.
    pub fn from_settings<H: MediaHost + 'static>(host: H, settings: &Settings) -> Self {
        Self::from_settings_with_clock(host, settings, Arc::new(SystemClock))
    }

    pub fn from_settings_with_clock<H: MediaHost + 'static>(
        host: H,
        settings: &Settings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let factory = HostBackendFactory::new(
            host,
            clock.clone(),
            settings.remote_options(Slot::Primary),
            settings.remote_options(Slot::Overlay),
        );
        let controller = SyncController::new(Box::new(factory), clock, &settings.sync);
        Self::new(controller, settings.sync.poll_interval())
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn controller(&self) -> &SyncController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut SyncController {
        &mut self.controller
    }

    /// Process a playback command. `Shutdown` is handled by [`run`](Self::run).
    pub fn process_command(
        &mut self,
        command: PlaybackCommand,
        responses: &mpsc::UnboundedSender<PlaybackResponse>,
    ) -> Result<(), PlaybackError> {
        match command {
            PlaybackCommand::SourceChange(locator) => {
                self.controller.on_source_change(&locator)?;
            }
            PlaybackCommand::PlayPauseToggle => {
                self.controller.on_play_pause_toggle();
            }
            PlaybackCommand::Scrub(position) => {
                self.controller.on_scrub(position);
            }
            PlaybackCommand::OffsetChange(seconds) => {
                let offset = self.controller.on_offset_change(seconds);
                let _ = responses.send(PlaybackResponse::OffsetChanged(offset));
            }
            PlaybackCommand::OffsetInput(text) => {
                let result = self.controller.on_offset_input(&text);
                // the field shows whatever offset is in effect, reverted or not
                let _ = responses.send(PlaybackResponse::OffsetChanged(self.controller.offset()));
                result?;
            }
            PlaybackCommand::VisibilityToggle(visible) => {
                self.controller.on_visibility_toggle(visible);
                let _ = responses.send(PlaybackResponse::VisibilityChanged(visible));
            }
            PlaybackCommand::MediaEvent(slot, event) => {
                self.controller.on_media_event(slot, event);
            }
            PlaybackCommand::Shutdown => {}
        }
        Ok(())
    }

    fn publish_state(&mut self, responses: &mpsc::UnboundedSender<PlaybackResponse>) {
        let state = self.controller.snapshot();
        if state != self.last_state {
            self.last_state = state;
            let _ = responses.send(PlaybackResponse::StateChanged(state));
        }
    }

    /// Run until `Shutdown` arrives or the command channel closes, then
    /// release both backends.
    pub async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<PlaybackCommand>,
        responses: mpsc::UnboundedSender<PlaybackResponse>,
    ) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::debug!(poll_ms = self.poll_interval.as_millis() as u64, "playback engine started");

        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    None | Some(PlaybackCommand::Shutdown) => break,
                    Some(command) => {
                        if let Err(err) = self.process_command(command, &responses) {
                            tracing::warn!(error = %err, "command failed");
                            let _ = responses.send(PlaybackResponse::Error(err.to_string()));
                        }
                    }
                },
                _ = ticker.tick() => self.controller.tick(),
            }
            self.publish_state(&responses);
        }

        self.controller.detach();
        self.publish_state(&responses);
        tracing::debug!("playback engine stopped");
    }
}
