//! Duration probe: a hidden player instance used only to read the duration.
//!
//! Construction is a bounded retry state machine. The platform API may not
//! have loaded yet, so construction is retried on a fixed interval until the
//! attempt budget runs out. Callbacks are tagged with the element id they
//! were created for and are dropped unless that instance is still active.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam::channel::{self, Receiver, Sender};

use super::embed::{EmbedPlatform, ProbeCallback, ProbeEvent, ProbeInstance, ProbeRequest};
use crate::backend::{BackendEvent, EventSink};
use crate::core::time::{Time, ZERO};

const ELEMENT_PREFIX: &str = "yt-probe";

static NEXT_ELEMENT: AtomicU64 = AtomicU64::new(1);

fn fresh_element_id(video_id: &str) -> String {
    let seq = NEXT_ELEMENT.fetch_add(1, Ordering::Relaxed);
    format!("{ELEMENT_PREFIX}-{video_id}-{seq}")
}

/// Retry budget for probe construction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeSettings {
    pub retry_interval: Duration,
    pub max_attempts: u32,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            retry_interval: Duration::from_millis(100),
            max_attempts: 50,
        }
    }
}

/// Why a probe gave up
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ProbeFailure {
    #[error("embedding API not ready after {attempts} attempts")]
    InitTimeout { attempts: u32 },
    #[error("player reported error {code}")]
    PlayerError { code: i32 },
    #[error("player reported no duration")]
    NoDuration,
}

/// Externally visible probe outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStatus {
    Pending,
    Resolved(Time),
    Unavailable(ProbeFailure),
    Destroyed,
}

enum ProbeState {
    Waiting {
        attempts: u32,
        next_attempt: Option<Instant>,
    },
    Constructed {
        element_id: String,
        instance: Box<dyn ProbeInstance>,
    },
    Ready {
        element_id: String,
        instance: Box<dyn ProbeInstance>,
        duration: Time,
    },
    Failed(ProbeFailure),
    Destroyed,
}

pub struct DurationProbe {
    video_id: String,
    platform: Arc<dyn EmbedPlatform>,
    settings: ProbeSettings,
    state: ProbeState,
    sink: EventSink,
    callback_tx: Sender<(String, ProbeEvent)>,
    callback_rx: Receiver<(String, ProbeEvent)>,
}

impl DurationProbe {
    pub fn new(
        video_id: impl Into<String>,
        platform: Arc<dyn EmbedPlatform>,
        settings: ProbeSettings,
        sink: EventSink,
    ) -> Self {
        let (callback_tx, callback_rx) = channel::unbounded();
        Self {
            video_id: video_id.into(),
            platform,
            settings,
            state: ProbeState::Waiting {
                attempts: 0,
                next_attempt: None,
            },
            sink,
            callback_tx,
            callback_rx,
        }
    }

    pub fn status(&self) -> ProbeStatus {
        match &self.state {
            ProbeState::Waiting { .. } | ProbeState::Constructed { .. } => ProbeStatus::Pending,
            ProbeState::Ready { duration, .. } => ProbeStatus::Resolved(*duration),
            ProbeState::Failed(failure) => ProbeStatus::Unavailable(*failure),
            ProbeState::Destroyed => ProbeStatus::Destroyed,
        }
    }

    pub fn duration(&self) -> Time {
        match self.status() {
            ProbeStatus::Resolved(duration) => duration,
            _ => ZERO,
        }
    }

    pub fn poll(&mut self, now: Instant) {
        self.attempt_if_due(now);
        self.drain_callbacks();
    }

    fn attempt_if_due(&mut self, now: Instant) {
        let (attempt, due) = match &self.state {
            ProbeState::Waiting {
                attempts,
                next_attempt,
            } => (attempts + 1, *next_attempt),
            _ => return,
        };
        if due.is_some_and(|due| now < due) {
            return;
        }

        if let Some((element_id, instance)) = self.try_construct(attempt) {
            self.state = ProbeState::Constructed {
                element_id,
                instance,
            };
        } else if attempt >= self.settings.max_attempts {
            tracing::warn!(
                video_id = %self.video_id,
                attempts = attempt,
                "embedding API never became ready; duration unknown"
            );
            self.fail(ProbeFailure::InitTimeout { attempts: attempt });
        } else {
            self.state = ProbeState::Waiting {
                attempts: attempt,
                next_attempt: Some(now + self.settings.retry_interval),
            };
        }
    }

    fn try_construct(&self, attempt: u32) -> Option<(String, Box<dyn ProbeInstance>)> {
        if !self.platform.api_ready() {
            tracing::trace!(video_id = %self.video_id, attempt, "embedding API not loaded yet");
            return None;
        }
        let element_id = fresh_element_id(&self.video_id);
        let tx = self.callback_tx.clone();
        let tag = element_id.clone();
        let request = ProbeRequest {
            element_id: element_id.clone(),
            video_id: self.video_id.clone(),
        };
        let callback: ProbeCallback = Box::new(move |event: ProbeEvent| {
            let _ = tx.send((tag.clone(), event));
        });
        match self.platform.create_player(request, callback) {
            Ok(instance) => {
                tracing::debug!(%element_id, attempt, "probe instance constructed");
                Some((element_id, instance))
            }
            Err(err) => {
                tracing::debug!(%element_id, attempt, error = %err, "probe construction failed");
                None
            }
        }
    }

    fn drain_callbacks(&mut self) {
        while let Ok((element_id, event)) = self.callback_rx.try_recv() {
            let active = match &self.state {
                ProbeState::Constructed { element_id: id, .. } => id == &element_id,
                _ => false,
            };
            if !active {
                tracing::debug!(%element_id, ?event, "dropping callback from inactive probe");
                continue;
            }
            match event {
                ProbeEvent::Ready { duration } if duration > ZERO => {
                    if let ProbeState::Constructed {
                        element_id,
                        instance,
                    } = std::mem::replace(&mut self.state, ProbeState::Destroyed)
                    {
                        tracing::info!(%element_id, duration, "remote duration resolved");
                        self.state = ProbeState::Ready {
                            element_id,
                            instance,
                            duration,
                        };
                        self.sink.publish(BackendEvent::DurationResolved(duration));
                    }
                }
                ProbeEvent::Ready { .. } => self.fail(ProbeFailure::NoDuration),
                ProbeEvent::Error { code } => {
                    tracing::warn!(%element_id, code, "probe player error");
                    self.fail(ProbeFailure::PlayerError { code });
                }
            }
        }
    }

    fn fail(&mut self, failure: ProbeFailure) {
        self.release_instance();
        self.state = ProbeState::Failed(failure);
        self.sink.publish(BackendEvent::DurationUnavailable);
    }

    fn release_instance(&mut self) {
        match std::mem::replace(&mut self.state, ProbeState::Destroyed) {
            ProbeState::Constructed {
                element_id,
                mut instance,
            }
            | ProbeState::Ready {
                element_id,
                mut instance,
                ..
            } => {
                if let Err(err) = instance.destroy() {
                    tracing::debug!(%element_id, error = %err, "ignoring probe destroy error");
                }
            }
            other => self.state = other,
        }
    }

    /// Tear down any live instance. Later callbacks are ignored.
    pub fn destroy(&mut self) {
        self.release_instance();
        self.state = ProbeState::Destroyed;
        while self.callback_rx.try_recv().is_ok() {}
    }
}

impl Drop for DurationProbe {
    fn drop(&mut self) {
        self.destroy();
    }
}
