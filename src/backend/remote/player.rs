//! Backend over a sandboxed embedded player.
//!
//! Position comes from a [`RemoteClock`] estimate. Play, pause and seek are
//! applied by reloading the surface, and duration comes from an optional
//! hidden [`DurationProbe`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::clock::RemoteClock;
use super::embed::{EmbedParams, EmbedPlatform, EmbedSurface};
use super::probe::{DurationProbe, ProbeSettings, ProbeStatus};
use crate::backend::{BackendEvent, BackendInit, BackendKind, EventSink, PlaybackBackend};
use crate::core::clock::Clock;
use crate::core::time::{self, Time, ZERO};

/// Per-instance behaviour of a remote backend
#[derive(Debug, Clone)]
pub struct RemoteOptions {
    /// Base URL of the embedding host
    pub embed_host: String,
    pub show_controls: bool,
    /// Run a hidden probe to resolve the duration
    pub probe_duration: bool,
    pub probe: ProbeSettings,
    /// Interval between published clock estimates while playing
    pub tick_interval: Duration,
}

impl Default for RemoteOptions {
    fn default() -> Self {
        Self {
            embed_host: "https://www.youtube.com".to_string(),
            show_controls: false,
            probe_duration: true,
            probe: ProbeSettings::default(),
            tick_interval: Duration::from_millis(100),
        }
    }
}

pub struct RemoteBackend {
    video_id: String,
    surface: Box<dyn EmbedSurface>,
    clock: Arc<dyn Clock>,
    position: RemoteClock,
    probe: Option<DurationProbe>,
    sink: EventSink,
    options: RemoteOptions,
    next_tick: Option<Instant>,
    destroyed: bool,
}

impl RemoteBackend {
    pub fn new(
        video_id: impl Into<String>,
        surface: Box<dyn EmbedSurface>,
        platform: Arc<dyn EmbedPlatform>,
        clock: Arc<dyn Clock>,
        options: RemoteOptions,
        init: BackendInit,
    ) -> Self {
        let video_id = video_id.into();
        let probe = options.probe_duration.then(|| {
            DurationProbe::new(video_id.clone(), platform, options.probe, init.sink.clone())
        });
        let mut backend = Self {
            video_id,
            surface,
            clock,
            position: RemoteClock::new(init.start),
            probe,
            sink: init.sink,
            options,
            next_tick: None,
            destroyed: false,
        };
        backend.reload();
        backend
    }

    pub fn probe_status(&self) -> Option<ProbeStatus> {
        self.probe.as_ref().map(DurationProbe::status)
    }

    /// Push the current clock anchor and play state to the surface.
    fn reload(&mut self) {
        let params = EmbedParams {
            host: self.options.embed_host.clone(),
            video_id: self.video_id.clone(),
            autoplay: self.position.is_running(),
            start: time::whole_seconds(self.position.base()),
            muted: true,
            controls: self.options.show_controls,
        };
        match params.load_url() {
            Ok(url) => {
                tracing::debug!(slot = %self.sink.slot(), %url, "reloading embedded surface");
                self.surface.load(&url);
            }
            Err(err) => {
                tracing::warn!(slot = %self.sink.slot(), error = %err, "cannot build embed url");
            }
        }
    }
}

impl PlaybackBackend for RemoteBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Remote
    }

    fn play(&mut self) {
        if self.destroyed || self.position.is_running() {
            return;
        }
        let now = self.clock.now();
        self.position.start(now);
        self.next_tick = Some(now + self.options.tick_interval);
        self.reload();
    }

    fn pause(&mut self) {
        if self.destroyed || !self.position.is_running() {
            return;
        }
        self.position.stop(self.clock.now());
        self.next_tick = None;
        self.reload();
        self.sink.publish(BackendEvent::TimeUpdate(self.position.base()));
    }

    fn seek_to(&mut self, time: Time) {
        if self.destroyed {
            return;
        }
        let now = self.clock.now();
        self.position.seek(time, now);
        if self.position.is_running() {
            self.next_tick = Some(now + self.options.tick_interval);
        }
        self.reload();
    }

    fn current_time(&self) -> Time {
        self.position.estimate(self.clock.now())
    }

    fn duration(&self) -> Time {
        self.probe.as_ref().map_or(ZERO, DurationProbe::duration)
    }

    fn is_playing(&self) -> bool {
        self.position.is_running()
    }

    fn poll(&mut self, now: Instant) {
        if self.destroyed {
            return;
        }
        if let Some(probe) = self.probe.as_mut() {
            probe.poll(now);
        }
        if let Some(due) = self.next_tick {
            if now >= due {
                let estimate = self.position.estimate(now);
                self.sink.publish(BackendEvent::TimeUpdate(estimate));
                self.next_tick = Some(now + self.options.tick_interval);
            }
        }
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        if let Some(probe) = self.probe.as_mut() {
            probe.destroy();
        }
        self.surface.unload();
        self.next_tick = None;
        self.destroyed = true;
        tracing::debug!(
            slot = %self.sink.slot(),
            video_id = %self.video_id,
            "remote backend destroyed"
        );
    }
}

impl Drop for RemoteBackend {
    fn drop(&mut self) {
        self.destroy();
    }
}
