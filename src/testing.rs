//! Test doubles for the host primitives and backends.
//!
//! Every double shares a [`CallLog`] so tests can assert on the relative
//! order of calls across slots (e.g. destroy-before-create).

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use url::Url;

use crate::backend::remote::{
    EmbedError, EmbedPlatform, EmbedSurface, ProbeCallback, ProbeEvent, ProbeInstance,
    ProbeRequest,
};
use crate::backend::{
    BackendError, BackendEvent, BackendFactory, BackendInit, BackendKind, EventSink, MediaElement,
    MediaHost, PlaybackBackend, Slot,
};
use crate::core::clock::Clock;
use crate::core::source::VideoSource;
use crate::core::time::{self, Time};

/// Shared, ordered record of calls
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }

    /// Index of the first entry equal to `entry`
    pub fn position(&self, entry: &str) -> Option<usize> {
        self.0.lock().iter().position(|e| e == entry)
    }
}

/// Clock that only moves when told to
#[derive(Debug, Clone)]
pub struct ManualClock(Arc<Mutex<Instant>>);

impl ManualClock {
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(Instant::now())))
    }

    pub fn advance(&self, by: Duration) {
        *self.0.lock() += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.0.lock()
    }
}

fn secs(t: Time) -> String {
    format!("{:.1}", time::to_seconds(t))
}

#[derive(Debug, Default)]
struct ElementState {
    position: Time,
    duration: Option<Time>,
    play_calls: usize,
    pause_calls: usize,
}

/// Media element whose state is set by the test
#[derive(Debug, Clone)]
pub struct FakeMediaElement {
    log: CallLog,
    slot: Slot,
    state: Arc<Mutex<ElementState>>,
}

impl FakeMediaElement {
    pub fn new(log: CallLog, slot: Slot) -> Self {
        Self {
            log,
            slot,
            state: Arc::default(),
        }
    }

    pub fn position(&self) -> Time {
        self.state.lock().position
    }

    pub fn set_position(&self, position: Time) {
        self.state.lock().position = position;
    }

    pub fn set_duration(&self, duration: Option<Time>) {
        self.state.lock().duration = duration;
    }

    pub fn play_calls(&self) -> usize {
        self.state.lock().play_calls
    }

    pub fn pause_calls(&self) -> usize {
        self.state.lock().pause_calls
    }
}

impl MediaElement for FakeMediaElement {
    fn play(&mut self) {
        self.state.lock().play_calls += 1;
        self.log.push(format!("{} play", self.slot));
    }

    fn pause(&mut self) {
        self.state.lock().pause_calls += 1;
        self.log.push(format!("{} pause", self.slot));
    }

    fn current_time(&self) -> Time {
        self.state.lock().position
    }

    fn set_current_time(&mut self, position: Time) {
        self.state.lock().position = position;
        self.log.push(format!("{} seek {}", self.slot, secs(position)));
    }

    fn duration(&self) -> Option<Time> {
        self.state.lock().duration
    }
}

#[derive(Debug, Default)]
struct SurfaceState {
    urls: Vec<String>,
    unloads: usize,
}

/// Embedded surface that records every load
#[derive(Debug, Clone)]
pub struct FakeSurface {
    log: CallLog,
    slot: Slot,
    state: Arc<Mutex<SurfaceState>>,
}

impl FakeSurface {
    pub fn new(log: CallLog, slot: Slot) -> Self {
        Self {
            log,
            slot,
            state: Arc::default(),
        }
    }

    pub fn last_url(&self) -> Option<String> {
        self.state.lock().urls.last().cloned()
    }

    pub fn loads(&self) -> usize {
        self.state.lock().urls.len()
    }

    pub fn unloads(&self) -> usize {
        self.state.lock().unloads
    }
}

impl EmbedSurface for FakeSurface {
    fn load(&mut self, url: &Url) {
        self.state.lock().urls.push(url.to_string());
        self.log.push(format!("{} load", self.slot));
    }

    fn unload(&mut self) {
        self.state.lock().unloads += 1;
        self.log.push(format!("{} unload", self.slot));
    }
}

#[derive(Default)]
struct PlatformState {
    api_ready: bool,
    ready_checks: usize,
    injections: usize,
    created: Vec<String>,
    destroyed: Vec<String>,
    callbacks: Vec<ProbeCallback>,
    fail_creates: u32,
    fail_destroys: bool,
}

/// Embedding platform whose API readiness and callbacks are driven by the test
#[derive(Clone, Default)]
pub struct FakePlatform(Arc<Mutex<PlatformState>>);

impl FakePlatform {
    pub fn new(api_ready: bool) -> Self {
        let platform = Self::default();
        platform.0.lock().api_ready = api_ready;
        platform
    }

    pub fn set_api_ready(&self, ready: bool) {
        self.0.lock().api_ready = ready;
    }

    pub fn ready_checks(&self) -> usize {
        self.0.lock().ready_checks
    }

    pub fn injections(&self) -> usize {
        self.0.lock().injections
    }

    pub fn created(&self) -> Vec<String> {
        self.0.lock().created.clone()
    }

    pub fn destroyed(&self) -> Vec<String> {
        self.0.lock().destroyed.clone()
    }

    pub fn fail_next_creates(&self, count: u32) {
        self.0.lock().fail_creates = count;
    }

    pub fn fail_destroys(&self, fail: bool) {
        self.0.lock().fail_destroys = fail;
    }

    /// Deliver an event through the most recently registered callback.
    pub fn fire_last(&self, event: ProbeEvent) {
        let mut state = self.0.lock();
        if let Some(callback) = state.callbacks.last_mut() {
            callback(event);
        }
    }
}

struct FakeProbe {
    element_id: String,
    platform: FakePlatform,
}

impl ProbeInstance for FakeProbe {
    fn destroy(&mut self) -> Result<(), EmbedError> {
        let mut state = self.platform.0.lock();
        state.destroyed.push(self.element_id.clone());
        if state.fail_destroys {
            Err(EmbedError::AlreadyDestroyed)
        } else {
            Ok(())
        }
    }
}

impl EmbedPlatform for FakePlatform {
    fn inject_api_script(&self) {
        self.0.lock().injections += 1;
    }

    fn api_ready(&self) -> bool {
        let mut state = self.0.lock();
        state.ready_checks += 1;
        state.api_ready
    }

    fn create_player(
        &self,
        request: ProbeRequest,
        on_event: ProbeCallback,
    ) -> Result<Box<dyn ProbeInstance>, EmbedError> {
        let mut state = self.0.lock();
        if state.fail_creates > 0 {
            state.fail_creates -= 1;
            return Err(EmbedError::ConstructFailed("element not attached".to_string()));
        }
        state.created.push(request.element_id.clone());
        state.callbacks.push(on_event);
        Ok(Box::new(FakeProbe {
            element_id: request.element_id,
            platform: self.clone(),
        }))
    }
}

/// Host that hands out fake elements and surfaces, keeping handles for tests
#[derive(Clone)]
pub struct FakeHost {
    pub log: CallLog,
    pub platform: FakePlatform,
    pub elements: Arc<Mutex<Vec<(Slot, FakeMediaElement)>>>,
    pub surfaces: Arc<Mutex<Vec<(Slot, FakeSurface)>>>,
}

impl FakeHost {
    pub fn new(log: CallLog, platform: FakePlatform) -> Self {
        Self {
            log,
            platform,
            elements: Arc::default(),
            surfaces: Arc::default(),
        }
    }

    pub fn element(&self, slot: Slot) -> Option<FakeMediaElement> {
        self.elements
            .lock()
            .iter()
            .rev()
            .find(|(s, _)| *s == slot)
            .map(|(_, e)| e.clone())
    }

    pub fn surface(&self, slot: Slot) -> Option<FakeSurface> {
        self.surfaces
            .lock()
            .iter()
            .rev()
            .find(|(s, _)| *s == slot)
            .map(|(_, s)| s.clone())
    }
}

impl MediaHost for FakeHost {
    fn media_element(
        &mut self,
        slot: Slot,
        _locator: &str,
    ) -> Result<Box<dyn MediaElement>, BackendError> {
        let element = FakeMediaElement::new(self.log.clone(), slot);
        self.elements.lock().push((slot, element.clone()));
        Ok(Box::new(element))
    }

    fn embed_surface(&mut self, slot: Slot) -> Result<Box<dyn EmbedSurface>, BackendError> {
        let surface = FakeSurface::new(self.log.clone(), slot);
        self.surfaces.lock().push((slot, surface.clone()));
        Ok(Box::new(surface))
    }

    fn embed_platform(&self) -> Arc<dyn EmbedPlatform> {
        Arc::new(self.platform.clone())
    }
}

#[derive(Debug, Default)]
struct FakeBackendState {
    position: Time,
    duration: Time,
    playing: bool,
    live: bool,
}

/// Backend that records every contract call
pub struct FakeBackend {
    slot: Slot,
    kind: BackendKind,
    log: CallLog,
    state: Arc<Mutex<FakeBackendState>>,
}

impl PlaybackBackend for FakeBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    fn play(&mut self) {
        self.state.lock().playing = true;
        self.log.push(format!("{} play", self.slot));
    }

    fn pause(&mut self) {
        self.state.lock().playing = false;
        self.log.push(format!("{} pause", self.slot));
    }

    fn seek_to(&mut self, position: Time) {
        self.state.lock().position = position;
        self.log.push(format!("{} seek {}", self.slot, secs(position)));
    }

    fn current_time(&self) -> Time {
        self.state.lock().position
    }

    fn duration(&self) -> Time {
        self.state.lock().duration
    }

    fn is_playing(&self) -> bool {
        self.state.lock().playing
    }

    fn destroy(&mut self) {
        let mut state = self.state.lock();
        if state.live {
            state.live = false;
            self.log.push(format!("destroy {}", self.slot));
        }
    }
}

/// Factory producing [`FakeBackend`]s, with per-slot failure injection
#[derive(Clone, Default)]
pub struct RecordingFactory {
    pub log: CallLog,
    sinks: Arc<Mutex<Vec<EventSink>>>,
    backends: Arc<Mutex<Vec<(Slot, Arc<Mutex<FakeBackendState>>)>>>,
    fail: Arc<Mutex<Vec<Slot>>>,
}

impl RecordingFactory {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    pub fn fail_slot(&self, slot: Slot) {
        self.fail.lock().push(slot);
    }

    /// Sink handed to the most recent backend in `slot`
    pub fn sink(&self, slot: Slot) -> EventSink {
        self.sinks
            .lock()
            .iter()
            .rev()
            .find(|s| s.slot() == slot)
            .cloned()
            .expect("no backend created for slot")
    }

    /// Number of backends currently live in `slot`
    pub fn live(&self, slot: Slot) -> usize {
        self.backends
            .lock()
            .iter()
            .filter(|(s, state)| *s == slot && state.lock().live)
            .count()
    }

    pub fn position(&self, slot: Slot) -> Option<Time> {
        self.backends
            .lock()
            .iter()
            .rev()
            .find(|(s, _)| *s == slot)
            .map(|(_, state)| state.lock().position)
    }

    pub fn publish(&self, slot: Slot, event: BackendEvent) {
        self.sink(slot).publish(event);
    }
}

impl BackendFactory for RecordingFactory {
    fn create(
        &mut self,
        source: &VideoSource,
        init: BackendInit,
    ) -> Result<Box<dyn PlaybackBackend>, BackendError> {
        let kind = if source.kind().is_remote() {
            BackendKind::Remote
        } else {
            BackendKind::Local
        };
        if self.fail.lock().contains(&init.slot) {
            self.log.push(format!("create {} failed", init.slot));
            return Err(BackendError::NoSurface(init.slot));
        }
        // a test double observing two live handles in one slot is a bug
        assert_eq!(self.live(init.slot), 0, "{} slot still has a live backend", init.slot);

        self.log.push(format!("create {} at {}", init.slot, secs(init.start)));
        let state = Arc::new(Mutex::new(FakeBackendState {
            position: init.start,
            live: true,
            ..FakeBackendState::default()
        }));
        self.backends.lock().push((init.slot, state.clone()));
        self.sinks.lock().push(init.sink.clone());
        Ok(Box::new(FakeBackend {
            slot: init.slot,
            kind,
            log: self.log.clone(),
            state,
        }))
    }
}
