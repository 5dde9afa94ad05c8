//! Builds local or remote backends from host-provided primitives.

use std::sync::Arc;

use super::local::{LocalBackend, MediaElement};
use super::remote::api::{self, ApiScriptGuard};
use super::remote::{EmbedPlatform, EmbedSurface, RemoteBackend, RemoteOptions};
use super::{BackendError, BackendFactory, BackendInit, PlaybackBackend, Slot};
use crate::core::clock::Clock;
use crate::core::source::{SourceKind, VideoSource};

/// Native capabilities of the embedding host (a browser page, a webview, ...)
pub trait MediaHost {
    /// A media element bound to `locator` for the given slot
    fn media_element(
        &mut self,
        slot: Slot,
        locator: &str,
    ) -> Result<Box<dyn MediaElement>, BackendError>;

    /// A visible embedded-player surface for the given slot
    fn embed_surface(&mut self, slot: Slot) -> Result<Box<dyn EmbedSurface>, BackendError>;

    fn embed_platform(&self) -> Arc<dyn EmbedPlatform>;
}

pub struct HostBackendFactory<H> {
    host: H,
    clock: Arc<dyn Clock>,
    primary: RemoteOptions,
    overlay: RemoteOptions,
    api_guard: &'static ApiScriptGuard,
}

impl<H: MediaHost> HostBackendFactory<H> {
    pub fn new(
        host: H,
        clock: Arc<dyn Clock>,
        primary: RemoteOptions,
        overlay: RemoteOptions,
    ) -> Self {
        Self {
            host,
            clock,
            primary,
            overlay,
            api_guard: api::global(),
        }
    }

    /// Use a specific script guard instead of the process-wide one.
    pub fn with_api_guard(mut self, guard: &'static ApiScriptGuard) -> Self {
        self.api_guard = guard;
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }
}

impl<H: MediaHost> BackendFactory for HostBackendFactory<H> {
    fn create(
        &mut self,
        source: &VideoSource,
        init: BackendInit,
    ) -> Result<Box<dyn PlaybackBackend>, BackendError> {
        match source.kind() {
            SourceKind::Local => {
                let element = self.host.media_element(init.slot, source.locator())?;
                tracing::debug!(
                    slot = %init.slot,
                    locator = source.locator(),
                    "local backend created"
                );
                Ok(Box::new(LocalBackend::new(element, init)))
            }
            SourceKind::Remote { video_id } => {
                let platform = self.host.embed_platform();
                self.api_guard.ensure_requested(platform.as_ref());
                let surface = self.host.embed_surface(init.slot)?;
                let options = match init.slot {
                    Slot::Primary => self.primary.clone(),
                    Slot::Overlay => self.overlay.clone(),
                };
                tracing::debug!(slot = %init.slot, %video_id, "remote backend created");
                Ok(Box::new(RemoteBackend::new(
                    video_id.clone(),
                    surface,
                    platform,
                    self.clock.clone(),
                    options,
                    init,
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BackendKind, EventSink};
    use crate::testing::{CallLog, FakeHost, FakePlatform, ManualClock};
    use crossbeam::channel;

    fn factory(host: FakeHost) -> HostBackendFactory<FakeHost> {
        let overlay = RemoteOptions {
            probe_duration: false,
            ..RemoteOptions::default()
        };
        HostBackendFactory::new(
            host,
            Arc::new(ManualClock::new()),
            RemoteOptions::default(),
            overlay,
        )
        .with_api_guard(Box::leak(Box::new(ApiScriptGuard::new())))
    }

    fn init(slot: Slot) -> BackendInit {
        let (tx, _rx) = channel::unbounded();
        BackendInit {
            slot,
            start: 0,
            sink: EventSink::new(slot, 1, tx),
        }
    }

    #[test]
    fn test_local_source_gets_media_element() {
        let host = FakeHost::new(CallLog::default(), FakePlatform::new(false));
        let mut factory = factory(host.clone());
        let source = VideoSource::classify("https://example.com/clip.mp4").unwrap();
        let backend = factory.create(&source, init(Slot::Primary)).unwrap();
        assert_eq!(backend.kind(), BackendKind::Local);
        assert!(host.element(Slot::Primary).is_some());
        assert_eq!(host.platform.injections(), 0);
    }

    #[test]
    fn test_remote_source_requests_api_once() {
        let host = FakeHost::new(CallLog::default(), FakePlatform::new(false));
        let mut factory = factory(host.clone());
        let source = VideoSource::classify("https://youtu.be/abc").unwrap();
        let primary = factory.create(&source, init(Slot::Primary)).unwrap();
        let overlay = factory.create(&source, init(Slot::Overlay)).unwrap();
        assert_eq!(primary.kind(), BackendKind::Remote);
        assert_eq!(overlay.kind(), BackendKind::Remote);
        assert_eq!(host.platform.injections(), 1);

        let primary_url = host.surface(Slot::Primary).unwrap().last_url().unwrap();
        let overlay_url = host.surface(Slot::Overlay).unwrap().last_url().unwrap();
        assert!(overlay_url.contains("controls=0"));
        assert!(primary_url.contains("embed/abc"));
    }
}
