//! Backend over a directly addressable media element.
//! Position reads and seeks go straight to the element.

use crate::backend::{
    BackendEvent, BackendInit, BackendKind, EventSink, MediaEvent, PlaybackBackend,
};
use crate::core::time::{Time, ZERO};

/// Native media element primitive supplied by the host
pub trait MediaElement {
    fn play(&mut self);
    fn pause(&mut self);
    fn current_time(&self) -> Time;
    fn set_current_time(&mut self, time: Time);
    /// `None` until metadata has loaded
    fn duration(&self) -> Option<Time>;
}

/// Local playback backend
pub struct LocalBackend {
    element: Box<dyn MediaElement>,
    sink: EventSink,
    playing: bool,
    duration: Time,
    destroyed: bool,
}

impl LocalBackend {
    pub fn new(mut element: Box<dyn MediaElement>, init: BackendInit) -> Self {
        if init.start > ZERO {
            element.set_current_time(init.start);
        }
        Self {
            element,
            sink: init.sink,
            playing: false,
            duration: ZERO,
            destroyed: false,
        }
    }

    fn on_metadata_loaded(&mut self) {
        if self.duration > ZERO {
            return;
        }
        match self.element.duration() {
            Some(duration) if duration > ZERO => {
                self.duration = duration;
                tracing::debug!(slot = %self.sink.slot(), duration, "local duration resolved");
                self.sink.publish(BackendEvent::DurationResolved(duration));
            }
            other => {
                tracing::debug!(
                    slot = %self.sink.slot(),
                    ?other,
                    "metadata without usable duration"
                );
            }
        }
    }
}

impl PlaybackBackend for LocalBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    fn play(&mut self) {
        if self.destroyed || self.playing {
            return;
        }
        self.element.play();
        self.playing = true;
    }

    fn pause(&mut self) {
        if self.destroyed || !self.playing {
            return;
        }
        self.element.pause();
        self.playing = false;
    }

    fn seek_to(&mut self, time: Time) {
        if self.destroyed {
            return;
        }
        self.element.set_current_time(time);
    }

    fn current_time(&self) -> Time {
        self.element.current_time()
    }

    fn duration(&self) -> Time {
        self.duration
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn on_media_event(&mut self, event: MediaEvent) {
        if self.destroyed {
            return;
        }
        match event {
            MediaEvent::TimeChanged => {
                self.sink.publish(BackendEvent::TimeUpdate(self.element.current_time()));
            }
            MediaEvent::MetadataLoaded => self.on_metadata_loaded(),
        }
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        if self.playing {
            self.element.pause();
            self.playing = false;
        }
        self.destroyed = true;
    }
}
