//! Remote (embedded, sandboxed) playback backend.

pub mod api;
pub mod clock;
pub mod embed;
pub mod player;
pub mod probe;

pub use clock::RemoteClock;
pub use embed::{
    EmbedError, EmbedParams, EmbedPlatform, EmbedSurface, ProbeCallback, ProbeEvent,
    ProbeInstance, ProbeRequest,
};
pub use player::{RemoteBackend, RemoteOptions};
pub use probe::{DurationProbe, ProbeFailure, ProbeSettings, ProbeStatus};
