//! Core types shared by the backends and the synchronization controller.
//!
//! All time values are nanoseconds (i64); see [`time`].

pub mod clock;
pub mod deeplink;
pub mod offset;
pub mod source;
pub mod time;

pub use clock::{Clock, SystemClock};
pub use deeplink::{embedded_start_time, resolve_start};
pub use offset::{OffsetError, PlaybackOffset};
pub use source::{SourceError, SourceKind, VideoSource};
pub use time::{Time, ZERO};
