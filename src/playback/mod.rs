pub mod engine;
pub mod sync;
pub mod state;

pub use engine::{PlaybackCommand, PlaybackEngine, PlaybackError, PlaybackResponse};
pub use sync::{SyncController, SyncError};
pub use state::{ControllerState, DurationStatus, PlaybackState};
