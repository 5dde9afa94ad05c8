//! Playback synchronization for a primary video and a time-offset overlay.
//!
//! [`playback::SyncController`] keeps two [`backend::PlaybackBackend`]s (a
//! local media element or an embedded remote player) aligned so the overlay
//! runs `offset` ahead of the primary.

pub mod backend;
pub mod config;
pub mod core;
pub mod logging;
pub mod playback;

#[cfg(test)]
pub(crate) mod testing;
