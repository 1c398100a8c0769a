//! # Player State Types
//!
//! Read-side types exposed by [`PlayerSession`](crate::PlayerSession).

use std::time::Duration;

use core_catalog::TrackRef;

/// Where the session is in the load lifecycle of the current track.
///
/// `Failed` is sticky until the next `play`; the attempted track stays
/// current so a UI can offer a retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Nothing has been requested yet, or the session was reset.
    #[default]
    Idle,
    /// A load is in flight; transport controls are no-ops.
    Loading,
    /// The current track is loaded and controllable.
    Ready,
    /// The most recent load failed.
    Failed,
}

/// Point-in-time copy of the session state, safe to hand to a UI thread.
#[derive(Debug, Clone)]
pub struct PlayerSnapshot {
    pub current_track: Option<TrackRef>,
    pub queue: Vec<TrackRef>,
    /// Cursor into `queue`. `None` when nothing was ever played or the
    /// queue was cleared out from under the playing track.
    pub current_index: Option<usize>,
    pub is_playing: bool,
    pub position: Duration,
    /// Unknown until the engine reports it for the loaded track.
    pub duration: Option<Duration>,
    pub load_state: LoadState,
}

/// Tuning knobs for a [`PlayerSession`](crate::PlayerSession).
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    /// How often the position ticker polls engine status while playing.
    pub tick_interval: Duration,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(1),
        }
    }
}
