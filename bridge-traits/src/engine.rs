//! Audio engine bridge trait and supporting types.
//!
//! The engine is the platform's single-item playback primitive: it can load
//! one source URL into a handle, start/pause/seek that handle, report its
//! status, and release it. Queueing, cursor management, and auto-advance are
//! *not* engine concerns; they live in `core-player`, which is the sole owner
//! of the engine instance.
//!
//! Completion is delivered through a status-change notification stream rather
//! than per-operation callbacks: implementations push an
//! [`EngineNotification`] whenever a handle's status changes materially (most
//! importantly when a track finishes naturally).

use crate::error::Result;
use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Opaque identifier for a loaded engine resource.
///
/// A handle is live from a successful [`AudioEngine::load`] until
/// [`AudioEngine::unload`]. Calls against an unloaded handle fail with
/// [`BridgeError::UnknownHandle`](crate::BridgeError::UnknownHandle).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EngineHandle(Uuid);

impl EngineHandle {
    /// Generate a fresh handle. Intended for engine implementations.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Borrow the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EngineHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EngineHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Point-in-time status of a loaded (or unloading) engine resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineStatus {
    /// Whether the source is loaded and controllable. When `false`, the
    /// remaining fields carry no meaning and readers should ignore them.
    pub is_loaded: bool,
    /// Current playback position.
    pub position: Duration,
    /// Total duration, once the engine has determined it. `None` while the
    /// source is still being probed.
    pub duration: Option<Duration>,
    /// Set exactly once, on the status update that reports natural
    /// end-of-track completion.
    pub did_just_finish: bool,
}

/// Status-change notification pushed by an engine implementation.
#[derive(Debug, Clone)]
pub struct EngineNotification {
    /// Handle the status belongs to.
    pub handle: EngineHandle,
    /// The status at the time of the change.
    pub status: EngineStatus,
}

/// Platform audio playback primitive.
///
/// Implementations wrap the host's media API (AVPlayer, ExoPlayer, a desktop
/// audio stack, or a scripted fake in tests). They are expected to support a
/// small number of concurrently loaded handles, although the player session
/// only ever keeps one live.
#[async_trait]
pub trait AudioEngine: Send + Sync {
    /// Resolve `source_url` and prepare it for playback. When `autoplay` is
    /// set, playback starts as soon as the source is ready.
    ///
    /// # Errors
    ///
    /// Fails when the source cannot be fetched or decoded. A failed load must
    /// not leave a live handle behind.
    async fn load(&self, source_url: &str, autoplay: bool) -> Result<EngineHandle>;

    /// Begin or resume playback for the handle.
    async fn play(&self, handle: EngineHandle) -> Result<()>;

    /// Pause playback, preserving the position.
    async fn pause(&self, handle: EngineHandle) -> Result<()>;

    /// Relocate playback to an absolute position.
    async fn seek(&self, handle: EngineHandle, position: Duration) -> Result<()>;

    /// Query the current status of the handle.
    async fn status(&self, handle: EngineHandle) -> Result<EngineStatus>;

    /// Release all resources associated with the handle. Unloading an already
    /// unloaded handle is an error, but callers treat it as non-fatal.
    async fn unload(&self, handle: EngineHandle) -> Result<()>;

    /// Subscribe to status-change notifications for all handles managed by
    /// this engine. Slow subscribers may observe lagged receives; the stream
    /// is advisory, and [`AudioEngine::status`] remains the source of truth.
    fn notifications(&self) -> broadcast::Receiver<EngineNotification>;
}
