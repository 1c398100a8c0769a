//! # Playback Session
//!
//! [`PlayerSession`] owns the audio engine: it is the only component that
//! loads, controls, and unloads engine handles. All transport operations
//! are infallible from the caller's perspective; engine failures are
//! logged, reflected in [`LoadState`], and recovered locally.
//!
//! ## Concurrency model
//!
//! State lives behind a `parking_lot::Mutex` that is never held across an
//! `.await`. Every load carries a generation number taken under the lock;
//! a load that resolves after a newer generation has started must not
//! touch session state and unloads whatever handle it produced. In-flight
//! loads cannot be aborted, only ignored.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use bridge_traits::{AudioEngine, EngineHandle, EngineNotification};
use core_catalog::TrackRef;
use core_runtime::events::{ClientEvent, EventBus, PlayerEvent};

use crate::state::{LoadState, PlayerConfig, PlayerSnapshot};

/// The playback core: queue, cursor, transport, and engine lifecycle.
///
/// Construct with [`PlayerSession::new`], which returns an `Arc` because
/// the session spawns background tasks (completion watcher, position
/// ticker) that hold weak references back to it.
pub struct PlayerSession {
    engine: Arc<dyn AudioEngine>,
    events: EventBus,
    tick_interval: Duration,
    state: Arc<Mutex<SessionState>>,
}

#[derive(Default)]
struct SessionState {
    queue: Vec<TrackRef>,
    current_index: Option<usize>,
    current_track: Option<TrackRef>,
    is_playing: bool,
    position: Duration,
    duration: Option<Duration>,
    load_state: LoadState,
    /// The one live engine handle, if any.
    handle: Option<EngineHandle>,
    /// Bumped at the start of every load; stale loads compare against it.
    generation: u64,
    /// Cancellation for the running position ticker, if any.
    ticker: Option<CancellationToken>,
}

impl SessionState {
    /// Tear down for a fresh load: bump the generation, stop the ticker,
    /// detach the live handle (returned for unloading outside the lock),
    /// and mark the given track as current-but-loading.
    fn begin_load(&mut self, track: &TrackRef) -> (u64, Option<EngineHandle>) {
        self.generation += 1;
        if let Some(token) = self.ticker.take() {
            token.cancel();
        }
        let old = self.handle.take();
        self.current_track = Some(track.clone());
        self.is_playing = false;
        self.position = Duration::ZERO;
        self.duration = None;
        self.load_state = LoadState::Loading;
        (self.generation, old)
    }
}

/// What to do after a completion notification, decided under the lock.
enum Completion {
    Advance { finished: String, next: usize },
    QueueEnded { finished: Option<String> },
    Ignore,
}

impl PlayerSession {
    /// Create a session bound to `engine` and start listening for its
    /// status-change notifications.
    pub fn new(engine: Arc<dyn AudioEngine>, events: EventBus, config: PlayerConfig) -> Arc<Self> {
        let session = Arc::new(Self {
            engine,
            events,
            tick_interval: config.tick_interval,
            state: Arc::new(Mutex::new(SessionState::default())),
        });
        session.spawn_completion_watcher();
        session
    }

    /// Start playing `track`.
    ///
    /// With a non-empty `queue`, the cursor becomes the index of `track`
    /// within it, falling back to 0 when the track is not a member. Without
    /// one, the queue collapses to just `[track]`. Legal from any state; the prior
    /// engine handle is always unloaded first, even when re-playing the
    /// same track.
    pub async fn play(self: &Arc<Self>, track: TrackRef, queue: Option<Vec<TrackRef>>) {
        let (generation, old) = {
            let mut st = self.state.lock();
            match queue {
                // An empty queue argument is treated as absent.
                Some(q) if !q.is_empty() => {
                    let index = q.iter().position(|t| t.id == track.id).unwrap_or(0);
                    st.queue = q;
                    st.current_index = Some(index);
                }
                _ => {
                    st.queue = vec![track.clone()];
                    st.current_index = Some(0);
                }
            }
            st.begin_load(&track)
        };
        self.unload_quietly(old).await;
        self.load_and_commit(generation, track).await;
    }

    /// Pause playback and stop the position ticker. No-op when not
    /// playing.
    pub async fn pause(&self) {
        let handle = {
            let mut st = self.state.lock();
            if !st.is_playing {
                return;
            }
            st.is_playing = false;
            if let Some(token) = st.ticker.take() {
                token.cancel();
            }
            st.handle
        };
        if let Some(handle) = handle {
            if let Err(err) = self.engine.pause(handle).await {
                warn!(%handle, error = %err, "engine pause failed");
            }
        }
        self.events.emit(ClientEvent::Player(PlayerEvent::Paused));
    }

    /// Resume a paused track and restart the ticker. No-op when already
    /// playing or when nothing is loaded. An engine failure leaves the
    /// session paused.
    pub async fn resume(self: &Arc<Self>) {
        let (generation, handle) = {
            let st = self.state.lock();
            if st.is_playing {
                return;
            }
            let Some(handle) = st.handle else { return };
            (st.generation, handle)
        };

        if let Err(err) = self.engine.play(handle).await {
            warn!(%handle, error = %err, "engine play failed");
            return;
        }

        let token = CancellationToken::new();
        let committed = {
            let mut st = self.state.lock();
            // A newer load or a reset may have raced the engine call.
            if st.generation != generation || st.handle != Some(handle) || st.is_playing {
                false
            } else {
                st.is_playing = true;
                if let Some(stale) = st.ticker.take() {
                    stale.cancel();
                }
                st.ticker = Some(token.clone());
                true
            }
        };
        if committed {
            self.spawn_ticker(generation, handle, token);
            self.events.emit(ClientEvent::Player(PlayerEvent::Resumed));
        }
    }

    /// Advance to the next queued track. Silent no-op at the end of the
    /// queue or when the cursor is detached.
    pub async fn next(self: &Arc<Self>) {
        let target = {
            let st = self.state.lock();
            match st.current_index {
                Some(i) if i + 1 < st.queue.len() => Some(i + 1),
                _ => None,
            }
        };
        if let Some(index) = target {
            self.start_index(index).await;
        }
    }

    /// Step back to the previous queued track. Silent no-op at the head
    /// of the queue or when the cursor is detached.
    pub async fn previous(self: &Arc<Self>) {
        let target = {
            let st = self.state.lock();
            match st.current_index {
                Some(i) if i > 0 => Some(i - 1),
                _ => None,
            }
        };
        if let Some(index) = target {
            self.start_index(index).await;
        }
    }

    /// Seek within the current track. The position is updated
    /// optimistically before the engine confirms. No-op when nothing is
    /// loaded.
    pub async fn seek_to(&self, position: Duration) {
        let handle = {
            let mut st = self.state.lock();
            let Some(handle) = st.handle else { return };
            st.position = position;
            handle
        };
        if let Err(err) = self.engine.seek(handle, position).await {
            warn!(%handle, error = %err, "engine seek failed");
        }
    }

    /// Append tracks to the queue. Cursor and playback are untouched.
    pub fn add_to_queue(&self, tracks: Vec<TrackRef>) {
        let mut st = self.state.lock();
        st.queue.extend(tracks);
    }

    /// Empty the queue and detach the cursor. The playing track, if any,
    /// keeps playing.
    pub fn clear_queue(&self) {
        let mut st = self.state.lock();
        st.queue.clear();
        st.current_index = None;
    }

    /// Full teardown: unload the engine, stop the ticker, drop queue and
    /// track. Used on sign-out.
    pub async fn reset(&self) {
        let handle = {
            let mut st = self.state.lock();
            // Invalidates any in-flight load as well.
            st.generation += 1;
            if let Some(token) = st.ticker.take() {
                token.cancel();
            }
            let handle = st.handle.take();
            st.queue.clear();
            st.current_index = None;
            st.current_track = None;
            st.is_playing = false;
            st.position = Duration::ZERO;
            st.duration = None;
            st.load_state = LoadState::Idle;
            handle
        };
        self.unload_quietly(handle).await;
    }

    /// Point-in-time copy of the session state.
    pub fn snapshot(&self) -> PlayerSnapshot {
        let st = self.state.lock();
        PlayerSnapshot {
            current_track: st.current_track.clone(),
            queue: st.queue.clone(),
            current_index: st.current_index,
            is_playing: st.is_playing,
            position: st.position,
            duration: st.duration,
            load_state: st.load_state,
        }
    }

    /// Load the track at `index` in the current queue, replacing whatever
    /// is live. Re-validates the index under the lock; callers may have
    /// decided on it before the queue changed.
    async fn start_index(self: &Arc<Self>, index: usize) {
        let begun = {
            let mut st = self.state.lock();
            match st.queue.get(index).cloned() {
                Some(track) => {
                    st.current_index = Some(index);
                    let (generation, old) = st.begin_load(&track);
                    Some((generation, old, track))
                }
                None => None,
            }
        };
        let Some((generation, old, track)) = begun else {
            return;
        };
        self.unload_quietly(old).await;
        self.load_and_commit(generation, track).await;
    }

    /// Await the engine load for `track` and commit the result, unless a
    /// newer generation has started in the meantime.
    async fn load_and_commit(self: &Arc<Self>, generation: u64, track: TrackRef) {
        match self.engine.load(&track.source_url, true).await {
            Ok(handle) => {
                let token = CancellationToken::new();
                let stale = {
                    let mut st = self.state.lock();
                    if st.generation != generation {
                        true
                    } else {
                        st.handle = Some(handle);
                        st.is_playing = true;
                        st.load_state = LoadState::Ready;
                        st.ticker = Some(token.clone());
                        false
                    }
                };
                if stale {
                    debug!(%handle, track_id = %track.id, "discarding stale load");
                    self.unload_quietly(Some(handle)).await;
                    return;
                }
                self.spawn_ticker(generation, handle, token);
                self.events.emit(ClientEvent::Player(PlayerEvent::Started {
                    track_id: track.id.clone(),
                }));
            }
            Err(err) => {
                {
                    let mut st = self.state.lock();
                    if st.generation != generation {
                        return;
                    }
                    st.is_playing = false;
                    st.load_state = LoadState::Failed;
                }
                warn!(track_id = %track.id, error = %err, "track load failed");
                self.events.emit(ClientEvent::Player(PlayerEvent::LoadFailed {
                    track_id: track.id.clone(),
                    message: err.to_string(),
                }));
            }
        }
    }

    async fn unload_quietly(&self, handle: Option<EngineHandle>) {
        if let Some(handle) = handle {
            if let Err(err) = self.engine.unload(handle).await {
                warn!(%handle, error = %err, "engine unload failed");
            }
        }
    }

    /// Poll engine status while playing. The token is cancelled
    /// synchronously under the state lock before any competing engine
    /// call, so a cancelled ticker never writes again.
    fn spawn_ticker(&self, generation: u64, handle: EngineHandle, token: CancellationToken) {
        let engine = Arc::clone(&self.engine);
        let state = Arc::clone(&self.state);
        let tick = self.tick_interval;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick of a fresh interval fires immediately.
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {}
                }
                let status = match engine.status(handle).await {
                    Ok(status) => status,
                    Err(err) => {
                        debug!(%handle, error = %err, "ticker status read failed");
                        continue;
                    }
                };
                if !status.is_loaded {
                    continue;
                }
                let mut st = state.lock();
                if token.is_cancelled() || st.generation != generation {
                    break;
                }
                st.position = status.position;
                st.duration = status.duration;
            }
        });
    }

    /// Listen for engine status changes and auto-advance on natural
    /// completion. Holds only a weak reference so the session can drop.
    fn spawn_completion_watcher(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        let mut rx = self.engine.notifications();
        tokio::spawn(async move {
            loop {
                let notification = match rx.recv().await {
                    Ok(n) => n,
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!(skipped, "completion watcher lagged");
                        continue;
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                };
                let Some(session) = weak.upgrade() else { break };
                session.handle_notification(notification).await;
            }
        });
    }

    async fn handle_notification(self: &Arc<Self>, notification: EngineNotification) {
        if !notification.status.did_just_finish {
            return;
        }
        let outcome = {
            let mut st = self.state.lock();
            if st.handle != Some(notification.handle) {
                // A finished handle we already replaced or unloaded.
                Completion::Ignore
            } else {
                let finished = st.current_track.as_ref().map(|t| t.id.clone());
                match st.current_index {
                    Some(i) if i + 1 < st.queue.len() => match finished {
                        Some(finished) => Completion::Advance {
                            finished,
                            next: i + 1,
                        },
                        None => Completion::Ignore,
                    },
                    _ => {
                        // End of queue: stop in place, keep the track.
                        st.is_playing = false;
                        st.position = Duration::ZERO;
                        if let Some(token) = st.ticker.take() {
                            token.cancel();
                        }
                        Completion::QueueEnded { finished }
                    }
                }
            }
        };
        match outcome {
            Completion::Advance { finished, next } => {
                self.events
                    .emit(ClientEvent::Player(PlayerEvent::TrackCompleted {
                        track_id: finished,
                    }));
                self.start_index(next).await;
            }
            Completion::QueueEnded { finished } => {
                if let Some(track_id) = finished {
                    self.events
                        .emit(ClientEvent::Player(PlayerEvent::TrackCompleted {
                            track_id,
                        }));
                }
                self.events.emit(ClientEvent::Player(PlayerEvent::QueueEnded));
            }
            Completion::Ignore => {}
        }
    }
}
