//! Behavioral tests for the playback session against a scripted engine.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{broadcast, oneshot};

use bridge_traits::{
    AudioEngine, BridgeError, EngineHandle, EngineNotification, EngineStatus,
};
use core_catalog::TrackRef;
use core_player::{LoadState, PlayerConfig, PlayerSession};
use core_runtime::events::{ClientEvent, EventBus, PlayerEvent};

// ---------------------------------------------------------------------------
// Scripted engine
// ---------------------------------------------------------------------------

struct PendingLoad {
    source_url: String,
    respond: oneshot::Sender<bridge_traits::Result<EngineHandle>>,
}

#[derive(Default)]
struct EngineScript {
    /// Loads awaiting manual resolution (only when `auto_resolve` is off).
    pending: Vec<PendingLoad>,
    /// Handles loaded and not yet unloaded.
    live: Vec<EngineHandle>,
    unloaded: Vec<EngineHandle>,
    statuses: HashMap<EngineHandle, EngineStatus>,
    load_calls: usize,
    auto_resolve: bool,
    fail_loads: bool,
    fail_play: bool,
}

struct ScriptedEngine {
    script: Mutex<EngineScript>,
    notify_tx: broadcast::Sender<EngineNotification>,
}

impl ScriptedEngine {
    /// Loads resolve immediately with a fresh handle.
    fn auto() -> Arc<Self> {
        let engine = Self::manual();
        engine.script.lock().auto_resolve = true;
        engine
    }

    /// Loads block until the test resolves or fails them.
    fn manual() -> Arc<Self> {
        let (notify_tx, _) = broadcast::channel(16);
        Arc::new(Self {
            script: Mutex::new(EngineScript::default()),
            notify_tx,
        })
    }

    fn fail_loads(&self, fail: bool) {
        self.script.lock().fail_loads = fail;
    }

    fn fail_play(&self, fail: bool) {
        self.script.lock().fail_play = fail;
    }

    fn register(script: &mut EngineScript) -> EngineHandle {
        let handle = EngineHandle::new();
        script.live.push(handle);
        script.statuses.insert(
            handle,
            EngineStatus {
                is_loaded: true,
                ..Default::default()
            },
        );
        handle
    }

    /// Resolve the oldest outstanding load with a fresh handle.
    fn resolve_next_load(&self) -> EngineHandle {
        let mut script = self.script.lock();
        assert!(!script.pending.is_empty(), "no outstanding load");
        let pending = script.pending.remove(0);
        let handle = Self::register(&mut script);
        drop(script);
        pending.respond.send(Ok(handle)).ok();
        handle
    }

    fn pending_loads(&self) -> usize {
        self.script.lock().pending.len()
    }

    fn pending_urls(&self) -> Vec<String> {
        self.script
            .lock()
            .pending
            .iter()
            .map(|p| p.source_url.clone())
            .collect()
    }

    fn live_handles(&self) -> Vec<EngineHandle> {
        self.script.lock().live.clone()
    }

    fn unloaded_handles(&self) -> Vec<EngineHandle> {
        self.script.lock().unloaded.clone()
    }

    fn load_calls(&self) -> usize {
        self.script.lock().load_calls
    }

    fn set_position(&self, handle: EngineHandle, position: Duration, duration: Duration) {
        let mut script = self.script.lock();
        script.statuses.insert(
            handle,
            EngineStatus {
                is_loaded: true,
                position,
                duration: Some(duration),
                did_just_finish: false,
            },
        );
    }

    fn current_handle(&self) -> EngineHandle {
        let script = self.script.lock();
        *script.live.last().expect("no live handle")
    }

    /// Report natural completion for `handle` over the notification
    /// stream.
    fn finish(&self, handle: EngineHandle) {
        self.notify_tx
            .send(EngineNotification {
                handle,
                status: EngineStatus {
                    is_loaded: true,
                    did_just_finish: true,
                    ..Default::default()
                },
            })
            .ok();
    }
}

#[async_trait]
impl AudioEngine for ScriptedEngine {
    async fn load(&self, source_url: &str, _autoplay: bool) -> bridge_traits::Result<EngineHandle> {
        let rx = {
            let mut script = self.script.lock();
            script.load_calls += 1;
            if script.fail_loads {
                return Err(BridgeError::LoadFailed(source_url.to_string()));
            }
            if script.auto_resolve {
                return Ok(Self::register(&mut script));
            }
            let (tx, rx) = oneshot::channel();
            script.pending.push(PendingLoad {
                source_url: source_url.to_string(),
                respond: tx,
            });
            rx
        };
        rx.await
            .unwrap_or_else(|_| Err(BridgeError::LoadFailed(source_url.to_string())))
    }

    async fn play(&self, handle: EngineHandle) -> bridge_traits::Result<()> {
        if self.script.lock().fail_play {
            return Err(BridgeError::OperationFailed(format!(
                "play rejected for {handle}"
            )));
        }
        Ok(())
    }

    async fn pause(&self, _handle: EngineHandle) -> bridge_traits::Result<()> {
        Ok(())
    }

    async fn seek(&self, handle: EngineHandle, position: Duration) -> bridge_traits::Result<()> {
        let mut script = self.script.lock();
        if let Some(status) = script.statuses.get_mut(&handle) {
            status.position = position;
        }
        Ok(())
    }

    async fn status(&self, handle: EngineHandle) -> bridge_traits::Result<EngineStatus> {
        let script = self.script.lock();
        script
            .statuses
            .get(&handle)
            .copied()
            .ok_or_else(|| BridgeError::UnknownHandle(handle.to_string()))
    }

    async fn unload(&self, handle: EngineHandle) -> bridge_traits::Result<()> {
        let mut script = self.script.lock();
        script.live.retain(|h| *h != handle);
        script.statuses.remove(&handle);
        script.unloaded.push(handle);
        Ok(())
    }

    fn notifications(&self) -> broadcast::Receiver<EngineNotification> {
        self.notify_tx.subscribe()
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn track(id: &str) -> TrackRef {
    TrackRef {
        id: id.to_string(),
        title: format!("Track {id}"),
        artist_name: "Artist".to_string(),
        artist_id: "artist-1".to_string(),
        duration_secs: 180,
        source_url: format!("https://cdn.example.com/audio/{id}.mp3"),
        album_id: None,
        cover_url: None,
    }
}

fn session_with(engine: Arc<ScriptedEngine>) -> (Arc<PlayerSession>, EventBus) {
    let events = EventBus::new(32);
    let session = PlayerSession::new(engine, events.clone(), PlayerConfig::default());
    (session, events)
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    for _ in 0..500 {
        if condition() {
            return;
        }
        tokio::task::yield_now().await;
    }
    panic!("condition never reached");
}

async fn next_player_event(rx: &mut broadcast::Receiver<ClientEvent>) -> PlayerEvent {
    loop {
        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for player event")
            .expect("event bus closed");
        if let ClientEvent::Player(event) = event {
            return event;
        }
    }
}

// ---------------------------------------------------------------------------
// Queue normalization
// ---------------------------------------------------------------------------

#[tokio::test]
async fn play_with_queue_positions_cursor_at_track() {
    let engine = ScriptedEngine::auto();
    let (session, _events) = session_with(engine);
    let queue: Vec<_> = (1..=5).map(|i| track(&format!("t{i}"))).collect();

    session.play(queue[2].clone(), Some(queue.clone())).await;

    let snap = session.snapshot();
    assert_eq!(snap.current_index, Some(2));
    assert_eq!(snap.queue.len(), 5);
    assert_eq!(snap.current_track.as_ref().map(|t| t.id.as_str()), Some("t3"));
    assert!(snap.is_playing);
    assert_eq!(snap.load_state, LoadState::Ready);
}

#[tokio::test]
async fn play_without_queue_collapses_to_single_entry() {
    let engine = ScriptedEngine::auto();
    let (session, _events) = session_with(engine);

    session.play(track("solo"), None).await;

    let snap = session.snapshot();
    assert_eq!(snap.queue.len(), 1);
    assert_eq!(snap.queue[0].id, "solo");
    assert_eq!(snap.current_index, Some(0));
}

#[tokio::test]
async fn play_with_foreign_track_falls_back_to_index_zero() {
    let engine = ScriptedEngine::auto();
    let (session, _events) = session_with(engine);
    let queue = vec![track("a"), track("b")];

    session.play(track("elsewhere"), Some(queue)).await;

    let snap = session.snapshot();
    assert_eq!(snap.current_index, Some(0));
    assert_eq!(
        snap.current_track.as_ref().map(|t| t.id.as_str()),
        Some("elsewhere")
    );
}

#[tokio::test]
async fn play_with_empty_queue_argument_collapses_to_single_entry() {
    let engine = ScriptedEngine::auto();
    let (session, _events) = session_with(engine);

    session.play(track("solo"), Some(Vec::new())).await;

    let snap = session.snapshot();
    assert_eq!(snap.queue.len(), 1);
    assert_eq!(snap.queue[0].id, "solo");
    assert_eq!(snap.current_index, Some(0));
}

// ---------------------------------------------------------------------------
// Cursor movement and boundaries
// ---------------------------------------------------------------------------

#[tokio::test]
async fn next_walks_queue_and_stops_at_end() {
    let engine = ScriptedEngine::auto();
    let (session, _events) = session_with(Arc::clone(&engine));
    let queue = vec![track("t1"), track("t2"), track("t3")];

    session.play(queue[0].clone(), Some(queue)).await;
    session.next().await;
    session.next().await;

    let snap = session.snapshot();
    assert_eq!(snap.current_index, Some(2));
    assert_eq!(snap.current_track.as_ref().map(|t| t.id.as_str()), Some("t3"));

    // End of queue: no-op, no extra engine load.
    let loads = engine.load_calls();
    session.next().await;
    let snap = session.snapshot();
    assert_eq!(snap.current_index, Some(2));
    assert_eq!(engine.load_calls(), loads);
}

#[tokio::test]
async fn previous_is_noop_at_queue_head() {
    let engine = ScriptedEngine::auto();
    let (session, _events) = session_with(Arc::clone(&engine));
    let queue = vec![track("t1"), track("t2")];

    session.play(queue[0].clone(), Some(queue)).await;
    let loads = engine.load_calls();

    session.previous().await;

    let snap = session.snapshot();
    assert_eq!(snap.current_index, Some(0));
    assert_eq!(engine.load_calls(), loads);
}

#[tokio::test]
async fn transport_is_noop_before_first_play() {
    let engine = ScriptedEngine::auto();
    let (session, _events) = session_with(Arc::clone(&engine));

    session.next().await;
    session.previous().await;
    session.pause().await;
    session.seek_to(Duration::from_secs(10)).await;

    let snap = session.snapshot();
    assert_eq!(snap.current_index, None);
    assert!(snap.current_track.is_none());
    assert!(!snap.is_playing);
    assert_eq!(snap.position, Duration::ZERO);
    assert_eq!(engine.load_calls(), 0);
}

// ---------------------------------------------------------------------------
// Queue editing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_to_queue_appends_without_touching_playback() {
    let engine = ScriptedEngine::auto();
    let (session, _events) = session_with(engine);

    session.play(track("t1"), None).await;
    session.add_to_queue(vec![track("t2"), track("t3")]);

    let snap = session.snapshot();
    let ids: Vec<_> = snap.queue.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, ["t1", "t2", "t3"]);
    assert_eq!(snap.current_index, Some(0));
    assert!(snap.is_playing);
}

#[tokio::test]
async fn clear_queue_detaches_cursor_but_keeps_playing() {
    let engine = ScriptedEngine::auto();
    let (session, _events) = session_with(engine);
    let queue = vec![track("t1"), track("t2")];

    session.play(queue[0].clone(), Some(queue)).await;
    session.clear_queue();

    let snap = session.snapshot();
    assert!(snap.queue.is_empty());
    assert_eq!(snap.current_index, None);
    assert_eq!(snap.current_track.as_ref().map(|t| t.id.as_str()), Some("t1"));
    assert!(snap.is_playing);
}

#[tokio::test]
async fn next_after_clear_queue_is_noop() {
    let engine = ScriptedEngine::auto();
    let (session, _events) = session_with(Arc::clone(&engine));

    session.play(track("t1"), None).await;
    session.clear_queue();
    let loads = engine.load_calls();

    session.next().await;

    assert_eq!(session.snapshot().current_index, None);
    assert_eq!(engine.load_calls(), loads);
}

// ---------------------------------------------------------------------------
// Engine handle lifecycle
// ---------------------------------------------------------------------------

#[tokio::test]
async fn replay_unloads_previous_handle() {
    let engine = ScriptedEngine::auto();
    let (session, _events) = session_with(Arc::clone(&engine));

    session.play(track("t1"), None).await;
    let first = engine.current_handle();
    session.play(track("t1"), None).await;

    assert_eq!(engine.load_calls(), 2);
    assert_eq!(engine.unloaded_handles(), vec![first]);
    assert_eq!(engine.live_handles().len(), 1);
}

#[tokio::test]
async fn racing_plays_settle_on_the_last_request() {
    let engine = ScriptedEngine::manual();
    let (session, _events) = session_with(Arc::clone(&engine));

    let a = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.play(track("a"), None).await }
    });
    wait_until(|| engine.pending_loads() == 1).await;

    let b = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.play(track("b"), None).await }
    });
    wait_until(|| engine.pending_loads() == 2).await;
    assert!(engine.pending_urls()[0].contains("/a.mp3"));
    assert!(engine.pending_urls()[1].contains("/b.mp3"));

    // Resolve in request order; the first result is already stale.
    let handle_a = engine.resolve_next_load();
    let handle_b = engine.resolve_next_load();
    a.await.unwrap();
    b.await.unwrap();

    let snap = session.snapshot();
    assert_eq!(snap.current_track.as_ref().map(|t| t.id.as_str()), Some("b"));
    assert!(snap.is_playing);
    assert_eq!(engine.live_handles(), vec![handle_b]);
    assert!(engine.unloaded_handles().contains(&handle_a));
}

#[tokio::test]
async fn stale_load_resolving_after_winner_is_discarded() {
    let engine = ScriptedEngine::manual();
    let (session, _events) = session_with(Arc::clone(&engine));

    let a = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.play(track("a"), None).await }
    });
    wait_until(|| engine.pending_loads() == 1).await;

    let b = tokio::spawn({
        let session = Arc::clone(&session);
        async move { session.play(track("b"), None).await }
    });
    wait_until(|| engine.pending_loads() == 2).await;

    // The newer request resolves first; the older one limps in afterward.
    let mut script = engine.script.lock();
    let pending_a = script.pending.remove(0);
    let pending_b = script.pending.remove(0);
    let handle_b = ScriptedEngine::register(&mut script);
    let handle_a = ScriptedEngine::register(&mut script);
    drop(script);
    pending_b.respond.send(Ok(handle_b)).ok();
    b.await.unwrap();
    pending_a.respond.send(Ok(handle_a)).ok();
    a.await.unwrap();

    let snap = session.snapshot();
    assert_eq!(snap.current_track.as_ref().map(|t| t.id.as_str()), Some("b"));
    assert_eq!(engine.live_handles(), vec![handle_b]);
    assert!(engine.unloaded_handles().contains(&handle_a));
}

// ---------------------------------------------------------------------------
// Load failure
// ---------------------------------------------------------------------------

#[tokio::test]
async fn failed_load_is_recovered_locally() {
    let engine = ScriptedEngine::auto();
    engine.fail_loads(true);
    let (session, events) = session_with(engine);
    let mut rx = events.subscribe();

    session.play(track("broken"), None).await;

    let snap = session.snapshot();
    assert!(!snap.is_playing);
    assert_eq!(snap.load_state, LoadState::Failed);
    assert_eq!(
        snap.current_track.as_ref().map(|t| t.id.as_str()),
        Some("broken")
    );

    match next_player_event(&mut rx).await {
        PlayerEvent::LoadFailed { track_id, .. } => assert_eq!(track_id, "broken"),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn play_after_failure_recovers() {
    let engine = ScriptedEngine::auto();
    engine.fail_loads(true);
    let (session, _events) = session_with(Arc::clone(&engine));

    session.play(track("broken"), None).await;
    engine.fail_loads(false);
    session.play(track("fine"), None).await;

    let snap = session.snapshot();
    assert!(snap.is_playing);
    assert_eq!(snap.load_state, LoadState::Ready);
    assert_eq!(snap.current_track.as_ref().map(|t| t.id.as_str()), Some("fine"));
}

// ---------------------------------------------------------------------------
// Natural completion
// ---------------------------------------------------------------------------

#[tokio::test]
async fn completion_mid_queue_auto_advances() {
    let engine = ScriptedEngine::auto();
    let (session, events) = session_with(Arc::clone(&engine));
    let mut rx = events.subscribe();
    let queue = vec![track("t1"), track("t2")];

    session.play(queue[0].clone(), Some(queue)).await;
    match next_player_event(&mut rx).await {
        PlayerEvent::Started { track_id } => assert_eq!(track_id, "t1"),
        other => panic!("unexpected event: {other:?}"),
    }

    engine.finish(engine.current_handle());

    match next_player_event(&mut rx).await {
        PlayerEvent::TrackCompleted { track_id } => assert_eq!(track_id, "t1"),
        other => panic!("unexpected event: {other:?}"),
    }
    match next_player_event(&mut rx).await {
        PlayerEvent::Started { track_id } => assert_eq!(track_id, "t2"),
        other => panic!("unexpected event: {other:?}"),
    }

    let snap = session.snapshot();
    assert_eq!(snap.current_index, Some(1));
    assert_eq!(snap.current_track.as_ref().map(|t| t.id.as_str()), Some("t2"));
    assert!(snap.is_playing);
}

#[tokio::test]
async fn completion_at_queue_end_stops_in_place() {
    let engine = ScriptedEngine::auto();
    let (session, events) = session_with(Arc::clone(&engine));
    let mut rx = events.subscribe();

    session.play(track("last"), None).await;
    match next_player_event(&mut rx).await {
        PlayerEvent::Started { .. } => {}
        other => panic!("unexpected event: {other:?}"),
    }

    engine.finish(engine.current_handle());

    match next_player_event(&mut rx).await {
        PlayerEvent::TrackCompleted { track_id } => assert_eq!(track_id, "last"),
        other => panic!("unexpected event: {other:?}"),
    }
    match next_player_event(&mut rx).await {
        PlayerEvent::QueueEnded => {}
        other => panic!("unexpected event: {other:?}"),
    }

    let snap = session.snapshot();
    assert!(!snap.is_playing);
    assert_eq!(snap.position, Duration::ZERO);
    assert_eq!(snap.current_track.as_ref().map(|t| t.id.as_str()), Some("last"));
    assert_eq!(snap.current_index, Some(0));
}

#[tokio::test]
async fn completion_of_a_replaced_handle_is_ignored() {
    let engine = ScriptedEngine::auto();
    let (session, events) = session_with(Arc::clone(&engine));
    let mut rx = events.subscribe();

    session.play(track("t1"), None).await;
    let stale = engine.current_handle();
    session.play(track("t2"), None).await;

    // Drain the two Started events, then report the dead handle finishing.
    let _ = next_player_event(&mut rx).await;
    let _ = next_player_event(&mut rx).await;
    engine.finish(stale);

    // Nothing should change; give the watcher a chance to misbehave.
    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
    let snap = session.snapshot();
    assert!(snap.is_playing);
    assert_eq!(snap.current_track.as_ref().map(|t| t.id.as_str()), Some("t2"));
}

// ---------------------------------------------------------------------------
// Position ticker
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn ticker_tracks_engine_position_while_playing() {
    let engine = ScriptedEngine::auto();
    let (session, _events) = session_with(Arc::clone(&engine));

    session.play(track("t1"), None).await;
    let handle = engine.current_handle();
    engine.set_position(handle, Duration::from_secs(5), Duration::from_secs(180));

    tokio::time::sleep(Duration::from_millis(1100)).await;

    let snap = session.snapshot();
    assert_eq!(snap.position, Duration::from_secs(5));
    assert_eq!(snap.duration, Some(Duration::from_secs(180)));
}

#[tokio::test(start_paused = true)]
async fn pause_stops_the_ticker() {
    let engine = ScriptedEngine::auto();
    let (session, _events) = session_with(Arc::clone(&engine));

    session.play(track("t1"), None).await;
    let handle = engine.current_handle();
    engine.set_position(handle, Duration::from_secs(3), Duration::from_secs(180));
    tokio::time::sleep(Duration::from_millis(1100)).await;
    assert_eq!(session.snapshot().position, Duration::from_secs(3));

    session.pause().await;
    engine.set_position(handle, Duration::from_secs(90), Duration::from_secs(180));
    tokio::time::sleep(Duration::from_secs(5)).await;

    let snap = session.snapshot();
    assert!(!snap.is_playing);
    assert_eq!(snap.position, Duration::from_secs(3));
}

#[tokio::test(start_paused = true)]
async fn resume_restarts_the_ticker() {
    let engine = ScriptedEngine::auto();
    let (session, _events) = session_with(Arc::clone(&engine));

    session.play(track("t1"), None).await;
    let handle = engine.current_handle();
    session.pause().await;
    engine.set_position(handle, Duration::from_secs(42), Duration::from_secs(180));

    session.resume().await;
    tokio::time::sleep(Duration::from_millis(1100)).await;

    let snap = session.snapshot();
    assert!(snap.is_playing);
    assert_eq!(snap.position, Duration::from_secs(42));
}

#[tokio::test(start_paused = true)]
async fn failed_engine_resume_leaves_session_paused() {
    let engine = ScriptedEngine::auto();
    let (session, _events) = session_with(Arc::clone(&engine));

    session.play(track("t1"), None).await;
    let handle = engine.current_handle();
    session.pause().await;

    engine.fail_play(true);
    session.resume().await;

    assert!(!session.snapshot().is_playing);

    // No ticker should have restarted either.
    engine.set_position(handle, Duration::from_secs(77), Duration::from_secs(180));
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert_eq!(session.snapshot().position, Duration::ZERO);

    // The engine recovers; resume works again.
    engine.fail_play(false);
    session.resume().await;
    assert!(session.snapshot().is_playing);
}

#[tokio::test]
async fn resume_without_a_loaded_track_is_noop() {
    let engine = ScriptedEngine::auto();
    let (session, _events) = session_with(engine);

    session.resume().await;

    assert!(!session.snapshot().is_playing);
}

// ---------------------------------------------------------------------------
// Seek and reset
// ---------------------------------------------------------------------------

#[tokio::test]
async fn seek_updates_position_optimistically() {
    let engine = ScriptedEngine::auto();
    let (session, _events) = session_with(engine);

    session.play(track("t1"), None).await;
    session.seek_to(Duration::from_secs(30)).await;

    assert_eq!(session.snapshot().position, Duration::from_secs(30));
}

#[tokio::test]
async fn reset_tears_everything_down() {
    let engine = ScriptedEngine::auto();
    let (session, _events) = session_with(Arc::clone(&engine));
    let queue = vec![track("t1"), track("t2")];

    session.play(queue[0].clone(), Some(queue)).await;
    let handle = engine.current_handle();
    session.reset().await;

    let snap = session.snapshot();
    assert!(snap.queue.is_empty());
    assert_eq!(snap.current_index, None);
    assert!(snap.current_track.is_none());
    assert!(!snap.is_playing);
    assert_eq!(snap.position, Duration::ZERO);
    assert_eq!(snap.load_state, LoadState::Idle);
    assert!(engine.unloaded_handles().contains(&handle));
    assert!(engine.live_handles().is_empty());
}
