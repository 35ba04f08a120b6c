//! Embedded backend over a remotely hosted player
//!
//! The remote player is only reachable after the embed library has loaded and
//! the player has announced `Ready`. It does not push time updates, so the
//! backend samples time and duration on a fixed interval until destroyed.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::loader::EmbedLibraryLoader;
use super::{BackendError, BackendEvent, EventSink, MediaBackend};
use crate::model::MediaKind;

const EMBED_BASE_URL: &str = "https://www.youtube.com/embed/";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EmbedError {
    #[error("embed library failed to load: {0}")]
    LoadFailed(String),

    #[error("embed library load was abandoned")]
    LoadAborted,

    #[error("embed player is unavailable")]
    Unavailable,

    #[error("embed player does not support {0}")]
    Unsupported(&'static str),
}

/// Player states reported by the remote player
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmbedState {
    Unstarted,
    Ended,
    Playing,
    Paused,
    Buffering,
    Cued,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmbedEvent {
    Ready,
    StateChange(EmbedState),
}

/// Construction parameters sent to the remote player
#[derive(Clone, Debug, PartialEq)]
pub struct EmbedPlayerConfig {
    pub video_id: String,
    pub origin: String,
}

impl EmbedPlayerConfig {
    pub fn new(video_id: String, origin: String) -> Self {
        Self { video_id, origin }
    }

    pub fn player_vars(&self) -> Vec<(&'static str, String)> {
        vec![
            ("autoplay", "1".to_string()),
            ("controls", "0".to_string()),
            ("rel", "0".to_string()),
            ("modestbranding", "1".to_string()),
            ("playsinline", "1".to_string()),
            ("iv_load_policy", "3".to_string()),
            ("origin", self.origin.clone()),
        ]
    }

    pub fn embed_url(&self) -> String {
        let query = self
            .player_vars()
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}{}?{}", EMBED_BASE_URL, self.video_id, query)
    }
}

/// The embed service: loads its library once, then creates players.
#[async_trait]
pub trait EmbedApi: Send + Sync {
    async fn load_library(&self) -> Result<(), EmbedError>;

    fn create_player(
        &self,
        config: &EmbedPlayerConfig,
        events: EmbedEventSink,
    ) -> Result<Box<dyn EmbedPlayer>, EmbedError>;
}

/// Command surface of a remote player. Every call may be missing on the far
/// side, so each one is fallible.
pub trait EmbedPlayer: Send {
    fn play_video(&mut self) -> Result<(), EmbedError>;

    fn pause_video(&mut self) -> Result<(), EmbedError>;

    fn seek_to(&mut self, seconds: f64, allow_seek_ahead: bool) -> Result<(), EmbedError>;

    fn current_time(&self) -> Option<f64>;

    fn duration(&self) -> Option<f64>;

    fn destroy(&mut self);
}

#[derive(Default)]
struct PlayerSlot {
    player: Option<Box<dyn EmbedPlayer>>,
    destroyed: bool,
}

struct EmbedShared {
    slot: Mutex<PlayerSlot>,
    ready: AtomicBool,
    controls_enabled: AtomicBool,
    events: EventSink,
}

impl EmbedShared {
    fn slot(&self) -> MutexGuard<'_, PlayerSlot> {
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Translates remote player events into backend events
#[derive(Clone)]
pub struct EmbedEventSink {
    shared: Arc<EmbedShared>,
}

impl EmbedEventSink {
    pub fn emit(&self, event: EmbedEvent) {
        let events = &self.shared.events;
        match event {
            EmbedEvent::Ready => {
                self.shared.ready.store(true, Ordering::SeqCst);
                events.emit(BackendEvent::Ready);
            }
            EmbedEvent::StateChange(EmbedState::Playing) => {
                if !self.shared.controls_enabled.swap(true, Ordering::SeqCst) {
                    tracing::debug!(session = %events.session(), "Embed controls enabled");
                }
                events.emit(BackendEvent::Playing);
            }
            EmbedEvent::StateChange(EmbedState::Paused) => events.emit(BackendEvent::Paused),
            EmbedEvent::StateChange(EmbedState::Ended) => events.emit(BackendEvent::Ended),
            EmbedEvent::StateChange(state) => {
                tracing::trace!(session = %events.session(), ?state, "Embed state change ignored");
            }
        }
    }
}

pub struct EmbeddedBackend {
    shared: Arc<EmbedShared>,
    load_task: Option<JoinHandle<()>>,
    poll_task: Option<JoinHandle<()>>,
}

impl EmbeddedBackend {
    /// Start loading the remote player. The backend is usable immediately but
    /// rejects commands until the player reports ready.
    pub fn spawn(
        api: Arc<dyn EmbedApi>,
        loader: Arc<EmbedLibraryLoader>,
        config: EmbedPlayerConfig,
        events: EventSink,
        poll_interval: Duration,
    ) -> Self {
        let shared = Arc::new(EmbedShared {
            slot: Mutex::new(PlayerSlot::default()),
            ready: AtomicBool::new(false),
            controls_enabled: AtomicBool::new(false),
            events,
        });

        let load_task = tokio::spawn(load_player(api, loader, config, shared.clone()));
        let poll_task = tokio::spawn(poll_time(shared.clone(), poll_interval));

        Self {
            shared,
            load_task: Some(load_task),
            poll_task: Some(poll_task),
        }
    }

    fn with_player<T>(
        &self,
        f: impl FnOnce(&mut Box<dyn EmbedPlayer>) -> Result<T, EmbedError>,
    ) -> Result<T, BackendError> {
        if !self.shared.ready.load(Ordering::SeqCst) {
            return Err(BackendError::NotReady);
        }
        let mut slot = self.shared.slot();
        let player = slot.player.as_mut().ok_or(BackendError::NotReady)?;
        Ok(f(player)?)
    }
}

async fn load_player(
    api: Arc<dyn EmbedApi>,
    loader: Arc<EmbedLibraryLoader>,
    config: EmbedPlayerConfig,
    shared: Arc<EmbedShared>,
) {
    let session = shared.events.session();
    if let Err(e) = loader.ensure_loaded().await {
        tracing::warn!(session = %session, error = %e, "Embed player not created");
        return;
    }

    let sink = EmbedEventSink {
        shared: shared.clone(),
    };
    let mut slot = shared.slot();
    if slot.destroyed {
        return;
    }
    match api.create_player(&config, sink) {
        Ok(player) => {
            tracing::info!(session = %session, video_id = %config.video_id, "Embed player created");
            slot.player = Some(player);
        }
        Err(e) => {
            tracing::warn!(session = %session, video_id = %config.video_id, error = %e, "Embed player creation failed");
        }
    }
}

async fn poll_time(shared: Arc<EmbedShared>, poll_interval: Duration) {
    let mut interval = tokio::time::interval(poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately.
    interval.tick().await;

    let mut last_duration = None;
    loop {
        interval.tick().await;
        if !shared.ready.load(Ordering::SeqCst) {
            continue;
        }

        let (current_time, duration) = {
            let slot = shared.slot();
            match slot.player.as_ref() {
                Some(player) => (player.current_time(), player.duration()),
                None => continue,
            }
        };

        if let Some(current_time) = current_time {
            shared.events.emit(BackendEvent::TimeUpdate { current_time });
        }
        if let Some(duration) = duration {
            if last_duration != Some(duration) {
                last_duration = Some(duration);
                shared.events.emit(BackendEvent::DurationChange { duration });
            }
        }
    }
}

impl MediaBackend for EmbeddedBackend {
    fn kind(&self) -> MediaKind {
        MediaKind::Embed
    }

    fn play(&mut self) -> Result<(), BackendError> {
        self.with_player(|p| p.play_video())
    }

    fn pause(&mut self) -> Result<(), BackendError> {
        self.with_player(|p| p.pause_video())
    }

    fn seek(&mut self, time: f64) -> Result<(), BackendError> {
        self.with_player(|p| p.seek_to(time, true))
    }

    fn current_time(&self) -> f64 {
        self.with_player(|p| Ok(p.current_time().unwrap_or(0.0)))
            .unwrap_or(0.0)
    }

    fn duration(&self) -> f64 {
        self.with_player(|p| Ok(p.duration().unwrap_or(0.0)))
            .unwrap_or(0.0)
    }

    fn is_ready(&self) -> bool {
        self.shared.ready.load(Ordering::SeqCst) && !self.shared.slot().destroyed
    }

    fn controls_enabled(&self) -> bool {
        self.shared.controls_enabled.load(Ordering::SeqCst)
    }

    fn destroy(&mut self) {
        if let Some(task) = self.poll_task.take() {
            task.abort();
        }
        if let Some(task) = self.load_task.take() {
            task.abort();
        }

        let mut slot = self.shared.slot();
        if slot.destroyed {
            return;
        }
        slot.destroyed = true;
        self.shared.ready.store(false, Ordering::SeqCst);
        if let Some(mut player) = slot.player.take() {
            player.destroy();
            tracing::debug!(session = %self.shared.events.session(), "Embed player destroyed");
        }
    }
}

impl Drop for EmbeddedBackend {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use tokio::sync::mpsc;

    use crate::backend::{SessionEvent, SessionId};

    #[derive(Default)]
    struct RemoteState {
        time: f64,
        seeks: Vec<f64>,
        destroyed: u32,
        sink: Option<EmbedEventSink>,
    }

    struct FakeRemote {
        state: Arc<Mutex<RemoteState>>,
    }

    impl EmbedPlayer for FakeRemote {
        fn play_video(&mut self) -> Result<(), EmbedError> {
            Ok(())
        }

        fn pause_video(&mut self) -> Result<(), EmbedError> {
            Err(EmbedError::Unsupported("pauseVideo"))
        }

        fn seek_to(&mut self, seconds: f64, _allow_seek_ahead: bool) -> Result<(), EmbedError> {
            let mut state = self.state.lock().unwrap();
            state.seeks.push(seconds);
            state.time = seconds;
            Ok(())
        }

        fn current_time(&self) -> Option<f64> {
            Some(self.state.lock().unwrap().time)
        }

        fn duration(&self) -> Option<f64> {
            Some(60.0)
        }

        fn destroy(&mut self) {
            self.state.lock().unwrap().destroyed += 1;
        }
    }

    struct FakeApi {
        state: Arc<Mutex<RemoteState>>,
        created: AtomicU32,
        configs: Mutex<Vec<EmbedPlayerConfig>>,
        load_delay: Duration,
    }

    impl FakeApi {
        fn new(load_delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                state: Arc::new(Mutex::new(RemoteState::default())),
                created: AtomicU32::new(0),
                configs: Mutex::new(Vec::new()),
                load_delay,
            })
        }

        fn fire(&self, event: EmbedEvent) {
            let sink = self.state.lock().unwrap().sink.clone().expect("player created");
            sink.emit(event);
        }
    }

    #[async_trait]
    impl EmbedApi for FakeApi {
        async fn load_library(&self) -> Result<(), EmbedError> {
            tokio::time::sleep(self.load_delay).await;
            Ok(())
        }

        fn create_player(
            &self,
            config: &EmbedPlayerConfig,
            events: EmbedEventSink,
        ) -> Result<Box<dyn EmbedPlayer>, EmbedError> {
            self.created.fetch_add(1, Ordering::SeqCst);
            self.configs.lock().unwrap().push(config.clone());
            self.state.lock().unwrap().sink = Some(events);
            Ok(Box::new(FakeRemote { state: self.state.clone() }))
        }
    }

    fn spawn_backend(api: Arc<FakeApi>) -> (EmbeddedBackend, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let loader = Arc::new(EmbedLibraryLoader::new(api.clone()));
        let backend = EmbeddedBackend::spawn(
            api,
            loader,
            EmbedPlayerConfig::new("abc123".to_string(), "http://localhost".to_string()),
            EventSink::new(SessionId(7), tx),
            Duration::from_millis(500),
        );
        (backend, rx)
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<SessionEvent>) -> Vec<BackendEvent> {
        let mut events = Vec::new();
        while let Ok(e) = rx.try_recv() {
            events.push(e.event);
        }
        events
    }

    #[test]
    fn test_embed_url_carries_player_vars() {
        let config = EmbedPlayerConfig::new("abc123".to_string(), "http://host".to_string());
        assert_eq!(
            config.embed_url(),
            "https://www.youtube.com/embed/abc123?autoplay=1&controls=0&rel=0&modestbranding=1&playsinline=1&iv_load_policy=3&origin=http://host"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_commands_before_ready_fail_not_ready() {
        let api = FakeApi::new(Duration::from_millis(300));
        let (mut backend, _rx) = spawn_backend(api.clone());

        assert!(!backend.is_ready());
        assert_eq!(backend.seek(5.0), Err(BackendError::NotReady));
        assert_eq!(backend.play(), Err(BackendError::NotReady));

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(api.created.load(Ordering::SeqCst), 1);
        // Created but not yet ready.
        assert_eq!(backend.seek(5.0), Err(BackendError::NotReady));

        api.fire(EmbedEvent::Ready);
        assert!(backend.is_ready());
        backend.seek(5.0).unwrap();
        assert_eq!(api.state.lock().unwrap().seeks, vec![5.0]);
        assert!(matches!(backend.pause(), Err(BackendError::Embed(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_controls_enable_after_first_playing() {
        let api = FakeApi::new(Duration::from_millis(10));
        let (backend, mut rx) = spawn_backend(api.clone());
        tokio::time::sleep(Duration::from_millis(20)).await;

        api.fire(EmbedEvent::Ready);
        assert!(!backend.controls_enabled());
        api.fire(EmbedEvent::StateChange(EmbedState::Buffering));
        assert!(!backend.controls_enabled());
        api.fire(EmbedEvent::StateChange(EmbedState::Playing));
        assert!(backend.controls_enabled());

        assert_eq!(drain(&mut rx), vec![BackendEvent::Ready, BackendEvent::Playing]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_samples_until_destroyed() {
        let api = FakeApi::new(Duration::from_millis(10));
        let (mut backend, mut rx) = spawn_backend(api.clone());
        tokio::time::sleep(Duration::from_millis(20)).await;
        api.fire(EmbedEvent::Ready);
        api.state.lock().unwrap().time = 3.0;

        tokio::time::sleep(Duration::from_millis(1050)).await;
        let events = drain(&mut rx);
        let updates = events
            .iter()
            .filter(|e| matches!(e, BackendEvent::TimeUpdate { .. }))
            .count();
        assert_eq!(updates, 2);
        assert!(events.contains(&BackendEvent::DurationChange { duration: 60.0 }));
        assert!(events.contains(&BackendEvent::TimeUpdate { current_time: 3.0 }));

        backend.destroy();
        backend.destroy();
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(drain(&mut rx).is_empty());
        assert_eq!(api.state.lock().unwrap().destroyed, 1);
        assert!(!backend.is_ready());
    }

    #[tokio::test(start_paused = true)]
    async fn test_destroy_during_load_never_creates_player() {
        let api = FakeApi::new(Duration::from_millis(300));
        let (mut backend, _rx) = spawn_backend(api.clone());

        tokio::time::sleep(Duration::from_millis(100)).await;
        backend.destroy();
        tokio::time::sleep(Duration::from_millis(500)).await;

        assert_eq!(api.created.load(Ordering::SeqCst), 0);
    }
}
