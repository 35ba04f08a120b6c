//! Backend module - media transport behind one control interface
//!
//! A session plays through exactly one [`MediaBackend`]. Two variants exist:
//!
//! - `native`: a directly controllable media element (commands are synchronous,
//!   time is pushed by the element)
//! - `embedded`: a remote player created after the embed library loads
//!   (commands fail until ready, time is polled)
//!
//! Supporting modules:
//!
//! - `video_id`: embed id extraction from catalog URLs
//! - `loader`: process-wide embed library loader
//! - `local`: in-process media hosts used by the terminal front end

mod embedded;
mod loader;
mod local;
mod native;
pub mod video_id;

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::model::{CatalogItem, MediaKind};

pub use embedded::{EmbedApi, EmbedError, EmbedPlayerConfig, EmbeddedBackend};
pub use loader::EmbedLibraryLoader;
pub use local::{ClockSurface, LocalEmbedHost};
pub use native::{MediaSource, MediaSurface, NativeBackend};

/// Identifies one playback session. Every backend event carries the id of the
/// session that created the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Errors surfaced by backend commands. None of them are fatal to a session.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BackendError {
    #[error("backend is not ready for commands")]
    NotReady,

    #[error("playback was rejected by the platform")]
    PlaybackRejected,

    #[error("no media surface is available")]
    MissingSurface,

    #[error("embed player error: {0}")]
    Embed(String),
}

impl From<EmbedError> for BackendError {
    fn from(err: EmbedError) -> Self {
        BackendError::Embed(err.to_string())
    }
}

/// Events pushed by a backend into its session's sink
#[derive(Clone, Debug, PartialEq)]
pub enum BackendEvent {
    Ready,
    Playing,
    Paused,
    Ended,
    TimeUpdate { current_time: f64 },
    DurationChange { duration: f64 },
    PipEntered,
    PipLeft,
    /// A `play()` that was accepted synchronously got refused later on.
    PlayRejected,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SessionEvent {
    pub session: SessionId,
    pub event: BackendEvent,
}

/// Subscription point handed to a backend at construction
#[derive(Clone, Debug)]
pub struct EventSink {
    session: SessionId,
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl EventSink {
    pub fn new(session: SessionId, tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self { session, tx }
    }

    pub fn session(&self) -> SessionId {
        self.session
    }

    pub fn emit(&self, event: BackendEvent) {
        // The receiver only goes away when the controller shuts down.
        if self
            .tx
            .send(SessionEvent {
                session: self.session,
                event,
            })
            .is_err()
        {
            tracing::trace!(session = %self.session, "event sink closed");
        }
    }
}

/// Common control surface over both backend variants
pub trait MediaBackend: Send {
    fn kind(&self) -> MediaKind;

    fn play(&mut self) -> Result<(), BackendError>;

    fn pause(&mut self) -> Result<(), BackendError>;

    fn seek(&mut self, time: f64) -> Result<(), BackendError>;

    fn current_time(&self) -> f64;

    fn duration(&self) -> f64;

    fn is_ready(&self) -> bool;

    /// Whether UI controls may drive this backend yet
    fn controls_enabled(&self) -> bool {
        true
    }

    fn pip_supported(&self) -> bool {
        false
    }

    fn request_pip(&mut self) -> Result<(), BackendError> {
        Err(BackendError::MissingSurface)
    }

    fn exit_pip(&mut self) -> Result<(), BackendError> {
        Err(BackendError::MissingSurface)
    }

    /// Release every resource held by the backend. Calling it twice is a no-op.
    fn destroy(&mut self);
}

/// Builds the backend for a catalog item
pub trait BackendFactory: Send + Sync {
    fn create(&self, item: &CatalogItem, events: EventSink) -> Box<dyn MediaBackend>;
}

/// Picks the backend variant from the item's media kind
pub struct DefaultBackendFactory {
    surface: Arc<dyn MediaSurface>,
    embed_api: Arc<dyn EmbedApi>,
    loader: Arc<EmbedLibraryLoader>,
    origin: String,
    poll_interval: std::time::Duration,
}

impl DefaultBackendFactory {
    pub fn new(
        surface: Arc<dyn MediaSurface>,
        embed_api: Arc<dyn EmbedApi>,
        loader: Arc<EmbedLibraryLoader>,
        origin: String,
        poll_interval: std::time::Duration,
    ) -> Self {
        Self {
            surface,
            embed_api,
            loader,
            origin,
            poll_interval,
        }
    }
}

impl BackendFactory for DefaultBackendFactory {
    fn create(&self, item: &CatalogItem, events: EventSink) -> Box<dyn MediaBackend> {
        match item.media_kind {
            MediaKind::Native => {
                let source = MediaSource {
                    url: item.native_source().to_string(),
                    duration_hint: item.duration_seconds,
                };
                Box::new(NativeBackend::attach(self.surface.as_ref(), &source, events))
            }
            MediaKind::Embed => {
                let video_id = video_id::resolve(&item.media_url, &item.id);
                let config = EmbedPlayerConfig::new(video_id, self.origin.clone());
                Box::new(EmbeddedBackend::spawn(
                    self.embed_api.clone(),
                    self.loader.clone(),
                    config,
                    events,
                    self.poll_interval,
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio::time::Instant;

    use crate::backend::embedded::{EmbedEvent, EmbedEventSink, EmbedPlayer};
    use crate::backend::native::MediaElement;
    use crate::config::PlayerTuning;
    use crate::controller::PlayerController;
    use crate::model::fixtures;

    /// Clock surface that remembers which sources it was asked to attach
    #[derive(Default)]
    struct RecordingSurface {
        inner: ClockSurface,
        urls: Mutex<Vec<String>>,
    }

    impl MediaSurface for RecordingSurface {
        fn attach(
            &self,
            source: &MediaSource,
            events: EventSink,
        ) -> Result<Box<dyn MediaElement>, BackendError> {
            self.urls.lock().unwrap().push(source.url.clone());
            self.inner.attach(source, events)
        }
    }

    #[derive(Default)]
    struct RemoteStats {
        samples: AtomicU32,
        destroyed: AtomicBool,
    }

    struct RemotePlayer {
        remote: Arc<RemoteStats>,
    }

    impl EmbedPlayer for RemotePlayer {
        fn play_video(&mut self) -> Result<(), EmbedError> {
            Ok(())
        }

        fn pause_video(&mut self) -> Result<(), EmbedError> {
            Ok(())
        }

        fn seek_to(&mut self, _seconds: f64, _allow_seek_ahead: bool) -> Result<(), EmbedError> {
            Ok(())
        }

        fn current_time(&self) -> Option<f64> {
            self.remote.samples.fetch_add(1, Ordering::SeqCst);
            Some(4.0)
        }

        fn duration(&self) -> Option<f64> {
            Some(30.0)
        }

        fn destroy(&mut self) {
            self.remote.destroyed.store(true, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct RecordingApi {
        configs: Mutex<Vec<EmbedPlayerConfig>>,
        sinks: Mutex<Vec<EmbedEventSink>>,
        remote: Arc<RemoteStats>,
    }

    #[async_trait]
    impl EmbedApi for RecordingApi {
        async fn load_library(&self) -> Result<(), EmbedError> {
            Ok(())
        }

        fn create_player(
            &self,
            config: &EmbedPlayerConfig,
            events: EmbedEventSink,
        ) -> Result<Box<dyn EmbedPlayer>, EmbedError> {
            self.configs.lock().unwrap().push(config.clone());
            self.sinks.lock().unwrap().push(events);
            Ok(Box::new(RemotePlayer {
                remote: self.remote.clone(),
            }))
        }
    }

    async fn advance(player: &mut PlayerController, by: Duration) {
        player.process_until(Instant::now() + by).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_factory_builds_backend_per_media_kind() {
        let surface = Arc::new(RecordingSurface::default());
        let api = Arc::new(RecordingApi::default());
        let loader = Arc::new(EmbedLibraryLoader::new(api.clone()));
        let factory = DefaultBackendFactory::new(
            surface.clone(),
            api.clone(),
            loader,
            "http://origin.test".to_string(),
            Duration::from_millis(500),
        );
        let mut player = PlayerController::new(
            Arc::new(fixtures::catalog()),
            Arc::new(factory),
            PlayerTuning::default(),
        );

        player.open(fixtures::item("e", "food", MediaKind::Embed));
        assert_eq!(player.session().unwrap().backend.kind(), MediaKind::Embed);
        advance(&mut player, Duration::from_millis(10)).await;
        assert_eq!(
            *api.configs.lock().unwrap(),
            vec![EmbedPlayerConfig::new("e".to_string(), "http://origin.test".to_string())]
        );

        let sink = api.sinks.lock().unwrap()[0].clone();
        sink.emit(EmbedEvent::Ready);
        advance(&mut player, Duration::from_millis(1100)).await;
        assert!(player.session().unwrap().is_ready);
        assert_eq!(player.session().unwrap().current_time, 4.0);
        assert!(api.remote.samples.load(Ordering::SeqCst) > 0);

        let mut native = fixtures::item("a", "surf", MediaKind::Native);
        native.playback_url = Some("media/a-720.mp4".to_string());
        player.open(native);
        assert_eq!(player.session().unwrap().backend.kind(), MediaKind::Native);
        assert_eq!(*surface.urls.lock().unwrap(), vec!["media/a-720.mp4".to_string()]);
        assert!(api.remote.destroyed.load(Ordering::SeqCst));

        let samples = api.remote.samples.load(Ordering::SeqCst);
        advance(&mut player, Duration::from_secs(2)).await;
        assert_eq!(api.remote.samples.load(Ordering::SeqCst), samples);
        assert_eq!(player.session().unwrap().item.id, "a");
        assert!(player.session().unwrap().current_time > 0.0);
    }
}
