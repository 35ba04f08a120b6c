//! Recording backend factory and a controller harness for tests

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::time::Instant;

use crate::backend::{BackendError, BackendEvent, BackendFactory, EventSink, MediaBackend, SessionId};
use crate::config::PlayerTuning;
use crate::model::{fixtures, CatalogItem, MediaKind};

use super::PlayerController;

#[derive(Default)]
pub struct FactoryState {
    pub log: Vec<String>,
    pub seeks: Vec<f64>,
    pub live: i32,
    pub max_live: i32,
    pub reject_play: bool,
    pub pip_supported: bool,
    pub controls_enabled: HashSet<String>,
    pub sinks: HashMap<SessionId, EventSink>,
    pub last_session: Option<SessionId>,
}

#[derive(Clone, Default)]
pub struct FakeFactory {
    state: Arc<Mutex<FactoryState>>,
}

impl FakeFactory {
    pub fn state(&self) -> MutexGuard<'_, FactoryState> {
        self.state.lock().unwrap()
    }

    pub fn reject_play(&self, reject: bool) {
        self.state().reject_play = reject;
    }

    pub fn support_pip(&self, supported: bool) {
        self.state().pip_supported = supported;
    }

    pub fn enable_controls(&self, item_id: &str) {
        self.state().controls_enabled.insert(item_id.to_string());
    }
}

impl BackendFactory for FakeFactory {
    fn create(&self, item: &CatalogItem, events: EventSink) -> Box<dyn MediaBackend> {
        let mut state = self.state();
        state.log.push(format!("create:{}", item.id));
        state.live += 1;
        state.max_live = state.max_live.max(state.live);
        state.last_session = Some(events.session());
        state.sinks.insert(events.session(), events);
        Box::new(FakeBackend {
            item_id: item.id.clone(),
            kind: item.media_kind,
            state: self.state.clone(),
            destroyed: false,
        })
    }
}

struct FakeBackend {
    item_id: String,
    kind: MediaKind,
    state: Arc<Mutex<FactoryState>>,
    destroyed: bool,
}

impl FakeBackend {
    fn record(&self, action: &str) {
        self.state
            .lock()
            .unwrap()
            .log
            .push(format!("{}:{}", action, self.item_id));
    }
}

impl MediaBackend for FakeBackend {
    fn kind(&self) -> MediaKind {
        self.kind
    }

    fn play(&mut self) -> Result<(), BackendError> {
        self.record("play");
        if self.state.lock().unwrap().reject_play {
            Err(BackendError::PlaybackRejected)
        } else {
            Ok(())
        }
    }

    fn pause(&mut self) -> Result<(), BackendError> {
        self.record("pause");
        Ok(())
    }

    fn seek(&mut self, time: f64) -> Result<(), BackendError> {
        self.state.lock().unwrap().seeks.push(time);
        Ok(())
    }

    fn current_time(&self) -> f64 {
        0.0
    }

    fn duration(&self) -> f64 {
        0.0
    }

    fn is_ready(&self) -> bool {
        self.kind == MediaKind::Native
    }

    fn controls_enabled(&self) -> bool {
        self.kind == MediaKind::Native
            || self.state.lock().unwrap().controls_enabled.contains(&self.item_id)
    }

    fn pip_supported(&self) -> bool {
        self.state.lock().unwrap().pip_supported
    }

    fn request_pip(&mut self) -> Result<(), BackendError> {
        self.record("pip-on");
        Ok(())
    }

    fn exit_pip(&mut self) -> Result<(), BackendError> {
        self.record("pip-off");
        Ok(())
    }

    fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.record("destroy");
        self.state.lock().unwrap().live -= 1;
    }
}

pub struct Harness {
    pub player: PlayerController,
    pub factory: FakeFactory,
}

impl Harness {
    pub fn new() -> Self {
        let factory = FakeFactory::default();
        let player = PlayerController::new(
            Arc::new(fixtures::catalog()),
            Arc::new(factory.clone()),
            PlayerTuning::default(),
        );
        Self { player, factory }
    }

    pub fn log(&self) -> Vec<String> {
        self.factory.state().log.clone()
    }

    pub fn seeks(&self) -> Vec<f64> {
        self.factory.state().seeks.clone()
    }

    pub fn live(&self) -> i32 {
        self.factory.state().live
    }

    pub fn max_live(&self) -> i32 {
        self.factory.state().max_live
    }

    pub fn last_session(&self) -> SessionId {
        self.factory.state().last_session.expect("a session was created")
    }

    /// Push `event` through the newest backend's sink.
    pub fn emit(&self, event: BackendEvent) {
        self.emit_for(self.last_session(), event);
    }

    pub fn emit_for(&self, session: SessionId, event: BackendEvent) {
        let sink = self.factory.state().sinks.get(&session).cloned().expect("known session");
        sink.emit(event);
    }

    pub async fn advance(&mut self, by: Duration) {
        let until = Instant::now() + by;
        self.player.process_until(until).await;
    }
}
