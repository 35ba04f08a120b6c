//! Controller module - the player control engine and input handling
//!
//! `PlayerController` is the single writer of the presentation mode and the
//! playback session. It is driven from one event loop: backend events arrive
//! on a channel, timers are deadlines checked by the same loop.
//!
//! - `state_machine`: open / close / minimize / restore and session commands
//! - `player_events`: backend event handling
//! - `gestures`: drag-to-minimize and related-sheet recognizers
//! - `autoplay`: countdown to the next related item
//! - `pip`: picture-in-picture toggle
//! - `app`: application controller owning the player, feed and UI state
//! - `input`: terminal key and mouse mapping

mod app;
mod autoplay;
mod gestures;
mod input;
mod pip;
mod player_events;
mod state_machine;
#[cfg(test)]
mod test_support;

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::backend::{BackendFactory, SessionEvent, SessionId};
use crate::config::PlayerTuning;
use crate::model::{
    Catalog, CountdownInfo, CountdownState, PlaybackSession, PlayerSnapshot, PresentationMode,
};

pub use gestures::GestureController;
pub use app::AppController;

/// A session that was closed and waits for its grace period to end
struct RetiringSession {
    session: PlaybackSession,
    teardown_at: Instant,
}

enum Wake {
    Event(Option<SessionEvent>),
    Timer,
    Done,
}

pub struct PlayerController {
    catalog: Arc<Catalog>,
    factory: Arc<dyn BackendFactory>,
    tuning: PlayerTuning,
    mode: PresentationMode,
    session: Option<PlaybackSession>,
    retiring: Option<RetiringSession>,
    countdown: Option<CountdownState>,
    related_sheet_open: bool,
    gestures: GestureController,
    last_session_id: u64,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events_rx: mpsc::UnboundedReceiver<SessionEvent>,
}

impl PlayerController {
    pub fn new(catalog: Arc<Catalog>, factory: Arc<dyn BackendFactory>, tuning: PlayerTuning) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let gestures = GestureController::new(&tuning);
        Self {
            catalog,
            factory,
            tuning,
            mode: PresentationMode::Hidden,
            session: None,
            retiring: None,
            countdown: None,
            related_sheet_open: false,
            gestures,
            last_session_id: 0,
            events_tx,
            events_rx,
        }
    }

    pub fn mode(&self) -> PresentationMode {
        self.mode
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    pub fn is_related_sheet_open(&self) -> bool {
        self.related_sheet_open
    }

    pub fn countdown(&self) -> Option<&CountdownState> {
        self.countdown.as_ref()
    }

    /// Sessions whose backend has not been destroyed yet
    #[cfg(test)]
    pub fn live_session_count(&self) -> usize {
        usize::from(self.session.is_some()) + usize::from(self.retiring.is_some())
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        let countdown = self.countdown.as_ref().map(|c| CountdownInfo {
            seconds_remaining: c.seconds_remaining,
            next_title: c.next_item.title.clone(),
        });

        match &self.session {
            Some(session) => PlayerSnapshot {
                mode: self.mode,
                item: Some(session.item.clone()),
                current_time: session.current_time,
                duration: session.duration,
                is_playing: session.is_playing,
                is_ready: session.is_ready,
                controls_enabled: session.controls_enabled(),
                pip: session.pip,
                related_sheet_open: self.related_sheet_open,
                related: self
                    .catalog
                    .related(&session.item)
                    .into_iter()
                    .cloned()
                    .collect(),
                drag_offset: self.gestures.drag_offset(),
                countdown,
            },
            None => PlayerSnapshot {
                mode: self.mode,
                ..PlayerSnapshot::default()
            },
        }
    }

    fn allocate_session_id(&mut self) -> SessionId {
        self.last_session_id += 1;
        SessionId(self.last_session_id)
    }

    /// Earliest pending timer
    pub fn next_deadline(&self) -> Option<Instant> {
        let teardown = self.retiring.as_ref().map(|r| r.teardown_at);
        let tick = self.countdown.as_ref().map(|c| c.next_tick);
        match (teardown, tick) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Run every timer due at `now`.
    pub fn fire_due_timers(&mut self, now: Instant) {
        if self.retiring.as_ref().is_some_and(|r| r.teardown_at <= now) {
            if let Some(mut retiring) = self.retiring.take() {
                retiring.session.destroy();
                tracing::debug!(session = %retiring.session.id, "Grace period over, session torn down");
            }
        }

        while self.countdown.as_ref().is_some_and(|c| c.next_tick <= now) {
            self.tick_countdown();
        }
    }

    /// Wait for the next backend event or timer and handle it.
    pub async fn process_next(&mut self) {
        let deadline = self.next_deadline();
        let wake = tokio::select! {
            biased;
            event = self.events_rx.recv() => Wake::Event(event),
            _ = wait_for(deadline) => Wake::Timer,
        };
        self.handle_wake(wake);
    }

    /// Handle events and timers until `until` has passed.
    pub async fn process_until(&mut self, until: Instant) {
        loop {
            let deadline = self.next_deadline().filter(|d| *d <= until);
            let wake = tokio::select! {
                biased;
                event = self.events_rx.recv() => Wake::Event(event),
                _ = wait_for(deadline) => Wake::Timer,
                _ = tokio::time::sleep_until(until) => Wake::Done,
            };
            if matches!(wake, Wake::Done) {
                self.fire_due_timers(until);
                return;
            }
            self.handle_wake(wake);
        }
    }

    fn handle_wake(&mut self, wake: Wake) {
        match wake {
            Wake::Event(Some(event)) => self.handle_session_event(event),
            Wake::Event(None) => tracing::warn!("Backend event channel closed"),
            Wake::Timer => self.fire_due_timers(Instant::now()),
            Wake::Done => {}
        }
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
