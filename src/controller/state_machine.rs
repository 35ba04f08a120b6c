//! Presentation mode transitions and session-level commands

use tokio::time::Instant;

use crate::backend::{BackendError, EventSink};
use crate::model::{CatalogItem, MediaKind, PlaybackSession, PresentationMode};

use super::{PlayerController, RetiringSession};

/// Seek target for a relative skip, clamped to the media bounds
pub fn skip_target(current_time: f64, delta: f64, duration: f64) -> f64 {
    (current_time + delta).clamp(0.0, duration.max(0.0))
}

impl PlayerController {
    /// Open `item` in full mode, replacing whatever session exists.
    pub fn open(&mut self, item: CatalogItem) {
        self.clear_countdown();
        if let Some(mut retiring) = self.retiring.take() {
            tracing::debug!(session = %retiring.session.id, "Open during grace period, tearing down now");
            retiring.session.destroy();
        }
        if let Some(mut previous) = self.session.take() {
            previous.destroy();
        }
        self.related_sheet_open = false;
        self.gestures.reset();

        let id = self.allocate_session_id();
        let sink = EventSink::new(id, self.events_tx.clone());
        let backend = self.factory.create(&item, sink);
        let mut session = PlaybackSession::new(id, item, backend);
        session.is_ready = session.backend.is_ready();

        tracing::info!(
            session = %id,
            item = %session.item.id,
            kind = ?session.item.media_kind,
            "Opened playback session"
        );

        // Embed players autoplay through their construction parameters.
        if session.item.media_kind == MediaKind::Native {
            let result = session.backend.play();
            if let Err(e) = result {
                recover(&mut session, e);
            }
        }

        self.session = Some(session);
        self.mode = PresentationMode::Full;
    }

    /// Hide the player. The backend lives on for the grace period.
    pub fn close(&mut self) {
        if self.mode == PresentationMode::Hidden {
            return;
        }
        self.mode = PresentationMode::Hidden;
        self.related_sheet_open = false;
        self.gestures.reset();
        self.clear_countdown();

        if let Some(session) = self.session.take() {
            tracing::info!(session = %session.id, "Closing player");
            let retiring = RetiringSession {
                session,
                teardown_at: Instant::now() + self.tuning.close_grace,
            };
            if let Some(mut previous) = self.retiring.replace(retiring) {
                previous.session.destroy();
            }
        }
    }

    pub fn minimize(&mut self) {
        if self.mode != PresentationMode::Full {
            return;
        }
        tracing::debug!("Minimizing player");
        self.mode = PresentationMode::Mini;
        self.related_sheet_open = false;
        self.gestures.reset();
    }

    pub fn restore(&mut self) {
        if self.mode != PresentationMode::Mini {
            return;
        }
        tracing::debug!("Restoring player");
        self.mode = PresentationMode::Full;
    }

    pub fn toggle_play(&mut self) {
        let Some(session) = self.controllable_session() else {
            return;
        };
        let was_playing = session.is_playing;
        let result = if was_playing {
            session.backend.pause()
        } else {
            session.backend.play()
        };
        match result {
            Ok(()) => {
                session.is_playing = !was_playing;
                tracing::debug!(session = %session.id, playing = session.is_playing, "Playback toggled");
            }
            Err(e) => recover(session, e),
        }
    }

    /// Seek to `time`, clamped to `[0, duration]`.
    pub fn seek(&mut self, time: f64) {
        let Some(session) = self.controllable_session() else {
            return;
        };
        let target = time.clamp(0.0, session.duration.max(0.0));
        match session.backend.seek(target) {
            Ok(()) => session.current_time = target,
            Err(e) => recover(session, e),
        }
    }

    pub fn skip(&mut self, delta: f64) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let target = skip_target(session.current_time, delta, session.duration);
        self.seek(target);
    }

    pub fn skip_forward(&mut self) {
        self.skip(self.tuning.skip_seconds);
    }

    pub fn skip_backward(&mut self) {
        self.skip(-self.tuning.skip_seconds);
    }

    /// The active session, if UI controls may currently drive it
    pub(super) fn controllable_session(&mut self) -> Option<&mut PlaybackSession> {
        if !self.mode.is_visible() {
            return None;
        }
        let session = self.session.as_mut()?;
        if !session.controls_enabled() {
            tracing::trace!(session = %session.id, "Controls not enabled yet, command ignored");
            return None;
        }
        Some(session)
    }
}

/// Degrade a failed backend command to a paused or not-ready state.
pub(super) fn recover(session: &mut PlaybackSession, error: BackendError) {
    match error {
        BackendError::NotReady => {
            tracing::debug!(session = %session.id, "Backend not ready, command ignored");
        }
        BackendError::PlaybackRejected => {
            tracing::info!(session = %session.id, "Playback rejected by platform, staying paused");
            session.is_playing = false;
        }
        BackendError::MissingSurface => {
            tracing::debug!(session = %session.id, "No media surface, command ignored");
        }
        BackendError::Embed(message) => {
            tracing::warn!(session = %session.id, error = %message, "Embed player command failed");
        }
    }
}
