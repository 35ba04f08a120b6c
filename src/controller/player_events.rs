//! Backend event handling

use crate::backend::{BackendEvent, SessionEvent};

use super::PlayerController;

impl PlayerController {
    pub(super) fn handle_session_event(&mut self, SessionEvent { session: id, event }: SessionEvent) {
        let Some(session) = self.session.as_mut().filter(|s| s.id == id) else {
            tracing::trace!(session = %id, ?event, "Dropping event from inactive session");
            return;
        };

        match event {
            BackendEvent::Ready => {
                tracing::debug!(session = %id, "Backend ready");
                session.is_ready = true;
                let duration = session.backend.duration();
                if duration > 0.0 {
                    session.duration = duration;
                }
            }
            BackendEvent::Playing => {
                tracing::trace!(session = %id, "BackendEvent::Playing");
                session.is_playing = true;
            }
            BackendEvent::Paused => {
                tracing::trace!(session = %id, "BackendEvent::Paused");
                session.is_playing = false;
            }
            BackendEvent::PlayRejected => {
                tracing::info!(session = %id, "Playback rejected by platform, staying paused");
                session.is_playing = false;
            }
            BackendEvent::TimeUpdate { current_time } => {
                if current_time.is_finite() {
                    session.current_time = current_time.max(0.0);
                }
            }
            BackendEvent::DurationChange { duration } => {
                if duration.is_finite() && duration >= 0.0 {
                    session.duration = duration;
                }
            }
            BackendEvent::PipEntered => {
                tracing::debug!(session = %id, "Entered picture-in-picture");
                session.pip.active = true;
            }
            BackendEvent::PipLeft => {
                tracing::debug!(session = %id, "Left picture-in-picture");
                session.pip.active = false;
            }
            BackendEvent::Ended => {
                tracing::debug!(session = %id, item = %session.item.id, "BackendEvent::Ended");
                session.is_playing = false;
                session.current_time = session.duration;
                self.start_countdown();
            }
        }
    }
}
