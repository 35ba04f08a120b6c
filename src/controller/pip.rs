//! Picture-in-picture toggle for native sessions

use super::state_machine::recover;
use super::PlayerController;

impl PlayerController {
    /// Enter PiP when inactive, leave it when active. The active flag itself
    /// follows the backend's enter/leave events.
    pub fn toggle_pip(&mut self) {
        if !self.mode.is_visible() {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if !session.pip.supported {
            tracing::debug!(session = %session.id, "Picture-in-picture not supported");
            return;
        }

        let result = if session.pip.active {
            session.backend.exit_pip()
        } else {
            session.backend.request_pip()
        };
        if let Err(e) = result {
            recover(session, e);
        }
    }
}
