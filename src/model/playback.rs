//! Playback session state and the snapshot handed to the view

use crate::backend::{MediaBackend, SessionId};

use super::catalog::{CatalogItem, MediaKind};
use super::types::PresentationMode;

/// Picture-in-picture state for one session
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipState {
    /// Checked once when the backend is created
    pub supported: bool,
    pub active: bool,
}

/// Live association between a catalog item and its backend
pub struct PlaybackSession {
    pub id: SessionId,
    pub item: CatalogItem,
    pub backend: Box<dyn MediaBackend>,
    pub current_time: f64,
    pub duration: f64,
    pub is_playing: bool,
    pub is_ready: bool,
    pub pip: PipState,
}

impl PlaybackSession {
    pub fn new(id: SessionId, item: CatalogItem, backend: Box<dyn MediaBackend>) -> Self {
        let pip = PipState {
            supported: backend.kind() == MediaKind::Native && backend.pip_supported(),
            active: false,
        };
        Self {
            id,
            item,
            backend,
            current_time: 0.0,
            duration: 0.0,
            is_playing: false,
            is_ready: false,
            pip,
        }
    }

    pub fn controls_enabled(&self) -> bool {
        self.backend.controls_enabled()
    }

    pub fn destroy(&mut self) {
        tracing::debug!(session = %self.id, item = %self.item.id, "Destroying session backend");
        self.backend.destroy();
        self.is_playing = false;
        self.pip.active = false;
    }
}

/// Countdown details for rendering
#[derive(Clone, Debug, PartialEq)]
pub struct CountdownInfo {
    pub seconds_remaining: u32,
    pub next_title: String,
}

/// Everything the view needs to draw the player
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlayerSnapshot {
    pub mode: PresentationMode,
    pub item: Option<CatalogItem>,
    pub current_time: f64,
    pub duration: f64,
    pub is_playing: bool,
    pub is_ready: bool,
    pub controls_enabled: bool,
    pub pip: PipState,
    pub related_sheet_open: bool,
    pub related: Vec<CatalogItem>,
    pub drag_offset: f64,
    pub countdown: Option<CountdownInfo>,
}

impl PlayerSnapshot {
    pub fn progress_ratio(&self) -> f64 {
        if self.duration > 0.0 {
            (self.current_time / self.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}
