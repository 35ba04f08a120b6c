//! Core type definitions for the player and the UI

use tokio::time::Instant;

use super::catalog::CatalogItem;

/// Visibility/layout state of the player
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PresentationMode {
    #[default]
    Hidden,
    Full,
    Mini,
}

impl PresentationMode {
    pub fn is_visible(self) -> bool {
        self != PresentationMode::Hidden
    }
}

/// An active pointer drag in full mode
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragState {
    pub origin_y: f64,
    /// Downward distance from the origin, never negative
    pub offset: f64,
}

impl DragState {
    pub fn new(origin_y: f64) -> Self {
        Self {
            origin_y,
            offset: 0.0,
        }
    }

    pub fn track(&mut self, current_y: f64) {
        self.offset = (current_y - self.origin_y).max(0.0);
    }
}

/// Pending auto-advance to the next related item
#[derive(Clone, Debug, PartialEq)]
pub struct CountdownState {
    pub seconds_remaining: u32,
    pub next_item: CatalogItem,
    pub next_tick: Instant,
}

/// UI state outside the player
#[derive(Clone, Debug, Default)]
pub struct UiState {
    /// Cursor over the flattened list of revealed items
    pub feed_selected: usize,
    pub show_help_popup: bool,
}
