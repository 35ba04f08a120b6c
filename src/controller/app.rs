//! Application controller: the player engine plus feed and UI state

use crate::model::{CatalogItem, FeedReveal, PlayerSnapshot, UiState};
use crate::view::{FeedView, ScreenLayout};

use super::PlayerController;

pub struct AppController {
    pub(super) player: PlayerController,
    pub(super) ui: UiState,
    pub(super) feed: FeedReveal,
    /// Layout of the last drawn frame, used for mouse hit-testing
    pub(super) layout: ScreenLayout,
    pub(super) should_quit: bool,
}

impl AppController {
    pub fn new(player: PlayerController, initial_reveal: usize) -> Self {
        let feed = FeedReveal::new(initial_reveal, player.catalog().group_count());
        Self {
            player,
            ui: UiState::default(),
            feed,
            layout: ScreenLayout::default(),
            should_quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn show_help(&self) -> bool {
        self.ui.show_help_popup
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        self.player.snapshot()
    }

    pub fn feed_view(&self) -> FeedView<'_> {
        let groups = self.player.catalog().groups();
        FeedView {
            groups: &groups[..self.feed.revealed_count().min(groups.len())],
            has_sentinel: self.feed.has_sentinel(),
            selected: self.ui.feed_selected,
            total_groups: self.feed.total(),
        }
    }

    pub(super) fn revealed_items(&self) -> impl Iterator<Item = &CatalogItem> {
        self.feed_view().groups.iter().flat_map(|g| g.items.iter())
    }

    /// Record the layout of a drawn frame and report sentinel visibility.
    pub fn apply_layout(&mut self, layout: ScreenLayout) {
        if self.feed.observe_sentinel(layout.sentinel_visible) {
            tracing::debug!(revealed = self.feed.revealed_count(), "Feed grew");
        }
        self.layout = layout;
    }

    pub(super) fn move_selection(&mut self, delta: isize) {
        let count = self.revealed_items().count();
        if count == 0 {
            return;
        }
        let selected = self.ui.feed_selected.saturating_add_signed(delta);
        self.ui.feed_selected = selected.min(count - 1);
    }

    pub(super) fn open_selected(&mut self) {
        let Some(item) = self.revealed_items().nth(self.ui.feed_selected).cloned() else {
            return;
        };
        self.player.open(item);
    }

    /// Wait for the next backend event or player timer and handle it.
    pub async fn process_next(&mut self) {
        self.player.process_next().await;
    }
}
