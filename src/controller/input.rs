//! Key and mouse event handling

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Position;

use crate::model::{CatalogItem, PresentationMode};
use crate::view::FeedRow;

use super::AppController;

/// Vertical delta reported for one wheel notch
const WHEEL_DELTA: f64 = 100.0;

impl AppController {
    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        // Help popup swallows everything but its own dismissal
        if self.ui.show_help_popup {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('H')) {
                self.ui.show_help_popup = false;
            }
            return;
        }

        let feed_visible = self.player.mode() != PresentationMode::Full;

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') if feed_visible => {
                self.should_quit = true;
            }
            KeyCode::Char('h') | KeyCode::Char('H') => {
                self.ui.show_help_popup = true;
            }
            KeyCode::Esc => {
                self.player.close();
            }
            KeyCode::Char(' ') => {
                self.player.toggle_play();
            }
            KeyCode::Left => {
                self.player.skip_backward();
            }
            KeyCode::Right => {
                self.player.skip_forward();
            }
            KeyCode::Char('m') | KeyCode::Char('M') => {
                self.player.minimize();
            }
            KeyCode::Char('f') | KeyCode::Char('F') => {
                self.player.restore();
            }
            KeyCode::Char('c') | KeyCode::Char('C') => {
                self.player.cancel_countdown();
            }
            KeyCode::Char('p') | KeyCode::Char('P') => {
                self.player.toggle_pip();
            }
            KeyCode::Char('s') | KeyCode::Char('S') => {
                self.player.toggle_related_sheet();
            }
            KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('K') if feed_visible => {
                self.move_selection(-1);
            }
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Char('J') if feed_visible => {
                self.move_selection(1);
            }
            KeyCode::Enter if feed_visible => {
                self.open_selected();
            }
            _ => {}
        }
    }

    pub fn handle_mouse_event(&mut self, mouse: MouseEvent) {
        if self.ui.show_help_popup {
            return;
        }
        match self.player.mode() {
            PresentationMode::Full => self.handle_player_mouse(mouse),
            PresentationMode::Hidden | PresentationMode::Mini => self.handle_feed_mouse(mouse),
        }
    }

    /// The terminal lost focus mid-gesture: treat it as a canceled pointer.
    pub fn handle_focus_lost(&mut self) {
        let viewport_height = f64::from(self.layout.area.height);
        self.player.pointer_cancel(viewport_height);
    }

    fn handle_player_mouse(&mut self, mouse: MouseEvent) {
        let MouseEvent { kind, column, row, .. } = mouse;
        let y = f64::from(row);
        let viewport_height = f64::from(self.layout.area.height);

        match kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(ratio) = self.layout.progress_ratio_at(column, row) {
                    self.seek_to_ratio(ratio);
                    return;
                }
                if let Some(item) = self.related_item_at(column, row) {
                    self.player.open(item);
                    return;
                }
                let on_control = self.layout.on_control(column, row);
                self.player.pointer_down(y, on_control);
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                self.player.pointer_move(y);
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.player.pointer_up(y, viewport_height);
            }
            MouseEventKind::ScrollDown => {
                self.player.wheel(WHEEL_DELTA);
            }
            MouseEventKind::ScrollUp => {
                self.player.wheel(-WHEEL_DELTA);
            }
            _ => {}
        }
    }

    fn handle_feed_mouse(&mut self, mouse: MouseEvent) {
        let MouseEvent { kind, column, row, .. } = mouse;
        match kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if self.layout.in_player(column, row) {
                    self.player.restore();
                    return;
                }
                if let Some(FeedRow::Item(index)) = self.layout.feed_row_at(column, row) {
                    self.ui.feed_selected = index;
                    self.open_selected();
                }
            }
            MouseEventKind::ScrollDown => self.move_selection(1),
            MouseEventKind::ScrollUp => self.move_selection(-1),
            _ => {}
        }
    }

    fn seek_to_ratio(&mut self, ratio: f64) {
        let Some(duration) = self.player.session().map(|s| s.duration) else {
            return;
        };
        self.player.seek(ratio * duration);
    }

    /// Related item under a click on the open sheet
    fn related_item_at(&self, column: u16, row: u16) -> Option<CatalogItem> {
        let sheet = self.layout.sheet?;
        if !sheet.contains(Position::new(column, row)) || row <= sheet.y {
            return None;
        }
        let index = usize::from(row - sheet.y - 1);
        let session = self.player.session()?;
        self.player
            .catalog()
            .related(&session.item)
            .get(index)
            .map(|item| (*item).clone())
    }
}
