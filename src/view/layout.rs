//! Screen geometry shared by rendering and mouse hit-testing

use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};

use crate::model::{PlayerSnapshot, PresentationMode};

const HEADER_HEIGHT: u16 = 3;
const CONTROLS_HEIGHT: u16 = 3;
const MINI_WIDTH: u16 = 40;
const MINI_HEIGHT: u16 = 5;
const SHEET_PERCENT: u16 = 40;

/// What a row of the feed list shows
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeedRow {
    Group(usize),
    /// Index into the flattened list of revealed items
    Item(usize),
    Sentinel,
}

/// Rectangles of the last rendered frame
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScreenLayout {
    pub area: Rect,
    pub header: Rect,
    /// Feed list, `None` while the full player covers it
    pub feed: Option<Rect>,
    /// Rows of the feed list, with the offset of the first visible one
    pub feed_rows: Vec<FeedRow>,
    pub feed_offset: usize,
    pub player: Option<Rect>,
    pub body: Option<Rect>,
    pub controls: Option<Rect>,
    pub sheet: Option<Rect>,
    pub sentinel_visible: bool,
}

impl ScreenLayout {
    pub fn compute(area: Rect, player: &PlayerSnapshot) -> Self {
        let header = Rect {
            height: HEADER_HEIGHT.min(area.height),
            ..area
        };
        let below_header = Rect {
            y: area.y + header.height,
            height: area.height.saturating_sub(header.height),
            ..area
        };

        let mut layout = Self {
            area,
            header,
            ..Self::default()
        };

        match player.mode {
            PresentationMode::Hidden => {
                layout.feed = Some(below_header);
            }
            PresentationMode::Mini => {
                layout.feed = Some(below_header);
                let width = MINI_WIDTH.min(area.width);
                let height = MINI_HEIGHT.min(area.height);
                layout.player = Some(Rect {
                    x: area.x + area.width - width,
                    y: area.y + area.height - height,
                    width,
                    height,
                });
            }
            PresentationMode::Full => {
                let shift = (player.drag_offset.max(0.0) as u16).min(area.height.saturating_sub(1));
                let shifted = Rect {
                    y: area.y + shift,
                    height: area.height - shift,
                    ..area
                };
                layout.player = Some(shifted);

                let sheet_height = if player.related_sheet_open {
                    shifted.height.saturating_mul(SHEET_PERCENT) / 100
                } else {
                    0
                };
                let chunks = Layout::default()
                    .direction(Direction::Vertical)
                    .constraints([
                        Constraint::Min(0),
                        Constraint::Length(sheet_height),
                        Constraint::Length(CONTROLS_HEIGHT),
                    ])
                    .split(shifted);
                layout.body = Some(chunks[0]);
                layout.sheet = player.related_sheet_open.then_some(chunks[1]);
                layout.controls = Some(chunks[2]);
            }
        }
        layout
    }

    /// Whether `(column, row)` lands on a control in the full player
    pub fn on_control(&self, column: u16, row: u16) -> bool {
        let position = Position::new(column, row);
        [self.controls, self.sheet]
            .iter()
            .flatten()
            .any(|rect| rect.contains(position))
    }

    pub fn in_player(&self, column: u16, row: u16) -> bool {
        self.player
            .is_some_and(|rect| rect.contains(Position::new(column, row)))
    }

    /// Feed row under `row`, accounting for the list border and scroll offset
    pub fn feed_row_at(&self, column: u16, row: u16) -> Option<FeedRow> {
        let feed = self.feed?;
        if !feed.contains(Position::new(column, row)) || row <= feed.y {
            return None;
        }
        let index = self.feed_offset + usize::from(row - feed.y - 1);
        self.feed_rows.get(index).copied()
    }

    /// Position within the progress gauge as a 0..=1 ratio
    pub fn progress_ratio_at(&self, column: u16, row: u16) -> Option<f64> {
        let controls = self.controls?;
        if !controls.contains(Position::new(column, row)) {
            return None;
        }
        let inner_width = controls.width.saturating_sub(2);
        if inner_width == 0 {
            return None;
        }
        let x = column.saturating_sub(controls.x + 1).min(inner_width);
        Some(f64::from(x) / f64::from(inner_width))
    }
}
