//! View module - UI rendering
//!
//! Rendering is a pure function of the player snapshot and the feed view.
//! It returns the `ScreenLayout` of the drawn frame so input handling can
//! hit-test mouse events against what the user actually sees.
//!
//! - `utils`: formatting helpers
//! - `layout`: screen geometry and hit-testing
//! - `feed`: catalog feed with the load-more sentinel
//! - `player`: full-screen body and mini player
//! - `progress`: progress gauge and controls bar
//! - `overlays`: related sheet, autoplay countdown, help popup

mod feed;
mod layout;
mod overlays;
mod player;
mod progress;
mod utils;

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::model::{PlayerSnapshot, PresentationMode};

pub use feed::FeedView;
pub use layout::{FeedRow, ScreenLayout};

pub struct AppView;

impl AppView {
    pub fn render(
        frame: &mut Frame,
        player: &PlayerSnapshot,
        feed: &FeedView,
        show_help: bool,
    ) -> ScreenLayout {
        let mut layout = ScreenLayout::compute(frame.area(), player);

        if player.mode != PresentationMode::Full {
            render_header(frame, &layout, player);
        }

        if let Some(feed_area) = layout.feed {
            let playing_id = player.item.as_ref().map(|item| item.id.as_str());
            feed::render_feed(frame, feed_area, feed, playing_id, &mut layout);
        }

        match player.mode {
            PresentationMode::Hidden => {}
            PresentationMode::Mini => {
                if let Some(area) = layout.player {
                    player::render_mini(frame, area, player);
                }
            }
            PresentationMode::Full => {
                if let Some(body) = layout.body {
                    player::render_full_body(frame, body, player);
                    if let Some(countdown) = player.countdown.as_ref() {
                        overlays::render_countdown(frame, body, countdown);
                    }
                }
                if let Some(sheet) = layout.sheet {
                    overlays::render_related_sheet(frame, sheet, player);
                }
                if let Some(controls) = layout.controls {
                    progress::render_controls(frame, controls, player);
                }
            }
        }

        if show_help {
            overlays::render_help_popup(frame);
        }

        layout
    }
}

fn render_header(frame: &mut Frame, layout: &ScreenLayout, player: &PlayerSnapshot) {
    let status = match (player.mode, player.item.as_ref()) {
        (PresentationMode::Mini, Some(item)) => {
            let icon = if player.is_playing { "▶" } else { "⏸" };
            format!("{} {}", icon, item.title)
        }
        _ => "Nothing playing".to_string(),
    };

    let header = Paragraph::new(Line::from(vec![
        Span::styled(
            " shortreels ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(status, Style::default().fg(Color::Gray)),
    ]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title_bottom(Line::from(" h help · q quit ").right_aligned()),
    );
    frame.render_widget(header, layout.header);
}
