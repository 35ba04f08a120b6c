//! Full-screen and mini player rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::model::{MediaKind, PlayerSnapshot};

use super::progress::render_mini_progress;
use super::utils::{kind_badge, truncate_string};

fn playback_status(player: &PlayerSnapshot) -> (&'static str, Color) {
    if !player.is_ready {
        ("Loading player…", Color::DarkGray)
    } else if player.pip.active {
        ("Playing in picture-in-picture", Color::Magenta)
    } else if player.is_playing {
        ("Playing", Color::Green)
    } else {
        ("Paused", Color::Yellow)
    }
}

pub fn render_full_body(frame: &mut Frame, area: Rect, player: &PlayerSnapshot) {
    let Some(item) = player.item.as_ref() else {
        return;
    };
    let (status, status_color) = playback_status(player);

    let source = match item.media_kind {
        MediaKind::Native => item.native_source(),
        MediaKind::Embed => item.media_url.as_str(),
    };

    let mut lines = vec![
        Line::from(Span::styled(
            item.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled(item.category.clone(), Style::default().fg(Color::Yellow)),
            Span::raw("  "),
            Span::styled(kind_badge(item.media_kind), Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(""),
        Line::from(Span::styled(status, Style::default().fg(status_color))),
        Line::from(Span::styled(source.to_string(), Style::default().fg(Color::DarkGray))),
    ];
    if player.drag_offset > 0.0 {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "↓ keep dragging to minimize",
            Style::default().fg(Color::Cyan),
        )));
    }

    let body = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Now playing ")
                .title_bottom(Line::from(" drag down to minimize · Esc close ").right_aligned()),
        );

    frame.render_widget(Clear, area);
    frame.render_widget(body, area);
}

pub fn render_mini(frame: &mut Frame, area: Rect, player: &PlayerSnapshot) {
    let Some(item) = player.item.as_ref() else {
        return;
    };
    frame.render_widget(Clear, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(" Mini player ")
        .title_bottom(Line::from(" f expand · Esc close ").right_aligned());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    let title = truncate_string(&item.title, usize::from(inner.width));
    frame.render_widget(Paragraph::new(title), chunks[0]);
    render_mini_progress(frame, chunks[1], player);
}
