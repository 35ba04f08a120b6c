//! Progress bar and transport controls

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Gauge, LineGauge},
    Frame,
};

use crate::model::PlayerSnapshot;

use super::utils::format_duration;

fn status_icon(player: &PlayerSnapshot) -> &'static str {
    if player.is_playing { "▶" } else { "⏸" }
}

/// Controls bar of the full player: the gauge doubles as the seek target.
pub fn render_controls(frame: &mut Frame, area: Rect, player: &PlayerSnapshot) {
    let title = player
        .item
        .as_ref()
        .map(|item| format!(" {} {} ", status_icon(player), item.title))
        .unwrap_or_default();

    let mut controls = vec!["Space play/pause", "←/→ 10s"];
    if player.pip.supported {
        controls.push(if player.pip.active { "p exit PiP" } else { "p PiP" });
    }
    controls.push("s related");
    controls.push("m minimize");
    let controls_info = format!(" {} ", controls.join(" | "));

    let (gauge_style, label) = if player.controls_enabled {
        (
            Style::default().fg(Color::Green),
            format!(
                "{} / {}",
                format_duration(player.current_time),
                format_duration(player.duration)
            ),
        )
    } else {
        (
            Style::default().fg(Color::DarkGray),
            "Waiting for player…".to_string(),
        )
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .title_bottom(Line::from(controls_info).right_aligned()),
        )
        .gauge_style(gauge_style)
        .ratio(player.progress_ratio())
        .label(label);

    frame.render_widget(gauge, area);
}

/// Single-row progress line for the mini player
pub fn render_mini_progress(frame: &mut Frame, area: Rect, player: &PlayerSnapshot) {
    let gauge = LineGauge::default()
        .filled_style(Style::default().fg(Color::Green))
        .label(format!(
            "{} {}",
            status_icon(player),
            format_duration(player.current_time)
        ))
        .ratio(player.progress_ratio());
    frame.render_widget(gauge, area);
}
