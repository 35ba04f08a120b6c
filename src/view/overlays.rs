//! Overlay rendering (related sheet, autoplay countdown, help popup)

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Frame,
};

use crate::model::{CountdownInfo, PlayerSnapshot};

use super::utils::{centered_rect, format_duration};

/// Items sharing the current category. Rows map one to one onto
/// `player.related`, which mouse hit-testing relies on.
pub fn render_related_sheet(frame: &mut Frame, area: Rect, player: &PlayerSnapshot) {
    let current_id = player.item.as_ref().map(|item| item.id.as_str());

    let items: Vec<ListItem> = player
        .related
        .iter()
        .map(|item| {
            let is_current = current_id == Some(item.id.as_str());
            let style = if is_current {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!(" {} {}", if is_current { "▶" } else { " " }, item.title),
                    style,
                ),
                Span::styled(
                    format!("  {}", format_duration(item.duration_seconds)),
                    Style::default().fg(Color::Gray),
                ),
            ]))
        })
        .collect();

    let title = player
        .item
        .as_ref()
        .map(|item| format!(" More from {} ", item.category))
        .unwrap_or_default();
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(title)
            .title_bottom(Line::from(" scroll up or s to close ").right_aligned()),
    );

    frame.render_widget(Clear, area);
    frame.render_widget(list, area);
}

pub fn render_countdown(frame: &mut Frame, area: Rect, countdown: &CountdownInfo) {
    let text = vec![
        Line::from(Span::styled(
            format!("Up next in {}s", countdown.seconds_remaining),
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(countdown.next_title.clone()),
        Line::from(Span::styled("c to cancel", Style::default().fg(Color::DarkGray))),
    ];
    let popup_area = centered_rect(area, countdown_width(&countdown.next_title), 5);

    frame.render_widget(Clear, popup_area);
    frame.render_widget(
        Paragraph::new(text)
            .centered()
            .block(Block::default().borders(Borders::ALL)),
        popup_area,
    );
}

fn countdown_width(title: &str) -> u16 {
    u16::try_from(title.chars().count())
        .unwrap_or(u16::MAX)
        .saturating_add(6)
        .clamp(24, 60)
}

pub fn render_help_popup(frame: &mut Frame) {
    let area = frame.area();

    let keybindings = vec![
        ("", "── Feed ──"),
        ("↑ / ↓  j / k", "Move selection"),
        ("Enter / click", "Open in player"),
        ("", ""),
        ("", "── Player ──"),
        ("Space", "Play / Pause"),
        ("← / →", "Skip back / forward 10s"),
        ("click gauge", "Seek"),
        ("P", "Picture-in-picture"),
        ("S / wheel", "Related sheet"),
        ("M / drag down", "Minimize"),
        ("F", "Restore full screen"),
        ("C", "Cancel autoplay"),
        ("Esc", "Close player"),
        ("", ""),
        ("", "── General ──"),
        ("H", "Toggle this help"),
        ("Q", "Quit (from the feed)"),
    ];

    let popup_height = (keybindings.len() as u16 + 2).min(area.height.saturating_sub(4));
    let popup_area = centered_rect(area, 56, popup_height);

    frame.render_widget(Clear, popup_area);

    let lines: Vec<Line> = keybindings
        .iter()
        .map(|(key, desc)| {
            if key.is_empty() {
                Line::from(Span::styled(
                    format!("{:^52}", desc),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                ))
            } else {
                Line::from(vec![
                    Span::styled(
                        format!("{:>16}", key),
                        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::styled(desc.to_string(), Style::default().fg(Color::White)),
                ])
            }
        })
        .collect();

    let help_text = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Help (H or Esc to close) ")
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .style(Style::default().bg(Color::Black)),
    );

    frame.render_widget(help_text, popup_area);
}
