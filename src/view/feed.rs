//! Catalog feed rendering

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use crate::model::CategoryGroup;

use super::layout::{FeedRow, ScreenLayout};
use super::utils::{format_duration, kind_badge, truncate_string};

/// The revealed part of the catalog, as handed to the view
pub struct FeedView<'a> {
    pub groups: &'a [CategoryGroup],
    pub has_sentinel: bool,
    /// Index into the flattened list of revealed items
    pub selected: usize,
    pub total_groups: usize,
}

/// Row model of the feed list: a header per group, its items, then the
/// sentinel when more groups remain.
pub fn feed_rows(groups: &[CategoryGroup], has_sentinel: bool) -> Vec<FeedRow> {
    let mut rows = Vec::new();
    let mut item_index = 0;
    for (group_index, group) in groups.iter().enumerate() {
        rows.push(FeedRow::Group(group_index));
        for _ in &group.items {
            rows.push(FeedRow::Item(item_index));
            item_index += 1;
        }
    }
    if has_sentinel {
        rows.push(FeedRow::Sentinel);
    }
    rows
}

pub fn render_feed(
    frame: &mut Frame,
    area: Rect,
    feed: &FeedView,
    playing_id: Option<&str>,
    layout: &mut ScreenLayout,
) {
    let rows = feed_rows(feed.groups, feed.has_sentinel);
    let items_flat: Vec<_> = feed.groups.iter().flat_map(|g| g.items.iter()).collect();
    let title_width = (area.width as usize).saturating_sub(24).max(8);

    let list_items: Vec<ListItem> = rows
        .iter()
        .map(|row| match *row {
            FeedRow::Group(index) => {
                let group = &feed.groups[index];
                let icon = if group.category.icon.is_empty() {
                    "▸"
                } else {
                    group.category.icon.as_str()
                };
                ListItem::new(Line::from(Span::styled(
                    format!("{} {} ({})", icon, group.category.name, group.items.len()),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )))
            }
            FeedRow::Item(index) => {
                let item = items_flat[index];
                let is_selected = index == feed.selected;
                let is_playing = playing_id == Some(item.id.as_str());

                let marker = if is_playing { "▶ " } else { "  " };
                let style = if is_selected {
                    Style::default().fg(Color::Black).bg(Color::Cyan)
                } else if is_playing {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default()
                };

                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!(" {}{}", marker, truncate_string(&item.title, title_width)),
                        style,
                    ),
                    Span::styled(
                        format!(" {:>6}", format_duration(item.duration_seconds)),
                        Style::default().fg(Color::Gray),
                    ),
                    Span::styled(
                        format!("  {}", kind_badge(item.media_kind)),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]))
            }
            FeedRow::Sentinel => ListItem::new(Line::from(Span::styled(
                "   … loading more",
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            ))),
        })
        .collect();

    let block = Block::default().borders(Borders::ALL).title(format!(
        " Feed ({}/{} categories) ",
        feed.groups.len(),
        feed.total_groups
    ));
    let list = List::new(list_items).block(block);

    let selected_row = rows
        .iter()
        .position(|row| *row == FeedRow::Item(feed.selected));
    let mut list_state = ListState::default();
    list_state.select(selected_row);
    frame.render_stateful_widget(list, area, &mut list_state);

    let visible_rows = usize::from(area.height.saturating_sub(2));
    let offset = list_state.offset();
    layout.sentinel_visible = feed.has_sentinel
        && rows.len().saturating_sub(1) < offset + visible_rows;
    layout.feed_offset = offset;
    layout.feed_rows = rows;
}
