//! Main content area rendering (the browse list)

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, ListItem, Paragraph},
    Frame,
};
use ratatui::widgets::Padding;

use crate::render::ListView;
use super::utils::{calculate_num_width, render_scrollable_list, truncate_string};

pub fn render_browse_list(frame: &mut Frame, area: Rect, list: &ListView, cursor: usize) {
    let border_style = Style::default().fg(Color::Green);
    let title = if list.filter_query.is_empty() {
        format!(" {} ", list.title)
    } else {
        format!(" {} [{}] ", list.title, list.filter_query)
    };

    if list.items.is_empty() {
        let (message, color) = if list.is_loading {
            ("Loading...", Color::Yellow)
        } else {
            ("Nothing here", Color::DarkGray)
        };
        let empty = Paragraph::new(message)
            .style(Style::default().fg(color))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .padding(Padding::horizontal(1))
                    .border_style(border_style),
            );
        frame.render_widget(empty, area);
        return;
    }

    let content_width = area.width.saturating_sub(4) as usize;
    let num_width = calculate_num_width(list.items.len());
    let badge_width = 6;
    // leading space + num + sep + mark + sep + label + sep + badge
    let label_width = content_width.saturating_sub(1 + num_width + 3 + 1 + 3 + 3 + badge_width);

    let mut items: Vec<ListItem> = list
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let selected = list.is_selected(item);
            let style = if i == cursor {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else if selected {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default()
            };

            let mark = if selected {
                "●"
            } else if item.is_folder() {
                "▸"
            } else {
                " "
            };
            let badge = item.badge().unwrap_or_default();

            ListItem::new(format!(
                " {:<num_width$}   {}   {}   {:>badge_width$}",
                i + 1,
                mark,
                truncate_string(&item.label(), label_width),
                badge,
                num_width = num_width,
                badge_width = badge_width,
            ))
            .style(style)
        })
        .collect();

    if list.is_loading {
        items.push(ListItem::new("  Loading more...").style(Style::default().fg(Color::Yellow)));
    } else if list.has_more {
        items.push(ListItem::new("  ↓ more").style(Style::default().fg(Color::DarkGray)));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding::horizontal(1))
        .border_style(border_style);

    render_scrollable_list(frame, area, items, cursor, block);
}
