//! Layout rendering (top bar, root sidebar)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};
use ratatui::widgets::Padding;

use crate::model::{NamePrompt, RootView, UiState};
use crate::render::ListView;
use super::ViewFrame;

pub fn render_top_bar(frame: &mut Frame, area: Rect, ui_state: &UiState, view: &ViewFrame) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),     // Filter input
            Constraint::Length(28), // Backend status
        ])
        .split(area);

    // The playlist-name prompt takes over the filter slot while open
    match &ui_state.prompt {
        Some(prompt) => render_name_prompt(frame, chunks[0], prompt),
        None => render_filter(frame, chunks[0], ui_state, view),
    }

    let (status_text, status_color) = match &view.stale {
        Some(warning) => (
            format!("⚠ stale ({} failed)", warning.consecutive_failures),
            Color::Yellow,
        ),
        None => ("● connected".to_string(), Color::Cyan),
    };
    let status = Paragraph::new(status_text)
        .style(Style::default().fg(status_color))
        .block(Block::default().borders(Borders::ALL).title(" Backend "));
    frame.render_widget(status, chunks[1]);
}

fn render_filter(frame: &mut Frame, area: Rect, ui_state: &UiState, view: &ViewFrame) {
    let filterable = view.list.view.supports_filter();
    let filter_style = if ui_state.filter_editing {
        Style::default().fg(Color::Green)
    } else if filterable {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let filter_text = if !ui_state.filter_input.is_empty() {
        ui_state.filter_input.as_str()
    } else if filterable {
        "Press / to filter..."
    } else {
        "Filtering not available here"
    };

    let filter = Paragraph::new(filter_text)
        .style(filter_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Filter ")
                .padding(Padding::horizontal(1))
                .border_style(if ui_state.filter_editing {
                    Style::default().fg(Color::Green)
                } else {
                    Style::default()
                }),
        );
    frame.render_widget(filter, area);
}

fn render_name_prompt(frame: &mut Frame, area: Rect, prompt: &NamePrompt) {
    let input = Paragraph::new(format!("{}▏", prompt.input))
        .style(Style::default().fg(Color::Yellow))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(prompt.purpose.title())
                .title_bottom(" Enter to confirm, Esc to cancel ")
                .padding(Padding::horizontal(1))
                .border_style(Style::default().fg(Color::Yellow)),
        );
    frame.render_widget(input, area);
}

pub fn render_sidebar(frame: &mut Frame, area: Rect, list: &ListView) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(9), // Roots (7 items + 2 borderlines)
            Constraint::Min(0),    // Session summary
        ])
        .split(area);

    let active_root = list.view.root();
    let root_items: Vec<ListItem> = RootView::ALL
        .iter()
        .enumerate()
        .map(|(i, root)| {
            let style = if active_root == Some(*root) {
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(format!("{} {}", i + 1, root.title())).style(style)
        })
        .collect();

    let roots = List::new(root_items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Browse ")
            .padding(Padding::horizontal(1)),
    );
    frame.render_widget(roots, chunks[0]);

    let mut summary = vec![format!("Selected: {}", list.selected.len())];
    if list.history_depth > 0 {
        summary.push(format!("Depth: {}", list.history_depth));
    }
    if list.view.is_paginated() {
        summary.push(format!("Page: {}", list.page));
    }

    let summary = Paragraph::new(summary.join("\n"))
        .style(Style::default().fg(Color::DarkGray))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Session ")
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(summary, chunks[1]);
}
