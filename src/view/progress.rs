//! Progress bar rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Gauge},
    Frame,
};

use crate::model::PlaybackState;
use super::utils::format_seconds;
use super::ViewFrame;

pub fn render_progress_bar(frame: &mut Frame, area: Rect, view: &ViewFrame) {
    let track = &view.now_playing.track;
    let settings = &view.now_playing.settings;

    let details = if track.album.is_empty() {
        track.artist.clone()
    } else {
        format!("{} ({})", track.artist, track.album)
    };
    let status_text = match view.snapshot.state {
        PlaybackState::Stopped => format!(" ■ {}", track.title),
        PlaybackState::Playing => format!(" ▶ {} | {}", track.title, details),
        PlaybackState::Paused => format!(" ⏸  {} | {}", track.title, details),
    };

    let shuffle_text = if settings.shuffle { "Shuffle: On" } else { "Shuffle: Off" };
    let repeat_text = if settings.repeat { "Repeat: On" } else { "Repeat: Off" };
    let volume_text = match settings.volume {
        Some(volume) => format!("Vol: {}%", volume),
        None => "Vol: --".to_string(),
    };
    let format_text = match (&settings.audio_format, settings.bitrate) {
        (Some(format), Some(bitrate)) if bitrate > 0 => format!(" | {} {} kbps", format, bitrate),
        (Some(format), _) => format!(" | {}", format),
        (None, Some(bitrate)) if bitrate > 0 => format!(" | {} kbps", bitrate),
        _ => String::new(),
    };

    let time_str = format!(
        "{} / {}",
        format_seconds(view.time.elapsed_seconds),
        format_seconds(view.time.duration_seconds)
    );

    let progress_ratio = if view.time.duration_seconds > 0.0 {
        (view.time.elapsed_seconds / view.time.duration_seconds).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let inner_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(0)
        .constraints([Constraint::Length(3)])
        .split(area);

    let title = format!("{} ", status_text);
    let controls_info = format!(
        " {} | {} | {}{} ",
        shuffle_text, repeat_text, volume_text, format_text
    );

    // A failing poll dims the bar: the position shown may be old
    let gauge_color = if view.stale.is_some() { Color::DarkGray } else { Color::Green };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .title_bottom(Line::from(controls_info).right_aligned()),
        )
        .gauge_style(Style::default().fg(gauge_color))
        .ratio(progress_ratio)
        .label(time_str);

    frame.render_widget(gauge, inner_chunks[0]);
}
