//! View module - UI rendering
//!
//! This module handles all UI rendering for the application using ratatui.
//! `TuiRenderer` receives the core's render callbacks and keeps the latest
//! values; the main loop draws them every frame.
//!
//! - `utils`: Shared utility functions (formatting, scrollable lists)
//! - `layout`: Top bar and root sidebar
//! - `content`: Browse list rendering
//! - `progress`: Progress bar rendering
//! - `overlays`: Modal overlays (error, help)

mod utils;
mod layout;
mod content;
mod progress;
mod overlays;

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::model::{NowPlaying, PlaybackSnapshot, UiState};
use crate::render::{Indicator, ListView, Renderer, StaleSnapshotWarning, TimeDisplay};

/// How long an error notification stays up.
pub const ERROR_TIMEOUT: Duration = Duration::from_secs(5);

/// Everything the render callbacks delivered so far.
#[derive(Clone, Debug, Default)]
pub struct ViewFrame {
    pub time: TimeDisplay,
    pub snapshot: PlaybackSnapshot,
    pub now_playing: NowPlaying,
    pub list: ListView,
    pub stale: Option<StaleSnapshotWarning>,
    pub error_message: Option<String>,
    pub error_timestamp: Option<Instant>,
}

impl ViewFrame {
    fn set_error(&mut self, message: String) {
        self.error_message = Some(message);
        self.error_timestamp = Some(Instant::now());
    }

    pub fn auto_clear_old_errors(&mut self) {
        if self
            .error_timestamp
            .is_some_and(|since| since.elapsed() >= ERROR_TIMEOUT)
        {
            self.error_message = None;
            self.error_timestamp = None;
        }
    }
}

/// Terminal renderer. Callbacks only store data; drawing happens in
/// [`TuiRenderer::draw`] from the UI loop.
#[derive(Default)]
pub struct TuiRenderer {
    frame: Mutex<ViewFrame>,
}

impl TuiRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_frame<R>(&self, f: impl FnOnce(&mut ViewFrame) -> R) -> R {
        let mut frame = self.frame.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut frame)
    }

    /// Copy of the current frame, with expired errors dropped.
    pub fn snapshot(&self) -> ViewFrame {
        self.with_frame(|frame| {
            frame.auto_clear_old_errors();
            frame.clone()
        })
    }

    pub fn draw(frame: &mut Frame, view: &ViewFrame, ui_state: &UiState) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Filter + backend status
                Constraint::Min(0),    // Main content (sidebar + list)
                Constraint::Length(3), // Progress bar with playback info
            ])
            .split(frame.area());

        layout::render_top_bar(frame, chunks[0], ui_state, view);

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(22), // Roots + selection summary
                Constraint::Min(0),     // Browse list
            ])
            .split(chunks[1]);

        layout::render_sidebar(frame, main_chunks[0], &view.list);
        content::render_browse_list(frame, main_chunks[1], &view.list, ui_state.cursor);

        progress::render_progress_bar(frame, chunks[2], view);

        if view.error_message.is_some() {
            overlays::render_error_notification(frame, view);
        }

        if ui_state.show_help {
            overlays::render_help_popup(frame);
        }
    }
}

impl Renderer for TuiRenderer {
    fn render_time(&self, time: TimeDisplay) {
        self.with_frame(|frame| frame.time = time);
    }

    fn render_now_playing(&self, snapshot: &PlaybackSnapshot, now_playing: &NowPlaying) {
        self.with_frame(|frame| {
            frame.snapshot = *snapshot;
            frame.now_playing = now_playing.clone();
        });
    }

    fn render_list(&self, list: &ListView) {
        self.with_frame(|frame| frame.list = list.clone());
    }

    fn render_indicator(&self, indicator: Indicator) {
        self.with_frame(|frame| match indicator {
            Indicator::Stale(warning) => frame.stale = Some(warning),
            Indicator::StaleCleared => frame.stale = None,
            Indicator::LoadFailed(message) | Indicator::ActionFailed(message) => {
                frame.set_error(message)
            }
        });
    }
}
