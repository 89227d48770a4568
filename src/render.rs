//! Render callbacks: the only way the core talks to a presentation layer
//!
//! Everything passed here is plain owned data. Implementations must not block;
//! they are called from the poll loop, the tick loop and controller tasks.

use std::collections::HashSet;

use crate::gateway::GatewayError;
use crate::model::{BrowseItem, BrowseSession, NowPlaying, PlaybackSnapshot, View};

/// Position to show on the progress control.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TimeDisplay {
    pub elapsed_seconds: f64,
    pub duration_seconds: f64,
}

/// Emitted after each failed poll until the next success.
#[derive(Clone, Debug, PartialEq)]
pub struct StaleSnapshotWarning {
    pub consecutive_failures: u32,
    pub last_error: GatewayError,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Indicator {
    /// Background status polling is failing; the shown snapshot is old.
    Stale(StaleSnapshotWarning),
    /// Polling recovered.
    StaleCleared,
    /// A list fetch failed; the previous list is still shown.
    LoadFailed(String),
    /// A one-shot user action failed.
    ActionFailed(String),
}

/// Snapshot of the browse list for rendering.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListView {
    pub view: View,
    pub title: String,
    pub items: Vec<BrowseItem>,
    pub page: u32,
    pub has_more: bool,
    pub is_loading: bool,
    pub filter_query: String,
    pub selected: HashSet<String>,
    pub history_depth: usize,
}

impl ListView {
    pub fn from_session(session: &BrowseSession) -> Self {
        let selected = session.selection.iter().map(str::to_string).collect();
        Self {
            view: session.view.current_view.clone(),
            title: session.view.title.clone(),
            items: session.items.clone(),
            page: session.view.current_page,
            has_more: session.has_more,
            is_loading: session.is_loading,
            filter_query: session.view.filter_query.clone(),
            selected,
            history_depth: session.navigation.depth(),
        }
    }

    pub fn is_selected(&self, item: &BrowseItem) -> bool {
        self.view
            .selectable_id(item)
            .is_some_and(|id| self.selected.contains(id))
    }
}

pub trait Renderer: Send + Sync {
    fn render_time(&self, time: TimeDisplay);
    fn render_now_playing(&self, snapshot: &PlaybackSnapshot, now_playing: &NowPlaying);
    fn render_list(&self, list: &ListView);
    fn render_indicator(&self, indicator: Indicator);
}

/// Drops everything. For headless use.
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render_time(&self, _time: TimeDisplay) {}
    fn render_now_playing(&self, _snapshot: &PlaybackSnapshot, _now_playing: &NowPlaying) {}
    fn render_list(&self, _list: &ListView) {}
    fn render_indicator(&self, _indicator: Indicator) {}
}
