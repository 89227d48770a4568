//! Controller module - Application logic and event handling
//!
//! This module contains the application controller that owns the browse
//! session, handles user input and sends commands through the gateway.
//! It is organized into submodules by responsibility:
//!
//! - `input`: Key event handling
//! - `navigation`: Root switch, drill-down, back, pagination and filtering
//! - `selection`: Multi-select and bulk queue actions
//! - `playback`: Player commands

mod input;
mod navigation;
mod playback;
mod selection;

pub use navigation::FetchOutcome;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::gateway::GatewayError;
use crate::model::{BrowseSession, TouneClient, UiState};
use crate::render::{Indicator, ListView, Renderer};
use crate::sync::StatusSyncEngine;

/// Paging and filter behaviour of the browse list.
#[derive(Clone, Copy, Debug)]
pub struct BrowseConfig {
    pub page_size: u32,
    pub filter_debounce: Duration,
}

impl Default for BrowseConfig {
    fn default() -> Self {
        Self {
            page_size: 50,
            filter_debounce: Duration::from_millis(300),
        }
    }
}

#[derive(Clone)]
pub struct AppController {
    pub(crate) session: Arc<Mutex<BrowseSession>>,
    pub(crate) ui: Arc<Mutex<UiState>>,
    pub(crate) client: TouneClient,
    pub(crate) sync: StatusSyncEngine,
    pub(crate) renderer: Arc<dyn Renderer>,
    config: BrowseConfig,
    /// Pending debounced filter query.
    filter_task: Arc<std::sync::Mutex<Option<JoinHandle<()>>>>,
}

impl AppController {
    pub fn new(
        client: TouneClient,
        sync: StatusSyncEngine,
        renderer: Arc<dyn Renderer>,
        config: BrowseConfig,
    ) -> Self {
        Self {
            session: Arc::new(Mutex::new(BrowseSession::new())),
            ui: Arc::new(Mutex::new(UiState::new())),
            client,
            sync,
            renderer,
            config,
            filter_task: Arc::new(std::sync::Mutex::new(None)),
        }
    }

    pub fn sync(&self) -> &StatusSyncEngine {
        &self.sync
    }

    pub async fn ui_state(&self) -> UiState {
        self.ui.lock().await.clone()
    }

    pub async fn should_quit(&self) -> bool {
        self.ui.lock().await.should_quit
    }

    pub async fn list_view(&self) -> ListView {
        ListView::from_session(&*self.session.lock().await)
    }

    /// Push the current list to the renderer.
    pub async fn render_list(&self) {
        let list = self.list_view().await;
        self.ui.lock().await.clamp_cursor(list.items.len());
        self.renderer.render_list(&list);
    }

    /// Run `action` on its own task so a slow call never holds up input handling.
    pub(crate) fn spawn_action<F, Fut>(&self, action: F)
    where
        F: FnOnce(AppController) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        tokio::spawn(action(self.clone()));
    }

    /// Surface a failed one-shot action.
    pub(crate) fn report_error(&self, error: &GatewayError) {
        self.renderer
            .render_indicator(Indicator::ActionFailed(Self::format_error(error)));
    }

    pub(crate) fn format_error(error: &GatewayError) -> String {
        match error {
            GatewayError::Http(401) | GatewayError::Http(403) => {
                "Not authorized. Check TOUNE_API_KEY.".to_string()
            }
            GatewayError::Http(404) => "Not found on the player backend.".to_string(),
            GatewayError::Http(code) => format!("Player backend error (HTTP {}).", code),
            GatewayError::Timeout { .. } => {
                "Player backend is not responding. Try again in a moment.".to_string()
            }
            GatewayError::Network(_) => "Cannot reach the player backend.".to_string(),
            GatewayError::Parse(_) => "Unexpected response from the player backend.".to_string(),
            GatewayError::Rejected(message) => message.clone(),
        }
    }
}
