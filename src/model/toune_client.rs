//! Typed wrapper over the backend API, one method per endpoint in use

use std::time::Duration;

use futures::{stream, StreamExt, TryStreamExt};
use serde::Deserialize;
use serde_json::json;

use crate::gateway::{GatewayError, Method, RequestGateway};

use super::content::{ListPage, ListResponse};
use super::playback::{OutputDevice, StatusReport};
use super::types::View;

/// Reply of command/mutation calls.
#[derive(Debug, Deserialize)]
struct Ack {
    #[serde(default = "default_ok")]
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

fn default_ok() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct OutputsResponse {
    #[serde(default = "default_ok")]
    ok: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    outputs: Vec<OutputDevice>,
}

impl Ack {
    fn into_result(self) -> Result<(), GatewayError> {
        if self.ok {
            Ok(())
        } else {
            Err(GatewayError::Rejected(
                self.error.unwrap_or_else(|| "request refused".to_string()),
            ))
        }
    }
}

/// Transport controls under `/api/player/<action>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlayerAction {
    Play,
    Pause,
    Stop,
    Next,
    Previous,
    Toggle,
    Shuffle,
    Repeat,
}

impl PlayerAction {
    pub fn as_str(self) -> &'static str {
        match self {
            PlayerAction::Play => "play",
            PlayerAction::Pause => "pause",
            PlayerAction::Stop => "stop",
            PlayerAction::Next => "next",
            PlayerAction::Previous => "previous",
            PlayerAction::Toggle => "toggle",
            PlayerAction::Shuffle => "shuffle",
            PlayerAction::Repeat => "repeat",
        }
    }
}

#[derive(Clone)]
pub struct TouneClient {
    gateway: RequestGateway,
}

impl TouneClient {
    pub fn new(gateway: RequestGateway) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &RequestGateway {
        &self.gateway
    }

    async fn command(&self, endpoint: &str, body: Option<serde_json::Value>) -> Result<(), GatewayError> {
        let ack: Ack = self.gateway.post(endpoint, body).await?;
        ack.into_result()
    }

    pub async fn status(&self, timeout: Option<Duration>) -> Result<StatusReport, GatewayError> {
        let report: StatusReport = self
            .gateway
            .request("/api/status", Method::Get, None, timeout)
            .await?;
        if report.ok == Some(false) {
            return Err(GatewayError::Rejected(
                report.error.unwrap_or_else(|| "status unavailable".to_string()),
            ));
        }
        Ok(report)
    }

    pub async fn browse(&self, view: &View, page: u32, limit: u32, query: &str) -> Result<ListPage, GatewayError> {
        let endpoint = view.endpoint(page, limit, query);
        tracing::debug!(endpoint = %endpoint, "Fetching browse page");

        let response: ListResponse = self.gateway.get(&endpoint).await?;
        if !response.ok {
            return Err(GatewayError::Rejected(
                response.error.unwrap_or_else(|| "browse failed".to_string()),
            ));
        }
        Ok(ListPage {
            items: response.items,
            parent: response.parent,
        })
    }

    pub async fn player_action(&self, action: PlayerAction) -> Result<(), GatewayError> {
        self.command(&format!("/api/player/{}", action.as_str()), None).await
    }

    pub async fn seek(&self, seconds: f64) -> Result<(), GatewayError> {
        self.command("/api/player/seek", Some(json!({ "seconds": seconds }))).await
    }

    pub async fn set_volume(&self, volume: u8) -> Result<(), GatewayError> {
        self.command(&format!("/api/volume/{}", volume.min(100)), None).await
    }

    /// Outputs with the ids the toggle endpoint expects.
    pub async fn audio_outputs(&self) -> Result<Vec<OutputDevice>, GatewayError> {
        let response: OutputsResponse = self.gateway.get("/api/audio/status").await?;
        if !response.ok {
            return Err(GatewayError::Rejected(
                response.error.unwrap_or_else(|| "outputs unavailable".to_string()),
            ));
        }
        Ok(response.outputs)
    }

    pub async fn toggle_output(&self, id: u32, enabled: bool) -> Result<(), GatewayError> {
        self.command(
            "/api/audio/outputs/toggle",
            Some(json!({ "id": id, "enabled": enabled })),
        )
        .await
    }

    pub async fn play_now(&self, path: &str) -> Result<(), GatewayError> {
        self.command("/api/queue/play_now", Some(json!({ "path": path }))).await
    }

    pub async fn enqueue(&self, path: &str) -> Result<(), GatewayError> {
        self.command("/api/queue/add", Some(json!({ "path": path }))).await
    }

    /// Add paths one call at a time, in order; stops at the first failure.
    pub async fn enqueue_all(&self, paths: &[String]) -> Result<(), GatewayError> {
        stream::iter(paths.iter())
            .map(Ok::<_, GatewayError>)
            .try_for_each(|path| async move { self.enqueue(path).await })
            .await
    }

    pub async fn clear_queue(&self) -> Result<(), GatewayError> {
        self.command("/api/queue/clear", None).await
    }

    /// Replace the queue with a stored playlist.
    pub async fn load_playlist(&self, name: &str) -> Result<(), GatewayError> {
        self.command(
            "/api/content/playlist/load",
            Some(json!({ "name": name, "clear": true })),
        )
        .await
    }

    pub async fn save_queue_as_playlist(&self, name: &str) -> Result<(), GatewayError> {
        self.command("/api/content/playlist/save", Some(json!({ "name": name })))
            .await
    }

    pub async fn add_to_playlist(&self, playlist: &str, paths: &[String]) -> Result<(), GatewayError> {
        self.command(
            "/api/content/playlist/add_items",
            Some(json!({ "playlist": playlist, "paths": paths })),
        )
        .await
    }
}
