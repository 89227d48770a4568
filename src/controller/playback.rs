//! Playback control methods

use std::future::Future;

use crate::gateway::GatewayError;
use crate::model::{PlayerAction, RootView};

use super::AppController;

pub const VOLUME_STEP: u8 = 5;
pub const SEEK_STEP_SECONDS: f64 = 10.0;

impl AppController {
    /// Run a player command. On success the status is re-polled right away
    /// so the display reflects the command; on failure the user is told.
    pub(crate) async fn with_forced_poll<F, Fut>(
        &self,
        action: &'static str,
        operation: F,
    ) -> Result<(), GatewayError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), GatewayError>>,
    {
        tracing::debug!(action, "Sending player command");
        match operation().await {
            Ok(()) => {
                tracing::info!(action, "Player command accepted");
                self.sync.force_poll().await;
                Ok(())
            }
            Err(e) => {
                tracing::error!(action, error = %e, "Player command failed");
                self.report_error(&e);
                Err(e)
            }
        }
    }

    pub async fn player_action(&self, action: PlayerAction) -> Result<(), GatewayError> {
        self.with_forced_poll(action.as_str(), || self.client.player_action(action))
            .await
    }

    pub async fn toggle_playback(&self) -> Result<(), GatewayError> {
        self.player_action(PlayerAction::Toggle).await
    }

    pub async fn next_track(&self) -> Result<(), GatewayError> {
        self.player_action(PlayerAction::Next).await
    }

    pub async fn previous_track(&self) -> Result<(), GatewayError> {
        self.player_action(PlayerAction::Previous).await
    }

    pub async fn stop_playback(&self) -> Result<(), GatewayError> {
        self.player_action(PlayerAction::Stop).await
    }

    pub async fn toggle_shuffle(&self) -> Result<(), GatewayError> {
        self.player_action(PlayerAction::Shuffle).await
    }

    pub async fn toggle_repeat(&self) -> Result<(), GatewayError> {
        self.player_action(PlayerAction::Repeat).await
    }

    pub async fn volume_up(&self) -> Result<(), GatewayError> {
        let current = self.sync.now_playing().await.settings.volume.unwrap_or(0);
        let volume = current.saturating_add(VOLUME_STEP).min(100);
        self.with_forced_poll("volume", || self.client.set_volume(volume))
            .await
    }

    pub async fn volume_down(&self) -> Result<(), GatewayError> {
        let current = self.sync.now_playing().await.settings.volume.unwrap_or(0);
        let volume = current.saturating_sub(VOLUME_STEP);
        self.with_forced_poll("volume", || self.client.set_volume(volume))
            .await
    }

    /// Seek relative to the displayed position, kept within the track.
    pub async fn seek_relative(&self, delta_seconds: f64) -> Result<(), GatewayError> {
        let elapsed = self.sync.displayed_elapsed().await;
        let target = (elapsed + delta_seconds).max(0.0);

        if let Err(e) = self.sync.seek(target).await {
            self.report_error(&e);
            return Err(e);
        }
        Ok(())
    }

    /// Enable or disable the output with the given id, then refresh the
    /// outputs panel if it is shown.
    pub async fn set_output_enabled(&self, id: u32, enabled: bool) -> Result<(), GatewayError> {
        self.with_forced_poll("toggle_output", || self.client.toggle_output(id, enabled))
            .await?;
        self.refresh_if_showing(RootView::Outputs).await;
        Ok(())
    }

    /// Flip an audio output by name. The id and current state come from the
    /// audio settings listing.
    pub async fn toggle_output(&self, name: &str) -> Result<(), GatewayError> {
        let outputs = match self.client.audio_outputs().await {
            Ok(outputs) => outputs,
            Err(e) => {
                tracing::error!(output = name, error = %e, "Listing audio outputs failed");
                self.report_error(&e);
                return Err(e);
            }
        };
        let Some(output) = outputs.into_iter().find(|output| output.name == name) else {
            let e = GatewayError::Rejected(format!("No audio output named {}", name));
            self.report_error(&e);
            return Err(e);
        };
        self.set_output_enabled(output.id, !output.enabled).await
    }

    pub async fn play_now(&self, path: &str) -> Result<(), GatewayError> {
        self.with_forced_poll("play_now", || self.client.play_now(path))
            .await?;
        self.refresh_if_showing(RootView::Queue).await;
        Ok(())
    }

    pub async fn enqueue(&self, path: &str) -> Result<(), GatewayError> {
        self.with_forced_poll("enqueue", || self.client.enqueue(path))
            .await?;
        self.refresh_if_showing(RootView::Queue).await;
        Ok(())
    }

    pub async fn clear_queue(&self) -> Result<(), GatewayError> {
        self.with_forced_poll("clear_queue", || self.client.clear_queue())
            .await?;
        self.refresh_if_showing(RootView::Queue).await;
        Ok(())
    }

    /// Replace the queue with a stored playlist and start over from it.
    pub async fn load_playlist(&self, name: &str) -> Result<(), GatewayError> {
        self.with_forced_poll("load_playlist", || self.client.load_playlist(name))
            .await
    }

    pub async fn save_queue_as_playlist(&self, name: &str) -> Result<(), GatewayError> {
        tracing::debug!(playlist = name, "Saving queue as playlist");
        if let Err(e) = self.client.save_queue_as_playlist(name).await {
            tracing::error!(playlist = name, error = %e, "Saving queue failed");
            self.report_error(&e);
            return Err(e);
        }
        tracing::info!(playlist = name, "Queue saved");
        self.refresh_if_showing(RootView::Playlists).await;
        Ok(())
    }

    /// The surface was hidden or shown again.
    pub async fn set_active(&self, active: bool) {
        self.sync.set_active(active).await;
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::controller::testing::controller;
    use crate::controller::FetchOutcome;
    use crate::gateway::testing::ScriptedTransport;
    use crate::render::Indicator;

    const STATUS: &str = "/api/status";

    fn status(elapsed: f64, volume: u8) -> serde_json::Value {
        json!({
            "status": {"state": "play", "elapsed": elapsed, "duration": 180, "volume": volume},
            "song": {"title": "Song", "file": "s.flac"},
            "outputs": {"DAC": {"outputEnabled": "1"}, "HDMI": {"outputEnabled": "0"}}
        })
    }

    fn outputs() -> serde_json::Value {
        json!({"ok": true, "outputs": [
            {"id": 0, "name": "DAC", "enabled": true},
            {"id": 1, "name": "HDMI", "enabled": false}
        ]})
    }

    #[tokio::test(start_paused = true)]
    async fn test_command_forces_poll() {
        let transport = ScriptedTransport::new();
        transport.json("/api/player/next", json!({"ok": true}));
        transport.json(STATUS, status(0.0, 50));
        let (controller, _renderer) = controller(&transport);

        controller.next_track().await.unwrap();

        let calls = transport.calls();
        assert_eq!(calls[0].path, "/api/player/next");
        assert_eq!(calls[1].path, STATUS);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_command_is_reported_without_poll() {
        let transport = ScriptedTransport::new();
        transport.status("/api/player/toggle", 401);
        let (controller, renderer) = controller(&transport);

        assert_eq!(controller.toggle_playback().await, Err(GatewayError::Http(401)));
        assert!(transport.calls_to(STATUS).is_empty());
        assert_eq!(
            renderer.indicators().last(),
            Some(&Indicator::ActionFailed("Not authorized. Check TOUNE_API_KEY.".to_string()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_volume_steps_from_reported_volume() {
        let transport = ScriptedTransport::new();
        transport.json(STATUS, status(0.0, 98));
        transport.json("/api/volume/100", json!({"ok": true}));
        transport.json("/api/volume/93", json!({"ok": true}));
        let (controller, _renderer) = controller(&transport);

        controller.sync.poll_once().await;
        controller.volume_up().await.unwrap();
        controller.volume_down().await.unwrap();

        assert_eq!(transport.calls_to("/api/volume/100").len(), 1);
        assert_eq!(transport.calls_to("/api/volume/93").len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_seek_relative_stays_inside_track() {
        let transport = ScriptedTransport::new();
        transport.json(STATUS, status(4.0, 50));
        transport.json("/api/player/seek", json!({"ok": true}));
        let (controller, _renderer) = controller(&transport);

        controller.sync.poll_once().await;
        controller.seek_relative(-SEEK_STEP_SECONDS).await.unwrap();
        controller.seek_relative(500.0).await.unwrap();

        let seeks = transport.calls_to("/api/player/seek");
        assert_eq!(seeks[0].body, Some(json!({"seconds": 0.0})));
        assert_eq!(seeks[1].body, Some(json!({"seconds": 180.0})));
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_output_flips_reported_state() {
        let transport = ScriptedTransport::new();
        transport.json(STATUS, status(0.0, 50));
        transport.json("/api/audio/status", outputs());
        transport.json("/api/audio/outputs/toggle", json!({"ok": true}));
        let (controller, _renderer) = controller(&transport);

        controller.toggle_output("DAC").await.unwrap();
        controller.toggle_output("HDMI").await.unwrap();

        let bodies: Vec<_> = transport
            .calls_to("/api/audio/outputs/toggle")
            .into_iter()
            .map(|call| call.body.unwrap())
            .collect();
        assert_eq!(
            bodies,
            vec![
                json!({"id": 0, "enabled": false}),
                json!({"id": 1, "enabled": true}),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_unknown_output_sends_nothing() {
        let transport = ScriptedTransport::new();
        transport.json("/api/audio/status", outputs());
        let (controller, renderer) = controller(&transport);

        assert!(matches!(
            controller.toggle_output("Bluetooth").await,
            Err(GatewayError::Rejected(_))
        ));
        assert!(transport.calls_to("/api/audio/outputs/toggle").is_empty());
        assert!(matches!(renderer.indicators().last(), Some(Indicator::ActionFailed(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_outputs_panel_toggles_by_id_and_refreshes() {
        let transport = ScriptedTransport::new();
        transport.json("/api/audio/status", outputs());
        transport.json(
            "/api/audio/status",
            json!({"ok": true, "outputs": [
                {"id": 0, "name": "DAC", "enabled": true},
                {"id": 1, "name": "HDMI", "enabled": true}
            ]}),
        );
        transport.json("/api/audio/outputs/toggle", json!({"ok": true}));
        transport.json(STATUS, status(0.0, 50));
        let (controller, _renderer) = controller(&transport);

        controller.switch_root(RootView::Outputs).await;
        assert_eq!(controller.open_item(1).await, FetchOutcome::Applied);

        assert_eq!(
            transport.calls_to("/api/audio/outputs/toggle")[0].body,
            Some(json!({"id": 1, "enabled": true}))
        );
        let list = controller.list_view().await;
        assert_eq!(list.items[1].badge().as_deref(), Some("on"), "panel refetched after toggle");
        assert_eq!(transport.calls_to("/api/audio/status").len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_load_playlist_from_panel() {
        let transport = ScriptedTransport::new();
        transport.json(
            "/api/content/playlists",
            json!({"ok": true, "playlists": [{"playlist": "Favoris"}, {"playlist": "Soirée"}]}),
        );
        transport.json("/api/content/playlist/load", json!({"ok": true}));
        transport.json(STATUS, status(0.0, 50));
        let (controller, _renderer) = controller(&transport);

        controller.switch_root(RootView::Playlists).await;
        assert_eq!(controller.list_view().await.items.len(), 2);
        assert_eq!(controller.open_item(1).await, FetchOutcome::Applied);

        assert_eq!(
            transport.calls_to("/api/content/playlist/load")[0].body,
            Some(json!({"name": "Soirée", "clear": true}))
        );
        assert_eq!(transport.calls_to(STATUS).len(), 1, "loading a playlist forces a poll");
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_queue_refreshes_playlists_panel() {
        let transport = ScriptedTransport::new();
        transport.json("/api/content/playlists", json!({"ok": true, "playlists": []}));
        transport.json("/api/content/playlists", json!({"ok": true, "playlists": [{"playlist": "Late"}]}));
        transport.json("/api/content/playlist/save", json!({"ok": true}));
        let (controller, _renderer) = controller(&transport);

        controller.switch_root(RootView::Playlists).await;
        controller.save_queue_as_playlist("Late").await.unwrap();

        assert_eq!(
            transport.calls_to("/api/content/playlist/save")[0].body,
            Some(json!({"name": "Late"}))
        );
        assert_eq!(controller.list_view().await.items[0].label(), "Late");
    }

    #[tokio::test(start_paused = true)]
    async fn test_clearing_queue_refreshes_queue_panel() {
        let transport = ScriptedTransport::new();
        transport.json("/api/queue", json!({"ok": true, "queue": [{"title": "A", "artist": "B"}]}));
        transport.json("/api/queue", json!({"ok": true, "queue": []}));
        transport.json("/api/queue/clear", json!({"ok": true}));
        transport.json(STATUS, status(0.0, 50));
        let (controller, _renderer) = controller(&transport);

        controller.switch_root(RootView::Queue).await;
        assert_eq!(controller.list_view().await.items[0].label(), "A - B");

        controller.clear_queue().await.unwrap();
        assert!(controller.list_view().await.items.is_empty());
        assert_eq!(transport.calls_to("/api/queue").len(), 2);
    }
}
