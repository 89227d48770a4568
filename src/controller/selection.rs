//! Multi-select and bulk queue actions

use crate::gateway::GatewayError;

use super::AppController;

impl AppController {
    /// Toggle the item at `index`. Returns false when it is not selectable.
    pub async fn toggle_selection(&self, index: usize) -> bool {
        let toggled = {
            let mut session = self.session.lock().await;
            let id = session
                .items
                .get(index)
                .and_then(|item| session.view.current_view.selectable_id(item))
                .map(str::to_string);
            match id {
                Some(id) => {
                    session.selection.toggle(&id);
                    true
                }
                None => false,
            }
        };
        if toggled {
            self.render_list().await;
        }
        toggled
    }

    /// Select every visible selectable item, or deselect them all when they
    /// already are. Selections outside the visible list are left alone.
    pub async fn toggle_all_visible(&self) {
        {
            let mut session = self.session.lock().await;
            let visible: Vec<String> = session
                .visible_ids()
                .into_iter()
                .map(str::to_string)
                .collect();
            session.selection.toggle_all(visible.iter().map(String::as_str));
        }
        self.render_list().await;
    }

    pub async fn clear_selection(&self) {
        self.session.lock().await.selection.clear();
        self.render_list().await;
    }

    pub async fn selection_count(&self) -> usize {
        self.session.lock().await.selection.len()
    }

    /// Append every selected path to the queue, one call at a time and in
    /// selection order. The selection is consumed only when all of them went
    /// through.
    pub async fn enqueue_selection(&self) -> Result<usize, GatewayError> {
        let paths = self.session.lock().await.selection.to_vec();
        if paths.is_empty() {
            return Ok(0);
        }

        tracing::debug!(count = paths.len(), "Enqueueing selection");
        if let Err(e) = self.client.enqueue_all(&paths).await {
            tracing::error!(count = paths.len(), error = %e, "Bulk enqueue failed");
            self.report_error(&e);
            return Err(e);
        }

        tracing::info!(count = paths.len(), "Selection enqueued");
        self.consume_selection(&paths).await;
        self.sync.force_poll().await;
        Ok(paths.len())
    }

    /// Append the item at `index` alone, leaving the selection as it is.
    /// Returns false when the row has nothing to queue.
    pub async fn enqueue_item(&self, index: usize) -> Result<bool, GatewayError> {
        let path = {
            let session = self.session.lock().await;
            session
                .items
                .get(index)
                .and_then(|item| session.view.current_view.selectable_id(item))
                .map(str::to_string)
        };
        let Some(path) = path else {
            return Ok(false);
        };
        self.enqueue(&path).await?;
        Ok(true)
    }

    pub async fn add_selection_to_playlist(&self, playlist: &str) -> Result<usize, GatewayError> {
        let paths = self.session.lock().await.selection.to_vec();
        if paths.is_empty() {
            return Ok(0);
        }

        if let Err(e) = self.client.add_to_playlist(playlist, &paths).await {
            tracing::error!(playlist, error = %e, "Adding selection to playlist failed");
            self.report_error(&e);
            return Err(e);
        }

        tracing::info!(playlist, count = paths.len(), "Selection added to playlist");
        self.consume_selection(&paths).await;
        Ok(paths.len())
    }

    /// Drop the ids a bulk action used; anything selected meanwhile stays.
    async fn consume_selection(&self, paths: &[String]) {
        {
            let mut session = self.session.lock().await;
            for path in paths {
                session.selection.remove(path);
            }
        }
        self.render_list().await;
    }
}
