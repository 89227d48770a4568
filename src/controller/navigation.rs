//! Navigation-related controller methods (roots, drill-down, paging, filter)

use std::sync::PoisonError;

use crate::gateway::GatewayError;
use crate::model::{Activation, FetchTicket, RootView, View};
use crate::render::Indicator;

use super::AppController;

/// Result of a list fetch started by the controller.
#[derive(Clone, Debug, PartialEq)]
pub enum FetchOutcome {
    Applied,
    /// Nothing was fetched (busy, last page, unchanged or unfilterable).
    Skipped,
    /// The view changed while the fetch was outstanding; response dropped.
    Discarded,
    Failed(GatewayError),
}

impl AppController {
    async fn reset_cursor(&self) {
        self.ui.lock().await.cursor = 0;
    }

    /// Fetch page 1 for a ticket issued by a list reset.
    async fn fetch_first_page(&self, ticket: FetchTicket) -> FetchOutcome {
        let limit = self.config.page_size;
        let result = self
            .client
            .browse(&ticket.view, 1, limit, &ticket.query)
            .await;

        let mut session = self.session.lock().await;
        if !session.is_current(&ticket) {
            tracing::debug!(view = ?ticket.view, "Dropping list response for a view no longer shown");
            return FetchOutcome::Discarded;
        }

        match result {
            Ok(page) => {
                tracing::debug!(view = ?ticket.view, items = page.items.len(), "List loaded");
                session.apply_first_page(page, limit);
                drop(session);
                self.render_list().await;
                FetchOutcome::Applied
            }
            Err(e) => {
                tracing::warn!(view = ?ticket.view, error = %e, "List fetch failed");
                session.fetch_failed();
                drop(session);
                self.renderer
                    .render_indicator(Indicator::LoadFailed(Self::format_error(&e)));
                self.render_list().await;
                FetchOutcome::Failed(e)
            }
        }
    }

    /// Direct root selection: history is discarded and the list starts over.
    pub async fn switch_root(&self, root: RootView) -> FetchOutcome {
        tracing::debug!(root = root.title(), "Switching root view");
        self.cancel_pending_filter();
        let ticket = self.session.lock().await.switch_root(root);
        self.reset_cursor().await;
        self.render_list().await;
        self.fetch_first_page(ticket).await
    }

    /// Open a detail view. The current view is only left once the detail
    /// content arrived; a failure leaves everything as it was.
    pub async fn drill_down(&self, view: View, title: String) -> FetchOutcome {
        tracing::debug!(view = ?view, "Drilling down");
        self.cancel_pending_filter();
        let ticket = self.session.lock().await.drill_ticket(view);
        let limit = self.config.page_size;
        let result = self.client.browse(&ticket.view, 1, limit, "").await;

        let mut session = self.session.lock().await;
        if !session.is_current(&ticket) {
            tracing::debug!(view = ?ticket.view, "Dropping drill-down response, view changed meanwhile");
            return FetchOutcome::Discarded;
        }

        match result {
            Ok(page) => {
                session.enter(ticket.view, title, page, limit);
                drop(session);
                self.reset_cursor().await;
                self.render_list().await;
                FetchOutcome::Applied
            }
            Err(e) => {
                drop(session);
                tracing::error!(view = ?ticket.view, error = %e, "Drill-down failed");
                self.report_error(&e);
                FetchOutcome::Failed(e)
            }
        }
    }

    /// Activate the item at `index`: drill into it, play a leaf, load a
    /// playlist or flip an output, depending on the view.
    pub async fn open_item(&self, index: usize) -> FetchOutcome {
        let (view, item) = {
            let session = self.session.lock().await;
            match session.items.get(index) {
                Some(item) => (session.view.current_view.clone(), item.clone()),
                None => return FetchOutcome::Skipped,
            }
        };

        let result = match view.activation(&item) {
            Activation::Open(child, title) => return self.drill_down(child, title).await,
            Activation::Play(path) => self.play_now(&path).await,
            Activation::LoadPlaylist(name) => self.load_playlist(&name).await,
            Activation::ToggleOutput { id, enabled } => self.set_output_enabled(id, !enabled).await,
            Activation::Inert => return FetchOutcome::Skipped,
        };
        match result {
            Ok(()) => FetchOutcome::Applied,
            Err(e) => FetchOutcome::Failed(e),
        }
    }

    /// Refetch the list when `root` is the view on screen, e.g. the queue
    /// panel after the queue changed.
    pub async fn refresh_if_showing(&self, root: RootView) -> FetchOutcome {
        let ticket = {
            let mut session = self.session.lock().await;
            if session.view.current_view != View::Root(root) {
                return FetchOutcome::Skipped;
            }
            session.reload()
        };
        tracing::debug!(root = root.title(), "Refreshing panel");
        self.render_list().await;
        self.fetch_first_page(ticket).await
    }

    /// First list of the session, fetched in the background.
    pub fn spawn_initial_load(&self, root: RootView) {
        self.spawn_action(move |controller| async move {
            controller.switch_root(root).await;
        });
    }

    /// Back-navigation; with no history this lands on the default root.
    pub async fn back(&self) -> FetchOutcome {
        self.cancel_pending_filter();
        let ticket = self.session.lock().await.back();
        tracing::debug!(view = ?ticket.view, "Navigating back");
        self.reset_cursor().await;
        self.render_list().await;
        self.fetch_first_page(ticket).await
    }

    /// Fetch the next page of a paginated view. No-op while any fetch for
    /// the current view is outstanding or after the last page.
    pub async fn load_more(&self) -> FetchOutcome {
        let Some(ticket) = self.session.lock().await.begin_load_more() else {
            return FetchOutcome::Skipped;
        };
        tracing::debug!(view = ?ticket.view, page = ticket.page, "Loading more");
        self.render_list().await;

        let limit = self.config.page_size;
        let result = self
            .client
            .browse(&ticket.view, ticket.page, limit, &ticket.query)
            .await;

        let mut session = self.session.lock().await;
        if !session.is_current(&ticket) {
            tracing::debug!(page = ticket.page, "Dropping page for a view no longer shown");
            return FetchOutcome::Discarded;
        }

        match result {
            Ok(page) => {
                tracing::info!(page = ticket.page, loaded = page.items.len(), "Loaded more items");
                session.append_page(&ticket, page, limit);
                drop(session);
                self.render_list().await;
                FetchOutcome::Applied
            }
            Err(e) => {
                tracing::warn!(page = ticket.page, error = %e, "Failed to load more items");
                session.fetch_failed();
                drop(session);
                self.renderer
                    .render_indicator(Indicator::LoadFailed(Self::format_error(&e)));
                self.render_list().await;
                FetchOutcome::Failed(e)
            }
        }
    }

    /// Record a filter keystroke. Only the last value typed within one
    /// debounce window is queried.
    ///
    /// A keystroke only cancels a query that is still waiting out its
    /// debounce window. Once the window has passed the query runs on its own
    /// task, and a newer filter value supersedes it through the generation
    /// ticket instead.
    pub fn filter_input(&self, text: String) {
        let delay = self.config.filter_debounce;
        let controller = self.clone();

        let mut pending = self.filter_task.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = pending.take() {
            handle.abort();
        }
        *pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tokio::spawn(async move {
                controller.apply_filter(text).await;
            });
        }));
    }

    /// Drop a filter value still waiting out its debounce window.
    fn cancel_pending_filter(&self) {
        let pending = self
            .filter_task
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = pending {
            tracing::trace!("Cancelling pending filter query");
            handle.abort();
        }
    }

    /// Apply a filter value now: page 1 of the current view is refetched
    /// and the rendered items are dropped.
    pub async fn apply_filter(&self, query: String) -> FetchOutcome {
        let ticket = {
            let mut session = self.session.lock().await;
            if session.view.filter_query == query {
                return FetchOutcome::Skipped;
            }
            if !session.view.current_view.supports_filter() {
                session.view.filter_query = query;
                return FetchOutcome::Skipped;
            }
            session.set_filter(query)
        };
        tracing::debug!(query = %ticket.query, "Applying filter");
        self.reset_cursor().await;
        self.render_list().await;
        self.fetch_first_page(ticket).await
    }
}
