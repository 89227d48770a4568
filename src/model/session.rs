//! Browse session state: current view, page, filter, rendered list, history
//! and selection, owned as one value by the controller.

use super::content::{BrowseItem, ListPage};
use super::navigation::NavigationStack;
use super::selection::SelectionSet;
use super::types::{NavigationFrame, RootView, View, DEFAULT_ROOT};

/// Which view is shown and how far it has been paged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewState {
    pub current_view: View,
    pub title: String,
    /// Starts at 1; only advanced after a page was successfully fetched.
    pub current_page: u32,
    pub filter_query: String,
    /// Root the current view descends from.
    pub root: RootView,
}

impl ViewState {
    fn at_root(root: RootView) -> Self {
        let view = View::Root(root);
        Self {
            title: view.default_title(),
            current_view: view,
            current_page: 1,
            filter_query: String::new(),
            root,
        }
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::at_root(DEFAULT_ROOT)
    }
}

/// Describes the fetch a state transition asks for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub view: View,
    pub page: u32,
    pub query: String,
}

#[derive(Clone, Debug, Default)]
pub struct BrowseSession {
    pub view: ViewState,
    pub items: Vec<BrowseItem>,
    pub has_more: bool,
    /// Busy flag: a fetch for the current view is outstanding.
    pub is_loading: bool,
    pub navigation: NavigationStack,
    pub selection: SelectionSet,
    /// Bumped whenever the list is reset, so late responses can be dropped.
    generation: u64,
}

impl BrowseSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self, ticket: &FetchTicket) -> bool {
        self.generation == ticket.generation
    }

    fn reset_list(&mut self) -> u64 {
        self.items.clear();
        self.has_more = false;
        self.is_loading = true;
        self.generation += 1;
        self.generation
    }

    fn first_page_ticket(&mut self) -> FetchTicket {
        self.view.current_page = 1;
        let generation = self.reset_list();
        FetchTicket {
            generation,
            view: self.view.current_view.clone(),
            page: 1,
            query: self.view.filter_query.clone(),
        }
    }

    /// Direct root selection: history is discarded, the list is emptied and
    /// the selection is dropped when the root changes.
    pub fn switch_root(&mut self, root: RootView) -> FetchTicket {
        if self.view.root != root {
            self.selection.clear();
        }
        self.navigation.clear();
        self.view = ViewState::at_root(root);
        self.first_page_ticket()
    }

    /// Ticket for a drill-down fetch; state only changes in [`Self::enter`].
    pub fn drill_ticket(&self, view: View) -> FetchTicket {
        FetchTicket {
            generation: self.generation,
            view,
            page: 1,
            query: String::new(),
        }
    }

    /// Apply a fetched drill-down: remember where we were, then show `view`.
    pub fn enter(&mut self, view: View, title: String, page: ListPage, limit: u32) {
        let frame = NavigationFrame::new(self.view.current_view.clone(), self.view.title.clone());
        self.navigation.push(frame);

        self.view.current_view = view;
        self.view.title = title;
        self.view.current_page = 1;
        self.view.filter_query.clear();
        self.reset_list();
        self.apply_first_page(page, limit);
    }

    /// Pop history. Falls back to the default root when the stack is empty.
    pub fn back(&mut self) -> FetchTicket {
        match self.navigation.pop() {
            Some(frame) => {
                if let Some(root) = frame.view.root() {
                    self.view.root = root;
                }
                self.view.current_view = frame.view;
                self.view.title = frame.title;
                self.view.filter_query.clear();
                self.first_page_ticket()
            }
            None => self.switch_root(DEFAULT_ROOT),
        }
    }

    /// Refetch the current view from page 1, keeping history and filter.
    pub fn reload(&mut self) -> FetchTicket {
        self.first_page_ticket()
    }

    /// Store a new filter value and restart the current view at page 1.
    pub fn set_filter(&mut self, query: String) -> FetchTicket {
        self.view.filter_query = query;
        self.first_page_ticket()
    }

    /// Claim the busy flag for the next page, if the view has one.
    pub fn begin_load_more(&mut self) -> Option<FetchTicket> {
        if self.is_loading || !self.has_more || !self.view.current_view.is_paginated() {
            return None;
        }
        self.is_loading = true;
        Some(FetchTicket {
            generation: self.generation,
            view: self.view.current_view.clone(),
            page: self.view.current_page + 1,
            query: self.view.filter_query.clone(),
        })
    }

    pub fn apply_first_page(&mut self, page: ListPage, limit: u32) {
        self.has_more = self.view.current_view.is_paginated() && !page.is_last(limit);
        self.items = page.items;
        self.view.current_page = 1;
        self.is_loading = false;
    }

    pub fn append_page(&mut self, ticket: &FetchTicket, page: ListPage, limit: u32) {
        self.has_more = !page.is_last(limit);
        self.items.extend(page.items);
        self.view.current_page = ticket.page;
        self.is_loading = false;
    }

    /// A fetch failed: keep whatever is rendered, release the busy flag.
    pub fn fetch_failed(&mut self) {
        self.is_loading = false;
    }

    /// Ids of the visible items that can be selected.
    pub fn visible_ids(&self) -> Vec<&str> {
        self.items
            .iter()
            .filter_map(|item| self.view.current_view.selectable_id(item))
            .collect()
    }
}
