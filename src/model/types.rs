//! Core type definitions: browse views and navigation frames

use crate::gateway::with_query;

use super::content::BrowseItem;

/// Top-level browsing categories, selectable directly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum RootView {
    #[default]
    Artists,
    Albums,
    Genres,
    Folders,
    /// The player queue, in play order.
    Queue,
    /// Stored playlists.
    Playlists,
    /// Audio outputs known to the player.
    Outputs,
}

/// Root used when back-navigation runs out of history.
pub const DEFAULT_ROOT: RootView = RootView::Artists;

impl RootView {
    pub const ALL: [RootView; 7] = [
        RootView::Artists,
        RootView::Albums,
        RootView::Genres,
        RootView::Folders,
        RootView::Queue,
        RootView::Playlists,
        RootView::Outputs,
    ];

    pub fn title(self) -> &'static str {
        match self {
            RootView::Artists => "Artists",
            RootView::Albums => "Albums",
            RootView::Genres => "Genres",
            RootView::Folders => "Folders",
            RootView::Queue => "Queue",
            RootView::Playlists => "Playlists",
            RootView::Outputs => "Outputs",
        }
    }
}

/// What activating a list row does.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Activation {
    /// Drill into a detail view with the given title.
    Open(View, String),
    Play(String),
    LoadPlaylist(String),
    /// Flip an output; `enabled` is its state as listed.
    ToggleOutput { id: u32, enabled: bool },
    Inert,
}

/// Every view the browser can show.
///
/// Detail variants carry the key they were opened with, so a frame popped from
/// the navigation stack is enough to fetch the view again.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum View {
    Root(RootView),
    ArtistAlbums { artist: String },
    GenreAlbums { genre: String },
    AlbumTracks { album: String },
    Folder { path: String },
}

impl Default for View {
    fn default() -> Self {
        View::Root(DEFAULT_ROOT)
    }
}

impl View {
    pub fn root(&self) -> Option<RootView> {
        match self {
            View::Root(root) => Some(*root),
            _ => None,
        }
    }

    /// Only the large flat roots are fetched page by page.
    pub fn is_paginated(&self) -> bool {
        matches!(self, View::Root(RootView::Artists) | View::Root(RootView::Albums))
    }

    pub fn supports_filter(&self) -> bool {
        self.is_paginated()
    }

    pub fn default_title(&self) -> String {
        match self {
            View::Root(root) => root.title().to_string(),
            View::ArtistAlbums { artist } => artist.clone(),
            View::GenreAlbums { genre } => genre.clone(),
            View::AlbumTracks { album } => album.clone(),
            View::Folder { path } => format!("/{}", path),
        }
    }

    /// Endpoint (with query) that lists this view's items.
    pub fn endpoint(&self, page: u32, limit: u32, query: &str) -> String {
        match self {
            View::Root(RootView::Artists) => with_query(
                "/api/content/browse/artists",
                &[
                    ("page", page.to_string()),
                    ("limit", limit.to_string()),
                    ("q", query.to_string()),
                ],
            ),
            View::Root(RootView::Albums) => with_query(
                "/api/content/browse/albums_global",
                &[
                    ("page", page.to_string()),
                    ("limit", limit.to_string()),
                    ("q", query.to_string()),
                ],
            ),
            View::Root(RootView::Genres) => "/api/content/browse/genres".to_string(),
            View::Root(RootView::Folders) => {
                with_query("/api/content/browse/folders", &[("path", String::new())])
            }
            View::Root(RootView::Queue) => "/api/queue".to_string(),
            View::Root(RootView::Playlists) => "/api/content/playlists".to_string(),
            View::Root(RootView::Outputs) => "/api/audio/status".to_string(),
            View::ArtistAlbums { artist } => {
                with_query("/api/content/browse/albums", &[("artist", artist.clone())])
            }
            View::GenreAlbums { genre } => {
                with_query("/api/content/browse/albums", &[("genre", genre.clone())])
            }
            View::AlbumTracks { album } => {
                with_query("/api/content/browse/tracks", &[("album", album.clone())])
            }
            View::Folder { path } => {
                with_query("/api/content/browse/folders", &[("path", path.clone())])
            }
        }
    }

    /// The view an item of this view drills down into, with its display title.
    pub fn child(&self, item: &BrowseItem) -> Option<(View, String)> {
        match self {
            View::Root(RootView::Artists) => {
                let artist = item.field("artist")?;
                Some((View::ArtistAlbums { artist: artist.to_string() }, artist.to_string()))
            }
            View::Root(RootView::Albums) | View::ArtistAlbums { .. } | View::GenreAlbums { .. } => {
                let album = item.field("album")?;
                Some((View::AlbumTracks { album: album.to_string() }, album.to_string()))
            }
            View::Root(RootView::Genres) => {
                let genre = item.field("genre")?;
                Some((View::GenreAlbums { genre: genre.to_string() }, genre.to_string()))
            }
            View::Root(RootView::Folders) | View::Folder { .. } => {
                if !item.is_folder() {
                    return None;
                }
                let path = item.field("path")?;
                Some((View::Folder { path: path.to_string() }, format!("/{}", path)))
            }
            View::AlbumTracks { .. }
            | View::Root(RootView::Queue)
            | View::Root(RootView::Playlists)
            | View::Root(RootView::Outputs) => None,
        }
    }

    /// What Enter does on `item` in this view.
    pub fn activation(&self, item: &BrowseItem) -> Activation {
        match self {
            View::Root(RootView::Playlists) => match item.field("playlist") {
                Some(name) => Activation::LoadPlaylist(name.to_string()),
                None => Activation::Inert,
            },
            View::Root(RootView::Outputs) => match item.number("id") {
                Some(id) => Activation::ToggleOutput {
                    id,
                    enabled: item.flag("enabled").unwrap_or(false),
                },
                None => Activation::Inert,
            },
            _ => {
                if let Some((child, title)) = self.child(item) {
                    return Activation::Open(child, title);
                }
                match self.selectable_id(item) {
                    Some(path) => Activation::Play(path.to_string()),
                    None => Activation::Inert,
                }
            }
        }
    }

    /// Identifier an item contributes to the selection set, if it is selectable here.
    pub fn selectable_id<'a>(&self, item: &'a BrowseItem) -> Option<&'a str> {
        match self {
            View::AlbumTracks { .. } | View::Root(RootView::Folders) | View::Folder { .. } => {
                item.field("path")
            }
            View::Root(_) | View::ArtistAlbums { .. } | View::GenreAlbums { .. } => None,
        }
    }
}

/// A view left behind by a drill-down, restored by back-navigation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationFrame {
    pub view: View,
    pub title: String,
}

impl NavigationFrame {
    pub fn new(view: View, title: impl Into<String>) -> Self {
        Self {
            view,
            title: title.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pagination_only_on_flat_roots() {
        assert!(View::Root(RootView::Artists).is_paginated());
        assert!(View::Root(RootView::Albums).is_paginated());
        assert!(!View::Root(RootView::Genres).is_paginated());
        assert!(!View::Folder { path: "a".into() }.is_paginated());
        assert!(!View::AlbumTracks { album: "a".into() }.is_paginated());
    }

    #[test]
    fn test_endpoint_carries_page_and_filter() {
        let endpoint = View::Root(RootView::Artists).endpoint(3, 50, "pink floyd");
        assert_eq!(endpoint, "/api/content/browse/artists?page=3&limit=50&q=pink%20floyd");

        let endpoint = View::ArtistAlbums { artist: "AC/DC".into() }.endpoint(1, 50, "");
        assert_eq!(endpoint, "/api/content/browse/albums?artist=AC%2FDC");
    }

    #[test]
    fn test_child_views() {
        let artist = BrowseItem::new(json!({"artist": "Daft Punk"}));
        assert_eq!(
            View::Root(RootView::Artists).child(&artist),
            Some((View::ArtistAlbums { artist: "Daft Punk".into() }, "Daft Punk".into()))
        );

        let album = BrowseItem::new(json!({"album": "Discovery", "path": "mock/path"}));
        assert_eq!(
            View::ArtistAlbums { artist: "Daft Punk".into() }.child(&album),
            Some((View::AlbumTracks { album: "Discovery".into() }, "Discovery".into()))
        );

        let track = BrowseItem::new(json!({"title": "One More Time", "path": "dp/01.flac"}));
        assert_eq!(View::AlbumTracks { album: "Discovery".into() }.child(&track), None);

        let file = BrowseItem::new(json!({"type": "file", "name": "a.mp3", "path": "x/a.mp3"}));
        let folder = BrowseItem::new(json!({"type": "folder", "name": "x", "path": "x"}));
        assert_eq!(View::Root(RootView::Folders).child(&file), None);
        assert_eq!(
            View::Root(RootView::Folders).child(&folder),
            Some((View::Folder { path: "x".into() }, "/x".into()))
        );
    }

    #[test]
    fn test_selectable_ids() {
        let track = BrowseItem::new(json!({"title": "Time", "path": "file2.mp3"}));
        assert_eq!(View::AlbumTracks { album: "x".into() }.selectable_id(&track), Some("file2.mp3"));

        let album = BrowseItem::new(json!({"album": "x", "path": "mock/path"}));
        assert_eq!(View::Root(RootView::Albums).selectable_id(&album), None);

        let queued = BrowseItem::new(json!({"title": "Time", "file": "file2.mp3"}));
        assert_eq!(View::Root(RootView::Queue).selectable_id(&queued), None);
    }

    #[test]
    fn test_panel_endpoints_are_unpaged() {
        assert_eq!(View::Root(RootView::Queue).endpoint(2, 50, "x"), "/api/queue");
        assert_eq!(View::Root(RootView::Playlists).endpoint(1, 50, ""), "/api/content/playlists");
        assert_eq!(View::Root(RootView::Outputs).endpoint(1, 50, ""), "/api/audio/status");
        assert!(!View::Root(RootView::Queue).supports_filter());
    }

    #[test]
    fn test_activation_per_view() {
        let playlist = BrowseItem::new(json!({"playlist": "Favoris"}));
        assert_eq!(
            View::Root(RootView::Playlists).activation(&playlist),
            Activation::LoadPlaylist("Favoris".into())
        );

        let output = BrowseItem::new(json!({"id": 2, "name": "USB DAC", "enabled": true}));
        assert_eq!(
            View::Root(RootView::Outputs).activation(&output),
            Activation::ToggleOutput { id: 2, enabled: true }
        );

        let track = BrowseItem::new(json!({"title": "Time", "path": "pf/time.flac"}));
        assert_eq!(
            View::AlbumTracks { album: "x".into() }.activation(&track),
            Activation::Play("pf/time.flac".into())
        );

        let genre = BrowseItem::new(json!({"genre": "Jazz"}));
        assert_eq!(
            View::Root(RootView::Genres).activation(&genre),
            Activation::Open(View::GenreAlbums { genre: "Jazz".into() }, "Jazz".into())
        );

        let queued = BrowseItem::new(json!({"title": "Time", "file": "pf/time.flac"}));
        assert_eq!(View::Root(RootView::Queue).activation(&queued), Activation::Inert);
    }
}
