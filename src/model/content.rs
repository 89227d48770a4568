//! Browse list items as returned by the backend

use serde::Deserialize;

/// One entry of a browse list, kept in the literal shape the backend returned.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct BrowseItem(serde_json::Value);

impl BrowseItem {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn raw(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.as_str())
    }

    pub fn number(&self, key: &str) -> Option<u32> {
        self.0
            .get(key)
            .and_then(|v| v.as_u64())
            .and_then(|n| u32::try_from(n).ok())
    }

    pub fn flag(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(|v| v.as_bool())
    }

    pub fn is_folder(&self) -> bool {
        self.field("type") == Some("folder")
    }

    /// Best human-readable name for list rendering.
    pub fn label(&self) -> String {
        if let Some(title) = self.field("title") {
            return match self.field("artist") {
                Some(artist) if !artist.is_empty() => format!("{} - {}", title, artist),
                _ => title.to_string(),
            };
        }
        for key in ["artist", "album", "genre", "playlist", "name", "path", "file"] {
            if let Some(value) = self.field(key) {
                if key == "album" {
                    if let Some(artist) = self.field("artist") {
                        return format!("{} ({})", value, artist);
                    }
                }
                return value.to_string();
            }
        }
        self.0.to_string()
    }

    /// Trailing detail such as a genre's track count or an output's state.
    pub fn badge(&self) -> Option<String> {
        if let Some(enabled) = self.flag("enabled") {
            return Some(if enabled { "on" } else { "off" }.to_string());
        }
        self.0.get("count").map(|count| match count.as_u64() {
            Some(n) => n.to_string(),
            None => count.to_string(),
        })
    }
}

/// Wire shape of a browse response. The queue, playlist and output panels
/// name their list after what it holds.
#[derive(Debug, Deserialize)]
pub(crate) struct ListResponse {
    #[serde(default = "default_ok")]
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default, alias = "queue", alias = "playlists", alias = "outputs")]
    pub items: Vec<BrowseItem>,
    #[serde(default)]
    pub parent: Option<String>,
}

fn default_ok() -> bool {
    true
}

/// One fetched page of a browse view.
#[derive(Clone, Debug, Default)]
pub struct ListPage {
    pub items: Vec<BrowseItem>,
    pub parent: Option<String>,
}

impl ListPage {
    /// A page shorter than the requested limit is the last one.
    pub fn is_last(&self, limit: u32) -> bool {
        self.items.len() < limit as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_labels() {
        assert_eq!(BrowseItem::new(json!({"artist": "Queen"})).label(), "Queen");
        assert_eq!(
            BrowseItem::new(json!({"album": "Nevermind", "artist": "Nirvana", "path": "p"})).label(),
            "Nevermind (Nirvana)"
        );
        assert_eq!(
            BrowseItem::new(json!({"title": "Money", "artist": "Pink Floyd", "path": "f"})).label(),
            "Money - Pink Floyd"
        );
        assert_eq!(BrowseItem::new(json!({"type": "folder", "name": "Rock", "path": "Rock"})).label(), "Rock");
        assert_eq!(BrowseItem::new(json!({"playlist": "Soirée"})).label(), "Soirée");
        assert_eq!(BrowseItem::new(json!({"file": "x/untagged.mp3", "pos": "3"})).label(), "x/untagged.mp3");
    }

    #[test]
    fn test_panel_payloads_decode_as_items() {
        let queue: ListResponse = serde_json::from_value(json!({
            "ok": true,
            "queue": [{"title": "Money", "artist": "Pink Floyd", "file": "pf/money.flac"}]
        }))
        .unwrap();
        assert_eq!(queue.items[0].label(), "Money - Pink Floyd");

        let outputs: ListResponse = serde_json::from_value(json!({
            "ok": true,
            "outputs": [{"id": 0, "name": "DAC", "enabled": false}]
        }))
        .unwrap();
        assert_eq!(outputs.items[0].number("id"), Some(0));
        assert_eq!(outputs.items[0].badge().as_deref(), Some("off"));

        let playlists: ListResponse =
            serde_json::from_value(json!({"ok": true, "playlists": [{"playlist": "Favoris"}]})).unwrap();
        assert_eq!(playlists.items[0].field("playlist"), Some("Favoris"));
    }

    #[test]
    fn test_badge_from_count() {
        let genre = BrowseItem::new(json!({"genre": "Jazz", "count": 12}));
        assert_eq!(genre.badge().as_deref(), Some("12"));
        assert_eq!(BrowseItem::new(json!({"genre": "Jazz"})).badge(), None);
    }

    #[test]
    fn test_short_page_is_last() {
        let page = ListPage {
            items: vec![BrowseItem::new(json!({"artist": "a"}))],
            parent: None,
        };
        assert!(page.is_last(50));
        assert!(!page.is_last(1));
    }
}
