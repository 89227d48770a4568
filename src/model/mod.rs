//! Model module - Application state and data types
//!
//! - `types`: view enum and navigation frames
//! - `content`: browse list items and pages
//! - `navigation`: back-navigation history
//! - `selection`: multi-select accumulator
//! - `session`: the browse session owned by the controller
//! - `playback`: playback snapshot, track metadata, status decoding
//! - `toune_client`: typed backend API wrapper
//! - `ui`: terminal interaction state (cursor, filter and playlist prompts)

mod types;
mod content;
mod navigation;
mod selection;
mod session;
mod playback;
mod toune_client;
mod ui;

pub use types::{Activation, NavigationFrame, RootView, View, DEFAULT_ROOT};

pub use content::{BrowseItem, ListPage};

pub use navigation::NavigationStack;

pub use selection::SelectionSet;

pub use session::{BrowseSession, FetchTicket, ViewState};

pub use playback::{
    AudioOutput, NowPlaying, OutputDevice, PlaybackSettings, PlaybackSnapshot, PlaybackState, StatusReport,
    TrackMetadata,
};

pub use toune_client::{PlayerAction, TouneClient};

pub use ui::{NamePrompt, PromptPurpose, UiState};
