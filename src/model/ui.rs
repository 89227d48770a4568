//! Terminal-only interaction state: cursor, filter prompt, popups

/// What a playlist name typed into the prompt is used for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromptPurpose {
    AddSelection,
    SaveQueue,
}

impl PromptPurpose {
    pub fn title(self) -> &'static str {
        match self {
            PromptPurpose::AddSelection => " Add selection to playlist ",
            PromptPurpose::SaveQueue => " Save queue as playlist ",
        }
    }
}

/// Playlist-name prompt. Holds keyboard focus while open.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamePrompt {
    pub purpose: PromptPurpose,
    pub input: String,
}

impl NamePrompt {
    pub fn new(purpose: PromptPurpose) -> Self {
        Self {
            purpose,
            input: String::new(),
        }
    }

    /// The trimmed name, if anything but whitespace was typed.
    pub fn name(&self) -> Option<&str> {
        let name = self.input.trim();
        (!name.is_empty()).then_some(name)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UiState {
    /// Highlighted row of the browse list.
    pub cursor: usize,
    /// The filter prompt has keyboard focus.
    pub filter_editing: bool,
    /// Text typed into the filter prompt, ahead of the debounced query.
    pub filter_input: String,
    pub show_help: bool,
    pub prompt: Option<NamePrompt>,
    pub should_quit: bool,
}

impl UiState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_down(&mut self, item_count: usize) {
        if item_count > 0 && self.cursor + 1 < item_count {
            self.cursor += 1;
        }
    }

    /// Keep the cursor inside a list that shrank or was replaced.
    pub fn clamp_cursor(&mut self, item_count: usize) {
        if self.cursor >= item_count {
            self.cursor = item_count.saturating_sub(1);
        }
    }

    /// Rows left below the cursor.
    pub fn remaining(&self, item_count: usize) -> usize {
        item_count.saturating_sub(self.cursor + 1)
    }
}
