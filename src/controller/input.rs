//! Key event handling

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::model::{NamePrompt, PromptPurpose, RootView};

use super::playback::SEEK_STEP_SECONDS;
use super::AppController;

/// Start fetching the next page when the cursor gets this close to the end.
pub const LOAD_MORE_THRESHOLD: usize = 5;

impl AppController {
    pub async fn handle_key_event(&self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        let mut ui = self.ui.lock().await;

        // Help popup swallows everything but its close keys
        if ui.show_help {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('?')) {
                ui.show_help = false;
            }
            return Ok(());
        }

        // Playlist-name prompt has focus
        if ui.prompt.is_some() {
            match key.code {
                KeyCode::Esc => {
                    ui.prompt = None;
                }
                KeyCode::Enter => {
                    let submitted = ui
                        .prompt
                        .take()
                        .and_then(|prompt| prompt.name().map(|name| (prompt.purpose, name.to_string())));
                    drop(ui);
                    if let Some((purpose, name)) = submitted {
                        self.spawn_action(move |controller| async move {
                            match purpose {
                                PromptPurpose::AddSelection => {
                                    let _ = controller.add_selection_to_playlist(&name).await;
                                }
                                PromptPurpose::SaveQueue => {
                                    let _ = controller.save_queue_as_playlist(&name).await;
                                }
                            }
                        });
                    }
                }
                KeyCode::Backspace => {
                    if let Some(prompt) = ui.prompt.as_mut() {
                        prompt.input.pop();
                    }
                }
                KeyCode::Char(c) => {
                    if (c == 'q' || c == 'Q') && key.modifiers.contains(KeyModifiers::CONTROL) {
                        ui.should_quit = true;
                        return Ok(());
                    }
                    if let Some(prompt) = ui.prompt.as_mut() {
                        prompt.input.push(c);
                    }
                }
                _ => {}
            }
            return Ok(());
        }

        // Filter prompt has focus
        if ui.filter_editing {
            match key.code {
                KeyCode::Enter | KeyCode::Esc => {
                    ui.filter_editing = false;
                }
                KeyCode::Backspace => {
                    ui.filter_input.pop();
                    let text = ui.filter_input.clone();
                    drop(ui);
                    self.filter_input(text);
                }
                KeyCode::Char(c) => {
                    // Ctrl+Q still quits while typing
                    if (c == 'q' || c == 'Q') && key.modifiers.contains(KeyModifiers::CONTROL) {
                        ui.should_quit = true;
                        return Ok(());
                    }
                    ui.filter_input.push(c);
                    let text = ui.filter_input.clone();
                    drop(ui);
                    self.filter_input(text);
                }
                _ => {}
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                ui.should_quit = true;
            }
            KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::Char('?') => {
                ui.show_help = true;
            }
            KeyCode::Char(c @ '1'..='7') => {
                let index = c as usize - '1' as usize;
                let root = RootView::ALL[index];
                ui.filter_input.clear();
                drop(ui);
                self.spawn_action(move |controller| async move {
                    controller.switch_root(root).await;
                });
            }
            KeyCode::Char('/') => {
                ui.filter_editing = true;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                ui.move_up();
            }
            KeyCode::Down | KeyCode::Char('j') => {
                drop(ui);
                let item_count = self.session.lock().await.items.len();
                let mut ui = self.ui.lock().await;
                ui.move_down(item_count);
                if ui.remaining(item_count) < LOAD_MORE_THRESHOLD {
                    drop(ui);
                    self.spawn_action(|controller| async move {
                        controller.load_more().await;
                    });
                }
            }
            KeyCode::Enter => {
                let index = ui.cursor;
                drop(ui);
                self.spawn_action(move |controller| async move {
                    controller.open_item(index).await;
                });
            }
            KeyCode::Backspace | KeyCode::Esc => {
                ui.filter_input.clear();
                drop(ui);
                self.spawn_action(|controller| async move {
                    controller.back().await;
                });
            }
            // Selection
            KeyCode::Char(' ') => {
                let index = ui.cursor;
                drop(ui);
                self.toggle_selection(index).await;
            }
            KeyCode::Char('a') | KeyCode::Char('A') => {
                drop(ui);
                self.toggle_all_visible().await;
            }
            KeyCode::Char('c') | KeyCode::Char('C') => {
                drop(ui);
                self.clear_selection().await;
            }
            KeyCode::Char('e') | KeyCode::Char('E') => {
                drop(ui);
                self.spawn_action(|controller| async move {
                    let _ = controller.enqueue_selection().await;
                });
            }
            KeyCode::Char('i') | KeyCode::Char('I') => {
                let index = ui.cursor;
                drop(ui);
                self.spawn_action(move |controller| async move {
                    let _ = controller.enqueue_item(index).await;
                });
            }
            KeyCode::Char('l') | KeyCode::Char('L') => {
                drop(ui);
                if self.selection_count().await > 0 {
                    self.ui.lock().await.prompt = Some(NamePrompt::new(PromptPurpose::AddSelection));
                }
            }
            KeyCode::Char('w') | KeyCode::Char('W') => {
                ui.prompt = Some(NamePrompt::new(PromptPurpose::SaveQueue));
            }
            KeyCode::Char('x') | KeyCode::Char('X') => {
                drop(ui);
                self.spawn_action(|controller| async move {
                    let _ = controller.clear_queue().await;
                });
            }
            // Playback
            KeyCode::Char('p') | KeyCode::Char('P') => {
                drop(ui);
                self.spawn_action(|controller| async move {
                    let _ = controller.toggle_playback().await;
                });
            }
            KeyCode::Char('n') | KeyCode::Char('N') => {
                drop(ui);
                self.spawn_action(|controller| async move {
                    let _ = controller.next_track().await;
                });
            }
            KeyCode::Char('b') | KeyCode::Char('B') => {
                drop(ui);
                self.spawn_action(|controller| async move {
                    let _ = controller.previous_track().await;
                });
            }
            KeyCode::Char('S') => {
                drop(ui);
                self.spawn_action(|controller| async move {
                    let _ = controller.stop_playback().await;
                });
            }
            KeyCode::Char('s') => {
                drop(ui);
                self.spawn_action(|controller| async move {
                    let _ = controller.toggle_shuffle().await;
                });
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                drop(ui);
                self.spawn_action(|controller| async move {
                    let _ = controller.toggle_repeat().await;
                });
            }
            KeyCode::Left | KeyCode::Right => {
                drop(ui);
                let delta = if key.code == KeyCode::Left {
                    -SEEK_STEP_SECONDS
                } else {
                    SEEK_STEP_SECONDS
                };
                self.spawn_action(move |controller| async move {
                    let _ = controller.seek_relative(delta).await;
                });
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                drop(ui);
                self.spawn_action(|controller| async move {
                    let _ = controller.volume_up().await;
                });
            }
            KeyCode::Char('-') => {
                drop(ui);
                self.spawn_action(|controller| async move {
                    let _ = controller.volume_down().await;
                });
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crossterm::event::{KeyEvent, KeyEventState};
    use serde_json::json;

    use super::*;
    use crate::controller::testing::{controller, page};
    use crate::gateway::testing::ScriptedTransport;
    use crate::model::View;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_number_keys_switch_roots() {
        let transport = ScriptedTransport::new();
        transport.json("/api/content/browse/genres", json!({"ok": true, "items": [{"genre": "Pop"}]}));
        let (controller, _renderer) = controller(&transport);

        controller.handle_key_event(press(KeyCode::Char('3'))).await.unwrap();
        settle().await;

        assert_eq!(controller.list_view().await.view, View::Root(RootView::Genres));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cursor_near_end_triggers_load_more() {
        let transport = ScriptedTransport::new();
        transport.json(
            "/api/content/browse/artists",
            page(50, |i| json!({ "artist": format!("Artist {}", i) })),
        );
        let (controller, _renderer) = controller(&transport);

        controller.switch_root(RootView::Artists).await;
        controller.ui.lock().await.cursor = 43;

        controller.handle_key_event(press(KeyCode::Down)).await.unwrap();
        settle().await;
        assert_eq!(controller.list_view().await.page, 1, "five rows left, no fetch yet");

        controller.handle_key_event(press(KeyCode::Down)).await.unwrap();
        settle().await;
        assert_eq!(controller.list_view().await.page, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_filter_prompt_captures_typing() {
        let transport = ScriptedTransport::new();
        transport.json("/api/content/browse/artists", json!({"ok": true, "items": []}));
        let (controller, _renderer) = controller(&transport);

        controller.handle_key_event(press(KeyCode::Char('/'))).await.unwrap();
        for c in "qu".chars() {
            controller.handle_key_event(press(KeyCode::Char(c))).await.unwrap();
        }
        controller.handle_key_event(press(KeyCode::Enter)).await.unwrap();

        let ui = controller.ui_state().await;
        assert!(!ui.should_quit, "q is text while the prompt has focus");
        assert!(!ui.filter_editing);
        assert_eq!(ui.filter_input, "qu");

        tokio::time::sleep(Duration::from_millis(400)).await;
        let calls = transport.calls_to("/api/content/browse/artists");
        assert_eq!(calls.len(), 1);
        assert!(calls[0].path.ends_with("q=qu"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_panel_keys_reach_queue_playlists_and_outputs() {
        let transport = ScriptedTransport::new();
        transport.json("/api/queue", json!({"ok": true, "queue": [{"title": "A"}]}));
        transport.json("/api/content/playlists", json!({"ok": true, "playlists": [{"playlist": "P"}]}));
        transport.json("/api/audio/status", json!({"ok": true, "outputs": [{"id": 0, "name": "DAC", "enabled": true}]}));
        let (controller, _renderer) = controller(&transport);

        for (key, root) in [('5', RootView::Queue), ('6', RootView::Playlists), ('7', RootView::Outputs)] {
            controller.handle_key_event(press(KeyCode::Char(key))).await.unwrap();
            settle().await;
            let list = controller.list_view().await;
            assert_eq!(list.view, View::Root(root));
            assert_eq!(list.items.len(), 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_playlist_prompt_adds_selection() {
        let transport = ScriptedTransport::new();
        transport.json(
            "/api/content/browse/folders",
            page(2, |i| json!({ "type": "file", "name": format!("{}.mp3", i), "path": format!("f/{}.mp3", i) })),
        );
        transport.json("/api/content/playlist/add_items", json!({"ok": true}));
        let (controller, _renderer) = controller(&transport);

        controller.switch_root(RootView::Folders).await;
        controller.handle_key_event(press(KeyCode::Char('l'))).await.unwrap();
        assert!(controller.ui_state().await.prompt.is_none(), "nothing selected, no prompt");

        controller.handle_key_event(press(KeyCode::Char('a'))).await.unwrap();
        controller.handle_key_event(press(KeyCode::Char('l'))).await.unwrap();
        for c in " Quiet ".chars() {
            controller.handle_key_event(press(KeyCode::Char(c))).await.unwrap();
        }
        assert!(!controller.should_quit().await, "q is text while the prompt has focus");

        controller.handle_key_event(press(KeyCode::Enter)).await.unwrap();
        settle().await;

        assert!(controller.ui_state().await.prompt.is_none());
        let calls = transport.calls_to("/api/content/playlist/add_items");
        assert_eq!(
            calls[0].body,
            Some(json!({"playlist": "Quiet", "paths": ["f/0.mp3", "f/1.mp3"]}))
        );
        assert_eq!(controller.selection_count().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_queue_prompt_can_be_cancelled() {
        let transport = ScriptedTransport::new();
        transport.json("/api/content/playlist/save", json!({"ok": true}));
        let (controller, _renderer) = controller(&transport);

        controller.handle_key_event(press(KeyCode::Char('w'))).await.unwrap();
        controller.handle_key_event(press(KeyCode::Char('x'))).await.unwrap();
        controller.handle_key_event(press(KeyCode::Esc)).await.unwrap();

        controller.handle_key_event(press(KeyCode::Char('w'))).await.unwrap();
        controller.handle_key_event(press(KeyCode::Char(' '))).await.unwrap();
        controller.handle_key_event(press(KeyCode::Enter)).await.unwrap();
        settle().await;
        assert!(transport.calls().is_empty(), "cancelled and blank prompts send nothing");

        controller.handle_key_event(press(KeyCode::Char('W'))).await.unwrap();
        for c in "Night".chars() {
            controller.handle_key_event(press(KeyCode::Char(c))).await.unwrap();
        }
        controller.handle_key_event(press(KeyCode::Backspace)).await.unwrap();
        controller.handle_key_event(press(KeyCode::Enter)).await.unwrap();
        settle().await;

        assert_eq!(
            transport.calls_to("/api/content/playlist/save")[0].body,
            Some(json!({"name": "Nigh"}))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_enqueue_key_queues_cursor_row() {
        let transport = ScriptedTransport::new();
        transport.json(
            "/api/content/browse/folders",
            page(3, |i| json!({ "type": "file", "name": format!("{}.mp3", i), "path": format!("f/{}.mp3", i) })),
        );
        transport.json("/api/queue/add", json!({"ok": true}));
        transport.json("/api/status", json!({"status": {"state": "play", "elapsed": 1, "duration": 10}}));
        let (controller, _renderer) = controller(&transport);

        controller.switch_root(RootView::Folders).await;
        controller.handle_key_event(press(KeyCode::Down)).await.unwrap();
        controller.handle_key_event(press(KeyCode::Char('i'))).await.unwrap();
        settle().await;

        let calls = transport.calls_to("/api/queue/add");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].body, Some(json!({"path": "f/1.mp3"})));
    }

    #[tokio::test(start_paused = true)]
    async fn test_quit_and_help() {
        let transport = ScriptedTransport::new();
        let (controller, _renderer) = controller(&transport);

        controller.handle_key_event(press(KeyCode::Char('h'))).await.unwrap();
        controller.handle_key_event(press(KeyCode::Char('q'))).await.unwrap();
        assert!(!controller.should_quit().await, "help popup swallows keys");

        controller.handle_key_event(press(KeyCode::Esc)).await.unwrap();
        controller.handle_key_event(press(KeyCode::Char('q'))).await.unwrap();
        assert!(controller.should_quit().await);
    }
}
