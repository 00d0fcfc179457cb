use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use wayplan_core::KeyboardSignal;

use crate::app::{App, InputMode, Screen};
use crate::tui::AppEvent;

/// Occlusion height reported when the emulated keyboard comes up. A mobile
/// shell would report the real measurement; the coordinator only needs a
/// positive finite value.
const EMULATED_KEYBOARD_HEIGHT: f32 = 336.0;

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key)?,
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.tick_animation();
        }
        AppEvent::Keyboard(signal) => {
            app.handle_keyboard_signal(signal);
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) -> Result<()> {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return Ok(());
    }

    match app.screen {
        Screen::Plans => handle_plans_key(app, key),
        Screen::Chat => match app.input_mode {
            InputMode::Normal => handle_chat_normal(app, key),
            InputMode::Editing => handle_chat_editing(app, key),
        },
    }

    Ok(())
}

fn handle_plans_key(app: &mut App, key: KeyEvent) {
    match key.code {
        // Quit
        KeyCode::Char('q') => app.should_quit = true,

        // Navigation
        KeyCode::Char('j') | KeyCode::Down => app.plans_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.plans_nav_up(),
        KeyCode::Char('g') => app.plans_nav_first(),
        KeyCode::Char('G') => app.plans_nav_last(),

        // Open the selected plan
        KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => app.open_selected(),

        // Start a new plan
        KeyCode::Char('n') => app.open_new_plan(),

        _ => {}
    }
}

fn handle_chat_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        // Back to the plan list
        KeyCode::Esc | KeyCode::Char('h') | KeyCode::Left | KeyCode::Backspace => {
            app.close_chat();
        }

        // Focus the composer; the emulated keyboard comes up with it
        KeyCode::Char('i') | KeyCode::Tab => {
            app.input_mode = InputMode::Editing;
            app.emit_keyboard_signal(KeyboardSignal::WillAppear {
                height: EMULATED_KEYBOARD_HEIGHT,
            });
        }

        // Transcript scrolling
        KeyCode::Char('j') | KeyCode::Down => {
            if let Some(chat) = app.chat.as_mut() {
                chat.scroll = chat.scroll.saturating_add(1);
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            if let Some(chat) = app.chat.as_mut() {
                chat.scroll = chat.scroll.saturating_sub(1);
            }
        }
        KeyCode::Char('g') => {
            if let Some(chat) = app.chat.as_mut() {
                chat.scroll = 0;
            }
        }
        KeyCode::Char('G') => {
            if let Some(chat) = app.chat.as_mut() {
                chat.scroll_to_bottom();
            }
        }

        _ => {}
    }
}

fn handle_chat_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        // Leave the composer; the emulated keyboard goes down with it
        KeyCode::Esc | KeyCode::Tab => {
            app.input_mode = InputMode::Normal;
            app.emit_keyboard_signal(KeyboardSignal::WillDisappear);
        }

        // Submit. Inert while the draft is blank; the composer stays focused
        // so follow-up messages can be typed while a reply is pending.
        KeyCode::Enter => app.submit_draft(),

        KeyCode::Backspace => {
            if let Some(chat) = app.chat.as_mut() {
                chat.composer.backspace();
            }
        }
        KeyCode::Delete => {
            if let Some(chat) = app.chat.as_mut() {
                chat.composer.delete_forward();
            }
        }
        KeyCode::Left => {
            if let Some(chat) = app.chat.as_mut() {
                chat.composer.move_left();
            }
        }
        KeyCode::Right => {
            if let Some(chat) = app.chat.as_mut() {
                chat.composer.move_right();
            }
        }
        KeyCode::Home => {
            if let Some(chat) = app.chat.as_mut() {
                chat.composer.move_home();
            }
        }
        KeyCode::End => {
            if let Some(chat) = app.chat.as_mut() {
                chat.composer.move_end();
            }
        }
        KeyCode::Char(c) => {
            if let Some(chat) = app.chat.as_mut() {
                chat.composer.insert(c);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;
    use wayplan_core::{Config, ConversationId, SampleItineraries, Sender};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_with_events() -> (App, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let app = App::new(&Config::new(), Box::new(SampleItineraries::new()), tx);
        (app, rx)
    }

    #[test]
    fn enter_on_list_opens_the_selected_plan() {
        let (mut app, _rx) = app_with_events();
        handle_event(&mut app, AppEvent::Key(key(KeyCode::Down))).unwrap();
        handle_event(&mut app, AppEvent::Key(key(KeyCode::Enter))).unwrap();

        assert_eq!(app.screen, Screen::Chat);
        let chat = app.chat.as_ref().unwrap();
        assert_eq!(chat.conversation, ConversationId::from("2"));
        assert_eq!(chat.title, "Kyoto Exploration");
    }

    #[test]
    fn n_starts_a_new_plan() {
        let (mut app, _rx) = app_with_events();
        handle_event(&mut app, AppEvent::Key(key(KeyCode::Char('n')))).unwrap();

        assert_eq!(app.screen, Screen::Chat);
        assert_eq!(app.chat.as_ref().unwrap().title, "New Plan");
    }

    #[test]
    fn esc_in_chat_goes_back_to_the_list() {
        let (mut app, _rx) = app_with_events();
        handle_event(&mut app, AppEvent::Key(key(KeyCode::Enter))).unwrap();
        handle_event(&mut app, AppEvent::Key(key(KeyCode::Esc))).unwrap();

        assert_eq!(app.screen, Screen::Plans);
        assert!(app.chat.is_none());
    }

    #[test]
    fn focus_changes_emit_keyboard_signals() {
        let (mut app, mut rx) = app_with_events();
        handle_event(&mut app, AppEvent::Key(key(KeyCode::Enter))).unwrap();

        handle_event(&mut app, AppEvent::Key(key(KeyCode::Char('i')))).unwrap();
        match rx.try_recv() {
            Ok(AppEvent::Keyboard(KeyboardSignal::WillAppear { height })) => {
                assert!(height > 0.0);
            }
            other => panic!("expected WillAppear, got {other:?}"),
        }

        handle_event(&mut app, AppEvent::Key(key(KeyCode::Esc))).unwrap();
        match rx.try_recv() {
            Ok(AppEvent::Keyboard(KeyboardSignal::WillDisappear)) => {}
            other => panic!("expected WillDisappear, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn typed_submit_appends_the_trimmed_body() {
        let (mut app, _rx) = app_with_events();
        handle_event(&mut app, AppEvent::Key(key(KeyCode::Char('n')))).unwrap();
        handle_event(&mut app, AppEvent::Key(key(KeyCode::Char('i')))).unwrap();

        for c in " Plan Tokyo ".chars() {
            handle_event(&mut app, AppEvent::Key(key(KeyCode::Char(c)))).unwrap();
        }
        handle_event(&mut app, AppEvent::Key(key(KeyCode::Enter))).unwrap();

        let chat = app.chat.as_ref().unwrap();
        let messages = chat.store.list();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].body, "Plan Tokyo");
        assert_eq!(messages[0].sender, Sender::User);
        assert_eq!(chat.composer.draft(), "");
        assert_eq!(app.input_mode, InputMode::Editing);
    }

    #[tokio::test]
    async fn enter_with_blank_draft_is_inert() {
        let (mut app, _rx) = app_with_events();
        handle_event(&mut app, AppEvent::Key(key(KeyCode::Char('n')))).unwrap();
        handle_event(&mut app, AppEvent::Key(key(KeyCode::Char('i')))).unwrap();
        handle_event(&mut app, AppEvent::Key(key(KeyCode::Char(' ')))).unwrap();
        handle_event(&mut app, AppEvent::Key(key(KeyCode::Enter))).unwrap();

        let chat = app.chat.as_ref().unwrap();
        assert!(chat.store.is_empty());
        assert!(!chat.is_waiting());
        assert_eq!(chat.composer.draft(), " ");
    }
}
