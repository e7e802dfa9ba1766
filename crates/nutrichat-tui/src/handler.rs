use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::{App, InputMode};
use crate::tui::AppEvent;

pub fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Reply { id, result } => app.receive_reply(id, result),
        AppEvent::BackendStatus(status) => app.set_backend_status(status),
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => {
                app.should_quit = true;
                return;
            }
            KeyCode::Char('n') => {
                app.new_conversation();
                return;
            }
            _ => {}
        }
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Start typing
        KeyCode::Char('i') | KeyCode::Char('a') | KeyCode::Enter => {
            app.input_mode = InputMode::Editing;
        }

        KeyCode::Char('n') => app.new_conversation(),
        KeyCode::Char('m') => app.show_menu_panel = !app.show_menu_panel,

        // Scrolling
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_half_page_down();
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_half_page_up();
        }
        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(1),
        KeyCode::PageDown => app.scroll_half_page_down(),
        KeyCode::PageUp => app.scroll_half_page_up(),
        KeyCode::Char('g') | KeyCode::Home => app.scroll_to_top(),
        KeyCode::Char('G') | KeyCode::End => app.scroll_to_bottom(),

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Esc {
        app.input_mode = InputMode::Normal;
        return;
    }

    // The input box is disabled while a reply is pending
    if app.chat.awaiting_reply() {
        return;
    }

    match key.code {
        KeyCode::Enter => app.submit_question(),
        KeyCode::Backspace => app.input.backspace(),
        KeyCode::Delete => app.input.delete(),
        KeyCode::Left => app.input.move_left(),
        KeyCode::Right => app.input.move_right(),
        KeyCode::Home => app.input.move_home(),
        KeyCode::End => app.input.move_end(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => app.input.insert(c),
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let in_chat = app
        .chat_area
        .map(|r| point_in_rect(mouse.column, mouse.row, r))
        .unwrap_or(false);
    if !in_chat {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_down(3),
        MouseEventKind::ScrollUp => app.scroll_up(3),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState};
    use nutrichat_core::{ChatRole, GREETING};
    use tokio::sync::mpsc;

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn ctrl(c: char) -> AppEvent {
        AppEvent::Key(KeyEvent {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_event(app, key(KeyCode::Char(c))).unwrap();
        }
    }

    /// An address nothing listens on, so requests fail fast.
    async fn closed_backend() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}", addr)
    }

    async fn new_app() -> (App, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (App::new(&closed_backend().await, tx), rx)
    }

    #[tokio::test]
    async fn test_blank_enter_is_ignored() {
        let (mut app, _rx) = new_app().await;
        type_text(&mut app, "   ");
        handle_event(&mut app, key(KeyCode::Enter)).unwrap();

        assert_eq!(app.chat.messages().len(), 1);
        assert!(!app.chat.awaiting_reply());
        assert_eq!(app.input.text(), "   ");
    }

    #[tokio::test]
    async fn test_failed_turn_ends_with_notice() {
        let (mut app, mut rx) = new_app().await;
        type_text(&mut app, "kalori Big Mac");
        handle_event(&mut app, key(KeyCode::Enter)).unwrap();

        assert_eq!(app.chat.messages().len(), 2);
        assert_eq!(app.chat.messages()[1].content, "kalori Big Mac");
        assert!(app.chat.awaiting_reply());
        assert_eq!(app.input.text(), "");

        // Typing is ignored while the reply is pending
        type_text(&mut app, "x");
        assert_eq!(app.input.text(), "");

        let event = rx.recv().await.unwrap();
        assert!(matches!(event, AppEvent::Reply { .. }));
        handle_event(&mut app, event).unwrap();

        let messages = app.chat.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2].role, ChatRole::Assistant);
        assert!(messages[2].content.contains("Pastikan backend server sudah berjalan"));
        assert!(!app.chat.awaiting_reply());
    }

    #[tokio::test]
    async fn test_new_chat_during_request() {
        let (mut app, mut rx) = new_app().await;
        type_text(&mut app, "gula McFlurry");
        handle_event(&mut app, key(KeyCode::Enter)).unwrap();

        handle_event(&mut app, ctrl('n')).unwrap();
        assert!(!app.chat.awaiting_reply());

        // Whatever the request task reports, the fresh conversation is untouched
        let event = rx.recv().await.unwrap();
        handle_event(&mut app, event).unwrap();
        assert_eq!(app.chat.messages().len(), 1);
        assert_eq!(app.chat.messages()[0].content, GREETING);
    }

    #[tokio::test]
    async fn test_normal_mode_keys() {
        let (mut app, _rx) = new_app().await;
        assert_eq!(app.input_mode, InputMode::Editing);

        handle_event(&mut app, key(KeyCode::Esc)).unwrap();
        assert_eq!(app.input_mode, InputMode::Normal);

        handle_event(&mut app, key(KeyCode::Char('m'))).unwrap();
        assert!(!app.show_menu_panel);

        handle_event(&mut app, key(KeyCode::Char('i'))).unwrap();
        assert_eq!(app.input_mode, InputMode::Editing);

        // 'q' is just text while editing
        handle_event(&mut app, key(KeyCode::Char('q'))).unwrap();
        assert!(!app.should_quit);
        assert_eq!(app.input.text(), "q");

        handle_event(&mut app, ctrl('c')).unwrap();
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_scroll_is_clamped_to_content() {
        let (mut app, _rx) = new_app().await;
        app.update_chat_layout(50, 10);
        assert_eq!(app.chat_scroll, 40);

        app.input_mode = InputMode::Normal;
        handle_event(&mut app, key(KeyCode::Char('k'))).unwrap();
        assert_eq!(app.chat_scroll, 39);
        assert!(!app.follow_bottom);

        handle_event(&mut app, key(KeyCode::Char('g'))).unwrap();
        assert_eq!(app.chat_scroll, 0);

        // New content doesn't yank the view while reading history
        app.update_chat_layout(60, 10);
        assert_eq!(app.chat_scroll, 0);

        handle_event(&mut app, key(KeyCode::Char('G'))).unwrap();
        assert_eq!(app.chat_scroll, 50);
        handle_event(&mut app, key(KeyCode::Char('j'))).unwrap();
        assert_eq!(app.chat_scroll, 50);
        assert!(app.follow_bottom);
    }
}
