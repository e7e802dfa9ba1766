use ratatui::layout::Rect;
use tokio::sync::mpsc::UnboundedSender;

use nutrichat_core::{
    BackendStatus, ChatController, ChatTransport, HttpTransport, Reply, TransportError,
};

use crate::input::InputBox;
use crate::tui::AppEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendState {
    Checking,
    Online(BackendStatus),
    Offline(String),
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,

    // Conversation
    pub chat: ChatController<HttpTransport>,
    pub input: InputBox,

    // Backend
    pub backend_url: String,
    pub backend: BackendState,

    // Chat pane scrolling; follow_bottom pins the view to the newest message
    pub chat_scroll: u16,
    pub chat_height: u16,
    pub chat_total_rows: u16,
    pub follow_bottom: bool,

    // Menu items side panel
    pub show_menu_panel: bool,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Panel area for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,

    events: UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(backend_url: &str, events: UnboundedSender<AppEvent>) -> Self {
        let transport = HttpTransport::new(backend_url);

        Self {
            should_quit: false,
            input_mode: InputMode::Editing,

            backend_url: transport.base_url().to_string(),
            chat: ChatController::new(transport),
            input: InputBox::default(),

            backend: BackendState::Checking,

            chat_scroll: 0,
            chat_height: 0,
            chat_total_rows: 0,
            follow_bottom: true,

            show_menu_panel: true,

            animation_frame: 0,

            chat_area: None,

            events,
        }
    }

    /// Ask the backend for its status in the background.
    pub fn check_backend(&self) {
        let transport = self.chat.transport();
        let tx = self.events.clone();
        tokio::spawn(async move {
            let status = transport.status().await;
            let _ = tx.send(AppEvent::BackendStatus(status));
        });
    }

    pub fn set_backend_status(&mut self, status: Result<BackendStatus, TransportError>) {
        self.backend = match status {
            Ok(status) => {
                tracing::info!(status = ?status.status, model = ?status.model, "backend reachable");
                BackendState::Online(status)
            }
            Err(err) => {
                tracing::warn!(error = %err, url = %self.backend_url, "backend status check failed");
                BackendState::Offline(err.to_string())
            }
        };
    }

    /// Send whatever is in the input box, if the box accepts the submit.
    pub fn submit_question(&mut self) {
        let Some(text) = self.input.submit(self.chat.awaiting_reply()) else {
            return;
        };
        let Some(request) = self.chat.begin(&text) else {
            return;
        };

        let transport = self.chat.transport();
        let tx = self.events.clone();
        tokio::spawn(async move {
            let result = request.dispatch(transport.as_ref()).await;
            let _ = tx.send(AppEvent::Reply {
                id: request.id,
                result,
            });
        });

        self.scroll_to_bottom();
    }

    pub fn receive_reply(&mut self, id: u64, result: Option<Result<Reply, TransportError>>) {
        match result {
            Some(result) => {
                if self.chat.complete(id, result) {
                    self.scroll_to_bottom();
                }
            }
            None => tracing::debug!(request_id = id, "request was cancelled"),
        }
    }

    pub fn new_conversation(&mut self) {
        self.chat.new_conversation();
        self.chat_scroll = 0;
        self.follow_bottom = true;
        self.animation_frame = 0;
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.chat.awaiting_reply() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    fn max_scroll(&self) -> u16 {
        self.chat_total_rows.saturating_sub(self.chat_height)
    }

    pub fn scroll_down(&mut self, rows: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(rows).min(self.max_scroll());
        self.follow_bottom = self.chat_scroll >= self.max_scroll();
    }

    pub fn scroll_up(&mut self, rows: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(rows);
        self.follow_bottom = false;
    }

    pub fn scroll_half_page_down(&mut self) {
        self.scroll_down((self.chat_height / 2).max(1));
    }

    pub fn scroll_half_page_up(&mut self) {
        self.scroll_up((self.chat_height / 2).max(1));
    }

    pub fn scroll_to_top(&mut self) {
        self.chat_scroll = 0;
        self.follow_bottom = false;
    }

    /// Keep the newest message (or the thinking indicator) in view.
    pub fn scroll_to_bottom(&mut self) {
        self.follow_bottom = true;
        self.chat_scroll = self.max_scroll();
    }

    /// Called by the renderer once the chat content has been laid out.
    pub fn update_chat_layout(&mut self, total_rows: u16, height: u16) {
        self.chat_total_rows = total_rows;
        self.chat_height = height;
        if self.follow_bottom {
            self.chat_scroll = self.max_scroll();
        } else {
            self.chat_scroll = self.chat_scroll.min(self.max_scroll());
        }
    }
}
