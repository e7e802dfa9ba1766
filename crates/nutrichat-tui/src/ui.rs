use chrono::Local;
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
};

use crate::app::{App, BackendState, InputMode};
use crate::bubble::{bubble, thinking_lines};

const PLACEHOLDER: &str = "Tanyakan tentang menu McDonald's favoritmu...";

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    let show_menu = app.show_menu_panel && !app.chat.menu_items().is_empty();
    let (chat_column, menu_area) = if show_menu {
        let [chat_column, menu_area] = Layout::horizontal([
            Constraint::Percentage(65),
            Constraint::Percentage(35),
        ])
        .areas(body_area);
        (chat_column, Some(menu_area))
    } else {
        (body_area, None)
    };

    let [chat_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(chat_column);

    render_chat(app, frame, chat_area);
    render_input(app, frame, input_area);
    if let Some(menu_area) = menu_area {
        render_menu_panel(app, frame, menu_area);
    }

    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let (indicator, indicator_style) = match &app.backend {
        BackendState::Checking => ("◌ memeriksa".to_string(), Style::default().fg(Color::Gray)),
        BackendState::Online(status) => (
            format!("● {}", status.status.as_deref().unwrap_or("online")),
            Style::default().fg(Color::Green),
        ),
        BackendState::Offline(_) => ("● offline".to_string(), Style::default().fg(Color::LightRed)),
    };

    let title = Line::from(vec![
        Span::styled(" 🍔 McDonald's Nutrition AI ", Style::default().fg(Color::Yellow).bold()),
        Span::styled(app.backend_url.clone(), Style::default().fg(Color::White)),
        Span::raw(" "),
        Span::styled(indicator, indicator_style),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::Red));
    frame.render_widget(header, area);
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    app.chat_area = Some(area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Asisten Nutrisi ");

    let now = Local::now();
    let mut lines: Vec<Line> = Vec::new();
    for (index, message) in app.chat.messages().iter().enumerate() {
        lines.extend(bubble(message, index, &now).to_lines());
    }
    if app.chat.awaiting_reply() {
        lines.extend(thinking_lines(app.animation_frame));
    }

    // Inner size minus borders, used for wrap and scroll calculations
    let inner_width = area.width.saturating_sub(2);
    let inner_height = area.height.saturating_sub(2);

    let chat = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false });
    // Counted before the block is attached, so borders are not included
    let total_rows = chat.line_count(inner_width).min(u16::MAX as usize) as u16;
    app.update_chat_layout(total_rows, inner_height);

    frame.render_widget(chat.block(block).scroll((app.chat_scroll, 0)), area);

    if total_rows > inner_height {
        let mut scrollbar_state = ScrollbarState::new(total_rows.saturating_sub(inner_height) as usize)
            .position(app.chat_scroll as usize);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            area,
            &mut scrollbar_state,
        );
    }
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let waiting = app.chat.awaiting_reply();
    let editing = app.input_mode == InputMode::Editing;

    let border_color = if waiting {
        Color::DarkGray
    } else if editing {
        Color::Yellow
    } else {
        Color::Gray
    };
    let title = if waiting {
        " Menunggu jawaban... "
    } else {
        " Tanya (Enter untuk mengirim) "
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let (visible_text, cursor_x) = app.input.visible(inner_width);

    let input = if app.input.text().is_empty() {
        Paragraph::new(Span::styled(
            PLACEHOLDER,
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ))
    } else {
        Paragraph::new(visible_text).style(Style::default().fg(Color::Cyan))
    };
    frame.render_widget(input.block(input_block), area);

    // Show cursor when editing
    if editing && !waiting {
        frame.set_cursor_position((area.x + cursor_x as u16 + 1, area.y + 1));
    }
}

fn render_menu_panel(app: &App, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta))
        .title(" Menu terkait (m untuk sembunyikan) ");

    let mut lines: Vec<Line> = Vec::new();
    for item in app.chat.menu_items() {
        lines.push(Line::from(vec![
            Span::styled(item.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(format!(" ({})", item.category), Style::default().fg(Color::DarkGray)),
        ]));
        lines.push(Line::from(Span::styled(
            item.nutrition_summary(),
            Style::default().fg(Color::Yellow),
        )));
        lines.push(Line::default());
    }

    let panel = Paragraph::new(Text::from(lines))
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(panel, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " KETIK ",
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = match app.input_mode {
        InputMode::Editing => vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" kirim ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" selesai mengetik ", label_style),
            Span::styled(" Ctrl+N ", key_style),
            Span::styled(" chat baru ", label_style),
        ],
        InputMode::Normal => vec![
            Span::styled(" i ", key_style),
            Span::styled(" ketik ", label_style),
            Span::styled(" j/k ", key_style),
            Span::styled(" gulir ", label_style),
            Span::styled(" n ", key_style),
            Span::styled(" chat baru ", label_style),
            Span::styled(" m ", key_style),
            Span::styled(" menu ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" keluar ", label_style),
        ],
    };

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use nutrichat_core::{MenuItem, Reply};
    use ratatui::{backend::TestBackend, Terminal};
    use tokio::sync::mpsc;

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    fn test_app() -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        App::new("http://localhost:8000", tx)
    }

    #[test]
    fn test_renders_greeting_and_placeholder() {
        let mut app = test_app();
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();

        let screen = screen_text(&terminal);
        assert!(screen.contains("Asisten"));
        assert!(screen.contains("Halo!"));
        assert!(screen.contains("Tanyakan tentang menu"));
        assert!(screen.contains("http://localhost:8000"));
        assert!(app.chat_area.is_some());
    }

    #[test]
    fn test_menu_panel_follows_latest_reply() {
        let mut app = test_app();
        let request = app.chat.begin("Big Mac").unwrap();
        app.chat.complete(
            request.id,
            Ok(Reply {
                content: "Big Mac punya 550 kkal".to_string(),
                menu_items: vec![MenuItem {
                    name: "Big Mac".to_string(),
                    category: "Burger".to_string(),
                    calories: 550.0,
                    sugar: 9.0,
                    salt: 1010.0,
                    fat: 30.0,
                }],
            }),
        );

        let mut terminal = Terminal::new(TestBackend::new(120, 30)).unwrap();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();
        assert!(screen_text(&terminal).contains("Menu terkait"));

        app.show_menu_panel = false;
        terminal.draw(|frame| render(&mut app, frame)).unwrap();
        assert!(!screen_text(&terminal).contains("Menu terkait"));
    }

    #[test]
    fn test_word_wrapped_reply_scrolls_to_its_last_line() {
        let mut app = test_app();
        let request = app.chat.begin("ceritakan semua menu").unwrap();
        let long_reply = format!("{}\nZZEND", "aaaaaaaaaaaaaaaaaaa ".repeat(30));
        app.chat.complete(
            request.id,
            Ok(Reply {
                content: long_reply,
                menu_items: Vec::new(),
            }),
        );

        let mut terminal = Terminal::new(TestBackend::new(40, 20)).unwrap();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();

        assert!(app.follow_bottom);
        assert_eq!(app.chat_scroll, app.chat_total_rows - app.chat_height);
        assert!(screen_text(&terminal).contains("ZZEND"));

        // Scrolling past the end stays on the last row
        app.input_mode = InputMode::Normal;
        app.scroll_down(100);
        terminal.draw(|frame| render(&mut app, frame)).unwrap();
        assert!(screen_text(&terminal).contains("ZZEND"));
    }
}
