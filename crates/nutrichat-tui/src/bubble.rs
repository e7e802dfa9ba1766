//! Message bubbles
//!
//! Maps a transcript entry to the lines drawn in the chat pane. The
//! timestamp comes from the clock passed in at render time; messages carry no
//! time of their own, so a redraw a minute later shows a different time.

use std::fmt::Display;

use chrono::{DateTime, TimeZone};
use nutrichat_core::{ChatMessage, ChatRole};
use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

/// Visual description of one message
#[derive(Debug, Clone, PartialEq)]
pub struct Bubble {
    pub index: usize,
    pub role: ChatRole,
    pub alignment: Alignment,
    pub icon: &'static str,
    pub label: &'static str,
    pub badge: Option<&'static str>,
    pub accent: Color,
    pub lines: Vec<String>,
    pub timestamp: String,
}

pub fn bubble<Tz>(message: &ChatMessage, index: usize, now: &DateTime<Tz>) -> Bubble
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let (alignment, icon, label, badge, accent) = match message.role {
        ChatRole::User => (Alignment::Right, "👤", "Kamu", None, Color::Cyan),
        ChatRole::Assistant => (Alignment::Left, "🤖", "Asisten", Some("AI"), Color::Yellow),
    };

    Bubble {
        index,
        role: message.role,
        alignment,
        icon,
        label,
        badge,
        accent,
        // split, not lines(): blank and trailing lines are part of the text
        lines: message.content.split('\n').map(str::to_string).collect(),
        timestamp: now.format("%H.%M").to_string(),
    }
}

impl Bubble {
    pub fn to_lines(&self) -> Vec<Line<'static>> {
        let mut lines = Vec::with_capacity(self.lines.len() + 3);

        let header_style = Style::default().fg(self.accent).add_modifier(Modifier::BOLD);
        let header = match self.role {
            ChatRole::User => format!("{} {}", self.label, self.icon),
            ChatRole::Assistant => format!("{} {}", self.icon, self.label),
        };
        lines.push(Line::from(Span::styled(header, header_style)).alignment(self.alignment));

        for text in &self.lines {
            let line = match self.role {
                ChatRole::User => Line::from(Span::styled(
                    text.clone(),
                    Style::default().fg(self.accent),
                )),
                ChatRole::Assistant => parse_markdown_line(text),
            };
            lines.push(line.alignment(self.alignment));
        }

        let mut footer = vec![Span::styled(
            self.timestamp.clone(),
            Style::default().fg(Color::DarkGray),
        )];
        if let Some(badge) = self.badge {
            footer.push(Span::raw(" "));
            footer.push(Span::styled(
                format!(" {} ", badge),
                Style::default().bg(Color::Yellow).fg(Color::Red).add_modifier(Modifier::BOLD),
            ));
        }
        lines.push(Line::from(footer).alignment(self.alignment));
        lines.push(Line::default());

        lines
    }
}

/// Placeholder bubble shown while a reply is pending.
pub fn thinking_lines(animation_frame: u8) -> Vec<Line<'static>> {
    // Animated ellipsis: cycles through ".", "..", "..."
    let dots = ".".repeat((animation_frame as usize % 3) + 1);
    vec![
        Line::from(Span::styled(
            "🤖 Asisten",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("AI sedang berpikir{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )),
    ]
}

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.chars().peekable();
    let mut current_text = String::new();

    while let Some(c) = chars.next() {
        if c != '*' || chars.peek() != Some(&'*') {
            current_text.push(c);
            continue;
        }
        chars.next();

        let mut bold_text = String::new();
        let mut found_close = false;
        while let Some(c) = chars.next() {
            if c == '*' && chars.peek() == Some(&'*') {
                chars.next();
                found_close = true;
                break;
            }
            bold_text.push(c);
        }

        if found_close && !bold_text.is_empty() {
            if !current_text.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut current_text)));
            }
            spans.push(Span::styled(
                bold_text,
                Style::default().add_modifier(Modifier::BOLD),
            ));
        } else {
            // No closing **, treat as literal
            current_text.push_str("**");
            current_text.push_str(&bold_text);
        }
    }

    if !current_text.is_empty() {
        spans.push(Span::raw(current_text));
    }

    Line::from(spans)
}
