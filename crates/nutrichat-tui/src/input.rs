/// Single-line question buffer with a character cursor
#[derive(Debug, Default, Clone)]
pub struct InputBox {
    buffer: String,
    cursor: usize,
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

impl InputBox {
    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_blank(&self) -> bool {
        self.buffer.trim().is_empty()
    }

    /// Take the trimmed text out of the box.
    ///
    /// Nothing happens while `disabled` or when the buffer is blank; the
    /// text stays where it is.
    pub fn submit(&mut self, disabled: bool) -> Option<String> {
        if disabled || self.is_blank() {
            return None;
        }
        let text = self.buffer.trim().to_string();
        self.buffer.clear();
        self.cursor = 0;
        Some(text)
    }

    pub fn insert(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.buffer, self.cursor);
        self.buffer.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.buffer, self.cursor);
            self.buffer.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.char_count() {
            let byte_pos = char_to_byte_index(&self.buffer, self.cursor);
            self.buffer.remove(byte_pos);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.char_count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.char_count();
    }

    /// Portion of the buffer that fits in `width` columns, scrolled so the
    /// cursor stays visible, plus the cursor column within it.
    pub fn visible(&self, width: usize) -> (String, usize) {
        let scroll_offset = if width == 0 || self.cursor < width {
            0
        } else {
            self.cursor - width + 1
        };

        let visible_text: String = self
            .buffer
            .chars()
            .skip(scroll_offset)
            .take(width)
            .collect();

        (visible_text, self.cursor - scroll_offset)
    }

    fn char_count(&self) -> usize {
        self.buffer.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> InputBox {
        let mut input = InputBox::default();
        for c in text.chars() {
            input.insert(c);
        }
        input
    }

    #[test]
    fn test_submit_trims_and_clears() {
        let mut input = typed("  kalori Big Mac  ");
        assert_eq!(input.submit(false), Some("kalori Big Mac".to_string()));
        assert_eq!(input.text(), "");
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn test_blank_submit_keeps_buffer() {
        let mut input = typed("   ");
        assert_eq!(input.submit(false), None);
        assert_eq!(input.text(), "   ");
    }

    #[test]
    fn test_disabled_submit_keeps_buffer() {
        let mut input = typed("gula McFlurry");
        assert_eq!(input.submit(true), None);
        assert_eq!(input.text(), "gula McFlurry");
        assert_eq!(input.cursor(), 13);
    }

    #[test]
    fn test_editing_is_utf8_safe() {
        let mut input = typed("kopi☕");
        input.move_left();
        input.insert('!');
        assert_eq!(input.text(), "kopi!☕");

        input.move_end();
        input.backspace();
        assert_eq!(input.text(), "kopi!");

        input.move_home();
        input.delete();
        assert_eq!(input.text(), "opi!");
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn test_cursor_is_clamped() {
        let mut input = typed("ab");
        input.move_right();
        assert_eq!(input.cursor(), 2);
        input.move_home();
        input.move_left();
        assert_eq!(input.cursor(), 0);
        input.backspace();
        assert_eq!(input.text(), "ab");
    }

    #[test]
    fn test_visible_scrolls_with_cursor() {
        let input = typed("abcdefgh");
        assert_eq!(input.visible(4), ("fgh".to_string(), 3));
        assert_eq!(input.visible(20), ("abcdefgh".to_string(), 8));

        let mut input = input;
        input.move_home();
        assert_eq!(input.visible(4), ("abcd".to_string(), 0));
    }
}
