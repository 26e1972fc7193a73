//! Input document with a cursor
//!
//! The editing buffer itself lives outside this crate; this is the small
//! read-only view of it that completion, highlighting and validation work
//! on. Cursor positions are character offsets, matching the spans reported
//! by grammar matches.

/// A piece of input text together with a cursor position.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    text: String,
    cursor_position: usize,
}

impl Document {
    /// A document with the cursor at `cursor_position` (in characters).
    /// Positions past the end of the text are clamped to the end.
    pub fn new(text: impl Into<String>, cursor_position: usize) -> Document {
        let text = text.into();
        let cursor_position = cursor_position.min(text.chars().count());
        Document {
            text,
            cursor_position,
        }
    }

    /// A document with the cursor after the last character.
    pub fn at_end(text: impl Into<String>) -> Document {
        let text = text.into();
        let cursor_position = text.chars().count();
        Document {
            text,
            cursor_position,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Cursor offset in characters.
    pub fn cursor_position(&self) -> usize {
        self.cursor_position
    }

    /// The text in front of the cursor. This is what prefix matching runs
    /// on for completion.
    pub fn text_before_cursor(&self) -> &str {
        &self.text[..byte_index(&self.text, self.cursor_position)]
    }

    /// The text split on newlines. Always at least one line.
    pub fn lines(&self) -> Vec<&str> {
        self.text.split('\n').collect()
    }
}

fn byte_index(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map(|(index, _)| index)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_before_cursor_respects_character_boundaries() {
        let document = Document::new("日本語", 2);
        assert_eq!(document.text_before_cursor(), "日本");
    }

    #[test]
    fn cursor_is_clamped_to_the_text_length() {
        let document = Document::new("ab", 10);
        assert_eq!(document.cursor_position(), 2);
        assert_eq!(document.text_before_cursor(), "ab");
    }

    #[test]
    fn at_end_puts_the_cursor_after_the_last_character() {
        let document = Document::at_end("cd /ho");
        assert_eq!(document.cursor_position(), 6);
        assert_eq!(document.text_before_cursor(), "cd /ho");
    }

    #[test]
    fn empty_text_is_one_empty_line() {
        assert_eq!(Document::default().lines(), vec![""]);
        assert_eq!(Document::at_end("a\n\nb").lines(), vec!["a", "", "b"]);
    }
}
