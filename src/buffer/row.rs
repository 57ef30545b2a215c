//! One document line: raw content, its tab-expanded rendering, and the
//! per-character highlight array derived from it.

use crate::config::TAB_STOP;
use crate::syntax::{highlight_line, HighlightKind, Language};

#[derive(Debug, Clone)]
pub struct Row {
    content: String,
    rendered: String,
    highlight: Vec<HighlightKind>,
    /// True when this row ends inside an unterminated block comment.
    open_comment: bool,
}

impl Row {
    pub fn new(content: String) -> Self {
        let mut row = Self {
            content,
            rendered: String::new(),
            highlight: Vec::new(),
            open_comment: false,
        };
        row.update_rendered();
        row
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn rendered(&self) -> &str {
        &self.rendered
    }

    pub fn highlight(&self) -> &[HighlightKind] {
        &self.highlight
    }

    pub fn open_comment(&self) -> bool {
        self.open_comment
    }

    pub fn content_len(&self) -> usize {
        self.content.chars().count()
    }

    pub fn rendered_len(&self) -> usize {
        self.rendered.chars().count()
    }

    /// Rebuilds the rendered form: every tab advances to the next multiple
    /// of [`TAB_STOP`], everything else is one column wide.
    fn update_rendered(&mut self) {
        let mut rendered = String::with_capacity(self.content.len());
        let mut col = 0usize;
        for ch in self.content.chars() {
            if ch == '\t' {
                let pad = TAB_STOP - (col % TAB_STOP);
                for _ in 0..pad {
                    rendered.push(' ');
                }
                col += pad;
            } else {
                rendered.push(ch);
                col += 1;
            }
        }
        self.rendered = rendered;
    }

    /// Reclassifies this row. Returns true when the carried-out comment
    /// state changed, which obliges the caller to continue on the next row.
    pub fn update_highlight(&mut self, language: Option<&Language>, carried_in: bool) -> bool {
        let (highlight, open_comment) = highlight_line(&self.rendered, language, carried_in);
        self.highlight = highlight;
        let changed = self.open_comment != open_comment;
        self.open_comment = open_comment;
        changed
    }

    /// Content offset → rendered column.
    pub fn rendered_col(&self, content_col: usize) -> usize {
        let mut rendered = 0;
        for ch in self.content.chars().take(content_col) {
            if ch == '\t' {
                rendered += TAB_STOP - (rendered % TAB_STOP);
            } else {
                rendered += 1;
            }
        }
        rendered
    }

    /// Rendered column → content offset. Stops before the first character
    /// whose consumption would overshoot the target, so a position inside a
    /// tab's span resolves to the offset of the tab itself.
    pub fn content_col(&self, rendered_col: usize) -> usize {
        let mut content = 0;
        let mut rendered = 0;
        for ch in self.content.chars() {
            if rendered >= rendered_col {
                break;
            }
            if ch == '\t' {
                let pad = TAB_STOP - (rendered % TAB_STOP);
                if rendered + pad > rendered_col {
                    break;
                }
                rendered += pad;
            } else {
                rendered += 1;
            }
            content += 1;
        }
        content
    }

    /// Inserts `ch` at a content offset, clamped to the row length.
    /// The caller is responsible for rehighlighting afterwards.
    pub fn insert_char(&mut self, at: usize, ch: char) {
        let at = at.min(self.content_len());
        let byte = byte_index(&self.content, at);
        self.content.insert(byte, ch);
        self.update_rendered();
    }

    pub fn append(&mut self, text: &str) {
        self.content.push_str(text);
        self.update_rendered();
    }

    /// Removes the character at a content offset; out-of-range is a no-op.
    pub fn delete_char(&mut self, at: usize) {
        if at >= self.content_len() {
            return;
        }
        let byte = byte_index(&self.content, at);
        self.content.remove(byte);
        self.update_rendered();
    }

    /// Truncates at the content offset and returns the tail.
    pub fn split_off(&mut self, at: usize) -> String {
        let at = at.min(self.content_len());
        let byte = byte_index(&self.content, at);
        let tail = self.content.split_off(byte);
        self.update_rendered();
        tail
    }

    /// Raw slice between two content offsets.
    pub fn content_slice(&self, start: usize, end: usize) -> String {
        self.content
            .chars()
            .skip(start)
            .take(end.saturating_sub(start))
            .collect()
    }
}

fn byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(b, _)| b)
        .unwrap_or(s.len())
}
