//! Frame composition.
//!
//! One call builds the entire frame as a single string (cursor hidden,
//! home, text rows, status bar, message line, cursor placement, cursor
//! shown) so the caller can write it to the terminal in one syscall.
//! Nothing here touches the terminal, which keeps frames assertable in
//! tests.

use std::fmt::Write;

use crate::buffer::Document;
use crate::syntax::HighlightKind;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Text viewport dimensions. Two terminal rows are reserved below the text
/// area for the status bar and the message line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Screen {
    pub cols: usize,
    pub text_rows: usize,
}

impl Screen {
    pub fn new(cols: usize, total_rows: usize) -> Self {
        Self {
            cols,
            text_rows: total_rows.saturating_sub(2),
        }
    }
}

/// Composes a full frame. `cursor_x`/`cursor_y` are viewport-relative, with
/// `cursor_x` in rendered space; the offsets place the viewport over the
/// document.
pub fn compose(
    doc: &Document,
    screen: Screen,
    cursor_x: usize,
    cursor_y: usize,
    row_offset: usize,
    col_offset: usize,
    message: &str,
) -> String {
    let mut frame = String::new();
    frame.push_str("\x1b[?25l");
    frame.push_str("\x1b[H");

    for y in 0..screen.text_rows {
        let file_row = row_offset + y;
        match doc.row(file_row) {
            None => {
                if doc.is_empty() && y == screen.text_rows / 3 {
                    draw_welcome(&mut frame, screen.cols);
                } else {
                    frame.push_str("~\x1b[0K\r\n");
                }
            }
            Some(row) => {
                draw_row(
                    &mut frame,
                    row.rendered(),
                    row.highlight(),
                    col_offset,
                    screen.cols,
                );
            }
        }
    }

    draw_status_bar(&mut frame, doc, screen, cursor_y, row_offset);

    frame.push_str("\x1b[0K");
    frame.extend(message.chars().take(screen.cols));

    // Place the hardware cursor, snapping through the content mapping so it
    // never lands inside a tab's rendered span.
    let mut cx = 1;
    if let Some(row) = doc.row(row_offset + cursor_y) {
        let content = row.content_col(col_offset + cursor_x);
        cx = (row.rendered_col(content) + 1).saturating_sub(col_offset).max(1);
    }
    let _ = write!(frame, "\x1b[{};{}H", cursor_y + 1, cx);
    frame.push_str("\x1b[?25h");
    frame
}

fn draw_welcome(frame: &mut String, cols: usize) {
    let welcome = format!("ember -- version {VERSION}");
    let shown = welcome.len().min(cols);
    let padding = (cols - shown) / 2;
    if padding > 0 {
        frame.push('~');
        for _ in 0..padding - 1 {
            frame.push(' ');
        }
    }
    frame.push_str(&welcome[..shown]);
    frame.push_str("\x1b[0K\r\n");
}

fn draw_row(
    frame: &mut String,
    rendered: &str,
    highlight: &[HighlightKind],
    col_offset: usize,
    cols: usize,
) {
    let chars: Vec<char> = rendered.chars().collect();
    let end = chars.len().min(col_offset + cols);
    let mut current_color: Option<u8> = None;

    for i in col_offset..end.max(col_offset) {
        let ch = chars[i];
        if ch.is_control() {
            let sym = if (ch as u32) <= 26 {
                (b'@' + ch as u8) as char
            } else {
                '?'
            };
            frame.push_str("\x1b[7m");
            frame.push(sym);
            // Resets the inverse attribute and any active color with it.
            frame.push_str("\x1b[0m");
            current_color = None;
        } else if highlight[i] == HighlightKind::Normal {
            if current_color.is_some() {
                frame.push_str("\x1b[39m");
                current_color = None;
            }
            frame.push(ch);
        } else {
            let color = highlight[i].color();
            if current_color != Some(color) {
                let _ = write!(frame, "\x1b[{color}m");
                current_color = Some(color);
            }
            frame.push(ch);
        }
    }

    frame.push_str("\x1b[39m");
    frame.push_str("\x1b[0K");
    frame.push_str("\r\n");
}

fn draw_status_bar(
    frame: &mut String,
    doc: &Document,
    screen: Screen,
    cursor_y: usize,
    row_offset: usize,
) {
    frame.push_str("\x1b[0K");
    frame.push_str("\x1b[7m");

    let name = doc.filename().unwrap_or("[No Name]");
    let name: String = name.chars().take(20).collect();
    let status = format!(
        "{name} - {} lines{}",
        doc.len(),
        if doc.is_modified() { " (modified)" } else { "" }
    );
    let rstatus = format!("{}/{}", row_offset + cursor_y + 1, doc.len());

    let mut length = status.chars().count().min(screen.cols);
    frame.extend(status.chars().take(length));
    while length < screen.cols {
        if screen.cols - length == rstatus.len() {
            frame.push_str(&rstatus);
            length += rstatus.len();
        } else {
            frame.push(' ');
            length += 1;
        }
    }

    frame.push_str("\x1b[0m\r\n");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with(filename: &str, lines: &[&str]) -> Document {
        let mut doc = Document::new();
        doc.set_filename(filename.to_string());
        for (i, line) in lines.iter().enumerate() {
            doc.insert_row(i, line.to_string());
        }
        doc
    }

    #[test]
    fn frame_brackets_hide_and_show_cursor() {
        let doc = Document::new();
        let frame = compose(&doc, Screen::new(80, 24), 0, 0, 0, 0, "");
        assert!(frame.starts_with("\x1b[?25l\x1b[H"));
        assert!(frame.ends_with("\x1b[?25h"));
    }

    #[test]
    fn empty_document_shows_welcome_banner() {
        let doc = Document::new();
        let screen = Screen::new(80, 24);
        let frame = compose(&doc, screen, 0, 0, 0, 0, "");
        assert!(frame.contains(&format!("ember -- version {VERSION}")));
        // All other text rows are tilde fillers.
        let tildes = frame.matches("~\x1b[0K\r\n").count();
        assert_eq!(tildes, screen.text_rows - 1);
    }

    #[test]
    fn keywords_switch_color_and_reset_on_normal() {
        let doc = doc_with("test.c", &["return x;"]);
        let frame = compose(&doc, Screen::new(80, 24), 0, 0, 0, 0, "");
        assert!(frame.contains("\x1b[33mreturn\x1b[39m x;"));
    }

    #[test]
    fn adjacent_same_color_chars_emit_one_escape() {
        let doc = doc_with("test.c", &["123 456"]);
        let frame = compose(&doc, Screen::new(80, 24), 0, 0, 0, 0, "");
        assert!(frame.contains("\x1b[31m123\x1b[39m \x1b[31m456"));
    }

    #[test]
    fn viewport_clips_long_rows() {
        let doc = doc_with("test.txt", &["abcdefghij"]);
        let screen = Screen {
            cols: 4,
            text_rows: 3,
        };
        let frame = compose(&doc, screen, 0, 0, 0, 2, "");
        assert!(frame.contains("cdef\x1b[39m\x1b[0K"));
        assert!(!frame.contains("ghij"));
    }

    #[test]
    fn control_chars_render_inverse_placeholders() {
        let doc = doc_with("test.txt", &["a\u{1}b"]);
        let frame = compose(&doc, Screen::new(80, 24), 0, 0, 0, 0, "");
        assert!(frame.contains("a\x1b[7mA\x1b[0mb"));
    }

    #[test]
    fn status_bar_reports_name_lines_and_position() {
        let mut doc = doc_with("test.c", &["one", "two", "three"]);
        let frame = compose(&doc, Screen::new(80, 24), 0, 1, 0, 0, "");
        assert!(frame.contains("\x1b[7m"));
        assert!(frame.contains("test.c - 3 lines (modified)"));
        assert!(frame.contains("2/3"));

        doc.clear_modified();
        let frame = compose(&doc, Screen::new(80, 24), 0, 1, 0, 0, "");
        assert!(frame.contains("test.c - 3 lines "));
        assert!(!frame.contains("(modified)"));
    }

    #[test]
    fn long_filename_is_truncated() {
        let doc = doc_with("a-very-long-file-name-indeed.c", &[]);
        let frame = compose(&doc, Screen::new(80, 24), 0, 0, 0, 0, "");
        assert!(frame.contains("a-very-long-file-nam - 0 lines"));
        assert!(!frame.contains("indeed.c"));
    }

    #[test]
    fn message_line_is_clipped_to_width() {
        let doc = Document::new();
        let screen = Screen {
            cols: 10,
            text_rows: 2,
        };
        let frame = compose(&doc, screen, 0, 0, 0, 0, "hello this is far too long");
        assert!(frame.contains("\x1b[0Khello this\x1b["));
    }

    #[test]
    fn cursor_lands_after_tab_span() {
        let doc = doc_with("test.txt", &["\tx"]);
        // Content col 1 renders at col 8; cursor escape is 1-based.
        let frame = compose(&doc, Screen::new(80, 24), 8, 0, 0, 0, "");
        assert!(frame.ends_with("\x1b[1;9H\x1b[?25h"));
    }
}
