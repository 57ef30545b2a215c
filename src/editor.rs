//! The interactive session: cursor and viewport state, edit operations,
//! key dispatch and the refresh loop.
//!
//! `cursor_x`/`cursor_y` are viewport-relative, with `cursor_x` measured in
//! rendered columns; `row_offset`/`col_offset` place the viewport over the
//! document. Absolute positions are always the sum of the two.

use std::io::Write;
use std::time::Instant;

use anyhow::Result;

use crate::buffer::{Document, History, Snapshot};
use crate::config::{QUIT_TIMES, STATUS_TIMEOUT};
use crate::input::{read_key, ByteSource, Key};
use crate::terminal;
use crate::view::{self, Screen};

pub struct Editor {
    doc: Document,
    cursor_x: usize,
    cursor_y: usize,
    row_offset: usize,
    col_offset: usize,
    screen: Screen,
    /// Selection anchor as (rendered column, file row).
    mark: Option<(usize, usize)>,
    clipboard: String,
    history: History,
    status: Option<(String, Instant)>,
    quit_times: u8,
    should_quit: bool,
}

impl Editor {
    pub fn new(screen: Screen) -> Self {
        Self {
            doc: Document::new(),
            cursor_x: 0,
            cursor_y: 0,
            row_offset: 0,
            col_offset: 0,
            screen,
            mark: None,
            clipboard: String::new(),
            history: History::default(),
            status: None,
            quit_times: QUIT_TIMES,
            should_quit: false,
        }
    }

    /// Replaces the current document with the named file, without any
    /// prompting. Open failures other than a missing file keep the current
    /// document untouched.
    pub fn load_file(&mut self, filename: &str) {
        match Document::load(filename) {
            Ok((doc, created)) => {
                self.doc = doc;
                self.cursor_x = 0;
                self.cursor_y = 0;
                self.row_offset = 0;
                self.col_offset = 0;
                self.mark = None;
                self.history = History::default();
                if created {
                    self.set_status(format!("File {filename} not found. Created new file."));
                } else {
                    self.set_status(format!("Opened {filename}"));
                }
            }
            Err(err) => self.set_status(format!("Error opening file: {err:#}")),
        }
    }

    /// Main loop: draw a frame, wait for a key, dispatch. An idle timeout
    /// doubles as the resize poll.
    pub fn run(&mut self, source: &mut impl ByteSource, out: &mut impl Write) -> Result<()> {
        while !self.should_quit {
            self.refresh(out)?;
            match read_key(source)? {
                Some(key) => self.process_key(key, source, out)?,
                None => self.poll_resize(),
            }
        }
        // Leave a clean screen behind.
        out.write_all(b"\x1b[2J\x1b[H\x1b[?25h")?;
        out.flush()?;
        Ok(())
    }

    fn refresh(&mut self, out: &mut impl Write) -> Result<()> {
        let message = self.status_text().to_string();
        let frame = view::compose(
            &self.doc,
            self.screen,
            self.cursor_x,
            self.cursor_y,
            self.row_offset,
            self.col_offset,
            &message,
        );
        out.write_all(frame.as_bytes())?;
        out.flush()?;
        Ok(())
    }

    fn poll_resize(&mut self) {
        let (cols, rows) = terminal::size();
        let screen = Screen::new(cols, rows);
        if screen != self.screen {
            self.screen = screen;
            if self.cursor_y > self.screen.text_rows.saturating_sub(1) {
                self.cursor_y = self.screen.text_rows.saturating_sub(1);
            }
            if self.cursor_x > self.screen.cols.saturating_sub(1) {
                self.cursor_x = self.screen.cols.saturating_sub(1);
            }
        }
    }

    fn process_key(
        &mut self,
        key: Key,
        source: &mut impl ByteSource,
        out: &mut impl Write,
    ) -> Result<()> {
        match key {
            Key::Ctrl('q') => {
                if self.doc.is_modified() && self.quit_times > 0 {
                    self.quit_times -= 1;
                    let msg = format!(
                        "Warning: unsaved changes. Press Ctrl-Q {} more times to quit.",
                        self.quit_times + 1
                    );
                    self.set_status(msg);
                    return Ok(());
                }
                self.should_quit = true;
                return Ok(());
            }
            Key::Enter => self.insert_newline(),
            Key::Ctrl('s') => self.save(false, source, out)?,
            Key::Ctrl('a') => self.save(true, source, out)?,
            Key::Ctrl('o') => self.open(source, out)?,
            Key::Ctrl('z') => self.undo(),
            Key::Ctrl('r') => self.redo(),
            Key::Ctrl('b') => self.set_mark(),
            Key::Ctrl('c') => self.copy_selection(),
            Key::Ctrl('x') => self.cut_selection(),
            Key::Ctrl('v') => self.paste_clipboard(),
            Key::Backspace | Key::Delete => self.delete_char(),
            Key::ArrowUp | Key::ArrowDown | Key::ArrowLeft | Key::ArrowRight => {
                self.move_cursor(key)
            }
            Key::PageUp => {
                for _ in 0..self.screen.text_rows {
                    self.move_cursor(Key::ArrowUp);
                }
            }
            Key::PageDown => {
                for _ in 0..self.screen.text_rows {
                    self.move_cursor(Key::ArrowDown);
                }
            }
            Key::Home => self.scroll_to(self.row_offset + self.cursor_y, 0),
            Key::End => {
                let file_row = self.row_offset + self.cursor_y;
                let len = self.doc.row(file_row).map_or(0, |r| r.rendered_len());
                self.scroll_to(file_row, len);
            }
            // Ctrl-I is the tab key in disguise.
            Key::Ctrl('i') => self.insert_char('\t'),
            Key::Char(c) if (' '..='~').contains(&c) => self.insert_char(c),
            Key::Escape | Key::Ctrl('l') => {}
            _ => {}
        }
        self.quit_times = QUIT_TIMES;
        Ok(())
    }

    /// Startup key binding reminder on the message line.
    pub fn show_key_help(&mut self) {
        self.set_status(
            "Help: Ctrl-S = Save | Ctrl-A = Save As | Ctrl-O = Open | Ctrl-Z = Undo | \
             Ctrl-R = Redo | Ctrl-B = Mark | Ctrl-C = Copy | Ctrl-X = Cut | \
             Ctrl-V = Paste | Ctrl-Q = Quit",
        );
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some((message.into(), Instant::now()));
    }

    fn status_text(&self) -> &str {
        match &self.status {
            Some((message, since)) if since.elapsed() < STATUS_TIMEOUT => message,
            _ => "",
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            rows: self.doc.content_snapshot(),
            cursor_x: self.cursor_x,
            cursor_y: self.cursor_y,
            row_offset: self.row_offset,
            col_offset: self.col_offset,
        }
    }

    fn apply_snapshot(&mut self, snapshot: Snapshot) {
        self.doc.restore_rows(&snapshot.rows);
        self.cursor_x = snapshot.cursor_x;
        self.cursor_y = snapshot.cursor_y;
        self.row_offset = snapshot.row_offset;
        self.col_offset = snapshot.col_offset;
    }

    fn save_undo_state(&mut self) {
        let snapshot = self.snapshot();
        self.history.push(snapshot);
    }

    fn undo(&mut self) {
        if !self.history.can_undo() {
            self.set_status("Nothing to undo");
            return;
        }
        let current = self.snapshot();
        if let Some(snapshot) = self.history.undo(current) {
            self.apply_snapshot(snapshot);
        }
        self.set_status("Undo performed");
    }

    fn redo(&mut self) {
        if !self.history.can_redo() {
            self.set_status("Nothing to redo");
            return;
        }
        let current = self.snapshot();
        if let Some(snapshot) = self.history.redo(current) {
            self.apply_snapshot(snapshot);
        }
        self.set_status("Redo performed");
    }

    fn insert_char(&mut self, ch: char) {
        self.save_undo_state();
        let file_row = (self.row_offset + self.cursor_y).min(self.doc.len());
        while self.doc.len() <= file_row {
            let at = self.doc.len();
            self.doc.insert_row(at, String::new());
        }
        let Some(row) = self.doc.row(file_row) else {
            return;
        };
        let file_col = row.content_col(self.col_offset + self.cursor_x);
        self.doc.insert_char(file_row, file_col, ch);
        self.cursor_x += 1;
        if self.cursor_x == self.screen.cols {
            self.cursor_x -= 1;
            self.col_offset += 1;
        }
        self.mark = None;
    }

    fn insert_newline(&mut self) {
        self.save_undo_state();
        let file_row = self.row_offset + self.cursor_y;
        match self.doc.row(file_row) {
            None => self.doc.insert_row(file_row, String::new()),
            Some(row) => {
                let file_col = row
                    .content_col(self.col_offset + self.cursor_x)
                    .min(row.content_len());
                if file_col == 0 {
                    self.doc.insert_row(file_row, String::new());
                } else {
                    self.doc.split_row(file_row, file_col);
                }
            }
        }
        self.cursor_x = 0;
        self.col_offset = 0;
        if self.cursor_y + 1 == self.screen.text_rows {
            self.row_offset += 1;
        } else {
            self.cursor_y += 1;
        }
        self.mark = None;
    }

    fn delete_char(&mut self) {
        self.save_undo_state();
        let file_row = self.row_offset + self.cursor_y;
        if file_row >= self.doc.len() {
            return;
        }
        let rendered_pos = self.col_offset + self.cursor_x;
        if rendered_pos == 0 {
            if file_row == 0 {
                return;
            }
            let prev_len = self.doc.row(file_row - 1).map_or(0, |r| r.content_len());
            let content = self
                .doc
                .row(file_row)
                .map_or_else(String::new, |r| r.content().to_string());
            self.doc.append_to_row(file_row - 1, &content);
            self.doc.delete_row(file_row);
            if self.cursor_y == 0 {
                if self.row_offset > 0 {
                    self.row_offset -= 1;
                }
            } else {
                self.cursor_y -= 1;
            }
            self.cursor_x = self.doc.row(file_row - 1).map_or(0, |r| r.rendered_col(prev_len));
            if self.cursor_x >= self.screen.cols {
                self.col_offset = (self.cursor_x + 1).saturating_sub(self.screen.cols);
                self.cursor_x = self.screen.cols.saturating_sub(1);
            } else {
                self.col_offset = 0;
            }
        } else {
            let Some(row) = self.doc.row(file_row) else {
                return;
            };
            let position = row.content_col(rendered_pos - 1);
            self.doc.delete_char(file_row, position);
            if self.cursor_x > 0 {
                self.cursor_x -= 1;
            } else if self.col_offset > 0 {
                self.col_offset -= 1;
            }
        }
        self.mark = None;
    }

    fn move_cursor(&mut self, key: Key) {
        let file_row = self.row_offset + self.cursor_y;
        match key {
            Key::ArrowLeft => {
                if self.cursor_x == 0 {
                    if self.col_offset > 0 {
                        self.col_offset -= 1;
                    } else if file_row > 0 {
                        if self.cursor_y > 0 {
                            self.cursor_y -= 1;
                        } else {
                            self.row_offset -= 1;
                        }
                        self.cursor_x = self.doc.row(file_row - 1).map_or(0, |r| r.rendered_len());
                        if self.cursor_x + 1 > self.screen.cols {
                            self.col_offset = (self.cursor_x + 1).saturating_sub(self.screen.cols);
                            self.cursor_x = self.screen.cols.saturating_sub(1);
                        }
                    }
                } else {
                    self.cursor_x -= 1;
                }
            }
            Key::ArrowRight => {
                if let Some(row) = self.doc.row(file_row) {
                    let file_col = self.col_offset + self.cursor_x;
                    if file_col < row.rendered_len() {
                        if self.cursor_x + 1 == self.screen.cols {
                            self.col_offset += 1;
                        } else {
                            self.cursor_x += 1;
                        }
                    } else if file_col == row.rendered_len() && file_row + 1 < self.doc.len() {
                        self.cursor_x = 0;
                        self.col_offset = 0;
                        self.cursor_y += 1;
                    }
                }
            }
            Key::ArrowUp => {
                if self.cursor_y == 0 {
                    if self.row_offset > 0 {
                        self.row_offset -= 1;
                    }
                } else {
                    self.cursor_y -= 1;
                }
            }
            Key::ArrowDown => {
                if file_row + 1 < self.doc.len() {
                    if self.cursor_y + 1 == self.screen.text_rows {
                        self.row_offset += 1;
                    } else {
                        self.cursor_y += 1;
                    }
                }
            }
            _ => {}
        }

        // Snap to the end of the new line when the old column overshoots it.
        let file_row = self.row_offset + self.cursor_y;
        let row_len = self.doc.row(file_row).map_or(0, |r| r.rendered_len());
        if self.col_offset + self.cursor_x > row_len {
            if row_len < self.col_offset {
                self.col_offset = row_len;
                self.cursor_x = 0;
            } else {
                self.cursor_x = row_len - self.col_offset;
            }
        }
    }

    /// Moves the cursor to an absolute (file row, rendered column) position,
    /// shifting the viewport as little as needed to keep it visible.
    fn scroll_to(&mut self, file_row: usize, rendered_col: usize) {
        if file_row < self.row_offset {
            self.row_offset = file_row;
        }
        // A viewport with no text rows (or columns) has nothing to keep
        // visible; leave the offset alone rather than shifting past the row.
        if self.screen.text_rows > 0 && file_row >= self.row_offset + self.screen.text_rows {
            self.row_offset = file_row + 1 - self.screen.text_rows;
        }
        self.cursor_y = file_row - self.row_offset;

        if rendered_col < self.col_offset {
            self.col_offset = rendered_col;
        }
        if self.screen.cols > 0 && rendered_col >= self.col_offset + self.screen.cols {
            self.col_offset = rendered_col + 1 - self.screen.cols;
        }
        self.cursor_x = rendered_col - self.col_offset;
    }

    fn set_mark(&mut self) {
        self.mark = Some((self.col_offset + self.cursor_x, self.row_offset + self.cursor_y));
        self.set_status("Mark set");
    }

    /// Selection bounds as ((start row, start rendered col), (end row, end
    /// rendered col)), ordered top to bottom.
    fn selection_bounds(&self) -> Option<((usize, usize), (usize, usize))> {
        let (mark_x, mark_y) = self.mark?;
        let cur_y = self.row_offset + self.cursor_y;
        let cur_x = self.col_offset + self.cursor_x;
        if mark_y <= cur_y {
            Some(((mark_y, mark_x), (cur_y, cur_x)))
        } else {
            Some(((cur_y, cur_x), (mark_y, mark_x)))
        }
    }

    fn copy_selection(&mut self) {
        let Some(((start_y, start_x), (end_y, end_x))) = self.selection_bounds() else {
            self.set_status("No selection");
            return;
        };
        let start_col = self.doc.row(start_y).map_or(0, |r| r.content_col(start_x));
        let end_col = self.doc.row(end_y).map_or(0, |r| r.content_col(end_x));
        self.clipboard = self.doc.extract_span(start_y, start_col, end_y, end_col);
        self.set_status("Copied to clipboard");
    }

    fn cut_selection(&mut self) {
        self.copy_selection();
        if self.clipboard.is_empty() {
            return;
        }
        let Some(((start_y, start_x), (end_y, end_x))) = self.selection_bounds() else {
            return;
        };
        self.save_undo_state();
        let start_col = self.doc.row(start_y).map_or(0, |r| r.content_col(start_x));
        let end_col = self.doc.row(end_y).map_or(0, |r| r.content_col(end_x));
        self.doc.delete_span(start_y, start_col, end_y, end_col);
        self.scroll_to(start_y, start_x);
        self.mark = None;
        self.set_status("Cut to clipboard");
    }

    fn paste_clipboard(&mut self) {
        if self.clipboard.is_empty() {
            self.set_status("Clipboard empty");
            return;
        }
        self.save_undo_state();
        let text = self.clipboard.clone();
        let file_row = self.row_offset + self.cursor_y;
        let file_col = self
            .doc
            .row(file_row)
            .map_or(0, |r| r.content_col(self.col_offset + self.cursor_x));
        let (end_row, end_col) = self.doc.splice_text(file_row, file_col, &text);
        let end_rendered = self.doc.row(end_row).map_or(0, |r| r.rendered_col(end_col));
        self.scroll_to(end_row, end_rendered);
        self.set_status("Pasted from clipboard");
    }

    fn open(&mut self, source: &mut impl ByteSource, out: &mut impl Write) -> Result<()> {
        let name = match self.prompt("Open file: ", "", source, out)? {
            Some(name) if !name.is_empty() => name,
            _ => {
                self.set_status("Open canceled");
                return Ok(());
            }
        };
        if self.doc.is_modified() {
            match self.prompt("Unsaved changes. Discard? (y/n) ", "", source, out)? {
                Some(answer) if answer.eq_ignore_ascii_case("y") => {}
                _ => {
                    self.set_status("Open canceled");
                    return Ok(());
                }
            }
        }
        self.load_file(&name);
        Ok(())
    }

    fn save(
        &mut self,
        save_as: bool,
        source: &mut impl ByteSource,
        out: &mut impl Write,
    ) -> Result<()> {
        if save_as || self.doc.filename().is_none() {
            let default = self.doc.filename().unwrap_or("untitled.txt").to_string();
            match self.prompt("Save as: ", &default, source, out)? {
                Some(name) if !name.is_empty() => self.doc.set_filename(name),
                _ => {
                    self.set_status("Save canceled");
                    return Ok(());
                }
            }
        }
        match self.doc.save() {
            Ok(bytes) => {
                let message = format!(
                    "{bytes} bytes saved to {}",
                    self.doc.filename().unwrap_or_default()
                );
                self.set_status(message);
            }
            Err(err) => self.set_status(format!("Error saving file: {err:#}")),
        }
        Ok(())
    }

    /// Line-editing prompt on the message line. Enter confirms, ESC cancels.
    fn prompt(
        &mut self,
        label: &str,
        default: &str,
        source: &mut impl ByteSource,
        out: &mut impl Write,
    ) -> Result<Option<String>> {
        let mut input = default.to_string();
        loop {
            self.set_status(format!("{label}{input} (ESC to cancel)"));
            self.refresh(out)?;
            let Some(key) = read_key(source)? else {
                continue;
            };
            match key {
                Key::Enter => {
                    self.set_status("");
                    return Ok(Some(input));
                }
                Key::Escape => {
                    self.set_status("");
                    return Ok(None);
                }
                Key::Backspace | Key::Delete => {
                    input.pop();
                }
                Key::Char(c) if (' '..='~').contains(&c) => input.push(c),
                _ => {}
            }
        }
    }
}
