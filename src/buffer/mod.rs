//! The document buffer: an ordered collection of rows plus the active
//! language, file binding and modified flag.
//!
//! Every mutation goes through a method here so the rendered form and
//! highlight array of each touched row are recomputed synchronously, and the
//! block-comment carry state is re-propagated before the next render.

mod history;
mod row;

pub use history::{History, Snapshot};
pub use row::Row;

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::syntax::{select_language, Language};

pub struct Document {
    rows: Vec<Row>,
    language: Option<&'static Language>,
    filename: Option<String>,
    modified: bool,
}

impl Document {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            language: None,
            filename: None,
            modified: false,
        }
    }

    /// Loads a file into a fresh document. A missing file is not an error:
    /// it yields an empty document bound to the name (created on save) and
    /// `true` in the second slot. Any other I/O failure is reported without
    /// producing a document, so the caller's current one stays intact.
    ///
    /// The language is selected from the file name before any row is
    /// inserted; rows are highlighted correctly from the first render.
    pub fn load(filename: &str) -> Result<(Self, bool)> {
        let mut doc = Self::new();
        doc.filename = Some(filename.to_string());
        doc.language = select_language(filename);

        match fs::read_to_string(filename) {
            Ok(text) => {
                // `lines` splits on '\n' and strips a trailing '\r'.
                doc.rows = text.lines().map(|line| Row::new(line.to_string())).collect();
                doc.rehighlight_all();
                Ok((doc, false))
            }
            Err(err) if err.kind() == ErrorKind::NotFound => Ok((doc, true)),
            Err(err) => {
                Err(err).with_context(|| format!("failed to read {filename}"))
            }
        }
    }

    /// Serialized form: rows joined by newlines with a trailing newline,
    /// or nothing at all for an empty document.
    pub fn to_text(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }
        let mut text = String::new();
        for row in &self.rows {
            text.push_str(row.content());
            text.push('\n');
        }
        text
    }

    /// Writes the document to its bound file name. Returns the byte count.
    /// On failure the in-memory state (including `modified`) is untouched.
    pub fn save(&mut self) -> Result<usize> {
        let Some(filename) = self.filename.clone() else {
            anyhow::bail!("no file name set");
        };
        let text = self.to_text();
        fs::write(Path::new(&filename), &text)
            .with_context(|| format!("failed to write {filename}"))?;
        self.modified = false;
        Ok(text.len())
    }

    /// Rebinds the document to a new name and re-selects the language,
    /// rehighlighting everything under the new rules.
    pub fn set_filename(&mut self, filename: String) {
        self.language = select_language(&filename);
        self.filename = Some(filename);
        self.rehighlight_all();
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn language(&self) -> Option<&'static Language> {
        self.language
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, at: usize) -> Option<&Row> {
        self.rows.get(at)
    }

    pub fn insert_row(&mut self, at: usize, content: String) {
        let at = at.min(self.rows.len());
        self.rows.insert(at, Row::new(content));
        self.modified = true;
        self.rehighlight_from(at);
    }

    pub fn delete_row(&mut self, at: usize) {
        if at >= self.rows.len() {
            return;
        }
        self.rows.remove(at);
        self.modified = true;
        self.rehighlight_from(at);
    }

    pub fn insert_char(&mut self, at_row: usize, at_col: usize, ch: char) {
        if let Some(row) = self.rows.get_mut(at_row) {
            row.insert_char(at_col, ch);
            self.modified = true;
            self.rehighlight_from(at_row);
        }
    }

    pub fn delete_char(&mut self, at_row: usize, at_col: usize) {
        if let Some(row) = self.rows.get_mut(at_row) {
            row.delete_char(at_col);
            self.modified = true;
            self.rehighlight_from(at_row);
        }
    }

    pub fn append_to_row(&mut self, at_row: usize, text: &str) {
        if let Some(row) = self.rows.get_mut(at_row) {
            row.append(text);
            self.modified = true;
            self.rehighlight_from(at_row);
        }
    }

    /// Splits a row at a content offset; the tail becomes a new row below.
    pub fn split_row(&mut self, at_row: usize, at_col: usize) {
        if at_row >= self.rows.len() {
            return;
        }
        let tail = self.rows[at_row].split_off(at_col);
        self.rows.insert(at_row + 1, Row::new(tail));
        self.modified = true;
        self.rehighlight_from(at_row);
    }

    /// Raw text between two (row, content-offset) points, newline-joined.
    /// Non-mutating; out-of-range rows are skipped.
    pub fn extract_span(
        &self,
        start_row: usize,
        start_col: usize,
        end_row: usize,
        end_col: usize,
    ) -> String {
        let mut parts = Vec::new();
        for y in start_row..=end_row {
            let Some(row) = self.rows.get(y) else { continue };
            let from = if y == start_row { start_col } else { 0 };
            let to = if y == end_row { end_col } else { row.content_len() };
            parts.push(row.content_slice(from, to));
        }
        parts.join("\n")
    }

    /// Removes a span: the boundary rows merge into one and every fully
    /// enclosed row is deleted.
    pub fn delete_span(
        &mut self,
        start_row: usize,
        start_col: usize,
        end_row: usize,
        end_col: usize,
    ) {
        if start_row >= self.rows.len() {
            return;
        }
        let end_row = end_row.min(self.rows.len() - 1);
        let keep_tail = self.rows[end_row].content_slice(end_col, self.rows[end_row].content_len());
        self.rows[start_row].split_off(start_col);
        self.rows[start_row].append(&keep_tail);
        for y in (start_row + 1..=end_row).rev() {
            self.rows.remove(y);
        }
        self.modified = true;
        self.rehighlight_from(start_row);
    }

    /// Splices possibly multi-line text into a row at a content offset:
    /// the first fragment extends the head of the split row, interior
    /// fragments become new rows, and the original tail reattaches after
    /// the last fragment. Returns the (row, content-offset) end position.
    pub fn splice_text(&mut self, at_row: usize, at_col: usize, text: &str) -> (usize, usize) {
        if at_row >= self.rows.len() {
            self.rows.push(Row::new(String::new()));
        }
        let at_row = at_row.min(self.rows.len() - 1);
        let lines: Vec<&str> = text.split('\n').collect();

        let tail = self.rows[at_row].split_off(at_col);
        self.rows[at_row].append(lines[0]);

        let mut last_row = at_row;
        for line in &lines[1..] {
            last_row += 1;
            self.rows.insert(last_row, Row::new((*line).to_string()));
        }
        let end_col = if lines.len() == 1 {
            at_col + lines[0].chars().count()
        } else {
            lines[lines.len() - 1].chars().count()
        };
        self.rows[last_row].append(&tail);

        self.modified = true;
        self.rehighlight_range(at_row, last_row);
        (last_row, end_col)
    }

    /// Immutable copy of every row's raw content, for undo snapshots.
    /// The `Arc` makes moving the snapshot between stacks free.
    pub fn content_snapshot(&self) -> Arc<[String]> {
        self.rows
            .iter()
            .map(|row| row.content().to_string())
            .collect()
    }

    /// Replaces the whole row set from a snapshot.
    pub fn restore_rows(&mut self, rows: &[String]) {
        self.rows = rows.iter().map(|line| Row::new(line.clone())).collect();
        self.modified = true;
        self.rehighlight_all();
    }

    #[cfg(test)]
    pub(crate) fn clear_modified(&mut self) {
        self.modified = false;
    }

    fn rehighlight_all(&mut self) {
        let mut carry = false;
        for row in &mut self.rows {
            row.update_highlight(self.language, carry);
            carry = row.open_comment();
        }
    }

    fn rehighlight_from(&mut self, at: usize) {
        self.rehighlight_range(at, at);
    }

    /// Sequential rehighlight pass. Rows `at..=through` and the one just
    /// past them always get a fresh pass (a structural edit changes their
    /// predecessor); beyond that the cascade only keeps going while a
    /// row's carry flag actually flips.
    fn rehighlight_range(&mut self, at: usize, through: usize) {
        let mut carry = if at == 0 {
            false
        } else {
            self.rows[at - 1].open_comment()
        };
        for i in at..self.rows.len() {
            let changed = self.rows[i].update_highlight(self.language, carry);
            carry = self.rows[i].open_comment();
            if !changed && i > through {
                break;
            }
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
