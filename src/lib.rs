//! ember - a small terminal text editor with syntax highlighting.
//!
//! The crate is split along the same seams the editor runs on: a row-based
//! [`buffer::Document`], a pure [`syntax`] highlighter, a byte-level key
//! decoder in [`input`], a frame composer in [`view`] and the interactive
//! [`Editor`] session tying them together.

pub mod syntax;

mod buffer;
mod config;
mod editor;
mod input;
mod terminal;
mod view;

pub use buffer::Document;
pub use editor::Editor;
pub use input::{read_key, ByteSource, Key};
pub use terminal::{size as terminal_size, RawMode, TtyInput};
pub use view::Screen;
