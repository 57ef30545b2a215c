// Editor-wide tunables.

use std::time::Duration;

/// Rendered tab stop width. Tabs advance to the next multiple of this.
pub const TAB_STOP: usize = 8;

/// Times Ctrl-Q must be repeated to discard unsaved changes.
pub const QUIT_TIMES: u8 = 3;

/// Maximum number of restorable undo snapshots.
pub const UNDO_DEPTH: usize = 50;

/// How long a status message stays visible.
pub const STATUS_TIMEOUT: Duration = Duration::from_secs(5);

/// Key-read timeout; doubles as the resize poll tick.
pub const KEY_TIMEOUT: Duration = Duration::from_millis(100);

/// Screen size assumed when the terminal cannot be queried.
pub const FALLBACK_COLS: usize = 80;
pub const FALLBACK_ROWS: usize = 24;
