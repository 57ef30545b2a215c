//! Raw keyboard input decoding.
//!
//! The decoder is a small state machine over a byte stream, kept fully
//! independent of the terminal so it can be driven from byte slices in
//! tests. The live stream comes from [`crate::terminal::TtyInput`].

use anyhow::Result;

/// A logical key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Printable character (including tab).
    Char(char),
    /// A control byte, normalized to its lowercase letter: 0x11 is
    /// `Ctrl('q')`.
    Ctrl(char),
    Enter,
    Escape,
    Backspace,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Delete,
    Home,
    End,
    PageUp,
    PageDown,
}

/// One byte at a time, `None` on read timeout. The timeout is what turns a
/// lone ESC into [`Key::Escape`] and lets the session loop poll for
/// terminal resizes while idle.
pub trait ByteSource {
    fn read_byte(&mut self) -> Result<Option<u8>>;
}

/// Byte slices act as an exhausted-means-timeout source for tests.
impl ByteSource for &[u8] {
    fn read_byte(&mut self) -> Result<Option<u8>> {
        match self.split_first() {
            Some((first, rest)) => {
                *self = rest;
                Ok(Some(*first))
            }
            None => Ok(None),
        }
    }
}

/// Reads and decodes one key. `Ok(None)` means the timeout expired with no
/// input at all (the idle tick); an ESC followed by silence or by an
/// unrecognized sequence decodes to [`Key::Escape`].
pub fn read_key(source: &mut impl ByteSource) -> Result<Option<Key>> {
    let Some(byte) = source.read_byte()? else {
        return Ok(None);
    };
    if byte != 0x1b {
        return Ok(Some(decode_plain(byte)));
    }

    let Some(first) = source.read_byte()? else {
        return Ok(Some(Key::Escape));
    };
    let Some(second) = source.read_byte()? else {
        return Ok(Some(Key::Escape));
    };

    let key = match first {
        b'[' => match second {
            b'0'..=b'9' => decode_tilde_seq(second, source)?,
            b'A' => Key::ArrowUp,
            b'B' => Key::ArrowDown,
            b'C' => Key::ArrowRight,
            b'D' => Key::ArrowLeft,
            b'H' => Key::Home,
            b'F' => Key::End,
            _ => Key::Escape,
        },
        b'O' => match second {
            b'H' => Key::Home,
            b'F' => Key::End,
            _ => Key::Escape,
        },
        _ => Key::Escape,
    };
    Ok(Some(key))
}

/// `ESC [ digit digit? ~` sequences. Only a handful of digits mean anything.
fn decode_tilde_seq(digit: u8, source: &mut impl ByteSource) -> Result<Key> {
    let Some(next) = source.read_byte()? else {
        return Ok(Key::Escape);
    };
    let terminated = match next {
        b'~' => true,
        b'0'..=b'9' => matches!(source.read_byte()?, Some(b'~')),
        _ => false,
    };
    if !terminated || next != b'~' {
        // Two-digit codes carry no binding here.
        return Ok(Key::Escape);
    }
    Ok(match digit {
        b'3' => Key::Delete,
        b'5' => Key::PageUp,
        b'6' => Key::PageDown,
        _ => Key::Escape,
    })
}

fn decode_plain(byte: u8) -> Key {
    match byte {
        b'\r' | b'\n' => Key::Enter,
        0x7f | 0x08 => Key::Backspace,
        0x01..=0x1a => Key::Ctrl((b'a' + byte - 1) as char),
        _ => Key::Char(byte as char),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(bytes: &[u8]) -> Option<Key> {
        let mut source = bytes;
        read_key(&mut source).unwrap()
    }

    #[test]
    fn plain_bytes_are_literal() {
        assert_eq!(decode(b"q"), Some(Key::Char('q')));
        assert_eq!(decode(b" "), Some(Key::Char(' ')));
        assert_eq!(decode(b"\t"), Some(Key::Ctrl('i')));
    }

    #[test]
    fn control_bytes_normalize_to_letters() {
        assert_eq!(decode(&[0x11]), Some(Key::Ctrl('q')));
        assert_eq!(decode(&[0x13]), Some(Key::Ctrl('s')));
        assert_eq!(decode(&[0x01]), Some(Key::Ctrl('a')));
    }

    #[test]
    fn enter_and_backspace() {
        assert_eq!(decode(b"\r"), Some(Key::Enter));
        assert_eq!(decode(&[0x7f]), Some(Key::Backspace));
        assert_eq!(decode(&[0x08]), Some(Key::Backspace));
    }

    #[test]
    fn lone_escape_times_out_to_escape() {
        assert_eq!(decode(&[0x1b]), Some(Key::Escape));
        assert_eq!(decode(&[0x1b, b'[']), Some(Key::Escape));
    }

    #[test]
    fn csi_letter_sequences() {
        assert_eq!(decode(b"\x1b[A"), Some(Key::ArrowUp));
        assert_eq!(decode(b"\x1b[B"), Some(Key::ArrowDown));
        assert_eq!(decode(b"\x1b[C"), Some(Key::ArrowRight));
        assert_eq!(decode(b"\x1b[D"), Some(Key::ArrowLeft));
        assert_eq!(decode(b"\x1b[H"), Some(Key::Home));
        assert_eq!(decode(b"\x1b[F"), Some(Key::End));
    }

    #[test]
    fn ss3_sequences() {
        assert_eq!(decode(b"\x1bOH"), Some(Key::Home));
        assert_eq!(decode(b"\x1bOF"), Some(Key::End));
        assert_eq!(decode(b"\x1bOZ"), Some(Key::Escape));
    }

    #[test]
    fn tilde_sequences() {
        assert_eq!(decode(b"\x1b[3~"), Some(Key::Delete));
        assert_eq!(decode(b"\x1b[5~"), Some(Key::PageUp));
        assert_eq!(decode(b"\x1b[6~"), Some(Key::PageDown));
        // Unbound digit still consumes its terminator.
        assert_eq!(decode(b"\x1b[1~"), Some(Key::Escape));
    }

    #[test]
    fn two_digit_tilde_sequence_is_unbound() {
        assert_eq!(decode(b"\x1b[15~"), Some(Key::Escape));
    }

    #[test]
    fn truncated_tilde_sequence_is_escape() {
        assert_eq!(decode(b"\x1b[3"), Some(Key::Escape));
    }

    #[test]
    fn empty_source_is_idle() {
        assert_eq!(decode(b""), None);
    }

    #[test]
    fn decoder_leaves_following_bytes_alone() {
        let mut source: &[u8] = b"\x1b[Aq";
        assert_eq!(read_key(&mut source).unwrap(), Some(Key::ArrowUp));
        assert_eq!(read_key(&mut source).unwrap(), Some(Key::Char('q')));
    }
}
