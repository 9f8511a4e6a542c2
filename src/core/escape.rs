//! Escape sequence decoding
//!
//! Consumes the bytes that follow an ESC (0x1b) and maps the common
//! terminal sequences to logical edit commands. Terminals vary widely, so
//! anything unrecognized decodes to [`EditCmd::Noop`] rather than an error;
//! only a failed read aborts decoding.

use tracing::debug;

use super::tty::Tty;
use crate::error::Result;

/// Logical command produced by a decoded escape sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditCmd {
    HistoryPrev,
    HistoryNext,
    CursorLeft,
    CursorRight,
    MoveHome,
    MoveEnd,
    DeleteForward,
    /// Recognized or unknown sequence with no effect.
    Noop,
}

/// Decode the remainder of an escape sequence after ESC has been read.
///
/// Reads exactly two more bytes, or three for the numeric `ESC [ n ~` form.
/// Two reads are used deliberately so slow terminals that deliver the bytes
/// separately still decode correctly. End of input mid-sequence decodes to
/// a no-op.
pub fn decode(tty: &mut Tty) -> Result<EditCmd> {
    let b0 = match tty.read_byte()? {
        Some(b) => b,
        None => return Ok(EditCmd::Noop),
    };
    let b1 = match tty.read_byte()? {
        Some(b) => b,
        None => return Ok(EditCmd::Noop),
    };

    let cmd = match (b0, b1) {
        (b'[', b'0'..=b'9') => {
            // Extended form: ESC [ digit ~
            match tty.read_byte()? {
                Some(b'~') if b1 == b'3' => EditCmd::DeleteForward,
                Some(_) | None => EditCmd::Noop,
            }
        }
        (b'[', b'A') => EditCmd::HistoryPrev,
        (b'[', b'B') => EditCmd::HistoryNext,
        (b'[', b'C') => EditCmd::CursorRight,
        (b'[', b'D') => EditCmd::CursorLeft,
        // Home and End have two encodings in the wild
        (b'[', b'H') | (b'O', b'H') => EditCmd::MoveHome,
        (b'[', b'F') | (b'O', b'F') => EditCmd::MoveEnd,
        _ => {
            debug!("ignoring unknown escape sequence: ESC {:?} {:?}", b0 as char, b1 as char);
            EditCmd::Noop
        }
    };
    Ok(cmd)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Seek, SeekFrom, Write};
    use std::os::unix::io::AsRawFd;

    fn tty_with_input(bytes: &[u8]) -> (tempfile::NamedTempFile, Tty) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file.seek(SeekFrom::Start(0)).unwrap();
        let fd = file.as_raw_fd();
        (file, Tty::new(fd, fd))
    }

    #[test]
    fn arrow_keys_decode() {
        let cases: [(&[u8], EditCmd); 4] = [
            (b"[A", EditCmd::HistoryPrev),
            (b"[B", EditCmd::HistoryNext),
            (b"[C", EditCmd::CursorRight),
            (b"[D", EditCmd::CursorLeft),
        ];
        for (bytes, expected) in cases {
            let (_file, mut tty) = tty_with_input(bytes);
            assert_eq!(decode(&mut tty).unwrap(), expected);
        }
    }

    #[test]
    fn home_end_both_encodings() {
        for bytes in [b"[H".as_slice(), b"OH".as_slice()] {
            let (_file, mut tty) = tty_with_input(bytes);
            assert_eq!(decode(&mut tty).unwrap(), EditCmd::MoveHome);
        }
        for bytes in [b"[F".as_slice(), b"OF".as_slice()] {
            let (_file, mut tty) = tty_with_input(bytes);
            assert_eq!(decode(&mut tty).unwrap(), EditCmd::MoveEnd);
        }
    }

    #[test]
    fn delete_key_decodes() {
        let (_file, mut tty) = tty_with_input(b"[3~");
        assert_eq!(decode(&mut tty).unwrap(), EditCmd::DeleteForward);
    }

    #[test]
    fn other_tilde_sequences_are_noops() {
        for bytes in [b"[1~".as_slice(), b"[5~".as_slice(), b"[8~".as_slice()] {
            let (_file, mut tty) = tty_with_input(bytes);
            assert_eq!(decode(&mut tty).unwrap(), EditCmd::Noop);
        }
    }

    #[test]
    fn unknown_sequence_is_noop() {
        let (_file, mut tty) = tty_with_input(b"[Z");
        assert_eq!(decode(&mut tty).unwrap(), EditCmd::Noop);
    }

    #[test]
    fn truncated_sequence_is_noop() {
        let (_file, mut tty) = tty_with_input(b"[");
        assert_eq!(decode(&mut tty).unwrap(), EditCmd::Noop);
    }
}
