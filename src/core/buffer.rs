//! Editable line buffer
//!
//! A growable byte buffer holding the line under edit together with the
//! cursor offset. Every operation maintains `0 <= pos <= len`, and every
//! mutating operation reports whether it changed anything so callers can
//! skip redundant redraws.
//!
//! The buffer uses byte-per-column semantics; multi-byte characters are out
//! of scope for the rendering model.

/// The line under edit.
#[derive(Debug, Default, Clone)]
pub struct LineBuffer {
    bytes: Vec<u8>,
    pos: usize,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Cursor offset into the buffer, always within `0..=len`.
    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Buffer content as text.
    pub fn to_text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    /// Replace the whole content, cursor moved to the end.
    pub fn set_text(&mut self, text: &str) {
        self.bytes.clear();
        self.bytes.extend_from_slice(text.as_bytes());
        self.pos = self.bytes.len();
    }

    /// Insert a byte at the cursor, shifting the tail right.
    pub fn insert(&mut self, byte: u8) {
        self.bytes.insert(self.pos, byte);
        self.pos += 1;
    }

    /// True when the cursor sits at the end of the buffer, where an insert
    /// is a plain append.
    pub fn cursor_at_end(&self) -> bool {
        self.pos == self.bytes.len()
    }

    /// Remove the byte under the cursor (the Delete key). No-op at the end.
    pub fn delete_forward(&mut self) -> bool {
        if self.pos < self.bytes.len() {
            self.bytes.remove(self.pos);
            true
        } else {
            false
        }
    }

    /// Remove the byte before the cursor. No-op at the start.
    pub fn backspace(&mut self) -> bool {
        if self.pos > 0 {
            self.pos -= 1;
            self.bytes.remove(self.pos);
            true
        } else {
            false
        }
    }

    /// Delete the word before the cursor: skip spaces backward, then the
    /// word itself. The cursor lands where the word began.
    pub fn delete_prev_word(&mut self) -> bool {
        let old_pos = self.pos;
        while self.pos > 0 && self.bytes[self.pos - 1] == b' ' {
            self.pos -= 1;
        }
        while self.pos > 0 && self.bytes[self.pos - 1] != b' ' {
            self.pos -= 1;
        }
        if self.pos == old_pos {
            return false;
        }
        self.bytes.drain(self.pos..old_pos);
        true
    }

    /// Swap the byte before the cursor with the one under it, advancing the
    /// cursor unless it already sits at the last swappable position.
    pub fn transpose(&mut self) -> bool {
        if self.pos > 0 && self.pos < self.bytes.len() {
            self.bytes.swap(self.pos - 1, self.pos);
            if self.pos != self.bytes.len() - 1 {
                self.pos += 1;
            }
            true
        } else {
            false
        }
    }

    pub fn move_left(&mut self) -> bool {
        if self.pos > 0 {
            self.pos -= 1;
            true
        } else {
            false
        }
    }

    pub fn move_right(&mut self) -> bool {
        if self.pos < self.bytes.len() {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub fn move_home(&mut self) -> bool {
        if self.pos != 0 {
            self.pos = 0;
            true
        } else {
            false
        }
    }

    pub fn move_end(&mut self) -> bool {
        if self.pos != self.bytes.len() {
            self.pos = self.bytes.len();
            true
        } else {
            false
        }
    }

    /// Drop everything, cursor to the start (Ctrl-U).
    pub fn clear(&mut self) -> bool {
        if self.bytes.is_empty() && self.pos == 0 {
            return false;
        }
        self.bytes.clear();
        self.pos = 0;
        true
    }

    /// Truncate at the cursor (Ctrl-K).
    pub fn kill_to_end(&mut self) -> bool {
        if self.pos < self.bytes.len() {
            self.bytes.truncate(self.pos);
            true
        } else {
            false
        }
    }

    /// Remove everything before the cursor, cursor to the start.
    pub fn kill_to_start(&mut self) -> bool {
        if self.pos > 0 {
            self.bytes.drain(..self.pos);
            self.pos = 0;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer_with(text: &str) -> LineBuffer {
        let mut buf = LineBuffer::new();
        buf.set_text(text);
        buf
    }

    fn invariant(buf: &LineBuffer) -> bool {
        buf.pos() <= buf.len()
    }

    #[test]
    fn insert_mid_line_shifts_tail() {
        let mut buf = buffer_with("hllo");
        buf.move_home();
        buf.move_right();
        buf.insert(b'e');
        assert_eq!(buf.to_text(), "hello");
        assert_eq!(buf.pos(), 2);
    }

    #[test]
    fn backspace_at_start_is_noop() {
        let mut buf = buffer_with("ab");
        buf.move_home();
        assert!(!buf.backspace());
        assert_eq!(buf.to_text(), "ab");
    }

    #[test]
    fn delete_forward_at_end_is_noop() {
        let mut buf = buffer_with("ab");
        assert!(!buf.delete_forward());
        buf.move_left();
        assert!(buf.delete_forward());
        assert_eq!(buf.to_text(), "a");
    }

    #[test]
    fn delete_prev_word_skips_spaces_then_word() {
        let mut buf = buffer_with("one two   ");
        assert!(buf.delete_prev_word());
        assert_eq!(buf.to_text(), "one ");
        assert_eq!(buf.pos(), 4);
    }

    #[test]
    fn delete_prev_word_empty_is_noop() {
        let mut buf = LineBuffer::new();
        assert!(!buf.delete_prev_word());
    }

    #[test]
    fn transpose_swaps_and_advances() {
        let mut buf = buffer_with("abc");
        buf.move_home();
        buf.move_right();
        // Cursor between a and b: swap them, cursor advances
        assert!(buf.transpose());
        assert_eq!(buf.to_text(), "bac");
        assert_eq!(buf.pos(), 2);
        // At the last swappable position the cursor stays
        assert!(buf.transpose());
        assert_eq!(buf.to_text(), "bca");
        assert_eq!(buf.pos(), 2);
    }

    #[test]
    fn transpose_at_edges_is_noop() {
        let mut buf = buffer_with("ab");
        assert!(!buf.transpose()); // cursor at end
        buf.move_home();
        assert!(!buf.transpose()); // cursor at start
    }

    #[test]
    fn kill_ops() {
        let mut buf = buffer_with("hello world");
        buf.move_home();
        for _ in 0..5 {
            buf.move_right();
        }
        assert!(buf.kill_to_end());
        assert_eq!(buf.to_text(), "hello");
        buf.move_end();
        assert!(buf.kill_to_start());
        assert_eq!(buf.to_text(), "");
        assert!(!buf.kill_to_start());
    }

    #[test]
    fn cursor_invariant_holds_under_op_sequences() {
        let mut buf = LineBuffer::new();
        // A fixed pseudo-random walk over the operation set
        for i in 0..500usize {
            match i % 11 {
                0 | 1 | 2 => buf.insert(b'a' + (i % 26) as u8),
                3 => {
                    buf.delete_forward();
                }
                4 => {
                    buf.backspace();
                }
                5 => {
                    buf.move_left();
                }
                6 => {
                    buf.move_right();
                }
                7 => {
                    buf.move_home();
                }
                8 => {
                    buf.transpose();
                }
                9 => {
                    buf.delete_prev_word();
                }
                _ => {
                    buf.move_end();
                }
            }
            assert!(invariant(&buf), "violated after step {i}");
        }
    }
}
