//! Prompt and buffer rendering
//!
//! Computes the terminal escape output needed to redraw the prompt and the
//! line under edit, in either single-line or multi-line mode. All fragments
//! for one refresh are assembled into a single byte buffer so the caller
//! can issue one write and avoid flicker.
//!
//! A refresh has two phases selected by [`RefreshFlags`]: CLEAN erases what
//! the previous refresh drew, WRITE draws the current state. `hide` is a
//! CLEAN-only refresh, `show` a WRITE-only one.

use bitflags::bitflags;

bitflags! {
    /// Phases of a refresh.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RefreshFlags: u8 {
        /// Erase the previously rendered prompt and line.
        const CLEAN = 1 << 0;
        /// Draw the prompt and the current line.
        const WRITE = 1 << 1;
        const ALL = Self::CLEAN.bits() | Self::WRITE.bits();
    }
}

/// Hint text displayed after the buffer, supplied by a caller callback.
#[derive(Debug, Clone)]
pub struct Hint {
    pub text: String,
    /// ANSI color code, e.g. 35 for magenta. None leaves the default color.
    pub color: Option<u8>,
    pub bold: bool,
}

/// Produces an optional hint for the line typed so far.
pub type HintsCallback = Box<dyn FnMut(&str) -> Option<Hint>>;

/// Everything the renderer needs to know about the current edit state.
pub struct RenderView<'a> {
    pub prompt: &'a str,
    pub buf: &'a [u8],
    pub pos: usize,
    pub cols: usize,
    pub multi_line: bool,
    pub masked: bool,
    pub hint: Option<&'a Hint>,
}

/// Renderer with the memory needed to erase the previous refresh.
///
/// Multi-line redraws must first clear exactly as many rows as the previous
/// render used, which can differ from what the current render needs.
#[derive(Debug, Default)]
pub struct Renderer {
    /// Rows occupied by the previous multi-line render.
    old_rows: usize,
    /// Cursor offset at the previous render.
    old_pos: usize,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget previous-render state. Called when a new edit turn starts.
    pub fn reset(&mut self) {
        self.old_rows = 0;
        self.old_pos = 0;
    }

    /// Produce the escape output for one refresh.
    pub fn refresh(&mut self, view: &RenderView, flags: RefreshFlags) -> Vec<u8> {
        if view.multi_line {
            self.refresh_multi_line(view, flags)
        } else {
            self.refresh_single_line(view, flags)
        }
    }

    /// Single-line refresh.
    ///
    /// When `prompt + cursor` no longer fits, the visible slice scrolls so
    /// the cursor stays on screen; content past the last column is only
    /// truncated from display, never from the buffer.
    fn refresh_single_line(&mut self, view: &RenderView, flags: RefreshFlags) -> Vec<u8> {
        let cols = view.cols.max(1);
        // A prompt wider than the terminal is shown truncated, keeping at
        // least one column free so the window loop below always terminates
        // with the cursor on screen.
        let plen = view.prompt.len().min(cols - 1);
        let prompt = &view.prompt.as_bytes()[..plen];
        let mut start = 0;
        let mut len = view.buf.len();
        let mut pos = view.pos;

        while plen + pos >= cols {
            start += 1;
            len -= 1;
            pos -= 1;
        }
        while plen + len > cols {
            len -= 1;
        }

        let mut out = Vec::with_capacity(plen + len + 32);
        out.push(b'\r');

        if flags.contains(RefreshFlags::WRITE) {
            out.extend_from_slice(prompt);
            if view.masked {
                out.extend(std::iter::repeat(b'*').take(len));
            } else {
                out.extend_from_slice(&view.buf[start..start + len]);
            }
            // Hints only fit when the whole line is visible
            if plen + view.buf.len() < cols {
                append_hint(&mut out, view, cols - (plen + view.buf.len()));
            }
        }

        // Erase to the right of what we wrote
        out.extend_from_slice(b"\x1b[0K");

        if flags.contains(RefreshFlags::WRITE) {
            out.extend_from_slice(format!("\r\x1b[{}C", pos + plen).as_bytes());
        }

        self.old_pos = view.pos;
        out
    }

    /// Multi-line refresh.
    ///
    /// Clears from the bottom of the previous render upward, rewrites the
    /// prompt and buffer with wrapping, and repositions the cursor with
    /// relative movements.
    fn refresh_multi_line(&mut self, view: &RenderView, flags: RefreshFlags) -> Vec<u8> {
        let cols = view.cols.max(1);
        let plen = view.prompt.len().min(cols - 1);
        let prompt = &view.prompt.as_bytes()[..plen];
        // Rows the current content will occupy
        let mut rows = (plen + view.buf.len() + cols - 1) / cols;
        // Row the cursor was on after the previous render, 1-based
        let old_cursor_row = (plen + self.old_pos + cols) / cols;
        let old_rows = self.old_rows;

        self.old_rows = rows;

        let mut out = Vec::with_capacity(plen + view.buf.len() + 64);

        if flags.contains(RefreshFlags::CLEAN) {
            // Go down to the last row of the previous render, then erase
            // each row while walking back up
            if old_rows > old_cursor_row {
                out.extend_from_slice(format!("\x1b[{}B", old_rows - old_cursor_row).as_bytes());
            }
            for _ in 1..old_rows {
                out.extend_from_slice(b"\r\x1b[0K\x1b[1A");
            }
        }

        if flags.intersects(RefreshFlags::ALL) {
            // Clean the top row
            out.extend_from_slice(b"\r\x1b[0K");
        }

        if flags.contains(RefreshFlags::WRITE) {
            out.extend_from_slice(prompt);
            if view.masked {
                out.extend(std::iter::repeat(b'*').take(view.buf.len()));
            } else {
                out.extend_from_slice(view.buf);
            }
            if plen + view.buf.len() < cols {
                append_hint(&mut out, view, cols - (plen + view.buf.len()));
            }

            /* If the cursor sits exactly at the end of a row with nothing
             * after it, emit an explicit newline so terminals that do not
             * auto-wrap still show the next row. */
            if view.pos > 0 && view.pos == view.buf.len() && (view.pos + plen) % cols == 0 {
                out.extend_from_slice(b"\n\r");
                rows += 1;
                if rows > self.old_rows {
                    self.old_rows = rows;
                }
            }

            // Cursor target row, 1-based from the top of the render
            let cursor_row = (plen + view.pos + cols) / cols;
            if rows > cursor_row {
                out.extend_from_slice(format!("\x1b[{}A", rows - cursor_row).as_bytes());
            }

            let col = (plen + view.pos) % cols;
            if col > 0 {
                out.extend_from_slice(format!("\r\x1b[{col}C").as_bytes());
            } else {
                out.push(b'\r');
            }
        }

        self.old_pos = view.pos;
        out
    }
}

/// Append truncated, optionally colored hint text.
fn append_hint(out: &mut Vec<u8>, view: &RenderView, max_len: usize) {
    let Some(hint) = view.hint else { return };
    if max_len == 0 || hint.text.is_empty() {
        return;
    }
    let shown = &hint.text.as_bytes()[..hint.text.len().min(max_len)];

    let color = match (hint.color, hint.bold) {
        (Some(c), _) => Some(c),
        (None, true) => Some(37),
        (None, false) => None,
    };
    if color.is_some() || hint.bold {
        let bold = u8::from(hint.bold);
        out.extend_from_slice(format!("\x1b[{};{};49m", bold, color.unwrap_or(37)).as_bytes());
    }
    out.extend_from_slice(shown);
    if color.is_some() || hint.bold {
        out.extend_from_slice(b"\x1b[0m");
    }
}
