//! Editing session
//!
//! The top-level state machine tying the terminal, buffer, renderer,
//! history, and completion together. A session is driven either by the
//! blocking [`Session::read_line`] or externally through the
//! start/feed/stop protocol, with hide/show available to interleave
//! unrelated output while a line is being edited.
//!
//! One `feed` call consumes one unit of input: a single byte, or a byte
//! plus the escape sequence it introduces. Everything else is synchronous.

use std::os::unix::io::RawFd;
use std::path::Path;

use tracing::debug;

use super::buffer::LineBuffer;
use super::escape::{self, EditCmd};
use super::tty::Tty;
use crate::completion::{CompletionCallback, CompletionCycle, CycleOutcome};
use crate::config::EditorConfig;
use crate::error::{LineError, Result};
use crate::history::History;
use crate::ui::renderer::{Hint, HintsCallback, RefreshFlags, RenderView, Renderer};

const CTRL_A: u8 = 1;
const CTRL_B: u8 = 2;
const CTRL_C: u8 = 3;
const CTRL_D: u8 = 4;
const CTRL_E: u8 = 5;
const CTRL_F: u8 = 6;
const CTRL_H: u8 = 8;
const TAB: u8 = 9;
const CTRL_K: u8 = 11;
const CTRL_L: u8 = 12;
const ENTER: u8 = 13;
const CTRL_N: u8 = 14;
const CTRL_P: u8 = 16;
const CTRL_T: u8 = 20;
const CTRL_U: u8 = 21;
const CTRL_W: u8 = 23;
const ESC: u8 = 27;
const BACKSPACE: u8 = 127;

/// Terminal types known not to understand basic escape sequences.
const UNSUPPORTED_TERMS: [&str; 3] = ["dumb", "cons25", "emacs"];

/// Result of one `feed` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Still editing; call `feed` again when input is available.
    Pending,
    /// The user finished the line.
    Line(String),
    /// Ctrl-C; no line produced.
    Interrupted,
    /// Ctrl-D on an empty line, or the input stream ended.
    EndOfInput,
}

/// Direction for history navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HistoryDir {
    Prev,
    Next,
}

fn is_dumb_term(term: Option<&str>) -> bool {
    let Some(term) = term else { return false };
    UNSUPPORTED_TERMS
        .iter()
        .any(|t| term.len() >= t.len() && term[..t.len()].eq_ignore_ascii_case(t))
}

/// An interactive line-editing session over one terminal.
///
/// Owns every piece of editing state; multiple independent sessions can
/// coexist (one per terminal). Raw mode is released on `stop` and, as a
/// backstop, when the session is dropped.
pub struct Session {
    tty: Tty,
    renderer: Renderer,
    line: LineBuffer,
    history: History,
    cycle: CompletionCycle,
    /// Candidates fetched for the cycle in progress, kept for `show`.
    candidates: Vec<String>,
    completion: Option<CompletionCallback>,
    hints: Option<HintsCallback>,
    prompt: String,
    /// Cached column count, computed once per session.
    cols: usize,
    multi_line: bool,
    mask_mode: bool,
    /// Terminal cannot do escape sequences; echo-only fallback.
    dumb: bool,
    /// Offset into history while navigating; 0 is the live line.
    history_index: usize,
    editing: bool,
}

impl Session {
    /// Create a session over the given descriptors. Negative descriptors
    /// select stdin/stdout. `term` is the terminal type (usually `$TERM`),
    /// consulted once to classify the terminal as dumb or smart.
    pub fn new(input_fd: RawFd, output_fd: RawFd, term: Option<&str>) -> Self {
        Self::with_config(input_fd, output_fd, term, &EditorConfig::default())
    }

    pub fn with_config(
        input_fd: RawFd,
        output_fd: RawFd,
        term: Option<&str>,
        config: &EditorConfig,
    ) -> Self {
        let mut history = History::new();
        if config.history_max_len > 0 {
            // Infallible for non-zero lengths
            let _ = history.set_max_len(config.history_max_len);
        }
        let dumb = is_dumb_term(term);
        if dumb {
            debug!("terminal type {:?} classified as dumb", term);
        }
        Self {
            tty: Tty::new(input_fd, output_fd),
            renderer: Renderer::new(),
            line: LineBuffer::new(),
            history,
            cycle: CompletionCycle::new(),
            candidates: Vec::new(),
            completion: None,
            hints: None,
            prompt: String::new(),
            cols: 0,
            multi_line: config.multi_line,
            mask_mode: config.mask_mode,
            dumb,
            history_index: 0,
            editing: false,
        }
    }

    /// Render long lines over multiple rows instead of scrolling a window.
    pub fn set_multi_line(&mut self, on: bool) {
        self.multi_line = on;
    }

    /// Echo '*' instead of typed characters (for secrets).
    pub fn set_mask_mode(&mut self, on: bool) {
        self.mask_mode = on;
    }

    pub fn set_completion_callback(&mut self, cb: CompletionCallback) {
        self.completion = Some(cb);
    }

    pub fn set_hints_callback(&mut self, cb: HintsCallback) {
        self.hints = Some(cb);
    }

    /// Current content of the line under edit.
    pub fn text(&self) -> String {
        self.line.to_text()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn add_history(&mut self, line: &str) -> bool {
        self.history.add(line)
    }

    pub fn set_history_max_len(&mut self, len: usize) -> Result<()> {
        self.history.set_max_len(len)
    }

    pub fn save_history(&self, path: &Path) -> Result<()> {
        self.history.save(path)
    }

    pub fn load_history(&mut self, path: &Path) -> Result<()> {
        self.history.load(path)
    }

    /// Clear the screen, redrawing the prompt if a line is being edited.
    pub fn clear_screen(&mut self) -> Result<()> {
        if !self.tty.is_tty() {
            return Ok(());
        }
        self.tty.clear_screen()?;
        if self.editing {
            self.refresh()?;
        }
        Ok(())
    }

    /// Begin an edit turn: enter raw mode, reset per-turn state, and show
    /// the prompt.
    pub fn start(&mut self, prompt: &str) -> Result<()> {
        self.prompt = prompt.to_string();
        self.line = LineBuffer::new();
        self.renderer.reset();
        self.cycle.reset();
        self.candidates.clear();
        self.history_index = 0;

        self.tty.enable_raw_mode()?;
        self.editing = true;

        // Plain stream: feed will read a whole line without echoing
        if !self.tty.is_tty() {
            return Ok(());
        }

        if self.cols == 0 {
            self.cols = self.tty.columns();
        }

        if !self.dumb {
            /* The newest history entry always mirrors the line under edit,
             * starting out empty. */
            self.history.add("");
        }

        self.tty.write_all(prompt.as_bytes())?;
        Ok(())
    }

    /// Consume one unit of input and advance the edit state.
    ///
    /// Blocks for exactly one byte read (plus the bytes of an escape
    /// sequence); callers multiplexing their own I/O should invoke this
    /// only when the input descriptor is readable.
    pub fn feed(&mut self) -> Result<Status> {
        if !self.editing {
            return Err(LineError::NotEditing);
        }
        if !self.tty.is_tty() {
            return self.feed_plain_stream();
        }
        if self.dumb {
            return self.feed_dumb();
        }

        let c = match self.tty.read_byte()? {
            Some(c) => c,
            None => {
                self.finish_discarded();
                return Ok(Status::EndOfInput);
            }
        };

        // Completion cycling sees the key first
        let c = if (self.cycle.is_active() || c == TAB) && self.completion.is_some() {
            match self.feed_completion(c)? {
                Some(c) => c,
                None => return Ok(Status::Pending),
            }
        } else {
            c
        };

        match c {
            ENTER => {
                self.history.pop_newest();
                if self.multi_line && self.line.move_end() {
                    self.refresh()?;
                }
                if self.hints.is_some() {
                    // Leave the accepted line on screen without hint text
                    self.render(RefreshFlags::ALL, None, false)?;
                }
                self.editing = false;
                Ok(Status::Line(self.line.to_text()))
            }
            CTRL_C => {
                self.finish_discarded();
                Ok(Status::Interrupted)
            }
            CTRL_D => {
                if self.line.is_empty() {
                    self.finish_discarded();
                    Ok(Status::EndOfInput)
                } else {
                    self.apply(LineBuffer::delete_forward)?;
                    Ok(Status::Pending)
                }
            }
            BACKSPACE | CTRL_H => self.pending(Self::op_backspace),
            CTRL_T => self.pending(|s| s.apply(LineBuffer::transpose)),
            CTRL_B => self.pending(|s| s.apply(LineBuffer::move_left)),
            CTRL_F => self.pending(|s| s.apply(LineBuffer::move_right)),
            CTRL_A => self.pending(|s| s.apply(LineBuffer::move_home)),
            CTRL_E => self.pending(|s| s.apply(LineBuffer::move_end)),
            CTRL_U => self.pending(|s| s.apply(LineBuffer::clear)),
            CTRL_K => self.pending(|s| s.apply(LineBuffer::kill_to_end)),
            CTRL_W => self.pending(|s| s.apply(LineBuffer::delete_prev_word)),
            CTRL_P => self.pending(|s| s.history_step(HistoryDir::Prev)),
            CTRL_N => self.pending(|s| s.history_step(HistoryDir::Next)),
            CTRL_L => self.pending(Self::clear_screen),
            ESC => {
                let cmd = escape::decode(&mut self.tty)?;
                self.pending(|s| s.apply_cmd(cmd))
            }
            c if c >= 0x20 => self.pending(|s| s.insert_byte(c)),
            _ => Ok(Status::Pending),
        }
    }

    /// End the edit turn and restore the terminal. Idempotent.
    pub fn stop(&mut self) -> Result<()> {
        if !self.tty.is_tty() {
            self.editing = false;
            return Ok(());
        }
        if !self.editing && !self.tty.is_raw() {
            return Ok(());
        }
        self.editing = false;
        self.tty.disable_raw_mode()?;
        self.tty.write_all(b"\n")
    }

    /// Erase the prompt and line from the screen so unrelated output can be
    /// printed. Legal only while editing.
    pub fn hide(&mut self) -> Result<()> {
        if !self.editing {
            return Err(LineError::NotEditing);
        }
        // Plain streams never draw, so there is nothing to erase
        if !self.tty.is_tty() {
            return Ok(());
        }
        self.render(RefreshFlags::CLEAN, None, true)
    }

    /// Redraw the prompt and line after [`Session::hide`], honoring an
    /// in-progress completion candidate.
    pub fn show(&mut self) -> Result<()> {
        if !self.editing {
            return Err(LineError::NotEditing);
        }
        if !self.tty.is_tty() {
            return Ok(());
        }
        let candidate = self.cycle.selected(self.candidates.len());
        self.render(RefreshFlags::WRITE, candidate, true)
    }

    /// Blocking convenience: start, feed until done, stop.
    pub fn read_line(&mut self, prompt: &str) -> Result<Status> {
        self.start(prompt)?;
        let result = loop {
            match self.feed() {
                Ok(Status::Pending) => continue,
                other => break other,
            }
        };
        // Raw mode must be released even when feed failed
        let stopped = self.stop();
        let status = result?;
        stopped?;
        Ok(status)
    }

    // ------------------------------------------------------------------
    // Input paths
    // ------------------------------------------------------------------

    /// Input is a pipe or file: read one whole line, no echo, no raw mode.
    fn feed_plain_stream(&mut self) -> Result<Status> {
        let mut bytes = Vec::new();
        loop {
            match self.tty.read_byte()? {
                None => {
                    self.editing = false;
                    return if bytes.is_empty() {
                        Ok(Status::EndOfInput)
                    } else {
                        Ok(Status::Line(String::from_utf8_lossy(&bytes).into_owned()))
                    };
                }
                Some(b'\n') => {
                    self.editing = false;
                    return Ok(Status::Line(String::from_utf8_lossy(&bytes).into_owned()));
                }
                Some(c) => bytes.push(c),
            }
        }
    }

    /// Minimal fallback for terminals without escape support: echo bytes,
    /// no cursor movement, history, or completion.
    fn feed_dumb(&mut self) -> Result<Status> {
        let c = match self.tty.read_byte()? {
            Some(c) => c,
            None => {
                self.editing = false;
                return Ok(Status::EndOfInput);
            }
        };
        match c {
            ENTER => {
                self.editing = false;
                self.tty.write_all(b"\r\n")?;
                Ok(Status::Line(self.line.to_text()))
            }
            CTRL_C => {
                self.editing = false;
                Ok(Status::Interrupted)
            }
            CTRL_D if self.line.is_empty() => {
                self.editing = false;
                Ok(Status::EndOfInput)
            }
            BACKSPACE | CTRL_H => {
                if self.line.backspace() {
                    self.tty.write_all(b"\x08 \x08")?;
                }
                Ok(Status::Pending)
            }
            c if c >= 0x20 => {
                self.line.insert(c);
                let echo = if self.mask_mode { b'*' } else { c };
                self.tty.write_all(&[echo])?;
                Ok(Status::Pending)
            }
            _ => Ok(Status::Pending),
        }
    }

    /// Route a key through completion cycling. Returns the key that still
    /// needs ordinary dispatch, or None when it was consumed.
    fn feed_completion(&mut self, c: u8) -> Result<Option<u8>> {
        // No meaningful completion context on an empty line
        if !self.cycle.is_active() && self.line.is_empty() {
            return Ok(None);
        }

        self.candidates = self.fetch_candidates();
        if self.candidates.is_empty() {
            self.tty.beep();
            self.cycle.reset();
            return Ok(None);
        }

        match self.cycle.handle_key(c, self.candidates.len()) {
            CycleOutcome::ShowCandidate(i) => {
                self.render(RefreshFlags::ALL, Some(i), true)?;
                Ok(None)
            }
            CycleOutcome::ShowOriginal { beep } => {
                if beep {
                    self.tty.beep();
                }
                self.refresh()?;
                Ok(None)
            }
            CycleOutcome::Cancelled { redisplay } => {
                if redisplay {
                    self.refresh()?;
                }
                Ok(None)
            }
            CycleOutcome::Accept { candidate } => {
                let text = self.candidates[candidate].clone();
                self.line.set_text(&text);
                Ok(Some(c))
            }
            CycleOutcome::Passthrough => Ok(Some(c)),
        }
    }

    fn fetch_candidates(&mut self) -> Vec<String> {
        let text = self.line.to_text();
        match self.completion.as_mut() {
            Some(cb) => cb(&text),
            None => Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Edit operations
    // ------------------------------------------------------------------

    /// Run a buffer operation and redraw only when it changed something.
    fn apply(&mut self, op: impl FnOnce(&mut LineBuffer) -> bool) -> Result<()> {
        if op(&mut self.line) {
            self.refresh()?;
        }
        Ok(())
    }

    fn op_backspace(&mut self) -> Result<()> {
        self.apply(LineBuffer::backspace)
    }

    fn apply_cmd(&mut self, cmd: EditCmd) -> Result<()> {
        match cmd {
            EditCmd::HistoryPrev => self.history_step(HistoryDir::Prev),
            EditCmd::HistoryNext => self.history_step(HistoryDir::Next),
            EditCmd::CursorLeft => self.apply(LineBuffer::move_left),
            EditCmd::CursorRight => self.apply(LineBuffer::move_right),
            EditCmd::MoveHome => self.apply(LineBuffer::move_home),
            EditCmd::MoveEnd => self.apply(LineBuffer::move_end),
            EditCmd::DeleteForward => self.apply(LineBuffer::delete_forward),
            EditCmd::Noop => Ok(()),
        }
    }

    /// Insert one byte at the cursor.
    ///
    /// Appending to a line that still fits on one row skips the full
    /// refresh and writes the single (possibly masked) character; this is
    /// purely an optimization and the buffer state is identical either way.
    fn insert_byte(&mut self, c: u8) -> Result<()> {
        let fast = self.line.cursor_at_end()
            && !self.multi_line
            && self.hints.is_none()
            && self.prompt.len() + self.line.len() + 1 < self.cols;
        self.line.insert(c);
        if fast {
            let echo = if self.mask_mode { b'*' } else { c };
            self.tty.write_all(&[echo])
        } else {
            self.refresh()
        }
    }

    /// Replace the live line with the next or previous history entry,
    /// first writing the live line back into the slot being left.
    fn history_step(&mut self, dir: HistoryDir) -> Result<()> {
        if self.history.len() <= 1 {
            return Ok(());
        }
        let live = self.line.to_text();
        self.history.replace_from_latest(self.history_index, &live);

        match dir {
            HistoryDir::Prev => {
                if self.history_index + 1 >= self.history.len() {
                    return Ok(()); // clamped at the oldest entry
                }
                self.history_index += 1;
            }
            HistoryDir::Next => {
                if self.history_index == 0 {
                    return Ok(());
                }
                self.history_index -= 1;
            }
        }

        let entry = self
            .history
            .from_latest(self.history_index)
            .unwrap_or_default()
            .to_string();
        self.line.set_text(&entry);
        self.refresh()
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    fn refresh(&mut self) -> Result<()> {
        self.render(RefreshFlags::ALL, None, true)
    }

    /// Build the render view and write one refresh to the terminal.
    /// `candidate` substitutes a completion candidate for display without
    /// touching the underlying buffer.
    fn render(
        &mut self,
        flags: RefreshFlags,
        candidate: Option<usize>,
        with_hints: bool,
    ) -> Result<()> {
        let hint = if with_hints && candidate.is_none() && !self.cycle.is_active() {
            self.compute_hint()
        } else {
            None
        };
        let (buf, pos) = match candidate {
            Some(i) => {
                let bytes = self.candidates[i].as_bytes();
                (bytes, bytes.len())
            }
            None => (self.line.as_bytes(), self.line.pos()),
        };
        let view = RenderView {
            prompt: &self.prompt,
            buf,
            pos,
            cols: self.cols,
            multi_line: self.multi_line,
            masked: self.mask_mode,
            hint: hint.as_ref(),
        };
        let out = self.renderer.refresh(&view, flags);
        self.tty.write_all(&out)
    }

    fn compute_hint(&mut self) -> Option<Hint> {
        let cb = self.hints.as_mut()?;
        let text = self.line.to_text();
        cb(&text)
    }

    fn pending(&mut self, f: impl FnOnce(&mut Self) -> Result<()>) -> Result<Status> {
        f(self)?;
        Ok(Status::Pending)
    }

    /// Abandon the turn: drop the live-line placeholder and leave editing.
    fn finish_discarded(&mut self) {
        self.history.pop_newest();
        self.editing = false;
    }
}
