//! Raw terminal I/O over caller-provided file descriptors
//!
//! This module provides a safe wrapper around termios raw mode and the
//! blocking read/write primitives used by the editing session. The
//! descriptors are borrowed from the caller and never closed here.

use std::io;
use std::mem;
use std::os::unix::io::RawFd;

use tracing::{debug, trace};

use crate::error::{LineError, Result};

/// Columns assumed when every width query fails.
const FALLBACK_COLUMNS: usize = 80;

/// Terminal handle over an input/output descriptor pair.
///
/// Raw mode is a scoped resource: it is acquired by [`Tty::enable_raw_mode`]
/// and must be released on every exit path. [`Drop`] performs a best-effort
/// restore in case the owner forgot.
pub struct Tty {
    ifd: RawFd,
    ofd: RawFd,
    /// Saved cooked-mode settings, captured before switching to raw.
    saved: Option<libc::termios>,
    raw: bool,
}

impl Tty {
    /// Create a terminal handle. Negative descriptors select stdin/stdout.
    pub fn new(ifd: RawFd, ofd: RawFd) -> Self {
        Self {
            ifd: if ifd < 0 { libc::STDIN_FILENO } else { ifd },
            ofd: if ofd < 0 { libc::STDOUT_FILENO } else { ofd },
            saved: None,
            raw: false,
        }
    }

    pub fn input_fd(&self) -> RawFd {
        self.ifd
    }

    /// Whether the input descriptor refers to a terminal device.
    pub fn is_tty(&self) -> bool {
        unsafe { libc::isatty(self.ifd) == 1 }
    }

    pub fn is_raw(&self) -> bool {
        self.raw
    }

    /// Switch the terminal to raw mode, capturing the current settings.
    ///
    /// A non-terminal input descriptor succeeds as a no-op; the session will
    /// fall back to plain reads. Errors from `tcgetattr`/`tcsetattr` are
    /// reported as terminal-configuration failures.
    pub fn enable_raw_mode(&mut self) -> Result<()> {
        if !self.is_tty() {
            return Ok(());
        }
        if self.raw {
            return Ok(());
        }

        let mut orig: libc::termios = unsafe { mem::zeroed() };
        if unsafe { libc::tcgetattr(self.ifd, &mut orig) } == -1 {
            return Err(LineError::TermConfig(io::Error::last_os_error()));
        }

        let mut raw = orig;
        raw.c_iflag &= !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
        raw.c_oflag &= !libc::OPOST;
        raw.c_cflag |= libc::CS8;
        raw.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);
        // Blocking reads of at least one byte, no timeout
        raw.c_cc[libc::VMIN] = 1;
        raw.c_cc[libc::VTIME] = 0;

        if unsafe { libc::tcsetattr(self.ifd, libc::TCSAFLUSH, &raw) } < 0 {
            return Err(LineError::TermConfig(io::Error::last_os_error()));
        }

        trace!("raw mode enabled on fd {}", self.ifd);
        self.saved = Some(orig);
        self.raw = true;
        Ok(())
    }

    /// Restore the settings captured by [`Tty::enable_raw_mode`]. Idempotent.
    pub fn disable_raw_mode(&mut self) -> Result<()> {
        if !self.raw {
            return Ok(());
        }
        if let Some(orig) = self.saved {
            if unsafe { libc::tcsetattr(self.ifd, libc::TCSAFLUSH, &orig) } < 0 {
                return Err(LineError::TermConfig(io::Error::last_os_error()));
            }
        }
        trace!("raw mode disabled on fd {}", self.ifd);
        self.raw = false;
        Ok(())
    }

    /// Read a single byte, retrying on EINTR.
    ///
    /// Returns `Ok(None)` on end of input (zero-length read), which is a
    /// status distinct from a read error.
    pub fn read_byte(&mut self) -> Result<Option<u8>> {
        let mut c: u8 = 0;
        loop {
            let n = unsafe { libc::read(self.ifd, &mut c as *mut u8 as *mut libc::c_void, 1) };
            if n == -1 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(LineError::Read(err));
            }
            return Ok(if n == 0 { None } else { Some(c) });
        }
    }

    /// Write the whole buffer, looping over short writes.
    pub fn write_all(&mut self, buf: &[u8]) -> Result<()> {
        let mut written = 0;
        while written < buf.len() {
            let n = unsafe {
                libc::write(
                    self.ofd,
                    buf[written..].as_ptr() as *const libc::c_void,
                    buf.len() - written,
                )
            };
            if n == -1 {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(LineError::Write(err));
            }
            if n == 0 {
                return Err(LineError::Write(io::Error::new(
                    io::ErrorKind::WriteZero,
                    "terminal accepted no bytes",
                )));
            }
            written += n as usize;
        }
        Ok(())
    }

    /// Clear the screen and home the cursor.
    pub fn clear_screen(&mut self) -> Result<()> {
        self.write_all(b"\x1b[H\x1b[2J")
    }

    /// Ring the terminal bell. Best effort; a failed write is ignored.
    pub fn beep(&mut self) {
        let _ = self.write_all(b"\x07");
    }

    /// Query the cursor column with `ESC [6n`.
    ///
    /// Requires raw mode so the terminal's response is delivered unechoed.
    fn cursor_column(&mut self) -> Option<usize> {
        self.write_all(b"\x1b[6n").ok()?;

        // Response: ESC [ rows ; cols R
        let mut buf = [0u8; 32];
        let mut i = 0;
        while i < buf.len() - 1 {
            match self.read_byte().ok()? {
                Some(b) if b == b'R' => break,
                Some(b) => {
                    buf[i] = b;
                    i += 1;
                }
                None => return None,
            }
        }
        if i < 2 || buf[0] != 0x1b || buf[1] != b'[' {
            return None;
        }
        let body = std::str::from_utf8(&buf[2..i]).ok()?;
        let (_rows, cols) = body.split_once(';')?;
        cols.parse::<usize>().ok()
    }

    /// Number of columns in the terminal.
    ///
    /// Prefers the window-size ioctl; when that is unavailable or reports
    /// zero, falls back to a cursor-query round trip: record the column,
    /// jump to column 999 (the terminal clamps to its last column), read the
    /// column again, and move back. Any failure along the way means 80.
    pub fn columns(&mut self) -> usize {
        unsafe {
            let mut ws: libc::winsize = mem::zeroed();
            if libc::ioctl(self.ofd, libc::TIOCGWINSZ, &mut ws) == 0 && ws.ws_col != 0 {
                return ws.ws_col as usize;
            }
        }

        debug!("TIOCGWINSZ failed, probing width with cursor queries");

        // The round trip needs synchronous unechoed responses
        let was_raw = self.raw;
        if !was_raw && self.enable_raw_mode().is_err() {
            return FALLBACK_COLUMNS;
        }

        let cols = self.probe_columns().unwrap_or(FALLBACK_COLUMNS);

        if !was_raw {
            let _ = self.disable_raw_mode();
        }
        cols
    }

    fn probe_columns(&mut self) -> Option<usize> {
        let start = self.cursor_column()?;
        self.write_all(b"\x1b[999C").ok()?;
        let cols = self.cursor_column()?;

        // Put the cursor back where it was
        if cols > start {
            let seq = format!("\x1b[{}D", cols - start);
            let _ = self.write_all(seq.as_bytes());
        }
        Some(cols)
    }
}

impl Drop for Tty {
    fn drop(&mut self) {
        // Never leave the controlling terminal in raw mode
        let _ = self.disable_raw_mode();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Seek, SeekFrom, Write};
    use std::os::unix::io::AsRawFd;

    #[test]
    fn non_tty_raw_mode_is_noop() {
        let file = tempfile::tempfile().unwrap();
        let mut tty = Tty::new(file.as_raw_fd(), file.as_raw_fd());
        assert!(!tty.is_tty());
        tty.enable_raw_mode().unwrap();
        assert!(!tty.is_raw());
        tty.disable_raw_mode().unwrap();
        tty.disable_raw_mode().unwrap();
    }

    #[test]
    fn read_byte_reports_eof_as_none() {
        let mut file = tempfile::tempfile().unwrap();
        file.write_all(b"a").unwrap();
        file.seek(SeekFrom::Start(0)).unwrap();
        let mut tty = Tty::new(file.as_raw_fd(), file.as_raw_fd());
        assert_eq!(tty.read_byte().unwrap(), Some(b'a'));
        assert_eq!(tty.read_byte().unwrap(), None);
    }

    #[test]
    fn write_all_writes_everything() {
        let mut file = tempfile::tempfile().unwrap();
        {
            let mut tty = Tty::new(file.as_raw_fd(), file.as_raw_fd());
            tty.write_all(b"hello world").unwrap();
        }
        file.seek(SeekFrom::Start(0)).unwrap();
        let mut out = String::new();
        file.read_to_string(&mut out).unwrap();
        assert_eq!(out, "hello world");
    }
}
