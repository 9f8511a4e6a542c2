//! termline - An interactive terminal line-editing library
//!
//! termline turns a raw terminal into a line editor: a prompt, an editable
//! buffer with Emacs-style keybindings, recallable history, Tab completion,
//! and optional inline hints, all without depending on curses.
//!
//! # Features
//!
//! - **Two render modes**: single-line horizontal scrolling, or multi-line
//!   wrapping across terminal rows
//! - **History**: bounded, deduplicating, with file persistence
//! - **Completion**: Tab cycles through caller-supplied candidates
//! - **Hints**: callback-driven ghost text after the cursor
//! - **Mask mode**: echo `*` for secrets
//! - **Non-blocking friendly**: drive editing one input event at a time
//!   with `start`/`feed`/`stop`, or use the blocking [`Session::read_line`]
//!
//! # Quick Start
//!
//! ```no_run
//! use termline::{Session, Status};
//!
//! let mut session = Session::new(-1, -1, std::env::var("TERM").ok().as_deref());
//! match session.read_line("> ")? {
//!     Status::Line(line) => println!("got: {line}"),
//!     Status::Interrupted => println!("^C"),
//!     Status::EndOfInput => println!("eof"),
//!     Status::Pending => unreachable!(),
//! }
//! # Ok::<(), termline::LineError>(())
//! ```

mod completion;
mod config;
mod core;
mod error;
mod history;
mod ui;

pub use crate::completion::CompletionCallback;
pub use crate::config::EditorConfig;
pub use crate::core::buffer::LineBuffer;
pub use crate::core::session::{Session, Status};
pub use crate::core::tty::Tty;
pub use crate::error::{LineError, Result};
pub use crate::history::{History, DEFAULT_HISTORY_MAX_LEN};
pub use crate::ui::renderer::{Hint, HintsCallback};
