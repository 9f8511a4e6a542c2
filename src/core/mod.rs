//! Core line-editing components.
//!
//! This module contains the low-level editing logic:
//!
//! - **tty**: raw-mode management and byte I/O on the terminal descriptors
//! - **escape**: ESC-prefixed key sequence decoding
//! - **buffer**: the editable line (bytes + cursor)
//! - **session**: high-level session combining all of the above
//!
//! # Architecture
//!
//! ```text
//! Session
//! ├── Tty (raw mode, reads, writes, column queries)
//! ├── LineBuffer (content + cursor)
//! ├── Renderer (screen refresh byte sequences)
//! ├── History (recallable past lines)
//! └── CompletionCycle (Tab cycling state)
//! ```

pub mod buffer;
pub mod escape;
pub mod session;
pub mod tty;
