// SPDX-License-Identifier: MIT OR Apache-2.0

//! # In-Memory Output
//!
//! This module provides an in-memory destination for testing and debugging purposes.
//! [`InMemoryOutput`] captures the bytes a [`Log`](crate::Log) writes instead of sending
//! them to a file or the console, making it ideal for:
//!
//! - Unit testing code that emits records
//! - Programmatically examining the exact bytes of each record
//! - Simulating a destination that fills up, via [`InMemoryOutput::with_limit`]
//!
//! ## Architecture
//!
//! The output is a cheap handle around an `Arc<Mutex<..>>`.  Give one clone to
//! [`Log::open_writer`](crate::Log::open_writer) and keep another to read back what was
//! written.

use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct Captured {
    bytes: Vec<u8>,
    limit: Option<usize>,
    accepted: usize,
}

/// An in-memory destination that stores every byte written to it.
///
/// # Example
///
/// ```rust
/// use runlog::{InMemoryOutput, Log};
///
/// let output = InMemoryOutput::new();
/// let log = Log::new(2048);
/// log.open_writer(Box::new(output.clone())).unwrap();
///
/// let mut msg = log.message();
/// runlog::append!(msg, "tick,{}", 42);
/// msg.write_to_log_file();
///
/// assert_eq!(output.drain(), "tick,42\n");
/// ```
///
/// # Simulating a full disk
///
/// ```rust
/// use runlog::InMemoryOutput;
/// use std::io::Write;
///
/// let mut output = InMemoryOutput::with_limit(3);
/// assert_eq!(output.write(b"abcdef").unwrap(), 3);
/// assert_eq!(output.write(b"gh").unwrap(), 0);
/// assert_eq!(output.drain(), "abc");
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryOutput {
    captured: Arc<Mutex<Captured>>,
}

// ============================================================================
// BOILERPLATE TRAIT IMPLEMENTATIONS
// ============================================================================
//
// - Debug: derived for diagnostics
// - Clone: derived; clones share storage, which is the point
// - Default: unlimited, empty
// - PartialEq/Eq/Hash: NOT implemented, identity vs contents is unclear
// - Send/Sync: automatic through Arc<Mutex<..>>

impl InMemoryOutput {
    /// Creates an output that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an output that accepts at most `limit` bytes in total and then reports
    /// zero-length writes.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            captured: Arc::new(Mutex::new(Captured {
                bytes: Vec::new(),
                limit: Some(limit),
                accepted: 0,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Captured> {
        //a panicking writer leaves plain bytes behind, which are still worth reading
        self.captured.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns everything written so far (lossily decoded) and clears the buffer.
    ///
    /// The byte limit, if any, keeps counting across drains.
    pub fn drain(&self) -> String {
        let bytes = self.drain_bytes();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Returns everything written so far and clears the buffer.
    pub fn drain_bytes(&self) -> Vec<u8> {
        std::mem::take(&mut self.lock().bytes)
    }

    /// Flushes everything written so far to stderr, clearing the buffer.
    pub fn drain_to_console(&self) {
        let text = self.drain();
        #[cfg(target_arch = "wasm32")]
        web_sys::console::log_1(&text.into());
        #[cfg(not(target_arch = "wasm32"))]
        eprint!("{}", text);
    }
}

impl Write for InMemoryOutput {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let mut captured = self.lock();
        let room = match captured.limit {
            Some(limit) => limit.saturating_sub(captured.accepted),
            None => buf.len(),
        };
        let n = room.min(buf.len());
        captured.bytes.extend_from_slice(&buf[..n]);
        captured.accepted += n;
        Ok(n)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn clones_share_storage() {
        let output = InMemoryOutput::new();
        let mut writer = output.clone();
        writer.write_all(b"shared").unwrap();
        assert_eq!(output.drain(), "shared");
        assert_eq!(output.drain(), "");
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn limit_spans_drains() {
        let mut output = InMemoryOutput::with_limit(5);
        assert_eq!(output.write(b"abc").unwrap(), 3);
        assert_eq!(output.drain(), "abc");
        assert_eq!(output.write(b"defg").unwrap(), 2);
        assert_eq!(output.drain_bytes(), b"de");
    }
}
