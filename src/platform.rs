// SPDX-License-Identifier: MIT OR Apache-2.0

//! Platform-specific file services for the log channel.
//!
//! This module provides the three ways a [`Channel`](crate::channel::Channel) can obtain an
//! output handle: the process console, an anonymous temporary file, and a named file opened
//! for appending. On native platforms these come from `std` and `tempfile`, while on WASM the
//! console forwards completed lines to the browser console and files are unavailable.

use crate::channel::ChannelError;
use std::fs::File;
use std::io::Write;
use std::path::Path;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

/// The console destination.
///
/// On native targets this wraps stdout. Each write locks stdout for its duration, so a record
/// written in one call is never split by unrelated stdout traffic.
#[derive(Debug)]
pub struct Console {
    #[cfg(target_arch = "wasm32")]
    pending: Vec<u8>,
}

impl Write for Console {
    #[cfg(not(target_arch = "wasm32"))]
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        std::io::stdout().lock().write(buf)
    }

    #[cfg(target_arch = "wasm32")]
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        //the browser console is line-oriented, so hold bytes until we see a terminator
        for &byte in buf {
            if byte == b'\n' {
                let line = JsValue::from_str(&String::from_utf8_lossy(&self.pending));
                web_sys::console::log_1(&line);
                self.pending.clear();
            } else {
                self.pending.push(byte);
            }
        }
        Ok(buf.len())
    }

    #[cfg(not(target_arch = "wasm32"))]
    fn flush(&mut self) -> std::io::Result<()> {
        std::io::stdout().lock().flush()
    }

    #[cfg(target_arch = "wasm32")]
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

pub fn open_console() -> Console {
    Console {
        #[cfg(target_arch = "wasm32")]
        pending: Vec::new(),
    }
}

/**
Opens a new anonymous temporary file.

The file has no name on disk and is removed by the OS once the last handle is closed, which is
why [`Channel::close`](crate::channel::Channel::close) hands it back rather than closing it.
*/
#[cfg(not(target_arch = "wasm32"))]
pub fn open_temporary_file() -> Result<File, ChannelError> {
    Ok(tempfile::tempfile()?)
}

#[cfg(target_arch = "wasm32")]
pub fn open_temporary_file() -> Result<File, ChannelError> {
    Err(ChannelError::Unsupported("temporary files"))
}

/// Opens (creating if necessary) the named file for appending.
#[cfg(not(target_arch = "wasm32"))]
pub fn open_for_append(path: &Path) -> Result<File, ChannelError> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    Ok(file)
}

#[cfg(target_arch = "wasm32")]
pub fn open_for_append(_path: &Path) -> Result<File, ChannelError> {
    Err(ChannelError::Unsupported("named files"))
}
