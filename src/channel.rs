// SPDX-License-Identifier: MIT OR Apache-2.0

//! The log channel: the open destination and the raw write primitive.
//!
//! A [`Channel`] starts out disabled.  It is opened once, onto the console, an anonymous
//! temporary file, a named file or a caller-supplied writer, and from then on accepts raw
//! bytes through [`Channel::write`].  It never interprets what it writes; record structure is
//! the job of [`MessageBuilder`](crate::MessageBuilder).
//!
//! # Lifecycle
//!
//! ```text
//! disabled --open--> enabled --stop--> stopped
//!     \                 |                 |
//!      \--close-->   closed  <--close-----/
//! ```
//!
//! A closed channel cannot be reopened.  A stopped channel writes nothing but keeps its handle,
//! so that closing it can still return a temporary file for inspection.

use crate::config::Destination;
use crate::platform::{self, Console};
use std::fs::File;
use std::io::{ErrorKind, Write};

/// Reasons a channel could not be opened.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ChannelError {
    #[error("could not open log destination: {0}")]
    Io(#[from] std::io::Error),
    #[error("log channel is already open")]
    AlreadyOpen,
    #[error("log channel was closed and cannot be reopened")]
    Closed,
    #[error("{0} are not supported on this platform")]
    Unsupported(&'static str),
}

enum Output {
    Console(Console),
    File(File),
    TemporaryFile(File),
    Writer(Box<dyn Write + Send>),
}

impl Output {
    fn as_write(&mut self) -> &mut dyn Write {
        match self {
            Output::Console(console) => console as &mut dyn Write,
            Output::File(file) | Output::TemporaryFile(file) => file as &mut dyn Write,
            Output::Writer(writer) => writer.as_mut() as &mut dyn Write,
        }
    }
}

impl std::fmt::Debug for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Output::Console(_) => f.write_str("Console"),
            Output::File(file) => f.debug_tuple("File").field(file).finish(),
            Output::TemporaryFile(file) => f.debug_tuple("TemporaryFile").field(file).finish(),
            Output::Writer(_) => f.write_str("Writer"),
        }
    }
}

/**
The destination of a log session.

See the [module documentation](self) for the lifecycle.
*/
#[derive(Debug, Default)]
pub struct Channel {
    output: Option<Output>,
    stopped: bool,
    closed: bool,
}

impl Channel {
    /// Creates a disabled channel.
    pub const fn new() -> Self {
        Self {
            output: None,
            stopped: false,
            closed: false,
        }
    }

    /// True iff a destination is open and no write has failed.
    pub fn is_enabled(&self) -> bool {
        !self.stopped && self.output.is_some()
    }

    fn check_openable(&self) -> Result<(), ChannelError> {
        if self.closed {
            Err(ChannelError::Closed)
        } else if self.output.is_some() {
            Err(ChannelError::AlreadyOpen)
        } else {
            Ok(())
        }
    }

    /**
    Opens the channel onto `destination`.

    On failure the channel stays disabled.
    */
    pub fn open(&mut self, destination: &Destination) -> Result<(), ChannelError> {
        self.check_openable()?;
        let output = match destination {
            Destination::Console => Output::Console(platform::open_console()),
            Destination::TemporaryFile => Output::TemporaryFile(platform::open_temporary_file()?),
            Destination::File(path) => Output::File(platform::open_for_append(path)?),
        };
        self.output = Some(output);
        Ok(())
    }

    /// Opens the channel onto an arbitrary writer.
    pub fn open_writer(&mut self, writer: Box<dyn Write + Send>) -> Result<(), ChannelError> {
        self.check_openable()?;
        self.output = Some(Output::Writer(writer));
        Ok(())
    }

    /**
    Writes `bytes` to the destination, returning the number of bytes accepted.

    A disabled channel accepts nothing and returns 0.  Like `fwrite`, partial OS writes are
    continued until everything is written, an error occurs, or the destination accepts zero
    bytes; whatever was accepted up to that point is reported and nothing is retried.
    */
    pub fn write(&mut self, bytes: &[u8]) -> usize {
        if !self.is_enabled() {
            return 0;
        }
        let Some(output) = self.output.as_mut() else {
            return 0;
        };
        let writer = output.as_write();
        let mut written = 0;
        while written < bytes.len() {
            match writer.write(&bytes[written..]) {
                Ok(0) => break,
                Ok(n) => written += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(_) => break,
            }
        }
        written
    }

    /// Permanently disables writes without giving up the handle.
    pub fn stop(&mut self) {
        self.stopped = true;
    }

    /**
    Closes the channel.

    If the destination was an anonymous temporary file it is returned still open, so the caller
    can read back what was logged.  Every other destination is flushed and dropped.  Closing an
    already-closed channel does nothing and returns `None`.
    */
    pub fn close(&mut self) -> Option<File> {
        self.closed = true;
        self.stopped = false;
        match self.output.take()? {
            Output::TemporaryFile(file) => Some(file),
            mut other => {
                //nothing useful to do with a flush error while closing
                let _ = other.as_write().flush();
                None
            }
        }
    }
}
