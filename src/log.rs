// SPDX-License-Identifier: MIT OR Apache-2.0

//! The log session.
//!
//! A [`Log`] owns everything records share: the [`Channel`] they are written to, the fixed
//! message buffer they are built in, the lock serializing access to both, and the
//! [`FailureSink`] told when a write fails.
//!
//! # Architecture
//!
//! The channel and buffer live together behind one `wasm_safe_mutex::Mutex`.  Each
//! [`MessageBuilder`] holds that lock for its whole lifetime, which gives:
//! - at most one record under construction at a time, so lines never interleave
//! - no close racing an in-flight record
//! - locking that works on the wasm main thread, where blocking is not allowed and the mutex
//!   spins instead
//!
//! Whether the log is enabled is mirrored in an atomic so callers can skip building records
//! for a disabled log without touching the lock.
//!
//! # Lifecycle
//!
//! A log starts disabled.  [`Log::initialize`] resolves the configured flags, opens the
//! configured destination if any category wants logging from the start, and writes the
//! version record.  A write failure disables the log for good; [`Log::close`] ends it.
//! Neither can be undone: build a new `Log` instead.
//!
//! # Examples
//!
//! ```
//! use runlog::{Log, LogConfig, Version};
//!
//! let mut config = LogConfig::default();
//! config.logfile = "&".into();
//! config.flags.log_code = true;
//!
//! let log = Log::new(config.buffer_size);
//! log.initialize(&mut config, &Version::new(7, 2, 1, 0));
//! # #[cfg(not(target_arch = "wasm32"))]
//! assert!(log.is_enabled());
//!
//! if log.is_enabled() {
//!     let mut msg = log.message();
//!     runlog::append!(msg, "tick,{},{}", 0x1000, 3);
//!     msg.write_to_log_file();
//! }
//!
//! // the temporary file comes back for inspection
//! let file = log.close();
//! # #[cfg(not(target_arch = "wasm32"))]
//! assert!(file.is_some());
//! ```

use crate::channel::{Channel, ChannelError};
use crate::config::{Destination, LogConfig};
use crate::failure_sink::FailureSink;
use crate::message_builder::MessageBuilder;
use crate::stderror_failure_sink::StdErrorFailureSink;
use crate::version::Version;
use std::fs::File;
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use wasm_safe_mutex::{Guard, Mutex};

/// State that only the holder of the lock may touch.
#[derive(Debug)]
pub(crate) struct Shared {
    pub(crate) channel: Channel,
    /// `None` once the log is closed.
    pub(crate) buffer: Option<Box<[u8]>>,
}

/**
A log session.

See the [module documentation](self).
*/
pub struct Log {
    shared: Mutex<Shared>,
    enabled: AtomicBool,
    failure_sink: Arc<dyn FailureSink>,
}

impl Log {
    /**
    Creates a disabled log with a `buffer_size`-byte message buffer, reporting write failures
    to stderr.

    A `buffer_size` of zero is raised to one byte, the room a record's terminator needs.
    */
    pub fn new(buffer_size: usize) -> Self {
        Self::with_failure_sink(buffer_size, Arc::new(StdErrorFailureSink::new()))
    }

    /// Like [`Log::new`], reporting write failures to `failure_sink`.
    pub fn with_failure_sink(buffer_size: usize, failure_sink: Arc<dyn FailureSink>) -> Self {
        let buffer = vec![0u8; buffer_size.max(1)].into_boxed_slice();
        Self {
            shared: Mutex::new(Shared {
                channel: Channel::new(),
                buffer: Some(buffer),
            }),
            enabled: AtomicBool::new(false),
            failure_sink,
        }
    }

    /**
    Creates a log sized by `config` and [initializes](Log::initialize) it.

    `config.flags` is left resolved.
    */
    pub fn start(
        config: &mut LogConfig,
        version: &Version,
        failure_sink: Arc<dyn FailureSink>,
    ) -> Self {
        let log = Self::with_failure_sink(config.buffer_size, failure_sink);
        log.initialize(config, version);
        log
    }

    /**
    Runs the start-up sequence.

    1. Resolves `config.flags` (`log_all` and `prof` switch on the categories they imply).
    2. If any category wants logging from the start, opens `config.logfile`.  Failing to open
       leaves the log disabled and is otherwise silent.
    3. If the log is now open, writes the version record.

    Call this once, before any record is written.
    */
    pub fn initialize(&self, config: &mut LogConfig, version: &Version) {
        config.flags.resolve();
        if !config.flags.log_at_start() {
            return;
        }
        if self.open(&config.logfile).is_err() {
            return;
        }
        self.log_version(version);
    }

    /// Opens the channel onto `destination`.
    pub fn open(&self, destination: &Destination) -> Result<(), ChannelError> {
        let mut shared = self.lock_shared();
        if shared.buffer.is_none() {
            return Err(ChannelError::Closed);
        }
        shared.channel.open(destination)?;
        self.enabled.store(true, Ordering::Release);
        Ok(())
    }

    /// Opens the channel onto a caller-supplied writer.
    pub fn open_writer(&self, writer: Box<dyn Write + Send>) -> Result<(), ChannelError> {
        let mut shared = self.lock_shared();
        if shared.buffer.is_none() {
            return Err(ChannelError::Closed);
        }
        shared.channel.open_writer(writer)?;
        self.enabled.store(true, Ordering::Release);
        Ok(())
    }

    /**
    Writes the version identification record:

    ```text
    v8-version,<major>,<minor>,<build>,<patch>,<candidate>
    v8-version,<major>,<minor>,<build>,<patch>,<embedder>,<candidate>
    ```

    where the second form is used when the version carries an embedder tag and `candidate` is
    `1` or `0`.
    */
    pub fn log_version(&self, version: &Version) {
        let mut msg = self.message();
        let candidate = u8::from(version.candidate);
        match version.embedder() {
            None => msg.append_fmt(format_args!(
                "v8-version,{},{},{},{},{}",
                version.major, version.minor, version.build, version.patch, candidate
            )),
            Some(embedder) => msg.append_fmt(format_args!(
                "v8-version,{},{},{},{},{},{}",
                version.major, version.minor, version.build, version.patch, embedder, candidate
            )),
        }
        msg.write_to_log_file();
    }

    /// Whether records are currently being written anywhere.
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /**
    Starts a record, blocking until no other record of this log is being built.

    Do not call this while holding another builder of the same log on the same thread; the
    lock is not reentrant.
    */
    pub fn message(&self) -> MessageBuilder<'_> {
        MessageBuilder::new(self)
    }

    /**
    Closes the log and frees its message buffer.

    Returns the temporary file, still open, if that was the destination.  Later records are
    discarded and the log cannot be reopened.
    */
    pub fn close(&self) -> Option<File> {
        let mut shared = self.lock_shared();
        self.enabled.store(false, Ordering::Release);
        shared.buffer = None;
        shared.channel.close()
    }

    pub(crate) fn lock_shared(&self) -> Guard<'_, Shared> {
        self.shared.lock_sync()
    }

    /// Disables the log after a failed write.  The caller holds the lock.
    pub(crate) fn stop_locked(&self, shared: &mut Shared) {
        shared.channel.stop();
        self.enabled.store(false, Ordering::Release);
    }

    /// Notifies the failure sink.  The caller must not hold the lock.
    pub(crate) fn report_failure(&self) {
        self.failure_sink.log_failure();
    }
}

impl std::fmt::Debug for Log {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Log")
            .field("enabled", &self.is_enabled())
            .field("failure_sink", &self.failure_sink)
            .finish_non_exhaustive()
    }
}

/*
Boilerplate notes.

Log owns a lock and a destination; Clone would mean two sessions sharing one file, so no.  Share
it with Arc or scoped threads instead.  Eq/Ord/Hash: no meaningful identity.  Default: a log
needs a failure policy and a buffer size, and `Log::new(MESSAGE_BUFFER_SIZE)` says so.
*/
