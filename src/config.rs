// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session configuration.
//!
//! Parsing command lines or environment variables into these types is left to the embedder;
//! this module only defines what a [`Log`](crate::Log) consumes at start-up:
//!
//! * a [`Destination`], usually parsed from a single string where `-` means the console and
//!   `&` means an anonymous temporary file,
//! * a set of [`LogFlags`], one switch per [`Category`] plus the `log_all` umbrella switch,
//! * the size of the shared message buffer.
//!
//! ```
//! use runlog::{Category, Destination, LogConfig};
//!
//! let mut config = LogConfig::default();
//! config.logfile = "-".parse().unwrap();
//! config.flags.prof = true;
//! config.flags.resolve();
//!
//! assert_eq!(config.logfile, Destination::Console);
//! assert!(config.flags.is_enabled(Category::Code));
//! assert!(config.flags.log_at_start());
//! ```

use crate::category::Category;
use std::convert::Infallible;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

/// Default capacity of the shared message buffer, in bytes.
pub const MESSAGE_BUFFER_SIZE: usize = 2048;

/// Destination string selecting the console.
pub const LOG_TO_CONSOLE: &str = "-";
/// Destination string selecting an anonymous temporary file.
pub const LOG_TO_TEMPORARY_FILE: &str = "&";
/// Destination used when none is configured.
pub const DEFAULT_LOGFILE: &str = "v8.log";

/// Where a session writes its records.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Destination {
    Console,
    TemporaryFile,
    File(PathBuf),
}

impl Default for Destination {
    fn default() -> Self {
        Destination::File(PathBuf::from(DEFAULT_LOGFILE))
    }
}

impl FromStr for Destination {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            LOG_TO_CONSOLE => Destination::Console,
            LOG_TO_TEMPORARY_FILE => Destination::TemporaryFile,
            path => Destination::File(PathBuf::from(path)),
        })
    }
}

impl From<&str> for Destination {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(destination) => destination,
            Err(never) => match never {},
        }
    }
}

impl Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Destination::Console => f.write_str(LOG_TO_CONSOLE),
            Destination::TemporaryFile => f.write_str(LOG_TO_TEMPORARY_FILE),
            Destination::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/**
Which categories of records are wanted.

Flags are set individually and then [resolved](LogFlags::resolve) once, which applies the
implications between them.  Only after resolution is [`LogFlags::log_at_start`] meaningful.
*/
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LogFlags {
    /// Turns on every sampled category.
    pub log_all: bool,
    pub log: bool,
    pub log_api: bool,
    pub log_code: bool,
    pub log_gc: bool,
    pub log_suspect: bool,
    pub log_handles: bool,
    pub log_internal_timer_events: bool,
    pub log_source_code: bool,
    pub trace_ic: bool,
    /// Statistical profiling; implies `log_code`.
    pub prof: bool,
    pub prof_cpp: bool,
    pub ll_prof: bool,
    pub perf_basic_prof: bool,
    pub perf_prof: bool,
}

impl LogFlags {
    fn slot(&mut self, category: Category) -> &mut bool {
        match category {
            Category::Log => &mut self.log,
            Category::Api => &mut self.log_api,
            Category::Code => &mut self.log_code,
            Category::Gc => &mut self.log_gc,
            Category::Suspect => &mut self.log_suspect,
            Category::Handles => &mut self.log_handles,
            Category::InternalTimerEvents => &mut self.log_internal_timer_events,
            Category::SourceCode => &mut self.log_source_code,
            Category::TraceIc => &mut self.trace_ic,
            Category::Prof => &mut self.prof,
            Category::ProfCpp => &mut self.prof_cpp,
            Category::LlProf => &mut self.ll_prof,
            Category::PerfBasicProf => &mut self.perf_basic_prof,
            Category::PerfProf => &mut self.perf_prof,
        }
    }

    pub fn is_enabled(&self, category: Category) -> bool {
        match category {
            Category::Log => self.log,
            Category::Api => self.log_api,
            Category::Code => self.log_code,
            Category::Gc => self.log_gc,
            Category::Suspect => self.log_suspect,
            Category::Handles => self.log_handles,
            Category::InternalTimerEvents => self.log_internal_timer_events,
            Category::SourceCode => self.log_source_code,
            Category::TraceIc => self.trace_ic,
            Category::Prof => self.prof,
            Category::ProfCpp => self.prof_cpp,
            Category::LlProf => self.ll_prof,
            Category::PerfBasicProf => self.perf_basic_prof,
            Category::PerfProf => self.perf_prof,
        }
    }

    pub fn enable(&mut self, category: Category) {
        *self.slot(category) = true;
    }

    /**
    Applies the implications between flags.

    `log_all` turns on every category in [`Category::IMPLIED_BY_LOG_ALL`], and `prof` turns on
    [`Category::Code`].  Resolving twice is harmless.
    */
    pub fn resolve(&mut self) {
        if self.log_all {
            for category in Category::IMPLIED_BY_LOG_ALL {
                self.enable(category);
            }
        }
        if self.prof {
            self.enable(Category::Code);
        }
    }

    /// Whether any resolved category needs the log open from the start.
    pub fn log_at_start(&self) -> bool {
        Category::ALL.iter().any(|&category| self.is_enabled(category))
    }
}

/// Everything a [`Log`](crate::Log) reads at start-up.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LogConfig {
    pub logfile: Destination,
    pub flags: LogFlags,
    /// Capacity of the shared message buffer; records longer than this are truncated.
    pub buffer_size: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            logfile: Destination::default(),
            flags: LogFlags::default(),
            buffer_size: MESSAGE_BUFFER_SIZE,
        }
    }
}

/*
Boilerplate notes.

Destination: Clone/Eq/Hash are natural for a plain selector.  Default is the conventional log
file.  Display round-trips through FromStr.  Ord makes no sense.

LogFlags: Default is "nothing enabled".  Copy was avoided so flags can grow non-bool fields.

LogConfig: Default pairs the default destination with the default buffer size.
*/
