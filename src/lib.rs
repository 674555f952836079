//SPDX-License-Identifier: MIT OR Apache-2.0
/*!
# runlog

runlog writes a runtime's internal events as a log of single-line text records.

# The format

Every record is one line of comma-separated fields ending in a single `\n`:

```text
v8-version,7,2,1,0,0
code-creation,LazyCompile,0x1f40,"foo\,bar"
```

Fields that may contain arbitrary text use the *detailed encoding*: commas and backslashes are
backslash-escaped, double quotes are doubled, and anything outside printable ASCII becomes a
`\xXX` or `\uXXXX` escape.  A record therefore never contains a raw newline, and a reader can
split lines and fields without a real parser.

# The problem

Logging from inside a runtime has a few awkward constraints:

* Many threads emit records at once, and a half-written line from one of them must never end up
  in the middle of another's.
* Logging must never crash the host.  A record that does not fit is truncated, a destination
  that cannot be opened silently turns the log off, and a destination that stops accepting
  writes turns it off for good.
* Building a record should not allocate.

# The implementation

A [`Log`] owns one fixed-size message buffer.  To write a record, take a [`MessageBuilder`]
from [`Log::message`]; it holds the buffer exclusively until it is dropped, so records are
built one at a time.  Append fields, then call [`MessageBuilder::write_to_log_file`], which
terminates the line and writes it to the [`Channel`](channel::Channel) in a single write.

```rust
use runlog::{FlatString, InMemoryOutput, Log};

let output = InMemoryOutput::new();
let log = Log::new(runlog::MESSAGE_BUFFER_SIZE);
log.open_writer(Box::new(output.clone())).unwrap();

let mut msg = log.message();
runlog::append!(msg, "code-creation,{},", "LazyCompile");
msg.append_address(0x1f40);
msg.append_char(b',');
msg.append_detailed(&FlatString::from("foo,bar"), false);
msg.write_to_log_file();

assert_eq!(output.drain(), "code-creation,LazyCompile,0x1f40,foo\\,bar\n");
```

Strings too long to buffer can be written with [`MessageBuilder::append_unbuffered`], which
encodes straight to the destination.

# Destinations

A log writes to the console (`-`), an anonymous temporary file (`&`) that is handed back on
[`Log::close`], a named file, or any `std::io::Write` passed to [`Log::open_writer`].  See
[`LogConfig`] for the start-up configuration and [`Log::initialize`] for the start-up sequence.

# Failure

If a destination accepts fewer bytes than a record holds, the log disables itself and notifies
its [`FailureSink`].  Writes are never retried.

# Multithreading

`Log` is `Sync`; share it with `Arc` or scoped threads.  Builders block while another builder of
the same log is alive, so do not hold one across anything slow, and never take a second one on
the same thread.
*/

mod category;
pub mod channel;
mod config;
mod failure_sink;
mod inmemory_output;
mod log;
mod message_builder;
mod platform;
mod stderror_failure_sink;
mod strings;
mod version;

pub use category::Category;
pub use channel::ChannelError;
pub use config::{
    DEFAULT_LOGFILE, Destination, LOG_TO_CONSOLE, LOG_TO_TEMPORARY_FILE, LogConfig, LogFlags,
    MESSAGE_BUFFER_SIZE,
};
pub use failure_sink::FailureSink;
pub use inmemory_output::InMemoryOutput;
pub use log::Log;
pub use message_builder::{MAX_DETAILED_LENGTH, MessageBuilder};
pub use stderror_failure_sink::{LOG_FAILURE_MESSAGE, StdErrorFailureSink};
pub use strings::{FlatString, LogString, LogSymbol, Symbol};
pub use version::Version;
