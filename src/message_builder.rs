// SPDX-License-Identifier: MIT OR Apache-2.0

//! The message builder: one record, built in the session's shared buffer.
//!
//! # Design
//!
//! A [`Log`] owns a single fixed-capacity buffer.  Building a record means holding that buffer
//! exclusively, so [`Log::message`] blocks until no other [`MessageBuilder`] of the same log is
//! alive.  The builder tracks a cursor into the buffer; every append writes at the cursor and
//! advances it, and nothing ever writes past the end:
//!
//! - formatted appends that do not fit keep whatever prefix fit and pin the cursor to the end,
//!   so every later append of the same record is a cheap no-op;
//! - single characters are dropped once the buffer is full;
//! - raw byte segments are clipped to the room that is left.
//!
//! A truncated line is always preferred to a failed one.
//!
//! # Usage Pattern
//!
//! 1. Acquire a builder with [`Log::message`]
//! 2. Append fields with the `append_*` methods or the [`append!`](crate::append) macro
//! 3. Finish with [`MessageBuilder::write_to_log_file`], which terminates the line and writes it
//!
//! Dropping a builder without finishing it discards the record.
//!
//! # Example
//!
//! ```rust
//! use runlog::{FlatString, InMemoryOutput, Log};
//!
//! let output = InMemoryOutput::new();
//! let log = Log::new(256);
//! log.open_writer(Box::new(output.clone())).unwrap();
//!
//! let mut msg = log.message();
//! msg.append_str("code-creation,");
//! msg.append_detailed(&FlatString::from("a,b"), false);
//! msg.append_char(b',');
//! msg.append_address(0x1f40);
//! msg.write_to_log_file();
//!
//! assert_eq!(output.drain(), "code-creation,a\\,b,0x1f40\n");
//! ```

use crate::log::{Log, Shared};
use crate::strings::{LogString, LogSymbol};
use std::fmt::{self, Debug};
use wasm_safe_mutex::Guard;

/// Strings longer than this many code units are cut off by [`MessageBuilder::append_detailed`].
pub const MAX_DETAILED_LENGTH: usize = 0x1000;

/// Appends a formatted fragment to a [`MessageBuilder`].
///
/// `append!(msg, "{},{}", a, b)` is shorthand for
/// `msg.append_fmt(format_args!("{},{}", a, b))`.
#[macro_export]
macro_rules! append {
    ($builder:expr, $($arg:tt)*) => {
        $builder.append_fmt(::std::format_args!($($arg)*))
    };
}

/// A `fmt::Write` over a fixed slice that keeps the prefix that fits and reports the rest.
struct BoundedWriter<'b> {
    buf: &'b mut [u8],
    len: usize,
    truncated: bool,
}

impl<'b> BoundedWriter<'b> {
    fn new(buf: &'b mut [u8]) -> Self {
        Self {
            buf,
            len: 0,
            truncated: false,
        }
    }
}

impl fmt::Write for BoundedWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = self.buf.len() - self.len;
        let n = room.min(s.len());
        self.buf[self.len..self.len + n].copy_from_slice(&s.as_bytes()[..n]);
        self.len += n;
        if n < s.len() {
            self.truncated = true;
            Err(fmt::Error)
        } else {
            Ok(())
        }
    }
}

/**
Exclusive access to a log's shared buffer, for building one record.

See the [module documentation](self).
*/
pub struct MessageBuilder<'a> {
    log: &'a Log,
    guard: Guard<'a, Shared>,
    pos: usize,
}

impl<'a> MessageBuilder<'a> {
    pub(crate) fn new(log: &'a Log) -> Self {
        let guard = log.lock_shared();
        Self { log, guard, pos: 0 }
    }

    /// The buffer capacity, or 0 once the log has been closed.
    pub fn capacity(&self) -> usize {
        self.guard.buffer.as_ref().map_or(0, |buffer| buffer.len())
    }

    /// Bytes accumulated so far.
    pub fn len(&self) -> usize {
        self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos == 0
    }

    /// The record accumulated so far.
    pub fn as_bytes(&self) -> &[u8] {
        self.guard
            .buffer
            .as_deref()
            .map_or(&[][..], |buffer| &buffer[..self.pos])
    }

    /**
    Renders a formatted fragment at the cursor.

    If the fragment does not fit, the part that fits is kept and the cursor is pinned to the
    capacity, so the rest of the record is dropped.  A `Display` impl that fails on its own
    keeps whatever it wrote before failing.
    */
    pub fn append_fmt(&mut self, args: fmt::Arguments<'_>) {
        let pos = self.pos;
        let Some(buffer) = self.guard.buffer.as_deref_mut() else {
            return;
        };
        let capacity = buffer.len();
        let mut tail = BoundedWriter::new(&mut buffer[pos..]);
        // only truncation pins; bytes past `tail.len` belong to an earlier record
        if fmt::write(&mut tail, args).is_err() && tail.truncated {
            self.pos = capacity;
        } else {
            self.pos += tail.len;
        }
        debug_assert!(self.pos <= capacity);
    }

    /// Appends `s` with the same all-or-pinned behavior as [`MessageBuilder::append_fmt`].
    pub fn append_str(&mut self, s: &str) {
        self.append_fmt(format_args!("{}", s));
    }

    /// Appends one byte, or nothing if the buffer is full.
    pub fn append_char(&mut self, c: u8) {
        let pos = self.pos;
        let Some(buffer) = self.guard.buffer.as_deref_mut() else {
            return;
        };
        if pos < buffer.len() {
            buffer[pos] = c;
            self.pos += 1;
        }
    }

    /// Appends `s` in double quotes, with every embedded `"` escaped as `\"`.
    pub fn append_double_quoted(&mut self, s: &str) {
        self.append_char(b'"');
        for &byte in s.as_bytes() {
            if byte == b'"' {
                self.append_char(b'\\');
            }
            self.append_char(byte);
        }
        self.append_char(b'"');
    }

    /**
    Copies the first `length` bytes of `text`, clipped to the room left in the buffer.

    `length` must not exceed `text.len()`.
    */
    pub fn append_string_part(&mut self, text: &[u8], length: usize) {
        debug_assert!(length <= text.len());
        let mut len = length.min(text.len());
        let pos = self.pos;
        let Some(buffer) = self.guard.buffer.as_deref_mut() else {
            return;
        };
        if pos + len > buffer.len() {
            len = buffer.len() - pos;
            if len == 0 {
                return;
            }
        }
        buffer[pos..pos + len].copy_from_slice(&text[..len]);
        self.pos += len;
    }

    /// Appends a pointer-sized value as `0x`-prefixed lowercase hex.
    pub fn append_address(&mut self, address: usize) {
        self.append_fmt(format_args!("0x{:x}", address));
    }

    /// Appends `symbol("<name>" hash <hex>)`, leaving out the name when it is undefined.
    pub fn append_symbol_name<S: LogSymbol + ?Sized>(&mut self, symbol: &S) {
        self.append_str("symbol(");
        if let Some(name) = symbol.name() {
            self.append_str("\"");
            self.append_detailed(name, false);
            self.append_str("\" ");
        }
        self.append_fmt(format_args!("hash {:x})", symbol.hash()));
    }

    /// Appends each code unit truncated to a byte, without escaping.
    ///
    /// Only suitable for strings known to be plain ASCII.
    pub fn append_string<S: LogString + ?Sized>(&mut self, s: &S) {
        for i in 0..s.length() {
            self.append_char(s.get(i) as u8);
        }
    }

    /**
    Appends `s` in the detailed encoding.

    At most [`MAX_DETAILED_LENGTH`] code units are encoded.  With `show_impl_info` the text is
    prefixed by the representation (`a` one-byte, `2` two-byte), `e` if external, `#` if
    interned, and `:<length>:` with the full length.

    | code unit                 | output     |
    |---------------------------|------------|
    | above `0xff`              | `\uXXXX`   |
    | below `0x20`, above `0x7e`| `\xXX`     |
    | `,`                       | `\,`       |
    | `\`                       | `\\`       |
    | `"`                       | `""`       |
    | anything else             | itself     |
    */
    pub fn append_detailed<S: LogString + ?Sized>(&mut self, s: &S, show_impl_info: bool) {
        let len = s.length().min(MAX_DETAILED_LENGTH);
        if show_impl_info {
            self.append_char(if s.is_one_byte() { b'a' } else { b'2' });
            if s.is_external() {
                self.append_char(b'e');
            }
            if s.is_internalized() {
                self.append_char(b'#');
            }
            self.append_fmt(format_args!(":{}:", s.length()));
        }
        for i in 0..len {
            let c = s.get(i);
            if c > 0xff {
                self.append_fmt(format_args!("\\u{:04x}", c));
            } else if !(0x20..=0x7e).contains(&c) {
                self.append_fmt(format_args!("\\x{:02x}", c));
            } else if c == u32::from(b',') {
                self.append_str("\\,");
            } else if c == u32::from(b'\\') {
                self.append_str("\\\\");
            } else if c == u32::from(b'"') {
                self.append_str("\"\"");
            } else {
                self.append_char(c as u8);
            }
        }
    }

    /**
    Writes `s` straight to the log's destination, bypassing the buffer.

    For strings whose encoded size cannot be bounded up front.  Printable ASCII is written as-is
    except `"` (doubled) and `\` (doubled); code units above `0xff` become `\uXXXX` and all other
    non-printable ones `\xXX`.  Commas are not escaped.  There is no length cap and write
    results are not checked; the next [`MessageBuilder::write_to_log_file`] reports a failing
    destination.

    The bytes reach the destination immediately, ahead of anything still in the buffer.
    */
    pub fn append_unbuffered<S: LogString + ?Sized>(&mut self, s: &S) {
        let channel = &mut self.guard.channel;
        let mut scratch = [0u8; 16];
        for i in 0..s.length() {
            let c = s.get(i);
            if (0x20..=0x7e).contains(&c) {
                if c == u32::from(b'"') {
                    channel.write(b"\"\"");
                } else if c == u32::from(b'\\') {
                    channel.write(b"\\\\");
                } else {
                    channel.write(&[c as u8]);
                }
                continue;
            }
            let mut token = BoundedWriter::new(&mut scratch);
            let rendered = if c > 0xff {
                fmt::write(&mut token, format_args!("\\u{:04x}", c))
            } else {
                fmt::write(&mut token, format_args!("\\x{:02x}", c))
            };
            // a u32 escape is at most 10 bytes, so the scratch never truncates
            if rendered.is_ok() {
                let len = token.len;
                channel.write(&scratch[..len]);
            }
        }
    }

    /**
    Terminates the record and writes it to the log's destination in a single write.

    Does nothing if the log is disabled.  When the buffer is full the last byte is given up for
    the terminator.  If the destination accepts fewer bytes than the record holds, the log is
    permanently disabled and its failure sink notified, after the buffer has been released.
    */
    pub fn write_to_log_file(self) {
        let MessageBuilder {
            log,
            mut guard,
            mut pos,
        } = self;
        let shared: &mut Shared = &mut guard;
        if !shared.channel.is_enabled() {
            return;
        }
        let Some(buffer) = shared.buffer.as_deref_mut() else {
            return;
        };
        debug_assert!(pos <= buffer.len());
        debug_assert!(
            pos == 0 || buffer[pos - 1] != b'\n',
            "record already ends in a line terminator"
        );
        if pos == buffer.len() {
            pos -= 1;
        }
        buffer[pos] = b'\n';
        pos += 1;
        let written = shared.channel.write(&buffer[..pos]);
        if written != pos {
            log.stop_locked(shared);
            drop(guard);
            log.report_failure();
        }
    }
}

impl Debug for MessageBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageBuilder")
            .field("pos", &self.pos)
            .field("capacity", &self.capacity())
            .finish()
    }
}

/*
Boilerplate notes.

MessageBuilder holds a lock, so Clone/Copy/Default are out.  Eq/Ord/Hash are meaningless for a
scope.  Send follows the guard.  Debug shows the cursor only; the buffer tail is garbage.
*/

#[cfg(test)]
mod tests {
    use crate::{FlatString, InMemoryOutput, Log, Symbol};

    fn log_with(capacity: usize) -> (Log, InMemoryOutput) {
        let output = InMemoryOutput::new();
        let log = Log::new(capacity);
        log.open_writer(Box::new(output.clone())).unwrap();
        (log, output)
    }

    fn render(capacity: usize, build: impl FnOnce(&mut super::MessageBuilder<'_>)) -> String {
        let (log, output) = log_with(capacity);
        let mut msg = log.message();
        build(&mut msg);
        msg.write_to_log_file();
        output.drain()
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn formatted_fields() {
        let line = render(64, |msg| {
            crate::append!(msg, "{},{},{}", "tick", 7, -1);
        });
        assert_eq!(line, "tick,7,-1\n");
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn formatted_overflow_pins_cursor() {
        let (log, _output) = log_with(8);
        let mut msg = log.message();
        msg.append_str("abc");
        msg.append_str("defghijk");
        assert_eq!(msg.len(), 8);
        assert_eq!(msg.as_bytes(), b"abcdefgh");
        msg.append_char(b'z');
        msg.append_str("z");
        assert_eq!(msg.len(), 8);
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn failing_display_keeps_only_what_it_wrote() {
        struct Failing;
        impl std::fmt::Display for Failing {
            fn fmt(&self, _f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                Err(std::fmt::Error)
            }
        }

        let (log, output) = log_with(32);
        {
            let mut msg = log.message();
            msg.append_str("SECRET-previous-record-contents");
            assert_eq!(msg.len(), 31);
        }
        let mut msg = log.message();
        crate::append!(msg, "x,{}", Failing);
        assert_eq!(msg.as_bytes(), b"x,");
        msg.write_to_log_file();
        assert_eq!(output.drain(), "x,\n");
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn truncated_line_keeps_prefix_and_terminator() {
        let line = render(8, |msg| msg.append_str("0123456789"));
        assert_eq!(line, "0123456\n");
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn exact_fit_gives_up_last_byte() {
        let line = render(4, |msg| msg.append_str("abcd"));
        assert_eq!(line, "abc\n");
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn char_overflow_is_ignored() {
        let (log, _output) = log_with(2);
        let mut msg = log.message();
        for c in b"xyz" {
            msg.append_char(*c);
        }
        assert_eq!(msg.as_bytes(), b"xy");
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn string_part_is_clipped() {
        let (log, _output) = log_with(6);
        let mut msg = log.message();
        msg.append_string_part(b"abcdef", 4);
        assert_eq!(msg.as_bytes(), b"abcd");
        msg.append_string_part(b"123456", 6);
        assert_eq!(msg.as_bytes(), b"abcd12");
        msg.append_string_part(b"!", 1);
        assert_eq!(msg.len(), 6);
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn double_quoted() {
        let line = render(64, |msg| msg.append_double_quoted(r#"say "hi""#));
        assert_eq!(line, "\"say \\\"hi\\\"\"\n");
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn address() {
        let line = render(64, |msg| msg.append_address(0xdead_beef));
        assert_eq!(line, "0xdeadbeef\n");
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn symbol_with_and_without_name() {
        let line = render(64, |msg| {
            msg.append_symbol_name(&Symbol::new(Some(FlatString::from("a,b")), 0x2a));
        });
        assert_eq!(line, "symbol(\"a\\,b\" hash 2a)\n");
        let line = render(64, |msg| msg.append_symbol_name(&Symbol::new(None, 255)));
        assert_eq!(line, "symbol(hash ff)\n");
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn plain_string_casts_code_units() {
        let line = render(64, |msg| msg.append_string(&FlatString::from("ok,\"x\"")));
        assert_eq!(line, "ok,\"x\"\n");
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn detailed_escapes() {
        let line = render(128, |msg| {
            msg.append_detailed(&FlatString::from("a,b\\c\"d\u{3c0}e\te\u{e9}"), false);
        });
        assert_eq!(line, "a\\,b\\\\c\"\"d\\u03c0e\\x09e\\xe9\n");
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn detailed_impl_info() {
        let line = render(64, |msg| {
            msg.append_detailed(&FlatString::from("hi").internalized(), true);
        });
        assert_eq!(line, "a#:2:hi\n");
        let line = render(64, |msg| {
            msg.append_detailed(&FlatString::from("\u{3c0}").external(), true);
        });
        assert_eq!(line, "2e:1:\\u03c0\n");
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn detailed_is_capped() {
        let text = "x".repeat(5000);
        let line = render(8192, |msg| {
            msg.append_detailed(&FlatString::from(text.as_str()), true);
        });
        assert_eq!(line, format!("a:5000:{}\n", "x".repeat(4096)));
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn unbuffered_goes_straight_to_destination() {
        let (log, output) = log_with(64);
        let mut msg = log.message();
        msg.append_str("buffered");
        msg.append_unbuffered(&FlatString::from("a,\"b\\\u{1}\u{20ac}"));
        assert_eq!(output.drain(), "a,\"\"b\\\\\\x01\\u20ac");
        msg.write_to_log_file();
        assert_eq!(output.drain(), "buffered\n");
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn dropped_builder_writes_nothing() {
        let (log, output) = log_with(64);
        {
            let mut msg = log.message();
            msg.append_str("discarded");
        }
        let mut msg = log.message();
        assert!(msg.is_empty());
        msg.append_str("kept");
        msg.write_to_log_file();
        assert_eq!(output.drain(), "kept\n");
    }

    #[cfg_attr(not(target_arch = "wasm32"), test)]
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen_test::wasm_bindgen_test)]
    fn empty_record_is_a_bare_terminator() {
        let line = render(4, |_| {});
        assert_eq!(line, "\n");
    }
}
