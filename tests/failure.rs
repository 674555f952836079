// SPDX-License-Identifier: MIT OR Apache-2.0

//! A destination that stops accepting bytes disables the log exactly once.

use runlog::{FailureSink, InMemoryOutput, Log};
use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Default)]
struct CountingSink {
    failures: AtomicUsize,
}

impl FailureSink for CountingSink {
    fn log_failure(&self) {
        self.failures.fetch_add(1, Ordering::SeqCst);
    }
}

/// A destination whose every write fails, like a closed pipe.
struct BrokenPipe;

impl Write for BrokenPipe {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "reader went away"))
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A destination that accepts at most one byte per call.
struct Trickle(InMemoryOutput);

impl Write for Trickle {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(&buf[..buf.len().min(1)])
    }
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn emit(log: &Log, text: &str) {
    let mut msg = log.message();
    msg.append_str(text);
    msg.write_to_log_file();
}

#[test]
fn full_destination_disables_log() {
    let sink = Arc::new(CountingSink::default());
    let log = Log::with_failure_sink(128, sink.clone());
    let output = InMemoryOutput::with_limit(12);
    log.open_writer(Box::new(output.clone())).unwrap();

    emit(&log, "first,ok");
    assert!(log.is_enabled());
    emit(&log, "second,cut");
    assert!(!log.is_enabled());
    assert_eq!(sink.failures.load(Ordering::SeqCst), 1);

    emit(&log, "third,never");
    emit(&log, "fourth,never");
    assert_eq!(sink.failures.load(Ordering::SeqCst), 1);
    assert_eq!(output.drain(), "first,ok\nsec");
}

#[test]
fn write_error_disables_log() {
    let sink = Arc::new(CountingSink::default());
    let log = Log::with_failure_sink(128, sink.clone());
    log.open_writer(Box::new(BrokenPipe)).unwrap();
    emit(&log, "lost");
    emit(&log, "lost again");
    assert!(!log.is_enabled());
    assert_eq!(sink.failures.load(Ordering::SeqCst), 1);
}

#[test]
fn short_os_writes_are_completed() {
    let sink = Arc::new(CountingSink::default());
    let log = Log::with_failure_sink(128, sink.clone());
    let output = InMemoryOutput::new();
    log.open_writer(Box::new(Trickle(output.clone()))).unwrap();
    emit(&log, "one,byte,at,a,time");
    assert!(log.is_enabled());
    assert_eq!(sink.failures.load(Ordering::SeqCst), 0);
    assert_eq!(output.drain(), "one,byte,at,a,time\n");
}

#[test]
fn unbuffered_writes_stop_with_the_log() {
    let sink = Arc::new(CountingSink::default());
    let log = Log::with_failure_sink(128, sink.clone());
    let output = InMemoryOutput::with_limit(2);
    log.open_writer(Box::new(output.clone())).unwrap();
    emit(&log, "too long");
    assert!(!log.is_enabled());

    let mut msg = log.message();
    msg.append_unbuffered(&runlog::FlatString::from("ignored"));
    msg.write_to_log_file();
    assert_eq!(output.drain(), "to");
    assert_eq!(sink.failures.load(Ordering::SeqCst), 1);
}

#[test]
fn concurrent_failure_notifies_once() {
    let sink = Arc::new(CountingSink::default());
    let log = Arc::new(Log::with_failure_sink(64, sink.clone()));
    log.open_writer(Box::new(InMemoryOutput::with_limit(100))).unwrap();
    std::thread::scope(|scope| {
        for t in 0..8 {
            let log = &log;
            scope.spawn(move || {
                for i in 0..50 {
                    let mut msg = log.message();
                    runlog::append!(msg, "burst,{},{}", t, i);
                    msg.write_to_log_file();
                }
            });
        }
    });
    assert!(!log.is_enabled());
    assert_eq!(sink.failures.load(Ordering::SeqCst), 1);
}
