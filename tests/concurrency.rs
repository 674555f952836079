// SPDX-License-Identifier: MIT OR Apache-2.0

//! Concurrent producers must never interleave partial records.

use runlog::{FlatString, InMemoryOutput, Log};
use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

const THREADS: usize = 8;
const RECORDS_PER_THREAD: usize = 200;

#[test]
fn concurrent_records_do_not_interleave() {
    let output = InMemoryOutput::new();
    let log = Arc::new(Log::new(256));
    log.open_writer(Box::new(output.clone())).unwrap();

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let log = log.clone();
            thread::spawn(move || {
                for i in 0..RECORDS_PER_THREAD {
                    let mut msg = log.message();
                    runlog::append!(msg, "thread,{},{}", t, i);
                    //build the rest a byte at a time to widen the window for interleaving
                    for c in b",payload" {
                        msg.append_char(*c);
                        thread::yield_now();
                    }
                    msg.append_char(b',');
                    msg.append_detailed(&FlatString::from("a,b"), false);
                    msg.write_to_log_file();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("producer thread panicked");
    }

    let text = output.drain();
    assert!(text.ends_with('\n'));
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), THREADS * RECORDS_PER_THREAD);

    let mut seen = HashSet::new();
    for line in lines {
        let fields: Vec<&str> = line.splitn(4, ',').collect();
        assert_eq!(fields.len(), 4, "malformed line {line:?}");
        assert_eq!(fields[0], "thread");
        assert_eq!(fields[3], "payload,a\\,b", "interleaved line {line:?}");
        let t: usize = fields[1].parse().unwrap();
        let i: usize = fields[2].parse().unwrap();
        assert!(seen.insert((t, i)), "duplicate line {line:?}");
    }
    assert_eq!(seen.len(), THREADS * RECORDS_PER_THREAD);
}

#[test]
fn scoped_threads_share_a_log() {
    let output = InMemoryOutput::new();
    let log = Log::new(64);
    log.open_writer(Box::new(output.clone())).unwrap();

    thread::scope(|scope| {
        for t in 0..4 {
            let log = &log;
            scope.spawn(move || {
                let mut msg = log.message();
                runlog::append!(msg, "scoped,{}", t);
                msg.write_to_log_file();
            });
        }
    });

    let mut lines: Vec<String> = output.drain().lines().map(str::to_owned).collect();
    lines.sort();
    assert_eq!(lines, ["scoped,0", "scoped,1", "scoped,2", "scoped,3"]);
}

#[test]
fn builder_released_on_panic() {
    let output = InMemoryOutput::new();
    let log = Arc::new(Log::new(64));
    log.open_writer(Box::new(output.clone())).unwrap();

    let panicking = log.clone();
    let result = thread::spawn(move || {
        let mut msg = panicking.message();
        msg.append_str("half");
        panic!("producer gave up mid-record");
    })
    .join();
    assert!(result.is_err());

    let mut msg = log.message();
    msg.append_str("after");
    msg.write_to_log_file();
    assert_eq!(output.drain(), "after\n");
}
