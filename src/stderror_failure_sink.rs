// SPDX-License-Identifier: MIT OR Apache-2.0
use crate::failure_sink::FailureSink;

/// The message reported when a log disables itself.
pub const LOG_FAILURE_MESSAGE: &str = "Logging failed; further log output is disabled.";

/**
A reference failure sink that reports to stderr.
 */
#[derive(Debug, Clone)]
pub struct StdErrorFailureSink {}

// ============================================================================
// BOILERPLATE TRAIT IMPLEMENTATIONS
// ============================================================================
//
// - Debug/Clone: derived, appropriate for zero-sized struct
// - Copy: implemented, zero-sized
// - PartialEq/Eq/Hash: all instances are equivalent
// - Default: implemented, zero-argument constructor
// - Display/From/Into: not implemented, nothing meaningful
// - Send/Sync: automatic

impl Copy for StdErrorFailureSink {}

impl PartialEq for StdErrorFailureSink {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for StdErrorFailureSink {}

impl std::hash::Hash for StdErrorFailureSink {
    fn hash<H: std::hash::Hasher>(&self, _state: &mut H) {}
}

impl Default for StdErrorFailureSink {
    fn default() -> Self {
        Self::new()
    }
}

impl StdErrorFailureSink {
    pub const fn new() -> Self {
        Self {}
    }
}

impl FailureSink for StdErrorFailureSink {
    fn log_failure(&self) {
        #[cfg(not(target_arch = "wasm32"))]
        {
            use std::io::Write;
            let mut lock = std::io::stderr().lock();
            //if stderr is gone too there is no one left to tell
            let _ = lock.write_all(LOG_FAILURE_MESSAGE.as_bytes());
            let _ = lock.write_all(b"\n");
        }
        #[cfg(target_arch = "wasm32")]
        {
            web_sys::console::error_1(&wasm_bindgen::JsValue::from_str(LOG_FAILURE_MESSAGE));
        }
    }
}
