//SPDX-License-Identifier: MIT OR Apache-2.0
use std::fmt::Debug;

pub trait FailureSink: Debug + Send + Sync {
    /**
        Called once when a record could not be written in full.

        By the time this runs the log has already disabled itself and released its buffer, so
        implementations may log elsewhere (or even to the same [crate::Log], which will ignore
        them).
    */
    fn log_failure(&self);
}

/*
Boilerplate notes.

# FailureSink

Same reasoning as for a logger: no Clone, no Eq, no Default (who knows what the sink needs), and
Send/Sync because any thread may be the one whose write fails.
*/
