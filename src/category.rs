// SPDX-License-Identifier: MIT OR Apache-2.0
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    /// Minimal logging, without the sampled categories below
    Log,
    /// Embedder API calls
    Api,
    /// Code creation, movement and deletion events
    Code,
    /// Heap statistics on garbage collection
    Gc,
    /// Suspect operations
    Suspect,
    /// Handle creation and deletion
    Handles,
    /// Internal timer events
    InternalTimerEvents,
    /// Function source code, logged alongside code events
    SourceCode,
    /// Inline cache state transitions
    TraceIc,
    /// Statistical profiling ticks
    Prof,
    /// Profiling ticks for native library code
    ProfCpp,
    /// Low-level profiling with code snapshots
    LlProf,
    /// Basic perf map output
    PerfBasicProf,
    /// Perf jitdump output
    PerfProf,
}

impl Category {
    /// Every category, in declaration order.
    pub const ALL: [Category; 14] = [
        Category::Log,
        Category::Api,
        Category::Code,
        Category::Gc,
        Category::Suspect,
        Category::Handles,
        Category::InternalTimerEvents,
        Category::SourceCode,
        Category::TraceIc,
        Category::Prof,
        Category::ProfCpp,
        Category::LlProf,
        Category::PerfBasicProf,
        Category::PerfProf,
    ];

    /// The categories switched on by `log_all`.
    pub const IMPLIED_BY_LOG_ALL: [Category; 6] = [
        Category::Api,
        Category::Code,
        Category::Gc,
        Category::Suspect,
        Category::Handles,
        Category::InternalTimerEvents,
    ];
}
