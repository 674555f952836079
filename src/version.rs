// SPDX-License-Identifier: MIT OR Apache-2.0
use std::fmt::Display;

/**
Version metadata of the runtime being logged.

A session reads this once, at start-up, to write its identification record.
*/
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub build: u32,
    pub patch: u32,
    /// Tag identifying an embedder's fork; empty tags are treated as absent.
    pub embedder: Option<String>,
    /// Whether this is a pre-release candidate.
    pub candidate: bool,
}

impl Version {
    pub const fn new(major: u32, minor: u32, build: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            build,
            patch,
            embedder: None,
            candidate: false,
        }
    }

    pub fn with_embedder(mut self, embedder: impl Into<String>) -> Self {
        self.embedder = Some(embedder.into());
        self
    }

    pub fn with_candidate(mut self, candidate: bool) -> Self {
        self.candidate = candidate;
        self
    }

    /// The embedder tag, if it is present and non-empty.
    pub fn embedder(&self) -> Option<&str> {
        self.embedder.as_deref().filter(|e| !e.is_empty())
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.build)?;
        if self.patch != 0 {
            write!(f, ".{}", self.patch)?;
        }
        if let Some(embedder) = self.embedder() {
            f.write_str(embedder)?;
        }
        if self.candidate {
            f.write_str(" (candidate)")?;
        }
        Ok(())
    }
}
