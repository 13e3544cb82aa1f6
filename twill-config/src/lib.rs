//! Twill Config - Pure configuration data structures
//!
//! This crate contains only data structures, no logic or global state.
//! It serves as the shared configuration vocabulary across all Twill crates.

use serde::{Deserialize, Serialize};

/// Markers that open and close an interpolation inside template text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Delimiters {
    /// Opening marker, e.g. `{{`
    pub open: String,
    /// Closing marker, e.g. `}}`
    pub close: String,
}

impl Delimiters {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    /// A delimiter pair is usable when both markers are non-empty and distinct.
    pub fn is_valid(&self) -> bool {
        !self.open.is_empty() && !self.close.is_empty() && self.open != self.close
    }
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            open: "{{".to_string(),
            close: "}}".to_string(),
        }
    }
}

/// Configuration for per-compilation limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    /// Maximum element nesting depth the parser will descend
    pub max_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self { max_depth: 256 }
    }
}

/// Compilation phase enum for phase-specific log targets
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Parse,
    Optimize,
    Generate,
    Detect,
    Compile,
}

impl Phase {
    /// Get the string name of the phase
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Parse => "parse",
            Phase::Optimize => "optimize",
            Phase::Generate => "generate",
            Phase::Detect => "detect",
            Phase::Compile => "compile",
        }
    }

    /// Get the log target name for this phase.
    ///
    /// Instrumentation in the compiler crates emits under these targets,
    /// so subscribers can filter per phase.
    pub fn target(&self) -> String {
        format!("twill::{}", self.as_str())
    }

    /// All phases, in pipeline order.
    pub fn all() -> [Phase; 5] {
        [
            Phase::Parse,
            Phase::Optimize,
            Phase::Generate,
            Phase::Detect,
            Phase::Compile,
        ]
    }
}
