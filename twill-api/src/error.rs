//! Unified error type for the one-shot entry points.
//!
//! Compilation itself never fails; diagnostics ride along inside the
//! result. The convenience API in the crate root turns a result that
//! carries errors into a [`TwillError`] so `?`-style callers get one
//! value to match on.

use thiserror::Error;

use twill_core::Diagnostic;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TwillError {
    #[error("template failed to compile with {count} error(s); first: {first}")]
    Template { count: usize, first: String },
}

impl TwillError {
    pub(crate) fn from_diagnostics(errors: &[Diagnostic]) -> Self {
        Self::Template {
            count: errors.len(),
            first: errors
                .first()
                .map(|d| d.message.clone())
                .unwrap_or_default(),
        }
    }
}
