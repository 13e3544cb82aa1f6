//! Compile diagnostics.
//!
//! Template problems are values collected per compile call, never `Err`s:
//! a broken template still produces a result, it just carries diagnostics.
//! The sink is passed explicitly through every pipeline stage so there is
//! exactly one place diagnostics accumulate and exactly one ordering.

use serde::Serialize;

/// Half-open byte range into the original template string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn shifted(self, by: usize) -> Self {
        Self {
            start: self.start + by,
            end: self.end + by,
        }
    }
}

/// One reported problem or advisory notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub message: String,
    /// Present only when source ranges were requested for the compile call.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

/// Two-tier severity: errors describe templates that will not behave as
/// written, tips are advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Tip,
}

/// Collects diagnostics for one compile call.
///
/// Pipeline stages record spans relative to the trimmed template; the sink
/// shifts them back into original-template coordinates using the leading
/// whitespace length recorded before trimming. When source ranges are not
/// requested, spans are dropped at the door.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    with_spans: bool,
    leading_offset: usize,
    errors: Vec<Diagnostic>,
    tips: Vec<Diagnostic>,
}

impl DiagnosticSink {
    pub fn new(with_spans: bool) -> Self {
        Self {
            with_spans,
            ..Default::default()
        }
    }

    /// Record how much leading whitespace the compile entry trimmed away.
    pub fn with_leading_offset(mut self, offset: usize) -> Self {
        self.leading_offset = offset;
        self
    }

    pub fn report(&mut self, severity: Severity, message: impl Into<String>, span: Option<Span>) {
        let span = if self.with_spans {
            span.map(|s| s.shifted(self.leading_offset))
        } else {
            None
        };
        let diagnostic = Diagnostic {
            message: message.into(),
            span,
        };
        match severity {
            Severity::Error => self.errors.push(diagnostic),
            Severity::Tip => self.tips.push(diagnostic),
        }
    }

    pub fn error(&mut self, message: impl Into<String>, span: Option<Span>) {
        self.report(Severity::Error, message, span);
    }

    pub fn tip(&mut self, message: impl Into<String>, span: Option<Span>) {
        self.report(Severity::Tip, message, span);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn tip_count(&self) -> usize {
        self.tips.len()
    }

    /// Consume the sink, yielding `(errors, tips)` in report order.
    pub fn into_parts(self) -> (Vec<Diagnostic>, Vec<Diagnostic>) {
        (self.errors, self.tips)
    }
}
