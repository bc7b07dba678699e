//! Compiler diagnostics
//!
//! Every stage of the pipeline reports into one shared [`DiagnosticSink`]
//! instead of returning errors: a fallible operation produces a diagnostic
//! plus a best-effort value and keeps going. Messages are kept in production
//! order and only removed by an explicit [`DiagnosticSink::clear`].
//!
//! The sink is owned by the caller and passed by `&mut` through each stage,
//! so repeated or parallel compilations of independent inputs never observe
//! each other's messages.

use crate::parser::ast::SourceLocation;
use std::fmt;

/// Diagnostic severity. Warnings never affect `has_errors`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "Error"),
            Severity::Warning => write!(f, "Warning"),
        }
    }
}

/// A single accumulated error or warning.
///
/// `location` is `None` when the message has no meaningful source position
/// (for example an unreadable input file).
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub location: Option<SourceLocation>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(loc) => write!(f, "{} ({}): {}", self.severity, loc, self.message),
            None => write!(f, "{}: {}", self.severity, self.message),
        }
    }
}

/// Accumulating sink for compiler messages.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    messages: Vec<Diagnostic>,
    error_count: usize,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report an error at a known source position.
    pub fn error_at(&mut self, location: SourceLocation, message: impl Into<String>) {
        self.push(Severity::Error, message.into(), Some(location));
    }

    /// Report an error with no source position.
    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Severity::Error, message.into(), None);
    }

    /// Report a warning at a known source position.
    pub fn warning_at(&mut self, location: SourceLocation, message: impl Into<String>) {
        self.push(Severity::Warning, message.into(), Some(location));
    }

    /// Report a warning with no source position.
    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Severity::Warning, message.into(), None);
    }

    fn push(&mut self, severity: Severity, message: String, location: Option<SourceLocation>) {
        if severity == Severity::Error {
            self.error_count += 1;
        }
        self.messages.push(Diagnostic {
            severity,
            message,
            location,
        });
    }

    /// True if at least one error (not warning) has been reported.
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    /// All accumulated messages, in production order.
    pub fn messages(&self) -> &[Diagnostic] {
        &self.messages
    }

    /// Drop every accumulated message and reset the error count.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.error_count = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_order_and_error_count() {
        let mut sink = DiagnosticSink::new();
        sink.warning("first");
        sink.error_at(SourceLocation::new(2, 7), "second");
        sink.error("third");

        assert!(sink.has_errors());
        assert_eq!(sink.error_count(), 2);
        let texts: Vec<String> = sink.messages().iter().map(|m| m.to_string()).collect();
        assert_eq!(texts[0], "Warning: first");
        assert_eq!(texts[1], "Error (2:7): second");
        assert_eq!(texts[2], "Error: third");
    }

    #[test]
    fn test_warnings_are_not_errors() {
        let mut sink = DiagnosticSink::new();
        sink.warning_at(SourceLocation::new(1, 1), "just a warning");
        assert!(!sink.has_errors());
        assert_eq!(sink.messages().len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut sink = DiagnosticSink::new();
        sink.error("boom");
        sink.clear();
        assert!(!sink.has_errors());
        assert!(sink.messages().is_empty());
    }
}
