//! Diagnostic sink
//!
//! Every structural error or advisory warning the translator produces
//! flows through a `DiagnosticSink` rather than being printed directly.
//! This keeps the line matcher, state machine and emitter unit-testable
//! without capturing global logger state, and lets a library caller
//! collect diagnostics instead of letting them land on stderr.

use std::fmt;

/// Severity of a single diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// One reported diagnostic, always anchored to a source line.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub line: usize,
    pub message: String,
}

impl Diagnostic {
    pub fn error(line: usize, message: impl Into<String>) -> Self {
        Self { severity: Severity::Error, line, message: message.into() }
    }

    pub fn warning(line: usize, message: impl Into<String>) -> Self {
        Self { severity: Severity::Warning, line, message: message.into() }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{}:{}: {}", tag, self.line, self.message)
    }
}

/// Receives every diagnostic emitted while translating a file.
///
/// Implementations decide how (and whether) to surface a diagnostic;
/// they must always record it for `error_count`/`warning_count` so the
/// caller can decide the final exit status once the file has streamed.
pub trait DiagnosticSink {
    fn report(&mut self, diag: Diagnostic);

    fn error_count(&self) -> usize;

    fn warning_count(&self) -> usize;

    fn had_errors(&self) -> bool {
        self.error_count() > 0
    }
}

/// Default sink: forwards each diagnostic to the `log` facade at the
/// matching level and keeps a running tally.
#[derive(Debug, Default)]
pub struct LoggingSink {
    errors: usize,
    warnings: usize,
}

impl LoggingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DiagnosticSink for LoggingSink {
    fn report(&mut self, diag: Diagnostic) {
        match diag.severity {
            Severity::Error => {
                self.errors += 1;
                log::error!("{}", diag);
            }
            Severity::Warning => {
                self.warnings += 1;
                log::warn!("{}", diag);
            }
        }
    }

    fn error_count(&self) -> usize {
        self.errors
    }

    fn warning_count(&self) -> usize {
        self.warnings
    }
}

/// Sink that only records diagnostics, for tests that want to assert
/// on the exact set of errors/warnings without touching the logger.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub diagnostics: Vec<Diagnostic>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&mut self, diag: Diagnostic) {
        self.diagnostics.push(diag);
    }

    fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Error).count()
    }

    fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.severity == Severity::Warning).count()
    }
}
