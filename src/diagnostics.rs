//! The diagnostics log: an append-only list of severity-tagged messages.
//!
//! Every recoverable anomaly — a rejected registration, a malformed line, a
//! literal that would not coerce, a value suppressed by priority — lands here
//! instead of aborting the parse. Entries are ordered by emission time and
//! partitioned by severity: errors (the call that produced them reported
//! failure) and warnings (the call carried on).
//!
//! Inspection ([`DiagnosticLog::iter`]) never clears; [`DiagnosticLog::drain`]
//! and [`DiagnosticLog::report`] remove the drained severity and leave the
//! other untouched.

use std::io::{self, Write};

use serde::Serialize;

/// Severity of a diagnostic entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// One entry in the diagnostics log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

/// Append-only, unbounded log of [`Diagnostic`] entries.
#[derive(Debug, Default)]
pub struct DiagnosticLog {
    entries: Vec<Diagnostic>,
}

impl DiagnosticLog {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn error(&mut self, message: impl Into<String>) {
        self.entries.push(Diagnostic {
            severity: Severity::Error,
            message: message.into(),
        });
    }

    pub(crate) fn warning(&mut self, message: impl Into<String>) {
        self.entries.push(Diagnostic {
            severity: Severity::Warning,
            message: message.into(),
        });
    }

    /// Entries of one severity, oldest first. Does not clear.
    pub fn iter(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.severity == severity)
    }

    /// Number of logged entries of one severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.iter(severity).count()
    }

    /// Remove and return all entries of one severity, oldest first.
    /// Entries of the other severity stay in the log, in order.
    pub fn drain(&mut self, severity: Severity) -> Vec<Diagnostic> {
        let mut drained = Vec::new();
        self.entries.retain(|d| {
            if d.severity == severity {
                drained.push(d.clone());
                false
            } else {
                true
            }
        });
        drained
    }

    /// Drain one severity to a sink, one line per entry, each prefixed with
    /// `prefix` (e.g. `"Error:"`). The drained entries are cleared even if
    /// the sink fails partway through.
    pub fn report<W: Write>(
        &mut self,
        severity: Severity,
        sink: &mut W,
        prefix: &str,
    ) -> io::Result<()> {
        for d in self.drain(severity) {
            writeln!(sink, "{prefix} {}", d.message)?;
        }
        Ok(())
    }
}
