//! Diagnostics produced while parsing and validating a configuration source.
//!
//! Every diagnostic is logged through `tracing` the moment it is recorded and is
//! also kept so the caller can inspect what happened after the fact.
use std::fmt;

use serde::Serialize;
use strum_macros::AsRefStr;
use tracing::{error, warn};

/// Aggregate severity of a parse-and-validate pass. Ordered `Ok < Warning < Fatal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, AsRefStr)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    /// Nothing worth reporting.
    #[default]
    Ok,
    /// The model is usable; problems were logged and possibly auto-corrected.
    Warning,
    /// The model must not be adopted.
    Fatal,
}

impl Verdict {
    /// True when a model carrying this verdict may be adopted.
    pub fn is_adoptable(self) -> bool {
        self != Verdict::Fatal
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Which stage of the pipeline raised a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Recoverable problem with a single source line.
    Parse,
    /// Whole-model validation finding.
    Integrity,
}

/// A single human-readable problem report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Severity of this single finding.
    pub severity: Verdict,
    /// Pipeline stage that produced it.
    pub kind: DiagnosticKind,
    /// One-based source line, when the finding is tied to one.
    pub line: Option<usize>,
    /// Short message suitable for a console or log line.
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}: line {}: {}", self.severity, line, self.message),
            None => write!(f, "{}: {}", self.severity, self.message),
        }
    }
}

/// Accumulates diagnostics in the order they were raised.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a recoverable problem with source line `line`.
    pub fn parse_warning(&mut self, line: usize, message: impl Into<String>) {
        self.push(Diagnostic {
            severity: Verdict::Warning,
            kind: DiagnosticKind::Parse,
            line: Some(line),
            message: message.into(),
        });
    }

    /// Records a recoverable problem not tied to a specific line.
    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Diagnostic {
            severity: Verdict::Warning,
            kind: DiagnosticKind::Parse,
            line: None,
            message: message.into(),
        });
    }

    /// Records an integrity finding of the given severity.
    pub fn integrity(&mut self, severity: Verdict, message: impl Into<String>) {
        self.push(Diagnostic {
            severity,
            kind: DiagnosticKind::Integrity,
            line: None,
            message: message.into(),
        });
    }

    fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Verdict::Fatal => error!(
                kind = diagnostic.kind.as_ref(),
                line = diagnostic.line,
                "{}",
                diagnostic.message
            ),
            _ => warn!(
                kind = diagnostic.kind.as_ref(),
                line = diagnostic.line,
                "{}",
                diagnostic.message
            ),
        }
        self.entries.push(diagnostic);
    }

    /// Worst severity recorded so far.
    pub fn verdict(&self) -> Verdict {
        self.entries
            .iter()
            .map(|d| d.severity)
            .max()
            .unwrap_or(Verdict::Ok)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends every diagnostic of `other` without logging them a second time.
    pub fn absorb(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.entries
    }
}

/// Outcome of a load or reload: the verdict plus every diagnostic behind it.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub verdict: Verdict,
    pub diagnostics: Vec<Diagnostic>,
}

impl Report {
    pub fn from_diagnostics(diagnostics: Diagnostics) -> Self {
        Self {
            verdict: diagnostics.verdict(),
            diagnostics: diagnostics.into_vec(),
        }
    }

    /// True when any diagnostic message contains `needle`.
    pub fn mentions(&self, needle: &str) -> bool {
        self.diagnostics.iter().any(|d| d.message.contains(needle))
    }
}
