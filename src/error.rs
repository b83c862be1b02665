//! Error handling for the configuration core.
use std::path::PathBuf;

use thiserror::Error;

use crate::service::Direction;

/// Errors that abort the parse pipeline or misuse the configuration manager.
///
/// Recoverable problems inside the source never surface here; they become
/// [`Diagnostic`](crate::diagnostics::Diagnostic)s instead.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The source file could not be stat'ed or read.
    #[error("Failed to read configuration file {}: {source}", path.display())]
    Read {
        /// The file that was requested.
        path: PathBuf,
        /// The underlying error that occurred.
        #[source]
        source: std::io::Error,
    },

    /// The source file exists but holds nothing to parse.
    #[error("Configuration file {} is empty or corrupted", path.display())]
    Empty {
        /// The offending file.
        path: PathBuf,
    },

    /// A reload or query was requested before any model was loaded.
    #[error("No configuration is loaded")]
    NotLoaded,
}

/// Errors raised by the in-place attribute editor. No partial write ever happens.
#[derive(Debug, Error)]
pub enum EditError {
    /// Error reading the source file.
    #[error("Failed to read configuration file: {0}")]
    Read(#[source] std::io::Error),

    /// Error writing the edited source back.
    #[error("Failed to write configuration file: {0}")]
    Write(#[source] std::io::Error),

    /// The source holds no text at all.
    #[error("Configuration file is empty")]
    Empty,

    /// No `ObjectID` line names the requested service.
    #[error("Service '{0}' not found in configuration")]
    ServiceNotFound(String),

    /// The service block has no such attribute before the next service begins.
    #[error("Service '{id}' has no attribute {attribute}")]
    AttributeNotFound {
        /// The service that was searched.
        id: String,
        /// The attribute keyword that was requested.
        attribute: String,
    },

    /// The new value would split the directive across lines.
    #[error("New value for {attribute} contains a line break")]
    MultiLineValue {
        /// The attribute keyword that was requested.
        attribute: String,
    },

    /// The matched line carries no delimiter, so its value cannot be located.
    #[error("Line {line} of the configuration is malformed and cannot be edited")]
    MalformedLine {
        /// One-based line number of the offending line.
        line: usize,
    },
}

/// A collision could not be resolved without pushing a priority past `u32::MAX`.
#[derive(Debug, Error)]
#[error("Cannot raise {direction:?} priority of service '{id}' any further while resolving collisions")]
pub struct PriorityOverflow {
    /// The service whose priority would have overflowed.
    pub id: String,
    /// Which priority was being resolved.
    pub direction: Direction,
}
