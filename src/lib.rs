//! Initconf is the configuration and service-model core of an init system. It parses
//! a line-oriented directive file into a table of service descriptors, validates the
//! result, swaps it transactionally on reload and can patch single attribute values
//! in the source file without disturbing anything else.

/// CLI interface.
pub mod cli;

/// Constants and documented defaults.
pub mod constants;

/// Diagnostics and verdicts.
pub mod diagnostics;

/// Error handling.
pub mod error;

/// Service descriptors.
pub mod service;

/// Global settings.
pub mod settings;

/// Priority alias table.
pub mod alias;

/// Runlevel inheritance.
pub mod runlevel;

/// Service descriptor table and model queries.
pub mod table;

/// Priority collision resolution.
pub mod priority;

/// Directive grammar engine.
pub mod parser;

/// Integrity scanner.
pub mod integrity;

/// Load, reload and shutdown of the live model.
pub mod reload;

/// In-place attribute editor.
pub mod editor;
