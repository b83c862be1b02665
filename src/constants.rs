//! Constants and documented defaults for the configuration core.
//!
//! This module centralizes the magic numbers, markers and fallback values used by
//! the grammar engine, the integrity scanner and the attribute editor.

// ============================================================================
// Source File Constants
// ============================================================================

/// Default location of the configuration source when none is supplied.
pub const DEFAULT_CONFIG_PATH: &str = "/etc/epoch/epoch.conf";

/// Marker opening a multi-line comment. Only recognized at the start of a line.
pub const LONG_COMMENT_OPEN: &str = ">!>";

/// Marker closing a multi-line comment. Text after it on the same line is parsed.
pub const LONG_COMMENT_CLOSE: &str = "<!<";

/// Leading character of a full-line comment.
pub const LINE_COMMENT: char = '#';

// ============================================================================
// Size Limits
// ============================================================================

/// Line buffer size. Extracted values hold at most `MAX_LINE_SIZE - 1` bytes.
pub const MAX_LINE_SIZE: usize = 2048;

/// Field buffer size for identifiers, descriptions, banner text and runlevel names.
pub const MAX_DESCRIPT_SIZE: usize = 384;

/// Priority values with at least this many digits trigger a large-number warning.
pub const LARGE_PRIORITY_DIGITS: usize = 8;

/// Largest priority accepted from the source, leaving headroom for collision
/// resolution to raise values without overflowing.
pub const MAX_PRIORITY: u32 = 1_000_000_000;

/// Highest numeric signal accepted by the `TERMSIGNAL=` option.
pub const MAX_SIGNAL_NUMBER: i32 = 255;

// ============================================================================
// Directive Values
// ============================================================================

/// Boolean literal accepted by boolean directives.
pub const VALUE_TRUE: &str = "true";

/// Boolean literal accepted by boolean directives.
pub const VALUE_FALSE: &str = "false";

/// Explicit opt-out value for banner text and banner color.
pub const VALUE_NONE: &str = "NONE";

/// Prefix of the `Hostname` value that reads the hostname from a file.
pub const HOSTNAME_FROM_FILE: &str = "FILE";

/// Stop-command prefix: kill the pid recorded in the named file.
pub const STOP_PIDFILE: &str = "PIDFILE";

/// Stop-command prefix: kill the stored process id.
pub const STOP_PID: &str = "PID";

/// Stop-command prefix: no stop action at all.
pub const STOP_NONE: &str = "NONE";

/// Prefix of the option that overrides the termination signal.
pub const TERMSIGNAL_OPTION: &str = "TERMSIGNAL";

/// Marker appended to a start command to background it (legacy `NOWAIT`).
pub const BACKGROUND_MARKER: char = '&';

/// Description substituted for services that declare none.
pub const MISSING_DESCRIPTION: &str = "[missing description]";

// ============================================================================
// Documented Defaults
// ============================================================================

/// `DisableCAD` before any directive and after an invalid value.
pub const DEFAULT_DISABLE_CAD: bool = true;

/// `BlankLogOnBoot` before any directive and after an invalid value.
pub const DEFAULT_BLANK_LOG_ON_BOOT: bool = false;

/// `ShellEnabled` before any directive and after an invalid value.
pub const DEFAULT_SHELL_ENABLED: bool = true;

/// `EnableLogging` before any directive.
pub const DEFAULT_ENABLE_LOGGING: bool = true;

/// `EnableLogging` after an invalid value.
pub const FALLBACK_ENABLE_LOGGING: bool = false;

/// `AlignStatusReports` before any directive and after an invalid value.
pub const DEFAULT_ALIGN_STATUS_REPORTS: bool = false;
