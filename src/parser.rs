//! Directive grammar engine.
//!
//! The source is a line-oriented file with one `Keyword value` directive per line.
//! Every malformed line is recoverable: it is reported, a safe default is applied
//! and parsing continues with the next line. Only an unreadable or empty source
//! aborts the pipeline, and that is decided before parsing starts.
use std::{fs, path::Path, str::FromStr};

use nix::sys::signal::Signal;
use strum::IntoEnumIterator;
use strum_macros::{EnumIter, EnumString, IntoStaticStr};
use thiserror::Error;
use tracing::debug;

use crate::{
    alias::PriorityAliases,
    constants::{
        DEFAULT_ALIGN_STATUS_REPORTS, DEFAULT_BLANK_LOG_ON_BOOT, DEFAULT_DISABLE_CAD,
        DEFAULT_SHELL_ENABLED, FALLBACK_ENABLE_LOGGING, HOSTNAME_FROM_FILE,
        LARGE_PRIORITY_DIGITS, LINE_COMMENT, MAX_PRIORITY, LONG_COMMENT_CLOSE, LONG_COMMENT_OPEN,
        MAX_DESCRIPT_SIZE, MAX_LINE_SIZE, MAX_SIGNAL_NUMBER, STOP_NONE, STOP_PID,
        STOP_PIDFILE, TERMSIGNAL_OPTION, VALUE_FALSE, VALUE_NONE, VALUE_TRUE,
    },
    diagnostics::Diagnostics,
    error::ConfigError,
    priority::{compile_no_wait, resolve_collisions},
    service::{Direction, Enabled, ServiceDescriptor, StopMode},
    settings::{BannerColor, GlobalSettings, MountChoice, VirtualFs},
    table::Model,
};

/// Attribute keywords in match order. A line is dispatched to the first keyword
/// it starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, EnumString, IntoStaticStr)]
pub enum Directive {
    #[strum(serialize = "DisableCAD")]
    DisableCad,
    BlankLogOnBoot,
    ShellEnabled,
    EnableLogging,
    RunlevelInherits,
    DefinePriority,
    AlignStatusReports,
    MountVirtual,
    BootBannerText,
    BootBannerColor,
    DefaultRunlevel,
    Hostname,
    #[strum(serialize = "ObjectID")]
    ObjectId,
    ObjectEnabled,
    ObjectOptions,
    ObjectDescription,
    ObjectStartCommand,
    ObjectReloadCommand,
    ObjectStopCommand,
    ObjectStartPriority,
    ObjectStopPriority,
    ObjectRunlevels,
}

/// Where a directive may appear relative to the first `ObjectID`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Anywhere,
    GlobalOnly,
    Service,
}

impl Directive {
    pub fn keyword(self) -> &'static str {
        self.into()
    }

    /// First directive whose keyword prefixes `line`.
    pub fn match_line(line: &str) -> Option<Self> {
        Self::iter().find(|directive| line.starts_with(directive.keyword()))
    }

    fn scope(self) -> Scope {
        match self {
            Directive::DefinePriority | Directive::DefaultRunlevel | Directive::Hostname => {
                Scope::GlobalOnly
            }
            Directive::ObjectEnabled
            | Directive::ObjectOptions
            | Directive::ObjectDescription
            | Directive::ObjectStartCommand
            | Directive::ObjectReloadCommand
            | Directive::ObjectStopCommand
            | Directive::ObjectStartPriority
            | Directive::ObjectStopPriority
            | Directive::ObjectRunlevels => Scope::Service,
            _ => Scope::Anywhere,
        }
    }

    /// Field size applied on top of the line limit, if any.
    fn field_limit(self) -> Option<usize> {
        match self {
            Directive::ObjectId
            | Directive::ObjectDescription
            | Directive::BootBannerText
            | Directive::DefaultRunlevel => Some(MAX_DESCRIPT_SIZE - 1),
            _ => None,
        }
    }
}

/// Recoverable problems with a single line.
#[derive(Debug, Error)]
enum LineProblem {
    #[error("Missing value for attribute {0}. Ignoring.")]
    MissingValue(&'static str),
    #[error("Bad value \"{value}\" for attribute {keyword}.")]
    BadValue { keyword: &'static str, value: String },
    #[error("Attribute {0} has an abnormally long value and may have been truncated.")]
    Truncated(&'static str),
    #[error("Attribute {0} cannot be set after an ObjectID attribute. Ignoring.")]
    AfterService(&'static str),
    #[error("Attribute {0} comes before any ObjectID attribute. Ignoring.")]
    BeforeService(&'static str),
    #[error("Attribute {0} has an abnormally high numeric value and may cause malfunctions.")]
    LargeNumber(String),
    #[error("Priority {value} for attribute {keyword} is above {max}. Ignoring.", max = MAX_PRIORITY)]
    PriorityTooHigh { keyword: &'static str, value: u32 },
}

/// Byte offsets of the delimiter and the value within a directive line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ValueSpan {
    /// Start of the delimiter (`=` or the first space/tab).
    pub delimiter: usize,
    /// Start of the value text.
    pub value: usize,
}

/// Locates the delimiter of `line`: the first `=` (exactly one byte) or the first
/// run of spaces/tabs, whichever comes first. `None` if the line ends before one.
pub(crate) fn locate_value(line: &str) -> Option<ValueSpan> {
    let delimiter = line.find([' ', '\t', '='])?;
    let value = if line.as_bytes()[delimiter] == b'=' {
        delimiter + 1
    } else {
        let rest = &line[delimiter..];
        delimiter + (rest.len() - rest.trim_start_matches([' ', '\t']).len())
    };
    Some(ValueSpan { delimiter, value })
}

/// Cuts `text` to at most `max` bytes on a character boundary.
fn clamp(text: &str, max: usize) -> (&str, bool) {
    if text.len() <= max {
        return (text, false);
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    (&text[..end], true)
}

/// Value of a directive line, truncated to the line limit.
fn extract_value(line: &str) -> Option<(&str, bool)> {
    let span = locate_value(line)?;
    Some(clamp(&line[span.value..], MAX_LINE_SIZE - 1))
}

/// Whitespace-separated tokens of a multi-value directive.
fn tokens(value: &str) -> impl Iterator<Item = &str> {
    value.split([' ', '\t']).filter(|token| !token.is_empty())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        VALUE_TRUE => Some(true),
        VALUE_FALSE => Some(false),
        _ => None,
    }
}

fn all_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

/// Reads the source and rejects files with nothing to parse.
pub fn read_source(path: &Path) -> Result<String, ConfigError> {
    let source = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    if source.is_empty() || source == "\n" {
        return Err(ConfigError::Empty {
            path: path.to_path_buf(),
        });
    }
    Ok(source)
}

/// Result of running the grammar engine over a whole source.
#[derive(Debug)]
pub struct Parsed {
    pub model: Model,
    pub diagnostics: Diagnostics,
}

/// Parses `source` into a model, then normalizes priorities and legacy options.
///
/// `runlevel` seeds the active runlevel; when it is non-empty, `DefaultRunlevel`
/// directives are ignored. The alias table is dropped before returning.
pub fn parse_source(source: &str, runlevel: Option<&str>) -> Parsed {
    let mut parser = Parser::new(runlevel);
    parser.run(source);
    parser.finish()
}

struct Parser {
    model: Model,
    aliases: PriorityAliases,
    diagnostics: Diagnostics,
    /// Index of the service opened by the latest `ObjectID`.
    current: Option<usize>,
    /// Service that received the latest `ObjectRunlevels`.
    runlevels_owner: Option<usize>,
    in_long_comment: bool,
    line: usize,
}

impl Parser {
    fn new(runlevel: Option<&str>) -> Self {
        let settings = GlobalSettings {
            runlevel: runlevel.unwrap_or_default().to_string(),
            ..GlobalSettings::default()
        };
        Self {
            model: Model {
                settings,
                ..Model::default()
            },
            aliases: PriorityAliases::new(),
            diagnostics: Diagnostics::new(),
            current: None,
            runlevels_owner: None,
            in_long_comment: false,
            line: 0,
        }
    }

    fn run(&mut self, source: &str) {
        for (index, raw) in source.split('\n').enumerate() {
            self.line = index + 1;
            let raw = raw.strip_suffix('\r').unwrap_or(raw);
            let mut line = raw.trim_start_matches([' ', '\t']);

            if let Some(rest) = line.strip_prefix(LONG_COMMENT_CLOSE) {
                if !self.in_long_comment {
                    self.diagnostics
                        .parse_warning(self.line, "Stray multi-line comment terminator.");
                    continue;
                }
                self.in_long_comment = false;
                line = rest.trim_start_matches([' ', '\t']);
            } else if self.in_long_comment {
                continue;
            } else if line.starts_with(LONG_COMMENT_OPEN) {
                self.in_long_comment = true;
                continue;
            }

            if line.is_empty() || line.starts_with(LINE_COMMENT) {
                continue;
            }

            match Directive::match_line(line) {
                Some(directive) => self.apply(directive, line),
                None => self
                    .diagnostics
                    .parse_warning(self.line, "Unidentified attribute."),
            }
        }
    }

    fn finish(mut self) -> Parsed {
        let services = self.model.services.as_mut_slice();
        for direction in [Direction::Start, Direction::Stop] {
            if let Err(err) = resolve_collisions(services, direction) {
                self.diagnostics.warning(err.to_string());
            }
        }
        compile_no_wait(services);

        if self.in_long_comment {
            self.diagnostics
                .warning("No comment terminator at end of configuration file.");
        }

        debug!(
            services = self.model.services.len(),
            aliases = self.aliases.len(),
            "configuration source parsed"
        );
        Parsed {
            model: self.model,
            diagnostics: self.diagnostics,
        }
    }

    fn problem(&mut self, problem: LineProblem) {
        self.diagnostics.parse_warning(self.line, problem.to_string());
    }

    fn bad_value(&mut self, directive: Directive, value: &str) {
        self.problem(LineProblem::BadValue {
            keyword: directive.keyword(),
            value: value.to_string(),
        });
    }

    fn current_service(&mut self) -> Option<&mut ServiceDescriptor> {
        let index = self.current?;
        self.model.services.get_mut(index)
    }

    fn apply(&mut self, directive: Directive, line: &str) {
        let keyword = directive.keyword();

        // A runlevel chosen earlier, or carried in by a reload, always wins.
        if directive == Directive::DefaultRunlevel && !self.model.settings.runlevel.is_empty() {
            return;
        }

        match directive.scope() {
            Scope::GlobalOnly if self.current.is_some() => {
                return self.problem(LineProblem::AfterService(keyword));
            }
            Scope::Service if self.current.is_none() => {
                return self.problem(LineProblem::BeforeService(keyword));
            }
            _ => {}
        }

        if directive == Directive::ObjectRunlevels {
            self.note_runlevels_owner();
        }

        let Some((value, mut truncated)) = extract_value(line) else {
            return self.problem(LineProblem::MissingValue(keyword));
        };
        let value = match directive.field_limit() {
            Some(limit) => {
                let (field, cut) = clamp(value, limit);
                truncated |= cut;
                field
            }
            None => value,
        };
        if truncated {
            self.problem(LineProblem::Truncated(keyword));
        }

        self.apply_value(directive, value);
    }

    fn apply_value(&mut self, directive: Directive, value: &str) {
        match directive {
            Directive::DisableCad => {
                let flag = self.switch(directive, value, DEFAULT_DISABLE_CAD);
                self.model.settings.disable_cad = flag;
            }
            Directive::BlankLogOnBoot => {
                let flag = self.switch(directive, value, DEFAULT_BLANK_LOG_ON_BOOT);
                self.model.settings.blank_log_on_boot = flag;
            }
            Directive::ShellEnabled => {
                let flag = self.switch(directive, value, DEFAULT_SHELL_ENABLED);
                self.model.settings.shell_enabled = flag;
            }
            Directive::EnableLogging => {
                let flag = self.switch(directive, value, FALLBACK_ENABLE_LOGGING);
                self.model.settings.enable_logging = flag;
            }
            Directive::AlignStatusReports => {
                let flag = self.switch(directive, value, DEFAULT_ALIGN_STATUS_REPORTS);
                self.model.settings.align_status_reports = flag;
            }
            Directive::RunlevelInherits => self.runlevel_inherits(value),
            Directive::DefinePriority => self.define_priority(value),
            Directive::MountVirtual => self.mount_virtual(value),
            Directive::BootBannerText => {
                let banner = &mut self.model.settings.banner;
                if value == VALUE_NONE {
                    banner.text.clear();
                    banner.color = None;
                    banner.show = false;
                } else {
                    banner.text = value.to_string();
                    banner.show = true;
                }
            }
            Directive::BootBannerColor => {
                if value == VALUE_NONE {
                    self.model.settings.banner.color = None;
                } else {
                    match BannerColor::from_str(value) {
                        Ok(color) => self.model.settings.banner.color = Some(color),
                        Err(_) => self.bad_value(directive, value),
                    }
                }
            }
            Directive::DefaultRunlevel => self.model.settings.runlevel = value.to_string(),
            Directive::Hostname => self.hostname(value),
            Directive::ObjectId => {
                let index = self.model.services.push(ServiceDescriptor::new(value));
                self.current = Some(index);
            }
            Directive::ObjectEnabled => match parse_bool(value) {
                Some(flag) => {
                    if let Some(service) = self.current_service() {
                        service.enabled = Enabled::from(flag);
                    }
                }
                None => self.bad_value(directive, value),
            },
            Directive::ObjectOptions => self.object_options(value),
            Directive::ObjectDescription => {
                if let Some(service) = self.current_service() {
                    service.description = value.to_string();
                }
            }
            Directive::ObjectStartCommand => {
                if let Some(service) = self.current_service() {
                    service.start_command = value.to_string();
                }
            }
            Directive::ObjectReloadCommand => {
                if let Some(service) = self.current_service() {
                    service.reload_command = value.to_string();
                }
            }
            Directive::ObjectStopCommand => self.stop_command(value),
            Directive::ObjectStartPriority => {
                if let Some(priority) = self.priority(directive, value)
                    && let Some(service) = self.current_service()
                {
                    service.start_priority = priority;
                }
            }
            Directive::ObjectStopPriority => {
                if let Some(priority) = self.priority(directive, value)
                    && let Some(service) = self.current_service()
                {
                    service.stop_priority = priority;
                }
            }
            Directive::ObjectRunlevels => self.object_runlevels(directive, value),
        }
    }

    /// Boolean directive value, or `fallback` with a warning.
    fn switch(&mut self, directive: Directive, value: &str, fallback: bool) -> bool {
        parse_bool(value).unwrap_or_else(|| {
            self.bad_value(directive, value);
            fallback
        })
    }

    fn runlevel_inherits(&mut self, value: &str) {
        let parts: Vec<&str> = tokens(value).collect();
        match parts.as_slice() {
            [child, parent] => self.model.inheritance.add_edge(*child, *parent),
            _ => self.bad_value(Directive::RunlevelInherits, value),
        }
    }

    fn define_priority(&mut self, value: &str) {
        let parts: Vec<&str> = tokens(value).collect();
        let [name, target] = parts.as_slice() else {
            return self.bad_value(Directive::DefinePriority, value);
        };
        if !all_digits(target) {
            return self.bad_value(Directive::DefinePriority, value);
        }
        let Ok(target) = target.parse::<u32>() else {
            return self.bad_value(Directive::DefinePriority, value);
        };
        if target > MAX_PRIORITY {
            return self.problem(LineProblem::PriorityTooHigh {
                keyword: Directive::DefinePriority.keyword(),
                value: target,
            });
        }
        if !self.aliases.define(name, target) {
            debug!(alias = *name, "priority alias already defined; keeping first");
        }
    }

    fn mount_virtual(&mut self, value: &str) {
        for token in tokens(value) {
            let (name, choice) = match token.strip_suffix('+') {
                Some(name) => (name, MountChoice::Bind),
                None => (token, MountChoice::On),
            };
            match VirtualFs::from_str(name) {
                Ok(fs) => self.model.settings.mounts.set(fs, choice),
                Err(_) => self.bad_value(Directive::MountVirtual, token),
            }
        }
    }

    fn hostname(&mut self, value: &str) {
        let hostname = match value.strip_prefix(HOSTNAME_FROM_FILE) {
            Some(rest) if rest.is_empty() || rest.starts_with([' ', '\t']) => {
                let path = rest.trim_start_matches([' ', '\t']);
                match fs::read_to_string(path) {
                    Ok(contents) => {
                        let contents = contents.trim_start_matches(['\n', ' ', '\t']);
                        let first = contents.split('\n').next().unwrap_or_default();
                        clamp(first, MAX_LINE_SIZE - 1).0.to_string()
                    }
                    Err(err) => {
                        return self.diagnostics.parse_warning(
                            self.line,
                            format!("Failed to set hostname from file \"{path}\": {err}"),
                        );
                    }
                }
            }
            _ => value.to_string(),
        };

        if hostname.contains([' ', '\t']) {
            self.model.settings.hostname.clear();
            return self.diagnostics.parse_warning(
                self.line,
                "Tabs and/or spaces in hostname. Cannot set hostname.",
            );
        }
        self.model.settings.hostname = hostname;
    }

    fn object_options(&mut self, value: &str) {
        let shell_enabled = self.model.settings.shell_enabled;
        let line = self.line;

        for token in tokens(value) {
            let Some(index) = self.current else { return };
            let id = self.model.services.get(index).map(|s| s.id.clone()).unwrap_or_default();

            match token {
                "NOWAIT" => {
                    self.diagnostics.parse_warning(
                        line,
                        format!("Option NOWAIT is deprecated. Emulating NOWAIT for service {id}."),
                    );
                    if let Some(service) = self.current_service() {
                        service.options.no_wait = true;
                    }
                }
                "HALTONLY" => {
                    if let Some(service) = self.current_service() {
                        service.options.halt_only = true;
                        service.options.can_stop = false;
                    }
                }
                "PERSISTENT" => {
                    if let Some(service) = self.current_service() {
                        service.options.can_stop = false;
                    }
                }
                "RAWDESCRIPTION" => {
                    if let Some(service) = self.current_service() {
                        service.options.raw_description = true;
                    }
                }
                "SERVICE" => {
                    if let Some(service) = self.current_service() {
                        service.options.is_service = true;
                    }
                }
                "AUTORESTART" => {
                    if let Some(service) = self.current_service() {
                        service.options.auto_restart = true;
                    }
                }
                "FORCESHELL" if !shell_enabled => {
                    self.diagnostics.parse_warning(
                        line,
                        format!("Service {id} has FORCESHELL set, but ShellEnabled is false. Ignoring."),
                    );
                }
                "FORCESHELL" => {
                    if let Some(service) = self.current_service() {
                        service.options.force_shell = true;
                    }
                }
                _ if token.starts_with(TERMSIGNAL_OPTION) => {
                    if let Some(signal) = self.termination_signal(token)
                        && let Some(service) = self.current_service()
                    {
                        service.termination_signal = signal;
                    }
                }
                _ => {
                    self.bad_value(Directive::ObjectOptions, token);
                    break;
                }
            }
        }
    }

    /// Parses `TERMSIGNAL=<name|number>`. Problems are reported and yield `None`.
    fn termination_signal(&mut self, token: &str) -> Option<i32> {
        let raw = token[TERMSIGNAL_OPTION.len()..]
            .strip_prefix('=')
            .filter(|raw| !raw.is_empty());
        let Some(raw) = raw else {
            self.bad_value(Directive::ObjectOptions, token);
            return None;
        };

        if all_digits(raw) {
            return match raw.parse::<i32>() {
                Ok(number) if number <= MAX_SIGNAL_NUMBER => Some(number),
                _ => {
                    self.problem(LineProblem::LargeNumber(token.to_string()));
                    None
                }
            };
        }

        match Signal::from_str(raw) {
            Ok(signal) => Some(signal as i32),
            Err(_) => {
                self.bad_value(Directive::ObjectOptions, raw);
                None
            }
        }
    }

    fn stop_command(&mut self, value: &str) {
        let Some(service) = self.current_service() else {
            return;
        };

        if let Some(path) = value.strip_prefix(STOP_PIDFILE) {
            service.pid_file = Some(path.trim_start_matches([' ', '\t']).to_string());
            service.stop_mode = StopMode::PidFile;
        } else if value.starts_with(STOP_PID) {
            service.stop_mode = StopMode::Pid;
        } else if value.starts_with(STOP_NONE) {
            service.stop_mode = StopMode::None;
        } else {
            service.stop_mode = StopMode::Command;
            service.stop_command = value.to_string();
        }
    }

    /// Numeric priority or alias target. Unresolvable values are reported.
    fn priority(&mut self, directive: Directive, value: &str) -> Option<u32> {
        if !all_digits(value) {
            let target = self.aliases.lookup(value);
            if target.is_none() {
                self.bad_value(directive, value);
            }
            return target;
        }

        match value.parse::<u32>() {
            Ok(priority) if priority > MAX_PRIORITY => {
                self.problem(LineProblem::PriorityTooHigh {
                    keyword: directive.keyword(),
                    value: priority,
                });
                None
            }
            Ok(priority) => {
                if value.len() >= LARGE_PRIORITY_DIGITS {
                    self.problem(LineProblem::LargeNumber(directive.keyword().to_string()));
                }
                Some(priority)
            }
            Err(_) => {
                self.bad_value(directive, value);
                None
            }
        }
    }

    fn note_runlevels_owner(&mut self) {
        if self.current.is_some() && self.current == self.runlevels_owner {
            let id = self
                .current_service()
                .map(|s| s.id.clone())
                .unwrap_or_default();
            self.diagnostics.parse_warning(
                self.line,
                format!(
                    "Service {id} has more than one ObjectRunlevels line. \
                     Put additional runlevels on the same line."
                ),
            );
        }
        self.runlevels_owner = self.current;
    }

    fn object_runlevels(&mut self, directive: Directive, value: &str) {
        let names: Vec<String> = tokens(value).map(str::to_string).collect();
        if names.is_empty() {
            return self.bad_value(directive, value);
        }
        if let Some(service) = self.current_service() {
            for name in names {
                service.add_runlevel(name);
            }
        }
    }
}
