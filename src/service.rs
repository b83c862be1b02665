//! The configuration record of a single supervised service.
use nix::sys::signal::Signal;
use serde::Serialize;
use strum_macros::{AsRefStr, EnumString};

/// How the executor should stop a running service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, EnumString, AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StopMode {
    /// No stop action.
    #[default]
    None,
    /// Signal the process id recorded when the service was started.
    Pid,
    /// Signal the process id found in [`ServiceDescriptor::pid_file`].
    PidFile,
    /// Run [`ServiceDescriptor::stop_command`].
    Command,
}

/// Tri-state `ObjectEnabled` value. `Unset` fails integrity checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Enabled {
    True,
    False,
    #[default]
    Unset,
}

impl Enabled {
    pub fn is_enabled(self) -> bool {
        self == Enabled::True
    }
}

impl From<bool> for Enabled {
    fn from(value: bool) -> Self {
        if value { Enabled::True } else { Enabled::False }
    }
}

/// Flags set through `ObjectOptions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceOptions {
    /// Whether the service may be stopped at all (`PERSISTENT`/`HALTONLY` clear it).
    pub can_stop: bool,
    /// Only the stop action ever runs, typically at shutdown.
    pub halt_only: bool,
    /// Print the description without decoration.
    pub raw_description: bool,
    /// The start command launches a long-lived daemon.
    pub is_service: bool,
    /// Restart the service when it dies.
    pub auto_restart: bool,
    /// Always run commands through the shell.
    pub force_shell: bool,
    /// Legacy `NOWAIT`, compiled into a background marker at end of parse.
    pub no_wait: bool,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            can_stop: true,
            halt_only: false,
            raw_description: false,
            is_service: false,
            auto_restart: false,
            force_shell: false,
            no_wait: false,
        }
    }
}

/// One supervised unit, as declared by an `ObjectID` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceDescriptor {
    pub id: String,
    pub description: String,
    pub start_command: String,
    pub stop_command: String,
    pub reload_command: String,
    /// Only set when `stop_mode` is [`StopMode::PidFile`].
    pub pid_file: Option<String>,
    pub stop_mode: StopMode,
    /// `0` means unordered.
    pub start_priority: u32,
    /// `0` means unordered.
    pub stop_priority: u32,
    pub enabled: Enabled,
    /// Raw signal number sent when the service is terminated by pid.
    pub termination_signal: i32,
    pub options: ServiceOptions,
    /// Runlevel labels in declaration order. Duplicates are harmless.
    pub runlevels: Vec<String>,
    /// Runtime state owned by the executor; carried across reloads.
    pub started: bool,
    /// Runtime state owned by the executor; carried across reloads.
    pub process_id: u32,
}

impl ServiceDescriptor {
    /// Creates a descriptor with every attribute at its pre-directive default.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            start_command: String::new(),
            stop_command: String::new(),
            reload_command: String::new(),
            pid_file: None,
            stop_mode: StopMode::None,
            start_priority: 0,
            stop_priority: 0,
            enabled: Enabled::Unset,
            termination_signal: Signal::SIGTERM as i32,
            options: ServiceOptions::default(),
            runlevels: Vec::new(),
            started: false,
            process_id: 0,
        }
    }

    /// Priority in the requested direction.
    pub fn priority(&self, direction: Direction) -> u32 {
        match direction {
            Direction::Start => self.start_priority,
            Direction::Stop => self.stop_priority,
        }
    }

    pub(crate) fn priority_mut(&mut self, direction: Direction) -> &mut u32 {
        match direction {
            Direction::Start => &mut self.start_priority,
            Direction::Stop => &mut self.stop_priority,
        }
    }

    /// Literal membership, ignoring inheritance.
    pub fn has_runlevel(&self, runlevel: &str) -> bool {
        self.runlevels.iter().any(|rl| rl == runlevel)
    }

    pub fn add_runlevel(&mut self, runlevel: impl Into<String>) {
        self.runlevels.push(runlevel.into());
    }

    /// Removes the first occurrence of `runlevel`. Returns false when it was absent.
    pub fn remove_runlevel(&mut self, runlevel: &str) -> bool {
        match self.runlevels.iter().position(|rl| rl == runlevel) {
            Some(index) => {
                self.runlevels.remove(index);
                true
            }
            None => false,
        }
    }
}

/// Ordering direction for priorities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, AsRefStr)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Start,
    Stop,
}
