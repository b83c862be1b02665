//! Process-wide settings declared by global directives.
use serde::Serialize;
use strum_macros::{AsRefStr, EnumString};

use crate::constants::{
    DEFAULT_ALIGN_STATUS_REPORTS, DEFAULT_BLANK_LOG_ON_BOOT, DEFAULT_DISABLE_CAD,
    DEFAULT_ENABLE_LOGGING, DEFAULT_SHELL_ENABLED,
};

/// Whether a virtual filesystem is mounted at boot, and how.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MountChoice {
    #[default]
    Off,
    On,
    /// The `+` suffixed form, e.g. `devfs+`.
    Bind,
}

/// Virtual filesystems known to `MountVirtual`, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum VirtualFs {
    Procfs,
    Sysfs,
    Devfs,
    Devpts,
    Devshm,
}

/// Auto-mount choice for each virtual filesystem.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VirtualMounts {
    pub procfs: MountChoice,
    pub sysfs: MountChoice,
    pub devfs: MountChoice,
    pub devpts: MountChoice,
    pub devshm: MountChoice,
}

impl VirtualMounts {
    pub fn set(&mut self, fs: VirtualFs, choice: MountChoice) {
        let slot = match fs {
            VirtualFs::Procfs => &mut self.procfs,
            VirtualFs::Sysfs => &mut self.sysfs,
            VirtualFs::Devfs => &mut self.devfs,
            VirtualFs::Devpts => &mut self.devpts,
            VirtualFs::Devshm => &mut self.devshm,
        };
        *slot = choice;
    }
}

/// Colors accepted by `BootBannerColor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, EnumString, AsRefStr)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum BannerColor {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
}

/// Greeter shown before services are started. Rendering belongs to the console layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BootBanner {
    pub show: bool,
    pub text: String,
    pub color: Option<BannerColor>,
}

/// Global settings with the same lifetime as the service table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlobalSettings {
    pub disable_cad: bool,
    pub blank_log_on_boot: bool,
    pub shell_enabled: bool,
    pub enable_logging: bool,
    pub align_status_reports: bool,
    pub mounts: VirtualMounts,
    pub banner: BootBanner,
    pub hostname: String,
    /// Active runlevel. Empty until `DefaultRunlevel` or the caller sets one.
    pub runlevel: String,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            disable_cad: DEFAULT_DISABLE_CAD,
            blank_log_on_boot: DEFAULT_BLANK_LOG_ON_BOOT,
            shell_enabled: DEFAULT_SHELL_ENABLED,
            enable_logging: DEFAULT_ENABLE_LOGGING,
            align_status_reports: DEFAULT_ALIGN_STATUS_REPORTS,
            mounts: VirtualMounts::default(),
            banner: BootBanner::default(),
            hostname: String::new(),
            runlevel: String::new(),
        }
    }
}

/// The three switches that a reload must never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinnedFlags {
    pub enable_logging: bool,
    pub disable_cad: bool,
    pub align_status_reports: bool,
}

impl PinnedFlags {
    pub fn capture(settings: &GlobalSettings) -> Self {
        Self {
            enable_logging: settings.enable_logging,
            disable_cad: settings.disable_cad,
            align_status_reports: settings.align_status_reports,
        }
    }

    pub fn restore(self, settings: &mut GlobalSettings) {
        settings.enable_logging = self.enable_logging;
        settings.disable_cad = self.disable_cad;
        settings.align_status_reports = self.align_status_reports;
    }
}
