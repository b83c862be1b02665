//! Whole-model validation.
//!
//! The scanner never stops at the first problem: every rule is evaluated for every
//! descriptor and the findings accumulate into one verdict.
use tracing::info;

use crate::{
    constants::MISSING_DESCRIPTION,
    diagnostics::{Diagnostics, Verdict},
    service::{Enabled, StopMode},
    table::Model,
};

/// Answer to an invalid runlevel on first load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Try this runlevel instead.
    UseRunlevel(String),
    /// Drop into the minimal recovery environment, then ask again.
    EnterRecoveryMode,
    /// Stop remediating; the load is rejected.
    GiveUp,
}

/// External collaborator consulted when the configured runlevel cannot be booted.
pub trait RecoveryHandler {
    /// Called with the runlevel that was rejected (possibly empty).
    fn request_runlevel(&mut self, rejected: &str) -> RecoveryAction;

    /// Runs the recovery environment. Returns when the operator leaves it.
    fn enter_recovery_mode(&mut self) {}
}

/// Handler for callers without a console: never remediates.
#[derive(Debug, Default, Clone, Copy)]
pub struct NonInteractive;

impl RecoveryHandler for NonInteractive {
    fn request_runlevel(&mut self, _rejected: &str) -> RecoveryAction {
        RecoveryAction::GiveUp
    }
}

/// Whether remediation is possible for an invalid runlevel.
pub enum ScanMode<'a> {
    /// First load: the handler may pick a replacement runlevel.
    Initial(&'a mut dyn RecoveryHandler),
    /// Reload while running: an invalid runlevel is always fatal.
    Reload,
}

/// Validates `model`, applying the documented auto-corrections in place.
pub fn scan(model: &mut Model, mode: ScanMode<'_>) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();

    if model.services.is_empty() {
        diagnostics.integrity(
            Verdict::Fatal,
            "No objects found in configuration or invalid configuration.",
        );
        return diagnostics;
    }

    check_runlevel(model, mode, &mut diagnostics);
    check_services(model, &mut diagnostics);
    check_duplicates(model, &mut diagnostics);
    diagnostics
}

fn check_runlevel(model: &mut Model, mode: ScanMode<'_>, diagnostics: &mut Diagnostics) {
    let runlevel = model.runlevel().to_string();
    if !runlevel.is_empty() && model.is_valid_runlevel(&runlevel) {
        return;
    }

    let message = if runlevel.is_empty() {
        "No default runlevel specified!".to_string()
    } else {
        format!("The runlevel \"{runlevel}\" does not exist.")
    };

    let handler = match mode {
        ScanMode::Reload => {
            return diagnostics.integrity(
                Verdict::Fatal,
                format!("{message} Switch to an existing runlevel and reload again."),
            );
        }
        ScanMode::Initial(handler) => handler,
    };

    diagnostics.integrity(Verdict::Warning, message);
    let mut rejected = runlevel;
    loop {
        match handler.request_runlevel(&rejected) {
            RecoveryAction::UseRunlevel(candidate) if model.is_valid_runlevel(&candidate) => {
                info!(runlevel = %candidate, "replacement runlevel accepted");
                model.settings.runlevel = candidate;
                return;
            }
            RecoveryAction::UseRunlevel(candidate) => {
                diagnostics.integrity(
                    Verdict::Warning,
                    format!("The runlevel \"{candidate}\" was not found."),
                );
                rejected = candidate;
            }
            RecoveryAction::EnterRecoveryMode => handler.enter_recovery_mode(),
            RecoveryAction::GiveUp => {
                return diagnostics.integrity(
                    Verdict::Fatal,
                    "No bootable runlevel selected. Refusing to adopt configuration.",
                );
            }
        }
    }
}

fn check_services(model: &mut Model, diagnostics: &mut Diagnostics) {
    for service in model.services.iter_mut() {
        // Rules see the descriptor as parsed; disabling by one rule does not feed the next.
        let unset = service.enabled == Enabled::Unset;
        let halt_only = service.options.halt_only;
        let id = service.id.clone();

        if service.description.is_empty() {
            diagnostics.integrity(
                Verdict::Warning,
                format!(
                    "Object {id} has no attribute ObjectDescription. \
                     Changing description to \"{MISSING_DESCRIPTION}\"."
                ),
            );
            service.description = MISSING_DESCRIPTION.to_string();
        }

        if service.stop_mode == StopMode::Command
            && service.start_command.is_empty()
            && service.stop_command.is_empty()
        {
            diagnostics.integrity(
                Verdict::Fatal,
                format!("Object {id} has neither ObjectStopCommand nor ObjectStartCommand attributes."),
            );
        }

        if !halt_only && service.start_command.is_empty() {
            diagnostics.integrity(
                Verdict::Warning,
                format!("Object {id} has no attribute ObjectStartCommand and is not set to HALTONLY. Disabling."),
            );
            service.enabled = Enabled::False;
        }

        if !halt_only && service.runlevels.is_empty() {
            diagnostics.integrity(
                Verdict::Fatal,
                format!("Object \"{id}\" has no attribute ObjectRunlevels."),
            );
        }

        if unset {
            diagnostics.integrity(
                Verdict::Fatal,
                format!("Object \"{id}\" has no attribute ObjectEnabled."),
            );
        }

        if halt_only && service.stop_mode == StopMode::Pid {
            diagnostics.integrity(
                Verdict::Warning,
                format!("Object \"{id}\" has HALTONLY set, but stop method is PID! Disabling."),
            );
            service.enabled = Enabled::False;
        }
    }
}

fn check_duplicates(model: &Model, diagnostics: &mut Diagnostics) {
    let services = model.services.as_slice();
    for (i, first) in services.iter().enumerate() {
        for second in &services[i + 1..] {
            if first.id == second.id {
                diagnostics.integrity(
                    Verdict::Fatal,
                    format!("Two objects in configuration with ObjectID \"{}\".", first.id),
                );
            }
        }
    }
}
