//! Owner of the live model: initial load, transactional reload and shutdown.
use std::path::{Path, PathBuf};

use strum_macros::AsRefStr;
use tracing::{debug, error, info, warn};

use crate::{
    diagnostics::{Diagnostics, Report},
    error::ConfigError,
    integrity::{RecoveryHandler, ScanMode, scan},
    parser::{parse_source, read_source},
    settings::PinnedFlags,
    table::Model,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr)]
#[strum(serialize_all = "snake_case")]
enum ReloadPhase {
    Snapshotting,
    Reparsing,
    Committing,
    RollingBack,
}

/// Holds the single live model and swaps it only after a full validation pass.
#[derive(Debug)]
pub struct ConfigManager {
    path: PathBuf,
    model: Option<Model>,
}

impl ConfigManager {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            model: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn model(&self) -> Option<&Model> {
        self.model.as_ref()
    }

    /// Executor access for runtime fields.
    pub fn model_mut(&mut self) -> Option<&mut Model> {
        self.model.as_mut()
    }

    pub fn is_loaded(&self) -> bool {
        self.model.is_some()
    }

    /// Runs the full pipeline for the first time.
    ///
    /// An invalid runlevel is handed to `recovery`. The model is adopted unless the
    /// verdict is fatal; any previously loaded model is replaced.
    pub fn load(&mut self, recovery: &mut dyn RecoveryHandler) -> Result<Report, ConfigError> {
        info!("Loading configuration from {:?}", self.path);
        let (model, diagnostics) = self.run_pipeline(None, ScanMode::Initial(recovery))?;
        let report = Report::from_diagnostics(diagnostics);

        if report.verdict.is_adoptable() {
            self.model = Some(model);
        } else {
            error!(path = ?self.path, "configuration rejected");
            self.model = None;
        }
        Ok(report)
    }

    /// Re-reads the source and swaps the model in a single transaction.
    ///
    /// On a fatal verdict, or if the source cannot be read, the previous model stays
    /// live unchanged. On success, `started`/`process_id` carry over for ids present
    /// in both models and the pinned global flags keep their running values.
    pub fn reload(&mut self) -> Result<Report, ConfigError> {
        let Some(live) = self.model.take() else {
            return Err(ConfigError::NotLoaded);
        };

        debug!(phase = ReloadPhase::Snapshotting.as_ref(), services = live.services.len());
        let snapshot = live;
        let pinned = PinnedFlags::capture(&snapshot.settings);

        debug!(phase = ReloadPhase::Reparsing.as_ref(), path = ?self.path);
        let runlevel = snapshot.runlevel().to_string();
        let (mut fresh, diagnostics) = match self.run_pipeline(Some(&runlevel), ScanMode::Reload) {
            Ok(parsed) => parsed,
            Err(err) => {
                warn!(phase = ReloadPhase::RollingBack.as_ref(), "reload aborted: {err}");
                self.model = Some(snapshot);
                return Err(err);
            }
        };
        let report = Report::from_diagnostics(diagnostics);

        if !report.verdict.is_adoptable() {
            error!(
                phase = ReloadPhase::RollingBack.as_ref(),
                "Configuration reload rejected; keeping the running configuration"
            );
            self.model = Some(snapshot);
            return Ok(report);
        }

        debug!(phase = ReloadPhase::Committing.as_ref(), services = fresh.services.len());
        for old in snapshot.services.iter() {
            if let Some(service) = fresh.lookup_mut(&old.id) {
                service.started = old.started;
                service.process_id = old.process_id;
            }
        }
        pinned.restore(&mut fresh.settings);
        self.model = Some(fresh);

        info!(verdict = %report.verdict, "Configuration reloaded");
        Ok(report)
    }

    /// Drops the live model. A later [`ConfigManager::load`] starts from scratch.
    pub fn shutdown(&mut self) {
        if self.model.take().is_some() {
            debug!("configuration model released");
        }
    }

    fn run_pipeline(
        &self,
        runlevel: Option<&str>,
        mode: ScanMode<'_>,
    ) -> Result<(Model, Diagnostics), ConfigError> {
        let source = read_source(&self.path)?;
        let parsed = parse_source(&source, runlevel);
        let mut model = parsed.model;
        let mut diagnostics = parsed.diagnostics;
        diagnostics.absorb(scan(&mut model, mode));
        Ok((model, diagnostics))
    }
}
