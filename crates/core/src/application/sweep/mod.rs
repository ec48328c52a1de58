// Sweep Driver - runs every planned analysis, one at a time

pub mod planner;
pub mod report;

pub use planner::{plan, PlannedRun};
pub use report::{PhaseSummary, RunRecord, SweepReport};

use crate::domain::{Backend, Phase, RunConfiguration, SweepSettings, TargetProject};
use crate::error::Result;
use crate::port::{CommandRunner, RunStatus, TimeProvider};
use std::sync::Arc;
use tracing::{info, warn};

/// Sequential driver over a `CommandRunner`
///
/// Each run is awaited to completion before the next one starts. Run
/// failures are logged and tallied, never escalated.
pub struct SweepDriver {
    runner: Arc<dyn CommandRunner>,
    time_provider: Arc<dyn TimeProvider>,
    settings: SweepSettings,
}

impl SweepDriver {
    pub fn new(
        runner: Arc<dyn CommandRunner>,
        time_provider: Arc<dyn TimeProvider>,
        settings: SweepSettings,
    ) -> Self {
        Self {
            runner,
            time_provider,
            settings,
        }
    }

    pub fn settings(&self) -> &SweepSettings {
        &self.settings
    }

    /// Every run the sweep would execute, in order
    pub fn plan(&self) -> Result<Vec<PlannedRun>> {
        Ok(planner::plan(&self.settings)?)
    }

    /// Run the legacy detection once against a project
    pub async fn run_legacy_pass(
        &self,
        project: &TargetProject,
        branch: &str,
        log_file: &str,
    ) -> Result<RunRecord> {
        let config = RunConfiguration::legacy(branch, log_file)?;
        self.ensure_log_dir().await?;
        let run = PlannedRun::new(&self.settings, Phase::Legacy, None, project.clone(), config);
        Ok(self.execute(&run).await)
    }

    /// Run the new detection once against a project
    pub async fn run_new_pass(
        &self,
        project: &TargetProject,
        branch: &str,
        block_size: u32,
        log_file: &str,
        backend: Backend,
    ) -> Result<RunRecord> {
        let config = RunConfiguration::new_detection(branch, log_file, block_size, backend)?;
        self.ensure_log_dir().await?;
        let phase = match backend {
            Backend::Memory => Phase::Memory,
            Backend::Db => Phase::Db,
        };
        let run = PlannedRun::new(&self.settings, phase, None, project.clone(), config);
        Ok(self.execute(&run).await)
    }

    /// Run the full sweep
    ///
    /// # Errors
    /// Only invalid settings or an uncreatable log directory abort the sweep.
    pub async fn run_sweep(&self) -> Result<SweepReport> {
        let runs = self.plan()?;
        self.ensure_log_dir().await?;

        info!(
            runs = runs.len(),
            projects = self.settings.projects.len(),
            phases = ?self.settings.phases,
            "Starting sweep"
        );

        let start = self.time_provider.now_millis();
        let mut report = SweepReport::default();
        let mut current_phase = None;
        let mut current_iteration = None;

        for run in &runs {
            if current_phase != Some(run.phase) {
                info!(phase = %run.phase, "Entering phase");
                current_phase = Some(run.phase);
                current_iteration = None;
            }
            if run.iteration.is_some() && run.iteration != current_iteration {
                if let Some(iteration) = run.iteration {
                    info!(iteration, "iteration: {}", iteration);
                }
                current_iteration = run.iteration;
            }

            report.record(self.execute(run).await);
        }

        report.total_duration_ms = self.time_provider.now_millis() - start;

        info!(
            runs = report.total_runs(),
            failures = report.total_failures(),
            duration_ms = report.total_duration_ms,
            "Sweep completed"
        );

        Ok(report)
    }

    async fn ensure_log_dir(&self) -> Result<()> {
        if let Some(dir) = &self.settings.log_dir {
            tokio::fs::create_dir_all(dir).await?;
        }
        Ok(())
    }

    async fn execute(&self, run: &PlannedRun) -> RunRecord {
        info!(
            phase = %run.phase,
            project = %run.project,
            branch = %run.config.branch(),
            command = %run.invocation,
            "Running analysis"
        );

        let result = self.runner.run(&run.invocation).await;

        match &result {
            Ok(outcome) if outcome.status == RunStatus::Success => info!(
                branch = %run.config.branch(),
                duration_ms = outcome.duration_ms,
                "Analysis completed"
            ),
            Ok(outcome) => warn!(
                branch = %run.config.branch(),
                exit_code = ?outcome.exit_code,
                log = %run.invocation.log_path.display(),
                "Analysis exited with failure, continuing"
            ),
            Err(e) => warn!(
                branch = %run.config.branch(),
                error = %e,
                "Analysis could not be started, continuing"
            ),
        }

        RunRecord::new(run, result)
    }
}
