// Sweep planning - enumerates every run of the selected phases in order

use crate::domain::error::Result;
use crate::domain::naming::{
    iteration_log_file, log_file_for, new_detection_branch, LEGACY_BRANCH,
};
use crate::domain::{
    Backend, Invocation, Phase, RunConfiguration, SweepSettings, TargetProject,
};
use serde::Serialize;

/// One run of the sweep, fully resolved but not yet executed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedRun {
    pub phase: Phase,
    /// Iteration index (db phase only)
    pub iteration: Option<u32>,
    pub project: TargetProject,
    pub config: RunConfiguration,
    pub invocation: Invocation,
}

impl PlannedRun {
    pub fn new(
        settings: &SweepSettings,
        phase: Phase,
        iteration: Option<u32>,
        project: TargetProject,
        config: RunConfiguration,
    ) -> Self {
        let invocation = Invocation::build(
            &settings.tool,
            &project,
            &config,
            settings.log_dir.as_deref(),
        );
        Self {
            phase,
            iteration,
            project,
            config,
            invocation,
        }
    }
}

/// Build the full run list
///
/// Order: legacy (per project), memory (project outer, block size inner),
/// db (iteration outer, project inner). Phases not selected are skipped.
pub fn plan(settings: &SweepSettings) -> Result<Vec<PlannedRun>> {
    settings.validate()?;
    let projects = settings.target_projects();

    let mut runs = Vec::new();
    for phase in Phase::ALL {
        if !settings.runs_phase(phase) {
            continue;
        }
        match phase {
            Phase::Legacy => plan_legacy(settings, &projects, &mut runs)?,
            Phase::Memory => plan_memory(settings, &projects, &mut runs)?,
            Phase::Db => plan_db(settings, &projects, &mut runs)?,
        }
    }
    Ok(runs)
}

fn plan_legacy(
    settings: &SweepSettings,
    projects: &[TargetProject],
    runs: &mut Vec<PlannedRun>,
) -> Result<()> {
    let log_file = log_file_for(LEGACY_BRANCH);
    for project in projects {
        let config =
            RunConfiguration::legacy(LEGACY_BRANCH, settings.log_naming.apply(project, &log_file))?;
        runs.push(PlannedRun::new(
            settings,
            Phase::Legacy,
            None,
            project.clone(),
            config,
        ));
    }
    Ok(())
}

fn plan_memory(
    settings: &SweepSettings,
    projects: &[TargetProject],
    runs: &mut Vec<PlannedRun>,
) -> Result<()> {
    for project in projects {
        for &block_size in &settings.block_sizes {
            let branch = new_detection_branch(Backend::Memory, block_size);
            let log_file = settings.log_naming.apply(project, &log_file_for(&branch));
            let config =
                RunConfiguration::new_detection(branch, log_file, block_size, Backend::Memory)?;
            runs.push(PlannedRun::new(
                settings,
                Phase::Memory,
                None,
                project.clone(),
                config,
            ));
        }
    }
    Ok(())
}

fn plan_db(
    settings: &SweepSettings,
    projects: &[TargetProject],
    runs: &mut Vec<PlannedRun>,
) -> Result<()> {
    let block_size = settings.db_block_size;
    let branch = new_detection_branch(Backend::Db, block_size);
    for iteration in 0..settings.iterations {
        for project in projects {
            let log_file = settings
                .log_naming
                .apply(project, &iteration_log_file(&branch, iteration));
            let config = RunConfiguration::new_detection(
                branch.clone(),
                log_file,
                block_size,
                Backend::Db,
            )?;
            runs.push(PlannedRun::new(
                settings,
                Phase::Db,
                Some(iteration),
                project.clone(),
                config,
            ));
        }
    }
    Ok(())
}
