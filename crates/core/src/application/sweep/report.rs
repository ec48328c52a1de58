// Sweep report - what happened to every run

use super::planner::PlannedRun;
use crate::domain::Phase;
use crate::port::{RunError, RunOutcome, RunStatus};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Outcome of one executed run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub phase: Phase,
    pub iteration: Option<u32>,
    pub project: String,
    pub branch: String,
    pub log_path: PathBuf,
    pub result: Result<RunOutcome, RunError>,
}

impl RunRecord {
    pub fn new(run: &PlannedRun, result: Result<RunOutcome, RunError>) -> Self {
        Self {
            phase: run.phase,
            iteration: run.iteration,
            project: run.project.name(),
            branch: run.config.branch().to_string(),
            log_path: run.invocation.log_path.clone(),
            result,
        }
    }

    pub fn succeeded(&self) -> bool {
        matches!(&self.result, Ok(outcome) if outcome.status == RunStatus::Success)
    }

    pub fn duration_ms(&self) -> i64 {
        self.result.as_ref().map(|o| o.duration_ms).unwrap_or(0)
    }
}

/// Per-phase tallies
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PhaseSummary {
    pub runs: usize,
    pub succeeded: usize,
    /// Runs that exited non-zero
    pub failed: usize,
    /// Runs that never started
    pub spawn_errors: usize,
    pub duration_ms: i64,
}

#[derive(Debug, Clone, Default)]
pub struct SweepReport {
    pub records: Vec<RunRecord>,
    pub phases: BTreeMap<Phase, PhaseSummary>,
    pub total_duration_ms: i64,
}

impl SweepReport {
    pub fn record(&mut self, record: RunRecord) {
        let summary = self.phases.entry(record.phase).or_default();
        summary.runs += 1;
        summary.duration_ms += record.duration_ms();
        match &record.result {
            Ok(outcome) if outcome.status == RunStatus::Success => summary.succeeded += 1,
            Ok(_) => summary.failed += 1,
            Err(_) => summary.spawn_errors += 1,
        }
        self.records.push(record);
    }

    pub fn total_runs(&self) -> usize {
        self.records.len()
    }

    /// Non-zero exits plus spawn errors
    pub fn total_failures(&self) -> usize {
        self.phases
            .values()
            .map(|s| s.failed + s.spawn_errors)
            .sum()
    }

    pub fn summary(&self, phase: Phase) -> Option<&PhaseSummary> {
        self.phases.get(&phase)
    }

    pub fn failures(&self) -> impl Iterator<Item = &RunRecord> {
        self.records.iter().filter(|r| !r.succeeded())
    }
}
