//! Terminal rendering of plans and sweep reports

use anyhow::Context;
use colored::Colorize;
use cpdsweep_core::application::sweep::{PlannedRun, RunRecord, SweepReport};
use std::io::{self, Write};
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct PlanRow {
    #[tabled(rename = "#")]
    index: usize,
    phase: String,
    iteration: String,
    project: String,
    branch: String,
    log: String,
}

#[derive(Tabled)]
struct PhaseRow {
    phase: String,
    runs: usize,
    succeeded: usize,
    failed: usize,
    #[tabled(rename = "spawn errors")]
    spawn_errors: usize,
    #[tabled(rename = "time (s)")]
    seconds: String,
}

fn seconds(ms: i64) -> String {
    format!("{:.1}", ms as f64 / 1000.0)
}

pub fn plan_table(runs: &[PlannedRun]) -> String {
    let rows: Vec<PlanRow> = runs
        .iter()
        .enumerate()
        .map(|(i, run)| PlanRow {
            index: i + 1,
            phase: run.phase.to_string(),
            iteration: run.iteration.map(|i| i.to_string()).unwrap_or_default(),
            project: run.project.name(),
            branch: run.config.branch().to_string(),
            log: run.invocation.log_path.display().to_string(),
        })
        .collect();
    Table::new(rows).to_string()
}

/// Render to a locked stdout; a closed pipe (`cpdsweep plan | head`) ends output quietly
pub fn to_stdout<F>(render: F) -> anyhow::Result<()>
where
    F: FnOnce(&mut io::StdoutLock<'static>) -> io::Result<()>,
{
    let mut out = io::stdout().lock();
    finish(render(&mut out).and_then(|_| out.flush()))
}

fn finish(result: io::Result<()>) -> anyhow::Result<()> {
    match result {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other.context("Failed to write to stdout"),
    }
}

pub fn write_plan<W: Write>(out: &mut W, runs: &[PlannedRun]) -> io::Result<()> {
    writeln!(out, "{}", format!("{} planned runs", runs.len()).cyan().bold())?;
    writeln!(out)?;
    writeln!(out, "{}", plan_table(runs))
}

/// One command line per run, as echoed before execution
pub fn write_dry_run<W: Write>(out: &mut W, runs: &[PlannedRun]) -> io::Result<()> {
    let mut current_iteration = None;
    for run in runs {
        if run.iteration.is_some() && run.iteration != current_iteration {
            if let Some(iteration) = run.iteration {
                writeln!(out, "iteration: {}", iteration)?;
            }
            current_iteration = run.iteration;
        }
        writeln!(out, "{}", run.invocation)?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "{}",
        format!("Dry run: {} commands, nothing executed", runs.len()).yellow()
    )
}

pub fn write_record<W: Write>(out: &mut W, record: &RunRecord) -> io::Result<()> {
    if record.succeeded() {
        writeln!(
            out,
            "{} {} ({}s) -> {}",
            "✓".green(),
            record.branch,
            seconds(record.duration_ms()),
            record.log_path.display()
        )
    } else {
        writeln!(
            out,
            "{} {} failed: {} -> {}",
            "✗".red(),
            record.branch,
            failure_reason(record),
            record.log_path.display()
        )
    }
}

fn failure_reason(record: &RunRecord) -> String {
    match &record.result {
        Ok(outcome) => match outcome.exit_code {
            Some(code) => format!("exit code {}", code),
            None => "terminated by signal".to_string(),
        },
        Err(e) => e.to_string(),
    }
}

pub fn write_report<W: Write>(out: &mut W, report: &SweepReport) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "Sweep Summary".cyan().bold())?;
    writeln!(out)?;

    let rows: Vec<PhaseRow> = report
        .phases
        .iter()
        .map(|(phase, summary)| PhaseRow {
            phase: phase.to_string(),
            runs: summary.runs,
            succeeded: summary.succeeded,
            failed: summary.failed,
            spawn_errors: summary.spawn_errors,
            seconds: seconds(summary.duration_ms),
        })
        .collect();
    writeln!(out, "{}", Table::new(rows))?;
    writeln!(out)?;
    writeln!(
        out,
        "  {} {}",
        "Total time:".bold(),
        format!("{}s", seconds(report.total_duration_ms))
    )?;

    let failures: Vec<&RunRecord> = report.failures().collect();
    if failures.is_empty() {
        return writeln!(
            out,
            "  {} all {} runs succeeded",
            "✓".green(),
            report.total_runs()
        );
    }

    writeln!(
        out,
        "  {} {} of {} runs failed (inspect the logs):",
        "!".yellow().bold(),
        failures.len(),
        report.total_runs()
    )?;
    for record in failures {
        writeln!(
            out,
            "    {} [{}] {}: {} -> {}",
            "•".bold(),
            record.phase,
            record.project,
            failure_reason(record),
            record.log_path.display()
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cpdsweep_core::application::sweep::plan;
    use cpdsweep_core::domain::{Phase, SweepSettings};
    use std::path::PathBuf;

    #[test]
    fn test_plan_table_lists_every_run() {
        let settings = SweepSettings {
            base_dir: PathBuf::from("/bench"),
            projects: vec!["a".to_string()],
            block_sizes: vec![10],
            iterations: 2,
            phases: vec![Phase::Memory, Phase::Db],
            ..Default::default()
        };
        let runs = plan(&settings).unwrap();

        let table = plan_table(&runs);

        assert!(table.contains("NEWCPD-MEMORY-10"));
        assert!(table.contains("/bench/a/newcpd-db-20-1.log"));
        assert_eq!(table.matches("NEWCPD-DB-20").count(), 2);
    }

    #[test]
    fn test_dry_run_lists_commands_with_iteration_markers() {
        let settings = SweepSettings {
            base_dir: PathBuf::from("/bench"),
            projects: vec!["a".to_string()],
            iterations: 2,
            phases: vec![Phase::Db],
            ..Default::default()
        };
        let runs = plan(&settings).unwrap();
        let mut out = Vec::new();

        write_dry_run(&mut out, &runs).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("iteration: 0"));
        assert!(text.contains("iteration: 1"));
        assert!(text.contains("newcpd-db-20-1.log"));
        assert!(text.contains("Dry run: 2 commands"));
    }

    #[test]
    fn test_closed_pipe_ends_output_quietly() {
        let broken = io::Error::new(io::ErrorKind::BrokenPipe, "closed");
        let denied = io::Error::new(io::ErrorKind::PermissionDenied, "denied");

        assert!(finish(Err(broken)).is_ok());
        assert!(finish(Ok(())).is_ok());
        assert!(finish(Err(denied)).is_err());
    }

    #[test]
    fn test_write_plan_stops_at_first_write_error() {
        struct ClosedPipe;
        impl Write for ClosedPipe {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }
        let runs = plan(&SweepSettings::default()).unwrap();

        let result = write_plan(&mut ClosedPipe, &runs);

        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::BrokenPipe);
        assert!(finish(write_plan(&mut ClosedPipe, &runs)).is_ok());
    }
}
