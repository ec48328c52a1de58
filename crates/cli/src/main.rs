//! cpdsweep - benchmark sweep over the duplicate-detection settings of a
//! Sonar analysis, one Maven run at a time.

mod output;
mod settings;
mod telemetry;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use cpdsweep_core::application::SweepDriver;
use cpdsweep_core::domain::naming::{log_file_for, new_detection_branch, LEGACY_BRANCH};
use cpdsweep_core::domain::{Backend, LogNaming, Phase, TargetProject};
use cpdsweep_core::port::time_provider::SystemTimeProvider;
use cpdsweep_infra_system::SubprocessRunner;

use settings::Overrides;

#[derive(Parser)]
#[command(name = "cpdsweep")]
#[command(about = "CPD benchmark sweep driver", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file (TOML)
    #[arg(long, global = true, env = "CPDSWEEP_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
struct SweepArgs {
    /// Directory the project names are resolved against
    #[arg(long)]
    base_dir: Option<PathBuf>,

    /// Phases to run (repeatable or comma-separated: legacy, memory, db)
    #[arg(long = "phase", value_delimiter = ',')]
    phases: Vec<Phase>,

    /// Write all log files into this directory
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Log file naming: shared or per-project
    #[arg(long)]
    log_naming: Option<LogNaming>,

    /// Repetitions of the db phase
    #[arg(long)]
    iterations: Option<u32>,
}

impl From<SweepArgs> for Overrides {
    fn from(args: SweepArgs) -> Self {
        Overrides {
            base_dir: args.base_dir,
            phases: args.phases,
            log_dir: args.log_dir,
            log_naming: args.log_naming,
            iterations: args.iterations,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the sweep
    Run {
        #[command(flatten)]
        sweep: SweepArgs,

        /// Print the commands without running them
        #[arg(long)]
        dry_run: bool,
    },

    /// List every planned run without executing anything
    Plan {
        #[command(flatten)]
        sweep: SweepArgs,

        /// Emit the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a single analysis pass against one project
    Pass {
        /// Project directory (absolute, or relative to the base directory)
        #[arg(long)]
        project: PathBuf,

        /// Block size; selects the new detection when given
        #[arg(long)]
        block_size: Option<u32>,

        /// Backend of the new detection
        #[arg(long, requires = "block_size", default_value = "memory")]
        backend: Backend,

        /// Branch label (derived from the parameters when omitted)
        #[arg(long)]
        branch: Option<String>,

        /// Log file name (derived from the branch label when omitted)
        #[arg(long)]
        log_file: Option<String>,

        /// Directory the log file is written to
        #[arg(long)]
        log_dir: Option<PathBuf>,
    },
}

fn driver(settings: cpdsweep_core::domain::SweepSettings) -> SweepDriver {
    let time_provider = Arc::new(SystemTimeProvider);
    let runner = Arc::new(SubprocessRunner::new(time_provider.clone()));
    SweepDriver::new(runner, time_provider, settings)
}

/// Branch label and log file of a single pass, derived when not given
fn pass_labels(
    block_size: Option<u32>,
    backend: Backend,
    branch: Option<String>,
    log_file: Option<String>,
) -> (String, String) {
    let branch = branch.unwrap_or_else(|| match block_size {
        None => LEGACY_BRANCH.to_string(),
        Some(block_size) => new_detection_branch(backend, block_size),
    });
    let log_file = log_file.unwrap_or_else(|| log_file_for(&branch));
    (branch, log_file)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init_logging().context("Failed to initialize logging")?;

    info!("cpdsweep v{} starting...", cpdsweep_core::VERSION);

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Run { sweep, dry_run } => {
            let settings = settings::load(config_path, sweep.into())?;
            let driver = driver(settings);

            if dry_run {
                let runs = driver.plan()?;
                return output::to_stdout(|out| output::write_dry_run(out, &runs));
            }

            let report = driver.run_sweep().await?;
            output::to_stdout(|out| output::write_report(out, &report))?;
        }

        Commands::Plan { sweep, json } => {
            let settings = settings::load(config_path, sweep.into())?;
            let runs = driver(settings).plan()?;

            if json {
                let json = serde_json::to_string_pretty(&runs)?;
                output::to_stdout(|out| writeln!(out, "{}", json))?;
            } else {
                output::to_stdout(|out| output::write_plan(out, &runs))?;
            }
        }

        Commands::Pass {
            project,
            block_size,
            backend,
            branch,
            log_file,
            log_dir,
        } => {
            let overrides = Overrides {
                log_dir,
                ..Default::default()
            };
            let settings = settings::load(config_path, overrides)?;
            let project = TargetProject::resolve(&settings.base_dir, &project.to_string_lossy());
            let driver = driver(settings);

            let (branch, log_file) = pass_labels(block_size, backend, branch, log_file);
            let record = match block_size {
                None => driver.run_legacy_pass(&project, &branch, &log_file).await?,
                Some(block_size) => {
                    driver
                        .run_new_pass(&project, &branch, block_size, &log_file, backend)
                        .await?
                }
            };
            output::to_stdout(|out| output::write_record(out, &record))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_labels_default_to_legacy() {
        let (branch, log_file) = pass_labels(None, Backend::Memory, None, None);

        assert_eq!(branch, "OLDCPD");
        assert_eq!(log_file, "oldcpd.log");
    }

    #[test]
    fn test_pass_labels_follow_block_size_and_backend() {
        let (branch, log_file) = pass_labels(Some(20), Backend::Db, None, None);

        assert_eq!(branch, "NEWCPD-DB-20");
        assert_eq!(log_file, "newcpd-db-20.log");
    }

    #[test]
    fn test_pass_labels_keep_explicit_values() {
        let (branch, log_file) = pass_labels(
            Some(15),
            Backend::Memory,
            Some("TRIAL".to_string()),
            None,
        );
        assert_eq!(branch, "TRIAL");
        assert_eq!(log_file, "trial.log");

        let (_, log_file) =
            pass_labels(None, Backend::Memory, None, Some("custom.log".to_string()));
        assert_eq!(log_file, "custom.log");
    }

    #[test]
    fn test_pass_arguments_parse() {
        let cli = Cli::try_parse_from([
            "cpdsweep",
            "pass",
            "--project",
            "activemq",
            "--block-size",
            "20",
            "--backend",
            "db",
        ])
        .unwrap();

        match cli.command {
            Commands::Pass {
                block_size,
                backend,
                ..
            } => {
                assert_eq!(block_size, Some(20));
                assert_eq!(backend, Backend::Db);
            }
            _ => panic!("expected the pass command"),
        }
    }
}
