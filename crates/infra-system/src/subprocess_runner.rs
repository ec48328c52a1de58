// Subprocess runner implementation
// reason: async-trait, tokio for async process management
use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, info};

use cpdsweep_core::domain::Invocation;
use cpdsweep_core::port::{CommandRunner, RunError, RunOutcome, RunStatus, TimeProvider};

/// Subprocess runner
/// Spawns the tool in the project directory with stdout and stderr sent to the log file
pub struct SubprocessRunner {
    time_provider: Arc<dyn TimeProvider>,
}

impl SubprocessRunner {
    /// Create a new subprocess runner
    ///
    /// # Arguments
    /// * `time_provider` - Time provider for duration tracking
    ///
    /// # Example
    /// ```ignore
    /// let runner = SubprocessRunner::new(Arc::new(SystemTimeProvider));
    /// ```
    pub fn new(time_provider: Arc<dyn TimeProvider>) -> Self {
        Self { time_provider }
    }

    /// Open the log file and return handles for stdout and stderr
    async fn open_log(&self, path: &Path) -> Result<(Stdio, Stdio), RunError> {
        let log_error = |e: std::io::Error| RunError::LogFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        };

        let stdout = tokio::fs::File::create(path)
            .await
            .map_err(log_error)?
            .into_std()
            .await;
        let stderr = stdout.try_clone().map_err(log_error)?;
        Ok((Stdio::from(stdout), Stdio::from(stderr)))
    }

    /// Spawn child process and wait for it to exit
    async fn spawn_and_wait(
        &self,
        invocation: &Invocation,
    ) -> Result<std::process::ExitStatus, RunError> {
        let is_dir = tokio::fs::metadata(&invocation.working_dir)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Err(RunError::SpawnFailed(format!(
                "working directory does not exist: {}",
                invocation.working_dir.display()
            )));
        }

        let (stdout, stderr) = self.open_log(&invocation.log_path).await?;

        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.working_dir)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr)
            .spawn()
            .map_err(|e| RunError::SpawnFailed(format!("{}: {}", invocation.program, e)))?;

        debug!(pid = ?child.id(), program = %invocation.program, "Child process spawned");

        child
            .wait()
            .await
            .map_err(|e| RunError::IoError(e.to_string()))
    }
}

#[async_trait]
impl CommandRunner for SubprocessRunner {
    async fn run(&self, invocation: &Invocation) -> Result<RunOutcome, RunError> {
        let start_time = self.time_provider.now_millis();

        info!(
            program = %invocation.program,
            args = ?invocation.args,
            working_dir = %invocation.working_dir.display(),
            log_path = %invocation.log_path.display(),
            "Starting subprocess"
        );

        let exit_status = self.spawn_and_wait(invocation).await?;

        let duration_ms = self.time_provider.now_millis() - start_time;
        let status = if exit_status.success() {
            RunStatus::Success
        } else {
            RunStatus::Failed
        };

        info!(
            program = %invocation.program,
            duration_ms = %duration_ms,
            exit_code = ?exit_status.code(),
            status = ?status,
            "Subprocess completed"
        );

        Ok(RunOutcome {
            status,
            exit_code: exit_status.code(),
            duration_ms,
        })
    }
}
