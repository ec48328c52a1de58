// Command Runner Port
// Abstraction for running one external analysis command to completion

use crate::domain::Invocation;
use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

/// Result of a finished run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOutcome {
    pub status: RunStatus,
    pub exit_code: Option<i32>,
    pub duration_ms: i64,
}

/// Exit status of a finished run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    /// Non-zero exit or terminated by a signal
    Failed,
}

/// Errors that prevent a run from happening at all
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    #[error("Spawn failed: {0}")]
    SpawnFailed(String),

    #[error("Cannot open log file {path}: {message}")]
    LogFile { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    IoError(String),
}

/// Command Runner trait
///
/// Implementations:
/// - SubprocessRunner: spawns the tool as a child process
/// - RecordingRunner: records invocations (tests)
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run an invocation and wait for it to exit
    ///
    /// A non-zero exit is an `Ok` outcome with `RunStatus::Failed`.
    ///
    /// # Errors
    /// - RunError::SpawnFailed if the process cannot be started
    /// - RunError::LogFile if the log file cannot be created
    async fn run(&self, invocation: &Invocation) -> Result<RunOutcome, RunError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Mock runner behavior for a single call
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Exit with code 0
        Success,
        /// Exit with the given code
        Exit(i32),
        /// Fail to spawn with message
        SpawnFail(String),
    }

    /// Records every invocation and answers from a script
    ///
    /// Scripted behaviors are consumed in order; once exhausted the
    /// default behavior answers.
    pub struct RecordingRunner {
        default: MockBehavior,
        script: Mutex<VecDeque<MockBehavior>>,
        calls: Mutex<Vec<Invocation>>,
    }

    impl RecordingRunner {
        pub fn new(default: MockBehavior) -> Self {
            Self {
                default,
                script: Mutex::new(VecDeque::new()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn new_success() -> Self {
            Self::new(MockBehavior::Success)
        }

        pub fn with_script(default: MockBehavior, script: Vec<MockBehavior>) -> Self {
            let runner = Self::new(default);
            *runner.script.lock().unwrap() = script.into();
            runner
        }

        pub fn calls(&self) -> Vec<Invocation> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CommandRunner for RecordingRunner {
        async fn run(&self, invocation: &Invocation) -> Result<RunOutcome, RunError> {
            self.calls.lock().unwrap().push(invocation.clone());

            let behavior = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| self.default.clone());

            match behavior {
                MockBehavior::Success => Ok(RunOutcome {
                    status: RunStatus::Success,
                    exit_code: Some(0),
                    duration_ms: 100,
                }),
                MockBehavior::Exit(code) => Ok(RunOutcome {
                    status: if code == 0 {
                        RunStatus::Success
                    } else {
                        RunStatus::Failed
                    },
                    exit_code: Some(code),
                    duration_ms: 100,
                }),
                MockBehavior::SpawnFail(msg) => Err(RunError::SpawnFailed(msg)),
            }
        }
    }
}
