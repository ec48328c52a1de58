// Invocation - the concrete command for one (project, configuration) pair

use super::project::TargetProject;
use super::run_config::{define, RunConfiguration};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_PROGRAM: &str = "mvn";
pub const DEFAULT_GOAL: &str = "sonar:sonar";
pub const DEFAULT_BRANCH_PROPERTY: &str = "sonar.branch";

/// How the external build tool is called
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    /// Executable, resolved through PATH
    pub program: String,
    /// Analysis goal passed as first argument
    pub goal: String,
    /// Flags placed between the goal and the properties
    pub flags: Vec<String>,
    /// System property carrying the branch label
    pub branch_property: String,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            goal: DEFAULT_GOAL.to_string(),
            flags: vec!["-e".to_string()],
            branch_property: DEFAULT_BRANCH_PROPERTY.to_string(),
        }
    }
}

/// Concrete command: program + argument list, never a shell string
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    pub log_path: PathBuf,
}

impl Invocation {
    pub fn new(
        program: impl Into<String>,
        args: Vec<String>,
        working_dir: impl Into<PathBuf>,
        log_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            program: program.into(),
            args,
            working_dir: working_dir.into(),
            log_path: log_path.into(),
        }
    }

    /// Build the invocation for a run
    ///
    /// Without a log directory the log lands in the project directory,
    /// like a relative redirect after `cd <project>`.
    pub fn build(
        tool: &ToolSettings,
        project: &TargetProject,
        config: &RunConfiguration,
        log_dir: Option<&Path>,
    ) -> Self {
        let mut args = Vec::with_capacity(tool.flags.len() + 5);
        args.push(tool.goal.clone());
        args.extend(tool.flags.iter().cloned());
        args.push(define(&tool.branch_property, config.branch()));
        args.extend(config.extra_params());

        let log_path = log_dir
            .unwrap_or_else(|| project.path())
            .join(config.log_file());

        Self::new(tool.program.clone(), args, project.path(), log_path)
    }
}

impl std::fmt::Display for Invocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cd {} && {}", self.working_dir.display(), self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        write!(f, " > {}", self.log_path.display())
    }
}
