// Branch labels and log file names derived from run parameters

use super::error::DomainError;
use super::project::TargetProject;
use super::run_config::Backend;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Branch label shared by every legacy run
pub const LEGACY_BRANCH: &str = "OLDCPD";

/// Branch label for a new-detection run, e.g. `NEWCPD-MEMORY-15`
pub fn new_detection_branch(backend: Backend, block_size: u32) -> String {
    format!(
        "NEWCPD-{}-{}",
        backend.as_str().to_ascii_uppercase(),
        block_size
    )
}

/// Log file named after the branch, e.g. `newcpd-memory-15.log`
pub fn log_file_for(branch: &str) -> String {
    format!("{}.log", branch.to_lowercase())
}

/// Log file for one iteration of a repeated run, e.g. `newcpd-db-20-3.log`
pub fn iteration_log_file(branch: &str, iteration: u32) -> String {
    format!("{}-{}.log", branch.to_lowercase(), iteration)
}

/// How log file names are shared between projects
///
/// `Shared` keeps one name per configuration, so projects writing into the same
/// directory overwrite each other. `PerProject` prefixes the project name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogNaming {
    #[default]
    Shared,
    PerProject,
}

impl LogNaming {
    pub fn apply(&self, project: &TargetProject, log_file: &str) -> String {
        match self {
            LogNaming::Shared => log_file.to_string(),
            LogNaming::PerProject => format!("{}-{}", project.name(), log_file),
        }
    }
}

impl std::fmt::Display for LogNaming {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogNaming::Shared => write!(f, "shared"),
            LogNaming::PerProject => write!(f, "per-project"),
        }
    }
}

impl FromStr for LogNaming {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "shared" => Ok(LogNaming::Shared),
            "per-project" => Ok(LogNaming::PerProject),
            other => Err(DomainError::UnknownLogNaming(other.to_string())),
        }
    }
}
