// Sweep Settings - every knob of a full sweep, passed explicitly

use super::error::{DomainError, Result};
use super::invocation::ToolSettings;
use super::naming::LogNaming;
use super::project::TargetProject;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_BASE_DIR: &str = "~/sonar/";
pub const DEFAULT_PROJECTS: [&str; 3] = ["struts_1_3_9", "commons-collections", "activemq"];
pub const DEFAULT_BLOCK_SIZES: [u32; 7] = [10, 15, 18, 20, 22, 25, 30];
pub const DEFAULT_ITERATIONS: u32 = 10;
pub const DEFAULT_DB_BLOCK_SIZE: u32 = 20;

/// Sweep phase, always executed in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Legacy detection, once per project
    Legacy,
    /// New detection with the memory backend, per project and block size
    Memory,
    /// New detection with the db backend, repeated for timing
    Db,
}

impl Phase {
    pub const ALL: [Phase; 3] = [Phase::Legacy, Phase::Memory, Phase::Db];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Legacy => "legacy",
            Phase::Memory => "memory",
            Phase::Db => "db",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(Phase::Legacy),
            "memory" => Ok(Phase::Memory),
            "db" => Ok(Phase::Db),
            other => Err(DomainError::UnknownPhase(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepSettings {
    /// Directory the project names are resolved against
    pub base_dir: PathBuf,
    /// Project directory names, in execution order
    pub projects: Vec<String>,
    /// Block sizes swept by the memory phase
    pub block_sizes: Vec<u32>,
    /// Repetitions of the db phase
    pub iterations: u32,
    /// Fixed block size of the db phase
    pub db_block_size: u32,
    /// Phases to run
    pub phases: Vec<Phase>,
    /// Shared directory for log files (None = each project's directory)
    pub log_dir: Option<PathBuf>,
    pub log_naming: LogNaming,
    pub tool: ToolSettings,
}

impl Default for SweepSettings {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from(DEFAULT_BASE_DIR),
            projects: DEFAULT_PROJECTS.iter().map(|p| p.to_string()).collect(),
            block_sizes: DEFAULT_BLOCK_SIZES.to_vec(),
            iterations: DEFAULT_ITERATIONS,
            db_block_size: DEFAULT_DB_BLOCK_SIZE,
            phases: Phase::ALL.to_vec(),
            log_dir: None,
            log_naming: LogNaming::Shared,
            tool: ToolSettings::default(),
        }
    }
}

impl SweepSettings {
    pub fn target_projects(&self) -> Vec<TargetProject> {
        self.projects
            .iter()
            .map(|dir| TargetProject::resolve(&self.base_dir, dir))
            .collect()
    }

    /// Whether a phase is selected
    pub fn runs_phase(&self, phase: Phase) -> bool {
        self.phases.contains(&phase)
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(&bad) = self.block_sizes.iter().find(|&&size| size == 0) {
            return Err(DomainError::InvalidBlockSize(bad));
        }
        if self.db_block_size == 0 {
            return Err(DomainError::InvalidBlockSize(0));
        }
        if self.tool.program.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "tool program must not be empty".to_string(),
            ));
        }
        if self.tool.branch_property.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "branch property must not be empty".to_string(),
            ));
        }
        if let Some(blank) = self.projects.iter().find(|p| p.trim().is_empty()) {
            return Err(DomainError::ValidationError(format!(
                "project directory name must not be blank: {:?}",
                blank
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = SweepSettings::default();

        assert_eq!(
            settings.projects,
            vec!["struts_1_3_9", "commons-collections", "activemq"]
        );
        assert_eq!(settings.block_sizes, vec![10, 15, 18, 20, 22, 25, 30]);
        assert_eq!(settings.iterations, 10);
        assert_eq!(settings.db_block_size, 20);
        assert_eq!(settings.phases, Phase::ALL.to_vec());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_target_projects_resolve_against_base_dir() {
        let settings = SweepSettings {
            base_dir: PathBuf::from("/data"),
            projects: vec!["a".to_string(), "b".to_string()],
            ..Default::default()
        };

        let projects = settings.target_projects();

        assert_eq!(projects.len(), 2);
        assert_eq!(projects[1].path(), std::path::Path::new("/data/b"));
    }

    #[test]
    fn test_validate_rejects_zero_block_size() {
        let settings = SweepSettings {
            block_sizes: vec![10, 0],
            ..Default::default()
        };
        assert_eq!(settings.validate(), Err(DomainError::InvalidBlockSize(0)));
    }

    #[test]
    fn test_validate_rejects_blank_project() {
        let settings = SweepSettings {
            projects: vec!["a".to_string(), " ".to_string()],
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(DomainError::ValidationError(_))
        ));
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let settings: SweepSettings =
            serde_json::from_str(r#"{"iterations": 3, "phases": ["db"]}"#).unwrap();

        assert_eq!(settings.iterations, 3);
        assert_eq!(settings.phases, vec![Phase::Db]);
        assert_eq!(settings.db_block_size, 20);
        assert_eq!(settings.tool.program, "mvn");
    }

    #[test]
    fn test_phase_parsing() {
        assert_eq!("Legacy".parse::<Phase>().unwrap(), Phase::Legacy);
        assert!(matches!(
            "warmup".parse::<Phase>(),
            Err(DomainError::UnknownPhase(_))
        ));
    }
}
