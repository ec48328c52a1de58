// Run Configuration - one parameter set for a single analysis run

use super::error::{DomainError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Property that disables the legacy duplicate detection
pub const LEGACY_SKIP_PROPERTY: &str = "sonar.cpd.skip";
/// Property that disables the new duplicate detection
pub const NEW_SKIP_PROPERTY: &str = "sonar.newcpd.skip";
/// Minimum matched token-sequence length for the new detection
pub const BLOCK_SIZE_PROPERTY: &str = "sonar.newcpd.blockSize";
/// Backend selection for the new detection
pub const BACKEND_PROPERTY: &str = "sonar.newcpd.backend";

/// Render a `-Dkey=value` system property flag
pub fn define(key: &str, value: impl std::fmt::Display) -> String {
    format!("-D{}={}", key, value)
}

/// Duplicate-detection backend of the new path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Memory,
    Db,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Memory => "memory",
            Backend::Db => "db",
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Backend::Memory),
            "db" => Ok(Backend::Db),
            other => Err(DomainError::UnknownBackend(other.to_string())),
        }
    }
}

/// Which duplicate-detection path a run exercises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum DetectionMode {
    /// Legacy detection only (new path skipped)
    Legacy,
    /// New detection only (legacy path skipped)
    New { block_size: u32, backend: Backend },
}

/// Immutable parameter set for one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfiguration {
    branch: String,
    log_file: String,
    mode: DetectionMode,
}

impl RunConfiguration {
    /// Configuration for a run of the legacy detection
    pub fn legacy(branch: impl Into<String>, log_file: impl Into<String>) -> Result<Self> {
        Self::build(branch.into(), log_file.into(), DetectionMode::Legacy)
    }

    /// Configuration for a run of the new detection
    pub fn new_detection(
        branch: impl Into<String>,
        log_file: impl Into<String>,
        block_size: u32,
        backend: Backend,
    ) -> Result<Self> {
        if block_size == 0 {
            return Err(DomainError::InvalidBlockSize(block_size));
        }
        Self::build(
            branch.into(),
            log_file.into(),
            DetectionMode::New {
                block_size,
                backend,
            },
        )
    }

    fn build(branch: String, log_file: String, mode: DetectionMode) -> Result<Self> {
        if branch.is_empty() || branch.chars().any(char::is_whitespace) {
            return Err(DomainError::InvalidBranchLabel(branch));
        }
        if log_file.trim().is_empty() {
            return Err(DomainError::InvalidLogFile(log_file));
        }
        Ok(Self {
            branch,
            log_file,
            mode,
        })
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn log_file(&self) -> &str {
        &self.log_file
    }

    pub fn mode(&self) -> DetectionMode {
        self.mode
    }

    pub fn backend(&self) -> Option<Backend> {
        match self.mode {
            DetectionMode::Legacy => None,
            DetectionMode::New { backend, .. } => Some(backend),
        }
    }

    pub fn block_size(&self) -> Option<u32> {
        match self.mode {
            DetectionMode::Legacy => None,
            DetectionMode::New { block_size, .. } => Some(block_size),
        }
    }

    /// Extra tool flags selecting the detection path
    pub fn extra_params(&self) -> Vec<String> {
        match self.mode {
            DetectionMode::Legacy => vec![define(NEW_SKIP_PROPERTY, true)],
            DetectionMode::New {
                block_size,
                backend,
            } => vec![
                define(LEGACY_SKIP_PROPERTY, true),
                define(BLOCK_SIZE_PROPERTY, block_size),
                define(BACKEND_PROPERTY, backend),
            ],
        }
    }
}
