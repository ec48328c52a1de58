// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Invalid branch label: {0:?}")]
    InvalidBranchLabel(String),

    #[error("Invalid log file name: {0:?}")]
    InvalidLogFile(String),

    #[error("Invalid block size: {0} (must be positive)")]
    InvalidBlockSize(u32),

    #[error("Unknown backend: {0} (expected 'memory' or 'db')")]
    UnknownBackend(String),

    #[error("Unknown phase: {0} (expected 'legacy', 'memory' or 'db')")]
    UnknownPhase(String),

    #[error("Unknown log naming policy: {0} (expected 'shared' or 'per-project')")]
    UnknownLogNaming(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
