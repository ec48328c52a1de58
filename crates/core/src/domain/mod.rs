// Domain Layer - Pure model of a benchmark sweep

pub mod error;
pub mod invocation;
pub mod naming;
pub mod project;
pub mod run_config;
pub mod settings;

// Re-exports
pub use error::DomainError;
pub use invocation::{Invocation, ToolSettings};
pub use naming::LogNaming;
pub use project::TargetProject;
pub use run_config::{Backend, DetectionMode, RunConfiguration};
pub use settings::{Phase, SweepSettings};
