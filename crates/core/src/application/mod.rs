// Application Layer - Use Cases

pub mod sweep;

// Re-exports
pub use sweep::{PlannedRun, SweepDriver, SweepReport};
