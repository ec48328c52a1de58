// Target Project - a codebase the analysis tool is pointed at

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A project directory the analysis runs in (read-only)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetProject {
    path: PathBuf,
}

impl TargetProject {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Resolve a project directory name against the base directory
    pub fn resolve(base_dir: &Path, dir: &str) -> Self {
        Self::new(base_dir.join(dir))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Final path component, used for per-project log names and listings
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

impl std::fmt::Display for TargetProject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.display())
    }
}
