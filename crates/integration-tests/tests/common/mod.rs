//! Shared fixtures: a scratch workspace with project directories and a fake
//! analysis tool written as a shell script.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use cpdsweep_core::application::SweepDriver;
use cpdsweep_core::domain::{SweepSettings, ToolSettings};
use cpdsweep_core::port::time_provider::SystemTimeProvider;
use cpdsweep_infra_system::SubprocessRunner;

/// Echoes its working directory and arguments; fails for block size 15
const FAKE_TOOL: &str = r#"
echo "cwd=$(pwd)"
for arg in "$@"; do
  echo "arg=$arg"
done
case "$*" in
  *blockSize=15*) echo "simulated analysis failure" >&2; exit 1 ;;
esac
exit 0
"#;

pub struct Workspace {
    pub root: PathBuf,
}

impl Workspace {
    pub fn new(projects: &[&str]) -> Self {
        let root = std::env::temp_dir().join(format!("cpdsweep-e2e-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(root.join("projects")).unwrap();
        for project in projects {
            std::fs::create_dir_all(root.join("projects").join(project)).unwrap();
        }
        std::fs::write(root.join("fake-mvn.sh"), FAKE_TOOL).unwrap();
        Self { root }
    }

    pub fn project_dir(&self, name: &str) -> PathBuf {
        self.root.join("projects").join(name)
    }

    /// Settings running the fake tool through `sh`
    pub fn settings(&self, projects: &[&str]) -> SweepSettings {
        SweepSettings {
            base_dir: self.root.join("projects"),
            projects: projects.iter().map(|p| p.to_string()).collect(),
            block_sizes: vec![10, 15],
            iterations: 2,
            tool: ToolSettings {
                program: "sh".to_string(),
                goal: self.root.join("fake-mvn.sh").display().to_string(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn driver(&self, settings: SweepSettings) -> SweepDriver {
        let time_provider = Arc::new(SystemTimeProvider);
        let runner = Arc::new(SubprocessRunner::new(time_provider.clone()));
        SweepDriver::new(runner, time_provider, settings)
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

pub fn read(path: &Path) -> String {
    std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("cannot read {}: {}", path.display(), e))
}
