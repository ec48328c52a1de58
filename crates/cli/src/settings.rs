//! Settings loading: defaults, then TOML file, then `CPDSWEEP__*` environment,
//! then command-line overrides.

use anyhow::{Context, Result};
use config::{Config, Environment, File, FileFormat};
use cpdsweep_core::domain::{LogNaming, Phase, SweepSettings};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "CPDSWEEP";
const ENV_SEPARATOR: &str = "__";
const LIST_KEYS: [&str; 4] = ["projects", "block_sizes", "phases", "tool.flags"];

/// Command-line overrides, applied last
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub base_dir: Option<PathBuf>,
    pub phases: Vec<Phase>,
    pub log_dir: Option<PathBuf>,
    pub log_naming: Option<LogNaming>,
    pub iterations: Option<u32>,
}

impl Overrides {
    pub fn apply(self, settings: &mut SweepSettings) {
        if let Some(base_dir) = self.base_dir {
            settings.base_dir = base_dir;
        }
        if !self.phases.is_empty() {
            settings.phases = self.phases;
        }
        if let Some(log_dir) = self.log_dir {
            settings.log_dir = Some(log_dir);
        }
        if let Some(log_naming) = self.log_naming {
            settings.log_naming = log_naming;
        }
        if let Some(iterations) = self.iterations {
            settings.iterations = iterations;
        }
    }
}

/// Load settings from the process environment and an optional file
pub fn load(path: Option<&Path>, overrides: Overrides) -> Result<SweepSettings> {
    load_with_env(path, None, overrides)
}

/// Load settings with an explicit environment map (`None` reads the process env)
pub fn load_with_env(
    path: Option<&Path>,
    env: Option<config::Map<String, String>>,
    overrides: Overrides,
) -> Result<SweepSettings> {
    let mut builder = Config::builder();

    if let Some(path) = path {
        builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
    }

    // List keys are split here: letting config parse them would turn a lone
    // numeric value into a scalar instead of a one-element list.
    let mut scalars = config::Map::new();
    for (var, value) in env.unwrap_or_else(prefixed_process_env) {
        match list_key(&var) {
            Some(key) => {
                builder = builder
                    .set_override(key, split_list(&value))
                    .with_context(|| format!("Invalid list in {}", var))?;
            }
            None => {
                scalars.insert(var, value);
            }
        }
    }

    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true)
            .source(Some(scalars)),
    );

    let mut settings: SweepSettings = builder
        .build()
        .context("Failed to read settings")?
        .try_deserialize()
        .context("Invalid settings")?;

    overrides.apply(&mut settings);
    expand_paths(&mut settings);
    settings.validate().context("Invalid settings")?;

    Ok(settings)
}

/// `CPDSWEEP__*` variables of the process (non-UTF-8 entries skipped)
fn prefixed_process_env() -> config::Map<String, String> {
    let prefix = format!("{}{}", ENV_PREFIX, ENV_SEPARATOR);
    std::env::vars_os()
        .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
        .filter(|(k, _)| k.to_ascii_uppercase().starts_with(&prefix))
        .collect()
}

/// Settings key of a list-valued variable, e.g. `CPDSWEEP__TOOL__FLAGS` -> `tool.flags`
fn list_key(var: &str) -> Option<&'static str> {
    LIST_KEYS.iter().copied().find(|key| {
        let expected = format!(
            "{}{}{}",
            ENV_PREFIX,
            ENV_SEPARATOR,
            key.replace('.', ENV_SEPARATOR)
        );
        var.eq_ignore_ascii_case(&expected)
    })
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Expand `~` in the directory settings
fn expand_paths(settings: &mut SweepSettings) {
    settings.base_dir = expand(&settings.base_dir);
    if let Some(dir) = settings.log_dir.as_mut() {
        *dir = expand(dir);
    }
}

pub fn expand(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env() -> Option<config::Map<String, String>> {
        Some(config::Map::new())
    }

    fn scratch_file(contents: &str) -> PathBuf {
        let path =
            std::env::temp_dir().join(format!("cpdsweep-settings-{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_defaults_without_sources() {
        let settings = load_with_env(None, no_env(), Overrides::default()).unwrap();
        let defaults = SweepSettings::default();

        assert_eq!(settings.projects, defaults.projects);
        assert_eq!(settings.block_sizes, defaults.block_sizes);
        assert_eq!(settings.iterations, 10);
        assert!(settings.base_dir.ends_with("sonar"));
    }

    #[test]
    fn test_file_values_override_defaults() {
        let path = scratch_file(
            r#"
base_dir = "/srv/sonar"
projects = ["a", "b"]
block_sizes = [12]
phases = ["memory"]
log_naming = "per-project"

[tool]
program = "./mvnw"
"#,
        );

        let settings = load_with_env(Some(&path), no_env(), Overrides::default()).unwrap();

        assert_eq!(settings.base_dir, PathBuf::from("/srv/sonar"));
        assert_eq!(settings.projects, vec!["a", "b"]);
        assert_eq!(settings.block_sizes, vec![12]);
        assert_eq!(settings.phases, vec![Phase::Memory]);
        assert_eq!(settings.log_naming, LogNaming::PerProject);
        assert_eq!(settings.tool.program, "./mvnw");
        assert_eq!(settings.tool.goal, "sonar:sonar");

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_environment_overrides_file() {
        let path = scratch_file("iterations = 4\n");
        let mut env = config::Map::new();
        env.insert("CPDSWEEP__ITERATIONS".to_string(), "2".to_string());
        env.insert("CPDSWEEP__PROJECTS".to_string(), "x,y,z".to_string());
        env.insert("CPDSWEEP__TOOL__PROGRAM".to_string(), "mvn3".to_string());

        let settings = load_with_env(Some(&path), Some(env), Overrides::default()).unwrap();

        assert_eq!(settings.iterations, 2);
        assert_eq!(settings.projects, vec!["x", "y", "z"]);
        assert_eq!(settings.tool.program, "mvn3");

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_single_numeric_list_values_from_environment() {
        let mut env = config::Map::new();
        env.insert("CPDSWEEP__BLOCK_SIZES".to_string(), "12".to_string());
        env.insert("CPDSWEEP__PROJECTS".to_string(), "2024".to_string());
        env.insert("CPDSWEEP__PHASES".to_string(), "memory".to_string());
        env.insert("CPDSWEEP__TOOL__FLAGS".to_string(), "-X, -e".to_string());

        let settings = load_with_env(None, Some(env), Overrides::default()).unwrap();

        assert_eq!(settings.block_sizes, vec![12]);
        assert_eq!(settings.projects, vec!["2024"]);
        assert_eq!(settings.phases, vec![Phase::Memory]);
        assert_eq!(settings.tool.flags, vec!["-X", "-e"]);
    }

    #[test]
    fn test_list_key_matching() {
        assert_eq!(list_key("CPDSWEEP__BLOCK_SIZES"), Some("block_sizes"));
        assert_eq!(list_key("cpdsweep__tool__flags"), Some("tool.flags"));
        assert_eq!(list_key("CPDSWEEP__ITERATIONS"), None);
        assert_eq!(split_list(" a, ,b "), vec!["a", "b"]);
    }

    #[test]
    fn test_overrides_apply_last() {
        let overrides = Overrides {
            base_dir: Some(PathBuf::from("/data")),
            phases: vec![Phase::Db],
            log_dir: Some(PathBuf::from("/logs")),
            log_naming: Some(LogNaming::PerProject),
            iterations: Some(1),
        };

        let settings = load_with_env(None, no_env(), overrides).unwrap();

        assert_eq!(settings.base_dir, PathBuf::from("/data"));
        assert_eq!(settings.phases, vec![Phase::Db]);
        assert_eq!(settings.log_dir, Some(PathBuf::from("/logs")));
        assert_eq!(settings.log_naming, LogNaming::PerProject);
        assert_eq!(settings.iterations, 1);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let path = std::env::temp_dir().join("cpdsweep-settings-does-not-exist.toml");
        assert!(load_with_env(Some(&path), no_env(), Overrides::default()).is_err());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let path = scratch_file("block_sizes = [10, 0]\n");

        assert!(load_with_env(Some(&path), no_env(), Overrides::default()).is_err());

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_tilde_expansion() {
        let expanded = expand(Path::new("~/sonar"));
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.ends_with("sonar"));
    }
}
