use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Project directory holding tracker configuration.
pub const PROJECT_DIR: &str = ".ticketing";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    #[serde(default)]
    pub policy: PolicyConfig,
}

/// Knobs for checks the issue manager may or may not enforce.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Reject `open` from users without the reporter role.
    #[serde(default)]
    pub require_reporter_role: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserConfig {
    /// Preferred output mode: `pretty`, `text` or `json`.
    #[serde(default)]
    pub output: Option<String>,
}

/// Location of the project config below `project_root`.
#[must_use]
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(PROJECT_DIR).join("config.toml")
}

/// Load `.ticketing/config.toml`, falling back to defaults when absent.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_project_config(project_root: &Path) -> Result<ProjectConfig> {
    load_or_default(&project_config_path(project_root))
}

/// Load the per-user config from the platform config directory.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_user_config() -> Result<UserConfig> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(UserConfig::default());
    };
    load_or_default(&config_dir.join("ticketing/config.toml"))
}

fn load_or_default<T>(path: &Path) -> Result<T>
where
    T: Default + for<'de> Deserialize<'de>,
{
    if !path.exists() {
        return Ok(T::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<T>(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_project_config(root: &Path, body: &str) {
        let dir = root.join(PROJECT_DIR);
        std::fs::create_dir_all(&dir).expect("create config dir");
        std::fs::write(dir.join("config.toml"), body).expect("write config");
    }

    #[test]
    fn missing_project_config_uses_defaults() {
        let root = tempfile::tempdir().expect("temp dir");
        let cfg = load_project_config(root.path()).expect("load should succeed");
        assert!(!cfg.policy.require_reporter_role);
    }

    #[test]
    fn policy_section_is_read() {
        let root = tempfile::tempdir().expect("temp dir");
        write_project_config(root.path(), "[policy]\nrequire_reporter_role = true\n");
        let cfg = load_project_config(root.path()).expect("load should succeed");
        assert!(cfg.policy.require_reporter_role);
    }

    #[test]
    fn empty_file_uses_defaults() {
        let root = tempfile::tempdir().expect("temp dir");
        write_project_config(root.path(), "");
        let cfg = load_project_config(root.path()).expect("load should succeed");
        assert_eq!(cfg, ProjectConfig::default());
    }

    #[test]
    fn malformed_file_reports_path() {
        let root = tempfile::tempdir().expect("temp dir");
        write_project_config(root.path(), "[policy\n");
        let err = load_project_config(root.path()).expect_err("parse should fail");
        assert!(err.to_string().contains("Failed to parse"));
    }

    #[test]
    fn user_config_parses_output() {
        let cfg: UserConfig = toml::from_str("output = \"json\"\n").expect("parse");
        assert_eq!(cfg.output.as_deref(), Some("json"));
    }
}
