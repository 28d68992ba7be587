pub mod error;

pub use error::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable pointing at a settings file
pub const CONFIG_ENV: &str = "VPC_REAPER_CONFIG";

/// File names looked up in the current directory, in order
pub const LOCAL_CANDIDATES: [&str; 2] = ["vpc-reaper.yaml", ".vpc-reaper.yaml"];

/// Settings file contents. Every field is optional; whatever is left out
/// keeps the built-in default.
///
/// ```yaml
/// region: eu-west-1
/// release_addresses: false
/// retry:
///   max_retries: 20
///   delay_ms: 5000
/// file_system_retries: 10
/// settle:
///   mount_targets_ms: 3000
///   subnets_ms: 3000
///   security_groups_ms: 1000
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub region: Option<String>,
    pub release_addresses: Option<bool>,
    pub retry: RetrySettings,
    pub file_system_retries: Option<u32>,
    pub settle: SettleSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetrySettings {
    pub max_retries: Option<u32>,
    pub delay_ms: Option<u64>,
}

/// Waits for provider-side eventual consistency
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettleSettings {
    pub mount_targets_ms: Option<u64>,
    pub subnets_ms: Option<u64>,
    pub security_groups_ms: Option<u64>,
}

/// vpc-reaper's directory under the platform config dir
pub fn get_config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or(ConfigError::ConfigDirNotFound)?
        .join("vpc-reaper"))
}

/// Look for a settings file
///
/// Lookup order:
/// 1. `VPC_REAPER_CONFIG` (an error if it points nowhere)
/// 2. Current directory: `vpc-reaper.yaml`, `.vpc-reaper.yaml`
/// 3. `<config dir>/vpc-reaper/config.yaml`
///
/// Returns `None` when there is no settings file at all.
pub fn find_settings_file() -> Result<Option<PathBuf>> {
    if let Ok(config_path) = std::env::var(CONFIG_ENV) {
        let path = PathBuf::from(config_path);
        if !path.is_file() {
            return Err(ConfigError::SettingsFileNotFound(path));
        }
        return Ok(Some(path));
    }

    let current_dir = std::env::current_dir()?;
    for filename in LOCAL_CANDIDATES {
        let path = current_dir.join(filename);
        if path.is_file() {
            return Ok(Some(path));
        }
    }

    if let Ok(config_dir) = get_config_dir() {
        let global = config_dir.join("config.yaml");
        if global.is_file() {
            return Ok(Some(global));
        }
    }

    Ok(None)
}

/// Parse a settings file
pub fn load_from(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(Settings::default());
    }
    serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Find and parse the settings file, falling back to defaults. Returns the
/// path that was used, if any.
pub fn load_settings() -> Result<(Settings, Option<PathBuf>)> {
    match find_settings_file()? {
        Some(path) => Ok((load_from(&path)?, Some(path))),
        None => Ok((Settings::default(), None)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;

    /// Run `f` inside `dir` with the env override unset
    fn in_dir<R>(dir: &Path, f: impl FnOnce() -> R) -> R {
        let original_dir = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir).unwrap();
        let result = temp_env::with_var_unset(CONFIG_ENV, f);
        std::env::set_current_dir(original_dir).unwrap();
        result
    }

    #[test]
    fn test_get_config_dir() {
        let config_dir = get_config_dir().unwrap();
        assert!(config_dir.ends_with("vpc-reaper"));
    }

    #[test]
    #[serial]
    fn test_find_settings_file_in_current_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("vpc-reaper.yaml"), "region: eu-west-1\n").unwrap();

        let found = in_dir(temp_dir.path(), find_settings_file).unwrap();
        assert!(found.unwrap().ends_with("vpc-reaper.yaml"));
    }

    #[test]
    #[serial]
    fn test_visible_file_wins_over_hidden() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("vpc-reaper.yaml"), "").unwrap();
        fs::write(temp_dir.path().join(".vpc-reaper.yaml"), "").unwrap();

        let found = in_dir(temp_dir.path(), find_settings_file).unwrap().unwrap();
        assert_eq!(found.file_name().unwrap(), "vpc-reaper.yaml");
    }

    #[test]
    #[serial]
    fn test_env_var_takes_priority() {
        let temp_dir = tempfile::tempdir().unwrap();
        fs::write(temp_dir.path().join("vpc-reaper.yaml"), "").unwrap();
        let custom = temp_dir.path().join("custom.yaml");
        fs::write(&custom, "release_addresses: true\n").unwrap();

        let found = temp_env::with_var(CONFIG_ENV, Some(&custom), find_settings_file).unwrap();
        assert_eq!(found, Some(custom));
    }

    #[test]
    #[serial]
    fn test_env_var_pointing_nowhere_is_an_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let missing = temp_dir.path().join("missing.yaml");

        let result = temp_env::with_var(CONFIG_ENV, Some(&missing), find_settings_file);
        assert!(matches!(result, Err(ConfigError::SettingsFileNotFound(p)) if p == missing));
    }

    #[cfg(target_os = "linux")]
    #[test]
    #[serial]
    fn test_global_settings_file() {
        let home = tempfile::tempdir().unwrap();
        let global_dir = home.path().join("vpc-reaper");
        fs::create_dir_all(&global_dir).unwrap();
        fs::write(global_dir.join("config.yaml"), "file_system_retries: 3\n").unwrap();
        let work = tempfile::tempdir().unwrap();

        let (settings, path) = temp_env::with_var("XDG_CONFIG_HOME", Some(home.path()), || {
            in_dir(work.path(), load_settings)
        })
        .unwrap();
        assert_eq!(path, Some(global_dir.join("config.yaml")));
        assert_eq!(settings.file_system_retries, Some(3));
    }

    #[test]
    #[serial]
    fn test_no_settings_file_means_defaults() {
        let home = tempfile::tempdir().unwrap();
        let work = tempfile::tempdir().unwrap();

        let (settings, path) = temp_env::with_var("XDG_CONFIG_HOME", Some(home.path()), || {
            in_dir(work.path(), load_settings)
        })
        .unwrap();
        assert!(path.is_none());
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_full_settings() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("vpc-reaper.yaml");
        fs::write(
            &path,
            r#"
region: eu-west-1
release_addresses: true
retry:
  max_retries: 5
  delay_ms: 250
file_system_retries: 4
settle:
  mount_targets_ms: 0
  subnets_ms: 100
  security_groups_ms: 50
"#,
        )
        .unwrap();

        let settings = load_from(&path).unwrap();
        assert_eq!(settings.region.as_deref(), Some("eu-west-1"));
        assert_eq!(settings.release_addresses, Some(true));
        assert_eq!(settings.retry.max_retries, Some(5));
        assert_eq!(settings.retry.delay_ms, Some(250));
        assert_eq!(settings.file_system_retries, Some(4));
        assert_eq!(settings.settle.mount_targets_ms, Some(0));
        assert_eq!(settings.settle.subnets_ms, Some(100));
        assert_eq!(settings.settle.security_groups_ms, Some(50));
    }

    #[test]
    fn test_partial_settings_keep_defaults() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("vpc-reaper.yaml");
        fs::write(&path, "retry:\n  max_retries: 3\n").unwrap();

        let settings = load_from(&path).unwrap();
        assert_eq!(settings.retry.max_retries, Some(3));
        assert!(settings.retry.delay_ms.is_none());
        assert!(settings.region.is_none());
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("vpc-reaper.yaml");
        fs::write(&path, "retries: 3\n").unwrap();

        let err = load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("vpc-reaper.yaml"));
    }
}
