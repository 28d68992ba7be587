use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config directory not found")]
    ConfigDirNotFound,

    #[error(
        "Settings file not found: {0}\n\
        Check the VPC_REAPER_CONFIG environment variable, or unset it to use\n\
        ./vpc-reaper.yaml, ./.vpc-reaper.yaml or ~/.config/vpc-reaper/config.yaml"
    )]
    SettingsFileNotFound(PathBuf),

    #[error("Invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
