use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.json";
const CONFIG_ENV_VAR: &str = "QUESTBOARD_CONFIG_PATH";
const DATA_DIR_ENV_VAR: &str = "QUESTBOARD_DATA_DIR";

/// Startup-time settings. `storage_mode` selects the persistence backend
/// once per process; everything else locates its data.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// "local" (default) or "remote".
    #[serde(default)]
    pub storage_mode: Option<String>,
    #[serde(default)]
    pub data_dir: Option<String>,
    #[serde(default)]
    pub database_path: Option<String>,
    /// Identity the remote store scopes rows to. Absent = logged out.
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ConfigLoad {
    pub config: Config,
    pub error: Option<AppError>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub storage_mode: Option<String>,
    pub data_dir: Option<String>,
    pub database_path: Option<String>,
    pub user_id: Option<String>,
}

impl ConfigOverrides {
    /// Parses `KEY=VALUE` pairs from the command line. Keys match the config
    /// file's field names (snake_case accepted as well).
    pub fn parse(pairs: &[String]) -> Result<Self, AppError> {
        let mut overrides = Self::default();
        for pair in pairs {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| AppError::invalid_input(format!("expected KEY=VALUE, got {pair}")))?;
            let value = value.trim().to_string();
            match key.trim() {
                "storageMode" | "storage_mode" => overrides.storage_mode = Some(value),
                "dataDir" | "data_dir" => overrides.data_dir = Some(value),
                "databasePath" | "database_path" => overrides.database_path = Some(value),
                "userId" | "user_id" => overrides.user_id = Some(value),
                other => {
                    return Err(AppError::invalid_input(format!(
                        "unknown config key: {other}"
                    )));
                }
            }
        }
        Ok(overrides)
    }
}

pub fn config_path() -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    Ok(app_dir()?.join(CONFIG_FILE_NAME))
}

/// Directory the local store and the default database live in.
pub fn data_dir(config: &Config) -> Result<PathBuf, AppError> {
    if let Ok(path) = std::env::var(DATA_DIR_ENV_VAR)
        && !path.trim().is_empty()
    {
        return Ok(PathBuf::from(path));
    }

    if let Some(dir) = config.data_dir.as_deref()
        && !dir.trim().is_empty()
    {
        return Ok(PathBuf::from(dir));
    }

    app_dir()
}

fn app_dir() -> Result<PathBuf, AppError> {
    if cfg!(windows) {
        let appdata =
            std::env::var("APPDATA").map_err(|_| AppError::invalid_data("APPDATA is not set"))?;
        Ok(PathBuf::from(appdata).join("questboard"))
    } else {
        let home = std::env::var("HOME").map_err(|_| AppError::invalid_data("HOME is not set"))?;
        Ok(PathBuf::from(home).join(".config").join("questboard"))
    }
}

pub fn load_config_with_fallback() -> ConfigLoad {
    match config_path() {
        Ok(path) => load_config_with_fallback_from_path(&path),
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_with_fallback_from_path(path: &Path) -> ConfigLoad {
    if !path.exists() {
        return ConfigLoad {
            config: Config::default(),
            error: None,
        };
    }

    match load_config_from_path(path) {
        Ok(config) => ConfigLoad {
            config,
            error: None,
        },
        Err(err) => ConfigLoad {
            config: Config::default(),
            error: Some(err),
        },
    }
}

fn load_config_from_path(path: &Path) -> Result<Config, AppError> {
    let content = std::fs::read_to_string(path)
        .map_err(|err| AppError::io(format!("{}: {}", path.display(), err)))?;
    serde_json::from_str(&content).map_err(|err| {
        AppError::invalid_data(format!("invalid JSON in {}: {}", path.display(), err))
    })
}

pub fn merge_overrides(base: &Config, overrides: &ConfigOverrides) -> Config {
    let mut merged = base.clone();
    if let Some(mode) = overrides.storage_mode.as_ref() {
        merged.storage_mode = Some(mode.clone());
    }
    if let Some(dir) = overrides.data_dir.as_ref() {
        merged.data_dir = Some(dir.clone());
    }
    if let Some(path) = overrides.database_path.as_ref() {
        merged.database_path = Some(path.clone());
    }
    if let Some(user) = overrides.user_id.as_ref() {
        merged.user_id = Some(user.clone());
    }
    merged
}
