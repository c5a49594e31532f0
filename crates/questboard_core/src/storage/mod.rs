use crate::config::{self, Config};
use crate::error::AppError;
use crate::model::{Category, Task, UserStats};

mod json_store;
mod sqlite_store;
pub mod writer;

pub use json_store::LocalStore;
pub use sqlite_store::RemoteStore;

/// Uniform persistence interface over the three entity families. Both
/// implementations are interchangeable from the core's perspective; the
/// backend is chosen once at startup and injected, never branched on per
/// call site. Saves replace whole rows/collections; deletes exist because a
/// row-oriented backend cannot express removal through a save.
pub trait StorageBackend: Send {
    fn load_tasks(&self) -> Result<Vec<Task>, AppError>;
    fn save_tasks(&self, tasks: &[Task]) -> Result<(), AppError>;
    fn delete_task(&self, id: &str) -> Result<(), AppError>;

    fn load_categories(&self) -> Result<Vec<Category>, AppError>;
    fn save_categories(&self, categories: &[Category]) -> Result<(), AppError>;
    fn delete_category(&self, id: &str) -> Result<(), AppError>;

    fn load_stats(&self) -> Result<Option<UserStats>, AppError>;
    fn save_stats(&self, stats: &UserStats) -> Result<(), AppError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageMode {
    Local,
    Remote,
}

impl StorageMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "local" => Some(Self::Local),
            "remote" => Some(Self::Remote),
            _ => None,
        }
    }
}

/// Builds the backend the configuration selects. Defaults to the on-device
/// store when no mode is configured.
pub fn backend_for_config(config: &Config) -> Result<Box<dyn StorageBackend>, AppError> {
    let mode = match config.storage_mode.as_deref() {
        None => StorageMode::Local,
        Some(raw) => StorageMode::parse(raw)
            .ok_or_else(|| AppError::invalid_data(format!("unknown storage mode: {raw}")))?,
    };

    match mode {
        StorageMode::Local => {
            let dir = config::data_dir(config)?;
            Ok(Box::new(LocalStore::open(dir)))
        }
        StorageMode::Remote => {
            let path = match config.database_path.as_deref() {
                Some(path) if !path.trim().is_empty() => std::path::PathBuf::from(path),
                _ => config::data_dir(config)?.join("questboard.db"),
            };
            let store = RemoteStore::open(&path, config.user_id.clone())?;
            Ok(Box::new(store))
        }
    }
}
