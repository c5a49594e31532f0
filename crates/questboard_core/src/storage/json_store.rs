use crate::error::AppError;
use crate::model::{Category, Task, UserStats};
use crate::storage::StorageBackend;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::PathBuf;

const TASKS_FILE_NAME: &str = "tasks.json";
const CATEGORIES_FILE_NAME: &str = "categories.json";
const STATS_FILE_NAME: &str = "stats.json";

/// On-device backend: one JSON document per entity family under a data
/// directory, replaced wholesale on every save.
#[derive(Debug)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn load_file<T: DeserializeOwned>(&self, file_name: &str) -> Result<Option<T>, AppError> {
        let path = self.dir.join(file_name);
        if !path.exists() {
            return Ok(None);
        }

        let content =
            std::fs::read_to_string(&path).map_err(|err| AppError::io(err.to_string()))?;
        let value = serde_json::from_str(&content)
            .map_err(|err| AppError::invalid_data(format!("{file_name}: {err}")))?;
        Ok(Some(value))
    }

    fn save_file<T: Serialize>(&self, file_name: &str, value: &T) -> Result<(), AppError> {
        std::fs::create_dir_all(&self.dir).map_err(|err| AppError::io(err.to_string()))?;

        let path = self.dir.join(file_name);
        let content = serde_json::to_string_pretty(value)
            .map_err(|err| AppError::invalid_data(err.to_string()))?;
        std::fs::write(&path, content).map_err(|err| AppError::io(err.to_string()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&path, permissions)
                .map_err(|err| AppError::io(err.to_string()))?;
        }

        Ok(())
    }
}

impl StorageBackend for LocalStore {
    fn load_tasks(&self) -> Result<Vec<Task>, AppError> {
        Ok(self.load_file(TASKS_FILE_NAME)?.unwrap_or_default())
    }

    fn save_tasks(&self, tasks: &[Task]) -> Result<(), AppError> {
        self.save_file(TASKS_FILE_NAME, &tasks)
    }

    fn delete_task(&self, id: &str) -> Result<(), AppError> {
        let mut tasks = self.load_tasks()?;
        tasks.retain(|task| task.id != id);
        self.save_tasks(&tasks)
    }

    fn load_categories(&self) -> Result<Vec<Category>, AppError> {
        Ok(self.load_file(CATEGORIES_FILE_NAME)?.unwrap_or_default())
    }

    fn save_categories(&self, categories: &[Category]) -> Result<(), AppError> {
        self.save_file(CATEGORIES_FILE_NAME, &categories)
    }

    fn delete_category(&self, id: &str) -> Result<(), AppError> {
        let mut categories = self.load_categories()?;
        categories.retain(|category| category.id != id);
        self.save_categories(&categories)
    }

    fn load_stats(&self) -> Result<Option<UserStats>, AppError> {
        self.load_file(STATS_FILE_NAME)
    }

    fn save_stats(&self, stats: &UserStats) -> Result<(), AppError> {
        self.save_file(STATS_FILE_NAME, stats)
    }
}
