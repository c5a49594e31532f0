use crate::error::AppError;
use crate::model::{Category, CategoryKind, Priority, Status, SubTask, Task, UserStats};
use crate::storage::StorageBackend;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use tracing::debug;

/// Per-user relational backend. Rows are scoped to the configured user id;
/// with no user configured, reads come back empty and writes are dropped
/// (logged out means empty state, not an error). Column names follow the
/// snake_case storage convention; tags and subtasks are JSON text decoded
/// tolerantly on read.
pub struct RemoteStore {
    conn: Connection,
    user_id: Option<String>,
}

impl RemoteStore {
    pub fn open(path: &Path, user_id: Option<String>) -> Result<Self, AppError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|err| AppError::io(err.to_string()))?;
        }
        let conn = Connection::open(path)?;
        let store = Self { conn, user_id };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), AppError> {
        self.conn.execute_batch(
            r#"
            PRAGMA journal_mode=WAL;
            PRAGMA synchronous=NORMAL;

            CREATE TABLE IF NOT EXISTS tasks (
              user_id TEXT NOT NULL,
              id TEXT NOT NULL,
              title TEXT NOT NULL,
              description TEXT,
              due_date TEXT,
              priority TEXT NOT NULL,
              status TEXT NOT NULL,
              xp INTEGER NOT NULL,
              category_id TEXT NOT NULL,
              tags TEXT NOT NULL,
              subtasks TEXT NOT NULL,
              created_at TEXT NOT NULL,
              completed_at TEXT,
              PRIMARY KEY (user_id, id)
            );

            CREATE TABLE IF NOT EXISTS categories (
              user_id TEXT NOT NULL,
              id TEXT NOT NULL,
              name TEXT NOT NULL,
              type TEXT NOT NULL,
              PRIMARY KEY (user_id, id)
            );

            CREATE TABLE IF NOT EXISTS user_stats (
              user_id TEXT PRIMARY KEY,
              level INTEGER NOT NULL,
              current_xp INTEGER NOT NULL,
              next_level_xp INTEGER NOT NULL,
              total_xp_earned INTEGER NOT NULL,
              quests_completed INTEGER NOT NULL,
              unlocked_achievements TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }
}

fn decode_list<T: serde::de::DeserializeOwned>(raw: &str) -> Vec<T> {
    serde_json::from_str(raw).unwrap_or_default()
}

fn encode_list<T: serde::Serialize>(value: &[T]) -> Result<String, AppError> {
    serde_json::to_string(value).map_err(|err| AppError::invalid_data(err.to_string()))
}

/// Empty due/completed strings become NULL columns, as the wire shape asks.
fn blank_to_null(value: &str) -> Option<&str> {
    if value.is_empty() { None } else { Some(value) }
}

impl StorageBackend for RemoteStore {
    fn load_tasks(&self) -> Result<Vec<Task>, AppError> {
        let Some(user_id) = self.user_id() else {
            return Ok(Vec::new());
        };

        let mut statement = self.conn.prepare(
            "SELECT id, title, description, due_date, priority, status, xp, category_id, \
             tags, subtasks, created_at, completed_at \
             FROM tasks WHERE user_id = ?1 ORDER BY created_at DESC",
        )?;
        let rows = statement.query_map(params![user_id], |row| {
            let priority: String = row.get(4)?;
            let status: String = row.get(5)?;
            let tags: String = row.get(8)?;
            let subtasks: String = row.get(9)?;
            Ok(Task {
                id: row.get(0)?,
                title: row.get(1)?,
                description: row.get(2)?,
                due_date: row.get::<_, Option<String>>(3)?.unwrap_or_default(),
                priority: Priority::parse(&priority).unwrap_or(Priority::Medium),
                status: Status::parse(&status).unwrap_or(Status::Todo),
                xp: row.get(6)?,
                category_id: row.get(7)?,
                tags: decode_list(&tags),
                subtasks: decode_list::<SubTask>(&subtasks),
                created_at: row.get(10)?,
                completed_at: row.get(11)?,
            })
        })?;

        let mut tasks = Vec::new();
        for row in rows {
            tasks.push(row?);
        }
        Ok(tasks)
    }

    fn save_tasks(&self, tasks: &[Task]) -> Result<(), AppError> {
        let Some(user_id) = self.user_id() else {
            debug!("no user configured; dropping remote task save");
            return Ok(());
        };

        for task in tasks {
            self.conn.execute(
                "INSERT INTO tasks (user_id, id, title, description, due_date, priority, \
                 status, xp, category_id, tags, subtasks, created_at, completed_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13) \
                 ON CONFLICT(user_id, id) DO UPDATE SET \
                 title = excluded.title, description = excluded.description, \
                 due_date = excluded.due_date, priority = excluded.priority, \
                 status = excluded.status, xp = excluded.xp, \
                 category_id = excluded.category_id, tags = excluded.tags, \
                 subtasks = excluded.subtasks, created_at = excluded.created_at, \
                 completed_at = excluded.completed_at",
                params![
                    user_id,
                    task.id,
                    task.title,
                    task.description,
                    blank_to_null(&task.due_date),
                    task.priority.as_str(),
                    task.status.as_str(),
                    task.xp,
                    task.category_id,
                    encode_list(&task.tags)?,
                    encode_list(&task.subtasks)?,
                    task.created_at,
                    task.completed_at,
                ],
            )?;
        }
        Ok(())
    }

    fn delete_task(&self, id: &str) -> Result<(), AppError> {
        let Some(user_id) = self.user_id() else {
            return Ok(());
        };
        self.conn.execute(
            "DELETE FROM tasks WHERE user_id = ?1 AND id = ?2",
            params![user_id, id],
        )?;
        Ok(())
    }

    fn load_categories(&self) -> Result<Vec<Category>, AppError> {
        let Some(user_id) = self.user_id() else {
            return Ok(Vec::new());
        };

        let mut statement = self
            .conn
            .prepare("SELECT id, name, type FROM categories WHERE user_id = ?1")?;
        let rows = statement.query_map(params![user_id], |row| {
            let kind: String = row.get(2)?;
            Ok(Category {
                id: row.get(0)?,
                name: row.get(1)?,
                kind: CategoryKind::parse(&kind).unwrap_or(CategoryKind::Custom),
            })
        })?;

        let mut categories = Vec::new();
        for row in rows {
            categories.push(row?);
        }
        Ok(categories)
    }

    fn save_categories(&self, categories: &[Category]) -> Result<(), AppError> {
        let Some(user_id) = self.user_id() else {
            debug!("no user configured; dropping remote category save");
            return Ok(());
        };

        for category in categories {
            self.conn.execute(
                "INSERT INTO categories (user_id, id, name, type) VALUES (?1, ?2, ?3, ?4) \
                 ON CONFLICT(user_id, id) DO UPDATE SET \
                 name = excluded.name, type = excluded.type",
                params![user_id, category.id, category.name, category.kind.as_str()],
            )?;
        }
        Ok(())
    }

    fn delete_category(&self, id: &str) -> Result<(), AppError> {
        let Some(user_id) = self.user_id() else {
            return Ok(());
        };
        self.conn.execute(
            "DELETE FROM categories WHERE user_id = ?1 AND id = ?2",
            params![user_id, id],
        )?;
        Ok(())
    }

    fn load_stats(&self) -> Result<Option<UserStats>, AppError> {
        let Some(user_id) = self.user_id() else {
            return Ok(None);
        };

        let stats = self
            .conn
            .query_row(
                "SELECT level, current_xp, next_level_xp, total_xp_earned, \
                 quests_completed, unlocked_achievements \
                 FROM user_stats WHERE user_id = ?1",
                params![user_id],
                |row| {
                    let unlocked: String = row.get(5)?;
                    Ok(UserStats {
                        level: row.get(0)?,
                        current_xp: row.get(1)?,
                        next_level_xp: row.get(2)?,
                        total_xp_earned: row.get(3)?,
                        quests_completed: row.get(4)?,
                        unlocked_achievements: decode_list(&unlocked),
                    })
                },
            )
            .optional()?;
        Ok(stats)
    }

    fn save_stats(&self, stats: &UserStats) -> Result<(), AppError> {
        let Some(user_id) = self.user_id() else {
            debug!("no user configured; dropping remote stats save");
            return Ok(());
        };

        self.conn.execute(
            "INSERT INTO user_stats (user_id, level, current_xp, next_level_xp, \
             total_xp_earned, quests_completed, unlocked_achievements) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7) \
             ON CONFLICT(user_id) DO UPDATE SET \
             level = excluded.level, current_xp = excluded.current_xp, \
             next_level_xp = excluded.next_level_xp, \
             total_xp_earned = excluded.total_xp_earned, \
             quests_completed = excluded.quests_completed, \
             unlocked_achievements = excluded.unlocked_achievements",
            params![
                user_id,
                stats.level,
                stats.current_xp,
                stats.next_level_xp,
                stats.total_xp_earned,
                stats.quests_completed,
                encode_list(&stats.unlocked_achievements)?,
            ],
        )?;
        Ok(())
    }
}
