use crate::error::AppError;
use crate::model::{
    Category, CategoryKind, INBOX_CATEGORY_ID, Priority, Status, SubTask, Task,
    UserStats, default_categories,
};
use crate::progress::ProgressionEngine;
use crate::progress::achievements::Achievement;
use crate::storage::StorageBackend;
use crate::storage::writer::{SaveJob, SaveQueue};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use uuid::Uuid;

/// Fields the caller supplies when creating a quest. Id and creation
/// timestamp are assigned by the board.
#[derive(Debug, Clone)]
pub struct TaskDraft {
    pub title: String,
    pub description: Option<String>,
    pub due_date: String,
    pub priority: Priority,
    pub xp: u32,
    pub category_id: String,
    pub tags: Vec<String>,
    pub subtasks: Vec<SubTask>,
}

impl Default for TaskDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: None,
            due_date: String::new(),
            priority: Priority::Medium,
            xp: 10,
            category_id: INBOX_CATEGORY_ID.to_string(),
            tags: Vec::new(),
            subtasks: Vec::new(),
        }
    }
}

/// Shallow field merge for `update_task`. Status is deliberately absent:
/// status changes go through `set_task_status` so completion side effects
/// cannot be bypassed.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<String>,
    pub priority: Option<Priority>,
    pub xp: Option<u32>,
    pub category_id: Option<String>,
    pub tags: Option<Vec<String>>,
    pub subtasks: Option<Vec<SubTask>>,
}

/// The unified task-progression service: owns tasks, categories, and the
/// progression engine, and sequences completion side effects internally.
/// Every mutation schedules a best-effort save through the writer queue.
pub struct QuestBoard {
    tasks: Vec<Task>,
    categories: Vec<Category>,
    progress: ProgressionEngine,
    queue: SaveQueue,
}

impl QuestBoard {
    /// Loads all state from the backend, then hands the backend to the save
    /// queue. A board with nothing persisted starts with the default
    /// categories and fresh stats.
    pub fn load(backend: Box<dyn StorageBackend>) -> Result<Self, AppError> {
        let tasks = backend.load_tasks()?;
        let mut categories = backend.load_categories()?;
        if categories.is_empty() {
            categories = default_categories();
        }
        if !categories.iter().any(|c| c.id == INBOX_CATEGORY_ID) {
            categories.insert(
                0,
                Category {
                    id: INBOX_CATEGORY_ID.to_string(),
                    name: "Inbox".to_string(),
                    kind: CategoryKind::System,
                },
            );
        }
        let stats = backend.load_stats()?.unwrap_or_default();

        Ok(Self {
            tasks,
            categories,
            progress: ProgressionEngine::new(stats),
            queue: SaveQueue::spawn(backend),
        })
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn stats(&self) -> &UserStats {
        self.progress.stats()
    }

    pub fn recent_unlocks(&self) -> &[&'static Achievement] {
        self.progress.recent_unlocks()
    }

    pub fn clear_recent_unlocks(&mut self) {
        self.progress.clear_recent_unlocks();
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn add_task(&mut self, draft: TaskDraft) -> Result<Task, AppError> {
        let task = Task {
            id: Uuid::new_v4().to_string(),
            title: draft.title,
            description: draft.description,
            due_date: draft.due_date,
            priority: draft.priority,
            status: Status::Todo,
            xp: draft.xp,
            category_id: draft.category_id,
            tags: draft.tags,
            subtasks: draft.subtasks,
            created_at: now_rfc3339()?,
            completed_at: None,
        };
        self.tasks.push(task.clone());
        self.schedule_task_save();
        Ok(task)
    }

    /// Shallow-merges the patch into the matching task. Unknown id is a
    /// silent no-op.
    pub fn update_task(&mut self, id: &str, patch: TaskPatch) -> Option<Task> {
        let task = self.tasks.iter_mut().find(|task| task.id == id)?;

        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = Some(description);
        }
        if let Some(due_date) = patch.due_date {
            task.due_date = due_date;
        }
        if let Some(priority) = patch.priority {
            task.priority = priority;
        }
        if let Some(xp) = patch.xp {
            task.xp = xp;
        }
        if let Some(category_id) = patch.category_id {
            task.category_id = category_id;
        }
        if let Some(tags) = patch.tags {
            task.tags = tags;
        }
        if let Some(subtasks) = patch.subtasks {
            task.subtasks = subtasks;
        }

        let updated = task.clone();
        self.schedule_task_save();
        Some(updated)
    }

    /// Removes by id; no-op if absent.
    pub fn delete_task(&mut self, id: &str) -> Option<Task> {
        let index = self.tasks.iter().position(|task| task.id == id)?;
        let removed = self.tasks.remove(index);
        self.queue.push(SaveJob::DeleteTask(removed.id.clone()));
        self.schedule_task_save();
        Some(removed)
    }

    pub fn move_task(&mut self, id: &str, category_id: &str) -> Option<Task> {
        self.update_task(
            id,
            TaskPatch {
                category_id: Some(category_id.to_string()),
                ..TaskPatch::default()
            },
        )
    }

    /// Atomic completion toggle. Crossing into done counts the quest AND
    /// grants its XP; leaving done reverses both. Unknown id is a silent
    /// no-op. Returns achievements newly unlocked by the transition.
    pub fn set_task_status(
        &mut self,
        id: &str,
        status: Status,
    ) -> Result<Vec<&'static Achievement>, AppError> {
        let Some(index) = self.tasks.iter().position(|task| task.id == id) else {
            return Ok(Vec::new());
        };

        let current = self.tasks[index].status;
        let xp = self.tasks[index].xp;
        let mut newly = Vec::new();
        let mut progression_touched = false;

        if current != Status::Done && status == Status::Done {
            newly.extend(self.progress.increment_quest_count());
            newly.extend(self.progress.add_xp(xp));
            self.tasks[index].completed_at = Some(now_rfc3339()?);
            progression_touched = true;
        } else if current == Status::Done && status != Status::Done {
            self.progress.decrement_quest_count();
            self.progress.remove_xp(xp);
            self.tasks[index].completed_at = None;
            progression_touched = true;
        }

        self.tasks[index].status = status;
        self.schedule_task_save();
        if progression_touched {
            self.schedule_stats_save();
        }
        Ok(newly)
    }

    /// Moves the listed tasks to the front in the given order. Unknown ids
    /// are ignored; unlisted tasks keep their relative order after the
    /// reordered prefix.
    pub fn reorder_tasks(&mut self, ordered_ids: &[String]) {
        let mut remaining = std::mem::take(&mut self.tasks);
        let mut reordered = Vec::with_capacity(remaining.len());

        for id in ordered_ids {
            if let Some(index) = remaining.iter().position(|task| task.id == *id) {
                reordered.push(remaining.remove(index));
            }
        }
        reordered.append(&mut remaining);

        self.tasks = reordered;
        self.schedule_task_save();
    }

    pub fn add_category(&mut self, name: &str) -> Category {
        let short_id = Uuid::new_v4().simple().to_string();
        let category = Category {
            id: format!("cat_{}", &short_id[..8]),
            name: name.to_string(),
            kind: CategoryKind::Custom,
        };
        self.categories.push(category.clone());
        self.schedule_category_save();
        category
    }

    /// System categories are never deleted. Deleting a custom category
    /// re-points its tasks to the inbox first.
    pub fn delete_category(&mut self, id: &str) {
        let Some(index) = self.categories.iter().position(|category| category.id == id) else {
            return;
        };
        if self.categories[index].kind == CategoryKind::System {
            return;
        }

        let mut tasks_touched = false;
        for task in &mut self.tasks {
            if task.category_id == id {
                task.category_id = INBOX_CATEGORY_ID.to_string();
                tasks_touched = true;
            }
        }

        let removed = self.categories.remove(index);
        if tasks_touched {
            self.schedule_task_save();
        }
        self.queue.push(SaveJob::DeleteCategory(removed.id));
        self.schedule_category_save();
    }

    /// Manual XP grant, outside any quest completion.
    pub fn grant_xp(&mut self, amount: u32) -> Vec<&'static Achievement> {
        let newly = self.progress.add_xp(amount);
        self.schedule_stats_save();
        newly
    }

    pub fn revoke_xp(&mut self, amount: u32) {
        self.progress.remove_xp(amount);
        self.schedule_stats_save();
    }

    fn schedule_task_save(&self) {
        self.queue.push(SaveJob::Tasks(self.tasks.clone()));
    }

    fn schedule_category_save(&self) {
        self.queue.push(SaveJob::Categories(self.categories.clone()));
    }

    fn schedule_stats_save(&self) {
        self.queue.push(SaveJob::Stats(self.progress.stats().clone()));
    }
}

fn now_rfc3339() -> Result<String, AppError> {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .map_err(|err| AppError::invalid_data(err.to_string()))
}
