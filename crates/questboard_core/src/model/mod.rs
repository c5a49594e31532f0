mod stats;
mod task;

pub use stats::UserStats;
pub use task::{
    Category, CategoryKind, INBOX_CATEGORY_ID, Priority, Status, SubTask, Task,
    default_categories,
};
