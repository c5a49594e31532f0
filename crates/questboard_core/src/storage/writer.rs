use crate::model::{Category, Task, UserStats};
use crate::storage::StorageBackend;
use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;
use tracing::warn;

/// One unit of persistence work, carrying a snapshot of the state to write.
pub enum SaveJob {
    Tasks(Vec<Task>),
    Categories(Vec<Category>),
    Stats(UserStats),
    DeleteTask(String),
    DeleteCategory(String),
}

/// Best-effort write path: a single worker thread drains jobs in submission
/// order, so a newer snapshot can never be overwritten by an older one.
/// Failures are logged and dropped; in-memory state stays authoritative.
/// Dropping the queue closes the channel and joins the worker, which
/// finishes any outstanding jobs first.
pub struct SaveQueue {
    sender: Option<Sender<SaveJob>>,
    handle: Option<JoinHandle<()>>,
}

impl SaveQueue {
    pub fn spawn(backend: Box<dyn StorageBackend>) -> Self {
        let (sender, receiver) = mpsc::channel::<SaveJob>();
        let handle = std::thread::spawn(move || {
            while let Ok(job) = receiver.recv() {
                let (kind, result) = match &job {
                    SaveJob::Tasks(tasks) => ("tasks", backend.save_tasks(tasks)),
                    SaveJob::Categories(categories) => {
                        ("categories", backend.save_categories(categories))
                    }
                    SaveJob::Stats(stats) => ("stats", backend.save_stats(stats)),
                    SaveJob::DeleteTask(id) => ("task delete", backend.delete_task(id)),
                    SaveJob::DeleteCategory(id) => {
                        ("category delete", backend.delete_category(id))
                    }
                };
                if let Err(err) = result {
                    warn!("{kind} save failed, keeping in-memory state: {err}");
                }
            }
        });
        Self {
            sender: Some(sender),
            handle: Some(handle),
        }
    }

    pub fn push(&self, job: SaveJob) {
        if let Some(sender) = self.sender.as_ref()
            && sender.send(job).is_err()
        {
            warn!("save worker is gone; dropping write");
        }
    }
}

impl Drop for SaveQueue {
    fn drop(&mut self) {
        self.sender.take();
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            warn!("save worker panicked");
        }
    }
}
