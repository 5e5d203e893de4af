// ============================================================================
// Deferred Tree Jobs
// ============================================================================
//
// Tree mutations requested while the tree is being traversed (callbacks,
// the editor, other threads) are queued here and applied at the start of
// the next frame, before anything is drawn.

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::JobError;
use crate::item::{Config, Item};

/// A queued tree mutation.
pub enum TreeJob {
    /// Append `item` to `parent`, or insert it before `before` when set.
    AddRuntimeChild {
        parent: String,
        before: String,
        item: Item,
    },
    AddChildAfter { prev: String, item: Item },
    Delete { name: String },
    MoveUp { name: String },
    MoveDown { name: String },
    Configure { name: String, config: Config },
    UpdateDataSource { name: String, source: String },
    ShowAll { name: String },
    HideAll { name: String },
}

impl TreeJob {
    fn op(&self) -> &'static str {
        match self {
            TreeJob::AddRuntimeChild { .. } => "add_runtime_child",
            TreeJob::AddChildAfter { .. } => "add_child_after",
            TreeJob::Delete { .. } => "delete",
            TreeJob::MoveUp { .. } => "move_up",
            TreeJob::MoveDown { .. } => "move_down",
            TreeJob::Configure { .. } => "configure",
            TreeJob::UpdateDataSource { .. } => "update_data_source",
            TreeJob::ShowAll { .. } => "show_all",
            TreeJob::HideAll { .. } => "hide_all",
        }
    }

    /// Apply this job to the tree under `root`.
    pub fn apply(self, root: &mut Item) -> Result<(), JobError> {
        let op = self.op();
        log::debug!("Applying job {:?}", self);

        let not_found = |name: String| JobError::NotFound { op, name };
        match self {
            TreeJob::AddRuntimeChild {
                parent,
                before,
                item,
            } => root
                .add_runtime_child(&parent, &before, item)
                .map_err(|item| JobError::Rejected {
                    op,
                    item: item.name().to_string(),
                }),
            TreeJob::AddChildAfter { prev, item } => {
                root.add_child_after(&prev, item)
                    .map_err(|item| JobError::Rejected {
                        op,
                        item: item.name().to_string(),
                    })
            }
            TreeJob::Delete { name } => {
                if root.delete_child(&name) {
                    Ok(())
                } else {
                    Err(not_found(name))
                }
            }
            TreeJob::MoveUp { name } => {
                if root.move_child_up(&name) {
                    Ok(())
                } else {
                    Err(not_found(name))
                }
            }
            TreeJob::MoveDown { name } => {
                if root.move_child_down(&name) {
                    Ok(())
                } else {
                    Err(not_found(name))
                }
            }
            TreeJob::Configure { name, config } => match root.find_mut(&name) {
                Some(item) => item.set_config(&config).map_err(JobError::from),
                None => Err(not_found(name)),
            },
            TreeJob::UpdateDataSource { name, source } => match root.find_mut(&name) {
                Some(item) => {
                    item.update_data_source(&source);
                    Ok(())
                }
                None => Err(not_found(name)),
            },
            TreeJob::ShowAll { name } => match root.find_mut(&name) {
                Some(item) => {
                    item.show_all();
                    Ok(())
                }
                None => Err(not_found(name)),
            },
            TreeJob::HideAll { name } => match root.find_mut(&name) {
                Some(item) => {
                    item.hide_all();
                    Ok(())
                }
                None => Err(not_found(name)),
            },
        }
    }
}

impl fmt::Debug for TreeJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeJob::AddRuntimeChild {
                parent,
                before,
                item,
            } => write!(
                f,
                "{}(\"{}\" parent=\"{}\" before=\"{}\")",
                self.op(),
                item.name(),
                parent,
                before
            ),
            TreeJob::AddChildAfter { prev, item } => {
                write!(f, "{}(\"{}\" after \"{}\")", self.op(), item.name(), prev)
            }
            TreeJob::Configure { name, config } => {
                write!(f, "{}(\"{}\", {} keys)", self.op(), name, config.len())
            }
            TreeJob::UpdateDataSource { name, source } => {
                write!(f, "{}(\"{}\" -> \"{}\")", self.op(), name, source)
            }
            TreeJob::Delete { name }
            | TreeJob::MoveUp { name }
            | TreeJob::MoveDown { name }
            | TreeJob::ShowAll { name }
            | TreeJob::HideAll { name } => write!(f, "{}(\"{}\")", self.op(), name),
        }
    }
}

/// Shared FIFO of pending tree jobs. Clones share the same queue.
#[derive(Clone, Default)]
pub struct JobQueue {
    pending: Arc<Mutex<VecDeque<TreeJob>>>,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, job: TreeJob) {
        self.lock().push_back(job);
    }

    /// Take every pending job in submission order.
    pub fn drain(&self) -> Vec<TreeJob> {
        self.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Apply all pending jobs to `root`. Failed jobs are logged and
    /// skipped; returns how many succeeded.
    pub fn apply_pending(&self, root: &mut Item) -> usize {
        let jobs = self.drain();
        let total = jobs.len();
        let mut applied = 0;
        for job in jobs {
            match job.apply(root) {
                Ok(()) => applied += 1,
                Err(e) => log::warn!("Job failed: {}", e),
            }
        }
        if total > 0 {
            log::debug!("Applied {}/{} queued job(s)", applied, total);
        }
        applied
    }

    // Convenience wrappers

    pub fn add_runtime_child(&self, parent: impl Into<String>, before: impl Into<String>, item: Item) {
        self.push(TreeJob::AddRuntimeChild {
            parent: parent.into(),
            before: before.into(),
            item,
        });
    }

    pub fn add_child_after(&self, prev: impl Into<String>, item: Item) {
        self.push(TreeJob::AddChildAfter {
            prev: prev.into(),
            item,
        });
    }

    pub fn delete(&self, name: impl Into<String>) {
        self.push(TreeJob::Delete { name: name.into() });
    }

    pub fn move_up(&self, name: impl Into<String>) {
        self.push(TreeJob::MoveUp { name: name.into() });
    }

    pub fn move_down(&self, name: impl Into<String>) {
        self.push(TreeJob::MoveDown { name: name.into() });
    }

    pub fn configure(&self, name: impl Into<String>, config: Config) {
        self.push(TreeJob::Configure {
            name: name.into(),
            config,
        });
    }

    pub fn update_data_source(&self, name: impl Into<String>, source: impl Into<String>) {
        self.push(TreeJob::UpdateDataSource {
            name: name.into(),
            source: source.into(),
        });
    }

    pub fn show_all(&self, name: impl Into<String>) {
        self.push(TreeJob::ShowAll { name: name.into() });
    }

    pub fn hide_all(&self, name: impl Into<String>) {
        self.push(TreeJob::HideAll { name: name.into() });
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<TreeJob>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for JobQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobQueue").field("pending", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;
    use crate::item::ConfigValue;

    fn sample() -> Item {
        Item::root().with_child(Item::window("w").with_child(Item::button("b")))
    }

    #[test]
    fn test_jobs_apply_in_submission_order() {
        let queue = JobQueue::new();
        let mut root = sample();

        queue.add_runtime_child("w", "", Item::button("c"));
        queue.move_up("c");
        queue.delete("b");
        assert_eq!(queue.len(), 3);

        assert_eq!(queue.apply_pending(&mut root), 3);
        assert!(queue.is_empty());
        assert_eq!(root.get_child("w").unwrap().child_names(), ["c"]);
    }

    #[test]
    fn test_failed_job_does_not_stop_the_rest() {
        let queue = JobQueue::new();
        let mut root = sample();

        queue.delete("missing");
        queue.configure("b", config! { "colour" => "red" });
        queue.configure("b", config! { "label" => "Press" });

        assert_eq!(queue.apply_pending(&mut root), 1);
        let label = root.get_child("b").unwrap().get_config()["label"].clone();
        assert_eq!(label, ConfigValue::Text("Press".into()));
    }

    #[test]
    fn test_not_found_error() {
        let err = TreeJob::MoveDown {
            name: "ghost".into(),
        }
        .apply(&mut sample())
        .unwrap_err();
        assert_eq!(err.to_string(), "move_down: no item named \"ghost\"");
    }

    #[test]
    fn test_rejected_insert_names_item() {
        let err = TreeJob::AddChildAfter {
            prev: "nobody".into(),
            item: Item::button("x"),
        }
        .apply(&mut sample())
        .unwrap_err();
        assert!(matches!(err, JobError::Rejected { item, .. } if item == "x"));
    }

    #[test]
    fn test_queue_is_shared_across_threads() {
        let queue = JobQueue::new();
        let remote = queue.clone();
        std::thread::spawn(move || remote.hide_all("w"))
            .join()
            .unwrap();

        let mut root = sample();
        queue.apply_pending(&mut root);
        assert!(!root.get_child("w").unwrap().is_shown());
        assert!(!root.get_child("b").unwrap().is_shown());
    }
}
