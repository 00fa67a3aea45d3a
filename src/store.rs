//! Persistent task store.
//!
//! `TodoStore` holds the task list in memory and mirrors it to a single JSON
//! snapshot on disk. The snapshot is read once when the store is opened and
//! rewritten in full after every mutation.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Result, TodoError};
use crate::task::{NewTask, Task, NAME_MAX_CHARS, NAME_MIN_CHARS};

/// Fixed key the snapshot is stored under; the file is `<key>.json`.
pub const STORAGE_KEY: &str = "TodoApp";

/// Shortest id prefix accepted when resolving tasks by id.
const MIN_ID_PREFIX: usize = 4;

/// Snapshot file name inside a data directory.
pub fn snapshot_file_name() -> String {
    format!("{STORAGE_KEY}.json")
}

/// Check the 2..=32 character name rule.
pub fn validate_name(name: &str) -> Result<()> {
    let len = name.chars().count();
    if (NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&len) {
        Ok(())
    } else {
        Err(TodoError::InvalidName { len })
    }
}

/// In-memory task collection with a write-through JSON mirror.
#[derive(Debug)]
pub struct TodoStore {
    path: PathBuf,
    tasks: Vec<Task>,
}

impl TodoStore {
    /// Restore the snapshot at `path`.
    ///
    /// A missing or empty file yields an empty store. Malformed JSON is an
    /// error so a damaged snapshot is never overwritten. Duplicate ids get a
    /// fresh id in memory; the file is left alone until the next mutation.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut tasks = if path.exists() {
            let buf = fs::read_to_string(&path).map_err(|e| TodoError::io(&path, e))?;
            let trimmed = buf.trim();
            if trimmed.is_empty() || trimmed == "[]" {
                Vec::new()
            } else {
                serde_json::from_str::<Vec<Task>>(trimmed)?
            }
        } else {
            Vec::new()
        };
        let mut seen = HashSet::with_capacity(tasks.len());
        for task in &mut tasks {
            while !seen.insert(task.id) {
                let fresh = Uuid::new_v4();
                warn!("duplicate id {} for '{}' in snapshot, using {fresh}", task.id, task.name);
                task.id = fresh;
            }
        }
        debug!("loaded {} task(s) from {}", tasks.len(), path.display());
        Ok(TodoStore { path, tasks })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All tasks in stored order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Validate and append a new task, then persist.
    ///
    /// On a validation error nothing changes and nothing is written. A failed
    /// write drops the task again, so memory and disk stay in step.
    pub fn add(&mut self, input: NewTask) -> Result<&Task> {
        validate_name(&input.name)?;
        let mut task = Task::new(input);
        while self.get(task.id).is_some() {
            warn!("generated id {} already in use, regenerating", task.id);
            task.id = Uuid::new_v4();
        }
        self.tasks.push(task);
        if let Err(e) = self.persist() {
            self.tasks.pop();
            return Err(e);
        }
        let added = &self.tasks[self.tasks.len() - 1];
        info!("added task {} '{}'", added.id, added.name);
        Ok(added)
    }

    /// Set the completion flag of one task. Unknown ids are a no-op.
    pub fn set_done(&mut self, id: Uuid, value: bool) -> Result<Option<&Task>> {
        let Some(idx) = self.position(id) else {
            return Ok(None);
        };
        let previous = std::mem::replace(&mut self.tasks[idx].is_done, value);
        if let Err(e) = self.persist() {
            self.tasks[idx].is_done = previous;
            return Err(e);
        }
        info!("task {id} marked {}", if value { "done" } else { "open" });
        Ok(self.tasks.get(idx))
    }

    /// Flip the completion flag of one task. Unknown ids are a no-op.
    pub fn toggle(&mut self, id: Uuid) -> Result<Option<&Task>> {
        match self.get(id).map(|t| t.is_done) {
            Some(done) => self.set_done(id, !done),
            None => Ok(None),
        }
    }

    /// Remove one task by id, returning it.
    pub fn remove(&mut self, id: Uuid) -> Result<Option<Task>> {
        let Some(idx) = self.position(id) else {
            return Ok(None);
        };
        let removed = self.tasks.remove(idx);
        if let Err(e) = self.persist() {
            self.tasks.insert(idx, removed);
            return Err(e);
        }
        info!("removed task {} '{}'", removed.id, removed.name);
        Ok(Some(removed))
    }

    /// Drop every completed task. Returns how many were removed.
    pub fn remove_completed(&mut self) -> Result<usize> {
        if !self.tasks.iter().any(|t| t.is_done) {
            return Ok(0);
        }
        let before = self.tasks.clone();
        self.tasks.retain(|t| !t.is_done);
        if let Err(e) = self.persist() {
            self.tasks = before;
            return Err(e);
        }
        let removed = before.len() - self.tasks.len();
        info!("cleared {removed} completed task(s)");
        Ok(removed)
    }

    /// Resolve a full id, a unique id prefix, or an exact task name to an id.
    pub fn resolve(&self, identifier: &str) -> Result<Uuid> {
        let needle = identifier.trim();
        if let Ok(id) = Uuid::parse_str(needle) {
            return self
                .get(id)
                .map(|t| t.id)
                .ok_or_else(|| TodoError::TaskNotFound(needle.to_string()));
        }

        let prefix = needle.to_lowercase().replace('-', "");
        let mut matches: Vec<&Task> = Vec::new();
        if prefix.len() >= MIN_ID_PREFIX && prefix.chars().all(|c| c.is_ascii_hexdigit()) {
            matches = self
                .tasks
                .iter()
                .filter(|t| t.id.simple().to_string().starts_with(&prefix))
                .collect();
        }
        if matches.is_empty() {
            matches = self
                .tasks
                .iter()
                .filter(|t| t.name.to_lowercase() == needle.to_lowercase())
                .collect();
        }

        match matches.as_slice() {
            [] => Err(TodoError::TaskNotFound(needle.to_string())),
            [one] => Ok(one.id),
            many => Err(TodoError::AmbiguousTask {
                identifier: needle.to_string(),
                candidates: many
                    .iter()
                    .map(|t| format!("  {}  {}", t.short_id(), t.name))
                    .collect::<Vec<_>>()
                    .join("\n"),
            }),
        }
    }

    fn position(&self, id: Uuid) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    /// Write the whole collection using an atomic write (temp file + rename).
    fn persist(&self) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| TodoError::io(dir, e))?;
        }
        let data = serde_json::to_string_pretty(&self.tasks)?;
        let tmp = self.path.with_extension("json.tmp");
        let write = || -> std::io::Result<()> {
            let mut f = File::create(&tmp)?;
            f.write_all(data.as_bytes())?;
            f.flush()?;
            fs::rename(&tmp, &self.path)
        };
        if let Err(e) = write() {
            let _ = fs::remove_file(&tmp);
            return Err(TodoError::io(&self.path, e));
        }
        debug!("persisted {} task(s) to {}", self.tasks.len(), self.path.display());
        Ok(())
    }
}
