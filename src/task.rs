//! Task data structure and related functionality.
//!
//! This module defines the `Task` record stored in the snapshot and the
//! `NewTask` input used when creating one from a form or the command line.

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::fields::{Category, Priority};

/// Minimum accepted name length, in characters.
pub const NAME_MIN_CHARS: usize = 2;
/// Maximum accepted name length, in characters.
pub const NAME_MAX_CHARS: usize = 32;

/// A single todo item.
///
/// Field names are camelCase on disk (`isDone`), the deadline is an RFC 3339
/// string or `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub is_done: bool,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub deadline: Option<DateTime<Local>>,
    #[serde(default)]
    pub color: Category,
}

/// User input for a task that does not exist yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTask {
    pub name: String,
    pub priority: Priority,
    pub deadline: Option<DateTime<Local>>,
    pub color: Category,
}

impl NewTask {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn deadline(mut self, deadline: Option<DateTime<Local>>) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn color(mut self, color: Category) -> Self {
        self.color = color;
        self
    }
}

impl Task {
    /// Build a fresh, not yet completed task with a random v4 id.
    pub fn new(input: NewTask) -> Self {
        Task {
            id: Uuid::new_v4(),
            name: input.name,
            is_done: false,
            priority: input.priority,
            deadline: input.deadline,
            color: input.color,
        }
    }

    /// Deadline reduced to a local calendar date.
    pub fn deadline_day(&self) -> Option<NaiveDate> {
        self.deadline.map(|d| d.date_naive())
    }

    /// Whether this task is due on `day`. Tasks without a deadline are due on no day.
    pub fn is_due_on(&self, day: NaiveDate) -> bool {
        self.deadline_day() == Some(day)
    }

    /// First eight characters of the id, enough to address a task from the CLI.
    pub fn short_id(&self) -> String {
        self.id.simple().to_string()[..8].to_string()
    }
}
