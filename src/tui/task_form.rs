//! Add-task form for the terminal user interface.
//!
//! The form keeps its values between openings, validates the name on every
//! keystroke and only turns into a `NewTask` once both the name and the
//! deadline text are acceptable.

use chrono::{NaiveDate, NaiveTime};

use crate::dates::{format_deadline_input, parse_deadline_input, to_local};
use crate::fields::{Category, Priority};
use crate::store::validate_name;
use crate::task::NewTask;
use crate::tui::input::InputField;

/// Field order, top to bottom.
pub const NAME_FIELD: usize = 0;
pub const PRIORITY_FIELD: usize = 1;
pub const COLOR_FIELD: usize = 2;
pub const DEADLINE_FIELD: usize = 3;
const FIELD_COUNT: usize = 4;

/// Hour used when prefilling the deadline from the selected calendar day.
const DEFAULT_DEADLINE_HOUR: u32 = 9;

pub struct TaskForm {
    pub name: InputField,
    pub deadline: InputField,
    pub priority: usize,
    pub color: usize,
    pub current_field: usize,
    pub name_error: Option<String>,
    pub deadline_error: Option<String>,
}

impl TaskForm {
    pub fn new() -> Self {
        Self {
            name: InputField::new(),
            deadline: InputField::new(),
            priority: 0,
            color: 0,
            current_field: NAME_FIELD,
            name_error: None,
            deadline_error: None,
        }
    }

    pub fn selected_priority(&self) -> Priority {
        Priority::ALL[self.priority % Priority::ALL.len()]
    }

    pub fn selected_color(&self) -> Category {
        Category::ALL[self.color % Category::ALL.len()]
    }

    /// Prefill an empty deadline with `day` at 09:00.
    pub fn prefill_deadline(&mut self, day: NaiveDate) {
        if !self.deadline.value.trim().is_empty() {
            return;
        }
        let time = NaiveTime::from_hms_opt(DEFAULT_DEADLINE_HOUR, 0, 0).unwrap_or(NaiveTime::MIN);
        if let Some(dt) = to_local(day.and_time(time)) {
            self.deadline.set(&format_deadline_input(dt));
        }
    }

    pub fn next_field(&mut self) {
        self.current_field = (self.current_field + 1) % FIELD_COUNT;
    }

    pub fn prev_field(&mut self) {
        self.current_field = (self.current_field + FIELD_COUNT - 1) % FIELD_COUNT;
    }

    /// The text field under focus, if the focus is on one.
    pub fn active_input(&mut self) -> Option<&mut InputField> {
        match self.current_field {
            NAME_FIELD => Some(&mut self.name),
            DEADLINE_FIELD => Some(&mut self.deadline),
            _ => None,
        }
    }

    /// Step a selector field left (-1) or right (+1).
    pub fn cycle(&mut self, delta: isize) {
        fn step(value: usize, len: usize, delta: isize) -> usize {
            (value as isize + delta).rem_euclid(len as isize) as usize
        }
        match self.current_field {
            PRIORITY_FIELD => self.priority = step(self.priority, Priority::ALL.len(), delta),
            COLOR_FIELD => self.color = step(self.color, Category::ALL.len(), delta),
            _ => {}
        }
    }

    /// Re-run validation after an edit to the focused text field.
    pub fn after_edit(&mut self) {
        match self.current_field {
            NAME_FIELD => {
                self.name_error = validate_name(&self.name.value).err().map(|e| short_message(&e));
            }
            DEADLINE_FIELD => self.deadline_error = None,
            _ => {}
        }
    }

    /// Build the task input, recording any problems on the form.
    pub fn submit(&mut self, today: NaiveDate) -> Option<NewTask> {
        if let Err(e) = validate_name(&self.name.value) {
            self.name_error = Some(short_message(&e));
            self.current_field = NAME_FIELD;
            return None;
        }
        let deadline = match parse_deadline_input(&self.deadline.value, today) {
            Ok(d) => d,
            Err(e) => {
                self.deadline_error = Some(e.to_string());
                self.current_field = DEADLINE_FIELD;
                return None;
            }
        };
        Some(
            NewTask::new(self.name.value.clone())
                .priority(self.selected_priority())
                .color(self.selected_color())
                .deadline(deadline),
        )
    }

    /// Clear after a successful add. The category stays selected.
    pub fn reset(&mut self) {
        self.name.clear();
        self.deadline.clear();
        self.priority = 0;
        self.current_field = NAME_FIELD;
        self.name_error = None;
        self.deadline_error = None;
    }
}

/// Validation message without the trailing character count.
fn short_message(e: &crate::error::TodoError) -> String {
    let msg = e.to_string();
    match msg.find(" (got") {
        Some(idx) => msg[..idx].to_string(),
        None => msg,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    fn type_name(form: &mut TaskForm, s: &str) {
        form.current_field = NAME_FIELD;
        for c in s.chars() {
            form.name.handle_char(c);
            form.after_edit();
        }
    }

    #[test]
    fn test_live_validation() {
        let mut form = TaskForm::new();
        assert!(form.name_error.is_none());
        type_name(&mut form, "a");
        assert_eq!(
            form.name_error.as_deref(),
            Some("Name must be between 2 and 32 characters")
        );
        type_name(&mut form, "b");
        assert!(form.name_error.is_none());
    }

    #[test]
    fn test_submit_rejects_short_name() {
        let mut form = TaskForm::new();
        type_name(&mut form, "x");
        form.current_field = DEADLINE_FIELD;
        assert!(form.submit(day()).is_none());
        assert_eq!(form.current_field, NAME_FIELD);
        assert!(form.name_error.is_some());
    }

    #[test]
    fn test_submit_builds_task() {
        let mut form = TaskForm::new();
        type_name(&mut form, "Essay");
        form.current_field = PRIORITY_FIELD;
        form.cycle(-1);
        form.current_field = COLOR_FIELD;
        form.cycle(1);
        form.prefill_deadline(day());

        let task = form.submit(day()).unwrap();
        assert_eq!(task.name, "Essay");
        assert_eq!(task.priority, Priority::Low);
        assert_eq!(task.color, Category::LightGreen);
        let deadline = task.deadline.unwrap();
        assert_eq!(deadline.date_naive(), day());
        assert_eq!(deadline.hour(), 9);
    }

    #[test]
    fn test_bad_deadline_blocks_submit() {
        let mut form = TaskForm::new();
        type_name(&mut form, "Essay");
        form.deadline.set("whenever");
        assert!(form.submit(day()).is_none());
        assert_eq!(form.current_field, DEADLINE_FIELD);
        assert!(form.deadline_error.is_some());
    }

    #[test]
    fn test_reset_keeps_color() {
        let mut form = TaskForm::new();
        type_name(&mut form, "Essay");
        form.priority = 2;
        form.color = 3;
        form.prefill_deadline(day());
        form.reset();
        assert!(form.name.value.is_empty());
        assert!(form.deadline.value.is_empty());
        assert_eq!(form.selected_priority(), Priority::High);
        assert_eq!(form.selected_color(), Category::Orange);
    }

    #[test]
    fn test_prefill_does_not_overwrite() {
        let mut form = TaskForm::new();
        form.deadline.set("tomorrow");
        form.prefill_deadline(day());
        assert_eq!(form.deadline.value, "tomorrow");
    }
}
