//! Derived views over the task list.
//!
//! Nothing here is stored: the daily list, the calendar dots and the month
//! grid are all recomputed from `&[Task]` whenever they are shown.

use chrono::{Datelike, Duration, NaiveDate};

use crate::fields::Category;
use crate::task::Task;

/// Tasks due on `day`, most urgent first. Ties keep stored order.
pub fn tasks_on_day(tasks: &[Task], day: NaiveDate) -> Vec<&Task> {
    let mut daily: Vec<&Task> = tasks.iter().filter(|t| t.is_due_on(day)).collect();
    daily.sort_by_key(|t| t.priority);
    daily
}

/// Distinct categories among tasks due on `day`, in first-seen order.
pub fn colors_on_day(tasks: &[Task], day: NaiveDate) -> Vec<Category> {
    let mut colors = Vec::new();
    for t in tasks.iter().filter(|t| t.is_due_on(day)) {
        if !colors.contains(&t.color) {
            colors.push(t.color);
        }
    }
    colors
}

/// Number of tasks not yet completed.
pub fn open_count(tasks: &[Task]) -> usize {
    tasks.iter().filter(|t| !t.is_done).count()
}

/// First and last day of the month containing `date`.
pub fn month_bounds(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let next = shift_month(first, 1);
    (first, next - Duration::days(1))
}

/// Move `date` by `delta` months, clamping the day to the target month's length.
pub fn shift_month(date: NaiveDate, delta: i32) -> NaiveDate {
    let months = date.year() * 12 + date.month0() as i32 + delta;
    let year = months.div_euclid(12);
    let month = months.rem_euclid(12) as u32 + 1;
    let mut day = date.day();
    loop {
        if let Some(d) = NaiveDate::from_ymd_opt(year, month, day) {
            return d;
        }
        if day <= 28 {
            return date;
        }
        day -= 1;
    }
}

/// Weeks of the month containing `date`, Monday first. Cells outside the month are `None`.
pub fn month_grid(date: NaiveDate) -> Vec<[Option<NaiveDate>; 7]> {
    let (first, last) = month_bounds(date);
    let mut weeks = Vec::new();
    let mut week = [None; 7];
    let mut day = first;
    while day <= last {
        let col = day.weekday().num_days_from_monday() as usize;
        week[col] = Some(day);
        if col == 6 {
            weeks.push(week);
            week = [None; 7];
        }
        day += Duration::days(1);
    }
    if week.iter().any(Option::is_some) {
        weeks.push(week);
    }
    weeks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates::to_local;
    use crate::fields::Priority;
    use crate::task::NewTask;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn due(name: &str, on: NaiveDate, hour: u32, priority: Priority, color: Category) -> Task {
        Task::new(
            NewTask::new(name)
                .priority(priority)
                .color(color)
                .deadline(to_local(on.and_hms_opt(hour, 0, 0).unwrap())),
        )
    }

    fn sample() -> Vec<Task> {
        let d = day(2024, 5, 10);
        vec![
            due("low", d, 8, Priority::Low, Category::Red),
            due("high", d, 23, Priority::High, Category::SkyBlue),
            due("medium", d, 0, Priority::Medium, Category::Red),
            due("other day", day(2024, 5, 11), 0, Priority::High, Category::Orange),
            Task::new(NewTask::new("undated")),
        ]
    }

    #[test]
    fn test_day_filter_excludes_adjacent_days() {
        let tasks = sample();
        let names: Vec<&str> = tasks_on_day(&tasks, day(2024, 5, 10))
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(names, ["high", "medium", "low"]);

        assert!(tasks_on_day(&tasks, day(2024, 5, 9)).is_empty());
        let next: Vec<&str> = tasks_on_day(&tasks, day(2024, 5, 11))
            .iter()
            .map(|t| t.name.as_str())
            .collect();
        assert_eq!(next, ["other day"]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_priority() {
        let d = day(2024, 5, 10);
        let tasks = vec![
            due("b", d, 9, Priority::Medium, Category::Red),
            due("a", d, 9, Priority::Medium, Category::Red),
        ];
        let names: Vec<&str> = tasks_on_day(&tasks, d).iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
    }

    #[test]
    fn test_colors_are_distinct() {
        let tasks = sample();
        assert_eq!(
            colors_on_day(&tasks, day(2024, 5, 10)),
            vec![Category::Red, Category::SkyBlue]
        );
        assert!(colors_on_day(&tasks, day(2024, 5, 12)).is_empty());
    }

    #[test]
    fn test_open_count() {
        let mut tasks = sample();
        tasks[0].is_done = true;
        assert_eq!(open_count(&tasks), 4);
    }

    #[test]
    fn test_shift_month_clamps_day() {
        assert_eq!(shift_month(day(2024, 1, 31), 1), day(2024, 2, 29));
        assert_eq!(shift_month(day(2023, 1, 31), 1), day(2023, 2, 28));
        assert_eq!(shift_month(day(2024, 1, 15), -1), day(2023, 12, 15));
        assert_eq!(shift_month(day(2024, 12, 1), 1), day(2025, 1, 1));
    }

    #[test]
    fn test_month_grid_layout() {
        // May 2024 starts on a Wednesday and has 31 days.
        let grid = month_grid(day(2024, 5, 17));
        assert_eq!(grid.len(), 5);
        assert_eq!(grid[0][..2], [None, None]);
        assert_eq!(grid[0][2], Some(day(2024, 5, 1)));
        assert_eq!(grid[4][4], Some(day(2024, 5, 31)));
        assert_eq!(grid[4][5], None);
        let count = grid.iter().flatten().flatten().count();
        assert_eq!(count, 31);
        assert_eq!(month_bounds(day(2024, 2, 10)), (day(2024, 2, 1), day(2024, 2, 29)));
    }
}
