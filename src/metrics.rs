//! Filter & derived-metrics engine
//!
//! Pure synchronous functions over the in-memory task collection. Nothing
//! here caches or updates incrementally; every view is re-derived from the
//! current collection, with "now"/"today" passed in explicitly.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::model::{Category, Filter, Priority, Status, Subtask, Task};

/// Longest streak the backward walk will report.
const STREAK_CAP_DAYS: u32 = 30;

/// Apply a filter, preserving collection order.
pub fn filter_tasks<'a>(tasks: &'a [Task], filter: &Filter) -> Vec<&'a Task> {
    tasks.iter().filter(|t| filter.matches(t)).collect()
}

/// Share of completed tasks in percent, 0 for an empty collection.
pub fn completion_rate(tasks: &[Task]) -> f64 {
    if tasks.is_empty() {
        return 0.0;
    }
    let completed = tasks.iter().filter(|t| t.is_completed()).count();
    completed as f64 / tasks.len() as f64 * 100.0
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CategoryStat {
    pub total: usize,
    pub completed: usize,
}

impl CategoryStat {
    /// Completion ratio within the category, 0 when it has no tasks.
    pub fn rate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

/// Per-category totals in first-encounter order.
pub fn category_stats(tasks: &[Task]) -> Vec<(Category, CategoryStat)> {
    let mut stats: Vec<(Category, CategoryStat)> = Vec::new();
    for task in tasks {
        let index = match stats.iter().position(|(c, _)| *c == task.category) {
            Some(i) => i,
            None => {
                stats.push((task.category, CategoryStat::default()));
                stats.len() - 1
            },
        };
        let entry = &mut stats[index].1;
        entry.total += 1;
        if task.is_completed() {
            entry.completed += 1;
        }
    }
    stats
}

/// Per-priority counts in first-encounter order.
pub fn priority_breakdown(tasks: &[Task]) -> Vec<(Priority, usize)> {
    let mut counts: Vec<(Priority, usize)> = Vec::new();
    for task in tasks {
        match counts.iter_mut().find(|(p, _)| *p == task.priority) {
            Some((_, n)) => *n += 1,
            None => counts.push((task.priority, 1)),
        }
    }
    counts
}

/// Count of tasks per effort level 1..=5; out-of-range rows are ignored.
pub fn effort_histogram(tasks: &[Task]) -> [usize; 5] {
    let mut histogram = [0usize; 5];
    for task in tasks {
        if (1..=5).contains(&task.effort) {
            histogram[task.effort as usize - 1] += 1;
        }
    }
    histogram
}

/// Arithmetic mean effort over all tasks, 0 when empty.
pub fn average_effort(tasks: &[Task]) -> f64 {
    if tasks.is_empty() {
        return 0.0;
    }
    let sum: u32 = tasks.iter().map(|t| t.effort as u32).sum();
    sum as f64 / tasks.len() as f64
}

/// Display label for an effort level.
pub fn effort_label(level: u8) -> &'static str {
    match level {
        1 => "Very Easy",
        2 => "Easy",
        3 => "Medium",
        4 => "Hard",
        5 => "Very Hard",
        _ => "Unknown",
    }
}

/// A task is overdue when its due date lies on a past calendar day and it
/// has not been completed.
pub fn is_overdue(task: &Task, now: DateTime<Utc>) -> bool {
    match task.due_date {
        Some(due) => due < now.date_naive() && !task.is_completed(),
        None => false,
    }
}

pub fn overdue_count(tasks: &[Task], now: DateTime<Utc>) -> usize {
    tasks.iter().filter(|t| is_overdue(t, now)).count()
}

/// Consecutive trailing calendar days, ending today, that each contain at
/// least one completion. The walk stops at the first empty day and is
/// capped at 30 days. A completion yesterday but none today yields 0.
pub fn completion_streak(tasks: &[Task], today: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut day = today;

    while streak < STREAK_CAP_DAYS {
        let completed_on_day = tasks
            .iter()
            .any(|t| matches!(t.completed_at, Some(at) if at.date_naive() == day));
        if !completed_on_day {
            break;
        }
        streak += 1;
        day = match day.pred_opt() {
            Some(previous) => previous,
            None => break,
        };
    }

    streak
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct WeeklyStats {
    /// Tasks completed within the last 7 days.
    pub completed: usize,
    /// Tasks created within the last 7 days. Independent count, not a
    /// cohort of the completed ones.
    pub created: usize,
}

pub fn weekly_stats(tasks: &[Task], now: DateTime<Utc>) -> WeeklyStats {
    let week_ago = now - Duration::days(7);
    WeeklyStats {
        completed: tasks
            .iter()
            .filter(|t| matches!(t.completed_at, Some(at) if at >= week_ago))
            .count(),
        created: tasks.iter().filter(|t| t.created_at >= week_ago).count(),
    }
}

/// The category with the highest completion ratio. Ties keep the first
/// encountered; None when no category has completed anything (a zero
/// ratio never wins).
pub fn most_productive_category(tasks: &[Task]) -> Option<Category> {
    let mut best: Option<(Category, f64)> = None;
    for (category, stat) in category_stats(tasks) {
        let rate = stat.rate();
        if rate > best.map(|(_, r)| r).unwrap_or(0.0) {
            best = Some((category, rate));
        }
    }
    best.map(|(category, _)| category)
}

/// High or Critical tasks that are not completed, in collection order.
pub fn high_priority_pending<'a>(tasks: &'a [Task]) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| t.priority.is_elevated() && !t.is_completed())
        .collect()
}

/// Tasks due on the given calendar day and not completed.
pub fn due_on_day_pending<'a>(tasks: &'a [Task], day: NaiveDate) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|t| t.due_date == Some(day) && !t.is_completed())
        .collect()
}

/// Share of completed subtasks in percent, 0 for an empty checklist.
pub fn subtask_progress(subtasks: &[Subtask]) -> f64 {
    if subtasks.is_empty() {
        return 0.0;
    }
    let completed = subtasks.iter().filter(|s| s.completed).count();
    completed as f64 / subtasks.len() as f64 * 100.0
}

/// Fixed conditional advice for the analytics view.
pub fn insight_notes(tasks: &[Task], now: DateTime<Utc>) -> Vec<String> {
    let mut notes = Vec::new();

    if completion_rate(tasks) < 50.0 {
        notes.push("Focus on completing existing tasks before adding new ones".to_string());
    }
    if overdue_count(tasks, now) > 0 {
        notes.push("Prioritize overdue tasks to get back on track".to_string());
    }
    if average_effort(tasks) > 4.0 {
        notes.push("Consider breaking down complex tasks into smaller steps".to_string());
    }
    let streak = completion_streak(tasks, now.date_naive());
    if streak == 0 {
        notes.push("Start a completion streak by finishing one task today".to_string());
    } else {
        notes.push(format!(
            "Great job on your {}-day streak! Keep it up!",
            streak
        ));
    }

    notes
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn task(id: &str, category: Category, priority: Priority, status: Status) -> Task {
        Task {
            id: id.to_string(),
            title: format!("Task {}", id),
            description: String::new(),
            category,
            priority,
            urgency: Priority::Medium,
            effort: 3,
            status,
            due_date: None,
            subtasks: Vec::new(),
            created_at: Utc.with_ymd_and_hms(2025, 6, 1, 10, 0, 0).unwrap(),
            completed_at: None,
            ai_enhanced: None,
            original_title: None,
            user_id: None,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_completion_rate_empty_is_zero() {
        assert_eq!(completion_rate(&[]), 0.0);
    }

    #[test]
    fn test_completion_rate_in_range() {
        let tasks = vec![
            task("1", Category::Work, Priority::Low, Status::Completed),
            task("2", Category::Work, Priority::Low, Status::Todo),
            task("3", Category::Work, Priority::Low, Status::Todo),
            task("4", Category::Work, Priority::Low, Status::Completed),
        ];
        let rate = completion_rate(&tasks);
        assert!((0.0..=100.0).contains(&rate));
        assert!((rate - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_filter_by_category_returns_exact_subset() {
        let tasks = vec![
            task("1", Category::Work, Priority::Low, Status::Todo),
            task("2", Category::Health, Priority::Low, Status::Todo),
            task("3", Category::Work, Priority::High, Status::Completed),
        ];
        let filter = Filter {
            category: Some(Category::Work),
            ..Filter::default()
        };

        let filtered = filter_tasks(&tasks, &filter);
        let ids: Vec<&str> = filtered.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_filter_all_axes_absent_preserves_order() {
        let tasks = vec![
            task("1", Category::Work, Priority::Low, Status::Todo),
            task("2", Category::Health, Priority::Low, Status::Todo),
            task("3", Category::Errands, Priority::High, Status::Completed),
        ];
        let filtered = filter_tasks(&tasks, &Filter::default());
        let ids: Vec<&str> = filtered.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_streak_today_and_yesterday_is_two() {
        let today = now().date_naive();
        let mut done_today = task("1", Category::Work, Priority::Low, Status::Completed);
        done_today.completed_at = Some(now());
        let mut done_yesterday = task("2", Category::Work, Priority::Low, Status::Completed);
        done_yesterday.completed_at = Some(now() - Duration::days(1));
        // Gap: nothing two days ago, then an older completion.
        let mut done_last_week = task("3", Category::Work, Priority::Low, Status::Completed);
        done_last_week.completed_at = Some(now() - Duration::days(5));

        let tasks = vec![done_today, done_yesterday, done_last_week];
        assert_eq!(completion_streak(&tasks, today), 2);
    }

    #[test]
    fn test_streak_requires_completion_today() {
        let today = now().date_naive();
        let mut done_yesterday = task("1", Category::Work, Priority::Low, Status::Completed);
        done_yesterday.completed_at = Some(now() - Duration::days(1));

        assert_eq!(completion_streak(&[done_yesterday], today), 0);
    }

    #[test]
    fn test_streak_capped_at_thirty_days() {
        let today = now().date_naive();
        let tasks: Vec<Task> = (0..40)
            .map(|i| {
                let mut t = task(&i.to_string(), Category::Work, Priority::Low, Status::Completed);
                t.completed_at = Some(now() - Duration::days(i));
                t
            })
            .collect();

        assert_eq!(completion_streak(&tasks, today), 30);
    }

    #[test]
    fn test_overdue_predicate() {
        let yesterday = now().date_naive().pred_opt().unwrap();
        let mut todo = task("1", Category::Work, Priority::Low, Status::Todo);
        todo.due_date = Some(yesterday);
        assert!(is_overdue(&todo, now()));

        let mut completed = task("2", Category::Work, Priority::Low, Status::Completed);
        completed.due_date = Some(yesterday);
        assert!(!is_overdue(&completed, now()));

        let mut due_today = task("3", Category::Work, Priority::Low, Status::Todo);
        due_today.due_date = Some(now().date_naive());
        assert!(!is_overdue(&due_today, now()));

        let no_due = task("4", Category::Work, Priority::Low, Status::Todo);
        assert!(!is_overdue(&no_due, now()));
    }

    #[test]
    fn test_weekly_stats_are_independent_counts() {
        let mut old = task("1", Category::Work, Priority::Low, Status::Completed);
        old.created_at = now() - Duration::days(30);
        old.completed_at = Some(now() - Duration::days(2));

        let mut fresh = task("2", Category::Work, Priority::Low, Status::Todo);
        fresh.created_at = now() - Duration::days(1);

        let stats = weekly_stats(&[old, fresh], now());
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.created, 1);
    }

    #[test]
    fn test_category_stats_first_encounter_order() {
        let tasks = vec![
            task("1", Category::Health, Priority::Low, Status::Completed),
            task("2", Category::Work, Priority::Low, Status::Todo),
            task("3", Category::Health, Priority::Low, Status::Todo),
        ];
        let stats = category_stats(&tasks);
        assert_eq!(stats[0].0, Category::Health);
        assert_eq!(stats[0].1.total, 2);
        assert_eq!(stats[0].1.completed, 1);
        assert_eq!(stats[1].0, Category::Work);
        assert_eq!(stats[1].1.total, 1);
    }

    #[test]
    fn test_most_productive_category_prefers_ratio() {
        let tasks = vec![
            task("1", Category::Work, Priority::Low, Status::Todo),
            task("2", Category::Work, Priority::Low, Status::Completed),
            task("3", Category::Health, Priority::Low, Status::Completed),
        ];
        // Health: 1/1 beats Work: 1/2
        assert_eq!(most_productive_category(&tasks), Some(Category::Health));
    }

    #[test]
    fn test_most_productive_category_none_without_completions() {
        let tasks = vec![
            task("1", Category::Work, Priority::Low, Status::Todo),
            task("2", Category::Health, Priority::Low, Status::InProgress),
        ];
        assert_eq!(most_productive_category(&tasks), None);
    }

    #[test]
    fn test_most_productive_category_tie_keeps_first() {
        let tasks = vec![
            task("1", Category::Study, Priority::Low, Status::Completed),
            task("2", Category::Errands, Priority::Low, Status::Completed),
        ];
        assert_eq!(most_productive_category(&tasks), Some(Category::Study));
    }

    #[test]
    fn test_effort_histogram_and_average() {
        let mut easy = task("1", Category::Work, Priority::Low, Status::Todo);
        easy.effort = 1;
        let mut hard = task("2", Category::Work, Priority::Low, Status::Todo);
        hard.effort = 5;

        let tasks = vec![easy, hard];
        let histogram = effort_histogram(&tasks);
        assert_eq!(histogram, [1, 0, 0, 0, 1]);
        assert!((average_effort(&tasks) - 3.0).abs() < f64::EPSILON);
        assert_eq!(average_effort(&[]), 0.0);
    }

    #[test]
    fn test_effort_labels() {
        assert_eq!(effort_label(1), "Very Easy");
        assert_eq!(effort_label(5), "Very Hard");
        assert_eq!(effort_label(7), "Unknown");
    }

    #[test]
    fn test_subtask_progress() {
        assert_eq!(subtask_progress(&[]), 0.0);

        let subtasks = vec![
            Subtask {
                id: "a".to_string(),
                title: "one".to_string(),
                completed: true,
            },
            Subtask {
                id: "b".to_string(),
                title: "two".to_string(),
                completed: false,
            },
        ];
        assert!((subtask_progress(&subtasks) - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_insight_notes_never_empty() {
        assert!(!insight_notes(&[], now()).is_empty());

        let mut done = task("1", Category::Work, Priority::Low, Status::Completed);
        done.completed_at = Some(now());
        let notes = insight_notes(&[done], now());
        assert!(notes.iter().any(|n| n.contains("1-day streak")));
    }

    #[test]
    fn test_high_priority_pending_excludes_completed() {
        let tasks = vec![
            task("1", Category::Work, Priority::High, Status::Todo),
            task("2", Category::Work, Priority::Critical, Status::Completed),
            task("3", Category::Work, Priority::Critical, Status::InProgress),
            task("4", Category::Work, Priority::Low, Status::Todo),
        ];
        let pending = high_priority_pending(&tasks);
        let ids: Vec<&str> = pending.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }
}
