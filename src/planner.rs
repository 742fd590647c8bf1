//! Daily planning engine
//!
//! Deterministic rule evaluation over the task collection and a selected
//! calendar date. The time-of-day advice is a static lookup table, not a
//! learned or configurable policy.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::metrics::is_overdue;
use crate::model::Task;

/// At most this many high-priority tasks are surfaced on the plan.
const HIGH_PRIORITY_SPOTLIGHT: usize = 3;

/// More tasks than this on one day counts as an overloaded schedule.
const DAY_OVERLOAD_THRESHOLD: usize = 5;

/// Tasks whose due date falls on the selected calendar day,
/// time-of-day ignored.
pub fn tasks_for_date<'a>(tasks: &'a [Task], date: NaiveDate) -> Vec<&'a Task> {
    tasks.iter().filter(|t| t.due_date == Some(date)).collect()
}

/// High/Critical pending tasks, first three in collection order.
pub fn high_priority_spotlight<'a>(tasks: &'a [Task]) -> Vec<&'a Task> {
    crate::metrics::high_priority_pending(tasks)
        .into_iter()
        .take(HIGH_PRIORITY_SPOTLIGHT)
        .collect()
}

pub fn overdue_tasks<'a>(tasks: &'a [Task], now: DateTime<Utc>) -> Vec<&'a Task> {
    tasks.iter().filter(|t| is_overdue(t, now)).collect()
}

/// Suggested time of day for a task, keyed on category keywords and
/// gated by effort.
pub fn time_recommendation(task: &Task) -> &'static str {
    let category = task.category.as_str().to_ascii_lowercase();

    if category.contains("work") || category.contains("study") {
        if task.effort >= 4 {
            "Morning (High Focus)"
        } else {
            "Morning/Afternoon"
        }
    } else if category.contains("communication") {
        "Business Hours"
    } else if category.contains("health") || category.contains("exercise") {
        "Morning/Evening"
    } else if task.effort >= 4 {
        "When Energy is High"
    } else {
        "Flexible"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationKind {
    Urgent,
    Workload,
    Priority,
    Energy,
    Positive,
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub title: String,
    pub description: String,
}

/// Build the day's recommendation list by evaluating the rules in fixed
/// order. Each triggered rule contributes exactly one record; when none
/// trigger, the "well balanced day" fallback keeps the list non-empty.
pub fn recommendations(tasks: &[Task], date: NaiveDate, now: DateTime<Utc>) -> Vec<Recommendation> {
    let mut recommendations = Vec::new();

    let overdue = overdue_tasks(tasks, now);
    if !overdue.is_empty() {
        recommendations.push(Recommendation {
            kind: RecommendationKind::Urgent,
            title: "Address Overdue Tasks".to_string(),
            description: format!(
                "You have {} overdue tasks. Consider rescheduling or completing them first.",
                overdue.len()
            ),
        });
    }

    let day_tasks = tasks_for_date(tasks, date);
    if day_tasks.len() > DAY_OVERLOAD_THRESHOLD {
        recommendations.push(Recommendation {
            kind: RecommendationKind::Workload,
            title: "Heavy Workload Today".to_string(),
            description: "Consider rescheduling non-urgent tasks to maintain quality and avoid burnout."
                .to_string(),
        });
    }

    let spotlight = high_priority_spotlight(tasks);
    if let Some(first) = spotlight.first() {
        recommendations.push(Recommendation {
            kind: RecommendationKind::Priority,
            title: "Focus on High Priority".to_string(),
            description: format!(
                "Start with \"{}\" during your peak energy hours.",
                first.title
            ),
        });
    }

    if day_tasks.iter().any(|t| t.effort >= 4) {
        recommendations.push(Recommendation {
            kind: RecommendationKind::Energy,
            title: "Schedule Demanding Tasks Early".to_string(),
            description: "Tackle high-effort tasks when your energy and focus are at their peak."
                .to_string(),
        });
    }

    if recommendations.is_empty() {
        recommendations.push(Recommendation {
            kind: RecommendationKind::Positive,
            title: "Well Balanced Day".to_string(),
            description: "Your schedule looks manageable. Great job on task planning!".to_string(),
        });
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Priority, Status};
    use chrono::{Duration, TimeZone};

    fn task(id: &str, category: Category, priority: Priority, effort: u8) -> Task {
        Task {
            id: id.to_string(),
            title: format!("Task {}", id),
            description: String::new(),
            category,
            priority,
            urgency: Priority::Medium,
            effort,
            status: Status::Todo,
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

    fn today() -> NaiveDate {
        now().date_naive()
    }

    #[test]
    fn test_tasks_for_date_matches_calendar_day_only() {
        let mut due_today = task("1", Category::Work, Priority::Low, 2);
        due_today.due_date = Some(today());
        let mut due_tomorrow = task("2", Category::Work, Priority::Low, 2);
        due_tomorrow.due_date = Some(today() + Duration::days(1));
        let undated = task("3", Category::Work, Priority::Low, 2);

        let tasks = vec![due_today, due_tomorrow, undated];
        let for_today = tasks_for_date(&tasks, today());
        assert_eq!(for_today.len(), 1);
        assert_eq!(for_today[0].id, "1");
    }

    #[test]
    fn test_high_priority_spotlight_caps_at_three() {
        let tasks: Vec<Task> = (0..5)
            .map(|i| task(&i.to_string(), Category::Work, Priority::Critical, 2))
            .collect();
        let spotlight = high_priority_spotlight(&tasks);
        assert_eq!(spotlight.len(), 3);
        assert_eq!(spotlight[0].id, "0");
    }

    #[test]
    fn test_time_recommendation_table() {
        let mut demanding_work = task("1", Category::Work, Priority::Low, 4);
        assert_eq!(time_recommendation(&demanding_work), "Morning (High Focus)");
        demanding_work.effort = 2;
        assert_eq!(time_recommendation(&demanding_work), "Morning/Afternoon");

        let study = task("2", Category::Study, Priority::Low, 5);
        assert_eq!(time_recommendation(&study), "Morning (High Focus)");

        let calls = task("3", Category::Communication, Priority::Low, 5);
        assert_eq!(time_recommendation(&calls), "Business Hours");

        let workout = task("4", Category::Health, Priority::Low, 2);
        assert_eq!(time_recommendation(&workout), "Morning/Evening");

        let heavy_errand = task("5", Category::Errands, Priority::Low, 4);
        assert_eq!(time_recommendation(&heavy_errand), "When Energy is High");

        let light_errand = task("6", Category::Personal, Priority::Low, 1);
        assert_eq!(time_recommendation(&light_errand), "Flexible");
    }

    #[test]
    fn test_recommendations_fixed_rule_order() {
        let yesterday = today().pred_opt().unwrap();

        let mut overdue = task("1", Category::Work, Priority::Critical, 2);
        overdue.due_date = Some(yesterday);

        let mut demanding_today = task("2", Category::Study, Priority::Low, 5);
        demanding_today.due_date = Some(today());

        let tasks = vec![overdue, demanding_today];
        let recommendations = recommendations(&tasks, today(), now());

        let kinds: Vec<RecommendationKind> =
            recommendations.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                RecommendationKind::Urgent,
                RecommendationKind::Priority,
                RecommendationKind::Energy,
            ]
        );
        assert!(recommendations[0].description.contains("1 overdue"));
        assert!(recommendations[1].description.contains("Task 1"));
    }

    #[test]
    fn test_recommendations_day_overload() {
        let tasks: Vec<Task> = (0..6)
            .map(|i| {
                let mut t = task(&i.to_string(), Category::Personal, Priority::Low, 1);
                t.due_date = Some(today());
                t
            })
            .collect();

        let recommendations = recommendations(&tasks, today(), now());
        assert!(recommendations
            .iter()
            .any(|r| r.kind == RecommendationKind::Workload));
    }

    #[test]
    fn test_recommendations_fallback_never_empty() {
        let recommendations = recommendations(&[], today(), now());
        assert_eq!(recommendations.len(), 1);
        assert_eq!(recommendations[0].kind, RecommendationKind::Positive);
        assert_eq!(recommendations[0].title, "Well Balanced Day");
    }
}
