use chrono::Utc;
use serde_json::json;

use crate::error::Result;
use crate::model::Task;
use crate::planner::{
    high_priority_spotlight, overdue_tasks, recommendations, tasks_for_date, time_recommendation,
};
use crate::time_utils::parse_date;

use super::utils::{status_glyph, task_line};

/// At most this many overdue tasks are listed in the text view.
const OVERDUE_DISPLAY_LIMIT: usize = 3;

/// Handle `st plan`
pub fn handle_plan(tasks: &[Task], date: Option<&str>, format: &str) -> Result<()> {
    let now = Utc::now();
    let today = now.date_naive();
    let date = match date {
        Some(raw) => parse_date(raw)?,
        None => today,
    };

    let day_tasks = tasks_for_date(tasks, date);
    let overdue = overdue_tasks(tasks, now);
    let spotlight = high_priority_spotlight(tasks);
    let advice = recommendations(tasks, date, now);

    if format == "json" {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "date": date.to_string(),
                "is_today": date == today,
                "tasks": day_tasks,
                "overdue": overdue,
                "high_priority": spotlight,
                "recommendations": advice,
            }))?
        );
        return Ok(());
    }

    println!(
        "📅 Daily Plan for {}{}",
        date,
        if date == today { " (today)" } else { "" }
    );
    println!();

    println!("Tasks for this day ({})", day_tasks.len());
    if day_tasks.is_empty() {
        println!("  No tasks scheduled for this day");
    } else {
        for task in &day_tasks {
            println!(
                "  {} {} {} (best time: {})",
                status_glyph(task.status),
                task.category.icon(),
                task.title,
                time_recommendation(task)
            );
        }
    }
    println!();

    if !overdue.is_empty() {
        println!("⚠️  Overdue ({})", overdue.len());
        for task in overdue.iter().take(OVERDUE_DISPLAY_LIMIT) {
            let due = task
                .due_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "no date".to_string());
            println!("  {} (due {})", task.title, due);
        }
        println!();
    }

    if !spotlight.is_empty() {
        println!("🔥 High priority");
        for task in &spotlight {
            println!("  {}", task_line(task));
        }
        println!();
    }

    println!("💡 Recommendations");
    for recommendation in &advice {
        println!("  • {}: {}", recommendation.title, recommendation.description);
    }
    println!();

    println!("⚡ Energy planning");
    println!("  Morning (High Energy):    complex tasks, creative work");
    println!("  Afternoon (Medium Energy): meetings, routine tasks");
    println!("  Evening (Low Energy):     planning, light tasks");

    Ok(())
}
