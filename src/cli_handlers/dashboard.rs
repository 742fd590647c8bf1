use chrono::Utc;
use serde_json::json;

use crate::error::Result;
use crate::metrics::{completion_rate, due_on_day_pending, high_priority_pending};
use crate::model::Task;

use super::utils::{task_detail_line, task_line};

/// Handle `st dashboard`: the at-a-glance overview.
pub fn handle_dashboard(tasks: &[Task], format: &str) -> Result<()> {
    let now = Utc::now();
    let today = now.date_naive();

    let total = tasks.len();
    let completed = tasks.iter().filter(|t| t.is_completed()).count();
    let rate = completion_rate(tasks);
    let high_priority = high_priority_pending(tasks).len();
    let due_today = due_on_day_pending(tasks, today).len();
    let recent: Vec<&Task> = tasks.iter().take(5).collect();

    if format == "json" {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "total": total,
                "completed": completed,
                "completion_rate": rate,
                "high_priority_pending": high_priority,
                "due_today": due_today,
                "recent": recent,
            }))?
        );
        return Ok(());
    }

    println!("🧠 SmartTask Dashboard");
    println!();
    println!("  Total tasks:      {} ({} completed)", total, completed);
    println!("  Completion rate:  {:.0}%", rate);
    println!("  High priority:    {} pending", high_priority);
    println!("  Due today:        {}", due_today);
    println!();

    if recent.is_empty() {
        println!("No tasks yet. Create your first task with 'st task add <title>'.");
    } else {
        println!("Recent tasks");
        for task in recent {
            println!("  {}", task_line(task));
            println!("      {}", task_detail_line(task));
        }
    }

    Ok(())
}
