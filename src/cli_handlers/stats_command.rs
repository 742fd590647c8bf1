use chrono::Utc;
use serde_json::json;

use crate::error::Result;
use crate::metrics::{
    average_effort, category_stats, completion_rate, completion_streak, effort_histogram,
    effort_label, insight_notes, most_productive_category, overdue_count, priority_breakdown,
    weekly_stats,
};
use crate::model::Task;

/// Handle `st stats`
pub fn handle_stats(tasks: &[Task], format: &str) -> Result<()> {
    let now = Utc::now();
    let today = now.date_naive();

    let total = tasks.len();
    let completed = tasks.iter().filter(|t| t.is_completed()).count();
    let rate = completion_rate(tasks);
    let streak = completion_streak(tasks, today);
    let weekly = weekly_stats(tasks, now);
    let overdue = overdue_count(tasks, now);
    let categories = category_stats(tasks);
    let priorities = priority_breakdown(tasks);
    let histogram = effort_histogram(tasks);
    let avg_effort = average_effort(tasks);
    let productive = most_productive_category(tasks);
    let notes = insight_notes(tasks, now);

    if format == "json" {
        let categories: Vec<_> = categories
            .iter()
            .map(|(category, stat)| {
                json!({
                    "category": category,
                    "total": stat.total,
                    "completed": stat.completed,
                    "rate": stat.rate() * 100.0,
                })
            })
            .collect();
        let priorities: Vec<_> = priorities
            .iter()
            .map(|(priority, count)| json!({ "priority": priority, "count": count }))
            .collect();

        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "total": total,
                "completed": completed,
                "completion_rate": rate,
                "streak_days": streak,
                "weekly": weekly,
                "overdue": overdue,
                "categories": categories,
                "priorities": priorities,
                "effort_histogram": histogram,
                "average_effort": avg_effort,
                "most_productive_category": productive,
                "recommendations": notes,
            }))?
        );
        return Ok(());
    }

    println!("📊 Analytics");
    println!();
    println!("  Completion rate:  {:.0}% ({} of {} tasks)", rate, completed, total);
    println!(
        "  Current streak:   {} {} of completing tasks",
        streak,
        if streak == 1 { "day" } else { "days" }
    );
    println!(
        "  This week:        {} completed, {} created",
        weekly.completed, weekly.created
    );
    println!("  Overdue:          {} tasks past due date", overdue);
    println!();

    if !categories.is_empty() {
        println!("Category breakdown");
        for (category, stat) in &categories {
            println!(
                "  {} {:<14} {}/{} ({:.0}%)",
                category.icon(),
                category.as_str(),
                stat.completed,
                stat.total,
                stat.rate() * 100.0
            );
        }
        println!();
    }

    if !priorities.is_empty() {
        println!("Priority distribution");
        for (priority, count) in &priorities {
            let share = if total > 0 {
                *count as f64 / total as f64 * 100.0
            } else {
                0.0
            };
            println!("  {:<9} {} ({:.0}%)", priority.as_str(), count, share);
        }
        println!();
    }

    println!("Effort analysis");
    println!(
        "  Average: {:.1} ({})",
        avg_effort,
        effort_label(avg_effort.round() as u8)
    );
    for (index, count) in histogram.iter().enumerate() {
        println!("  {:<9} {}", effort_label(index as u8 + 1), count);
    }
    println!();

    match productive {
        Some(category) => println!("🏆 Most productive category: {}", category),
        None => println!("🏆 Most productive category: none yet"),
    }
    println!();

    println!("💡 Recommendations");
    for note in &notes {
        println!("  • {}", note);
    }

    Ok(())
}
