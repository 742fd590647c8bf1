//! Shared output helpers for the text format.

use crate::metrics::subtask_progress;
use crate::model::{Status, Task};

/// Abbreviated id for display; full ids stay valid everywhere an id is
/// accepted.
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((offset, _)) => &id[..offset],
        None => id,
    }
}

pub fn status_glyph(status: Status) -> &'static str {
    match status {
        Status::Todo => "⬜",
        Status::InProgress => "🔄",
        Status::Completed => "✅",
    }
}

/// One-line task rendering for lists.
pub fn task_line(task: &Task) -> String {
    let mut line = format!(
        "[{}] {} {} {}",
        short_id(&task.id),
        status_glyph(task.status),
        task.category.icon(),
        task.title
    );
    if task.is_ai_enhanced() {
        line.push_str(" ✨");
    }
    line
}

/// Second line of attributes under a task entry.
pub fn task_detail_line(task: &Task) -> String {
    let mut parts = vec![
        task.category.as_str().to_string(),
        format!("{} priority", task.priority),
        format!("effort {}", task.effort),
    ];
    if let Some(due) = task.due_date {
        parts.push(format!("due {}", due));
    }
    if !task.subtasks.is_empty() {
        let completed = task.subtasks.iter().filter(|s| s.completed).count();
        parts.push(format!(
            "subtasks {}/{} ({:.0}%)",
            completed,
            task.subtasks.len(),
            subtask_progress(&task.subtasks)
        ));
    }
    parts.join(" · ")
}
