//! End-to-end behavior of the library surface, with the server's side of
//! the round-trip simulated: a draft becomes a row the way the store
//! would prepend it, then the dashboard counts and toggle semantics are
//! checked against the same collection.

use chrono::{DateTime, Duration, Utc};
use smarttask::metrics::{completion_rate, due_on_day_pending, high_priority_pending};
use smarttask::model::{Category, Priority, Status, Task, TaskDraft, TaskPatch};

/// What the hosted table hands back after an insert: the draft columns
/// plus a generated id and creation timestamp.
fn server_row(draft: TaskDraft, id: &str, created_at: DateTime<Utc>) -> Task {
    Task {
        id: id.to_string(),
        title: draft.title,
        description: draft.description,
        category: draft.category,
        priority: draft.priority,
        urgency: draft.urgency,
        effort: draft.effort,
        status: draft.status,
        due_date: draft.due_date,
        subtasks: draft.subtasks,
        created_at,
        completed_at: None,
        ai_enhanced: draft.ai_enhanced,
        original_title: draft.original_title,
        user_id: Some("u-1".to_string()),
    }
}

fn existing_task(id: &str, created_at: DateTime<Utc>) -> Task {
    Task {
        id: id.to_string(),
        title: format!("Task {}", id),
        description: String::new(),
        category: Category::Personal,
        priority: Priority::Low,
        urgency: Priority::Low,
        effort: 2,
        status: Status::Todo,
        due_date: None,
        subtasks: Vec::new(),
        created_at,
        completed_at: None,
        ai_enhanced: None,
        original_title: None,
        user_id: Some("u-1".to_string()),
    }
}

#[test]
fn test_create_toggle_round_trip_updates_dashboard_counts() {
    let now = Utc::now();
    let mut tasks = vec![
        existing_task("old-1", now - Duration::days(3)),
        existing_task("old-2", now - Duration::days(9)),
    ];

    let before_high_priority = high_priority_pending(&tasks).len();

    // Create: the server-assigned row is prepended, newest first.
    let draft = TaskDraft::from_form(
        "Write report",
        "",
        Category::Work,
        Priority::High,
        Priority::Medium,
        4,
        Status::Todo,
        None,
        &[],
    )
    .unwrap();
    tasks.insert(0, server_row(draft, "new-1", now));

    assert_eq!(tasks[0].title, "Write report");
    assert_eq!(
        high_priority_pending(&tasks).len(),
        before_high_priority + 1
    );

    // Toggle to Completed: drops out of the pending count, gains a
    // completion timestamp.
    let patch = TaskPatch::toggled_completion(&tasks[0], now);
    patch.apply_to(&mut tasks[0]);

    assert_eq!(tasks[0].status, Status::Completed);
    assert!(tasks[0].completed_at.is_some());
    assert_eq!(high_priority_pending(&tasks).len(), before_high_priority);
    assert!(completion_rate(&tasks) > 0.0);

    // Toggle back: the timestamp is cleared with the status.
    let patch = TaskPatch::toggled_completion(&tasks[0], now);
    patch.apply_to(&mut tasks[0]);
    assert_eq!(tasks[0].status, Status::Todo);
    assert!(tasks[0].completed_at.is_none());
}

#[test]
fn test_due_today_count_ignores_completed_tasks() {
    let now = Utc::now();
    let today = now.date_naive();

    let mut due_pending = existing_task("a", now);
    due_pending.due_date = Some(today);

    let mut due_done = existing_task("b", now);
    due_done.due_date = Some(today);
    let patch = TaskPatch::toggled_completion(&due_done, now);
    patch.apply_to(&mut due_done);

    let tasks = vec![due_pending, due_done];
    assert_eq!(due_on_day_pending(&tasks, today).len(), 1);
}
