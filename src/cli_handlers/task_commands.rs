use chrono::Utc;
use serde_json::json;

use crate::cli::{SubtaskCommands, TaskCommands};
use crate::error::{Result, SmartTaskError};
use crate::metrics::filter_tasks;
use crate::model::{
    Category, Filter, Patch, Priority, Status, Subtask, Task, TaskDraft, TaskPatch,
};
use crate::store::TaskStore;
use crate::time_utils::parse_date;

use super::utils::{short_id, task_detail_line, task_line};

/// Handle all `st task` subcommands
pub async fn handle_task_command(store: &mut TaskStore, cmd: TaskCommands) -> Result<()> {
    match cmd {
        TaskCommands::Add {
            title,
            description,
            category,
            priority,
            urgency,
            effort,
            status,
            due,
            subtasks,
            format,
        } => {
            handle_add(
                store,
                &title,
                &description,
                &category,
                &priority,
                &urgency,
                effort,
                &status,
                due.as_deref(),
                &subtasks,
                &format,
            )
            .await
        },

        TaskCommands::List {
            category,
            priority,
            status,
            format,
        } => handle_list(store, category, priority, status, &format),

        TaskCommands::Show { id, format } => handle_show(store, &id, &format),

        TaskCommands::Edit {
            id,
            title,
            description,
            category,
            priority,
            urgency,
            effort,
            status,
            due,
            format,
        } => {
            handle_edit(
                store,
                &id,
                title,
                description,
                category,
                priority,
                urgency,
                effort,
                status,
                due,
                &format,
            )
            .await
        },

        TaskCommands::Toggle { id, format } => handle_toggle(store, &id, &format).await,

        TaskCommands::Subtask(subtask_cmd) => handle_subtask(store, subtask_cmd).await,

        TaskCommands::Delete { id, format } => handle_delete(store, &id, &format).await,
    }
}

#[allow(clippy::too_many_arguments)]
async fn handle_add(
    store: &mut TaskStore,
    title: &str,
    description: &str,
    category: &str,
    priority: &str,
    urgency: &str,
    effort: u8,
    status: &str,
    due: Option<&str>,
    subtasks: &[String],
    format: &str,
) -> Result<()> {
    // An empty due-date string means "unset".
    let due_date = match due {
        Some(raw) if !raw.trim().is_empty() => Some(parse_date(raw)?),
        _ => None,
    };

    let draft = TaskDraft::from_form(
        title,
        description,
        category.parse::<Category>()?,
        priority.parse::<Priority>()?,
        urgency.parse::<Priority>()?,
        effort,
        status.parse::<Status>()?,
        due_date,
        subtasks,
    )?;

    // On store failure the error is already logged and the task silently
    // does not appear.
    if let Some(task) = store.create(draft).await {
        if format == "json" {
            println!("{}", serde_json::to_string_pretty(task)?);
        } else {
            println!("➕ Created {}", task_line(task));
            println!("   {}", task_detail_line(task));
        }
    }

    Ok(())
}

fn parse_filter(
    category: Option<String>,
    priority: Option<String>,
    status: Option<String>,
) -> Result<Filter> {
    Ok(Filter {
        category: category.map(|c| c.parse()).transpose()?,
        priority: priority.map(|p| p.parse()).transpose()?,
        status: status.map(|s| s.parse()).transpose()?,
    })
}

fn handle_list(
    store: &TaskStore,
    category: Option<String>,
    priority: Option<String>,
    status: Option<String>,
    format: &str,
) -> Result<()> {
    let filter = parse_filter(category, priority, status)?;
    let tasks = filter_tasks(store.tasks(), &filter);

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&tasks)?);
        return Ok(());
    }

    if tasks.is_empty() {
        println!("No tasks match. Create one with 'st task add <title>'.");
        return Ok(());
    }

    println!("📋 Tasks ({})", tasks.len());
    println!();
    for task in tasks {
        println!("{}", task_line(task));
        println!("    {}", task_detail_line(task));
    }
    Ok(())
}

fn handle_show(store: &TaskStore, id: &str, format: &str) -> Result<()> {
    let task = store.resolve(id)?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(task)?);
        return Ok(());
    }

    println!("{}", task_line(task));
    println!("  {}", task_detail_line(task));
    if !task.description.is_empty() {
        println!("  {}", task.description);
    }
    println!("  urgency: {}", task.urgency);
    println!("  created: {}", task.created_at.format("%Y-%m-%d %H:%M"));
    if let Some(completed_at) = task.completed_at {
        println!("  completed: {}", completed_at.format("%Y-%m-%d %H:%M"));
    }
    if let Some(original) = &task.original_title {
        println!("  originally: {}", original);
    }
    if !task.subtasks.is_empty() {
        println!();
        for subtask in &task.subtasks {
            let mark = if subtask.completed { "x" } else { " " };
            println!("  [{}] {}  ({})", mark, subtask.title, short_id(&subtask.id));
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn handle_edit(
    store: &mut TaskStore,
    id: &str,
    title: Option<String>,
    description: Option<String>,
    category: Option<String>,
    priority: Option<String>,
    urgency: Option<String>,
    effort: Option<u8>,
    status: Option<String>,
    due: Option<String>,
    format: &str,
) -> Result<()> {
    let current = store.resolve(id)?;
    let task_id = current.id.clone();
    let current_status = current.status;

    if let Some(title) = &title {
        if title.trim().is_empty() {
            return Err(SmartTaskError::InvalidInput(
                "Task title must not be empty".to_string(),
            ));
        }
    }
    if let Some(effort) = effort {
        if !(1..=5).contains(&effort) {
            return Err(SmartTaskError::InvalidInput(format!(
                "Effort must be between 1 and 5, got {}",
                effort
            )));
        }
    }

    let new_status = status.map(|s| s.parse::<Status>()).transpose()?;
    // Status edits maintain the completed_at invariant, like a toggle.
    let completed_at = match new_status {
        Some(Status::Completed) if current_status != Status::Completed => Patch::Set(Utc::now()),
        Some(status) if status != Status::Completed && current_status == Status::Completed => {
            Patch::Clear
        },
        _ => Patch::Keep,
    };

    let due_date = match due.as_deref() {
        None => Patch::Keep,
        Some(raw) if raw.trim().is_empty() => Patch::Clear,
        Some(raw) => Patch::Set(parse_date(raw)?),
    };

    let patch = TaskPatch {
        title: title.map(|t| t.trim().to_string()),
        description: description.map(|d| d.trim().to_string()),
        category: category.map(|c| c.parse()).transpose()?,
        priority: priority.map(|p| p.parse()).transpose()?,
        urgency: urgency.map(|u| u.parse()).transpose()?,
        effort,
        status: new_status,
        due_date,
        subtasks: None,
        completed_at,
        ai_enhanced: None,
        original_title: None,
    };

    if patch.is_empty() {
        return Err(SmartTaskError::InvalidInput(
            "No changes supplied. Pass at least one field flag.".to_string(),
        ));
    }

    store.update(&task_id, patch).await;
    print_from_cache(store, &task_id, format)
}

async fn handle_toggle(store: &mut TaskStore, id: &str, format: &str) -> Result<()> {
    let task = store.resolve(id)?;
    let task_id = task.id.clone();
    let patch = TaskPatch::toggled_completion(task, Utc::now());

    store.update(&task_id, patch).await;

    if let Some(task) = store.get(&task_id) {
        if format == "json" {
            println!("{}", serde_json::to_string_pretty(task)?);
        } else if task.is_completed() {
            println!("✅ Completed: {}", task.title);
        } else {
            println!("⬜ Reopened: {}", task.title);
        }
    }
    Ok(())
}

async fn handle_subtask(store: &mut TaskStore, cmd: SubtaskCommands) -> Result<()> {
    match cmd {
        SubtaskCommands::Add { id, title, format } => {
            let title = title.trim().to_string();
            if title.is_empty() {
                return Err(SmartTaskError::InvalidInput(
                    "Subtask title must not be empty".to_string(),
                ));
            }

            let task = store.resolve(&id)?;
            let task_id = task.id.clone();
            let mut subtasks = task.subtasks.clone();
            subtasks.push(Subtask::new(title));

            store
                .update(&task_id, TaskPatch::with_subtasks(subtasks))
                .await;
            print_from_cache(store, &task_id, &format)
        },

        SubtaskCommands::Toggle {
            id,
            subtask_id,
            format,
        } => {
            let task = store.resolve(&id)?;
            let task_id = task.id.clone();
            let mut subtasks = task.subtasks.clone();
            let index = resolve_subtask(task, &subtask_id)?;
            subtasks[index].completed = !subtasks[index].completed;

            store
                .update(&task_id, TaskPatch::with_subtasks(subtasks))
                .await;
            print_from_cache(store, &task_id, &format)
        },

        SubtaskCommands::Remove {
            id,
            subtask_id,
            format,
        } => {
            let task = store.resolve(&id)?;
            let task_id = task.id.clone();
            let mut subtasks = task.subtasks.clone();
            let index = resolve_subtask(task, &subtask_id)?;
            subtasks.remove(index);

            store
                .update(&task_id, TaskPatch::with_subtasks(subtasks))
                .await;
            print_from_cache(store, &task_id, &format)
        },
    }
}

fn resolve_subtask(task: &Task, id_or_prefix: &str) -> Result<usize> {
    if let Some(index) = task.subtasks.iter().position(|s| s.id == id_or_prefix) {
        return Ok(index);
    }

    let mut matches = task
        .subtasks
        .iter()
        .enumerate()
        .filter(|(_, s)| s.id.starts_with(id_or_prefix));
    match (matches.next(), matches.next()) {
        (Some((index, _)), None) => Ok(index),
        (Some(_), Some(_)) => Err(SmartTaskError::InvalidInput(format!(
            "Subtask id prefix '{}' is ambiguous",
            id_or_prefix
        ))),
        _ => Err(SmartTaskError::TaskNotFound(format!(
            "subtask {} of task {}",
            id_or_prefix, task.id
        ))),
    }
}

async fn handle_delete(store: &mut TaskStore, id: &str, format: &str) -> Result<()> {
    let task = store.resolve(id)?;
    let task_id = task.id.clone();
    let title = task.title.clone();

    store.delete(&task_id).await;

    if store.get(&task_id).is_none() {
        if format == "json" {
            println!("{}", json!({ "deleted": task_id }));
        } else {
            println!("🗑️  Deleted: {}", title);
        }
    }
    Ok(())
}

/// Print a task's post-operation state from the cache. A failed write
/// leaves the cache unchanged (the store logged the error), so this
/// always shows what is actually held locally.
fn print_from_cache(store: &TaskStore, task_id: &str, format: &str) -> Result<()> {
    if let Some(task) = store.get(task_id) {
        if format == "json" {
            println!("{}", serde_json::to_string_pretty(task)?);
        } else {
            println!("{}", task_line(task));
            println!("   {}", task_detail_line(task));
        }
    }
    Ok(())
}
