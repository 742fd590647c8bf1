//! Domain model
//!
//! Task records mirror rows in the hosted `tasks` table (snake_case
//! columns, subtasks as an embedded JSON array). Drafts and patches are the
//! two write shapes: a draft carries every column except the server-assigned
//! `id`/`created_at`, a patch carries only changed columns.

use chrono::{DateTime, NaiveDate, Utc};
use rand::{distr::Alphanumeric, Rng};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SmartTaskError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Work,
    Personal,
    Health,
    Study,
    Communication,
    Errands,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Work => "Work",
            Category::Personal => "Personal",
            Category::Health => "Health",
            Category::Study => "Study",
            Category::Communication => "Communication",
            Category::Errands => "Errands",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Category::Work => "💼",
            Category::Personal => "🏠",
            Category::Health => "🧘",
            Category::Study => "📚",
            Category::Communication => "📞",
            Category::Errands => "🛠️",
        }
    }
}

impl FromStr for Category {
    type Err = SmartTaskError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "work" => Ok(Category::Work),
            "personal" => Ok(Category::Personal),
            "health" => Ok(Category::Health),
            "study" => Ok(Category::Study),
            "communication" => Ok(Category::Communication),
            "errands" => Ok(Category::Errands),
            _ => Err(SmartTaskError::InvalidInput(format!(
                "Invalid category '{}'. Use Work, Personal, Health, Study, Communication or Errands",
                s
            ))),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority and urgency share the same four-level scale but are
/// independent axes on a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
            Priority::Critical => "Critical",
        }
    }

    /// High and Critical tasks surface on the dashboard and planner.
    pub fn is_elevated(&self) -> bool {
        matches!(self, Priority::High | Priority::Critical)
    }
}

impl FromStr for Priority {
    type Err = SmartTaskError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "critical" => Ok(Priority::Critical),
            _ => Err(SmartTaskError::InvalidInput(format!(
                "Invalid priority '{}'. Use Low, Medium, High or Critical",
                s
            ))),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    Todo,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Todo => "Todo",
            Status::InProgress => "In Progress",
            Status::Completed => "Completed",
        }
    }
}

impl FromStr for Status {
    type Err = SmartTaskError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "todo" => Ok(Status::Todo),
            "in progress" | "in-progress" | "inprogress" | "doing" => Ok(Status::InProgress),
            "completed" | "done" => Ok(Status::Completed),
            _ => Err(SmartTaskError::InvalidInput(format!(
                "Invalid status '{}'. Use Todo, 'In Progress' or Completed",
                s
            ))),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A titled checklist item owned by exactly one task. Ids are generated
/// client-side; the whole list travels as one JSON column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: String,
    pub title: String,
    pub completed: bool,
}

impl Subtask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: local_id(),
            title: title.into(),
            completed: false,
        }
    }
}

/// Short random id for client-generated records (subtasks).
pub fn local_id() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(12)
        .map(char::from)
        .collect()
}

/// The central entity, one row in the hosted `tasks` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default, deserialize_with = "null_to_default")]
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub urgency: Priority,
    pub effort: u8,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "null_to_default")]
    pub subtasks: Vec<Subtask>,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_enhanced: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl Task {
    pub fn is_completed(&self) -> bool {
        self.status == Status::Completed
    }

    pub fn is_ai_enhanced(&self) -> bool {
        self.ai_enhanced.unwrap_or(false)
    }
}

/// Nullable columns come back as explicit nulls; treat them like the
/// column being absent.
fn null_to_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Everything a caller supplies to create a task; the store adds the
/// owning user, the server assigns id and created_at.
#[derive(Debug, Clone, Serialize)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub category: Category,
    pub priority: Priority,
    pub urgency: Priority,
    pub effort: u8,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub subtasks: Vec<Subtask>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_enhanced: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_title: Option<String>,
}

impl TaskDraft {
    /// Validate and normalize form input into a draft.
    ///
    /// The title must be non-empty after trimming; subtask titles are
    /// trimmed and empty ones rejected; an empty due-date string means
    /// "unset".
    #[allow(clippy::too_many_arguments)]
    pub fn from_form(
        title: &str,
        description: &str,
        category: Category,
        priority: Priority,
        urgency: Priority,
        effort: u8,
        status: Status,
        due_date: Option<NaiveDate>,
        subtask_titles: &[String],
    ) -> Result<Self> {
        let title = title.trim();
        if title.is_empty() {
            return Err(SmartTaskError::InvalidInput(
                "Task title must not be empty".to_string(),
            ));
        }
        if !(1..=5).contains(&effort) {
            return Err(SmartTaskError::InvalidInput(format!(
                "Effort must be between 1 and 5, got {}",
                effort
            )));
        }

        let mut subtasks = Vec::with_capacity(subtask_titles.len());
        for raw in subtask_titles {
            let sub = raw.trim();
            if sub.is_empty() {
                return Err(SmartTaskError::InvalidInput(
                    "Subtask title must not be empty".to_string(),
                ));
            }
            subtasks.push(Subtask::new(sub));
        }

        Ok(Self {
            title: title.to_string(),
            description: description.trim().to_string(),
            category,
            priority,
            urgency,
            effort,
            status,
            due_date,
            subtasks,
            ai_enhanced: None,
            original_title: None,
        })
    }
}

/// Three-state field for partial updates: left alone, cleared to NULL,
/// or set to a new value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    Keep,
    Clear,
    Set(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Keep
    }
}

impl<T> Patch<T> {
    pub fn is_keep(&self) -> bool {
        matches!(self, Patch::Keep)
    }

    /// Fold into the current value: Keep preserves, Clear empties,
    /// Set replaces.
    pub fn fold_into(&self, slot: &mut Option<T>)
    where
        T: Clone,
    {
        match self {
            Patch::Keep => {},
            Patch::Clear => *slot = None,
            Patch::Set(value) => *slot = Some(value.clone()),
        }
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            // Keep is skipped at the struct level; serializing it anyway
            // degenerates to NULL.
            Patch::Keep | Patch::Clear => serializer.serialize_none(),
            Patch::Set(value) => value.serialize(serializer),
        }
    }
}

/// Partial update for a task. Serializes to exactly the changed columns;
/// the same patch is applied to the cached copy after a successful write
/// (an optimistic merge of the request payload, not a re-fetch).
#[derive(Debug, Clone, Default, Serialize)]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urgency: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effort: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    pub due_date: Patch<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtasks: Option<Vec<Subtask>>,
    #[serde(skip_serializing_if = "Patch::is_keep")]
    pub completed_at: Patch<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_enhanced: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_title: Option<String>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.priority.is_none()
            && self.urgency.is_none()
            && self.effort.is_none()
            && self.status.is_none()
            && self.due_date.is_keep()
            && self.subtasks.is_none()
            && self.completed_at.is_keep()
            && self.ai_enhanced.is_none()
            && self.original_title.is_none()
    }

    /// Flip a task between Completed and Todo, maintaining the invariant
    /// that `completed_at` is present exactly when the status is Completed.
    pub fn toggled_completion(task: &Task, now: DateTime<Utc>) -> Self {
        if task.is_completed() {
            Self {
                status: Some(Status::Todo),
                completed_at: Patch::Clear,
                ..Self::default()
            }
        } else {
            Self {
                status: Some(Status::Completed),
                completed_at: Patch::Set(now),
                ..Self::default()
            }
        }
    }

    /// Replace the whole subtask list (the table stores it as one column).
    pub fn with_subtasks(subtasks: Vec<Subtask>) -> Self {
        Self {
            subtasks: Some(subtasks),
            ..Self::default()
        }
    }

    /// Apply this patch to a cached task: the local half of the optimistic
    /// merge, identical field-for-field to the remote request.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = description.clone();
        }
        if let Some(category) = self.category {
            task.category = category;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(urgency) = self.urgency {
            task.urgency = urgency;
        }
        if let Some(effort) = self.effort {
            task.effort = effort;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        self.due_date.fold_into(&mut task.due_date);
        if let Some(subtasks) = &self.subtasks {
            task.subtasks = subtasks.clone();
        }
        self.completed_at.fold_into(&mut task.completed_at);
        if let Some(ai_enhanced) = self.ai_enhanced {
            task.ai_enhanced = Some(ai_enhanced);
        }
        if let Some(original_title) = &self.original_title {
            task.original_title = Some(original_title.clone());
        }
    }
}

/// Ephemeral selection criteria; an absent axis means no restriction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    pub category: Option<Category>,
    pub priority: Option<Priority>,
    pub status: Option<Status>,
}

impl Filter {
    /// A task passes when it matches every present axis exactly.
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(category) = self.category {
            if task.category != category {
                return false;
            }
        }
        if let Some(priority) = self.priority {
            if task.priority != priority {
                return false;
            }
        }
        if let Some(status) = self.status {
            if task.status != status {
                return false;
            }
        }
        true
    }
}
