//! Task store
//!
//! An in-memory collection of tasks mirroring rows in the hosted table,
//! kept in sync by explicit create/read/update/delete calls. Transport
//! failures are logged and leave local state untouched; the user-visible
//! effect is silence. Nothing is queued or versioned: overlapping updates
//! race and the last response wins locally.

use serde::Serialize;

use crate::config::AppConfig;
use crate::error::{Result, SmartTaskError};
use crate::model::{Task, TaskDraft, TaskPatch};
use crate::session::Session;

#[derive(Serialize)]
struct InsertRow<'a> {
    #[serde(flatten)]
    draft: &'a TaskDraft,
    user_id: &'a str,
}

/// REST client for the hosted `tasks` table, scoped per call to the
/// signed-in user.
pub struct TableClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl TableClient {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        if config.store_url.is_empty() || config.store_key.is_empty() {
            return Err(SmartTaskError::InvalidInput(
                "Store not configured. Set the ST_STORE_URL and ST_STORE_KEY environment variables."
                    .to_string(),
            ));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base_url: config.store_url.trim_end_matches('/').to_string(),
            api_key: config.store_key.clone(),
        })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/tasks", self.base_url)
    }

    fn authed(&self, request: reqwest::RequestBuilder, session: &Session) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&session.access_token)
    }

    /// All rows for the user, newest first.
    async fn select_all(&self, session: &Session) -> Result<Vec<Task>> {
        let user_filter = format!("eq.{}", session.user.id);
        let request = self.http.get(self.table_url()).query(&[
            ("select", "*"),
            ("user_id", user_filter.as_str()),
            ("order", "created_at.desc"),
        ]);
        let response = self.authed(request, session).send().await?;
        let response = Self::check(response).await?;
        Ok(response.json().await?)
    }

    /// Insert one row and return the server's representation of it.
    async fn insert(&self, session: &Session, draft: &TaskDraft) -> Result<Task> {
        let row = InsertRow {
            draft,
            user_id: &session.user.id,
        };
        let request = self
            .http
            .post(self.table_url())
            .header("Prefer", "return=representation")
            .json(&[row]);
        let response = self.authed(request, session).send().await?;
        let response = Self::check(response).await?;

        let mut rows: Vec<Task> = response.json().await?;
        if rows.is_empty() {
            // A write that "succeeds" without a row is treated as a
            // failure rather than guessing at recovery.
            return Err(SmartTaskError::Other(anyhow::anyhow!(
                "Insert returned no row"
            )));
        }
        Ok(rows.remove(0))
    }

    /// Patch only the changed columns of one row.
    async fn update(&self, session: &Session, id: &str, patch: &TaskPatch) -> Result<()> {
        let id_filter = format!("eq.{}", id);
        let user_filter = format!("eq.{}", session.user.id);
        let request = self
            .http
            .patch(self.table_url())
            .query(&[
                ("id", id_filter.as_str()),
                ("user_id", user_filter.as_str()),
            ])
            .json(patch);
        let response = self.authed(request, session).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn delete(&self, session: &Session, id: &str) -> Result<()> {
        let id_filter = format!("eq.{}", id);
        let user_filter = format!("eq.{}", session.user.id);
        let request = self.http.delete(self.table_url()).query(&[
            ("id", id_filter.as_str()),
            ("user_id", user_filter.as_str()),
        ]);
        let response = self.authed(request, session).send().await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "(no body)".to_string());
        Err(SmartTaskError::StoreApi { status, body })
    }
}

/// The client-side cache plus its remote table. All mutators are silent
/// no-ops without a session, and on failure they log and leave the cache
/// unchanged.
pub struct TaskStore {
    remote: TableClient,
    session: Option<Session>,
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new(remote: TableClient, session: Option<Session>) -> Self {
        Self {
            remote,
            session,
            tasks: Vec::new(),
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Resolve a full id or unambiguous id prefix to a task.
    pub fn resolve(&self, id_or_prefix: &str) -> Result<&Task> {
        if let Some(task) = self.get(id_or_prefix) {
            return Ok(task);
        }

        let mut matches = self
            .tasks
            .iter()
            .filter(|t| t.id.starts_with(id_or_prefix));
        match (matches.next(), matches.next()) {
            (Some(task), None) => Ok(task),
            (Some(_), Some(_)) => Err(SmartTaskError::InvalidInput(format!(
                "Task id prefix '{}' is ambiguous",
                id_or_prefix
            ))),
            _ => Err(SmartTaskError::TaskNotFound(id_or_prefix.to_string())),
        }
    }

    /// Fetch all of the user's tasks, newest first, replacing the cache.
    /// Degrades to the unchanged cache on transport error.
    pub async fn load(&mut self) {
        let Some(session) = self.session.clone() else {
            return;
        };

        match self.remote.select_all(&session).await {
            Ok(tasks) => {
                tracing::debug!("Loaded {} tasks", tasks.len());
                self.tasks = tasks;
            },
            Err(e) => tracing::error!("Error loading tasks: {}", e),
        }
    }

    /// Create a task from a draft; on success the server-assigned row is
    /// prepended to the cache and returned. On failure the new task
    /// silently does not appear.
    pub async fn create(&mut self, draft: TaskDraft) -> Option<&Task> {
        let Some(session) = self.session.clone() else {
            return None;
        };

        match self.remote.insert(&session, &draft).await {
            Ok(task) => {
                self.tasks.insert(0, task);
                self.tasks.first()
            },
            Err(e) => {
                tracing::error!("Error adding task: {}", e);
                None
            },
        }
    }

    /// Send only the changed columns, then merge the same patch into the
    /// cached copy. This is an optimistic merge of the request payload,
    /// not a re-fetch; server-side defaulting the client does not
    /// anticipate will drift until the next load.
    pub async fn update(&mut self, id: &str, patch: TaskPatch) {
        let Some(session) = self.session.clone() else {
            return;
        };

        match self.remote.update(&session, id, &patch).await {
            Ok(()) => {
                if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
                    patch.apply_to(task);
                }
            },
            Err(e) => tracing::error!("Error updating task: {}", e),
        }
    }

    /// Delete the remote row, then drop it from the cache.
    pub async fn delete(&mut self, id: &str) {
        let Some(session) = self.session.clone() else {
            return;
        };

        match self.remote.delete(&session, id).await {
            Ok(()) => self.tasks.retain(|t| t.id != id),
            Err(e) => tracing::error!("Error deleting task: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, Priority, Status};
    use chrono::{TimeZone, Utc};

    fn client() -> TableClient {
        let config = AppConfig {
            store_url: "http://127.0.0.1:9".to_string(),
            store_key: "anon".to_string(),
            genai_api_key: String::new(),
            genai_model: "gemini-1.5-flash".to_string(),
        };
        TableClient::from_config(&config).unwrap()
    }

    fn task(id: &str) -> Task {
        Task {
            id: id.to_string(),
            title: format!("Task {}", id),
            description: String::new(),
            category: Category::Work,
            priority: Priority::Medium,
            urgency: Priority::Medium,
            effort: 3,
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

    fn draft() -> TaskDraft {
        TaskDraft {
            title: "New".to_string(),
            description: String::new(),
            category: Category::Work,
            priority: Priority::Medium,
            urgency: Priority::Medium,
            effort: 3,
            status: Status::Todo,
            due_date: None,
            subtasks: Vec::new(),
            ai_enhanced: None,
            original_title: None,
        }
    }

    #[test]
    fn test_unconfigured_store_is_rejected() {
        let config = AppConfig {
            store_url: String::new(),
            store_key: String::new(),
            genai_api_key: String::new(),
            genai_model: "gemini-1.5-flash".to_string(),
        };
        assert!(matches!(
            TableClient::from_config(&config),
            Err(SmartTaskError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_operations_are_noops_without_session() {
        let mut store = TaskStore::new(client(), None);

        store.load().await;
        assert!(store.tasks().is_empty());

        assert!(store.create(draft()).await.is_none());
        store.update("t-1", TaskPatch::default()).await;
        store.delete("t-1").await;
        assert!(store.tasks().is_empty());
    }

    #[test]
    fn test_resolve_by_prefix() {
        let mut store = TaskStore::new(client(), None);
        store.tasks = vec![task("abc-123"), task("abd-456")];

        assert_eq!(store.resolve("abc-123").unwrap().id, "abc-123");
        assert_eq!(store.resolve("abd").unwrap().id, "abd-456");
        assert!(matches!(
            store.resolve("ab"),
            Err(SmartTaskError::InvalidInput(_))
        ));
        assert!(matches!(
            store.resolve("zzz"),
            Err(SmartTaskError::TaskNotFound(_))
        ));
    }

    #[test]
    fn test_insert_row_carries_user_id_and_draft_columns() {
        let draft = draft();
        let row = InsertRow {
            draft: &draft,
            user_id: "u-1",
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["user_id"], "u-1");
        assert_eq!(json["title"], "New");
        assert!(json.get("id").is_none());
        assert!(json.get("created_at").is_none());
    }
}
