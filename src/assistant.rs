//! AI suggestion gateway
//!
//! Builds natural-language prompts from user input or a computed task
//! summary, sends them to the hosted generative-language API, and returns
//! the response text verbatim. The only parsing applied to model output is
//! the numbered-line subtask heuristic, which is best-effort and lossy by
//! design: output not in that exact shape yields zero extracted items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::error::{Result, SmartTaskError};
use crate::model::{Category, Priority, Status, Subtask, Task, TaskDraft};

/// The four free-input request modes plus the summary-driven insights mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistantMode {
    Enhance,
    Analyze,
    Subtasks,
    Help,
    Insights,
}

impl AssistantMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssistantMode::Enhance => "enhance",
            AssistantMode::Analyze => "analyze",
            AssistantMode::Subtasks => "subtasks",
            AssistantMode::Help => "help",
            AssistantMode::Insights => "insights",
        }
    }

    /// Fixed user-facing text shown in place of model output when the
    /// generation call fails. Insights degrades to a local summary
    /// instead, see [`local_insights`].
    pub fn fallback_message(&self) -> &'static str {
        match self {
            AssistantMode::Enhance => {
                "Sorry, I encountered an error while processing your request. Please try again."
            },
            AssistantMode::Analyze => {
                "Sorry, I encountered an error while analyzing your task. Please try again."
            },
            AssistantMode::Subtasks => {
                "Sorry, I encountered an error while generating subtasks. Please try again."
            },
            AssistantMode::Help | AssistantMode::Insights => {
                "Sorry, I encountered an error while generating help. Please try again."
            },
        }
    }
}

/// Prompt template for the free-input modes. Insights is summary-driven
/// and built by [`insights_prompt`] instead; passing it here degrades to
/// the enhance wording.
pub fn prompt_for(mode: AssistantMode, input: &str) -> String {
    match mode {
        AssistantMode::Enhance | AssistantMode::Insights => format!(
            r#"As a task management AI assistant, enhance this vague task: "{input}"

Please provide:
1. A clarified, actionable version of the task
2. Suggested breakdown into specific steps
3. Recommended category (Work, Personal, Health, Study, Communication, Errands)
4. Priority level (Low, Medium, High, Critical) with reasoning
5. Estimated effort level (1-5 scale)
6. Optimal timing suggestions

Format your response clearly with sections."#
        ),
        AssistantMode::Analyze => format!(
            r#"Analyze this task for smart categorization and scheduling: "{input}"

Please provide:
1. Category classification (Work, Personal, Health, Study, Communication, Errands) with reasoning
2. Urgency assessment (Low, Medium, High, Critical) based on context clues
3. Optimal timing recommendations (morning, afternoon, evening) based on task type
4. Energy level requirements and focus needed
5. Dependencies or prerequisites
6. Potential obstacles and how to overcome them

Be specific and actionable in your analysis."#
        ),
        AssistantMode::Subtasks => format!(
            r#"Break down this complex task into specific, actionable subtasks: "{input}"

Please provide:
1. A numbered list of 4-8 specific subtasks
2. Each subtask should be clear and actionable
3. Order them logically (what needs to be done first, second, etc.)
4. Include time estimates for each subtask if possible
5. Note any dependencies between subtasks

Make sure each subtask is something that can be completed in one focused session."#
        ),
        AssistantMode::Help => format!(
            r#"Provide comprehensive help and guidance for this task: "{input}"

Please include:
1. Step-by-step approach or methodology
2. Best practices and tips
3. Common pitfalls to avoid
4. Resources or tools that might be helpful
5. Templates or examples if applicable
6. Quality checkpoints to ensure good results

Be practical and actionable in your advice."#
        ),
    }
}

/// Aggregates the counts the insights prompt (and its local fallback)
/// are built from.
#[derive(Debug, Clone, Serialize)]
pub struct TaskSummary {
    pub total: usize,
    pub completed: usize,
    pub high_priority_pending: usize,
    pub due_today: usize,
    /// Up to five most recent tasks as "title (category, priority)".
    pub recent: Vec<String>,
}

impl TaskSummary {
    pub fn collect(tasks: &[Task], now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        Self {
            total: tasks.len(),
            completed: tasks.iter().filter(|t| t.is_completed()).count(),
            high_priority_pending: crate::metrics::high_priority_pending(tasks).len(),
            due_today: crate::metrics::due_on_day_pending(tasks, today).len(),
            recent: tasks
                .iter()
                .take(5)
                .map(|t| format!("{} ({}, {})", t.title, t.category, t.priority))
                .collect(),
        }
    }

    fn overview(&self) -> String {
        format!(
            "Current tasks summary:\n\
             - Total tasks: {}\n\
             - Completed: {}\n\
             - High priority pending: {}\n\
             - Due today: {}\n\n\
             Recent tasks: {}",
            self.total,
            self.completed,
            self.high_priority_pending,
            self.due_today,
            self.recent.join(", ")
        )
    }
}

/// Prompt for the daily-insights mode, fed by the computed summary
/// rather than raw user input.
pub fn insights_prompt(summary: &TaskSummary) -> String {
    format!(
        r#"Based on this task summary, provide daily planning insights and recommendations:

{}

Please provide:
1. Today's focus priorities
2. Workload assessment
3. Specific recommendations for task ordering
4. Energy management tips
5. Productivity suggestions
6. Motivational insights

Keep it concise but actionable."#,
        summary.overview()
    )
}

/// Locally templated stand-in for daily insights when the generation
/// call fails, so a failure still yields actionable content.
pub fn local_insights(summary: &TaskSummary) -> String {
    format!(
        "Daily Planning Insights:\n\n\
         **Today's Focus:**\n\
         - You have {} tasks due today\n\
         - {} high-priority tasks need attention\n\n\
         **Recommendations:**\n\
         - Start with high-priority tasks during peak energy hours\n\
         - Break large tasks into smaller, manageable chunks\n\
         - Schedule regular breaks to maintain focus\n\
         - Review completed tasks to stay motivated",
        summary.due_today, summary.high_priority_pending
    )
}

/// Extract candidate subtask titles from model output.
///
/// Lines shaped `N. text` (a leading integer, a period, whitespace) are
/// kept with the numeral stripped; everything else is ignored. Lossy on
/// purpose: there is no structured response contract with the model.
pub fn extract_subtasks(response: &str) -> Vec<Subtask> {
    response
        .split('\n')
        .filter_map(parse_numbered_line)
        .map(Subtask::new)
        .collect()
}

fn parse_numbered_line(line: &str) -> Option<&str> {
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let rest = line[digits..].strip_prefix('.')?;
    let title = rest.trim_start();
    // Require at least one whitespace char after the period, then text.
    if title.len() == rest.len() || title.is_empty() {
        return None;
    }
    Some(title)
}

/// Category/priority/urgency chosen for a task synthesized from a
/// model response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub category: Category,
    pub priority: Priority,
    pub urgency: Priority,
}

/// Strategy for classifying raw input into draft attributes. The shipped
/// implementation is keyword matching; the seam exists so a smarter one
/// can replace it without touching call sites.
pub trait DraftClassifier {
    fn classify(&self, input: &str) -> Classification;
}

/// Substring matching on the raw input: "work" selects the Work
/// category, "urgent" elevates both priority axes.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl DraftClassifier for KeywordClassifier {
    fn classify(&self, input: &str) -> Classification {
        let lowered = input.to_lowercase();
        let category = if lowered.contains("work") {
            Category::Work
        } else {
            Category::Personal
        };
        let level = if lowered.contains("urgent") {
            Priority::High
        } else {
            Priority::Medium
        };
        Classification {
            category,
            priority: level,
            urgency: level,
        }
    }
}

/// Synthesize a task draft from a model response: the raw input becomes
/// both title and original title, numbered lines become subtasks, and the
/// classifier fills the attribute axes.
pub fn draft_from_response(
    input: &str,
    response: &str,
    classifier: &dyn DraftClassifier,
) -> TaskDraft {
    let classification = classifier.classify(input);
    TaskDraft {
        title: input.to_string(),
        description: "AI-enhanced task with suggested improvements".to_string(),
        category: classification.category,
        priority: classification.priority,
        urgency: classification.urgency,
        effort: 3,
        status: Status::Todo,
        due_date: None,
        subtasks: extract_subtasks(response),
        ai_enhanced: Some(true),
        original_title: Some(input.to_string()),
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Client for the hosted generative-language endpoint. One call, one
/// prompt string in, one text string out; no streaming.
pub struct GenAiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GenAiClient {
    /// Build a client from process configuration.
    ///
    /// Fails when the API key is missing; the endpoint and model have
    /// working defaults.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        if config.genai_api_key.is_empty() {
            return Err(SmartTaskError::InvalidInput(
                "Generation API not configured. Set the ST_GENAI_API_KEY environment variable."
                    .to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: DEFAULT_ENDPOINT.to_string(),
            api_key: config.genai_api_key.clone(),
            model: config.genai_model.clone(),
        })
    }

    /// Send one prompt and return the generated text.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self.http.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "(no body)".to_string());
            return Err(SmartTaskError::GenerationApi { status, body });
        }

        let generated: GenerateResponse = response.json().await?;

        generated
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| {
                SmartTaskError::Other(anyhow::anyhow!("Generation returned no candidates"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 15, 12, 0, 0).unwrap()
    }

    fn task(id: &str, title: &str, priority: Priority, status: Status) -> Task {
        Task {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            category: Category::Work,
            priority,
            urgency: Priority::Medium,
            effort: 3,
            status,
            due_date: None,
            subtasks: Vec::new(),
            created_at: now(),
            completed_at: None,
            ai_enhanced: None,
            original_title: None,
            user_id: None,
        }
    }

    #[test]
    fn test_extract_subtasks_numbered_lines() {
        let response = "1. Buy milk\n2. Call bank\nNotes: done";
        let subtasks = extract_subtasks(response);
        assert_eq!(subtasks.len(), 2);
        assert_eq!(subtasks[0].title, "Buy milk");
        assert_eq!(subtasks[1].title, "Call bank");
        assert!(!subtasks[0].completed);
    }

    #[test]
    fn test_extract_subtasks_none_without_numbered_lines() {
        let response = "Here is a plan:\n- first\n- second\nGood luck!";
        assert!(extract_subtasks(response).is_empty());
    }

    #[test]
    fn test_extract_subtasks_requires_period_and_space() {
        assert!(extract_subtasks("1 Buy milk").is_empty());
        assert!(extract_subtasks("1.Buy milk").is_empty());
        assert!(extract_subtasks("1. ").is_empty());
        assert_eq!(extract_subtasks("12. Review draft")[0].title, "Review draft");
    }

    #[test]
    fn test_keyword_classifier() {
        let classifier = KeywordClassifier;

        let classification = classifier.classify("Finish work presentation, urgent!");
        assert_eq!(classification.category, Category::Work);
        assert_eq!(classification.priority, Priority::High);
        assert_eq!(classification.urgency, Priority::High);

        let classification = classifier.classify("Water the plants");
        assert_eq!(classification.category, Category::Personal);
        assert_eq!(classification.priority, Priority::Medium);
        assert_eq!(classification.urgency, Priority::Medium);
    }

    #[test]
    fn test_draft_from_response() {
        let draft = draft_from_response(
            "Prepare work demo",
            "1. Outline slides\n2. Record walkthrough",
            &KeywordClassifier,
        );

        assert_eq!(draft.title, "Prepare work demo");
        assert_eq!(draft.original_title.as_deref(), Some("Prepare work demo"));
        assert_eq!(draft.category, Category::Work);
        assert_eq!(draft.effort, 3);
        assert_eq!(draft.status, Status::Todo);
        assert_eq!(draft.ai_enhanced, Some(true));
        assert_eq!(draft.subtasks.len(), 2);
        assert_eq!(draft.subtasks[0].title, "Outline slides");
    }

    #[test]
    fn test_prompts_embed_input() {
        for mode in [
            AssistantMode::Enhance,
            AssistantMode::Analyze,
            AssistantMode::Subtasks,
            AssistantMode::Help,
        ] {
            let prompt = prompt_for(mode, "Fix website bugs");
            assert!(prompt.contains("\"Fix website bugs\""), "{:?}", mode);
        }
    }

    #[test]
    fn test_task_summary_counts() {
        let today = now().date_naive();
        let mut due_today = task("1", "Ship release", Priority::Critical, Status::Todo);
        due_today.due_date = Some(today);
        let done = task("2", "Retro notes", Priority::Low, Status::Completed);
        let pending = task("3", "Budget review", Priority::High, Status::InProgress);

        let summary = TaskSummary::collect(&[due_today, done, pending], now());
        assert_eq!(summary.total, 3);
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.high_priority_pending, 2);
        assert_eq!(summary.due_today, 1);
        assert_eq!(summary.recent.len(), 3);
        assert_eq!(summary.recent[0], "Ship release (Work, Critical)");
    }

    #[test]
    fn test_task_summary_recent_caps_at_five() {
        let tasks: Vec<Task> = (0..8)
            .map(|i| task(&i.to_string(), &format!("T{}", i), Priority::Low, Status::Todo))
            .collect();
        let summary = TaskSummary::collect(&tasks, now());
        assert_eq!(summary.recent.len(), 5);
    }

    #[test]
    fn test_insights_prompt_embeds_summary() {
        let summary = TaskSummary::collect(&[], now());
        let prompt = insights_prompt(&summary);
        assert!(prompt.contains("Total tasks: 0"));
        assert!(prompt.contains("Keep it concise but actionable."));
    }

    #[test]
    fn test_local_insights_uses_counts() {
        let today = now().date_naive();
        let mut due_today = task("1", "Ship release", Priority::Critical, Status::Todo);
        due_today.due_date = Some(today);

        let summary = TaskSummary::collect(&[due_today], now());
        let fallback = local_insights(&summary);
        assert!(fallback.contains("You have 1 tasks due today"));
        assert!(fallback.contains("1 high-priority tasks need attention"));
    }

    #[test]
    fn test_fallback_messages_per_mode() {
        assert!(AssistantMode::Enhance
            .fallback_message()
            .contains("processing your request"));
        assert!(AssistantMode::Analyze
            .fallback_message()
            .contains("analyzing your task"));
        assert!(AssistantMode::Subtasks
            .fallback_message()
            .contains("generating subtasks"));
    }
}
