use chrono::Utc;
use serde_json::json;

use crate::assistant::{
    draft_from_response, insights_prompt, local_insights, prompt_for, AssistantMode, GenAiClient,
    KeywordClassifier, TaskSummary,
};
use crate::cli::AssistantCommands;
use crate::config::AppConfig;
use crate::error::{Result, SmartTaskError};
use crate::store::TaskStore;

use super::utils::{task_detail_line, task_line};

/// Handle all `st assistant` subcommands
pub async fn handle_assistant_command(
    store: &mut TaskStore,
    config: &AppConfig,
    cmd: AssistantCommands,
) -> Result<()> {
    match cmd {
        AssistantCommands::Enhance {
            input,
            save,
            format,
        } => run_free_mode(store, config, AssistantMode::Enhance, &input, save, &format).await,

        AssistantCommands::Analyze { input, format } => {
            run_free_mode(store, config, AssistantMode::Analyze, &input, false, &format).await
        },

        AssistantCommands::Subtasks {
            input,
            save,
            format,
        } => run_free_mode(store, config, AssistantMode::Subtasks, &input, save, &format).await,

        AssistantCommands::Help { input, format } => {
            run_free_mode(store, config, AssistantMode::Help, &input, false, &format).await
        },

        AssistantCommands::Insights { format } => handle_insights(store, config, &format).await,
    }
}

async fn run_free_mode(
    store: &mut TaskStore,
    config: &AppConfig,
    mode: AssistantMode,
    input: &str,
    save: bool,
    format: &str,
) -> Result<()> {
    let input = input.trim();
    if input.is_empty() {
        return Err(SmartTaskError::InvalidInput(
            "Input text must not be empty".to_string(),
        ));
    }

    let client = GenAiClient::from_config(config)?;
    let prompt = prompt_for(mode, input);

    // A failed generation degrades to the fixed per-mode apology text.
    let response = match client.generate(&prompt).await {
        Ok(text) => text,
        Err(e) => {
            tracing::error!("Error calling generation API: {}", e);
            mode.fallback_message().to_string()
        },
    };

    if format == "json" {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "mode": mode.as_str(),
                "input": input,
                "response": response,
            }))?
        );
    } else {
        println!("🧠 AI Response ({})", mode.as_str());
        println!("──────────────────────────────────────");
        println!("{}", response);
        println!("──────────────────────────────────────");
    }

    if save {
        let draft = draft_from_response(input, &response, &KeywordClassifier);
        let subtask_count = draft.subtasks.len();
        if let Some(task) = store.create(draft).await {
            if format == "json" {
                println!("{}", serde_json::to_string_pretty(task)?);
            } else {
                println!();
                println!("➕ Created {}", task_line(task));
                println!("   {}", task_detail_line(task));
                if subtask_count > 0 {
                    println!("   {} subtasks extracted from the response", subtask_count);
                }
            }
        }
    }

    Ok(())
}

async fn handle_insights(store: &mut TaskStore, config: &AppConfig, format: &str) -> Result<()> {
    let summary = TaskSummary::collect(store.tasks(), Utc::now());
    let client = GenAiClient::from_config(config)?;
    let prompt = insights_prompt(&summary);

    // Insights degrades to a locally templated summary so a failure
    // still yields actionable content.
    let (response, degraded) = match client.generate(&prompt).await {
        Ok(text) => (text, false),
        Err(e) => {
            tracing::error!("Error getting daily insights: {}", e);
            (local_insights(&summary), true)
        },
    };

    if format == "json" {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "mode": AssistantMode::Insights.as_str(),
                "summary": summary,
                "degraded": degraded,
                "response": response,
            }))?
        );
    } else {
        println!("🧠 Daily Insights");
        println!("──────────────────────────────────────");
        println!("{}", response);
        println!("──────────────────────────────────────");
    }

    Ok(())
}
