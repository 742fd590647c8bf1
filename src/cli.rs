use clap::{Parser, Subcommand};

const LONG_ABOUT: &str = r#"
SmartTask - AI-assisted task manager

Your tasks live in a hosted store and follow you across machines; the
assistant features talk to a generative-language API.

Getting started:
  st auth login --email you@example.com   ← sign in once, the session persists
  st task add "Write report" --category work --priority high
  st dashboard                            ← totals, completion rate, due today
  st plan                                 ← today's schedule and recommendations
  st assistant enhance "fix website"      ← turn a vague note into a real task

Configuration (environment):
  ST_STORE_URL / ST_STORE_KEY    hosted store endpoint and key
  ST_GENAI_API_KEY               generation API key
  ST_GENAI_MODEL                 optional model override
"#;

#[derive(Parser, Clone)]
#[command(name = "smarttask")]
#[command(about = "AI-assisted task manager - hosted tasks, analytics, daily planning")]
#[command(long_about = LONG_ABOUT)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output (-q)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output logs in JSON format
    #[arg(long)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Clone)]
pub enum Commands {
    /// CRUD operations on tasks
    ///
    /// Examples:
    ///   st task add "Write report" --category work --priority high --effort 4
    ///   st task list --status todo
    ///   st task toggle 3f2a
    ///   st task subtask 3f2a add "Outline"
    #[command(subcommand)]
    Task(TaskCommands),

    /// Overview: totals, completion rate, high priority, due today
    Dashboard {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// AI assistant features (enhance, analyze, subtasks, help, insights)
    ///
    /// Examples:
    ///   st assistant enhance "fix website bugs"
    ///   st assistant subtasks "prepare for English exam" --save
    ///   st assistant insights
    #[command(subcommand, disable_help_subcommand = true)]
    Assistant(AssistantCommands),

    /// Daily planner for a selected date
    ///
    /// Examples:
    ///   st plan                      # today
    ///   st plan --date 2025-06-20
    Plan {
        /// Date to plan for (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Analytics: streaks, category breakdown, effort analysis
    Stats {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Session management against the hosted auth provider
    #[command(subcommand)]
    Auth(AuthCommands),
}

#[derive(Subcommand, Clone)]
pub enum TaskCommands {
    /// Create a new task
    ///
    /// Examples:
    ///   st task add "Write report"
    ///   st task add "Morning run" --category health --effort 2 --due 2025-06-20
    ///   st task add "Pack bags" --subtask "Passport" --subtask "Chargers"
    Add {
        /// Task title
        title: String,

        /// Longer description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Category: Work, Personal, Health, Study, Communication, Errands
        #[arg(short, long, default_value = "Personal")]
        category: String,

        /// Priority: Low, Medium, High, Critical
        #[arg(short, long, default_value = "Medium")]
        priority: String,

        /// Urgency: Low, Medium, High, Critical (independent of priority)
        #[arg(short, long, default_value = "Medium")]
        urgency: String,

        /// Effort level 1-5
        #[arg(short, long, default_value = "3")]
        effort: u8,

        /// Status: Todo, 'In Progress', Completed
        #[arg(short, long, default_value = "Todo")]
        status: String,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,

        /// Initial subtask title (repeatable)
        #[arg(long = "subtask")]
        subtasks: Vec<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// List tasks with optional filters
    ///
    /// Examples:
    ///   st task list
    ///   st task list --category work --status todo
    List {
        /// Filter by category
        #[arg(short, long)]
        category: Option<String>,

        /// Filter by priority
        #[arg(short, long)]
        priority: Option<String>,

        /// Filter by status
        #[arg(short, long)]
        status: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Show one task in full, including its subtasks
    Show {
        /// Task id (or unambiguous prefix)
        id: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Edit task fields; only supplied flags change
    ///
    /// Examples:
    ///   st task edit 3f2a --title "New title" --priority critical
    ///   st task edit 3f2a --due ""          # clear the due date
    Edit {
        /// Task id (or unambiguous prefix)
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New description
        #[arg(short, long)]
        description: Option<String>,

        /// New category
        #[arg(short, long)]
        category: Option<String>,

        /// New priority
        #[arg(short, long)]
        priority: Option<String>,

        /// New urgency
        #[arg(short, long)]
        urgency: Option<String>,

        /// New effort level 1-5
        #[arg(short, long)]
        effort: Option<u8>,

        /// New status
        #[arg(short, long)]
        status: Option<String>,

        /// New due date (YYYY-MM-DD, empty string clears it)
        #[arg(long)]
        due: Option<String>,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Toggle a task between Completed and Todo
    Toggle {
        /// Task id (or unambiguous prefix)
        id: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Manage a task's subtask checklist
    #[command(subcommand)]
    Subtask(SubtaskCommands),

    /// Delete a task (and its subtasks with it)
    Delete {
        /// Task id (or unambiguous prefix)
        id: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

#[derive(Subcommand, Clone)]
pub enum SubtaskCommands {
    /// Add a subtask to a task
    Add {
        /// Parent task id (or unambiguous prefix)
        id: String,

        /// Subtask title
        title: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Toggle one subtask's completion
    Toggle {
        /// Parent task id (or unambiguous prefix)
        id: String,

        /// Subtask id (or unambiguous prefix)
        subtask_id: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Remove one subtask
    Remove {
        /// Parent task id (or unambiguous prefix)
        id: String,

        /// Subtask id (or unambiguous prefix)
        subtask_id: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

#[derive(Subcommand, Clone)]
pub enum AssistantCommands {
    /// Turn a vague task into a clear, actionable one
    Enhance {
        /// The task text to enhance
        input: String,

        /// Also create a task from the response
        #[arg(long)]
        save: bool,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Smart categorization and scheduling suggestions
    Analyze {
        /// The task text to analyze
        input: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Break a complex task into actionable subtasks
    Subtasks {
        /// The task text to break down
        input: String,

        /// Also create a task from the response
        #[arg(long)]
        save: bool,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Guidance, tips and solutions for a task
    Help {
        /// The task text to get help with
        input: String,

        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Daily planning insights from your current task summary
    Insights {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}

#[derive(Subcommand, Clone)]
pub enum AuthCommands {
    /// Sign in and persist the session
    Login {
        /// Account email
        #[arg(long)]
        email: String,

        /// Password (prompted interactively when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Sign out and clear the persisted session
    Logout,

    /// Show the current session
    Status {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}
