use clap::Parser;
use smarttask::cli::{Cli, Commands};
use smarttask::cli_handlers::{
    handle_assistant_command, handle_auth_command, handle_dashboard, handle_plan, handle_stats,
    handle_task_command,
};
use smarttask::config::{session_file_path, AppConfig};
use smarttask::error::Result;
use smarttask::logging::LoggingConfig;
use smarttask::session::{AuthClient, SessionManager};
use smarttask::store::{TableClient, TaskStore};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_config = LoggingConfig::from_args(cli.quiet, cli.verbose > 0, cli.json);
    if let Err(e) = smarttask::logging::init_logging(log_config) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(&cli).await {
        let error_response = e.to_error_response();
        eprintln!("{}", serde_json::to_string_pretty(&error_response).unwrap());
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let config = AppConfig::from_env();
    let sessions = SessionManager::init(AuthClient::from_config(&config)?, session_file_path());
    // Single owned change subscription, held for the life of the command.
    let _session_events = sessions.subscribe();

    let result = dispatch(cli, &config, &sessions).await;
    sessions.teardown();
    result
}

async fn dispatch(cli: &Cli, config: &AppConfig, sessions: &SessionManager) -> Result<()> {
    if let Commands::Auth(auth_cmd) = cli.command.clone() {
        return handle_auth_command(sessions, auth_cmd).await;
    }

    // Everything but auth is gated on a loaded session: no session, no
    // store or generation calls.
    let Some(session) = sessions.current() else {
        println!("🔒 Not signed in. Run 'st auth login --email <email>' first.");
        return Ok(());
    };

    let mut store = TaskStore::new(TableClient::from_config(config)?, Some(session));
    store.load().await;

    match cli.command.clone() {
        Commands::Task(task_cmd) => handle_task_command(&mut store, task_cmd).await,
        Commands::Dashboard { format } => handle_dashboard(store.tasks(), &format),
        Commands::Assistant(assistant_cmd) => {
            handle_assistant_command(&mut store, config, assistant_cmd).await
        },
        Commands::Plan { date, format } => handle_plan(store.tasks(), date.as_deref(), &format),
        Commands::Stats { format } => handle_stats(store.tasks(), &format),
        Commands::Auth(_) => Ok(()),
    }
}
