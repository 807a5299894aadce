//! CLI command definitions and handlers

use clap::{Parser, Subcommand};
pub use clap_complete::Shell;

use crate::client::models::TaskStatus;
use crate::error::Result;

pub mod app;
pub mod args;
pub mod auth;
pub mod context;
pub mod offer;
pub mod shell;
pub mod task;
pub mod user;

pub use args::{ApplicationFields, OfferFilterArgs, OutputFormat};
pub use context::CommandContext;

/// JobTrack CLI - Track job applications, tasks and collected offers
#[derive(Parser, Debug)]
#[command(name = "jobtrack")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (table, json)
    #[arg(
        long,
        global = true,
        env = "JOBTRACK_FORMAT",
        default_value = "table",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: OutputFormat,

    /// Override config file location
    #[arg(long, global = true, env = "JOBTRACK_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Override the API base URL
    #[arg(long, global = true, env = "JOBTRACK_API_URL", hide_env = true)]
    pub api_url: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "JOBTRACK_DEBUG", hide_env = true)]
    pub debug: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in and store a session
    Login {
        /// Account name (defaults to the last one used)
        #[arg(long, short = 'u')]
        username: Option<String>,
    },

    /// Sign out and clear stored tokens
    Logout,

    /// Show the local session and configuration status
    Status,

    /// Show the signed-in account
    Whoami,

    /// Create a new account
    Register,

    /// Change the password of the signed-in account
    Passwd,

    /// Manage job applications
    #[command(subcommand)]
    App(AppCommands),

    /// Manage tasks
    #[command(subcommand)]
    Task(TaskCommands),

    /// Browse collected job offers
    #[command(subcommand)]
    Offer(OfferCommands),

    /// List user accounts (admin)
    #[command(subcommand)]
    User(UserCommands),

    /// Start an interactive session that keeps tokens fresh while in use
    Shell,

    /// Generate shell completions
    #[command(after_help = "\
Examples:
  bash:   jobtrack completion bash > /etc/bash_completion.d/jobtrack
  zsh:    jobtrack completion zsh > \"${fpath[1]}/_jobtrack\"
  fish:   jobtrack completion fish > ~/.config/fish/completions/jobtrack.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Display version information
    Version,
}

/// Application subcommands
#[derive(Subcommand, Debug)]
pub enum AppCommands {
    /// List applications
    List {
        /// Only show this status (label or alias: study, sent, screening, interview, offer, rejected)
        #[arg(long, short = 's')]
        status: Option<String>,

        /// Show archived applications instead of active ones
        #[arg(long)]
        archived: bool,
    },

    /// Show active applications as a kanban board
    Board {
        /// Hide columns without applications
        #[arg(long)]
        compact: bool,
    },

    /// Show one application
    Show {
        /// Application ID
        id: String,
    },

    /// Create an application
    Add {
        /// Company name
        company: String,

        /// Position title
        position: String,

        /// Initial status
        #[arg(long, short = 's', default_value = "En étude")]
        status: String,

        #[command(flatten)]
        fields: ApplicationFields,

        /// Initial note (repeatable)
        #[arg(long = "note")]
        notes: Vec<String>,
    },

    /// Update fields of an application
    Update {
        /// Application ID
        id: String,

        /// New company name
        #[arg(long)]
        company: Option<String>,

        /// New position title
        #[arg(long)]
        position: Option<String>,

        /// New status
        #[arg(long, short = 's')]
        status: Option<String>,

        #[command(flatten)]
        fields: ApplicationFields,
    },

    /// Move an application to another status column
    Move {
        /// Application ID
        id: String,

        /// Target status (label or alias)
        status: String,
    },

    /// Append a note to an application
    Note {
        /// Application ID
        id: String,

        /// Note text
        text: String,
    },

    /// Archive an application
    Archive {
        /// Application ID
        id: String,

        /// Restore instead of archiving
        #[arg(long)]
        undo: bool,
    },

    /// Delete an application
    Delete {
        /// Application ID
        id: String,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// List tasks
    List {
        /// Only show this status (todo, doing, done)
        #[arg(long, short = 's', value_parser = parse_task_status)]
        status: Option<TaskStatus>,
    },

    /// Show tasks as a kanban board
    Board,

    /// Create a task
    Add {
        /// Task title
        title: String,

        /// Longer description
        #[arg(long, short = 'd')]
        description: Option<String>,

        /// Initial status (todo, doing, done)
        #[arg(long, short = 's', default_value = "todo", value_parser = parse_task_status)]
        status: TaskStatus,

        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,

        /// Link the task to an application
        #[arg(long)]
        application: Option<String>,
    },

    /// Move a task to another status column
    Move {
        /// Task ID
        id: String,

        /// Target status (todo, doing, done)
        #[arg(value_parser = parse_task_status)]
        status: TaskStatus,
    },

    /// Update fields of a task
    Update {
        /// Task ID
        id: String,

        /// New title
        #[arg(long)]
        title: Option<String>,

        /// New description
        #[arg(long, short = 'd')]
        description: Option<String>,

        /// New due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,

        /// Link the task to an application
        #[arg(long)]
        application: Option<String>,
    },

    /// Delete a task
    Delete {
        /// Task ID
        id: String,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

/// Job offer subcommands
#[derive(Subcommand, Debug)]
pub enum OfferCommands {
    /// Search collected offers
    List {
        #[command(flatten)]
        filters: OfferFilterArgs,

        /// Maximum number of offers to return
        #[arg(long, default_value = "20")]
        limit: u32,

        /// Number of offers to skip
        #[arg(long)]
        skip: Option<u32>,
    },

    /// Show one offer
    Show {
        /// Offer ID
        id: String,
    },

    /// Show totals and top sources, companies and cities
    Stats,

    /// Count offers matching the filters
    Count {
        #[command(flatten)]
        filters: OfferFilterArgs,
    },

    /// Ask the backend to crawl job sites for a query
    Collect {
        /// Search query sent to the job sites
        query: String,
    },

    /// Delete an offer
    Delete {
        /// Offer ID
        id: String,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

/// User subcommands
#[derive(Subcommand, Debug)]
pub enum UserCommands {
    /// List all user accounts
    List,

    /// Show one account
    Show {
        /// User ID
        id: String,
    },

    /// Change account details
    Update {
        /// User ID
        id: String,

        #[arg(long)]
        username: Option<String>,

        #[arg(long)]
        email: Option<String>,

        /// Full name
        #[arg(long)]
        name: Option<String>,
    },

    /// Delete an account and its applications
    Delete {
        /// User ID
        id: String,

        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

fn parse_task_status(value: &str) -> std::result::Result<TaskStatus, String> {
    TaskStatus::parse(value).ok_or_else(|| {
        format!(
            "unknown task status '{}' (expected todo, doing or done)",
            value
        )
    })
}

/// Ask before deleting unless `--yes` was given
fn confirm_delete(what: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(format!("Delete {}? This cannot be undone.", what))
        .default(false)
        .interact()?;
    if !confirmed {
        eprintln!("Cancelled.");
    }
    Ok(confirmed)
}

/// Run a command that needs an API context.
///
/// `Shell`, `Completion` and `Version` are handled by the caller.
pub async fn dispatch(ctx: &CommandContext, command: Commands) -> Result<()> {
    match command {
        Commands::Login { username } => auth::login(ctx, username.as_deref()).await,
        Commands::Logout => auth::logout(ctx),
        Commands::Status => auth::status(ctx),
        Commands::Whoami => auth::whoami(ctx).await,
        Commands::Register => auth::register(ctx).await,
        Commands::Passwd => auth::passwd(ctx).await,
        Commands::App(cmd) => app::run(ctx, cmd).await,
        Commands::Task(cmd) => task::run(ctx, cmd).await,
        Commands::Offer(cmd) => offer::run(ctx, cmd).await,
        Commands::User(cmd) => user::run(ctx, cmd).await,
        Commands::Shell | Commands::Completion { .. } | Commands::Version => {
            Err(crate::error::Error::Other(
                "command is not available here".to_string(),
            ))
        }
    }
}
