use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use taskdesk::app::App;
use taskdesk::config::Config;

mod cmd;

#[derive(Parser)]
#[command(name = "taskdesk")]
#[command(version, about = "Terminal client for the task management API")]
pub struct Cli {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to taskdesk.toml (defaults to $TASKDESK_HOME/taskdesk.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// API base URL. Overrides TASKDESK_API_URL and taskdesk.toml.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and remember the session
    Login {
        #[arg(short, long)]
        username: Option<String>,
        /// Prompted for when omitted
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Forget the current session
    Logout,
    /// Show who is logged in
    Whoami,
    /// Project and task totals
    Dashboard,
    /// List or manage projects
    Projects {
        #[command(subcommand)]
        command: Option<ProjectsCommands>,
    },
    /// List or manage tasks
    Tasks {
        #[command(subcommand)]
        command: Option<TasksCommands>,
    },
    /// View or validate configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
pub enum ProjectsCommands {
    /// List all projects
    List,
    /// Show one project
    Show { id: i64 },
    /// Create a project
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Change a project's fields
    Update {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        active: Option<bool>,
    },
    /// Delete a project
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Clone)]
pub enum TasksCommands {
    /// List tasks, optionally filtered
    List {
        #[arg(long)]
        project: Option<i64>,
        /// todo, in_progress, review or done
        #[arg(long)]
        status: Option<String>,
    },
    /// Show one task
    Show { id: i64 },
    /// Create a task
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        project: i64,
        #[arg(long)]
        description: Option<String>,
        /// low, medium, high or urgent
        #[arg(long)]
        priority: Option<String>,
        /// Assignee user id
        #[arg(long)]
        assignee: Option<i64>,
        /// Due date (YYYY-MM-DD)
        #[arg(long)]
        due: Option<String>,
    },
    /// Move a task to another status
    Status { id: i64, status: String },
    /// Change a task's fields
    Update {
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        priority: Option<String>,
        #[arg(long)]
        assignee: Option<i64>,
        #[arg(long)]
        due: Option<String>,
    },
    /// Delete a task
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Validate configuration
    Validate,
    /// Create a default taskdesk.toml
    Init,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    taskdesk::logging::init(cli.verbose);

    let config = Config::load(cli.config.clone(), cli.api_url.clone())?;

    match &cli.command {
        Commands::Config { command } => cmd::cmd_config(&config, command.clone())?,
        Commands::Login { username, password } => {
            let app = App::new(config)?;
            cmd::cmd_login(&app, username.as_deref(), password.as_deref()).await?
        }
        Commands::Logout => cmd::cmd_logout(&App::new(config)?).await?,
        Commands::Whoami => cmd::cmd_whoami(&App::new(config)?).await?,
        Commands::Dashboard => cmd::cmd_dashboard(&App::new(config)?).await?,
        Commands::Projects { command } => {
            let command = command.clone().unwrap_or(ProjectsCommands::List);
            cmd::cmd_projects(&App::new(config)?, command).await?
        }
        Commands::Tasks { command } => {
            let command = command.clone().unwrap_or(TasksCommands::List {
                project: None,
                status: None,
            });
            cmd::cmd_tasks(&App::new(config)?, command).await?
        }
    }

    Ok(())
}
