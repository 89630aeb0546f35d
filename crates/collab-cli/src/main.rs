mod client;
mod cmd;
mod output;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "planq",
    about = "Plan collaboration queue — push plans for review, collect comments and answers",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the collaboration server in the foreground
    Serve {
        /// Port to listen on (0 = OS-assigned)
        #[arg(long, default_value = "3847")]
        port: u16,

        /// Don't open browser automatically
        #[arg(long)]
        no_open: bool,
    },

    /// Register a plan file for review and open it in the browser
    Push {
        /// Path to the plan markdown file
        path: String,

        /// Session id claiming ownership of the plan
        #[arg(long, env = "PLANQ_SESSION")]
        session: Option<String>,

        /// Don't open the browser
        #[arg(long)]
        no_browser: bool,
    },

    /// Re-sync the content of a plan (defaults to the active plan)
    Sync {
        /// Path to the plan file (defaults to the active plan)
        path: Option<String>,
    },

    /// Show feedback for a plan (pending by default)
    Feedback {
        /// Path to the plan file (defaults to the active plan)
        path: Option<String>,

        /// Show the full feedback file instead of only pending items
        #[arg(long)]
        all: bool,
    },

    /// Acknowledge all pending feedback on a plan
    Ack {
        /// Path to the plan file (defaults to the active plan)
        path: Option<String>,
    },

    /// File a question on a plan for reviewers to answer
    Question {
        /// Path to the plan file
        path: String,

        /// The question text
        text: String,

        /// Optional context shown alongside the question
        #[arg(long)]
        context: Option<String>,

        /// Answer options as a JSON array: [{"label": "...", "description": "..."}]
        #[arg(long)]
        options: Option<String>,

        /// Allow selecting multiple options
        #[arg(long)]
        multi: bool,
    },

    /// Check server liveness and the active plan
    Status,
}

fn main() {
    let cli = Cli::parse();

    let default_level = match &cli.command {
        Commands::Serve { .. } => tracing::Level::INFO,
        _ => tracing::Level::WARN,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(default_level.into()),
        )
        .with_target(false)
        .init();

    let result = match cli.command {
        Commands::Serve { port, no_open } => cmd::serve::run(port, no_open),
        Commands::Push {
            path,
            session,
            no_browser,
        } => cmd::push::run(&path, session.as_deref(), no_browser),
        Commands::Sync { path } => cmd::sync::run(path.as_deref()),
        Commands::Feedback { path, all } => cmd::feedback::run(path.as_deref(), all),
        Commands::Ack { path } => cmd::ack::run(path.as_deref()),
        Commands::Question {
            path,
            text,
            context,
            options,
            multi,
        } => cmd::question::run(&path, &text, context.as_deref(), options.as_deref(), multi),
        Commands::Status => cmd::status::run(),
    };

    if let Err(e) = result {
        eprintln!("{}", serde_json::json!({ "error": format!("{e:#}") }));
        std::process::exit(1);
    }
}
