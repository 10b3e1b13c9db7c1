//! coursework CLI — load, inspect, and grade course trees.

use std::path::PathBuf;
use std::process;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;

use commands::grade::OutputFormat;

#[derive(Parser)]
#[command(name = "coursework", version, about = "Course content loader and quiz grader")]
struct Cli {
    /// Settings file path (default: ./coursework.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Courses root directory, overriding settings
    #[arg(long, global = true)]
    courses_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load and check a course or every course under a root
    Validate {
        /// Course directory or courses root (default: the configured courses root)
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// List courses
    List,

    /// Print a course or task as JSON, without grading keys
    Show {
        /// Course id
        #[arg(long)]
        course: String,

        /// Task id
        #[arg(long)]
        task: Option<String>,
    },

    /// Grade a quiz submission
    Grade {
        /// Course id
        #[arg(long)]
        course: String,

        /// Task id
        #[arg(long)]
        task: String,

        /// Submission JSON file
        #[arg(long)]
        submission: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Create starter settings and a sample course
    Init,
}

#[tokio::main]
async fn main() {
    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(
        "coursework=info"
            .parse()
            .unwrap_or_else(|_| tracing::level_filters::LevelFilter::INFO.into()),
    );
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        command => run(command, cli.config, cli.courses_dir).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(command: Commands, config: Option<PathBuf>, courses_dir: Option<PathBuf>) -> Result<()> {
    let settings = commands::resolve_settings(config.as_deref(), courses_dir)?;

    match command {
        Commands::Validate { path } => commands::validate::execute(&settings, path).await,
        Commands::List => commands::list::execute(&settings).await,
        Commands::Show { course, task } => {
            commands::show::execute(&settings, &course, task.as_deref())
        }
        Commands::Grade {
            course,
            task,
            submission,
            format,
        } => commands::grade::execute(&settings, &course, &task, &submission, format),
        Commands::Init => commands::init::execute(),
    }
}
