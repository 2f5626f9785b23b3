// src/main.rs

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use recipe_book::ci::{CiEnvironment, CommandRunner, DryRunRunner, Pipeline, SystemRunner, Task};
use recipe_book::db::{self, paths};
use recipe_book::RecipeBookConfig;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

#[derive(Parser)]
#[command(name = "recipe-book")]
#[command(author, version, about = "Small recipe server backed by SQLite", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Address to bind to (overrides server.bind)
        #[arg(short, long)]
        bind: Option<String>,

        /// Path to the database file (overrides storage.db_path)
        #[arg(short, long)]
        db_path: Option<PathBuf>,
    },

    /// Create the database and apply schema migrations
    Init {
        /// Path to the database file (overrides storage.db_path)
        #[arg(short, long)]
        db_path: Option<PathBuf>,
    },

    /// Run CI pipeline tasks: setup, build, test, qa, or all
    Ci {
        /// Tasks to run, in order
        #[arg(required = true, value_name = "TASK")]
        tasks: Vec<String>,

        /// Project checkout to build (overrides ci.project_dir)
        #[arg(short, long)]
        project_dir: Option<PathBuf>,

        /// Print the steps without running them
        #[arg(long)]
        dry_run: bool,
    },
}

fn main() -> ExitCode {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            let code = e
                .downcast_ref::<recipe_book::Error>()
                .map(recipe_book::Error::exit_code)
                .unwrap_or(1);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = RecipeBookConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { bind, db_path } => {
            let mut server_config = config.to_server_config()?;
            if let Some(bind) = bind {
                server_config.bind_addr = bind
                    .parse()
                    .with_context(|| format!("Invalid bind address: {bind}"))?;
            }
            server_config.db_path =
                paths::resolve_db_path(db_path.as_deref(), &server_config.db_path);

            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(recipe_book::server::run_server(server_config))
        }
        Commands::Init { db_path } => {
            let db_path = paths::resolve_db_path(db_path.as_deref(), &config.storage.db_path);
            db::init(&db_path)?;
            println!("Database initialized successfully at: {}", db_path.display());
            Ok(())
        }
        Commands::Ci {
            tasks,
            project_dir,
            dry_run,
        } => {
            let tasks = Task::parse_list(&tasks)?;
            let mut pipeline_config = config.to_pipeline_config();
            if let Some(dir) = project_dir {
                pipeline_config.project_dir = dir;
            }
            info!(
                "Running {} task(s) in {}",
                tasks.len(),
                pipeline_config.project_dir.display()
            );

            let pipeline = Pipeline::new(pipeline_config, CiEnvironment::from_env());
            let runner: &dyn CommandRunner = if dry_run { &DryRunRunner } else { &SystemRunner };
            pipeline.run(&tasks, runner)?;
            Ok(())
        }
    }
}
