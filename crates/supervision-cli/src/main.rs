//! supervision CLI — replay and inspect supervision evaluations.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use supervision_core::model::ItemId;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "supervision", version, about = "Teacher supervision rubric engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a JSON action script to a rubric template
    Replay {
        /// Path to the .toml rubric template
        #[arg(long)]
        template: PathBuf,

        /// JSON file holding a list of actions
        #[arg(long)]
        actions: PathBuf,

        /// Teacher being supervised
        #[arg(long)]
        teacher: ItemId,

        /// Academic cycle of the visit
        #[arg(long)]
        cycle: ItemId,

        /// Draft JSON to resume from before applying actions
        #[arg(long)]
        draft: Option<PathBuf>,

        /// Output directory (defaults to the configured one)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Summarize a saved snapshot
    Summary {
        /// Snapshot JSON
        #[arg(long)]
        snapshot: PathBuf,

        /// Output format: text, markdown, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Validate rubric template TOML files
    Validate {
        /// Path to template file or directory
        #[arg(long)]
        template: PathBuf,
    },

    /// Create starter config, template and action script
    Init,
}

fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("supervision=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Replay {
            template,
            actions,
            teacher,
            cycle,
            draft,
            output,
            config,
        } => commands::replay::execute(commands::replay::ReplayArgs {
            template,
            actions,
            teacher,
            cycle,
            draft,
            output,
            config,
        }),
        Commands::Summary { snapshot, format } => commands::summary::execute(snapshot, format),
        Commands::Validate { template } => commands::validate::execute(template),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
