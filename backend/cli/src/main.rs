mod config;
mod cycle_cmd;
mod inspect;
mod listen;
mod snapshot;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing::{error, warn};

use quizpilot_config::{apply_all_defaults, validate, write_config, QuizPilotConfig};

use config::LoadedConfig;

#[derive(Parser)]
#[command(name = "quizpilot")]
#[command(about = "QuizPilot: answer-reveal quiz bot over page snapshots")]
#[command(version)]
struct Cli {
    /// Config file (default: $QUIZPILOT_CONFIG_DIR/config.yaml or ~/.quizpilot/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level or filter directive; overrides the config file
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show what the heuristics find on an HTML snapshot
    Inspect {
        html: PathBuf,
        /// Page path used in the question key
        #[arg(long)]
        path: Option<String>,
        /// Query string used in the question key
        #[arg(long)]
        search: Option<String>,
    },
    /// Run the coordinator once on an HTML snapshot
    Cycle {
        html: PathBuf,
        #[arg(long)]
        path: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Accept JSON commands on stdin and drive the loop on a snapshot
    Listen {
        html: PathBuf,
        #[arg(long)]
        path: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective config (file + env + defaults) as YAML
    Show,
    /// Validate the config; exits non-zero on errors
    Validate,
    /// Write a config file with every default filled in
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let loaded = LoadedConfig::load(cli.config.as_deref()).await?;

    let logging = loaded.config.logging();
    quizpilot_logging::init_logger(
        &loaded.log_level(cli.log_level.as_deref()),
        logging.json.unwrap_or(false),
        logging.directory.as_deref().map(Path::new),
    )?;

    match cli.command {
        Commands::Inspect { html, path, search } => {
            let doc = snapshot::load_snapshot(&html, path.as_deref(), search.as_deref()).await?;
            let report = inspect::inspect(&doc, &loaded.config.heuristics());
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Cycle { html, path, search } => {
            let doc = snapshot::load_snapshot(&html, path.as_deref(), search.as_deref()).await?;
            let report = cycle_cmd::run_once(Arc::new(doc), &loaded.config).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Listen { html, path, search } => {
            let doc = snapshot::load_snapshot(&html, path.as_deref(), search.as_deref()).await?;
            listen::listen(Arc::new(doc), &loaded.config).await?;
        }
        Commands::Config { action } => run_config(action, &loaded).await?,
    }

    Ok(())
}

async fn run_config(action: ConfigAction, loaded: &LoadedConfig) -> Result<()> {
    match action {
        ConfigAction::Show => {
            print!("{}", serde_yaml::to_string(&loaded.config)?);
        }
        ConfigAction::Validate => {
            let report = validate(&loaded.config);
            for w in &report.warnings {
                warn!(path = %w.path, "{}", w.message);
                println!("warning: {w}");
            }
            for e in &report.errors {
                error!(path = %e.path, "{}", e.message);
                println!("error: {e}");
            }
            if !report.is_valid() {
                bail!("{} config error(s) in {}", report.errors.len(), loaded.path.display());
            }
            println!("{} is valid", loaded.path.display());
        }
        ConfigAction::Init { force } => {
            if loaded.path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", loaded.path.display());
            }
            write_config(&apply_all_defaults(QuizPilotConfig::default()), &loaded.path).await?;
            println!("Wrote {}", loaded.path.display());
        }
    }
    Ok(())
}
