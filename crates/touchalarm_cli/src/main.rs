mod output;
mod repl;
mod sound;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use touchalarm_core::{AlarmConfig, AlarmController, AlarmStore, JsonFileStore, SystemClock};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::output::Output;
use crate::repl::{run_repl, PrintSink, StoreSink};
use crate::sound::LogSound;

#[derive(Parser)]
#[command(name = "touchalarm")]
#[command(about = "Touch alarm clock, driven from the terminal")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the alarm clock interactively
    Run {
        /// Alarm store file (overrides config)
        #[arg(long)]
        store: Option<PathBuf>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show,
    /// Write a default configuration file
    Init,
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("touchalarm").join("config.toml"))
}

fn load_config(explicit: Option<&PathBuf>) -> Result<AlarmConfig> {
    let path = explicit.cloned().or_else(default_config_path);
    match path {
        Some(path) if path.exists() => {
            info!(path = %path.display(), "loading configuration");
            AlarmConfig::load_from_path(&path).into_diagnostic()
        }
        _ => Ok(AlarmConfig::default()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.debug {
        "touchalarm=debug,touchalarm_core=debug"
    } else {
        "touchalarm=info,touchalarm_core=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let output = Output::new();
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Run { store } => run(config, store, output).await,
        Commands::Config { cmd } => match cmd {
            ConfigCommands::Show => {
                let toml = toml::to_string_pretty(&config).into_diagnostic()?;
                output.status(&toml);
                Ok(())
            }
            ConfigCommands::Init => init_config(cli.config.as_ref(), output),
        },
    }
}

async fn run(config: AlarmConfig, store_override: Option<PathBuf>, output: Output) -> Result<()> {
    let store_path = store_override.unwrap_or_else(|| config.store_file.clone());
    let store: Arc<dyn AlarmStore> = Arc::new(JsonFileStore::new(store_path));

    let controller = AlarmController::with_collaborators(
        config,
        Arc::new(SystemClock),
        Arc::new(LogSound),
    )?;
    controller.add_sink(Arc::new(PrintSink::new(output)));
    controller.add_sink(Arc::new(StoreSink::new(store.clone())));

    // restore a previous session before taking commands
    if let Some(record) = store.load().await? {
        info!(active = record.active, "restoring persisted alarm");
        controller.restore(record).await?;
    }

    run_repl(controller, output).await
}

fn init_config(explicit: Option<&PathBuf>, output: Output) -> Result<()> {
    let path = explicit
        .cloned()
        .or_else(default_config_path)
        .ok_or_else(|| miette::miette!("no configuration directory available"))?;

    if path.exists() {
        output.warning(&format!("{} already exists, leaving it alone", path.display()));
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).into_diagnostic()?;
    }
    let toml = toml::to_string_pretty(&AlarmConfig::default()).into_diagnostic()?;
    std::fs::write(&path, toml).into_diagnostic()?;
    output.success(&format!("wrote {}", path.display()));
    Ok(())
}
