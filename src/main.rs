use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::{Level, info};

use volume_gestures::commands::{DefaultCommandHandler, HostInterfaces};
use volume_gestures::config::{Config, StateStore};
use volume_gestures::logging::{LoggingConfig, initialize_logging};
use volume_gestures::speech::DefaultAnnouncer;
use volume_gestures::system::DetachedAudioSystem;

#[derive(Parser)]
#[command(name = "volume-gestures")]
#[command(about = "Per-application volume and output device control with spoken feedback")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the audio devices the registry would expose
    ListDevices,
    /// List the visible audio sessions
    ListSessions,
    /// Validate configuration file
    CheckConfig,
    /// Show the persisted hidden/muted state
    ShowState,
    /// Unmute everything muted through this tool
    UnmuteAll,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        config.general.log_level.parse().unwrap_or(Level::INFO)
    };
    let (_guard, _log_dir) = initialize_logging(LoggingConfig {
        level: log_level,
        file_output: config.general.log_to_file,
        ..LoggingConfig::default()
    })?;

    info!("Starting volume gestures");

    let state = StateStore::load(StateStore::default_state_path()?);

    // The CLI runs without a platform backend; host integrations supply real
    // drivers through the same interfaces.
    let system = Arc::new(DetachedAudioSystem);
    let host = HostInterfaces {
        devices: system.clone(),
        sessions: system.clone(),
        focus: system.clone(),
        output: system,
    };
    let handler = DefaultCommandHandler::new(config, state, host, DefaultAnnouncer::new());

    match cli.command {
        Some(Commands::ListDevices) | None => {
            list_devices(&handler).await?;
        }
        Some(Commands::ListSessions) => {
            list_sessions(&handler);
        }
        Some(Commands::CheckConfig) => {
            check_config(&handler);
        }
        Some(Commands::ShowState) => {
            show_state(&handler);
        }
        Some(Commands::UnmuteAll) => {
            handler.unmute_all();
            println!("Done");
        }
    }

    Ok(())
}

async fn list_devices(handler: &DefaultCommandHandler) -> Result<()> {
    let count = handler.rescan_devices().await?;

    println!("Registry exposes {} device(s):", count);
    for (i, device) in handler.registry().snapshot().iter().enumerate() {
        println!("  {}. {}", i + 1, device);
    }

    Ok(())
}

fn list_sessions(handler: &DefaultCommandHandler) {
    let hidden = handler.state().hidden_processes();
    let sessions = handler
        .resolver()
        .visible_process_names(&hidden, handler.config().control.dedupe_sessions);

    if sessions.is_empty() {
        println!("No visible audio sessions");
        return;
    }
    println!("Visible audio sessions:");
    for name in sessions {
        println!("  {}", name);
    }
}

fn check_config(handler: &DefaultCommandHandler) {
    let control = &handler.config().control;
    println!("Configuration validation:");
    println!("  ✓ Configuration file parsed successfully");
    println!("  ✓ Volume step: {}", control.step);
    println!("  ✓ Mute mode: {}", if control.mute_completely { "complete" } else { "partial" });
    println!("  ✓ Mute percentage: {}", control.mute_percentage);
    println!("  ✓ Advanced device scan: {}", control.advanced_scan);
}

fn show_state(handler: &DefaultCommandHandler) {
    let state = handler.state();
    println!("Hidden devices:");
    for (id, name) in state.hidden_devices() {
        println!("  {} ({})", name, id);
    }
    println!("Hidden processes:");
    for name in state.hidden_processes() {
        println!("  {}", name);
    }
    println!("Muted sources:");
    for id in state.muted() {
        println!("  {}", id);
    }
}
