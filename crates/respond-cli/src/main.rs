mod brain;
mod chat;
mod plugin;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use respond_config::RespondConfig;
use respond_responder::Responder;

#[derive(Parser)]
#[command(name = "respond", about = "Teach a chat robot to answer trigger words")]
struct Cli {
    /// Config file (defaults to ~/.respond/config.json5)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat room with the robot
    Chat {
        /// Name to speak as
        #[arg(short, long, default_value = "shell")]
        user: String,
    },
    /// Serve the stdio plugin protocol for a chat host
    Plugin,
    /// Print registered responds
    List,
    /// Print the commands the robot understands
    Help,
    /// Check configuration and brain
    Health,
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<RespondConfig> {
    match path {
        Some(path) => respond_config::load_config_from(&path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(respond_config::load_config().unwrap_or_default()),
    }
}

fn build_responder(config: &RespondConfig) -> anyhow::Result<Responder> {
    let brain = brain::open_brain(&config.brain)?;
    Ok(Responder::from_config(config, brain)?)
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so stdout stays clean for the plugin protocol.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config)?;

    match cli.command {
        Commands::Chat { user } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(async {
                let responder = build_responder(&config)?;
                chat::run_chat(responder, user).await
            })?;
        }
        Commands::Plugin => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(async {
                let brain = brain::open_brain(&config.brain)?;
                respond_plugin_sdk::run_plugin(plugin::ResponderPlugin::new(config, brain)).await
            })?;
        }
        Commands::List => {
            let rt = tokio::runtime::Runtime::new()?;
            let entries = rt.block_on(async {
                let responder = build_responder(&config)?;
                anyhow::Ok(responder.store().list().await?)
            })?;
            if entries.is_empty() {
                println!("No responds registered");
            }
            for entry in entries {
                println!("{entry}");
            }
        }
        Commands::Help => {
            for line in respond_responder::help_lines(&config.robot.name) {
                println!("{line}");
            }
        }
        Commands::Health => {
            let rt = tokio::runtime::Runtime::new()?;
            let count = rt.block_on(async {
                let responder = build_responder(&config)?;
                anyhow::Ok(responder.store().list().await?.len())
            })?;
            println!("respond is healthy");
            println!("  robot: {}", config.robot.name);
            if let Some(alias) = &config.robot.alias {
                println!("  alias: {alias}");
            }
            println!("  brain: {}", brain::describe(&config.brain));
            println!("  brain key: {}", config.brain.key);
            println!("  responds registered: {count}");
        }
    }

    Ok(())
}
