use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ticktock_core::{parse_duration, Config, Mode};

mod commands;
mod logging;

#[derive(Parser)]
#[command(name = "ticktock", version, about = "Terminal stopwatch and countdown timer")]
struct Cli {
    /// Config file (default: <config dir>/ticktock/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Append diagnostics to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,
    /// Do not alert when the timer expires
    #[arg(long, global = true)]
    no_bell: bool,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start directly in stopwatch mode
    Stopwatch,
    /// Start directly in timer mode
    Timer {
        /// Initial countdown as HH:MM:SS
        #[arg(long)]
        duration: Option<String>,
    },
    /// Configuration inspection
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(path) = cli.log_file {
        config.log.file = Some(path);
    }
    if cli.no_bell {
        config.notify.enabled = false;
    }

    let launch = match cli.command {
        Some(Commands::Config { action }) => {
            return commands::config::run(action, &config, cli.config.as_deref());
        }
        Some(Commands::Stopwatch) => commands::session::Launch {
            mode: Some(Mode::Stopwatch),
            duration: None,
        },
        Some(Commands::Timer { duration }) => commands::session::Launch {
            mode: Some(Mode::Timer),
            duration: duration.as_deref().map(parse_duration).transpose()?,
        },
        None => commands::session::Launch::default(),
    };

    logging::init(&config.log)?;
    commands::session::run(&config, launch).await
}
