mod config_commands;
mod settings;
mod startup;

use std::{path::PathBuf, process::ExitCode};

use {
    clap::{Parser, Subcommand},
    tracing::{error, info},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use crate::{config_commands::ConfigAction, settings::Overrides};

#[derive(Parser)]
#[command(name = "sigrelay", version, about = "sigrelay, a Signal command relay bot")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Account number the bot runs as, E.164 (overrides config value).
    #[arg(long, global = true, env = "SIGRELAY_ACCOUNT")]
    account: Option<String>,

    /// Control group id (overrides the configured group).
    #[arg(long, global = true, env = "SIGRELAY_GROUP")]
    group: Option<String>,

    /// signal-cli REST API URL (overrides config value).
    #[arg(long, global = true, env = "SIGRELAY_API_URL")]
    api_url: Option<String>,

    /// Config file (default: ./sigrelay.toml, then ~/.config/sigrelay/).
    #[arg(long, global = true, env = "SIGRELAY_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the bot (default when no subcommand is provided).
    Run,
    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_telemetry(&cli);

    let overrides = Overrides {
        account: cli.account,
        group: cli.group,
        api_url: cli.api_url,
    };

    match cli.command {
        None | Some(Commands::Run) => {
            info!(version = env!("CARGO_PKG_VERSION"), "sigrelay starting");
            match startup::run(cli.config.as_deref(), overrides).await {
                Ok(()) => {
                    info!("sigrelay stopped");
                    ExitCode::SUCCESS
                },
                Err(e) => {
                    error!(error = %e, "sigrelay exiting");
                    ExitCode::from(e.exit_code())
                },
            }
        },
        Some(Commands::Config { action }) => {
            match config_commands::handle_config(action, cli.config.as_deref(), &overrides) {
                Ok(code) => code,
                Err(e) => {
                    eprintln!("{e:#}");
                    ExitCode::FAILURE
                },
            }
        },
    }
}
