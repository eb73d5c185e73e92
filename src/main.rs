mod api;
mod auth;
mod cli;
mod commands;
mod config;
mod errors;
mod now_playing;
mod server;
mod user_agent;
mod utils;

use clap::Parser;
use cli::{Cli, Commands};
use commands::{authorize, serve, verify};
use config::Settings;
use errors::AppError;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let cli = Cli::parse();

    // 1) Init logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // 2) Dispatch commands; everything but `version` needs settings
    let result = match cli.command {
        Commands::Version => {
            const VERSION: &str = env!("CARGO_PKG_VERSION");
            const NAME: &str = env!("CARGO_PKG_NAME");
            println!("{NAME} {VERSION}");
            Ok(())
        }
        Commands::Serve { host, port } => {
            serve::execute(&load_settings(cli.config), host, port).await
        }
        Commands::Authorize { port } => authorize::execute(&load_settings(cli.config), port).await,
        Commands::Verify => verify::execute(&load_settings(cli.config)).await,
    };

    if let Err(e) = result {
        match &e {
            AppError::Auth(_) => {
                eprintln!();
                eprintln!("error: {e}");
                eprintln!("hint: run `nowplaying-bridge authorize` to obtain a refresh token");
            }
            _ => {
                eprintln!();
                eprintln!("error: {e}");
            }
        }
        process::exit(1);
    }

    Ok(())
}

fn load_settings(path: Option<PathBuf>) -> Settings {
    match Settings::load(path) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!();
            eprintln!("error: {e}");
            eprintln!("hint: set SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET, or pass --config");
            process::exit(2);
        }
    }
}
