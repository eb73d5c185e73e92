use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "nowplaying-bridge",
    about = "Keeps a Spotify token fresh and serves what you're listening to as JSON",
    version,
    long_about = None
)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show version information
    Version,

    /// Run the bridge HTTP server
    Serve {
        /// Address to bind (defaults to `host` from config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (defaults to PORT / `port` from config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Log in through the browser once and print a refresh token
    Authorize {
        /// Local port for the callback; the redirect URI
        /// http://127.0.0.1:<port>/callback must be registered with Spotify
        #[arg(short, long, default_value = "5000")]
        port: u16,
    },

    /// Check that the configured refresh token still mints access tokens
    Verify,
}
