use config::{Config, ConfigError, Environment, File};
use dirs_next::config_dir;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.spotify.com";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com";
pub const DEFAULT_SCOPE: &str = "user-read-playback-state user-read-currently-playing";
pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:5000/callback";

/// OAuth client registration used for every token exchange.
#[derive(Clone, Debug)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub refresh_token: Option<String>,
    pub scope: String,
    pub accounts_url: String,
    pub api_url: String,
    pub host: String,
    pub port: u16,
    pub request_timeout: Duration,
}

impl Settings {
    /// Layers defaults, an optional TOML file, `SPOTIFY_*` variables and `PORT`.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        // 1) Explicit path, then NOWPLAYING_CONFIG, then the per-user config dir
        let path = config_path
            .or_else(|| std::env::var_os("NOWPLAYING_CONFIG").map(PathBuf::from))
            .or_else(default_config_path);

        // 2) File + ENV; PORT is the conventional variable on hosted platforms
        let mut builder = Self::defaults()?;
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(false));
        }
        let cfg = builder
            .add_source(Environment::with_prefix("SPOTIFY"))
            .set_override_option("port", std::env::var("PORT").ok())?
            .build()?;

        Self::from_config(&cfg)
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("redirect_uri", DEFAULT_REDIRECT_URI)?
            .set_default("scope", DEFAULT_SCOPE)?
            .set_default("accounts_url", DEFAULT_ACCOUNTS_URL)?
            .set_default("api_url", DEFAULT_API_URL)?
            .set_default("host", "0.0.0.0")?
            .set_default("port", 5000_i64)?
            .set_default("request_timeout_secs", 10_i64)
    }

    fn from_config(cfg: &Config) -> Result<Self, ConfigError> {
        let client_id = required(cfg, "client_id")?;
        let client_secret = required(cfg, "client_secret")?;

        let port = cfg.get_int("port")?;
        let port = u16::try_from(port)
            .map_err(|_| ConfigError::Message(format!("port out of range: {port}")))?;

        let timeout_secs = cfg.get_int("request_timeout_secs")?;
        let timeout_secs = u64::try_from(timeout_secs).map_err(|_| {
            ConfigError::Message(format!("request_timeout_secs must be positive: {timeout_secs}"))
        })?;

        // An empty refresh token is treated as not set
        let refresh_token = match cfg.get_string("refresh_token") {
            Ok(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        };

        Ok(Settings {
            client_id,
            client_secret,
            redirect_uri: cfg.get_string("redirect_uri")?,
            refresh_token,
            scope: cfg.get_string("scope")?,
            accounts_url: cfg.get_string("accounts_url")?,
            api_url: cfg.get_string("api_url")?,
            host: cfg.get_string("host")?,
            port,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn client_credentials(&self) -> ClientCredentials {
        ClientCredentials {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            redirect_uri: self.redirect_uri.clone(),
        }
    }
}

fn required(cfg: &Config, key: &str) -> Result<String, ConfigError> {
    match cfg.get_string(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Message(format!(
            "missing `{key}` (set SPOTIFY_{} or add it to the config file)",
            key.to_uppercase()
        ))),
    }
}

fn default_config_path() -> Option<PathBuf> {
    let mut path = config_dir()?;
    path.push("nowplaying-bridge/config.toml");
    Some(path)
}
