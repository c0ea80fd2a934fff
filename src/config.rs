use anyhow::{bail, Context, Result};
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_STATIC_DIR: &str = "public";

/// Process-wide settings, built once at startup and shared read-only.
#[derive(Clone, PartialEq)]
pub struct Config {
    pub bot_token: String,
    /// Channel that receives feedback reports (numeric id or `@username`).
    pub channel_id: Option<String>,
    /// URL opened by the `/start` button. May be empty.
    pub webapp_url: String,
    pub port: u16,
    pub static_dir: PathBuf,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("bot_token", &"<redacted>")
            .field("channel_id", &self.channel_id)
            .field("webapp_url", &self.webapp_url)
            .field("port", &self.port)
            .field("static_dir", &self.static_dir)
            .finish()
    }
}

impl Config {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let Some(bot_token) = get("BOT_TOKEN") else {
            bail!("BOT_TOKEN is not set in the environment");
        };

        let port = match get("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("PORT must be a valid port number, got {:?}", raw))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            bot_token,
            channel_id: get("CHANNEL_ID"),
            webapp_url: get("WEBAPP_URL").unwrap_or_default(),
            port,
            static_dir: get("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR)),
        })
    }

    /// Settings that are missing but not fatal. Logged once at startup.
    pub fn warnings(&self) -> Vec<&'static str> {
        let mut warnings = Vec::new();
        if self.channel_id.is_none() {
            warnings.push("CHANNEL_ID is not set, feedback submissions will be rejected");
        }
        if self.webapp_url.is_empty() {
            warnings.push("WEBAPP_URL is not set, the /start button will not open the mini app");
        }
        warnings
    }
}
