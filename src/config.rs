use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("TELEGRAM_BOT_TOKEN and TELEGRAM_CHAT_ID must be set")]
    MissingCredentials,
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Bot token plus destination chat, validated once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub bot_token: String,
    pub chat_id: String,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub reddit: RedditConfig,
    #[serde(default)]
    pub digest: DigestConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
    #[serde(default)]
    pub chat_id: String,
    /// Server-side long-poll wait budget
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_secs: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedditConfig {
    #[serde(default = "default_reddit_base_url")]
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DigestConfig {
    #[serde(default = "default_subreddit")]
    pub subreddit: String,
    #[serde(default = "default_digest_limit")]
    pub limit: u32,
    /// Six-field cron expression; `None` means a single pass
    #[serde(default)]
    pub schedule: Option<String>,
}

fn default_poll_timeout() -> u32 {
    30
}

fn default_reddit_base_url() -> String {
    "https://www.reddit.com".to_string()
}

fn default_user_agent() -> String {
    "telegram-bot/0.1".to_string()
}

fn default_subreddit() -> String {
    "pics".to_string()
}

fn default_digest_limit() -> u32 {
    5
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            chat_id: String::new(),
            poll_timeout_secs: default_poll_timeout(),
        }
    }
}

impl Default for RedditConfig {
    fn default() -> Self {
        Self {
            base_url: default_reddit_base_url(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            subreddit: default_subreddit(),
            limit: default_digest_limit(),
            schedule: None,
        }
    }
}

/// Settings file picked up when no path is given on the command line.
pub const DEFAULT_CONFIG_FILE: &str = "relay.toml";

impl Config {
    /// Load settings: `.env` seeds the process environment (never
    /// overriding what is already set), the TOML file provides the base
    /// values, and the environment overrides them.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        load_dotenv();

        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overlay `TELEGRAM_BOT_TOKEN`, `TELEGRAM_CHAT_ID` and `SUBREDDIT`.
    /// Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get("TELEGRAM_BOT_TOKEN") {
            self.telegram.bot_token = token;
        }
        if let Some(chat_id) = get("TELEGRAM_CHAT_ID") {
            self.telegram.chat_id = chat_id;
        }
        if let Some(subreddit) = get("SUBREDDIT") {
            self.digest.subreddit = subreddit;
        }
    }

    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        let bot_token = self.telegram.bot_token.trim();
        let chat_id = self.telegram.chat_id.trim();
        if bot_token.is_empty() || chat_id.is_empty() {
            return Err(ConfigError::MissingCredentials);
        }
        Ok(Credentials {
            bot_token: bot_token.to_string(),
            chat_id: chat_id.to_string(),
        })
    }
}

fn load_dotenv() {
    load_dotenv_from(Path::new(".env"));
}

/// Seed the process environment from a `key=value` file. Variables that
/// are already set win. Returns whether the file was applied.
fn load_dotenv_from(path: &Path) -> bool {
    match dotenvy::from_path(path) {
        Ok(()) => {
            debug!("Loaded environment from {}", path.display());
            true
        }
        Err(e) if e.not_found() => false,
        Err(e) => {
            warn!("Ignoring malformed {}: {}", path.display(), e);
            false
        }
    }
}
