//! Bot configuration loading with baked-in defaults for every setting.

use std::{env, fs, io::ErrorKind, path::PathBuf, time::Duration};

use serde::Deserialize;
use tracing::{info, warn};

use crate::{
    services::{reply::DEFAULT_FOOTER, word_source::DEFAULT_MIN_WORD_LEN},
    state::session::INITIAL_LIVES,
};

/// Default location on disk where the bot looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/bot.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "HANGMAN_BOT_CONFIG_PATH";

const DEFAULT_BOT_HANDLE: &str = "u/hangman_bot";
const DEFAULT_ACTIVE_PATH: &str = "data/active_games.json";
const DEFAULT_ARCHIVE_PATH: &str = "data/archived_games.json";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);
const DEFAULT_WORD_API_URL: &str = "https://random-word-api.herokuapp.com/word";
const DEFAULT_USER_AGENT: &str = "hangmanbot";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Immutable runtime configuration shared across the bot.
pub struct BotConfig {
    /// Text whose presence in a message marks it as a mention of the bot.
    pub bot_handle: String,
    /// JSON file holding the active games.
    pub active_path: PathBuf,
    /// JSON file holding finished games.
    pub archive_path: PathBuf,
    /// Pause between two inbox polls.
    pub poll_interval: Duration,
    /// Lives a new game starts with.
    pub initial_lives: u32,
    /// Shortest secret word accepted from the generator.
    pub min_word_len: usize,
    /// Random word endpoint.
    pub word_api_url: String,
    /// Markdown appended to every reply.
    pub footer: String,
    /// User agent sent to Reddit and the word generator.
    pub user_agent: String,
}

impl BotConfig {
    /// Load the configuration from disk, falling back to the built-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::parse(&contents) {
                Ok(config) => {
                    info!(path = %path.display(), "loaded bot config");
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Parse a JSON document, keeping defaults for omitted fields.
    fn parse(contents: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<RawConfig>(contents).map(Into::into)
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        RawConfig::default().into()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    bot_handle: Option<String>,
    active_path: Option<PathBuf>,
    archive_path: Option<PathBuf>,
    poll_interval_ms: Option<u64>,
    initial_lives: Option<u32>,
    min_word_len: Option<usize>,
    word_api_url: Option<String>,
    footer: Option<String>,
    user_agent: Option<String>,
}

impl From<RawConfig> for BotConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            bot_handle: value.bot_handle.unwrap_or_else(|| DEFAULT_BOT_HANDLE.into()),
            active_path: value
                .active_path
                .unwrap_or_else(|| DEFAULT_ACTIVE_PATH.into()),
            archive_path: value
                .archive_path
                .unwrap_or_else(|| DEFAULT_ARCHIVE_PATH.into()),
            poll_interval: value
                .poll_interval_ms
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_POLL_INTERVAL),
            initial_lives: value.initial_lives.filter(|lives| *lives > 0).unwrap_or(INITIAL_LIVES),
            min_word_len: value.min_word_len.unwrap_or(DEFAULT_MIN_WORD_LEN),
            word_api_url: value
                .word_api_url
                .unwrap_or_else(|| DEFAULT_WORD_API_URL.into()),
            footer: value.footer.unwrap_or_else(|| DEFAULT_FOOTER.into()),
            user_agent: value.user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.into()),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
