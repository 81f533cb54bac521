use dotenv::dotenv;
use std::{
    env::{self, VarError},
    net::SocketAddr,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;

const DEFAULT_CHAT_SERVER: &str = "wss://irc-ws.chat.twitch.tv:443";
const DEFAULT_OVERLAY_ADDR: &str = "127.0.0.1:4000";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub channel_name: String,
    pub bot_user_name: String,
    pub bot_token: String,
    pub chat_server: String,
    pub command_prefix: char,
    pub commands_file: Option<PathBuf>,
    pub schedule_file: Option<PathBuf>,
    pub schedule_poll_interval: Duration,
    pub ticker_visible: Duration,
    pub ticker_hidden: Duration,
    pub overlay_addr: SocketAddr,
    pub log_level: String,
}

#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Environment variable error [{}]: {}", .0, .1)]
    EnvironmentVar(&'static str, VarError),
    #[error("Invalid value for {0}: {1:?}")]
    InvalidValue(&'static str, String),
}

fn required(key: &'static str) -> Result<String, AppConfigError> {
    env::var(key).map_err(|err| AppConfigError::EnvironmentVar(key, err))
}

fn optional(key: &'static str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn seconds(key: &'static str, default: u64) -> Result<Duration, AppConfigError> {
    match optional(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Duration::from_secs)
            .map_err(|_| AppConfigError::InvalidValue(key, raw)),
        None => Ok(Duration::from_secs(default)),
    }
}

impl AppConfig {
    pub fn new() -> Result<AppConfig, AppConfigError> {
        dotenv().ok();
        let channel_name = required("TWITCH_CHANNEL")?
            .trim()
            .trim_start_matches('#')
            .to_lowercase();
        let bot_user_name = optional("TWITCH_CHAT_USER")
            .map(|name| name.trim().to_lowercase())
            .unwrap_or_else(|| channel_name.clone());
        let bot_token = required("TWITCH_CHAT_TOKEN")?
            .trim()
            .trim_start_matches("oauth:")
            .to_owned();
        let command_prefix = match optional("COMMAND_PREFIX") {
            Some(raw) => {
                let mut chars = raw.trim().chars();
                match (chars.next(), chars.next()) {
                    (Some(prefix), None) => prefix,
                    _ => return Err(AppConfigError::InvalidValue("COMMAND_PREFIX", raw)),
                }
            }
            None => '!',
        };
        let overlay_raw =
            optional("OVERLAY_ADDR").unwrap_or_else(|| DEFAULT_OVERLAY_ADDR.to_owned());
        let overlay_addr = overlay_raw
            .parse()
            .map_err(|_| AppConfigError::InvalidValue("OVERLAY_ADDR", overlay_raw.clone()))?;
        Ok(AppConfig {
            channel_name,
            bot_user_name,
            bot_token,
            chat_server: optional("TWITCH_CHAT_SERVER")
                .unwrap_or_else(|| DEFAULT_CHAT_SERVER.to_owned()),
            command_prefix,
            commands_file: optional("COMMANDS_FILE").map(PathBuf::from),
            schedule_file: optional("SCHEDULE_FILE").map(PathBuf::from),
            schedule_poll_interval: seconds("SCHEDULE_POLL_SECS", 60)?,
            ticker_visible: seconds("TICKER_VISIBLE_SECS", 10)?,
            ticker_hidden: seconds("TICKER_HIDDEN_SECS", 1)?,
            overlay_addr,
            log_level: optional("LOG_LEVEL").unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_owned()),
        })
    }

    /// Get a reference to the config's channel name.
    /// this value is provided by the TWITCH_CHANNEL environment variable
    pub fn channel_name(&self) -> &str {
        self.channel_name.as_ref()
    }

    /// Get a reference to the config's bot user name.
    /// this value is provided by the TWITCH_CHAT_USER environment variable and
    /// falls back to the channel name
    pub fn bot_user_name(&self) -> &str {
        self.bot_user_name.as_ref()
    }

    /// Get a reference to the bot's chat token, without the `oauth:` prefix.
    /// this value is provided by the TWITCH_CHAT_TOKEN environment variable
    pub fn bot_token(&self) -> &str {
        self.bot_token.as_ref()
    }

    /// The bot's login when it differs from the channel. Twitch never echoes a
    /// connection's own messages, so only a separate bot account needs filtering.
    pub fn separate_bot_user(&self) -> Option<&str> {
        Some(self.bot_user_name())
            .filter(|bot_user_name| !bot_user_name.eq_ignore_ascii_case(self.channel_name()))
    }

    pub fn chat_server(&self) -> &str {
        self.chat_server.as_ref()
    }

    pub fn commands_file(&self) -> Option<&Path> {
        self.commands_file.as_deref()
    }

    pub fn schedule_file(&self) -> Option<&Path> {
        self.schedule_file.as_deref()
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        AppConfig {
            channel_name: "channelname".to_owned(),
            bot_user_name: "botname".to_owned(),
            bot_token: "ACCESS_TOKEN".to_owned(),
            chat_server: DEFAULT_CHAT_SERVER.to_owned(),
            command_prefix: '!',
            commands_file: None,
            schedule_file: None,
            schedule_poll_interval: Duration::from_secs(60),
            ticker_visible: Duration::from_secs(10),
            ticker_hidden: Duration::from_secs(1),
            overlay_addr: ([127, 0, 0, 1], 4000).into(),
            log_level: DEFAULT_LOG_LEVEL.to_owned(),
        }
    }
}
