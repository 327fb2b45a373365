use std::fmt;
use std::path::Path;
use std::time::Duration;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File};
use serde::Deserialize;
use url::Url;

use crate::error::ConfigError;

/// (config key, environment variable) pairs. Environment wins over the file.
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("discord.token", "DISCORD_TOKEN"),
    ("discord.channel", "DISCORD_CHANNEL_ID"),
    ("dmsguild.affiliate", "DMG_AFFILIATE_ID"),
    ("dmsguild.keywords", "DMG_SEARCH_KEYWORDS"),
    ("dmsguild.title_filter", "DMG_TITLE_FILTER"),
    ("dmsguild.base_url", "DMG_BASE_URL"),
    ("settings.minutes", "CHECK_MINUTES"),
    ("settings.timeout_secs", "REQUEST_TIMEOUT_SECS"),
];

#[derive(Deserialize)]
struct RawSettings {
    discord: RawDiscord,
    dmsguild: RawGuild,
    settings: RawPoll,
}

#[derive(Deserialize)]
struct RawDiscord {
    token: Option<String>,
    channel: Option<String>,
}

#[derive(Deserialize)]
struct RawGuild {
    affiliate: Option<String>,
    keywords: String,
    title_filter: Option<String>,
    base_url: String,
}

#[derive(Deserialize)]
struct RawPoll {
    minutes: String,
    timeout_secs: String,
}

/// Validated startup configuration. Never re-read after startup.
pub struct Settings {
    token: String,
    pub channel: String,
    pub affiliate_id: String,
    pub keywords: String,
    pub title_filter: Option<String>,
    pub base_url: Url,
    pub interval: Duration,
    pub timeout: Duration,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("channel", &self.channel)
            .field("affiliate_id", &self.affiliate_id)
            .field("keywords", &self.keywords)
            .field("title_filter", &self.title_filter)
            .field("base_url", &self.base_url.as_str())
            .field("interval", &self.interval)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Settings {
    /// Defaults, then the YAML file at `path` if it exists, then environment.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut builder = defaults()?.add_source(File::from(path).required(false));
        for (key, var) in ENV_OVERRIDES {
            builder = builder.set_override_option(*key, std::env::var(var).ok())?;
        }
        Self::from_builder(builder)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let raw: RawSettings = builder.build()?.try_deserialize()?;

        let minutes = positive("settings.minutes", &raw.settings.minutes)?;
        let timeout_secs = positive("settings.timeout_secs", &raw.settings.timeout_secs)?;
        let title_filter = raw
            .dmsguild
            .title_filter
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty());

        Ok(Settings {
            token: blank_as_empty(raw.discord.token),
            channel: blank_as_empty(raw.discord.channel),
            affiliate_id: blank_as_empty(raw.dmsguild.affiliate),
            keywords: raw.dmsguild.keywords.trim().to_string(),
            title_filter,
            base_url: Url::parse(raw.dmsguild.base_url.trim())?,
            interval: Duration::from_secs(minutes * 60),
            timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Bot token, required only when messages are actually posted.
    pub fn require_token(&self) -> Result<&str, ConfigError> {
        if self.token.is_empty() {
            return Err(ConfigError::Missing {
                key: "discord.token",
                env: "DISCORD_TOKEN",
            });
        }
        Ok(&self.token)
    }

    #[cfg(test)]
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let builder =
            defaults()?.add_source(File::from_str(yaml, config::FileFormat::Yaml));
        Self::from_builder(builder)
    }

    pub fn require_channel(&self) -> Result<&str, ConfigError> {
        if self.channel.is_empty() {
            return Err(ConfigError::Missing {
                key: "discord.channel",
                env: "DISCORD_CHANNEL_ID",
            });
        }
        Ok(&self.channel)
    }
}

/// Help text naming the environment variable behind each config key.
pub fn env_help() -> String {
    let mut help = String::from("Environment variables (override the config file):\n");
    for (key, var) in ENV_OVERRIDES {
        help.push_str(&format!("  {:<22}{}\n", var, key));
    }
    help
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(Config::builder()
        .set_default("discord.token", "")?
        .set_default("discord.channel", "")?
        .set_default("dmsguild.affiliate", "563484")?
        .set_default("dmsguild.keywords", "fantasy%20grounds")?
        .set_default("dmsguild.title_filter", "")?
        .set_default("dmsguild.base_url", "https://www.dmsguild.com")?
        .set_default("settings.minutes", "15")?
        .set_default("settings.timeout_secs", "30")?)
}

// Keys left blank in YAML arrive as null.
fn blank_as_empty(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

fn positive(key: &'static str, value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::NotPositive {
            key,
            value: value.to_string(),
        }),
    }
}
