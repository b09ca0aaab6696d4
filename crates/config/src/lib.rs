//! uptime-notify configuration
use std::path::PathBuf;

use chrono::FixedOffset;
use clap::{Parser, ValueEnum};
use url::Url;

/// Default Better Uptime API host
pub const DEFAULT_BETTERUPTIME_URL: &str = "https://betteruptime.com";

/// Default Telegram Bot API host
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Longest accepted incident lookback window, one year
pub const MAX_LOOKBACK_HOURS: u64 = 24 * 365;

/// How the incident name filter is interpreted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum NameMatch {
    /// Incident name must equal the filter
    #[default]
    Exact,
    /// Filter is a regular expression
    Regex,
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

fn non_empty(value: &str) -> Result<String, String> {
    if value.trim().is_empty() {
        return Err("value must not be empty".to_owned());
    }
    Ok(value.to_owned())
}

/// Better Uptime configuration options
#[derive(Debug, Clone, Parser)]
pub struct BetterUptimeOpts {
    /// Better Uptime API token
    #[clap(
        id = "betteruptime_token",
        long = "betteruptime-token",
        env = "BETTERUPTIME_TOKEN",
        hide_env_values = true
    )]
    pub token: String,
    /// Better Uptime API host
    #[clap(long = "betteruptime-url", env = "BETTERUPTIME_URL", default_value = DEFAULT_BETTERUPTIME_URL)]
    pub url: Url,
    /// Name of the incidents to watch
    #[clap(long, env = "INCIDENT_NAME", value_parser = non_empty)]
    pub incident_name: String,
    /// How `--incident-name` is matched against incident names
    #[clap(long, env = "INCIDENT_NAME_MATCH", value_enum, default_value_t = NameMatch::Exact)]
    pub name_match: NameMatch,
    /// How many hours of incidents to request
    #[clap(
        long,
        env = "INCIDENT_LOOKBACK_HOURS",
        default_value = "24",
        value_parser = clap::value_parser!(u64).range(1..=MAX_LOOKBACK_HOURS)
    )]
    pub lookback_hours: u64,
    /// Acknowledge new incidents on Better Uptime once their notification is delivered
    #[clap(long, env = "INCIDENT_ACKNOWLEDGE")]
    pub acknowledge: bool,
}

/// Telegram configuration options
#[derive(Debug, Clone, Parser)]
pub struct TelegramOpts {
    /// Telegram bot token
    #[clap(
        id = "telegram_token",
        long = "telegram-token",
        env = "TELEGRAM_TOKEN",
        hide_env_values = true
    )]
    pub token: String,
    /// Chat receiving incident notifications
    #[clap(long = "telegram-chat-id", env = "TELEGRAM_CHAT_ID")]
    pub chat_id: String,
    /// Chat receiving copies of notifications and failure reports
    #[clap(long = "telegram-debug-chat-id", env = "TELEGRAM_CHAT_ID_DEBUG")]
    pub debug_chat_id: Option<String>,
    /// Telegram Bot API host
    #[clap(long = "telegram-url", env = "TELEGRAM_API_URL", default_value = DEFAULT_TELEGRAM_API_URL)]
    pub api_url: Url,
    /// UTC offset used for times in messages, e.g. +02:00
    #[clap(long, env = "DISPLAY_UTC_OFFSET", default_value = "+00:00", allow_hyphen_values = true)]
    pub display_offset: FixedOffset,
}

/// State persistence options
#[derive(Debug, Clone, Parser)]
pub struct StateOpts {
    /// File holding the incidents already reported as open
    #[clap(long, env = "STATE_FILE", default_value = "uptime-notify-state.json")]
    pub state_file: PathBuf,
}

/// CLI options for uptime-notify
#[derive(Debug, Clone, Parser)]
#[clap(name = "uptime-notify", about = "Notify a Telegram chat about Better Uptime incidents")]
pub struct Opts {
    /// Better Uptime configuration
    #[clap(flatten)]
    pub betteruptime: BetterUptimeOpts,

    /// Telegram configuration
    #[clap(flatten)]
    pub telegram: TelegramOpts,

    /// State persistence configuration
    #[clap(flatten)]
    pub state: StateOpts,

    /// Timeout for every HTTP request, in seconds
    #[clap(
        long,
        env = "HTTP_TIMEOUT_SECS",
        default_value = "10",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub http_timeout_secs: u64,

    /// Log notifications instead of sending them and leave the state file untouched
    #[clap(long, env = "DRY_RUN")]
    pub dry_run: bool,

    /// Log output format
    #[clap(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}
