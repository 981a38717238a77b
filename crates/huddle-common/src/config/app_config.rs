//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file when
//! present). Every setting has a default; values that are present but cannot
//! be parsed are reported instead of silently replaced.

use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub invites: InviteConfig,
    pub tags: TagConfig,
    /// Budget for compensating calls made after a failed request (ms)
    #[serde(default = "default_compensation_timeout_ms")]
    pub compensation_timeout_ms: u64,
    #[serde(default)]
    pub log_format: LogFormat,
}

/// General application settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" | "dev" => Ok(Self::Development),
            other => Err(format!("unknown environment '{other}'")),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

/// Defaults applied to newly created invites
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InviteConfig {
    #[serde(default = "default_invite_ttl_hours")]
    pub default_ttl_hours: i64,
    /// 0 means unlimited
    #[serde(default)]
    pub default_max_uses: i32,
}

impl InviteConfig {
    #[must_use]
    pub fn default_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.default_ttl_hours)
    }
}

impl Default for InviteConfig {
    fn default() -> Self {
        Self {
            default_ttl_hours: default_invite_ttl_hours(),
            default_max_uses: 0,
        }
    }
}

/// Post-send tag processing
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TagConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_tag_queue_capacity")]
    pub queue_capacity: usize,
    #[serde(default = "default_tag_job_timeout_ms")]
    pub job_timeout_ms: u64,
}

impl TagConfig {
    #[must_use]
    pub fn job_timeout(&self) -> Duration {
        Duration::from_millis(self.job_timeout_ms)
    }
}

impl Default for TagConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            queue_capacity: default_tag_queue_capacity(),
            job_timeout_ms: default_tag_job_timeout_ms(),
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "huddle".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_invite_ttl_hours() -> i64 {
    168 // 7 days
}

fn default_true() -> bool {
    true
}

fn default_tag_queue_capacity() -> usize {
    1024
}

fn default_tag_job_timeout_ms() -> u64 {
    5000
}

fn default_compensation_timeout_ms() -> u64 {
    5000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppSettings {
                name: default_app_name(),
                env: default_env(),
            },
            invites: InviteConfig::default(),
            tags: TagConfig::default(),
            compensation_timeout_ms: default_compensation_timeout_ms(),
            log_format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a variable is set to a value that cannot be parsed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup
    ///
    /// # Errors
    /// Returns an error if a key maps to a value that cannot be parsed
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = parse_or(&lookup, "APP_ENV", default_env())?;
        // Production logs are structured unless asked otherwise
        let log_format_default = if env.is_production() {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        };

        let config = Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env,
            },
            invites: InviteConfig {
                default_ttl_hours: parse_or(
                    &lookup,
                    "INVITE_DEFAULT_TTL_HOURS",
                    default_invite_ttl_hours(),
                )?,
                default_max_uses: parse_or(&lookup, "INVITE_DEFAULT_MAX_USES", 0)?,
            },
            tags: TagConfig {
                enabled: parse_or(&lookup, "TAGS_ENABLED", default_true())?,
                queue_capacity: parse_or(
                    &lookup,
                    "TAGS_QUEUE_CAPACITY",
                    default_tag_queue_capacity(),
                )?,
                job_timeout_ms: parse_or(
                    &lookup,
                    "TAGS_JOB_TIMEOUT_MS",
                    default_tag_job_timeout_ms(),
                )?,
            },
            compensation_timeout_ms: parse_or(
                &lookup,
                "COMPENSATION_TIMEOUT_MS",
                default_compensation_timeout_ms(),
            )?,
            log_format: parse_or(&lookup, "LOG_FORMAT", log_format_default)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Timeout given to compensating calls
    #[must_use]
    pub fn compensation_timeout(&self) -> Duration {
        Duration::from_millis(self.compensation_timeout_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.invites.default_ttl_hours <= 0 {
            return Err(ConfigError::InvalidValue(
                "INVITE_DEFAULT_TTL_HOURS",
                "must be positive".to_string(),
            ));
        }
        if self.invites.default_max_uses < 0 {
            return Err(ConfigError::InvalidValue(
                "INVITE_DEFAULT_MAX_USES",
                "must not be negative".to_string(),
            ));
        }
        if self.tags.queue_capacity == 0 {
            return Err(ConfigError::InvalidValue(
                "TAGS_QUEUE_CAPACITY",
                "must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidValue(key, format!("'{raw}': {e}"))),
        _ => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
