//! Configuration layer: typed settings with layered precedence (file → env).

use std::path::Path;

use chrono_tz::Tz;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;


const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "tribuna";
const ENV_PREFIX: &str = "TRIBUNA";

const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000/api/";
const DEFAULT_SESSION_TTL_HOURS: i64 = 12;
const DEFAULT_PUBLIC_PAGE_SIZE: u32 = 12;
const DEFAULT_ADMIN_PAGE_SIZE: u32 = 20;
const DEFAULT_TIMEZONE: Tz = chrono_tz::America::Sao_Paulo;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Load(#[from] config::ConfigError),
    #[error("invalid setting `{field}`: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PortalSettings {
    pub api: ApiSettings,
    pub session: SessionSettings,
    pub pagination: PaginationSettings,
    /// Display timezone for the public site; storage stays in UTC.
    pub timezone: Tz,
    pub logging: LoggingSettings,
}

impl Default for PortalSettings {
    fn default() -> Self {
        Self {
            api: ApiSettings::default(),
            session: SessionSettings::default(),
            pagination: PaginationSettings::default(),
            timezone: DEFAULT_TIMEZONE,
            logging: LoggingSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    pub bearer_token: Option<String>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            bearer_token: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub ttl_hours: i64,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            ttl_hours: DEFAULT_SESSION_TTL_HOURS,
        }
    }
}

impl SessionSettings {
    pub fn ttl(&self) -> time::Duration {
        time::Duration::hours(self.ttl_hours)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaginationSettings {
    pub public_page_size: u32,
    pub admin_page_size: u32,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            public_page_size: DEFAULT_PUBLIC_PAGE_SIZE,
            admin_page_size: DEFAULT_ADMIN_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: LogLevel,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Compact,
}

impl PortalSettings {
    /// Load settings with layered precedence: the shared default file, a
    /// local override file, an explicit file when given, then environment
    /// variables under the `TRIBUNA` prefix (`TRIBUNA__API__BASE_URL`, …).
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
            .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));
        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path));
        }
        let settings: PortalSettings = builder
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        Url::parse(&self.api.base_url).map_err(|err| ConfigError::Invalid {
            field: "api.base_url",
            message: err.to_string(),
        })?;
        if self.session.ttl_hours < 1 {
            return Err(ConfigError::Invalid {
                field: "session.ttl_hours",
                message: "must be at least 1".to_string(),
            });
        }
        if self.pagination.public_page_size < 1 {
            return Err(ConfigError::Invalid {
                field: "pagination.public_page_size",
                message: "must be at least 1".to_string(),
            });
        }
        if self.pagination.admin_page_size < 1 {
            return Err(ConfigError::Invalid {
                field: "pagination.admin_page_size",
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
