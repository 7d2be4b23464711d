//! Process configuration loaded via OrthoConfig.
//!
//! [`ServerSettings`] is the raw, layered view (CLI flags, `APP_*` environment
//! variables, config files). [`AppConfig::from_settings`] validates it once at
//! startup; everything downstream receives the validated value.

use std::fmt;
use std::str::FromStr;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Deserializer};
use url::Url;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";

/// Raw settings as supplied by the environment.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "APP")]
pub struct ServerSettings {
    /// Run mode: `development`, `production`, or `test`.
    pub mode: Option<String>,
    /// TCP port to listen on.
    #[ortho_config(default = 3001)]
    pub port: u16,
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Allowed browser origins. Each entry may itself be comma separated.
    #[serde(default, deserialize_with = "one_or_many")]
    pub cors_origin: Vec<String>,
    /// Minimum log level.
    pub log_level: Option<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            mode: None,
            port: DEFAULT_PORT,
            database_url: None,
            cors_origin: Vec::new(),
            log_level: None,
        }
    }
}

/// Comma-separated environment values arrive as a list, single values as a
/// string.
#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(value)) => vec![value],
        Some(OneOrMany::Many(values)) => values,
    })
}

impl ServerSettings {
    /// Configured port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Allowed origins, trimmed, with empty entries dropped. Falls back to
    /// the local development client when none are configured.
    pub fn cors_origins(&self) -> Vec<String> {
        let origins: Vec<String> = self
            .cors_origin
            .iter()
            .flat_map(|entry| entry.split(','))
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_owned)
            .collect();
        if origins.is_empty() {
            vec![DEFAULT_CORS_ORIGIN.to_owned()]
        } else {
            origins
        }
    }
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The layered sources could not be merged.
    #[error("failed to load configuration: {0}")]
    Load(String),
    /// `APP_DATABASE_URL` is unset.
    #[error("APP_DATABASE_URL is required")]
    MissingDatabaseUrl,
    /// `APP_DATABASE_URL` is not a URL.
    #[error("APP_DATABASE_URL is not a valid URL: {0}")]
    InvalidDatabaseUrl(#[source] url::ParseError),
    /// `APP_MODE` names no known mode.
    #[error("unknown run mode '{0}'")]
    InvalidMode(String),
    /// An `APP_CORS_ORIGIN` entry is a wildcard or not an absolute origin.
    #[error("invalid CORS origin '{0}'")]
    InvalidCorsOrigin(String),
    /// `APP_LOG_LEVEL` names no known level.
    #[error("unknown log level '{0}'")]
    InvalidLogLevel(String),
}

/// Deployment mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunMode {
    /// Local development; diagnostics are exposed.
    #[default]
    Development,
    /// Live traffic; diagnostics are hidden.
    Production,
    /// Automated tests; request logging is silenced.
    Test,
}

impl RunMode {
    /// Whether error responses may carry diagnostics.
    pub fn exposes_details(self) -> bool {
        self != Self::Production
    }

    /// Whether each request is logged on completion.
    pub fn logs_requests(self) -> bool {
        self != Self::Test
    }

    /// Name as accepted in `APP_MODE`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Test => "test",
        }
    }
}

impl FromStr for RunMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            "test" => Ok(Self::Test),
            _ => Err(ConfigError::InvalidMode(s.to_owned())),
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minimum log severity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    /// Unrecoverable failures. Filtered as `error`.
    Fatal,
    /// Failures.
    Error,
    /// Suspicious conditions.
    Warn,
    /// Lifecycle events.
    #[default]
    Info,
    /// Diagnostics.
    Debug,
    /// Everything.
    Trace,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_filter(self) -> &'static str {
        match self {
            Self::Fatal | Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fatal" => Ok(Self::Fatal),
            "error" => Ok(Self::Error),
            "warn" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(ConfigError::InvalidLogLevel(s.to_owned())),
        }
    }
}

/// Validated configuration handed to the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Deployment mode.
    pub mode: RunMode,
    /// TCP port to listen on.
    pub port: u16,
    /// PostgreSQL connection URL.
    pub database_url: Url,
    /// Allowed browser origins.
    pub cors_origins: Vec<String>,
    /// Minimum log severity.
    pub log_level: LogLevel,
}

impl AppConfig {
    /// Load settings from the process arguments and environment, then
    /// validate them.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when loading fails or a value is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let settings = ServerSettings::load_from_iter(std::env::args_os())
            .map_err(|err| ConfigError::Load(err.to_string()))?;
        Self::from_settings(&settings)
    }

    /// Validate raw settings.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when a value is missing or malformed.
    pub fn from_settings(settings: &ServerSettings) -> Result<Self, ConfigError> {
        let mode = settings
            .mode
            .as_deref()
            .map_or(Ok(RunMode::default()), str::parse)?;
        let log_level = settings
            .log_level
            .as_deref()
            .map_or(Ok(LogLevel::default()), str::parse)?;
        let raw_url = settings
            .database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or(ConfigError::MissingDatabaseUrl)?;
        let database_url = Url::parse(raw_url).map_err(ConfigError::InvalidDatabaseUrl)?;
        let cors_origins = settings.cors_origins();
        if let Some(bad) = cors_origins.iter().find(|origin| !is_origin(origin)) {
            return Err(ConfigError::InvalidCorsOrigin(bad.clone()));
        }

        Ok(Self {
            mode,
            port: settings.port(),
            database_url,
            cors_origins,
            log_level,
        })
    }
}

/// `scheme://host[:port]` with an http(s) scheme and nothing after the
/// authority.
fn is_origin(candidate: &str) -> bool {
    Url::parse(candidate).is_ok_and(|url| {
        matches!(url.scheme(), "http" | "https")
            && url.host_str().is_some()
            && url.path() == "/"
            && url.query().is_none()
            && url.fragment().is_none()
    })
}
