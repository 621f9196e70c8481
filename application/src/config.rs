//! [`Config`]-related definitions.

use std::time;

use config::{builder::DefaultState, ConfigBuilder, ConfigError};
use secrecy::{ExposeSecret as _, SecretString};
use serde::Deserialize;
use smart_default::SmartDefault;

/// Application configuration.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: Server,

    /// Session transport configuration.
    pub session: Session,

    /// Postgres configuration.
    pub postgres: Postgres,

    /// Log configuration.
    pub log: Log,
}

impl Config {
    /// Creates a new [`Config`] by:
    /// - loading it from the provided `path` (if any);
    /// - merging it with the environment variables (if any);
    /// - using default values for missing fields.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix("CONF").separator("."))
            .build()?
            .try_deserialize()
    }
}

/// Server configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Server {
    /// Host to bind the server to.
    #[default("0.0.0.0".to_owned())]
    pub host: String,

    /// Port to bind the server to.
    #[default(3000)]
    pub port: u16,

    /// [CORS] configuration.
    ///
    /// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
    pub cors: Cors,

    /// [`Environment`] the server runs in.
    pub environment: Environment,
}

/// [CORS] configuration.
///
/// [CORS]: https://developer.mozilla.org/en-US/docs/Web/HTTP/CORS
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Cors {
    /// List of allowed origins.
    #[default(vec!["*".to_owned()])]
    pub origins: Vec<String>,
}

/// Environment the server runs in.
///
/// Decides how much of an internal failure is revealed to clients.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Environment {
    /// Local development: internal failures are described to clients.
    #[default]
    Development,

    /// Production: internal failures are redacted.
    Production,
}

/// Session transport configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Session {
    /// Name of the cookie carrying a session token.
    ///
    /// Consulted only when no `Authorization: Bearer` header is provided.
    #[default("session".to_owned())]
    pub cookie: String,
}

/// Postgres configuration.
#[derive(Clone, Debug, Deserialize, SmartDefault)]
#[serde(default)]
pub struct Postgres {
    /// Host to connect to.
    #[default("127.0.0.1".to_owned())]
    pub host: String,

    /// Port to connect to.
    #[default(5432)]
    pub port: u16,

    /// User to connect as.
    #[default("postgres".to_owned())]
    pub user: String,

    /// Password to connect with.
    #[default(SecretString::from("postgres"))]
    pub password: SecretString,

    /// Database name to connect to.
    #[default("postgres".to_owned())]
    pub dbname: String,

    /// Maximum number of pooled connections.
    #[default(20)]
    pub pool_size: usize,

    /// Timeout of establishing a single connection.
    #[default(time::Duration::from_secs(60))]
    #[serde(with = "humantime_serde")]
    pub connect_timeout: time::Duration,

    /// Number of additional connection attempts on startup.
    #[default(5)]
    pub retries: u32,

    /// Delay before the first additional connection attempt on startup.
    ///
    /// Doubles with every next attempt.
    #[default(time::Duration::from_secs(1))]
    #[serde(with = "humantime_serde")]
    pub retry_delay: time::Duration,
}

impl From<&Postgres> for service::infra::postgres::Config {
    fn from(value: &Postgres) -> Self {
        let Postgres {
            host,
            port,
            user,
            password,
            dbname,
            pool_size,
            connect_timeout,
            retries: _,
            retry_delay: _,
        } = value;

        Self {
            host: Some(host.clone()),
            port: Some(*port),
            user: Some(user.clone()),
            password: Some(password.expose_secret().to_owned()),
            dbname: Some(dbname.clone()),
            connect_timeout: Some(*connect_timeout),
            pool: Some(service::infra::postgres::PoolConfig::new(*pool_size)),
            ..Self::default()
        }
    }
}

/// Log configuration.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Log {
    /// Log level.
    pub level: LogLevel,
}

/// Log level.
#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogLevel {
    /// Designates very low priority, often extremely verbose, information.
    Trace,

    /// Designates lower priority information.
    Debug,

    /// Designates useful information.
    #[default]
    Info,

    /// Designates hazardous situations.
    Warn,

    /// Designates very serious errors.
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use super::{Config, Environment, Postgres};

    #[test]
    fn defaults() {
        let Config {
            server,
            session,
            postgres,
            log: _,
        } = Config::default();

        assert_eq!(server.port, 3000);
        assert_eq!(server.environment, Environment::Development);
        assert_eq!(session.cookie, "session");
        assert_eq!(postgres.retries, 5);
        assert_eq!(postgres.retry_delay, Duration::from_secs(1));
    }

    #[test]
    fn converts_into_pool_config() {
        let conf = service::infra::postgres::Config::from(&Postgres::default());

        assert_eq!(conf.host.as_deref(), Some("127.0.0.1"));
        assert_eq!(conf.password.as_deref(), Some("postgres"));
        assert_eq!(conf.connect_timeout, Some(Duration::from_secs(60)));
        assert_eq!(conf.pool.map(|p| p.max_size), Some(20));
    }
}
