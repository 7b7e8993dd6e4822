//! Configuration loading and constants.
//!
//! Configuration is environment-sourced: an optional env file (`.env` or
//! `.env.production`, selected by `APP_ENV`) is merged into the process
//! environment first, then `AppConfig` is built once at startup and passed
//! down explicitly. Secrets are read from filesystem paths when a `*_FILE`
//! variable is set, falling back to the inline variable otherwise.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::secret::{read_secret, SecretError};

// =============================================================================
// Dependency Names
// =============================================================================
// Keys used in the aggregate health report. These are part of the HTTP
// contract: clients look up entries by these names.

/// Report key for the relational database probe
pub const DATABASE_NAME: &str = "database";

/// Report key for the cache probe
pub const REDIS_NAME: &str = "redis";

/// Default report key for the external website probe
pub const DEFAULT_WEBSITE_NAME: &str = "website";

// =============================================================================
// Probe Constants
// =============================================================================

/// Timeout for the external website probe, in milliseconds.
/// Database and cache probes inherit their client defaults instead.
pub const WEBSITE_TIMEOUT_MS: u64 = 3000;

/// Default URL probed by the external website indicator
pub const DEFAULT_WEBSITE_URL: &str = "https://www.rust-lang.org";

/// Maximum connections held by the probe-only database pool
pub const DATABASE_POOL_MAX_CONNECTIONS: u32 = 2;

// =============================================================================
// Default Ports and Paths
// =============================================================================

/// Default HTTP bind host
pub const DEFAULT_HTTP_HOST: &str = "0.0.0.0";

/// Default HTTP bind port
pub const DEFAULT_HTTP_PORT: u16 = 3000;

/// Default PostgreSQL port
pub const DEFAULT_DATABASE_PORT: u16 = 5432;

/// Default Redis port
pub const DEFAULT_REDIS_PORT: u16 = 6379;

/// Default Redis logical database index
pub const DEFAULT_REDIS_DB: i64 = 0;

/// Env file loaded in development
pub const ENV_FILE_DEVELOPMENT: &str = ".env";

/// Env file loaded in production
pub const ENV_FILE_PRODUCTION: &str = ".env.production";

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_FILTER: &str = "vitals=debug,tower_http=debug";

/// Default log format (text or json)
pub const DEFAULT_LOG_FORMAT: &str = "text";

/// Cache-Control value for the health endpoint: probes must always be fresh
pub const CACHE_CONTROL_HEALTH: &str = "no-store";

/// Deployment environment, selected by the `APP_ENV` variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    /// Read `APP_ENV` from the environment. Anything other than
    /// "production" counts as development.
    pub fn from_env() -> Self {
        match std::env::var("APP_ENV").as_deref() {
            Ok("production") => AppEnv::Production,
            _ => AppEnv::Development,
        }
    }

    /// The env file conventionally loaded for this environment.
    pub fn env_file(&self) -> &'static str {
        match self {
            AppEnv::Development => ENV_FILE_DEVELOPMENT,
            AppEnv::Production => ENV_FILE_PRODUCTION,
        }
    }
}

impl fmt::Display for AppEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppEnv::Development => write!(f, "development"),
            AppEnv::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP server configuration
    pub http: HttpServerConfig,
    /// Relational database probe target
    pub database: DatabaseConfig,
    /// Cache probe target; `None` when no cache is configured
    pub redis: Option<RedisConfig>,
    /// External website probe target
    pub website: WebsiteConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct HttpServerConfig {
    pub host: String,
    pub port: u16,
}

/// Connection settings for the database probe
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
}

/// Connection settings for the cache probe
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    pub db: i64,
    pub password: Option<String>,
}

/// Target for the external website probe
#[derive(Debug, Clone)]
pub struct WebsiteConfig {
    /// Report key for this probe
    pub name: String,
    pub url: String,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log format: "text" (human-readable, default) or "json" (structured)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: DEFAULT_LOG_FORMAT.to_string(),
        }
    }
}

impl AppConfig {
    /// Build the configuration from the process environment.
    ///
    /// Database settings are required; the cache section is optional and
    /// skipped entirely when `REDIS_HOST` is unset (the cache indicator then
    /// reports down without an error, rather than failing startup).
    pub fn from_env() -> Result<Self, ConfigError> {
        let http = HttpServerConfig {
            host: env_or("HTTP_HOST", DEFAULT_HTTP_HOST),
            port: env_parse("HTTP_PORT", DEFAULT_HTTP_PORT)?,
        };

        let database = DatabaseConfig {
            host: env_required("DATABASE_HOST")?,
            port: env_parse("DATABASE_PORT", DEFAULT_DATABASE_PORT)?,
            user: env_required("DATABASE_USER")?,
            password: resolve_secret("DATABASE_PASSWORD")?
                .ok_or_else(|| ConfigError::Missing("DATABASE_PASSWORD".to_string()))?,
            name: env_required("DATABASE_NAME")?,
        };

        let redis = match std::env::var("REDIS_HOST") {
            Ok(host) => Some(RedisConfig {
                host,
                port: env_parse("REDIS_PORT", DEFAULT_REDIS_PORT)?,
                db: env_parse("REDIS_DB", DEFAULT_REDIS_DB)?,
                password: resolve_secret("REDIS_PASSWORD")?,
            }),
            Err(_) => None,
        };

        let website = WebsiteConfig {
            name: env_or("WEBSITE_NAME", DEFAULT_WEBSITE_NAME),
            url: env_or("WEBSITE_URL", DEFAULT_WEBSITE_URL),
        };

        let logging = LoggingConfig {
            format: env_or("LOG_FORMAT", DEFAULT_LOG_FORMAT),
        };

        Ok(Self {
            http,
            database,
            redis,
            website,
            logging,
        })
    }
}

/// Resolve a credential: `<VAR>_FILE` takes precedence and is read from the
/// filesystem, otherwise the inline `<VAR>` value is used.
fn resolve_secret(var: &str) -> Result<Option<String>, ConfigError> {
    let file_var = format!("{var}_FILE");
    if let Ok(path) = std::env::var(&file_var) {
        return Ok(Some(read_secret(&path)?));
    }
    Ok(std::env::var(var).ok())
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_required(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::Missing(key.to_string()))
}

fn env_parse<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
{
    match std::env::var(key) {
        Ok(value) => value.parse().map_err(|_| ConfigError::Invalid {
            key: key.to_string(),
            value,
        }),
        Err(_) => Ok(default),
    }
}

/// Merge a flat `KEY=VALUE` env file into the process environment.
///
/// Variables already present in the environment win over file entries.
/// Blank lines and `#` comments are skipped; values may be wrapped in single
/// or double quotes. A missing file is not an error, so production
/// deployments can rely on real env vars alone.
pub fn load_env_file<P: AsRef<Path>>(path: P) -> Result<(), ConfigError> {
    let path = path.as_ref();
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No env file found, skipping");
            return Ok(());
        }
        Err(e) => return Err(ConfigError::EnvFile(e)),
    };

    for (key, value) in parse_env_file(&contents) {
        if std::env::var_os(&key).is_none() {
            std::env::set_var(&key, &value);
        }
    }

    Ok(())
}

fn parse_env_file(contents: &str) -> BTreeMap<String, String> {
    let mut entries = BTreeMap::new();

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim();
        let value = value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
            .unwrap_or(value);
        entries.insert(key.to_string(), value.to_string());
    }

    entries
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(String),
    #[error("Invalid value for {key}: {value}")]
    Invalid { key: String, value: String },
    #[error("Failed to read env file: {0}")]
    EnvFile(std::io::Error),
    #[error(transparent)]
    Secret(#[from] SecretError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Mutex, MutexGuard};

    // Process environment is global; serialize tests that touch it.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn lock_env() -> MutexGuard<'static, ()> {
        ENV_LOCK
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn clear_vars() {
        for key in [
            "APP_ENV",
            "HTTP_HOST",
            "HTTP_PORT",
            "DATABASE_HOST",
            "DATABASE_PORT",
            "DATABASE_USER",
            "DATABASE_PASSWORD",
            "DATABASE_PASSWORD_FILE",
            "DATABASE_NAME",
            "REDIS_HOST",
            "REDIS_PORT",
            "REDIS_DB",
            "REDIS_PASSWORD",
            "REDIS_PASSWORD_FILE",
            "WEBSITE_NAME",
            "WEBSITE_URL",
            "LOG_FORMAT",
        ] {
            std::env::remove_var(key);
        }
    }

    fn set_minimal_database_vars() {
        std::env::set_var("DATABASE_HOST", "db.internal");
        std::env::set_var("DATABASE_USER", "app");
        std::env::set_var("DATABASE_PASSWORD", "hunter2");
        std::env::set_var("DATABASE_NAME", "app");
    }

    #[test]
    fn test_from_env_applies_defaults() {
        let _guard = lock_env();
        clear_vars();
        set_minimal_database_vars();

        let config = AppConfig::from_env().unwrap();

        assert_eq!(config.http.host, DEFAULT_HTTP_HOST);
        assert_eq!(config.http.port, DEFAULT_HTTP_PORT);
        assert_eq!(config.database.port, DEFAULT_DATABASE_PORT);
        assert_eq!(config.database.password, "hunter2");
        assert!(config.redis.is_none());
        assert_eq!(config.website.name, DEFAULT_WEBSITE_NAME);
        assert_eq!(config.website.url, DEFAULT_WEBSITE_URL);
        assert_eq!(config.logging.format, "text");
    }

    #[test]
    fn test_from_env_missing_database_host_fails() {
        let _guard = lock_env();
        clear_vars();
        std::env::set_var("DATABASE_USER", "app");
        std::env::set_var("DATABASE_PASSWORD", "hunter2");
        std::env::set_var("DATABASE_NAME", "app");

        let err = AppConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ref key) if key == "DATABASE_HOST"));
    }

    #[test]
    fn test_from_env_invalid_port_fails() {
        let _guard = lock_env();
        clear_vars();
        set_minimal_database_vars();
        std::env::set_var("HTTP_PORT", "not-a-port");

        let err = AppConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "HTTP_PORT"));
    }

    #[test]
    fn test_from_env_redis_section_present_when_host_set() {
        let _guard = lock_env();
        clear_vars();
        set_minimal_database_vars();
        std::env::set_var("REDIS_HOST", "cache.internal");
        std::env::set_var("REDIS_DB", "3");

        let config = AppConfig::from_env().unwrap();
        let redis = config.redis.expect("redis section should be present");
        assert_eq!(redis.host, "cache.internal");
        assert_eq!(redis.port, DEFAULT_REDIS_PORT);
        assert_eq!(redis.db, 3);
        assert!(redis.password.is_none());
    }

    #[test]
    fn test_password_file_takes_precedence_over_inline() {
        let _guard = lock_env();
        clear_vars();
        set_minimal_database_vars();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "from-file").unwrap();
        std::env::set_var("DATABASE_PASSWORD_FILE", file.path());

        let config = AppConfig::from_env().unwrap();
        assert_eq!(config.database.password, "from-file");
    }

    #[test]
    fn test_app_env_selects_env_file() {
        let _guard = lock_env();
        clear_vars();

        assert_eq!(AppEnv::from_env(), AppEnv::Development);
        assert_eq!(AppEnv::Development.env_file(), ENV_FILE_DEVELOPMENT);

        std::env::set_var("APP_ENV", "production");
        assert_eq!(AppEnv::from_env(), AppEnv::Production);
        assert_eq!(AppEnv::Production.env_file(), ENV_FILE_PRODUCTION);

        std::env::remove_var("APP_ENV");
    }

    #[test]
    fn test_parse_env_file_skips_comments_and_unquotes() {
        let parsed = parse_env_file(
            "# comment\n\nFOO=bar\nQUOTED=\"with spaces\"\nSINGLE='single'\nNOEQUALS\n",
        );

        assert_eq!(parsed.get("FOO").unwrap(), "bar");
        assert_eq!(parsed.get("QUOTED").unwrap(), "with spaces");
        assert_eq!(parsed.get("SINGLE").unwrap(), "single");
        assert!(!parsed.contains_key("NOEQUALS"));
    }

    #[test]
    fn test_load_env_file_does_not_override_existing() {
        let _guard = lock_env();

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "VITALS_TEST_EXISTING=from-file").unwrap();
        writeln!(file, "VITALS_TEST_FRESH=loaded").unwrap();

        std::env::set_var("VITALS_TEST_EXISTING", "from-env");
        std::env::remove_var("VITALS_TEST_FRESH");

        load_env_file(file.path()).unwrap();

        assert_eq!(std::env::var("VITALS_TEST_EXISTING").unwrap(), "from-env");
        assert_eq!(std::env::var("VITALS_TEST_FRESH").unwrap(), "loaded");

        std::env::remove_var("VITALS_TEST_EXISTING");
        std::env::remove_var("VITALS_TEST_FRESH");
    }

    #[test]
    fn test_load_env_file_missing_is_ok() {
        let _guard = lock_env();
        load_env_file("/definitely/not/a/real/.env").unwrap();
    }
}
