use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub jobsearch: JobSearchConfig,
    pub store: StoreConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let jobsearch = JobSearchConfig {
            base_url: env::var("JOBSEARCH_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_JOBSEARCH_URL.to_string()),
            api_key: env::var("JOBSEARCH_API_KEY")
                .ok()
                .filter(|value| !value.trim().is_empty()),
            page_size: numeric_var("JOBSEARCH_PAGE_SIZE", 100)?,
            max_offset: numeric_var("JOBSEARCH_MAX_OFFSET", 2000)?,
            max_retries: numeric_var("JOBSEARCH_MAX_RETRIES", 2)?,
            timeout: Duration::from_secs(numeric_var("JOBSEARCH_TIMEOUT_SECS", 30)?),
        };
        if jobsearch.page_size == 0 {
            return Err(ConfigError::InvalidNumber {
                key: "JOBSEARCH_PAGE_SIZE",
            });
        }

        let table = env::var("LEADMATCH_TABLE").unwrap_or_else(|_| "annonser".to_string());
        validate_table_name(&table)?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            jobsearch,
            store: StoreConfig {
                db_path: env::var("LEADMATCH_DB_PATH")
                    .unwrap_or_else(|_| "jobbdata.db".to_string()),
                table,
            },
        })
    }
}

pub const DEFAULT_JOBSEARCH_URL: &str = "https://jobsearch.api.jobtechdev.se/search";

fn numeric_var<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { key }),
        Err(_) => Ok(default),
    }
}

/// Table names end up inside SQL text, so only plain identifiers pass.
pub fn validate_table_name(name: &str) -> Result<(), ConfigError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };

    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidTable {
            name: name.to_string(),
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Job-search API paging and retry settings.
#[derive(Debug, Clone)]
pub struct JobSearchConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub page_size: u32,
    pub max_offset: u32,
    pub max_retries: u32,
    pub timeout: Duration,
}

impl Default for JobSearchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_JOBSEARCH_URL.to_string(),
            api_key: None,
            page_size: 100,
            max_offset: 2000,
            max_retries: 2,
            timeout: Duration::from_secs(30),
        }
    }
}

/// Location of the SQLite dump written by the refresh job.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub db_path: String,
    pub table: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str },
    InvalidTable { name: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key } => {
                write!(f, "{key} must be a positive whole number")
            }
            ConfigError::InvalidTable { name } => write!(
                f,
                "table name '{name}' must start with a letter or underscore and contain only letters, digits and underscores"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidTable { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "JOBSEARCH_BASE_URL",
            "JOBSEARCH_API_KEY",
            "JOBSEARCH_PAGE_SIZE",
            "JOBSEARCH_MAX_OFFSET",
            "JOBSEARCH_MAX_RETRIES",
            "JOBSEARCH_TIMEOUT_SECS",
            "LEADMATCH_DB_PATH",
            "LEADMATCH_TABLE",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.jobsearch.base_url, DEFAULT_JOBSEARCH_URL);
        assert_eq!(config.jobsearch.page_size, 100);
        assert_eq!(config.jobsearch.max_offset, 2000);
        assert!(config.jobsearch.api_key.is_none());
        assert_eq!(config.store.db_path, "jobbdata.db");
        assert_eq!(config.store.table, "annonser");
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn rejects_non_numeric_paging_values() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("JOBSEARCH_PAGE_SIZE", "lots");
        let error = AppConfig::load().expect_err("page size must be numeric");
        assert!(matches!(
            error,
            ConfigError::InvalidNumber {
                key: "JOBSEARCH_PAGE_SIZE"
            }
        ));
        reset_env();
    }

    #[test]
    fn rejects_table_names_that_are_not_identifiers() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("LEADMATCH_TABLE", "annonser; DROP TABLE x");
        let error = AppConfig::load().expect_err("table name rejected");
        assert!(matches!(error, ConfigError::InvalidTable { .. }));
        reset_env();

        assert!(validate_table_name("job_ads_2025").is_ok());
        assert!(validate_table_name("_tmp").is_ok());
        assert!(validate_table_name("2025_ads").is_err());
        assert!(validate_table_name("").is_err());
    }
}
