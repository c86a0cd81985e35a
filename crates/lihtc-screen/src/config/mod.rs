use crate::workflows::reference::ReferencePaths;
use crate::workflows::screening::domain::{CreditType, UsState};
use chrono::{Datelike, Local};
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

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
    pub screening: ScreeningSettings,
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

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            screening: ScreeningSettings::from_env()?,
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

/// Reference data locations and screening rule inputs.
#[derive(Debug, Clone)]
pub struct ScreeningSettings {
    pub reference: ReferencePaths,
    /// Census batch geocoder output used to fill blank coordinates.
    pub geocode_results: Option<PathBuf>,
    pub application_year: i32,
    pub credit_type: CreditType,
    pub weights_path: Option<PathBuf>,
    pub flood_high_is_fatal: bool,
    pub default_state: Option<UsState>,
}

impl ScreeningSettings {
    fn from_env() -> Result<Self, ConfigError> {
        let application_year = match non_empty_var("LIHTC_APPLICATION_YEAR") {
            Some(raw) => {
                parse_application_year(&raw).ok_or(ConfigError::InvalidApplicationYear(raw))?
            }
            None => Local::now().year(),
        };

        let credit_type = match non_empty_var("LIHTC_CREDIT_TYPE") {
            Some(raw) => CreditType::parse(&raw).ok_or(ConfigError::InvalidCreditType(raw))?,
            None => CreditType::default(),
        };

        let flood_high_is_fatal = match non_empty_var("LIHTC_FLOOD_HIGH_IS_FATAL") {
            Some(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidFlag {
                name: "LIHTC_FLOOD_HIGH_IS_FATAL",
                value: raw,
            })?,
            None => false,
        };

        Ok(Self {
            reference: ReferencePaths {
                qct: path_var("LIHTC_QCT_PATH"),
                dda: path_var("LIHTC_DDA_PATH"),
                flood: path_var("LIHTC_FLOOD_PATH"),
                competitors: path_var("LIHTC_COMPETITORS_PATH"),
            },
            geocode_results: path_var("LIHTC_GEOCODE_RESULTS_PATH"),
            application_year,
            credit_type,
            weights_path: path_var("LIHTC_WEIGHTS_PATH"),
            flood_high_is_fatal,
            default_state: non_empty_var("LIHTC_DEFAULT_STATE").map(|raw| UsState::parse(&raw)),
        })
    }
}

/// Accepts years from the first LIHTC round (1987) through 2100.
pub fn parse_application_year(raw: &str) -> Option<i32> {
    raw.trim()
        .parse::<i32>()
        .ok()
        .filter(|year| (1987..=2100).contains(year))
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn path_var(name: &str) -> Option<PathBuf> {
    non_empty_var(name).map(PathBuf::from)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidApplicationYear(String),
    InvalidCreditType(String),
    InvalidFlag { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidApplicationYear(value) => write!(
                f,
                "LIHTC_APPLICATION_YEAR must be a four-digit year, got '{}'",
                value
            ),
            ConfigError::InvalidCreditType(value) => {
                write!(f, "LIHTC_CREDIT_TYPE must be 9 or 4, got '{}'", value)
            }
            ConfigError::InvalidFlag { name, value } => {
                write!(f, "{} must be true or false, got '{}'", name, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
