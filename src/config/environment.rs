//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración
//! del cliente de portaria.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::utils::errors::{AppError, AppResult};

const DEFAULT_API_URL: &str = "http://localhost:3333";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_SESSION_FILE: &str = ".portaria_session.json";

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub api_url: String,
    pub request_timeout_secs: u64,
    pub session_file: PathBuf,
    pub log_level: String,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
            log_level: "info".to_string(),
        }
    }
}

impl EnvironmentConfig {
    /// Leer la configuración de las variables de entorno (tras `dotenv`)
    pub fn from_env() -> AppResult<Self> {
        let defaults = Self::default();

        let request_timeout_secs = match env::var("PORTARIA_HTTP_TIMEOUT_SECS") {
            Ok(raw) => raw.trim().parse::<u64>().map_err(|_| {
                AppError::Config(format!(
                    "PORTARIA_HTTP_TIMEOUT_SECS must be a valid number, got '{}'",
                    raw
                ))
            })?,
            Err(_) => defaults.request_timeout_secs,
        };

        let api_url = env::var("PORTARIA_API_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .unwrap_or(defaults.api_url);
        if api_url.is_empty() {
            return Err(AppError::Config("PORTARIA_API_URL must not be empty".to_string()));
        }

        Ok(Self {
            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            api_url,
            request_timeout_secs,
            session_file: env::var("PORTARIA_SESSION_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.session_file),
            log_level: env::var("PORTARIA_LOG_LEVEL").unwrap_or(defaults.log_level),
        })
    }

    /// Timeout de las peticiones HTTP
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Nivel de log para `tracing_subscriber`
    pub fn tracing_level(&self) -> tracing::Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => tracing::Level::TRACE,
            "debug" => tracing::Level::DEBUG,
            "warn" => tracing::Level::WARN,
            "error" => tracing::Level::ERROR,
            _ => tracing::Level::INFO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_point_to_local_backend() {
        let config = EnvironmentConfig::default();
        assert_eq!(config.api_url, "http://localhost:3333");
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.environment, "development");
    }

    #[test]
    fn test_tracing_level_falls_back_to_info() {
        let config = EnvironmentConfig {
            log_level: "verbose".to_string(),
            ..EnvironmentConfig::default()
        };
        assert_eq!(config.tracing_level(), tracing::Level::INFO);
    }
}
