//! Sistema de manejo de errores
//!
//! Este módulo define la taxonomía de errores del cliente de portaria
//! y su conversión a mensajes para el operador.

use rust_decimal::Decimal;
use thiserror::Error;

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    /// Precondición local fallida; nunca llega a la red
    #[error("Validation error: {reason}")]
    Validation {
        reason: String,
        minimum: Option<Decimal>,
    },

    #[error("Request rejected ({status}): {message}")]
    Request { status: u16, message: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Cannot delete, still referenced: {0}")]
    Constraint(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl AppError {
    /// Mensaje que se muestra al operador
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation { reason, minimum: Some(min) } => {
                format!("{} (mínimo: {})", reason, min)
            }
            AppError::Validation { reason, .. } => reason.clone(),
            AppError::Request { message, .. } => message.clone(),
            AppError::Conflict(msg) => msg.clone(),
            AppError::Constraint(msg) => msg.clone(),
            AppError::Network(_) => "Falha de comunicação com o servidor.".to_string(),
            AppError::Unauthorized(_) => "Sessão inválida. Faça login novamente.".to_string(),
            AppError::Forbidden(msg) => msg.clone(),
            AppError::NotFound(msg) => msg.clone(),
            AppError::Decode(_) => "Resposta inesperada do servidor.".to_string(),
            AppError::Config(msg) => msg.clone(),
            AppError::Storage(msg) => msg.clone(),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation {
            reason: errors.to_string(),
            minimum: None,
        }
    }
}

impl From<validator::ValidationError> for AppError {
    fn from(error: validator::ValidationError) -> Self {
        let reason = error
            .message
            .as_ref()
            .map(|m| m.to_string())
            .unwrap_or_else(|| format!("invalid value ({})", error.code));
        AppError::Validation {
            reason,
            minimum: None,
        }
    }
}

impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            AppError::Decode(error.to_string())
        } else {
            AppError::Network(error.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        AppError::Decode(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        AppError::Storage(error.to_string())
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de validación
pub fn validation_error(field: &str, message: &str) -> AppError {
    AppError::Validation {
        reason: format!("{}: {}", field, message),
        minimum: None,
    }
}

/// Error de validación del odómetro de chegada
pub fn odometer_order_error(minimum: Decimal) -> AppError {
    AppError::Validation {
        reason: "arrival odometer must exceed departure odometer".to_string(),
        minimum: Some(minimum),
    }
}

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &str, id: i64) -> AppError {
    AppError::NotFound(format!("{} with id '{}' not found", resource, id))
}

/// Función helper para crear errores de acceso prohibido
pub fn forbidden_error(operation: &str, reason: &str) -> AppError {
    AppError::Forbidden(format!("Cannot {}: {}", operation, reason))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_odometer_error_carries_minimum() {
        let err = odometer_order_error(Decimal::from(50000));
        match &err {
            AppError::Validation { reason, minimum } => {
                assert_eq!(reason, "arrival odometer must exceed departure odometer");
                assert_eq!(*minimum, Some(Decimal::from(50000)));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.user_message().contains("50000"));
    }

    #[test]
    fn test_request_error_surfaces_server_message() {
        let err = AppError::Request {
            status: 400,
            message: "Pessoa já está no pátio".to_string(),
        };
        assert_eq!(err.user_message(), "Pessoa já está no pátio");
    }

    #[test]
    fn test_network_error_is_generic() {
        let err = AppError::Network("connection refused".to_string());
        assert_eq!(err.user_message(), "Falha de comunicação com o servidor.");
    }
}
