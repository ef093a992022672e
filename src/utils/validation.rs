//! Utilidades de validación
//!
//! Este módulo contiene funciones helper para validación de datos
//! de formularios y conversión de tipos.

use std::str::FromStr;

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use validator::ValidationError;

use crate::utils::errors::{validation_error, AppResult};

lazy_static! {
    static ref PLATE_PATTERN: Regex = Regex::new(r"^[A-Z0-9]{5,10}$").unwrap();
}

/// Validar y convertir string a fecha
pub fn validate_date(value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        let mut error = ValidationError::new("date");
        error.add_param("value".into(), &value.to_string());
        error.add_param("format".into(), &"YYYY-MM-DD".to_string());
        error
    })
}

/// Validar que un string no esté vacío
pub fn validate_not_empty(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("not_empty");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Validar longitud mínima y máxima
pub fn validate_length(value: &str, min: usize, max: usize) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len < min || len > max {
        let mut error = ValidationError::new("length");
        error.add_param("min".into(), &min);
        error.add_param("max".into(), &max);
        error.add_param("actual".into(), &len);
        return Err(error);
    }
    Ok(())
}

/// Validar que un valor sea no negativo
pub fn validate_non_negative<T: PartialOrd + std::fmt::Display + num_traits::Zero + Serialize>(
    value: T,
) -> Result<(), ValidationError> {
    if value < T::zero() {
        let mut error = ValidationError::new("non_negative");
        error.add_param("value".into(), &value);
        return Err(error);
    }
    Ok(())
}

/// Normalizar una placa: mayúsculas, sin espacios
pub fn normalize_plate(value: &str) -> String {
    value.trim().to_uppercase()
}

/// Validar formato de placa de vehículo
pub fn validate_license_plate(value: &str) -> Result<(), ValidationError> {
    let clean_plate = normalize_plate(value).replace([' ', '-', '_'], "");
    if !PLATE_PATTERN.is_match(&clean_plate) {
        let mut error = ValidationError::new("license_plate");
        error.add_param("value".into(), &value.to_string());
        return Err(error);
    }
    Ok(())
}

/// Convertir texto libre en `Option`, descartando cadenas vacías
pub fn non_empty_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Interpretar la lectura de un odómetro escrita por el operador.
///
/// Vacío significa "sin lectura". Se acepta `,` como separador decimal.
pub fn parse_odometer(value: &str) -> AppResult<Option<Decimal>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let normalized = if trimmed.contains(',') && !trimmed.contains('.') {
        trimmed.replace(',', ".")
    } else {
        trimmed.replace(',', "")
    };

    let km = Decimal::from_str(&normalized)
        .map_err(|_| validation_error("odometer", "must be a number"))?;
    validate_non_negative(km).map_err(|_| validation_error("odometer", "must not be negative"))?;
    Ok(Some(km))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_date() {
        let valid_date = "2024-01-15";
        assert!(validate_date(valid_date).is_ok());

        let invalid_date = "2024/01/15";
        assert!(validate_date(invalid_date).is_err());
    }

    #[test]
    fn test_validate_not_empty() {
        assert!(validate_not_empty("Ana").is_ok());
        assert!(validate_not_empty("   ").is_err());
    }

    #[test]
    fn test_validate_length() {
        let value = "test";
        assert!(validate_length(value, 1, 10).is_ok());
        assert!(validate_length(value, 5, 10).is_err());
        assert!(validate_length(value, 1, 3).is_err());
    }

    #[test]
    fn test_validate_license_plate() {
        assert!(validate_license_plate("abc-1234").is_ok());
        assert!(validate_license_plate("BRA2E19").is_ok());
        assert!(validate_license_plate("A").is_err());
        assert!(validate_license_plate("ABC#123").is_err());
        assert!(validate_license_plate("ABCDEFGHIJK").is_err());
    }

    #[test]
    fn test_parse_odometer() {
        assert_eq!(parse_odometer("").unwrap(), None);
        assert_eq!(parse_odometer("  50120 ").unwrap(), Some(Decimal::from(50120)));
        assert_eq!(
            parse_odometer("1234,5").unwrap(),
            Some(Decimal::from_str("1234.5").unwrap())
        );
        assert_eq!(
            parse_odometer("50,120.5").unwrap(),
            Some(Decimal::from_str("50120.5").unwrap())
        );
        assert!(parse_odometer("-10").is_err());
        assert!(parse_odometer("dez").is_err());
    }

    #[test]
    fn test_non_empty_text() {
        assert_eq!(non_empty_text("  "), None);
        assert_eq!(non_empty_text(" Reunião "), Some("Reunião".to_string()));
    }
}
