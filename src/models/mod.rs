//! Modelos del sistema
//!
//! Este módulo contiene los modelos de datos que mapean exactamente
//! al contrato JSON del backend de portaria (nombres de campo en portugués).

pub mod auth;
pub mod dashboard;
pub mod draft;
pub mod movement;
pub mod person;
pub mod reference;
pub mod user;
pub mod vehicle;

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{de, Deserialize, Deserializer};
use serde_json::Value;

/// Identificador opaco asignado por el backend
pub type EntityId = i64;

/// Deserializar una lectura de odómetro opcional.
///
/// El backend devuelve `null`, números, cadenas numéricas (columnas NUMERIC)
/// o `""` cuando el formulario se envió sin lectura.
pub(crate) fn deserialize_optional_decimal<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => parse_decimal(s.trim()).map(Some).map_err(de::Error::custom),
        Some(Value::Number(n)) => parse_decimal(&n.to_string()).map(Some).map_err(de::Error::custom),
        Some(other) => Err(de::Error::custom(format!("invalid odometer value: {}", other))),
    }
}

/// Igual que [`deserialize_optional_decimal`] pero obligatorio
pub(crate) fn deserialize_decimal<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    deserialize_optional_decimal(deserializer)?
        .ok_or_else(|| de::Error::custom("missing odometer value"))
}

fn parse_decimal(raw: &str) -> Result<Decimal, String> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .map_err(|e| format!("invalid decimal '{}': {}", raw, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Reading {
        #[serde(default, deserialize_with = "deserialize_optional_decimal")]
        km: Option<Decimal>,
    }

    fn read(json: &str) -> Option<Decimal> {
        serde_json::from_str::<Reading>(json).unwrap().km
    }

    #[test]
    fn test_odometer_accepts_backend_shapes() {
        assert_eq!(read(r#"{"km": null}"#), None);
        assert_eq!(read(r#"{}"#), None);
        assert_eq!(read(r#"{"km": ""}"#), None);
        assert_eq!(read(r#"{"km": 50000}"#), Some(Decimal::from(50000)));
        assert_eq!(read(r#"{"km": "50120.00"}"#), Some(Decimal::from(50120)));
        assert_eq!(
            read(r#"{"km": 12.5}"#),
            Some(Decimal::from_str("12.5").unwrap())
        );
    }

    #[test]
    fn test_odometer_rejects_garbage() {
        assert!(serde_json::from_str::<Reading>(r#"{"km": "muito"}"#).is_err());
        assert!(serde_json::from_str::<Reading>(r#"{"km": true}"#).is_err());
    }
}
