//! Modelo de Veículo
//!
//! Vehículos de visitantes y de la flota propia. Solo los marcados como
//! `veiculo_de_frota_propria` pueden usarse en movimientos de flota.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::EntityId;
use crate::utils::filter::Searchable;

/// Vehículo registrado
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: EntityId,
    pub placa: String,
    #[serde(default)]
    pub modelo: Option<String>,
    #[serde(default)]
    pub cor: Option<String>,
    #[serde(default)]
    pub veiculo_de_frota_propria: bool,
}

impl Vehicle {
    /// Placa tal como se muestra (siempre en mayúsculas)
    pub fn display_plate(&self) -> String {
        self.placa.to_uppercase()
    }

    /// `Modelo (PLACA)` para listados
    pub fn label(&self) -> String {
        match &self.modelo {
            Some(modelo) if !modelo.trim().is_empty() => {
                format!("{} ({})", modelo, self.display_plate())
            }
            _ => self.display_plate(),
        }
    }

    pub fn is_owned_fleet(&self) -> bool {
        self.veiculo_de_frota_propria
    }
}

/// Request para crear o actualizar un vehículo
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VehicleRequest {
    #[validate(length(min = 5, max = 10))]
    pub placa: String,

    #[validate(length(min = 1, max = 100))]
    pub modelo: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cor: Option<String>,

    pub veiculo_de_frota_propria: bool,
}

/// Filtro para listado de vehículos
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VehicleFilter {
    pub owned_fleet_only: bool,
}

impl VehicleFilter {
    pub fn owned_fleet() -> Self {
        Self { owned_fleet_only: true }
    }

    pub fn all() -> Self {
        Self::default()
    }
}

impl Searchable for Vehicle {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.placa.as_str()];
        if let Some(modelo) = &self.modelo {
            fields.push(modelo.as_str());
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_plate_is_uppercase() {
        let vehicle = Vehicle {
            id: 3,
            placa: "abc1d23".to_string(),
            modelo: Some("Strada".to_string()),
            cor: None,
            veiculo_de_frota_propria: true,
        };
        assert_eq!(vehicle.display_plate(), "ABC1D23");
        assert_eq!(vehicle.label(), "Strada (ABC1D23)");
        assert!(vehicle.matches("strada"));
        assert!(vehicle.matches("1d2"));
    }

    #[test]
    fn test_missing_flag_defaults_to_visitor_vehicle() {
        let vehicle: Vehicle = serde_json::from_str(r#"{"id": 1, "placa": "XYZ9876"}"#).unwrap();
        assert!(!vehicle.is_owned_fleet());
        assert_eq!(vehicle.label(), "XYZ9876");
    }
}
