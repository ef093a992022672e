//! Entidades de referencia simples: setores, postos de controle y cidades.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::EntityId;
use crate::utils::filter::Searchable;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    pub id: EntityId,
    pub nome: String,
}

/// Posto de controle (portão / guarita)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlPost {
    pub id: EntityId,
    pub nome: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub id: EntityId,
    pub nome: String,
    #[serde(default)]
    pub uf: Option<String>,
}

impl City {
    pub fn label(&self) -> String {
        match &self.uf {
            Some(uf) if !uf.is_empty() => format!("{} - {}", self.nome, uf),
            _ => self.nome.clone(),
        }
    }
}

/// Request para setores y postos (`{nome}`)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NamedEntityRequest {
    #[validate(length(min = 1, max = 120))]
    pub nome: String,
}

/// Request para crear una ciudad
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CityRequest {
    #[validate(length(min = 1, max = 120))]
    pub nome: String,

    #[validate(length(min = 2, max = 2))]
    pub uf: String,
}

impl CityRequest {
    /// Alta rápida desde el formulario de flota
    pub fn quick(nome: &str) -> Self {
        Self {
            nome: nome.trim().to_string(),
            uf: "BR".to_string(),
        }
    }
}

impl Searchable for Sector {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.nome.as_str()]
    }
}

impl Searchable for ControlPost {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.nome.as_str()]
    }
}

impl Searchable for City {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.nome.as_str()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quick_city_defaults_uf() {
        let request = CityRequest::quick("  Campinas ");
        assert_eq!(request.nome, "Campinas");
        assert_eq!(request.uf, "BR");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_city_label() {
        let city = City { id: 1, nome: "Campinas".to_string(), uf: Some("SP".to_string()) };
        assert_eq!(city.label(), "Campinas - SP");
    }
}
