//! Modelo de Pessoa
//!
//! Colaboradores, visitantes y terceros registrados en la portaria.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::EntityId;
use crate::utils::filter::Searchable;

/// Persona registrada
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: EntityId,
    pub nome: String,
    pub documento: String,
    #[serde(default)]
    pub telefone: Option<String>,
    pub tipo_pessoa_id: EntityId,
    /// Descripción del tipo (colaborador/visitante/terceiro) resuelta por el backend
    #[serde(default)]
    pub tipo_descricao: Option<String>,
}

/// Tipo de persona (`GET /pessoas/tipos`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonType {
    pub id: EntityId,
    pub nome: String,
}

/// Request para crear o actualizar una persona
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PersonRequest {
    #[validate(length(min = 1, max = 150))]
    pub nome: String,

    #[validate(length(min = 1, max = 30))]
    pub documento: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefone: Option<String>,

    pub tipo_pessoa_id: EntityId,
}

impl Searchable for Person {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.nome.as_str(), self.documento.as_str()]
    }
}

impl Searchable for PersonType {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.nome.as_str()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::filter::filter_by_term;

    #[test]
    fn test_person_from_backend_json() {
        let body = r#"{"id": 1, "nome": "Ana Silva", "documento": "12345678900",
                       "telefone": null, "tipo_pessoa_id": 2, "tipo_descricao": "Visitante"}"#;
        let person: Person = serde_json::from_str(body).unwrap();
        assert_eq!(person.nome, "Ana Silva");
        assert_eq!(person.tipo_descricao.as_deref(), Some("Visitante"));
    }

    #[test]
    fn test_search_by_name_or_document() {
        let people = vec![
            Person {
                id: 1,
                nome: "Ana Silva".to_string(),
                documento: "12345678900".to_string(),
                telefone: None,
                tipo_pessoa_id: 2,
                tipo_descricao: None,
            },
            Person {
                id: 2,
                nome: "Bruno Costa".to_string(),
                documento: "98765432100".to_string(),
                telefone: None,
                tipo_pessoa_id: 1,
                tipo_descricao: None,
            },
        ];
        assert_eq!(filter_by_term(&people, "silva").len(), 1);
        assert_eq!(filter_by_term(&people, "987")[0].id, 2);
    }
}
