//! Modelo de Usuário
//!
//! Credenciales del sistema. La contraseña es de solo escritura.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::auth::UserRole;
use super::EntityId;
use crate::utils::filter::Searchable;

/// Usuario tal como lo lista `GET /usuarios` (sin contraseña)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: EntityId,
    pub nome: String,
    pub email: String,
    pub tipo_de_usuario: UserRole,
    #[serde(default = "default_active")]
    pub ativo: bool,
}

fn default_active() -> bool {
    true
}

/// Request para crear o actualizar un usuario.
///
/// `senha = None` omite el campo del JSON: el backend conserva la contraseña.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UserRequest {
    #[validate(length(min = 1, max = 120))]
    pub nome: String,

    #[validate(email)]
    pub email: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub senha: Option<String>,

    pub tipo_de_usuario: UserRole,

    pub ativo: bool,
}

impl Searchable for User {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.nome.as_str(), self.email.as_str()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_password_is_omitted_from_body() {
        let request = UserRequest {
            nome: "Carla".to_string(),
            email: "carla@empresa.com".to_string(),
            senha: None,
            tipo_de_usuario: UserRole::Operador,
            ativo: true,
        };
        let body = serde_json::to_value(&request).unwrap();
        assert!(body.get("senha").is_none());
        assert_eq!(body["tipo_de_usuario"], "operador");
    }
}
