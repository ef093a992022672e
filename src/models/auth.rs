use serde::{Deserialize, Serialize};
use validator::Validate;

use super::EntityId;

/// Roles del sistema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Operador,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Operador => "operador",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Some(UserRole::Admin),
            "operador" => Some(UserRole::Operador),
            _ => None,
        }
    }

    /// Perfil escrito por el operador; vacío conserva `current`.
    /// `None` si no se reconoce.
    pub fn from_input(raw: &str, current: Option<UserRole>) -> Option<Self> {
        if raw.trim().is_empty() {
            return current;
        }
        Self::parse(raw)
    }

    /// Etiqueta mostrada en la interfaz
    pub fn label(&self) -> &'static str {
        match self {
            UserRole::Admin => "Administrador",
            UserRole::Operador => "Operador",
        }
    }
}

/// Usuario autenticado tal como lo devuelve `POST /login`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: EntityId,
    pub nome: String,
    pub email: String,
    pub tipo_de_usuario: UserRole,
}

/// Request de login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub senha: String,
}

/// Response de login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: SessionUser,
}

/// Request de auto-registro (`POST /register`)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 120))]
    pub nome: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub senha: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_format() {
        let json = serde_json::to_string(&UserRole::Operador).unwrap();
        assert_eq!(json, "\"operador\"");
        let role: UserRole = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, UserRole::Admin);
        assert_eq!(UserRole::parse(" ADMIN "), Some(UserRole::Admin));
        assert_eq!(UserRole::parse("super_admin"), None);
    }

    #[test]
    fn test_mistyped_role_is_not_accepted() {
        assert_eq!(UserRole::from_input("admn", Some(UserRole::Admin)), None);
        assert_eq!(UserRole::from_input("", None), None);
        assert_eq!(UserRole::from_input("  ", Some(UserRole::Admin)), Some(UserRole::Admin));
        assert_eq!(
            UserRole::from_input("Operador", Some(UserRole::Admin)),
            Some(UserRole::Operador)
        );
    }

    #[test]
    fn test_login_response_shape() {
        let body = r#"{
            "token": "abc.def.ghi",
            "user": {"id": 7, "nome": "Carla", "email": "carla@empresa.com", "tipo_de_usuario": "operador"}
        }"#;
        let response: LoginResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.token, "abc.def.ghi");
        assert_eq!(response.user.tipo_de_usuario, UserRole::Operador);
    }

    #[test]
    fn test_register_request_validation() {
        let request = RegisterRequest {
            nome: "".to_string(),
            email: "sem-arroba".to_string(),
            senha: "x".to_string(),
        };
        assert!(request.validate().is_err());
    }
}
