use crate::state::{Session, SessionHandle};
use crate::utils::errors::{forbidden_error, AppError, AppResult};

/// Servicio de autorización: comprobaciones de rol contra la sesión actual.
///
/// El backend es quien decide; aquí solo se evita enviar peticiones que
/// el rol del operador no puede hacer.
#[derive(Clone)]
pub struct AuthorizationService {
    session: SessionHandle,
}

impl AuthorizationService {
    pub fn new(session: SessionHandle) -> Self {
        Self { session }
    }

    /// Sesión actual, si existe
    pub async fn current(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    /// Exige una sesión iniciada
    pub async fn require_session(&self) -> AppResult<Session> {
        self.current()
            .await
            .ok_or_else(|| AppError::Unauthorized("no active session".to_string()))
    }

    /// Exige rol admin para `operation`
    pub async fn require_admin(&self, operation: &str) -> AppResult<Session> {
        let session = self.require_session().await?;
        if !session.is_admin() {
            return Err(forbidden_error(operation, "admin role required"));
        }
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::{SessionUser, UserRole};
    use crate::state::empty_session;

    async fn signed_in(role: UserRole) -> AuthorizationService {
        let handle = empty_session();
        *handle.write().await = Some(Session {
            token: "t".to_string(),
            user: SessionUser {
                id: 1,
                nome: "Carla".to_string(),
                email: "carla@empresa.com".to_string(),
                tipo_de_usuario: role,
            },
        });
        AuthorizationService::new(handle)
    }

    #[tokio::test]
    async fn test_no_session_is_unauthorized() {
        let auth = AuthorizationService::new(empty_session());
        assert!(matches!(
            auth.require_admin("delete movement").await,
            Err(AppError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_operator_is_forbidden() {
        let auth = signed_in(UserRole::Operador).await;
        match auth.require_admin("delete movement").await {
            Err(AppError::Forbidden(msg)) => assert!(msg.contains("delete movement")),
            other => panic!("unexpected: {:?}", other),
        }
        assert!(auth.require_session().await.is_ok());
    }

    #[tokio::test]
    async fn test_admin_passes() {
        let auth = signed_in(UserRole::Admin).await;
        assert!(auth.require_admin("delete movement").await.is_ok());
    }
}
