use std::sync::Arc;

use tracing::info;
use validator::Validate;

use crate::ledger::AccountDirectory;
use crate::models::user::{User, UserRequest};
use crate::models::EntityId;
use crate::services::authorization_service::AuthorizationService;
use crate::utils::errors::{validation_error, AppResult};

/// Administración de usuarios (solo admin)
pub struct UserService {
    accounts: Arc<dyn AccountDirectory>,
    authorization: AuthorizationService,
}

impl UserService {
    pub fn new(accounts: Arc<dyn AccountDirectory>, authorization: AuthorizationService) -> Self {
        Self {
            accounts,
            authorization,
        }
    }

    pub async fn list(&self) -> AppResult<Vec<User>> {
        self.authorization.require_admin("list users").await?;
        self.accounts.list_users().await
    }

    /// Crear usuario; la contraseña es obligatoria
    pub async fn create(&self, mut request: UserRequest) -> AppResult<()> {
        self.authorization.require_admin("create user").await?;
        request.senha = normalize_password(request.senha);
        if request.senha.is_none() {
            return Err(validation_error("senha", "required for new users"));
        }
        request.validate()?;

        self.accounts.create_user(&request).await?;
        info!("👤 Usuário criado: {}", request.email);
        Ok(())
    }

    /// Actualizar usuario; sin contraseña se conserva la actual
    pub async fn update(&self, id: EntityId, mut request: UserRequest) -> AppResult<()> {
        self.authorization.require_admin("update user").await?;
        request.senha = normalize_password(request.senha);
        request.validate()?;

        self.accounts.update_user(id, &request).await?;
        info!("👤 Usuário {} atualizado", id);
        Ok(())
    }

    pub async fn delete(&self, id: EntityId) -> AppResult<()> {
        self.authorization.require_admin("delete user").await?;
        self.accounts.delete_user(id).await?;
        info!("🗑️ Usuário {} excluído", id);
        Ok(())
    }
}

fn normalize_password(senha: Option<String>) -> Option<String> {
    senha.filter(|s| !s.trim().is_empty())
}
