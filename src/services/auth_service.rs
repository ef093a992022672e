use std::sync::Arc;

use tracing::{info, warn};
use validator::Validate;

use crate::ledger::AccountDirectory;
use crate::models::auth::{LoginRequest, RegisterRequest};
use crate::state::{Session, SessionHandle, SessionStore};
use crate::utils::errors::{validation_error, AppResult};
use crate::utils::validation::validate_not_empty;

/// Servicio de autenticación
///
/// Inicia y cierra la sesión compartida y la mantiene sincronizada con el
/// archivo de sesión.
pub struct AuthService {
    accounts: Arc<dyn AccountDirectory>,
    session: SessionHandle,
    store: SessionStore,
}

impl AuthService {
    pub fn new(accounts: Arc<dyn AccountDirectory>, session: SessionHandle, store: SessionStore) -> Self {
        Self {
            accounts,
            session,
            store,
        }
    }

    /// Autentica al operador y guarda la sesión
    pub async fn login(&self, email: &str, senha: &str) -> AppResult<Session> {
        validate_not_empty(email).map_err(|_| validation_error("email", "must not be empty"))?;
        validate_not_empty(senha).map_err(|_| validation_error("senha", "must not be empty"))?;

        let request = LoginRequest {
            email: email.trim().to_string(),
            senha: senha.to_string(),
        };
        let response = self.accounts.login(&request).await?;
        let session = Session {
            token: response.token,
            user: response.user,
        };

        *self.session.write().await = Some(session.clone());
        if let Err(e) = self.store.save(&session).await {
            // La sesión en memoria sigue siendo válida
            warn!("⚠️ No se pudo guardar la sesión: {}", e);
        }
        info!(
            "✅ Login de {} ({})",
            session.user.email,
            session.user.tipo_de_usuario.as_str()
        );
        Ok(session)
    }

    /// Auto-registro; el backend crea el usuario como operador
    pub async fn register(&self, request: RegisterRequest) -> AppResult<()> {
        request.validate()?;
        self.accounts.register(&request).await?;
        info!("✅ Cadastro realizado para {}", request.email);
        Ok(())
    }

    /// Restaurar la sesión guardada en disco.
    ///
    /// Un archivo ilegible se borra y se arranca sin sesión.
    pub async fn restore(&self) -> AppResult<Option<Session>> {
        let restored = match self.store.load().await {
            Ok(session) => session,
            Err(e) => {
                warn!("⚠️ Sesión guardada ilegible, se descarta: {}", e);
                self.store.clear().await?;
                None
            }
        };
        *self.session.write().await = restored.clone();
        Ok(restored)
    }

    pub async fn current(&self) -> Option<Session> {
        self.session.read().await.clone()
    }

    /// Cerrar sesión y borrar el archivo
    pub async fn sign_out(&self) -> AppResult<()> {
        *self.session.write().await = None;
        self.store.clear().await?;
        info!("👋 Sesión cerrada");
        Ok(())
    }
}
