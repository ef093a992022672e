//! Estado compartido de la aplicación
//!
//! Este módulo define la sesión (token + usuario) que se comparte entre el
//! cliente HTTP y los servicios, su persistencia en disco y el `AppState` que
//! arma todas las piezas a partir de la configuración.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::clients::PortariaClient;
use crate::config::environment::EnvironmentConfig;
use crate::ledger::{AccountDirectory, MovementLedger, ReferenceData};
use crate::models::auth::{SessionUser, UserRole};
use crate::services::{
    AuthService, AuthorizationService, MovementService, ReferenceService, ReportService,
    UserService,
};
use crate::utils::errors::AppResult;

/// Sesión iniciada
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: SessionUser,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.user.tipo_de_usuario == UserRole::Admin
    }
}

/// Sesión compartida; `None` sin login
pub type SessionHandle = Arc<RwLock<Option<Session>>>;

/// Crear un handle vacío
pub fn empty_session() -> SessionHandle {
    Arc::new(RwLock::new(None))
}

/// Persistencia de la sesión en un archivo JSON
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Leer la sesión guardada. Un archivo ausente no es un error.
    pub async fn load(&self) -> AppResult<Option<Session>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let session: Session = serde_json::from_slice(&bytes)?;
                debug!("💾 Sesión restaurada desde {}", self.path.display());
                Ok(Some(session))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn save(&self, session: &Session) -> AppResult<()> {
        let body = serde_json::to_vec_pretty(session)?;
        tokio::fs::write(&self.path, body).await?;
        debug!("💾 Sesión guardada en {}", self.path.display());
        Ok(())
    }

    pub async fn clear(&self) -> AppResult<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub session: SessionHandle,
    pub store: SessionStore,
    pub reference: Arc<dyn ReferenceData>,
    pub ledger: Arc<dyn MovementLedger>,
    pub accounts: Arc<dyn AccountDirectory>,
}

impl AppState {
    /// Estado contra el backend REST configurado
    pub fn new(config: EnvironmentConfig) -> AppResult<Self> {
        let session = empty_session();
        let client = Arc::new(PortariaClient::new(&config, session.clone())?);
        info!("🌐 Backend de portaria: {}", config.api_url);
        let store = SessionStore::new(config.session_file.clone());

        Ok(Self {
            config,
            session,
            store,
            reference: client.clone(),
            ledger: client.clone(),
            accounts: client,
        })
    }

    /// Estado sobre fronteras arbitrarias (p. ej. `InMemoryLedger`)
    pub fn with_backends(
        config: EnvironmentConfig,
        session: SessionHandle,
        reference: Arc<dyn ReferenceData>,
        ledger: Arc<dyn MovementLedger>,
        accounts: Arc<dyn AccountDirectory>,
    ) -> Self {
        let store = SessionStore::new(config.session_file.clone());
        Self {
            config,
            session,
            store,
            reference,
            ledger,
            accounts,
        }
    }

    pub fn authorization(&self) -> AuthorizationService {
        AuthorizationService::new(self.session.clone())
    }

    pub fn auth_service(&self) -> AuthService {
        AuthService::new(self.accounts.clone(), self.session.clone(), self.store.clone())
    }

    pub fn movement_service(&self) -> MovementService {
        MovementService::new(self.ledger.clone(), self.reference.clone(), self.authorization())
    }

    pub fn reference_service(&self) -> ReferenceService {
        ReferenceService::new(self.reference.clone())
    }

    pub fn report_service(&self) -> ReportService {
        ReportService::new(self.ledger.clone())
    }

    pub fn user_service(&self) -> UserService {
        UserService::new(self.accounts.clone(), self.authorization())
    }
}
