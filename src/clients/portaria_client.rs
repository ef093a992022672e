//! Cliente HTTP para el backend de portaria
//!
//! Implementa las tres fronteras (`ReferenceData`, `MovementLedger`,
//! `AccountDirectory`) sobre la API REST. Cada petición lleva el token de la
//! sesión compartida cuando existe. Las respuestas de error se traducen a
//! `AppError` usando el campo `error` del cuerpo o, si falta, el mensaje por
//! defecto de la operación.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::config::environment::EnvironmentConfig;
use crate::dto::{
    AccessCorrection, AccessEntryRequest, AccessExitRequest, FleetCorrection,
    FleetDepartureRequest, FleetReturnRequest, MovementQuery,
};
use crate::ledger::{AccountDirectory, MovementLedger, ReferenceData};
use crate::models::auth::{LoginRequest, LoginResponse, RegisterRequest};
use crate::models::dashboard::DashboardSummary;
use crate::models::movement::{AccessMovement, FleetMovement, MovementKind};
use crate::models::person::{Person, PersonRequest, PersonType};
use crate::models::reference::{City, CityRequest, ControlPost, NamedEntityRequest, Sector};
use crate::models::user::{User, UserRequest};
use crate::models::vehicle::{Vehicle, VehicleFilter, VehicleRequest};
use crate::models::EntityId;
use crate::state::SessionHandle;
use crate::utils::errors::{AppError, AppResult};

/// Cliente HTTP del backend de portaria
#[derive(Clone)]
pub struct PortariaClient {
    client: Client,
    base_url: String,
    session: SessionHandle,
}

impl PortariaClient {
    /// Crear cliente con el timeout y la URL base de la configuración
    pub fn new(config: &EnvironmentConfig, session: SessionHandle) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| AppError::Config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_url.clone(),
            session,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        match self.session.read().await.as_ref() {
            Some(session) => builder.bearer_auth(&session.token),
            None => builder,
        }
    }

    /// Adjuntar el token y enviar; solo falla por transporte
    async fn execute(&self, builder: RequestBuilder) -> AppResult<Response> {
        let builder = self.authorized(builder).await;
        builder.send().await.map_err(|e| {
            error!("❌ Falha de comunicação com o backend: {}", e);
            AppError::from(e)
        })
    }

    /// Enviar la petición y mapear el estado HTTP a `AppError`
    async fn send(&self, builder: RequestBuilder, fallback: &str) -> AppResult<Response> {
        let response = self.execute(builder).await?;
        if response.status().is_success() {
            return Ok(response);
        }
        let (status, message) = rejected(response).await;
        Err(status_error(status, message.unwrap_or_else(|| fallback.to_string())))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, fallback: &str) -> AppResult<T> {
        debug!("🔍 GET /{}", path);
        let response = self.send(self.client.get(self.url(path)), fallback).await?;
        Ok(response.json::<T>().await?)
    }

    async fn get_json_with_query<T, Q>(&self, path: &str, query: &Q, fallback: &str) -> AppResult<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        debug!("🔍 GET /{} (con filtros)", path);
        let builder = self.client.get(self.url(path)).query(query);
        let response = self.send(builder, fallback).await?;
        Ok(response.json::<T>().await?)
    }

    async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B, fallback: &str) -> AppResult<Response> {
        debug!("📤 POST /{}", path);
        self.send(self.client.post(self.url(path)).json(body), fallback).await
    }

    async fn put_json<B: Serialize + ?Sized>(&self, path: &str, body: &B, fallback: &str) -> AppResult<()> {
        debug!("📤 PUT /{}", path);
        self.send(self.client.put(self.url(path)).json(body), fallback).await?;
        Ok(())
    }

    async fn delete(&self, path: &str, fallback: &str) -> AppResult<()> {
        debug!("🗑️ DELETE /{}", path);
        let response = self.execute(self.client.delete(self.url(path))).await?;
        if response.status().is_success() {
            return Ok(());
        }
        let (status, message) = rejected(response).await;
        Err(deletion_error(status, message, fallback))
    }
}

const SERVER_FAILURE: &str = "Erro no servidor. Tente novamente.";

/// Estado y mensaje de una respuesta rechazada, registrada con `warn!`
async fn rejected(response: Response) -> (StatusCode, Option<String>) {
    let status = response.status();
    let url = response.url().to_string();
    let message = server_message(response).await;
    warn!(
        "⚠️ {} {} -> {}",
        status.as_u16(),
        url,
        message.as_deref().unwrap_or("(sem mensagem)")
    );
    (status, message)
}

/// Mensaje del backend (`{"error": "..."}`), si viene alguno
async fn server_message(response: Response) -> Option<String> {
    let body: serde_json::Value = response.json().await.ok()?;
    body.get("error")
        .or_else(|| body.get("message"))
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn status_error(status: StatusCode, message: String) -> AppError {
    match status {
        StatusCode::UNAUTHORIZED => AppError::Unauthorized(message),
        StatusCode::FORBIDDEN => AppError::Forbidden(message),
        StatusCode::NOT_FOUND => AppError::NotFound(message),
        StatusCode::CONFLICT => AppError::Conflict(message),
        _ => AppError::Request {
            status: status.as_u16(),
            message,
        },
    }
}

/// Rechazo de un DELETE.
///
/// Los 4xx y los 500 con mensaje del backend indican que la entidad sigue
/// referenciada. Un fallo del servidor sin mensaje queda como `Request`.
fn deletion_error(status: StatusCode, message: Option<String>, fallback: &str) -> AppError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
            status_error(status, message.unwrap_or_else(|| fallback.to_string()))
        }
        s if s.is_client_error() => {
            AppError::Constraint(message.unwrap_or_else(|| fallback.to_string()))
        }
        StatusCode::INTERNAL_SERVER_ERROR if message.is_some() => {
            AppError::Constraint(message.unwrap_or_default())
        }
        s => AppError::Request {
            status: s.as_u16(),
            message: message.unwrap_or_else(|| SERVER_FAILURE.to_string()),
        },
    }
}

fn movement_path(kind: MovementKind, suffix: &str) -> String {
    if suffix.is_empty() {
        format!("movimentacoes/{}", kind.path())
    } else {
        format!("movimentacoes/{}/{}", kind.path(), suffix)
    }
}

#[async_trait]
impl ReferenceData for PortariaClient {
    async fn list_people(&self) -> AppResult<Vec<Person>> {
        self.get_json("pessoas", "Erro ao carregar lista de pessoas.").await
    }

    async fn list_person_types(&self) -> AppResult<Vec<PersonType>> {
        self.get_json("pessoas/tipos", "Erro ao carregar tipos").await
    }

    async fn create_person(&self, request: &PersonRequest) -> AppResult<()> {
        self.post_json("pessoas", request, "Erro ao salvar dados.").await?;
        Ok(())
    }

    async fn update_person(&self, id: EntityId, request: &PersonRequest) -> AppResult<()> {
        self.put_json(&format!("pessoas/{}", id), request, "Erro ao salvar dados.").await
    }

    async fn delete_person(&self, id: EntityId) -> AppResult<()> {
        self.delete(&format!("pessoas/{}", id), "Erro ao excluir.").await
    }

    async fn list_vehicles(&self, filter: VehicleFilter) -> AppResult<Vec<Vehicle>> {
        let fallback = "Erro ao carregar veículos.";
        if !filter.owned_fleet_only {
            return self.get_json("veiculos", fallback).await;
        }
        let vehicles: Vec<Vehicle> = self
            .get_json_with_query("veiculos", &[("frota", "true")], fallback)
            .await?;
        // El backend puede ignorar el parámetro
        Ok(vehicles.into_iter().filter(Vehicle::is_owned_fleet).collect())
    }

    async fn create_vehicle(&self, request: &VehicleRequest) -> AppResult<()> {
        self.post_json("veiculos", request, "Erro ao salvar.").await?;
        Ok(())
    }

    async fn update_vehicle(&self, id: EntityId, request: &VehicleRequest) -> AppResult<()> {
        self.put_json(&format!("veiculos/{}", id), request, "Erro ao salvar.").await
    }

    async fn delete_vehicle(&self, id: EntityId) -> AppResult<()> {
        self.delete(
            &format!("veiculos/{}", id),
            "Erro ao excluir veículo. Ele pode ter histórico de acessos.",
        )
        .await
    }

    async fn list_sectors(&self) -> AppResult<Vec<Sector>> {
        self.get_json("setores", "Erro ao carregar setores.").await
    }

    async fn create_sector(&self, request: &NamedEntityRequest) -> AppResult<()> {
        self.post_json("setores", request, "Erro ao salvar setor.").await?;
        Ok(())
    }

    async fn update_sector(&self, id: EntityId, request: &NamedEntityRequest) -> AppResult<()> {
        self.put_json(&format!("setores/{}", id), request, "Erro ao salvar setor.").await
    }

    async fn delete_sector(&self, id: EntityId) -> AppResult<()> {
        self.delete(
            &format!("setores/{}", id),
            "Não é possível excluir setores que possuem histórico de acesso.",
        )
        .await
    }

    async fn list_control_posts(&self) -> AppResult<Vec<ControlPost>> {
        self.get_json("postos", "Erro ao carregar postos.").await
    }

    async fn create_control_post(&self, request: &NamedEntityRequest) -> AppResult<()> {
        self.post_json("postos", request, "Erro ao salvar posto.").await?;
        Ok(())
    }

    async fn update_control_post(&self, id: EntityId, request: &NamedEntityRequest) -> AppResult<()> {
        self.put_json(&format!("postos/{}", id), request, "Erro ao salvar posto.").await
    }

    async fn delete_control_post(&self, id: EntityId) -> AppResult<()> {
        self.delete(
            &format!("postos/{}", id),
            "Não é possível excluir postos com movimentações.",
        )
        .await
    }

    async fn list_cities(&self) -> AppResult<Vec<City>> {
        self.get_json("cidades", "Erro ao carregar lista.").await
    }

    async fn create_city(&self, request: &CityRequest) -> AppResult<()> {
        self.post_json("cidades", request, "Erro ao criar cidade.").await?;
        Ok(())
    }
}

#[async_trait]
impl MovementLedger for PortariaClient {
    async fn list_access(&self, query: &MovementQuery) -> AppResult<Vec<AccessMovement>> {
        self.get_json_with_query(
            &movement_path(MovementKind::Access, ""),
            query,
            "Erro ao carregar pátio",
        )
        .await
    }

    async fn register_entry(&self, request: &AccessEntryRequest) -> AppResult<()> {
        self.post_json(
            &movement_path(MovementKind::Access, "entrada"),
            request,
            "Erro ao registrar entrada",
        )
        .await?;
        Ok(())
    }

    async fn register_exit(&self, id: EntityId, request: &AccessExitRequest) -> AppResult<()> {
        self.put_json(
            &movement_path(MovementKind::Access, &format!("saida/{}", id)),
            request,
            "Erro ao registrar saída.",
        )
        .await
    }

    async fn correct_access(&self, id: EntityId, request: &AccessCorrection) -> AppResult<()> {
        self.put_json(
            &movement_path(MovementKind::Access, &id.to_string()),
            request,
            "Erro ao salvar alterações.",
        )
        .await
    }

    async fn delete_access(&self, id: EntityId) -> AppResult<()> {
        self.delete(&movement_path(MovementKind::Access, &id.to_string()), "Erro ao excluir.")
            .await
    }

    async fn list_fleet(&self, query: &MovementQuery) -> AppResult<Vec<FleetMovement>> {
        self.get_json_with_query(
            &movement_path(MovementKind::Fleet, ""),
            query,
            "Erro ao carregar viagens",
        )
        .await
    }

    async fn register_departure(&self, request: &FleetDepartureRequest) -> AppResult<()> {
        self.post_json(
            &movement_path(MovementKind::Fleet, "saida"),
            request,
            "Erro ao iniciar viagem",
        )
        .await?;
        Ok(())
    }

    async fn register_return(&self, id: EntityId, request: &FleetReturnRequest) -> AppResult<()> {
        self.put_json(
            &movement_path(MovementKind::Fleet, &format!("retorno/{}", id)),
            request,
            "Erro ao registrar retorno",
        )
        .await
    }

    async fn correct_fleet(&self, id: EntityId, request: &FleetCorrection) -> AppResult<()> {
        self.put_json(
            &movement_path(MovementKind::Fleet, &id.to_string()),
            request,
            "Erro ao salvar alterações.",
        )
        .await
    }

    async fn delete_fleet(&self, id: EntityId) -> AppResult<()> {
        self.delete(&movement_path(MovementKind::Fleet, &id.to_string()), "Erro ao excluir.")
            .await
    }

    async fn dashboard_summary(&self) -> AppResult<DashboardSummary> {
        self.get_json("dashboard/resumo", "Erro ao carregar cadastros").await
    }
}

#[async_trait]
impl AccountDirectory for PortariaClient {
    async fn login(&self, request: &LoginRequest) -> AppResult<LoginResponse> {
        let response = self.post_json("login", request, "Erro no login").await?;
        Ok(response.json::<LoginResponse>().await?)
    }

    async fn register(&self, request: &RegisterRequest) -> AppResult<()> {
        self.post_json("register", request, "Erro ao realizar cadastro.").await?;
        Ok(())
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        self.get_json("usuarios", "Erro ao carregar usuários.").await
    }

    async fn create_user(&self, request: &UserRequest) -> AppResult<()> {
        self.post_json("usuarios", request, "Erro ao salvar usuário.").await?;
        Ok(())
    }

    async fn update_user(&self, id: EntityId, request: &UserRequest) -> AppResult<()> {
        self.put_json(&format!("usuarios/{}", id), request, "Erro ao salvar usuário.").await
    }

    async fn delete_user(&self, id: EntityId) -> AppResult<()> {
        // Un usuario no tiene referencias: el rechazo conserva su estado HTTP
        let path = format!("usuarios/{}", id);
        debug!("🗑️ DELETE /{}", path);
        self.send(self.client.delete(self.url(&path)), "Erro ao excluir usuário.")
            .await?;
        Ok(())
    }
}
