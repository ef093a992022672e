//! Servicio de movimentação
//!
//! Ciclo de vida de los dos tipos de movimiento: apertura, cierre, consulta
//! de los abiertos, corrección y exclusión. Toda validación local se hace
//! antes de tocar el backend.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::dto::{AccessCorrection, FleetCorrection, MovementQuery};
use crate::ledger::{MovementLedger, ReferenceData};
use crate::models::draft::{
    ensure_arrival_exceeds, AccessDraft, AccessExitDraft, FleetDraft, FleetReturnDraft,
    MovementDraft, OpenRequest,
};
use crate::models::movement::{AccessMovement, FleetMovement, MovementKind, MovementRef};
use crate::models::vehicle::VehicleFilter;
use crate::services::authorization_service::AuthorizationService;
use crate::utils::errors::{validation_error, AppResult};
use crate::utils::validation::validate_non_negative;

/// Aviso mostrado antes de excluir un movimiento
pub const DELETION_WARNING: &str =
    "ATENÇÃO: Excluir uma movimentação é irreversível. Deseja continuar?";

/// Exclusión pendiente de confirmación.
///
/// Solo `MovementService::request_deletion` puede crearla.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDeletion {
    target: MovementRef,
}

impl PendingDeletion {
    pub fn target(&self) -> MovementRef {
        self.target
    }

    pub fn warning(&self) -> &'static str {
        DELETION_WARNING
    }
}

pub struct MovementService {
    ledger: Arc<dyn MovementLedger>,
    reference: Arc<dyn ReferenceData>,
    authorization: AuthorizationService,
}

impl MovementService {
    pub fn new(
        ledger: Arc<dyn MovementLedger>,
        reference: Arc<dyn ReferenceData>,
        authorization: AuthorizationService,
    ) -> Self {
        Self {
            ledger,
            reference,
            authorization,
        }
    }

    /// Abrir un movimiento a partir de un borrador
    pub async fn open(&self, draft: MovementDraft) -> AppResult<()> {
        match draft.validate()? {
            OpenRequest::Access(request) => {
                self.ledger.register_entry(&request).await?;
                info!("🚪 Entrada registrada para pessoa {}", request.id_pessoa);
            }
            OpenRequest::Fleet(request) => {
                // El indicador de frota pudo cambiar desde que se cargó el formulario
                let owned = self.reference.list_vehicles(VehicleFilter::owned_fleet()).await?;
                if !owned.iter().any(|v| v.id == request.id_veiculo) {
                    return Err(validation_error(
                        "vehicle",
                        "only owned-fleet vehicles can start a trip",
                    ));
                }
                self.ledger.register_departure(&request).await?;
                info!(
                    "🚚 Saída de frota registrada: veículo {} com {} km",
                    request.id_veiculo, request.km_entrada
                );
            }
        }
        Ok(())
    }

    pub async fn open_access(&self, draft: AccessDraft) -> AppResult<()> {
        self.open(MovementDraft::Access(draft)).await
    }

    pub async fn open_fleet(&self, draft: FleetDraft) -> AppResult<()> {
        self.open(MovementDraft::Fleet(draft)).await
    }

    /// Registrar la salida de la portaria
    pub async fn close_access(&self, movement: &AccessMovement, draft: AccessExitDraft) -> AppResult<()> {
        let request = draft.into_request(movement)?;
        self.ledger.register_exit(movement.id, &request).await?;
        info!("🚪 Saída registrada para acesso {}", movement.id);
        Ok(())
    }

    /// Registrar el retorno de un viaje
    pub async fn close_fleet(&self, movement: &FleetMovement, draft: FleetReturnDraft) -> AppResult<()> {
        let request = draft.into_request(movement)?;
        self.ledger.register_return(movement.id, &request).await?;
        info!(
            "🏁 Retorno registrado para viagem {}: {} km rodados",
            movement.id,
            (request.km_saida - movement.departure_odometer).round_dp(2)
        );
        Ok(())
    }

    /// Personas y vehículos todavía en el pátio
    pub async fn list_patio(&self) -> AppResult<Vec<AccessMovement>> {
        self.ledger.list_access(&MovementQuery::patio()).await
    }

    /// Viajes de flota en curso
    pub async fn list_fleet_out(&self) -> AppResult<Vec<FleetMovement>> {
        self.ledger.list_fleet(&MovementQuery::fleet_out()).await
    }

    /// Corrección completa de un acceso (solo admin).
    ///
    /// Los horarios ausentes en la corrección conservan el valor registrado.
    pub async fn correct_access(&self, movement: &AccessMovement, correction: AccessCorrection) -> AppResult<()> {
        self.authorization.require_admin("correct movement").await?;
        check_optional_odometer("entry odometer", correction.km_entrada)?;
        check_optional_odometer("exit odometer", correction.km_saida)?;
        let entered = correction.data_hora_entrada.unwrap_or(movement.entered_at);
        let exited = correction
            .data_hora_saida
            .or_else(|| movement.exit().and_then(|e| e.at));
        check_time_order("exit time", "must not precede entry time", entered, exited)?;

        self.ledger.correct_access(movement.id, &correction).await?;
        info!("✏️ Acesso {} corrigido", movement.id);
        Ok(())
    }

    /// Corrección completa de un viaje (solo admin)
    pub async fn correct_fleet(&self, movement: &FleetMovement, correction: FleetCorrection) -> AppResult<()> {
        self.authorization.require_admin("correct movement").await?;
        check_optional_odometer("departure odometer", Some(correction.km_entrada))?;
        if let Some(arrival) = correction.km_saida {
            ensure_arrival_exceeds(correction.km_entrada, arrival)?;
        }
        let departed = correction.data_hora_entrada.unwrap_or(movement.departed_at);
        let arrived = correction
            .data_hora_saida
            .or_else(|| movement.arrival().and_then(|a| a.at));
        check_time_order("arrival time", "must not precede departure time", departed, arrived)?;

        self.ledger.correct_fleet(movement.id, &correction).await?;
        info!("✏️ Viagem {} corrigida", movement.id);
        Ok(())
    }

    /// Primer paso de la exclusión: comprueba el rol y devuelve el aviso.
    /// No llama al backend.
    pub async fn request_deletion(&self, target: MovementRef) -> AppResult<PendingDeletion> {
        self.authorization.require_admin("delete movement").await?;
        Ok(PendingDeletion { target })
    }

    /// Segundo paso: exclusión definitiva
    pub async fn confirm_deletion(&self, pending: PendingDeletion) -> AppResult<()> {
        self.authorization.require_admin("delete movement").await?;
        let target = pending.target();
        match target.kind {
            MovementKind::Access => self.ledger.delete_access(target.id).await?,
            MovementKind::Fleet => self.ledger.delete_fleet(target.id).await?,
        }
        warn!("🗑️ Movimentação {} #{} excluída", target.kind.path(), target.id);
        Ok(())
    }
}

fn check_optional_odometer(field: &str, value: Option<rust_decimal::Decimal>) -> AppResult<()> {
    if let Some(km) = value {
        validate_non_negative(km).map_err(|_| validation_error(field, "must not be negative"))?;
    }
    Ok(())
}

fn check_time_order(
    field: &str,
    reason: &str,
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
) -> AppResult<()> {
    match end {
        Some(end) if end < start => Err(validation_error(field, reason)),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    use crate::ledger::memory::InMemoryLedger;
    use crate::models::movement::{FleetReturn, FleetState};
    use crate::models::auth::{SessionUser, UserRole};
    use crate::state::{empty_session, Session};
    use crate::utils::errors::AppError;

    async fn service_as(role: Option<UserRole>) -> (MovementService, Arc<InMemoryLedger>) {
        let ledger = Arc::new(InMemoryLedger::new());
        let session = empty_session();
        if let Some(role) = role {
            *session.write().await = Some(Session {
                token: "t".to_string(),
                user: SessionUser {
                    id: 1,
                    nome: "Carla".to_string(),
                    email: "carla@empresa.com".to_string(),
                    tipo_de_usuario: role,
                },
            });
        }
        let service = MovementService::new(
            ledger.clone(),
            ledger.clone(),
            AuthorizationService::new(session),
        );
        (service, ledger)
    }

    #[tokio::test]
    async fn test_incomplete_access_draft_never_reaches_backend() {
        let (service, ledger) = service_as(Some(UserRole::Operador)).await;
        let person = ledger.seed_person("Ana Silva", "12345678900", 2).await;

        let result = service
            .open_access(AccessDraft {
                person: Some(person),
                ..AccessDraft::default()
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
        assert_eq!(ledger.request_count(), 0);
    }

    #[tokio::test]
    async fn test_open_fleet_rechecks_owned_flag() {
        let (service, ledger) = service_as(Some(UserRole::Operador)).await;
        let driver = ledger.seed_person("Bruno", "999", 1).await;
        let mut vehicle = ledger.seed_vehicle("ABC1D23", "Strada", false).await;
        let city = ledger.seed_city("Campinas", "SP").await;
        let post = ledger.seed_post("Portão 1").await;

        // Formulario con un indicador desactualizado
        vehicle.veiculo_de_frota_propria = true;
        let result = service
            .open_fleet(FleetDraft {
                driver: Some(driver),
                vehicle: Some(vehicle),
                destination_city: Some(city),
                departure_post: Some(post),
                departure_odometer: Some(Decimal::from(1000)),
                ..FleetDraft::default()
            })
            .await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
        assert!(service.list_fleet_out().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_operator_cannot_delete_or_correct() {
        let (service, ledger) = service_as(Some(UserRole::Operador)).await;
        let target = MovementRef {
            kind: MovementKind::Access,
            id: 1,
        };
        assert!(matches!(
            service.request_deletion(target).await,
            Err(AppError::Forbidden(_))
        ));

        let (anonymous, _) = service_as(None).await;
        assert!(matches!(
            anonymous.request_deletion(target).await,
            Err(AppError::Unauthorized(_))
        ));
        assert_eq!(ledger.request_count(), 0);
    }

    #[tokio::test]
    async fn test_deletion_waits_for_confirmation() {
        let (service, ledger) = service_as(Some(UserRole::Admin)).await;
        let person = ledger.seed_person("Ana Silva", "12345678900", 2).await;
        let sector = ledger.seed_sector("RH").await;
        let post = ledger.seed_post("Portão 1").await;
        service
            .open_access(AccessDraft {
                person: Some(person),
                sector: Some(sector),
                entry_post: Some(post),
                ..AccessDraft::default()
            })
            .await
            .unwrap();
        let movement = service.list_patio().await.unwrap().remove(0);

        let pending = service
            .request_deletion(MovementRef {
                kind: MovementKind::Access,
                id: movement.id,
            })
            .await
            .unwrap();
        assert_eq!(pending.warning(), DELETION_WARNING);
        assert_eq!(service.list_patio().await.unwrap().len(), 1);

        service.confirm_deletion(pending).await.unwrap();
        assert!(service.list_patio().await.unwrap().is_empty());
    }

    async fn open_patio_entry(service: &MovementService, ledger: &InMemoryLedger) -> AccessMovement {
        let person = ledger.seed_person("Ana Silva", "12345678900", 2).await;
        let sector = ledger.seed_sector("RH").await;
        let post = ledger.seed_post("Portão 1").await;
        service
            .open_access(AccessDraft {
                person: Some(person),
                sector: Some(sector),
                entry_post: Some(post),
                ..AccessDraft::default()
            })
            .await
            .unwrap();
        service.list_patio().await.unwrap().remove(0)
    }

    async fn open_trip(service: &MovementService, ledger: &InMemoryLedger) -> FleetMovement {
        let driver = ledger.seed_person("Bruno", "999", 1).await;
        let vehicle = ledger.seed_vehicle("ABC1D23", "Strada", true).await;
        let city = ledger.seed_city("Campinas", "SP").await;
        let post = ledger.seed_post("Portão 1").await;
        service
            .open_fleet(FleetDraft {
                driver: Some(driver),
                vehicle: Some(vehicle),
                destination_city: Some(city),
                departure_post: Some(post),
                departure_odometer: Some(Decimal::from(50000)),
                ..FleetDraft::default()
            })
            .await
            .unwrap();
        service.list_fleet_out().await.unwrap().remove(0)
    }

    #[tokio::test]
    async fn test_fleet_correction_keeps_odometer_order() {
        let (service, ledger) = service_as(Some(UserRole::Admin)).await;
        let trip = open_trip(&service, &ledger).await;
        let calls = ledger.request_count();

        let mut correction = FleetCorrection::from(&trip);
        correction.km_saida = Some(Decimal::from(49999));
        match service.correct_fleet(&trip, correction).await {
            Err(AppError::Validation { minimum, .. }) => {
                assert_eq!(minimum, Some(Decimal::from(50000)));
            }
            other => panic!("unexpected: {:?}", other),
        }
        assert_eq!(ledger.request_count(), calls);
    }

    #[tokio::test]
    async fn test_exit_edited_alone_cannot_precede_stored_entry() {
        let (service, ledger) = service_as(Some(UserRole::Admin)).await;
        let movement = open_patio_entry(&service, &ledger).await;
        let calls = ledger.request_count();

        // Solo se edita la salida; la entrada queda la registrada
        let mut correction = AccessCorrection::from(&movement);
        correction.data_hora_saida = Some(movement.entered_at - chrono::Duration::days(1));
        assert!(matches!(
            service.correct_access(&movement, correction).await,
            Err(AppError::Validation { .. })
        ));
        assert_eq!(ledger.request_count(), calls);

        let mut correction = AccessCorrection::from(&movement);
        correction.data_hora_saida = Some(movement.entered_at + chrono::Duration::hours(2));
        service.correct_access(&movement, correction).await.unwrap();
    }

    #[tokio::test]
    async fn test_departure_edited_alone_cannot_follow_stored_arrival() {
        let (service, ledger) = service_as(Some(UserRole::Admin)).await;
        let trip = open_trip(&service, &ledger).await;
        let arrived_at = trip.departed_at + chrono::Duration::hours(3);
        let returned = FleetMovement {
            state: FleetState::Returned(FleetReturn {
                post_id: Some(trip.departure_post_id),
                odometer: Some(Decimal::from(50120)),
                at: Some(arrived_at),
            }),
            ..trip.clone()
        };
        let calls = ledger.request_count();

        let mut correction = FleetCorrection::from(&returned);
        correction.data_hora_entrada = Some(arrived_at + chrono::Duration::minutes(1));
        assert!(matches!(
            service.correct_fleet(&returned, correction).await,
            Err(AppError::Validation { .. })
        ));
        assert_eq!(ledger.request_count(), calls);
    }
}
