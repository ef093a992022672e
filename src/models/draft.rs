//! Borradores de movimentación
//!
//! Estado de formulario tipado: cada borrador contiene referencias ya
//! resueltas (no texto libre) y se convierte en la petición de red solo si
//! pasa la validación local.

use rust_decimal::Decimal;

use super::movement::{AccessMovement, FleetMovement};
use super::person::Person;
use super::reference::{City, ControlPost, Sector};
use super::vehicle::Vehicle;
use crate::dto::{AccessEntryRequest, AccessExitRequest, FleetDepartureRequest, FleetReturnRequest};
use crate::utils::errors::{odometer_order_error, validation_error, AppError, AppResult};
use crate::utils::validation::{non_empty_text, validate_non_negative};

/// Borrador de apertura de cualquiera de los dos tipos
#[derive(Debug, Clone)]
pub enum MovementDraft {
    Access(AccessDraft),
    Fleet(FleetDraft),
}

/// Petición de apertura validada
#[derive(Debug, Clone, PartialEq)]
pub enum OpenRequest {
    Access(AccessEntryRequest),
    Fleet(FleetDepartureRequest),
}

impl MovementDraft {
    pub fn validate(self) -> AppResult<OpenRequest> {
        match self {
            MovementDraft::Access(draft) => draft.into_request().map(OpenRequest::Access),
            MovementDraft::Fleet(draft) => draft.into_request().map(OpenRequest::Fleet),
        }
    }
}

/// Formulario de entrada en la portaria
#[derive(Debug, Clone, Default)]
pub struct AccessDraft {
    pub person: Option<Person>,
    pub vehicle: Option<Vehicle>,
    pub sector: Option<Sector>,
    pub entry_post: Option<ControlPost>,
    pub entry_odometer: Option<Decimal>,
    pub reason: String,
    pub note: String,
}

impl AccessDraft {
    pub fn into_request(self) -> AppResult<AccessEntryRequest> {
        let mut missing = Vec::new();
        if self.person.is_none() {
            missing.push("person");
        }
        if self.sector.is_none() {
            missing.push("sector");
        }
        if self.entry_post.is_none() {
            missing.push("entry post");
        }

        match (self.person, self.sector, self.entry_post) {
            (Some(person), Some(sector), Some(post)) => {
                check_odometer("entry odometer", self.entry_odometer)?;
                Ok(AccessEntryRequest {
                    id_pessoa: person.id,
                    id_veiculo: self.vehicle.map(|v| v.id),
                    id_setor_visitado: sector.id,
                    id_posto_controle_entrada: post.id,
                    km_entrada: self.entry_odometer,
                    motivo_da_visita: non_empty_text(&self.reason),
                    observacao: non_empty_text(&self.note),
                })
            }
            _ => Err(missing_fields(&missing)),
        }
    }
}

/// Formulario de salida de un vehículo de la flota
#[derive(Debug, Clone, Default)]
pub struct FleetDraft {
    pub driver: Option<Person>,
    pub vehicle: Option<Vehicle>,
    pub destination_city: Option<City>,
    pub departure_post: Option<ControlPost>,
    pub departure_odometer: Option<Decimal>,
    pub reason: String,
    pub note: String,
}

impl FleetDraft {
    pub fn into_request(self) -> AppResult<FleetDepartureRequest> {
        let mut missing = Vec::new();
        if self.driver.is_none() {
            missing.push("driver");
        }
        if self.vehicle.is_none() {
            missing.push("vehicle");
        }
        if self.destination_city.is_none() {
            missing.push("destination city");
        }
        if self.departure_post.is_none() {
            missing.push("departure post");
        }
        if self.departure_odometer.is_none() {
            missing.push("departure odometer");
        }

        match (
            self.driver,
            self.vehicle,
            self.destination_city,
            self.departure_post,
            self.departure_odometer,
        ) {
            (Some(driver), Some(vehicle), Some(city), Some(post), Some(km)) => {
                if !vehicle.is_owned_fleet() {
                    return Err(validation_error(
                        "vehicle",
                        "only owned-fleet vehicles can start a trip",
                    ));
                }
                check_odometer("departure odometer", Some(km))?;
                Ok(FleetDepartureRequest {
                    id_pessoa: driver.id,
                    id_veiculo: vehicle.id,
                    id_posto_controle_entrada: post.id,
                    km_entrada: km,
                    id_cidade_de_destino: city.id,
                    motivo_saida: non_empty_text(&self.reason),
                    observacao: non_empty_text(&self.note),
                })
            }
            _ => Err(missing_fields(&missing)),
        }
    }
}

/// Formulario de salida de la portaria
#[derive(Debug, Clone, Default)]
pub struct AccessExitDraft {
    pub exit_post: Option<ControlPost>,
    pub exit_odometer: Option<Decimal>,
    pub note: String,
}

impl AccessExitDraft {
    /// Validar el cierre contra el registro que se tiene en memoria
    pub fn into_request(self, movement: &AccessMovement) -> AppResult<AccessExitRequest> {
        if !movement.is_open() {
            return Err(validation_error("movement", "exit already registered"));
        }
        let post = self
            .exit_post
            .ok_or_else(|| missing_fields(&["exit post"]))?;
        check_odometer("exit odometer", self.exit_odometer)?;
        Ok(AccessExitRequest {
            id_posto_controle_saida: post.id,
            km_saida: self.exit_odometer,
            observacao: non_empty_text(&self.note),
        })
    }
}

/// Formulario de retorno de un viaje
#[derive(Debug, Clone, Default)]
pub struct FleetReturnDraft {
    pub arrival_post: Option<ControlPost>,
    pub arrival_odometer: Option<Decimal>,
    pub note: String,
}

impl FleetReturnDraft {
    /// Validar el retorno; la lectura de llegada debe superar la de salida
    pub fn into_request(self, movement: &FleetMovement) -> AppResult<FleetReturnRequest> {
        if !movement.is_out() {
            return Err(validation_error("movement", "return already registered"));
        }

        let mut missing = Vec::new();
        if self.arrival_post.is_none() {
            missing.push("arrival post");
        }
        if self.arrival_odometer.is_none() {
            missing.push("arrival odometer");
        }

        match (self.arrival_post, self.arrival_odometer) {
            (Some(post), Some(km)) => {
                ensure_arrival_exceeds(movement.departure_odometer, km)?;
                Ok(FleetReturnRequest {
                    id_posto_controle_saida: post.id,
                    km_saida: km,
                    observacao: non_empty_text(&self.note),
                })
            }
            _ => Err(missing_fields(&missing)),
        }
    }
}

/// Invariante de flota: llegada estrictamente mayor que salida
pub fn ensure_arrival_exceeds(departure: Decimal, arrival: Decimal) -> AppResult<()> {
    if arrival <= departure {
        return Err(odometer_order_error(departure));
    }
    Ok(())
}

fn check_odometer(field: &str, value: Option<Decimal>) -> AppResult<()> {
    if let Some(km) = value {
        validate_non_negative(km).map_err(|_| validation_error(field, "must not be negative"))?;
    }
    Ok(())
}

fn missing_fields(fields: &[&str]) -> AppError {
    AppError::Validation {
        reason: format!("missing required fields: {}", fields.join(", ")),
        minimum: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::models::movement::{FleetLabels, FleetState};

    fn person() -> Person {
        Person {
            id: 1,
            nome: "Ana Silva".to_string(),
            documento: "12345678900".to_string(),
            telefone: None,
            tipo_pessoa_id: 2,
            tipo_descricao: None,
        }
    }

    fn post(id: i64) -> ControlPost {
        ControlPost { id, nome: format!("Portão {}", id) }
    }

    fn fleet_vehicle(owned: bool) -> Vehicle {
        Vehicle {
            id: 9,
            placa: "ABC1D23".to_string(),
            modelo: Some("Strada".to_string()),
            cor: None,
            veiculo_de_frota_propria: owned,
        }
    }

    fn trip(departure: i64) -> FleetMovement {
        FleetMovement {
            id: 5,
            driver_id: 1,
            vehicle_id: 9,
            destination_city_id: 4,
            departure_post_id: 1,
            departure_odometer: Decimal::from(departure),
            departed_at: Utc::now(),
            reason: None,
            note: None,
            state: FleetState::Out,
            labels: FleetLabels::default(),
        }
    }

    #[test]
    fn test_access_draft_lists_missing_references() {
        let draft = AccessDraft {
            person: Some(person()),
            ..AccessDraft::default()
        };
        match draft.into_request() {
            Err(AppError::Validation { reason, .. }) => {
                assert_eq!(reason, "missing required fields: sector, entry post");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_access_draft_without_vehicle_is_valid() {
        let draft = AccessDraft {
            person: Some(person()),
            sector: Some(Sector { id: 3, nome: "RH".to_string() }),
            entry_post: Some(post(1)),
            reason: "  ".to_string(),
            ..AccessDraft::default()
        };
        let request = draft.into_request().unwrap();
        assert_eq!(request.id_veiculo, None);
        assert_eq!(request.motivo_da_visita, None);
    }

    #[test]
    fn test_fleet_draft_rejects_visitor_vehicle() {
        let draft = FleetDraft {
            driver: Some(person()),
            vehicle: Some(fleet_vehicle(false)),
            destination_city: Some(City { id: 4, nome: "Campinas".to_string(), uf: None }),
            departure_post: Some(post(1)),
            departure_odometer: Some(Decimal::from(50000)),
            ..FleetDraft::default()
        };
        assert!(matches!(
            MovementDraft::Fleet(draft).validate(),
            Err(AppError::Validation { .. })
        ));
    }

    #[test]
    fn test_return_must_exceed_departure() {
        let movement = trip(50000);
        let draft = FleetReturnDraft {
            arrival_post: Some(post(2)),
            arrival_odometer: Some(Decimal::from(50000)),
            note: String::new(),
        };
        match draft.into_request(&movement) {
            Err(AppError::Validation { minimum, .. }) => {
                assert_eq!(minimum, Some(Decimal::from(50000)));
            }
            other => panic!("unexpected: {:?}", other),
        }

        let ok = FleetReturnDraft {
            arrival_post: Some(post(2)),
            arrival_odometer: Some(Decimal::from(50001)),
            note: String::new(),
        };
        assert_eq!(ok.into_request(&movement).unwrap().km_saida, Decimal::from(50001));
    }
}
