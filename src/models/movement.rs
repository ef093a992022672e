//! Modelo de Movimentação
//!
//! Registros de dos fases: acceso (entrada/saída de visitantes) y flota
//! (salida/retorno de vehículos propios). El estado no se infiere en cada
//! lectura: el registro del backend se convierte una sola vez en un enum cuyo
//! variante cerrada transporta los datos de cierre.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{deserialize_decimal, deserialize_optional_decimal, EntityId};

/// Precisión canónica de la distancia recorrida (km)
pub const DISTANCE_DECIMALS: u32 = 2;

/// Tipo de movimiento
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MovementKind {
    Access,
    Fleet,
}

impl MovementKind {
    /// Segmento de ruta bajo `/movimentacoes`
    pub fn path(&self) -> &'static str {
        match self {
            MovementKind::Access => "acessos",
            MovementKind::Fleet => "frota",
        }
    }

    /// Título usado en los informes
    pub fn report_title(&self) -> &'static str {
        match self {
            MovementKind::Access => "Movimentação de Acessos",
            MovementKind::Fleet => "Movimentação de Frota",
        }
    }
}

/// Referencia a un movimiento concreto
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MovementRef {
    pub kind: MovementKind,
    pub id: EntityId,
}

// ---------------------------------------------------------------------------
// Acessos
// ---------------------------------------------------------------------------

/// Registro de acceso tal como viaja por la red
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessMovementRecord {
    pub id: EntityId,
    pub id_pessoa: EntityId,
    #[serde(default)]
    pub id_veiculo: Option<EntityId>,
    pub id_setor_visitado: EntityId,
    pub id_posto_controle_entrada: EntityId,
    #[serde(default)]
    pub id_posto_controle_saida: Option<EntityId>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub km_entrada: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub km_saida: Option<Decimal>,
    pub data_hora_entrada: DateTime<Utc>,
    #[serde(default)]
    pub data_hora_saida: Option<DateTime<Utc>>,
    #[serde(default)]
    pub motivo_da_visita: Option<String>,
    #[serde(default)]
    pub observacao: Option<String>,
    #[serde(default)]
    pub pessoa_nome: Option<String>,
    #[serde(default)]
    pub veiculo_placa: Option<String>,
    #[serde(default)]
    pub veiculo_modelo: Option<String>,
    #[serde(default)]
    pub setor_nome: Option<String>,
    #[serde(default)]
    pub posto_entrada_nome: Option<String>,
}

/// Datos registrados en la salida
#[derive(Debug, Clone, PartialEq)]
pub struct AccessExit {
    pub post_id: Option<EntityId>,
    pub odometer: Option<Decimal>,
    pub at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AccessState {
    /// "No pátio"
    Open,
    Closed(AccessExit),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessStatus {
    Open,
    Closed,
}

impl AccessStatus {
    pub fn label(&self) -> &'static str {
        match self {
            AccessStatus::Open => "PATIO",
            AccessStatus::Closed => "SAIU",
        }
    }
}

/// Etiquetas desnormalizadas para mostrar
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccessLabels {
    pub person_name: Option<String>,
    pub vehicle_plate: Option<String>,
    pub vehicle_model: Option<String>,
    pub sector_name: Option<String>,
    pub entry_post_name: Option<String>,
}

/// Movimiento de acceso
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "AccessMovementRecord")]
pub struct AccessMovement {
    pub id: EntityId,
    pub person_id: EntityId,
    pub vehicle_id: Option<EntityId>,
    pub sector_id: EntityId,
    pub entry_post_id: EntityId,
    pub entry_odometer: Option<Decimal>,
    pub entered_at: DateTime<Utc>,
    pub reason: Option<String>,
    pub note: Option<String>,
    pub state: AccessState,
    pub labels: AccessLabels,
}

impl From<AccessMovementRecord> for AccessMovement {
    fn from(record: AccessMovementRecord) -> Self {
        let closed = record.data_hora_saida.is_some() || record.id_posto_controle_saida.is_some();
        let state = if closed {
            AccessState::Closed(AccessExit {
                post_id: record.id_posto_controle_saida,
                odometer: record.km_saida,
                at: record.data_hora_saida,
            })
        } else {
            AccessState::Open
        };

        Self {
            id: record.id,
            person_id: record.id_pessoa,
            vehicle_id: record.id_veiculo,
            sector_id: record.id_setor_visitado,
            entry_post_id: record.id_posto_controle_entrada,
            entry_odometer: record.km_entrada,
            entered_at: record.data_hora_entrada,
            reason: record.motivo_da_visita,
            note: record.observacao,
            state,
            labels: AccessLabels {
                person_name: record.pessoa_nome,
                vehicle_plate: record.veiculo_placa,
                vehicle_model: record.veiculo_modelo,
                sector_name: record.setor_nome,
                entry_post_name: record.posto_entrada_nome,
            },
        }
    }
}

impl AccessMovement {
    pub fn status(&self) -> AccessStatus {
        match self.state {
            AccessState::Open => AccessStatus::Open,
            AccessState::Closed(_) => AccessStatus::Closed,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, AccessState::Open)
    }

    pub fn exit(&self) -> Option<&AccessExit> {
        match &self.state {
            AccessState::Open => None,
            AccessState::Closed(exit) => Some(exit),
        }
    }

    /// Tiempo en el pátio, si la salida ya fue registrada
    pub fn duration(&self) -> Option<Duration> {
        self.exit()
            .and_then(|exit| exit.at)
            .map(|at| at - self.entered_at)
    }

    pub fn person_label(&self) -> String {
        self.labels
            .person_name
            .clone()
            .unwrap_or_else(|| format!("#{}", self.person_id))
    }

    pub fn vehicle_label(&self) -> Option<String> {
        let plate = self.labels.vehicle_plate.as_ref()?.to_uppercase();
        Some(match &self.labels.vehicle_model {
            Some(model) => format!("{} ({})", model, plate),
            None => plate,
        })
    }
}

// ---------------------------------------------------------------------------
// Frota
// ---------------------------------------------------------------------------

/// Registro de viaje de flota tal como viaja por la red.
///
/// Los nombres vienen del backend: `km_entrada`/`id_posto_controle_entrada`
/// son la salida del vehículo y `km_saida`/`id_posto_controle_saida` su regreso.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetMovementRecord {
    pub id: EntityId,
    pub id_pessoa: EntityId,
    pub id_veiculo: EntityId,
    pub id_cidade_de_destino: EntityId,
    pub id_posto_controle_entrada: EntityId,
    #[serde(default)]
    pub id_posto_controle_saida: Option<EntityId>,
    #[serde(deserialize_with = "deserialize_decimal")]
    pub km_entrada: Decimal,
    #[serde(default, deserialize_with = "deserialize_optional_decimal")]
    pub km_saida: Option<Decimal>,
    pub data_hora_entrada: DateTime<Utc>,
    #[serde(default)]
    pub data_hora_saida: Option<DateTime<Utc>>,
    #[serde(default)]
    pub motivo_saida: Option<String>,
    #[serde(default)]
    pub observacao: Option<String>,
    #[serde(default)]
    pub motorista_nome: Option<String>,
    #[serde(default)]
    pub placa: Option<String>,
    #[serde(default)]
    pub modelo: Option<String>,
    #[serde(default)]
    pub cidade_destino: Option<String>,
    #[serde(default)]
    pub cidade_uf: Option<String>,
}

/// Datos registrados en el retorno
#[derive(Debug, Clone, PartialEq)]
pub struct FleetReturn {
    pub post_id: Option<EntityId>,
    pub odometer: Option<Decimal>,
    pub at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FleetState {
    Out,
    Returned(FleetReturn),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FleetStatus {
    Out,
    Returned,
}

impl FleetStatus {
    pub fn label(&self) -> &'static str {
        match self {
            FleetStatus::Out => "EM VIAGEM",
            FleetStatus::Returned => "RETORNOU",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FleetLabels {
    pub driver_name: Option<String>,
    pub vehicle_plate: Option<String>,
    pub vehicle_model: Option<String>,
    pub destination_city: Option<String>,
    pub destination_uf: Option<String>,
}

/// Viaje de un vehículo de la flota propia
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "FleetMovementRecord")]
pub struct FleetMovement {
    pub id: EntityId,
    pub driver_id: EntityId,
    pub vehicle_id: EntityId,
    pub destination_city_id: EntityId,
    pub departure_post_id: EntityId,
    pub departure_odometer: Decimal,
    pub departed_at: DateTime<Utc>,
    pub reason: Option<String>,
    pub note: Option<String>,
    pub state: FleetState,
    pub labels: FleetLabels,
}

impl From<FleetMovementRecord> for FleetMovement {
    fn from(record: FleetMovementRecord) -> Self {
        let returned = record.km_saida.is_some()
            || record.id_posto_controle_saida.is_some()
            || record.data_hora_saida.is_some();
        let state = if returned {
            FleetState::Returned(FleetReturn {
                post_id: record.id_posto_controle_saida,
                odometer: record.km_saida,
                at: record.data_hora_saida,
            })
        } else {
            FleetState::Out
        };

        Self {
            id: record.id,
            driver_id: record.id_pessoa,
            vehicle_id: record.id_veiculo,
            destination_city_id: record.id_cidade_de_destino,
            departure_post_id: record.id_posto_controle_entrada,
            departure_odometer: record.km_entrada,
            departed_at: record.data_hora_entrada,
            reason: record.motivo_saida,
            note: record.observacao,
            state,
            labels: FleetLabels {
                driver_name: record.motorista_nome,
                vehicle_plate: record.placa,
                vehicle_model: record.modelo,
                destination_city: record.cidade_destino,
                destination_uf: record.cidade_uf,
            },
        }
    }
}

impl FleetMovement {
    pub fn status(&self) -> FleetStatus {
        match self.state {
            FleetState::Out => FleetStatus::Out,
            FleetState::Returned(_) => FleetStatus::Returned,
        }
    }

    pub fn is_out(&self) -> bool {
        matches!(self.state, FleetState::Out)
    }

    pub fn arrival(&self) -> Option<&FleetReturn> {
        match &self.state {
            FleetState::Out => None,
            FleetState::Returned(arrival) => Some(arrival),
        }
    }

    /// Distancia recorrida, calculada en lectura y nunca almacenada
    pub fn distance(&self) -> Option<Decimal> {
        self.arrival()
            .and_then(|arrival| arrival.odometer)
            .map(|km| (km - self.departure_odometer).round_dp(DISTANCE_DECIMALS))
    }

    pub fn duration(&self) -> Option<Duration> {
        self.arrival()
            .and_then(|arrival| arrival.at)
            .map(|at| at - self.departed_at)
    }

    pub fn driver_label(&self) -> String {
        self.labels
            .driver_name
            .clone()
            .unwrap_or_else(|| format!("#{}", self.driver_id))
    }

    pub fn vehicle_label(&self) -> String {
        let plate = self
            .labels
            .vehicle_plate
            .as_ref()
            .map(|p| p.to_uppercase())
            .unwrap_or_else(|| format!("#{}", self.vehicle_id));
        match &self.labels.vehicle_model {
            Some(model) => format!("{} ({})", model, plate),
            None => plate,
        }
    }

    pub fn destination_label(&self) -> String {
        match (&self.labels.destination_city, &self.labels.destination_uf) {
            (Some(city), Some(uf)) => format!("{} - {}", city, uf),
            (Some(city), None) => city.clone(),
            _ => format!("#{}", self.destination_city_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    const OPEN_ACCESS: &str = r#"{
        "id": 10, "id_pessoa": 1, "id_veiculo": null, "id_setor_visitado": 3,
        "id_posto_controle_entrada": 1, "id_posto_controle_saida": null,
        "km_entrada": "", "km_saida": null,
        "data_hora_entrada": "2024-05-10T12:00:00Z", "data_hora_saida": null,
        "motivo_da_visita": "Reunião", "observacao": "",
        "pessoa_nome": "Ana Silva", "setor_nome": "RH", "posto_entrada_nome": "Portão 1",
        "status": "patio"
    }"#;

    #[test]
    fn test_open_access_record() {
        let movement: AccessMovement = serde_json::from_str(OPEN_ACCESS).unwrap();
        assert!(movement.is_open());
        assert_eq!(movement.status(), AccessStatus::Open);
        assert_eq!(movement.entry_odometer, None);
        assert_eq!(movement.duration(), None);
        assert_eq!(movement.person_label(), "Ana Silva");
        assert_eq!(movement.vehicle_label(), None);
    }

    #[test]
    fn test_closed_access_record() {
        let body = OPEN_ACCESS
            .replace(r#""id_posto_controle_saida": null"#, r#""id_posto_controle_saida": 2"#)
            .replace(
                r#""data_hora_saida": null"#,
                r#""data_hora_saida": "2024-05-10T13:30:00Z""#,
            );
        let movement: AccessMovement = serde_json::from_str(&body).unwrap();
        assert_eq!(movement.status(), AccessStatus::Closed);
        assert_eq!(movement.exit().and_then(|e| e.post_id), Some(2));
        assert_eq!(movement.duration(), Some(Duration::minutes(90)));
    }

    fn fleet_json(km_saida: &str) -> String {
        format!(
            r#"{{
                "id": 5, "id_pessoa": 2, "id_veiculo": 9, "id_cidade_de_destino": 4,
                "id_posto_controle_entrada": 1, "id_posto_controle_saida": null,
                "km_entrada": "50000.00", "km_saida": {},
                "data_hora_entrada": "2024-05-10T08:00:00Z", "data_hora_saida": null,
                "motivo_saida": "Entrega", "motorista_nome": "Bruno", "placa": "abc1d23",
                "modelo": "Strada", "cidade_destino": "Campinas", "cidade_uf": "SP"
            }}"#,
            km_saida
        )
    }

    #[test]
    fn test_fleet_out_has_no_distance() {
        let movement: FleetMovement = serde_json::from_str(&fleet_json("null")).unwrap();
        assert!(movement.is_out());
        assert_eq!(movement.distance(), None);
        assert_eq!(movement.vehicle_label(), "Strada (ABC1D23)");
        assert_eq!(movement.destination_label(), "Campinas - SP");
    }

    #[test]
    fn test_fleet_distance_uses_canonical_precision() {
        let movement: FleetMovement = serde_json::from_str(&fleet_json("\"50120.456\"")).unwrap();
        assert_eq!(movement.status(), FleetStatus::Returned);
        assert_eq!(movement.distance(), Some(Decimal::from_str("120.46").unwrap()));

        let whole: FleetMovement = serde_json::from_str(&fleet_json("50120")).unwrap();
        assert_eq!(whole.distance(), Some(Decimal::from(120)));
    }

    #[test]
    fn test_kind_paths() {
        assert_eq!(MovementKind::Access.path(), "acessos");
        assert_eq!(MovementKind::Fleet.path(), "frota");
        assert_eq!(MovementKind::Fleet.report_title(), "Movimentação de Frota");
    }
}
