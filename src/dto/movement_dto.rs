use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::movement::{AccessMovement, FleetMovement};
use crate::models::EntityId;

// Request de entrada (`POST /movimentacoes/acessos/entrada`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessEntryRequest {
    pub id_pessoa: EntityId,
    pub id_veiculo: Option<EntityId>,
    pub id_setor_visitado: EntityId,
    pub id_posto_controle_entrada: EntityId,
    pub km_entrada: Option<Decimal>,
    pub motivo_da_visita: Option<String>,
    pub observacao: Option<String>,
}

// Request de salida (`PUT /movimentacoes/acessos/saida/{id}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessExitRequest {
    pub id_posto_controle_saida: EntityId,
    pub km_saida: Option<Decimal>,
    pub observacao: Option<String>,
}

// Request de salida de flota (`POST /movimentacoes/frota/saida`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetDepartureRequest {
    pub id_pessoa: EntityId,
    pub id_veiculo: EntityId,
    pub id_posto_controle_entrada: EntityId,
    pub km_entrada: Decimal,
    pub id_cidade_de_destino: EntityId,
    pub motivo_saida: Option<String>,
    pub observacao: Option<String>,
}

// Request de retorno (`PUT /movimentacoes/frota/retorno/{id}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetReturnRequest {
    pub id_posto_controle_saida: EntityId,
    pub km_saida: Decimal,
    pub observacao: Option<String>,
}

// Corrección completa de un acceso (`PUT /movimentacoes/acessos/{id}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessCorrection {
    pub id_pessoa: EntityId,
    pub id_veiculo: Option<EntityId>,
    pub id_setor_visitado: EntityId,
    pub id_posto_controle_entrada: EntityId,
    pub id_posto_controle_saida: Option<EntityId>,
    pub km_entrada: Option<Decimal>,
    pub km_saida: Option<Decimal>,
    pub motivo_da_visita: Option<String>,
    pub observacao: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_hora_entrada: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_hora_saida: Option<DateTime<Utc>>,
}

impl From<&AccessMovement> for AccessCorrection {
    fn from(movement: &AccessMovement) -> Self {
        let exit = movement.exit();
        Self {
            id_pessoa: movement.person_id,
            id_veiculo: movement.vehicle_id,
            id_setor_visitado: movement.sector_id,
            id_posto_controle_entrada: movement.entry_post_id,
            id_posto_controle_saida: exit.and_then(|e| e.post_id),
            km_entrada: movement.entry_odometer,
            km_saida: exit.and_then(|e| e.odometer),
            motivo_da_visita: movement.reason.clone(),
            observacao: movement.note.clone(),
            data_hora_entrada: None,
            data_hora_saida: None,
        }
    }
}

// Corrección completa de un viaje (`PUT /movimentacoes/frota/{id}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FleetCorrection {
    pub id_pessoa: EntityId,
    pub id_veiculo: EntityId,
    pub id_cidade_de_destino: EntityId,
    pub id_posto_controle_entrada: EntityId,
    pub id_posto_controle_saida: Option<EntityId>,
    pub km_entrada: Decimal,
    pub km_saida: Option<Decimal>,
    pub motivo_saida: Option<String>,
    pub observacao: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_hora_entrada: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_hora_saida: Option<DateTime<Utc>>,
}

impl From<&FleetMovement> for FleetCorrection {
    fn from(movement: &FleetMovement) -> Self {
        let arrival = movement.arrival();
        Self {
            id_pessoa: movement.driver_id,
            id_veiculo: movement.vehicle_id,
            id_cidade_de_destino: movement.destination_city_id,
            id_posto_controle_entrada: movement.departure_post_id,
            id_posto_controle_saida: arrival.and_then(|a| a.post_id),
            km_entrada: movement.departure_odometer,
            km_saida: arrival.and_then(|a| a.odometer),
            motivo_saida: movement.reason.clone(),
            observacao: movement.note.clone(),
            data_hora_entrada: None,
            data_hora_saida: None,
        }
    }
}

/// Filtro de estado que entiende el backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusFilter {
    /// Accesos abiertos
    #[serde(rename = "patio")]
    Patio,
    /// Viajes en curso
    #[serde(rename = "saiu")]
    Saiu,
}

/// Query string de `GET /movimentacoes/{acessos|frota}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovementQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<StatusFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_inicio: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_fim: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nome: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placa: Option<String>,
}

impl MovementQuery {
    /// Personas todavía en el pátio
    pub fn patio() -> Self {
        Self {
            status: Some(StatusFilter::Patio),
            ..Self::default()
        }
    }

    /// Viajes de flota en curso
    pub fn fleet_out() -> Self {
        Self {
            status: Some(StatusFilter::Saiu),
            ..Self::default()
        }
    }
}
