//! Servicio de informes
//!
//! Consulta de movimientos por período, nombre y placa, con cabecera de
//! filtros y tabla imprimible. También expone el resumen del panel.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tabled::builder::Builder;
use tabled::settings::object::{Columns, Rows};
use tabled::settings::{Alignment, Style};
use tracing::info;

use crate::dto::MovementQuery;
use crate::ledger::MovementLedger;
use crate::models::dashboard::DashboardSummary;
use crate::models::movement::{AccessMovement, FleetMovement, MovementKind};
use crate::utils::errors::{validation_error, AppResult};
use crate::utils::time::format_short;
use crate::utils::validation::non_empty_text;

/// Filtros del informe; todos opcionales
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportFilters {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub person_name: Option<String>,
    pub plate_prefix: Option<String>,
}

impl ReportFilters {
    /// El período no puede estar invertido
    pub fn validate(&self) -> AppResult<()> {
        if let (Some(from), Some(to)) = (self.date_from, self.date_to) {
            if from > to {
                return Err(validation_error("period", "start date is after end date"));
            }
        }
        Ok(())
    }

    pub fn to_query(&self) -> MovementQuery {
        MovementQuery {
            status: None,
            data_inicio: self.date_from,
            data_fim: self.date_to,
            nome: self.person_name.as_deref().and_then(non_empty_text),
            placa: self
                .plate_prefix
                .as_deref()
                .and_then(non_empty_text)
                .map(|p| p.to_uppercase()),
        }
    }
}

/// Cabecera impresa sobre la tabla
#[derive(Debug, Clone, PartialEq)]
pub struct ReportHeader {
    pub title: String,
    pub period_start: String,
    pub period_end: String,
}

impl ReportHeader {
    fn new(kind: MovementKind, filters: &ReportFilters) -> Self {
        Self {
            title: kind.report_title().to_string(),
            period_start: filters
                .date_from
                .map(|d| d.format("%d/%m/%Y").to_string())
                .unwrap_or_else(|| "Início".to_string()),
            period_end: filters
                .date_to
                .map(|d| d.format("%d/%m/%Y").to_string())
                .unwrap_or_else(|| "Hoje".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReportRows {
    Access(Vec<AccessMovement>),
    Fleet(Vec<FleetMovement>),
}

/// Informe listo para imprimir
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub header: ReportHeader,
    pub rows: ReportRows,
}

impl Report {
    pub fn len(&self) -> usize {
        match &self.rows {
            ReportRows::Access(rows) => rows.len(),
            ReportRows::Fleet(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Texto plano: cabecera + tabla
    pub fn render(&self) -> String {
        let mut builder = Builder::default();
        let numeric_columns = match &self.rows {
            ReportRows::Access(rows) => {
                builder.push_record(["Data", "Pessoa", "Veículo", "Setor", "Posto", "KM Ent.", "KM Saída", "Status"]);
                for m in rows {
                    builder.push_record([
                        format_short(&m.entered_at),
                        m.person_label(),
                        m.vehicle_label().unwrap_or_else(|| "-".to_string()),
                        m.labels.sector_name.clone().unwrap_or_else(|| "-".to_string()),
                        m.labels.entry_post_name.clone().unwrap_or_else(|| "-".to_string()),
                        km(m.entry_odometer),
                        km(m.exit().and_then(|e| e.odometer)),
                        m.status().label().to_string(),
                    ]);
                }
                5..7
            }
            ReportRows::Fleet(rows) => {
                builder.push_record(["Data", "Motorista", "Veículo", "Destino", "KM Saída", "KM Chegada", "Distância"]);
                for m in rows {
                    builder.push_record([
                        format_short(&m.departed_at),
                        m.driver_label(),
                        m.vehicle_label(),
                        m.destination_label(),
                        km(Some(m.departure_odometer)),
                        km(m.arrival().and_then(|a| a.odometer)),
                        m.distance()
                            .map(|d| format!("{} km", d))
                            .unwrap_or_else(|| m.status().label().to_string()),
                    ]);
                }
                4..7
            }
        };

        let mut table = builder.build();
        table.with(Style::modern());
        table.modify(Columns::new(numeric_columns), Alignment::right());
        table.modify(Rows::first(), Alignment::center());

        format!(
            "{}\nPeríodo: {} a {}\nRegistros: {}\n{}",
            self.header.title,
            self.header.period_start,
            self.header.period_end,
            self.len(),
            table
        )
    }
}

fn km(value: Option<Decimal>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

pub struct ReportService {
    ledger: Arc<dyn MovementLedger>,
}

impl ReportService {
    pub fn new(ledger: Arc<dyn MovementLedger>) -> Self {
        Self { ledger }
    }

    /// Consultar movimientos con filtros
    pub async fn list_movements(&self, kind: MovementKind, filters: &ReportFilters) -> AppResult<Report> {
        filters.validate()?;
        let query = filters.to_query();
        let rows = match kind {
            MovementKind::Access => ReportRows::Access(self.ledger.list_access(&query).await?),
            MovementKind::Fleet => ReportRows::Fleet(self.ledger.list_fleet(&query).await?),
        };
        let report = Report {
            header: ReportHeader::new(kind, filters),
            rows,
        };
        info!("📊 Relatório '{}': {} registros", report.header.title, report.len());
        Ok(report)
    }

    /// Resumen del panel
    pub async fn summary(&self) -> AppResult<DashboardSummary> {
        self.ledger.dashboard_summary().await
    }
}
