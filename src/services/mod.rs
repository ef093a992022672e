//! Services module
//!
//! Este módulo contiene la lógica de negocio del cliente de portaria.
//! Los servicios validan localmente, comprueban el rol de la sesión y
//! delegan en las fronteras de `ledger`.

pub mod auth_service;
pub mod authorization_service;
pub mod movement_service;
pub mod reference_service;
pub mod report_service;
pub mod user_service;

pub use auth_service::AuthService;
pub use authorization_service::AuthorizationService;
pub use movement_service::{MovementService, PendingDeletion, DELETION_WARNING};
pub use reference_service::{AccessCatalogs, FleetCatalogs, ReferenceService};
pub use report_service::{Report, ReportFilters, ReportHeader, ReportRows, ReportService};
pub use user_service::UserService;
