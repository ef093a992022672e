//! Fronteras con el backend
//!
//! El backend REST es dueño de la persistencia y de la autorización. El
//! cliente lo ve como tres almacenes asíncronos; `clients::PortariaClient`
//! los implementa sobre HTTP y `memory::InMemoryLedger` en memoria.

pub mod memory;

use async_trait::async_trait;

use crate::dto::{
    AccessCorrection, AccessEntryRequest, AccessExitRequest, FleetCorrection,
    FleetDepartureRequest, FleetReturnRequest, MovementQuery,
};
use crate::models::auth::{LoginRequest, LoginResponse, RegisterRequest};
use crate::models::dashboard::DashboardSummary;
use crate::models::movement::{AccessMovement, FleetMovement};
use crate::models::person::{Person, PersonRequest, PersonType};
use crate::models::reference::{City, CityRequest, ControlPost, NamedEntityRequest, Sector};
use crate::models::user::{User, UserRequest};
use crate::models::vehicle::{Vehicle, VehicleFilter, VehicleRequest};
use crate::models::EntityId;
use crate::utils::errors::AppResult;

/// Datos de referencia: pessoas, veículos, setores, postos, cidades
#[async_trait]
pub trait ReferenceData: Send + Sync {
    async fn list_people(&self) -> AppResult<Vec<Person>>;
    async fn list_person_types(&self) -> AppResult<Vec<PersonType>>;
    async fn create_person(&self, request: &PersonRequest) -> AppResult<()>;
    async fn update_person(&self, id: EntityId, request: &PersonRequest) -> AppResult<()>;
    async fn delete_person(&self, id: EntityId) -> AppResult<()>;

    async fn list_vehicles(&self, filter: VehicleFilter) -> AppResult<Vec<Vehicle>>;
    async fn create_vehicle(&self, request: &VehicleRequest) -> AppResult<()>;
    async fn update_vehicle(&self, id: EntityId, request: &VehicleRequest) -> AppResult<()>;
    async fn delete_vehicle(&self, id: EntityId) -> AppResult<()>;

    async fn list_sectors(&self) -> AppResult<Vec<Sector>>;
    async fn create_sector(&self, request: &NamedEntityRequest) -> AppResult<()>;
    async fn update_sector(&self, id: EntityId, request: &NamedEntityRequest) -> AppResult<()>;
    async fn delete_sector(&self, id: EntityId) -> AppResult<()>;

    async fn list_control_posts(&self) -> AppResult<Vec<ControlPost>>;
    async fn create_control_post(&self, request: &NamedEntityRequest) -> AppResult<()>;
    async fn update_control_post(&self, id: EntityId, request: &NamedEntityRequest) -> AppResult<()>;
    async fn delete_control_post(&self, id: EntityId) -> AppResult<()>;

    async fn list_cities(&self) -> AppResult<Vec<City>>;
    async fn create_city(&self, request: &CityRequest) -> AppResult<()>;
}

/// Libro de movimientos
#[async_trait]
pub trait MovementLedger: Send + Sync {
    async fn list_access(&self, query: &MovementQuery) -> AppResult<Vec<AccessMovement>>;
    async fn register_entry(&self, request: &AccessEntryRequest) -> AppResult<()>;
    async fn register_exit(&self, id: EntityId, request: &AccessExitRequest) -> AppResult<()>;
    async fn correct_access(&self, id: EntityId, request: &AccessCorrection) -> AppResult<()>;
    async fn delete_access(&self, id: EntityId) -> AppResult<()>;

    async fn list_fleet(&self, query: &MovementQuery) -> AppResult<Vec<FleetMovement>>;
    async fn register_departure(&self, request: &FleetDepartureRequest) -> AppResult<()>;
    async fn register_return(&self, id: EntityId, request: &FleetReturnRequest) -> AppResult<()>;
    async fn correct_fleet(&self, id: EntityId, request: &FleetCorrection) -> AppResult<()>;
    async fn delete_fleet(&self, id: EntityId) -> AppResult<()>;

    async fn dashboard_summary(&self) -> AppResult<DashboardSummary>;
}

/// Cuentas: login, auto-registro y administración de usuarios
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> AppResult<LoginResponse>;
    async fn register(&self, request: &RegisterRequest) -> AppResult<()>;
    async fn list_users(&self) -> AppResult<Vec<User>>;
    async fn create_user(&self, request: &UserRequest) -> AppResult<()>;
    async fn update_user(&self, id: EntityId, request: &UserRequest) -> AppResult<()>;
    async fn delete_user(&self, id: EntityId) -> AppResult<()>;
}
