//! Servicio de datos de referencia
//!
//! Carga de catálogos para los formularios y mantenimiento (alta, edición,
//! exclusión) de pessoas, veículos, setores y postos.

use std::sync::Arc;

use futures::try_join;
use tracing::{debug, info};
use validator::Validate;

use crate::ledger::ReferenceData;
use crate::models::person::{Person, PersonRequest, PersonType};
use crate::models::reference::{City, CityRequest, ControlPost, NamedEntityRequest, Sector};
use crate::models::vehicle::{Vehicle, VehicleFilter, VehicleRequest};
use crate::models::EntityId;
use crate::utils::errors::{validation_error, AppResult};
use crate::utils::validation::{
    normalize_plate, validate_length, validate_license_plate, validate_not_empty,
};

/// Catálogos del formulario de acceso
#[derive(Debug, Clone, Default)]
pub struct AccessCatalogs {
    pub people: Vec<Person>,
    pub vehicles: Vec<Vehicle>,
    pub sectors: Vec<Sector>,
    pub posts: Vec<ControlPost>,
}

/// Catálogos del formulario de flota
#[derive(Debug, Clone, Default)]
pub struct FleetCatalogs {
    pub drivers: Vec<Person>,
    pub vehicles: Vec<Vehicle>,
    pub cities: Vec<City>,
    pub posts: Vec<ControlPost>,
}

pub struct ReferenceService {
    reference: Arc<dyn ReferenceData>,
}

impl ReferenceService {
    pub fn new(reference: Arc<dyn ReferenceData>) -> Self {
        Self { reference }
    }

    /// Cargar en paralelo todo lo que necesita el formulario de acceso
    pub async fn access_catalogs(&self) -> AppResult<AccessCatalogs> {
        let (people, vehicles, sectors, posts) = try_join!(
            self.reference.list_people(),
            self.reference.list_vehicles(VehicleFilter::all()),
            self.reference.list_sectors(),
            self.reference.list_control_posts(),
        )?;
        debug!(
            "📋 Catálogos de acesso: {} pessoas, {} veículos, {} setores, {} postos",
            people.len(),
            vehicles.len(),
            sectors.len(),
            posts.len()
        );
        Ok(AccessCatalogs {
            people,
            vehicles,
            sectors,
            posts,
        })
    }

    /// Cargar en paralelo el formulario de flota (solo vehículos propios)
    pub async fn fleet_catalogs(&self) -> AppResult<FleetCatalogs> {
        let (drivers, vehicles, cities, posts) = try_join!(
            self.reference.list_people(),
            self.reference.list_vehicles(VehicleFilter::owned_fleet()),
            self.reference.list_cities(),
            self.reference.list_control_posts(),
        )?;
        Ok(FleetCatalogs {
            drivers,
            vehicles,
            cities,
            posts,
        })
    }

    pub async fn list_people(&self) -> AppResult<Vec<Person>> {
        self.reference.list_people().await
    }

    pub async fn list_person_types(&self) -> AppResult<Vec<PersonType>> {
        self.reference.list_person_types().await
    }

    pub async fn list_vehicles(&self, filter: VehicleFilter) -> AppResult<Vec<Vehicle>> {
        self.reference.list_vehicles(filter).await
    }

    pub async fn list_sectors(&self) -> AppResult<Vec<Sector>> {
        self.reference.list_sectors().await
    }

    pub async fn list_control_posts(&self) -> AppResult<Vec<ControlPost>> {
        self.reference.list_control_posts().await
    }

    pub async fn list_cities(&self) -> AppResult<Vec<City>> {
        self.reference.list_cities().await
    }

    /// Alta rápida de ciudad desde el formulario de flota; devuelve la lista actualizada
    pub async fn quick_add_city(&self, nome: &str) -> AppResult<Vec<City>> {
        validate_not_empty(nome).map_err(|_| validation_error("nome", "must not be empty"))?;
        let request = CityRequest::quick(nome);
        request.validate()?;
        self.reference.create_city(&request).await?;
        info!("🏙️ Cidade cadastrada: {}", request.nome);
        self.reference.list_cities().await
    }

    /// Alta (`id = None`) o edición de una persona
    pub async fn save_person(&self, id: Option<EntityId>, mut request: PersonRequest) -> AppResult<()> {
        request.nome = request.nome.trim().to_string();
        request.documento = request.documento.trim().to_string();
        request.telefone = request
            .telefone
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        request.validate()?;

        match id {
            Some(id) => self.reference.update_person(id, &request).await?,
            None => self.reference.create_person(&request).await?,
        }
        info!("👤 Pessoa salva: {}", request.nome);
        Ok(())
    }

    pub async fn delete_person(&self, id: EntityId) -> AppResult<()> {
        self.reference.delete_person(id).await
    }

    /// Alta o edición de un vehículo; la placa se guarda en mayúsculas
    pub async fn save_vehicle(&self, id: Option<EntityId>, mut request: VehicleRequest) -> AppResult<()> {
        request.placa = normalize_plate(&request.placa);
        request.modelo = request.modelo.trim().to_string();
        validate_license_plate(&request.placa)
            .map_err(|_| validation_error("placa", "invalid license plate"))?;
        request.validate()?;

        match id {
            Some(id) => self.reference.update_vehicle(id, &request).await?,
            None => self.reference.create_vehicle(&request).await?,
        }
        info!("🚗 Veículo salvo: {}", request.placa);
        Ok(())
    }

    pub async fn delete_vehicle(&self, id: EntityId) -> AppResult<()> {
        self.reference.delete_vehicle(id).await
    }

    pub async fn save_sector(&self, id: Option<EntityId>, nome: &str) -> AppResult<()> {
        let request = named_request(nome)?;
        match id {
            Some(id) => self.reference.update_sector(id, &request).await,
            None => self.reference.create_sector(&request).await,
        }
    }

    pub async fn delete_sector(&self, id: EntityId) -> AppResult<()> {
        self.reference.delete_sector(id).await
    }

    pub async fn save_control_post(&self, id: Option<EntityId>, nome: &str) -> AppResult<()> {
        let request = named_request(nome)?;
        match id {
            Some(id) => self.reference.update_control_post(id, &request).await,
            None => self.reference.create_control_post(&request).await,
        }
    }

    pub async fn delete_control_post(&self, id: EntityId) -> AppResult<()> {
        self.reference.delete_control_post(id).await
    }
}

fn named_request(nome: &str) -> AppResult<NamedEntityRequest> {
    let nome = nome.trim();
    validate_length(nome, 1, 120).map_err(|_| validation_error("nome", "must have 1 to 120 characters"))?;
    Ok(NamedEntityRequest {
        nome: nome.to_string(),
    })
}
