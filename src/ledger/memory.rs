//! Libro en memoria
//!
//! Implementación de las tres fronteras sin red, con las mismas reglas que
//! aplica el backend (unicidad, referencias al borrar, doble cierre). Cuenta
//! cada llamada recibida para comprobar que la validación local no llega
//! nunca al backend.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use super::{AccountDirectory, MovementLedger, ReferenceData};
use crate::dto::{
    AccessCorrection, AccessEntryRequest, AccessExitRequest, FleetCorrection,
    FleetDepartureRequest, FleetReturnRequest, MovementQuery, StatusFilter,
};
use crate::models::auth::{LoginRequest, LoginResponse, RegisterRequest, SessionUser, UserRole};
use crate::models::dashboard::DashboardSummary;
use crate::models::movement::{
    AccessMovement, AccessMovementRecord, FleetMovement, FleetMovementRecord,
};
use crate::models::person::{Person, PersonRequest, PersonType};
use crate::models::reference::{City, CityRequest, ControlPost, NamedEntityRequest, Sector};
use crate::models::user::{User, UserRequest};
use crate::models::vehicle::{Vehicle, VehicleFilter, VehicleRequest};
use crate::models::EntityId;
use crate::utils::errors::{not_found_error, AppError, AppResult};

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    senha: String,
}

#[derive(Debug, Default)]
struct LedgerData {
    next_id: EntityId,
    person_types: Vec<PersonType>,
    people: Vec<Person>,
    vehicles: Vec<Vehicle>,
    sectors: Vec<Sector>,
    posts: Vec<ControlPost>,
    cities: Vec<City>,
    users: Vec<StoredUser>,
    access: Vec<AccessMovementRecord>,
    fleet: Vec<FleetMovementRecord>,
}

impl LedgerData {
    fn next_id(&mut self) -> EntityId {
        self.next_id += 1;
        self.next_id
    }

    fn person(&self, id: EntityId) -> Option<&Person> {
        self.people.iter().find(|p| p.id == id)
    }

    fn vehicle(&self, id: EntityId) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id == id)
    }

    fn access_labels(&self, mut record: AccessMovementRecord) -> AccessMovementRecord {
        record.pessoa_nome = self.person(record.id_pessoa).map(|p| p.nome.clone());
        if let Some(vehicle) = record.id_veiculo.and_then(|id| self.vehicle(id)) {
            record.veiculo_placa = Some(vehicle.placa.clone());
            record.veiculo_modelo = vehicle.modelo.clone();
        }
        record.setor_nome = self
            .sectors
            .iter()
            .find(|s| s.id == record.id_setor_visitado)
            .map(|s| s.nome.clone());
        record.posto_entrada_nome = self
            .posts
            .iter()
            .find(|p| p.id == record.id_posto_controle_entrada)
            .map(|p| p.nome.clone());
        record
    }

    fn fleet_labels(&self, mut record: FleetMovementRecord) -> FleetMovementRecord {
        record.motorista_nome = self.person(record.id_pessoa).map(|p| p.nome.clone());
        if let Some(vehicle) = self.vehicle(record.id_veiculo) {
            record.placa = Some(vehicle.placa.clone());
            record.modelo = vehicle.modelo.clone();
        }
        if let Some(city) = self.cities.iter().find(|c| c.id == record.id_cidade_de_destino) {
            record.cidade_destino = Some(city.nome.clone());
            record.cidade_uf = city.uf.clone();
        }
        record
    }

    fn require_post(&self, id: EntityId) -> AppResult<()> {
        if self.posts.iter().any(|p| p.id == id) {
            Ok(())
        } else {
            Err(bad_request("Posto de controle não encontrado."))
        }
    }

    fn post_in_use(&self, id: EntityId) -> bool {
        self.access
            .iter()
            .any(|a| a.id_posto_controle_entrada == id || a.id_posto_controle_saida == Some(id))
            || self
                .fleet
                .iter()
                .any(|f| f.id_posto_controle_entrada == id || f.id_posto_controle_saida == Some(id))
    }
}

/// Libro de movimientos y datos de referencia en memoria
#[derive(Debug)]
pub struct InMemoryLedger {
    data: RwLock<LedgerData>,
    calls: AtomicUsize,
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryLedger {
    /// Libro vacío con los tres tipos de persona
    pub fn new() -> Self {
        let data = LedgerData {
            next_id: 100,
            person_types: vec![
                PersonType { id: 1, nome: "Colaborador".to_string() },
                PersonType { id: 2, nome: "Visitante".to_string() },
                PersonType { id: 3, nome: "Terceiro".to_string() },
            ],
            ..LedgerData::default()
        };
        Self {
            data: RwLock::new(data),
            calls: AtomicUsize::new(0),
        }
    }

    /// Número de llamadas recibidas a través de las fronteras
    pub fn request_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn touch(&self, operation: &str) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        debug!("🗄️ InMemoryLedger: {}", operation);
    }

    // Altas directas para preparar escenarios; no cuentan como llamadas.

    pub async fn seed_person(&self, nome: &str, documento: &str, tipo_pessoa_id: EntityId) -> Person {
        let mut data = self.data.write().await;
        let person = Person {
            id: data.next_id(),
            nome: nome.to_string(),
            documento: documento.to_string(),
            telefone: None,
            tipo_pessoa_id,
            tipo_descricao: None,
        };
        data.people.push(person.clone());
        person
    }

    pub async fn seed_vehicle(&self, placa: &str, modelo: &str, owned_fleet: bool) -> Vehicle {
        let mut data = self.data.write().await;
        let vehicle = Vehicle {
            id: data.next_id(),
            placa: placa.to_uppercase(),
            modelo: Some(modelo.to_string()),
            cor: None,
            veiculo_de_frota_propria: owned_fleet,
        };
        data.vehicles.push(vehicle.clone());
        vehicle
    }

    pub async fn seed_sector(&self, nome: &str) -> Sector {
        let mut data = self.data.write().await;
        let sector = Sector { id: data.next_id(), nome: nome.to_string() };
        data.sectors.push(sector.clone());
        sector
    }

    pub async fn seed_post(&self, nome: &str) -> ControlPost {
        let mut data = self.data.write().await;
        let post = ControlPost { id: data.next_id(), nome: nome.to_string() };
        data.posts.push(post.clone());
        post
    }

    pub async fn seed_city(&self, nome: &str, uf: &str) -> City {
        let mut data = self.data.write().await;
        let city = City {
            id: data.next_id(),
            nome: nome.to_string(),
            uf: Some(uf.to_string()),
        };
        data.cities.push(city.clone());
        city
    }

    pub async fn seed_user(&self, nome: &str, email: &str, senha: &str, role: UserRole) -> User {
        let mut data = self.data.write().await;
        let user = User {
            id: data.next_id(),
            nome: nome.to_string(),
            email: email.to_string(),
            tipo_de_usuario: role,
            ativo: true,
        };
        data.users.push(StoredUser {
            user: user.clone(),
            senha: senha.to_string(),
        });
        user
    }
}

fn bad_request(message: &str) -> AppError {
    AppError::Request {
        status: 400,
        message: message.to_string(),
    }
}

fn within_dates(at: &DateTime<Utc>, query: &MovementQuery) -> bool {
    let day = at.date_naive();
    query.data_inicio.map_or(true, |from| day >= from) && query.data_fim.map_or(true, |to| day <= to)
}

fn name_matches(name: Option<&String>, query: &MovementQuery) -> bool {
    match &query.nome {
        Some(term) => name.map_or(false, |n| n.to_lowercase().contains(&term.to_lowercase())),
        None => true,
    }
}

fn plate_matches(plate: Option<&String>, query: &MovementQuery) -> bool {
    match &query.placa {
        Some(prefix) => plate.map_or(false, |p| p.to_uppercase().starts_with(&prefix.to_uppercase())),
        None => true,
    }
}

#[async_trait]
impl ReferenceData for InMemoryLedger {
    async fn list_people(&self) -> AppResult<Vec<Person>> {
        self.touch("list_people");
        let data = self.data.read().await;
        Ok(data
            .people
            .iter()
            .cloned()
            .map(|mut p| {
                p.tipo_descricao = data
                    .person_types
                    .iter()
                    .find(|t| t.id == p.tipo_pessoa_id)
                    .map(|t| t.nome.clone());
                p
            })
            .collect())
    }

    async fn list_person_types(&self) -> AppResult<Vec<PersonType>> {
        self.touch("list_person_types");
        Ok(self.data.read().await.person_types.clone())
    }

    async fn create_person(&self, request: &PersonRequest) -> AppResult<()> {
        self.touch("create_person");
        let mut data = self.data.write().await;
        if data.people.iter().any(|p| p.documento == request.documento) {
            return Err(AppError::Conflict("Documento já cadastrado.".to_string()));
        }
        let person = Person {
            id: data.next_id(),
            nome: request.nome.clone(),
            documento: request.documento.clone(),
            telefone: request.telefone.clone(),
            tipo_pessoa_id: request.tipo_pessoa_id,
            tipo_descricao: None,
        };
        data.people.push(person);
        Ok(())
    }

    async fn update_person(&self, id: EntityId, request: &PersonRequest) -> AppResult<()> {
        self.touch("update_person");
        let mut data = self.data.write().await;
        let person = data
            .people
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| not_found_error("Person", id))?;
        person.nome = request.nome.clone();
        person.documento = request.documento.clone();
        person.telefone = request.telefone.clone();
        person.tipo_pessoa_id = request.tipo_pessoa_id;
        Ok(())
    }

    async fn delete_person(&self, id: EntityId) -> AppResult<()> {
        self.touch("delete_person");
        let mut data = self.data.write().await;
        if data.access.iter().any(|a| a.id_pessoa == id) || data.fleet.iter().any(|f| f.id_pessoa == id) {
            return Err(AppError::Constraint(
                "Pessoa possui movimentações registradas.".to_string(),
            ));
        }
        let before = data.people.len();
        data.people.retain(|p| p.id != id);
        if data.people.len() == before {
            return Err(not_found_error("Person", id));
        }
        Ok(())
    }

    async fn list_vehicles(&self, filter: VehicleFilter) -> AppResult<Vec<Vehicle>> {
        self.touch("list_vehicles");
        Ok(self
            .data
            .read()
            .await
            .vehicles
            .iter()
            .filter(|v| !filter.owned_fleet_only || v.veiculo_de_frota_propria)
            .cloned()
            .collect())
    }

    async fn create_vehicle(&self, request: &VehicleRequest) -> AppResult<()> {
        self.touch("create_vehicle");
        let mut data = self.data.write().await;
        let placa = request.placa.to_uppercase();
        if data.vehicles.iter().any(|v| v.placa.to_uppercase() == placa) {
            return Err(AppError::Conflict("Placa já cadastrada.".to_string()));
        }
        let vehicle = Vehicle {
            id: data.next_id(),
            placa,
            modelo: Some(request.modelo.clone()),
            cor: request.cor.clone(),
            veiculo_de_frota_propria: request.veiculo_de_frota_propria,
        };
        data.vehicles.push(vehicle);
        Ok(())
    }

    async fn update_vehicle(&self, id: EntityId, request: &VehicleRequest) -> AppResult<()> {
        self.touch("update_vehicle");
        let mut data = self.data.write().await;
        let vehicle = data
            .vehicles
            .iter_mut()
            .find(|v| v.id == id)
            .ok_or_else(|| not_found_error("Vehicle", id))?;
        vehicle.placa = request.placa.to_uppercase();
        vehicle.modelo = Some(request.modelo.clone());
        vehicle.cor = request.cor.clone();
        vehicle.veiculo_de_frota_propria = request.veiculo_de_frota_propria;
        Ok(())
    }

    async fn delete_vehicle(&self, id: EntityId) -> AppResult<()> {
        self.touch("delete_vehicle");
        let mut data = self.data.write().await;
        if data.access.iter().any(|a| a.id_veiculo == Some(id)) || data.fleet.iter().any(|f| f.id_veiculo == id) {
            return Err(AppError::Constraint(
                "Veículo possui histórico de acessos.".to_string(),
            ));
        }
        data.vehicles.retain(|v| v.id != id);
        Ok(())
    }

    async fn list_sectors(&self) -> AppResult<Vec<Sector>> {
        self.touch("list_sectors");
        Ok(self.data.read().await.sectors.clone())
    }

    async fn create_sector(&self, request: &NamedEntityRequest) -> AppResult<()> {
        self.touch("create_sector");
        let mut data = self.data.write().await;
        let sector = Sector { id: data.next_id(), nome: request.nome.clone() };
        data.sectors.push(sector);
        Ok(())
    }

    async fn update_sector(&self, id: EntityId, request: &NamedEntityRequest) -> AppResult<()> {
        self.touch("update_sector");
        let mut data = self.data.write().await;
        let sector = data
            .sectors
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| not_found_error("Sector", id))?;
        sector.nome = request.nome.clone();
        Ok(())
    }

    async fn delete_sector(&self, id: EntityId) -> AppResult<()> {
        self.touch("delete_sector");
        let mut data = self.data.write().await;
        if data.access.iter().any(|a| a.id_setor_visitado == id) {
            return Err(AppError::Constraint(
                "Não é possível excluir setores que possuem histórico de acesso.".to_string(),
            ));
        }
        data.sectors.retain(|s| s.id != id);
        Ok(())
    }

    async fn list_control_posts(&self) -> AppResult<Vec<ControlPost>> {
        self.touch("list_control_posts");
        Ok(self.data.read().await.posts.clone())
    }

    async fn create_control_post(&self, request: &NamedEntityRequest) -> AppResult<()> {
        self.touch("create_control_post");
        let mut data = self.data.write().await;
        let post = ControlPost { id: data.next_id(), nome: request.nome.clone() };
        data.posts.push(post);
        Ok(())
    }

    async fn update_control_post(&self, id: EntityId, request: &NamedEntityRequest) -> AppResult<()> {
        self.touch("update_control_post");
        let mut data = self.data.write().await;
        let post = data
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| not_found_error("ControlPost", id))?;
        post.nome = request.nome.clone();
        Ok(())
    }

    async fn delete_control_post(&self, id: EntityId) -> AppResult<()> {
        self.touch("delete_control_post");
        let mut data = self.data.write().await;
        if data.post_in_use(id) {
            return Err(AppError::Constraint(
                "Não é possível excluir postos com movimentações.".to_string(),
            ));
        }
        data.posts.retain(|p| p.id != id);
        Ok(())
    }

    async fn list_cities(&self) -> AppResult<Vec<City>> {
        self.touch("list_cities");
        Ok(self.data.read().await.cities.clone())
    }

    async fn create_city(&self, request: &CityRequest) -> AppResult<()> {
        self.touch("create_city");
        let mut data = self.data.write().await;
        let city = City {
            id: data.next_id(),
            nome: request.nome.clone(),
            uf: Some(request.uf.clone()),
        };
        data.cities.push(city);
        Ok(())
    }
}

#[async_trait]
impl MovementLedger for InMemoryLedger {
    async fn list_access(&self, query: &MovementQuery) -> AppResult<Vec<AccessMovement>> {
        self.touch("list_access");
        let data = self.data.read().await;
        let mut records: Vec<AccessMovementRecord> = data
            .access
            .iter()
            .cloned()
            .map(|r| data.access_labels(r))
            .filter(|r| match query.status {
                Some(StatusFilter::Patio) => r.data_hora_saida.is_none() && r.id_posto_controle_saida.is_none(),
                _ => true,
            })
            .filter(|r| within_dates(&r.data_hora_entrada, query))
            .filter(|r| name_matches(r.pessoa_nome.as_ref(), query))
            .filter(|r| plate_matches(r.veiculo_placa.as_ref(), query))
            .collect();
        records.sort_by(|a, b| b.data_hora_entrada.cmp(&a.data_hora_entrada).then(b.id.cmp(&a.id)));
        Ok(records.into_iter().map(AccessMovement::from).collect())
    }

    async fn register_entry(&self, request: &AccessEntryRequest) -> AppResult<()> {
        self.touch("register_entry");
        let mut data = self.data.write().await;
        if data.person(request.id_pessoa).is_none() {
            return Err(bad_request("Pessoa não encontrada."));
        }
        if !data.sectors.iter().any(|s| s.id == request.id_setor_visitado) {
            return Err(bad_request("Setor não encontrado."));
        }
        data.require_post(request.id_posto_controle_entrada)?;
        let already_inside = data.access.iter().any(|a| {
            a.id_pessoa == request.id_pessoa && a.data_hora_saida.is_none() && a.id_posto_controle_saida.is_none()
        });
        if already_inside {
            return Err(AppError::Conflict("Pessoa já se encontra no pátio.".to_string()));
        }

        let record = AccessMovementRecord {
            id: data.next_id(),
            id_pessoa: request.id_pessoa,
            id_veiculo: request.id_veiculo,
            id_setor_visitado: request.id_setor_visitado,
            id_posto_controle_entrada: request.id_posto_controle_entrada,
            id_posto_controle_saida: None,
            km_entrada: request.km_entrada,
            km_saida: None,
            data_hora_entrada: Utc::now(),
            data_hora_saida: None,
            motivo_da_visita: request.motivo_da_visita.clone(),
            observacao: request.observacao.clone(),
            pessoa_nome: None,
            veiculo_placa: None,
            veiculo_modelo: None,
            setor_nome: None,
            posto_entrada_nome: None,
        };
        data.access.push(record);
        Ok(())
    }

    async fn register_exit(&self, id: EntityId, request: &AccessExitRequest) -> AppResult<()> {
        self.touch("register_exit");
        let mut data = self.data.write().await;
        data.require_post(request.id_posto_controle_saida)?;
        let record = data
            .access
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| not_found_error("AccessMovement", id))?;
        if record.data_hora_saida.is_some() || record.id_posto_controle_saida.is_some() {
            return Err(AppError::Conflict("Saída já registrada.".to_string()));
        }
        record.id_posto_controle_saida = Some(request.id_posto_controle_saida);
        record.km_saida = request.km_saida;
        record.data_hora_saida = Some(Utc::now());
        if request.observacao.is_some() {
            record.observacao = request.observacao.clone();
        }
        Ok(())
    }

    async fn correct_access(&self, id: EntityId, request: &AccessCorrection) -> AppResult<()> {
        self.touch("correct_access");
        let mut data = self.data.write().await;
        let record = data
            .access
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| not_found_error("AccessMovement", id))?;
        record.id_pessoa = request.id_pessoa;
        record.id_veiculo = request.id_veiculo;
        record.id_setor_visitado = request.id_setor_visitado;
        record.id_posto_controle_entrada = request.id_posto_controle_entrada;
        record.id_posto_controle_saida = request.id_posto_controle_saida;
        record.km_entrada = request.km_entrada;
        record.km_saida = request.km_saida;
        record.motivo_da_visita = request.motivo_da_visita.clone();
        record.observacao = request.observacao.clone();
        if let Some(at) = request.data_hora_entrada {
            record.data_hora_entrada = at;
        }
        if let Some(at) = request.data_hora_saida {
            record.data_hora_saida = Some(at);
        }
        Ok(())
    }

    async fn delete_access(&self, id: EntityId) -> AppResult<()> {
        self.touch("delete_access");
        let mut data = self.data.write().await;
        let before = data.access.len();
        data.access.retain(|a| a.id != id);
        if data.access.len() == before {
            return Err(not_found_error("AccessMovement", id));
        }
        Ok(())
    }

    async fn list_fleet(&self, query: &MovementQuery) -> AppResult<Vec<FleetMovement>> {
        self.touch("list_fleet");
        let data = self.data.read().await;
        let mut records: Vec<FleetMovementRecord> = data
            .fleet
            .iter()
            .cloned()
            .map(|r| data.fleet_labels(r))
            .filter(|r| match query.status {
                Some(StatusFilter::Saiu) => r.km_saida.is_none(),
                _ => true,
            })
            .filter(|r| within_dates(&r.data_hora_entrada, query))
            .filter(|r| name_matches(r.motorista_nome.as_ref(), query))
            .filter(|r| plate_matches(r.placa.as_ref(), query))
            .collect();
        records.sort_by(|a, b| b.data_hora_entrada.cmp(&a.data_hora_entrada).then(b.id.cmp(&a.id)));
        Ok(records.into_iter().map(FleetMovement::from).collect())
    }

    async fn register_departure(&self, request: &FleetDepartureRequest) -> AppResult<()> {
        self.touch("register_departure");
        let mut data = self.data.write().await;
        if data.person(request.id_pessoa).is_none() {
            return Err(bad_request("Motorista não encontrado."));
        }
        match data.vehicle(request.id_veiculo) {
            Some(v) if v.veiculo_de_frota_propria => {}
            Some(_) => return Err(bad_request("Veículo não pertence à frota própria.")),
            None => return Err(bad_request("Veículo não encontrado.")),
        }
        if !data.cities.iter().any(|c| c.id == request.id_cidade_de_destino) {
            return Err(bad_request("Cidade não encontrada."));
        }
        data.require_post(request.id_posto_controle_entrada)?;
        if data
            .fleet
            .iter()
            .any(|f| f.id_veiculo == request.id_veiculo && f.km_saida.is_none())
        {
            return Err(AppError::Conflict("Veículo já está em viagem.".to_string()));
        }

        let record = FleetMovementRecord {
            id: data.next_id(),
            id_pessoa: request.id_pessoa,
            id_veiculo: request.id_veiculo,
            id_cidade_de_destino: request.id_cidade_de_destino,
            id_posto_controle_entrada: request.id_posto_controle_entrada,
            id_posto_controle_saida: None,
            km_entrada: request.km_entrada,
            km_saida: None,
            data_hora_entrada: Utc::now(),
            data_hora_saida: None,
            motivo_saida: request.motivo_saida.clone(),
            observacao: request.observacao.clone(),
            motorista_nome: None,
            placa: None,
            modelo: None,
            cidade_destino: None,
            cidade_uf: None,
        };
        data.fleet.push(record);
        Ok(())
    }

    async fn register_return(&self, id: EntityId, request: &FleetReturnRequest) -> AppResult<()> {
        self.touch("register_return");
        let mut data = self.data.write().await;
        data.require_post(request.id_posto_controle_saida)?;
        let record = data
            .fleet
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| not_found_error("FleetMovement", id))?;
        if record.km_saida.is_some() {
            return Err(AppError::Conflict("Retorno já registrado.".to_string()));
        }
        if request.km_saida <= record.km_entrada {
            return Err(bad_request("A KM de chegada deve ser maior que a de saída."));
        }
        record.id_posto_controle_saida = Some(request.id_posto_controle_saida);
        record.km_saida = Some(request.km_saida);
        record.data_hora_saida = Some(Utc::now());
        if request.observacao.is_some() {
            record.observacao = request.observacao.clone();
        }
        Ok(())
    }

    async fn correct_fleet(&self, id: EntityId, request: &FleetCorrection) -> AppResult<()> {
        self.touch("correct_fleet");
        let mut data = self.data.write().await;
        let record = data
            .fleet
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| not_found_error("FleetMovement", id))?;
        record.id_pessoa = request.id_pessoa;
        record.id_veiculo = request.id_veiculo;
        record.id_cidade_de_destino = request.id_cidade_de_destino;
        record.id_posto_controle_entrada = request.id_posto_controle_entrada;
        record.id_posto_controle_saida = request.id_posto_controle_saida;
        record.km_entrada = request.km_entrada;
        record.km_saida = request.km_saida;
        record.motivo_saida = request.motivo_saida.clone();
        record.observacao = request.observacao.clone();
        if let Some(at) = request.data_hora_entrada {
            record.data_hora_entrada = at;
        }
        if let Some(at) = request.data_hora_saida {
            record.data_hora_saida = Some(at);
        }
        Ok(())
    }

    async fn delete_fleet(&self, id: EntityId) -> AppResult<()> {
        self.touch("delete_fleet");
        let mut data = self.data.write().await;
        let before = data.fleet.len();
        data.fleet.retain(|f| f.id != id);
        if data.fleet.len() == before {
            return Err(not_found_error("FleetMovement", id));
        }
        Ok(())
    }

    async fn dashboard_summary(&self) -> AppResult<DashboardSummary> {
        self.touch("dashboard_summary");
        let data = self.data.read().await;
        let today = Utc::now().date_naive();

        let mut recent: Vec<&AccessMovementRecord> = data.access.iter().collect();
        recent.sort_by(|a, b| b.data_hora_entrada.cmp(&a.data_hora_entrada));
        let recentes = recent
            .into_iter()
            .take(5)
            .map(|r| serde_json::to_value(data.access_labels(r.clone())))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(DashboardSummary {
            veiculos_no_patio: data
                .access
                .iter()
                .filter(|a| a.id_veiculo.is_some() && a.data_hora_saida.is_none())
                .count() as u64,
            frota_em_acao: data.fleet.iter().filter(|f| f.km_saida.is_none()).count() as u64,
            entradas_hoje: data
                .access
                .iter()
                .filter(|a| a.data_hora_entrada.date_naive() == today)
                .count() as u64,
            saidas_hoje: data
                .access
                .iter()
                .filter(|a| a.data_hora_saida.map_or(false, |at| at.date_naive() == today))
                .count() as u64,
            recentes,
        })
    }
}

#[async_trait]
impl AccountDirectory for InMemoryLedger {
    async fn login(&self, request: &LoginRequest) -> AppResult<LoginResponse> {
        self.touch("login");
        let data = self.data.read().await;
        let stored = data
            .users
            .iter()
            .find(|u| {
                u.user.email.eq_ignore_ascii_case(&request.email) && u.senha == request.senha && u.user.ativo
            })
            .ok_or_else(|| AppError::Unauthorized("E-mail ou senha inválidos.".to_string()))?;

        Ok(LoginResponse {
            token: format!("memory-token-{}", stored.user.id),
            user: SessionUser {
                id: stored.user.id,
                nome: stored.user.nome.clone(),
                email: stored.user.email.clone(),
                tipo_de_usuario: stored.user.tipo_de_usuario,
            },
        })
    }

    async fn register(&self, request: &RegisterRequest) -> AppResult<()> {
        self.touch("register");
        let mut data = self.data.write().await;
        if data.users.iter().any(|u| u.user.email.eq_ignore_ascii_case(&request.email)) {
            return Err(AppError::Conflict("E-mail já cadastrado.".to_string()));
        }
        let user = User {
            id: data.next_id(),
            nome: request.nome.clone(),
            email: request.email.clone(),
            tipo_de_usuario: UserRole::Operador,
            ativo: true,
        };
        data.users.push(StoredUser { user, senha: request.senha.clone() });
        Ok(())
    }

    async fn list_users(&self) -> AppResult<Vec<User>> {
        self.touch("list_users");
        Ok(self.data.read().await.users.iter().map(|u| u.user.clone()).collect())
    }

    async fn create_user(&self, request: &UserRequest) -> AppResult<()> {
        self.touch("create_user");
        let senha = match request.senha.as_deref() {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => return Err(bad_request("Senha é obrigatória para novos usuários.")),
        };
        let mut data = self.data.write().await;
        if data.users.iter().any(|u| u.user.email.eq_ignore_ascii_case(&request.email)) {
            return Err(AppError::Conflict("E-mail já cadastrado.".to_string()));
        }
        let user = User {
            id: data.next_id(),
            nome: request.nome.clone(),
            email: request.email.clone(),
            tipo_de_usuario: request.tipo_de_usuario,
            ativo: request.ativo,
        };
        data.users.push(StoredUser { user, senha });
        Ok(())
    }

    async fn update_user(&self, id: EntityId, request: &UserRequest) -> AppResult<()> {
        self.touch("update_user");
        let mut data = self.data.write().await;
        let stored = data
            .users
            .iter_mut()
            .find(|u| u.user.id == id)
            .ok_or_else(|| not_found_error("User", id))?;
        stored.user.nome = request.nome.clone();
        stored.user.email = request.email.clone();
        stored.user.tipo_de_usuario = request.tipo_de_usuario;
        stored.user.ativo = request.ativo;
        if let Some(senha) = request.senha.as_deref().filter(|s| !s.is_empty()) {
            stored.senha = senha.to_string();
        }
        Ok(())
    }

    async fn delete_user(&self, id: EntityId) -> AppResult<()> {
        self.touch("delete_user");
        let mut data = self.data.write().await;
        data.users.retain(|u| u.user.id != id);
        Ok(())
    }
}
