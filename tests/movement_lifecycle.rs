use std::sync::Arc;

use rust_decimal::Decimal;

use portaria::config::environment::EnvironmentConfig;
use portaria::ledger::memory::InMemoryLedger;
use portaria::models::auth::UserRole;
use portaria::models::draft::{AccessDraft, AccessExitDraft, FleetDraft, FleetReturnDraft};
use portaria::models::movement::{MovementKind, MovementRef};
use portaria::models::person::PersonRequest;
use portaria::models::user::UserRequest;
use portaria::models::vehicle::VehicleFilter;
use portaria::services::{ReportFilters, ReportRows};
use portaria::state::{empty_session, AppState};
use portaria::utils::validation::parse_odometer;
use portaria::AppError;

async fn create_test_state(dir: &tempfile::TempDir) -> (AppState, Arc<InMemoryLedger>) {
    let ledger = Arc::new(InMemoryLedger::new());
    ledger
        .seed_user("Admin", "admin@empresa.com", "admin123", UserRole::Admin)
        .await;
    ledger
        .seed_user("Operador", "op@empresa.com", "op123", UserRole::Operador)
        .await;

    let config = EnvironmentConfig {
        session_file: dir.path().join("session.json"),
        ..EnvironmentConfig::default()
    };
    let state = AppState::with_backends(
        config,
        empty_session(),
        ledger.clone(),
        ledger.clone(),
        ledger.clone(),
    );
    (state, ledger)
}

async fn sign_in(state: &AppState, email: &str, senha: &str) {
    state.auth_service().login(email, senha).await.unwrap();
}

#[tokio::test]
async fn test_person_with_history_cannot_be_deleted() {
    let dir = tempfile::tempdir().unwrap();
    let (state, ledger) = create_test_state(&dir).await;
    sign_in(&state, "op@empresa.com", "op123").await;
    let reference = state.reference_service();

    reference
        .save_person(
            None,
            PersonRequest {
                nome: "Ana Silva".to_string(),
                documento: "12345678900".to_string(),
                telefone: None,
                tipo_pessoa_id: 2,
            },
        )
        .await
        .unwrap();
    let ana = reference
        .list_people()
        .await
        .unwrap()
        .into_iter()
        .find(|p| p.documento == "12345678900")
        .unwrap();
    assert_eq!(ana.nome, "Ana Silva");
    assert_eq!(ana.tipo_descricao.as_deref(), Some("Visitante"));

    let sector = ledger.seed_sector("RH").await;
    let post = ledger.seed_post("Portão 1").await;
    state
        .movement_service()
        .open_access(AccessDraft {
            person: Some(ana.clone()),
            sector: Some(sector),
            entry_post: Some(post),
            ..AccessDraft::default()
        })
        .await
        .unwrap();

    assert!(matches!(
        reference.delete_person(ana.id).await,
        Err(AppError::Constraint(_))
    ));
    assert!(reference.list_people().await.unwrap().iter().any(|p| p.id == ana.id));
}

#[tokio::test]
async fn test_fleet_trip_odometer_rules_and_distance() {
    let dir = tempfile::tempdir().unwrap();
    let (state, ledger) = create_test_state(&dir).await;
    sign_in(&state, "op@empresa.com", "op123").await;
    let movements = state.movement_service();

    let driver = ledger.seed_person("Bruno", "11122233344", 1).await;
    let vehicle = ledger.seed_vehicle("ABC1D23", "Strada", true).await;
    let city = ledger.seed_city("Campinas", "SP").await;
    let post = ledger.seed_post("Portão 1").await;

    movements
        .open_fleet(FleetDraft {
            driver: Some(driver),
            vehicle: Some(vehicle),
            destination_city: Some(city),
            departure_post: Some(post.clone()),
            departure_odometer: Some(Decimal::from(50000)),
            reason: "Entrega".to_string(),
            ..FleetDraft::default()
        })
        .await
        .unwrap();
    let trip = movements.list_fleet_out().await.unwrap().remove(0);

    let before = ledger.request_count();
    let rejected = movements
        .close_fleet(
            &trip,
            FleetReturnDraft {
                arrival_post: Some(post.clone()),
                arrival_odometer: Some(Decimal::from(49000)),
                note: String::new(),
            },
        )
        .await;
    match rejected {
        Err(AppError::Validation { minimum, .. }) => assert_eq!(minimum, Some(Decimal::from(50000))),
        other => panic!("unexpected: {:?}", other),
    }
    assert_eq!(ledger.request_count(), before);

    movements
        .close_fleet(
            &trip,
            FleetReturnDraft {
                arrival_post: Some(post),
                arrival_odometer: Some(Decimal::from(50120)),
                note: String::new(),
            },
        )
        .await
        .unwrap();
    assert!(movements.list_fleet_out().await.unwrap().is_empty());

    let report = state
        .report_service()
        .list_movements(MovementKind::Fleet, &ReportFilters::default())
        .await
        .unwrap();
    match report.rows {
        ReportRows::Fleet(rows) => {
            assert_eq!(rows[0].distance(), Some(Decimal::from(120)));
            assert!(!rows[0].is_out());
        }
        other => panic!("unexpected rows: {:?}", other),
    }
}

#[tokio::test]
async fn test_walk_in_visitor_leaves_the_patio() {
    let dir = tempfile::tempdir().unwrap();
    let (state, ledger) = create_test_state(&dir).await;
    sign_in(&state, "op@empresa.com", "op123").await;
    let movements = state.movement_service();

    let person = ledger.seed_person("Ana Silva", "12345678900", 2).await;
    let sector = ledger.seed_sector("RH").await;
    let post = ledger.seed_post("Portão 1").await;

    movements
        .open_access(AccessDraft {
            person: Some(person),
            sector: Some(sector),
            entry_post: Some(post.clone()),
            reason: "Entrevista".to_string(),
            ..AccessDraft::default()
        })
        .await
        .unwrap();

    let patio = movements.list_patio().await.unwrap();
    assert_eq!(patio.len(), 1);
    assert_eq!(patio[0].vehicle_id, None);
    assert_eq!(patio[0].labels.sector_name.as_deref(), Some("RH"));

    movements
        .close_access(
            &patio[0],
            AccessExitDraft {
                exit_post: Some(post),
                ..AccessExitDraft::default()
            },
        )
        .await
        .unwrap();
    assert!(movements.list_patio().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_second_close_of_stale_record_is_conflict() {
    let dir = tempfile::tempdir().unwrap();
    let (state, ledger) = create_test_state(&dir).await;
    sign_in(&state, "op@empresa.com", "op123").await;
    let movements = state.movement_service();

    let person = ledger.seed_person("Ana Silva", "12345678900", 2).await;
    let sector = ledger.seed_sector("RH").await;
    let post = ledger.seed_post("Portão 1").await;
    movements
        .open_access(AccessDraft {
            person: Some(person),
            sector: Some(sector),
            entry_post: Some(post.clone()),
            ..AccessDraft::default()
        })
        .await
        .unwrap();

    // Dos operadores con la misma lista cargada
    let stale = movements.list_patio().await.unwrap().remove(0);
    let exit = AccessExitDraft {
        exit_post: Some(post),
        ..AccessExitDraft::default()
    };
    movements.close_access(&stale, exit.clone()).await.unwrap();
    assert!(matches!(
        movements.close_access(&stale, exit).await,
        Err(AppError::Conflict(_))
    ));
}

#[tokio::test]
async fn test_incomplete_entry_makes_no_backend_call() {
    let dir = tempfile::tempdir().unwrap();
    let (state, ledger) = create_test_state(&dir).await;
    sign_in(&state, "op@empresa.com", "op123").await;
    let person = ledger.seed_person("Ana Silva", "12345678900", 2).await;

    let before = ledger.request_count();
    let result = state
        .movement_service()
        .open_access(AccessDraft {
            person: Some(person),
            entry_odometer: parse_odometer("1200,5").unwrap(),
            ..AccessDraft::default()
        })
        .await;
    assert!(matches!(result, Err(AppError::Validation { .. })));
    assert_eq!(ledger.request_count(), before);
}

#[tokio::test]
async fn test_owned_fleet_listing_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    let (state, ledger) = create_test_state(&dir).await;
    ledger.seed_vehicle("ABC1D23", "Strada", true).await;
    ledger.seed_vehicle("XYZ9K88", "Civic", false).await;
    ledger.seed_vehicle("QWE4R56", "Saveiro", true).await;
    let reference = state.reference_service();

    let first = reference.list_vehicles(VehicleFilter::owned_fleet()).await.unwrap();
    let second = reference.list_vehicles(VehicleFilter::owned_fleet()).await.unwrap();
    assert_eq!(first.len(), 2);
    assert!(first.iter().all(|v| v.veiculo_de_frota_propria));
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_user_edit_without_password_keeps_login() {
    let dir = tempfile::tempdir().unwrap();
    let (state, ledger) = create_test_state(&dir).await;
    sign_in(&state, "admin@empresa.com", "admin123").await;
    let carla = ledger
        .seed_user("Carla", "carla@empresa.com", "segredo", UserRole::Operador)
        .await;

    state
        .user_service()
        .update(
            carla.id,
            UserRequest {
                nome: "Carla Souza".to_string(),
                email: "carla@empresa.com".to_string(),
                senha: Some(String::new()),
                tipo_de_usuario: UserRole::Operador,
                ativo: true,
            },
        )
        .await
        .unwrap();

    state.auth_service().sign_out().await.unwrap();
    let session = state
        .auth_service()
        .login("carla@empresa.com", "segredo")
        .await
        .unwrap();
    assert_eq!(session.user.nome, "Carla Souza");
}

#[tokio::test]
async fn test_operator_cannot_correct_or_delete() {
    let dir = tempfile::tempdir().unwrap();
    let (state, ledger) = create_test_state(&dir).await;
    sign_in(&state, "op@empresa.com", "op123").await;

    let before = ledger.request_count();
    let target = MovementRef {
        kind: MovementKind::Fleet,
        id: 1,
    };
    assert!(matches!(
        state.movement_service().request_deletion(target).await,
        Err(AppError::Forbidden(_))
    ));
    assert!(matches!(state.user_service().list().await, Err(AppError::Forbidden(_))));
    assert_eq!(ledger.request_count(), before);
}

#[tokio::test]
async fn test_admin_deletion_requires_confirmation() {
    let dir = tempfile::tempdir().unwrap();
    let (state, ledger) = create_test_state(&dir).await;
    sign_in(&state, "admin@empresa.com", "admin123").await;
    let movements = state.movement_service();

    let person = ledger.seed_person("Ana Silva", "12345678900", 2).await;
    let sector = ledger.seed_sector("RH").await;
    let post = ledger.seed_post("Portão 1").await;
    movements
        .open_access(AccessDraft {
            person: Some(person),
            sector: Some(sector),
            entry_post: Some(post),
            ..AccessDraft::default()
        })
        .await
        .unwrap();
    let movement = movements.list_patio().await.unwrap().remove(0);
    let target = MovementRef {
        kind: MovementKind::Access,
        id: movement.id,
    };

    // Pedir la exclusión y no confirmarla no cambia nada
    let pending = movements.request_deletion(target).await.unwrap();
    assert_eq!(pending.target(), target);
    drop(pending);
    assert_eq!(movements.list_patio().await.unwrap().len(), 1);

    let pending = movements.request_deletion(target).await.unwrap();
    movements.confirm_deletion(pending).await.unwrap();
    assert!(movements.list_patio().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_session_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let (state, ledger) = create_test_state(&dir).await;
    sign_in(&state, "admin@empresa.com", "admin123").await;

    // Nuevo proceso con el mismo archivo de sesión
    let config = EnvironmentConfig {
        session_file: dir.path().join("session.json"),
        ..EnvironmentConfig::default()
    };
    let restarted = AppState::with_backends(
        config,
        empty_session(),
        ledger.clone(),
        ledger.clone(),
        ledger,
    );
    let session = restarted.auth_service().restore().await.unwrap().unwrap();
    assert!(session.is_admin());
    assert!(restarted.authorization().require_admin("delete movement").await.is_ok());
}
