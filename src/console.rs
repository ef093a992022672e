//! Consola del operador
//!
//! Menús de texto sobre los servicios: pátio, frota, cadastros, relatórios
//! y administración.

use std::io::{self, Write};

use anyhow::Result;
use chrono::NaiveDate;
use colored::*;

use portaria::dto::{AccessCorrection, FleetCorrection};
use portaria::models::auth::{RegisterRequest, UserRole};
use portaria::models::draft::{AccessDraft, AccessExitDraft, FleetDraft, FleetReturnDraft};
use portaria::models::movement::{AccessMovement, FleetMovement, MovementKind, MovementRef};
use portaria::models::person::PersonRequest;
use portaria::models::user::UserRequest;
use portaria::models::vehicle::{VehicleFilter, VehicleRequest};
use portaria::services::{ReportFilters, ReportRows};
use portaria::state::AppState;
use portaria::utils::errors::AppError;
use portaria::utils::filter::{filter_by_term, Searchable};
use portaria::utils::time::{display_local, format_duration, format_short, parse_local};
use portaria::utils::validation::{parse_odometer, validate_date};

pub async fn run(state: &AppState) -> Result<()> {
    println!("{}", "🚧 Portaria - Controle de Acesso e Frota".bright_blue().bold());
    println!("{}", "=========================================".bright_blue());

    if let Some(session) = state.auth_service().restore().await? {
        println!(
            "{}",
            format!("🔓 Sessão restaurada: {} ({})", session.user.nome, session.user.tipo_de_usuario.label())
                .bright_green()
        );
    }

    loop {
        if state.authorization().current().await.is_none() && !login_menu(state).await? {
            break;
        }
        if !main_menu(state).await? {
            break;
        }
    }

    println!("{}", "👋 Até logo!".bright_green());
    Ok(())
}

// ---------------------------------------------------------------------------
// Entrada de texto
// ---------------------------------------------------------------------------

fn prompt(label: &str) -> io::Result<String> {
    print!("{}", label.bright_yellow());
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn title(text: &str) {
    println!();
    println!("{}", text.bright_green().bold());
    println!("{}", "=".repeat(text.chars().count()).bright_green());
}

fn report_error(error: &AppError) {
    println!("{}", format!("❌ {}", error.user_message()).bright_red());
}

fn confirm(question: &str) -> io::Result<bool> {
    let answer = prompt(&format!("{} (s/N): ", question))?;
    Ok(matches!(answer.to_lowercase().as_str(), "s" | "sim"))
}

/// Elegir un elemento por número de una lista ya filtrada
fn pick<'a, T>(items: &[&'a T], show: impl Fn(&T) -> String) -> io::Result<Option<&'a T>> {
    if items.is_empty() {
        println!("{}", "ℹ️ Nenhum registro encontrado.".bright_blue());
        return Ok(None);
    }
    for (i, item) in items.iter().enumerate() {
        println!("  {}. {}", i + 1, show(item));
    }
    let choice = prompt("Número (Enter = cancelar): ")?;
    if choice.is_empty() {
        return Ok(None);
    }
    match choice.parse::<usize>() {
        Ok(n) if n >= 1 && n <= items.len() => Ok(Some(items[n - 1])),
        _ => {
            println!("{}", "❌ Opção inválida.".bright_red());
            Ok(None)
        }
    }
}

/// Buscar por texto y elegir
fn search_pick<'a, T: Searchable>(
    items: &'a [T],
    label: &str,
    show: impl Fn(&T) -> String,
) -> io::Result<Option<&'a T>> {
    let term = prompt(&format!("🔎 Buscar {} (Enter = todos): ", label))?;
    pick(&filter_by_term(items, &term), show)
}

fn read_odometer(label: &str) -> io::Result<Result<Option<rust_decimal::Decimal>, AppError>> {
    let raw = prompt(label)?;
    Ok(parse_odometer(&raw))
}

fn read_date(label: &str) -> io::Result<Option<NaiveDate>> {
    loop {
        let raw = prompt(label)?;
        if raw.is_empty() {
            return Ok(None);
        }
        match validate_date(&raw) {
            Ok(date) => return Ok(Some(date)),
            Err(_) => println!("{}", "❌ Use o formato AAAA-MM-DD.".bright_red()),
        }
    }
}

/// Perfil de usuario; en edición, Enter conserva el actual
fn read_role(current: Option<UserRole>) -> io::Result<UserRole> {
    let label = match current {
        Some(role) => format!("Perfil (admin/operador, Enter = {}): ", role.as_str()),
        None => "Perfil (admin/operador): ".to_string(),
    };
    loop {
        match UserRole::from_input(&prompt(&label)?, current) {
            Some(role) => return Ok(role),
            None => println!("{}", "❌ Perfil inválido. Digite admin ou operador.".bright_red()),
        }
    }
}

// ---------------------------------------------------------------------------
// Sesión
// ---------------------------------------------------------------------------

/// Devuelve `false` si el operador elige salir
async fn login_menu(state: &AppState) -> Result<bool> {
    let auth = state.auth_service();
    loop {
        title("🔐 ACESSO");
        println!("1. Entrar");
        println!("2. Criar conta");
        println!("0. Sair");
        match prompt("Selecione uma opção: ")?.as_str() {
            "1" => {
                let email = prompt("E-mail: ")?;
                let senha = prompt("Senha: ")?;
                match auth.login(&email, &senha).await {
                    Ok(session) => {
                        println!(
                            "{}",
                            format!("✅ Bem-vindo, {}!", session.user.nome).bright_green()
                        );
                        return Ok(true);
                    }
                    Err(e) => report_error(&e),
                }
            }
            "2" => {
                let request = RegisterRequest {
                    nome: prompt("Nome: ")?,
                    email: prompt("E-mail: ")?,
                    senha: prompt("Senha: ")?,
                };
                match auth.register(request).await {
                    Ok(()) => println!("{}", "✅ Cadastro realizado. Faça login.".bright_green()),
                    Err(e) => report_error(&e),
                }
            }
            "0" => return Ok(false),
            _ => println!("{}", "❌ Opção inválida.".bright_red()),
        }
    }
}

/// Devuelve `false` para terminar el programa, `true` tras cerrar sesión
async fn main_menu(state: &AppState) -> Result<bool> {
    loop {
        title("📋 MENU PRINCIPAL");
        println!("1. 🚪 Pátio (quem está dentro)");
        println!("2. ➡️  Registrar entrada");
        println!("3. ⬅️  Registrar saída");
        println!("4. 🚚 Frota em viagem");
        println!("5. 🛣️  Iniciar viagem");
        println!("6. 🏁 Registrar retorno");
        println!("7. 📊 Relatórios");
        println!("8. 📈 Resumo do dia");
        println!("9. 🗂️  Cadastros");
        println!("10. ✏️  Corrigir / excluir movimentação (admin)");
        println!("11. 👥 Usuários (admin)");
        println!("12. 🔒 Sair da conta");
        println!("0. 🚪 Fechar");

        let outcome = match prompt("Selecione uma opção: ")?.as_str() {
            "1" => show_patio(state).await,
            "2" => register_entry(state).await,
            "3" => register_exit(state).await,
            "4" => show_fleet_out(state).await,
            "5" => start_trip(state).await,
            "6" => register_return(state).await,
            "7" => reports(state).await,
            "8" => summary(state).await,
            "9" => registry_menu(state).await,
            "10" => manage_movements(state).await,
            "11" => users_menu(state).await,
            "12" => {
                state.auth_service().sign_out().await?;
                return Ok(true);
            }
            "0" => return Ok(false),
            _ => {
                println!("{}", "❌ Opção inválida.".bright_red());
                Ok(())
            }
        };

        match outcome {
            Ok(()) => {}
            Err(ConsoleError::App(AppError::Unauthorized(_))) => {
                println!("{}", "🔒 Sessão expirada. Faça login novamente.".bright_red());
                state.auth_service().sign_out().await?;
                return Ok(true);
            }
            Err(ConsoleError::App(e)) => report_error(&e),
            Err(ConsoleError::Io(e)) => return Err(e.into()),
        }
    }
}

/// Error de una acción de menú: de la aplicación (se muestra) o de la terminal (se propaga)
enum ConsoleError {
    App(AppError),
    Io(io::Error),
}

impl From<AppError> for ConsoleError {
    fn from(e: AppError) -> Self {
        ConsoleError::App(e)
    }
}

impl From<io::Error> for ConsoleError {
    fn from(e: io::Error) -> Self {
        ConsoleError::Io(e)
    }
}

type Action = std::result::Result<(), ConsoleError>;

// ---------------------------------------------------------------------------
// Acessos
// ---------------------------------------------------------------------------

fn access_line(m: &AccessMovement) -> String {
    format!(
        "{} | {} | {} | {} | {}",
        format_short(&m.entered_at),
        m.person_label(),
        m.vehicle_label().unwrap_or_else(|| "a pé".to_string()),
        m.labels.sector_name.clone().unwrap_or_default(),
        m.status().label()
    )
}

async fn show_patio(state: &AppState) -> Action {
    title("🚪 PÁTIO");
    let open = state.movement_service().list_patio().await?;
    if open.is_empty() {
        println!("{}", "ℹ️ Ninguém no pátio.".bright_blue());
    }
    for m in &open {
        println!("  {}", access_line(m));
    }
    Ok(())
}

async fn register_entry(state: &AppState) -> Action {
    title("➡️ REGISTRAR ENTRADA");
    let catalogs = state.reference_service().access_catalogs().await?;

    let mut draft = AccessDraft {
        person: search_pick(&catalogs.people, "pessoa", |p| format!("{} ({})", p.nome, p.documento))?.cloned(),
        ..AccessDraft::default()
    };
    if confirm("Entrada com veículo?")? {
        draft.vehicle = search_pick(&catalogs.vehicles, "veículo", |v| v.label())?.cloned();
        draft.entry_odometer = read_odometer("KM de entrada (Enter = sem leitura): ")??;
    }
    draft.sector = search_pick(&catalogs.sectors, "setor", |s| s.nome.clone())?.cloned();
    draft.entry_post = search_pick(&catalogs.posts, "posto", |p| p.nome.clone())?.cloned();
    draft.reason = prompt("Motivo da visita: ")?;
    draft.note = prompt("Observação: ")?;

    state.movement_service().open_access(draft).await?;
    println!("{}", "✅ Entrada registrada.".bright_green());
    Ok(())
}

async fn register_exit(state: &AppState) -> Action {
    title("⬅️ REGISTRAR SAÍDA");
    let service = state.movement_service();
    let open = service.list_patio().await?;
    let refs: Vec<&AccessMovement> = open.iter().collect();
    let Some(movement) = pick(&refs, access_line)? else {
        return Ok(());
    };

    let posts = state.reference_service().list_control_posts().await?;
    let mut draft = AccessExitDraft {
        exit_post: search_pick(&posts, "posto de saída", |p| p.nome.clone())?.cloned(),
        ..AccessExitDraft::default()
    };
    if movement.vehicle_id.is_some() {
        draft.exit_odometer = read_odometer("KM de saída (Enter = sem leitura): ")??;
    }
    draft.note = prompt("Observação: ")?;

    service.close_access(movement, draft).await?;
    println!("{}", "✅ Saída registrada.".bright_green());
    Ok(())
}

// ---------------------------------------------------------------------------
// Frota
// ---------------------------------------------------------------------------

fn fleet_line(m: &FleetMovement) -> String {
    format!(
        "{} | {} | {} | {} | {} km",
        format_short(&m.departed_at),
        m.driver_label(),
        m.vehicle_label(),
        m.destination_label(),
        m.departure_odometer
    )
}

async fn show_fleet_out(state: &AppState) -> Action {
    title("🚚 FROTA EM VIAGEM");
    let out = state.movement_service().list_fleet_out().await?;
    if out.is_empty() {
        println!("{}", "ℹ️ Nenhum veículo em viagem.".bright_blue());
    }
    for m in &out {
        println!("  {}", fleet_line(m));
    }
    Ok(())
}

async fn start_trip(state: &AppState) -> Action {
    title("🛣️ INICIAR VIAGEM");
    let reference = state.reference_service();
    let catalogs = reference.fleet_catalogs().await?;

    let driver = search_pick(&catalogs.drivers, "motorista", |p| p.nome.clone())?.cloned();
    let vehicle = search_pick(&catalogs.vehicles, "veículo da frota", |v| v.label())?.cloned();

    let mut cities = catalogs.cities;
    let mut destination = search_pick(&cities, "cidade de destino", |c| c.label())?.cloned();
    if destination.is_none() && confirm("Cadastrar nova cidade?")? {
        let nome = prompt("Nome da cidade: ")?;
        cities = reference.quick_add_city(&nome).await?;
        destination = cities.iter().find(|c| c.nome.eq_ignore_ascii_case(nome.trim())).cloned();
    }

    let draft = FleetDraft {
        driver,
        vehicle,
        destination_city: destination,
        departure_post: search_pick(&catalogs.posts, "posto de saída", |p| p.nome.clone())?.cloned(),
        departure_odometer: read_odometer("KM de saída: ")??,
        reason: prompt("Motivo: ")?,
        note: prompt("Observação: ")?,
    };

    state.movement_service().open_fleet(draft).await?;
    println!("{}", "✅ Viagem iniciada.".bright_green());
    Ok(())
}

async fn register_return(state: &AppState) -> Action {
    title("🏁 REGISTRAR RETORNO");
    let service = state.movement_service();
    let out = service.list_fleet_out().await?;
    let refs: Vec<&FleetMovement> = out.iter().collect();
    let Some(movement) = pick(&refs, fleet_line)? else {
        return Ok(());
    };

    let posts = state.reference_service().list_control_posts().await?;
    let arrival_post = search_pick(&posts, "posto de chegada", |p| p.nome.clone())?.cloned();

    // Repetir hasta que la lectura sea válida o el operador cancele
    loop {
        let km = read_odometer(&format!(
            "KM de chegada (maior que {}; Enter = cancelar): ",
            movement.departure_odometer
        ))??;
        if km.is_none() {
            return Ok(());
        }
        let draft = FleetReturnDraft {
            arrival_post: arrival_post.clone(),
            arrival_odometer: km,
            note: String::new(),
        };
        match service.close_fleet(movement, draft).await {
            Ok(()) => {
                println!("{}", "✅ Retorno registrado.".bright_green());
                return Ok(());
            }
            Err(e @ AppError::Validation { minimum: Some(_), .. }) => report_error(&e),
            Err(e) => return Err(e.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Relatórios y resumen
// ---------------------------------------------------------------------------

fn choose_kind() -> io::Result<Option<MovementKind>> {
    println!("1. Acessos");
    println!("2. Frota");
    Ok(match prompt("Tipo: ")?.as_str() {
        "1" => Some(MovementKind::Access),
        "2" => Some(MovementKind::Fleet),
        _ => None,
    })
}

async fn reports(state: &AppState) -> Action {
    title("📊 RELATÓRIOS");
    let Some(kind) = choose_kind()? else {
        return Ok(());
    };
    let filters = ReportFilters {
        date_from: read_date("Data inicial AAAA-MM-DD (Enter = início): ")?,
        date_to: read_date("Data final AAAA-MM-DD (Enter = hoje): ")?,
        person_name: Some(prompt("Nome contém (Enter = todos): ")?),
        plate_prefix: Some(prompt("Placa começa com (Enter = todas): ")?),
    };
    let report = state.report_service().list_movements(kind, &filters).await?;
    println!();
    println!("{}", report.render());
    Ok(())
}

async fn summary(state: &AppState) -> Action {
    title("📈 RESUMO");
    let summary = state.report_service().summary().await?;
    println!("Veículos no pátio: {}", summary.veiculos_no_patio.to_string().bright_cyan());
    println!("Frota em ação:     {}", summary.frota_em_acao.to_string().bright_cyan());
    println!("Entradas hoje:     {}", summary.entradas_hoje.to_string().bright_cyan());
    println!("Saídas hoje:       {}", summary.saidas_hoje.to_string().bright_cyan());
    Ok(())
}

// ---------------------------------------------------------------------------
// Corrección y exclusión
// ---------------------------------------------------------------------------

/// Lee un instante local; Enter conserva el valor actual
fn edited_instant(
    label: &str,
    current: Option<&chrono::DateTime<chrono::Utc>>,
) -> std::result::Result<Option<chrono::DateTime<chrono::Utc>>, ConsoleError> {
    let shown = current.map(display_local).unwrap_or_else(|| "-".to_string());
    let raw = prompt(&format!("{} [{}] (AAAA-MM-DDTHH:MM, Enter = manter): ", label, shown))?;
    if raw.is_empty() {
        return Ok(None);
    }
    Ok(Some(parse_local(&raw)?))
}

fn edited_odometer(
    label: &str,
    current: Option<rust_decimal::Decimal>,
) -> std::result::Result<Option<rust_decimal::Decimal>, ConsoleError> {
    let shown = current.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string());
    let value = read_odometer(&format!("{} [{}] (Enter = manter): ", label, shown))??;
    Ok(value.or(current))
}

async fn manage_movements(state: &AppState) -> Action {
    title("✏️ CORRIGIR / EXCLUIR");
    state.authorization().require_admin("manage movements").await?;
    let Some(kind) = choose_kind()? else {
        return Ok(());
    };
    let report = state
        .report_service()
        .list_movements(kind, &ReportFilters::default())
        .await?;
    let service = state.movement_service();

    match report.rows {
        ReportRows::Access(rows) => {
            let refs: Vec<&AccessMovement> = rows.iter().collect();
            let Some(movement) = pick(&refs, access_line)? else {
                return Ok(());
            };
            if confirm("Excluir este registro?")? {
                return delete_movement(state, MovementRef { kind, id: movement.id }).await;
            }
            let mut correction = AccessCorrection::from(movement);
            correction.km_entrada = edited_odometer("KM entrada", correction.km_entrada)?;
            correction.km_saida = edited_odometer("KM saída", correction.km_saida)?;
            correction.data_hora_entrada = edited_instant("Entrada", Some(&movement.entered_at))?;
            let exit_at = movement.exit().and_then(|e| e.at);
            correction.data_hora_saida = edited_instant("Saída", exit_at.as_ref())?;
            service.correct_access(movement, correction).await?;
        }
        ReportRows::Fleet(rows) => {
            let refs: Vec<&FleetMovement> = rows.iter().collect();
            let Some(movement) = pick(&refs, fleet_line)? else {
                return Ok(());
            };
            if confirm("Excluir este registro?")? {
                return delete_movement(state, MovementRef { kind, id: movement.id }).await;
            }
            let mut correction = FleetCorrection::from(movement);
            if let Some(km) = edited_odometer("KM saída", Some(correction.km_entrada))? {
                correction.km_entrada = km;
            }
            correction.km_saida = edited_odometer("KM chegada", correction.km_saida)?;
            correction.data_hora_entrada = edited_instant("Saída", Some(&movement.departed_at))?;
            let arrived_at = movement.arrival().and_then(|a| a.at);
            correction.data_hora_saida = edited_instant("Chegada", arrived_at.as_ref())?;
            if let Some(duration) = movement.duration() {
                println!("Duração registrada: {}", format_duration(&duration));
            }
            service.correct_fleet(movement, correction).await?;
        }
    }
    println!("{}", "✅ Alterações salvas.".bright_green());
    Ok(())
}

async fn delete_movement(state: &AppState, target: MovementRef) -> Action {
    let service = state.movement_service();
    let pending = service.request_deletion(target).await?;
    if !confirm(&format!("⚠️ {}", pending.warning()))? {
        println!("{}", "ℹ️ Exclusão cancelada.".bright_blue());
        return Ok(());
    }
    service.confirm_deletion(pending).await?;
    println!("{}", "🗑️ Registro excluído.".bright_green());
    Ok(())
}

// ---------------------------------------------------------------------------
// Cadastros
// ---------------------------------------------------------------------------

async fn registry_menu(state: &AppState) -> Action {
    title("🗂️ CADASTROS");
    println!("1. Pessoas");
    println!("2. Veículos");
    println!("3. Setores");
    println!("4. Postos de controle");
    match prompt("Selecione: ")?.as_str() {
        "1" => people(state).await,
        "2" => vehicles(state).await,
        "3" => named_entities(state, NamedKind::Sector).await,
        "4" => named_entities(state, NamedKind::Post).await,
        _ => Ok(()),
    }
}

fn crud_action() -> io::Result<String> {
    println!("1. Novo  2. Editar  3. Excluir");
    prompt("Ação: ")
}

async fn people(state: &AppState) -> Action {
    let reference = state.reference_service();
    let people = reference.list_people().await?;
    let action = crud_action()?;
    let selected = match action.as_str() {
        "2" | "3" => match search_pick(&people, "pessoa", |p| format!("{} ({})", p.nome, p.documento))? {
            Some(p) => Some(p.clone()),
            None => return Ok(()),
        },
        "1" => None,
        _ => return Ok(()),
    };

    if action == "3" {
        if let Some(person) = selected {
            if confirm(&format!("Excluir {}?", person.nome))? {
                reference.delete_person(person.id).await?;
                println!("{}", "🗑️ Pessoa excluída.".bright_green());
            }
        }
        return Ok(());
    }

    let types = reference.list_person_types().await?;
    let Some(tipo) = search_pick(&types, "tipo", |t| t.nome.clone())? else {
        return Ok(());
    };
    let telefone = prompt("Telefone (opcional): ")?;
    let request = PersonRequest {
        nome: prompt("Nome: ")?,
        documento: prompt("Documento: ")?,
        telefone: Some(telefone),
        tipo_pessoa_id: tipo.id,
    };
    reference.save_person(selected.map(|p| p.id), request).await?;
    println!("{}", "✅ Pessoa salva.".bright_green());
    Ok(())
}

async fn vehicles(state: &AppState) -> Action {
    let reference = state.reference_service();
    let vehicles = reference.list_vehicles(VehicleFilter::all()).await?;
    let action = crud_action()?;
    let selected = match action.as_str() {
        "2" | "3" => match search_pick(&vehicles, "veículo", |v| v.label())? {
            Some(v) => Some(v.clone()),
            None => return Ok(()),
        },
        "1" => None,
        _ => return Ok(()),
    };

    if action == "3" {
        if let Some(vehicle) = selected {
            if confirm(&format!("Excluir {}?", vehicle.display_plate()))? {
                reference.delete_vehicle(vehicle.id).await?;
                println!("{}", "🗑️ Veículo excluído.".bright_green());
            }
        }
        return Ok(());
    }

    let cor = prompt("Cor (opcional): ")?;
    let request = VehicleRequest {
        placa: prompt("Placa: ")?,
        modelo: prompt("Modelo: ")?,
        cor: Some(cor).filter(|c| !c.is_empty()),
        veiculo_de_frota_propria: confirm("Veículo da frota própria?")?,
    };
    reference.save_vehicle(selected.map(|v| v.id), request).await?;
    println!("{}", "✅ Veículo salvo.".bright_green());
    Ok(())
}

#[derive(Clone, Copy)]
enum NamedKind {
    Sector,
    Post,
}

async fn named_entities(state: &AppState, kind: NamedKind) -> Action {
    let reference = state.reference_service();
    // (id, nome) de setores o postos
    let items: Vec<(i64, String)> = match kind {
        NamedKind::Sector => reference
            .list_sectors()
            .await?
            .into_iter()
            .map(|s| (s.id, s.nome))
            .collect(),
        NamedKind::Post => reference
            .list_control_posts()
            .await?
            .into_iter()
            .map(|p| (p.id, p.nome))
            .collect(),
    };

    let action = crud_action()?;
    let selected = match action.as_str() {
        "2" | "3" => {
            let refs: Vec<&(i64, String)> = items.iter().collect();
            match pick(&refs, |(_, nome)| nome.clone())? {
                Some((id, _)) => Some(*id),
                None => return Ok(()),
            }
        }
        "1" => None,
        _ => return Ok(()),
    };

    if action == "3" {
        if let Some(id) = selected {
            if confirm("Confirmar exclusão?")? {
                match kind {
                    NamedKind::Sector => reference.delete_sector(id).await?,
                    NamedKind::Post => reference.delete_control_post(id).await?,
                }
                println!("{}", "🗑️ Registro excluído.".bright_green());
            }
        }
        return Ok(());
    }

    let nome = prompt("Nome: ")?;
    match kind {
        NamedKind::Sector => reference.save_sector(selected, &nome).await?,
        NamedKind::Post => reference.save_control_post(selected, &nome).await?,
    }
    println!("{}", "✅ Registro salvo.".bright_green());
    Ok(())
}

// ---------------------------------------------------------------------------
// Usuários
// ---------------------------------------------------------------------------

async fn users_menu(state: &AppState) -> Action {
    title("👥 USUÁRIOS");
    let service = state.user_service();
    let users = service.list().await?;
    let action = crud_action()?;
    let selected = match action.as_str() {
        "2" | "3" => match search_pick(&users, "usuário", |u| {
            format!("{} <{}> {}", u.nome, u.email, u.tipo_de_usuario.label())
        })? {
            Some(u) => Some(u.clone()),
            None => return Ok(()),
        },
        "1" => None,
        _ => return Ok(()),
    };

    if action == "3" {
        if let Some(user) = selected {
            if confirm(&format!("Excluir {}?", user.email))? {
                service.delete(user.id).await?;
                println!("{}", "🗑️ Usuário excluído.".bright_green());
            }
        }
        return Ok(());
    }

    let nome = prompt("Nome: ")?;
    let email = prompt("E-mail: ")?;
    let senha = prompt(if selected.is_some() {
        "Senha (Enter = manter atual): "
    } else {
        "Senha: "
    })?;
    let role = read_role(selected.as_ref().map(|u| u.tipo_de_usuario))?;
    let request = UserRequest {
        nome,
        email,
        senha: Some(senha),
        tipo_de_usuario: role,
        ativo: selected.as_ref().map_or(true, |u| u.ativo),
    };

    match selected {
        Some(user) => service.update(user.id, request).await?,
        None => service.create(request).await?,
    }
    println!("{}", "✅ Usuário salvo.".bright_green());
    Ok(())
}
