mod console;

use anyhow::Result;
use dotenvy::dotenv;
use tracing::{error, info};

use portaria::config::environment::EnvironmentConfig;
use portaria::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    let config = match EnvironmentConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Configuración inválida: {}", e);
            return Err(anyhow::anyhow!("Configuración inválida: {}", e));
        }
    };

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(config.tracing_level())
        .with_target(false)
        .init();

    info!("🚧 Portaria - Controle de Acesso e Frota");
    info!("========================================");
    info!("🌍 Entorno: {}", config.environment);

    let state = AppState::new(config)?;
    if let Err(e) = console::run(&state).await {
        error!("❌ Error en la consola: {}", e);
        return Err(e);
    }

    Ok(())
}
