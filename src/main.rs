use anyhow::Result;
use dotenvy::dotenv;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use unit_service::config::environment::EnvironmentConfig;
use unit_service::{create_app_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    let config = EnvironmentConfig::from_env()?;

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(config.effective_log_level()))
        .init();

    info!("🚗 Unit Service - Vehicle Resolution & Enrichment");
    info!("================================================");
    info!("🌍 Entorno: {}", config.environment);

    let addr: SocketAddr = config.bind_address().parse()?;

    let app_state = match AppState::build(config).await {
        Ok(state) => state,
        Err(e) => {
            error!("❌ Error inicializando servicios: {:#}", e);
            return Err(e);
        }
    };

    let app = create_app_router(app_state);

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET    /health");
    info!("   GET    /units?customerId=&vin=");
    info!("   POST   /units");
    info!("   POST   /units/vin");
    info!("   GET    /units/vin/:vin");
    info!("   GET    /units/:unit_id");
    info!("   PUT    /units/:unit_id");
    info!("   DELETE /units/:unit_id");
    info!("   POST   /units/:unit_id/vehicle/resolve");
    info!("   GET    /units/:unit_id/parts?category=");
    info!("   GET    /units/:unit_id/categories");
    info!("   GET    /parts/categories");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Error del servidor: {}", e);
        return Err(e.into());
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
