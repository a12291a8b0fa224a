//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use crate::cache::{KeyValueStore, MemoryStore, RedisClient, StoreBackend};
use crate::clients::{
    DisabledQueryService, HttpQueryService, NhtsaClient, QueryExecutionClient, QueryService,
    VinDecoder,
};
use crate::config::environment::EnvironmentConfig;
use crate::repositories::{UnitRepository, VehicleRepository};
use crate::services::{PartsLookupService, UnitService, VehicleResolver};

#[derive(Clone)]
pub struct AppState {
    pub config: EnvironmentConfig,
    pub units: Arc<UnitService>,
    pub parts: Arc<PartsLookupService>,
}

impl AppState {
    /// Conecta el almacén y los clientes externos según la configuración
    pub async fn build(config: EnvironmentConfig) -> Result<Self> {
        let store: Arc<dyn KeyValueStore> = match config.store.backend {
            StoreBackend::Redis => Arc::new(RedisClient::new(config.store.clone()).await?),
            StoreBackend::Memory => {
                warn!("⚠️ Usando almacén en memoria: los datos no sobreviven al reinicio");
                Arc::new(MemoryStore::new())
            }
        };

        let decoder: Arc<dyn VinDecoder> =
            Arc::new(NhtsaClient::new(&config.nhtsa, config.http_timeout_secs)?);

        let queries: Arc<dyn QueryService> = match &config.query.gateway_url {
            Some(url) => Arc::new(HttpQueryService::new(url, config.http_timeout_secs)?),
            None => {
                warn!("⚠️ QUERY_GATEWAY_URL no configurada: la resolución de catálogo queda deshabilitada");
                Arc::new(DisabledQueryService)
            }
        };

        Ok(Self::from_parts(config, store, decoder, queries))
    }

    /// Construye el estado a partir de colaboradores ya creados
    pub fn from_parts(
        config: EnvironmentConfig,
        store: Arc<dyn KeyValueStore>,
        decoder: Arc<dyn VinDecoder>,
        queries: Arc<dyn QueryService>,
    ) -> Self {
        let executor = QueryExecutionClient::new(queries, &config.query);
        let resolver = VehicleResolver::new(executor.clone(), config.query.catalog_schema.clone());
        let parts = PartsLookupService::new(executor, config.query.catalog_schema.clone());

        let units = UnitService::new(
            UnitRepository::new(store.clone()),
            VehicleRepository::new(store),
            decoder,
            resolver,
        );

        info!("✅ Servicios de unidades inicializados");

        Self {
            config,
            units: Arc::new(units),
            parts: Arc::new(parts),
        }
    }
}
