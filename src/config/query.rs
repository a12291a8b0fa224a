//! Configuración de los servicios externos (consultas de catálogo y VIN)

use serde::{Deserialize, Serialize};

use crate::models::DecodeDialect;

/// Configuración del servicio de consultas asíncronas
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryServiceConfig {
    /// Endpoint del gateway; sin él la resolución de catálogo queda deshabilitada
    pub gateway_url: Option<String>,
    pub workgroup: String,
    pub database: String,
    pub output_location: String,
    /// Prefijo de esquema de las tablas de catálogo en el SQL generado
    pub catalog_schema: String,
    pub poll_interval_ms: u64,
    pub max_poll_attempts: u32,
}

impl Default for QueryServiceConfig {
    fn default() -> Self {
        Self {
            gateway_url: None,
            workgroup: "primary".to_string(),
            database: "vcdb".to_string(),
            output_location: String::new(),
            catalog_schema: "vcdb".to_string(),
            poll_interval_ms: 500,
            max_poll_attempts: 60,
        }
    }
}

/// Configuración del API de decodificación de VIN
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NhtsaConfig {
    pub base_url: String,
    pub dialect: DecodeDialect,
}

impl Default for NhtsaConfig {
    fn default() -> Self {
        Self {
            base_url: "https://vpic.nhtsa.dot.gov/api".to_string(),
            dialect: DecodeDialect::Labeled,
        }
    }
}
