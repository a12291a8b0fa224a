//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.

use anyhow::{anyhow, Context, Result};
use std::env;
use std::str::FromStr;

use super::query::{NhtsaConfig, QueryServiceConfig};
use crate::cache::CacheConfig;

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub cors_origins: Vec<String>,
    pub log_level: Option<String>,
    pub http_timeout_secs: u64,
    pub store: CacheConfig,
    pub nhtsa: NhtsaConfig,
    pub query: QueryServiceConfig,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            port: 3000,
            host: "0.0.0.0".to_string(),
            cors_origins: Vec::new(),
            log_level: None,
            http_timeout_secs: 30,
            store: CacheConfig::default(),
            nhtsa: NhtsaConfig::default(),
            query: QueryServiceConfig::default(),
        }
    }
}

impl EnvironmentConfig {
    /// Cargar desde las variables de entorno del proceso
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Cargar usando una función de búsqueda arbitraria
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let store = CacheConfig {
            backend: parse_or(&var, "STORE_BACKEND", defaults.store.backend)?,
            redis_url: var("REDIS_URL").unwrap_or(defaults.store.redis_url),
            key_prefix: var("STORE_KEY_PREFIX").unwrap_or(defaults.store.key_prefix),
        };

        let nhtsa = NhtsaConfig {
            base_url: var("NHTSA_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.nhtsa.base_url),
            dialect: parse_or(&var, "NHTSA_DIALECT", defaults.nhtsa.dialect)?,
        };

        let query = QueryServiceConfig {
            gateway_url: var("QUERY_GATEWAY_URL").map(|url| url.trim_end_matches('/').to_string()),
            workgroup: var("QUERY_WORKGROUP").unwrap_or(defaults.query.workgroup),
            database: var("QUERY_DATABASE").unwrap_or(defaults.query.database),
            output_location: var("QUERY_OUTPUT_LOCATION").unwrap_or(defaults.query.output_location),
            catalog_schema: var("CATALOG_SCHEMA").unwrap_or(defaults.query.catalog_schema),
            poll_interval_ms: parse_or(&var, "QUERY_POLL_INTERVAL_MS", defaults.query.poll_interval_ms)?,
            max_poll_attempts: parse_or(&var, "QUERY_MAX_POLL_ATTEMPTS", defaults.query.max_poll_attempts)?,
        };

        if query.max_poll_attempts == 0 {
            return Err(anyhow!("QUERY_MAX_POLL_ATTEMPTS must be at least 1"));
        }

        Ok(Self {
            environment: var("ENVIRONMENT").unwrap_or(defaults.environment),
            port: parse_or(&var, "PORT", defaults.port)?,
            host: var("HOST").unwrap_or(defaults.host),
            cors_origins: var("CORS_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            log_level: var("LOG_LEVEL"),
            http_timeout_secs: parse_or(&var, "HTTP_TIMEOUT_SECS", defaults.http_timeout_secs)?,
            store,
            nhtsa,
            query,
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Nivel de log efectivo
    pub fn effective_log_level(&self) -> String {
        self.log_level.clone().unwrap_or_else(|| {
            if self.is_development() {
                "debug".to_string()
            } else {
                "info".to_string()
            }
        })
    }

    /// Dirección de escucha del servidor
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T, V>(var: &V, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    V: Fn(&str) -> Option<String>,
{
    match var(name) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("{}", e))
            .with_context(|| format!("invalid value '{}' for {}", raw, name)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::StoreBackend;
    use crate::models::DecodeDialect;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = EnvironmentConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.store.backend, StoreBackend::Redis);
        assert_eq!(config.store.key_prefix, "unit_service");
        assert_eq!(config.nhtsa.dialect, DecodeDialect::Labeled);
        assert_eq!(config.query.poll_interval_ms, 500);
        assert_eq!(config.query.max_poll_attempts, 60);
        assert_eq!(config.query.catalog_schema, "vcdb");
        assert!(config.query.gateway_url.is_none());
        assert_eq!(config.effective_log_level(), "debug");
    }

    #[test]
    fn test_overrides() {
        let config = EnvironmentConfig::from_lookup(lookup(&[
            ("ENVIRONMENT", "production"),
            ("PORT", "8080"),
            ("STORE_BACKEND", "memory"),
            ("NHTSA_DIALECT", "compact"),
            ("QUERY_GATEWAY_URL", "http://gateway:9000/"),
            ("CORS_ORIGINS", "http://a.test, http://b.test"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.nhtsa.dialect, DecodeDialect::Compact);
        assert_eq!(config.query.gateway_url.as_deref(), Some("http://gateway:9000"));
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(config.effective_log_level(), "info");
    }

    #[test]
    fn test_invalid_number_is_an_error() {
        let err = EnvironmentConfig::from_lookup(lookup(&[("QUERY_POLL_INTERVAL_MS", "fast")]))
            .unwrap_err();
        assert!(format!("{:#}", err).contains("QUERY_POLL_INTERVAL_MS"));
    }
}
