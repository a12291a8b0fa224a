use anyhow::Result;
use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};
use tracing::{debug, error, info};

use super::store::{IndexKey, ItemKey, KeyValueStore};
use super::CacheConfig;
use crate::utils::errors::StoreError;

/// Cliente Redis con connection pooling y operaciones async
#[derive(Clone)]
pub struct RedisClient {
    manager: ConnectionManager,
    config: CacheConfig,
}

impl RedisClient {
    /// Crear nuevo cliente Redis
    pub async fn new(config: CacheConfig) -> Result<Self> {
        info!("🔗 Conectando a Redis: {}", config.redis_url);

        let client = redis::Client::open(config.redis_url.clone())?;
        let manager = ConnectionManager::new(client).await?;

        // Test de conexión usando un comando simple
        let mut conn = manager.clone();
        let _: () = redis::cmd("PING").query_async(&mut conn).await?;

        info!("✅ Redis conectado exitosamente");

        Ok(Self { manager, config })
    }

    /// Generar clave con prefijo
    fn make_key(&self, prefix: &str, identifier: &str) -> String {
        format!("{}:{}:{}", self.config.key_prefix, prefix, identifier)
    }

    /// Clave del ítem (PK y SK concatenados)
    pub fn item_key(&self, key: &ItemKey) -> String {
        self.make_key("item", &format!("{}:{}", key.pk, key.sk))
    }

    /// Clave del set que materializa un índice secundario
    pub fn index_key(&self, index: &IndexKey) -> String {
        self.make_key("idx", &format!("{}:{}", index.index, index.value))
    }
}

#[async_trait]
impl KeyValueStore for RedisClient {
    async fn get_item(&self, key: &ItemKey) -> Result<Option<String>, StoreError> {
        let mut conn = self.manager.clone();
        let redis_key = self.item_key(key);

        let value: Option<String> = conn.get(&redis_key).await.map_err(|e| {
            error!("❌ Error leyendo ítem {}: {}", redis_key, e);
            StoreError::from(e)
        })?;

        debug!(
            "📥 GET {} ({})",
            redis_key,
            if value.is_some() { "hit" } else { "miss" }
        );
        Ok(value)
    }

    async fn put_item(&self, key: &ItemKey, value: &str) -> Result<(), StoreError> {
        let mut conn = self.manager.clone();
        let redis_key = self.item_key(key);

        conn.set::<_, _, ()>(&redis_key, value).await.map_err(|e| {
            error!("❌ Error guardando ítem {}: {}", redis_key, e);
            StoreError::from(e)
        })?;

        debug!("💾 SET {}", redis_key);
        Ok(())
    }

    async fn delete_item(&self, key: &ItemKey) -> Result<(), StoreError> {
        let mut conn = self.manager.clone();
        let redis_key = self.item_key(key);

        let count: i64 = conn.del(&redis_key).await?;
        debug!("🗑️ DEL {} (eliminados: {})", redis_key, count);
        Ok(())
    }

    async fn batch_get(&self, keys: &[ItemKey]) -> Result<Vec<Option<String>>, StoreError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.manager.clone();
        let redis_keys: Vec<String> = keys.iter().map(|k| self.item_key(k)).collect();

        // MGET explícito: con una sola clave GET devolvería un escalar
        let values: Vec<Option<String>> = redis::cmd("MGET")
            .arg(&redis_keys)
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                error!("❌ Error en MGET de {} claves: {}", redis_keys.len(), e);
                StoreError::from(e)
            })?;

        debug!(
            "📦 MGET {} claves, {} encontradas",
            redis_keys.len(),
            values.iter().filter(|v| v.is_some()).count()
        );
        Ok(values)
    }

    async fn index_add(&self, index: &IndexKey, member: &str) -> Result<(), StoreError> {
        let mut conn = self.manager.clone();
        conn.sadd::<_, _, ()>(self.index_key(index), member).await?;
        Ok(())
    }

    async fn index_remove(&self, index: &IndexKey, member: &str) -> Result<(), StoreError> {
        let mut conn = self.manager.clone();
        conn.srem::<_, _, ()>(self.index_key(index), member).await?;
        Ok(())
    }

    async fn index_members(&self, index: &IndexKey) -> Result<Vec<String>, StoreError> {
        let mut conn = self.manager.clone();
        let mut members: Vec<String> = conn.smembers(self.index_key(index)).await?;
        // SMEMBERS no garantiza orden
        members.sort();
        Ok(members)
    }
}
