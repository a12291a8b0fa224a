//! Almacenamiento
//!
//! Este módulo contiene el contrato clave-valor y sus backends (Redis y memoria).

pub mod cache_config;
pub mod memory_store;
pub mod redis_client;
pub mod store;

pub use cache_config::{CacheConfig, StoreBackend};
pub use memory_store::MemoryStore;
pub use redis_client::RedisClient;
pub use store::{IndexKey, ItemKey, KeyValueStore};
