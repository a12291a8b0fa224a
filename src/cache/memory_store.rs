//! Almacén en memoria
//!
//! Backend de desarrollo y de tests. Cuenta las llamadas de lote para poder
//! verificar el troceado de las lecturas múltiples.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use super::store::{IndexKey, ItemKey, KeyValueStore};
use crate::utils::errors::StoreError;

#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RwLock<HashMap<ItemKey, String>>,
    indexes: RwLock<BTreeMap<IndexKey, BTreeSet<String>>>,
    batch_get_calls: AtomicUsize,
    put_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Número de peticiones `batch_get` recibidas
    pub fn batch_get_calls(&self) -> usize {
        self.batch_get_calls.load(Ordering::SeqCst)
    }

    /// Número de escrituras `put_item` recibidas
    pub fn put_calls(&self) -> usize {
        self.put_calls.load(Ordering::SeqCst)
    }

    /// Número de ítems almacenados cuya PK empieza por `prefix`
    pub fn count_with_prefix(&self, prefix: &str) -> usize {
        self.items
            .read()
            .map(|items| items.keys().filter(|k| k.pk.starts_with(prefix)).count())
            .unwrap_or(0)
    }

    fn poisoned() -> StoreError {
        StoreError::Backend("memory store lock poisoned".to_string())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_item(&self, key: &ItemKey) -> Result<Option<String>, StoreError> {
        let items = self.items.read().map_err(|_| Self::poisoned())?;
        Ok(items.get(key).cloned())
    }

    async fn put_item(&self, key: &ItemKey, value: &str) -> Result<(), StoreError> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        let mut items = self.items.write().map_err(|_| Self::poisoned())?;
        items.insert(key.clone(), value.to_string());
        Ok(())
    }

    async fn delete_item(&self, key: &ItemKey) -> Result<(), StoreError> {
        let mut items = self.items.write().map_err(|_| Self::poisoned())?;
        items.remove(key);
        Ok(())
    }

    async fn batch_get(&self, keys: &[ItemKey]) -> Result<Vec<Option<String>>, StoreError> {
        self.batch_get_calls.fetch_add(1, Ordering::SeqCst);
        let items = self.items.read().map_err(|_| Self::poisoned())?;
        Ok(keys.iter().map(|k| items.get(k).cloned()).collect())
    }

    async fn index_add(&self, index: &IndexKey, member: &str) -> Result<(), StoreError> {
        let mut indexes = self.indexes.write().map_err(|_| Self::poisoned())?;
        indexes
            .entry(index.clone())
            .or_default()
            .insert(member.to_string());
        Ok(())
    }

    async fn index_remove(&self, index: &IndexKey, member: &str) -> Result<(), StoreError> {
        let mut indexes = self.indexes.write().map_err(|_| Self::poisoned())?;
        if let Some(members) = indexes.get_mut(index) {
            members.remove(member);
            if members.is_empty() {
                indexes.remove(index);
            }
        }
        Ok(())
    }

    async fn index_members(&self, index: &IndexKey) -> Result<Vec<String>, StoreError> {
        let indexes = self.indexes.read().map_err(|_| Self::poisoned())?;
        Ok(indexes
            .get(index)
            .map(|members| members.iter().cloned().collect())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_replaces_and_batch_get_aligns() {
        let store = MemoryStore::new();
        let a = ItemKey::vehicle("A");
        let b = ItemKey::vehicle("B");

        store.put_item(&a, "1").await.unwrap();
        store.put_item(&a, "2").await.unwrap();

        let values = store.batch_get(&[a.clone(), b]).await.unwrap();
        assert_eq!(values, vec![Some("2".to_string()), None]);
        assert_eq!(store.batch_get_calls(), 1);
        assert_eq!(store.count_with_prefix("VIN#"), 1);

        store.delete_item(&a).await.unwrap();
        assert_eq!(store.get_item(&a).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_index_membership() {
        let store = MemoryStore::new();
        let idx = IndexKey::new("vin-index", "VIN1");

        store.index_add(&idx, "unt_b").await.unwrap();
        store.index_add(&idx, "unt_a").await.unwrap();
        store.index_add(&idx, "unt_a").await.unwrap();
        assert_eq!(store.index_members(&idx).await.unwrap(), vec!["unt_a", "unt_b"]);

        store.index_remove(&idx, "unt_a").await.unwrap();
        store.index_remove(&idx, "unt_b").await.unwrap();
        assert!(store.index_members(&idx).await.unwrap().is_empty());
    }
}
