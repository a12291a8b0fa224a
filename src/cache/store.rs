//! Contrato del almacén clave-valor
//!
//! Los repositorios sólo dependen de estas formas de operación: get/put/delete
//! puntual por clave compuesta, consulta por índice secundario y multi-get
//! por lotes. No conocen el API concreto del backend.

use async_trait::async_trait;
use std::fmt;

use crate::utils::errors::StoreError;

/// Clave compuesta (partition key, sort key)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemKey {
    pub pk: String,
    pub sk: String,
}

impl ItemKey {
    pub fn new(pk: impl Into<String>, sk: impl Into<String>) -> Self {
        Self {
            pk: pk.into(),
            sk: sk.into(),
        }
    }

    /// Clave de unidad: PK = SK = "UNT#" + unitId
    pub fn unit(unit_id: &str) -> Self {
        let key = format!("UNT#{}", unit_id);
        Self::new(key.clone(), key)
    }

    /// Clave de vehículo: PK = SK = "VIN#" + vin
    pub fn vehicle(vin: &str) -> Self {
        let key = format!("VIN#{}", vin);
        Self::new(key.clone(), key)
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.pk, self.sk)
    }
}

/// Entrada de índice secundario: nombre del índice + valor indexado
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IndexKey {
    pub index: &'static str,
    pub value: String,
}

impl IndexKey {
    pub fn new(index: &'static str, value: impl Into<String>) -> Self {
        Self {
            index,
            value: value.into(),
        }
    }
}

impl fmt::Display for IndexKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.index, self.value)
    }
}

/// Operaciones del almacén. Los valores son documentos JSON serializados.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_item(&self, key: &ItemKey) -> Result<Option<String>, StoreError>;

    /// Escritura completa; reemplaza cualquier ítem existente con la misma clave
    async fn put_item(&self, key: &ItemKey, value: &str) -> Result<(), StoreError>;

    async fn delete_item(&self, key: &ItemKey) -> Result<(), StoreError>;

    /// Multi-get de una sola petición. El resultado está alineado con `keys`;
    /// las claves sin ítem devuelven `None`. El llamador respeta el límite de lote.
    async fn batch_get(&self, keys: &[ItemKey]) -> Result<Vec<Option<String>>, StoreError>;

    async fn index_add(&self, index: &IndexKey, member: &str) -> Result<(), StoreError>;

    async fn index_remove(&self, index: &IndexKey, member: &str) -> Result<(), StoreError>;

    /// Miembros (IDs) registrados bajo un valor de índice
    async fn index_members(&self, index: &IndexKey) -> Result<Vec<String>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persisted_key_scheme() {
        let key = ItemKey::unit("unt_abc1234");
        assert_eq!(key.pk, "UNT#unt_abc1234");
        assert_eq!(key.sk, "UNT#unt_abc1234");

        let key = ItemKey::vehicle("1HGCM82633A004352");
        assert_eq!(key.pk, "VIN#1HGCM82633A004352");
        assert_eq!(key.pk, key.sk);
    }
}
