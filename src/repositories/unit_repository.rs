use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use super::vehicle_repository::BATCH_SIZE;
use crate::cache::{IndexKey, ItemKey, KeyValueStore};
use crate::models::Unit;
use crate::utils::errors::{AppError, StoreError};

pub const CUSTOMER_INDEX: &str = "customerId-index";
pub const CUSTOMER_VIN_INDEX: &str = "customerId-vin-index";
pub const VIN_INDEX: &str = "vin-index";

/// Ítem persistido: clave `UNT#` más los campos de asociación, nada más
#[derive(Debug, Serialize, Deserialize)]
struct UnitItem {
    #[serde(rename = "PK")]
    pk: String,
    #[serde(rename = "SK")]
    sk: String,
    #[serde(flatten)]
    unit: Unit,
}

impl UnitItem {
    fn from_unit(unit: &Unit) -> Self {
        let key = ItemKey::unit(&unit.unit_id);
        Self {
            pk: key.pk,
            sk: key.sk,
            unit: unit.clone(),
        }
    }
}

fn parse_unit(raw: &str) -> Result<Unit, StoreError> {
    Ok(serde_json::from_str::<UnitItem>(raw)?.unit)
}

/// Entradas de índice secundario de una unidad
fn index_entries(unit: &Unit) -> [IndexKey; 3] {
    [
        IndexKey::new(CUSTOMER_INDEX, unit.customer_id.clone()),
        IndexKey::new(
            CUSTOMER_VIN_INDEX,
            format!("{}#{}", unit.customer_id, unit.vin),
        ),
        IndexKey::new(VIN_INDEX, unit.vin.clone()),
    ]
}

/// Repositorio de unidades (asociaciones cliente ↔ VIN)
#[derive(Clone)]
pub struct UnitRepository {
    store: Arc<dyn KeyValueStore>,
}

impl UnitRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Guarda la unidad y mueve sus entradas de índice si cambió cliente o VIN
    pub async fn save_unit(&self, unit: &Unit) -> Result<(), AppError> {
        let key = ItemKey::unit(&unit.unit_id);

        if let Some(previous) = self.find_by_id(&unit.unit_id).await? {
            let current = index_entries(unit);
            for stale in index_entries(&previous)
                .into_iter()
                .filter(|entry| !current.contains(entry))
            {
                self.store.index_remove(&stale, &unit.unit_id).await?;
            }
        }

        let raw = serde_json::to_string(&UnitItem::from_unit(unit)).map_err(StoreError::from)?;
        self.store.put_item(&key, &raw).await?;

        for entry in index_entries(unit) {
            self.store.index_add(&entry, &unit.unit_id).await?;
        }

        debug!("💾 Unit {} saved", unit.unit_id);
        Ok(())
    }

    pub async fn find_by_id(&self, unit_id: &str) -> Result<Option<Unit>, AppError> {
        match self.store.get_item(&ItemKey::unit(unit_id)).await? {
            Some(raw) => Ok(Some(parse_unit(&raw)?)),
            None => Ok(None),
        }
    }

    pub async fn find_by_customer_and_vin(
        &self,
        customer_id: &str,
        vin: &str,
    ) -> Result<Vec<Unit>, AppError> {
        self.find_by_index(&IndexKey::new(
            CUSTOMER_VIN_INDEX,
            format!("{}#{}", customer_id, vin),
        ))
        .await
    }

    pub async fn find_by_customer(&self, customer_id: &str) -> Result<Vec<Unit>, AppError> {
        self.find_by_index(&IndexKey::new(CUSTOMER_INDEX, customer_id))
            .await
    }

    pub async fn find_by_vin(&self, vin: &str) -> Result<Vec<Unit>, AppError> {
        self.find_by_index(&IndexKey::new(VIN_INDEX, vin)).await
    }

    /// Borra el ítem y sus entradas de índice
    pub async fn delete_unit(&self, unit_id: &str) -> Result<(), AppError> {
        if let Some(unit) = self.find_by_id(unit_id).await? {
            for entry in index_entries(&unit) {
                self.store.index_remove(&entry, unit_id).await?;
            }
        }
        self.store.delete_item(&ItemKey::unit(unit_id)).await?;

        debug!("🗑️ Unit {} deleted", unit_id);
        Ok(())
    }

    /// Unidades de un índice, ordenadas por fecha de creación
    async fn find_by_index(&self, index: &IndexKey) -> Result<Vec<Unit>, AppError> {
        let ids = self.store.index_members(index).await?;
        let keys: Vec<ItemKey> = ids.iter().map(|id| ItemKey::unit(id)).collect();

        let mut units = Vec::with_capacity(keys.len());
        for chunk in keys.chunks(BATCH_SIZE) {
            let values = self.store.batch_get(chunk).await?;
            for (key, raw) in chunk.iter().zip(values) {
                match raw {
                    Some(raw) => units.push(parse_unit(&raw)?),
                    None => warn!("⚠️ Index {} points to missing item {}", index, key),
                }
            }
        }

        units.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.unit_id.cmp(&b.unit_id))
        });
        Ok(units)
    }
}
