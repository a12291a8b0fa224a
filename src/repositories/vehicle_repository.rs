use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::cache::{ItemKey, KeyValueStore};
use crate::models::Vehicle;
use crate::utils::errors::{AppError, StoreError};

/// Límite de claves por lectura por lotes
pub const BATCH_SIZE: usize = 100;

/// Ítem persistido: clave `VIN#` y los campos no nulos del vehículo en `data`
#[derive(Debug, Serialize, Deserialize)]
struct VehicleItem {
    #[serde(rename = "PK")]
    pk: String,
    #[serde(rename = "SK")]
    sk: String,
    data: Map<String, Value>,
}

impl VehicleItem {
    fn from_vehicle(vehicle: &Vehicle) -> Result<Self, StoreError> {
        let key = ItemKey::vehicle(&vehicle.vin);
        let mut data = match serde_json::to_value(vehicle)? {
            Value::Object(fields) => fields,
            _ => Map::new(),
        };
        data.retain(|_, v| !v.is_null());

        Ok(Self {
            pk: key.pk,
            sk: key.sk,
            data,
        })
    }

    fn into_vehicle(self) -> Result<Vehicle, StoreError> {
        Ok(serde_json::from_value(Value::Object(self.data))?)
    }
}

fn parse_vehicle(raw: &str) -> Result<Vehicle, StoreError> {
    serde_json::from_str::<VehicleItem>(raw)?.into_vehicle()
}

/// Repositorio de vehículos: un registro canónico por VIN
#[derive(Clone)]
pub struct VehicleRepository {
    store: Arc<dyn KeyValueStore>,
}

impl VehicleRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Upsert completo por VIN; reemplaza cualquier registro existente
    pub async fn save_vehicle(&self, vehicle: &Vehicle) -> Result<(), AppError> {
        let item = VehicleItem::from_vehicle(vehicle)?;
        let raw = serde_json::to_string(&item).map_err(StoreError::from)?;
        self.store
            .put_item(&ItemKey::vehicle(&vehicle.vin), &raw)
            .await?;

        debug!("💾 Vehicle saved for VIN {}", vehicle.vin);
        Ok(())
    }

    pub async fn load_vehicle(&self, vin: &str) -> Result<Option<Vehicle>, AppError> {
        match self.store.get_item(&ItemKey::vehicle(vin)).await? {
            Some(raw) => Ok(Some(parse_vehicle(&raw)?)),
            None => Ok(None),
        }
    }

    /// Lectura por lotes troceada en `BATCH_SIZE` claves. Los VINs sin
    /// registro se omiten del resultado.
    pub async fn load_vehicles_batch<I, S>(&self, vins: I) -> Result<HashMap<String, Vehicle>, AppError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let distinct: BTreeSet<String> = vins
            .into_iter()
            .map(|v| v.as_ref().to_string())
            .collect();
        let keys: Vec<ItemKey> = distinct.iter().map(|vin| ItemKey::vehicle(vin)).collect();

        let mut vehicles = HashMap::with_capacity(keys.len());
        for chunk in keys.chunks(BATCH_SIZE) {
            let values = self.store.batch_get(chunk).await?;
            for raw in values.into_iter().flatten() {
                match parse_vehicle(&raw) {
                    Ok(vehicle) => {
                        vehicles.insert(vehicle.vin.clone(), vehicle);
                    }
                    Err(e) => warn!("⚠️ Skipping unreadable vehicle record: {}", e),
                }
            }
        }

        debug!(
            "📦 Loaded {} of {} vehicle(s) in {} batch(es)",
            vehicles.len(),
            keys.len(),
            keys.len().div_ceil(BATCH_SIZE)
        );
        Ok(vehicles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryStore;

    fn repository() -> (Arc<MemoryStore>, VehicleRepository) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), VehicleRepository::new(store))
    }

    #[tokio::test]
    async fn test_save_twice_keeps_one_record() {
        let (store, repo) = repository();

        let first = Vehicle {
            year: Some(2003),
            ..Vehicle::for_vin("1HGCM82633A004352")
        };
        let second = Vehicle {
            year: Some(2004),
            ..Vehicle::for_vin("1HGCM82633A004352")
        };
        repo.save_vehicle(&first).await.unwrap();
        repo.save_vehicle(&second).await.unwrap();

        assert_eq!(store.count_with_prefix("VIN#"), 1);
        let loaded = repo.load_vehicle("1HGCM82633A004352").await.unwrap().unwrap();
        assert_eq!(loaded.year, Some(2004));
    }

    #[tokio::test]
    async fn test_stored_item_shape() {
        let (store, repo) = repository();
        let vehicle = Vehicle {
            make: Some("HONDA".to_string()),
            ..Vehicle::for_vin("VIN1")
        };
        repo.save_vehicle(&vehicle).await.unwrap();

        let raw = store.get_item(&ItemKey::vehicle("VIN1")).await.unwrap().unwrap();
        let item: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(item["PK"], "VIN#VIN1");
        assert_eq!(item["SK"], "VIN#VIN1");
        assert_eq!(item["data"]["make"], "HONDA");
        // Los nulos no se guardan
        assert!(item["data"].get("model").is_none());
    }

    #[tokio::test]
    async fn test_batch_of_150_uses_two_requests() {
        let (store, repo) = repository();
        let vins: Vec<String> = (0..150).map(|i| format!("VIN{:03}", i)).collect();
        for vin in &vins {
            repo.save_vehicle(&Vehicle::for_vin(vin.clone())).await.unwrap();
        }

        let loaded = repo.load_vehicles_batch(&vins).await.unwrap();

        assert_eq!(loaded.len(), 150);
        assert_eq!(store.batch_get_calls(), 2);
    }

    #[tokio::test]
    async fn test_batch_dedups_and_omits_missing() {
        let (store, repo) = repository();
        repo.save_vehicle(&Vehicle::for_vin("VIN1")).await.unwrap();

        let loaded = repo
            .load_vehicles_batch(["VIN1", "VIN1", "MISSING"])
            .await
            .unwrap();

        assert_eq!(loaded.len(), 1);
        assert!(loaded.contains_key("VIN1"));
        assert_eq!(store.batch_get_calls(), 1);
    }

    #[tokio::test]
    async fn test_empty_batch_issues_no_request() {
        let (store, repo) = repository();
        let loaded = repo.load_vehicles_batch(Vec::<String>::new()).await.unwrap();
        assert!(loaded.is_empty());
        assert_eq!(store.batch_get_calls(), 0);
    }
}
