//! Servicio de unidades
//!
//! Orquesta la creación de unidades (decodificación, resolución de catálogo,
//! guardado deduplicado por VIN) y la lectura enriquecida.

use chrono::Utc;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use super::field_mapper;
use super::merge_engine::{distinct_vins, merge, merge_all};
use super::vehicle_resolver::VehicleResolver;
use crate::clients::VinDecoder;
use crate::models::{EnrichedUnit, Unit, Vehicle};
use crate::repositories::{UnitRepository, VehicleRepository};
use crate::utils::errors::{duplicate_vin, unit_not_found, AppError, AppResult};
use crate::utils::id_generator::generate_unit_id;

/// Cambios de asociación aplicables a una unidad
#[derive(Debug, Clone, Default)]
pub struct UnitChanges {
    pub customer_id: Option<String>,
    pub vin: Option<String>,
    pub attributes: Option<Map<String, Value>>,
}

pub struct UnitService {
    units: UnitRepository,
    vehicles: VehicleRepository,
    decoder: Arc<dyn VinDecoder>,
    resolver: VehicleResolver,
}

fn require(value: &str, field: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::BadRequest(format!("{} must not be empty", field)));
    }
    Ok(())
}

impl UnitService {
    pub fn new(
        units: UnitRepository,
        vehicles: VehicleRepository,
        decoder: Arc<dyn VinDecoder>,
        resolver: VehicleResolver,
    ) -> Self {
        Self {
            units,
            vehicles,
            decoder,
            resolver,
        }
    }

    async fn ensure_no_duplicate(&self, customer_id: &str, vin: &str) -> AppResult<()> {
        // Lectura-y-escritura sin transacción: dos peticiones simultáneas pueden duplicar
        if !self
            .units
            .find_by_customer_and_vin(customer_id, vin)
            .await?
            .is_empty()
        {
            return Err(duplicate_vin(customer_id, vin));
        }
        Ok(())
    }

    async fn load_unit(&self, unit_id: &str) -> AppResult<Unit> {
        self.units
            .find_by_id(unit_id)
            .await?
            .ok_or_else(|| unit_not_found(unit_id))
    }

    /// Decodifica, normaliza y resuelve un VIN. Una decodificación vacía es fatal.
    async fn decode_vehicle(&self, vin: &str) -> AppResult<Vehicle> {
        let response = self.decoder.decode(vin).await?;
        let vehicle = field_mapper::normalize(&response, vin, self.decoder.dialect())
            .ok_or_else(|| AppError::VinDecode(format!("no usable decode results for VIN {}", vin)))?;

        Ok(self.resolver.enrich(vehicle).await)
    }

    async fn enrich_all(&self, units: Vec<Unit>) -> AppResult<Vec<EnrichedUnit>> {
        if units.is_empty() {
            return Ok(Vec::new());
        }
        let vehicles = self.vehicles.load_vehicles_batch(distinct_vins(&units)).await?;
        Ok(merge_all(&units, &vehicles))
    }

    /// Crea una unidad a partir de un VIN, reutilizando el vehículo si ya existe
    #[instrument(skip(self))]
    pub async fn create_unit_from_vin(&self, customer_id: &str, vin: &str) -> AppResult<EnrichedUnit> {
        require(customer_id, "customerId")?;
        require(vin, "vin")?;
        self.ensure_no_duplicate(customer_id, vin).await?;

        let unit_id = generate_unit_id();

        let vehicle = match self.vehicles.load_vehicle(vin).await? {
            Some(existing) => {
                debug!("♻️ Reusing stored vehicle for VIN {}", vin);
                existing
            }
            None => {
                let vehicle = self.decode_vehicle(vin).await?;
                self.vehicles.save_vehicle(&vehicle).await?;
                vehicle
            }
        };

        let unit = Unit::new(unit_id, customer_id.to_string(), vin.to_string(), None, Utc::now());
        self.units.save_unit(&unit).await?;

        info!("✅ Unit {} created for customer {} (VIN {})", unit.unit_id, customer_id, vin);
        Ok(merge(&unit, Some(&vehicle)))
    }

    /// Crea una unidad con atributos dados. Si trae especificación de vehículo
    /// y no hay registro para el VIN, se resuelve y se guarda como el vehículo del VIN.
    #[instrument(skip(self, attributes, vehicle))]
    pub async fn create_unit(
        &self,
        customer_id: &str,
        vin: &str,
        attributes: Option<Map<String, Value>>,
        vehicle: Option<Vehicle>,
    ) -> AppResult<EnrichedUnit> {
        require(customer_id, "customerId")?;
        require(vin, "vin")?;
        self.ensure_no_duplicate(customer_id, vin).await?;

        let now = Utc::now();
        let stored = match (self.vehicles.load_vehicle(vin).await?, vehicle) {
            (Some(existing), _) => Some(existing),
            (None, Some(spec)) => {
                let spec = Vehicle {
                    vin: vin.to_string(),
                    created_at: Some(now),
                    updated_at: Some(now),
                    ..spec
                };
                let resolved = self.resolver.enrich(spec).await;
                self.vehicles.save_vehicle(&resolved).await?;
                Some(resolved)
            }
            (None, None) => None,
        };

        let unit = Unit::new(generate_unit_id(), customer_id.to_string(), vin.to_string(), attributes, now);
        self.units.save_unit(&unit).await?;

        info!("✅ Unit {} created for customer {} (VIN {})", unit.unit_id, customer_id, vin);
        Ok(merge(&unit, stored.as_ref()))
    }

    #[instrument(skip(self))]
    pub async fn get_unit(&self, unit_id: &str) -> AppResult<EnrichedUnit> {
        let unit = self.load_unit(unit_id).await?;
        let vehicle = self.vehicles.load_vehicle(&unit.vin).await?;
        Ok(merge(&unit, vehicle.as_ref()))
    }

    /// Vehículo almacenado para la unidad, si existe
    pub async fn vehicle_for_unit(&self, unit_id: &str) -> AppResult<Option<Vehicle>> {
        let unit = self.load_unit(unit_id).await?;
        self.vehicles.load_vehicle(&unit.vin).await
    }

    #[instrument(skip(self))]
    pub async fn get_units_by_customer(&self, customer_id: &str) -> AppResult<Vec<EnrichedUnit>> {
        let units = self.units.find_by_customer(customer_id).await?;
        self.enrich_all(units).await
    }

    #[instrument(skip(self))]
    pub async fn get_units_by_customer_and_vin(
        &self,
        customer_id: &str,
        vin: &str,
    ) -> AppResult<Vec<EnrichedUnit>> {
        let units = self.units.find_by_customer_and_vin(customer_id, vin).await?;
        self.enrich_all(units).await
    }

    #[instrument(skip(self))]
    pub async fn get_units_by_vin(&self, vin: &str) -> AppResult<Vec<EnrichedUnit>> {
        let units = self.units.find_by_vin(vin).await?;
        self.enrich_all(units).await
    }

    /// Actualiza sólo campos de asociación. Si cambia el par (cliente, VIN)
    /// se vuelve a comprobar duplicados contra el par destino.
    #[instrument(skip(self, changes))]
    pub async fn update_unit(&self, unit_id: &str, changes: UnitChanges) -> AppResult<EnrichedUnit> {
        let current = self.load_unit(unit_id).await?;

        if let Some(customer_id) = &changes.customer_id {
            require(customer_id, "customerId")?;
        }
        if let Some(vin) = &changes.vin {
            require(vin, "vin")?;
        }

        let target_customer = changes.customer_id.as_deref().unwrap_or(&current.customer_id);
        let target_vin = changes.vin.as_deref().unwrap_or(&current.vin);
        if target_customer != current.customer_id || target_vin != current.vin {
            self.ensure_no_duplicate(target_customer, target_vin).await?;
        }

        let updated = current.with_changes(changes.customer_id, changes.vin, changes.attributes, Utc::now());
        self.units.save_unit(&updated).await?;

        info!("✏️ Unit {} updated", unit_id);
        let vehicle = self.vehicles.load_vehicle(&updated.vin).await?;
        Ok(merge(&updated, vehicle.as_ref()))
    }

    /// Borra la unidad; el registro de vehículo se conserva
    #[instrument(skip(self))]
    pub async fn delete_unit(&self, unit_id: &str) -> AppResult<()> {
        self.load_unit(unit_id).await?;
        self.units.delete_unit(unit_id).await?;
        info!("🗑️ Unit {} deleted", unit_id);
        Ok(())
    }

    /// Vuelve a resolver los IDs de catálogo del vehículo de la unidad y
    /// reemplaza el registro completo. Sin vehículo almacenado, se decodifica.
    #[instrument(skip(self))]
    pub async fn reresolve_vehicle(&self, unit_id: &str) -> AppResult<EnrichedUnit> {
        let unit = self.load_unit(unit_id).await?;

        let vehicle = match self.vehicles.load_vehicle(&unit.vin).await? {
            Some(existing) => self
                .resolver
                .enrich(existing)
                .await
                .with_updated_at(Utc::now()),
            None => self.decode_vehicle(&unit.vin).await?,
        };
        self.vehicles.save_vehicle(&vehicle).await?;

        info!(
            "🔄 Vehicle {} re-resolved (base {:?}, engine {:?})",
            vehicle.vin, vehicle.base_vehicle_id, vehicle.engine_base_id
        );
        Ok(merge(&unit, Some(&vehicle)))
    }
}
