//! Resolución de IDs de catálogo (base vehicle y engine base)
//!
//! Ambas resoluciones son de mejor esfuerzo: cualquier fallo del servicio de
//! consultas se registra y se trata como "sin coincidencia".

use tracing::{debug, instrument, warn};

use crate::clients::QueryExecutionClient;
use crate::models::Vehicle;
use crate::utils::sql::{escape_sql, format_displacement};

/// Configuración de bloque del motor → código de una letra del catálogo
pub fn block_type_for(configuration: &str) -> Option<&'static str> {
    match configuration {
        "V-Shaped" => Some("V"),
        "In-Line" => Some("I"),
        "Flat" => Some("H"),
        "Rotary" => Some("R"),
        "W-Shaped" => Some("W"),
        _ => None,
    }
}

#[derive(Clone)]
pub struct VehicleResolver {
    queries: QueryExecutionClient,
    schema: String,
}

impl VehicleResolver {
    pub fn new(queries: QueryExecutionClient, schema: impl Into<String>) -> Self {
        Self {
            queries,
            schema: schema.into(),
        }
    }

    pub fn base_vehicle_sql(&self, year: i32, make: &str, model: &str) -> String {
        format!(
            "SELECT bv.base_vehicle_id FROM {db}.vcdb_base_vehicle bv \
             JOIN {db}.vcdb_make mk ON bv.make_id = mk.make_id \
             JOIN {db}.vcdb_model md ON bv.model_id = md.model_id \
             WHERE bv.year_id = {year} \
             AND UPPER(mk.make_name) = UPPER('{make}') \
             AND UPPER(md.model_name) = UPPER('{model}') \
             LIMIT 1",
            db = self.schema,
            year = year,
            make = escape_sql(make),
            model = escape_sql(model),
        )
    }

    pub fn engine_base_sql(&self, liter: &str, cylinders: i32, block_type: &str) -> String {
        format!(
            "SELECT engine_base_id FROM {db}.vcdb_engine_base \
             WHERE liter = '{liter}' AND cylinders = '{cylinders}' AND block_type = '{block}' \
             LIMIT 1",
            db = self.schema,
            liter = escape_sql(liter),
            cylinders = cylinders,
            block = escape_sql(block_type),
        )
    }

    /// Primera celda de la primera fila como entero
    async fn first_id(&self, sql: &str, lookup: &str) -> Option<i32> {
        match self.queries.execute(sql).await {
            Ok(rows) => rows
                .first()
                .and_then(|row| row.cell(0))
                .and_then(|cell| cell.trim().parse::<i32>().ok()),
            Err(e) => {
                warn!("⚠️ {} lookup failed, treating as no match: {}", lookup, e);
                None
            }
        }
    }

    #[instrument(skip(self), fields(schema = %self.schema))]
    pub async fn resolve_base_vehicle(
        &self,
        year: Option<i32>,
        make: Option<&str>,
        model: Option<&str>,
    ) -> Option<i32> {
        let (Some(year), Some(make), Some(model)) = (year, make, model) else {
            debug!("Missing year/make/model, skipping base vehicle lookup");
            return None;
        };

        let id = self
            .first_id(&self.base_vehicle_sql(year, make, model), "Base vehicle")
            .await;
        debug!("🔍 Base vehicle for {} {} {}: {:?}", year, make, model, id);
        id
    }

    #[instrument(skip(self), fields(schema = %self.schema))]
    pub async fn resolve_engine_base(
        &self,
        displacement_liters: Option<f64>,
        cylinders: Option<i32>,
        configuration: Option<&str>,
    ) -> Option<i32> {
        let (Some(liters), Some(cylinders), Some(configuration)) =
            (displacement_liters, cylinders, configuration)
        else {
            debug!("Missing displacement/cylinders/configuration, skipping engine lookup");
            return None;
        };

        let Some(block_type) = block_type_for(configuration) else {
            warn!("⚠️ Unknown engine configuration '{}', skipping engine lookup", configuration);
            return None;
        };

        let liter = format_displacement(liters);
        let id = self
            .first_id(&self.engine_base_sql(&liter, cylinders, block_type), "Engine base")
            .await;
        debug!(
            "🔍 Engine base for {}L {} cyl {}: {:?}",
            liter, cylinders, block_type, id
        );
        id
    }

    /// Nuevo `Vehicle` con ambos IDs resueltos (ausencia incluida)
    #[instrument(skip(self, vehicle), fields(vin = %vehicle.vin))]
    pub async fn enrich(&self, vehicle: Vehicle) -> Vehicle {
        let (base_vehicle_id, engine_base_id) = futures::join!(
            self.resolve_base_vehicle(
                vehicle.year,
                vehicle.make.as_deref(),
                vehicle.model.as_deref()
            ),
            self.resolve_engine_base(
                vehicle.displacement_liters,
                vehicle.engine_cylinders,
                vehicle.engine_configuration.as_deref()
            ),
        );

        vehicle.with_catalog_ids(base_vehicle_id, engine_base_id)
    }
}
