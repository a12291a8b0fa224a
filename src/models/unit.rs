//! Modelo de Unit (asociación cliente ↔ VIN)
//!
//! Una unidad sólo guarda sus campos de asociación. Los datos del vehículo
//! viven en el registro `Vehicle` compartido y se combinan en lectura.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

/// Nombres serializados de los campos propios de la unidad. Nunca se
/// sobrescriben con valores del vehículo al combinar.
pub const UNIT_FIELD_NAMES: [&str; 6] = [
    "unitId",
    "customerId",
    "vin",
    "attributes",
    "createdAt",
    "updatedAt",
];

/// Unit principal - la única representación que se persiste en ítems `UNT#`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub unit_id: String,
    pub customer_id: String,
    pub vin: String,
    #[serde(default)]
    pub attributes: Option<Map<String, Value>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Unit {
    pub fn new(
        unit_id: String,
        customer_id: String,
        vin: String,
        attributes: Option<Map<String, Value>>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            unit_id,
            customer_id,
            vin,
            attributes,
            created_at: now,
            updated_at: now,
        }
    }

    /// Nuevo valor con los campos de asociación cambiados. Sólo customerId,
    /// vin y attributes son mutables.
    pub fn with_changes(
        self,
        customer_id: Option<String>,
        vin: Option<String>,
        attributes: Option<Map<String, Value>>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            customer_id: customer_id.unwrap_or(self.customer_id),
            vin: vin.unwrap_or(self.vin),
            attributes: attributes.or(self.attributes),
            updated_at: now,
            ..self
        }
    }
}

/// Unidad enriquecida visible externamente: los campos de la unidad más
/// los del vehículo compartido, con precedencia de la unidad.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EnrichedUnit(Map<String, Value>);

impl EnrichedUnit {
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Valor de un campo; `None` tanto si falta como si es null
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field).filter(|v| !v.is_null())
    }

    /// Campo deserializado a un tipo concreto
    pub fn get_as<T: DeserializeOwned>(&self, field: &str) -> Option<T> {
        self.get(field)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    pub fn unit_id(&self) -> Option<&str> {
        self.get_str("unitId")
    }

    pub fn customer_id(&self) -> Option<&str> {
        self.get_str("customerId")
    }

    pub fn vin(&self) -> Option<&str> {
        self.get_str("vin")
    }

    pub fn year(&self) -> Option<i32> {
        self.get_as("year")
    }

    pub fn make(&self) -> Option<&str> {
        self.get_str("make")
    }

    pub fn model(&self) -> Option<&str> {
        self.get_str("model")
    }

    pub fn base_vehicle_id(&self) -> Option<i32> {
        self.get_as("baseVehicleId")
    }

    pub fn engine_base_id(&self) -> Option<i32> {
        self.get_as("engineBaseId")
    }
}
