use serde::Deserialize;
use serde_json::{Map, Value};
use validator::Validate;

use crate::models::Vehicle;

// Request para crear una unidad a partir de un VIN
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUnitFromVinRequest {
    #[validate(length(min = 1))]
    pub customer_id: String,
    #[validate(length(min = 5, max = 50))]
    pub vin: String,
}

impl CreateUnitFromVinRequest {
    /// Sin espacios alrededor; se aplica antes de validar
    pub fn trimmed(self) -> Self {
        Self {
            customer_id: self.customer_id.trim().to_string(),
            vin: self.vin.trim().to_string(),
        }
    }
}

// Request para crear una unidad con atributos dados
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUnitRequest {
    #[validate(length(min = 1))]
    pub customer_id: String,
    #[validate(length(min = 5, max = 50))]
    pub vin: String,
    #[serde(default)]
    pub attributes: Option<Map<String, Value>>,
    /// Especificación del vehículo; sólo se usa si no hay registro para el VIN
    #[serde(default)]
    pub vehicle: Option<Vehicle>,
}

impl CreateUnitRequest {
    pub fn trimmed(self) -> Self {
        Self {
            customer_id: self.customer_id.trim().to_string(),
            vin: self.vin.trim().to_string(),
            ..self
        }
    }
}

// Request para actualizar una unidad (sólo campos de asociación)
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUnitRequest {
    #[validate(length(min = 1))]
    pub customer_id: Option<String>,
    #[validate(length(min = 5, max = 50))]
    pub vin: Option<String>,
    #[serde(default)]
    pub attributes: Option<Map<String, Value>>,
}

impl UpdateUnitRequest {
    pub fn trimmed(self) -> Self {
        Self {
            customer_id: self.customer_id.map(|c| c.trim().to_string()),
            vin: self.vin.map(|v| v.trim().to_string()),
            ..self
        }
    }
}

// Query string de GET /units
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitListQuery {
    pub customer_id: Option<String>,
    pub vin: Option<String>,
}

// Query string de GET /units/:unit_id/parts
#[derive(Debug, Deserialize)]
pub struct PartsQuery {
    pub category: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vin_length_is_validated() {
        let request: CreateUnitFromVinRequest =
            serde_json::from_str(r#"{"customerId":"cust-1","vin":"ABC"}"#).unwrap();
        assert!(request.validate().is_err());

        let request: CreateUnitFromVinRequest =
            serde_json::from_str(r#"{"customerId":"cust-1","vin":"1HGCM82633A004352"}"#).unwrap();
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_empty_customer_rejected() {
        let request: CreateUnitRequest =
            serde_json::from_str(r#"{"customerId":"","vin":"1HGCM82633A004352"}"#).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_padding_does_not_count_towards_vin_length() {
        let request: CreateUnitFromVinRequest =
            serde_json::from_str(r#"{"customerId":"cust-1","vin":"  ABCD "}"#).unwrap();
        assert!(request.validate().is_ok());
        assert!(request.trimmed().validate().is_err());

        let request: CreateUnitRequest =
            serde_json::from_str(r#"{"customerId":"   ","vin":" 1HGCM82633A004352 "}"#).unwrap();
        let request = request.trimmed();
        assert_eq!(request.vin, "1HGCM82633A004352");
        assert!(request.validate().is_err());

        let request: UpdateUnitRequest = serde_json::from_str(r#"{"vin":" AB  "}"#).unwrap();
        assert!(request.trimmed().validate().is_err());
    }

    #[test]
    fn test_update_fields_are_optional() {
        let request: UpdateUnitRequest = serde_json::from_str(r#"{"attributes":{"a":1}}"#).unwrap();
        assert!(request.validate().is_ok());
        assert!(request.vin.is_none());
    }
}
