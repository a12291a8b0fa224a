//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema
//! y su conversión a respuestas HTTP apropiadas.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errores del cliente de consultas asíncronas (gateway de catálogo)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("Query FAILED: {reason}")]
    Failed { reason: String },

    #[error("Query CANCELLED: {reason}")]
    Cancelled { reason: String },

    #[error("Query timed out after {attempts} poll attempts")]
    Timeout { attempts: u32 },

    #[error("Query service transport error: {0}")]
    Transport(String),

    #[error("Malformed query service response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for QueryError {
    fn from(e: reqwest::Error) -> Self {
        QueryError::Transport(e.to_string())
    }
}

/// Errores del almacén clave-valor
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store backend error: {0}")]
    Backend(String),

    #[error("Store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<redis::RedisError> for StoreError {
    fn from(e: redis::RedisError) -> Self {
        StoreError::Backend(e.to_string())
    }
}

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Unit not found: {0}")]
    UnitNotFound(String),

    #[error("VIN '{vin}' already exists for customer '{customer_id}'")]
    DuplicateVin { customer_id: String, vin: String },

    #[error("VIN decode failed: {0}")]
    VinDecode(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl AppError {
    /// Código estable expuesto a los clientes de la API
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::UnitNotFound(_) => "UNIT_NOT_FOUND",
            AppError::DuplicateVin { .. } => "DUPLICATE_VIN",
            AppError::VinDecode(_) => "VIN_DECODE_FAILED",
            AppError::Storage(_) => "STORAGE_ERROR",
            AppError::ExternalApi(_) => "EXTERNAL_API_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::UnitNotFound(_) => StatusCode::NOT_FOUND,
            AppError::DuplicateVin { .. } => StatusCode::CONFLICT,
            AppError::VinDecode(_) | AppError::ExternalApi(_) => StatusCode::BAD_GATEWAY,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let error_response = match &self {
            AppError::Validation(e) => {
                tracing::warn!("⚠️ Validation error: {}", e);
                ErrorResponse {
                    error: "Validation Error".to_string(),
                    message: "The provided data is invalid".to_string(),
                    details: Some(json!(e)),
                    code: Some(code.to_string()),
                }
            }

            AppError::UnitNotFound(_) => {
                tracing::warn!("❌ {}", self);
                ErrorResponse {
                    error: "Not Found".to_string(),
                    message: self.to_string(),
                    details: None,
                    code: Some(code.to_string()),
                }
            }

            AppError::DuplicateVin { customer_id, vin } => {
                tracing::warn!("⚠️ {}", self);
                ErrorResponse {
                    error: "Conflict".to_string(),
                    message: self.to_string(),
                    details: Some(json!({ "customerId": customer_id, "vin": vin })),
                    code: Some(code.to_string()),
                }
            }

            AppError::VinDecode(msg) | AppError::ExternalApi(msg) => {
                tracing::error!("❌ External API error: {}", msg);
                ErrorResponse {
                    error: "External API Error".to_string(),
                    message: "An error occurred while communicating with external service".to_string(),
                    details: Some(json!({ "external_api_error": msg })),
                    code: Some(code.to_string()),
                }
            }

            AppError::Storage(e) => {
                tracing::error!("❌ Storage error: {}", e);
                ErrorResponse {
                    error: "Storage Error".to_string(),
                    message: "An error occurred while accessing the unit store".to_string(),
                    details: Some(json!({ "store_error": e.to_string() })),
                    code: Some(code.to_string()),
                }
            }

            AppError::BadRequest(msg) => ErrorResponse {
                error: "Bad Request".to_string(),
                message: msg.clone(),
                details: None,
                code: Some(code.to_string()),
            },
        };

        (status, Json(error_response)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de unidad no encontrada
pub fn unit_not_found(unit_id: &str) -> AppError {
    AppError::UnitNotFound(unit_id.to_string())
}

/// Función helper para crear errores de VIN duplicado
pub fn duplicate_vin(customer_id: &str, vin: &str) -> AppError {
    AppError::DuplicateVin {
        customer_id: customer_id.to_string(),
        vin: vin.to_string(),
    }
}
