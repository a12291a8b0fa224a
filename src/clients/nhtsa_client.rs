//! Cliente del API de decodificación de VIN (vPIC)

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;
use tracing::{debug, error, info};

use crate::config::NhtsaConfig;
use crate::models::{DecodeDialect, VinDecodeResponse, VinDecodeResult};
use crate::utils::errors::AppError;

/// Fuente de decodificaciones de VIN
#[async_trait]
pub trait VinDecoder: Send + Sync {
    /// Dialecto de nombres de variable que produce esta fuente
    fn dialect(&self) -> DecodeDialect;

    async fn decode(&self, vin: &str) -> Result<VinDecodeResponse, AppError>;
}

/// Respuesta de DecodeVinValues: un único objeto plano por VIN
#[derive(Debug, Deserialize)]
struct FlatDecodeResponse {
    #[serde(rename = "Count", default)]
    count: Option<i64>,
    #[serde(rename = "Message", default)]
    message: Option<String>,
    #[serde(rename = "SearchCriteria", default)]
    search_criteria: Option<String>,
    #[serde(rename = "Results", default)]
    results: Vec<Map<String, Value>>,
}

impl FlatDecodeResponse {
    /// Convertir los objetos planos en pares (variable, valor)
    fn into_pairs(self) -> VinDecodeResponse {
        let results: Vec<VinDecodeResult> = self
            .results
            .into_iter()
            .flat_map(|object| object.into_iter())
            .map(|(variable, value)| VinDecodeResult {
                variable: Some(variable),
                value: match value {
                    Value::Null => None,
                    Value::String(s) => Some(s),
                    other => Some(other.to_string()),
                },
                value_id: None,
                variable_id: None,
            })
            .collect();

        VinDecodeResponse {
            count: self.count,
            message: self.message,
            search_criteria: self.search_criteria,
            results,
        }
    }
}

pub struct NhtsaClient {
    base_url: String,
    dialect: DecodeDialect,
    client: Client,
}

impl NhtsaClient {
    pub fn new(config: &NhtsaConfig, timeout_secs: u64) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        info!(
            "🔗 VIN decode API: {} ({:?})",
            config.base_url, config.dialect
        );

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            dialect: config.dialect,
            client,
        })
    }

    fn decode_url(&self, vin: &str) -> String {
        let endpoint = match self.dialect {
            DecodeDialect::Labeled => "DecodeVin",
            DecodeDialect::Compact => "DecodeVinValues",
        };
        format!(
            "{}/vehicles/{}/{}?format=json",
            self.base_url,
            endpoint,
            urlencoding::encode(vin)
        )
    }
}

#[async_trait]
impl VinDecoder for NhtsaClient {
    fn dialect(&self) -> DecodeDialect {
        self.dialect
    }

    async fn decode(&self, vin: &str) -> Result<VinDecodeResponse, AppError> {
        let url = self.decode_url(vin);
        debug!("🌐 Decoding VIN: {}", url);

        let response = self
            .client
            .get(&url)
            .header("User-Agent", "UnitService/1.0")
            .send()
            .await
            .map_err(|e| {
                error!("❌ VIN decode API unreachable: {}", e);
                AppError::ExternalApi(format!("VIN decode request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("❌ VIN decode failed with status {}: {}", status, body);
            return Err(AppError::VinDecode(format!(
                "VIN decode API returned {}",
                status
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| AppError::VinDecode(format!("unreadable response: {}", e)))?;

        let decoded = match self.dialect {
            DecodeDialect::Labeled => serde_json::from_str::<VinDecodeResponse>(&text),
            DecodeDialect::Compact => {
                serde_json::from_str::<FlatDecodeResponse>(&text).map(FlatDecodeResponse::into_pairs)
            }
        }
        .map_err(|e| AppError::VinDecode(format!("unparsable response: {}", e)))?;

        debug!("📄 VIN {} decoded into {} result(s)", vin, decoded.results.len());
        Ok(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compact_payload_converted_to_pairs() {
        let payload = r#"{
            "Count": 1,
            "Message": "Results returned successfully",
            "SearchCriteria": "VIN(s): 1HGCM82633A004352",
            "Results": [{"ModelYear": "2003", "Make": "HONDA", "EngineCylinders": "", "ErrorCode": 0}]
        }"#;
        let flat: FlatDecodeResponse = serde_json::from_str(payload).unwrap();
        let response = flat.into_pairs();

        assert_eq!(response.count, Some(1));
        assert_eq!(response.results.len(), 4);
        assert_eq!(response.value_of("ModelYear"), Some("2003"));
        assert_eq!(response.value_of("Make"), Some("HONDA"));
        assert_eq!(response.value_of("ErrorCode"), Some("0"));
    }

    #[tokio::test]
    async fn test_unreachable_api_is_external_error() {
        let client = NhtsaClient::new(
            &NhtsaConfig {
                base_url: "http://127.0.0.1:1/api".to_string(),
                dialect: DecodeDialect::Labeled,
            },
            2,
        )
        .unwrap();

        let err = client.decode("1HGCM82633A004352").await.unwrap_err();
        assert!(matches!(err, AppError::ExternalApi(_)));
        assert_eq!(err.code(), "EXTERNAL_API_ERROR");
    }

    #[test]
    fn test_decode_url_per_dialect() {
        let labeled = NhtsaClient::new(&NhtsaConfig::default(), 5).unwrap();
        assert_eq!(
            labeled.decode_url("1HGCM82633A004352"),
            "https://vpic.nhtsa.dot.gov/api/vehicles/DecodeVin/1HGCM82633A004352?format=json"
        );

        let compact = NhtsaClient::new(
            &NhtsaConfig {
                base_url: "http://localhost:8081/api/".to_string(),
                dialect: DecodeDialect::Compact,
            },
            5,
        )
        .unwrap();
        assert_eq!(compact.dialect(), DecodeDialect::Compact);
        assert_eq!(
            compact.decode_url("ABC"),
            "http://localhost:8081/api/vehicles/DecodeVinValues/ABC?format=json"
        );
    }
}
