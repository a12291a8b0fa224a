//! Modelos de respuesta del API de decodificación de VIN
//!
//! El API devuelve un conteo y una lista de pares (variable, valor). Hay dos
//! dialectos conocidos que nombran las mismas variables de forma distinta.

use serde::{Deserialize, Serialize};

/// Dialecto de nombres de variable de la respuesta
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecodeDialect {
    /// Nombres legibles con espacios ("Model Year", "Displacement (L)")
    Labeled,
    /// Nombres de máquina en camel-case ("ModelYear", "DisplacementL")
    Compact,
}

impl std::str::FromStr for DecodeDialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "labeled" => Ok(DecodeDialect::Labeled),
            "compact" => Ok(DecodeDialect::Compact),
            other => Err(format!("unknown VIN decode dialect '{}'", other)),
        }
    }
}

/// Un resultado individual (variable, valor, value-id, variable-id)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VinDecodeResult {
    #[serde(rename = "Variable")]
    pub variable: Option<String>,
    #[serde(rename = "Value")]
    pub value: Option<String>,
    #[serde(rename = "ValueId", default)]
    pub value_id: Option<String>,
    #[serde(rename = "VariableId", default)]
    pub variable_id: Option<i64>,
}

impl VinDecodeResult {
    pub fn new(variable: &str, value: &str) -> Self {
        Self {
            variable: Some(variable.to_string()),
            value: Some(value.to_string()),
            value_id: None,
            variable_id: None,
        }
    }
}

/// Respuesta completa del API de VIN
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VinDecodeResponse {
    #[serde(rename = "Count", default)]
    pub count: Option<i64>,
    #[serde(rename = "Message", default)]
    pub message: Option<String>,
    #[serde(rename = "SearchCriteria", default)]
    pub search_criteria: Option<String>,
    #[serde(rename = "Results", default)]
    pub results: Vec<VinDecodeResult>,
}

impl VinDecodeResponse {
    pub fn from_results(results: Vec<VinDecodeResult>) -> Self {
        Self {
            count: Some(results.len() as i64),
            message: None,
            search_criteria: None,
            results,
        }
    }

    /// Primer valor no nulo para la variable; el orden no está garantizado
    /// y los nombres pueden repetirse, así que gana la primera coincidencia.
    pub fn value_of(&self, variable: &str) -> Option<&str> {
        self.results
            .iter()
            .filter(|r| r.variable.as_deref() == Some(variable))
            .find_map(|r| r.value.as_deref())
    }
}
