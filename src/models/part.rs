use serde::{Deserialize, Serialize};

/// Pieza de aftermarket según los datos de fitment ACES
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    pub part_number: Option<String>,
    pub brand_name: Option<String>,
    pub category: Option<String>,
    pub part_type: Option<String>,
    pub position: Option<String>,
    pub quantity: Option<i32>,
    pub note: Option<String>,
}
