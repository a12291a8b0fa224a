#![allow(dead_code)]

use std::sync::Arc;

use unit_service::cache::MemoryStore;
use unit_service::clients::fakes::{FakeVinDecoder, Script, ScriptedQueryService};
use unit_service::config::EnvironmentConfig;
use unit_service::models::DecodeDialect;
use unit_service::AppState;

pub const ACCORD_VIN: &str = "1HGCM82633A004352";

/// Decodificador que conoce el Accord de los escenarios
pub fn accord_decoder() -> FakeVinDecoder {
    FakeVinDecoder::new(DecodeDialect::Labeled).with_vin(
        ACCORD_VIN,
        &[
            ("Model Year", "2003"),
            ("Make", "HONDA"),
            ("Model", "Accord"),
            ("Displacement (L)", "3.0"),
            ("Engine Number of Cylinders", "6"),
            ("Engine Configuration", "V-Shaped"),
            ("Body Class", "Coupe"),
        ],
    )
}

/// Catálogo que responde de inmediato según el texto de la consulta
pub fn accord_catalog() -> ScriptedQueryService {
    ScriptedQueryService::new()
        .with_script(
            "vcdb_base_vehicle",
            Script::rows(0, vec![vec!["base_vehicle_id"], vec!["5911"]]),
        )
        .with_script(
            "vcdb_engine_base",
            Script::rows(0, vec![vec!["engine_base_id"], vec!["1023"]]),
        )
        .with_script(
            "SELECT DISTINCT c.category_name",
            Script::rows(0, vec![vec!["category_name"], vec!["Brake"], vec!["Filters"]]),
        )
        .with_script(
            "aces_fitment",
            Script::rows(
                0,
                vec![
                    vec!["part_number", "brand_name", "category_name", "part_terminology_name", "position", "qty", "note"],
                    vec!["BP-100", "ACME", "Brake", "Brake Pad", "Front", "2", ""],
                ],
            ),
        )
        .with_script(
            "pcadb_categories",
            Script::rows(
                0,
                vec![vec!["category_name"], vec!["Brake"], vec!["Engine"], vec!["Filters"]],
            ),
        )
}

pub struct TestApp {
    pub state: AppState,
    pub store: Arc<MemoryStore>,
    pub decoder: Arc<FakeVinDecoder>,
    pub catalog: Arc<ScriptedQueryService>,
}

pub fn test_app() -> TestApp {
    let mut config = EnvironmentConfig::default();
    config.query.poll_interval_ms = 1;

    let store = Arc::new(MemoryStore::new());
    let decoder = Arc::new(accord_decoder());
    let catalog = Arc::new(accord_catalog());

    let state = AppState::from_parts(config, store.clone(), decoder.clone(), catalog.clone());

    TestApp {
        state,
        store,
        decoder,
        catalog,
    }
}
