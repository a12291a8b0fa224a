//! Consulta de piezas ACES y categorías PCdb para un vehículo resuelto

use tracing::{info, instrument, warn};

use crate::clients::{QueryExecutionClient, ResultRow};
use crate::models::Part;
use crate::utils::sql::escape_sql;

#[derive(Clone)]
pub struct PartsLookupService {
    queries: QueryExecutionClient,
    schema: String,
}

impl PartsLookupService {
    pub fn new(queries: QueryExecutionClient, schema: impl Into<String>) -> Self {
        Self {
            queries,
            schema: schema.into(),
        }
    }

    pub fn parts_sql(&self, base_vehicle_id: i32, engine_base_id: Option<i32>, category: Option<&str>) -> String {
        let db = &self.schema;
        let mut sql = format!(
            "SELECT f.part_number, b.brand_name, c.category_name, p.part_terminology_name, \
             pos.position, f.qty, f.note \
             FROM {db}.aces_fitment f \
             LEFT JOIN {db}.brand b ON f.brand_aaia_id = b.brand_id \
             JOIN {db}.pcadb_parts p ON f.part_type_id = p.part_terminology_id \
             LEFT JOIN {db}.pcadb_category_parts cp ON p.part_terminology_id = cp.part_terminology_id \
             LEFT JOIN {db}.pcadb_categories c ON cp.category_id = c.category_id \
             LEFT JOIN {db}.pcadb_positions pos ON f.position_id = pos.position_id \
             WHERE f.base_vehicle_id = {base_vehicle_id}"
        );

        if let Some(engine_base_id) = engine_base_id {
            sql.push_str(&format!(" AND f.engine_base_id = {}", engine_base_id));
        }
        if let Some(category) = category.filter(|c| !c.trim().is_empty()) {
            sql.push_str(&format!(
                " AND UPPER(c.category_name) = UPPER('{}')",
                escape_sql(category)
            ));
        }

        sql.push_str(" ORDER BY c.category_name, p.part_terminology_name, b.brand_name");
        sql
    }

    pub fn categories_sql(&self, base_vehicle_id: i32, engine_base_id: Option<i32>) -> String {
        let db = &self.schema;
        let mut sql = format!(
            "SELECT DISTINCT c.category_name \
             FROM {db}.aces_fitment f \
             JOIN {db}.pcadb_parts p ON f.part_type_id = p.part_terminology_id \
             JOIN {db}.pcadb_category_parts cp ON p.part_terminology_id = cp.part_terminology_id \
             JOIN {db}.pcadb_categories c ON cp.category_id = c.category_id \
             WHERE f.base_vehicle_id = {base_vehicle_id}"
        );

        if let Some(engine_base_id) = engine_base_id {
            sql.push_str(&format!(" AND f.engine_base_id = {}", engine_base_id));
        }

        sql.push_str(" ORDER BY c.category_name");
        sql
    }

    pub fn all_categories_sql(&self) -> String {
        format!(
            "SELECT DISTINCT category_name FROM {}.pcadb_categories ORDER BY category_name",
            self.schema
        )
    }

    fn to_part(row: &ResultRow) -> Part {
        let text = |i: usize| row.cell(i).map(str::to_string);
        Part {
            part_number: text(0),
            brand_name: text(1),
            category: text(2),
            part_type: text(3),
            position: text(4),
            quantity: row.cell(5).and_then(|q| q.trim().parse::<i32>().ok()),
            note: text(6),
        }
    }

    fn to_names(rows: Vec<ResultRow>) -> Vec<String> {
        rows.iter()
            .filter_map(|row| row.cell(0).map(str::to_string))
            .collect()
    }

    /// Piezas compatibles. Sin base vehicle no hay consulta; un fallo devuelve vacío.
    #[instrument(skip(self))]
    pub async fn find_parts_for_vehicle(
        &self,
        base_vehicle_id: Option<i32>,
        engine_base_id: Option<i32>,
        category: Option<&str>,
    ) -> Vec<Part> {
        let Some(base_vehicle_id) = base_vehicle_id else {
            return Vec::new();
        };

        match self
            .queries
            .execute(&self.parts_sql(base_vehicle_id, engine_base_id, category))
            .await
        {
            Ok(rows) => {
                let parts: Vec<Part> = rows.iter().map(Self::to_part).collect();
                info!("🔧 {} part(s) for base vehicle {}", parts.len(), base_vehicle_id);
                parts
            }
            Err(e) => {
                warn!("⚠️ Parts lookup failed for base vehicle {}: {}", base_vehicle_id, e);
                Vec::new()
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn find_categories_for_vehicle(
        &self,
        base_vehicle_id: Option<i32>,
        engine_base_id: Option<i32>,
    ) -> Vec<String> {
        let Some(base_vehicle_id) = base_vehicle_id else {
            return Vec::new();
        };

        match self
            .queries
            .execute(&self.categories_sql(base_vehicle_id, engine_base_id))
            .await
        {
            Ok(rows) => Self::to_names(rows),
            Err(e) => {
                warn!("⚠️ Category lookup failed for base vehicle {}: {}", base_vehicle_id, e);
                Vec::new()
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn find_all_categories(&self) -> Vec<String> {
        match self.queries.execute(&self.all_categories_sql()).await {
            Ok(rows) => Self::to_names(rows),
            Err(e) => {
                warn!("⚠️ Category listing failed: {}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::fakes::{Script, ScriptedQueryService};
    use crate::config::QueryServiceConfig;
    use std::sync::Arc;

    fn service(queries: Arc<ScriptedQueryService>) -> PartsLookupService {
        let config = QueryServiceConfig {
            poll_interval_ms: 1,
            max_poll_attempts: 3,
            ..QueryServiceConfig::default()
        };
        PartsLookupService::new(QueryExecutionClient::new(queries, &config), "vcdb")
    }

    #[tokio::test]
    async fn test_parts_rows_are_mapped() {
        let queries = Arc::new(ScriptedQueryService::new().with_script(
            "aces_fitment",
            Script::rows(
                1,
                vec![
                    vec!["part_number", "brand_name", "category_name", "part_terminology_name", "position", "qty", "note"],
                    vec!["BP-100", "ACME", "Brake", "Brake Pad", "Front", "2", ""],
                ],
            ),
        ));
        let service = service(queries.clone());

        let parts = service.find_parts_for_vehicle(Some(5911), None, Some("brake's")).await;

        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].part_number.as_deref(), Some("BP-100"));
        assert_eq!(parts[0].quantity, Some(2));
        assert_eq!(parts[0].note, None);

        let sql = &queries.submitted()[0];
        assert!(sql.contains("WHERE f.base_vehicle_id = 5911"));
        assert!(!sql.contains("f.engine_base_id ="));
        assert!(sql.contains("UPPER('brake''s')"));
        assert!(sql.ends_with("ORDER BY c.category_name, p.part_terminology_name, b.brand_name"));
    }

    #[tokio::test]
    async fn test_engine_filter_only_when_present() {
        let queries = Arc::new(ScriptedQueryService::new());
        let service = service(queries.clone());

        service.find_categories_for_vehicle(Some(5911), Some(1023)).await;

        let sql = &queries.submitted()[0];
        assert!(sql.starts_with("SELECT DISTINCT c.category_name"));
        assert!(sql.contains("AND f.engine_base_id = 1023"));
    }

    #[tokio::test]
    async fn test_missing_base_vehicle_skips_query() {
        let queries = Arc::new(ScriptedQueryService::new());
        let service = service(queries.clone());

        assert!(service.find_parts_for_vehicle(None, Some(1), None).await.is_empty());
        assert!(service.find_categories_for_vehicle(None, None).await.is_empty());
        assert!(queries.submitted().is_empty());
    }

    #[tokio::test]
    async fn test_failures_return_empty() {
        let queries = Arc::new(ScriptedQueryService::new().with_script("SELECT", Script::failed("boom")));
        let service = service(queries);

        assert!(service.find_parts_for_vehicle(Some(1), None, None).await.is_empty());
        assert!(service.find_all_categories().await.is_empty());
    }

    #[tokio::test]
    async fn test_all_categories() {
        let queries = Arc::new(ScriptedQueryService::new().with_script(
            "pcadb_categories",
            Script::rows(0, vec![vec!["category_name"], vec!["Brake"], vec!["Filters"]]),
        ));
        assert_eq!(service(queries).find_all_categories().await, vec!["Brake", "Filters"]);
    }
}
