//! Cliente del servicio de consultas asíncronas
//!
//! El servicio acepta SQL, devuelve un ID de ejecución y se consulta por
//! polling hasta un estado terminal. Las filas vuelven como celdas de texto
//! con una fila de cabecera. Este módulo no conoce el dominio de vehículos.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::QueryServiceConfig;
use crate::utils::errors::QueryError;

/// Contexto de ejecución de una consulta
#[derive(Debug, Clone, PartialEq)]
pub struct QueryContext {
    pub workgroup: String,
    pub database: String,
    pub output_location: String,
}

impl From<&QueryServiceConfig> for QueryContext {
    fn from(config: &QueryServiceConfig) -> Self {
        Self {
            workgroup: config.workgroup.clone(),
            database: config.database.clone(),
            output_location: config.output_location.clone(),
        }
    }
}

/// Estado de una ejecución según el servicio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryState {
    Queued,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl std::str::FromStr for QueryState {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "QUEUED" => Ok(QueryState::Queued),
            "RUNNING" => Ok(QueryState::Running),
            "SUCCEEDED" => Ok(QueryState::Succeeded),
            "FAILED" => Ok(QueryState::Failed),
            "CANCELLED" => Ok(QueryState::Cancelled),
            other => Err(QueryError::MalformedResponse(format!(
                "unknown query state '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryStatus {
    pub state: QueryState,
    pub state_change_reason: Option<String>,
}

impl QueryStatus {
    pub fn new(state: QueryState) -> Self {
        Self {
            state,
            state_change_reason: None,
        }
    }

    pub fn with_reason(state: QueryState, reason: &str) -> Self {
        Self {
            state,
            state_change_reason: Some(reason.to_string()),
        }
    }
}

/// Fila cruda: celdas de texto opcionales
pub type RawRow = Vec<Option<String>>;

/// Operaciones del servicio externo de consultas
#[async_trait]
pub trait QueryService: Send + Sync {
    async fn start_query(&self, sql: &str, context: &QueryContext) -> Result<String, QueryError>;

    async fn query_status(&self, execution_id: &str) -> Result<QueryStatus, QueryError>;

    /// Todas las filas del resultado, cabecera incluida
    async fn query_results(&self, execution_id: &str) -> Result<Vec<RawRow>, QueryError>;
}

/// Fila de resultado (sin cabecera)
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow(RawRow);

impl ResultRow {
    pub fn new(cells: RawRow) -> Self {
        Self(cells)
    }

    /// Celda por posición; una celda vacía cuenta como ausente
    pub fn cell(&self, index: usize) -> Option<&str> {
        self.0
            .get(index)
            .and_then(|c| c.as_deref())
            .filter(|c| !c.is_empty())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Cliente de ejecución: submit, espera por polling y lectura de filas
#[derive(Clone)]
pub struct QueryExecutionClient {
    service: Arc<dyn QueryService>,
    context: QueryContext,
    poll_interval: Duration,
    max_poll_attempts: u32,
}

impl QueryExecutionClient {
    pub fn new(service: Arc<dyn QueryService>, config: &QueryServiceConfig) -> Self {
        Self {
            service,
            context: QueryContext::from(config),
            poll_interval: Duration::from_millis(config.poll_interval_ms),
            max_poll_attempts: config.max_poll_attempts,
        }
    }

    pub async fn submit(&self, sql: &str, context: &QueryContext) -> Result<String, QueryError> {
        debug!("📤 Submitting query: {}", sql);
        let execution_id = self.service.start_query(sql, context).await?;
        debug!("🆔 Query execution id: {}", execution_id);
        Ok(execution_id)
    }

    /// Polling a intervalo fijo hasta estado terminal o agotar los intentos
    pub async fn await_completion(&self, execution_id: &str) -> Result<(), QueryError> {
        for attempt in 1..=self.max_poll_attempts {
            let status = self.service.query_status(execution_id).await?;

            match status.state {
                QueryState::Succeeded => {
                    debug!(
                        "✅ Query {} succeeded after {} poll(s)",
                        execution_id, attempt
                    );
                    return Ok(());
                }
                QueryState::Failed => {
                    let reason = status.state_change_reason.unwrap_or_default();
                    error!("❌ Query {} FAILED: {}", execution_id, reason);
                    return Err(QueryError::Failed { reason });
                }
                QueryState::Cancelled => {
                    let reason = status.state_change_reason.unwrap_or_default();
                    warn!("⚠️ Query {} CANCELLED: {}", execution_id, reason);
                    return Err(QueryError::Cancelled { reason });
                }
                QueryState::Queued | QueryState::Running => {
                    if attempt < self.max_poll_attempts {
                        tokio::time::sleep(self.poll_interval).await;
                    }
                }
            }
        }

        warn!(
            "⏰ Query {} timed out after {} poll attempts",
            execution_id, self.max_poll_attempts
        );
        Err(QueryError::Timeout {
            attempts: self.max_poll_attempts,
        })
    }

    /// Filas del resultado sin la cabecera
    pub async fn fetch_rows(&self, execution_id: &str) -> Result<Vec<ResultRow>, QueryError> {
        let rows = self.service.query_results(execution_id).await?;
        if rows.len() < 2 {
            return Ok(Vec::new());
        }
        Ok(rows.into_iter().skip(1).map(ResultRow::new).collect())
    }

    /// submit + await_completion + fetch_rows con el contexto configurado
    pub async fn execute(&self, sql: &str) -> Result<Vec<ResultRow>, QueryError> {
        let execution_id = self.submit(sql, &self.context).await?;
        self.await_completion(&execution_id).await?;
        let rows = self.fetch_rows(&execution_id).await?;
        debug!("📊 Query {} returned {} row(s)", execution_id, rows.len());
        Ok(rows)
    }
}

// Formato JSON del gateway

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct StartQueryRequest<'a> {
    query_string: &'a str,
    work_group: &'a str,
    query_execution_context: ExecutionContextBody<'a>,
    result_configuration: ResultConfigurationBody<'a>,
    client_request_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ExecutionContextBody<'a> {
    database: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ResultConfigurationBody<'a> {
    output_location: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StartQueryResponse {
    query_execution_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct QueryExecutionResponse {
    query_execution: QueryExecutionBody,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct QueryExecutionBody {
    status: QueryStatusBody,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct QueryStatusBody {
    state: String,
    #[serde(default)]
    state_change_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct QueryResultsResponse {
    result_set: ResultSetBody,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ResultSetBody {
    #[serde(default)]
    rows: Vec<RowBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RowBody {
    #[serde(default)]
    data: Vec<DatumBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DatumBody {
    #[serde(default)]
    var_char_value: Option<String>,
}

/// Implementación HTTP/JSON del servicio de consultas
pub struct HttpQueryService {
    gateway_url: String,
    client: Client,
}

impl HttpQueryService {
    pub fn new(gateway_url: &str, timeout_secs: u64) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        info!("🔗 Query gateway: {}", gateway_url);

        Ok(Self {
            gateway_url: gateway_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn read_json<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, QueryError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("❌ Query gateway returned {}: {}", status, body);
            return Err(QueryError::Transport(format!(
                "gateway returned {}: {}",
                status, body
            )));
        }

        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| QueryError::MalformedResponse(e.to_string()))
    }
}

#[async_trait]
impl QueryService for HttpQueryService {
    async fn start_query(&self, sql: &str, context: &QueryContext) -> Result<String, QueryError> {
        let body = StartQueryRequest {
            query_string: sql,
            work_group: &context.workgroup,
            query_execution_context: ExecutionContextBody {
                database: &context.database,
            },
            result_configuration: ResultConfigurationBody {
                output_location: &context.output_location,
            },
            client_request_token: uuid::Uuid::new_v4().to_string(),
        };

        let response = self
            .client
            .post(format!("{}/queries", self.gateway_url))
            .json(&body)
            .send()
            .await?;

        let parsed: StartQueryResponse = Self::read_json(response).await?;
        Ok(parsed.query_execution_id)
    }

    async fn query_status(&self, execution_id: &str) -> Result<QueryStatus, QueryError> {
        let response = self
            .client
            .get(format!(
                "{}/queries/{}",
                self.gateway_url,
                urlencoding::encode(execution_id)
            ))
            .send()
            .await?;

        let parsed: QueryExecutionResponse = Self::read_json(response).await?;
        let status = parsed.query_execution.status;
        Ok(QueryStatus {
            state: status.state.parse()?,
            state_change_reason: status.state_change_reason,
        })
    }

    async fn query_results(&self, execution_id: &str) -> Result<Vec<RawRow>, QueryError> {
        let response = self
            .client
            .get(format!(
                "{}/queries/{}/results",
                self.gateway_url,
                urlencoding::encode(execution_id)
            ))
            .send()
            .await?;

        let parsed: QueryResultsResponse = Self::read_json(response).await?;
        Ok(parsed
            .result_set
            .rows
            .into_iter()
            .map(|row| row.data.into_iter().map(|d| d.var_char_value).collect())
            .collect())
    }
}

/// Servicio usado cuando no hay gateway configurado: toda consulta falla
pub struct DisabledQueryService;

#[async_trait]
impl QueryService for DisabledQueryService {
    async fn start_query(&self, _sql: &str, _context: &QueryContext) -> Result<String, QueryError> {
        Err(QueryError::Transport(
            "query gateway not configured".to_string(),
        ))
    }

    async fn query_status(&self, _execution_id: &str) -> Result<QueryStatus, QueryError> {
        Err(QueryError::Transport(
            "query gateway not configured".to_string(),
        ))
    }

    async fn query_results(&self, _execution_id: &str) -> Result<Vec<RawRow>, QueryError> {
        Err(QueryError::Transport(
            "query gateway not configured".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::fakes::{Script, ScriptedQueryService};

    fn client(service: Arc<ScriptedQueryService>, attempts: u32) -> QueryExecutionClient {
        let config = QueryServiceConfig {
            poll_interval_ms: 1,
            max_poll_attempts: attempts,
            ..QueryServiceConfig::default()
        };
        QueryExecutionClient::new(service, &config)
    }

    #[tokio::test]
    async fn test_rows_fetched_after_running_running_succeeded() {
        let service = Arc::new(ScriptedQueryService::new().with_script(
            "SELECT",
            Script::rows(2, vec![vec!["base_vehicle_id"], vec!["5911"], vec!["7000"]]),
        ));
        let client = client(service.clone(), 60);

        let rows = client.execute("SELECT 1").await.unwrap();

        assert_eq!(service.status_calls(), 3);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].cell(0), Some("5911"));
        assert_eq!(rows[1].cell(0), Some("7000"));
    }

    #[tokio::test]
    async fn test_failed_state_surfaces_reason() {
        let service = Arc::new(
            ScriptedQueryService::new()
                .with_script("SELECT", Script::failed("SYNTAX_ERROR: line 1:8")),
        );
        let client = client(service, 60);

        let err = client.execute("SELECT oops").await.unwrap_err();
        assert_eq!(
            err,
            QueryError::Failed {
                reason: "SYNTAX_ERROR: line 1:8".to_string()
            }
        );
        assert!(err.to_string().contains("SYNTAX_ERROR"));
    }

    #[tokio::test]
    async fn test_cancelled_state_is_distinct() {
        let service = Arc::new(
            ScriptedQueryService::new().with_script("SELECT", Script::cancelled("user abort")),
        );
        let err = client(service, 60).execute("SELECT 1").await.unwrap_err();
        assert!(matches!(err, QueryError::Cancelled { .. }));
    }

    #[tokio::test]
    async fn test_exhausting_attempts_times_out() {
        let service = Arc::new(ScriptedQueryService::new().with_script("SELECT", Script::hang()));
        let client = client(service.clone(), 4);

        let err = client.execute("SELECT 1").await.unwrap_err();
        assert_eq!(err, QueryError::Timeout { attempts: 4 });
        assert_eq!(service.status_calls(), 4);
    }

    #[tokio::test]
    async fn test_queued_keeps_polling() {
        let service = Arc::new(ScriptedQueryService::new().with_script(
            "SELECT",
            Script::queued(vec![vec!["engine_base_id"], vec!["1023"]]),
        ));

        let rows = client(service.clone(), 60).execute("SELECT 1").await.unwrap();

        assert_eq!(service.status_calls(), 2);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cell(0), Some("1023"));
    }

    #[test]
    fn test_state_parsing() {
        assert_eq!("QUEUED".parse::<QueryState>(), Ok(QueryState::Queued));
        assert_eq!("CANCELLED".parse::<QueryState>(), Ok(QueryState::Cancelled));

        let err = "PENDING".parse::<QueryState>().unwrap_err();
        assert!(matches!(err, QueryError::MalformedResponse(_)));
        assert!(err.to_string().contains("PENDING"));
    }

    #[tokio::test]
    async fn test_header_only_result_is_empty() {
        let service = Arc::new(
            ScriptedQueryService::new().with_script("SELECT", Script::rows(0, vec![vec!["x"]])),
        );
        let rows = client(service, 60).execute("SELECT 1").await.unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_empty_cell_is_absent() {
        let row = ResultRow::new(vec![Some(String::new()), None, Some("V".to_string())]);
        assert_eq!(row.cell(0), None);
        assert_eq!(row.cell(1), None);
        assert_eq!(row.cell(2), Some("V"));
        assert_eq!(row.cell(9), None);
    }

    #[test]
    fn test_gateway_payload_shapes() {
        let body = StartQueryRequest {
            query_string: "SELECT 1",
            work_group: "primary",
            query_execution_context: ExecutionContextBody { database: "vcdb" },
            result_configuration: ResultConfigurationBody {
                output_location: "s3://results/",
            },
            client_request_token: "token".to_string(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["QueryString"], "SELECT 1");
        assert_eq!(json["WorkGroup"], "primary");
        assert_eq!(json["QueryExecutionContext"]["Database"], "vcdb");
        assert_eq!(json["ResultConfiguration"]["OutputLocation"], "s3://results/");

        let status: QueryExecutionResponse = serde_json::from_str(
            r#"{"QueryExecution":{"Status":{"State":"FAILED","StateChangeReason":"boom"}}}"#,
        )
        .unwrap();
        assert_eq!(status.query_execution.status.state, "FAILED");

        let results: QueryResultsResponse = serde_json::from_str(
            r#"{"ResultSet":{"Rows":[{"Data":[{"VarCharValue":"id"}]},{"Data":[{}]}]}}"#,
        )
        .unwrap();
        assert_eq!(results.result_set.rows.len(), 2);
        assert!(results.result_set.rows[1].data[0].var_char_value.is_none());
    }
}
