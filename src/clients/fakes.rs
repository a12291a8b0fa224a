//! Dobles de prueba para los servicios externos
//!
//! Disponibles en los tests del crate y, con la feature `test-util`, en los
//! tests de integración.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use super::nhtsa_client::VinDecoder;
use super::query_client::{QueryContext, QueryService, QueryState, QueryStatus, RawRow};
use crate::models::{DecodeDialect, VinDecodeResponse, VinDecodeResult};
use crate::utils::errors::{AppError, QueryError};

/// Comportamiento guionizado de una consulta
#[derive(Debug, Clone)]
pub enum Script {
    /// `running` estados RUNNING antes de SUCCEEDED; filas con cabecera
    Rows { running: usize, rows: Vec<RawRow> },
    /// Un estado QUEUED y luego SUCCEEDED
    Queued(Vec<RawRow>),
    Failed(String),
    Cancelled(String),
    /// Nunca alcanza un estado terminal
    Hang,
    /// El submit mismo falla
    SubmitError,
}

fn to_raw(rows: Vec<Vec<&str>>) -> Vec<RawRow> {
    rows.into_iter()
        .map(|r| r.into_iter().map(|c| Some(c.to_string())).collect())
        .collect()
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Script {
    pub fn rows(running: usize, rows: Vec<Vec<&str>>) -> Self {
        Script::Rows {
            running,
            rows: to_raw(rows),
        }
    }

    pub fn queued(rows: Vec<Vec<&str>>) -> Self {
        Script::Queued(to_raw(rows))
    }

    pub fn failed(reason: &str) -> Self {
        Script::Failed(reason.to_string())
    }

    pub fn cancelled(reason: &str) -> Self {
        Script::Cancelled(reason.to_string())
    }

    pub fn hang() -> Self {
        Script::Hang
    }
}

struct Execution {
    script: Script,
    polls: usize,
}

/// Servicio de consultas falso: elige el guion por el primer patrón contenido
/// en el SQL. Sin coincidencia, la consulta tiene éxito sin filas.
#[derive(Default)]
pub struct ScriptedQueryService {
    scripts: Vec<(String, Script)>,
    executions: Mutex<HashMap<String, Execution>>,
    submitted: Mutex<Vec<String>>,
    status_calls: AtomicUsize,
}

impl ScriptedQueryService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_script(mut self, pattern: &str, script: Script) -> Self {
        self.scripts.push((pattern.to_string(), script));
        self
    }

    pub fn submitted(&self) -> Vec<String> {
        lock(&self.submitted).clone()
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueryService for ScriptedQueryService {
    async fn start_query(&self, sql: &str, _context: &QueryContext) -> Result<String, QueryError> {
        let script = self
            .scripts
            .iter()
            .find(|(pattern, _)| sql.contains(pattern.as_str()))
            .map(|(_, script)| script.clone())
            .unwrap_or(Script::Rows {
                running: 0,
                rows: Vec::new(),
            });

        let mut submitted = lock(&self.submitted);
        submitted.push(sql.to_string());

        if matches!(script, Script::SubmitError) {
            return Err(QueryError::Transport("connection refused".to_string()));
        }

        let id = format!("q-{}", submitted.len());
        lock(&self.executions).insert(id.clone(), Execution { script, polls: 0 });
        Ok(id)
    }

    async fn query_status(&self, execution_id: &str) -> Result<QueryStatus, QueryError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        let mut executions = lock(&self.executions);
        let execution = executions
            .get_mut(execution_id)
            .ok_or_else(|| QueryError::MalformedResponse(format!("unknown id {}", execution_id)))?;
        execution.polls += 1;

        Ok(match &execution.script {
            Script::Rows { running, .. } if execution.polls <= *running => {
                QueryStatus::new(QueryState::Running)
            }
            Script::Rows { .. } => QueryStatus::new(QueryState::Succeeded),
            Script::Queued(_) if execution.polls == 1 => QueryStatus::new(QueryState::Queued),
            Script::Queued(_) => QueryStatus::new(QueryState::Succeeded),
            Script::Failed(reason) => QueryStatus::with_reason(QueryState::Failed, reason),
            Script::Cancelled(reason) => QueryStatus::with_reason(QueryState::Cancelled, reason),
            Script::Hang | Script::SubmitError => QueryStatus::new(QueryState::Running),
        })
    }

    async fn query_results(&self, execution_id: &str) -> Result<Vec<RawRow>, QueryError> {
        let executions = lock(&self.executions);
        match executions.get(execution_id).map(|e| &e.script) {
            Some(Script::Rows { rows, .. }) | Some(Script::Queued(rows)) => Ok(rows.clone()),
            _ => Err(QueryError::MalformedResponse("no results".to_string())),
        }
    }
}

/// Decodificador falso con respuestas por VIN y contador de llamadas
pub struct FakeVinDecoder {
    dialect: DecodeDialect,
    responses: HashMap<String, VinDecodeResponse>,
    calls: AtomicUsize,
}

impl FakeVinDecoder {
    pub fn new(dialect: DecodeDialect) -> Self {
        Self {
            dialect,
            responses: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_vin(mut self, vin: &str, pairs: &[(&str, &str)]) -> Self {
        let results = pairs
            .iter()
            .map(|(variable, value)| VinDecodeResult::new(variable, value))
            .collect();
        self.responses
            .insert(vin.to_string(), VinDecodeResponse::from_results(results));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VinDecoder for FakeVinDecoder {
    fn dialect(&self) -> DecodeDialect {
        self.dialect
    }

    async fn decode(&self, vin: &str) -> Result<VinDecodeResponse, AppError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .responses
            .get(vin)
            .cloned()
            .unwrap_or_else(|| VinDecodeResponse::from_results(Vec::new())))
    }
}
