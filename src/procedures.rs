//! Stored procedure management operations.
//!
//! Each operation runs the same pipeline: validate the textual input, build
//! the statement, acquire a connection, execute, shape the rows, and fold
//! the outcome into an [`OperationResult`]. Faults never escape an
//! operation; they are reported as failed envelopes.
//!
//! The existence probe and the mutating statement of an update or drop run
//! on the same connection but outside a transaction. A procedure dropped
//! between the two surfaces as an execution fault.

use crate::constants::NO_PARAMETERS;
use crate::database::statements::{
    build_alter, build_create, build_drop, definition_query, exists_query, list_query,
    parameters_query, Statement,
};
use crate::database::{
    CatalogConnection, ConnectionProvider, ParameterMetadata, ProcedureDefinition,
    ProcedureIdentity, ProcedureMetadata,
};
use crate::envelope::OperationResult;
use crate::error::{ProcedureError, ServerError};
use crate::security::clean_name;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Payload of a successful create or update.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionChange {
    pub message: String,
    pub procedure_name: String,
    pub parameters: String,
    pub sql_definition: String,
}

/// Payload of a successful listing.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureList {
    pub procedures: Vec<ProcedureMetadata>,
    pub count: usize,
    pub message: String,
}

/// Payload of a successful definition lookup.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureSource {
    pub procedure_name: String,
    pub definition: String,
    pub create_date: NaiveDateTime,
    pub modify_date: NaiveDateTime,
    pub parameters: Vec<ParameterMetadata>,
    pub message: String,
}

/// Payload of a successful drop.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureDropped {
    pub message: String,
    pub procedure_name: String,
}

/// Payload of a successful health check.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub healthy: bool,
    pub latency_ms: u64,
    pub message: String,
}

/// Which DDL verb a definition change issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChangeKind {
    Create,
    Update,
}

impl ChangeKind {
    fn action(self) -> &'static str {
        match self {
            ChangeKind::Create => "create stored procedure",
            ChangeKind::Update => "update stored procedure",
        }
    }

    fn past_tense(self) -> &'static str {
        match self {
            ChangeKind::Create => "created",
            ChangeKind::Update => "updated",
        }
    }
}

/// The stored procedure tools, bound to a connection provider.
#[derive(Debug, Clone)]
pub struct ProcedureTools<P> {
    provider: P,
}

impl<P: ConnectionProvider> ProcedureTools<P> {
    /// Create the tools over the given provider.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Get a reference to the connection provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Create a new stored procedure.
    pub async fn create_procedure(
        &self,
        procedure_name: &str,
        sql_definition: &str,
        parameters: Option<&str>,
        schema: Option<&str>,
    ) -> OperationResult {
        let outcome = self
            .change_definition(
                ChangeKind::Create,
                procedure_name,
                sql_definition,
                parameters,
                schema,
            )
            .await;
        report("create_stored_procedure", outcome)
    }

    /// Replace the definition of an existing stored procedure.
    pub async fn update_procedure(
        &self,
        procedure_name: &str,
        sql_definition: &str,
        parameters: Option<&str>,
        schema: Option<&str>,
    ) -> OperationResult {
        let outcome = self
            .change_definition(
                ChangeKind::Update,
                procedure_name,
                sql_definition,
                parameters,
                schema,
            )
            .await;
        report("update_stored_procedure", outcome)
    }

    /// List stored procedures, optionally filtered by schema and a `LIKE`
    /// name pattern.
    pub async fn list_procedures(
        &self,
        schema: Option<&str>,
        procedure_name: Option<&str>,
    ) -> OperationResult {
        let outcome = self.try_list(schema, procedure_name).await;
        report("list_stored_procedures", outcome)
    }

    /// Fetch the stored text, timestamps and parameters of one procedure.
    pub async fn get_definition(
        &self,
        procedure_name: &str,
        schema: Option<&str>,
    ) -> OperationResult {
        let outcome = self.try_get_definition(procedure_name, schema).await;
        report("get_stored_procedure_definition", outcome)
    }

    /// Drop an existing stored procedure.
    pub async fn drop_procedure(
        &self,
        procedure_name: &str,
        schema: Option<&str>,
    ) -> OperationResult {
        let outcome = self.try_drop(procedure_name, schema).await;
        report("drop_stored_procedure", outcome)
    }

    /// Check that a connection can be acquired and used.
    pub async fn health_check(&self) -> OperationResult {
        let start = Instant::now();
        let probe = async {
            let mut conn = self.provider.acquire().await?;
            Ok::<_, ServerError>(conn.count(&Statement::raw("SELECT 1")).await?)
        };

        match probe.await {
            Ok(_) => {
                let latency_ms = start.elapsed().as_millis() as u64;
                info!("Health check completed: healthy ({}ms)", latency_ms);
                OperationResult::ok(&HealthReport {
                    healthy: true,
                    latency_ms,
                    message: "Database connection is healthy".to_string(),
                })
            }
            Err(e) => {
                warn!("Health check failed: {}", e);
                OperationResult::failure(format!("Health check failed: {}", e))
            }
        }
    }

    async fn change_definition(
        &self,
        kind: ChangeKind,
        procedure_name: &str,
        sql_definition: &str,
        parameters: Option<&str>,
        schema: Option<&str>,
    ) -> Result<DefinitionChange, ProcedureError> {
        // Both required fields are checked before any database access
        if procedure_name.trim().is_empty() {
            return Err(ProcedureError::validation("procedureName"));
        }
        if sql_definition.trim().is_empty() {
            return Err(ProcedureError::validation("sqlDefinition"));
        }

        let identity = ProcedureIdentity::new(procedure_name, schema)?;
        let definition = ProcedureDefinition::new(identity, parameters, sql_definition)?;
        let fault = ProcedureError::execution(kind.action());

        let mut conn = self.provider.acquire().await.map_err(fault)?;

        let statement = match kind {
            ChangeKind::Create => build_create(&definition),
            ChangeKind::Update => {
                let fault = ProcedureError::execution(kind.action());
                if !procedure_exists(&mut conn, &definition.identity)
                    .await
                    .map_err(fault)?
                {
                    return Err(ProcedureError::not_found_use_create(
                        definition.identity.to_string(),
                    ));
                }
                build_alter(&definition)
            }
        };

        let fault = ProcedureError::execution(kind.action());
        conn.execute(&statement).await.map_err(fault)?;

        let qualified = definition.identity.to_string();
        info!("Stored procedure {} {}", qualified, kind.past_tense());

        Ok(DefinitionChange {
            message: format!(
                "Stored procedure {} {} successfully",
                qualified,
                kind.past_tense()
            ),
            procedure_name: qualified,
            parameters: definition
                .parameter_spec
                .unwrap_or_else(|| NO_PARAMETERS.to_string()),
            sql_definition: definition.body,
        })
    }

    async fn try_list(
        &self,
        schema: Option<&str>,
        procedure_name: Option<&str>,
    ) -> Result<ProcedureList, ProcedureError> {
        let schema = non_blank(non_blank(schema).map(clean_name));
        let pattern = non_blank(procedure_name);
        let fault = || ProcedureError::execution("list stored procedures");

        let mut conn = self.provider.acquire().await.map_err(fault())?;
        let rows = conn
            .fetch_procedures(&list_query(schema, pattern))
            .await
            .map_err(fault())?;

        debug!("Listing parameters for {} procedure(s)", rows.len());

        let mut procedures = Vec::with_capacity(rows.len());
        for row in rows {
            let identity =
                ProcedureIdentity::from_catalog(&row.schema_name, &row.procedure_name);
            let parameters = conn
                .fetch_parameters(&parameters_query(&identity))
                .await
                .map_err(fault())?;
            procedures.push(row.with_parameters(parameters));
        }

        let count = procedures.len();
        Ok(ProcedureList {
            procedures,
            count,
            message: format!("Found {} stored procedure(s)", count),
        })
    }

    async fn try_get_definition(
        &self,
        procedure_name: &str,
        schema: Option<&str>,
    ) -> Result<ProcedureSource, ProcedureError> {
        let identity = ProcedureIdentity::new(procedure_name, schema)?;
        let fault = || ProcedureError::execution("get stored procedure definition");

        let mut conn = self.provider.acquire().await.map_err(fault())?;
        if !procedure_exists(&mut conn, &identity)
            .await
            .map_err(fault())?
        {
            return Err(ProcedureError::not_found(identity.to_string()));
        }

        let source = conn
            .fetch_definition(&definition_query(&identity))
            .await
            .map_err(fault())?
            .ok_or_else(|| ProcedureError::Inconsistent {
                qualified_name: identity.to_string(),
            })?;

        let parameters = conn
            .fetch_parameters(&parameters_query(&identity))
            .await
            .map_err(fault())?;

        let qualified = identity.to_string();
        Ok(ProcedureSource {
            message: format!("Retrieved definition for {}", qualified),
            procedure_name: qualified,
            definition: source.definition,
            create_date: source.create_date,
            modify_date: source.modify_date,
            parameters,
        })
    }

    async fn try_drop(
        &self,
        procedure_name: &str,
        schema: Option<&str>,
    ) -> Result<ProcedureDropped, ProcedureError> {
        let identity = ProcedureIdentity::new(procedure_name, schema)?;
        let fault = || ProcedureError::execution("drop stored procedure");

        let mut conn = self.provider.acquire().await.map_err(fault())?;
        if !procedure_exists(&mut conn, &identity)
            .await
            .map_err(fault())?
        {
            return Err(ProcedureError::not_found(identity.to_string()));
        }

        conn.execute(&build_drop(&identity))
            .await
            .map_err(fault())?;

        let qualified = identity.to_string();
        info!("Stored procedure {} dropped", qualified);
        Ok(ProcedureDropped {
            message: format!("Stored procedure {} dropped successfully", qualified),
            procedure_name: qualified,
        })
    }
}

/// Existence probe shared by update, drop and definition lookup.
async fn procedure_exists<C: CatalogConnection>(
    conn: &mut C,
    identity: &ProcedureIdentity,
) -> Result<bool, ServerError> {
    Ok(conn.count(&exists_query(identity)).await? > 0)
}

/// Treat blank optional filters as absent.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Log the outcome of a tool call and fold it into an envelope.
fn report<T: Serialize>(tool: &str, outcome: Result<T, ProcedureError>) -> OperationResult {
    if let Err(e) = &outcome {
        if e.is_validation() {
            debug!("{} rejected input: {}", tool, e);
        } else {
            warn!("{} failed: {}", tool, e);
        }
    }
    OperationResult::from_outcome(outcome)
}
