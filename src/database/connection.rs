//! Connection pool management for SQL Server.
//!
//! [`PoolProvider`] is the production [`ConnectionProvider`]: it hands out
//! pooled `mssql-client` connections wrapped in [`PooledCatalog`], which
//! decodes catalog rows into their typed records by column position.

use super::catalog::{CatalogConnection, ConnectionProvider};
use super::metadata::{
    parse_catalog_timestamp, DefinitionRow, ParameterMetadata, ProcedureFlags, ProcedureRow,
};
use super::statements::Statement;
use crate::config::DatabaseConfig;
use crate::constants::LOG_SQL_PREVIEW_LEN;
use crate::error::ServerError;
use futures_util::TryStreamExt;
use mssql_client::{Row, ToSql};
use mssql_driver_pool::{Pool, PoolBuilder, PooledConnection};
use std::time::Instant;
use tracing::{debug, info};

/// Type alias for the connection pool.
pub type ConnectionPool = Pool;

/// Type alias for a pooled connection.
pub type PooledConn = PooledConnection;

/// Create a connection pool from configuration.
pub async fn create_pool(config: &DatabaseConfig) -> Result<ConnectionPool, ServerError> {
    info!(
        "Creating connection pool for {} (min: {}, max: {})",
        config.server_label(),
        config.pool.min_connections,
        config.pool.max_connections
    );

    let client_config = mssql_client::Config::from_connection_string(&config.connection_string())
        .map_err(|e| ServerError::config(format!("Invalid connection string: {}", e)))?;

    let pool = PoolBuilder::new()
        .client_config(client_config)
        .min_connections(config.pool.min_connections)
        .max_connections(config.pool.max_connections)
        .idle_timeout(config.pool.idle_timeout)
        .connection_timeout(config.pool.connection_timeout)
        .sp_reset_connection(true)
        .build()
        .await
        .map_err(|e| ServerError::connection_with_source("Failed to create connection pool", e))?;

    // Fail fast on bad credentials or an unreachable host
    {
        let _conn = pool.get().await.map_err(|e| {
            ServerError::connection(format!("Failed to establish initial connection: {}", e))
        })?;
        debug!("Initial connection test successful");
    }

    info!("Connection pool created successfully");
    Ok(pool)
}

/// Hands out pooled connections to the tool operations.
pub struct PoolProvider {
    pool: ConnectionPool,
}

impl PoolProvider {
    /// Wrap an existing pool.
    pub fn new(pool: ConnectionPool) -> Self {
        Self { pool }
    }

    /// Build the pool from configuration and wrap it.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, ServerError> {
        Ok(Self::new(create_pool(config).await?))
    }
}

impl ConnectionProvider for PoolProvider {
    type Connection = PooledCatalog;

    async fn acquire(&self) -> Result<PooledCatalog, ServerError> {
        let conn = self.pool.get().await?;
        Ok(PooledCatalog { conn })
    }
}

/// A pooled connection; returned to the pool when dropped.
pub struct PooledCatalog {
    conn: PooledConn,
}

impl PooledCatalog {
    /// Run a query and collect every row.
    async fn query_rows(&mut self, statement: &Statement) -> Result<Vec<Row>, ServerError> {
        let start = Instant::now();
        debug!(
            "Executing query: {}",
            truncate_for_log(&statement.sql, LOG_SQL_PREVIEW_LEN)
        );

        let params: Vec<&(dyn ToSql + Sync)> = statement
            .params
            .iter()
            .map(|p| &p.value as &(dyn ToSql + Sync))
            .collect();

        let stream = self.conn.query(&statement.sql, &params).await?;
        let rows: Vec<Row> = stream.try_collect().await?;

        debug!(
            "Query completed: {} rows in {} ms",
            rows.len(),
            start.elapsed().as_millis()
        );
        Ok(rows)
    }
}

impl CatalogConnection for PooledCatalog {
    async fn execute(&mut self, statement: &Statement) -> Result<u64, ServerError> {
        debug!(
            "Executing non-query: {}",
            truncate_for_log(&statement.sql, LOG_SQL_PREVIEW_LEN)
        );

        let params: Vec<&(dyn ToSql + Sync)> = statement
            .params
            .iter()
            .map(|p| &p.value as &(dyn ToSql + Sync))
            .collect();

        let rows_affected = self.conn.execute(&statement.sql, &params).await?;
        debug!("Non-query completed: {} rows affected", rows_affected);
        Ok(rows_affected)
    }

    async fn count(&mut self, statement: &Statement) -> Result<i64, ServerError> {
        let rows = self.query_rows(statement).await?;
        match rows.first() {
            Some(row) => Ok(i64::from(int_column(row, 0)?)),
            None => Err(ServerError::decode("COUNT(*) returned no rows")),
        }
    }

    async fn fetch_procedures(
        &mut self,
        statement: &Statement,
    ) -> Result<Vec<ProcedureRow>, ServerError> {
        let rows = self.query_rows(statement).await?;
        rows.iter().map(procedure_row).collect()
    }

    async fn fetch_parameters(
        &mut self,
        statement: &Statement,
    ) -> Result<Vec<ParameterMetadata>, ServerError> {
        let rows = self.query_rows(statement).await?;
        rows.iter().map(parameter_row).collect()
    }

    async fn fetch_definition(
        &mut self,
        statement: &Statement,
    ) -> Result<Option<DefinitionRow>, ServerError> {
        let rows = self.query_rows(statement).await?;
        rows.first().map(definition_row).transpose()
    }
}

fn procedure_row(row: &Row) -> Result<ProcedureRow, ServerError> {
    Ok(ProcedureRow {
        schema_name: text_column(row, 0)?,
        procedure_name: text_column(row, 1)?,
        create_date: parse_catalog_timestamp(&text_column(row, 2)?)?,
        modify_date: parse_catalog_timestamp(&text_column(row, 3)?)?,
        flags: ProcedureFlags {
            is_auto_executed: bit_column(row, 4)?,
            is_execution_replicated: bit_column(row, 5)?,
            is_repl_serializable_only: bit_column(row, 6)?,
            is_ms_shipped: bit_column(row, 7)?,
        },
    })
}

fn parameter_row(row: &Row) -> Result<ParameterMetadata, ServerError> {
    Ok(ParameterMetadata {
        name: text_column(row, 0)?,
        data_type: text_column(row, 1)?,
        max_length: int_column(row, 2)?,
        precision: int_column(row, 3)?,
        scale: int_column(row, 4)?,
        is_output: bit_column(row, 5)?,
        has_default_value: bit_column(row, 6)?,
        // sql_variant; NULL unless the default is known to the catalog
        default_value: row.try_get::<String>(7),
    })
}

fn definition_row(row: &Row) -> Result<DefinitionRow, ServerError> {
    Ok(DefinitionRow {
        definition: text_column(row, 0)?,
        create_date: parse_catalog_timestamp(&text_column(row, 1)?)?,
        modify_date: parse_catalog_timestamp(&text_column(row, 2)?)?,
    })
}

fn text_column(row: &Row, idx: usize) -> Result<String, ServerError> {
    row.get::<String>(idx)
        .map_err(|e| ServerError::decode(format!("column {} is not text: {}", idx, e)))
}

fn int_column(row: &Row, idx: usize) -> Result<i32, ServerError> {
    row.get::<i32>(idx)
        .map_err(|e| ServerError::decode(format!("column {} is not an INT: {}", idx, e)))
}

fn bit_column(row: &Row, idx: usize) -> Result<bool, ServerError> {
    row.get::<bool>(idx)
        .map_err(|e| ServerError::decode(format!("column {} is not a BIT: {}", idx, e)))
}

/// Truncate a string for logging purposes.
pub(crate) fn truncate_for_log(s: &str, max_len: usize) -> String {
    match s.char_indices().nth(max_len) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_for_log() {
        assert_eq!(truncate_for_log("short", 10), "short");
        assert_eq!(truncate_for_log("this is a long string", 10), "this is a ...");
        assert_eq!(truncate_for_log("exactly10!", 10), "exactly10!");
        assert_eq!(truncate_for_log("ééééé", 2), "éé...");
    }
}
