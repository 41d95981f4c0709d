//! Seams between the tool operations and the database.
//!
//! Operations depend on a [`ConnectionProvider`] injected at construction.
//! Each call acquires one [`CatalogConnection`], runs its statements in
//! order, and drops the connection on every exit path.

use super::metadata::{DefinitionRow, ParameterMetadata, ProcedureRow};
use super::statements::Statement;
use crate::error::ServerError;
use std::future::Future;

/// Supplies open connections on demand.
pub trait ConnectionProvider: Send + Sync {
    /// The connection type handed out by this provider.
    type Connection: CatalogConnection;

    /// Acquire a connection. Dropping it releases it.
    fn acquire(&self) -> impl Future<Output = Result<Self::Connection, ServerError>> + Send;
}

/// A single open connection able to run the stored procedure statements.
///
/// Every method runs exactly one statement, once.
pub trait CatalogConnection: Send {
    /// Run a statement that returns no rows; yields the affected row count.
    fn execute(
        &mut self,
        statement: &Statement,
    ) -> impl Future<Output = Result<u64, ServerError>> + Send;

    /// Run a single-value `COUNT(*)` query.
    fn count(
        &mut self,
        statement: &Statement,
    ) -> impl Future<Output = Result<i64, ServerError>> + Send;

    /// Run the procedure listing query.
    fn fetch_procedures(
        &mut self,
        statement: &Statement,
    ) -> impl Future<Output = Result<Vec<ProcedureRow>, ServerError>> + Send;

    /// Run the parameter listing query.
    fn fetch_parameters(
        &mut self,
        statement: &Statement,
    ) -> impl Future<Output = Result<Vec<ParameterMetadata>, ServerError>> + Send;

    /// Run the definition lookup; `None` when no row came back.
    fn fetch_definition(
        &mut self,
        statement: &Statement,
    ) -> impl Future<Output = Result<Option<DefinitionRow>, ServerError>> + Send;
}
