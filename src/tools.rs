//! MCP tools for stored procedure management.
//!
//! - `create_stored_procedure`: Create a new stored procedure
//! - `update_stored_procedure`: Replace the definition of an existing procedure
//! - `list_stored_procedures`: List procedures with metadata and parameters
//! - `get_stored_procedure_definition`: Retrieve the stored text of a procedure
//! - `drop_stored_procedure`: Drop an existing procedure
//! - `health_check`: Test database connectivity
//!
//! Every tool answers with the pretty-printed `{success, data, error}`
//! envelope. Failed envelopes are flagged as tool errors.

mod inputs;

pub use inputs::*;

use crate::envelope::OperationResult;
use crate::server::ProcedureMcpServer;
use mcpkit::prelude::*;
use tracing::debug;

/// MCP server implementation containing the stored procedure tools.
///
/// The `#[mcp_server]` macro generates the MCP protocol infrastructure
/// for all `#[tool]` annotated methods.
#[mcp_server(
    name = "mssql-procedure-mcp",
    version = "0.1.0",
    instructions = "SQL Server stored procedure management - create, update, list, inspect and drop procedures"
)]
impl ProcedureMcpServer {
    /// Create a new stored procedure.
    #[tool(description = "Create a new stored procedure. The body is wrapped in AS BEGIN ... END; fails if the procedure already exists.")]
    pub async fn create_stored_procedure(
        &self,
        input: CreateProcedureInput,
    ) -> Result<ToolOutput, McpError> {
        debug!("Creating stored procedure: {}", input.procedure_name);

        let result = self
            .tools
            .create_procedure(
                &input.procedure_name,
                &input.sql_definition,
                input.parameters.as_deref(),
                input.schema.as_deref(),
            )
            .await;
        Ok(to_output(result))
    }

    /// Replace the definition of an existing stored procedure.
    #[tool(description = "Update an existing stored procedure with ALTER PROCEDURE. Fails if the procedure does not exist.")]
    pub async fn update_stored_procedure(
        &self,
        input: UpdateProcedureInput,
    ) -> Result<ToolOutput, McpError> {
        debug!("Updating stored procedure: {}", input.procedure_name);

        let result = self
            .tools
            .update_procedure(
                &input.procedure_name,
                &input.sql_definition,
                input.parameters.as_deref(),
                input.schema.as_deref(),
            )
            .await;
        Ok(to_output(result))
    }

    /// List stored procedures with their parameters.
    #[tool(description = "List stored procedures with metadata and parameters, optionally filtered by schema and a LIKE name pattern.")]
    pub async fn list_stored_procedures(
        &self,
        input: ListProceduresInput,
    ) -> Result<ToolOutput, McpError> {
        let result = self
            .tools
            .list_procedures(input.schema.as_deref(), input.procedure_name.as_deref())
            .await;
        Ok(to_output(result))
    }

    /// Retrieve the stored definition of a procedure.
    #[tool(description = "Get the full definition, timestamps and parameters of a stored procedure.")]
    pub async fn get_stored_procedure_definition(
        &self,
        input: GetProcedureDefinitionInput,
    ) -> Result<ToolOutput, McpError> {
        let result = self
            .tools
            .get_definition(&input.procedure_name, input.schema.as_deref())
            .await;
        Ok(to_output(result))
    }

    /// Drop an existing stored procedure.
    #[tool(description = "Drop an existing stored procedure. Fails if the procedure does not exist.")]
    pub async fn drop_stored_procedure(
        &self,
        input: DropProcedureInput,
    ) -> Result<ToolOutput, McpError> {
        debug!("Dropping stored procedure: {}", input.procedure_name);

        let result = self
            .tools
            .drop_procedure(&input.procedure_name, input.schema.as_deref())
            .await;
        Ok(to_output(result))
    }

    /// Check database connectivity.
    #[tool(description = "Check database connectivity and report latency.")]
    pub async fn health_check(&self, _input: HealthCheckInput) -> Result<ToolOutput, McpError> {
        Ok(to_output(self.tools.health_check().await))
    }
}

/// Render an envelope as tool output.
pub(crate) fn to_output(result: OperationResult) -> ToolOutput {
    let body = result.to_json_string();
    if result.success {
        ToolOutput::text(body)
    } else {
        ToolOutput::error(body)
    }
}
