//! Tool input types with JSON Schema generation.
//!
//! Field names follow the camelCase argument names callers send. Required
//! text fields default to empty so a missing value is reported by the
//! operation as a failed envelope rather than rejected at decode time.

use mcpkit::ToolInput;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Input for the `create_stored_procedure` tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, ToolInput)]
#[serde(rename_all = "camelCase")]
pub struct CreateProcedureInput {
    /// Name of the stored procedure to create.
    #[serde(default)]
    #[schemars(description = "Name of the stored procedure; surrounding brackets are ignored")]
    pub procedure_name: String,

    /// Body placed between BEGIN and END.
    #[serde(default)]
    #[schemars(description = "SQL body of the procedure, placed between BEGIN and END")]
    pub sql_definition: String,

    /// Parameter declarations inserted after the name.
    #[serde(default)]
    #[schemars(description = "Parameter declarations, e.g. '@Id INT, @Name NVARCHAR(50)'")]
    pub parameters: Option<String>,

    /// Schema name (default: dbo).
    #[serde(default)]
    #[schemars(description = "Schema name (default: dbo)")]
    pub schema: Option<String>,
}

/// Input for the `update_stored_procedure` tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, ToolInput)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProcedureInput {
    /// Name of the existing stored procedure.
    #[serde(default)]
    #[schemars(description = "Name of the existing stored procedure")]
    pub procedure_name: String,

    /// Replacement body placed between BEGIN and END.
    #[serde(default)]
    #[schemars(description = "New SQL body of the procedure, placed between BEGIN and END")]
    pub sql_definition: String,

    /// Replacement parameter declarations.
    #[serde(default)]
    #[schemars(description = "New parameter declarations; omit for none")]
    pub parameters: Option<String>,

    /// Schema name (default: dbo).
    #[serde(default)]
    #[schemars(description = "Schema name (default: dbo)")]
    pub schema: Option<String>,
}

/// Input for the `list_stored_procedures` tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, ToolInput)]
#[serde(rename_all = "camelCase")]
pub struct ListProceduresInput {
    /// Only list procedures in this schema.
    #[serde(default)]
    #[schemars(description = "Filter by schema name")]
    pub schema: Option<String>,

    /// LIKE pattern applied to the procedure name.
    #[serde(default)]
    #[schemars(description = "Filter by procedure name using LIKE wildcards, e.g. '%order%'")]
    pub procedure_name: Option<String>,
}

/// Input for the `get_stored_procedure_definition` tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, ToolInput)]
#[serde(rename_all = "camelCase")]
pub struct GetProcedureDefinitionInput {
    /// Name of the stored procedure.
    #[serde(default)]
    #[schemars(description = "Name of the stored procedure")]
    pub procedure_name: String,

    /// Schema name (default: dbo).
    #[serde(default)]
    #[schemars(description = "Schema name (default: dbo)")]
    pub schema: Option<String>,
}

/// Input for the `drop_stored_procedure` tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, ToolInput)]
#[serde(rename_all = "camelCase")]
pub struct DropProcedureInput {
    /// Name of the stored procedure to drop.
    #[serde(default)]
    #[schemars(description = "Name of the stored procedure to drop")]
    pub procedure_name: String,

    /// Schema name (default: dbo).
    #[serde(default)]
    #[schemars(description = "Schema name (default: dbo)")]
    pub schema: Option<String>,
}

/// Input for the `health_check` tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, ToolInput)]
pub struct HealthCheckInput {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_input_uses_camel_case() {
        let input: CreateProcedureInput = serde_json::from_value(json!({
            "procedureName": "usp_Orders",
            "sqlDefinition": "SELECT 1",
            "parameters": "@Id INT",
            "schema": "sales"
        }))
        .unwrap();

        assert_eq!(input.procedure_name, "usp_Orders");
        assert_eq!(input.sql_definition, "SELECT 1");
        assert_eq!(input.parameters.as_deref(), Some("@Id INT"));
        assert_eq!(input.schema.as_deref(), Some("sales"));
    }

    #[test]
    fn test_missing_required_fields_default_to_empty() {
        let input: UpdateProcedureInput = serde_json::from_value(json!({})).unwrap();
        assert!(input.procedure_name.is_empty());
        assert!(input.sql_definition.is_empty());
        assert!(input.parameters.is_none());
    }

    #[test]
    fn test_list_input_filters_are_optional() {
        let input: ListProceduresInput =
            serde_json::from_value(json!({ "procedureName": "%test%" })).unwrap();
        assert_eq!(input.schema, None);
        assert_eq!(input.procedure_name.as_deref(), Some("%test%"));
    }
}
