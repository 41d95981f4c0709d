//! Typed records for stored procedure catalog queries.
//!
//! Each catalog query in [`super::statements`] has one record type here,
//! populated by column position where the driver rows are consumed.

use crate::error::ServerError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Format produced by `CONVERT(VARCHAR(23), <datetime>, 121)`.
const CATALOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Parse a catalog timestamp rendered with style 121.
pub fn parse_catalog_timestamp(value: &str) -> Result<NaiveDateTime, ServerError> {
    NaiveDateTime::parse_from_str(value.trim(), CATALOG_TIMESTAMP_FORMAT)
        .map_err(|e| ServerError::decode(format!("invalid timestamp '{}': {}", value, e)))
}

/// Boolean flags from `sys.procedures`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureFlags {
    pub is_auto_executed: bool,
    pub is_execution_replicated: bool,
    pub is_repl_serializable_only: bool,
    pub is_ms_shipped: bool,
}

/// Stored procedure parameter metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterMetadata {
    pub name: String,
    pub data_type: String,
    pub max_length: i32,
    pub precision: i32,
    pub scale: i32,
    pub is_output: bool,
    pub has_default_value: bool,
    pub default_value: Option<String>,
}

/// One row of the procedure listing query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureRow {
    pub schema_name: String,
    pub procedure_name: String,
    pub create_date: NaiveDateTime,
    pub modify_date: NaiveDateTime,
    pub flags: ProcedureFlags,
}

impl ProcedureRow {
    /// Attach the procedure's parameter list.
    pub fn with_parameters(self, parameters: Vec<ParameterMetadata>) -> ProcedureMetadata {
        ProcedureMetadata {
            schema_name: self.schema_name,
            procedure_name: self.procedure_name,
            create_date: self.create_date,
            modify_date: self.modify_date,
            flags: self.flags,
            parameters,
        }
    }
}

/// Stored procedure metadata with its parameters, as reported by the list tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcedureMetadata {
    pub schema_name: String,
    pub procedure_name: String,
    pub create_date: NaiveDateTime,
    pub modify_date: NaiveDateTime,
    pub flags: ProcedureFlags,
    pub parameters: Vec<ParameterMetadata>,
}

/// The stored module text of a procedure and its timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinitionRow {
    pub definition: String,
    pub create_date: NaiveDateTime,
    pub modify_date: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_catalog_timestamp() {
        let ts = parse_catalog_timestamp("2024-03-05 14:07:09.123").unwrap();
        assert_eq!(ts.year(), 2024);
        assert_eq!(ts.month(), 3);
        assert_eq!(ts.hour(), 14);
        assert_eq!(ts.nanosecond(), 123_000_000);

        assert!(parse_catalog_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_metadata_serializes_camel_case_with_nested_flags() {
        let ts = parse_catalog_timestamp("2024-01-01 00:00:00.000").unwrap();
        let row = ProcedureRow {
            schema_name: "dbo".to_string(),
            procedure_name: "p1".to_string(),
            create_date: ts,
            modify_date: ts,
            flags: ProcedureFlags {
                is_ms_shipped: true,
                ..Default::default()
            },
        };
        let metadata = row.with_parameters(vec![ParameterMetadata {
            name: "@x".to_string(),
            data_type: "int".to_string(),
            max_length: 4,
            precision: 10,
            scale: 0,
            is_output: false,
            has_default_value: false,
            default_value: None,
        }]);

        let value = serde_json::to_value(&metadata).unwrap();
        assert_eq!(value["schemaName"], "dbo");
        assert_eq!(value["procedureName"], "p1");
        assert_eq!(value["flags"]["isMsShipped"], true);
        assert_eq!(value["flags"]["isAutoExecuted"], false);
        assert!(value.get("isMsShipped").is_none());
        assert_eq!(value["createDate"], "2024-01-01T00:00:00");
        assert_eq!(value["parameters"][0]["dataType"], "int");
        assert!(value["parameters"][0]["defaultValue"].is_null());
    }
}
