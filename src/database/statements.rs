//! SQL statement assembly for stored procedure management.
//!
//! DDL statements are built by interpolating bracket-quoted identifiers and
//! the caller's raw parameter list and body. Catalog lookups never
//! interpolate caller values: names, schemas and patterns travel as bound
//! parameters (`@p1`, `@p2`, ...).

use super::types::{ProcedureDefinition, ProcedureIdentity};
use std::fmt;

/// A value bound to a positional `@pN` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundParam {
    /// What the value filters on (`"name"`, `"schema"`, `"pattern"`).
    pub role: &'static str,
    pub value: String,
}

/// SQL text plus its bound parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<BoundParam>,
}

impl Statement {
    /// A statement with no bound parameters.
    pub fn raw(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Bind a value and return its placeholder.
    fn bind(&mut self, role: &'static str, value: &str) -> String {
        self.params.push(BoundParam {
            role,
            value: value.to_string(),
        });
        format!("@p{}", self.params.len())
    }

    /// Look up a bound value by its role.
    pub fn param(&self, role: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.role == role)
            .map(|p| p.value.as_str())
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Which DDL keyword a definition is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DdlVerb {
    Create,
    Alter,
}

impl DdlVerb {
    fn keyword(self) -> &'static str {
        match self {
            DdlVerb::Create => "CREATE",
            DdlVerb::Alter => "ALTER",
        }
    }
}

/// Render `<VERB> PROCEDURE [schema].[name] <params>\nAS\nBEGIN\n<body>\nEND`.
///
/// The parameter segment, including its leading space, is omitted entirely
/// when there is no parameter list.
pub fn build_definition(verb: DdlVerb, definition: &ProcedureDefinition) -> Statement {
    let params = definition
        .parameter_spec
        .as_deref()
        .map(|p| format!(" {}", p))
        .unwrap_or_default();

    Statement::raw(format!(
        "{} PROCEDURE {}{}\nAS\nBEGIN\n{}\nEND",
        verb.keyword(),
        definition.identity.quoted(),
        params,
        definition.body
    ))
}

/// `CREATE PROCEDURE` for a new procedure.
pub fn build_create(definition: &ProcedureDefinition) -> Statement {
    build_definition(DdlVerb::Create, definition)
}

/// `ALTER PROCEDURE` for an existing procedure.
pub fn build_alter(definition: &ProcedureDefinition) -> Statement {
    build_definition(DdlVerb::Alter, definition)
}

/// `DROP PROCEDURE [schema].[name]`.
pub fn build_drop(identity: &ProcedureIdentity) -> Statement {
    Statement::raw(format!("DROP PROCEDURE {}", identity.quoted()))
}

/// Existence probe: a single `COUNT(*)` column.
pub fn exists_query(identity: &ProcedureIdentity) -> Statement {
    let mut stmt = Statement::raw(String::new());
    let name = stmt.bind("name", identity.name());
    let schema = stmt.bind("schema", identity.schema());
    stmt.sql = format!(
        "SELECT COUNT(*)
FROM sys.procedures p
INNER JOIN sys.schemas s ON p.schema_id = s.schema_id
WHERE p.name = {} AND s.name = {}",
        name, schema
    );
    stmt
}

/// Procedure listing with optional schema and `LIKE` name filters.
///
/// Columns, in order: schema_name, procedure_name, create_date, modify_date,
/// is_auto_executed, is_execution_replicated, is_repl_serializable_only,
/// is_ms_shipped.
pub fn list_query(schema: Option<&str>, name_pattern: Option<&str>) -> Statement {
    let mut stmt = Statement::raw(String::new());
    let mut sql = String::from(
        "SELECT
    s.name AS schema_name,
    p.name AS procedure_name,
    CONVERT(VARCHAR(23), p.create_date, 121) AS create_date,
    CONVERT(VARCHAR(23), p.modify_date, 121) AS modify_date,
    p.is_auto_executed,
    p.is_execution_replicated,
    p.is_repl_serializable_only,
    p.is_ms_shipped
FROM sys.procedures p
INNER JOIN sys.schemas s ON p.schema_id = s.schema_id
WHERE 1 = 1",
    );

    if let Some(schema) = schema {
        let placeholder = stmt.bind("schema", schema);
        sql.push_str(&format!("\n    AND s.name = {}", placeholder));
    }
    if let Some(pattern) = name_pattern {
        let placeholder = stmt.bind("pattern", pattern);
        sql.push_str(&format!("\n    AND p.name LIKE {}", placeholder));
    }
    sql.push_str("\nORDER BY s.name, p.name");

    stmt.sql = sql;
    stmt
}

/// Parameters of one procedure, in declaration order.
///
/// Columns, in order: name, data_type, max_length, precision, scale,
/// is_output, has_default_value, default_value.
pub fn parameters_query(identity: &ProcedureIdentity) -> Statement {
    let mut stmt = Statement::raw(String::new());
    let name = stmt.bind("name", identity.name());
    let schema = stmt.bind("schema", identity.schema());
    stmt.sql = format!(
        "SELECT
    par.name,
    t.name AS data_type,
    CAST(par.max_length AS INT) AS max_length,
    CAST(par.precision AS INT) AS precision,
    CAST(par.scale AS INT) AS scale,
    par.is_output,
    par.has_default_value,
    CONVERT(NVARCHAR(4000), par.default_value) AS default_value
FROM sys.parameters par
INNER JOIN sys.types t ON par.user_type_id = t.user_type_id
WHERE par.object_id = (
    SELECT p.object_id
    FROM sys.procedures p
    INNER JOIN sys.schemas s ON p.schema_id = s.schema_id
    WHERE p.name = {} AND s.name = {}
)
ORDER BY par.parameter_id",
        name, schema
    );
    stmt
}

/// Stored module text and timestamps of one procedure.
///
/// Columns, in order: definition, create_date, modify_date.
pub fn definition_query(identity: &ProcedureIdentity) -> Statement {
    let mut stmt = Statement::raw(String::new());
    let name = stmt.bind("name", identity.name());
    let schema = stmt.bind("schema", identity.schema());
    stmt.sql = format!(
        "SELECT
    m.definition,
    CONVERT(VARCHAR(23), p.create_date, 121) AS create_date,
    CONVERT(VARCHAR(23), p.modify_date, 121) AS modify_date
FROM sys.sql_modules m
INNER JOIN sys.procedures p ON m.object_id = p.object_id
INNER JOIN sys.schemas s ON p.schema_id = s.schema_id
WHERE p.name = {} AND s.name = {}",
        name, schema
    );
    stmt
}
