//! Caller-side procedure types built per request.

use crate::error::ProcedureError;
use crate::security::{check_identifier_length, clean_name, quote_qualified, resolve_schema};
use std::fmt;

/// A schema-qualified stored procedure name.
///
/// The name is bracket-cleaned and guaranteed non-empty; the schema falls
/// back to `dbo` when absent or blank.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProcedureIdentity {
    schema: String,
    name: String,
}

impl ProcedureIdentity {
    /// Build an identity from raw caller input.
    pub fn new(name: &str, schema: Option<&str>) -> Result<Self, ProcedureError> {
        let name = clean_name(name.trim()).trim();
        if name.is_empty() {
            return Err(ProcedureError::validation("procedureName"));
        }
        check_identifier_length(name).map_err(|reason| ProcedureError::InvalidArgument {
            field: "procedureName",
            reason,
        })?;

        let schema = resolve_schema(schema);
        check_identifier_length(&schema).map_err(|reason| ProcedureError::InvalidArgument {
            field: "schema",
            reason,
        })?;

        Ok(Self {
            schema,
            name: name.to_string(),
        })
    }

    /// Identity of a procedure read back from the catalog, taken as-is.
    pub fn from_catalog(schema: &str, name: &str) -> Self {
        Self {
            schema: schema.to_string(),
            name: name.to_string(),
        }
    }

    /// Schema name, unquoted.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Procedure name, unquoted.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Bracket-quoted form used inside SQL text, e.g. `[dbo].[p1]`.
    pub fn quoted(&self) -> String {
        quote_qualified(&self.schema, &self.name)
    }
}

/// Displays as `schema.name`, the form reported back to callers.
impl fmt::Display for ProcedureIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

/// The pieces of a `CREATE`/`ALTER PROCEDURE` statement.
///
/// `parameter_spec` and `body` are inserted verbatim; no structural checks
/// are made on either.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcedureDefinition {
    pub identity: ProcedureIdentity,
    pub parameter_spec: Option<String>,
    pub body: String,
}

impl ProcedureDefinition {
    /// Build a definition, rejecting a blank body.
    ///
    /// A blank parameter list is treated as absent; any other list is kept
    /// exactly as given.
    pub fn new(
        identity: ProcedureIdentity,
        parameter_spec: Option<&str>,
        body: &str,
    ) -> Result<Self, ProcedureError> {
        if body.trim().is_empty() {
            return Err(ProcedureError::validation("sqlDefinition"));
        }

        let parameter_spec = parameter_spec
            .filter(|p| !p.trim().is_empty())
            .map(str::to_string);

        Ok(Self {
            identity,
            parameter_spec,
            body: body.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_cleans_and_defaults() {
        let id = ProcedureIdentity::new("[usp_Orders]", None).unwrap();
        assert_eq!(id.schema(), "dbo");
        assert_eq!(id.name(), "usp_Orders");
        assert_eq!(id.to_string(), "dbo.usp_Orders");
        assert_eq!(id.quoted(), "[dbo].[usp_Orders]");

        let id = ProcedureIdentity::new("p1", Some("sales")).unwrap();
        assert_eq!(id.to_string(), "sales.p1");
    }

    #[test]
    fn test_identity_rejects_blank_names() {
        for name in ["", "   ", "[]", "[[ ]]"] {
            let err = ProcedureIdentity::new(name, None).unwrap_err();
            assert!(err.is_validation(), "name: {:?}", name);
            assert!(err.to_string().contains("procedureName"));
        }
    }

    #[test]
    fn test_identity_rejects_long_names() {
        let err = ProcedureIdentity::new(&"p".repeat(200), None).unwrap_err();
        assert!(err.to_string().contains("procedureName is invalid"));
    }

    #[test]
    fn test_definition_validation() {
        let id = ProcedureIdentity::new("p1", None).unwrap();
        let err = ProcedureDefinition::new(id.clone(), None, "   ").unwrap_err();
        assert!(err.to_string().contains("sqlDefinition"));

        let def = ProcedureDefinition::new(id.clone(), Some("  "), "SELECT 1").unwrap();
        assert_eq!(def.parameter_spec, None);

        let def = ProcedureDefinition::new(id, Some(" @x INT,\n  @y INT "), "SELECT 1").unwrap();
        assert_eq!(def.parameter_spec.as_deref(), Some(" @x INT,\n  @y INT "));
    }
}
