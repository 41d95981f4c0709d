//! SQL Server identifier handling.
//!
//! Procedure and schema names supplied by callers are cleaned of surrounding
//! brackets and rendered with SQL Server's bracket notation `[identifier]`.
//! Bracket-quoting is the only protection applied to identifiers; values that
//! are compared against catalog views are always sent as bound parameters.

use crate::constants::{DEFAULT_SCHEMA, MAX_IDENTIFIER_LENGTH};

/// Strip every leading and trailing `[` / `]` from a name.
///
/// This is a purely textual trim and is idempotent.
///
/// # Examples
///
/// ```
/// use mssql_procedure_mcp::security::clean_name;
///
/// assert_eq!(clean_name("[usp_GetOrders]"), "usp_GetOrders");
/// assert_eq!(clean_name("usp_GetOrders"), "usp_GetOrders");
/// ```
pub fn clean_name(name: &str) -> &str {
    name.trim_matches(|c| c == '[' || c == ']')
}

/// Resolve an optional schema argument, defaulting to `dbo`.
///
/// Absent, empty, and whitespace-only schemas all resolve to the default.
/// Other values are trimmed and bracket-cleaned like procedure names.
pub fn resolve_schema(schema: Option<&str>) -> String {
    match schema.map(str::trim).map(clean_name) {
        Some(s) if !s.trim().is_empty() => s.to_string(),
        _ => DEFAULT_SCHEMA.to_string(),
    }
}

/// Render a single identifier in bracket notation.
///
/// Embedded right brackets are doubled, as SQL Server requires inside a
/// bracket-delimited identifier.
pub fn quote_identifier(identifier: &str) -> String {
    format!("[{}]", identifier.replace(']', "]]"))
}

/// Render a schema-qualified identifier, e.g. `[dbo].[usp_GetOrders]`.
pub fn quote_qualified(schema: &str, name: &str) -> String {
    format!("{}.{}", quote_identifier(schema), quote_identifier(name))
}

/// Check that an identifier fits in a `sysname`.
pub fn check_identifier_length(identifier: &str) -> Result<(), String> {
    let len = identifier.chars().count();
    if len > MAX_IDENTIFIER_LENGTH {
        return Err(format!(
            "identifier is {} characters long, the maximum is {}",
            len, MAX_IDENTIFIER_LENGTH
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name("[p1]"), "p1");
        assert_eq!(clean_name("[[p1]]"), "p1");
        assert_eq!(clean_name("p1]"), "p1");
        assert_eq!(clean_name("p[1]x"), "p[1]x");
        assert_eq!(clean_name("[]"), "");
    }

    #[test]
    fn test_clean_name_is_idempotent() {
        for input in ["p1", "[p1]", "[[p1", "p1]]", "[a]b[c]", "", "[]", " [p] "] {
            let once = clean_name(input);
            assert_eq!(clean_name(once), once, "input: {:?}", input);
        }
    }

    #[test]
    fn test_resolve_schema_defaults() {
        assert_eq!(resolve_schema(None), "dbo");
        assert_eq!(resolve_schema(Some("")), "dbo");
        assert_eq!(resolve_schema(Some("   ")), "dbo");
        assert_eq!(resolve_schema(Some("[]")), "dbo");
    }

    #[test]
    fn test_resolve_schema_explicit() {
        assert_eq!(resolve_schema(Some("sales")), "sales");
        assert_eq!(resolve_schema(Some(" [sales] ")), "sales");
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier("Users"), "[Users]");
        assert_eq!(quote_identifier("My Proc"), "[My Proc]");
        assert_eq!(quote_identifier("a]b"), "[a]]b]");
        assert_eq!(quote_qualified("dbo", "p1"), "[dbo].[p1]");
    }

    #[test]
    fn test_identifier_length() {
        assert!(check_identifier_length(&"a".repeat(128)).is_ok());
        assert!(check_identifier_length(&"a".repeat(129)).is_err());
    }
}
