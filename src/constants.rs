//! Centralized constants for the stored procedure MCP server.
//!
//! Magic numbers and default values used throughout the codebase live here.

use std::time::Duration;

// =============================================================================
// Identifier Constants
// =============================================================================

/// Schema used when the caller does not supply one.
pub const DEFAULT_SCHEMA: &str = "dbo";

/// Maximum length for SQL Server identifiers (`sysname`).
pub const MAX_IDENTIFIER_LENGTH: usize = 128;

/// Placeholder reported in place of an absent parameter list.
pub const NO_PARAMETERS: &str = "None";

// =============================================================================
// Connection Constants
// =============================================================================

/// Default SQL Server port.
pub const DEFAULT_PORT: u16 = 1433;

/// Application name reported to SQL Server.
pub const DEFAULT_APPLICATION_NAME: &str = "mssql-procedure-mcp";

/// Default connection timeout in seconds.
pub const DEFAULT_CONNECTION_TIMEOUT_SECS: u64 = 30;

/// Default idle connection timeout in seconds.
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 300;

/// Default connection timeout as Duration.
pub const DEFAULT_CONNECTION_TIMEOUT: Duration =
    Duration::from_secs(DEFAULT_CONNECTION_TIMEOUT_SECS);

/// Default idle timeout as Duration.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(DEFAULT_IDLE_TIMEOUT_SECS);

// =============================================================================
// Connection Pool Constants
// =============================================================================

/// Default minimum connections in pool.
pub const DEFAULT_MIN_CONNECTIONS: u32 = 1;

/// Default maximum connections in pool.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

// =============================================================================
// Logging Constants
// =============================================================================

/// Maximum number of characters of SQL text written to the log.
pub const LOG_SQL_PREVIEW_LEN: usize = 200;
