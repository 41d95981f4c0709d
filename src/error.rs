//! Error types for the stored procedure MCP server.
//!
//! Two layers are defined here:
//!
//! - [`ServerError`] describes infrastructure faults (configuration, pool,
//!   driver) with SQL Server error code mapping.
//! - [`ProcedureError`] is the taxonomy reported by the tool operations. Its
//!   `Display` output is the exact text placed in a failed envelope.

pub use mcpkit::McpError;
use thiserror::Error;

/// Infrastructure errors raised below the tool operations.
///
/// Named `ServerError` to avoid collision with `mcpkit::McpError`. Variants
/// built from a SQL Server error display the server's message verbatim.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection error
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Authentication error
    #[error("{0}")]
    Authentication(String),

    /// Object not found (table, procedure, etc.)
    #[error("{0}")]
    ObjectNotFound(String),

    /// Object already exists
    #[error("{0}")]
    ObjectExists(String),

    /// Permission denied
    #[error("{0}")]
    PermissionDenied(String),

    /// Query execution error, carrying the driver-reported text.
    #[error("{message}")]
    QueryExecution {
        message: String,
        sql_error_code: Option<i32>,
    },

    /// Query or connection timeout
    #[error("{0}")]
    Timeout(String),

    /// A catalog row could not be decoded into its typed record.
    #[error("Unexpected catalog data: {0}")]
    Decode(String),
}

impl ServerError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a connection error.
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection {
            message: msg.into(),
            source: None,
        }
    }

    /// Create a connection error with a source.
    pub fn connection_with_source(
        msg: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connection {
            message: msg.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a query execution error.
    pub fn query_error(msg: impl Into<String>) -> Self {
        Self::QueryExecution {
            message: msg.into(),
            sql_error_code: None,
        }
    }

    /// Create a query execution error with the SQL Server error number.
    pub fn query_error_with_code(msg: impl Into<String>, code: i32) -> Self {
        Self::QueryExecution {
            message: msg.into(),
            sql_error_code: Some(code),
        }
    }

    /// Create a decode error.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }
}

/// Map SQL Server error codes to semantic ServerError types.
///
/// The driver text is preserved verbatim so callers see what SQL Server said.
pub fn from_sql_error(code: i32, message: &str) -> ServerError {
    match code {
        18456 => ServerError::Authentication(message.to_string()),

        208 | 2812 => ServerError::ObjectNotFound(message.to_string()),

        // There is already an object named '...' in the database.
        2714 => ServerError::ObjectExists(message.to_string()),

        229 | 230 | 262 => ServerError::PermissionDenied(message.to_string()),

        -2 => ServerError::Timeout(message.to_string()),

        _ => ServerError::query_error_with_code(message, code),
    }
}

/// Errors reported by the stored procedure tool operations.
///
/// Every variant is converted into a failed envelope at the operation
/// boundary; none of them reach the caller as a protocol error.
#[derive(Debug, Error)]
pub enum ProcedureError {
    /// A required textual argument was missing or blank.
    #[error("{field} is required and cannot be empty")]
    Validation { field: &'static str },

    /// An argument was present but unusable.
    #[error("{field} is invalid: {reason}")]
    InvalidArgument { field: &'static str, reason: String },

    /// The target procedure does not exist.
    #[error("{qualified_name} does not exist.{hint}")]
    NotFound {
        qualified_name: String,
        hint: &'static str,
    },

    /// The database rejected the statement or the connection failed.
    #[error("Failed to {action}: {source}")]
    Execution {
        action: &'static str,
        #[source]
        source: ServerError,
    },

    /// The existence probe passed but the definition lookup came back empty.
    #[error("Could not retrieve definition for {qualified_name}.")]
    Inconsistent { qualified_name: String },
}

impl ProcedureError {
    /// Suffix appended to "does not exist" errors raised by updates.
    pub const CREATE_HINT: &'static str = " Use CreateStoredProcedure to create it.";

    /// Create a validation error naming the offending field.
    pub fn validation(field: &'static str) -> Self {
        Self::Validation { field }
    }

    /// Create a not-found error without a hint.
    pub fn not_found(qualified_name: impl Into<String>) -> Self {
        Self::NotFound {
            qualified_name: qualified_name.into(),
            hint: "",
        }
    }

    /// Create a not-found error that points the caller at the create tool.
    pub fn not_found_use_create(qualified_name: impl Into<String>) -> Self {
        Self::NotFound {
            qualified_name: qualified_name.into(),
            hint: Self::CREATE_HINT,
        }
    }

    /// Returns a closure wrapping a [`ServerError`] for the given action,
    /// e.g. `"create stored procedure"`.
    pub fn execution(action: &'static str) -> impl FnOnce(ServerError) -> Self {
        move |source| Self::Execution { action, source }
    }

    /// Whether the error was detected before any database access.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::InvalidArgument { .. })
    }
}

/// Convert ServerError to mcpkit's McpError for protocol responses.
///
/// Tool operations never use this; they return failed envelopes instead.
/// This covers startup and other protocol-level failures.
impl From<ServerError> for McpError {
    fn from(e: ServerError) -> Self {
        match e {
            ServerError::Config(msg) => McpError::invalid_request(msg),
            other => McpError::internal(other.to_string()),
        }
    }
}

impl From<mssql_client::Error> for ServerError {
    fn from(e: mssql_client::Error) -> Self {
        use mssql_client::Error;

        match &e {
            Error::Server {
                number, message, ..
            } => from_sql_error(*number, message),
            Error::Io(_) => ServerError::connection(format!("IO error: {}", e)),
            Error::Tls(_) => ServerError::connection(format!("TLS error: {}", e)),
            Error::Protocol(_) => ServerError::connection(format!("Protocol error: {}", e)),
            Error::Authentication(_) => ServerError::Authentication(e.to_string()),
            Error::Connection(_) => ServerError::connection(e.to_string()),
            Error::ConnectionClosed => ServerError::connection("Connection closed"),
            Error::ConnectTimeout | Error::ConnectionTimeout | Error::CommandTimeout => {
                ServerError::Timeout(e.to_string())
            }
            Error::Type(_) => ServerError::decode(format!("Type conversion error: {}", e)),
            Error::Config(_) => ServerError::config(e.to_string()),
            Error::PoolExhausted => ServerError::connection("Connection pool exhausted"),
            _ => ServerError::query_error(e.to_string()),
        }
    }
}

impl From<mssql_driver_pool::PoolError> for ServerError {
    fn from(e: mssql_driver_pool::PoolError) -> Self {
        ServerError::connection(format!("Pool error: {}", e))
    }
}
