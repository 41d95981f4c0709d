//! MCP server struct definition and initialization.

use crate::config::Config;
use crate::database::PoolProvider;
use crate::error::McpError;
use crate::procedures::ProcedureTools;
use std::sync::Arc;
use tracing::info;

/// The stored procedure MCP server instance.
///
/// This struct is cloned for each request, but the inner state
/// is shared via Arc.
#[derive(Clone)]
pub struct ProcedureMcpServer {
    /// Configuration.
    pub(crate) config: Arc<Config>,

    /// Stored procedure operations over the connection pool.
    pub(crate) tools: Arc<ProcedureTools<PoolProvider>>,
}

impl ProcedureMcpServer {
    /// Create a new server instance with the given configuration.
    ///
    /// Creates the connection pool and verifies that a connection can be
    /// established before returning.
    pub async fn new(config: Config) -> Result<Self, McpError> {
        let provider = PoolProvider::connect(&config.database).await?;
        info!("Connected to {}", config.database.server_label());
        Ok(Self::with_provider(config, provider))
    }

    /// Create a server over an already-built connection provider.
    pub fn with_provider(config: Config, provider: PoolProvider) -> Self {
        Self {
            config: Arc::new(config),
            tools: Arc::new(ProcedureTools::new(provider)),
        }
    }

    /// Create a server from environment variables.
    ///
    /// This is the standard way to create a server for production use.
    pub async fn from_env() -> Result<Self, McpError> {
        let config = Config::from_env()?;
        Self::new(config).await
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }
}
