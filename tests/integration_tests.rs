//! Integration tests against a real SQL Server.
//!
//! These tests support two modes:
//! 1. **Testcontainers** (default): Automatically spins up SQL Server containers
//! 2. **External server**: Connect to existing server via MSSQL_HOST env var
//!
//! ## Running with testcontainers (requires Docker):
//! ```bash
//! cargo test --test integration_tests -- --ignored --test-threads=1
//! ```
//!
//! ## Running against external server (e.g., CI service container):
//! ```bash
//! MSSQL_HOST=localhost MSSQL_PORT=1433 MSSQL_PASSWORD='yourPass' \
//!   cargo test --test integration_tests -- --ignored --test-threads=1
//! ```
//!
//! Note: SQL Server container requires ~2GB RAM and takes 30-60 seconds to start.

use mssql_procedure_mcp::database::PoolProvider;
use mssql_procedure_mcp::{Config, OperationResult, ProcedureTools};
use serial_test::serial;
use std::collections::HashMap;
use std::time::Duration;
use testcontainers::{runners::AsyncRunner, ContainerAsync, ImageExt};
use testcontainers_modules::mssql_server::MssqlServer;

/// Default SA password for testcontainers.
const DEFAULT_SA_PASSWORD: &str = "yourStrong(!)Password";

/// Default SQL Server image tag for tests.
const DEFAULT_VERSION: &str = "2022-latest";

/// Get the SQL Server version to test against.
fn get_test_version() -> String {
    std::env::var("MSSQL_TEST_VERSION").unwrap_or_else(|_| DEFAULT_VERSION.to_string())
}

/// Check if we should use an external server (vs testcontainers).
fn use_external_server() -> bool {
    std::env::var("MSSQL_HOST").is_ok()
}

/// Helper struct to manage the test database.
/// Supports both testcontainers and external servers.
struct TestDatabase {
    #[allow(dead_code)] // Held for lifetime management (Drop trait on Container)
    container: Option<Box<ContainerAsync<MssqlServer>>>,
    host: String,
    port: u16,
    password: String,
}

impl TestDatabase {
    /// Uses external server if MSSQL_HOST is set, otherwise uses testcontainers.
    async fn new() -> Self {
        if use_external_server() {
            Self::from_external()
        } else {
            Self::from_testcontainer(&get_test_version()).await
        }
    }

    fn from_external() -> Self {
        let host = std::env::var("MSSQL_HOST").expect("MSSQL_HOST must be set");
        let port = std::env::var("MSSQL_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(1433);
        let password =
            std::env::var("MSSQL_PASSWORD").unwrap_or_else(|_| DEFAULT_SA_PASSWORD.to_string());

        eprintln!("Using external SQL Server at {}:{}", host, port);
        Self {
            container: None,
            host,
            port,
            password,
        }
    }

    async fn from_testcontainer(version: &str) -> Self {
        eprintln!("Starting SQL Server {} container via testcontainers...", version);

        let container = MssqlServer::default()
            .with_accept_eula()
            .with_tag(version)
            .start()
            .await
            .unwrap_or_else(|e| panic!("Failed to start SQL Server {} container: {}", version, e));

        let host = container.get_host().await.expect("Failed to get host");
        let port = container
            .get_host_port_ipv4(1433)
            .await
            .expect("Failed to get port");

        // Wait a bit for SQL Server to fully initialize
        tokio::time::sleep(Duration::from_secs(5)).await;

        Self {
            container: Some(Box::new(container)),
            host: host.to_string(),
            port,
            password: DEFAULT_SA_PASSWORD.to_string(),
        }
    }

    fn config(&self) -> Config {
        let vars: HashMap<String, String> = [
            ("MSSQL_HOST", self.host.clone()),
            ("MSSQL_PORT", self.port.to_string()),
            ("MSSQL_USER", "sa".to_string()),
            ("MSSQL_PASSWORD", self.password.clone()),
            ("MSSQL_DATABASE", "master".to_string()),
            ("MSSQL_TRUST_CERT", "true".to_string()),
            ("MSSQL_POOL_MAX", "2".to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        Config::from_vars(&vars).expect("valid test configuration")
    }

    async fn tools(&self) -> ProcedureTools<PoolProvider> {
        let provider = PoolProvider::connect(&self.config().database)
            .await
            .expect("Failed to create connection pool");
        ProcedureTools::new(provider)
    }
}

fn data(result: &OperationResult) -> &serde_json::Value {
    assert!(result.success, "expected success, got {:?}", result.error);
    result.data.as_ref().unwrap()
}

#[tokio::test]
#[ignore = "requires Docker"]
#[serial]
async fn test_health_check() {
    let db = TestDatabase::new().await;
    let tools = db.tools().await;

    let result = tools.health_check().await;
    assert_eq!(data(&result)["healthy"], true);
}

#[tokio::test]
#[ignore = "requires Docker"]
#[serial]
async fn test_procedure_lifecycle() {
    let db = TestDatabase::new().await;
    let tools = db.tools().await;
    let name = "usp_mcp_lifecycle_test";

    // Leftovers from an aborted run against an external server
    tools.drop_procedure(name, None).await;

    let result = tools
        .create_procedure(name, "SELECT @Id AS Id", Some("@Id INT"), None)
        .await;
    assert_eq!(data(&result)["procedureName"], format!("dbo.{}", name));

    let duplicate = tools
        .create_procedure(name, "SELECT 2", None, None)
        .await;
    assert!(!duplicate.success);
    assert!(duplicate
        .error
        .as_deref()
        .unwrap()
        .starts_with("Failed to create stored procedure:"));

    let result = tools.get_definition(name, None).await;
    let definition = data(&result);
    assert!(definition["definition"]
        .as_str()
        .unwrap()
        .contains("BEGIN\nSELECT @Id AS Id\nEND"));
    assert_eq!(definition["parameters"][0]["name"], "@Id");
    assert_eq!(definition["parameters"][0]["dataType"], "int");

    let result = tools
        .update_procedure(name, "SELECT @Flag AS Flag", Some("@Flag BIT"), None)
        .await;
    assert!(result.success, "{:?}", result.error);

    let result = tools.list_procedures(Some("dbo"), Some("%mcp_lifecycle%")).await;
    let listing = data(&result);
    assert_eq!(listing["count"], 1);
    assert_eq!(listing["procedures"][0]["parameters"][0]["name"], "@Flag");

    let result = tools.drop_procedure(name, None).await;
    assert!(result.success, "{:?}", result.error);

    let result = tools.get_definition(name, None).await;
    assert_eq!(
        result.error.as_deref(),
        Some(format!("dbo.{} does not exist.", name).as_str())
    );
}

#[tokio::test]
#[ignore = "requires Docker"]
#[serial]
async fn test_update_missing_procedure() {
    let db = TestDatabase::new().await;
    let tools = db.tools().await;

    let result = tools
        .update_procedure("usp_mcp_missing", "SELECT 1", None, None)
        .await;
    assert_eq!(
        result.error.as_deref(),
        Some("dbo.usp_mcp_missing does not exist. Use CreateStoredProcedure to create it.")
    );
}

#[tokio::test]
#[ignore = "requires Docker"]
#[serial]
async fn test_list_with_no_matches() {
    let db = TestDatabase::new().await;
    let tools = db.tools().await;

    let result = tools
        .list_procedures(None, Some("%no_such_procedure_xyz%"))
        .await;
    assert_eq!(data(&result)["count"], 0);
}
