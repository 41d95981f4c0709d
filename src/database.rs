//! Database connectivity, statement assembly and catalog records.

pub mod catalog;
mod connection;
pub mod metadata;
pub mod statements;
pub mod types;

pub use catalog::{CatalogConnection, ConnectionProvider};
pub use connection::{create_pool, ConnectionPool, PoolProvider, PooledCatalog, PooledConn};
pub use metadata::{
    DefinitionRow, ParameterMetadata, ProcedureFlags, ProcedureMetadata, ProcedureRow,
};
pub use statements::{BoundParam, Statement};
pub use types::{ProcedureDefinition, ProcedureIdentity};
