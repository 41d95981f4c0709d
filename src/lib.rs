//! # MSSQL Procedure MCP Server
//!
//! A Model Context Protocol (MCP) server for managing SQL Server stored
//! procedures.
//!
//! This crate provides tools to create, update, list, inspect and drop
//! stored procedures. Every tool answers with a uniform
//! `{success, data, error}` envelope ([`OperationResult`]).
//!
//! ## Architecture
//!
//! - [`procedures`]: the operations, generic over a [`database::ConnectionProvider`]
//! - [`database`]: statement assembly, catalog records and the pooled provider
//! - [`tools`]: the MCP tool surface over [`ProcedureMcpServer`]

pub mod config;
pub mod constants;
pub mod database;
pub mod envelope;
pub mod error;
pub mod procedures;
pub mod security;
pub mod server;
pub mod tools;

pub use config::Config;
pub use envelope::OperationResult;
pub use error::{McpError, ProcedureError, ServerError};
pub use procedures::ProcedureTools;
pub use server::ProcedureMcpServer;
