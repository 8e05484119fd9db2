//! colscope core - shared abstractions for column introspection
//!
//! This crate provides the types every other colscope crate depends on:
//!
//! - `Connection` - Trait for executing SQL against a database
//! - `IdentifierQuoter` - Trait for quoting table/column names
//! - `ConnectionConfig` / `CaseFolding` - Configuration
//! - Common types like `Value`, `Row`, `QueryResult`
//! - `ColscopeError` - The error type shared by all crates

mod config;
mod connection;
mod error;
mod types;

pub use config::*;
pub use connection::*;
pub use error::*;
pub use types::*;
