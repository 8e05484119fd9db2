//! Connection and identifier-quoting seams

use crate::{QueryResult, Result, StatementResult, Value};
use async_trait::async_trait;

/// A database connection
///
/// Each method performs one round-trip. Errors are returned exactly as the
/// driver produced them; callers never retry.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Get the driver name (e.g., "mysql")
    fn driver_name(&self) -> &str;

    /// Execute a statement that modifies data (INSERT/UPDATE/DELETE)
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<StatementResult>;

    /// Execute a query that returns rows
    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult>;

    /// Id generated by the most recent insert on this connection, as text.
    ///
    /// Drivers without the notion of generated ids return `None`.
    async fn last_insert_id(&self, _table: &str) -> Result<Option<String>> {
        Ok(None)
    }

    /// Close the connection
    async fn close(&self) -> Result<()>;
}

/// Quotes table and column names for embedding in generated SQL
pub trait IdentifierQuoter: Send + Sync {
    /// Quote `name`. With `compound` set, a dotted `schema.table` form is
    /// quoted part by part.
    fn quote(&self, name: &str, compound: bool) -> String;
}
