//! MySQL column introspection for colscope
//!
//! - `type_string` - Parsing of MySQL column type strings
//! - `column` - Column descriptors and type bounds
//! - `describe` - `SHOW FULL COLUMNS` based table description
//! - `upsert` - `INSERT ... ON DUPLICATE KEY UPDATE` synthesis
//! - `MySqlConnection` - `Connection` backed by mysql_async

mod column;
mod connection;
mod describe;
mod dialect;
mod type_string;
mod upsert;

pub use column::*;
pub use connection::MySqlConnection;
pub use describe::{ColumnKeyedTable, TableDescriber, primary_key_columns};
pub use dialect::{BacktickQuoter, escape_identifier_mysql, limit};
pub use type_string::{BaseType, TypeDescriptor, is_unsigned, parse as parse_type_string};
pub use upsert::*;
