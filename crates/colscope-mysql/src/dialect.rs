//! MySQL identifier quoting and clause helpers

use colscope_core::{ColscopeError, IdentifierQuoter, Result};

/// Quotes identifiers with backticks, doubling embedded backticks
#[derive(Debug, Clone, Copy, Default)]
pub struct BacktickQuoter;

impl BacktickQuoter {
    pub fn new() -> Self {
        Self
    }
}

impl IdentifierQuoter for BacktickQuoter {
    fn quote(&self, name: &str, compound: bool) -> String {
        if compound {
            name.split('.')
                .map(escape_identifier_mysql)
                .collect::<Vec<_>>()
                .join(".")
        } else {
            escape_identifier_mysql(name)
        }
    }
}

/// Escape a MySQL identifier (column name, etc.)
pub fn escape_identifier_mysql(identifier: &str) -> String {
    format!("`{}`", identifier.replace('`', "``"))
}

/// Append a `LIMIT`/`OFFSET` clause to a SELECT statement
pub fn limit(sql: &str, count: i64, offset: i64) -> Result<String> {
    if count <= 0 {
        return Err(ColscopeError::InvalidArgument(format!(
            "LIMIT argument count={} is not valid",
            count
        )));
    }
    if offset < 0 {
        return Err(ColscopeError::InvalidArgument(format!(
            "LIMIT argument offset={} is not valid",
            offset
        )));
    }

    let mut sql = format!("{} LIMIT {}", sql, count);
    if offset > 0 {
        sql.push_str(&format!(" OFFSET {}", offset));
    }
    Ok(sql)
}
