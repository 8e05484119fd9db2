//! `INSERT ... ON DUPLICATE KEY UPDATE` synthesis
//!
//! [`build_upsert`] turns one or more rows into a statement with positional
//! `?` placeholders and a flat parameter list. [`Upserter`] resolves the
//! table's auto-increment column, executes the statement and reports the
//! generated id.
//!
//! The auto-increment primary key is never rewritten by the update clause.
//! For single-row input the clause ends with `pk = LAST_INSERT_ID(pk)` so the
//! id of an existing row is reported when the duplicate-key branch fires.

use colscope_core::{ColscopeError, Connection, IdentifierQuoter, Result, Value};
use indexmap::IndexMap;
use std::sync::Arc;

use crate::describe::TableDescriber;

/// Raw SQL expression, inlined verbatim and never bound
#[derive(Debug, Clone, PartialEq)]
pub struct SqlExpr(String);

impl SqlExpr {
    pub fn new(expr: impl Into<String>) -> Self {
        Self(expr.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A row value: either a bound parameter or an inline expression
#[derive(Debug, Clone, PartialEq)]
pub enum UpsertValue {
    Param(Value),
    Expr(SqlExpr),
}

impl From<Value> for UpsertValue {
    fn from(value: Value) -> Self {
        UpsertValue::Param(value)
    }
}

impl From<SqlExpr> for UpsertValue {
    fn from(expr: SqlExpr) -> Self {
        UpsertValue::Expr(expr)
    }
}

impl From<i32> for UpsertValue {
    fn from(v: i32) -> Self {
        UpsertValue::Param(Value::from(v))
    }
}

impl From<i64> for UpsertValue {
    fn from(v: i64) -> Self {
        UpsertValue::Param(Value::from(v))
    }
}

impl From<&str> for UpsertValue {
    fn from(v: &str) -> Self {
        UpsertValue::Param(Value::from(v))
    }
}

impl From<String> for UpsertValue {
    fn from(v: String) -> Self {
        UpsertValue::Param(Value::from(v))
    }
}

/// One row: column name to value, in column order
pub type UpsertRow = IndexMap<String, UpsertValue>;

/// Rows to upsert
#[derive(Debug, Clone)]
pub enum UpsertRows {
    /// A single row; the generated id can be reported afterwards
    Single(UpsertRow),
    /// Several rows sharing the same column set
    Many(Vec<UpsertRow>),
}

impl From<UpsertRow> for UpsertRows {
    fn from(row: UpsertRow) -> Self {
        UpsertRows::Single(row)
    }
}

impl From<Vec<UpsertRow>> for UpsertRows {
    fn from(rows: Vec<UpsertRow>) -> Self {
        UpsertRows::Many(rows)
    }
}

/// Right-hand side of a keyed update entry
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateValue {
    /// `col = VALUES(other)`
    FromInserted(String),
    /// `col = <expr>`
    Expr(SqlExpr),
    /// `col = ?`, bound after the row parameters
    Param(Value),
}

/// One entry of the `ON DUPLICATE KEY UPDATE` clause
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateColumn {
    /// `col = VALUES(col)`
    Inserted(String),
    Assign { column: String, value: UpdateValue },
}

impl UpdateColumn {
    pub fn inserted(column: impl Into<String>) -> Self {
        UpdateColumn::Inserted(column.into())
    }

    pub fn assign(column: impl Into<String>, value: UpdateValue) -> Self {
        UpdateColumn::Assign {
            column: column.into(),
            value,
        }
    }

    /// Column written by this entry
    pub fn target(&self) -> &str {
        match self {
            UpdateColumn::Inserted(column) => column,
            UpdateColumn::Assign { column, .. } => column,
        }
    }
}

impl From<&str> for UpdateColumn {
    fn from(column: &str) -> Self {
        UpdateColumn::Inserted(column.to_string())
    }
}

pub type UpdateSpec = Vec<UpdateColumn>;

/// Generated statement and its parameters
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertStatement {
    pub sql: String,
    pub params: Vec<Value>,
    /// Whether the generated id can be read back after execution
    pub may_return_generated_id: bool,
}

/// Result of executing an upsert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub affected_rows: u64,
    pub generated_id: Option<u64>,
}

/// Build an upsert statement.
///
/// Without an update spec, every row column except the auto-increment
/// primary key is updated from its inserted value.
pub fn build_upsert(
    quoter: &dyn IdentifierQuoter,
    table: &str,
    rows: &UpsertRows,
    update_spec: Option<&[UpdateColumn]>,
    auto_increment_column: Option<&str>,
) -> Result<UpsertStatement> {
    let (rows, may_return_generated_id): (&[UpsertRow], bool) = match rows {
        UpsertRows::Single(row) => (std::slice::from_ref(row), true),
        UpsertRows::Many(rows) => (rows.as_slice(), false),
    };

    let first = rows.first().ok_or_else(|| {
        ColscopeError::InvalidArgument("no rows given for insert".to_string())
    })?;
    if first.is_empty() {
        return Err(ColscopeError::InvalidArgument(
            "no columns given for insert".to_string(),
        ));
    }
    let columns: Vec<&str> = first.keys().map(String::as_str).collect();

    let mut params = Vec::new();
    let mut tuples = Vec::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        if row.len() != columns.len() || !columns.iter().all(|c| row.contains_key(*c)) {
            return Err(ColscopeError::SchemaMismatch(format!(
                "row {} does not have the same columns as the first row",
                idx + 1
            )));
        }
        let line: Vec<String> = columns
            .iter()
            .map(|column| match &row[*column] {
                UpsertValue::Expr(expr) => expr.as_str().to_string(),
                UpsertValue::Param(value) => {
                    params.push(value.clone());
                    "?".to_string()
                }
            })
            .collect();
        tuples.push(format!("({})", line.join(", ")));
    }

    let is_auto_increment =
        |column: &str| auto_increment_column.is_some_and(|pk| pk.eq_ignore_ascii_case(column));

    let default_spec: UpdateSpec;
    let update_spec = match update_spec {
        Some(spec) => spec,
        None => {
            default_spec = columns
                .iter()
                .filter(|&&column| !is_auto_increment(column))
                .map(|column| UpdateColumn::Inserted(column.to_string()))
                .collect();
            &default_spec[..]
        }
    };

    let mut updates = Vec::with_capacity(update_spec.len() + 1);
    for entry in update_spec {
        let target = entry.target();
        if is_auto_increment(target) {
            return Err(ColscopeError::PrimaryKeyUpdateUnsupported {
                column: target.to_string(),
            });
        }
        let quoted = quoter.quote(target, false);
        let value = match entry {
            UpdateColumn::Inserted(column) => format!("VALUES({})", quoter.quote(column, false)),
            UpdateColumn::Assign { value, .. } => match value {
                UpdateValue::FromInserted(source) => {
                    format!("VALUES({})", quoter.quote(source, false))
                }
                UpdateValue::Expr(expr) => expr.as_str().to_string(),
                UpdateValue::Param(value) => {
                    params.push(value.clone());
                    "?".to_string()
                }
            },
        };
        updates.push(format!("{} = {}", quoted, value));
    }

    if may_return_generated_id {
        if let Some(pk) = auto_increment_column {
            let quoted = quoter.quote(pk, false);
            updates.push(format!("{} = LAST_INSERT_ID({})", quoted, quoted));
        }
    }

    let quoted_columns: Vec<String> = columns
        .iter()
        .map(|column| quoter.quote(column, false))
        .collect();
    let mut sql = format!(
        "INSERT INTO {} ({}) VALUES {}",
        quoter.quote(table, true),
        quoted_columns.join(","),
        tuples.join(", ")
    );
    if !updates.is_empty() {
        sql.push_str(" ON DUPLICATE KEY UPDATE ");
        sql.push_str(&updates.join(", "));
    }

    Ok(UpsertStatement {
        sql,
        params,
        may_return_generated_id,
    })
}

/// Executes upserts against a connection
#[derive(Clone)]
pub struct Upserter {
    connection: Arc<dyn Connection>,
    quoter: Arc<dyn IdentifierQuoter>,
    describer: TableDescriber,
}

impl Upserter {
    pub fn new(connection: Arc<dyn Connection>, quoter: Arc<dyn IdentifierQuoter>) -> Self {
        let describer = TableDescriber::new(connection.clone(), quoter.clone());
        Self {
            connection,
            quoter,
            describer,
        }
    }

    /// Build the statement for `table`, resolving its auto-increment column
    /// with one describe round-trip.
    pub async fn prepare(
        &self,
        table: &str,
        rows: &UpsertRows,
        update_spec: Option<&[UpdateColumn]>,
    ) -> Result<UpsertStatement> {
        let auto_increment_column = self.describer.auto_increment_column_name(table, None).await?;
        build_upsert(
            self.quoter.as_ref(),
            table,
            rows,
            update_spec,
            auto_increment_column.as_deref(),
        )
    }

    /// Insert the rows, updating on duplicate key.
    ///
    /// For single-row input the id of the inserted (or matched) row is
    /// returned when the engine reports one.
    #[tracing::instrument(skip(self, rows, update_spec))]
    pub async fn insert_on_duplicate(
        &self,
        table: &str,
        rows: &UpsertRows,
        update_spec: Option<&[UpdateColumn]>,
    ) -> Result<UpsertOutcome> {
        let statement = self.prepare(table, rows, update_spec).await?;
        tracing::debug!(
            param_count = statement.params.len(),
            "executing upsert"
        );

        let result = self
            .connection
            .execute(&statement.sql, &statement.params)
            .await?;

        let generated_id = if statement.may_return_generated_id {
            self.connection
                .last_insert_id(table)
                .await?
                .and_then(|id| id.trim().parse::<u64>().ok())
                .filter(|id| *id > 0)
        } else {
            None
        };

        tracing::debug!(
            affected_rows = result.affected_rows,
            generated_id = ?generated_id,
            "upsert executed"
        );
        Ok(UpsertOutcome {
            affected_rows: result.affected_rows,
            generated_id,
        })
    }
}
