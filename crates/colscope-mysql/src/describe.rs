//! MySQL table description
//!
//! Reads `SHOW FULL COLUMNS` and turns each row into a [`ColumnDescriptor`].
//! Every call issues a fresh metadata query; nothing is cached.

use colscope_core::{
    CaseFolding, ColscopeError, Connection, IdentifierQuoter, Result, Row, Value,
};
use indexmap::IndexMap;
use std::sync::Arc;

use crate::column::ColumnDescriptor;
use crate::type_string;

/// Column name to descriptor, in ordinal order
pub type ColumnKeyedTable = IndexMap<String, ColumnDescriptor>;

/// Field positions in a `SHOW FULL COLUMNS` row. Position 7 (`Privileges`)
/// is not read.
mod field {
    pub const NAME: usize = 0;
    pub const TYPE: usize = 1;
    pub const COLLATION: usize = 2;
    pub const NULL: usize = 3;
    pub const KEY: usize = 4;
    pub const DEFAULT: usize = 5;
    pub const EXTRA: usize = 6;
    pub const COMMENT: usize = 8;
}

const PRIMARY_KEY_ROLE: &str = "PRI";
const AUTO_INCREMENT: &str = "auto_increment";

/// Describes tables through a [`Connection`]
#[derive(Clone)]
pub struct TableDescriber {
    connection: Arc<dyn Connection>,
    quoter: Arc<dyn IdentifierQuoter>,
    case_folding: CaseFolding,
}

impl TableDescriber {
    pub fn new(connection: Arc<dyn Connection>, quoter: Arc<dyn IdentifierQuoter>) -> Self {
        Self {
            connection,
            quoter,
            case_folding: CaseFolding::default(),
        }
    }

    /// Fold column and table names in results with `case_folding`
    pub fn with_case_folding(mut self, case_folding: CaseFolding) -> Self {
        self.case_folding = case_folding;
        self
    }

    pub fn case_folding(&self) -> CaseFolding {
        self.case_folding
    }

    /// Describe every column of `table`.
    ///
    /// A table without columns (normally: a table that does not exist on
    /// engines that answer with an empty result) yields an empty map.
    #[tracing::instrument(skip(self))]
    pub async fn describe_table(
        &self,
        table: &str,
        schema: Option<&str>,
    ) -> Result<ColumnKeyedTable> {
        let target = match schema {
            Some(schema) => format!("{}.{}", schema, table),
            None => table.to_string(),
        };
        let sql = format!("SHOW FULL COLUMNS FROM {}", self.quoter.quote(&target, true));
        tracing::debug!(sql = %sql, "describing table");

        let result = self.connection.query(&sql, &[]).await?;

        let table_name = self.case_folding.fold(table);
        let mut columns = ColumnKeyedTable::with_capacity(result.rows.len());
        let mut primary_key_position = 1;

        for (idx, row) in result.rows.iter().enumerate() {
            let mut descriptor = self.descriptor_from_row(row, &table_name, schema)?;
            descriptor.ordinal_position = idx as u32 + 1;
            if descriptor.is_primary_key {
                descriptor.primary_key_position = Some(primary_key_position);
                primary_key_position += 1;
            }
            columns.insert(descriptor.column_name.clone(), descriptor);
        }

        tracing::debug!(column_count = columns.len(), "table described");
        Ok(columns)
    }

    /// Describe a single column; fails with `ColumnNotFound` if absent.
    pub async fn describe_column(
        &self,
        table: &str,
        column: &str,
        schema: Option<&str>,
    ) -> Result<ColumnDescriptor> {
        let mut columns = self.describe_table(table, schema).await?;
        columns
            .shift_remove(&self.case_folding.fold(column))
            .ok_or_else(|| ColscopeError::ColumnNotFound {
                table: table.to_string(),
                column: column.to_string(),
            })
    }

    /// Name of the auto-increment column, if the table has one.
    ///
    /// Any column whose extra attribute is `auto_increment` counts, whether or
    /// not it belongs to the primary key.
    pub async fn auto_increment_column_name(
        &self,
        table: &str,
        schema: Option<&str>,
    ) -> Result<Option<String>> {
        let columns = self.describe_table(table, schema).await?;
        Ok(columns
            .into_values()
            .find(|column| column.extra == AUTO_INCREMENT)
            .map(|column| column.column_name))
    }

    /// Names of the tables in the current database
    #[tracing::instrument(skip(self))]
    pub async fn list_tables(&self) -> Result<Vec<String>> {
        let result = self.connection.query("SHOW TABLES", &[]).await?;
        Ok(result
            .rows
            .iter()
            .filter_map(|row| row.get(0).and_then(Value::to_text))
            .collect())
    }

    fn descriptor_from_row(
        &self,
        row: &Row,
        table_name: &str,
        schema: Option<&str>,
    ) -> Result<ColumnDescriptor> {
        let name = text(row, field::NAME).ok_or_else(|| {
            ColscopeError::Query("column metadata row has no field name".to_string())
        })?;
        let raw_type = text(row, field::TYPE).unwrap_or_default();
        let column_type = type_string::parse(&raw_type);

        let extra = text(row, field::EXTRA).unwrap_or_default();
        let is_primary_key = text(row, field::KEY)
            .is_some_and(|key| key.eq_ignore_ascii_case(PRIMARY_KEY_ROLE));
        let is_auto_increment = is_primary_key && extra == AUTO_INCREMENT;

        Ok(ColumnDescriptor {
            schema_name: schema.map(str::to_string),
            table_name: table_name.to_string(),
            column_name: self.case_folding.fold(&name),
            ordinal_position: 0,
            unsigned: column_type.unsigned,
            column_type,
            default_value: text(row, field::DEFAULT),
            nullable: text(row, field::NULL).as_deref() == Some("YES"),
            is_primary_key,
            primary_key_position: None,
            is_auto_increment,
            extra,
            comment: non_empty_text(row, field::COMMENT),
            collation: non_empty_text(row, field::COLLATION),
        })
    }
}

/// Primary key column names ordered by their key position
pub fn primary_key_columns(columns: &ColumnKeyedTable) -> Vec<String> {
    let mut keys: Vec<&ColumnDescriptor> = columns
        .values()
        .filter(|column| column.is_primary_key)
        .collect();
    keys.sort_by_key(|column| column.primary_key_position);
    keys.into_iter()
        .map(|column| column.column_name.clone())
        .collect()
}

fn text(row: &Row, idx: usize) -> Option<String> {
    row.get(idx).and_then(Value::to_text)
}

fn non_empty_text(row: &Row, idx: usize) -> Option<String> {
    text(row, idx).filter(|s| !s.is_empty())
}
