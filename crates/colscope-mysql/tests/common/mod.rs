//! Common test utilities and mocks

#![allow(dead_code)]

use async_trait::async_trait;
use colscope_core::{
    ColscopeError, ColumnMeta, Connection, QueryResult, Result, Row, StatementResult, Value,
};
use std::sync::Arc;

/// Column names of a `SHOW FULL COLUMNS` result
pub const SHOW_FULL_COLUMNS_FIELDS: [&str; 9] = [
    "Field",
    "Type",
    "Collation",
    "Null",
    "Key",
    "Default",
    "Extra",
    "Privileges",
    "Comment",
];

/// Mock connection for testing describe and upsert logic without a real
/// database.
///
/// Queries are answered from SQL-pattern-based responses. Every statement is
/// logged together with its parameters for assertion in tests.
pub struct MockConnection {
    pub should_fail: bool,
    /// SQL-pattern-based responses: if a query contains the pattern string,
    /// the corresponding result is returned.
    pub query_responses: Vec<(String, QueryResult)>,
    pub affected_rows: u64,
    pub last_insert_id: Option<String>,
    /// Log of all SQL queries executed, for assertion in tests
    pub query_log: Arc<parking_lot::Mutex<Vec<String>>>,
    /// Log of executed statements and their parameters
    pub execute_log: Arc<parking_lot::Mutex<Vec<(String, Vec<Value>)>>>,
}

impl MockConnection {
    pub fn new() -> Self {
        Self {
            should_fail: false,
            query_responses: vec![],
            affected_rows: 1,
            last_insert_id: None,
            query_log: Arc::new(parking_lot::Mutex::new(Vec::new())),
            execute_log: Arc::new(parking_lot::Mutex::new(Vec::new())),
        }
    }

    pub fn with_failure(mut self) -> Self {
        self.should_fail = true;
        self
    }

    /// Register a response for queries containing the given SQL pattern.
    pub fn with_query_response(
        mut self,
        sql_contains: impl Into<String>,
        result: QueryResult,
    ) -> Self {
        self.query_responses.push((sql_contains.into(), result));
        self
    }

    pub fn with_affected_rows(mut self, affected_rows: u64) -> Self {
        self.affected_rows = affected_rows;
        self
    }

    pub fn with_last_insert_id(mut self, id: impl Into<String>) -> Self {
        self.last_insert_id = Some(id.into());
        self
    }

    pub fn query_log(&self) -> Vec<String> {
        self.query_log.lock().clone()
    }

    pub fn execute_log(&self) -> Vec<(String, Vec<Value>)> {
        self.execute_log.lock().clone()
    }
}

#[async_trait]
impl Connection for MockConnection {
    fn driver_name(&self) -> &str {
        "mock"
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> Result<StatementResult> {
        self.execute_log
            .lock()
            .push((sql.to_string(), params.to_vec()));

        if self.should_fail {
            return Err(ColscopeError::Query("Execute failed".into()));
        }
        Ok(StatementResult {
            affected_rows: self.affected_rows,
            last_insert_id: self.last_insert_id.as_deref().and_then(|id| id.parse().ok()),
        })
    }

    async fn query(&self, sql: &str, _params: &[Value]) -> Result<QueryResult> {
        self.query_log.lock().push(sql.to_string());

        if self.should_fail {
            return Err(ColscopeError::Query("Query failed".into()));
        }

        for (pattern, result) in &self.query_responses {
            if sql.contains(pattern.as_str()) {
                return Ok(result.clone());
            }
        }
        Ok(QueryResult::empty())
    }

    async fn last_insert_id(&self, _table: &str) -> Result<Option<String>> {
        Ok(self.last_insert_id.clone())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// One row of `SHOW FULL COLUMNS` output
pub struct ColumnRow {
    pub field: &'static str,
    pub type_: &'static str,
    pub collation: Option<&'static str>,
    pub null: &'static str,
    pub key: &'static str,
    pub default: Option<&'static str>,
    pub extra: &'static str,
    pub comment: &'static str,
}

impl ColumnRow {
    pub fn new(field: &'static str, type_: &'static str) -> Self {
        Self {
            field,
            type_,
            collation: None,
            null: "NO",
            key: "",
            default: None,
            extra: "",
            comment: "",
        }
    }

    pub fn primary(mut self) -> Self {
        self.key = "PRI";
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.extra = "auto_increment";
        self
    }

    pub fn nullable(mut self) -> Self {
        self.null = "YES";
        self
    }

    pub fn default(mut self, default: &'static str) -> Self {
        self.default = Some(default);
        self
    }

    pub fn collation(mut self, collation: &'static str) -> Self {
        self.collation = Some(collation);
        self
    }

    pub fn comment(mut self, comment: &'static str) -> Self {
        self.comment = comment;
        self
    }

    fn into_row(self) -> Row {
        let columns = SHOW_FULL_COLUMNS_FIELDS
            .iter()
            .map(|name| name.to_string())
            .collect();
        Row::new(
            columns,
            vec![
                Value::from(self.field),
                Value::from(self.type_),
                Value::from(self.collation),
                Value::from(self.null),
                Value::from(self.key),
                Value::from(self.default),
                Value::from(self.extra),
                Value::from("select,insert,update,references"),
                Value::from(self.comment),
            ],
        )
    }
}

/// Build a `SHOW FULL COLUMNS` result from column rows
pub fn show_full_columns(rows: Vec<ColumnRow>) -> QueryResult {
    let columns = SHOW_FULL_COLUMNS_FIELDS
        .iter()
        .enumerate()
        .map(|(ordinal, name)| ColumnMeta {
            name: name.to_string(),
            data_type: "MYSQL_TYPE_VAR_STRING".to_string(),
            ordinal,
        })
        .collect();
    QueryResult {
        columns,
        rows: rows.into_iter().map(ColumnRow::into_row).collect(),
        ..QueryResult::default()
    }
}

/// Build a single-column result, one row per value
pub fn single_column(name: &str, values: &[&str]) -> QueryResult {
    QueryResult {
        columns: vec![ColumnMeta {
            name: name.to_string(),
            data_type: "MYSQL_TYPE_VAR_STRING".to_string(),
            ordinal: 0,
        }],
        rows: values
            .iter()
            .map(|value| Row::new(vec![name.to_string()], vec![Value::from(*value)]))
            .collect(),
        ..QueryResult::default()
    }
}

/// Route tracing output through the test harness
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("colscope_mysql=debug")
        .try_init();
}
