//! MySQL connection implementation

use async_trait::async_trait;
use chrono::{Datelike, Timelike};
use colscope_core::{
    ColscopeError, ColumnMeta, Connection, ConnectionConfig, QueryResult, Result, Row,
    StatementResult, Value,
};
use mysql_async::{
    Conn, Opts, OptsBuilder, Params, Pool, PoolConstraints, PoolOpts, Row as MySqlRow,
    consts::ColumnType, prelude::*,
};
use std::sync::atomic::{AtomicU64, Ordering};

const CHARSET_PARAM: &str = "charset";

/// MySQL connection wrapper
///
/// The pool is pinned to a single physical connection so that session state
/// such as `LAST_INSERT_ID()` carries over between calls.
pub struct MySqlConnection {
    pool: Pool,
    last_insert_id: AtomicU64,
}

impl MySqlConnection {
    /// Connect to a MySQL database
    pub async fn connect(
        host: &str,
        port: u16,
        database: Option<&str>,
        user: Option<&str>,
        password: Option<&str>,
    ) -> Result<Self> {
        Self::open(host, port, database, user, password, Vec::new()).await
    }

    /// Connect using a [`ConnectionConfig`], applying its `charset` parameter
    pub async fn connect_with_config(config: &ConnectionConfig) -> Result<Self> {
        let init = session_init(config)?;
        Self::open(
            &config.host,
            config.port,
            config.database.as_deref(),
            config.username.as_deref(),
            config.password.as_deref(),
            init,
        )
        .await
    }

    async fn open(
        host: &str,
        port: u16,
        database: Option<&str>,
        user: Option<&str>,
        password: Option<&str>,
        init: Vec<String>,
    ) -> Result<Self> {
        tracing::info!(host = %host, port = %port, database = ?database, "connecting to MySQL database");

        let mut opts_builder = OptsBuilder::from_opts(Opts::default())
            .ip_or_hostname(host)
            .tcp_port(port);

        if let Some(db) = database {
            opts_builder = opts_builder.db_name(Some(db));
        }
        if let Some(u) = user {
            opts_builder = opts_builder.user(Some(u));
        }
        if let Some(p) = password {
            opts_builder = opts_builder.pass(Some(p));
        }
        if !init.is_empty() {
            opts_builder = opts_builder.init(init);
        }

        let constraints = PoolConstraints::new(1, 1).ok_or_else(|| {
            ColscopeError::Connection(
                "Failed to configure MySQL pool constraints (min=1, max=1)".into(),
            )
        })?;
        let pool_opts = PoolOpts::default()
            .with_constraints(constraints)
            .with_reset_connection(false);
        opts_builder = opts_builder.pool_opts(pool_opts);

        let pool = Pool::new(Opts::from(opts_builder));
        // Verify connectivity by acquiring and releasing a connection
        drop(pool.get_conn().await.map_err(|e| {
            ColscopeError::Connection(format!("Failed to connect to MySQL: {}", e))
        })?);

        tracing::info!(host = %host, port = %port, database = ?database, "MySQL connection established");
        Ok(Self {
            pool,
            last_insert_id: AtomicU64::new(0),
        })
    }

    async fn get_conn(&self) -> Result<Conn> {
        self.pool
            .get_conn()
            .await
            .map_err(|e| ColscopeError::Connection(format!("Failed to get MySQL connection: {}", e)))
    }
}

/// Statements run when a session opens, derived from the connection parameters.
///
/// Only `charset` is understood; other parameters are logged and skipped.
fn session_init(config: &ConnectionConfig) -> Result<Vec<String>> {
    for key in config.params.keys().filter(|key| key.as_str() != CHARSET_PARAM) {
        tracing::warn!(param = %key, "ignoring unknown MySQL connection parameter");
    }

    let Some(charset) = config.get_string(CHARSET_PARAM) else {
        return Ok(Vec::new());
    };
    if charset.is_empty()
        || !charset
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(ColscopeError::Configuration(format!(
            "invalid charset \"{}\"",
            charset
        )));
    }
    Ok(vec![format!("SET NAMES {}", charset)])
}

/// Id to remember after a successful statement. The server reports 0 when
/// the statement generated no id.
fn generated_id(reported: Option<u64>) -> u64 {
    reported.unwrap_or(0)
}

fn params_for(params: &[Value]) -> Params {
    Params::Positional(params.iter().map(value_to_mysql_value).collect())
}

/// Convert our Value type to a mysql_async parameter
fn value_to_mysql_value(value: &Value) -> mysql_async::Value {
    match value {
        Value::Null => mysql_async::Value::NULL,
        Value::Bool(v) => mysql_async::Value::Int(*v as i64),
        Value::Int8(v) => mysql_async::Value::Int(*v as i64),
        Value::Int16(v) => mysql_async::Value::Int(*v as i64),
        Value::Int32(v) => mysql_async::Value::Int(*v as i64),
        Value::Int64(v) => mysql_async::Value::Int(*v),
        Value::UInt64(v) => mysql_async::Value::UInt(*v),
        Value::Float32(v) => mysql_async::Value::Float(*v),
        Value::Float64(v) => mysql_async::Value::Double(*v),
        Value::Decimal(v) | Value::String(v) => mysql_async::Value::Bytes(v.clone().into_bytes()),
        Value::Bytes(v) => mysql_async::Value::Bytes(v.clone()),
        Value::Json(v) => mysql_async::Value::Bytes(v.to_string().into_bytes()),
        Value::Date(d) => {
            mysql_async::Value::Date(d.year() as u16, d.month() as u8, d.day() as u8, 0, 0, 0, 0)
        }
        Value::Time(t) => mysql_async::Value::Time(
            false,
            0,
            t.hour() as u8,
            t.minute() as u8,
            t.second() as u8,
            t.nanosecond() / 1_000,
        ),
        Value::DateTime(dt) => mysql_async::Value::Date(
            dt.year() as u16,
            dt.month() as u8,
            dt.day() as u8,
            dt.hour() as u8,
            dt.minute() as u8,
            dt.second() as u8,
            dt.nanosecond() / 1_000,
        ),
    }
}

/// Convert mysql_async Value to our Value type, using column type metadata
/// to correctly interpret byte strings from the text protocol.
fn mysql_value_to_value(val: mysql_async::Value, col_type: ColumnType) -> Value {
    match val {
        mysql_async::Value::NULL => Value::Null,
        mysql_async::Value::Bytes(bytes) => match String::from_utf8(bytes) {
            Ok(s) => match col_type {
                ColumnType::MYSQL_TYPE_TINY
                | ColumnType::MYSQL_TYPE_SHORT
                | ColumnType::MYSQL_TYPE_LONG
                | ColumnType::MYSQL_TYPE_LONGLONG
                | ColumnType::MYSQL_TYPE_INT24
                | ColumnType::MYSQL_TYPE_YEAR => match s.parse::<i64>() {
                    Ok(v) => Value::Int64(v),
                    Err(_) => s.parse::<u64>().map(Value::UInt64).unwrap_or(Value::String(s)),
                },
                ColumnType::MYSQL_TYPE_FLOAT => {
                    s.parse::<f32>().map(Value::Float32).unwrap_or(Value::String(s))
                }
                ColumnType::MYSQL_TYPE_DOUBLE => {
                    s.parse::<f64>().map(Value::Float64).unwrap_or(Value::String(s))
                }
                ColumnType::MYSQL_TYPE_DECIMAL | ColumnType::MYSQL_TYPE_NEWDECIMAL => {
                    Value::Decimal(s)
                }
                _ => Value::String(s),
            },
            Err(e) => Value::Bytes(e.into_bytes()),
        },
        mysql_async::Value::Int(i) => Value::Int64(i),
        mysql_async::Value::UInt(u) => match i64::try_from(u) {
            Ok(v) => Value::Int64(v),
            Err(_) => Value::UInt64(u),
        },
        mysql_async::Value::Float(f) => Value::Float32(f),
        mysql_async::Value::Double(d) => Value::Float64(d),
        mysql_async::Value::Date(year, month, day, hour, min, sec, micro) => {
            let date = chrono::NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32);
            if hour == 0 && min == 0 && sec == 0 && micro == 0 {
                match date {
                    Some(date) => Value::Date(date),
                    None => Value::String(format!("{:04}-{:02}-{:02}", year, month, day)),
                }
            } else {
                match date.and_then(|d| {
                    d.and_hms_micro_opt(hour as u32, min as u32, sec as u32, micro)
                }) {
                    Some(dt) => Value::DateTime(dt),
                    None => Value::String(format!(
                        "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                        year, month, day, hour, min, sec
                    )),
                }
            }
        }
        mysql_async::Value::Time(negative, days, hours, mins, secs, micros) => {
            let total_hours = days * 24 + hours as u32;
            if !negative && total_hours < 24 {
                if let Some(t) = chrono::NaiveTime::from_hms_micro_opt(
                    total_hours,
                    mins as u32,
                    secs as u32,
                    micros,
                ) {
                    return Value::Time(t);
                }
            }
            let sign = if negative { "-" } else { "" };
            Value::String(format!(
                "{}{:02}:{:02}:{:02}.{:06}",
                sign, total_hours, mins, secs, micros
            ))
        }
    }
}

fn convert_rows(mysql_rows: Vec<MySqlRow>) -> (Vec<ColumnMeta>, Vec<Row>) {
    let mut columns = Vec::new();
    let mut column_names = Vec::new();
    let mut column_types = Vec::new();

    if let Some(first_row) = mysql_rows.first() {
        for (idx, col) in first_row.columns_ref().iter().enumerate() {
            let name = col.name_str().to_string();
            column_names.push(name.clone());
            column_types.push(col.column_type());
            columns.push(ColumnMeta {
                name,
                data_type: format!("{:?}", col.column_type()),
                ordinal: idx,
            });
        }
    }

    let rows = mysql_rows
        .into_iter()
        .map(|mut mysql_row| {
            let values = column_types
                .iter()
                .enumerate()
                .map(|(idx, col_type)| {
                    let mysql_val: mysql_async::Value =
                        mysql_row.take(idx).unwrap_or(mysql_async::Value::NULL);
                    mysql_value_to_value(mysql_val, *col_type)
                })
                .collect();
            Row::new(column_names.clone(), values)
        })
        .collect();

    (columns, rows)
}

#[async_trait]
impl Connection for MySqlConnection {
    fn driver_name(&self) -> &str {
        "mysql"
    }

    #[tracing::instrument(skip(self, sql, params), fields(sql_preview = %sql.chars().take(100).collect::<String>()))]
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<StatementResult> {
        self.last_insert_id.store(0, Ordering::SeqCst);
        let mut conn = self.get_conn().await?;

        let executed = if params.is_empty() {
            conn.query_drop(sql).await
        } else {
            conn.exec_drop(sql, params_for(params)).await
        };
        executed.map_err(ColscopeError::driver)?;

        let affected_rows = conn.affected_rows();
        let last_insert_id = conn.last_insert_id();
        self.last_insert_id
            .store(generated_id(last_insert_id), Ordering::SeqCst);

        tracing::debug!(affected_rows = affected_rows, last_insert_id = ?last_insert_id, "statement executed");
        Ok(StatementResult {
            affected_rows,
            last_insert_id,
        })
    }

    #[tracing::instrument(skip(self, sql, params), fields(sql_preview = %sql.chars().take(100).collect::<String>()))]
    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        let start_time = std::time::Instant::now();
        let mut conn = self.get_conn().await?;

        let mysql_rows: Vec<MySqlRow> = if params.is_empty() {
            conn.query(sql).await
        } else {
            conn.exec(sql, params_for(params)).await
        }
        .map_err(ColscopeError::driver)?;
        let (columns, rows) = convert_rows(mysql_rows);

        let execution_time_ms = start_time.elapsed().as_millis() as u64;
        tracing::debug!(
            row_count = rows.len(),
            execution_time_ms = execution_time_ms,
            "query executed"
        );
        Ok(QueryResult {
            columns,
            rows,
            affected_rows: 0,
            execution_time_ms,
        })
    }

    async fn last_insert_id(&self, _table: &str) -> Result<Option<String>> {
        match self.last_insert_id.load(Ordering::SeqCst) {
            0 => Ok(None),
            id => Ok(Some(id.to_string())),
        }
    }

    async fn close(&self) -> Result<()> {
        tracing::info!("closing MySQL connection");
        self.pool
            .clone()
            .disconnect()
            .await
            .map_err(ColscopeError::driver)
    }
}
