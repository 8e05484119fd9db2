//! Tests for table description over a mocked connection

mod common;

use colscope_core::{CaseFolding, ColscopeError};
use colscope_mysql::{
    BacktickQuoter, BaseType, TableDescriber, TypeBounds, primary_key_columns,
};
use common::{ColumnRow, MockConnection, init_tracing, show_full_columns, single_column};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn users_table() -> MockConnection {
    MockConnection::new().with_query_response(
        "SHOW FULL COLUMNS",
        show_full_columns(vec![
            ColumnRow::new("id", "int(10) unsigned")
                .primary()
                .auto_increment(),
            ColumnRow::new("name", "varchar(64)")
                .collation("utf8mb4_general_ci")
                .nullable()
                .comment("display name"),
            ColumnRow::new("tenant", "smallint(6)").primary().default("1"),
            ColumnRow::new("balance", "decimal(12,2)").default("0.00"),
        ]),
    )
}

fn describer(connection: Arc<MockConnection>) -> TableDescriber {
    TableDescriber::new(connection, Arc::new(BacktickQuoter))
}

// =============================================================================
// Describe Table Tests
// =============================================================================

#[tokio::test]
async fn test_describe_table_ordinals_and_primary_keys() {
    init_tracing();
    let mock = Arc::new(users_table());

    let columns = describer(mock.clone())
        .describe_table("users", None)
        .await
        .unwrap();

    let names: Vec<&str> = columns.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["id", "name", "tenant", "balance"]);

    let ordinals: Vec<u32> = columns.values().map(|c| c.ordinal_position).collect();
    assert_eq!(ordinals, vec![1, 2, 3, 4]);

    assert_eq!(columns["id"].primary_key_position, Some(1));
    assert_eq!(columns["tenant"].primary_key_position, Some(2));
    assert_eq!(columns["name"].primary_key_position, None);
    assert!(columns["id"].is_primary_key);
    assert!(!columns["balance"].is_primary_key);

    assert_eq!(mock.query_log(), vec!["SHOW FULL COLUMNS FROM `users`"]);
}

#[tokio::test]
async fn test_describe_table_column_details() {
    let mock = Arc::new(users_table());

    let columns = describer(mock).describe_table("users", None).await.unwrap();

    let id = &columns["id"];
    assert_eq!(id.table_name, "users");
    assert_eq!(id.schema_name, None);
    assert_eq!(id.data_type(), "int");
    assert_eq!(id.data_type_full(), "int(10) unsigned");
    assert_eq!(id.column_type.base_type, BaseType::Int);
    assert!(id.unsigned);
    assert!(id.is_auto_increment);
    assert!(!id.nullable);
    assert_eq!(id.max_numeric_value().unwrap(), 4_294_967_295);

    let name = &columns["name"];
    assert!(name.nullable);
    assert_eq!(name.default_value, None);
    assert_eq!(name.comment.as_deref(), Some("display name"));
    assert_eq!(name.collation.as_deref(), Some("utf8mb4_general_ci"));
    assert_eq!(name.column_type.length, Some(64));
    assert_eq!(name.max_text_length().unwrap(), Some(64));

    let tenant = &columns["tenant"];
    assert_eq!(tenant.default_value.as_deref(), Some("1"));
    assert!(!tenant.is_auto_increment);
    assert_eq!(tenant.comment, None);
    assert_eq!(tenant.collation, None);

    let balance = &columns["balance"];
    assert_eq!(balance.column_type.precision, Some(12));
    assert_eq!(balance.column_type.scale, Some(2));
    assert!(balance.is_decimal_type());
}

#[tokio::test]
async fn test_auto_increment_requires_primary_key() {
    let mock = Arc::new(MockConnection::new().with_query_response(
        "SHOW FULL COLUMNS",
        show_full_columns(vec![
            ColumnRow::new("seq", "int(11)").auto_increment(),
            ColumnRow::new("code", "char(2)").primary(),
        ]),
    ));

    let columns = describer(mock).describe_table("codes", None).await.unwrap();

    assert!(!columns["seq"].is_auto_increment);
    assert!(!columns["code"].is_auto_increment);
}

#[tokio::test]
async fn test_auto_increment_column_outside_primary_key() {
    let mock = Arc::new(MockConnection::new().with_query_response(
        "SHOW FULL COLUMNS",
        show_full_columns(vec![
            ColumnRow::new("code", "char(2)").primary(),
            ColumnRow::new("seq", "int(11)").auto_increment(),
        ]),
    ));

    let name = describer(mock)
        .auto_increment_column_name("codes", None)
        .await
        .unwrap();

    assert_eq!(name.as_deref(), Some("seq"));
}

#[tokio::test]
async fn test_describe_table_with_schema() {
    let mock = Arc::new(users_table());

    let columns = describer(mock.clone())
        .describe_table("users", Some("shop"))
        .await
        .unwrap();

    assert_eq!(columns["id"].schema_name.as_deref(), Some("shop"));
    assert_eq!(mock.query_log(), vec!["SHOW FULL COLUMNS FROM `shop`.`users`"]);
}

#[tokio::test]
async fn test_describe_table_quotes_backticks() {
    let mock = Arc::new(MockConnection::new());

    describer(mock.clone())
        .describe_table("odd`name", None)
        .await
        .unwrap();

    assert_eq!(mock.query_log(), vec!["SHOW FULL COLUMNS FROM `odd``name`"]);
}

#[tokio::test]
async fn test_describe_table_empty_result() {
    let mock = Arc::new(MockConnection::new());

    let columns = describer(mock).describe_table("missing", None).await.unwrap();

    assert!(columns.is_empty());
}

#[tokio::test]
async fn test_describe_table_error_propagates() {
    let mock = Arc::new(MockConnection::new().with_failure());

    let result = describer(mock).describe_table("users", None).await;

    match result {
        Err(ColscopeError::Query(message)) => assert_eq!(message, "Query failed"),
        other => panic!("expected the connection error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_describe_table_issues_fresh_query_each_call() {
    let mock = Arc::new(users_table());
    let describer = describer(mock.clone());

    describer.describe_table("users", None).await.unwrap();
    describer.describe_table("users", None).await.unwrap();

    assert_eq!(mock.query_log().len(), 2);
}

#[tokio::test]
async fn test_describe_table_case_folding() {
    let mock = Arc::new(MockConnection::new().with_query_response(
        "SHOW FULL COLUMNS",
        show_full_columns(vec![
            ColumnRow::new("UserId", "int(11)").primary(),
            ColumnRow::new("DisplayName", "varchar(20)"),
        ]),
    ));

    let columns = describer(mock)
        .with_case_folding(CaseFolding::Lower)
        .describe_table("Accounts", None)
        .await
        .unwrap();

    let names: Vec<&str> = columns.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["userid", "displayname"]);
    assert_eq!(columns["userid"].table_name, "accounts");
}

// =============================================================================
// Describe Column Tests
// =============================================================================

#[tokio::test]
async fn test_describe_column() {
    let mock = Arc::new(users_table());

    let column = describer(mock)
        .describe_column("users", "tenant", None)
        .await
        .unwrap();

    assert_eq!(column.column_name, "tenant");
    assert_eq!(column.ordinal_position, 3);
    assert_eq!(column.min_numeric_value().unwrap(), -32_768);
}

#[tokio::test]
async fn test_describe_column_not_found() {
    let mock = Arc::new(users_table());

    let result = describer(mock)
        .describe_column("users", "email", None)
        .await;

    match result {
        Err(ColscopeError::ColumnNotFound { table, column }) => {
            assert_eq!(table, "users");
            assert_eq!(column, "email");
        }
        other => panic!("expected ColumnNotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_describe_column_folds_lookup_name() {
    let mock = Arc::new(users_table());

    let column = describer(mock)
        .with_case_folding(CaseFolding::Lower)
        .describe_column("users", "NAME", None)
        .await
        .unwrap();

    assert_eq!(column.column_name, "name");
}

// =============================================================================
// Key and Listing Tests
// =============================================================================

#[tokio::test]
async fn test_auto_increment_column_name() {
    let users = describer(Arc::new(users_table()));

    assert_eq!(
        users
            .auto_increment_column_name("users", None)
            .await
            .unwrap()
            .as_deref(),
        Some("id")
    );

    let plain = describer(Arc::new(MockConnection::new().with_query_response(
        "SHOW FULL COLUMNS",
        show_full_columns(vec![ColumnRow::new("code", "char(2)").primary()]),
    )));
    assert_eq!(
        plain.auto_increment_column_name("codes", None).await.unwrap(),
        None
    );
}

#[tokio::test]
async fn test_primary_key_columns_in_key_order() {
    let columns = describer(Arc::new(users_table()))
        .describe_table("users", None)
        .await
        .unwrap();

    assert_eq!(primary_key_columns(&columns), vec!["id", "tenant"]);
}

#[tokio::test]
async fn test_list_tables() {
    let mock = Arc::new(MockConnection::new().with_query_response(
        "SHOW TABLES",
        single_column("Tables_in_shop", &["orders", "users"]),
    ));

    let tables = describer(mock.clone()).list_tables().await.unwrap();

    assert_eq!(tables, vec!["orders", "users"]);
    assert_eq!(mock.query_log(), vec!["SHOW TABLES"]);
}
