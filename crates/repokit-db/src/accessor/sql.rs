//! Row and value marshaling helpers for `SQLite` queries.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use repokit_core::{AccessorError, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Row, SqlitePool, TypeInfo, ValueRef as _};

pub(crate) fn storage_err(error: impl std::fmt::Display) -> AccessorError {
    AccessorError::Storage(error.to_string())
}

/// Bind a sequence of [`Value`]s onto a `query` or `query_as` builder.
macro_rules! bind_values {
    ($query:expr, $values:expr) => {{
        let mut query = $query;
        for value in $values {
            query = match value {
                repokit_core::Value::Null => query.bind(None::<i64>),
                repokit_core::Value::Integer(v) => query.bind(*v),
                repokit_core::Value::Real(v) => query.bind(*v),
                repokit_core::Value::Text(v) => query.bind(v.clone()),
                repokit_core::Value::Blob(v) => query.bind(v.clone()),
            };
        }
        query
    }};
}
pub(crate) use bind_values;

/// Column names of `table` in the connected database; empty when the
/// table does not exist.
pub(crate) async fn table_columns(
    pool: &SqlitePool,
    table: &str,
) -> Result<Vec<String>, AccessorError> {
    let rows = sqlx::query("SELECT name FROM pragma_table_info(?1)")
        .bind(table)
        .fetch_all(pool)
        .await
        .map_err(storage_err)?;

    rows.iter()
        .map(|row| row.try_get::<String, _>("name").map_err(storage_err))
        .collect()
}

/// Decode one column of a row by its stored type.
pub(crate) fn decode_column(row: &SqliteRow, ordinal: usize) -> Result<Value, AccessorError> {
    let raw = row.try_get_raw(ordinal).map_err(storage_err)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    let info = raw.type_info();
    let value = match info.name() {
        "INTEGER" | "BOOLEAN" | "NUMERIC" => {
            Value::Integer(row.try_get(ordinal).map_err(storage_err)?)
        }
        "REAL" => Value::Real(row.try_get(ordinal).map_err(storage_err)?),
        "BLOB" => Value::Blob(row.try_get(ordinal).map_err(storage_err)?),
        _ => Value::Text(row.try_get(ordinal).map_err(storage_err)?),
    };
    Ok(value)
}

pub(crate) fn row_value(row: &SqliteRow, column: &str) -> Result<Value, AccessorError> {
    let col = row
        .columns()
        .iter()
        .find(|c| c.name() == column)
        .ok_or_else(|| {
            AccessorError::Storage(format!("column '{column}' missing from result row"))
        })?;
    decode_column(row, col.ordinal())
}

/// Convert a full row into a JSON object keyed by column name. BLOBs
/// are base64-encoded; non-finite floats become null.
pub(crate) fn row_to_json(row: &SqliteRow) -> Result<serde_json::Value, AccessorError> {
    let mut doc = serde_json::Map::with_capacity(row.columns().len());
    for col in row.columns() {
        let value = match decode_column(row, col.ordinal())? {
            Value::Null => serde_json::Value::Null,
            Value::Integer(v) => serde_json::Value::from(v),
            Value::Real(v) => serde_json::Number::from_f64(v)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
            Value::Text(v) => serde_json::Value::String(v),
            Value::Blob(v) => serde_json::Value::String(BASE64.encode(v)),
        };
        doc.insert(col.name().to_string(), value);
    }
    Ok(serde_json::Value::Object(doc))
}

/// Canonical grouping key for a value. The storage-class prefix keeps
/// integer and text keys distinct.
pub(crate) fn value_key(value: &Value) -> String {
    match value {
        Value::Null => "n".to_string(),
        Value::Integer(v) => format!("i:{v}"),
        Value::Real(v) => format!("r:{}", v.to_bits()),
        Value::Text(v) => format!("t:{v}"),
        Value::Blob(v) => format!("b:{}", BASE64.encode(v)),
    }
}

pub(crate) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders() {
        assert_eq!(placeholders(1), "?");
        assert_eq!(placeholders(3), "?, ?, ?");
    }

    #[test]
    fn test_value_key_keeps_storage_classes_distinct() {
        assert_ne!(
            value_key(&Value::Integer(1)),
            value_key(&Value::Text("1".to_string()))
        );
        assert_eq!(value_key(&Value::Integer(42)), value_key(&Value::from(42i64)));
    }
}
