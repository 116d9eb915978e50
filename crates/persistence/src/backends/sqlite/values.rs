//! Conversions between column values, JSON and SQLite.
//!
//! Identifiers, dates and timestamps are stored as text: UUIDs in their
//! hyphenated form, dates as `YYYY-MM-DD` and timestamps as RFC 3339 UTC with
//! microsecond precision. Booleans are stored as 0/1.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use rusqlite::Row;
use rusqlite::types::Type;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{StorageError, StorageResult, ValidationError};
use crate::schema::{Column, ColumnDefault, ColumnKind, Table};
use crate::types::dates;

use super::query_builder::SqlParam;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Formats a date for storage.
pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Formats a timestamp for storage.
pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

/// Reads a UUID stored as text.
pub(crate) fn get_uuid(row: &Row<'_>, idx: usize) -> rusqlite::Result<Uuid> {
    let s: String = row.get(idx)?;
    Uuid::parse_str(&s).map_err(|e| conversion_error(idx, e))
}

/// Reads a required date.
pub(crate) fn get_date(row: &Row<'_>, idx: usize) -> rusqlite::Result<NaiveDate> {
    let s: String = row.get(idx)?;
    NaiveDate::parse_from_str(&s, DATE_FORMAT).map_err(|e| conversion_error(idx, e))
}

/// Reads an optional date.
pub(crate) fn get_opt_date(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<NaiveDate>> {
    let s: Option<String> = row.get(idx)?;
    s.map(|s| NaiveDate::parse_from_str(&s, DATE_FORMAT).map_err(|e| conversion_error(idx, e)))
        .transpose()
}

/// Reads a required timestamp.
pub(crate) fn get_timestamp(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let s: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

/// Converts a declared column's JSON value into a bound parameter.
///
/// Nulls are replaced by the column's default, if it has one.
pub(crate) fn column_param(
    table: &Table,
    column: &Column,
    value: &Value,
    now: DateTime<Utc>,
) -> StorageResult<SqlParam> {
    if value.is_null() {
        return Ok(match column.default {
            Some(ColumnDefault::Now) => SqlParam::string(format_timestamp(now)),
            Some(ColumnDefault::Bool(b)) => SqlParam::boolean(b),
            None => SqlParam::Null,
        });
    }

    let invalid = |expected: &str| {
        StorageError::Validation(ValidationError::InvalidColumnValue {
            table: table.name.to_string(),
            column: column.name.to_string(),
            message: format!("expected {}, got {}", expected, value),
        })
    };

    match column.kind {
        ColumnKind::Text => value
            .as_str()
            .map(SqlParam::string)
            .ok_or_else(|| invalid("string")),
        ColumnKind::Integer => value
            .as_i64()
            .map(SqlParam::integer)
            .ok_or_else(|| invalid("integer")),
        ColumnKind::Bool => value
            .as_bool()
            .map(SqlParam::boolean)
            .ok_or_else(|| invalid("boolean")),
        ColumnKind::Date => value
            .as_str()
            .and_then(|s| s.parse::<NaiveDate>().ok())
            .filter(|d| dates::is_storable(*d))
            .map(|d| SqlParam::string(format_date(d)))
            .ok_or_else(|| invalid("date with a four-digit year")),
        ColumnKind::Timestamp => value
            .as_str()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| SqlParam::string(format_timestamp(dt.with_timezone(&Utc))))
            .ok_or_else(|| invalid("timestamp")),
        ColumnKind::Id => value
            .as_str()
            .and_then(|s| Uuid::parse_str(s).ok())
            .map(|id| SqlParam::string(id.to_string()))
            .ok_or_else(|| invalid("uuid")),
    }
}

/// Reads a stored column back into JSON.
pub(crate) fn column_value(row: &Row<'_>, idx: usize, kind: ColumnKind) -> rusqlite::Result<Value> {
    Ok(match kind {
        ColumnKind::Text | ColumnKind::Date | ColumnKind::Timestamp | ColumnKind::Id => row
            .get::<_, Option<String>>(idx)?
            .map_or(Value::Null, Value::String),
        ColumnKind::Integer => row
            .get::<_, Option<i64>>(idx)?
            .map_or(Value::Null, Value::from),
        ColumnKind::Bool => row
            .get::<_, Option<i64>>(idx)?
            .map_or(Value::Null, |v| Value::Bool(v != 0)),
    })
}

/// Reads a full record row selected with [`select_list`] into a JSON object.
pub(crate) fn record_object(table: &Table, row: &Row<'_>) -> rusqlite::Result<Map<String, Value>> {
    let mut map = Map::new();
    let mut idx = 0;

    map.insert(table.primary_key.to_string(), column_value(row, idx, ColumnKind::Id)?);
    idx += 1;

    if let Some(owner) = table.owner {
        map.insert(owner.to_string(), column_value(row, idx, ColumnKind::Id)?);
        idx += 1;
    }

    for column in table.columns {
        map.insert(column.name.to_string(), column_value(row, idx, column.kind)?);
        idx += 1;
    }

    map.insert(
        "created_at".to_string(),
        column_value(row, idx, ColumnKind::Timestamp)?,
    );
    map.insert(
        "updated_at".to_string(),
        column_value(row, idx + 1, ColumnKind::Timestamp)?,
    );

    Ok(map)
}

/// The column list matching [`record_object`], qualified with `alias`.
pub(crate) fn select_list(table: &Table, alias: &str) -> String {
    let mut columns = vec![table.primary_key];
    columns.extend(table.owner);
    columns.extend(table.columns.iter().map(|c| c.name));
    columns.push("created_at");
    columns.push("updated_at");

    columns
        .iter()
        .map(|c| format!("{}.{}", alias, c))
        .collect::<Vec<_>>()
        .join(", ")
}
