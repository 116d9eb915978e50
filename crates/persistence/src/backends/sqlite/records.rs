//! RecordStorage implementation for SQLite.
//!
//! Statements are generated from each record's [`Table`] declaration. Only
//! declared columns are written, in declaration order.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension};
use serde_json::Value;
use uuid::Uuid;

use crate::core::RecordStorage;
use crate::error::{StorageError, StorageResult, ValidationError};
use crate::schema::{ColumnDefault, PATIENTS, Table};
use crate::types::{Pagination, Record};

use super::SqliteBackend;
use super::query_builder::{SqlFragment, SqlParam};
use super::storage::{clamp_i64, patient_exists};
use super::values::{column_param, format_timestamp, record_object, select_list};

/// Resolves the owner argument against the table's ownership.
///
/// Returns the owner id for patient-owned tables after checking that the
/// patient exists.
fn resolve_owner<'a>(
    conn: &Connection,
    table: &Table,
    owner: Option<&'a str>,
) -> StorageResult<Option<&'a str>> {
    match (table.owner, owner) {
        (Some(_), Some(patient_id)) => {
            if patient_exists(conn, patient_id)? {
                Ok(Some(patient_id))
            } else {
                Err(StorageError::not_found(PATIENTS.label, patient_id))
            }
        }
        (Some(_), None) => Err(StorageError::Validation(ValidationError::MissingOwner {
            table: table.name.to_string(),
        })),
        (None, Some(_)) => Err(StorageError::Validation(ValidationError::InvalidRecord {
            table: table.name.to_string(),
            message: "reference data is not owned by a patient".to_string(),
        })),
        (None, None) => Ok(None),
    }
}

/// Appends `WHERE`/`AND` conditions selecting a record by id and owner.
fn push_key_conditions(frag: &mut SqlFragment, table: &Table, owner: Option<&str>, id: &str) {
    let p = frag.add_param(SqlParam::string(id));
    frag.push_sql(&format!(" WHERE t.{} = {}", table.primary_key, p));
    if let (Some(owner_col), Some(owner_id)) = (table.owner, owner) {
        let p = frag.add_param(SqlParam::string(owner_id));
        frag.push_sql(&format!(" AND t.{} = {}", owner_col, p));
    }
}

fn decode<R: Record>(object: serde_json::Map<String, Value>) -> StorageResult<R> {
    serde_json::from_value(Value::Object(object)).map_err(|e| {
        StorageError::Validation(ValidationError::InvalidRecord {
            table: R::TABLE.name.to_string(),
            message: e.to_string(),
        })
    })
}

/// Reads one record, scoped to its owner when the table is patient-owned.
fn fetch_record<R: Record>(
    conn: &Connection,
    owner: Option<&str>,
    id: &str,
) -> StorageResult<Option<R>> {
    let table = R::TABLE;
    let mut frag = SqlFragment::new(format!(
        "SELECT {} FROM {} t",
        select_list(table, "t"),
        table.name
    ));
    push_key_conditions(&mut frag, table, owner, id);

    let object = conn
        .query_row(&frag.sql, frag.bind(), |row| record_object(table, row))
        .optional()?;
    object.map(decode::<R>).transpose()
}

/// Lists a patient's records of one type in insertion order.
///
/// The caller is responsible for checking that the patient exists.
pub(crate) fn list_owned<R: Record>(conn: &Connection, patient_id: &str) -> StorageResult<Vec<R>> {
    list_rows::<R>(conn, Some(patient_id), None)
}

fn list_rows<R: Record>(
    conn: &Connection,
    owner: Option<&str>,
    page: Option<Pagination>,
) -> StorageResult<Vec<R>> {
    let table = R::TABLE;
    let mut frag = SqlFragment::new(format!(
        "SELECT {} FROM {} t",
        select_list(table, "t"),
        table.name
    ));
    if let (Some(owner_col), Some(owner_id)) = (table.owner, owner) {
        let p = frag.add_param(SqlParam::string(owner_id));
        frag.push_sql(&format!(" WHERE t.{} = {}", owner_col, p));
    }
    frag.push_sql(" ORDER BY t.rowid");
    if let Some(page) = page {
        let limit = frag.add_param(SqlParam::integer(clamp_i64(page.limit)));
        let offset = frag.add_param(SqlParam::integer(clamp_i64(page.offset)));
        frag.push_sql(&format!(" LIMIT {} OFFSET {}", limit, offset));
    }

    let mut stmt = conn.prepare(&frag.sql)?;
    let objects = stmt
        .query_map(frag.bind(), |row| record_object(table, row))?
        .collect::<Result<Vec<_>, _>>()?;
    objects.into_iter().map(decode::<R>).collect()
}

/// A declared column value taken from a payload.
struct ColumnValue {
    name: &'static str,
    param: SqlParam,
    /// The payload omitted a column that defaults to the current time.
    time_defaulted: bool,
}

/// Serializes a payload and returns its declared column values.
fn input_values<R: Record>(
    input: &R::Input,
    now: chrono::DateTime<Utc>,
) -> StorageResult<Vec<ColumnValue>> {
    let table = R::TABLE;
    let value = serde_json::to_value(input)?;
    let Value::Object(object) = value else {
        return Err(StorageError::Validation(ValidationError::InvalidRecord {
            table: table.name.to_string(),
            message: "payload is not an object".to_string(),
        }));
    };

    table
        .columns
        .iter()
        .map(|column| {
            let raw = object.get(column.name).unwrap_or(&Value::Null);
            Ok(ColumnValue {
                name: column.name,
                param: column_param(table, column, raw, now)?,
                time_defaulted: raw.is_null() && column.default == Some(ColumnDefault::Now),
            })
        })
        .collect()
}

#[async_trait]
impl RecordStorage for SqliteBackend {
    async fn create_record<R: Record>(
        &self,
        owner: Option<&str>,
        input: R::Input,
    ) -> StorageResult<R> {
        let table = R::TABLE;
        let mut conn = self.get_connection()?;
        let tx = conn.transaction()?;

        let owner = resolve_owner(&tx, table, owner)?;
        let now = Utc::now();
        let id = Uuid::new_v4().to_string();

        let mut frag = SqlFragment::default();
        let mut names = vec![table.primary_key];
        let mut placeholders = vec![frag.add_param(SqlParam::string(&id))];

        if let (Some(owner_col), Some(owner_id)) = (table.owner, owner) {
            names.push(owner_col);
            placeholders.push(frag.add_param(SqlParam::string(owner_id)));
        }

        for value in input_values::<R>(&input, now)? {
            names.push(value.name);
            placeholders.push(frag.add_param(value.param));
        }

        let ts = frag.add_param(SqlParam::string(format_timestamp(now)));
        names.push("created_at");
        names.push("updated_at");
        placeholders.push(ts.clone());
        placeholders.push(ts);

        frag.push_sql(&format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table.name,
            names.join(", "),
            placeholders.join(", ")
        ));
        tx.execute(&frag.sql, frag.bind())?;

        let record = fetch_record::<R>(&tx, owner, &id)?
            .ok_or_else(|| StorageError::not_found(table.label, &id))?;
        tx.commit()?;

        tracing::debug!(table = table.name, id = %id, "Created record");
        Ok(record)
    }

    async fn read_record<R: Record>(
        &self,
        owner: Option<&str>,
        id: &str,
    ) -> StorageResult<Option<R>> {
        let conn = self.get_connection()?;
        let owner = resolve_owner(&conn, R::TABLE, owner)?;
        fetch_record::<R>(&conn, owner, id)
    }

    async fn list_records<R: Record>(
        &self,
        owner: Option<&str>,
        page: Pagination,
    ) -> StorageResult<Vec<R>> {
        let conn = self.get_connection()?;
        let owner = resolve_owner(&conn, R::TABLE, owner)?;
        list_rows::<R>(&conn, owner, Some(page))
    }

    async fn update_record<R: Record>(
        &self,
        owner: Option<&str>,
        id: &str,
        input: R::Input,
    ) -> StorageResult<R> {
        let table = R::TABLE;
        let mut conn = self.get_connection()?;
        let tx = conn.transaction()?;

        let owner = resolve_owner(&tx, table, owner)?;
        if fetch_record::<R>(&tx, owner, id)?.is_none() {
            return Err(StorageError::not_found(table.label, id));
        }

        let now = Utc::now();
        let mut frag = SqlFragment::default();
        let mut assignments = Vec::with_capacity(table.columns.len() + 1);

        // Time defaults are only filled on insert; updates keep the stored value.
        for value in input_values::<R>(&input, now)? {
            if value.time_defaulted {
                continue;
            }
            assignments.push(format!("{} = {}", value.name, frag.add_param(value.param)));
        }
        assignments.push(format!(
            "updated_at = {}",
            frag.add_param(SqlParam::string(format_timestamp(now)))
        ));

        let id_param = frag.add_param(SqlParam::string(id));
        frag.push_sql(&format!(
            "UPDATE {} SET {} WHERE {} = {}",
            table.name,
            assignments.join(", "),
            table.primary_key,
            id_param
        ));
        tx.execute(&frag.sql, frag.bind())?;

        let record = fetch_record::<R>(&tx, owner, id)?
            .ok_or_else(|| StorageError::not_found(table.label, id))?;
        tx.commit()?;

        tracing::debug!(table = table.name, id = %id, "Updated record");
        Ok(record)
    }

    async fn delete_record<R: Record>(&self, owner: Option<&str>, id: &str) -> StorageResult<R> {
        let table = R::TABLE;
        let mut conn = self.get_connection()?;
        let tx = conn.transaction()?;

        let owner = resolve_owner(&tx, table, owner)?;
        let prior = fetch_record::<R>(&tx, owner, id)?
            .ok_or_else(|| StorageError::not_found(table.label, id))?;

        tx.execute(
            &format!("DELETE FROM {} WHERE {} = ?1", table.name, table.primary_key),
            [id],
        )?;
        tx.commit()?;

        tracing::debug!(table = table.name, id = %id, "Deleted record");
        Ok(prior)
    }
}
