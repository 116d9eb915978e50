//! SQLite schema definitions and migrations.
//!
//! Tables are generated from the declarations in [`crate::schema`].

use rusqlite::Connection;

use crate::error::{BackendError, StorageError, StorageResult};
use crate::schema::{ALL_TABLES, ColumnDefault, ColumnKind, PATIENTS, Table};

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 1;

/// Indexes backing the patient search filters.
const SEARCH_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_patient_risk_factors_factor_name ON patient_risk_factors(factor_name)",
    "CREATE INDEX IF NOT EXISTS idx_diagnoses_icd_code_id ON diagnoses(icd_code_id)",
    "CREATE INDEX IF NOT EXISTS idx_patients_date_of_birth ON patients(date_of_birth)",
];

/// Initialize the database schema.
///
/// Safe to call on an already initialized database.
pub fn initialize_schema(conn: &Connection) -> StorageResult<()> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        create_schema_v1(conn)?;
        tracing::info!("Created database schema version {}", SCHEMA_VERSION);
    } else if current_version > SCHEMA_VERSION {
        return Err(StorageError::Backend(BackendError::MigrationError {
            message: format!(
                "database schema version {} is newer than supported version {}",
                current_version, SCHEMA_VERSION
            ),
        }));
    } else {
        tracing::debug!("Database schema is at version {}", current_version);
    }

    Ok(())
}

/// Get the current schema version.
fn get_schema_version(conn: &Connection) -> StorageResult<i32> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER NOT NULL
        )",
        [],
    )
    .map_err(|e| migration_error("Failed to create schema_version table", e))?;

    let version: Option<i32> = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .ok();

    Ok(version.unwrap_or(0))
}

/// Create the initial schema and record its version, atomically.
fn create_schema_v1(conn: &Connection) -> StorageResult<()> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| migration_error("Failed to begin schema transaction", e))?;

    for table in ALL_TABLES {
        tx.execute(&create_table_sql(table), [])
            .map_err(|e| migration_error(&format!("Failed to create table {}", table.name), e))?;

        if let Some(owner) = table.owner {
            tx.execute(
                &format!(
                    "CREATE INDEX IF NOT EXISTS idx_{table}_{owner} ON {table}({owner})",
                    table = table.name,
                    owner = owner
                ),
                [],
            )
            .map_err(|e| migration_error(&format!("Failed to index table {}", table.name), e))?;
        }
    }

    for index in SEARCH_INDEXES {
        tx.execute(index, [])
            .map_err(|e| migration_error("Failed to create search index", e))?;
    }

    tx.execute("DELETE FROM schema_version", [])
        .map_err(|e| migration_error("Failed to clear schema_version", e))?;
    tx.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [SCHEMA_VERSION],
    )
    .map_err(|e| migration_error("Failed to set schema_version", e))?;

    tx.commit()
        .map_err(|e| migration_error("Failed to commit schema", e))?;
    Ok(())
}

/// Generates the `CREATE TABLE` statement for a declared table.
pub(crate) fn create_table_sql(table: &Table) -> String {
    let mut defs = vec![format!("{} TEXT PRIMARY KEY NOT NULL", table.primary_key)];

    if let Some(owner) = table.owner {
        defs.push(format!(
            "{} TEXT NOT NULL REFERENCES {}({}) ON DELETE CASCADE",
            owner, PATIENTS.name, PATIENTS.primary_key
        ));
    }

    for column in table.columns {
        let sql_type = match column.kind {
            ColumnKind::Integer | ColumnKind::Bool => "INTEGER",
            ColumnKind::Text | ColumnKind::Date | ColumnKind::Timestamp | ColumnKind::Id => {
                "TEXT"
            }
        };

        let mut def = format!("{} {}", column.name, sql_type);
        if column.required {
            def.push_str(" NOT NULL");
        }
        if column.unique {
            def.push_str(" UNIQUE");
        }
        if let Some(ColumnDefault::Bool(b)) = column.default {
            def.push_str(if b { " DEFAULT 1" } else { " DEFAULT 0" });
        }
        if let Some(fk) = column.references {
            def.push_str(&format!(" REFERENCES {}({})", fk.table, fk.column));
        }
        defs.push(def);
    }

    defs.push("created_at TEXT NOT NULL".to_string());
    defs.push("updated_at TEXT NOT NULL".to_string());

    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
        table.name,
        defs.join(",\n    ")
    )
}

fn migration_error(context: &str, err: rusqlite::Error) -> StorageError {
    StorageError::Backend(BackendError::MigrationError {
        message: format!("{}: {}", context, err),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{DIAGNOSES, ICD_CODES};

    #[test]
    fn test_initialize_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        initialize_schema(&conn).unwrap();

        let version: i32 = conn
            .query_row("SELECT version FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(version, SCHEMA_VERSION);

        let rows: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn test_all_tables_created() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        for table in ALL_TABLES {
            let exists: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    [table.name],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(exists, 1, "table {} missing", table.name);
        }
    }

    #[test]
    fn test_newer_schema_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        conn.execute("UPDATE schema_version SET version = 99", [])
            .unwrap();

        let err = initialize_schema(&conn).unwrap_err();
        assert!(matches!(
            err,
            StorageError::Backend(BackendError::MigrationError { .. })
        ));
    }

    #[test]
    fn test_create_table_sql_owned() {
        let sql = create_table_sql(&DIAGNOSES);
        assert!(sql.contains("diagnosis_id TEXT PRIMARY KEY NOT NULL"));
        assert!(sql.contains(
            "patient_id TEXT NOT NULL REFERENCES patients(patient_id) ON DELETE CASCADE"
        ));
        assert!(sql.contains("icd_code_id TEXT NOT NULL REFERENCES icd_codes(icd_code_id)"));
        assert!(sql.contains("created_at TEXT NOT NULL"));
    }

    #[test]
    fn test_create_table_sql_reference() {
        let sql = create_table_sql(&ICD_CODES);
        assert!(!sql.contains("patient_id"));
        assert!(sql.contains("code TEXT NOT NULL UNIQUE"));
        assert!(sql.contains("is_billable INTEGER DEFAULT 1"));
    }
}
