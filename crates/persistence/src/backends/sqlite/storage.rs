//! PatientStorage implementation for SQLite.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Row, params};
use uuid::Uuid;

use crate::core::PatientStorage;
use crate::error::{StorageError, StorageResult};
use crate::schema::PATIENTS;
use crate::types::{
    Address, Allergy, CohortMember, ContactInfo, Diagnosis, Encounter, FamilyHistory,
    Immunization, Pagination, Patient, PatientChart, PatientInput, PatientMedication, RiskFactor,
    StoredPatient,
};

use super::SqliteBackend;
use super::backend::BACKEND_NAME;
use super::records::list_owned;
use super::values::{format_date, format_timestamp, get_date, get_opt_date, get_timestamp, get_uuid};

/// Projection of a patient's first contact email, by insertion order.
pub(crate) const FIRST_EMAIL_SQL: &str = "(SELECT c.email FROM patient_contact_info c \
     WHERE c.patient_id = p.patient_id ORDER BY c.rowid LIMIT 1)";

/// Selects every patient column followed by the first contact email.
fn patient_select() -> String {
    format!(
        "SELECT p.patient_id, p.mrn, p.first_name, p.middle_name, p.last_name, \
         p.date_of_birth, p.gender, p.biological_sex, p.blood_type, p.ethnicity, p.race, \
         p.preferred_language, p.marital_status, p.occupation, p.is_deceased, \
         p.deceased_date, p.created_at, p.updated_at, {} AS email \
         FROM patients p",
        FIRST_EMAIL_SQL
    )
}

fn row_to_patient(row: &Row<'_>) -> rusqlite::Result<StoredPatient> {
    let patient = Patient {
        patient_id: get_uuid(row, 0)?,
        mrn: row.get(1)?,
        first_name: row.get(2)?,
        middle_name: row.get(3)?,
        last_name: row.get(4)?,
        date_of_birth: get_date(row, 5)?,
        gender: row.get(6)?,
        biological_sex: row.get(7)?,
        blood_type: row.get(8)?,
        ethnicity: row.get(9)?,
        race: row.get(10)?,
        preferred_language: row.get(11)?,
        marital_status: row.get(12)?,
        occupation: row.get(13)?,
        is_deceased: row.get(14)?,
        deceased_date: get_opt_date(row, 15)?,
        created_at: get_timestamp(row, 16)?,
        updated_at: get_timestamp(row, 17)?,
    };
    Ok(StoredPatient {
        patient,
        email: row.get(18)?,
    })
}

/// Reads a patient on an existing connection or transaction.
pub(crate) fn fetch_patient(conn: &Connection, id: &str) -> StorageResult<Option<StoredPatient>> {
    let sql = format!("{} WHERE p.patient_id = ?1", patient_select());
    let patient = conn
        .query_row(&sql, [id], row_to_patient)
        .optional()?;
    Ok(patient)
}

/// Returns true if the patient exists.
pub(crate) fn patient_exists(conn: &Connection, id: &str) -> StorageResult<bool> {
    let exists = conn
        .query_row(
            "SELECT 1 FROM patients WHERE patient_id = ?1",
            [id],
            |_| Ok(()),
        )
        .optional()?
        .is_some();
    Ok(exists)
}

fn patient_not_found(id: &str) -> StorageError {
    StorageError::not_found(PATIENTS.label, id)
}

#[async_trait]
impl PatientStorage for SqliteBackend {
    fn backend_name(&self) -> &'static str {
        BACKEND_NAME
    }

    async fn health_check(&self) -> StorageResult<()> {
        self.ping()
    }

    async fn create_patient(&self, input: PatientInput) -> StorageResult<StoredPatient> {
        let mut conn = self.get_connection()?;
        let tx = conn.transaction()?;

        let id = Uuid::new_v4().to_string();
        let now = format_timestamp(Utc::now());

        tx.execute(
            "INSERT INTO patients (patient_id, mrn, first_name, middle_name, last_name, \
             date_of_birth, gender, biological_sex, blood_type, ethnicity, race, \
             preferred_language, marital_status, occupation, is_deceased, deceased_date, \
             created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?17)",
            params![
                id,
                input.mrn,
                input.first_name,
                input.middle_name,
                input.last_name,
                format_date(input.date_of_birth),
                input.gender,
                input.biological_sex,
                input.blood_type,
                input.ethnicity,
                input.race,
                input.preferred_language,
                input.marital_status,
                input.occupation,
                input.is_deceased,
                input.deceased_date.map(format_date),
                now,
            ],
        )?;

        let stored = fetch_patient(&tx, &id)?.ok_or_else(|| patient_not_found(&id))?;
        tx.commit()?;

        tracing::debug!(patient_id = %id, "Created patient");
        Ok(stored)
    }

    async fn read_patient(&self, id: &str) -> StorageResult<Option<StoredPatient>> {
        let conn = self.get_connection()?;
        fetch_patient(&conn, id)
    }

    async fn list_patients(&self, page: Pagination) -> StorageResult<Vec<StoredPatient>> {
        let conn = self.get_connection()?;
        let sql = format!("{} ORDER BY p.rowid LIMIT ?1 OFFSET ?2", patient_select());
        let mut stmt = conn.prepare(&sql)?;
        let patients = stmt
            .query_map(
                params![clamp_i64(page.limit), clamp_i64(page.offset)],
                row_to_patient,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(patients)
    }

    async fn update_patient(&self, id: &str, input: PatientInput) -> StorageResult<StoredPatient> {
        let mut conn = self.get_connection()?;
        let tx = conn.transaction()?;

        let now = format_timestamp(Utc::now());
        let updated = tx.execute(
            "UPDATE patients SET mrn = ?2, first_name = ?3, middle_name = ?4, last_name = ?5, \
             date_of_birth = ?6, gender = ?7, biological_sex = ?8, blood_type = ?9, \
             ethnicity = ?10, race = ?11, preferred_language = ?12, marital_status = ?13, \
             occupation = ?14, is_deceased = ?15, deceased_date = ?16, updated_at = ?17 \
             WHERE patient_id = ?1",
            params![
                id,
                input.mrn,
                input.first_name,
                input.middle_name,
                input.last_name,
                format_date(input.date_of_birth),
                input.gender,
                input.biological_sex,
                input.blood_type,
                input.ethnicity,
                input.race,
                input.preferred_language,
                input.marital_status,
                input.occupation,
                input.is_deceased,
                input.deceased_date.map(format_date),
                now,
            ],
        )?;

        if updated == 0 {
            return Err(patient_not_found(id));
        }

        let stored = fetch_patient(&tx, id)?.ok_or_else(|| patient_not_found(id))?;
        tx.commit()?;

        tracing::debug!(patient_id = %id, "Updated patient");
        Ok(stored)
    }

    async fn delete_patient(&self, id: &str) -> StorageResult<StoredPatient> {
        let mut conn = self.get_connection()?;
        let tx = conn.transaction()?;

        let prior = fetch_patient(&tx, id)?.ok_or_else(|| patient_not_found(id))?;
        tx.execute("DELETE FROM patients WHERE patient_id = ?1", [id])?;
        tx.commit()?;

        tracing::debug!(patient_id = %id, "Deleted patient");
        Ok(prior)
    }

    async fn read_chart(&self, id: &str) -> StorageResult<Option<PatientChart>> {
        let conn = self.get_connection()?;
        let Some(stored) = fetch_patient(&conn, id)? else {
            return Ok(None);
        };

        Ok(Some(PatientChart {
            patient: stored.patient,
            contact_info: list_owned::<ContactInfo>(&conn, id)?,
            addresses: list_owned::<Address>(&conn, id)?,
            risk_factors: list_owned::<RiskFactor>(&conn, id)?,
            diagnoses: list_owned::<Diagnosis>(&conn, id)?,
            encounters: list_owned::<Encounter>(&conn, id)?,
            medications: list_owned::<PatientMedication>(&conn, id)?,
            allergies: list_owned::<Allergy>(&conn, id)?,
            immunizations: list_owned::<Immunization>(&conn, id)?,
            family_history: list_owned::<FamilyHistory>(&conn, id)?,
            cohorts: list_owned::<CohortMember>(&conn, id)?,
        }))
    }
}

/// Converts a page bound to SQLite's signed integer.
pub(crate) fn clamp_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
