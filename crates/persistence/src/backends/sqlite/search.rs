//! Patient search for SQLite.
//!
//! [`PatientSearchBuilder`] translates a [`PatientQuery`] into a single
//! `SELECT` over `patients`. Related-table filters are correlated `EXISTS`
//! semi-joins, so a patient with several qualifying rows is returned once.
//!
//! Ages are converted into birth-date bounds relative to `today`:
//!
//! ```text
//! age >= min   <=>  date_of_birth <= today - min years
//! age <= max   <=>  date_of_birth >  today - (max + 1) years
//! ```

use async_trait::async_trait;
use chrono::{Datelike, Months, NaiveDate, Utc};

use crate::core::PatientSearchProvider;
use crate::error::StorageResult;
use crate::types::{PatientQuery, PatientSummary};

use super::SqliteBackend;
use super::query_builder::{SqlFragment, SqlParam};
use super::storage::FIRST_EMAIL_SQL;
use super::values::{format_date, get_timestamp, get_uuid};

/// Where a birth-date cutoff falls relative to storable dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cutoff {
    /// Earlier than any stored date of birth.
    BeforeAll,
    /// A concrete date.
    Date(NaiveDate),
    /// Later than any stored date of birth.
    AfterAll,
}

/// Returns `date` shifted back by `years` (forward when negative).
///
/// Feb 29 shifts onto Feb 28 in non-leap years, which keeps whole-year age
/// arithmetic exact. Payload dates are restricted to four-digit years (see
/// [`crate::types::dates`]), so results outside 0001..=9999 collapse into
/// [`Cutoff::BeforeAll`] / [`Cutoff::AfterAll`].
fn years_before(date: NaiveDate, years: i64) -> Cutoff {
    let target_year = i64::from(date.year()) - years;
    if target_year < 1 {
        return Cutoff::BeforeAll;
    }
    if target_year > 9999 {
        return Cutoff::AfterAll;
    }

    // |years| <= 9999 here, so the month count fits comfortably in u32.
    let months = Months::new((years.unsigned_abs() * 12) as u32);
    let shifted = if years >= 0 {
        date.checked_sub_months(months)
    } else {
        date.checked_add_months(months)
    };
    match shifted {
        Some(d) => Cutoff::Date(d),
        None if years >= 0 => Cutoff::BeforeAll,
        None => Cutoff::AfterAll,
    }
}

/// Builds the patient search statement.
#[derive(Debug)]
pub struct PatientSearchBuilder<'a> {
    query: &'a PatientQuery,
    today: NaiveDate,
}

impl<'a> PatientSearchBuilder<'a> {
    /// Creates a builder evaluating ages against `today`.
    pub fn new(query: &'a PatientQuery, today: NaiveDate) -> Self {
        Self { query, today }
    }

    /// Builds the full statement, ordered by patient insertion order.
    pub fn build(&self) -> SqlFragment {
        let mut frag = SqlFragment::new(format!(
            "SELECT p.patient_id, p.first_name, p.last_name, {} AS email, \
             p.created_at, p.updated_at FROM patients p",
            FIRST_EMAIL_SQL
        ));

        let conditions = self.conditions(&mut frag);
        if !conditions.is_empty() {
            frag.push_sql(" WHERE ");
            frag.push_sql(&conditions.join(" AND "));
        }
        frag.push_sql(" ORDER BY p.rowid");
        frag
    }

    /// Collects one condition per present filter, binding values into `frag`.
    fn conditions(&self, frag: &mut SqlFragment) -> Vec<String> {
        let q = self.query;
        let mut conditions = Vec::new();

        if let Some(min) = q.age_min {
            match years_before(self.today, i64::from(min)) {
                Cutoff::Date(d) => {
                    let p = frag.add_param(SqlParam::string(format_date(d)));
                    conditions.push(format!("p.date_of_birth <= {}", p));
                }
                Cutoff::BeforeAll => conditions.push("1 = 0".to_string()),
                Cutoff::AfterAll => {}
            }
        }

        if let Some(max) = q.age_max {
            match years_before(self.today, i64::from(max) + 1) {
                Cutoff::Date(d) => {
                    let p = frag.add_param(SqlParam::string(format_date(d)));
                    conditions.push(format!("p.date_of_birth > {}", p));
                }
                Cutoff::BeforeAll => {}
                Cutoff::AfterAll => conditions.push("1 = 0".to_string()),
            }
        }

        let equalities = [
            ("p.gender", &q.gender),
            ("p.ethnicity", &q.ethnicity),
            ("p.race", &q.race),
        ];
        for (column, value) in equalities {
            if let Some(value) = value {
                let p = frag.add_param(SqlParam::string(value));
                conditions.push(format!("{} = {}", column, p));
            }
        }

        if let Some(is_deceased) = q.is_deceased {
            let p = frag.add_param(SqlParam::boolean(is_deceased));
            conditions.push(format!("p.is_deceased = {}", p));
        }

        if let Some(names) = q.risk_factors.as_deref().filter(|n| !n.is_empty()) {
            let list = frag.add_param_list(names.iter().map(SqlParam::string));
            conditions.push(format!(
                "EXISTS (SELECT 1 FROM patient_risk_factors rf \
                 WHERE rf.patient_id = p.patient_id AND rf.factor_name IN ({}))",
                list
            ));
        }

        if let Some(codes) = q.diagnoses.as_deref().filter(|c| !c.is_empty()) {
            let list = frag.add_param_list(codes.iter().map(SqlParam::string));
            conditions.push(format!(
                "EXISTS (SELECT 1 FROM diagnoses d \
                 JOIN icd_codes i ON i.icd_code_id = d.icd_code_id \
                 WHERE d.patient_id = p.patient_id AND i.code IN ({}))",
                list
            ));
        }

        conditions
    }
}

#[async_trait]
impl PatientSearchProvider for SqliteBackend {
    async fn search_patients(&self, query: &PatientQuery) -> StorageResult<Vec<PatientSummary>> {
        let today = Utc::now().date_naive();
        let frag = PatientSearchBuilder::new(query, today).build();

        let conn = self.get_connection()?;
        let mut stmt = conn.prepare(&frag.sql)?;
        let summaries = stmt
            .query_map(frag.bind(), |row| {
                Ok(PatientSummary {
                    patient_id: get_uuid(row, 0)?,
                    first_name: row.get(1)?,
                    last_name: row.get(2)?,
                    email: row.get(3)?,
                    created_at: get_timestamp(row, 4)?,
                    updated_at: get_timestamp(row, 5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(matches = summaries.len(), "Patient search completed");
        Ok(summaries)
    }
}
