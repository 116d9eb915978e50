//! Patient types.
//!
//! [`Patient`] is the full stored row. Requests carry a [`PatientInput`]
//! (used for both create and full-replacement update) and responses carry
//! the flattened [`PatientSummary`].

// Field names mirror the `patients` columns
#![allow(missing_docs)]

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::dates;
use super::records::{
    Address, Allergy, CohortMember, ContactInfo, Diagnosis, Encounter, FamilyHistory,
    Immunization, PatientMedication, RiskFactor,
};

/// A stored patient with all demographic fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    /// Server-assigned identifier, immutable once assigned.
    pub patient_id: Uuid,
    /// Medical record number, unique across all patients.
    pub mrn: String,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: String,
    pub biological_sex: String,
    pub blood_type: Option<String>,
    pub ethnicity: Option<String>,
    pub race: Option<String>,
    pub preferred_language: Option<String>,
    pub marital_status: Option<String>,
    pub occupation: Option<String>,
    pub is_deceased: Option<bool>,
    pub deceased_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/update payload for a patient.
///
/// Updates are full replacements: every field overwrites the stored value,
/// so an omitted optional field is cleared. `is_deceased` defaults to
/// `false` when omitted and stays null when sent as an explicit `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientInput {
    pub mrn: String,
    pub first_name: String,
    #[serde(default)]
    pub middle_name: Option<String>,
    pub last_name: String,
    #[serde(deserialize_with = "dates::deserialize")]
    pub date_of_birth: NaiveDate,
    pub gender: String,
    pub biological_sex: String,
    #[serde(default)]
    pub blood_type: Option<String>,
    #[serde(default)]
    pub ethnicity: Option<String>,
    #[serde(default)]
    pub race: Option<String>,
    #[serde(default)]
    pub preferred_language: Option<String>,
    #[serde(default)]
    pub marital_status: Option<String>,
    #[serde(default)]
    pub occupation: Option<String>,
    #[serde(default = "not_deceased")]
    pub is_deceased: Option<bool>,
    #[serde(default, deserialize_with = "dates::deserialize_option")]
    pub deceased_date: Option<NaiveDate>,
}

fn not_deceased() -> Option<bool> {
    Some(false)
}

/// Payload accepted when creating a patient.
pub type PatientCreate = PatientInput;

/// Payload accepted when replacing a patient.
pub type PatientUpdate = PatientInput;

/// The flattened patient shape returned by every patient endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientSummary {
    pub patient_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    /// Email of the patient's first contact record, if any.
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A patient row together with its projected email.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredPatient {
    /// The stored row.
    pub patient: Patient,
    /// Email of the first contact record, if any.
    pub email: Option<String>,
}

impl StoredPatient {
    /// Consumes the stored patient, returning its summary.
    pub fn into_summary(self) -> PatientSummary {
        PatientSummary {
            patient_id: self.patient.patient_id,
            first_name: self.patient.first_name,
            last_name: self.patient.last_name,
            email: self.email,
            created_at: self.patient.created_at,
            updated_at: self.patient.updated_at,
        }
    }
}

/// Patient search filters.
///
/// Every filter is optional and present filters are ANDed. Empty
/// `risk_factors` / `diagnoses` lists impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatientQuery {
    /// Minimum age in whole years, inclusive.
    pub age_min: Option<i32>,
    /// Maximum age in whole years, inclusive.
    pub age_max: Option<i32>,
    pub gender: Option<String>,
    /// Matches patients with at least one risk factor of these names.
    pub risk_factors: Option<Vec<String>>,
    /// Matches patients with at least one diagnosis carrying these ICD codes.
    pub diagnoses: Option<Vec<String>>,
    pub ethnicity: Option<String>,
    pub race: Option<String>,
    pub is_deceased: Option<bool>,
}

impl PatientQuery {
    /// Creates an empty query that matches every patient.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the inclusive age range.
    pub fn with_age_range(mut self, min: Option<i32>, max: Option<i32>) -> Self {
        self.age_min = min;
        self.age_max = max;
        self
    }

    /// Filters by gender.
    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    /// Filters by risk factor names.
    pub fn with_risk_factors<I, T>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.risk_factors = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Filters by ICD codes.
    pub fn with_diagnoses<I, T>(mut self, codes: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.diagnoses = Some(codes.into_iter().map(Into::into).collect());
        self
    }

    /// Filters by the deceased flag.
    pub fn with_deceased(mut self, is_deceased: bool) -> Self {
        self.is_deceased = Some(is_deceased);
        self
    }
}

/// A patient together with every record it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientChart {
    #[serde(flatten)]
    pub patient: Patient,
    pub contact_info: Vec<ContactInfo>,
    pub addresses: Vec<Address>,
    pub risk_factors: Vec<RiskFactor>,
    pub diagnoses: Vec<Diagnosis>,
    pub encounters: Vec<Encounter>,
    pub medications: Vec<PatientMedication>,
    pub allergies: Vec<Allergy>,
    pub immunizations: Vec<Immunization>,
    pub family_history: Vec<FamilyHistory>,
    pub cohorts: Vec<CohortMember>,
}
