//! Related record types.
//!
//! Each record type pairs a stored struct (primary key, owner, declared
//! columns, timestamps) with an input struct carrying only the declared
//! columns. The [`Record`] impl ties both to their [`Table`] description.

// Field names mirror the table columns declared in `crate::schema`
#![allow(missing_docs)]

use std::fmt::Debug;

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::{self, Table};

use super::dates;

/// A record stored in one of the declared tables.
///
/// The stored struct's JSON field names must match the table's primary key,
/// owner column, declared columns and `created_at` / `updated_at`. The input
/// struct's field names must be a subset of the declared columns.
pub trait Record: Serialize + DeserializeOwned + Debug + Clone + Send + Sync + 'static {
    /// The create/update payload.
    type Input: Serialize + DeserializeOwned + Debug + Clone + Send + Sync + 'static;

    /// The table this record lives in.
    const TABLE: &'static Table;

    /// Returns the record's primary key.
    fn id(&self) -> Uuid;
}

fn default_true() -> bool {
    true
}

macro_rules! impl_record {
    ($record:ty, $input:ty, $table:expr, $pk:ident) => {
        impl Record for $record {
            type Input = $input;

            const TABLE: &'static Table = &$table;

            fn id(&self) -> Uuid {
                self.$pk
            }
        }
    };
}

// ============================================================================
// Reference data
// ============================================================================

/// An ICD diagnosis code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IcdCode {
    pub icd_code_id: Uuid,
    pub code: String,
    pub description: String,
    pub icd_version: String,
    pub category: Option<String>,
    pub is_billable: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for an ICD code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IcdCodeInput {
    pub code: String,
    pub description: String,
    pub icd_version: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_true")]
    pub is_billable: bool,
}

impl_record!(IcdCode, IcdCodeInput, schema::ICD_CODES, icd_code_id);

/// A healthcare provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provider {
    pub provider_id: Uuid,
    pub npi: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub specialty: Option<String>,
    pub department: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderInput {
    #[serde(default)]
    pub npi: Option<String>,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub specialty: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl_record!(Provider, ProviderInput, schema::PROVIDERS, provider_id);

/// A medication in the formulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medication {
    pub medication_id: Uuid,
    pub ndc_code: String,
    pub name: String,
    pub generic_name: Option<String>,
    pub drug_class: Option<String>,
    pub form: Option<String>,
    pub strength: Option<String>,
    pub manufacturer: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for a medication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicationInput {
    pub ndc_code: String,
    pub name: String,
    #[serde(default)]
    pub generic_name: Option<String>,
    #[serde(default)]
    pub drug_class: Option<String>,
    #[serde(default)]
    pub form: Option<String>,
    #[serde(default)]
    pub strength: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<String>,
}

impl_record!(Medication, MedicationInput, schema::MEDICATIONS, medication_id);

/// A research or care cohort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cohort {
    pub cohort_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub criteria: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for a cohort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub criteria: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl_record!(Cohort, CohortInput, schema::COHORTS, cohort_id);

// ============================================================================
// Patient-owned records
// ============================================================================

/// Contact details for a patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub contact_id: Uuid,
    pub patient_id: Uuid,
    pub phone_primary: Option<String>,
    pub phone_secondary: Option<String>,
    pub email: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_relationship: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub preferred_contact_method: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for a contact record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactInfoInput {
    pub phone_primary: Option<String>,
    pub phone_secondary: Option<String>,
    pub email: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_relationship: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub preferred_contact_method: Option<String>,
}

impl_record!(ContactInfo, ContactInfoInput, schema::CONTACT_INFO, contact_id);

/// A postal address for a patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub address_id: Uuid,
    pub patient_id: Uuid,
    pub address_type: String,
    pub street_line1: String,
    pub street_line2: Option<String>,
    pub city: String,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: String,
    pub is_current: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for an address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressInput {
    pub address_type: String,
    pub street_line1: String,
    #[serde(default)]
    pub street_line2: Option<String>,
    pub city: String,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    pub country: String,
    #[serde(default = "default_true")]
    pub is_current: bool,
}

impl_record!(Address, AddressInput, schema::ADDRESSES, address_id);

/// A patient risk factor such as smoking or obesity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub risk_factor_id: Uuid,
    pub patient_id: Uuid,
    pub factor_name: String,
    pub factor_value: Option<String>,
    pub factor_type: String,
    pub severity: Option<String>,
    pub onset_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_current: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for a risk factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactorInput {
    pub factor_name: String,
    #[serde(default)]
    pub factor_value: Option<String>,
    pub factor_type: String,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default, deserialize_with = "dates::deserialize_option")]
    pub onset_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "dates::deserialize_option")]
    pub end_date: Option<NaiveDate>,
    #[serde(default = "default_true")]
    pub is_current: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

impl_record!(RiskFactor, RiskFactorInput, schema::RISK_FACTORS, risk_factor_id);

/// A clinical encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Encounter {
    pub encounter_id: Uuid,
    pub patient_id: Uuid,
    pub provider_id: Option<Uuid>,
    pub encounter_type: String,
    pub encounter_date: DateTime<Utc>,
    pub discharge_date: Option<DateTime<Utc>>,
    pub facility: Option<String>,
    pub chief_complaint: Option<String>,
    pub disposition: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for an encounter. `encounter_date` defaults to now.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterInput {
    #[serde(default)]
    pub provider_id: Option<Uuid>,
    pub encounter_type: String,
    #[serde(default)]
    pub encounter_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub discharge_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub facility: Option<String>,
    #[serde(default)]
    pub chief_complaint: Option<String>,
    #[serde(default)]
    pub disposition: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl_record!(Encounter, EncounterInput, schema::ENCOUNTERS, encounter_id);

/// A diagnosis referencing exactly one ICD code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnosis {
    pub diagnosis_id: Uuid,
    pub patient_id: Uuid,
    pub encounter_id: Option<Uuid>,
    pub icd_code_id: Uuid,
    pub provider_id: Option<Uuid>,
    pub diagnosis_date: DateTime<Utc>,
    pub diagnosis_type: String,
    pub diagnosis_status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for a diagnosis. `diagnosis_date` defaults to now.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisInput {
    #[serde(default)]
    pub encounter_id: Option<Uuid>,
    pub icd_code_id: Uuid,
    #[serde(default)]
    pub provider_id: Option<Uuid>,
    #[serde(default)]
    pub diagnosis_date: Option<DateTime<Utc>>,
    pub diagnosis_type: String,
    pub diagnosis_status: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl_record!(Diagnosis, DiagnosisInput, schema::DIAGNOSES, diagnosis_id);

/// A medication prescribed to a patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientMedication {
    pub patient_medication_id: Uuid,
    pub patient_id: Uuid,
    pub medication_id: Uuid,
    pub provider_id: Option<Uuid>,
    pub encounter_id: Option<Uuid>,
    pub dosage: String,
    pub frequency: String,
    pub route: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
    pub prescription_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for a patient medication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientMedicationInput {
    pub medication_id: Uuid,
    #[serde(default)]
    pub provider_id: Option<Uuid>,
    #[serde(default)]
    pub encounter_id: Option<Uuid>,
    pub dosage: String,
    pub frequency: String,
    #[serde(default)]
    pub route: Option<String>,
    #[serde(deserialize_with = "dates::deserialize")]
    pub start_date: NaiveDate,
    #[serde(default, deserialize_with = "dates::deserialize_option")]
    pub end_date: Option<NaiveDate>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub prescription_notes: Option<String>,
}

impl_record!(
    PatientMedication,
    PatientMedicationInput,
    schema::PATIENT_MEDICATIONS,
    patient_medication_id
);

/// A recorded allergy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allergy {
    pub allergy_id: Uuid,
    pub patient_id: Uuid,
    pub allergen: String,
    pub allergy_type: String,
    pub reaction: Option<String>,
    pub severity: Option<String>,
    pub onset_date: Option<NaiveDate>,
    pub is_active: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for an allergy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllergyInput {
    pub allergen: String,
    pub allergy_type: String,
    #[serde(default)]
    pub reaction: Option<String>,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default, deserialize_with = "dates::deserialize_option")]
    pub onset_date: Option<NaiveDate>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

impl_record!(Allergy, AllergyInput, schema::ALLERGIES, allergy_id);

/// An administered vaccine dose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Immunization {
    pub immunization_id: Uuid,
    pub patient_id: Uuid,
    pub vaccine_name: String,
    pub vaccine_code: Option<String>,
    pub administration_date: NaiveDate,
    pub dose_number: Option<i64>,
    pub lot_number: Option<String>,
    pub administered_by: Option<Uuid>,
    pub site: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for an immunization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImmunizationInput {
    pub vaccine_name: String,
    #[serde(default)]
    pub vaccine_code: Option<String>,
    #[serde(deserialize_with = "dates::deserialize")]
    pub administration_date: NaiveDate,
    #[serde(default)]
    pub dose_number: Option<i64>,
    #[serde(default)]
    pub lot_number: Option<String>,
    #[serde(default)]
    pub administered_by: Option<Uuid>,
    #[serde(default)]
    pub site: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl_record!(
    Immunization,
    ImmunizationInput,
    schema::IMMUNIZATIONS,
    immunization_id
);

/// A condition present in the patient's family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyHistory {
    pub family_history_id: Uuid,
    pub patient_id: Uuid,
    pub relationship: String,
    pub condition: String,
    pub icd_code_id: Option<Uuid>,
    pub age_at_onset: Option<i64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for a family history entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyHistoryInput {
    pub relationship: String,
    pub condition: String,
    #[serde(default)]
    pub icd_code_id: Option<Uuid>,
    #[serde(default)]
    pub age_at_onset: Option<i64>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl_record!(
    FamilyHistory,
    FamilyHistoryInput,
    schema::FAMILY_HISTORY,
    family_history_id
);

/// A patient's membership in a cohort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortMember {
    pub cohort_member_id: Uuid,
    pub patient_id: Uuid,
    pub cohort_id: Uuid,
    pub enrolled_at: DateTime<Utc>,
    pub status: Option<String>,
    pub is_active: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for a cohort membership. `enrolled_at` defaults to now.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortMemberInput {
    pub cohort_id: Uuid,
    #[serde(default)]
    pub enrolled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

impl_record!(
    CohortMember,
    CohortMemberInput,
    schema::COHORT_MEMBERS,
    cohort_member_id
);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Checks that the record's JSON fields line up with its table.
    fn assert_record_matches_table<R: Record>(sample_input: serde_json::Value) {
        let table = R::TABLE;
        let input: R::Input = serde_json::from_value(sample_input).unwrap();
        let value = serde_json::to_value(&input).unwrap();
        for key in value.as_object().unwrap().keys() {
            assert!(
                table.column(key).is_some(),
                "{} input field {} is not a declared column",
                table.name,
                key
            );
        }
    }

    #[test]
    fn test_inputs_only_carry_declared_columns() {
        assert_record_matches_table::<IcdCode>(
            json!({"code": "E11.9", "description": "Type 2 diabetes", "icd_version": "10"}),
        );
        assert_record_matches_table::<Provider>(json!({"first_name": "Gregory", "last_name": "House"}));
        assert_record_matches_table::<Medication>(json!({"ndc_code": "0002-8215", "name": "Insulin"}));
        assert_record_matches_table::<Cohort>(json!({"name": "Diabetes registry"}));
        assert_record_matches_table::<ContactInfo>(json!({"email": "a@example.com"}));
        assert_record_matches_table::<Address>(json!({
            "address_type": "home", "street_line1": "1 Main St", "city": "Springfield", "country": "US"
        }));
        assert_record_matches_table::<RiskFactor>(
            json!({"factor_name": "smoking", "factor_type": "lifestyle"}),
        );
        assert_record_matches_table::<Encounter>(json!({"encounter_type": "outpatient"}));
        assert_record_matches_table::<Diagnosis>(json!({
            "icd_code_id": Uuid::new_v4(), "diagnosis_type": "primary", "diagnosis_status": "active"
        }));
        assert_record_matches_table::<PatientMedication>(json!({
            "medication_id": Uuid::new_v4(), "dosage": "10mg", "frequency": "daily", "start_date": "2024-01-01"
        }));
        assert_record_matches_table::<Allergy>(json!({"allergen": "penicillin", "allergy_type": "drug"}));
        assert_record_matches_table::<Immunization>(
            json!({"vaccine_name": "MMR", "administration_date": "2020-05-01"}),
        );
        assert_record_matches_table::<FamilyHistory>(
            json!({"relationship": "mother", "condition": "hypertension"}),
        );
        assert_record_matches_table::<CohortMember>(json!({"cohort_id": Uuid::new_v4()}));
    }

    #[test]
    fn test_boolean_defaults() {
        let rf: RiskFactorInput =
            serde_json::from_value(json!({"factor_name": "smoking", "factor_type": "lifestyle"}))
                .unwrap();
        assert!(rf.is_current);

        let code: IcdCodeInput = serde_json::from_value(
            json!({"code": "E11.9", "description": "d", "icd_version": "10", "is_billable": false}),
        )
        .unwrap();
        assert!(!code.is_billable);
    }

    #[test]
    fn test_record_ids() {
        assert_eq!(Diagnosis::TABLE.primary_key, "diagnosis_id");
        assert_eq!(CohortMember::TABLE.name, "cohort_members");
        assert!(ContactInfo::TABLE.is_patient_owned());
        assert!(!IcdCode::TABLE.is_patient_owned());
    }
}
