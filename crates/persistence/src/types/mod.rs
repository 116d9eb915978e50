//! Core types for the persistence layer.
//!
//! This module contains the patient types, the related record types and
//! their [`Record`] bindings, and pagination.

pub mod dates;
mod pagination;
mod patient;
mod records;

pub use pagination::{DEFAULT_LIMIT, Pagination};
pub use patient::{
    Patient, PatientChart, PatientCreate, PatientInput, PatientQuery, PatientSummary,
    PatientUpdate, StoredPatient,
};
pub use records::{
    Address, AddressInput, Allergy, AllergyInput, Cohort, CohortInput, CohortMember,
    CohortMemberInput, ContactInfo, ContactInfoInput, Diagnosis, DiagnosisInput, Encounter,
    EncounterInput, FamilyHistory, FamilyHistoryInput, IcdCode, IcdCodeInput, Immunization,
    ImmunizationInput, Medication, MedicationInput, PatientMedication, PatientMedicationInput,
    Provider, ProviderInput, Record, RiskFactor, RiskFactorInput,
};
