//! Declarative relational schema.
//!
//! Every table of the service is described once here as a [`Table`] value.
//! Backends generate their DDL from these descriptions, and the generic
//! record operations map payloads onto the declared columns only, so fields
//! that are not declared never reach the database.
//!
//! Each table implicitly carries:
//!
//! - its primary key column (a UUID rendered as text),
//! - the owning `patient_id` column when the table is patient-owned,
//! - `created_at` / `updated_at` timestamps maintained on write.

/// The storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Free text.
    Text,
    /// 64-bit integer.
    Integer,
    /// Boolean, stored as 0/1.
    Bool,
    /// Calendar date, stored as `YYYY-MM-DD`.
    Date,
    /// UTC timestamp, stored as RFC 3339 text.
    Timestamp,
    /// Reference to another record's UUID, stored as text.
    Id,
}

/// A value applied when a column is omitted from a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnDefault {
    /// The current UTC time.
    Now,
    /// A fixed boolean.
    Bool(bool),
}

/// A foreign key target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    /// Referenced table.
    pub table: &'static str,
    /// Referenced column.
    pub column: &'static str,
}

/// A declared column of a [`Table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Column name, identical to the JSON field name.
    pub name: &'static str,
    /// Storage type.
    pub kind: ColumnKind,
    /// Whether the column is `NOT NULL`.
    pub required: bool,
    /// Whether the column carries a `UNIQUE` constraint.
    pub unique: bool,
    /// Foreign key target, if any.
    pub references: Option<ForeignKey>,
    /// Default applied when the value is omitted.
    pub default: Option<ColumnDefault>,
}

impl Column {
    const fn new(name: &'static str, kind: ColumnKind) -> Self {
        Self {
            name,
            kind,
            required: false,
            unique: false,
            references: None,
            default: None,
        }
    }

    /// A text column.
    pub const fn text(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Text)
    }

    /// An integer column.
    pub const fn integer(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Integer)
    }

    /// A boolean column.
    pub const fn boolean(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Bool)
    }

    /// A date column.
    pub const fn date(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Date)
    }

    /// A timestamp column.
    pub const fn timestamp(name: &'static str) -> Self {
        Self::new(name, ColumnKind::Timestamp)
    }

    /// A reference column pointing at `table.column`.
    pub const fn id(name: &'static str, table: &'static str, column: &'static str) -> Self {
        let mut col = Self::new(name, ColumnKind::Id);
        col.references = Some(ForeignKey { table, column });
        col
    }

    /// Marks the column `NOT NULL`.
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Marks the column `UNIQUE`.
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Defaults the column to the current time.
    pub const fn default_now(mut self) -> Self {
        self.default = Some(ColumnDefault::Now);
        self
    }

    /// Defaults the column to a fixed boolean.
    pub const fn default_bool(mut self, value: bool) -> Self {
        self.default = Some(ColumnDefault::Bool(value));
        self
    }
}

/// A declared table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Table {
    /// SQL table name.
    pub name: &'static str,
    /// Human-readable record name used in error messages.
    pub label: &'static str,
    /// Primary key column name.
    pub primary_key: &'static str,
    /// Owning patient column, for patient-owned tables.
    pub owner: Option<&'static str>,
    /// Declared payload columns, in storage order.
    pub columns: &'static [Column],
}

impl Table {
    /// Returns true if records of this table belong to a patient.
    pub fn is_patient_owned(&self) -> bool {
        self.owner.is_some()
    }

    /// Looks up a declared column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Name of the owner column on patient-owned tables.
pub const PATIENT_OWNER: &str = "patient_id";

/// `patients`
pub static PATIENTS: Table = Table {
    name: "patients",
    label: "Patient",
    primary_key: "patient_id",
    owner: None,
    columns: &[
        Column::text("mrn").required().unique(),
        Column::text("first_name").required(),
        Column::text("middle_name"),
        Column::text("last_name").required(),
        Column::date("date_of_birth").required(),
        Column::text("gender").required(),
        Column::text("biological_sex").required(),
        Column::text("blood_type"),
        Column::text("ethnicity"),
        Column::text("race"),
        Column::text("preferred_language"),
        Column::text("marital_status"),
        Column::text("occupation"),
        Column::boolean("is_deceased").default_bool(false),
        Column::date("deceased_date"),
    ],
};

// Reference data

/// `icd_codes`
pub static ICD_CODES: Table = Table {
    name: "icd_codes",
    label: "ICD code",
    primary_key: "icd_code_id",
    owner: None,
    columns: &[
        Column::text("code").required().unique(),
        Column::text("description").required(),
        Column::text("icd_version").required(),
        Column::text("category"),
        Column::boolean("is_billable").default_bool(true),
    ],
};

/// `healthcare_providers`
pub static PROVIDERS: Table = Table {
    name: "healthcare_providers",
    label: "Provider",
    primary_key: "provider_id",
    owner: None,
    columns: &[
        Column::text("npi").unique(),
        Column::text("first_name").required(),
        Column::text("last_name").required(),
        Column::text("specialty"),
        Column::text("department"),
        Column::text("phone"),
        Column::text("email"),
        Column::boolean("is_active").default_bool(true),
    ],
};

/// `medications`
pub static MEDICATIONS: Table = Table {
    name: "medications",
    label: "Medication",
    primary_key: "medication_id",
    owner: None,
    columns: &[
        Column::text("ndc_code").required().unique(),
        Column::text("name").required(),
        Column::text("generic_name"),
        Column::text("drug_class"),
        Column::text("form"),
        Column::text("strength"),
        Column::text("manufacturer"),
    ],
};

/// `cohorts`
pub static COHORTS: Table = Table {
    name: "cohorts",
    label: "Cohort",
    primary_key: "cohort_id",
    owner: None,
    columns: &[
        Column::text("name").required().unique(),
        Column::text("description"),
        Column::text("criteria"),
        Column::boolean("is_active").default_bool(true),
    ],
};

// Patient-owned collections

/// `patient_contact_info`
pub static CONTACT_INFO: Table = Table {
    name: "patient_contact_info",
    label: "Contact",
    primary_key: "contact_id",
    owner: Some(PATIENT_OWNER),
    columns: &[
        Column::text("phone_primary"),
        Column::text("phone_secondary"),
        Column::text("email"),
        Column::text("emergency_contact_name"),
        Column::text("emergency_contact_relationship"),
        Column::text("emergency_contact_phone"),
        Column::text("preferred_contact_method"),
    ],
};

/// `patient_addresses`
pub static ADDRESSES: Table = Table {
    name: "patient_addresses",
    label: "Address",
    primary_key: "address_id",
    owner: Some(PATIENT_OWNER),
    columns: &[
        Column::text("address_type").required(),
        Column::text("street_line1").required(),
        Column::text("street_line2"),
        Column::text("city").required(),
        Column::text("state"),
        Column::text("postal_code"),
        Column::text("country").required(),
        Column::boolean("is_current").default_bool(true),
    ],
};

/// `patient_risk_factors`
pub static RISK_FACTORS: Table = Table {
    name: "patient_risk_factors",
    label: "Risk factor",
    primary_key: "risk_factor_id",
    owner: Some(PATIENT_OWNER),
    columns: &[
        Column::text("factor_name").required(),
        Column::text("factor_value"),
        Column::text("factor_type").required(),
        Column::text("severity"),
        Column::date("onset_date"),
        Column::date("end_date"),
        Column::boolean("is_current").default_bool(true),
        Column::text("notes"),
    ],
};

/// `patient_encounters`
pub static ENCOUNTERS: Table = Table {
    name: "patient_encounters",
    label: "Encounter",
    primary_key: "encounter_id",
    owner: Some(PATIENT_OWNER),
    columns: &[
        Column::id("provider_id", "healthcare_providers", "provider_id"),
        Column::text("encounter_type").required(),
        Column::timestamp("encounter_date").required().default_now(),
        Column::timestamp("discharge_date"),
        Column::text("facility"),
        Column::text("chief_complaint"),
        Column::text("disposition"),
        Column::text("notes"),
    ],
};

/// `diagnoses`
pub static DIAGNOSES: Table = Table {
    name: "diagnoses",
    label: "Diagnosis",
    primary_key: "diagnosis_id",
    owner: Some(PATIENT_OWNER),
    columns: &[
        Column::id("encounter_id", "patient_encounters", "encounter_id"),
        Column::id("icd_code_id", "icd_codes", "icd_code_id").required(),
        Column::id("provider_id", "healthcare_providers", "provider_id"),
        Column::timestamp("diagnosis_date").required().default_now(),
        Column::text("diagnosis_type").required(),
        Column::text("diagnosis_status").required(),
        Column::text("notes"),
    ],
};

/// `patient_medications`
pub static PATIENT_MEDICATIONS: Table = Table {
    name: "patient_medications",
    label: "Patient medication",
    primary_key: "patient_medication_id",
    owner: Some(PATIENT_OWNER),
    columns: &[
        Column::id("medication_id", "medications", "medication_id").required(),
        Column::id("provider_id", "healthcare_providers", "provider_id"),
        Column::id("encounter_id", "patient_encounters", "encounter_id"),
        Column::text("dosage").required(),
        Column::text("frequency").required(),
        Column::text("route"),
        Column::date("start_date").required(),
        Column::date("end_date"),
        Column::boolean("is_active").default_bool(true),
        Column::text("prescription_notes"),
    ],
};

/// `patient_allergies`
pub static ALLERGIES: Table = Table {
    name: "patient_allergies",
    label: "Allergy",
    primary_key: "allergy_id",
    owner: Some(PATIENT_OWNER),
    columns: &[
        Column::text("allergen").required(),
        Column::text("allergy_type").required(),
        Column::text("reaction"),
        Column::text("severity"),
        Column::date("onset_date"),
        Column::boolean("is_active").default_bool(true),
        Column::text("notes"),
    ],
};

/// `patient_immunizations`
pub static IMMUNIZATIONS: Table = Table {
    name: "patient_immunizations",
    label: "Immunization",
    primary_key: "immunization_id",
    owner: Some(PATIENT_OWNER),
    columns: &[
        Column::text("vaccine_name").required(),
        Column::text("vaccine_code"),
        Column::date("administration_date").required(),
        Column::integer("dose_number"),
        Column::text("lot_number"),
        Column::id("administered_by", "healthcare_providers", "provider_id"),
        Column::text("site"),
        Column::text("notes"),
    ],
};

/// `family_medical_history`
pub static FAMILY_HISTORY: Table = Table {
    name: "family_medical_history",
    label: "Family history entry",
    primary_key: "family_history_id",
    owner: Some(PATIENT_OWNER),
    columns: &[
        Column::text("relationship").required(),
        Column::text("condition").required(),
        Column::id("icd_code_id", "icd_codes", "icd_code_id"),
        Column::integer("age_at_onset"),
        Column::text("notes"),
    ],
};

/// `cohort_members`
pub static COHORT_MEMBERS: Table = Table {
    name: "cohort_members",
    label: "Cohort membership",
    primary_key: "cohort_member_id",
    owner: Some(PATIENT_OWNER),
    columns: &[
        Column::id("cohort_id", "cohorts", "cohort_id").required(),
        Column::timestamp("enrolled_at").required().default_now(),
        Column::text("status"),
        Column::boolean("is_active").default_bool(true),
        Column::text("notes"),
    ],
};

/// All tables, in creation order (referenced tables first).
pub static ALL_TABLES: &[&Table] = &[
    &PATIENTS,
    &ICD_CODES,
    &PROVIDERS,
    &MEDICATIONS,
    &COHORTS,
    &CONTACT_INFO,
    &ADDRESSES,
    &RISK_FACTORS,
    &ENCOUNTERS,
    &DIAGNOSES,
    &PATIENT_MEDICATIONS,
    &ALLERGIES,
    &IMMUNIZATIONS,
    &FAMILY_HISTORY,
    &COHORT_MEMBERS,
];
