//! Route table.
//!
//! Defines every route of the patient records API.

use axum::{
    Router,
    routing::{get, post},
};
use hospital_persistence::core::{PatientSearchProvider, RecordStorage};
use hospital_persistence::types::{
    Address, Allergy, Cohort, CohortMember, ContactInfo, Diagnosis, Encounter, FamilyHistory,
    IcdCode, Immunization, Medication, PatientMedication, Provider, Record, RiskFactor,
};

use crate::handlers::{self, patients, records};
use crate::state::AppState;

/// Creates all REST API routes.
///
/// # Routes
///
/// ## Operational
/// - `GET /health` - Health check
/// - `GET /_liveness` - Liveness probe
/// - `GET /_readiness` - Readiness probe
///
/// ## Patients
/// - `GET /patients` - List
/// - `POST /patients` - Create
/// - `POST /patients/search` - Search
/// - `GET /patients/{id}` - Read
/// - `PUT /patients/{id}` - Update
/// - `DELETE /patients/{id}` - Delete
/// - `GET /patients/{id}/record` - Full chart
///
/// ## Patient-owned records
/// `GET`/`POST` on `/patients/{id}/{collection}` and `GET`/`PUT`/`DELETE` on
/// `/patients/{id}/{collection}/{record_id}` for `contacts`, `addresses`,
/// `risk-factors`, `diagnoses`, `encounters`, `medications`, `allergies`,
/// `immunizations`, `family-history` and `cohorts`.
///
/// ## Reference data
/// The same verbs on `/icd-codes`, `/providers`, `/medications` and `/cohorts`.
pub fn create_routes<S>(state: AppState<S>) -> Router
where
    S: PatientSearchProvider + RecordStorage + 'static,
{
    let router = Router::new()
        // Operational routes
        .route("/health", get(handlers::health_handler::<S>))
        .route("/_liveness", get(handlers::liveness_handler))
        .route("/_readiness", get(handlers::readiness_handler::<S>))
        // Patient routes; the collection answers with and without a trailing slash
        .route(
            "/patients",
            get(patients::list_handler::<S>).post(patients::create_handler::<S>),
        )
        .route(
            "/patients/",
            get(patients::list_handler::<S>).post(patients::create_handler::<S>),
        )
        .route("/patients/search", post(patients::search_handler::<S>))
        .route(
            "/patients/{id}",
            get(patients::read_handler::<S>)
                .put(patients::update_handler::<S>)
                .delete(patients::delete_handler::<S>),
        )
        .route("/patients/{id}/record", get(patients::chart_handler::<S>));

    let router = owned::<S, ContactInfo>(router, "contacts");
    let router = owned::<S, Address>(router, "addresses");
    let router = owned::<S, RiskFactor>(router, "risk-factors");
    let router = owned::<S, Diagnosis>(router, "diagnoses");
    let router = owned::<S, Encounter>(router, "encounters");
    let router = owned::<S, PatientMedication>(router, "medications");
    let router = owned::<S, Allergy>(router, "allergies");
    let router = owned::<S, Immunization>(router, "immunizations");
    let router = owned::<S, FamilyHistory>(router, "family-history");
    let router = owned::<S, CohortMember>(router, "cohorts");

    let router = reference::<S, IcdCode>(router, "icd-codes");
    let router = reference::<S, Provider>(router, "providers");
    let router = reference::<S, Medication>(router, "medications");
    let router = reference::<S, Cohort>(router, "cohorts");

    router.with_state(state)
}

/// Mounts CRUD routes for a patient-owned collection.
fn owned<S, R>(router: Router<AppState<S>>, collection: &str) -> Router<AppState<S>>
where
    S: PatientSearchProvider + RecordStorage + 'static,
    R: Record,
{
    router
        .route(
            &format!("/patients/{{id}}/{}", collection),
            get(records::list_owned_handler::<S, R>).post(records::create_owned_handler::<S, R>),
        )
        .route(
            &format!("/patients/{{id}}/{}/{{record_id}}", collection),
            get(records::read_owned_handler::<S, R>)
                .put(records::update_owned_handler::<S, R>)
                .delete(records::delete_owned_handler::<S, R>),
        )
}

/// Mounts CRUD routes for a reference data collection.
fn reference<S, R>(router: Router<AppState<S>>, collection: &str) -> Router<AppState<S>>
where
    S: PatientSearchProvider + RecordStorage + 'static,
    R: Record,
{
    router
        .route(
            &format!("/{}", collection),
            get(records::list_reference_handler::<S, R>)
                .post(records::create_reference_handler::<S, R>),
        )
        .route(
            &format!("/{}/{{id}}", collection),
            get(records::read_reference_handler::<S, R>)
                .put(records::update_reference_handler::<S, R>)
                .delete(records::delete_reference_handler::<S, R>),
        )
}
