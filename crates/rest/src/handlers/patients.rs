//! Patient endpoint handlers.
//!
//! Every handler except [`chart_handler`] answers with the flattened
//! [`PatientSummary`] shape.
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | GET | `/patients` | [`list_handler`] |
//! | POST | `/patients` | [`create_handler`] |
//! | GET | `/patients/{id}` | [`read_handler`] |
//! | PUT | `/patients/{id}` | [`update_handler`] |
//! | DELETE | `/patients/{id}` | [`delete_handler`] |
//! | POST | `/patients/search` | [`search_handler`] |
//! | GET | `/patients/{id}/record` | [`chart_handler`] |

use axum::{
    Json,
    extract::{OriginalUri, Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use hospital_persistence::core::{PatientSearchProvider, PatientStorage};
use hospital_persistence::schema::PATIENTS;
use hospital_persistence::types::{PatientInput, PatientQuery, PatientSummary, StoredPatient};
use tracing::debug;

use crate::error::{RestError, RestResult};
use crate::extractors::{JsonBody, Pagination};
use crate::state::AppState;

fn patient_not_found(id: String) -> RestError {
    RestError::NotFound {
        resource_type: PATIENTS.label.to_string(),
        id,
    }
}

/// Handler for listing patients.
///
/// # HTTP Request
///
/// `GET [base]/patients?skip=0&limit=10`
///
/// # Response
///
/// - `200 OK` - Patients in insertion order
/// - `400 Bad Request` - Invalid `skip` / `limit`
pub async fn list_handler<S>(
    State(state): State<AppState<S>>,
    pagination: Pagination,
) -> RestResult<Response>
where
    S: PatientStorage + 'static,
{
    debug!(
        skip = pagination.skip(),
        limit = pagination.limit(),
        "Processing list patients request"
    );

    let patients = state.storage().list_patients(pagination.window()).await?;
    let summaries: Vec<PatientSummary> =
        patients.into_iter().map(StoredPatient::into_summary).collect();

    Ok((StatusCode::OK, Json(summaries)).into_response())
}

/// Handler for creating a patient.
///
/// The server assigns the patient id and both timestamps.
///
/// # HTTP Request
///
/// `POST [base]/patients`
///
/// # Response
///
/// - `201 Created` - Patient created, with a `Location` header
/// - `422 Unprocessable Entity` - Malformed payload
/// - `500 Internal Server Error` - Datastore failure (including a duplicate `mrn`)
pub async fn create_handler<S>(
    State(state): State<AppState<S>>,
    OriginalUri(uri): OriginalUri,
    JsonBody(input): JsonBody<PatientInput>,
) -> RestResult<Response>
where
    S: PatientStorage + 'static,
{
    debug!(mrn = %input.mrn, "Processing create patient request");

    let stored = state.storage().create_patient(input).await?;
    let id = stored.patient.patient_id.to_string();
    let location = state.location(uri.path(), &id);

    debug!(id = %id, "Patient created");

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(stored.into_summary()),
    )
        .into_response())
}

/// Handler for reading a patient.
///
/// # HTTP Request
///
/// `GET [base]/patients/{id}`
///
/// # Response
///
/// - `200 OK` - Patient found
/// - `404 Not Found` - No patient with this id
pub async fn read_handler<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> RestResult<Response>
where
    S: PatientStorage + 'static,
{
    debug!(id = %id, "Processing read patient request");

    match state.storage().read_patient(&id).await? {
        Some(stored) => Ok((StatusCode::OK, Json(stored.into_summary())).into_response()),
        None => {
            debug!(id = %id, "Patient not found");
            Err(patient_not_found(id))
        }
    }
}

/// Handler for replacing a patient.
///
/// Every field is overwritten; omitted optional fields are cleared.
///
/// # HTTP Request
///
/// `PUT [base]/patients/{id}`
///
/// # Response
///
/// - `200 OK` - Patient updated
/// - `404 Not Found` - No patient with this id
/// - `422 Unprocessable Entity` - Malformed payload
pub async fn update_handler<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<PatientInput>,
) -> RestResult<Response>
where
    S: PatientStorage + 'static,
{
    debug!(id = %id, "Processing update patient request");

    let stored = state.storage().update_patient(&id, input).await?;
    Ok((StatusCode::OK, Json(stored.into_summary())).into_response())
}

/// Handler for deleting a patient.
///
/// Records owned by the patient are deleted with it. The response carries
/// the patient as it was before deletion.
///
/// # HTTP Request
///
/// `DELETE [base]/patients/{id}`
///
/// # Response
///
/// - `200 OK` - Patient deleted
/// - `404 Not Found` - No patient with this id
pub async fn delete_handler<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> RestResult<Response>
where
    S: PatientStorage + 'static,
{
    debug!(id = %id, "Processing delete patient request");

    let deleted = state.storage().delete_patient(&id).await?;

    debug!(id = %id, "Patient deleted");
    Ok((StatusCode::OK, Json(deleted.into_summary())).into_response())
}

/// Handler for the patient search.
///
/// # HTTP Request
///
/// `POST [base]/patients/search`
///
/// ```json
/// {"age_min": 30, "age_max": 40, "risk_factors": ["smoking"], "diagnoses": ["E11.9"]}
/// ```
///
/// # Response
///
/// - `200 OK` - Matching patients, each at most once
/// - `422 Unprocessable Entity` - Malformed filter object
pub async fn search_handler<S>(
    State(state): State<AppState<S>>,
    JsonBody(query): JsonBody<PatientQuery>,
) -> RestResult<Response>
where
    S: PatientSearchProvider + 'static,
{
    debug!(query = ?query, "Processing patient search request");

    let summaries = state.storage().search_patients(&query).await?;

    debug!(matches = summaries.len(), "Returning search results");
    Ok((StatusCode::OK, Json(summaries)).into_response())
}

/// Handler for a patient's full chart.
///
/// # HTTP Request
///
/// `GET [base]/patients/{id}/record`
///
/// # Response
///
/// - `200 OK` - The patient with every owned record
/// - `404 Not Found` - No patient with this id
pub async fn chart_handler<S>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> RestResult<Response>
where
    S: PatientStorage + 'static,
{
    debug!(id = %id, "Processing patient chart request");

    let chart = state
        .storage()
        .read_chart(&id)
        .await?
        .ok_or_else(|| patient_not_found(id))?;

    Ok((StatusCode::OK, Json(chart)).into_response())
}
