//! Related record handlers.
//!
//! One set of handlers serves every record table, selected through the
//! [`Record`] type parameter at routing time. Patient-owned collections live
//! under `/patients/{id}/...`; reference data has top-level
//! collections.

use axum::{
    Json,
    extract::{OriginalUri, Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use hospital_persistence::core::{PatientStorage, RecordStorage};
use hospital_persistence::types::Record;
use tracing::debug;

use crate::error::{RestError, RestResult};
use crate::extractors::{JsonBody, Pagination};
use crate::state::AppState;

fn record_not_found<R: Record>(id: String) -> RestError {
    RestError::NotFound {
        resource_type: R::TABLE.label.to_string(),
        id,
    }
}

async fn list<S, R>(
    state: &AppState<S>,
    owner: Option<&str>,
    pagination: Pagination,
) -> RestResult<Response>
where
    S: PatientStorage + RecordStorage + 'static,
    R: Record,
{
    debug!(
        table = R::TABLE.name,
        owner = ?owner,
        skip = pagination.skip(),
        limit = pagination.limit(),
        "Processing list records request"
    );

    let records = state
        .storage()
        .list_records::<R>(owner, pagination.window())
        .await?;

    Ok((StatusCode::OK, Json(records)).into_response())
}

async fn create<S, R>(
    state: &AppState<S>,
    owner: Option<&str>,
    path: &str,
    input: R::Input,
) -> RestResult<Response>
where
    S: PatientStorage + RecordStorage + 'static,
    R: Record,
{
    debug!(table = R::TABLE.name, owner = ?owner, "Processing create record request");

    let record = state.storage().create_record::<R>(owner, input).await?;
    let location = state.location(path, &record.id().to_string());

    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(record)).into_response())
}

async fn read<S, R>(
    state: &AppState<S>,
    owner: Option<&str>,
    id: String,
) -> RestResult<Response>
where
    S: PatientStorage + RecordStorage + 'static,
    R: Record,
{
    debug!(table = R::TABLE.name, owner = ?owner, id = %id, "Processing read record request");

    // An unknown owner surfaces as a patient 404 before the record lookup.
    let record = state
        .storage()
        .read_record::<R>(owner, &id)
        .await?
        .ok_or_else(|| record_not_found::<R>(id))?;

    Ok((StatusCode::OK, Json(record)).into_response())
}

async fn update<S, R>(
    state: &AppState<S>,
    owner: Option<&str>,
    id: String,
    input: R::Input,
) -> RestResult<Response>
where
    S: PatientStorage + RecordStorage + 'static,
    R: Record,
{
    debug!(table = R::TABLE.name, owner = ?owner, id = %id, "Processing update record request");

    let record = state
        .storage()
        .update_record::<R>(owner, &id, input)
        .await?;

    Ok((StatusCode::OK, Json(record)).into_response())
}

async fn delete<S, R>(
    state: &AppState<S>,
    owner: Option<&str>,
    id: String,
) -> RestResult<Response>
where
    S: PatientStorage + RecordStorage + 'static,
    R: Record,
{
    debug!(table = R::TABLE.name, owner = ?owner, id = %id, "Processing delete record request");

    let record = state.storage().delete_record::<R>(owner, &id).await?;

    Ok((StatusCode::OK, Json(record)).into_response())
}

// ============================================================================
// Patient-owned collections
// ============================================================================

/// `GET [base]/patients/{id}/{collection}`
///
/// - `200 OK` - The patient's records in insertion order
/// - `404 Not Found` - Unknown patient
pub async fn list_owned_handler<S, R>(
    State(state): State<AppState<S>>,
    Path(patient_id): Path<String>,
    pagination: Pagination,
) -> RestResult<Response>
where
    S: PatientStorage + RecordStorage + 'static,
    R: Record,
{
    list::<S, R>(&state, Some(&patient_id), pagination).await
}

/// `POST [base]/patients/{id}/{collection}`
///
/// - `201 Created` - Record created, with a `Location` header
/// - `404 Not Found` - Unknown patient
/// - `422 Unprocessable Entity` - Malformed payload
pub async fn create_owned_handler<S, R>(
    State(state): State<AppState<S>>,
    Path(patient_id): Path<String>,
    OriginalUri(uri): OriginalUri,
    JsonBody(input): JsonBody<R::Input>,
) -> RestResult<Response>
where
    S: PatientStorage + RecordStorage + 'static,
    R: Record,
{
    create::<S, R>(&state, Some(&patient_id), uri.path(), input).await
}

/// `GET [base]/patients/{id}/{collection}/{record_id}`
///
/// - `200 OK` - Record found
/// - `404 Not Found` - Unknown patient, or no such record for this patient
pub async fn read_owned_handler<S, R>(
    State(state): State<AppState<S>>,
    Path((patient_id, id)): Path<(String, String)>,
) -> RestResult<Response>
where
    S: PatientStorage + RecordStorage + 'static,
    R: Record,
{
    read::<S, R>(&state, Some(&patient_id), id).await
}

/// `PUT [base]/patients/{id}/{collection}/{record_id}`
///
/// - `200 OK` - Record replaced
/// - `404 Not Found` - Unknown patient, or no such record for this patient
/// - `422 Unprocessable Entity` - Malformed payload
pub async fn update_owned_handler<S, R>(
    State(state): State<AppState<S>>,
    Path((patient_id, id)): Path<(String, String)>,
    JsonBody(input): JsonBody<R::Input>,
) -> RestResult<Response>
where
    S: PatientStorage + RecordStorage + 'static,
    R: Record,
{
    update::<S, R>(&state, Some(&patient_id), id, input).await
}

/// `DELETE [base]/patients/{id}/{collection}/{record_id}`
///
/// - `200 OK` - Record deleted, returned as it was
/// - `404 Not Found` - Unknown patient, or no such record for this patient
pub async fn delete_owned_handler<S, R>(
    State(state): State<AppState<S>>,
    Path((patient_id, id)): Path<(String, String)>,
) -> RestResult<Response>
where
    S: PatientStorage + RecordStorage + 'static,
    R: Record,
{
    delete::<S, R>(&state, Some(&patient_id), id).await
}

// ============================================================================
// Reference data collections
// ============================================================================

/// `GET [base]/{collection}`
pub async fn list_reference_handler<S, R>(
    State(state): State<AppState<S>>,
    pagination: Pagination,
) -> RestResult<Response>
where
    S: PatientStorage + RecordStorage + 'static,
    R: Record,
{
    list::<S, R>(&state, None, pagination).await
}

/// `POST [base]/{collection}`
pub async fn create_reference_handler<S, R>(
    State(state): State<AppState<S>>,
    OriginalUri(uri): OriginalUri,
    JsonBody(input): JsonBody<R::Input>,
) -> RestResult<Response>
where
    S: PatientStorage + RecordStorage + 'static,
    R: Record,
{
    create::<S, R>(&state, None, uri.path(), input).await
}

/// `GET [base]/{collection}/{id}`
pub async fn read_reference_handler<S, R>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> RestResult<Response>
where
    S: PatientStorage + RecordStorage + 'static,
    R: Record,
{
    read::<S, R>(&state, None, id).await
}

/// `PUT [base]/{collection}/{id}`
pub async fn update_reference_handler<S, R>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
    JsonBody(input): JsonBody<R::Input>,
) -> RestResult<Response>
where
    S: PatientStorage + RecordStorage + 'static,
    R: Record,
{
    update::<S, R>(&state, None, id, input).await
}

/// `DELETE [base]/{collection}/{id}`
pub async fn delete_reference_handler<S, R>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> RestResult<Response>
where
    S: PatientStorage + RecordStorage + 'static,
    R: Record,
{
    delete::<S, R>(&state, None, id).await
}
