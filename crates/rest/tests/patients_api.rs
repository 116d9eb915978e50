//! Patient endpoint tests.
//!
//! Tests the HTTP behavior of the patient endpoints:
//! - Status codes (200, 201, 400, 404, 422, 500)
//! - The flattened summary shape and `Location` header
//! - Pagination and search filters

use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::{Months, NaiveDate, Utc};
use hospital_persistence::backends::sqlite::SqliteBackend;
use hospital_rest::{AppState, ServerConfig};
use serde_json::{Value, json};
use uuid::Uuid;

/// Creates a test server over a fresh in-memory database.
fn create_test_server() -> TestServer {
    create_test_server_with_config(ServerConfig::for_testing())
}

fn create_test_server_with_config(config: ServerConfig) -> TestServer {
    let backend = SqliteBackend::in_memory().expect("Failed to create SQLite backend");
    backend.init_schema().expect("Failed to init schema");

    let state = AppState::new(Arc::new(backend), config);
    let app = hospital_rest::routing::create_routes(state);
    TestServer::new(app).expect("Failed to create test server")
}

fn server_for(backend: SqliteBackend) -> TestServer {
    backend.init_schema().expect("Failed to init schema");
    let state = AppState::new(Arc::new(backend), ServerConfig::for_testing());
    TestServer::new(hospital_rest::routing::create_routes(state))
        .expect("Failed to create test server")
}

/// A birth date giving an age of exactly `years` today.
fn born_years_ago(years: u32) -> NaiveDate {
    Utc::now()
        .date_naive()
        .checked_sub_months(Months::new(years * 12))
        .unwrap()
}

fn patient_payload(mrn: &str, dob: NaiveDate) -> Value {
    json!({
        "mrn": mrn,
        "first_name": "Ada",
        "last_name": "Lovelace",
        "date_of_birth": dob,
        "gender": "female",
        "biological_sex": "female",
        "ethnicity": "not hispanic"
    })
}

/// Creates a patient and returns its id.
async fn seed_patient(server: &TestServer, mrn: &str, dob: NaiveDate) -> String {
    let response = server.post("/patients").json(&patient_payload(mrn, dob)).await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["patient_id"]
        .as_str()
        .unwrap()
        .to_string()
}

async fn add_risk_factor(server: &TestServer, patient_id: &str, name: &str) {
    server
        .post(&format!("/patients/{}/risk-factors", patient_id))
        .json(&json!({"factor_name": name, "factor_type": "lifestyle"}))
        .await
        .assert_status(StatusCode::CREATED);
}

fn ids(body: &Value) -> Vec<String> {
    body.as_array()
        .unwrap()
        .iter()
        .map(|p| p["patient_id"].as_str().unwrap().to_string())
        .collect()
}

// =============================================================================
// Create / Read
// =============================================================================

#[tokio::test]
async fn test_create_returns_201_with_summary() {
    let server = create_test_server();

    let response = server
        .post("/patients")
        .json(&patient_payload("MRN-1", born_years_ago(40)))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    let id = body["patient_id"].as_str().unwrap();
    assert!(Uuid::parse_str(id).is_ok());

    let mut keys: Vec<&str> = body.as_object().unwrap().keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(
        keys,
        vec![
            "created_at",
            "email",
            "first_name",
            "last_name",
            "patient_id",
            "updated_at"
        ]
    );
    assert_eq!(body["email"], Value::Null);

    let location = response.header("location");
    assert_eq!(
        location.to_str().unwrap(),
        format!("http://localhost:8080/patients/{}", id)
    );
}

#[tokio::test]
async fn test_collection_accepts_trailing_slash() {
    let server = create_test_server();

    server
        .post("/patients/")
        .json(&patient_payload("MRN-1", born_years_ago(40)))
        .await
        .assert_status(StatusCode::CREATED);

    let with_slash: Value = server.get("/patients/").await.json();
    let without: Value = server.get("/patients").await.json();
    assert_eq!(with_slash, without);
    assert_eq!(with_slash.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_read_returns_summary() {
    let server = create_test_server();
    let id = seed_patient(&server, "MRN-1", born_years_ago(40)).await;

    let response = server.get(&format!("/patients/{}", id)).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["patient_id"], id.as_str());
    assert_eq!(body["first_name"], "Ada");
    assert_eq!(body["last_name"], "Lovelace");
}

#[tokio::test]
async fn test_read_unknown_returns_404_detail() {
    let server = create_test_server();

    let response = server.get(&format!("/patients/{}", Uuid::new_v4())).await;
    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_json(&json!({"detail": "Patient not found"}));

    // Ids that are not UUIDs simply don't exist
    server
        .get("/patients/not-a-uuid")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_required_field_is_422() {
    let server = create_test_server();

    let response = server
        .post("/patients")
        .json(&json!({"mrn": "MRN-1", "first_name": "Ada"}))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.json::<Value>()["detail"].is_string());
}

#[tokio::test]
async fn test_wrong_type_is_422() {
    let server = create_test_server();

    let mut payload = patient_payload("MRN-1", born_years_ago(40));
    payload["date_of_birth"] = json!("yesterday");
    server
        .post("/patients")
        .json(&payload)
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_five_digit_birth_year_is_422() {
    let server = create_test_server();

    let mut payload = patient_payload("MRN-1", born_years_ago(40));
    payload["date_of_birth"] = json!("+12000-01-01");
    server
        .post("/patients")
        .json(&payload)
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    seed_patient(&server, "MRN-2", born_years_ago(20)).await;
    let found: Value = server
        .post("/patients/search")
        .json(&json!({"age_min": 30}))
        .await
        .json();
    assert!(ids(&found).is_empty());
}

#[tokio::test]
async fn test_duplicate_mrn_is_opaque_500() {
    let server = create_test_server();
    seed_patient(&server, "MRN-DUP", born_years_ago(40)).await;

    let response = server
        .post("/patients")
        .json(&patient_payload("MRN-DUP", born_years_ago(30)))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    response.assert_json(&json!({"detail": "Internal server error"}));
}

// =============================================================================
// Update / Delete
// =============================================================================

#[tokio::test]
async fn test_update_replaces_patient() {
    let server = create_test_server();
    let id = seed_patient(&server, "MRN-1", born_years_ago(40)).await;
    let created: Value = server.get(&format!("/patients/{}", id)).await.json();

    let mut payload = patient_payload("MRN-1", born_years_ago(40));
    payload["first_name"] = json!("Augusta");

    let response = server.put(&format!("/patients/{}", id)).json(&payload).await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["first_name"], "Augusta");
    assert_eq!(body["created_at"], created["created_at"]);

    // Applying the same update again gives the same result
    let again: Value = server
        .put(&format!("/patients/{}", id))
        .json(&payload)
        .await
        .json();
    assert_eq!(again["first_name"], body["first_name"]);
    assert_eq!(again["patient_id"], body["patient_id"]);
}

#[tokio::test]
async fn test_update_unknown_returns_404() {
    let server = create_test_server();

    let response = server
        .put(&format!("/patients/{}", Uuid::new_v4()))
        .json(&patient_payload("MRN-1", born_years_ago(40)))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_json(&json!({"detail": "Patient not found"}));
}

#[tokio::test]
async fn test_delete_returns_prior_state_then_404() {
    let server = create_test_server();
    let id = seed_patient(&server, "MRN-1", born_years_ago(40)).await;

    let response = server.delete(&format!("/patients/{}", id)).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["patient_id"], id.as_str());

    server
        .get(&format!("/patients/{}", id))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .delete(&format!("/patients/{}", id))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

// =============================================================================
// Listing
// =============================================================================

#[tokio::test]
async fn test_list_pagination() {
    let server = create_test_server();
    let mut created = Vec::new();
    for i in 0..12 {
        created.push(seed_patient(&server, &format!("MRN-{}", i), born_years_ago(40)).await);
    }

    // Default page is the first ten
    let first: Value = server.get("/patients").await.json();
    assert_eq!(ids(&first), created[..10].to_vec());

    let page: Value = server
        .get("/patients")
        .add_query_param("skip", 10)
        .add_query_param("limit", 5)
        .await
        .json();
    assert_eq!(ids(&page), created[10..].to_vec());
}

#[tokio::test]
async fn test_list_limit_is_capped() {
    let config = ServerConfig {
        max_page_size: Some(2),
        default_page_size: 2,
        ..ServerConfig::for_testing()
    };
    let server = create_test_server_with_config(config);
    for i in 0..4 {
        seed_patient(&server, &format!("MRN-{}", i), born_years_ago(40)).await;
    }

    let page: Value = server
        .get("/patients")
        .add_query_param("limit", 100)
        .await
        .json();
    assert_eq!(page.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_invalid_pagination_is_400() {
    let server = create_test_server();

    server
        .get("/patients")
        .add_query_param("skip", "minus-one")
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    server
        .get("/patients")
        .add_query_param("limit", -5)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

// =============================================================================
// Search
// =============================================================================

#[tokio::test]
async fn test_search_without_filters_returns_all() {
    let server = create_test_server();
    let a = seed_patient(&server, "MRN-1", born_years_ago(20)).await;
    let b = seed_patient(&server, "MRN-2", born_years_ago(60)).await;

    let response = server.post("/patients/search").json(&json!({})).await;
    response.assert_status_ok();
    assert_eq!(ids(&response.json()), vec![a, b]);
}

#[tokio::test]
async fn test_search_by_age_and_risk_factor() {
    let server = create_test_server();
    let match_id = seed_patient(&server, "MRN-1", born_years_ago(35)).await;
    let too_old = seed_patient(&server, "MRN-2", born_years_ago(50)).await;
    let no_risk = seed_patient(&server, "MRN-3", born_years_ago(35)).await;
    add_risk_factor(&server, &match_id, "smoking").await;
    add_risk_factor(&server, &match_id, "smoking").await;
    add_risk_factor(&server, &too_old, "smoking").await;

    let response = server
        .post("/patients/search")
        .json(&json!({"age_min": 30, "age_max": 40, "risk_factors": ["smoking"]}))
        .await;
    response.assert_status_ok();
    let found = ids(&response.json());
    assert_eq!(found, vec![match_id]);
    assert!(!found.contains(&no_risk));
}

#[tokio::test]
async fn test_search_age_boundaries_are_inclusive() {
    let server = create_test_server();
    let thirty = seed_patient(&server, "MRN-30", born_years_ago(30)).await;
    let forty = seed_patient(&server, "MRN-40", born_years_ago(40)).await;
    seed_patient(&server, "MRN-41", born_years_ago(41)).await;

    let response = server
        .post("/patients/search")
        .json(&json!({"age_min": 30, "age_max": 40}))
        .await;
    assert_eq!(ids(&response.json()), vec![thirty, forty]);
}

#[tokio::test]
async fn test_search_contradictory_ages_is_empty() {
    let server = create_test_server();
    seed_patient(&server, "MRN-1", born_years_ago(35)).await;

    let response = server
        .post("/patients/search")
        .json(&json!({"age_min": 50, "age_max": 20}))
        .await;
    response.assert_status_ok();
    response.assert_json(&json!([]));
}

#[tokio::test]
async fn test_search_by_demographics() {
    let server = create_test_server();
    let id = seed_patient(&server, "MRN-1", born_years_ago(35)).await;

    let found: Value = server
        .post("/patients/search")
        .json(&json!({"gender": "female", "ethnicity": "not hispanic", "is_deceased": false}))
        .await
        .json();
    assert_eq!(ids(&found), vec![id]);

    let none: Value = server
        .post("/patients/search")
        .json(&json!({"gender": "male"}))
        .await
        .json();
    assert!(none.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_search_malformed_filter_is_422() {
    let server = create_test_server();

    server
        .post("/patients/search")
        .json(&json!({"age_min": "thirty"}))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

// =============================================================================
// Chart and Email Projection
// =============================================================================

#[tokio::test]
async fn test_email_comes_from_first_contact() {
    let server = create_test_server();
    let id = seed_patient(&server, "MRN-1", born_years_ago(35)).await;

    for email in ["first@example.com", "second@example.com"] {
        server
            .post(&format!("/patients/{}/contacts", id))
            .json(&json!({"email": email}))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let read: Value = server.get(&format!("/patients/{}", id)).await.json();
    assert_eq!(read["email"], "first@example.com");

    let listed: Value = server.get("/patients").await.json();
    assert_eq!(listed[0]["email"], "first@example.com");

    let searched: Value = server.post("/patients/search").json(&json!({})).await.json();
    assert_eq!(searched[0]["email"], "first@example.com");
}

#[tokio::test]
async fn test_chart_includes_owned_records() {
    let server = create_test_server();
    let id = seed_patient(&server, "MRN-1", born_years_ago(35)).await;
    add_risk_factor(&server, &id, "smoking").await;
    server
        .post(&format!("/patients/{}/allergies", id))
        .json(&json!({"allergen": "peanuts", "allergy_type": "food"}))
        .await
        .assert_status(StatusCode::CREATED);

    let response = server.get(&format!("/patients/{}/record", id)).await;
    response.assert_status_ok();
    let chart: Value = response.json();
    assert_eq!(chart["patient_id"], id.as_str());
    assert_eq!(chart["mrn"], "MRN-1");
    assert_eq!(chart["risk_factors"].as_array().unwrap().len(), 1);
    assert_eq!(chart["allergies"][0]["allergen"], "peanuts");
    assert!(chart["encounters"].as_array().unwrap().is_empty());

    server
        .get(&format!("/patients/{}/record", Uuid::new_v4()))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

// =============================================================================
// File-backed Database
// =============================================================================

#[tokio::test]
async fn test_patients_survive_restart_on_file_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hospital.db");

    let id = {
        let server = server_for(SqliteBackend::open(&path).unwrap());
        seed_patient(&server, "MRN-1", born_years_ago(50)).await
    };

    let server = server_for(SqliteBackend::open(&path).unwrap());
    let response = server.get(&format!("/patients/{}", id)).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["first_name"], "Ada");
}
