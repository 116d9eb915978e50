//! Related record, reference data and operational endpoint tests.

use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use hospital_persistence::backends::sqlite::SqliteBackend;
use hospital_rest::{AppState, ServerConfig, create_app_with_config};
use serde_json::{Value, json};
use uuid::Uuid;

fn create_test_server() -> TestServer {
    let backend = SqliteBackend::in_memory().expect("Failed to create SQLite backend");
    backend.init_schema().expect("Failed to init schema");

    let state = AppState::new(Arc::new(backend), ServerConfig::for_testing());
    let app = hospital_rest::routing::create_routes(state);
    TestServer::new(app).expect("Failed to create test server")
}

async fn seed_patient(server: &TestServer, mrn: &str) -> String {
    let response = server
        .post("/patients")
        .json(&json!({
            "mrn": mrn,
            "first_name": "Alan",
            "last_name": "Turing",
            "date_of_birth": "1954-06-07",
            "gender": "male",
            "biological_sex": "male"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["patient_id"]
        .as_str()
        .unwrap()
        .to_string()
}

async fn seed_icd_code(server: &TestServer, code: &str) -> String {
    let response = server
        .post("/icd-codes")
        .json(&json!({
            "code": code,
            "description": "Type 2 diabetes mellitus without complications",
            "icd_version": "10"
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["icd_code_id"]
        .as_str()
        .unwrap()
        .to_string()
}

// =============================================================================
// Patient-owned Records
// =============================================================================

#[tokio::test]
async fn test_owned_record_crud() {
    let server = create_test_server();
    let patient_id = seed_patient(&server, "MRN-1").await;
    let collection = format!("/patients/{}/allergies", patient_id);

    let response = server
        .post(&collection)
        .json(&json!({"allergen": "penicillin", "allergy_type": "drug", "severity": "severe"}))
        .await;
    response.assert_status(StatusCode::CREATED);
    let created: Value = response.json();
    let id = created["allergy_id"].as_str().unwrap().to_string();
    assert_eq!(created["patient_id"], patient_id.as_str());
    assert_eq!(created["is_active"], true);
    assert_eq!(
        response.header("location").to_str().unwrap(),
        format!("http://localhost:8080{}/{}", collection, id)
    );

    let listed: Value = server.get(&collection).await.json();
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let item = format!("{}/{}", collection, id);
    server.get(&item).await.assert_json(&created);

    let updated: Value = server
        .put(&item)
        .json(&json!({"allergen": "penicillin", "allergy_type": "drug", "is_active": false}))
        .await
        .json();
    assert_eq!(updated["is_active"], false);
    assert_eq!(updated["severity"], Value::Null);

    server.delete(&item).await.assert_status_ok();
    server.get(&item).await.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_owned_record_unknown_patient_is_404() {
    let server = create_test_server();
    let collection = format!("/patients/{}/encounters", Uuid::new_v4());

    let response = server.get(&collection).await;
    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_json(&json!({"detail": "Patient not found"}));

    server
        .post(&collection)
        .json(&json!({"encounter_type": "outpatient"}))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_owned_record_via_other_patient_is_404() {
    let server = create_test_server();
    let owner = seed_patient(&server, "MRN-1").await;
    let other = seed_patient(&server, "MRN-2").await;

    let created: Value = server
        .post(&format!("/patients/{}/addresses", owner))
        .json(&json!({
            "address_type": "home",
            "street_line1": "43 Adlington Road",
            "city": "Wilmslow",
            "country": "UK"
        }))
        .await
        .json();
    let id = created["address_id"].as_str().unwrap();

    let response = server
        .get(&format!("/patients/{}/addresses/{}", other, id))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_json(&json!({"detail": "Address not found"}));
}

#[tokio::test]
async fn test_encounter_date_defaults_to_now() {
    let server = create_test_server();
    let patient_id = seed_patient(&server, "MRN-1").await;

    let response = server
        .post(&format!("/patients/{}/encounters", patient_id))
        .json(&json!({"encounter_type": "emergency", "chief_complaint": "chest pain"}))
        .await;
    response.assert_status(StatusCode::CREATED);
    let encounter: Value = response.json();
    assert!(encounter["encounter_date"].is_string());
}

#[tokio::test]
async fn test_owned_record_malformed_payload_is_422() {
    let server = create_test_server();
    let patient_id = seed_patient(&server, "MRN-1").await;

    server
        .post(&format!("/patients/{}/immunizations", patient_id))
        .json(&json!({"vaccine_name": "MMR", "administration_date": "not a date"}))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_deleting_patient_removes_owned_records() {
    let server = create_test_server();
    let patient_id = seed_patient(&server, "MRN-1").await;
    let icd_id = seed_icd_code(&server, "E11.9").await;

    server
        .post(&format!("/patients/{}/diagnoses", patient_id))
        .json(&json!({"icd_code_id": icd_id, "diagnosis_type": "primary", "diagnosis_status": "active"}))
        .await
        .assert_status(StatusCode::CREATED);

    server
        .delete(&format!("/patients/{}", patient_id))
        .await
        .assert_status_ok();

    let found: Value = server
        .post("/patients/search")
        .json(&json!({"diagnoses": ["E11.9"]}))
        .await
        .json();
    assert!(found.as_array().unwrap().is_empty());

    // Reference data outlives the patient
    server
        .get(&format!("/icd-codes/{}", icd_id))
        .await
        .assert_status_ok();
}

// =============================================================================
// Reference Data and Diagnosis Search
// =============================================================================

#[tokio::test]
async fn test_reference_data_crud() {
    let server = create_test_server();

    let response = server
        .post("/medications")
        .json(&json!({"ndc_code": "0002-8215", "name": "Insulin lispro"}))
        .await;
    response.assert_status(StatusCode::CREATED);
    let medication: Value = response.json();
    let id = medication["medication_id"].as_str().unwrap();

    let listed: Value = server.get("/medications").await.json();
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let updated: Value = server
        .put(&format!("/medications/{}", id))
        .json(&json!({"ndc_code": "0002-8215", "name": "Humalog"}))
        .await
        .json();
    assert_eq!(updated["name"], "Humalog");

    server
        .delete(&format!("/medications/{}", id))
        .await
        .assert_status_ok();
    let response = server.get(&format!("/medications/{}", id)).await;
    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_json(&json!({"detail": "Medication not found"}));
}

#[tokio::test]
async fn test_search_by_diagnosis_returns_patient_once() {
    let server = create_test_server();
    let diabetic = seed_patient(&server, "MRN-1").await;
    let other = seed_patient(&server, "MRN-2").await;
    let e119 = seed_icd_code(&server, "E11.9").await;
    let j45 = seed_icd_code(&server, "J45").await;

    for (patient, icd) in [(&diabetic, &e119), (&diabetic, &e119), (&other, &j45)] {
        server
            .post(&format!("/patients/{}/diagnoses", patient))
            .json(&json!({"icd_code_id": icd, "diagnosis_type": "primary", "diagnosis_status": "active"}))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let found: Value = server
        .post("/patients/search")
        .json(&json!({"diagnoses": ["E11.9"]}))
        .await
        .json();
    let found = found.as_array().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["patient_id"], diabetic.as_str());
}

#[tokio::test]
async fn test_cohort_membership() {
    let server = create_test_server();
    let patient_id = seed_patient(&server, "MRN-1").await;

    let cohort: Value = server
        .post("/cohorts")
        .json(&json!({"name": "Diabetes registry"}))
        .await
        .json();

    let response = server
        .post(&format!("/patients/{}/cohorts", patient_id))
        .json(&json!({"cohort_id": cohort["cohort_id"]}))
        .await;
    response.assert_status(StatusCode::CREATED);
    let membership: Value = response.json();
    assert_eq!(membership["cohort_id"], cohort["cohort_id"]);
    assert_eq!(membership["is_active"], true);
}

// =============================================================================
// Operational Endpoints
// =============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let server = create_test_server();

    let health: Value = server.get("/health").await.json();
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["backend"], "sqlite");

    server.get("/_liveness").await.assert_status_ok();

    let readiness = server.get("/_readiness").await;
    readiness.assert_status_ok();
    assert_eq!(readiness.json::<Value>()["checks"]["storage"], "ok");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let backend = SqliteBackend::in_memory().unwrap();
    backend.init_schema().unwrap();
    let config = ServerConfig {
        enable_request_id: true,
        ..ServerConfig::for_testing()
    };
    let server = TestServer::new(create_app_with_config(backend, config)).unwrap();

    let response = server.get("/_liveness").await;
    let request_id = response.header("x-request-id");
    assert!(Uuid::parse_str(request_id.to_str().unwrap()).is_ok());
}

#[tokio::test]
async fn test_oversized_body_is_413() {
    let backend = SqliteBackend::in_memory().unwrap();
    backend.init_schema().unwrap();
    let config = ServerConfig {
        max_body_size: 64,
        ..ServerConfig::for_testing()
    };
    let server = TestServer::new(create_app_with_config(backend, config)).unwrap();

    let response = server
        .post("/patients/search")
        .json(&json!({"risk_factors": vec!["smoking"; 50]}))
        .await;
    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
}
