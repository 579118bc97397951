use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
};
use chrono::NaiveDate;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use wiremock::{MockServer, Mock, ResponseTemplate};
use wiremock::matchers::{method, path, query_param};

use doctor_cell::router::doctor_routes;
use doctor_cell::services::{AvailabilityService, DoctorService, PricingService};
use doctor_cell::models::SlotQuery;
use shared_utils::test_utils::{TestConfig, MockBackendResponses, TEST_AUTH_TOKEN};

#[tokio::test]
async fn test_get_slots_requests_branch_and_date() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();
    let branch_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/doctors/{}/branches/{}/slots", doctor_id, branch_id)))
        .and(query_param("date", "2026-10-20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockBackendResponses::slot_response(&Uuid::new_v4().to_string(), &branch_id.to_string(), "2026-10-20", "09:00:00"),
            MockBackendResponses::slot_response(&Uuid::new_v4().to_string(), &branch_id.to_string(), "2026-10-20", "09:30:00"),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_url(&mock_server.uri()).to_app_config();
    let service = AvailabilityService::new(&config);
    let query = SlotQuery {
        doctor_id,
        branch_id,
        date: NaiveDate::from_ymd_opt(2026, 10, 20).unwrap(),
    };

    let slots = service.get_slots(&query, TEST_AUTH_TOKEN).await.unwrap();

    assert_eq!(slots.len(), 2);
    assert!(slots.iter().all(|slot| slot.branch_id == branch_id));
}

#[tokio::test]
async fn test_get_doctor_clinic() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();
    let branch_id = Uuid::new_v4();
    let clinic_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/doctors/{}/branches/{}/clinic", doctor_id, branch_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockBackendResponses::doctor_clinic_response(
                &clinic_id.to_string(), &doctor_id.to_string(), &branch_id.to_string()),
        ))
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_url(&mock_server.uri()).to_app_config();
    let clinic = DoctorService::new(&config)
        .get_doctor_clinic(doctor_id, branch_id, TEST_AUTH_TOKEN)
        .await
        .unwrap();

    assert_eq!(clinic.id, clinic_id);
    assert_eq!(clinic.branch_id, branch_id);
}

#[tokio::test]
async fn test_filter_options_combine_both_lists() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/filters/specializations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["Cardiology", "Dermatology"])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/filters/languages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["English", "Tamil"])))
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_url(&mock_server.uri()).to_app_config();
    let filters = DoctorService::new(&config)
        .get_filter_options(TEST_AUTH_TOKEN)
        .await
        .unwrap();

    assert_eq!(filters.specializations, vec!["Cardiology", "Dermatology"]);
    assert_eq!(filters.languages, vec!["English", "Tamil"]);
}

#[tokio::test]
async fn test_quote_totals_cost_breakdown() {
    let mock_server = MockServer::start().await;
    let doctor_clinic_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/doctor-clinics/{}/cost", doctor_clinic_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockBackendResponses::cost_breakdown_response()
        ))
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_url(&mock_server.uri()).to_app_config();
    let quote = PricingService::new(&config)
        .quote(doctor_clinic_id, TEST_AUTH_TOKEN)
        .await
        .unwrap();

    assert_eq!(quote.total, 649.0);
    assert_eq!(quote.breakdown.platform_fee, 50.0);
}

#[tokio::test]
async fn test_get_doctor_route_returns_doctor() {
    let mock_server = MockServer::start().await;
    let doctor_id = Uuid::new_v4();
    let branch_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/doctors/{}", doctor_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockBackendResponses::doctor_response(&doctor_id.to_string(), &[&branch_id.to_string()])
        ))
        .mount(&mock_server)
        .await;

    let app = doctor_routes(TestConfig::with_url(&mock_server.uri()).to_arc());
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/{}", doctor_id))
                .header("Authorization", format!("Bearer {}", TEST_AUTH_TOKEN))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let doctor: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(doctor["branches"][0]["id"], branch_id.to_string());
}

#[tokio::test]
async fn test_missing_clinic_returns_not_found() {
    let mock_server = MockServer::start().await;
    let branch_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path(format!("/clinics/{}", branch_id)))
        .respond_with(ResponseTemplate::new(404).set_body_string("missing"))
        .mount(&mock_server)
        .await;

    let app = doctor_routes(TestConfig::with_url(&mock_server.uri()).to_arc());
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/clinics/{}", branch_id))
                .header("Authorization", format!("Bearer {}", TEST_AUTH_TOKEN))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
