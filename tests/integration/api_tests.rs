//! API integration tests

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Request, StatusCode},
    Router,
};
use chrono::NaiveDate;
use serde_json::Value;
use tower::ServiceExt;

use barbershop_booking::{
    api,
    clock::FixedClock,
    config::{AppConfig, StaticBarber, StaticService},
    models::BusinessCalendar,
    repository::MemoryBookingStore,
    services::Services,
    AppState,
};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Router over an in-memory store, with "now" frozen at Sunday 2023-12-31 12:00 UTC
fn app() -> Router {
    let mut config = AppConfig::default();
    config.catalog.barbers = vec![
        StaticBarber { id: "a".into(), name: "Alex".into() },
        StaticBarber { id: "b".into(), name: "Blake".into() },
    ];
    config.catalog.services = vec![StaticService {
        id: "cut".into(),
        name: "Haircut".into(),
        price_cents: 2500,
        duration_minutes: 30,
    }];

    let now = NaiveDate::from_ymd_opt(2023, 12, 31)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
        .and_utc();

    let services = Services::new(
        Arc::new(MemoryBookingStore::new()),
        &config.catalog,
        &config.storage,
        BusinessCalendar::from_config(&config.calendar).unwrap(),
        Arc::new(FixedClock(now)),
    )
    .unwrap();

    api::create_router(AppState {
        config: Arc::new(config),
        services: Arc::new(services),
    })
}

fn form(barber: &str, hour: &str, first_name: &str, phone: &str) -> String {
    format!(
        "barber={barber}&service=cut&dateString=2024-01-01&hour={hour}\
         &firstName={first_name}&lastName=Lovelace&email=ada%40example.com&phone={phone}"
    )
}

async fn post_booking(app: &Router, body: String) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/booking")
        .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_booking_options() {
    let (status, body) = get(&app(), "/api/v1/booking").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["barbers"][0]["name"], "Alex");
    assert_eq!(body["services"][0]["name"], "Haircut");
    assert_eq!(body["services"][0]["price"], 25.0);
}

#[tokio::test]
async fn test_create_booking_then_conflict_then_adjacent() {
    let app = app();

    let (status, body) = post_booking(&app, form("Alex", "10:00", "Ada", "123456789")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["barberId"], "a");
    assert_eq!(body["data"]["startTime"], "10:00");
    assert_eq!(body["data"]["endTime"], "10:30");
    assert_eq!(body["data"]["status"], "confirmed");

    let (status, body) = post_booking(&app, form("Alex", "10:15", "Ada", "123456789")).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["errors"]["slot"], "no longer available");
    let offered: Vec<&str> = body["availableSlots"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert!(offered.contains(&"10:30"));
    assert!(!offered.contains(&"10:00"));

    let (status, _) = post_booking(&app, form("Alex", "10:30", "Ada", "123456789")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_validation_errors_reported_together() {
    let (status, body) = post_booking(&app(), form("Alex", "10:00", "", "12345")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["errors"]["firstName"], "First name is required");
    assert_eq!(body["errors"]["phone"], "Invalid phone number");
}

#[tokio::test]
async fn test_unknown_barber_is_not_found() {
    let (status, body) = post_booking(&app(), form("Jane", "10:00", "Ada", "123456789")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["errors"]["barber"], "Barber not found");
}

#[tokio::test]
async fn test_availability_endpoint() {
    let app = app();

    let uri = "/api/v1/booking/availability?barber=Alex&date=2024-01-01";
    let (status, body) = get(&app, uri).await;
    assert_eq!(status, StatusCode::OK);
    let slots = body["slots"].as_array().unwrap();
    assert_eq!(slots.first().unwrap(), "09:00");
    assert_eq!(slots.last().unwrap(), "16:30");

    post_booking(&app, form("Alex", "09:00", "Ada", "123456789")).await;
    let uri = "/api/v1/booking/availability?barber=a&date=2024-01-01&service=cut";
    let (_, body) = get(&app, uri).await;
    assert_eq!(body["slots"][0], "09:30");

    // Sunday
    let (status, body) = get(&app, "/api/v1/booking/availability?barber=a&date=2024-01-07").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["slots"].as_array().unwrap().len(), 0);

    let (status, _) = get(&app, "/api/v1/booking/availability?barber=a&date=tomorrow").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_non_form_post_gets_json_error() {
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/booking")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"barber":"Alex"}"#))
        .unwrap();
    let (status, body) = send(&app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], 2);
    assert!(body["message"].as_str().unwrap().contains("Content-Type"));
}

#[tokio::test]
async fn test_availability_without_barber_gets_json_error() {
    let (status, body) = get(&app(), "/api/v1/booking/availability?date=2024-01-01").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("barber"));
}

#[tokio::test]
async fn test_ready() {
    let (status, body) = get(&app(), "/api/v1/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

// Smoke tests against a running server

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_live_booking_options() {
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/booking", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["barbers"].is_array());
    assert!(body["services"].is_array());
}

#[tokio::test]
#[ignore]
async fn test_live_invalid_booking() {
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/booking", BASE_URL))
        .header("Content-Type", "application/x-www-form-urlencoded")
        .body("phone=12345")
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 400);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["success"], false);
    assert!(body["errors"]["phone"].is_string());
}
