//! Integration tests for the relay, run against a real listener

use serde_json::{Value, json};
use tokio::net::TcpListener;
use weather_relay::{RelayConfig, web};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Start the relay on an ephemeral port against the given mock upstream
async fn spawn_relay(upstream: &MockServer) -> String {
    let mut config = RelayConfig::default();
    config.upstream.geocoding_base_url = format!("{}/geocoding/v1", upstream.uri());
    config.upstream.forecast_base_url = format!("{}/forecast/v1", upstream.uri());

    let app = web::build_app(&config).expect("Failed to build app");
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Listener has no address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Relay server failed");
    });

    format!("http://{addr}")
}

async fn mount_paris(upstream: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/geocoding/v1/search"))
        .and(query_param("name", "Paris"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{ "name": "Paris", "latitude": 48.8566, "longitude": 2.3522, "country": "France" }]
        })))
        .mount(upstream)
        .await;

    Mock::given(method("GET"))
        .and(path("/forecast/v1/forecast"))
        .and(query_param("latitude", "48.8566"))
        .and(query_param("longitude", "2.3522"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "timezone": "Europe/Paris",
            "current": { "temperature_2m": 16.3, "weather_code": 2 },
            "hourly": { "temperature_2m": [15.0, 16.3] },
            "daily": { "temperature_2m_max": [18.2], "temperature_2m_min": [9.9] }
        })))
        .mount(upstream)
        .await;
}

/// Paris resolves and the combined endpoint carries the forecast
#[tokio::test]
async fn test_paris_end_to_end() {
    let upstream = MockServer::start().await;
    mount_paris(&upstream).await;
    let base = spawn_relay(&upstream).await;
    let client = reqwest::Client::new();

    let geocode: Value = client
        .get(format!("{base}/api/geocode?city=Paris"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(geocode["latitude"], 48.8566);
    assert_eq!(geocode["longitude"], 2.3522);

    let combined: Value = client
        .get(format!("{base}/api/weather/city?city=Paris"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(combined["city"], "Paris");
    assert_eq!(combined["country"], "France");
    assert_eq!(combined["weather"]["current"]["temperature_2m"], 16.3);
}

/// Root route answers without touching the upstream
#[tokio::test]
async fn test_root_route() {
    let upstream = MockServer::start().await;
    let base = spawn_relay(&upstream).await;

    let response = reqwest::get(format!("{base}/")).await.unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "message": "Weather API Backend" }));
    assert!(upstream.received_requests().await.unwrap().is_empty());
}

/// An unreachable geocoder surfaces as a 500 with a detail message
#[tokio::test]
async fn test_unreachable_upstream_is_500() {
    let upstream = MockServer::start().await;
    let mut config = RelayConfig::default();
    config.upstream.geocoding_base_url = "http://127.0.0.1:1".to_string();
    config.upstream.forecast_base_url = format!("{}/forecast/v1", upstream.uri());

    let app = web::build_app(&config).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let response = reqwest::get(format!("http://{addr}/api/weather/city?city=Paris"))
        .await
        .unwrap();
    assert_eq!(response.status(), 500);
    let body: Value = response.json().await.unwrap();
    assert!(
        body["detail"]
            .as_str()
            .unwrap()
            .starts_with("Error fetching geocode data:")
    );
    assert!(upstream.received_requests().await.unwrap().is_empty());
}

/// Browsers get credentialed CORS headers for their own origin
#[tokio::test]
async fn test_cors_headers_on_real_listener() {
    let upstream = MockServer::start().await;
    mount_paris(&upstream).await;
    let base = spawn_relay(&upstream).await;

    let response = reqwest::Client::new()
        .get(format!("{base}/api/weather?latitude=48.8566&longitude=2.3522"))
        .header("Origin", "http://localhost:5173")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://localhost:5173"
    );
    assert_eq!(response.headers()["access-control-allow-credentials"], "true");
}
