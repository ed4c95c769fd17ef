//! Integration tests for WeatherClient using wiremock.
//!
//! These tests verify the WeatherClient behavior against a mock HTTP server.

use std::time::Duration;

use weatherlist_core::{LookupError, NetworkError, WriteOp};
use weatherlist_services::{WeatherClient, WeatherDraft, WeatherGateway, WeatherRecord};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to create a test record
fn test_record(id: i64, city: &str, temperature: f64, condition: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "city": city,
        "temperature": temperature,
        "condition": { "text": condition }
    })
}

fn client_for(server: &MockServer) -> WeatherClient {
    WeatherClient::new(&server.uri(), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_fetch_all_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            test_record(1, "Kyiv", 5.0, "Cloudy"),
            test_record(2, "Lviv", -1.5, "Snow"),
        ])))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let records = client.fetch_all().await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id, 1);
    assert_eq!(records[0].city, "Kyiv");
    assert_eq!(records[1].temperature, "-1.5");
    assert_eq!(records[1].condition.text, "Snow");
}

#[tokio::test]
async fn test_fetch_all_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client.fetch_all().await.unwrap_err();

    assert_eq!(
        err,
        NetworkError::ServerError {
            status: 500,
            message: "boom".to_string()
        }
    );
}

#[tokio::test]
async fn test_fetch_all_malformed_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client.fetch_all().await.unwrap_err();

    assert!(matches!(err, NetworkError::InvalidResponse(_)), "{:?}", err);
}

#[tokio::test]
async fn test_fetch_all_connection_refused() {
    // Nothing listens on the discard port
    let client = WeatherClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
    let err = client.fetch_all().await.unwrap_err();

    assert!(matches!(err, NetworkError::ConnectionFailed(_)), "{:?}", err);
}

#[tokio::test]
async fn test_fetch_by_key_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather/city/Berlin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(test_record(
            7, "Berlin", 11.0, "Sunny",
        )))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let record = client.fetch_by_key("Berlin").await.unwrap();

    assert_eq!(record.id, 7);
    assert_eq!(record.city, "Berlin");
}

#[tokio::test]
async fn test_fetch_by_key_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather/city/Berlin"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client.fetch_by_key("Berlin").await.unwrap_err();

    assert_eq!(err, LookupError::NotFound("Berlin".to_string()));
}

#[tokio::test]
async fn test_fetch_by_key_server_failure_is_not_a_miss() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather/city/Berlin"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client.fetch_by_key("Berlin").await.unwrap_err();

    assert!(!err.is_not_found());
    assert_eq!(err.user_message(), "Error searching weather data");
}

#[tokio::test]
async fn test_fetch_by_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(test_record(
            42, "Odesa", 18.0, "Clear",
        )))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let record = client.fetch_by_id(42).await.unwrap();

    assert_eq!(record.city, "Odesa");
}

#[tokio::test]
async fn test_find_by_condition() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather/citiesC/Rain"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            test_record(3, "Bergen", 8.0, "Rain"),
            test_record(5, "London", 10.0, "Rain"),
        ])))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let records = client.find_by_condition("Rain").await.unwrap();

    assert_eq!(records.iter().map(|r| r.id).collect::<Vec<_>>(), vec![3, 5]);
}

#[tokio::test]
async fn test_find_by_temperature() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather/citiesT/-1.5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            test_record(2, "Lviv", -1.5, "Snow"),
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let records = client.find_by_temperature(-1.5).await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].temperature, "-1.5");
}

#[tokio::test]
async fn test_find_by_temperature_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather/citiesT/20"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client.find_by_temperature(20.0).await.unwrap_err();

    assert_eq!(err.user_message(), "Error searching weather data");
}

#[tokio::test]
async fn test_create_sends_draft_without_id() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/weather"))
        .and(body_json(serde_json::json!({
            "city": "Kyiv",
            "temperature": "5",
            "condition": { "text": "Cloudy" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(test_record(
            100, "Kyiv", 5.0, "Cloudy",
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let created = client
        .create(&WeatherDraft::new("Kyiv", "5", "Cloudy"))
        .await
        .unwrap();

    assert_eq!(created.id, 100);
    assert_eq!(created.temperature, "5.0");
}

#[tokio::test]
async fn test_create_bulk() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/weather/bulk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            test_record(10, "Paris", 14.0, "Clear"),
            test_record(11, "Rome", 21.0, "Sunny"),
        ])))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let created = client
        .create_bulk(&[
            WeatherDraft::new("Paris", "14", "Clear"),
            WeatherDraft::new("Rome", "21", "Sunny"),
        ])
        .await
        .unwrap();

    assert_eq!(created.len(), 2);
    assert_eq!(created[1].city, "Rome");
}

#[tokio::test]
async fn test_create_failure_is_write_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad draft"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client.create(&WeatherDraft::default()).await.unwrap_err();

    assert_eq!(err.op, WriteOp::Create);
    assert_eq!(err.source.status(), Some(400));
    assert_eq!(err.user_message(), "Error adding weather");
}

#[tokio::test]
async fn test_update_puts_full_record() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/weather/3"))
        .and(body_json(serde_json::json!({
            "id": 3,
            "city": "Bergen",
            "temperature": "9",
            "condition": { "text": "Rain" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(test_record(
            3, "Bergen", 9.0, "Rain",
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let record = WeatherRecord {
        id: 3,
        city: "Bergen".to_string(),
        temperature: "9".to_string(),
        condition: weatherlist_services::Condition::new("Rain"),
    };
    let updated = client.update(&record).await.unwrap();

    // Canonical copy comes back from the server, numeric temperature included
    assert_eq!(updated.temperature, "9.0");
}

#[tokio::test]
async fn test_update_not_found_is_write_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/weather/3"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let record = WeatherRecord {
        id: 3,
        city: String::new(),
        temperature: String::new(),
        condition: Default::default(),
    };
    let err = client.update(&record).await.unwrap_err();

    assert_eq!(err.op, WriteOp::Update);
    assert_eq!(err.user_message(), "Error updating weather");
}

#[tokio::test]
async fn test_delete_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/weather/8"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    client.delete(8).await.unwrap();
}

#[tokio::test]
async fn test_delete_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/weather/8"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let err = client.delete(8).await.unwrap_err();

    assert_eq!(err.op, WriteOp::Delete);
}
