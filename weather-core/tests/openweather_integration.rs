//! Integration tests for OpenWeatherProvider using wiremock.

use std::sync::Arc;

use weather_core::{
    Coordinate, CoordinateController, MapViewport, OpenWeatherProvider, Outcome, RequestState,
    WeatherError, WeatherIcon, WeatherProvider,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY: &str = "TEST_KEY";

fn current_body() -> serde_json::Value {
    serde_json::json!({
        "cod": 200,
        "name": "Pokhara",
        "main": { "temp": 21.6, "humidity": 64 },
        "weather": [{ "description": "scattered clouds" }],
        "wind": { "speed": 2.57 }
    })
}

/// 40 three-hourly samples starting at 2023-11-14T00:00:00Z.
fn forecast_body() -> serde_json::Value {
    let list: Vec<serde_json::Value> = (0..40)
        .map(|i| {
            serde_json::json!({
                "dt": 1_699_920_000 + i * 3 * 3600,
                "main": { "temp": i as f64 + 0.4, "humidity": 50 },
                "weather": [{ "description": if i % 2 == 0 { "clear sky" } else { "light rain" } }]
            })
        })
        .collect();

    serde_json::json!({
        "cod": "200",
        "message": 0,
        "cnt": 40,
        "city": { "name": "Pokhara", "timezone": 20700 },
        "list": list
    })
}

fn provider(server: &MockServer) -> OpenWeatherProvider {
    OpenWeatherProvider::new(KEY.to_string()).with_base_url(server.uri())
}

fn coord(lat: f64, lon: f64) -> Coordinate {
    Coordinate::new(lat, lon).expect("valid coordinate")
}

async fn mount_endpoint(server: &MockServer, endpoint: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(endpoint))
        .and(query_param("appid", KEY))
        .and(query_param("units", "metric"))
        .respond_with(response)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_fetch_all_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", "28.3974"))
        .and(query_param("lon", "84.1258"))
        .and(query_param("appid", KEY))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .and(query_param("lat", "28.3974"))
        .and(query_param("lon", "84.1258"))
        .and(query_param("appid", KEY))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .expect(1)
        .mount(&server)
        .await;

    let report = provider(&server).fetch_all(coord(28.3974, 84.1258)).await.unwrap();

    assert_eq!(report.coordinate, coord(28.3974, 84.1258));
    assert_eq!(report.current.location_name, "Pokhara");
    assert_eq!(report.current.temperature_c, 21.6);
    assert_eq!(report.current.rounded_temperature(), 22);
    assert_eq!(report.current.description, "scattered clouds");
    assert_eq!(report.current.icon(), WeatherIcon::Cloudy);
    assert_eq!(report.current.wind_speed, 2.57);
    assert_eq!(report.current.humidity_percent, 64);

    assert_eq!(report.forecast.entries.len(), 40);
    assert_eq!(report.forecast.utc_offset_seconds, 20700);

    let strip = report.forecast.daily_strip();
    let picked: Vec<i64> = strip.iter().map(|e| e.rounded_temperature()).collect();
    assert_eq!(picked, vec![0, 8, 16, 24, 32]);
    assert!(strip.iter().all(|e| e.icon() == WeatherIcon::Clear));
    assert_eq!(strip[0].weekday_label(report.forecast.utc_offset_seconds), "Tue");
}

#[tokio::test]
async fn test_fetch_all_fails_on_current_error_code() {
    let server = MockServer::start().await;

    mount_endpoint(
        &server,
        "/data/2.5/weather",
        ResponseTemplate::new(200)
            .set_body_json(serde_json::json!({ "cod": 401, "message": "Invalid API key" })),
    )
    .await;
    mount_endpoint(
        &server,
        "/data/2.5/forecast",
        ResponseTemplate::new(200).set_body_json(forecast_body()),
    )
    .await;

    let err = provider(&server).fetch_all(coord(10.0, 20.0)).await.unwrap_err();

    assert!(matches!(err, WeatherError::FetchFailed(_)));
    assert!(err.to_string().contains("401"));
}

#[tokio::test]
async fn test_fetch_all_fails_on_forecast_error_code() {
    let server = MockServer::start().await;

    mount_endpoint(
        &server,
        "/data/2.5/weather",
        ResponseTemplate::new(200).set_body_json(current_body()),
    )
    .await;
    mount_endpoint(
        &server,
        "/data/2.5/forecast",
        ResponseTemplate::new(200)
            .set_body_json(serde_json::json!({ "cod": "404", "message": "city not found" })),
    )
    .await;

    let err = provider(&server).fetch_all(coord(10.0, 20.0)).await.unwrap_err();
    assert!(matches!(err, WeatherError::FetchFailed(_)));
}

#[tokio::test]
async fn test_fetch_all_fails_on_http_error() {
    let server = MockServer::start().await;

    mount_endpoint(
        &server,
        "/data/2.5/weather",
        ResponseTemplate::new(200).set_body_json(current_body()),
    )
    .await;
    mount_endpoint(
        &server,
        "/data/2.5/forecast",
        ResponseTemplate::new(500).set_body_string("upstream exploded"),
    )
    .await;

    let err = provider(&server).fetch_all(coord(10.0, 20.0)).await.unwrap_err();
    assert!(matches!(err, WeatherError::FetchFailed(_)));
}

#[tokio::test]
async fn test_fetch_all_fails_on_malformed_json() {
    let server = MockServer::start().await;

    mount_endpoint(
        &server,
        "/data/2.5/weather",
        ResponseTemplate::new(200).set_body_string("{ not json"),
    )
    .await;
    mount_endpoint(
        &server,
        "/data/2.5/forecast",
        ResponseTemplate::new(200).set_body_json(forecast_body()),
    )
    .await;

    let err = provider(&server).fetch_all(coord(10.0, 20.0)).await.unwrap_err();
    assert!(matches!(err, WeatherError::FetchFailed(_)));
}

#[tokio::test]
async fn test_search_success() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .and(query_param("q", "Paris"))
        .and(query_param("limit", "1"))
        .and(query_param("appid", KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "name": "Paris", "lat": 48.86, "lon": 2.35, "country": "FR" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let found = provider(&server).search("Paris").await.unwrap();
    assert_eq!(found, coord(48.86, 2.35));
}

#[tokio::test]
async fn test_search_empty_result_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let err = provider(&server).search("zzz-nonexistent").await.unwrap_err();
    assert!(matches!(err, WeatherError::SearchNotFound(_)));

    let err = provider(&server).search("").await.unwrap_err();
    assert!(matches!(err, WeatherError::SearchNotFound(_)));
}

#[tokio::test]
async fn test_search_server_error_is_search_failed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/geo/1.0/direct"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = provider(&server).search("Paris").await.unwrap_err();
    assert!(matches!(err, WeatherError::SearchFailed(_)));
}

#[tokio::test]
async fn test_controller_click_hits_each_endpoint_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", "10"))
        .and(query_param("lon", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/forecast"))
        .and(query_param("lat", "10"))
        .and(query_param("lon", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body()))
        .expect(1)
        .mount(&server)
        .await;

    let controller = CoordinateController::new(
        Arc::new(provider(&server)),
        MapViewport::new(coord(0.0, 0.0), 6),
        13,
    );

    assert_eq!(controller.map_click(coord(10.0, 20.0)).await, Outcome::Applied);

    let state = controller.snapshot();
    assert_eq!(state.request, RequestState::Success);
    assert_eq!(state.viewport.zoom, 6);
    assert_eq!(state.report.map(|r| r.current.location_name), Some("Pokhara".to_string()));
}
