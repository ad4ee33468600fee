//! OpenWeather provider against a mock HTTP server.

use weather_core::{FetchError, OpenWeatherConfig, OpenWeatherProvider, WeatherProvider};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

fn current_weather_body() -> serde_json::Value {
    serde_json::json!({
        "coord": { "lon": 77.2167, "lat": 28.6667 },
        "weather": [
            { "id": 800, "main": "Clear", "description": "clear sky", "icon": "01d" }
        ],
        "base": "stations",
        "main": {
            "temp": 308.15,
            "feels_like": 310.15,
            "temp_min": 307.0,
            "temp_max": 309.0,
            "pressure": 1008,
            "humidity": 30
        },
        "dt": 1700000000,
        "name": "Delhi",
        "cod": 200
    })
}

fn test_provider(server: &MockServer) -> OpenWeatherProvider {
    let config = OpenWeatherConfig { base_url: server.uri(), timeout_secs: 5 };
    #[allow(clippy::expect_used)]
    OpenWeatherProvider::new("TEST_KEY".to_string(), config).expect("Failed to create provider")
}

#[tokio::test]
async fn fetch_success_converts_kelvin() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", "Delhi"))
        .and(query_param("appid", "TEST_KEY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_weather_body()))
        .expect(1)
        .mount(&server)
        .await;

    let sample = test_provider(&server)
        .fetch("Delhi")
        .await
        .expect("fetch should succeed")
        .expect("200 response should yield a sample");

    assert_eq!(sample.city, "Delhi");
    assert!((sample.temperature_c - 35.0).abs() < 1e-9);
    assert!((sample.feels_like_c - 37.0).abs() < 1e-9);
    assert_eq!(sample.condition, "Clear");
    assert_eq!(sample.observed_at, 1_700_000_000);
}

#[tokio::test]
async fn city_is_passed_through_verbatim() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", "new york"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_weather_body()))
        .mount(&server)
        .await;

    let sample = test_provider(&server).fetch("new york").await.unwrap().unwrap();
    assert_eq!(sample.city, "new york");
}

#[tokio::test]
async fn not_found_returns_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(serde_json::json!({ "cod": "404", "message": "city not found" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = test_provider(&server).fetch("Atlantis").await;
    assert!(matches!(result, Ok(None)));
}

#[tokio::test]
async fn unauthorized_returns_none() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Invalid API key"))
        .mount(&server)
        .await;

    let result = test_provider(&server).fetch("Delhi").await;
    assert!(matches!(result, Ok(None)));
}

#[tokio::test]
async fn malformed_json_is_payload_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = test_provider(&server).fetch("Delhi").await.unwrap_err();
    assert!(matches!(err, FetchError::Payload { .. }));
}

#[tokio::test]
async fn missing_temperature_is_payload_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "dt": 1700000000,
            "weather": [ { "main": "Clear" } ],
            "main": { "feels_like": 300.0 }
        })))
        .mount(&server)
        .await;

    let err = test_provider(&server).fetch("Delhi").await.unwrap_err();
    assert!(matches!(err, FetchError::Payload { .. }));
}

#[tokio::test]
async fn slow_server_hits_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(current_weather_body())
                .set_delay(std::time::Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = OpenWeatherConfig { base_url: server.uri(), timeout_secs: 1 };
    let provider = OpenWeatherProvider::new("TEST_KEY".into(), config).unwrap();

    let err = provider.fetch("Delhi").await.unwrap_err();
    assert!(matches!(err, FetchError::Transport { .. }));
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
    let config = OpenWeatherConfig { base_url: "http://127.0.0.1:1".into(), timeout_secs: 2 };
    let provider = OpenWeatherProvider::new("TEST_KEY".into(), config).unwrap();

    let err = provider.fetch("Delhi").await.unwrap_err();
    assert!(matches!(err, FetchError::Transport { .. }));
}
