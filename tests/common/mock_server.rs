//! Mock HTTP row store helpers
//!
//! Wraps `wiremock` to stand in for the spreadsheet web app.

use s3tracker::shared::AppConfig;
use s3tracker::tracker::Config;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Start a row store that serves `payload` and accepts every write
pub async fn start_row_store(payload: Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(payload))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "success" })))
        .mount(&server)
        .await;
    server
}

/// Client configuration pointing at a mock server
pub fn config_for(server: &MockServer) -> Config {
    Config::with_builder(
        AppConfig::builder()
            .endpoint_url(server.uri())
            .request_timeout(Duration::from_secs(5)),
    )
    .expect("mock server URI is a valid endpoint")
}
