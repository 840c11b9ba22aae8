//! Row store client against a mock HTTP endpoint

use crate::common::*;
use crate::{assert_err, assert_ok};
use s3tracker::shared::{Mutation, SyncError};
use s3tracker::tracker::{HttpRowClient, RemoteRowStore};
use serde_json::json;
use wiremock::matchers::{body_json, header, method};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_fetch_all_parses_every_sheet() {
    let server = start_row_store(tracker_payload()).await;
    let client = assert_ok!(HttpRowClient::new(&config_for(&server)));

    let snapshot = assert_ok!(client.fetch_all().await);
    assert_eq!(snapshot.sheet_names().count(), 3);
    assert_eq!(snapshot.sheet("Daily_Plan").map(<[_]>::len), Some(5));
    let item = snapshot.item("Math_Tracker", 0).unwrap();
    assert!(item.done);
    assert_eq!(item.text("Topic"), Some("Limits"));
}

#[tokio::test]
async fn test_fetch_all_http_failure_is_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let client = HttpRowClient::new(&config_for(&server)).unwrap();

    assert_err!(client.fetch_all().await, SyncError::NetworkError { .. });
}

#[tokio::test]
async fn test_fetch_all_malformed_body_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>Sign in</html>"))
        .mount(&server)
        .await;
    let client = HttpRowClient::new(&config_for(&server)).unwrap();
    assert_err!(client.fetch_all().await, SyncError::ParseError { .. });

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Daily_Plan": "oops" })))
        .mount(&server)
        .await;
    let client = HttpRowClient::new(&config_for(&server)).unwrap();
    assert_err!(client.fetch_all().await, SyncError::ParseError { .. });
}

#[tokio::test]
async fn test_write_one_posts_plain_text_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(header("content-type", "text/plain;charset=utf-8"))
        .and(body_json(json!({
            "action": "toggleCheckbox",
            "sheetName": "Daily_Plan",
            "rowIndex": 3,
            "value": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "success" })))
        .expect(1)
        .mount(&server)
        .await;
    let client = HttpRowClient::new(&config_for(&server)).unwrap();

    assert_ok!(client.write_one(&Mutation::toggle("Daily_Plan", 3, true)).await);
}

#[tokio::test]
async fn test_write_one_accepts_bare_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    let client = HttpRowClient::new(&config_for(&server)).unwrap();

    assert_ok!(client.write_one(&Mutation::add("Math_Tracker", 2, "Series")).await);
}

#[tokio::test]
async fn test_write_one_failures() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "error" })))
        .mount(&server)
        .await;
    let client = HttpRowClient::new(&config_for(&server)).unwrap();
    assert_err!(
        client.write_one(&Mutation::delete("Math_Tracker", 1)).await,
        SyncError::Rejected { .. }
    );

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;
    let client = HttpRowClient::new(&config_for(&server)).unwrap();
    assert_err!(
        client.write_one(&Mutation::delete("Math_Tracker", 1)).await,
        SyncError::NetworkError { .. }
    );
}
