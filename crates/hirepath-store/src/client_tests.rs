//! Client tests against a mock store server.

use std::time::Duration;

use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hirepath_models::{AccountId, Role};

use crate::client::{RestClient, StoreConfig};
use crate::error::StoreError;
use crate::repos::AccountRepository;
use crate::retry::RetryConfig;

fn test_config(base_url: &str) -> StoreConfig {
    StoreConfig {
        base_url: base_url.to_string(),
        service_key: "test-key".to_string(),
        timeout: Duration::from_secs(5),
        connect_timeout: Duration::from_secs(2),
        retry: RetryConfig {
            max_retries: 2,
            base_delay_ms: 1,
            max_delay_ms: 5,
        },
    }
}

#[tokio::test]
async fn role_lookup_sends_key_headers_and_projection() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/accounts"))
        .and(query_param("id", "eq.u-1"))
        .and(query_param("select", "role"))
        .and(header("apikey", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "role": "admin" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = RestClient::new(test_config(&server.uri())).unwrap();
    let repo = AccountRepository::new(client);

    let role = repo.role(&AccountId::from("u-1")).await.unwrap();
    assert_eq!(role, Some(Role::Admin));
}

#[tokio::test]
async fn missing_row_is_none_not_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/accounts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let client = RestClient::new(test_config(&server.uri())).unwrap();
    let repo = AccountRepository::new(client);

    let role = repo.role(&AccountId::from("nobody")).await.unwrap();
    assert_eq!(role, None);
}

#[tokio::test]
async fn server_errors_are_retried_then_surfaced() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/accounts"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        // 1 initial attempt + 2 retries
        .expect(3)
        .mount(&server)
        .await;

    let client = RestClient::new(test_config(&server.uri())).unwrap();
    let repo = AccountRepository::new(client);

    let err = repo.role(&AccountId::from("u-1")).await.unwrap_err();
    assert!(matches!(err, StoreError::ServerError(503, _)));
}

#[tokio::test]
async fn forbidden_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/accounts"))
        .respond_with(ResponseTemplate::new(403).set_body_string("denied"))
        .expect(1)
        .mount(&server)
        .await;

    let client = RestClient::new(test_config(&server.uri())).unwrap();
    let repo = AccountRepository::new(client);

    let err = repo.role(&AccountId::from("u-1")).await.unwrap_err();
    assert!(matches!(err, StoreError::PermissionDenied(_)));
}
