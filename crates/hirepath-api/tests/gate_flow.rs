//! End-to-end gate behavior over the assembled router.
//!
//! The auth and store backends are stubbed with wiremock; the JWKS
//! endpoint serves an empty key set so no token can verify, which is
//! exactly the signed-out case the redirect flow has to handle.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hirepath_api::auth::{StoreRoles, VerifierSessions};
use hirepath_api::{create_router, ApiConfig, AppState};
use hirepath_auth::{
    AuthClient, AuthClientConfig, JwtVerifier, VerifierConfig, DEFAULT_SESSION_COOKIE,
};
use hirepath_gate::{Gate, RoutePolicy};
use hirepath_store::{
    AccountRepository, ApplicationRepository, JobRepository, RestClient, RetryConfig, StoreConfig,
};

struct TestApp {
    app: Router,
    store: MockServer,
    // Held so the JWKS endpoint stays up for lazy re-fetches.
    _auth: MockServer,
}

async fn spawn_app() -> TestApp {
    let auth = MockServer::start().await;
    let store = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/.well-known/jwks.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "keys": [] })))
        .mount(&auth)
        .await;

    let verifier = Arc::new(
        JwtVerifier::new(VerifierConfig {
            auth_url: auth.uri(),
            audience: "authenticated".to_string(),
            http_timeout: Duration::from_secs(2),
        })
        .await
        .expect("verifier construction"),
    );

    let auth_client = Arc::new(
        AuthClient::new(AuthClientConfig {
            base_url: auth.uri(),
            api_key: "test-key".to_string(),
            timeout: Duration::from_secs(2),
        })
        .expect("auth client construction"),
    );

    let rest = RestClient::new(StoreConfig {
        base_url: store.uri(),
        service_key: "service-key".to_string(),
        timeout: Duration::from_secs(2),
        connect_timeout: Duration::from_secs(1),
        retry: RetryConfig {
            max_retries: 0,
            base_delay_ms: 1,
            max_delay_ms: 1,
        },
    })
    .expect("store client construction");

    let accounts = AccountRepository::new(rest.clone());
    let jobs = JobRepository::new(rest.clone());
    let applications = ApplicationRepository::new(rest);

    let config = ApiConfig::default();
    let gate = Gate::new(
        RoutePolicy::default(),
        Arc::new(VerifierSessions(Arc::clone(&verifier))),
        Arc::new(StoreRoles(accounts.clone())),
    )
    .with_lookup_timeout(Duration::from_secs(1));

    let state = AppState {
        config,
        accounts,
        jobs,
        applications,
        auth: auth_client,
        verifier,
        gate,
    };

    TestApp {
        app: create_router(state, None),
        store,
        _auth: auth,
    }
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

#[tokio::test]
async fn admin_path_without_session_redirects_to_sign_in() {
    let app = spawn_app().await;

    let response = app.app.oneshot(get("/admin")).await.expect("response");

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers()[header::LOCATION],
        "/auth/login?redirectedFrom=%2Fadmin"
    );
}

#[tokio::test]
async fn return_target_keeps_the_query_string() {
    let app = spawn_app().await;

    let response = app
        .app
        .oneshot(get("/dashboard?tab=active"))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers()[header::LOCATION],
        "/auth/login?redirectedFrom=%2Fdashboard%3Ftab%3Dactive"
    );
}

#[tokio::test]
async fn unverifiable_cookie_counts_as_signed_out() {
    let app = spawn_app().await;

    let request = Request::builder()
        .method("GET")
        .uri("/admin")
        .header(header::COOKIE, format!("{}=garbage", DEFAULT_SESSION_COOKIE))
        .body(Body::empty())
        .expect("request");

    let response = app.app.oneshot(request).await.expect("response");

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers()[header::LOCATION],
        "/auth/login?redirectedFrom=%2Fadmin"
    );
}

#[tokio::test]
async fn public_listing_is_served_without_a_session() {
    let app = spawn_app().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&app.store)
        .await;

    let response = app.app.oneshot(get("/jobs")).await.expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    let body = response
        .into_body()
        .collect()
        .await
        .expect("body")
        .to_bytes();
    assert_eq!(&body[..], b"[]");
}

#[tokio::test]
async fn health_and_unmatched_paths_bypass_the_gate() {
    let app = spawn_app().await;

    let response = app
        .app
        .clone()
        .oneshot(get("/health"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    // Outside the intercepted prefix set: plain 404, never a redirect.
    let response = app.app.oneshot(get("/nonexistent")).await.expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn responses_carry_security_headers() {
    let app = spawn_app().await;

    let response = app
        .app
        .oneshot(get("/health"))
        .await
        .expect("response");

    assert_eq!(
        response.headers()["x-content-type-options"],
        "nosniff"
    );
    assert_eq!(response.headers()["x-frame-options"], "DENY");
    assert!(response.headers().contains_key("x-request-id"));
}
