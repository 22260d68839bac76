mod common;

use axum::http::{HeaderValue, StatusCode};
use axum::{Router, extract::Request, middleware, routing::post};
use axum_test::TestServer;
use chrono::Utc;
use serde_json::{Value, json};

use common::{
    BLOCKED_SESSION_TOKEN, CONSUMER_KEY, CONSUMER_SECRET, FOREIGN_CONSUMER_KEY, SESSION_ACCOUNT,
    SESSION_TOKEN, TestApp, bearer, create_test_app, oauth_header, oauth_header_with, signed,
};
use import_api::api::middleware::auth;
use import_api::config::RegistrationMode;
use import_api::domain::entities::{Account, Consumer};
use import_api::domain::repositories::SessionRepository;

const PATH: &str = "/api/v1/import-category";

fn payload() -> Value {
    json!({ "title": "Signed" })
}

#[tokio::test]
async fn test_unsigned_request_rejected() {
    let app = create_test_app(RegistrationMode::Visitors);

    let response = app.server.post(PATH).json(&payload()).await;

    response.assert_status_unauthorized();
    let json = response.json::<Value>();
    assert_eq!(json["status"], "failed");
    assert_eq!(json["message"], "API Requests must be signed.");
    assert_eq!(app.categories.count(), 0);
}

#[tokio::test]
async fn test_valid_signature_reaches_handler() {
    let app = create_test_app(RegistrationMode::Visitors);

    let response = app
        .server
        .post(PATH)
        .add_header("Authorization", signed("POST", PATH))
        .json(&payload())
        .await;

    response.assert_status(StatusCode::CREATED);
    assert_eq!(app.categories.count(), 1);
}

#[tokio::test]
async fn test_signature_over_query_parameters() {
    let app = create_test_app(RegistrationMode::Visitors);
    let header = oauth_header(
        "POST",
        PATH,
        &[("title", "From Query")],
        CONSUMER_KEY,
        CONSUMER_SECRET,
    );

    let response = app
        .server
        .post(PATH)
        .add_query_param("title", "From Query")
        .add_header("Authorization", header)
        .await;

    response.assert_status(StatusCode::CREATED);
}

#[tokio::test]
async fn test_unknown_consumer_rejected() {
    let app = create_test_app(RegistrationMode::Visitors);

    let response = app
        .server
        .post(PATH)
        .add_header(
            "Authorization",
            oauth_header("POST", PATH, &[], "nobody", CONSUMER_SECRET),
        )
        .json(&payload())
        .await;

    response.assert_status_unauthorized();
    assert_eq!(
        response.json::<Value>()["message"],
        "Unable to verify user for request."
    );
}

#[tokio::test]
async fn test_wrong_secret_rejected() {
    let app = create_test_app(RegistrationMode::Visitors);

    let response = app
        .server
        .post(PATH)
        .add_header(
            "Authorization",
            oauth_header("POST", PATH, &[], CONSUMER_KEY, "wrong-secret"),
        )
        .json(&payload())
        .await;

    response.assert_status_unauthorized();
    assert_eq!(response.json::<Value>()["message"], "Invalid signature");
    assert_eq!(app.categories.count(), 0);
}

#[tokio::test]
async fn test_signature_bound_to_path() {
    let app = create_test_app(RegistrationMode::Visitors);

    let response = app
        .server
        .post(PATH)
        .add_header(
            "Authorization",
            signed("POST", "/api/v1/import-new-user"),
        )
        .json(&payload())
        .await;

    response.assert_status_unauthorized();
}

#[tokio::test]
async fn test_replayed_nonce_rejected() {
    let app = create_test_app(RegistrationMode::Visitors);
    let timestamp = Utc::now().timestamp();
    let header = || {
        oauth_header_with(
            "POST",
            PATH,
            &[],
            CONSUMER_KEY,
            CONSUMER_SECRET,
            "fixed-nonce",
            timestamp,
        )
    };

    app.server
        .post(PATH)
        .add_header("Authorization", header())
        .json(&payload())
        .await
        .assert_status(StatusCode::CREATED);

    let response = app
        .server
        .post(PATH)
        .add_header("Authorization", header())
        .json(&payload())
        .await;

    response.assert_status_unauthorized();
    assert_eq!(response.json::<Value>()["message"], "Nonce already used");
    assert_eq!(app.categories.count(), 1);
}

#[tokio::test]
async fn test_expired_timestamp_rejected() {
    let app = create_test_app(RegistrationMode::Visitors);
    let header = oauth_header_with(
        "POST",
        PATH,
        &[],
        CONSUMER_KEY,
        CONSUMER_SECRET,
        "old-nonce",
        Utc::now().timestamp() - 3600,
    );

    let response = app
        .server
        .post(PATH)
        .add_header("Authorization", header)
        .json(&payload())
        .await;

    response.assert_status_unauthorized();
    assert_eq!(response.json::<Value>()["message"], "Expired timestamp");
}

#[tokio::test]
async fn test_consumer_outside_context_rejected() {
    let app = create_test_app(RegistrationMode::Visitors);

    let response = app
        .server
        .post(PATH)
        .add_header(
            "Authorization",
            oauth_header("POST", PATH, &[], FOREIGN_CONSUMER_KEY, CONSUMER_SECRET),
        )
        .json(&payload())
        .await;

    response.assert_status_unauthorized();
    assert_eq!(
        response.json::<Value>()["message"],
        "The consumer is not valid in the import API context."
    );
    assert_eq!(app.categories.count(), 0);
    assert!(app.consumers.nonces.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_session_token_bypasses_oauth() {
    let app = create_test_app(RegistrationMode::Visitors);

    app.server
        .post(PATH)
        .add_header("Authorization", bearer())
        .json(&payload())
        .await
        .assert_status(StatusCode::CREATED);

    let session = app.sessions.find_by_token(SESSION_TOKEN).unwrap();
    assert!(session.last_used_at.is_some());
}

#[tokio::test]
async fn test_blocked_account_session_rejected() {
    let app = create_test_app(RegistrationMode::Visitors);

    let response = app
        .server
        .post(PATH)
        .add_header(
            "Authorization",
            HeaderValue::from_str(&format!("Bearer {}", BLOCKED_SESSION_TOKEN)).unwrap(),
        )
        .json(&payload())
        .await;

    response.assert_status_unauthorized();
    assert_eq!(app.categories.count(), 0);
    let session = app.sessions.find_by_token(BLOCKED_SESSION_TOKEN).unwrap();
    assert!(session.last_used_at.is_none());
}

/// Mounts a route that reports which caller the auth layer attached.
fn caller_server(app: &TestApp) -> TestServer {
    let router = Router::new()
        .route(
            "/whoami",
            post(|request: Request| async move {
                let extensions = request.extensions();
                axum::Json(json!({
                    "account": extensions.get::<Account>().map(|a| a.name.clone()),
                    "consumer": extensions.get::<Consumer>().map(|c| c.consumer_key.clone()),
                }))
            }),
        )
        .route_layer(middleware::from_fn_with_state(app.state.clone(), auth::layer))
        .with_state(app.state.clone());

    TestServer::new(router).unwrap()
}

#[tokio::test]
async fn test_session_attaches_owning_account() {
    let app = create_test_app(RegistrationMode::Visitors);
    let server = caller_server(&app);

    let response = server
        .post("/whoami")
        .add_header("Authorization", bearer())
        .await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["account"], SESSION_ACCOUNT);
    assert!(json["consumer"].is_null());
}

#[tokio::test]
async fn test_signed_request_attaches_consumer() {
    let app = create_test_app(RegistrationMode::Visitors);
    let server = caller_server(&app);

    let response = server
        .post("/whoami")
        .add_header("Authorization", signed("POST", "/whoami"))
        .await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["consumer"], CONSUMER_KEY);
    assert!(json["account"].is_null());
}

#[tokio::test]
async fn test_revoked_session_rejected() {
    let app = create_test_app(RegistrationMode::Visitors);
    let session = app.sessions.find_by_token(SESSION_TOKEN).unwrap();
    assert!(app.sessions.revoke(session.id).await.unwrap());

    app.server
        .post(PATH)
        .add_header("Authorization", bearer())
        .json(&payload())
        .await
        .assert_status_unauthorized();
}

#[tokio::test]
async fn test_invalid_session_token_rejected() {
    let app = create_test_app(RegistrationMode::Visitors);

    let response = app
        .server
        .post(PATH)
        .add_header("Authorization", HeaderValue::from_static("Bearer stolen"))
        .json(&payload())
        .await;

    response.assert_status_unauthorized();
    assert_eq!(app.categories.count(), 0);
}

#[tokio::test]
async fn test_unknown_endpoint() {
    let app = create_test_app(RegistrationMode::Visitors);

    let response = app.server.get("/api/v1/nonexistent").await;

    response.assert_status_not_found();
    let json = response.json::<Value>();
    assert_eq!(json["status"], "failed");
    assert_eq!(json["message"], "Could not locate controller for endpoint.");
}
