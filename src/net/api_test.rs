use super::*;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};

use crate::net::types::{RegistrationInput, Role, UserKind};
use crate::state::token::MemoryTokenStore;

// =============================================================
// Pure helpers
// =============================================================

#[test]
fn endpoint_url_joins_without_double_slash() {
    assert_eq!(endpoint_url("http://h/api/", "/auth/me"), "http://h/api/auth/me");
    assert_eq!(endpoint_url("http://h/api", "/auth/login"), "http://h/api/auth/login");
}

#[test]
fn error_message_reads_message_field() {
    assert_eq!(error_message(r#"{"message":"Email taken"}"#), Some("Email taken".to_owned()));
}

#[test]
fn error_message_ignores_blank_or_missing() {
    assert_eq!(error_message(r#"{"message":"  "}"#), None);
    assert_eq!(error_message(r#"{"error":"x"}"#), None);
    assert_eq!(error_message("<html>bad gateway</html>"), None);
}

#[test]
fn classify_login_rejection_as_authentication() {
    let err = classify_failure(Endpoint::Login, 401, r#"{"message":"Invalid credentials"}"#);
    assert!(matches!(err, ApiError::Authentication(ref m) if m == "Invalid credentials"));
}

#[test]
fn classify_login_rejection_uses_fallback_message() {
    let err = classify_failure(Endpoint::Login, 400, "");
    assert_eq!(err.user_message(), "Login failed");
}

#[test]
fn classify_register_conflict_as_validation() {
    let err = classify_failure(Endpoint::Register, 409, r#"{"message":"Email already registered"}"#);
    assert!(matches!(err, ApiError::Validation(ref m) if m == "Email already registered"));
}

#[test]
fn classify_current_user_401_as_unauthorized() {
    let err = classify_failure(Endpoint::CurrentUser, 401, "{}");
    assert!(matches!(err, ApiError::Unauthorized(_)));
}

#[test]
fn classify_server_error_keeps_status() {
    let err = classify_failure(Endpoint::Register, 500, "oops");
    assert!(matches!(err, ApiError::Response { status: 500, ref message } if message == "Registration failed"));
}

#[test]
fn parse_envelope_rejects_bare_body() {
    let err = parse_envelope::<User>(r#"{"email":"a@b.c","role":"employer"}"#).unwrap_err();
    assert!(matches!(err, ApiError::Parse(_)));
}

#[test]
fn transport_user_message_is_generic() {
    let err = ApiError::Transport("connection refused".to_owned());
    assert!(err.user_message().contains("Could not reach the server"));
}

// =============================================================
// Mock identity server
// =============================================================

#[derive(Clone, Default)]
struct MockServer {
    me_calls: Arc<AtomicUsize>,
    last_register: Arc<Mutex<Option<Value>>>,
}

fn ada_json() -> Value {
    json!({ "id": "u1", "name": "Ada Lovelace", "email": "ada@example.com", "role": "jobseeker" })
}

async fn login_handler(Json(body): Json<Value>) -> Response {
    if body["email"] == "ada@example.com" && body["password"] == "correct" {
        Json(json!({ "data": { "token": "tok-ada", "user": ada_json() } })).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Invalid credentials" }))).into_response()
    }
}

async fn register_handler(State(mock): State<MockServer>, Json(body): Json<Value>) -> Response {
    *mock.last_register.lock().unwrap() = Some(body.clone());
    if body["email"] == "taken@example.com" {
        return (StatusCode::CONFLICT, Json(json!({ "message": "Email already registered" }))).into_response();
    }
    let user = json!({ "id": "u2", "name": "New User", "email": body["email"], "role": body["role"] });
    (StatusCode::CREATED, Json(json!({ "data": { "token": "tok-new", "user": user } }))).into_response()
}

async fn me_handler(State(mock): State<MockServer>, headers: HeaderMap) -> Response {
    mock.me_calls.fetch_add(1, Ordering::SeqCst);
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some("Bearer tok-ada") => Json(json!({ "data": ada_json() })).into_response(),
        _ => (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Token expired" }))).into_response(),
    }
}

async fn spawn_mock() -> (String, MockServer) {
    let mock = MockServer::default();
    let app = Router::new()
        .route("/api/auth/login", post(login_handler))
        .route("/api/auth/register", post(register_handler))
        .route("/api/auth/me", get(me_handler))
        .with_state(mock.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}/api"), mock)
}

fn client_with(base_url: &str, tokens: Arc<dyn TokenStore>) -> HttpIdentityClient {
    HttpIdentityClient::new(base_url, tokens, RequestTimeouts::default()).unwrap()
}

// =============================================================
// HttpIdentityClient
// =============================================================

#[test]
fn new_trims_trailing_slash() {
    let client = client_with("http://localhost:5000/api/", Arc::new(MemoryTokenStore::new()));
    assert_eq!(client.base_url(), "http://localhost:5000/api");
}

#[tokio::test]
async fn login_returns_token_and_user() {
    let (base, _mock) = spawn_mock().await;
    let client = client_with(&base, Arc::new(MemoryTokenStore::new()));

    let auth = client.login("ada@example.com", "correct").await.unwrap();
    assert_eq!(auth.token, "tok-ada");
    assert_eq!(auth.user.name, "Ada Lovelace");
    assert_eq!(auth.user.role, Role::JobSeeker);
}

#[tokio::test]
async fn login_bad_password_is_authentication_error_with_server_message() {
    let (base, _mock) = spawn_mock().await;
    let client = client_with(&base, Arc::new(MemoryTokenStore::new()));

    let err = client.login("ada@example.com", "wrong").await.unwrap_err();
    assert!(matches!(err, ApiError::Authentication(ref m) if m == "Invalid credentials"));
}

#[tokio::test]
async fn login_does_not_touch_token_store() {
    let (base, _mock) = spawn_mock().await;
    let tokens = Arc::new(MemoryTokenStore::new());
    let client = client_with(&base, tokens.clone());

    client.login("ada@example.com", "correct").await.unwrap();
    assert_eq!(tokens.get(), None);
}

#[tokio::test]
async fn register_sends_mapped_payload() {
    let (base, mock) = spawn_mock().await;
    let client = client_with(&base, Arc::new(MemoryTokenStore::new()));

    let mut input = RegistrationInput::new(UserKind::JobSeeker);
    input.name = Some("Ada Lovelace".to_owned());
    input.email = "ada2@example.com".to_owned();
    input.password = "secret1".to_owned();

    let auth = client
        .register(&RegistrationPayload::from_input(&input))
        .await
        .unwrap();
    assert_eq!(auth.token, "tok-new");
    assert_eq!(auth.user.role, Role::JobSeeker);

    let sent = mock.last_register.lock().unwrap().clone().unwrap();
    assert_eq!(sent["role"], "jobseeker");
    assert_eq!(sent["firstName"], "Ada");
    assert_eq!(sent["lastName"], "Lovelace");
    assert_eq!(sent["phone"], "");
}

#[tokio::test]
async fn register_duplicate_email_is_validation_error() {
    let (base, _mock) = spawn_mock().await;
    let client = client_with(&base, Arc::new(MemoryTokenStore::new()));

    let mut input = RegistrationInput::new(UserKind::Employer);
    input.email = "taken@example.com".to_owned();

    let err = client
        .register(&RegistrationPayload::from_input(&input))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation(ref m) if m == "Email already registered"));
}

#[tokio::test]
async fn fetch_current_user_sends_bearer_token() {
    let (base, mock) = spawn_mock().await;
    let client = client_with(&base, Arc::new(MemoryTokenStore::with_token("tok-ada")));

    let user = client.fetch_current_user().await.unwrap();
    assert_eq!(user.email, "ada@example.com");
    assert_eq!(mock.me_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn fetch_current_user_without_token_skips_network() {
    let (base, mock) = spawn_mock().await;
    let client = client_with(&base, Arc::new(MemoryTokenStore::new()));

    let err = client.fetch_current_user().await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(_)));
    assert_eq!(mock.me_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn fetch_current_user_rejected_token_is_unauthorized() {
    let (base, _mock) = spawn_mock().await;
    let client = client_with(&base, Arc::new(MemoryTokenStore::with_token("tok-stale")));

    let err = client.fetch_current_user().await.unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(ref m) if m == "Token expired"));
}

#[tokio::test]
async fn token_is_read_at_call_time() {
    let (base, mock) = spawn_mock().await;
    let tokens = Arc::new(MemoryTokenStore::with_token("tok-ada"));
    let client = client_with(&base, tokens.clone());

    assert!(client.fetch_current_user().await.is_ok());
    tokens.clear().unwrap();
    assert!(matches!(client.fetch_current_user().await, Err(ApiError::Unauthorized(_))));
    assert_eq!(mock.me_calls.load(Ordering::SeqCst), 1);

    tokens.set("tok-ada").unwrap();
    assert!(client.fetch_current_user().await.is_ok());
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = client_with(&format!("http://{addr}/api"), Arc::new(MemoryTokenStore::new()));
    let err = client.login("ada@example.com", "correct").await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
}
