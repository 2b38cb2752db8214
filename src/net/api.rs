//! Identity service client: login, registration, and current-user lookup.
//!
//! DESIGN
//! ======
//! [`IdentityService`] is the seam the session layer depends on, so tests can
//! swap in a mock. [`HttpIdentityClient`] is the production implementation
//! over `reqwest`. The bearer token is read from the [`TokenStore`] on every
//! authorized call and never cached on the client.
//!
//! ERROR HANDLING
//! ==============
//! Non-success statuses are classified per endpoint into the error taxonomy
//! the session layer reacts to (bad credentials, rejected registration,
//! unusable credential). The server's `message` field is carried through so
//! pages can display it. Nothing here retries.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::types::{AuthResponse, Envelope, ErrorBody, RegistrationPayload, User};
use crate::config::{ClientConfig, RequestTimeouts};
use crate::state::token::TokenStore;

const LOGIN_ENDPOINT: &str = "/auth/login";
const REGISTER_ENDPOINT: &str = "/auth/register";
const CURRENT_USER_ENDPOINT: &str = "/auth/me";

const LOGIN_FAILED: &str = "Login failed";
const REGISTRATION_FAILED: &str = "Registration failed";
const NOT_AUTHORIZED: &str = "Not authorized";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The service rejected the login credentials.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The service rejected the registration payload.
    #[error("registration rejected: {0}")]
    Validation(String),

    /// The held credential is absent, malformed, expired, or revoked.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The request never produced a response (connect, timeout, body read).
    #[error("request failed: {0}")]
    Transport(String),

    /// Any other non-success status.
    #[error("unexpected response: status {status}: {message}")]
    Response { status: u16, message: String },

    /// The success body did not match the expected envelope.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ApiError {
    /// Text to show the user for this failure.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Authentication(message)
            | Self::Validation(message)
            | Self::Unauthorized(message)
            | Self::Response { message, .. } => message.clone(),
            Self::Transport(_) => "Could not reach the server. Check your connection and try again.".to_owned(),
            Self::Parse(_) | Self::HttpClientBuild(_) => self.to_string(),
        }
    }
}

/// Remote identity operations consumed by the session manager.
#[async_trait::async_trait]
pub trait IdentityService: Send + Sync {
    /// Exchange email and password for a credential and identity.
    ///
    /// # Errors
    ///
    /// [`ApiError::Authentication`] when the credentials are rejected; other
    /// variants for transport or protocol failures.
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError>;

    /// Create an account and receive a credential and identity.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] when the payload is rejected (e.g. duplicate
    /// email); other variants for transport or protocol failures.
    async fn register(&self, payload: &RegistrationPayload) -> Result<AuthResponse, ApiError>;

    /// Look up the identity behind the currently held credential.
    ///
    /// # Errors
    ///
    /// [`ApiError::Unauthorized`] when no credential is held or the service
    /// rejects it; other variants for transport or protocol failures.
    async fn fetch_current_user(&self) -> Result<User, ApiError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Endpoint {
    Login,
    Register,
    CurrentUser,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

// =============================================================================
// CLIENT
// =============================================================================

/// `reqwest`-backed [`IdentityService`].
pub struct HttpIdentityClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl HttpIdentityClient {
    /// Build a client rooted at `base_url` (e.g. `https://jobs.example/api`).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the HTTP client fails to build.
    pub fn new(base_url: impl Into<String>, tokens: Arc<dyn TokenStore>, timeouts: RequestTimeouts) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Ok(Self { http, base_url, tokens })
    }

    /// Build a client from typed config.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::HttpClientBuild`] if the HTTP client fails to build.
    pub fn from_config(config: &ClientConfig, tokens: Arc<dyn TokenStore>) -> Result<Self, ApiError> {
        Self::new(config.api_url.clone(), tokens, config.timeouts)
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait::async_trait]
impl IdentityService for HttpIdentityClient {
    async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let response = self
            .http
            .post(endpoint_url(&self.base_url, LOGIN_ENDPOINT))
            .json(&LoginRequest { email, password })
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        read_envelope(Endpoint::Login, response).await
    }

    async fn register(&self, payload: &RegistrationPayload) -> Result<AuthResponse, ApiError> {
        let response = self
            .http
            .post(endpoint_url(&self.base_url, REGISTER_ENDPOINT))
            .json(payload)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        read_envelope(Endpoint::Register, response).await
    }

    async fn fetch_current_user(&self) -> Result<User, ApiError> {
        let Some(token) = self.tokens.get() else {
            return Err(ApiError::Unauthorized("no credential held".to_owned()));
        };
        let response = self
            .http
            .get(endpoint_url(&self.base_url, CURRENT_USER_ENDPOINT))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        read_envelope(Endpoint::CurrentUser, response).await
    }
}

// =============================================================================
// RESPONSE HANDLING
// =============================================================================

async fn read_envelope<T: DeserializeOwned>(endpoint: Endpoint, response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status().as_u16();
    let text = response
        .text()
        .await
        .map_err(|e| ApiError::Transport(e.to_string()))?;

    if !(200..300).contains(&status) {
        let error = classify_failure(endpoint, status, &text);
        tracing::debug!(?endpoint, status, error = %error, "identity request rejected");
        return Err(error);
    }

    parse_envelope(&text)
}

fn endpoint_url(base_url: &str, path: &str) -> String {
    format!("{}{path}", base_url.trim_end_matches('/'))
}

fn parse_envelope<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    serde_json::from_str::<Envelope<T>>(text)
        .map(|envelope| envelope.data)
        .map_err(|e| ApiError::Parse(e.to_string()))
}

/// Pull a non-blank `message` out of an error body, if there is one.
fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()?
        .message
        .filter(|m| !m.trim().is_empty())
}

fn classify_failure(endpoint: Endpoint, status: u16, body: &str) -> ApiError {
    let message = error_message(body);
    match (endpoint, status) {
        (Endpoint::Login, 400 | 401 | 403 | 404) => ApiError::Authentication(message.unwrap_or_else(|| LOGIN_FAILED.to_owned())),
        (Endpoint::Register, 400 | 409 | 422) => {
            ApiError::Validation(message.unwrap_or_else(|| REGISTRATION_FAILED.to_owned()))
        }
        (Endpoint::CurrentUser, 400 | 401 | 403) => {
            ApiError::Unauthorized(message.unwrap_or_else(|| NOT_AUTHORIZED.to_owned()))
        }
        _ => ApiError::Response {
            status,
            message: message.unwrap_or_else(|| fallback_message(endpoint).to_owned()),
        },
    }
}

fn fallback_message(endpoint: Endpoint) -> &'static str {
    match endpoint {
        Endpoint::Login => LOGIN_FAILED,
        Endpoint::Register => REGISTRATION_FAILED,
        Endpoint::CurrentUser => NOT_AUTHORIZED,
    }
}
