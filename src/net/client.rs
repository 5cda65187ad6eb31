//! Authenticated request wrapper for the admin API.
//!
//! ARCHITECTURE
//! ============
//! Every call goes through `ApiClient::execute`, which attaches credentials,
//! sends the request once and classifies the answer:
//!
//! 1. send/read failure            -> `ApiError::Connectivity`
//! 2. 401, or a token-death message -> forced logout, `ApiError::SessionInvalid`
//! 3. any other non-2xx            -> `ApiError::Rejected` with the parsed message
//!
//! `send` then decodes the `{ data, hasError, message }` envelope and turns
//! `hasError: true` into `Rejected` even on HTTP 200.
//!
//! ERROR HANDLING
//! ==============
//! Nothing is retried and nothing is cancelled; each call is one attempt.
//! Session classification applies only to session-authenticated requests:
//! a 401 from the login endpoint means bad credentials, not an expired token.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::envelope::{Envelope, Operation, error_message, is_session_invalid, session_message};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::state::auth::{EndReason, Session};

/// Header carrying the bootstrap admin credential on login.
pub const BOOTSTRAP_HEADER: &str = "x-token";

/// Which credential a request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// `Authorization: Bearer <session token>`, subject to session checks.
    Session,
    /// `x-token: <admin token>`, used only to obtain a session.
    Bootstrap,
}

// =============================================================================
// REQUEST
// =============================================================================

#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Value>,
    scheme: AuthScheme,
    empty_ok: Option<&'static str>,
    operation: Operation,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
            scheme: AuthScheme::Session,
            empty_ok: None,
            operation: Operation::GENERIC,
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    #[must_use]
    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_owned(), value.to_string()));
        self
    }

    /// Attach a JSON body.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `body` cannot be serialized.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ApiError> {
        let value = serde_json::to_value(body).map_err(|e| ApiError::InvalidInput(format!("request body: {e}")))?;
        self.body = Some(value);
        Ok(self)
    }

    /// Send the bootstrap credential instead of the session token.
    #[must_use]
    pub fn bootstrap(mut self) -> Self {
        self.scheme = AuthScheme::Bootstrap;
        self
    }

    /// Treat an empty or non-JSON success body as success with `message`.
    #[must_use]
    pub fn empty_ok(mut self, message: &'static str) -> Self {
        self.empty_ok = Some(message);
        self
    }

    /// Operation used for fallback error messages.
    #[must_use]
    pub fn context(mut self, operation: Operation) -> Self {
        self.operation = operation;
        self
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn scheme(&self) -> AuthScheme {
        self.scheme
    }
}

/// A response that passed transport and status classification.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    /// Parsed JSON body; `None` when the body was empty or not JSON.
    pub body: Option<Value>,
}

// =============================================================================
// CLIENT
// =============================================================================

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: Arc<ClientConfig>,
    session: Session,
}

impl ApiClient {
    /// # Errors
    ///
    /// Returns `HttpClientBuild` if the HTTP client cannot be constructed.
    pub fn new(config: ClientConfig, session: Session) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, config: Arc::new(config), session })
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send `request` once and classify the response.
    ///
    /// # Errors
    ///
    /// `Connectivity`, `SessionInvalid` (after forcing local logout) or
    /// `Rejected`, as described in the module docs. `Storage` if the token
    /// could not be read.
    pub async fn execute(&self, request: ApiRequest) -> Result<RawResponse, ApiError> {
        let url = self.config.endpoint_url(&request.path);
        let mut builder = self
            .http
            .request(request.method.clone(), &url)
            .header(CONTENT_TYPE, "application/json");

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }

        builder = match request.scheme {
            AuthScheme::Session => match self.session.store().token()? {
                Some(token) => builder.bearer_auth(token),
                None => builder,
            },
            AuthScheme::Bootstrap => match &self.config.admin_token {
                Some(token) => builder.header(BOOTSTRAP_HEADER, token),
                None => builder,
            },
        };

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| connectivity(&request.method, &url, &e))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| connectivity(&request.method, &url, &e))?;
        debug!(method = %request.method, %url, status, "api response");

        let json = parse_body(&text);

        if request.scheme == AuthScheme::Session && is_session_invalid(status, json.as_ref().and_then(session_message)) {
            let message = error_message(status, &text, json.as_ref(), &request.operation);
            warn!(status, path = %request.path, "session rejected by server");
            self.session.end(EndReason::SessionInvalid);
            return Err(ApiError::SessionInvalid { status, message });
        }

        if !(200..300).contains(&status) {
            let message = error_message(status, &text, json.as_ref(), &request.operation);
            return Err(ApiError::Rejected { status, message });
        }

        Ok(RawResponse { status, body: json })
    }

    /// Send `request` and return the parsed JSON body, if any.
    ///
    /// # Errors
    ///
    /// Everything `execute` returns.
    pub async fn send_value(&self, request: ApiRequest) -> Result<Option<Value>, ApiError> {
        Ok(self.execute(request).await?.body)
    }

    /// Send `request` and decode the standard envelope.
    ///
    /// # Errors
    ///
    /// Everything `execute` returns, plus `Rejected` for `hasError: true` and
    /// `InvalidResponse` for bodies that are not an envelope.
    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<Envelope<T>, ApiError> {
        let empty_ok = request.empty_ok;
        let operation = request.operation;
        let raw = self.execute(request).await?;

        let Some(body) = raw.body else {
            return match empty_ok {
                Some(message) => Ok(Envelope::empty(message)),
                None => Err(ApiError::InvalidResponse { detail: "empty or non-JSON body".into() }),
            };
        };

        let envelope: Envelope<T> =
            serde_json::from_value(body).map_err(|e| ApiError::InvalidResponse { detail: e.to_string() })?;

        if envelope.has_error {
            let message = envelope
                .message()
                .map_or_else(|| operation.fallback_message(raw.status), str::to_owned);
            return Err(ApiError::Rejected { status: raw.status, message });
        }

        Ok(envelope)
    }
}

fn parse_body(text: &str) -> Option<Value> {
    if text.trim().is_empty() {
        return None;
    }
    match serde_json::from_str(text) {
        Ok(value) => Some(value),
        Err(_) => None,
    }
}

fn connectivity(method: &Method, url: &str, e: &reqwest::Error) -> ApiError {
    warn!(error = %e, %method, %url, "api request failed");
    ApiError::Connectivity { detail: e.to_string() }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
