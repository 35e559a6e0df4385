//! Request gateway: credential attachment, response normalization, and
//! single-flight token refresh.
//!
//! Every outbound call goes through [`ApiClient::send`]. When a request comes
//! back `401 Unauthorized`, the gateway performs at most one concurrent
//! refresh against the token endpoint; requests that hit the condition park
//! on a wait queue and retry once the refresh settles, in FIFO order. The
//! refresh itself runs on a detached task, so it settles (and the queue
//! drains) even if the request that triggered it is dropped mid-flight. A
//! failed refresh clears all stored credentials (forced logout) and surfaces
//! as [`ApiError::SessionExpired`].

use reqwest::{Method, StatusCode, header};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;
use wayfare_config::Config;
use wayfare_types::{ApiError, CredentialKey, CredentialStore, TokenResponse, traits::Result};

/// Token endpoint path, relative to the API base URL.
const REFRESH_PATH: &str = "/api/auth/refresh";

/// An abstract request descriptor accepted by [`ApiClient::send`].
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
}

impl ApiRequest {
    fn new(method: Method, path: impl Into<String>, body: Option<Value>) -> Self {
        Self {
            method,
            path: path.into(),
            body,
            headers: Vec::new(),
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path, None)
    }

    #[must_use]
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path, Some(body))
    }

    #[must_use]
    pub fn patch(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PATCH, path, Some(body))
    }

    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path, None)
    }

    /// Attach an extra request header (e.g. `Idempotency-Key`).
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Shared refresh coordination state, private to one gateway instance.
///
/// Invariant: `refreshing` is true for the entire span of a refresh, and the
/// queue is drained in the same critical section that clears the flag, so no
/// caller can observe `refreshing == false` with a non-empty queue. Both
/// happen on the detached refresh task, so they settle even if every request
/// that hit the 401 has since been dropped.
struct RefreshState {
    refreshing: bool,
    waiters: Vec<oneshot::Sender<Result<()>>>,
}

/// Outcome of one transmission attempt, before retry handling.
enum AttemptError {
    /// 401 from the server; candidate for the refresh-and-retry path.
    Unauthorized,
    /// Any other failure, already normalized. Not retried.
    Fatal(ApiError),
}

/// Authenticated HTTP client for the travel-planning API gateway.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    store: Arc<dyn CredentialStore>,
    refresh: Arc<Mutex<RefreshState>>,
}

impl ApiClient {
    /// Creates a gateway from configuration and a credential store.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Config`] if the underlying HTTP client cannot be
    /// constructed.
    pub fn new(config: &Config, store: Arc<dyn CredentialStore>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::Config(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            store,
            refresh: Arc::new(Mutex::new(RefreshState {
                refreshing: false,
                waiters: Vec::new(),
            })),
        })
    }

    /// The credential store this gateway reads and maintains.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// Sends a request and decodes the JSON response body.
    ///
    /// # Errors
    ///
    /// Returns a normalized [`ApiError`]; see the module docs for the
    /// refresh-and-retry behaviour on `401`.
    pub async fn send<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let resp = self.dispatch(&request).await?;
        resp.json::<T>()
            .await
            .map_err(|e| ApiError::Serialization(e.to_string()))
    }

    /// Sends a request and discards the response body (e.g. `DELETE`).
    ///
    /// # Errors
    ///
    /// Same as [`Self::send`].
    pub async fn send_unit(&self, request: ApiRequest) -> Result<()> {
        self.dispatch(&request).await?;
        Ok(())
    }

    // ── Convenience methods ───────────────────────────────────────────────

    /// `GET path`, decoding the JSON response.
    ///
    /// # Errors
    ///
    /// Same as [`Self::send`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(ApiRequest::get(path)).await
    }

    /// `POST path` with a JSON body, decoding the JSON response.
    ///
    /// # Errors
    ///
    /// Same as [`Self::send`].
    pub async fn post<T: DeserializeOwned>(&self, path: &str, body: Value) -> Result<T> {
        self.send(ApiRequest::post(path, body)).await
    }

    /// `PATCH path` with a JSON body, decoding the JSON response.
    ///
    /// # Errors
    ///
    /// Same as [`Self::send`].
    pub async fn patch<T: DeserializeOwned>(&self, path: &str, body: Value) -> Result<T> {
        self.send(ApiRequest::patch(path, body)).await
    }

    /// `DELETE path`, ignoring the response body.
    ///
    /// # Errors
    ///
    /// Same as [`Self::send`].
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send_unit(ApiRequest::delete(path)).await
    }

    // ── Core dispatch ─────────────────────────────────────────────────────

    /// Transmits the request, running the refresh-and-retry protocol on a
    /// `401`. The retry is bounded to exactly one re-issue per request.
    async fn dispatch(&self, request: &ApiRequest) -> Result<reqwest::Response> {
        let mut retried = false;
        loop {
            match self.attempt(request).await {
                Ok(resp) => return Ok(resp),
                Err(AttemptError::Unauthorized) if !retried => {
                    self.recover_session().await?;
                    retried = true;
                }
                Err(AttemptError::Unauthorized) => {
                    return Err(ApiError::Auth(
                        "request unauthorized after token refresh".into(),
                    ));
                }
                Err(AttemptError::Fatal(e)) => return Err(e),
            }
        }
    }

    /// One transmission attempt: look up credentials, attach headers, send,
    /// and classify the response.
    async fn attempt(
        &self,
        request: &ApiRequest,
    ) -> std::result::Result<reqwest::Response, AttemptError> {
        let creds = self
            .store
            .get_many(&[CredentialKey::AccessToken, CredentialKey::UserId])
            .await
            .map_err(AttemptError::Fatal)?;

        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = self
            .http
            .request(request.method.clone(), &url)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = creds.get(&CredentialKey::AccessToken) {
            builder = builder.bearer_auth(token);
        }
        if let Some(user_id) = creds.get(&CredentialKey::UserId) {
            builder = builder.header("X-User-Id", user_id);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        tracing::debug!(method = %request.method, path = %request.path, "dispatching request");

        let resp = builder
            .send()
            .await
            .map_err(|e| AttemptError::Fatal(e.into()))?;
        let status = resp.status();
        tracing::debug!(status = status.as_u16(), path = %request.path, "response received");

        if status.is_success() {
            Ok(resp)
        } else if status == StatusCode::UNAUTHORIZED {
            Err(AttemptError::Unauthorized)
        } else {
            Err(AttemptError::Fatal(Self::normalize_failure(status, resp).await))
        }
    }

    /// Normalizes a non-2xx, non-401 response into an [`ApiError`],
    /// preferring the server-supplied `message` body field.
    async fn normalize_failure(status: StatusCode, resp: reqwest::Response) -> ApiError {
        let body: Option<Value> = resp.json().await.ok();
        let message = body
            .as_ref()
            .and_then(|b| b.get("message"))
            .and_then(Value::as_str)
            .map(str::to_string);
        match message {
            Some(m) if matches!(status.as_u16(), 400 | 422) => ApiError::Validation(m),
            Some(m) => ApiError::Server {
                status: status.as_u16(),
                message: m,
            },
            None => ApiError::Server {
                status: status.as_u16(),
                message: format!("Server error: {}", status.as_u16()),
            },
        }
    }

    // ── Single-flight refresh ─────────────────────────────────────────────

    /// Ensures exactly one refresh call is in flight. The first caller of an
    /// episode spawns the refresh on a detached task; every caller, first
    /// included, parks on the wait queue and receives the shared outcome.
    ///
    /// Running the refresh on its own task keeps the flag-and-queue cleanup
    /// independent of the requests awaiting it: a caller dropped mid-wait
    /// (timeout, `select!`, task abort) cannot leave the flag stuck or the
    /// queue undrained.
    async fn recover_session(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        let spawn_refresh = {
            let mut state = self.refresh.lock().unwrap();
            state.waiters.push(tx);
            if state.refreshing {
                false
            } else {
                state.refreshing = true;
                true
            }
        };

        if spawn_refresh {
            let http = self.http.clone();
            let base_url = self.base_url.clone();
            let store = Arc::clone(&self.store);
            let refresh = Arc::clone(&self.refresh);
            tokio::spawn(async move {
                let outcome = refresh_session(&http, &base_url, store.as_ref()).await;

                // Clear the flag and drain the queue under one lock
                // acquisition so a concurrent caller never sees the flag
                // down while waiters remain.
                let waiters = {
                    let mut state = refresh.lock().unwrap();
                    state.refreshing = false;
                    std::mem::take(&mut state.waiters)
                };
                for tx in waiters {
                    let _ = tx.send(outcome.clone());
                }
            });
        }

        match rx.await {
            Ok(outcome) => outcome,
            // The refresh task can only vanish without settling if it
            // panicked; treat the session as unrecoverable.
            Err(_) => Err(ApiError::SessionExpired),
        }
    }
}

/// Exchanges the stored refresh token for a new credential triplet.
///
/// On token-endpoint failure the stored credentials are cleared (forced
/// logout) and the error collapses to [`ApiError::SessionExpired`]. A
/// missing refresh token fails fast without touching the store.
async fn refresh_session(
    http: &reqwest::Client,
    base_url: &str,
    store: &dyn CredentialStore,
) -> Result<()> {
    let refresh_token = store
        .get(CredentialKey::RefreshToken)
        .await?
        .ok_or_else(|| ApiError::Auth("no refresh token available".into()))?;

    let url = format!("{base_url}{REFRESH_PATH}");
    let outcome: Result<TokenResponse> = async {
        let resp = http
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .json(&serde_json::json!({ "refreshToken": refresh_token }))
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Auth(format!(
                "token endpoint returned {}",
                status.as_u16()
            )));
        }
        resp.json::<TokenResponse>()
            .await
            .map_err(|e| ApiError::Auth(format!("malformed token response: {e}")))
    }
    .await;

    match outcome {
        Ok(token) => {
            store
                .set_many(&[
                    (CredentialKey::AccessToken, token.access_token),
                    (CredentialKey::RefreshToken, token.refresh_token),
                    (CredentialKey::UserId, token.user_id.to_string()),
                ])
                .await?;
            tracing::debug!("session refreshed");
            Ok(())
        }
        Err(e) => {
            tracing::warn!(error = %e, "token refresh failed, clearing session");
            if let Err(clear_err) = store.clear(&CredentialKey::ALL).await {
                tracing::warn!(error = %clear_err, "failed to clear credentials");
            }
            Err(ApiError::SessionExpired)
        }
    }
}
