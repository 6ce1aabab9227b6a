//! The single configured HTTP client every domain service is built on.
//!
//! One `reqwest::Client` carries the backend base URL and request timeout;
//! the bearer token is re-read from the session store and injected on every
//! outgoing request, so login/logout take effect immediately without
//! rebuilding the client.

pub mod applications;
pub mod auth;
pub mod schools;
pub mod statistics;

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::BackendConfig;
use crate::session::{SessionError, SessionStorage, SessionStore};

/// Error taxonomy of the backend boundary. None of these are fatal; they are
/// surfaced to the user as transient notifications.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("not authenticated or token rejected by the backend")]
    Unauthorized,
    #[error("backend rejected the request ({status}): {detail}")]
    Backend { status: u16, detail: String },
    #[error("failed to decode backend response: {0}")]
    Decode(#[source] reqwest::Error),
    #[error(transparent)]
    Session(#[from] SessionError),
}

pub struct ApiClient<S> {
    http: Client,
    base_url: String,
    session: Arc<SessionStore<S>>,
}

impl<S: SessionStorage> ApiClient<S> {
    pub fn new(
        config: &BackendConfig,
        session: Arc<SessionStore<S>>,
    ) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &SessionStore<S> {
        &self.session
    }

    /// Build a request against the backend, injecting the bearer token when
    /// a session is present.
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let builder = self.http.request(method, url);
        match self.session.token() {
            Some(token) => builder.bearer_auth(token.0),
            None => builder,
        }
    }

    /// Send and decode a JSON response, translating backend rejections into
    /// the error taxonomy. The backend's `detail` message is preserved when
    /// it provides one.
    pub(crate) async fn execute<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            let detail = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|body| {
                    body.get("detail")
                        .and_then(|detail| detail.as_str())
                        .map(str::to_string)
                })
                .unwrap_or_else(|| "request failed".to_string());
            return Err(ApiError::Backend {
                status: status.as_u16(),
                detail,
            });
        }
        response.json::<T>().await.map_err(ApiError::Decode)
    }
}
