//! HTTP collaborator for the REST backend.
//!
//! [`HttpTransport`] is the raw `reqwest` plumbing. [`ApiClient`] layers the
//! session on top: it attaches the bearer credential to every call and clears
//! the session when the backend answers `401`.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use puntualcheck_auth::{Credential, SessionStore};

use crate::navigator::Navigator;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("no se pudo conectar con el servidor: {0}")]
    Network(String),
    #[error("sesión expirada o no autorizada")]
    Unauthorized,
    #[error("no tienes permisos para realizar esta acción")]
    Forbidden,
    #[error("recurso no encontrado: {0}")]
    NotFound(String),
    #[error("error del servidor ({0}): {1}")]
    Server(u16, String),
    #[error("error en la petición ({0}): {1}")]
    Status(u16, String),
    #[error("respuesta inválida: {0}")]
    Decode(String),
}

impl ApiError {
    /// User-facing message, preferring what the backend said.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Server(_, body) | ApiError::Status(_, body) => {
                backend_message(body).unwrap_or_else(|| self.to_string())
            }
            _ => self.to_string(),
        }
    }
}

/// Extract `message` (or `error`) from a JSON error body.
pub fn backend_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|k| value.get(*k).and_then(|v| v.as_str()))
        .map(str::to_string)
}

/// Base URL plus a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Send a request and return the raw response, whatever its status.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        credential: Option<&Credential>,
        query: &[(&str, String)],
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response, ApiError> {
        let url = self.url(path);
        tracing::debug!(%method, %url, authenticated = credential.is_some(), "api request");

        let mut req = self.client.request(method, &url);
        if let Some(credential) = credential {
            req = req.bearer_auth(credential.as_str());
        }
        if !query.is_empty() {
            req = req.query(query);
        }
        if let Some(body) = body {
            req = req.json(body);
        }

        req.send().await.map_err(|e| {
            tracing::error!(%url, error = %e, "no se pudo conectar con el servidor");
            ApiError::Network(e.to_string())
        })
    }
}

/// Map a non-success status to an error (401 is handled by the caller).
pub async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }

    let path = resp.url().path().to_string();
    let body = resp.text().await.unwrap_or_default();

    Err(match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
        StatusCode::FORBIDDEN => {
            tracing::warn!(%path, "forbidden");
            ApiError::Forbidden
        }
        StatusCode::NOT_FOUND => {
            tracing::warn!(%path, "not found");
            ApiError::NotFound(path)
        }
        s if s.is_server_error() => {
            tracing::error!(%path, status = s.as_u16(), "server error");
            ApiError::Server(s.as_u16(), body)
        }
        s => {
            tracing::warn!(%path, status = s.as_u16(), "request failed");
            ApiError::Status(s.as_u16(), body)
        }
    })
}

pub async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
    resp.json::<T>().await.map_err(|e| ApiError::Decode(e.to_string()))
}

/// Session-aware API client.
#[derive(Clone)]
pub struct ApiClient {
    transport: HttpTransport,
    session: Arc<SessionStore>,
    navigator: Option<Arc<dyn Navigator>>,
    login_path: String,
}

impl core::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.transport.base_url())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    pub fn new(transport: HttpTransport, session: Arc<SessionStore>) -> Self {
        Self {
            transport,
            session,
            navigator: None,
            login_path: "/login".to_string(),
        }
    }

    /// Redirect through `navigator` when the backend rejects the credential.
    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>, login_path: impl Into<String>) -> Self {
        self.navigator = Some(navigator);
        self.login_path = login_path.into();
        self
    }

    pub fn transport(&self) -> &HttpTransport {
        &self.transport
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<serde_json::Value>,
    ) -> Result<reqwest::Response, ApiError> {
        let credential = self.session.current_credential();
        let resp = self
            .transport
            .send(method, path, credential.as_ref(), query, body.as_ref())
            .await?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            self.session.invalidate(&format!("401 from {path}"));
            if let Some(navigator) = &self.navigator {
                if navigator.current_path() != self.login_path {
                    navigator.navigate(&self.login_path);
                }
            }
            return Err(ApiError::Unauthorized);
        }

        check_status(resp).await
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        decode(self.execute(Method::GET, path, &[], None).await?).await
    }

    /// GET with query parameters; empty values are skipped.
    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let query: Vec<(&str, String)> = query
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .cloned()
            .collect();
        decode(self.execute(Method::GET, path, &query, None).await?).await
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let body = to_value(body)?;
        decode(self.execute(Method::POST, path, &[], Some(body)).await?).await
    }

    pub async fn put<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, ApiError> {
        let body = to_value(body)?;
        decode(self.execute(Method::PUT, path, &[], Some(body)).await?).await
    }

    pub async fn patch(&self, path: &str) -> Result<(), ApiError> {
        self.execute(Method::PATCH, path, &[], None).await.map(|_| ())
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.execute(Method::DELETE, path, &[], None).await.map(|_| ())
    }
}

fn to_value<B: Serialize>(body: &B) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Decode(e.to_string()))
}
