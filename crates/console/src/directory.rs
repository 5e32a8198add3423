//! Authenticator backed by the backend's user directory (`/api/usuarios`).
//!
//! The backend exposes no login endpoint: the console lists the accounts and
//! matches `correo` / `passwordHash` / `activo` itself, then mints a local
//! credential for the session.

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Deserialize;

use puntualcheck_auth::{
    Account, AuthenticationError, Authenticator, Credential, Grant, Identity, NewAccount, match_account,
};
use puntualcheck_core::UserId;

use crate::http::{ApiError, HttpTransport, backend_message, check_status, decode};

pub const USERS_PATH: &str = "/api/usuarios";

/// A `usuarios` record as returned by the backend.
#[derive(Debug, Clone, Deserialize)]
struct DirectoryRecord {
    #[serde(flatten)]
    identity: Identity,
    #[serde(rename = "passwordHash", default)]
    password_hash: String,
}

impl From<DirectoryRecord> for Account {
    fn from(record: DirectoryRecord) -> Self {
        Account::new(record.identity, record.password_hash)
    }
}

#[derive(Debug, Clone)]
pub struct DirectoryAuthenticator {
    transport: HttpTransport,
}

impl DirectoryAuthenticator {
    pub fn new(transport: HttpTransport) -> Self {
        Self { transport }
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, AuthenticationError> {
        let resp = self
            .transport
            .send(Method::GET, USERS_PATH, None, &[], None)
            .await
            .map_err(auth_error)?;
        let resp = check_status(resp).await.map_err(auth_error)?;
        let records: Vec<serde_json::Value> = decode(resp).await.map_err(auth_error)?;

        // One malformed record must not lock everybody out.
        let accounts = records
            .into_iter()
            .filter_map(|raw| match serde_json::from_value::<DirectoryRecord>(raw) {
                Ok(record) => Some(Account::from(record)),
                Err(err) => {
                    tracing::warn!(error = %err, "skipping malformed user record");
                    None
                }
            })
            .collect();
        Ok(accounts)
    }
}

fn auth_error(err: ApiError) -> AuthenticationError {
    match &err {
        ApiError::Server(_, body) | ApiError::Status(_, body) => match backend_message(body) {
            Some(message) => AuthenticationError::new(message),
            None => AuthenticationError::unavailable(&err),
        },
        _ => AuthenticationError::unavailable(&err),
    }
}

#[async_trait]
impl Authenticator for DirectoryAuthenticator {
    async fn authenticate(&self, email: &str, secret: &str) -> Result<Grant, AuthenticationError> {
        let accounts = self.list_accounts().await?;
        let account = match_account(accounts.iter(), email, secret)?;
        Ok(Grant {
            identity: account.identity.clone(),
            credential: Credential::generate(),
        })
    }

    async fn register(&self, account: &NewAccount) -> Result<Grant, AuthenticationError> {
        let body = serde_json::to_value(account).map_err(AuthenticationError::unavailable)?;
        let resp = self
            .transport
            .send(Method::POST, USERS_PATH, None, &[], Some(&body))
            .await
            .map_err(auth_error)?;
        let resp = check_status(resp).await.map_err(auth_error)?;
        let created: DirectoryRecord = decode(resp).await.map_err(auth_error)?;

        if !created.identity.active {
            return Err(AuthenticationError::invalid_credentials());
        }

        Ok(Grant {
            identity: created.identity,
            credential: Credential::generate(),
        })
    }

    async fn fetch_identity(&self, credential: &Credential, id: UserId) -> Result<Identity, AuthenticationError> {
        let path = format!("{USERS_PATH}/{id}");
        let resp = self
            .transport
            .send(Method::GET, &path, Some(credential), &[], None)
            .await
            .map_err(auth_error)?;

        if resp.status() == StatusCode::UNAUTHORIZED {
            return Err(AuthenticationError::new("Sesión expirada."));
        }

        let resp = check_status(resp).await.map_err(auth_error)?;
        let record: DirectoryRecord = decode(resp).await.map_err(auth_error)?;
        Ok(record.identity)
    }
}
