//! Session store: the single source of truth for "who is logged in".
//!
//! # Invariants
//! - Identity and credential are present together or absent together. The
//!   store holds `Option<Session>`, and every mutation swaps the whole value.
//! - The persisted mirror (`token` + `user` keys) is only written after the
//!   collaborator round trip has finished.
//! - Corrupt persisted state degrades to "logged out", never to an error.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use crate::storage::{SessionStorage, StorageError, TOKEN_KEY, USER_KEY};
use crate::{AuthenticationError, Authenticator, Credential, Grant, Identity, IdentityUpdate, NewAccount, RoleSet};

/// An authenticated identity paired with its credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub identity: Identity,
    pub credential: Credential,
    pub established_at: DateTime<Utc>,
}

impl Session {
    fn from_grant(grant: Grant) -> Self {
        Self {
            identity: grant.identity,
            credential: grant.credential,
            established_at: Utc::now(),
        }
    }
}

/// What `restore` found in persistent storage.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// A valid session was loaded.
    Restored,
    /// Nothing was persisted.
    Empty,
    /// Persisted state was unusable and has been cleared.
    Discarded,
}

/// Persisted identity failed to parse. Handled inside `restore`.
#[derive(Debug, thiserror::Error)]
enum SessionCorruption {
    #[error("persisted identity is not valid: {0}")]
    Identity(#[from] serde_json::Error),
    #[error("only one of token/user is persisted")]
    Incomplete,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub struct SessionStore {
    state: RwLock<Option<Session>>,
    storage: Arc<dyn SessionStorage>,
    authenticator: Arc<dyn Authenticator>,
}

impl core::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SessionStore")
            .field("state", &*self.state.read().unwrap())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Create an empty store. Call [`restore`](Self::restore) once at startup.
    pub fn new(storage: Arc<dyn SessionStorage>, authenticator: Arc<dyn Authenticator>) -> Self {
        Self {
            state: RwLock::new(None),
            storage,
            authenticator,
        }
    }

    pub fn arc(storage: Arc<dyn SessionStorage>, authenticator: Arc<dyn Authenticator>) -> Arc<Self> {
        Arc::new(Self::new(storage, authenticator))
    }

    /// Load the persisted session, if any. Never fails.
    pub fn restore(&self) -> RestoreOutcome {
        match self.read_persisted() {
            Ok(Some(session)) => {
                tracing::info!(user_id = %session.identity.id, role = %session.identity.role, "session restored");
                *self.state.write().unwrap() = Some(session);
                RestoreOutcome::Restored
            }
            Ok(None) => {
                *self.state.write().unwrap() = None;
                RestoreOutcome::Empty
            }
            Err(err) => {
                tracing::warn!(error = %err, "discarding persisted session");
                *self.state.write().unwrap() = None;
                self.clear_persisted();
                RestoreOutcome::Discarded
            }
        }
    }

    fn read_persisted(&self) -> Result<Option<Session>, SessionCorruption> {
        let token = self.storage.get(TOKEN_KEY)?;
        let user = self.storage.get(USER_KEY)?;

        match (token, user) {
            (None, None) => Ok(None),
            (Some(token), Some(user)) if !token.is_empty() => {
                let identity: Identity = serde_json::from_str(&user)?;
                Ok(Some(Session {
                    identity,
                    credential: Credential::new(token),
                    established_at: Utc::now(),
                }))
            }
            _ => Err(SessionCorruption::Incomplete),
        }
    }

    /// Exchange credentials with the authenticator and persist the result.
    ///
    /// On failure the current session (if any) is left exactly as it was.
    pub async fn login(&self, email: &str, secret: &str) -> Result<Identity, AuthenticationError> {
        let grant = match self.authenticator.authenticate(email, secret).await {
            Ok(grant) => grant,
            Err(err) => {
                tracing::info!(email, reason = %err, "login rejected");
                return Err(err);
            }
        };
        self.establish(grant)
    }

    /// Register a new account, then sign it in.
    pub async fn register(&self, account: &NewAccount) -> Result<Identity, AuthenticationError> {
        let grant = self.authenticator.register(account).await?;
        self.establish(grant)
    }

    fn establish(&self, grant: Grant) -> Result<Identity, AuthenticationError> {
        let mut state = self.state.write().unwrap();
        if let Err(err) = self.persist(&grant.identity, &grant.credential) {
            tracing::error!(error = %err, "failed to persist session; login aborted");
            self.rollback_persisted(state.as_ref());
            return Err(AuthenticationError::new("No se pudo guardar la sesión."));
        }

        let session = Session::from_grant(grant);
        let identity = session.identity.clone();
        tracing::info!(user_id = %identity.id, role = %identity.role, "logged in");
        *state = Some(session);
        Ok(identity)
    }

    /// Bring storage back in line with the in-memory session after a failed write.
    fn rollback_persisted(&self, current: Option<&Session>) {
        let Some(session) = current else {
            self.clear_persisted();
            return;
        };
        if let Err(err) = self.persist(&session.identity, &session.credential) {
            tracing::error!(error = %err, "failed to re-persist previous session");
        }
    }

    fn persist(&self, identity: &Identity, credential: &Credential) -> Result<(), StorageError> {
        let user = serde_json::to_string(identity).map_err(|e| StorageError::Encoding(e.to_string()))?;
        self.storage.set(TOKEN_KEY, credential.as_str())?;
        self.storage.set(USER_KEY, &user)
    }

    fn clear_persisted(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(err) = self.storage.remove(key) {
                tracing::warn!(key, error = %err, "failed to clear persisted session key");
            }
        }
    }

    /// Forget the session in memory and in storage. Always succeeds.
    pub fn logout(&self) {
        let previous = self.state.write().unwrap().take();
        self.clear_persisted();
        if let Some(session) = previous {
            tracing::info!(user_id = %session.identity.id, "logged out");
        }
    }

    /// Clear the session because the API rejected the credential.
    pub fn invalidate(&self, reason: &str) {
        let previous = self.state.write().unwrap().take();
        self.clear_persisted();
        if let Some(session) = previous {
            tracing::warn!(user_id = %session.identity.id, reason, "session invalidated");
        }
    }

    /// Merge a partial update into the current identity and re-persist it.
    ///
    /// Returns `Ok(false)` when nobody is logged in. When the `user` key cannot
    /// be written the in-memory identity is left untouched.
    pub fn update_identity(&self, update: &IdentityUpdate) -> Result<bool, StorageError> {
        let mut state = self.state.write().unwrap();
        let Some(session) = state.as_mut() else {
            return Ok(false);
        };

        let mut identity = session.identity.clone();
        identity.apply(update);
        let user = serde_json::to_string(&identity).map_err(|e| StorageError::Encoding(e.to_string()))?;
        if let Err(err) = self.storage.set(USER_KEY, &user) {
            tracing::warn!(error = %err, "failed to persist updated identity");
            return Err(err);
        }

        session.identity = identity;
        Ok(true)
    }

    /// Reload the identity behind the held credential.
    ///
    /// Any failure logs the user out, unless another login replaced the
    /// session while the request was in flight.
    pub async fn refresh_identity(&self) -> Result<Identity, AuthenticationError> {
        let Some(session) = self.current() else {
            return Err(AuthenticationError::new("No hay una sesión activa."));
        };

        let fetched = self
            .authenticator
            .fetch_identity(&session.credential, session.identity.id)
            .await;

        let mut state = self.state.write().unwrap();
        let identity = match fetched {
            Ok(identity) => identity,
            Err(err) => {
                tracing::warn!(error = %err, "refreshing identity failed");
                if state.as_ref().is_some_and(|current| current.credential == session.credential) {
                    *state = None;
                    self.clear_persisted();
                    tracing::info!(user_id = %session.identity.id, "logged out");
                }
                return Err(err);
            }
        };

        match state.as_mut() {
            Some(current) if current.credential == session.credential => {
                current.identity = identity.clone();
                if let Ok(user) = serde_json::to_string(&identity) {
                    if let Err(err) = self.storage.set(USER_KEY, &user) {
                        tracing::warn!(error = %err, "failed to persist refreshed identity");
                    }
                }
                Ok(identity)
            }
            // Session changed while the request was in flight.
            _ => Err(AuthenticationError::new("La sesión cambió durante la actualización.")),
        }
    }

    /// True iff someone is logged in and their role is in `required`.
    pub fn has_role(&self, required: impl Into<RoleSet>) -> bool {
        let required = required.into();
        self.state
            .read()
            .unwrap()
            .as_ref()
            .is_some_and(|s| required.contains(s.identity.role))
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.read().unwrap().is_some()
    }

    pub fn current(&self) -> Option<Session> {
        self.state.read().unwrap().clone()
    }

    pub fn current_identity(&self) -> Option<Identity> {
        self.state.read().unwrap().as_ref().map(|s| s.identity.clone())
    }

    pub fn current_credential(&self) -> Option<Credential> {
        self.state.read().unwrap().as_ref().map(|s| s.credential.clone())
    }
}
