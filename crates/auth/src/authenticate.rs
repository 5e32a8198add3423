//! Authentication collaborator boundary.
//!
//! The session store never checks secrets itself; it asks an [`Authenticator`]
//! for a [`Grant`] and stores whatever comes back.

use std::sync::RwLock;

use async_trait::async_trait;
use thiserror::Error;

use puntualcheck_core::UserId;

use crate::{Credential, Identity, NewAccount};

/// Message shown when no active account matches the submitted pair.
pub const INVALID_CREDENTIALS: &str = "Credenciales incorrectas o usuario inactivo.";

/// Login rejected: bad credentials, inactive account, or collaborator failure.
///
/// Carries a message meant for the end user.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct AuthenticationError {
    message: String,
}

impl AuthenticationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn invalid_credentials() -> Self {
        Self::new(INVALID_CREDENTIALS)
    }

    /// Transport or backend failure, reported as the same kind.
    pub fn unavailable(detail: impl core::fmt::Display) -> Self {
        Self::new(format!("Error de conexión: {detail}"))
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Successful exchange: an identity plus the credential authorizing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grant {
    pub identity: Identity,
    pub credential: Credential,
}

#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Exchange an email/secret pair for a grant.
    async fn authenticate(&self, email: &str, secret: &str) -> Result<Grant, AuthenticationError>;

    /// Register a new account and sign it in.
    async fn register(&self, account: &NewAccount) -> Result<Grant, AuthenticationError> {
        let _ = account;
        Err(AuthenticationError::new("El registro no está disponible."))
    }

    /// Current identity behind a credential.
    async fn fetch_identity(
        &self,
        credential: &Credential,
        id: UserId,
    ) -> Result<Identity, AuthenticationError> {
        let _ = (credential, id);
        Err(AuthenticationError::new("No se pudo obtener el usuario actual."))
    }
}

/// An account as the user directory knows it: identity plus stored secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Account {
    pub identity: Identity,
    pub secret: String,
}

impl Account {
    pub fn new(identity: Identity, secret: impl Into<String>) -> Self {
        Self {
            identity,
            secret: secret.into(),
        }
    }
}

impl core::fmt::Debug for Account {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Account")
            .field("identity", &self.identity)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Pick the single account matching `email`/`secret`.
///
/// Succeeds only when exactly one account matches and it is active. Emails
/// are compared exactly after trimming surrounding whitespace; the secret is
/// compared as given.
pub fn match_account<'a, I>(accounts: I, email: &str, secret: &str) -> Result<&'a Account, AuthenticationError>
where
    I: IntoIterator<Item = &'a Account>,
{
    let email = email.trim();
    let mut matches = accounts
        .into_iter()
        .filter(|a| a.identity.email.trim() == email && a.secret == secret);

    let found = matches.next().ok_or_else(AuthenticationError::invalid_credentials)?;
    if matches.next().is_some() {
        tracing::warn!(email, "multiple accounts share the same credentials; refusing login");
        return Err(AuthenticationError::invalid_credentials());
    }
    if !found.identity.active {
        return Err(AuthenticationError::invalid_credentials());
    }
    Ok(found)
}

/// In-memory user directory.
#[derive(Debug, Default)]
pub struct AccountDirectory {
    accounts: RwLock<Vec<Account>>,
}

impl AccountDirectory {
    pub fn new(accounts: Vec<Account>) -> Self {
        Self {
            accounts: RwLock::new(accounts),
        }
    }

    pub fn len(&self) -> usize {
        self.accounts.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Authenticator for AccountDirectory {
    async fn authenticate(&self, email: &str, secret: &str) -> Result<Grant, AuthenticationError> {
        let accounts = self.accounts.read().unwrap();
        let account = match_account(accounts.iter(), email, secret)?;
        Ok(Grant {
            identity: account.identity.clone(),
            credential: Credential::generate(),
        })
    }

    async fn register(&self, account: &NewAccount) -> Result<Grant, AuthenticationError> {
        let identity = {
            let mut accounts = self.accounts.write().unwrap();
            let email = account.email.trim();
            if accounts
                .iter()
                .any(|a| a.identity.email.trim() == email)
            {
                return Err(AuthenticationError::new("El correo ya está registrado."));
            }

            let next_id = accounts
                .iter()
                .map(|a| a.identity.id.get())
                .max()
                .unwrap_or(0)
                + 1;

            let identity = Identity {
                id: UserId::new(next_id),
                display_name: account.display_name.clone(),
                email: email.to_string(),
                role: account.role,
                active: account.active,
            };
            accounts.push(Account::new(identity.clone(), account.secret.clone()));
            identity
        };

        if !identity.active {
            return Err(AuthenticationError::invalid_credentials());
        }

        Ok(Grant {
            identity,
            credential: Credential::generate(),
        })
    }

    async fn fetch_identity(
        &self,
        _credential: &Credential,
        id: UserId,
    ) -> Result<Identity, AuthenticationError> {
        self.accounts
            .read()
            .unwrap()
            .iter()
            .find(|a| a.identity.id == id)
            .map(|a| a.identity.clone())
            .ok_or_else(|| AuthenticationError::new("Usuario no encontrado."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Role;

    fn account(id: i64, email: &str, secret: &str, active: bool) -> Account {
        let mut identity = Identity::new(UserId::new(id), "Ana", email, Role::Admin);
        identity.active = active;
        Account::new(identity, secret)
    }

    #[tokio::test]
    async fn wrong_secret_is_rejected() {
        let dir = AccountDirectory::new(vec![account(1, "a@x.com", "right", true)]);
        let err = dir.authenticate("a@x.com", "wrong").await.unwrap_err();
        assert_eq!(err.message(), INVALID_CREDENTIALS);
    }

    #[tokio::test]
    async fn inactive_account_is_rejected() {
        let dir = AccountDirectory::new(vec![account(1, "a@x.com", "right", false)]);
        assert!(dir.authenticate("a@x.com", "right").await.is_err());
    }

    #[tokio::test]
    async fn matching_active_account_gets_a_grant() {
        let dir = AccountDirectory::new(vec![
            account(1, "b@x.com", "right", true),
            account(2, "a@x.com", "right", true),
        ]);
        let grant = dir.authenticate(" a@x.com ", "right").await.unwrap();
        assert_eq!(grant.identity.id, UserId::new(2));
        assert!(!grant.credential.as_str().is_empty());
    }

    #[test]
    fn email_case_is_significant() {
        let accounts = vec![
            account(1, "A@x.com", "right", true),
            account(2, "a@x.com", "right", true),
        ];
        assert_eq!(match_account(accounts.iter(), "a@x.com", "right").unwrap().identity.id, UserId::new(2));
        assert_eq!(match_account(accounts.iter(), "A@x.com", "right").unwrap().identity.id, UserId::new(1));
        assert!(match_account(accounts.iter(), "A@X.COM", "right").is_err());
    }

    #[test]
    fn duplicate_matches_are_rejected() {
        let accounts = vec![
            account(1, "a@x.com", "right", true),
            account(2, "a@x.com", "right", true),
        ];
        assert!(match_account(accounts.iter(), "a@x.com", "right").is_err());
    }

    #[tokio::test]
    async fn register_assigns_next_id_and_refuses_duplicates() {
        let dir = AccountDirectory::new(vec![account(4, "a@x.com", "right", true)]);
        let new = NewAccount {
            display_name: "Beto".into(),
            email: "b@x.com".into(),
            secret: "pw".into(),
            role: Role::Docente,
            active: true,
        };

        let grant = dir.register(&new).await.unwrap();
        assert_eq!(grant.identity.id, UserId::new(5));
        assert_eq!(dir.len(), 2);

        assert!(dir.register(&new).await.is_err());
        assert!(dir.authenticate("b@x.com", "pw").await.is_ok());
    }

    #[tokio::test]
    async fn fetch_identity_by_id() {
        let dir = AccountDirectory::new(vec![account(9, "a@x.com", "right", true)]);
        let c = Credential::new("t");
        assert_eq!(dir.fetch_identity(&c, UserId::new(9)).await.unwrap().email, "a@x.com");
        assert!(dir.fetch_identity(&c, UserId::new(1)).await.is_err());
    }
}
