//! `puntualcheck-auth` — session and authorization gate for the console.
//!
//! This crate is decoupled from HTTP: authentication and storage are reached
//! through the [`Authenticator`] and [`SessionStorage`] traits.

pub mod authenticate;
pub mod credential;
pub mod guard;
pub mod identity;
pub mod roles;
pub mod session;
pub mod storage;

pub use authenticate::{
    Account, AccountDirectory, AuthenticationError, Authenticator, Grant, INVALID_CREDENTIALS,
    match_account,
};
pub use credential::Credential;
pub use guard::{GuardDecision, GuardPaths, RouteGuard, Shell, ViewAccess};
pub use identity::{Identity, IdentityUpdate, NewAccount};
pub use roles::{Role, RoleSet};
pub use session::{RestoreOutcome, Session, SessionStore};
pub use storage::{FileStorage, MemoryStorage, SessionStorage, StorageError};
