//! Route guard: per-navigation render/redirect/deny decision.
//!
//! - No IO
//! - No state of its own
//! - Never mutates the session store

use std::borrow::Cow;

use crate::{RoleSet, SessionStore};

/// Access rule declared by a view.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ViewAccess {
    /// Rendered for everyone, outside the authenticated shell.
    Public,
    /// Only meaningful when logged out (the login view).
    GuestOnly,
    /// Requires a session; optionally a role in `roles`.
    Protected { roles: Option<RoleSet> },
}

impl ViewAccess {
    pub const AUTHENTICATED: ViewAccess = ViewAccess::Protected { roles: None };

    pub fn roles(roles: impl Into<RoleSet>) -> Self {
        ViewAccess::Protected {
            roles: Some(roles.into()),
        }
    }
}

/// Layout a rendered view is placed in.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Shell {
    Bare,
    /// Navigation chrome plus content slot.
    Authenticated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Render(Shell),
    Redirect(Cow<'static, str>),
    /// The view is omitted; nothing is rendered down this path.
    Deny,
}

impl GuardDecision {
    pub fn is_render(&self) -> bool {
        matches!(self, GuardDecision::Render(_))
    }
}

/// Landing paths used for redirects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardPaths {
    pub login: Cow<'static, str>,
    pub home: Cow<'static, str>,
}

impl Default for GuardPaths {
    fn default() -> Self {
        Self {
            login: Cow::Borrowed("/login"),
            home: Cow::Borrowed("/"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RouteGuard<'a> {
    session: &'a SessionStore,
    paths: GuardPaths,
}

impl<'a> RouteGuard<'a> {
    pub fn new(session: &'a SessionStore) -> Self {
        Self::with_paths(session, GuardPaths::default())
    }

    pub fn with_paths(session: &'a SessionStore, paths: GuardPaths) -> Self {
        Self { session, paths }
    }

    pub fn paths(&self) -> &GuardPaths {
        &self.paths
    }

    /// Decide what happens when navigating to a view with `access`.
    ///
    /// Protected views: no session redirects to login; a role outside the
    /// required set is denied in place (no redirect); otherwise the view
    /// renders inside the authenticated shell.
    pub fn evaluate(&self, access: ViewAccess) -> GuardDecision {
        let decision = match access {
            ViewAccess::Public => GuardDecision::Render(Shell::Bare),
            ViewAccess::GuestOnly => {
                if self.session.is_authenticated() {
                    GuardDecision::Redirect(self.paths.home.clone())
                } else {
                    GuardDecision::Render(Shell::Bare)
                }
            }
            ViewAccess::Protected { roles } => {
                if !self.session.is_authenticated() {
                    GuardDecision::Redirect(self.paths.login.clone())
                } else if roles.is_some_and(|r| !self.session.has_role(r)) {
                    GuardDecision::Deny
                } else {
                    GuardDecision::Render(Shell::Authenticated)
                }
            }
        };

        tracing::debug!(?access, ?decision, "route guard");
        decision
    }
}
