//! Console shell: ties the session, the guard, the view table and the
//! navigator together.

use std::collections::BTreeMap;
use std::sync::Arc;

use puntualcheck_auth::{
    AuthenticationError, GuardDecision, GuardPaths, Identity, RouteGuard, SessionStore, Shell,
};

use crate::menu::{self, MenuEntry};
use crate::navigator::Navigator;
use crate::views::{self, View};

/// Guard redirects always land on login or home, so a short chain suffices.
const MAX_REDIRECTS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// The view's content is shown.
    View,
    /// Role mismatch: the shell is shown, the content slot stays empty.
    Denied,
}

/// What the user ends up looking at after a navigation.
#[derive(Debug, Clone)]
pub struct Screen {
    pub location: String,
    pub view: &'static View,
    pub params: BTreeMap<&'static str, String>,
    pub shell: Shell,
    pub content: Content,
    pub menu: Vec<&'static MenuEntry>,
    pub identity: Option<Identity>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    #[error("too many redirects while opening '{0}'")]
    TooManyRedirects(String),
    #[error("no view is registered for '{0}'")]
    NoView(String),
}

pub struct Console {
    session: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
    paths: GuardPaths,
}

impl Console {
    pub fn new(session: Arc<SessionStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            session,
            navigator,
            paths: GuardPaths::default(),
        }
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    /// Navigate to `path`, following guard and fallback redirects.
    pub fn open(&self, path: &str) -> Result<Screen, NavigationError> {
        let guard = RouteGuard::with_paths(&self.session, self.paths.clone());
        let mut target = views::normalize(path);

        for _ in 0..=MAX_REDIRECTS {
            let Some(resolved) = views::resolve(&target) else {
                // Unknown paths fall back to home.
                if target == self.paths.home {
                    return Err(NavigationError::NoView(target));
                }
                tracing::debug!(path = %target, "unknown path; redirecting home");
                target = self.paths.home.to_string();
                continue;
            };

            let (shell, content) = match guard.evaluate(resolved.view.access) {
                GuardDecision::Render(shell) => (shell, Content::View),
                GuardDecision::Deny => {
                    tracing::warn!(view = resolved.view.name, "access denied");
                    (Shell::Authenticated, Content::Denied)
                }
                GuardDecision::Redirect(to) => {
                    target = to.into_owned();
                    continue;
                }
            };

            self.navigator.navigate(&resolved.path);
            let menu = match shell {
                Shell::Authenticated => menu::visible(&self.session),
                Shell::Bare => Vec::new(),
            };

            return Ok(Screen {
                location: resolved.path,
                view: resolved.view,
                params: resolved.params,
                shell,
                content,
                menu,
                identity: self.session.current_identity(),
            });
        }

        Err(NavigationError::TooManyRedirects(path.to_string()))
    }

    /// Log in, then land on home.
    pub async fn login(&self, email: &str, secret: &str) -> Result<Identity, AuthenticationError> {
        let identity = self.session.login(email, secret).await?;
        self.navigator.navigate(&self.paths.home);
        Ok(identity)
    }

    /// Log out, then land on the login view.
    pub fn logout(&self) {
        self.session.logout();
        self.navigator.navigate(&self.paths.login);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigator::HistoryNavigator;
    use puntualcheck_auth::{Account, AccountDirectory, MemoryStorage, Role};
    use puntualcheck_core::UserId;

    fn console() -> (Console, Arc<HistoryNavigator>) {
        let accounts = vec![
            Account::new(Identity::new(UserId::new(1), "Ana", "a@x.com", Role::Admin), "right"),
            Account::new(Identity::new(UserId::new(2), "Luis", "l@x.com", Role::Docente), "pw"),
            Account::new(Identity::new(UserId::new(3), "Rosa", "r@x.com", Role::Representante), "pw"),
        ];
        let session = SessionStore::arc(MemoryStorage::arc(), Arc::new(AccountDirectory::new(accounts)));
        let nav = Arc::new(HistoryNavigator::new());
        (Console::new(session, nav.clone()), nav)
    }

    #[test]
    fn anonymous_lands_on_login() {
        let (console, nav) = console();
        let screen = console.open("/usuarios").unwrap();
        assert_eq!(screen.view.name, "login");
        assert_eq!(screen.shell, Shell::Bare);
        assert!(screen.menu.is_empty());
        assert_eq!(nav.current_path(), "/login");
    }

    #[tokio::test]
    async fn authenticated_user_is_sent_home_from_login() {
        let (console, nav) = console();
        console.login("a@x.com", "right").await.unwrap();
        let screen = console.open("/login").unwrap();
        assert_eq!(screen.view.name, "dashboard");
        assert_eq!(screen.content, Content::View);
        assert_eq!(nav.current_path(), "/");
    }

    #[tokio::test]
    async fn docente_is_denied_admin_view_in_place() {
        let (console, nav) = console();
        console.login("l@x.com", "pw").await.unwrap();

        let screen = console.open("/usuarios/4").unwrap();
        assert_eq!(screen.view.name, "usuarios.detail");
        assert_eq!(screen.content, Content::Denied);
        assert_eq!(screen.shell, Shell::Authenticated);
        assert_eq!(nav.current_path(), "/usuarios/4");
    }

    #[tokio::test]
    async fn representante_sees_attendance_detail() {
        let (console, _) = console();
        console.login("r@x.com", "pw").await.unwrap();

        let screen = console.open("/asistencias/15").unwrap();
        assert_eq!(screen.content, Content::View);
        assert_eq!(screen.params.get("id").map(String::as_str), Some("15"));
        let labels: Vec<_> = screen.menu.iter().map(|e| e.label).collect();
        assert_eq!(labels, vec!["Dashboard", "Asistencias"]);
    }

    #[tokio::test]
    async fn unknown_path_goes_home() {
        let (console, _) = console();
        console.login("a@x.com", "right").await.unwrap();
        let screen = console.open("/no/existe").unwrap();
        assert_eq!(screen.view.name, "dashboard");
    }

    #[tokio::test]
    async fn logout_returns_to_login() {
        let (console, nav) = console();
        console.login("a@x.com", "right").await.unwrap();
        console.logout();
        assert_eq!(nav.current_path(), "/login");
        assert!(!console.session().is_authenticated());
        assert_eq!(console.open("/").unwrap().view.name, "login");
    }
}
