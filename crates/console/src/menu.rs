//! Navigation menu of the authenticated shell.

use puntualcheck_auth::{Role, RoleSet, SessionStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuEntry {
    pub label: &'static str,
    pub path: &'static str,
    pub roles: RoleSet,
}

const fn entry(label: &'static str, path: &'static str, roles: &[Role]) -> MenuEntry {
    MenuEntry {
        label,
        path,
        roles: RoleSet::of(roles),
    }
}

pub static MENU: &[MenuEntry] = &[
    entry("Dashboard", "/", &Role::ALL),
    entry("Usuarios", "/usuarios", &[Role::Admin]),
    entry("Estudiantes", "/estudiantes", &[Role::Admin, Role::Docente]),
    entry("Representantes", "/representantes", &[Role::Admin, Role::Docente]),
    entry("Horarios", "/horarios", &[Role::Admin, Role::Docente]),
    entry("Asistencias", "/asistencias", &[Role::Admin, Role::Docente, Role::Representante]),
    entry("Notificaciones", "/notificaciones", &[Role::Admin, Role::Docente]),
];

impl MenuEntry {
    /// Highlight rule: exact match, or prefix match for anything but `/`.
    pub fn is_selected(&self, location: &str) -> bool {
        location == self.path || (self.path != "/" && location.starts_with(self.path))
    }
}

/// Entries the current session may see. Empty when logged out.
pub fn visible(session: &SessionStore) -> Vec<&'static MenuEntry> {
    MENU.iter().filter(|e| session.has_role(e.roles)).collect()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use puntualcheck_auth::{AccountDirectory, MemoryStorage, SessionStorage};

    fn session_as(role: Option<Role>) -> SessionStore {
        let storage = MemoryStorage::new();
        if let Some(role) = role {
            let user = format!(r#"{{"id":1,"rol":"{role}","nombre":"X","correo":"x@x.com"}}"#);
            storage.set("token", "t").unwrap();
            storage.set("user", &user).unwrap();
        }
        let store = SessionStore::new(Arc::new(storage), Arc::new(AccountDirectory::default()));
        store.restore();
        store
    }

    fn labels(session: &SessionStore) -> Vec<&'static str> {
        visible(session).iter().map(|e| e.label).collect()
    }

    #[test]
    fn admin_sees_everything() {
        assert_eq!(labels(&session_as(Some(Role::Admin))).len(), MENU.len());
    }

    #[test]
    fn representante_sees_dashboard_and_asistencias() {
        assert_eq!(
            labels(&session_as(Some(Role::Representante))),
            vec!["Dashboard", "Asistencias"]
        );
    }

    #[test]
    fn estudiante_sees_dashboard_only() {
        assert_eq!(labels(&session_as(Some(Role::Estudiante))), vec!["Dashboard"]);
    }

    #[test]
    fn logged_out_sees_nothing() {
        assert!(labels(&session_as(None)).is_empty());
    }

    #[test]
    fn selection_rule() {
        let dashboard = &MENU[0];
        let usuarios = &MENU[1];
        assert!(dashboard.is_selected("/"));
        assert!(!dashboard.is_selected("/usuarios"));
        assert!(usuarios.is_selected("/usuarios/4/editar"));
    }
}
