//! View table and path matching.

use std::collections::BTreeMap;

use puntualcheck_auth::{Role, RoleSet, ViewAccess};

const ADMIN: ViewAccess = ViewAccess::Protected {
    roles: Some(RoleSet::of(&[Role::Admin])),
};

const STAFF: ViewAccess = ViewAccess::Protected {
    roles: Some(RoleSet::of(&[Role::Admin, Role::Docente])),
};

const ANY: ViewAccess = ViewAccess::AUTHENTICATED;

/// A routable view of the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub name: &'static str,
    /// Path pattern; `:name` segments capture a parameter.
    pub pattern: &'static str,
    pub access: ViewAccess,
}

const fn view(name: &'static str, pattern: &'static str, access: ViewAccess) -> View {
    View { name, pattern, access }
}

pub static VIEWS: &[View] = &[
    view("login", "/login", ViewAccess::GuestOnly),
    view("dashboard", "/", ANY),
    view("usuarios.list", "/usuarios", ADMIN),
    view("usuarios.create", "/usuarios/nuevo", ADMIN),
    view("usuarios.detail", "/usuarios/:id", ADMIN),
    view("usuarios.edit", "/usuarios/:id/editar", ADMIN),
    view("estudiantes.list", "/estudiantes", STAFF),
    view("estudiantes.create", "/estudiantes/nuevo", STAFF),
    view("estudiantes.detail", "/estudiantes/:id", STAFF),
    view("estudiantes.edit", "/estudiantes/:id/editar", STAFF),
    view("representantes.list", "/representantes", STAFF),
    view("representantes.create", "/representantes/nuevo", STAFF),
    view("representantes.detail", "/representantes/:id", STAFF),
    view("representantes.edit", "/representantes/:id/editar", STAFF),
    view("horarios.list", "/horarios", STAFF),
    view("horarios.create", "/horarios/nuevo", STAFF),
    view("horarios.detail", "/horarios/:id", STAFF),
    view("horarios.edit", "/horarios/:id/editar", STAFF),
    view("asistencias.list", "/asistencias", ANY),
    view("asistencias.create", "/asistencias/nueva", STAFF),
    view("asistencias.detail", "/asistencias/:id", ANY),
    view("asistencias.edit", "/asistencias/:id/editar", STAFF),
    view("notificaciones.list", "/notificaciones", STAFF),
    view("notificaciones.create", "/notificaciones/nueva", STAFF),
    view("notificaciones.detail", "/notificaciones/:id", STAFF),
];

/// A view matched against a concrete path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedView {
    pub view: &'static View,
    pub path: String,
    pub params: BTreeMap<&'static str, String>,
}

impl ResolvedView {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}

/// Strip query, fragment and trailing slashes; empty becomes `/`.
pub fn normalize(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Match `path` against `pattern`, returning captured params and the number
/// of static segments (higher wins between competing matches).
fn match_pattern(pattern: &'static str, path: &str) -> Option<(usize, BTreeMap<&'static str, String>)> {
    let pattern_segments = segments(pattern);
    let path_segments = segments(path);
    if pattern_segments.len() != path_segments.len() {
        return None;
    }

    let mut params = BTreeMap::new();
    let mut statics = 0;
    for (p, s) in pattern_segments.into_iter().zip(path_segments) {
        if let Some(name) = p.strip_prefix(':') {
            params.insert(name, s.to_string());
        } else if p == s {
            statics += 1;
        } else {
            return None;
        }
    }
    Some((statics, params))
}

/// Resolve `path` against [`VIEWS`].
pub fn resolve(path: &str) -> Option<ResolvedView> {
    resolve_in(VIEWS, path)
}

pub fn resolve_in(views: &'static [View], path: &str) -> Option<ResolvedView> {
    let path = normalize(path);
    views
        .iter()
        .filter_map(|v| match_pattern(v.pattern, &path).map(|(score, params)| (score, v, params)))
        .max_by_key(|(score, _, _)| *score)
        .map(|(_, view, params)| ResolvedView {
            view,
            path: path.clone(),
            params,
        })
}
