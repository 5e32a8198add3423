use serde::{Deserialize, Serialize};

use puntualcheck_core::UserId;

use crate::Role;

/// Profile of the authenticated user.
///
/// Serialized with the backend's field names (`nombre`, `correo`, `rol`,
/// `activo`), which is also the format persisted under the `user` key.
/// Unknown fields such as `passwordHash` are ignored on read and never written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,

    #[serde(rename = "nombre")]
    pub display_name: String,

    #[serde(rename = "correo")]
    pub email: String,

    #[serde(rename = "rol")]
    pub role: Role,

    #[serde(rename = "activo", default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Identity {
    pub fn new(
        id: UserId,
        display_name: impl Into<String>,
        email: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            email: email.into(),
            role,
            active: true,
        }
    }

    /// Initial shown in the avatar of the authenticated shell.
    pub fn initial(&self) -> char {
        self.display_name
            .chars()
            .next()
            .and_then(|c| c.to_uppercase().next())
            .unwrap_or('U')
    }

    /// Apply a partial update. Id and role are not changeable here.
    pub fn apply(&mut self, update: &IdentityUpdate) {
        if let Some(name) = &update.display_name {
            self.display_name = name.clone();
        }
        if let Some(email) = &update.email {
            self.email = email.clone();
        }
        if let Some(active) = update.active {
            self.active = active;
        }
    }
}

/// Partial identity update merged by `SessionStore::update_identity`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityUpdate {
    #[serde(rename = "nombre", default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(rename = "correo", default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(rename = "activo", default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// Data for registering a new account (auto-login follows on success).
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAccount {
    #[serde(rename = "nombre")]
    pub display_name: String,

    #[serde(rename = "correo")]
    pub email: String,

    #[serde(rename = "passwordHash")]
    pub secret: String,

    #[serde(rename = "rol")]
    pub role: Role,

    #[serde(rename = "activo")]
    pub active: bool,
}

impl core::fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NewAccount")
            .field("display_name", &self.display_name)
            .field("email", &self.email)
            .field("secret", &"<redacted>")
            .field("role", &self.role)
            .field("active", &self.active)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend_record() {
        let raw = r#"{"id":1,"rol":"ADMIN","nombre":"Ana","correo":"a@x.com","activo":true,"passwordHash":"x"}"#;
        let identity: Identity = serde_json::from_str(raw).unwrap();
        assert_eq!(identity.id, UserId::new(1));
        assert_eq!(identity.role, Role::Admin);
        assert_eq!(identity.display_name, "Ana");

        let back = serde_json::to_string(&identity).unwrap();
        assert!(!back.contains("passwordHash"));
    }

    #[test]
    fn missing_active_defaults_true() {
        let raw = r#"{"id":3,"rol":"DOCENTE","nombre":"Luis","correo":"l@x.com"}"#;
        let identity: Identity = serde_json::from_str(raw).unwrap();
        assert!(identity.active);
    }

    #[test]
    fn unknown_role_is_rejected() {
        let raw = r#"{"id":3,"rol":"JEFE","nombre":"Luis","correo":"l@x.com"}"#;
        assert!(serde_json::from_str::<Identity>(raw).is_err());
    }

    #[test]
    fn apply_keeps_id_and_role() {
        let mut identity = Identity::new(UserId::new(5), "ana", "a@x.com", Role::Estudiante);
        identity.apply(&IdentityUpdate {
            display_name: Some("Ana María".into()),
            email: None,
            active: Some(false),
        });
        assert_eq!(identity.display_name, "Ana María");
        assert_eq!(identity.email, "a@x.com");
        assert!(!identity.active);
        assert_eq!(identity.role, Role::Estudiante);
        assert_eq!(identity.initial(), 'A');
    }

    #[test]
    fn initial_falls_back() {
        let identity = Identity::new(UserId::new(5), "", "a@x.com", Role::Admin);
        assert_eq!(identity.initial(), 'U');
    }

    #[test]
    fn new_account_debug_hides_secret() {
        let account = NewAccount {
            display_name: "Ana".into(),
            email: "a@x.com".into(),
            secret: "hunter2".into(),
            role: Role::Docente,
            active: true,
        };
        assert!(!format!("{account:?}").contains("hunter2"));
    }
}
