use core::str::FromStr;

use serde::{Deserialize, Serialize};

use puntualcheck_core::DomainError;

/// Role of a console user.
///
/// Closed set with no hierarchy: `ADMIN` does not implicitly hold `DOCENTE`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Docente,
    Representante,
    Estudiante,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Admin,
        Role::Docente,
        Role::Representante,
        Role::Estudiante,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Docente => "DOCENTE",
            Role::Representante => "REPRESENTANTE",
            Role::Estudiante => "ESTUDIANTE",
        }
    }

    /// Human label shown in role pickers.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Administrador",
            Role::Docente => "Docente",
            Role::Representante => "Representante",
            Role::Estudiante => "Estudiante",
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Role::Admin => 1 << 0,
            Role::Docente => 1 << 1,
            Role::Representante => 1 << 2,
            Role::Estudiante => 1 << 3,
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::validation(format!("unknown role '{s}'")))
    }
}

/// A set of roles required by a view or an action.
///
/// Membership is a flat containment check; see [`RoleSet::contains`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct RoleSet(u8);

impl RoleSet {
    pub const EMPTY: RoleSet = RoleSet(0);
    pub const ALL: RoleSet = RoleSet::of(&Role::ALL);

    pub const fn of(roles: &[Role]) -> Self {
        let mut bits = 0u8;
        let mut i = 0;
        while i < roles.len() {
            bits |= roles[i].bit();
            i += 1;
        }
        Self(bits)
    }

    pub const fn contains(&self, role: Role) -> bool {
        self.0 & role.bit() != 0
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn insert(&mut self, role: Role) {
        self.0 |= role.bit();
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        Role::ALL.into_iter().filter(|r| self.contains(*r))
    }
}

impl core::fmt::Debug for RoleSet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl From<Role> for RoleSet {
    fn from(role: Role) -> Self {
        Self(role.bit())
    }
}

impl<const N: usize> From<[Role; N]> for RoleSet {
    fn from(roles: [Role; N]) -> Self {
        Self::of(&roles)
    }
}

impl From<&[Role]> for RoleSet {
    fn from(roles: &[Role]) -> Self {
        Self::of(roles)
    }
}

impl From<&Vec<Role>> for RoleSet {
    fn from(roles: &Vec<Role>) -> Self {
        Self::of(roles)
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        let mut set = RoleSet::EMPTY;
        for role in iter {
            set.insert(role);
        }
        set
    }
}
