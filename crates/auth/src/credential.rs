use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque bearer token authorizing API calls.
///
/// The value is never interpreted client-side; `Debug` is redacted so a
/// credential cannot leak through `tracing` fields.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Mint a fresh random token (used by directory-backed authenticators).
    pub fn generate() -> Self {
        Self(format!("pc-{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Value for an `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl core::fmt::Debug for Credential {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_is_redacted() {
        let c = Credential::new("t1");
        assert_eq!(format!("{c:?}"), "Credential(<redacted>)");
        assert_eq!(c.bearer(), "Bearer t1");
    }

    #[test]
    fn generated_tokens_differ() {
        let a = Credential::generate();
        let b = Credential::generate();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("pc-"));
    }
}
