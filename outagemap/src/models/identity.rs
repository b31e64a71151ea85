//! Acting user identity

use serde::{Deserialize, Serialize};

/// A signed-in user as reported by the identity provider
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Identity {
    /// Opaque user identifier
    pub id: String,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,
}

impl Identity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: None,
            email: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Display name, falling back to the email address
    pub fn display_name(&self) -> Option<&str> {
        self.display_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .or(self.email.as_deref())
    }
}

/// Source of the current signed-in user. Read-only.
pub trait IdentityProvider: Send + Sync {
    fn current_user(&self) -> Option<Identity>;
}

/// Identity provider holding a fixed user (or nobody)
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityProvider {
    identity: Option<Identity>,
}

impl StaticIdentityProvider {
    pub fn signed_in(identity: Identity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    pub fn anonymous() -> Self {
        Self { identity: None }
    }
}

impl IdentityProvider for StaticIdentityProvider {
    fn current_user(&self) -> Option<Identity> {
        self.identity.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_falls_back_to_email() {
        let identity = Identity::new("u1").with_email("ana@example.com");
        assert_eq!(identity.display_name(), Some("ana@example.com"));

        let identity = identity.with_display_name("Ana");
        assert_eq!(identity.display_name(), Some("Ana"));
    }

    #[test]
    fn test_static_provider() {
        assert!(StaticIdentityProvider::anonymous().current_user().is_none());
        let provider = StaticIdentityProvider::signed_in(Identity::new("u1"));
        assert_eq!(provider.current_user().map(|i| i.id), Some("u1".to_string()));
    }
}
