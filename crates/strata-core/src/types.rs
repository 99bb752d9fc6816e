//! Identity newtypes for applications, environments and callers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the environment every application falls back to.
pub const DEFAULT_ENVIRONMENT: &str = "default";

/// Application identity as owned by the platform metadata store.
///
/// The numeric ID survives renames and name reuse, which is why
/// soft-deleted configuration is filed under `{name}-{id}`.
///
/// # Example
///
/// ```
/// use strata_core::Application;
///
/// let app = Application::new("checkout", 42);
/// assert_eq!(app.name(), "checkout");
/// assert_eq!(app.to_string(), "checkout#42");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Application {
    name: String,
    id: u64,
}

impl Application {
    pub fn new(name: impl Into<String>, id: u64) -> Self {
        Self {
            name: name.into(),
            id,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

impl fmt::Display for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.id)
    }
}

/// Deployment environment name.
///
/// An empty name is normalized to [`DEFAULT_ENVIRONMENT`].
///
/// ```
/// use strata_core::Environment;
///
/// assert!(Environment::new("").is_default());
/// assert_eq!(Environment::new("staging").as_str(), "staging");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Environment(String);

impl Environment {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        if name.is_empty() {
            Self::default_environment()
        } else {
            Self(name)
        }
    }

    pub fn default_environment() -> Self {
        Self(DEFAULT_ENVIRONMENT.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_default(&self) -> bool {
        self.0 == DEFAULT_ENVIRONMENT
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::default_environment()
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Environment {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Environment {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// The caller on whose behalf a mutation is performed.
///
/// Passed explicitly into every mutating operation and recorded in
/// commit messages for audit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
}

impl Actor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_normalization() {
        assert_eq!(Environment::new(""), Environment::default());
        assert_eq!(Environment::from("").as_str(), "default");
        assert!(!Environment::from("prod").is_default());
        assert!(Environment::from("default").is_default());
    }

    #[test]
    fn test_actor_serialization() {
        let actor = Actor::new("alice");
        assert_eq!(serde_json::to_string(&actor).unwrap(), r#"{"name":"alice"}"#);

        let actor = actor.with_email("alice@example.com");
        assert_eq!(actor.email(), Some("alice@example.com"));
        assert_eq!(actor.to_string(), "alice");
    }
}
