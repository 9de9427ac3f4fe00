//! Session identity for cache service calls.
//!
//! Every prune runs inside its own session: a freshly generated identifier
//! plus the namespace label the cache service uses to keep this tool's
//! records apart from other callers.

use uuid::Uuid;

/// Namespace label sent with every cache service call unless configured.
pub const DEFAULT_NAMESPACE: &str = "buildkit";

/// Per-invocation session identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionContext {
    session_id: String,
    namespace: String,
}

impl SessionContext {
    /// Creates a session with a generated identifier.
    #[must_use]
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            session_id: Uuid::new_v4().simple().to_string(),
            namespace: namespace.into(),
        }
    }

    /// Returns the session identifier.
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Returns the namespace label.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}
