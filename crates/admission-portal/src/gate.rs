//! Routing guard deciding whether a protected route may render for the
//! current session.

use std::sync::Arc;

use tracing::warn;

use crate::session::{Role, Session, SessionStorage, SessionStore};

/// Outcome of evaluating a protected route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Render the protected subtree unchanged.
    Grant,
    /// Send the user to the login entry point. `from` carries the originally
    /// requested location when it is worth returning to after login; a
    /// role mismatch drops it, matching the portal's behavior of treating
    /// forbidden access like a fresh login.
    RedirectToLogin { from: Option<String> },
}

/// Role-gated navigation guard. Holds the process-wide session store by
/// reference and re-reads it on every evaluation, so a session cleared
/// elsewhere takes effect on the next navigation attempt.
pub struct AccessGate<S> {
    store: Arc<SessionStore<S>>,
}

impl<S: SessionStorage> AccessGate<S> {
    pub fn new(store: Arc<SessionStore<S>>) -> Self {
        Self { store }
    }

    /// Decide synchronously whether `requested` may render given the roles
    /// it requires. Nothing is cached between calls.
    pub fn evaluate(&self, required: &[Role], requested: &str) -> RouteDecision {
        match self.store.read() {
            Session::Anonymous => RouteDecision::RedirectToLogin {
                from: Some(requested.to_string()),
            },
            Session::Authenticated { user, .. } => {
                if required.contains(&user.role) {
                    RouteDecision::Grant
                } else {
                    warn!(
                        role = user.role.label(),
                        route = requested,
                        "access denied: role not allowed for route"
                    );
                    RouteDecision::RedirectToLogin { from: None }
                }
            }
        }
    }
}
