mod dynamic;
mod pattern;
mod present;
mod restrict;
mod unrestricted;

pub use dynamic::DynamicGuard;
pub use pattern::{PatternGuard, PatternType};
pub use present::{Presence, SubjectPresenceGuard};
pub use restrict::{RestrictGuard, RestrictionsGuard, RoleMatch};
pub use unrestricted::UnrestrictedGuard;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::server::response::Response;

use super::chain::Next;
use super::context::RequestContext;

/// A single authorization check attached to a route.
///
/// Guards are shared between requests; all per-request state goes through the
/// [`RequestContext`].
pub trait Guard: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the guard hands its decision to a guard further down the chain.
    fn is_deferred(&self) -> bool;

    /// Runs the check. On success the guard calls `next` to let the request
    /// through, otherwise it returns the access failure response.
    ///
    /// # Arguments
    /// * `ctx` - The request, with the marks set by the guards run so far
    /// * `next` - The rest of the chain
    ///
    /// # Returns
    /// * The response for the request, or a configuration error
    fn execute(&self, ctx: &mut RequestContext, next: Next<'_>) -> Result<Response>;
}

/// Options every guard accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardOptions {
    /// Key of the authorization handler to use. Uses the default handler
    /// when empty.
    #[serde(default)]
    pub handler: Option<String>,

    /// Content type hint passed to the access failure hook.
    #[serde(default)]
    pub content: Option<String>,

    #[serde(default)]
    pub deferred: bool,
}

impl GuardOptions {
    pub fn deferred() -> Self {
        Self {
            deferred: true,
            ..Default::default()
        }
    }

    pub fn with_handler(mut self, handler: impl ToString) -> Self {
        self.handler = Some(handler.to_string());
        self
    }

    pub fn with_content(mut self, content: impl ToString) -> Self {
        self.content = Some(content.to_string());
        self
    }
}
