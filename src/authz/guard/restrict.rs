use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::authz::chain::Next;
use crate::authz::context::RequestContext;
use crate::authz::roles::{has_all_roles, has_any_role};
use crate::authz::shell::GuardShell;
use crate::server::response::Response;

use super::Guard;

/// How the roles of a [`RestrictGuard`] are matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoleMatch {
    /// The holder needs every role.
    #[default]
    #[serde(rename = "all")]
    All,
    /// The holder needs at least one role.
    #[serde(rename = "any")]
    Any,
}

/// Lets a request through if its permission holder has the configured roles.
pub struct RestrictGuard {
    shell: GuardShell,
    roles: Vec<String>,
    role_match: RoleMatch,
}

impl RestrictGuard {
    /// Creates a new instance of RestrictGuard
    ///
    /// # Arguments
    /// * `shell` - Handler resolution and failure rendering for the guard
    /// * `roles` - Role names the permission holder is checked against
    /// * `role_match` - Whether all or any of `roles` are required
    pub fn new(shell: GuardShell, roles: Vec<String>, role_match: RoleMatch) -> Self {
        Self {
            shell,
            roles,
            role_match,
        }
    }
}

impl Guard for RestrictGuard {
    fn name(&self) -> &str {
        "restrict"
    }

    fn is_deferred(&self) -> bool {
        self.shell.is_deferred()
    }

    fn execute(&self, ctx: &mut RequestContext, next: Next<'_>) -> Result<Response> {
        self.shell.authorize(ctx, next, |handler, ctx| {
            let holder = self.shell.permission_holder(ctx, handler);
            let holder = holder.as_deref();
            Ok(match self.role_match {
                RoleMatch::All => has_all_roles(holder, &self.roles),
                RoleMatch::Any => has_any_role(holder, &self.roles),
            })
        })
    }
}

/// Lets a request through if its permission holder has every role of at least
/// one group.
pub struct RestrictionsGuard {
    shell: GuardShell,
    groups: Vec<Vec<String>>,
}

impl RestrictionsGuard {
    /// Creates a new instance of RestrictionsGuard
    ///
    /// # Arguments
    /// * `shell` - Handler resolution and failure rendering for the guard
    /// * `groups` - Role groups; an empty list denies every request
    pub fn new(shell: GuardShell, groups: Vec<Vec<String>>) -> Self {
        Self { shell, groups }
    }
}

impl Guard for RestrictionsGuard {
    fn name(&self) -> &str {
        "restrictions"
    }

    fn is_deferred(&self) -> bool {
        self.shell.is_deferred()
    }

    fn execute(&self, ctx: &mut RequestContext, next: Next<'_>) -> Result<Response> {
        self.shell.authorize(ctx, next, |handler, ctx| {
            let holder = self.shell.permission_holder(ctx, handler);
            let holder = holder.as_deref();
            Ok(holder.is_some() && self.groups.iter().any(|group| has_all_roles(holder, group)))
        })
    }
}
