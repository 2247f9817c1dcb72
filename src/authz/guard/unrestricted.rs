use anyhow::Result;

use crate::authz::chain::Next;
use crate::authz::context::RequestContext;
use crate::authz::shell::GuardShell;
use crate::server::response::Response;

use super::Guard;

/// Opens a route regardless of roles, overriding more general guards.
///
/// Only an unauthorized mark from a more specific guard still denies access.
/// No permission holder is needed.
pub struct UnrestrictedGuard {
    shell: GuardShell,
}

impl UnrestrictedGuard {
    pub fn new(shell: GuardShell) -> Self {
        Self { shell }
    }
}

impl Guard for UnrestrictedGuard {
    fn name(&self) -> &str {
        "unrestricted"
    }

    fn is_deferred(&self) -> bool {
        self.shell.is_deferred()
    }

    fn execute(&self, ctx: &mut RequestContext, next: Next<'_>) -> Result<Response> {
        if ctx.is_unauthorized() {
            let handler = self.shell.resolve_handler()?;
            return Ok(self.shell.on_access_failure(handler.as_ref(), ctx));
        }

        ctx.mark_authorized();
        next.run(ctx)
    }
}
