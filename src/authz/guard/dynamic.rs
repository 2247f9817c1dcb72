use anyhow::Result;

use crate::authz::chain::Next;
use crate::authz::context::RequestContext;
use crate::authz::shell::GuardShell;
use crate::error::ConfigurationError;
use crate::server::response::Response;

use super::Guard;

/// Delegates the check to the handler's dynamic resource handler.
pub struct DynamicGuard {
    shell: GuardShell,
    resource: String,
    meta: Option<String>,
}

impl DynamicGuard {
    /// # Arguments
    /// * `shell` - Handler resolution and failure rendering for the guard
    /// * `resource` - Resource name passed to the dynamic resource handler
    /// * `meta` - Optional extra data for the dynamic resource handler
    pub fn new(shell: GuardShell, resource: String, meta: Option<String>) -> Self {
        Self {
            shell,
            resource,
            meta,
        }
    }
}

impl Guard for DynamicGuard {
    fn name(&self) -> &str {
        "dynamic"
    }

    fn is_deferred(&self) -> bool {
        self.shell.is_deferred()
    }

    fn execute(&self, ctx: &mut RequestContext, next: Next<'_>) -> Result<Response> {
        self.shell.authorize(ctx, next, |handler, ctx| {
            let drh = handler.dynamic_resource_handler().ok_or_else(|| {
                ConfigurationError::MissingDynamicResourceHandler(self.resource.clone())
            })?;
            drh.is_allowed(&self.resource, self.meta.as_deref(), handler, ctx)
        })
    }
}
