use std::sync::Arc;

use anyhow::Result;
use log::{error, warn};

use crate::server::response::{self, Response};

use super::chain::Next;
use super::context::RequestContext;
use super::guard::GuardOptions;
use super::handler::AuthorizationHandler;
use super::holder::PermissionHolder;
use super::resolver::HandlerRegistry;

/// Plumbing shared by every guard: finding the handler, fetching the
/// permission holder, and rendering access failures.
pub struct GuardShell {
    registry: Arc<HandlerRegistry>,
    options: GuardOptions,
}

impl GuardShell {
    /// Creates a new shell
    ///
    /// # Arguments
    /// * `registry` - Handlers the guard's `handler` option is resolved against
    /// * `options` - Options of the guard owning the shell
    pub fn new(registry: Arc<HandlerRegistry>, options: GuardOptions) -> Self {
        Self { registry, options }
    }

    pub fn is_deferred(&self) -> bool {
        self.options.deferred
    }

    pub fn resolve_handler(&self) -> Result<Arc<dyn AuthorizationHandler>> {
        self.registry.resolve(self.options.handler.as_deref())
    }

    /// Logs the denied request and renders it with the handler's failure hook.
    ///
    /// # Arguments
    /// * `handler` - The handler rendering the failure
    /// * `ctx` - The denied request
    ///
    /// # Returns
    /// * The hook's response, or a generic server error if the hook fails
    pub fn on_access_failure(
        &self,
        handler: &dyn AuthorizationHandler,
        ctx: &RequestContext,
    ) -> Response {
        warn!("Access failure on [{}]", ctx.target());

        match handler.on_access_failure(ctx, self.options.content.as_deref()) {
            Ok(resp) => resp,
            Err(e) => {
                warn!("Error when invoking access failure hook: {e:#}");
                Response::error(response::AUTHZ_ERROR)
            }
        }
    }

    /// Fetches the permission holder, logging an error when there is none.
    pub fn permission_holder(
        &self,
        ctx: &RequestContext,
        handler: &dyn AuthorizationHandler,
    ) -> Option<Box<dyn PermissionHolder>> {
        let holder = handler.permission_holder(ctx);
        if holder.is_none() {
            error!(
                "Access to [{}] requires a permission holder, but none is present",
                ctx.target()
            );
        }
        holder
    }

    /// The decision template of the checking guards.
    ///
    /// Marks win over `check`: an unauthorized mark fails the request, and an
    /// authorized mark set by a more specific guard lets it through unchecked.
    ///
    /// # Arguments
    /// * `ctx` - The request being authorized
    /// * `next` - The rest of the chain, run when the request is let through
    /// * `check` - The guard's own check, given the resolved handler
    ///
    /// # Returns
    /// * The response of the rest of the chain, or the access failure response
    /// * A [`ConfigurationError`](crate::error::ConfigurationError) if the
    ///   handler cannot be resolved
    pub fn authorize<F>(&self, ctx: &mut RequestContext, next: Next<'_>, check: F) -> Result<Response>
    where
        F: FnOnce(&dyn AuthorizationHandler, &RequestContext) -> Result<bool>,
    {
        if ctx.is_unauthorized() {
            let handler = self.resolve_handler()?;
            return Ok(self.on_access_failure(handler.as_ref(), ctx));
        }
        if ctx.is_authorized() {
            return next.run(ctx);
        }

        let handler = self.resolve_handler()?;
        if let Some(resp) = handler.before_auth_check(ctx) {
            return Ok(resp);
        }

        if check(handler.as_ref(), ctx)? {
            ctx.mark_authorized();
            next.run(ctx)
        } else {
            ctx.mark_unauthorized();
            Ok(self.on_access_failure(handler.as_ref(), ctx))
        }
    }
}
