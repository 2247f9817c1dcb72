use std::sync::Arc;

use anyhow::Result;

use crate::server::response::Response;

use super::context::RequestContext;
use super::holder::PermissionHolder;

/// Application supplied hooks the guards call into.
///
/// Implementations are shared between requests and must be thread-safe.
pub trait AuthorizationHandler: Send + Sync {
    /// Looks up the permission holder behind the request, if any.
    fn permission_holder(&self, ctx: &RequestContext) -> Option<Box<dyn PermissionHolder>>;

    /// Renders the response for a denied request.
    ///
    /// # Arguments
    /// * `ctx` - The denied request
    /// * `content` - The content type hint configured on the guard, if any
    fn on_access_failure(&self, ctx: &RequestContext, content: Option<&str>) -> Result<Response>;

    /// Called before a guard runs its check.
    ///
    /// # Returns
    /// * `Some(response)` to end the request with that response, `None` to
    ///   run the check
    fn before_auth_check(&self, _ctx: &RequestContext) -> Option<Response> {
        None
    }

    fn dynamic_resource_handler(&self) -> Option<Arc<dyn DynamicResourceHandler>> {
        None
    }
}

/// Application defined checks for the `dynamic` guard and custom patterns.
pub trait DynamicResourceHandler: Send + Sync {
    /// Decides whether the request may access the named resource.
    ///
    /// # Arguments
    /// * `name` - The resource configured on the dynamic guard
    /// * `meta` - Extra data configured on the dynamic guard
    /// * `handler` - The handler the guard resolved
    /// * `ctx` - The request being authorized
    fn is_allowed(
        &self,
        name: &str,
        meta: Option<&str>,
        handler: &dyn AuthorizationHandler,
        ctx: &RequestContext,
    ) -> Result<bool>;

    /// Decides whether the request satisfies a custom permission pattern.
    fn check_permission(
        &self,
        value: &str,
        handler: &dyn AuthorizationHandler,
        ctx: &RequestContext,
    ) -> Result<bool>;
}
