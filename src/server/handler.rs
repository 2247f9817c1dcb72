use std::collections::HashMap;
use std::sync::Arc;

use actix_web::http::header;
use actix_web::http::StatusCode;
use anyhow::Result;
use log::{debug, warn};

use crate::authz::context::RequestContext;
use crate::authz::handler::{AuthorizationHandler, DynamicResourceHandler};
use crate::authz::holder::{PermissionHolder, Subject};
use crate::authz::roles::has_any_role;

use super::config::SubjectConfig;
use super::response::Response;

/// How access failures are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureFormat {
    Json,
    Text,
}

/// Authorization handler backed by the subjects of the server config.
///
/// The permission holder is found through the `Authorization: Bearer <token>`
/// header of the request.
pub struct SubjectHandler {
    subjects: Arc<HashMap<String, Subject>>,
    resources: Arc<ConfigResources>,
    format: FailureFormat,
}

impl SubjectHandler {
    pub const TEXT_CONTENT: &'static str = "text";

    pub fn new(
        subjects: Arc<HashMap<String, Subject>>,
        resources: Arc<ConfigResources>,
        format: FailureFormat,
    ) -> Self {
        Self {
            subjects,
            resources,
            format,
        }
    }

    pub fn index_subjects(subjects: &[SubjectConfig]) -> HashMap<String, Subject> {
        subjects
            .iter()
            .map(|s| (s.token.clone(), s.subject.clone()))
            .collect()
    }

    pub fn find_subject(&self, ctx: &RequestContext) -> Option<&Subject> {
        let token = Self::bearer_token(ctx)?;
        let subject = self.subjects.get(token);
        if subject.is_none() {
            debug!("Unknown bearer token on [{}]", ctx.target());
        }
        subject
    }

    fn bearer_token(ctx: &RequestContext) -> Option<&str> {
        let value = ctx
            .request()
            .headers()
            .get(header::AUTHORIZATION)?
            .to_str()
            .ok()?;

        let fields = value.split_whitespace().collect::<Vec<&str>>();
        if fields.len() != 2 || !fields[0].eq_ignore_ascii_case("bearer") {
            return None;
        }
        Some(fields[1])
    }
}

impl AuthorizationHandler for SubjectHandler {
    fn permission_holder(&self, ctx: &RequestContext) -> Option<Box<dyn PermissionHolder>> {
        self.find_subject(ctx)
            .map(|s| Box::new(s.clone()) as Box<dyn PermissionHolder>)
    }

    fn on_access_failure(&self, ctx: &RequestContext, content: Option<&str>) -> Result<Response> {
        let message = format!("access to [{}] denied", ctx.request().path());
        let format = match content {
            Some(Self::TEXT_CONTENT) => FailureFormat::Text,
            Some(_) => FailureFormat::Json,
            None => self.format,
        };
        Ok(match format {
            FailureFormat::Json => Response::unauthorized(&message),
            FailureFormat::Text => Response::text(StatusCode::FORBIDDEN, message),
        })
    }

    fn dynamic_resource_handler(&self) -> Option<Arc<dyn DynamicResourceHandler>> {
        Some(self.resources.clone())
    }
}

/// Dynamic resources declared in the server config.
pub struct ConfigResources {
    resources: HashMap<String, Vec<String>>,
}

impl ConfigResources {
    pub fn new(resources: HashMap<String, Vec<String>>) -> Self {
        Self { resources }
    }

    /// A permission ending with `*` grants every value it is a prefix of.
    fn permission_matches(permission: &str, value: &str) -> bool {
        match permission.strip_suffix('*') {
            Some(prefix) => value.starts_with(prefix),
            None => permission == value,
        }
    }
}

impl DynamicResourceHandler for ConfigResources {
    fn is_allowed(
        &self,
        name: &str,
        meta: Option<&str>,
        handler: &dyn AuthorizationHandler,
        ctx: &RequestContext,
    ) -> Result<bool> {
        debug!("Check dynamic resource '{name}', meta: {meta:?}");
        let roles = match self.resources.get(name) {
            Some(roles) => roles,
            None => {
                warn!("Dynamic resource '{name}' is not declared, deny access");
                return Ok(false);
            }
        };

        let holder = handler.permission_holder(ctx);
        Ok(has_any_role(holder.as_deref(), roles))
    }

    fn check_permission(
        &self,
        value: &str,
        handler: &dyn AuthorizationHandler,
        ctx: &RequestContext,
    ) -> Result<bool> {
        let holder = match handler.permission_holder(ctx) {
            Some(holder) => holder,
            None => return Ok(false),
        };
        Ok(holder
            .permissions()
            .iter()
            .any(|p| Self::permission_matches(p, value)))
    }
}
