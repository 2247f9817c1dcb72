use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use log::info;

use crate::authz::factory::AuthzFactory;
use crate::authz::handler::AuthorizationHandler;
use crate::authz::holder::Subject;
use crate::authz::resolver::HandlerRegistry;

use super::config::ServerConfig;
use super::handler::{ConfigResources, FailureFormat, SubjectHandler};
use super::restful::{RestfulContext, RestfulServer, RouteEndpoint};

pub struct ServerFactory {
    cfg: ServerConfig,
}

impl ServerFactory {
    /// Handler keys guards can name in their `handler` option.
    pub const JSON_HANDLER: &'static str = "json";
    pub const TEXT_HANDLER: &'static str = "text";
    pub const DEFAULT_HANDLER: &'static str = "default";

    pub fn new(cfg: ServerConfig) -> Self {
        Self { cfg }
    }

    pub fn build_server(&self) -> Result<RestfulServer> {
        let ctx = self.build_context()?;

        let mut srv = RestfulServer::new(self.cfg.bind.clone(), ctx);
        if self.cfg.keep_alive_secs > 0 {
            srv.set_keep_alive_secs(self.cfg.keep_alive_secs);
        }
        if self.cfg.workers > 0 {
            srv.set_workers(self.cfg.workers);
        }

        Ok(srv)
    }

    pub fn build_context(&self) -> Result<Arc<RestfulContext>> {
        let subjects = Arc::new(SubjectHandler::index_subjects(&self.cfg.subjects));
        let resources = Arc::new(ConfigResources::new(self.cfg.resources.clone()));
        let default_handler = Arc::new(SubjectHandler::new(
            subjects.clone(),
            resources.clone(),
            FailureFormat::Json,
        ));

        let registry = self
            .build_registry(default_handler.clone(), subjects, resources)
            .context("init handler registry")?;
        let factory = AuthzFactory::new(registry.clone());

        let mut routes = HashMap::with_capacity(self.cfg.routes.len());
        for route in self.cfg.routes.iter() {
            for guard in route.guards.iter() {
                if let Some(name) = guard.options().handler.as_deref() {
                    if !registry.contains(name) {
                        bail!("route '{}' uses unknown handler '{name}'", route.path);
                    }
                }
            }

            let endpoint = Arc::new(RouteEndpoint::new(
                route.path.clone(),
                route.message.clone(),
                default_handler.clone(),
            ));
            let chain = factory
                .build_chain(&route.guards, endpoint)
                .with_context(|| format!("build guards for route '{}'", route.path))?;
            info!(
                "Route '{}' is protected by {} guard(s)",
                route.path,
                chain.guards().len()
            );
            routes.insert(route.path.clone(), chain);
        }

        Ok(Arc::new(RestfulContext::new(routes)))
    }

    fn build_registry(
        &self,
        default_handler: Arc<SubjectHandler>,
        subjects: Arc<HashMap<String, Subject>>,
        resources: Arc<ConfigResources>,
    ) -> Result<Arc<HandlerRegistry>> {
        let mut registry = HandlerRegistry::new();

        registry.register_shared(Self::JSON_HANDLER, default_handler.clone());
        registry.register(Self::TEXT_HANDLER, move || {
            let handler: Arc<dyn AuthorizationHandler> = Arc::new(SubjectHandler::new(
                subjects.clone(),
                resources.clone(),
                FailureFormat::Text,
            ));
            Ok(handler)
        });
        registry.register_abstract(Self::DEFAULT_HANDLER);

        registry.set_default(default_handler)?;
        Ok(Arc::new(registry))
    }
}
