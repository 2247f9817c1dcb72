use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use actix_web::web::{self, Data};
use actix_web::{App, HttpRequest, HttpResponse, HttpServer};
use anyhow::{Context, Result};
use log::{debug, error, info};
use sd_notify::NotifyState;

use crate::authz::chain::{Chain, Endpoint};
use crate::authz::context::RequestContext;
use crate::types::route::RouteResponse;

use super::handler::SubjectHandler;
use super::response::{self, Response};

pub struct RestfulServer {
    ctx: Arc<RestfulContext>,

    keep_alive_secs: Option<u64>,
    workers: Option<u64>,

    bind: String,
}

/// Guard chains of the configured routes, keyed by path.
pub struct RestfulContext {
    routes: HashMap<String, Chain>,
}

impl RestfulContext {
    pub fn new(routes: HashMap<String, Chain>) -> Self {
        Self { routes }
    }

    /// Runs the request through the guard chain of its route.
    ///
    /// Configuration errors raised by the guards end here: they are logged
    /// and answered with a server error.
    pub fn dispatch(&self, req: HttpRequest) -> Response {
        let path = req.path().trim_end_matches('/');
        let path = if path.is_empty() { "/" } else { path };
        let chain = match self.routes.get(path) {
            Some(chain) => chain,
            None => {
                debug!("No route to {} {}", req.method(), req.path());
                return Response::not_found();
            }
        };

        let mut ctx = RequestContext::new(req);
        match chain.call(&mut ctx) {
            Ok(resp) => resp,
            Err(e) => {
                error!("Authorize request [{}] failed: {e:#}", ctx.target());
                Response::error(response::CONFIG_ERROR)
            }
        }
    }
}

/// The endpoint behind a configured route.
pub struct RouteEndpoint {
    route: String,
    message: String,
    subjects: Arc<SubjectHandler>,
}

impl RouteEndpoint {
    pub fn new(route: String, message: String, subjects: Arc<SubjectHandler>) -> Self {
        Self {
            route,
            message,
            subjects,
        }
    }
}

impl Endpoint for RouteEndpoint {
    fn handle(&self, ctx: &mut RequestContext) -> Result<Response> {
        let subject = self.subjects.find_subject(ctx).map(|s| s.name.clone());
        Ok(Response::json(RouteResponse {
            route: self.route.clone(),
            subject,
            message: self.message.clone(),
        }))
    }
}

impl RestfulServer {
    pub fn new(bind: String, ctx: Arc<RestfulContext>) -> Self {
        Self {
            ctx,
            keep_alive_secs: None,
            workers: None,
            bind,
        }
    }

    pub fn set_keep_alive_secs(&mut self, keep_alive_secs: u64) {
        self.keep_alive_secs = Some(keep_alive_secs);
    }

    pub fn set_workers(&mut self, workers: u64) {
        self.workers = Some(workers);
    }

    pub async fn run(self) -> Result<()> {
        let ctx = self.ctx.clone();
        let mut srv = HttpServer::new(move || {
            App::new()
                .app_data(Data::new(ctx.clone()))
                .default_service(web::route().to(Self::handle_route))
        });

        info!("Binding to http://{}", self.bind);
        srv = srv.bind(&self.bind).context("bind server")?;

        if let Some(keep_alive) = self.keep_alive_secs {
            srv = srv.keep_alive(Duration::from_secs(keep_alive));
        }
        if let Some(workers) = self.workers {
            srv = srv.workers(workers as usize);
        }

        sd_notify::notify(true, &[NotifyState::Ready]).context("notify systemd")?;
        info!("Starting restful server");
        srv.run().await.context("run server")?;

        info!("Server stopped by user");
        Ok(())
    }

    async fn handle_route(req: HttpRequest, ctx: Data<Arc<RestfulContext>>) -> HttpResponse {
        ctx.dispatch(req).into()
    }
}
