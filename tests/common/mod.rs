#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use anyhow::{bail, Result};
use boltguard::authz::chain::{Chain, Next};
use boltguard::authz::context::RequestContext;
use boltguard::authz::guard::{Guard, GuardOptions};
use boltguard::authz::handler::{AuthorizationHandler, DynamicResourceHandler};
use boltguard::authz::holder::{PermissionHolder, Subject};
use boltguard::authz::resolver::HandlerRegistry;
use boltguard::authz::shell::GuardShell;
use boltguard::server::response::Response;
use log::{Level, LevelFilter, Log, Metadata, Record};
use once_cell::sync::Lazy;

/// Collects every log record so tests can assert on them.
///
/// Tests run in parallel, so assertions filter lines by a request path unique
/// to the test.
struct CaptureLogger {
    lines: Mutex<Vec<(Level, String)>>,
}

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

static LOGGER: Lazy<&'static CaptureLogger> = Lazy::new(|| {
    let logger: &'static CaptureLogger = Box::leak(Box::new(CaptureLogger {
        lines: Mutex::new(Vec::new()),
    }));
    log::set_logger(logger).unwrap();
    log::set_max_level(LevelFilter::Debug);
    logger
});

pub fn capture_logs() {
    Lazy::force(&LOGGER);
}

/// Log lines at `level` containing `needle`.
pub fn logged(level: Level, needle: &str) -> Vec<String> {
    LOGGER
        .lines
        .lock()
        .unwrap()
        .iter()
        .filter(|(l, line)| *l == level && line.contains(needle))
        .map(|(_, line)| line.clone())
        .collect()
}

/// A configurable handler standing in for an application.
#[derive(Default)]
pub struct TestHandler {
    pub tag: &'static str,
    pub subject: Option<Subject>,
    pub broken_hook: bool,
    pub require_login: bool,
    pub resources: Option<Arc<AllowList>>,
}

impl TestHandler {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            ..Default::default()
        }
    }

    pub fn with_subject(mut self, subject: Subject) -> Self {
        self.subject = Some(subject);
        self
    }

    pub fn with_resources(mut self, resources: AllowList) -> Self {
        self.resources = Some(Arc::new(resources));
        self
    }
}

impl AuthorizationHandler for TestHandler {
    fn permission_holder(&self, _ctx: &RequestContext) -> Option<Box<dyn PermissionHolder>> {
        self.subject
            .clone()
            .map(|s| Box::new(s) as Box<dyn PermissionHolder>)
    }

    fn on_access_failure(&self, _ctx: &RequestContext, content: Option<&str>) -> Result<Response> {
        if self.broken_hook {
            bail!("template engine is down");
        }
        let message = match content {
            Some(content) => format!("{} ({content})", self.tag),
            None => self.tag.to_string(),
        };
        Ok(Response::unauthorized(&message))
    }

    fn before_auth_check(&self, _ctx: &RequestContext) -> Option<Response> {
        if self.require_login {
            return Some(Response::text(StatusCode::UNAUTHORIZED, "login first"));
        }
        None
    }

    fn dynamic_resource_handler(&self) -> Option<Arc<dyn DynamicResourceHandler>> {
        self.resources
            .clone()
            .map(|r| r as Arc<dyn DynamicResourceHandler>)
    }
}

/// Allows the listed resource names and permission values.
#[derive(Default)]
pub struct AllowList {
    pub resources: HashSet<String>,
    pub values: HashSet<String>,
}

impl DynamicResourceHandler for AllowList {
    fn is_allowed(
        &self,
        name: &str,
        _meta: Option<&str>,
        _handler: &dyn AuthorizationHandler,
        _ctx: &RequestContext,
    ) -> Result<bool> {
        Ok(self.resources.contains(name))
    }

    fn check_permission(
        &self,
        value: &str,
        _handler: &dyn AuthorizationHandler,
        _ctx: &RequestContext,
    ) -> Result<bool> {
        Ok(self.values.contains(value))
    }
}

/// Registry with `handler` as the default.
pub fn registry(handler: TestHandler) -> Arc<HandlerRegistry> {
    let registry = HandlerRegistry::new();
    registry.set_default(Arc::new(handler)).unwrap();
    Arc::new(registry)
}

pub fn shell(registry: &Arc<HandlerRegistry>, options: GuardOptions) -> GuardShell {
    GuardShell::new(registry.clone(), options)
}

/// Wraps a guard and counts how often it actually executes.
pub struct Counted {
    inner: Arc<dyn Guard>,
    calls: AtomicUsize,
    trace: Option<Arc<Mutex<Vec<String>>>>,
}

impl Counted {
    pub fn new(inner: Arc<dyn Guard>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            calls: AtomicUsize::new(0),
            trace: None,
        })
    }

    pub fn traced(inner: Arc<dyn Guard>, trace: Arc<Mutex<Vec<String>>>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            calls: AtomicUsize::new(0),
            trace: Some(trace),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Guard for Counted {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn is_deferred(&self) -> bool {
        self.inner.is_deferred()
    }

    fn execute(&self, ctx: &mut RequestContext, next: Next<'_>) -> Result<Response> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(trace) = &self.trace {
            trace.lock().unwrap().push(self.inner.name().to_string());
        }
        self.inner.execute(ctx, next)
    }
}

/// Passes every request through, named so traces can tell guards apart.
pub struct PassGuard {
    pub name: &'static str,
    pub deferred: bool,
}

impl Guard for PassGuard {
    fn name(&self) -> &str {
        self.name
    }

    fn is_deferred(&self) -> bool {
        self.deferred
    }

    fn execute(&self, ctx: &mut RequestContext, next: Next<'_>) -> Result<Response> {
        next.run(ctx)
    }
}

/// Sets a mark, then lets the request continue.
pub struct MarkGuard {
    pub authorized: bool,
}

impl Guard for MarkGuard {
    fn name(&self) -> &str {
        "mark"
    }

    fn is_deferred(&self) -> bool {
        false
    }

    fn execute(&self, ctx: &mut RequestContext, next: Next<'_>) -> Result<Response> {
        if self.authorized {
            ctx.mark_authorized();
        } else {
            ctx.mark_unauthorized();
        }
        next.run(ctx)
    }
}

/// Endpoint counting the requests that reach it.
pub struct Reached(pub AtomicUsize);

impl Reached {
    pub fn new() -> Arc<Self> {
        Arc::new(Self(AtomicUsize::new(0)))
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl boltguard::authz::chain::Endpoint for Reached {
    fn handle(&self, _ctx: &mut RequestContext) -> Result<Response> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(Response::ok())
    }
}

pub fn call(chain: &Chain, uri: &str) -> Result<Response> {
    let mut ctx = RequestContext::new(TestRequest::with_uri(uri).to_http_request());
    chain.call(&mut ctx)
}
