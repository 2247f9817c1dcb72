use std::sync::Arc;

use anyhow::Result;

use crate::server::response::Response;

use super::context::RequestContext;
use super::deferral::{self, Decision};
use super::guard::Guard;
use super::state::DeferredGuard;

/// The handler a guard chain protects.
pub trait Endpoint: Send + Sync {
    fn handle(&self, ctx: &mut RequestContext) -> Result<Response>;
}

impl<F> Endpoint for F
where
    F: Fn(&mut RequestContext) -> Result<Response> + Send + Sync,
{
    fn handle(&self, ctx: &mut RequestContext) -> Result<Response> {
        self(ctx)
    }
}

/// Guards stacked in front of an endpoint, most general first.
///
/// Controller level guards come before method level guards. A guard's
/// position is its level: marks set by a more specific guard override a more
/// general one, never the other way round.
pub struct Chain {
    guards: Vec<Arc<dyn Guard>>,
    endpoint: Arc<dyn Endpoint>,
}

impl Chain {
    /// Creates a new chain
    ///
    /// # Arguments
    /// * `guards` - Guards ordered from the most general to the most specific
    /// * `endpoint` - The handler reached once every guard lets the request through
    pub fn new(guards: Vec<Arc<dyn Guard>>, endpoint: Arc<dyn Endpoint>) -> Self {
        Self { guards, endpoint }
    }

    pub fn guards(&self) -> &[Arc<dyn Guard>] {
        &self.guards
    }

    /// Runs the request through the chain. Called once per request.
    pub fn call(&self, ctx: &mut RequestContext) -> Result<Response> {
        Next {
            guards: &self.guards,
            pos: 0,
            resumed: None,
            endpoint: self.endpoint.as_ref(),
        }
        .run(ctx)
    }
}

/// The rest of a chain, handed to a guard so it can let the request through.
pub struct Next<'a> {
    guards: &'a [Arc<dyn Guard>],
    pos: usize,
    /// A deferred guard that completes before `guards[pos]`.
    resumed: Option<DeferredGuard>,
    endpoint: &'a dyn Endpoint,
}

impl<'a> Next<'a> {
    /// Passes the request to the next link of the chain.
    pub fn run(mut self, ctx: &mut RequestContext) -> Result<Response> {
        if let Some(deferred) = self.resumed.take() {
            return self.execute_at(&deferred.guard, deferred.level, ctx);
        }

        let guards = self.guards;
        let pos = self.pos;
        let guard = match guards.get(pos) {
            Some(guard) => guard,
            None => return self.finish(ctx),
        };

        let rest = Next {
            pos: pos + 1,
            ..self
        };
        ctx.state_mut().enter(pos);
        match deferral::decide(ctx.state_mut(), guard) {
            Decision::ResumeAfter(deferred) => Next {
                resumed: Some(deferred),
                ..rest
            }
            .execute_at(guard, pos, ctx),
            Decision::Deferred => rest.run(ctx),
            Decision::ExecuteNow => rest.execute_at(guard, pos, ctx),
        }
    }

    /// Reached the end of the chain. A deferred guard nothing picked up still
    /// gets to decide before the endpoint.
    fn finish(self, ctx: &mut RequestContext) -> Result<Response> {
        match ctx.state_mut().take_deferred() {
            Some(deferred) => self.execute_at(&deferred.guard, deferred.level, ctx),
            None => self.endpoint.handle(ctx),
        }
    }

    fn execute_at(self, guard: &Arc<dyn Guard>, level: usize, ctx: &mut RequestContext) -> Result<Response> {
        ctx.state_mut().enter(level);
        guard.execute(ctx, self)
    }
}
