use std::sync::Arc;

use log::info;

use super::guard::Guard;
use super::state::{AuthorizationState, DeferredGuard};

/// What a guard does when the chain reaches it.
pub enum Decision {
    /// A guard deferred earlier in the request. The current guard runs first
    /// and the deferred one completes after it, so it can honor the marks
    /// the current guard sets.
    ResumeAfter(DeferredGuard),
    /// The current guard has been stored; move on to the next link.
    Deferred,
    /// Run the current guard's check.
    ExecuteNow,
}

/// Decides, on entry to `guard`, whether it runs, defers, or picks up a
/// previously deferred guard.
///
/// The state must already be at the level of `guard`. Taking the deferred
/// guard sets the ignore marker in the same step, so a request defers at most
/// once and deferral can never loop.
///
/// # Arguments
/// * `state` - Authorization state of the request
/// * `guard` - The guard the chain just reached
///
/// # Returns
/// * The [`Decision`] for `guard`
pub fn decide(state: &mut AuthorizationState, guard: &Arc<dyn Guard>) -> Decision {
    if let Some(deferred) = state.take_deferred() {
        return Decision::ResumeAfter(deferred);
    }

    if !state.is_deferral_ignored() && guard.is_deferred() {
        info!("Deferring guard [{}]", guard.name());
        state.defer(guard.clone());
        return Decision::Deferred;
    }

    Decision::ExecuteNow
}
