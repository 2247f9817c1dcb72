use std::sync::Arc;

use super::guard::Guard;

/// A guard that deferred its decision, with the chain level it was declared at.
#[derive(Clone)]
pub struct DeferredGuard {
    pub guard: Arc<dyn Guard>,
    pub level: usize,
}

/// Signals exchanged between the guards stacked on one request.
///
/// Guards are identified by their level, the position in the chain: level 0
/// is the most general (controller level) guard, higher levels are more
/// specific. An authorized mark is only honored by guards more general than
/// the one that set it. An unauthorized mark is honored by every guard.
///
/// It lives inside a [`RequestContext`](super::context::RequestContext) and is
/// dropped with it, so nothing here outlives the request.
#[derive(Default)]
pub struct AuthorizationState {
    level: usize,

    /// Most specific level that authorized the request.
    authorized_at: Option<usize>,
    unauthorized: bool,

    deferred: Option<DeferredGuard>,
    ignore_deferred: bool,
}

impl AuthorizationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the level of the guard about to execute.
    pub fn enter(&mut self, level: usize) {
        self.level = level;
    }

    /// Marks the request as authorized by the guard at the current level.
    pub fn mark_authorized(&mut self) {
        let level = match self.authorized_at {
            Some(prev) => prev.max(self.level),
            None => self.level,
        };
        self.authorized_at = Some(level);
    }

    pub fn mark_unauthorized(&mut self) {
        self.unauthorized = true;
    }

    /// Whether a guard more specific than the current one authorized the
    /// request.
    pub fn is_authorized(&self) -> bool {
        matches!(self.authorized_at, Some(level) if level > self.level)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.unauthorized
    }

    /// Stores `guard`, declared at the current level, as the deferred guard.
    /// Replaces any previous one.
    pub fn defer(&mut self, guard: Arc<dyn Guard>) {
        self.deferred = Some(DeferredGuard {
            guard,
            level: self.level,
        });
    }

    /// Takes the deferred guard out of the slot.
    ///
    /// Taking a guard also marks deferral as ignored for the rest of the
    /// request, so the guard it hands out can never be deferred again.
    pub fn take_deferred(&mut self) -> Option<DeferredGuard> {
        let deferred = self.deferred.take()?;
        self.ignore_deferred = true;
        Some(deferred)
    }

    pub fn is_deferral_ignored(&self) -> bool {
        self.ignore_deferred
    }
}
