use std::sync::Arc;

use anyhow::{Context, Result};

use super::chain::{Chain, Endpoint};
use super::config::GuardConfig;
use super::guard::{
    DynamicGuard, Guard, PatternGuard, Presence, RestrictGuard, RestrictionsGuard,
    SubjectPresenceGuard, UnrestrictedGuard,
};
use super::resolver::HandlerRegistry;
use super::shell::GuardShell;

/// Builds guards and guard chains from configuration.
pub struct AuthzFactory {
    registry: Arc<HandlerRegistry>,
}

impl AuthzFactory {
    pub fn new(registry: Arc<HandlerRegistry>) -> Self {
        Self { registry }
    }

    pub fn build_guard(&self, cfg: &GuardConfig) -> Result<Arc<dyn Guard>> {
        let shell = GuardShell::new(self.registry.clone(), cfg.options().clone());
        let guard: Arc<dyn Guard> = match cfg {
            GuardConfig::Restrict {
                roles, role_match, ..
            } => Arc::new(RestrictGuard::new(shell, roles.clone(), *role_match)),
            GuardConfig::Restrictions { groups, .. } => {
                Arc::new(RestrictionsGuard::new(shell, groups.clone()))
            }
            GuardConfig::Pattern {
                value,
                pattern_type,
                ..
            } => Arc::new(PatternGuard::new(shell, value.clone(), *pattern_type)?),
            GuardConfig::Dynamic { resource, meta, .. } => {
                Arc::new(DynamicGuard::new(shell, resource.clone(), meta.clone()))
            }
            GuardConfig::Unrestricted { .. } => Arc::new(UnrestrictedGuard::new(shell)),
            GuardConfig::SubjectPresent { .. } => {
                Arc::new(SubjectPresenceGuard::new(shell, Presence::Present))
            }
            GuardConfig::SubjectNotPresent { .. } => {
                Arc::new(SubjectPresenceGuard::new(shell, Presence::Absent))
            }
        };
        Ok(guard)
    }

    /// Builds a chain from guard configs.
    ///
    /// # Arguments
    /// * `guards` - Guard configs, most general (controller level) first
    /// * `endpoint` - The handler the chain protects
    pub fn build_chain(&self, guards: &[GuardConfig], endpoint: Arc<dyn Endpoint>) -> Result<Chain> {
        let mut built = Vec::with_capacity(guards.len());
        for (idx, cfg) in guards.iter().enumerate() {
            let guard = self
                .build_guard(cfg)
                .with_context(|| format!("build guard #{idx}"))?;
            built.push(guard);
        }
        Ok(Chain::new(built, endpoint))
    }
}
