use anyhow::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::authz::chain::Next;
use crate::authz::context::RequestContext;
use crate::authz::shell::GuardShell;
use crate::error::ConfigurationError;
use crate::server::response::Response;

use super::Guard;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatternType {
    /// A permission must equal the value.
    #[default]
    #[serde(rename = "equality")]
    Equality,
    /// A permission must fully match the value as a regular expression.
    #[serde(rename = "regex")]
    Regex,
    /// The dynamic resource handler decides.
    #[serde(rename = "custom")]
    Custom,
}

enum Matcher {
    Equality,
    Regex(Regex),
    Custom,
}

/// Lets a request through if its permission holder has a permission matching
/// the configured value.
pub struct PatternGuard {
    shell: GuardShell,
    value: String,
    matcher: Matcher,
}

impl PatternGuard {
    /// Creates the guard, compiling `value` up front for regex patterns.
    ///
    /// # Arguments
    /// * `shell` - Handler resolution and failure rendering for the guard
    /// * `value` - The permission, regex, or custom value to match
    /// * `pattern_type` - How `value` is matched
    ///
    /// # Returns
    /// * A [`ConfigurationError::InvalidPattern`] if `value` is not a valid regex
    pub fn new(shell: GuardShell, value: String, pattern_type: PatternType) -> Result<Self> {
        let matcher = match pattern_type {
            PatternType::Equality => Matcher::Equality,
            PatternType::Regex => {
                let re = Regex::new(&format!("^(?:{value})$")).map_err(|e| {
                    ConfigurationError::InvalidPattern {
                        pattern: value.clone(),
                        reason: e.to_string(),
                    }
                })?;
                Matcher::Regex(re)
            }
            PatternType::Custom => Matcher::Custom,
        };
        Ok(Self {
            shell,
            value,
            matcher,
        })
    }
}

impl Guard for PatternGuard {
    fn name(&self) -> &str {
        "pattern"
    }

    fn is_deferred(&self) -> bool {
        self.shell.is_deferred()
    }

    fn execute(&self, ctx: &mut RequestContext, next: Next<'_>) -> Result<Response> {
        self.shell.authorize(ctx, next, |handler, ctx| {
            if let Matcher::Custom = self.matcher {
                let drh = handler.dynamic_resource_handler().ok_or_else(|| {
                    ConfigurationError::MissingDynamicResourceHandler(self.value.clone())
                })?;
                return drh.check_permission(&self.value, handler, ctx);
            }

            let permissions = match self.shell.permission_holder(ctx, handler) {
                Some(holder) => holder.permissions(),
                None => return Ok(false),
            };
            Ok(permissions.iter().any(|p| match &self.matcher {
                Matcher::Equality => *p == self.value,
                Matcher::Regex(re) => re.is_match(p),
                Matcher::Custom => false,
            }))
        })
    }
}
