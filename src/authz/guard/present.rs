use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::authz::chain::Next;
use crate::authz::context::RequestContext;
use crate::authz::shell::GuardShell;
use crate::server::response::Response;

use super::Guard;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Presence {
    #[serde(rename = "present")]
    Present,
    #[serde(rename = "absent")]
    Absent,
}

/// Checks only whether the request has a permission holder at all.
///
/// An absent holder is the expected outcome here, so it is not logged.
pub struct SubjectPresenceGuard {
    shell: GuardShell,
    expect: Presence,
}

impl SubjectPresenceGuard {
    pub fn new(shell: GuardShell, expect: Presence) -> Self {
        Self { shell, expect }
    }
}

impl Guard for SubjectPresenceGuard {
    fn name(&self) -> &str {
        match self.expect {
            Presence::Present => "subject_present",
            Presence::Absent => "subject_not_present",
        }
    }

    fn is_deferred(&self) -> bool {
        self.shell.is_deferred()
    }

    fn execute(&self, ctx: &mut RequestContext, next: Next<'_>) -> Result<Response> {
        self.shell.authorize(ctx, next, |handler, ctx| {
            let present = handler.permission_holder(ctx).is_some();
            Ok(match self.expect {
                Presence::Present => present,
                Presence::Absent => !present,
            })
        })
    }
}
