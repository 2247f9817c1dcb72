//! Stackable authorization guards.
//!
//! A route is protected by a [`Chain`](chain::Chain) of [`Guard`](guard::Guard)s,
//! most general first. Each guard either lets the request through to the next
//! link, renders an access failure, or defers its decision until the next
//! guard has run.
//!
//! A more specific guard overrides a more general one through the request's
//! marks: when it authorizes the request, a deferred general guard skips its
//! check; when it denies the request, the general guard never runs.

pub mod chain;
pub mod config;
pub mod context;
pub mod deferral;
pub mod factory;
pub mod guard;
pub mod handler;
pub mod holder;
pub mod resolver;
pub mod roles;
pub mod shell;
pub mod state;
