mod common;

use std::sync::{Arc, Mutex};

use actix_web::http::StatusCode;
use boltguard::authz::chain::Chain;
use boltguard::authz::guard::{
    Guard, GuardOptions, RestrictGuard, RoleMatch, UnrestrictedGuard,
};
use boltguard::authz::holder::Subject;
use boltguard::authz::resolver::HandlerRegistry;
use boltguard::error::ConfigurationError;
use log::Level;

use common::*;

fn restrict(
    registry: &Arc<HandlerRegistry>,
    roles: &[&str],
    options: GuardOptions,
) -> Arc<dyn Guard> {
    Arc::new(RestrictGuard::new(
        shell(registry, options),
        roles.iter().map(|r| r.to_string()).collect(),
        RoleMatch::All,
    ))
}

fn holder(roles: &[&str]) -> TestHandler {
    TestHandler::new("denied").with_subject(Subject::new("bob").with_roles(roles.iter().copied()))
}

fn chain_of(guards: Vec<Arc<dyn Guard>>) -> (Chain, Arc<Reached>) {
    let endpoint = Reached::new();
    (Chain::new(guards, endpoint.clone()), endpoint)
}

#[test]
fn test_nested_deferred_guards() {
    let trace = Arc::new(Mutex::new(Vec::new()));
    let counted = ["first", "second", "third"]
        .into_iter()
        .map(|name| {
            Counted::traced(
                Arc::new(PassGuard {
                    name,
                    deferred: true,
                }),
                trace.clone(),
            )
        })
        .collect::<Vec<_>>();
    let guards = counted
        .iter()
        .map(|g| g.clone() as Arc<dyn Guard>)
        .collect::<Vec<_>>();
    let (chain, endpoint) = chain_of(guards);

    let resp = call(&chain, "/nested").unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(endpoint.count(), 1);
    for guard in counted.iter() {
        assert_eq!(guard.calls(), 1);
    }
    // The first guard completes right after the guard that picked it up.
    assert_eq!(*trace.lock().unwrap(), vec!["second", "first", "third"]);

    // Every request starts with a fresh state.
    call(&chain, "/nested").unwrap();
    assert_eq!(endpoint.count(), 2);
    for guard in counted.iter() {
        assert_eq!(guard.calls(), 2);
    }
}

#[test]
fn test_general_pass_does_not_skip_specific_guard() {
    let users = registry(holder(&["user"]));
    let (chain, endpoint) = chain_of(vec![
        restrict(&users, &["user"], GuardOptions::default()),
        restrict(&users, &["admin"], GuardOptions::default()),
    ]);

    let resp = call(&chain, "/general-pass").unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(resp.message(), Some("Unauthorized: denied"));
    assert_eq!(endpoint.count(), 0);

    let admins = registry(holder(&["user", "admin"]));
    let (chain, endpoint) = chain_of(vec![
        restrict(&admins, &["user"], GuardOptions::default()),
        restrict(&admins, &["admin"], GuardOptions::default()),
    ]);
    let resp = call(&chain, "/general-pass").unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(endpoint.count(), 1);
}

#[test]
fn test_deferred_controller_guard_denied() {
    capture_logs();
    let registry = registry(holder(&["user"]));

    let controller = Counted::new(restrict(&registry, &["user"], GuardOptions::deferred()));
    let method = Counted::new(restrict(&registry, &["admin"], GuardOptions::default()));
    let (chain, endpoint) = chain_of(vec![
        controller.clone() as Arc<dyn Guard>,
        method.clone() as Arc<dyn Guard>,
    ]);

    let resp = call(&chain, "/deferred-denied").unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(resp.message(), Some("Unauthorized: denied"));

    assert_eq!(controller.calls(), 0);
    assert_eq!(method.calls(), 1);
    assert_eq!(endpoint.count(), 0);

    assert!(!logged(Level::Info, "Deferring guard [restrict]").is_empty());
    assert_eq!(
        logged(Level::Warn, "Access failure on [/deferred-denied]").len(),
        1
    );
}

#[test]
fn test_deferred_controller_guard_allowed() {
    // The method guard lets the request through, so the controller guard
    // skips its check even though the holder lacks its role.
    let registry = registry(holder(&["admin"]));

    let controller = Counted::new(restrict(&registry, &["user"], GuardOptions::deferred()));
    let method = Counted::new(restrict(&registry, &["admin"], GuardOptions::default()));
    let (chain, endpoint) = chain_of(vec![
        controller.clone() as Arc<dyn Guard>,
        method.clone() as Arc<dyn Guard>,
    ]);

    let resp = call(&chain, "/deferred-allowed").unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(controller.calls(), 1);
    assert_eq!(method.calls(), 1);
    assert_eq!(endpoint.count(), 1);
}

#[test]
fn test_deferred_guard_at_chain_end() {
    capture_logs();
    let registry = registry(TestHandler::new("denied"));

    // Nothing comes after the deferred guard, it still decides before the
    // endpoint.
    let deferred = Counted::new(restrict(&registry, &["admin"], GuardOptions::deferred()));
    let (chain, endpoint) = chain_of(vec![deferred.clone() as Arc<dyn Guard>]);
    let resp = call(&chain, "/deferred-end").unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(deferred.calls(), 1);
    assert_eq!(endpoint.count(), 0);

    let deferred = Counted::new(Arc::new(UnrestrictedGuard::new(shell(
        &registry,
        GuardOptions::deferred(),
    ))));
    let (chain, endpoint) = chain_of(vec![deferred.clone() as Arc<dyn Guard>]);
    let resp = call(&chain, "/deferred-end").unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(deferred.calls(), 1);
    assert_eq!(endpoint.count(), 1);
}

#[test]
fn test_unauthorized_mark_wins() {
    let registry = registry(holder(&["admin"]));

    // The controller guard's own check would pass.
    let (chain, endpoint) = chain_of(vec![
        restrict(&registry, &["admin"], GuardOptions::deferred()),
        Arc::new(MarkGuard { authorized: false }),
    ]);
    let resp = call(&chain, "/marked-unauthorized").unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(endpoint.count(), 0);

    let (chain, endpoint) = chain_of(vec![
        Arc::new(MarkGuard { authorized: false }) as Arc<dyn Guard>,
        Arc::new(UnrestrictedGuard::new(shell(&registry, GuardOptions::default()))),
    ]);
    let resp = call(&chain, "/marked-unauthorized").unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(endpoint.count(), 0);
}

#[test]
fn test_authorized_mark_skips_check() {
    let registry = registry(TestHandler::new("denied"));

    let (chain, endpoint) = chain_of(vec![
        restrict(&registry, &["admin"], GuardOptions::deferred()),
        Arc::new(MarkGuard { authorized: true }),
    ]);
    let resp = call(&chain, "/marked-authorized").unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(endpoint.count(), 1);

    // A mark from a more general guard does not open a specific one.
    let (chain, endpoint) = chain_of(vec![
        Arc::new(MarkGuard { authorized: true }) as Arc<dyn Guard>,
        restrict(&registry, &["admin"], GuardOptions::default()),
    ]);
    let resp = call(&chain, "/marked-authorized").unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(endpoint.count(), 0);
}

#[test]
fn test_unrestricted_overrides_general_guard() {
    let registry = registry(TestHandler::new("denied"));

    let controller = Counted::new(restrict(&registry, &["admin"], GuardOptions::deferred()));
    let (chain, endpoint) = chain_of(vec![
        controller.clone() as Arc<dyn Guard>,
        Arc::new(UnrestrictedGuard::new(shell(&registry, GuardOptions::default()))),
    ]);
    let resp = call(&chain, "/unrestricted").unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(controller.calls(), 1);
    assert_eq!(endpoint.count(), 1);

    // A general unrestricted guard leaves the specific restriction in place.
    let (chain, endpoint) = chain_of(vec![
        Arc::new(UnrestrictedGuard::new(shell(&registry, GuardOptions::default())))
            as Arc<dyn Guard>,
        restrict(&registry, &["admin"], GuardOptions::default()),
    ]);
    let resp = call(&chain, "/unrestricted").unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(endpoint.count(), 0);
}

#[test]
fn test_broken_failure_hook() {
    capture_logs();
    let registry = registry(TestHandler {
        tag: "broken",
        broken_hook: true,
        ..Default::default()
    });
    let chain = Chain::new(
        vec![restrict(&registry, &["admin"], GuardOptions::default())],
        Reached::new(),
    );

    let resp = call(&chain, "/broken-hook").unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.message(), Some("Server error: Authorization failed"));

    assert_eq!(logged(Level::Warn, "Access failure on [/broken-hook]").len(), 1);
    assert!(!logged(Level::Warn, "Error when invoking access failure hook").is_empty());
}

#[test]
fn test_absent_holder() {
    capture_logs();
    let registry = registry(TestHandler::new("no holder"));
    let endpoint = Reached::new();
    let chain = Chain::new(
        vec![restrict(&registry, &["admin"], GuardOptions::default())],
        endpoint.clone(),
    );

    let resp = call(&chain, "/absent-holder").unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(resp.message(), Some("Unauthorized: no holder"));
    assert_eq!(endpoint.count(), 0);

    let lines = logged(Level::Error, "[/absent-holder]");
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("requires a permission holder"));
}

#[test]
fn test_handler_resolution() {
    let mut registry = HandlerRegistry::new();
    registry.register("api", || {
        let handler: Arc<dyn boltguard::authz::handler::AuthorizationHandler> =
            Arc::new(TestHandler::new("api"));
        Ok(handler)
    });
    registry.register_abstract("abstract");
    let registry = Arc::new(registry);

    let guard = |handler: Option<&str>| {
        let mut options = GuardOptions::default();
        if let Some(handler) = handler {
            options = options.with_handler(handler);
        }
        Chain::new(vec![restrict(&registry, &["admin"], options)], Reached::new())
    };

    let resp = call(&guard(Some("api")), "/resolution").unwrap();
    assert_eq!(resp.message(), Some("Unauthorized: api"));

    // No default yet.
    for handler in [Some("abstract"), None] {
        let err = call(&guard(handler), "/resolution").err().unwrap();
        assert_eq!(
            err.downcast_ref::<ConfigurationError>(),
            Some(&ConfigurationError::NoDefaultHandler)
        );
    }

    let err = call(&guard(Some("missing")), "/resolution").err().unwrap();
    assert_eq!(
        err.downcast_ref::<ConfigurationError>(),
        Some(&ConfigurationError::UnknownHandler("missing".to_string()))
    );

    registry
        .set_default(Arc::new(TestHandler::new("default")))
        .unwrap();
    let resp = call(&guard(Some("abstract")), "/resolution").unwrap();
    assert_eq!(resp.message(), Some("Unauthorized: default"));
    let resp = call(&guard(None), "/resolution").unwrap();
    assert_eq!(resp.message(), Some("Unauthorized: default"));
}

#[test]
fn test_content_hint() {
    let registry = registry(TestHandler::new("denied"));
    let chain = Chain::new(
        vec![restrict(
            &registry,
            &["admin"],
            GuardOptions::default().with_content("text/html"),
        )],
        Reached::new(),
    );

    let resp = call(&chain, "/content").unwrap();
    assert_eq!(resp.message(), Some("Unauthorized: denied (text/html)"));
}

#[test]
fn test_before_auth_check() {
    let registry = registry(TestHandler {
        tag: "denied",
        require_login: true,
        ..Default::default()
    });
    let endpoint = Reached::new();
    let chain = Chain::new(
        vec![restrict(&registry, &["admin"], GuardOptions::default())],
        endpoint.clone(),
    );

    let resp = call(&chain, "/login").unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(resp.message(), Some("login first"));
    assert_eq!(endpoint.count(), 0);
}
