use anyhow::anyhow;

use super::*;

#[test]
fn set_and_clear_report_changes() {
    let mut flags = FlagSet::new();
    assert!(!flags.is_set("beacon.package-installed"));
    assert!(flags.set("beacon.package-installed"));
    assert!(!flags.set("beacon.package-installed"));
    assert!(flags.is_set("beacon.package-installed"));
    assert!(flags.clear("beacon.package-installed"));
    assert!(!flags.clear("beacon.package-installed"));
    assert!(flags.is_empty());
}

#[test]
fn names_are_sorted() {
    let flags = FlagSet::from_names(["b.two", "a.one", "c.three"]);
    let names: Vec<&str> = flags.names().collect();
    assert_eq!(names, vec!["a.one", "b.two", "c.three"]);
    assert_eq!(flags.len(), 3);
}

#[test]
fn guard_passes_when_required_present_and_absent_hold() {
    let guard = Guard::new()
        .when("beacon.repo-available")
        .when("beacon.config-written")
        .when_not("beacon.package-installed");

    let mut flags = FlagSet::from_names(["beacon.repo-available", "beacon.config-written"]);
    assert!(guard.passes(&flags));

    flags.set("beacon.package-installed");
    assert!(!guard.passes(&flags));

    flags.clear("beacon.config-written");
    flags.clear("beacon.package-installed");
    assert!(!guard.passes(&flags));
}

#[test]
fn unconditional_guard_always_passes() {
    let guard = Guard::new();
    assert!(guard.is_unconditional());
    assert!(guard.passes(&FlagSet::new()));
    assert!(guard.passes(&FlagSet::from_names(["anything"])));
}

#[test]
fn guard_reports_contradiction() {
    let guard = Guard::new().when("beacon.stop").when_not("beacon.stop");
    assert_eq!(guard.contradiction(), Some("beacon.stop"));

    let sane = Guard::new().when("beacon.stop").when_not("beacon.stopped");
    assert_eq!(sane.contradiction(), None);
}

#[test]
fn registry_rejects_contradictory_guard() {
    let mut registry: HandlerRegistry<()> = HandlerRegistry::new();
    let handler = Handler::flag_only(
        "broken",
        Guard::new().when("beacon.stop").when_not("beacon.stop"),
    );
    let err = registry.register(handler).expect_err("must reject");
    assert!(err.to_string().contains("both present and absent"));
    assert!(registry.is_empty());
}

#[test]
fn registry_rejects_duplicate_handler_name() {
    let mut registry: HandlerRegistry<()> = HandlerRegistry::new();
    registry
        .register(Handler::flag_only(
            "restart-trigger",
            Guard::new().when("beacon.service-started"),
        ))
        .expect("must register");
    let err = registry
        .register(Handler::flag_only(
            "restart-trigger",
            Guard::new().when("beacon.package-installed"),
        ))
        .expect_err("must reject duplicate");
    assert!(err.to_string().contains("already registered"));
}

#[test]
fn registry_rejects_unconditional_handler_with_external_action() {
    let mut registry: HandlerRegistry<u32> = HandlerRegistry::new();
    let handler = Handler::invoke("reset", Guard::new(), |_count: &mut u32| {
        Ok(ActionOutcome::Completed)
    });
    let err = registry.register(handler).expect_err("must reject");
    assert!(err.to_string().contains("external action"));
}

#[test]
fn registry_rejects_unconditional_handler_that_sets_flags() {
    let mut registry: HandlerRegistry<()> = HandlerRegistry::new();
    let handler = Handler::flag_only("reset", Guard::new()).sets("beacon.package-installed");
    let err = registry.register(handler).expect_err("must reject");
    assert!(err.to_string().contains("only clear flags"));
}

#[test]
fn registry_accepts_unconditional_handler_that_only_clears() {
    let mut registry: HandlerRegistry<()> = HandlerRegistry::new();
    registry
        .register(
            Handler::flag_only("reset", Guard::new())
                .clears("beacon.package-installed")
                .clears("beacon.service-started"),
        )
        .expect("must register");
    assert_eq!(registry.len(), 1);
}

#[test]
fn require_absent_everywhere_amends_all_guards() {
    let mut registry: HandlerRegistry<()> = HandlerRegistry::new();
    registry
        .register(Handler::flag_only(
            "restart-trigger",
            Guard::new().when("beacon.service-started"),
        ))
        .expect("must register");
    registry
        .register(Handler::flag_only(
            "reinstall-trigger",
            Guard::new().when("beacon.package-installed"),
        ))
        .expect("must register");

    registry.require_absent_everywhere("beacon.stopped");

    let flags = FlagSet::from_names([
        "beacon.service-started",
        "beacon.package-installed",
        "beacon.stopped",
    ]);
    for handler in registry.iter_mut() {
        assert!(!handler.guard().passes(&flags));
    }
}

#[test]
fn flag_only_action_always_completes() {
    let mut handler: Handler<()> =
        Handler::flag_only("restart-trigger", Guard::new().when("beacon.service-started"))
            .clears("beacon.service-started");
    let outcome = handler.run_action(&mut ()).expect("must complete");
    assert_eq!(outcome, ActionOutcome::Completed);
    assert!(!handler.has_external_action());
    let cleared: Vec<&str> = handler.clear_on_success().collect();
    assert_eq!(cleared, vec!["beacon.service-started"]);
}

#[test]
fn invoke_action_propagates_failure_and_decline() {
    let mut failing: Handler<u32> = Handler::invoke(
        "install-package",
        Guard::new().when("beacon.repo-available"),
        |_calls| Err(anyhow!("repository unreachable")),
    );
    let err = failing.run_action(&mut 0).expect_err("must fail");
    assert!(err.to_string().contains("repository unreachable"));

    let mut declining: Handler<u32> = Handler::invoke(
        "install-package",
        Guard::new().when("beacon.repo-available"),
        |_calls| Ok(ActionOutcome::Declined("no desired version".to_string())),
    );
    let outcome = declining.run_action(&mut 0).expect("must run");
    assert_eq!(
        outcome,
        ActionOutcome::Declined("no desired version".to_string())
    );
}
