// tests/config_behaviour.rs

use std::io::Write;

use showrunner::config::{load_and_validate, validate_scenario, ScriptAction, TaskKind};
use showrunner::queue::TickPolicy;
use showrunner_test_utils::builders::{
    fire_event_step, member_ready_step, set_affordance_step, ScenarioFileBuilder, TaskSpecBuilder,
};
use showrunner_test_utils::init_tracing;

fn write_scenario(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().expect("create temp scenario");
    file.write_all(contents.as_bytes()).expect("write scenario");
    file
}

#[test]
fn full_scenario_round_trips_from_toml() {
    init_tracing();
    let file = write_scenario(
        r#"
[queue]
tick_policy = "drain"
tick_interval_ms = 25

[loader]
latency_ms = 5
cached = ["dialogs/welcome"]
failing = ["bundles/bad"]

[task.welcome]
kind = "modal"
content = "dialogs/welcome"
rating = 10
tags = ["immediate", "singleton"]

[task.wait]
kind = "event"
event = "jackpot"
timeout_ms = 100

[task.pack]
kind = "package"
members = ["wait"]

[[script.step]]
after_ms = 10
action = "fire-event"
event = "jackpot"
"#,
    );

    let scenario = load_and_validate(file.path()).expect("valid scenario");
    assert_eq!(scenario.queue.tick_policy, TickPolicy::Drain);
    assert_eq!(scenario.queue.tick_interval_ms, 25);
    assert_eq!(scenario.loader.latency_ms, 5);
    assert_eq!(scenario.task.len(), 3);
    assert_eq!(scenario.task["welcome"].kind, TaskKind::Modal);
    assert_eq!(scenario.task["wait"].timeout_ms, 100);
    assert_eq!(
        scenario.script.step[0].parse_action().expect("action"),
        ScriptAction::FireEvent { event: "jackpot".to_string() }
    );
}

#[test]
fn defaults_fill_missing_sections() {
    init_tracing();
    let file = write_scenario(
        r#"
[task.hello]
kind = "callback"
"#,
    );

    let scenario = load_and_validate(file.path()).expect("valid scenario");
    assert_eq!(scenario.queue.tick_policy, TickPolicy::Single);
    assert_eq!(scenario.queue.tick_interval_ms, 100);
    assert_eq!(scenario.loader.latency_ms, 250);
    assert_eq!(scenario.task["hello"].rating, 0);
    assert_eq!(scenario.task["hello"].timeout_ms, 5000);
    assert!(scenario.script.step.is_empty());
}

#[test]
fn unparseable_toml_is_an_error() {
    init_tracing();
    let file = write_scenario("this is not toml [");
    assert!(load_and_validate(file.path()).is_err());
}

#[test]
fn missing_file_is_an_error() {
    init_tracing();
    let err = load_and_validate(std::path::Path::new("/nonexistent/Showrunner.toml"))
        .expect_err("should fail");
    assert!(err.to_string().contains("IO error"));
}

#[test]
fn empty_scenario_is_rejected() {
    let scenario = ScenarioFileBuilder::new().build();
    assert!(validate_scenario(&scenario).is_err());
}

#[test]
fn preload_requires_content() {
    let scenario = ScenarioFileBuilder::new()
        .with_task("shop", TaskSpecBuilder::new(TaskKind::Preload).build())
        .build();
    let err = validate_scenario(&scenario).expect_err("should fail");
    assert!(err.to_string().contains("requires `content`"));
}

#[test]
fn event_task_requires_event_and_timeout() {
    let missing_event = ScenarioFileBuilder::new()
        .with_task("wait", TaskSpecBuilder::new(TaskKind::Event).build())
        .build();
    assert!(validate_scenario(&missing_event).is_err());

    let zero_timeout = ScenarioFileBuilder::new()
        .with_task(
            "wait",
            TaskSpecBuilder::new(TaskKind::Event)
                .event("jackpot")
                .timeout_ms(0)
                .build(),
        )
        .build();
    assert!(validate_scenario(&zero_timeout).is_err());
}

#[test]
fn package_membership_is_checked() {
    let dangling = ScenarioFileBuilder::new()
        .with_task(
            "pack",
            TaskSpecBuilder::new(TaskKind::Package).member("ghost").build(),
        )
        .build();
    let err = validate_scenario(&dangling).expect_err("should fail");
    assert!(err.to_string().contains("unknown member"));

    let empty = ScenarioFileBuilder::new()
        .with_task("pack", TaskSpecBuilder::new(TaskKind::Package).build())
        .build();
    assert!(validate_scenario(&empty).is_err());

    let self_member = ScenarioFileBuilder::new()
        .with_task(
            "pack",
            TaskSpecBuilder::new(TaskKind::Package).member("pack").build(),
        )
        .build();
    assert!(validate_scenario(&self_member).is_err());
}

#[test]
fn cyclic_package_membership_is_rejected() {
    let scenario = ScenarioFileBuilder::new()
        .with_task(
            "a",
            TaskSpecBuilder::new(TaskKind::Package).member("b").build(),
        )
        .with_task(
            "b",
            TaskSpecBuilder::new(TaskKind::Package).member("a").build(),
        )
        .build();
    let err = validate_scenario(&scenario).expect_err("should fail");
    assert!(err.to_string().contains("cycle"));
}

#[test]
fn nested_acyclic_packages_are_fine() {
    let scenario = ScenarioFileBuilder::new()
        .with_task("leaf", TaskSpecBuilder::new(TaskKind::Callback).build())
        .with_task(
            "inner",
            TaskSpecBuilder::new(TaskKind::Package).member("leaf").build(),
        )
        .with_task(
            "outer",
            TaskSpecBuilder::new(TaskKind::Package).member("inner").build(),
        )
        .build();
    assert!(validate_scenario(&scenario).is_ok());
}

#[test]
fn members_on_non_packages_are_rejected() {
    let scenario = ScenarioFileBuilder::new()
        .with_task("other", TaskSpecBuilder::new(TaskKind::Callback).build())
        .with_task(
            "hello",
            TaskSpecBuilder::new(TaskKind::Callback).member("other").build(),
        )
        .build();
    let err = validate_scenario(&scenario).expect_err("should fail");
    assert!(err.to_string().contains("not a package"));
}

#[test]
fn script_references_are_checked() {
    let base = || {
        ScenarioFileBuilder::new()
            .with_task("hello", TaskSpecBuilder::new(TaskKind::Callback).build())
            .with_task(
                "pack",
                TaskSpecBuilder::new(TaskKind::Package).member("hello").build(),
            )
    };

    assert!(validate_scenario(&base().with_step(member_ready_step(0, "pack", "hello")).build()).is_ok());
    assert!(validate_scenario(&base().with_step(member_ready_step(0, "ghost", "hello")).build()).is_err());
    assert!(validate_scenario(&base().with_step(member_ready_step(0, "hello", "hello")).build()).is_err());
    assert!(validate_scenario(&base().with_step(member_ready_step(0, "pack", "ghost")).build()).is_err());
    assert!(validate_scenario(&base().with_step(set_affordance_step(0, "nope", true)).build()).is_err());
    assert!(validate_scenario(&base().with_step(fire_event_step(0, "anything")).build()).is_ok());
}

#[test]
fn affordance_references_resolve_through_preloads() {
    let scenario = ScenarioFileBuilder::new()
        .with_task(
            "shop",
            TaskSpecBuilder::new(TaskKind::Preload)
                .content("bundles/shop")
                .affordance("shop-button")
                .build(),
        )
        .with_step(set_affordance_step(0, "shop-button", false))
        .build();
    assert!(validate_scenario(&scenario).is_ok());

    // A preload without an explicit affordance is addressable by task name.
    let implicit = ScenarioFileBuilder::new()
        .with_task(
            "shop",
            TaskSpecBuilder::new(TaskKind::Preload).content("bundles/shop").build(),
        )
        .with_step(set_affordance_step(0, "shop", true))
        .build();
    assert!(validate_scenario(&implicit).is_ok());
}

#[test]
fn malformed_script_actions_are_rejected() {
    let base = || {
        ScenarioFileBuilder::new()
            .with_task("hello", TaskSpecBuilder::new(TaskKind::Callback).build())
    };

    let mut bad_action = fire_event_step(0, "x");
    bad_action.action = "explode".to_string();
    assert!(validate_scenario(&base().with_step(bad_action).build()).is_err());

    let mut missing_field = fire_event_step(0, "x");
    missing_field.event = None;
    assert!(validate_scenario(&base().with_step(missing_field).build()).is_err());
}

#[test]
fn tick_policy_parses_from_strings() {
    assert_eq!("single".parse::<TickPolicy>().expect("parse"), TickPolicy::Single);
    assert_eq!("Drain".parse::<TickPolicy>().expect("parse"), TickPolicy::Drain);
    assert!("both".parse::<TickPolicy>().is_err());
}
