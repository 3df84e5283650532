// src/config/validate.rs

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::{ScenarioFile, ScriptAction, TaskKind, TaskSpec};
use crate::errors::{Result, ShowrunnerError};

/// Validate a parsed scenario.
///
/// Everything a scenario can get wrong is reported here, before any host
/// object is built: per-kind required fields, dangling references from
/// packages and script steps, and cyclic package membership.
pub fn validate_scenario(scenario: &ScenarioFile) -> Result<()> {
    ensure_has_tasks(scenario)?;
    for (name, spec) in scenario.task.iter() {
        validate_task(name, spec, scenario)?;
    }
    validate_package_graph(scenario)?;
    validate_script(scenario)?;
    Ok(())
}

fn ensure_has_tasks(scenario: &ScenarioFile) -> Result<()> {
    if scenario.task.is_empty() {
        return Err(ShowrunnerError::Scenario(
            "scenario must contain at least one [task.<name>] section".to_string(),
        ));
    }
    Ok(())
}

fn validate_task(name: &str, spec: &TaskSpec, scenario: &ScenarioFile) -> Result<()> {
    match spec.kind {
        TaskKind::Callback | TaskKind::Modal => {}
        TaskKind::Preload => {
            if spec.content.is_none() {
                return Err(ShowrunnerError::Scenario(format!(
                    "preload task '{name}' requires `content`"
                )));
            }
        }
        TaskKind::Event => {
            if spec.event.is_none() {
                return Err(ShowrunnerError::Scenario(format!(
                    "event task '{name}' requires `event`"
                )));
            }
            if spec.timeout_ms == 0 {
                return Err(ShowrunnerError::Scenario(format!(
                    "event task '{name}' requires a non-zero `timeout_ms`"
                )));
            }
        }
        TaskKind::Package => {
            if spec.members.is_empty() {
                return Err(ShowrunnerError::Scenario(format!(
                    "package task '{name}' requires a non-empty `members` list"
                )));
            }
            for member in spec.members.iter() {
                if !scenario.task.contains_key(member) {
                    return Err(ShowrunnerError::UnknownReference(format!(
                        "package task '{name}' references unknown member '{member}'"
                    )));
                }
                if member == name {
                    return Err(ShowrunnerError::Scenario(format!(
                        "package task '{name}' cannot list itself as a member"
                    )));
                }
            }
        }
    }

    if spec.kind != TaskKind::Package && !spec.members.is_empty() {
        return Err(ShowrunnerError::Scenario(format!(
            "task '{name}' has `members` but is not a package"
        )));
    }

    Ok(())
}

/// Package membership must form a DAG.
///
/// Edge direction: package -> member. Nested packages are allowed; a package
/// that (transitively) contains itself is not, and a topological sort fails
/// exactly when that happens.
fn validate_package_graph(scenario: &ScenarioFile) -> Result<()> {
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for (name, spec) in scenario.task.iter() {
        if spec.kind != TaskKind::Package {
            continue;
        }
        graph.add_node(name.as_str());
        for member in spec.members.iter() {
            graph.add_edge(name.as_str(), member.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => Err(ShowrunnerError::Cycle(format!(
            "cycle detected in package membership involving task '{}'",
            cycle.node_id()
        ))),
    }
}

fn validate_script(scenario: &ScenarioFile) -> Result<()> {
    for (idx, step) in scenario.script.step.iter().enumerate() {
        let action = step
            .parse_action()
            .map_err(|msg| ShowrunnerError::Scenario(format!("script step {idx}: {msg}")))?;

        match action {
            ScriptAction::MemberReady { package, member } => {
                let Some(spec) = scenario.task.get(&package) else {
                    return Err(ShowrunnerError::UnknownReference(format!(
                        "script step {idx}: unknown package '{package}'"
                    )));
                };
                if spec.kind != TaskKind::Package {
                    return Err(ShowrunnerError::Scenario(format!(
                        "script step {idx}: task '{package}' is not a package"
                    )));
                }
                if !spec.members.contains(&member) {
                    return Err(ShowrunnerError::UnknownReference(format!(
                        "script step {idx}: '{member}' is not a member of package '{package}'"
                    )));
                }
            }
            ScriptAction::SetAffordance { affordance, .. } => {
                let known = scenario.task.iter().any(|(name, spec)| {
                    spec.kind == TaskKind::Preload && spec.affordance_name(name) == affordance
                });
                if !known {
                    return Err(ShowrunnerError::UnknownReference(format!(
                        "script step {idx}: unknown affordance '{affordance}'"
                    )));
                }
            }
            ScriptAction::FireEvent { .. }
            | ScriptAction::SetLock { .. }
            | ScriptAction::Shutdown => {}
        }
    }

    Ok(())
}
