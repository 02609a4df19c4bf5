//! Scenario runner – execute scripted key flows from YAML files.

use crate::commands::CommandRegistry;
use crate::context::AppContext;
use crate::types::*;
use serde_json::Value;

/// Load a scenario from a YAML string.
pub fn load_scenario(yaml: &str) -> Result<Scenario, String> {
    serde_yaml::from_str(yaml).map_err(|e| format!("failed to parse scenario YAML: {}", e))
}

/// Execute a scenario against its own session and return the overall result.
pub fn run_scenario(
    scenario: &Scenario,
    ctx: &AppContext,
    registry: &CommandRegistry,
) -> ScenarioResult {
    let session_id = ctx.open_session();
    let mut step_results = Vec::new();
    let mut overall = Status::Pass;

    for (i, step) in scenario.steps.iter().enumerate() {
        let result = match step {
            ScenarioStep::Press {
                press,
                expect_display,
            } => {
                let mut r = registry.execute(
                    "press",
                    serde_json::json!({ "keys": press, "session_id": session_id }),
                    ctx,
                );
                if let (Status::Pass, Some(expected)) = (r.status, expect_display) {
                    let actual = r
                        .data
                        .as_ref()
                        .and_then(|d| d.get("display"))
                        .and_then(|v| v.as_str())
                        .unwrap_or_default()
                        .to_string();
                    if actual != *expected {
                        tracing::warn!(
                            step = i,
                            keys = %press,
                            expected = %expected,
                            actual = %actual,
                            "scenario display mismatch"
                        );
                        mark_failed(&mut r, expected, &actual);
                    }
                }
                if r.status != Status::Pass {
                    overall = Status::Fail;
                }
                r
            }
            ScenarioStep::Call {
                call,
                args,
                expect_status,
            } => {
                let r = registry.execute(call, with_session(args, &session_id), ctx);
                if r.status.as_str() != expect_status {
                    tracing::warn!(
                        step = i,
                        expected = %expect_status,
                        actual = r.status.as_str(),
                        "scenario step status mismatch"
                    );
                    overall = Status::Fail;
                }
                r
            }
        };
        step_results.push(result);
    }

    ctx.close_session(&session_id);

    ScenarioResult {
        name: scenario.name.clone(),
        overall_status: overall,
        step_results,
    }
}

/// Default `session_id` in object args to the scenario's session.
fn with_session(args: &Value, session_id: &str) -> Value {
    match args {
        Value::Object(map) => {
            let mut map = map.clone();
            map.entry("session_id")
                .or_insert_with(|| Value::String(session_id.to_string()));
            Value::Object(map)
        }
        Value::Null => serde_json::json!({ "session_id": session_id }),
        other => other.clone(),
    }
}

fn mark_failed(r: &mut CommandResult, expected: &str, actual: &str) {
    r.status = Status::Fail;
    r.error = Some(ErrorInfo {
        code: ErrorCode::ExpectationMismatch,
        message: format!("expected display {:?}, got {:?}", expected, actual),
        details: serde_json::json!({ "expected": expected, "actual": actual }),
    });
}
