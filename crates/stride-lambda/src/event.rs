use serde_json::Value;

use stride_scheduler::RunOptions;

/// Run options carried by an invocation payload.
///
/// Accepts `{"force": true}` from a manual invoke and the same flag under
/// `detail` from an EventBridge rule. Anything else is a normal scheduled
/// run.
pub fn run_options(payload: &Value) -> RunOptions {
    let force = flag(payload).or_else(|| payload.get("detail").and_then(flag));
    RunOptions {
        force: force.unwrap_or(false),
    }
}

fn flag(value: &Value) -> Option<bool> {
    match value.get("force")? {
        Value::Bool(b) => Some(*b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
