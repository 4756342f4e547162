use serde_json::json;

use stride_lambda::event::run_options;

#[test]
fn scheduled_event_is_not_forced() {
    let payload = json!({
        "source": "aws.events",
        "detail-type": "Scheduled Event",
        "detail": {}
    });
    assert!(!run_options(&payload).force);
}

#[test]
fn top_level_force_flag() {
    assert!(run_options(&json!({ "force": true })).force);
    assert!(!run_options(&json!({ "force": false })).force);
}

#[test]
fn force_under_detail() {
    assert!(run_options(&json!({ "detail": { "force": true } })).force);
}

#[test]
fn string_flags_are_accepted() {
    assert!(run_options(&json!({ "force": "true" })).force);
    assert!(!run_options(&json!({ "force": "nope" })).force);
}

#[test]
fn non_object_payloads_are_normal_runs() {
    assert!(!run_options(&json!(null)).force);
    assert!(!run_options(&json!("force")).force);
    assert!(!run_options(&json!([true])).force);
}
