use std::collections::HashMap;
use weft_engine::matcher::{self, FieldClass};
use weft_engine::recording::{Action, ActionKind, CapturedInput, Recording, Target};
use weft_engine::reducer::reduce;

fn action(kind: ActionKind, target: Target, timestamp: u64) -> Action {
    Action {
        kind,
        timestamp,
        url: "https://portal.example.com/login".into(),
        target,
        form_data: None,
        key: None,
    }
}

fn field(id: &str, value: &str, element_type: Option<&str>) -> Target {
    Target {
        tag: Some("input".into()),
        id: Some(id.into()),
        selector: Some(format!("#{id}")),
        element_type: element_type.map(str::to_string),
        value: Some(value.into()),
        ..Default::default()
    }
}

fn recording(actions: Vec<Action>) -> Recording {
    Recording {
        session_id: "s1".into(),
        url: "https://portal.example.com".into(),
        title: None,
        started_at: 0,
        ended_at: 10_000,
        viewport: None,
        user_agent: None,
        actions,
        dom_snapshots: vec![],
        console_logs: HashMap::new(),
        network_events: HashMap::new(),
        captured_inputs: HashMap::new(),
    }
}

fn login_recording() -> Recording {
    let submit = Target {
        tag: Some("button".into()),
        text: Some("Sign In".into()),
        selector: Some("button[type=submit]".into()),
        element_type: Some("submit".into()),
        ..Default::default()
    };
    recording(vec![
        action(ActionKind::Input, field("username", "admin@example.com", None), 1),
        action(
            ActionKind::Input,
            field("password", "SecurePass123", Some("password")),
            2,
        ),
        action(ActionKind::Click, submit, 3),
    ])
}

#[test]
fn login_fields_classify_into_distinct_classes() {
    let outcome = matcher::classify(&reduce(&login_recording()));

    let username = outcome
        .classifications
        .iter()
        .find(|c| c.field == "username")
        .unwrap();
    let password = outcome
        .classifications
        .iter()
        .find(|c| c.field == "password")
        .unwrap();

    assert_eq!(username.class, FieldClass::Identifier);
    assert_eq!(password.class, FieldClass::Secret);
    assert_ne!(username.param_name, password.param_name);
}

#[test]
fn login_workflow_is_matched() {
    let outcome = matcher::classify(&reduce(&login_recording()));
    assert_eq!(outcome.workflow.unwrap().name, "login");
}

#[test]
fn unrecognized_field_still_becomes_a_generic_param() {
    let rec = recording(vec![action(
        ActionKind::Input,
        field("wibble-wobble", "42", None),
        1,
    )]);
    let outcome = matcher::classify(&reduce(&rec));

    assert_eq!(outcome.classifications.len(), 1);
    assert_eq!(outcome.classifications[0].class, FieldClass::Generic);
    assert_eq!(outcome.classifications[0].param_name, "WIBBLE_WOBBLE");
    assert!(outcome.workflow.is_none());
}

#[test]
fn business_fields_map_to_canonical_names() {
    let rec = recording(vec![
        action(ActionKind::Input, field("item_name", "Widget", None), 1),
        action(ActionKind::Input, field("unit_price", "19.99", None), 2),
    ]);
    let outcome = matcher::classify(&reduce(&rec));

    assert_eq!(outcome.classifications[0].param_name, "ITEM_NAME");
    assert_eq!(outcome.classifications[1].param_name, "PRICE");
}

#[test]
fn captured_input_value_beats_reconstructed_action_value() {
    // Keystroke reconstruction saw a partial value; the side channel
    // carries the real one.
    let mut rec = recording(vec![action(
        ActionKind::Input,
        field("username", "adm", None),
        1,
    )]);
    rec.captured_inputs.insert(
        "username".into(),
        CapturedInput {
            field: "username".into(),
            value: "admin@example.com".into(),
            input_type: Some("email".into()),
            is_login_field: true,
            url: None,
        },
    );

    let outcome = matcher::classify(&reduce(&rec));
    assert_eq!(outcome.classifications[0].value, "admin@example.com");
    assert_eq!(outcome.classifications[0].class, FieldClass::Identifier);
}

#[test]
fn capture_side_channel_fields_absent_from_actions_are_classified() {
    let mut rec = recording(vec![]);
    rec.captured_inputs.insert(
        "total_cost".into(),
        CapturedInput {
            field: "total_cost".into(),
            value: "120.00".into(),
            input_type: Some("text".into()),
            is_login_field: false,
            url: None,
        },
    );

    let outcome = matcher::classify(&reduce(&rec));
    assert_eq!(outcome.classifications.len(), 1);
    assert_eq!(outcome.classifications[0].param_name, "PRICE");
}
