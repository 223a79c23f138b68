#![warn(rust_2018_idioms)]

use apl::{AplError, Effect, Operator, Policy, StatementKind};
use serde_json::{json, Value};
use uuid::Uuid;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn build_sqs_policy() -> Policy {
    let mut policy = Policy::sqs();

    let st = policy.new_statement().unwrap();
    st.set_effect("Allow").unwrap();
    st.set_action("SQS:SendMessge").unwrap();
    st.set_resource("arn:aws:sqs:us-east-1:123456789012:queue");
    st.principal_mut().set("AWS", "123456789012");

    let st = policy.new_statement().unwrap();
    st.set_effect("Deny").unwrap();
    st.set_action("SQS:*").unwrap();
    st.set_resource("arn:aws:sqs:us-east-1:123456789012:queue");
    st.principal_mut().set("AWS", "*");
    st.principal_mut().set("AWS", "210987654321");
    st.add_condition("AWS:SourceIp", "NotIpAddress", vec!["10.0.0.0/8"]).unwrap();
    st.add_condition("AWS:SourceIp", "NotIpAddress", vec!["192.168.0.0/16"]).unwrap();
    st.add_condition("AWS:SecureTransport", "Bool", vec![false]).unwrap();

    policy
}

#[test]
fn sqs_policy_matches_fixture() {
    init_logging();

    // sqs_policy.json is the expected document minus the randomly generated Id
    let jsp = include_str!("./sqs_policy.json");
    let expected: Value = serde_json::from_str(jsp).expect("sqs_policy.json is invalid");

    let policy = build_sqs_policy();
    let mut actual: Value = serde_json::from_str(&policy.to_json().unwrap()).unwrap();

    let id = actual
        .as_object_mut()
        .unwrap()
        .remove("Id")
        .expect("policy document has no Id");
    let id = Uuid::parse_str(id.as_str().unwrap()).expect("Id is not a uuid");
    assert_eq!(policy.id(), &id);

    assert_eq!(expected, actual);
}

#[test]
fn sqs_policy_json_round_trip() {
    init_logging();

    let policy = build_sqs_policy();
    let parsed = Policy::from_json(&policy.to_json_pretty().unwrap(), StatementKind::Sqs).unwrap();
    assert_eq!(policy, parsed);

    let st = &parsed.statements()[1];
    assert_eq!(Some(Effect::Deny), st.effect());
    assert_eq!(2, st.condition().get(Operator::NotIpAddress, "AWS:SourceIp").unwrap().len());
}

#[test]
fn statements_keep_creation_order() {
    init_logging();

    let mut policy = Policy::sqs();
    for i in 0..10 {
        let st = policy.new_statement().unwrap();
        st.set_resource(format!("arn:aws:sqs:us-east-1:123456789012:queue-{}", i));
    }

    let value: Value = serde_json::from_str(&policy.to_json().unwrap()).unwrap();
    let statements = value["Statement"].as_array().unwrap();
    assert_eq!(10, statements.len());
    for (i, st) in statements.iter().enumerate() {
        assert_eq!(Value::String((i + 1).to_string()), st["Sid"]);
        assert_eq!(
            Value::String(format!("arn:aws:sqs:us-east-1:123456789012:queue-{}", i)),
            st["Resource"]
        );
    }
}

#[test]
fn rejected_writes_leave_document_unchanged() {
    init_logging();

    let mut policy = Policy::sqs();
    let st = policy.new_statement().unwrap();
    st.set_action("SQS:ReceiveMessage").unwrap();
    let before = policy.to_json().unwrap();

    let st = &mut policy.statements_mut()[0];
    assert!(st.set_effect("Allowed").is_err());
    assert!(st.set_action("EC2:RunInstances").is_err());
    assert!(st.add_condition("Foo:Bar", "StringEquals", vec!["x"]).is_err());

    assert_eq!(before, policy.to_json().unwrap());
}

#[test]
fn version_alias() {
    let policy = Policy::with_version(StatementKind::Generic, "2012-10-17");
    assert_eq!(
        Value::String(policy.version().to_owned()),
        policy.field("version").unwrap()
    );

    match policy.field("nonexistent") {
        Err(AplError::KeyNotFound(_)) => {}
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn array_condition_value_round_trip() {
    let mut policy = Policy::sqs();
    let st = policy.new_statement().unwrap();
    st.add_condition("AWS:SourceIp", "IpAddress", vec![json!(["10.0.0.0/8", "10.1.0.0/16"])])
        .unwrap();
    st.add_condition("AWS:UserAgent", "StringLike", Vec::<&str>::new()).unwrap();

    let parsed = Policy::from_json(&policy.to_json().unwrap(), StatementKind::Sqs).unwrap();
    assert_eq!(policy, parsed);
}
