// crates/seqnodes/tests/server_variable_test.rs

mod common;

use common::{workspace_with, RecordingUi};
use seqcore::{
    ChannelError, ExecutionStatus, Instruction, LocalChannelHub, NodeError, ProcedureWorkspace,
    ScalarType, SetupError, TypedValue, Value, Variable, Workspace,
};
use seqnodes::{ChannelReadInstruction, ChannelWriteInstruction, ServerVariable};
use std::sync::Arc;

fn server_variable(hub: &Arc<LocalChannelHub>, attributes: &[(&str, &str)]) -> ServerVariable {
    let mut var = ServerVariable::with_hub(hub.clone());
    for (name, value) in attributes {
        var.attributes_mut().set(*name, *value);
    }
    var
}

#[test]
fn setup_hosts_channel_with_initial_value() {
    let hub = Arc::new(LocalChannelHub::new());
    let mut var = server_variable(
        &hub,
        &[("channel", "SRV:A"), ("type", r#"{"type":"int16"}"#), ("value", "-7")],
    );
    var.setup().unwrap();

    assert!(hub.is_hosted("SRV:A"));
    assert!(var.is_available());
    assert_eq!(var.channel(), Some("SRV:A"));
    assert_eq!(var.get_value().unwrap().value(), &Value::Int(-7));
}

#[test]
fn hosted_without_value_is_not_available() {
    let hub = Arc::new(LocalChannelHub::new());
    let mut var = server_variable(&hub, &[("channel", "SRV:B"), ("type", r#"{"type":"bool"}"#)]);
    var.setup().unwrap();
    assert!(!var.is_available());

    var.set_value(TypedValue::scalar(ScalarType::Bool, true).unwrap())
        .unwrap();
    assert!(var.is_available());
}

#[test]
fn second_host_of_same_channel_fails_setup() {
    let hub = Arc::new(LocalChannelHub::new());
    let mut first = server_variable(&hub, &[("channel", "SRV:C"), ("type", r#"{"type":"bool"}"#)]);
    let mut second = server_variable(&hub, &[("channel", "SRV:C"), ("type", r#"{"type":"bool"}"#)]);

    first.setup().unwrap();
    assert_eq!(
        second.setup(),
        Err(SetupError::Channel(ChannelError::AlreadyHosted(
            "SRV:C".to_string()
        )))
    );
    assert_eq!(first.channel(), Some("SRV:C"));
    assert_eq!(second.channel(), None);
}

#[test]
fn malformed_type_or_value_fails_setup() {
    let hub = Arc::new(LocalChannelHub::new());
    let mut var = server_variable(&hub, &[("channel", "SRV:D"), ("type", "int16")]);
    assert!(matches!(var.setup(), Err(SetupError::TypeParse(_))));

    let mut var = server_variable(
        &hub,
        &[("channel", "SRV:D"), ("type", r#"{"type":"uint8"}"#), ("value", "300")],
    );
    assert!(matches!(var.setup(), Err(SetupError::ValueParse(_))));
    assert!(!hub.is_hosted("SRV:D"));
}

#[test]
fn reset_and_drop_release_the_endpoint() {
    let hub = Arc::new(LocalChannelHub::new());
    let mut var = server_variable(
        &hub,
        &[("channel", "SRV:E"), ("type", r#"{"type":"bool"}"#), ("value", "true")],
    );
    var.setup().unwrap();
    var.reset();
    assert!(!hub.is_hosted("SRV:E"));
    assert!(!var.is_available());
    assert!(matches!(
        var.set_value(TypedValue::scalar(ScalarType::Bool, false).unwrap()),
        Err(NodeError::UnavailableSource(_))
    ));

    var.setup().unwrap();
    assert!(hub.is_hosted("SRV:E"));
    drop(var);
    assert!(!hub.is_hosted("SRV:E"));
}

#[tokio::test]
async fn channel_instructions_reach_the_hosted_value() {
    let hub = Arc::new(LocalChannelHub::new());
    let mut workspace = ProcedureWorkspace::new();
    workspace.add_variable(
        "server",
        Box::new(server_variable(
            &hub,
            &[("channel", "SRV:F"), ("type", r#"{"type":"float64"}"#), ("value", "0")],
        )),
    );
    workspace.setup().unwrap();

    let mut write = ChannelWriteInstruction::with_transport(hub.clone());
    write.attributes_mut().set("channel", "SRV:F");
    write.attributes_mut().set("type", r#"{"type":"int32"}"#);
    write.attributes_mut().set("value", "12");
    write.setup().unwrap();

    let ui = RecordingUi::default();
    assert_eq!(write.execute(&ui, &workspace).await, ExecutionStatus::Success);
    assert_eq!(
        workspace.get_value("server").unwrap().value(),
        &Value::Float(12.0)
    );

    let target = workspace_with(&[("copy", r#"{"type":"float64"}"#, None)]);
    let mut read = ChannelReadInstruction::with_transport(hub.clone());
    read.attributes_mut().set("channel", "SRV:F");
    read.attributes_mut().set("outputVar", "copy");
    read.setup().unwrap();

    assert_eq!(read.execute(&ui, &target).await, ExecutionStatus::Success);
    assert_eq!(target.get_value("copy").unwrap().value(), &Value::Float(12.0));

    workspace.reset();
    assert!(!hub.is_hosted("SRV:F"));
}
