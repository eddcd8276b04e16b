//! Tests for the interchange records: shapes on the wire, round-tripping
//! and load-order validation.
mod common;
use common::*;
use kairo::prelude::*;
use serde_json::json;

#[test]
fn test_connection_record_wire_shape() {
    let record = ConnectionRecord::Operation {
        from: "f".to_string(),
        output: "o".to_string(),
    };
    assert_eq!(
        serde_json::to_value(&record).unwrap(),
        json!({"type": "operation", "from": "f", "output": "o"})
    );

    let record = ConnectionRecord::Process {
        input: "x".to_string(),
    };
    assert_eq!(
        serde_json::to_value(&record).unwrap(),
        json!({"type": "process", "input": "x"})
    );
}

#[test]
fn test_process_record_wire_shape() {
    let workspace = tidy_workspace();
    let record = workspace.process("tidy").unwrap().to_record();
    let value = serde_json::to_value(&record).unwrap();

    assert_eq!(value["id"], "tidy");
    assert_eq!(value["inputs"]["raw"], "text");
    assert_eq!(value["outputs"]["clean"], "text");
    assert_eq!(value["outputConnections"]["clean"]["type"], "operation");
    assert_eq!(value["operations"][0]["type"], "function");
    assert_eq!(value["operations"][0]["function"], "trim");
    assert_eq!(value["operations"][0]["inputs"]["in"]["type"], "process");
    assert_eq!(value["operations"][0]["config"]["characters"], " \t\n");
}

#[test]
fn test_round_trip_preserves_behavior() {
    let original = nested_workspace();
    let json = original.to_record().to_json().unwrap();

    let reloaded =
        Workspace::from_record(WorkspaceRecord::from_json(&json).unwrap(), test_registry())
            .unwrap();

    let inputs = text_inputs(&[("txt", "  deep  ")]);
    assert_eq!(
        original.run("outer", &inputs).unwrap(),
        reloaded.run("outer", &inputs).unwrap()
    );
    assert_eq!(
        reloaded.run("outer", &inputs).unwrap().get("done"),
        Some(&text("deep"))
    );
}

#[test]
fn test_wrapped_processes_serialize_before_their_wrappers() {
    // `holder` is created first but wraps `inner`, so a valid record must
    // put `inner` first.
    let mut workspace = Workspace::new(test_registry());
    workspace
        .add_process(Process::new(
            "holder",
            [("x".to_string(), IoType::Text)],
            [("y".to_string(), IoType::Text)],
        ))
        .unwrap();
    workspace
        .add_process(Process::new(
            "inner",
            [("p".to_string(), IoType::Text)],
            [("q".to_string(), IoType::Text)],
        ))
        .unwrap();
    workspace
        .add_function_operation(
            "inner",
            "step",
            Position::default(),
            "trim",
            FunctionConfig::default(),
        )
        .unwrap();
    workspace
        .connect("inner", "step", "in", from_input("p"))
        .unwrap();
    workspace
        .connect_output("inner", "q", from_operation("step", "result"))
        .unwrap();
    workspace
        .add_process_operation("holder", "wrap", Position::default(), "inner")
        .unwrap();
    workspace
        .connect("holder", "wrap", "p", from_input("x"))
        .unwrap();
    workspace
        .connect_output("holder", "y", from_operation("wrap", "q"))
        .unwrap();

    let record = workspace.to_record();
    let ids: Vec<&str> = record
        .processes
        .iter()
        .map(|process| process.id.as_str())
        .collect();
    assert_eq!(ids, vec!["inner", "holder"]);

    // And the record loads back in that order.
    let reloaded = Workspace::from_record(record, test_registry()).unwrap();
    let outputs = reloaded
        .run("holder", &text_inputs(&[("x", "  v  ")]))
        .unwrap();
    assert_eq!(outputs.get("y"), Some(&text("v")));
}

#[test]
fn test_unknown_function_id_is_a_fatal_load_error() {
    let json = r#"{
        "processes": [{
            "id": "p",
            "inputs": {"x": "text"},
            "outputs": {"y": "text"},
            "outputConnections": {},
            "operations": [{
                "type": "function",
                "id": "op",
                "position": {"x": 0.0, "y": 0.0},
                "function": "nope",
                "config": {},
                "inputs": {}
            }]
        }]
    }"#;
    let record = WorkspaceRecord::from_json(json).unwrap();
    let error = Workspace::from_record(record, test_registry()).unwrap_err();
    assert!(matches!(error, GraphError::UnknownFunction { function_id } if function_id == "nope"));
}

#[test]
fn test_unknown_process_reference_is_a_fatal_load_error() {
    let json = r#"{
        "processes": [{
            "id": "p",
            "inputs": {"x": "text"},
            "outputs": {"y": "text"},
            "outputConnections": {},
            "operations": [{
                "type": "process",
                "id": "op",
                "position": {"x": 0.0, "y": 0.0},
                "process": "missing",
                "inputs": {}
            }]
        }]
    }"#;
    let record = WorkspaceRecord::from_json(json).unwrap();
    let error = Workspace::from_record(record, test_registry()).unwrap_err();
    assert!(matches!(error, GraphError::UnknownProcess { process_id } if process_id == "missing"));
}

#[test]
fn test_duplicate_operation_ids_are_a_fatal_load_error() {
    let mut record = tidy_workspace().to_record();
    let duplicate = record.processes[0].operations[0].clone();
    record.processes[0].operations.push(duplicate);

    let error = Workspace::from_record(record, test_registry()).unwrap_err();
    assert!(matches!(error, GraphError::DuplicateOperation { .. }));
}

#[test]
fn test_artifact_file_round_trip() {
    let directory = tempfile::tempdir().unwrap();
    let path = directory.path().join("workspace.json");
    let path = path.to_str().unwrap();

    let record = nested_workspace().to_record();
    record.save(path).unwrap();

    let reloaded = WorkspaceRecord::from_file(path).unwrap();
    assert_eq!(record, reloaded);
}

#[test]
fn test_malformed_json_is_rejected() {
    let error = WorkspaceRecord::from_json("{ not json").unwrap_err();
    assert!(matches!(error, ArtifactError::Malformed(_)));

    let error = WorkspaceRecord::from_file("/no/such/file.json").unwrap_err();
    assert!(matches!(error, ArtifactError::Io { .. }));
}
