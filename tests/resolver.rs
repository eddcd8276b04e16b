//! Tests for execution-order resolution and cycle detection.
mod common;
use common::*;
use kairo::prelude::*;

fn order_of(workspace: &Workspace, process_id: &str) -> Vec<OperationId> {
    workspace
        .process(process_id)
        .unwrap()
        .execution_order()
        .unwrap()
}

fn index_of(order: &[OperationId], id: &str) -> usize {
    order.iter().position(|entry| entry == id).unwrap()
}

#[test]
fn test_producers_run_before_consumers() {
    let workspace = chain_workspace();
    let order = order_of(&workspace, "chain");

    assert_eq!(order.len(), 3);
    assert!(index_of(&order, "a") < index_of(&order, "b"));
    assert!(index_of(&order, "b") < index_of(&order, "c"));
}

#[test]
fn test_resolution_is_deterministic() {
    let first = order_of(&chain_workspace(), "chain");
    let second = order_of(&chain_workspace(), "chain");
    assert_eq!(first, second);

    let workspace = chain_workspace();
    assert_eq!(order_of(&workspace, "chain"), order_of(&workspace, "chain"));
}

#[test]
fn test_independent_operations_keep_insertion_order() {
    let mut workspace = Workspace::new(test_registry());
    workspace
        .add_process(Process::new(
            "flat",
            [("s".to_string(), IoType::Text)],
            [("out".to_string(), IoType::Text)],
        ))
        .unwrap();
    for id in ["first", "second", "third"] {
        workspace
            .add_function_operation(
                "flat",
                id,
                Position::default(),
                "trim",
                FunctionConfig::default(),
            )
            .unwrap();
        workspace.connect("flat", id, "in", from_input("s")).unwrap();
    }

    // All three read only the process input, so nothing constrains them
    // beyond the insertion order of the operation table.
    assert_eq!(order_of(&workspace, "flat"), vec!["first", "second", "third"]);
}

#[test]
fn test_cycle_is_reported_not_looped() {
    let mut workspace = Workspace::new(test_registry());
    workspace
        .add_process(Process::new(
            "loopy",
            [("s".to_string(), IoType::Text)],
            [("out".to_string(), IoType::Text)],
        ))
        .unwrap();
    for id in ["o1", "o2"] {
        workspace
            .add_function_operation(
                "loopy",
                id,
                Position::default(),
                "trim",
                FunctionConfig::default(),
            )
            .unwrap();
    }
    workspace
        .connect("loopy", "o1", "in", from_operation("o2", "result"))
        .unwrap();
    workspace
        .connect("loopy", "o2", "in", from_operation("o1", "result"))
        .unwrap();
    workspace
        .connect_output("loopy", "out", from_operation("o2", "result"))
        .unwrap();

    let error = workspace
        .process("loopy")
        .unwrap()
        .execution_order()
        .unwrap_err();
    assert!(error.operation_id == "o1" || error.operation_id == "o2");

    // The run must refuse to execute anything.
    let result = workspace.run("loopy", &text_inputs(&[("s", "x")]));
    assert!(matches!(result, Err(RunError::Cycle(_))));
}

#[test]
fn test_cycle_error_names_an_operation_on_the_cycle() {
    // d depends on the o1/o2 cycle but sits outside it.
    let mut workspace = Workspace::new(test_registry());
    workspace
        .add_process(Process::new(
            "loopy",
            [("s".to_string(), IoType::Text)],
            [("out".to_string(), IoType::Text)],
        ))
        .unwrap();
    for id in ["o1", "o2", "d"] {
        workspace
            .add_function_operation(
                "loopy",
                id,
                Position::default(),
                "trim",
                FunctionConfig::default(),
            )
            .unwrap();
    }
    workspace
        .connect("loopy", "o1", "in", from_operation("o2", "result"))
        .unwrap();
    workspace
        .connect("loopy", "o2", "in", from_operation("o1", "result"))
        .unwrap();
    workspace
        .connect("loopy", "d", "in", from_operation("o2", "result"))
        .unwrap();

    let error = workspace
        .process("loopy")
        .unwrap()
        .execution_order()
        .unwrap_err();
    assert!(
        error.operation_id == "o1" || error.operation_id == "o2",
        "reported '{}', which is not on the cycle",
        error.operation_id
    );
}

#[test]
fn test_operations_fed_only_by_process_inputs_are_schedulable() {
    let workspace = tidy_workspace();
    assert_eq!(order_of(&workspace, "tidy"), vec!["trim-step"]);
}
