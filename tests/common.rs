//! Common test utilities for building workspaces and processes.
use kairo::functions::text_parameter;
use kairo::prelude::*;

/// A registry with the builtins plus two extra test functions: `concat`
/// joins two text values with a separator, `upper` uppercases one.
#[allow(dead_code)]
pub fn test_registry() -> FunctionRegistry {
    let mut registry = FunctionRegistry::with_builtins();
    registry.register(concat_function());
    registry.register(upper_function());
    registry
}

#[allow(dead_code)]
pub fn concat_function() -> CodeFunction {
    CodeFunction {
        id: "concat".to_string(),
        symbol: "CAT".to_string(),
        parameters: IndexMap::from([
            ("a".to_string(), ParameterDefinition::text()),
            ("b".to_string(), ParameterDefinition::text()),
            ("separator".to_string(), ParameterDefinition::text()),
        ]),
        outputs: IndexMap::from([("joined".to_string(), IoType::Text)]),
        default_config: vec![("separator".to_string(), "".to_string())],
        run: run_concat,
    }
}

#[allow(dead_code)]
fn run_concat(
    parameters: &IoValues,
    _config: &FunctionConfig,
) -> std::result::Result<IoValues, RunError> {
    let a = text_parameter(parameters, "a")?;
    let b = text_parameter(parameters, "b")?;
    let separator = text_parameter(parameters, "separator")?;
    Ok(IoValues::from([(
        "joined".to_string(),
        IoValue::Text(format!("{}{}{}", a, separator, b)),
    )]))
}

#[allow(dead_code)]
pub fn upper_function() -> CodeFunction {
    CodeFunction {
        id: "upper".to_string(),
        symbol: "UPR".to_string(),
        parameters: IndexMap::from([("in".to_string(), ParameterDefinition::text())]),
        outputs: IndexMap::from([("result".to_string(), IoType::Text)]),
        default_config: Vec::new(),
        run: run_upper,
    }
}

#[allow(dead_code)]
fn run_upper(
    parameters: &IoValues,
    _config: &FunctionConfig,
) -> std::result::Result<IoValues, RunError> {
    let input = text_parameter(parameters, "in")?;
    Ok(IoValues::from([(
        "result".to_string(),
        IoValue::Text(input.to_uppercase()),
    )]))
}

#[allow(dead_code)]
pub fn from_input(input: &str) -> Connection {
    Connection::FromProcessInput {
        input: input.to_string(),
    }
}

#[allow(dead_code)]
pub fn from_operation(operation: &str, output: &str) -> Connection {
    Connection::FromOperation {
        operation: operation.to_string(),
        output: output.to_string(),
    }
}

#[allow(dead_code)]
pub fn text(value: &str) -> IoValue {
    IoValue::Text(value.to_string())
}

#[allow(dead_code)]
pub fn text_inputs(entries: &[(&str, &str)]) -> IoValues {
    entries
        .iter()
        .map(|(name, value)| (name.to_string(), IoValue::Text(value.to_string())))
        .collect()
}

/// A workspace holding one process `tidy`: declared input `raw`, a trim
/// operation wired to it, declared output `clean` reading the result.
#[allow(dead_code)]
pub fn tidy_workspace() -> Workspace {
    let mut workspace = Workspace::new(test_registry());
    workspace
        .add_process(Process::new(
            "tidy",
            [("raw".to_string(), IoType::Text)],
            [("clean".to_string(), IoType::Text)],
        ))
        .unwrap();
    workspace
        .add_function_operation(
            "tidy",
            "trim-step",
            Position::default(),
            "trim",
            FunctionConfig::default(),
        )
        .unwrap();
    workspace
        .connect("tidy", "trim-step", "in", from_input("raw"))
        .unwrap();
    workspace
        .connect_output("tidy", "clean", from_operation("trim-step", "result"))
        .unwrap();
    workspace
}

/// A process `chain` of three trim operations wired `a -> b -> c`, with
/// the operations deliberately inserted in the order c, b, a.
#[allow(dead_code)]
pub fn chain_workspace() -> Workspace {
    let mut workspace = Workspace::new(test_registry());
    workspace
        .add_process(Process::new(
            "chain",
            [("s".to_string(), IoType::Text)],
            [("out".to_string(), IoType::Text)],
        ))
        .unwrap();
    for id in ["c", "b", "a"] {
        workspace
            .add_function_operation(
                "chain",
                id,
                Position::default(),
                "trim",
                FunctionConfig::default(),
            )
            .unwrap();
    }
    workspace
        .connect("chain", "a", "in", from_input("s"))
        .unwrap();
    workspace
        .connect("chain", "b", "in", from_operation("a", "result"))
        .unwrap();
    workspace
        .connect("chain", "c", "in", from_operation("b", "result"))
        .unwrap();
    workspace
        .connect_output("chain", "out", from_operation("c", "result"))
        .unwrap();
    workspace
}

/// Wraps the `tidy` process as a single operation inside a process
/// `outer`, whose declared output reads the wrapped process's output.
#[allow(dead_code)]
pub fn nested_workspace() -> Workspace {
    let mut workspace = tidy_workspace();
    workspace
        .add_process(Process::new(
            "outer",
            [("txt".to_string(), IoType::Text)],
            [("done".to_string(), IoType::Text)],
        ))
        .unwrap();
    workspace
        .add_process_operation("outer", "tidy-step", Position::default(), "tidy")
        .unwrap();
    workspace
        .connect("outer", "tidy-step", "raw", from_input("txt"))
        .unwrap();
    workspace
        .connect_output("outer", "done", from_operation("tidy-step", "clean"))
        .unwrap();
    workspace
}
