use super::connection::Connection;
use super::process::RunFrame;
use super::{OperationId, ProcessId, ProcessTable};
use crate::error::{GraphError, RunError};
use crate::functions::{CodeFunction, FunctionConfig, FunctionId, FunctionRegistry};
use crate::value::{IoType, IoValue, IoValues};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Layout coordinates from the visual editor. Never semantic to execution.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// How one declared input slot is supplied: fixed to a configuration
/// value at edit time, or wired to a connection resolved per run.
///
/// A slot holds exactly one of the two, so a configured parameter can
/// never simultaneously carry a connection.
#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    Fixed(IoValue),
    Wired(Connection),
}

/// An operation backed by a registered function.
#[derive(Debug, Clone)]
pub struct FunctionOperation {
    pub id: OperationId,
    pub position: Position,
    pub function: FunctionId,
    bindings: IndexMap<String, Binding>,
}

impl FunctionOperation {
    /// Builds the operation against its capability, seeding fixed bindings
    /// from the explicit config and the capability's defaults.
    pub(crate) fn new(
        id: OperationId,
        position: Position,
        capability: &CodeFunction,
        config: FunctionConfig,
    ) -> Result<Self, GraphError> {
        for name in config.keys() {
            if capability.parameter(name).is_none() {
                return Err(GraphError::UnknownParameter {
                    function_id: capability.id.clone(),
                    parameter: name.clone(),
                });
            }
        }

        let mut bindings = IndexMap::new();
        for (name, definition) in &capability.parameters {
            let literal = config
                .get(name)
                .map(String::as_str)
                .or_else(|| capability.default_for(name));
            let Some(literal) = literal else {
                continue;
            };
            if !definition.accepts(literal) {
                return Err(GraphError::InvalidConfigValue {
                    parameter: name.clone(),
                    value: literal.to_string(),
                });
            }
            let value = IoValue::parse(definition.io_type, literal).ok_or_else(|| {
                GraphError::InvalidConfigValue {
                    parameter: name.clone(),
                    value: literal.to_string(),
                }
            })?;
            bindings.insert(name.clone(), Binding::Fixed(value));
        }

        Ok(Self {
            id,
            position,
            function: capability.id.clone(),
            bindings,
        })
    }
}

/// An operation backed by a nested process, run as a black box. Its input
/// and output slots are derived from that process's declared inputs and
/// outputs, never declared independently.
#[derive(Debug, Clone)]
pub struct ProcessOperation {
    pub id: OperationId,
    pub position: Position,
    pub process: ProcessId,
    bindings: IndexMap<String, Binding>,
}

impl ProcessOperation {
    pub(crate) fn new(id: OperationId, position: Position, process: ProcessId) -> Self {
        Self {
            id,
            position,
            process,
            bindings: IndexMap::new(),
        }
    }
}

/// A node in a process graph.
#[derive(Debug, Clone)]
pub enum Operation {
    Function(FunctionOperation),
    Process(ProcessOperation),
}

impl Operation {
    pub fn id(&self) -> &OperationId {
        match self {
            Operation::Function(operation) => &operation.id,
            Operation::Process(operation) => &operation.id,
        }
    }

    pub fn position(&self) -> Position {
        match self {
            Operation::Function(operation) => operation.position,
            Operation::Process(operation) => operation.position,
        }
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        match self {
            Operation::Function(operation) => operation.position = position,
            Operation::Process(operation) => operation.position = position,
        }
    }

    /// The function this operation runs, when function-backed.
    pub fn function_id(&self) -> Option<&str> {
        match self {
            Operation::Function(operation) => Some(&operation.function),
            Operation::Process(_) => None,
        }
    }

    /// The nested process this operation wraps, when process-backed.
    pub fn process_ref(&self) -> Option<&ProcessId> {
        match self {
            Operation::Function(_) => None,
            Operation::Process(operation) => Some(&operation.process),
        }
    }

    /// The current binding of one input slot, if any.
    pub fn binding(&self, name: &str) -> Option<&Binding> {
        self.bindings().get(name)
    }

    pub(crate) fn bindings(&self) -> &IndexMap<String, Binding> {
        match self {
            Operation::Function(operation) => &operation.bindings,
            Operation::Process(operation) => &operation.bindings,
        }
    }

    pub(crate) fn bindings_mut(&mut self) -> &mut IndexMap<String, Binding> {
        match self {
            Operation::Function(operation) => &mut operation.bindings,
            Operation::Process(operation) => &mut operation.bindings,
        }
    }

    /// Every connection currently wired into this operation.
    pub fn wired_connections(&self) -> impl Iterator<Item = (&str, &Connection)> {
        self.bindings()
            .iter()
            .filter_map(|(name, binding)| match binding {
                Binding::Wired(connection) => Some((name.as_str(), connection)),
                Binding::Fixed(_) => None,
            })
    }

    /// The declared input slots open for wiring: every input-eligible
    /// parameter (or nested-process input) that is not fixed to a
    /// configuration value.
    pub fn input_slots(
        &self,
        registry: &FunctionRegistry,
        processes: &ProcessTable,
    ) -> Result<Vec<(String, IoType)>, GraphError> {
        match self {
            Operation::Function(operation) => {
                let capability = lookup_capability(&operation.function, registry)?;
                Ok(capability
                    .parameters
                    .iter()
                    .filter(|(name, definition)| {
                        definition.input_eligible
                            && !matches!(operation.bindings.get(*name), Some(Binding::Fixed(_)))
                    })
                    .map(|(name, definition)| (name.clone(), definition.io_type))
                    .collect())
            }
            Operation::Process(operation) => {
                let nested = lookup_process(&operation.process, processes)?;
                Ok(nested
                    .declared_inputs()
                    .iter()
                    .filter(|(name, _)| {
                        !matches!(operation.bindings.get(*name), Some(Binding::Fixed(_)))
                    })
                    .map(|(name, io_type)| (name.clone(), *io_type))
                    .collect())
            }
        }
    }

    /// The type of one input slot, rejecting slots that cannot be wired.
    pub fn input_slot_type(
        &self,
        input: &str,
        registry: &FunctionRegistry,
        processes: &ProcessTable,
    ) -> Result<IoType, GraphError> {
        match self {
            Operation::Function(operation) => {
                let capability = lookup_capability(&operation.function, registry)?;
                let definition =
                    capability
                        .parameter(input)
                        .ok_or_else(|| GraphError::UnknownInput {
                            operation_id: operation.id.clone(),
                            input: input.to_string(),
                        })?;
                if !definition.input_eligible {
                    return Err(GraphError::ParameterNotInputEligible {
                        function_id: operation.function.clone(),
                        parameter: input.to_string(),
                    });
                }
                if matches!(operation.bindings.get(input), Some(Binding::Fixed(_))) {
                    return Err(GraphError::ParameterIsFixed {
                        operation_id: operation.id.clone(),
                        input: input.to_string(),
                    });
                }
                Ok(definition.io_type)
            }
            Operation::Process(operation) => {
                let nested = lookup_process(&operation.process, processes)?;
                let io_type = nested.declared_inputs().get(input).copied().ok_or_else(|| {
                    GraphError::UnknownInput {
                        operation_id: operation.id.clone(),
                        input: input.to_string(),
                    }
                })?;
                if matches!(operation.bindings.get(input), Some(Binding::Fixed(_))) {
                    return Err(GraphError::ParameterIsFixed {
                        operation_id: operation.id.clone(),
                        input: input.to_string(),
                    });
                }
                Ok(io_type)
            }
        }
    }

    /// The declared output slots, in declaration order.
    pub fn output_slots(
        &self,
        registry: &FunctionRegistry,
        processes: &ProcessTable,
    ) -> Result<Vec<(String, IoType)>, GraphError> {
        match self {
            Operation::Function(operation) => {
                let capability = lookup_capability(&operation.function, registry)?;
                Ok(capability
                    .outputs
                    .iter()
                    .map(|(name, io_type)| (name.clone(), *io_type))
                    .collect())
            }
            Operation::Process(operation) => {
                let nested = lookup_process(&operation.process, processes)?;
                Ok(nested
                    .declared_outputs()
                    .iter()
                    .map(|(name, io_type)| (name.clone(), *io_type))
                    .collect())
            }
        }
    }

    /// The type of one named output.
    pub fn output_type(
        &self,
        output: &str,
        registry: &FunctionRegistry,
        processes: &ProcessTable,
    ) -> Result<IoType, GraphError> {
        match self {
            Operation::Function(operation) => {
                let capability = lookup_capability(&operation.function, registry)?;
                capability
                    .output_type(output)
                    .ok_or_else(|| GraphError::UnknownOutput {
                        operation_id: operation.id.clone(),
                        output: output.to_string(),
                    })
            }
            Operation::Process(operation) => {
                let nested = lookup_process(&operation.process, processes)?;
                nested
                    .declared_outputs()
                    .get(output)
                    .copied()
                    .ok_or_else(|| GraphError::UnknownOutput {
                        operation_id: operation.id.clone(),
                        output: output.to_string(),
                    })
            }
        }
    }

    /// Executes this operation against the current run frame and returns
    /// its named outputs.
    pub(crate) fn perform(
        &self,
        frame: &RunFrame<'_>,
        registry: &FunctionRegistry,
        processes: &ProcessTable,
    ) -> Result<IoValues, RunError> {
        match self {
            Operation::Function(operation) => {
                let capability = registry.get(&operation.function).ok_or_else(|| {
                    RunError::UnknownFunction {
                        function_id: operation.function.clone(),
                    }
                })?;

                let mut values = IoValues::new();
                let mut config = FunctionConfig::default();
                for name in capability.parameters.keys() {
                    match operation.bindings.get(name) {
                        Some(Binding::Fixed(value)) => {
                            config.insert(name.clone(), value.to_string());
                            values.insert(name.clone(), value.clone());
                        }
                        Some(Binding::Wired(connection)) => {
                            values.insert(name.clone(), connection.resolve(frame)?);
                        }
                        None => {
                            return Err(RunError::UnwiredInput {
                                operation_id: operation.id.clone(),
                                input: name.clone(),
                            });
                        }
                    }
                }

                (capability.run)(&values, &config)
            }
            Operation::Process(operation) => {
                let nested = processes.get(&operation.process).ok_or_else(|| {
                    RunError::UnknownProcess {
                        process_id: operation.process.clone(),
                    }
                })?;

                let mut inputs = IoValues::new();
                for name in nested.declared_inputs().keys() {
                    match operation.bindings.get(name) {
                        Some(Binding::Fixed(value)) => {
                            inputs.insert(name.clone(), value.clone());
                        }
                        Some(Binding::Wired(connection)) => {
                            inputs.insert(name.clone(), connection.resolve(frame)?);
                        }
                        None => {
                            return Err(RunError::UnwiredInput {
                                operation_id: operation.id.clone(),
                                input: name.clone(),
                            });
                        }
                    }
                }

                nested.run(&inputs, registry, processes)
            }
        }
    }
}

fn lookup_capability<'a>(
    function: &str,
    registry: &'a FunctionRegistry,
) -> Result<&'a CodeFunction, GraphError> {
    registry
        .get(function)
        .ok_or_else(|| GraphError::UnknownFunction {
            function_id: function.to_string(),
        })
}

fn lookup_process<'a>(
    process: &ProcessId,
    processes: &'a ProcessTable,
) -> Result<&'a super::process::Process, GraphError> {
    processes
        .get(process)
        .ok_or_else(|| GraphError::UnknownProcess {
            process_id: process.clone(),
        })
}
