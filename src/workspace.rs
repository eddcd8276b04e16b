//! The top-level container: one function registry plus every process,
//! with all graph edits funnelled through a single validating facade.

use crate::error::{GraphError, RunError};
use crate::functions::{FunctionConfig, FunctionRegistry};
use crate::graph::{
    Binding, Connection, FunctionOperation, Operation, OperationId, Position, Process, ProcessId,
    ProcessOperation, ProcessTable,
};
use crate::value::{IoType, IoValue, IoValues};
use ahash::AHashSet;
use itertools::Itertools;
use tracing::debug;

/// Owns the function registry and every process.
///
/// Processes are held in a table and referenced by id, so a nested process
/// can be shared by any number of wrapping operations without ownership
/// cycles. Every edit validates against the registry and the sibling
/// processes before anything mutates; a rejected edit leaves the workspace
/// exactly as it was.
#[derive(Debug)]
pub struct Workspace {
    registry: FunctionRegistry,
    processes: ProcessTable,
}

impl Workspace {
    pub fn new(registry: FunctionRegistry) -> Self {
        Self {
            registry,
            processes: ProcessTable::new(),
        }
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    pub fn processes(&self) -> &ProcessTable {
        &self.processes
    }

    pub fn process(&self, process_id: &str) -> Option<&Process> {
        self.processes.get(process_id)
    }

    pub fn add_process(&mut self, process: Process) -> Result<(), GraphError> {
        if self.processes.contains_key(process.id()) {
            return Err(GraphError::DuplicateProcess {
                process_id: process.id().clone(),
            });
        }
        self.processes.insert(process.id().clone(), process);
        Ok(())
    }

    /// Removes a process, rejecting the edit while any other process still
    /// wraps it as an operation.
    pub fn remove_process(&mut self, process_id: &str) -> Result<Process, GraphError> {
        if !self.processes.contains_key(process_id) {
            return Err(GraphError::UnknownProcess {
                process_id: process_id.to_string(),
            });
        }
        let wrappers: Vec<&ProcessId> = self
            .processes
            .values()
            .filter(|process| {
                process
                    .operations()
                    .values()
                    .any(|operation| operation.process_ref().is_some_and(|id| id == process_id))
            })
            .map(Process::id)
            .collect();
        if !wrappers.is_empty() {
            return Err(GraphError::ProcessInUse {
                process_id: process_id.to_string(),
                used_by: wrappers.iter().join(", "),
            });
        }
        self.processes
            .shift_remove(process_id)
            .ok_or_else(|| GraphError::UnknownProcess {
                process_id: process_id.to_string(),
            })
    }

    /// Adds a function-backed operation, seeding its fixed bindings from
    /// `config` and the capability's defaults.
    pub fn add_function_operation(
        &mut self,
        process_id: &str,
        operation_id: impl Into<OperationId>,
        position: Position,
        function_id: &str,
        config: FunctionConfig,
    ) -> Result<(), GraphError> {
        let operation_id = operation_id.into();
        let process = self.lookup_process(process_id)?;
        if process.operation(&operation_id).is_some() {
            return Err(GraphError::DuplicateOperation {
                process_id: process_id.to_string(),
                operation_id,
            });
        }
        let capability =
            self.registry
                .get(function_id)
                .ok_or_else(|| GraphError::UnknownFunction {
                    function_id: function_id.to_string(),
                })?;
        let operation = FunctionOperation::new(operation_id.clone(), position, capability, config)?;
        debug!(process = process_id, operation = %operation_id, function = function_id, "operation added");
        if let Some(process) = self.processes.get_mut(process_id) {
            process.insert_operation(Operation::Function(operation));
        }
        Ok(())
    }

    /// Adds an operation wrapping another process, rejecting any wiring
    /// that would make a process contain itself.
    pub fn add_process_operation(
        &mut self,
        process_id: &str,
        operation_id: impl Into<OperationId>,
        position: Position,
        nested_id: &str,
    ) -> Result<(), GraphError> {
        let operation_id = operation_id.into();
        let process = self.lookup_process(process_id)?;
        if process.operation(&operation_id).is_some() {
            return Err(GraphError::DuplicateOperation {
                process_id: process_id.to_string(),
                operation_id,
            });
        }
        if !self.processes.contains_key(nested_id) {
            return Err(GraphError::UnknownProcess {
                process_id: nested_id.to_string(),
            });
        }
        if self.wraps_transitively(nested_id, process_id) {
            return Err(GraphError::RecursiveComposition {
                process_id: nested_id.to_string(),
            });
        }
        let operation =
            ProcessOperation::new(operation_id.clone(), position, nested_id.to_string());
        debug!(process = process_id, operation = %operation_id, nested = nested_id, "operation added");
        if let Some(process) = self.processes.get_mut(process_id) {
            process.insert_operation(Operation::Process(operation));
        }
        Ok(())
    }

    pub fn remove_operation(&mut self, process_id: &str, operation_id: &str) -> Result<(), GraphError> {
        self.lookup_operation(process_id, operation_id)?;
        if let Some(process) = self.processes.get_mut(process_id) {
            process.remove_operation(operation_id);
        }
        Ok(())
    }

    /// Layout-only; the cached execution order is untouched.
    pub fn move_operation(
        &mut self,
        process_id: &str,
        operation_id: &str,
        position: Position,
    ) -> Result<(), GraphError> {
        self.lookup_operation(process_id, operation_id)?;
        if let Some(process) = self.processes.get_mut(process_id) {
            process.set_operation_position(operation_id, position);
        }
        Ok(())
    }

    /// Wires a connection into an operation's input slot. The slot must be
    /// open (not fixed) and the connection's derived type must match it.
    pub fn connect(
        &mut self,
        process_id: &str,
        operation_id: &str,
        input: &str,
        connection: Connection,
    ) -> Result<(), GraphError> {
        let process = self.lookup_process(process_id)?;
        let operation = self.lookup_operation(process_id, operation_id)?;
        let expected = operation.input_slot_type(input, &self.registry, &self.processes)?;
        let found = process.connection_value_type(&connection, &self.registry, &self.processes)?;
        if expected != found {
            return Err(GraphError::TypeMismatch {
                slot: input.to_string(),
                expected,
                found,
            });
        }
        if let Some(process) = self.processes.get_mut(process_id) {
            process.bind_input(operation_id, input, Binding::Wired(connection));
        }
        Ok(())
    }

    /// Removes the wire on an input slot, leaving the slot open.
    pub fn disconnect(
        &mut self,
        process_id: &str,
        operation_id: &str,
        input: &str,
    ) -> Result<(), GraphError> {
        let operation = self.lookup_operation(process_id, operation_id)?;
        operation.input_slot_type(input, &self.registry, &self.processes)?;
        if let Some(process) = self.processes.get_mut(process_id) {
            process.unbind_input(operation_id, input);
        }
        Ok(())
    }

    /// Fixes a parameter to a configuration literal. Fixing a previously
    /// wired or open slot changes the operation's shape and invalidates
    /// the cached order; overwriting an already fixed value does not.
    pub fn set_config(
        &mut self,
        process_id: &str,
        operation_id: &str,
        parameter: &str,
        literal: &str,
    ) -> Result<(), GraphError> {
        let operation = self.lookup_operation(process_id, operation_id)?;
        let value = match operation {
            Operation::Function(function_operation) => {
                let capability = self.registry.get(&function_operation.function).ok_or_else(
                    || GraphError::UnknownFunction {
                        function_id: function_operation.function.clone(),
                    },
                )?;
                let definition = capability.parameter(parameter).ok_or_else(|| {
                    GraphError::UnknownParameter {
                        function_id: function_operation.function.clone(),
                        parameter: parameter.to_string(),
                    }
                })?;
                if !definition.accepts(literal) {
                    return Err(GraphError::InvalidConfigValue {
                        parameter: parameter.to_string(),
                        value: literal.to_string(),
                    });
                }
                IoValue::parse(definition.io_type, literal)
            }
            Operation::Process(process_operation) => {
                let nested = self.processes.get(&process_operation.process).ok_or_else(|| {
                    GraphError::UnknownProcess {
                        process_id: process_operation.process.clone(),
                    }
                })?;
                let io_type = nested.declared_inputs().get(parameter).copied().ok_or_else(
                    || GraphError::UnknownInput {
                        operation_id: operation_id.to_string(),
                        input: parameter.to_string(),
                    },
                )?;
                IoValue::parse(io_type, literal)
            }
        };
        let value = value.ok_or_else(|| GraphError::InvalidConfigValue {
            parameter: parameter.to_string(),
            value: literal.to_string(),
        })?;

        let was_fixed = matches!(operation.binding(parameter), Some(Binding::Fixed(_)));
        if let Some(process) = self.processes.get_mut(process_id) {
            if was_fixed {
                process.update_fixed(operation_id, parameter, value);
            } else {
                process.bind_input(operation_id, parameter, Binding::Fixed(value));
            }
        }
        Ok(())
    }

    /// Removes a fixed value, reopening the slot for wiring. Only
    /// input-eligible parameters may be reopened.
    pub fn remove_config(
        &mut self,
        process_id: &str,
        operation_id: &str,
        parameter: &str,
    ) -> Result<(), GraphError> {
        let operation = self.lookup_operation(process_id, operation_id)?;
        if let Operation::Function(function_operation) = operation {
            let capability = self.registry.get(&function_operation.function).ok_or_else(
                || GraphError::UnknownFunction {
                    function_id: function_operation.function.clone(),
                },
            )?;
            let definition = capability.parameter(parameter).ok_or_else(|| {
                GraphError::UnknownParameter {
                    function_id: function_operation.function.clone(),
                    parameter: parameter.to_string(),
                }
            })?;
            if !definition.input_eligible {
                return Err(GraphError::ParameterNotInputEligible {
                    function_id: function_operation.function.clone(),
                    parameter: parameter.to_string(),
                });
            }
        }
        if !matches!(operation.binding(parameter), Some(Binding::Fixed(_))) {
            return Err(GraphError::ParameterNotFixed {
                operation_id: operation_id.to_string(),
                parameter: parameter.to_string(),
            });
        }
        if let Some(process) = self.processes.get_mut(process_id) {
            process.unbind_input(operation_id, parameter);
        }
        Ok(())
    }

    /// Binds a declared process output to the connection that resolves it.
    pub fn connect_output(
        &mut self,
        process_id: &str,
        output: &str,
        connection: Connection,
    ) -> Result<(), GraphError> {
        let process = self.lookup_process(process_id)?;
        let expected = process.declared_outputs().get(output).copied().ok_or_else(|| {
            GraphError::UnknownProcessOutput {
                process_id: process_id.to_string(),
                output: output.to_string(),
            }
        })?;
        let found = process.connection_value_type(&connection, &self.registry, &self.processes)?;
        if expected != found {
            return Err(GraphError::TypeMismatch {
                slot: output.to_string(),
                expected,
                found,
            });
        }
        if let Some(process) = self.processes.get_mut(process_id) {
            process.connect_output(output, connection);
        }
        Ok(())
    }

    pub fn disconnect_output(&mut self, process_id: &str, output: &str) -> Result<(), GraphError> {
        let process = self.lookup_process(process_id)?;
        if !process.declared_outputs().contains_key(output) {
            return Err(GraphError::UnknownProcessOutput {
                process_id: process_id.to_string(),
                output: output.to_string(),
            });
        }
        if let Some(process) = self.processes.get_mut(process_id) {
            process.disconnect_output(output);
        }
        Ok(())
    }

    pub fn add_process_input(
        &mut self,
        process_id: &str,
        name: &str,
        io_type: IoType,
    ) -> Result<(), GraphError> {
        let process = self.lookup_process(process_id)?;
        if process.declared_inputs().contains_key(name) {
            return Err(GraphError::DuplicateDeclaredSlot {
                process_id: process_id.to_string(),
                slot_kind: "input",
                name: name.to_string(),
            });
        }
        if let Some(process) = self.processes.get_mut(process_id) {
            process.add_declared_input(name.to_string(), io_type);
        }
        Ok(())
    }

    /// Removes a declared input. Rejected while the input feeds any
    /// connection, while any enclosing process wires it, or when it is the
    /// last input left.
    pub fn remove_process_input(&mut self, process_id: &str, name: &str) -> Result<(), GraphError> {
        let process = self.lookup_process(process_id)?;
        if !process.declared_inputs().contains_key(name) {
            return Err(GraphError::UnknownProcessInput {
                process_id: process_id.to_string(),
                input: name.to_string(),
            });
        }
        if process.declared_inputs().len() <= 1 {
            return Err(GraphError::LastDeclaredSlot {
                process_id: process_id.to_string(),
                slot_kind: "input",
            });
        }
        if process.is_input_connected(name) || self.input_bound_by_wrapper(process_id, name) {
            return Err(GraphError::InputInUse {
                process_id: process_id.to_string(),
                input: name.to_string(),
            });
        }
        if let Some(process) = self.processes.get_mut(process_id) {
            process.remove_declared_input(name);
        }
        Ok(())
    }

    pub fn add_process_output(
        &mut self,
        process_id: &str,
        name: &str,
        io_type: IoType,
    ) -> Result<(), GraphError> {
        let process = self.lookup_process(process_id)?;
        if process.declared_outputs().contains_key(name) {
            return Err(GraphError::DuplicateDeclaredSlot {
                process_id: process_id.to_string(),
                slot_kind: "output",
                name: name.to_string(),
            });
        }
        if let Some(process) = self.processes.get_mut(process_id) {
            process.add_declared_output(name.to_string(), io_type);
        }
        Ok(())
    }

    /// Removes a declared output. Rejected while an output connection
    /// resolves it, while any enclosing process consumes it, or when it is
    /// the last output left.
    pub fn remove_process_output(&mut self, process_id: &str, name: &str) -> Result<(), GraphError> {
        let process = self.lookup_process(process_id)?;
        if !process.declared_outputs().contains_key(name) {
            return Err(GraphError::UnknownProcessOutput {
                process_id: process_id.to_string(),
                output: name.to_string(),
            });
        }
        if process.declared_outputs().len() <= 1 {
            return Err(GraphError::LastDeclaredSlot {
                process_id: process_id.to_string(),
                slot_kind: "output",
            });
        }
        if process.is_output_connected(name) || self.output_consumed_by_wrapper(process_id, name) {
            return Err(GraphError::OutputInUse {
                process_id: process_id.to_string(),
                output: name.to_string(),
            });
        }
        if let Some(process) = self.processes.get_mut(process_id) {
            process.remove_declared_output(name);
        }
        Ok(())
    }

    /// Runs a process against the given external inputs.
    pub fn run(&self, process_id: &str, inputs: &IoValues) -> Result<IoValues, RunError> {
        let process = self
            .processes
            .get(process_id)
            .ok_or_else(|| RunError::UnknownProcess {
                process_id: process_id.to_string(),
            })?;
        process.run(inputs, &self.registry, &self.processes)
    }

    fn lookup_process(&self, process_id: &str) -> Result<&Process, GraphError> {
        self.processes
            .get(process_id)
            .ok_or_else(|| GraphError::UnknownProcess {
                process_id: process_id.to_string(),
            })
    }

    fn lookup_operation(
        &self,
        process_id: &str,
        operation_id: &str,
    ) -> Result<&Operation, GraphError> {
        self.lookup_process(process_id)?
            .operation(operation_id)
            .ok_or_else(|| GraphError::UnknownOperation {
                process_id: process_id.to_string(),
                operation_id: operation_id.to_string(),
            })
    }

    /// Whether `start` wraps `target`, directly or through any chain of
    /// process operations. `start == target` counts as wrapping.
    fn wraps_transitively(&self, start: &str, target: &str) -> bool {
        let mut stack: Vec<&str> = vec![start];
        let mut seen: AHashSet<&str> = AHashSet::new();
        while let Some(current) = stack.pop() {
            if current == target {
                return true;
            }
            if !seen.insert(current) {
                continue;
            }
            if let Some(process) = self.processes.get(current) {
                for operation in process.operations().values() {
                    if let Some(nested) = operation.process_ref() {
                        stack.push(nested.as_str());
                    }
                }
            }
        }
        false
    }

    /// Whether any enclosing process operation fixes or wires the named
    /// input of the wrapped process.
    fn input_bound_by_wrapper(&self, process_id: &str, input: &str) -> bool {
        self.processes.values().any(|process| {
            process.operations().values().any(|operation| {
                operation.process_ref().is_some_and(|id| id == process_id)
                    && operation.binding(input).is_some()
            })
        })
    }

    /// Whether any connection in an enclosing process reads the named
    /// output of an operation wrapping this process.
    fn output_consumed_by_wrapper(&self, process_id: &str, output: &str) -> bool {
        self.processes.values().any(|process| {
            let wrapper_ids: AHashSet<&str> = process
                .operations()
                .values()
                .filter(|operation| operation.process_ref().is_some_and(|id| id == process_id))
                .map(|operation| operation.id().as_str())
                .collect();
            if wrapper_ids.is_empty() {
                return false;
            }
            let reads_wrapper = |connection: &Connection| {
                matches!(
                    connection,
                    Connection::FromOperation { operation, output: name }
                        if wrapper_ids.contains(operation.as_str()) && name == output
                )
            };
            process
                .operations()
                .values()
                .flat_map(Operation::wired_connections)
                .any(|(_, connection)| reads_wrapper(connection))
                || process.output_connections().values().any(reads_wrapper)
        })
    }
}
