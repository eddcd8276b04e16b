use super::connection::Connection;
use super::operation::{Binding, Operation, Position};
use super::resolver::resolve_execution_order;
use super::{OperationId, ProcessId, ProcessTable};
use crate::error::{CycleError, GraphError, RunError};
use crate::functions::FunctionRegistry;
use crate::value::{IoType, IoValue, IoValues};
use ahash::AHashMap;
use indexmap::IndexMap;
use std::cell::RefCell;
use tracing::{debug, trace};

/// Scratch state of a single `run` call: the external input values and
/// every operation's resolved outputs, keyed by operation id.
///
/// The frame is dropped when the run returns, so nothing persists between
/// runs and a nested process shared by several enclosing processes never
/// carries state from one caller into another.
pub(crate) struct RunFrame<'a> {
    external: &'a IoValues,
    resolved: AHashMap<OperationId, IoValues>,
}

impl<'a> RunFrame<'a> {
    fn new(external: &'a IoValues) -> Self {
        Self {
            external,
            resolved: AHashMap::new(),
        }
    }

    pub(crate) fn external(&self, input: &str) -> Option<&IoValue> {
        self.external.get(input)
    }

    pub(crate) fn resolved(&self, operation: &OperationId) -> Option<&IoValues> {
        self.resolved.get(operation)
    }

    fn store(&mut self, operation: OperationId, outputs: IoValues) {
        self.resolved.insert(operation, outputs);
    }
}

/// A named dataflow graph: operations, their wiring, and the declared
/// inputs and outputs that make the whole graph reusable as a black box.
///
/// The execution order is computed once and cached; every structural edit
/// (adding or removing an operation, changing any wiring, toggling a
/// parameter between fixed and wired) clears the cache synchronously.
#[derive(Debug, Clone)]
pub struct Process {
    id: ProcessId,
    operations: IndexMap<OperationId, Operation>,
    inputs: IndexMap<String, IoType>,
    outputs: IndexMap<String, IoType>,
    output_connections: IndexMap<String, Connection>,
    schedule: RefCell<Option<Vec<OperationId>>>,
}

impl Process {
    pub fn new<I, O>(id: impl Into<ProcessId>, inputs: I, outputs: O) -> Self
    where
        I: IntoIterator<Item = (String, IoType)>,
        O: IntoIterator<Item = (String, IoType)>,
    {
        Self {
            id: id.into(),
            operations: IndexMap::new(),
            inputs: inputs.into_iter().collect(),
            outputs: outputs.into_iter().collect(),
            output_connections: IndexMap::new(),
            schedule: RefCell::new(None),
        }
    }

    pub fn id(&self) -> &ProcessId {
        &self.id
    }

    pub fn operations(&self) -> &IndexMap<OperationId, Operation> {
        &self.operations
    }

    pub fn operation(&self, operation_id: &str) -> Option<&Operation> {
        self.operations.get(operation_id)
    }

    /// The declared external inputs, in declaration order.
    pub fn declared_inputs(&self) -> &IndexMap<String, IoType> {
        &self.inputs
    }

    /// The declared outputs, in declaration order.
    pub fn declared_outputs(&self) -> &IndexMap<String, IoType> {
        &self.outputs
    }

    pub fn output_connections(&self) -> &IndexMap<String, Connection> {
        &self.output_connections
    }

    /// Whether any connection in this process reads the declared input.
    pub fn is_input_connected(&self, input: &str) -> bool {
        let reads_input = |connection: &Connection| {
            matches!(connection, Connection::FromProcessInput { input: name } if name == input)
        };
        self.operations
            .values()
            .flat_map(Operation::wired_connections)
            .any(|(_, connection)| reads_input(connection))
            || self.output_connections.values().any(reads_input)
    }

    /// Whether the declared output is bound to an output connection.
    pub fn is_output_connected(&self, output: &str) -> bool {
        self.output_connections.contains_key(output)
    }

    /// The type a connection would carry, derived from its source.
    pub fn connection_value_type(
        &self,
        connection: &Connection,
        registry: &FunctionRegistry,
        processes: &ProcessTable,
    ) -> Result<IoType, GraphError> {
        match connection {
            Connection::FromOperation { operation, output } => {
                let source = self.operations.get(operation).ok_or_else(|| {
                    GraphError::UnknownOperation {
                        process_id: self.id.clone(),
                        operation_id: operation.clone(),
                    }
                })?;
                source.output_type(output, registry, processes)
            }
            Connection::FromProcessInput { input } => {
                self.inputs
                    .get(input)
                    .copied()
                    .ok_or_else(|| GraphError::UnknownProcessInput {
                        process_id: self.id.clone(),
                        input: input.clone(),
                    })
            }
        }
    }

    /// A safe order to execute the operations in, computed on first use
    /// and cached until the next structural edit.
    pub fn execution_order(&self) -> Result<Vec<OperationId>, CycleError> {
        if let Some(schedule) = self.schedule.borrow().as_ref() {
            return Ok(schedule.clone());
        }
        let schedule = resolve_execution_order(&self.operations)?;
        debug!(process = %self.id, operations = schedule.len(), "execution order resolved");
        *self.schedule.borrow_mut() = Some(schedule.clone());
        Ok(schedule)
    }

    /// Executes every operation in the resolved order against the given
    /// external inputs and returns the declared outputs.
    ///
    /// The input map must carry exactly the declared inputs, each with its
    /// declared type.
    pub fn run(
        &self,
        inputs: &IoValues,
        registry: &FunctionRegistry,
        processes: &ProcessTable,
    ) -> Result<IoValues, RunError> {
        self.check_run_inputs(inputs)?;
        let schedule = self.execution_order()?;
        debug!(process = %self.id, operations = schedule.len(), "running process");

        let mut frame = RunFrame::new(inputs);
        for operation_id in &schedule {
            let operation =
                self.operations
                    .get(operation_id)
                    .ok_or_else(|| RunError::StaleSchedule {
                        operation_id: operation_id.clone(),
                    })?;
            let outputs = operation.perform(&frame, registry, processes)?;
            frame.store(operation_id.clone(), outputs);
        }

        let mut resolved = IoValues::new();
        for name in self.outputs.keys() {
            let connection =
                self.output_connections
                    .get(name)
                    .ok_or_else(|| RunError::UnwiredOutput {
                        output: name.clone(),
                    })?;
            resolved.insert(name.clone(), connection.resolve(&frame)?);
        }
        Ok(resolved)
    }

    fn check_run_inputs(&self, inputs: &IoValues) -> Result<(), RunError> {
        for (name, expected) in &self.inputs {
            match inputs.get(name) {
                None => {
                    return Err(RunError::MissingInput {
                        input: name.clone(),
                    });
                }
                Some(value) if value.io_type() != *expected => {
                    return Err(RunError::InputTypeMismatch {
                        input: name.clone(),
                        expected: *expected,
                        found: value.io_type(),
                    });
                }
                Some(_) => {}
            }
        }
        for name in inputs.keys() {
            if !self.inputs.contains_key(name) {
                return Err(RunError::UnexpectedInput {
                    input: name.clone(),
                });
            }
        }
        Ok(())
    }

    pub(crate) fn invalidate_schedule(&self) {
        trace!(process = %self.id, "cached execution order invalidated");
        self.schedule.borrow_mut().take();
    }

    pub(crate) fn insert_operation(&mut self, operation: Operation) {
        self.operations.insert(operation.id().clone(), operation);
        self.invalidate_schedule();
    }

    /// Removes an operation together with every connection that read it.
    pub(crate) fn remove_operation(&mut self, operation_id: &str) -> Option<Operation> {
        let removed = self.operations.shift_remove(operation_id)?;
        for operation in self.operations.values_mut() {
            operation.bindings_mut().retain(|_, binding| match binding {
                Binding::Wired(Connection::FromOperation {
                    operation: producer,
                    ..
                }) => producer.as_str() != operation_id,
                _ => true,
            });
        }
        self.output_connections.retain(|_, connection| match connection {
            Connection::FromOperation {
                operation: producer,
                ..
            } => producer.as_str() != operation_id,
            _ => true,
        });
        self.invalidate_schedule();
        Some(removed)
    }

    pub(crate) fn bind_input(&mut self, operation_id: &str, input: &str, binding: Binding) {
        if let Some(operation) = self.operations.get_mut(operation_id) {
            operation.bindings_mut().insert(input.to_string(), binding);
        }
        self.invalidate_schedule();
    }

    pub(crate) fn unbind_input(&mut self, operation_id: &str, input: &str) {
        if let Some(operation) = self.operations.get_mut(operation_id) {
            operation.bindings_mut().shift_remove(input);
        }
        self.invalidate_schedule();
    }

    /// Overwrites an already fixed value without touching the cached
    /// order; the graph shape is unchanged.
    pub(crate) fn update_fixed(&mut self, operation_id: &str, input: &str, value: IoValue) {
        if let Some(operation) = self.operations.get_mut(operation_id) {
            operation
                .bindings_mut()
                .insert(input.to_string(), Binding::Fixed(value));
        }
    }

    pub(crate) fn set_operation_position(&mut self, operation_id: &str, position: Position) {
        if let Some(operation) = self.operations.get_mut(operation_id) {
            operation.set_position(position);
        }
    }

    pub(crate) fn connect_output(&mut self, output: &str, connection: Connection) {
        self.output_connections
            .insert(output.to_string(), connection);
        self.invalidate_schedule();
    }

    pub(crate) fn disconnect_output(&mut self, output: &str) -> Option<Connection> {
        let removed = self.output_connections.shift_remove(output);
        self.invalidate_schedule();
        removed
    }

    pub(crate) fn add_declared_input(&mut self, name: String, io_type: IoType) {
        self.inputs.insert(name, io_type);
        self.invalidate_schedule();
    }

    pub(crate) fn remove_declared_input(&mut self, name: &str) {
        self.inputs.shift_remove(name);
        self.invalidate_schedule();
    }

    pub(crate) fn add_declared_output(&mut self, name: String, io_type: IoType) {
        self.outputs.insert(name, io_type);
        self.invalidate_schedule();
    }

    pub(crate) fn remove_declared_output(&mut self, name: &str) {
        self.outputs.shift_remove(name);
        self.invalidate_schedule();
    }
}
