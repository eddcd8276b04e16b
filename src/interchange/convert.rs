use super::record::{ConnectionRecord, OperationRecord, ProcessRecord, WorkspaceRecord};
use crate::error::GraphError;
use crate::functions::{FunctionConfig, FunctionRegistry};
use crate::graph::{Binding, Connection, Operation, Process, ProcessId};
use crate::workspace::Workspace;
use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;

impl Workspace {
    /// Serializes every process, ordered so that wrapped processes appear
    /// before the processes wrapping them.
    pub fn to_record(&self) -> WorkspaceRecord {
        let mut emitted: IndexSet<&ProcessId> = IndexSet::new();
        let mut processes = Vec::with_capacity(self.processes().len());
        for process in self.processes().values() {
            emit_process(self, process, &mut emitted, &mut processes);
        }
        WorkspaceRecord { processes }
    }

    /// Rebuilds a workspace from its interchange record.
    ///
    /// Operations are constructed before any wiring is applied, so an
    /// operation-sourced connection always finds its producer. A process
    /// must appear after every process it wraps; an unknown function or
    /// process id anywhere in the record is fatal.
    pub fn from_record(
        record: WorkspaceRecord,
        registry: FunctionRegistry,
    ) -> Result<Self, GraphError> {
        let mut workspace = Workspace::new(registry);
        for process_record in record.processes {
            load_process(&mut workspace, process_record)?;
        }
        Ok(workspace)
    }
}

impl Process {
    /// The interchange form of this process.
    pub fn to_record(&self) -> ProcessRecord {
        ProcessRecord {
            id: self.id().clone(),
            inputs: self.declared_inputs().clone(),
            outputs: self.declared_outputs().clone(),
            output_connections: self
                .output_connections()
                .iter()
                .map(|(name, connection)| (name.clone(), connection_to_record(connection)))
                .collect(),
            operations: self
                .operations()
                .values()
                .map(operation_to_record)
                .collect(),
        }
    }
}

fn emit_process<'a>(
    workspace: &'a Workspace,
    process: &'a Process,
    emitted: &mut IndexSet<&'a ProcessId>,
    out: &mut Vec<ProcessRecord>,
) {
    if !emitted.insert(process.id()) {
        return;
    }
    for operation in process.operations().values() {
        if let Some(nested_id) = operation.process_ref() {
            if let Some(nested) = workspace.process(nested_id) {
                emit_process(workspace, nested, emitted, out);
            }
        }
    }
    out.push(process.to_record());
}

fn load_process(workspace: &mut Workspace, record: ProcessRecord) -> Result<(), GraphError> {
    let ProcessRecord {
        id,
        inputs,
        outputs,
        output_connections,
        operations,
    } = record;

    if let Some(duplicate) = operations
        .iter()
        .map(OperationRecord::id)
        .duplicates()
        .next()
    {
        return Err(GraphError::DuplicateOperation {
            process_id: id,
            operation_id: duplicate.to_string(),
        });
    }

    workspace.add_process(Process::new(id.clone(), inputs, outputs))?;

    for operation in &operations {
        match operation {
            OperationRecord::Function {
                id: operation_id,
                position,
                function,
                config,
                ..
            } => {
                let config: FunctionConfig = config
                    .iter()
                    .map(|(name, literal)| (name.clone(), literal.clone()))
                    .collect();
                workspace.add_function_operation(
                    &id,
                    operation_id.clone(),
                    *position,
                    function,
                    config,
                )?;
            }
            OperationRecord::Process {
                id: operation_id,
                position,
                process,
                config,
                ..
            } => {
                workspace.add_process_operation(&id, operation_id.clone(), *position, process)?;
                for (parameter, literal) in config {
                    workspace.set_config(&id, operation_id, parameter, literal)?;
                }
            }
        }
    }

    for operation in &operations {
        let (operation_id, inputs) = match operation {
            OperationRecord::Function { id, inputs, .. }
            | OperationRecord::Process { id, inputs, .. } => (id, inputs),
        };
        for (input, connection) in inputs {
            workspace.connect(&id, operation_id, input, record_to_connection(connection))?;
        }
    }

    for (output, connection) in &output_connections {
        workspace.connect_output(&id, output, record_to_connection(connection))?;
    }

    Ok(())
}

fn operation_to_record(operation: &Operation) -> OperationRecord {
    let inputs: IndexMap<String, ConnectionRecord> = operation
        .wired_connections()
        .map(|(name, connection)| (name.to_string(), connection_to_record(connection)))
        .collect();
    match operation {
        Operation::Function(function_operation) => OperationRecord::Function {
            id: function_operation.id.clone(),
            position: function_operation.position,
            function: function_operation.function.clone(),
            config: fixed_config(operation),
            inputs,
        },
        Operation::Process(process_operation) => OperationRecord::Process {
            id: process_operation.id.clone(),
            position: process_operation.position,
            process: process_operation.process.clone(),
            config: fixed_config(operation),
            inputs,
        },
    }
}

fn fixed_config(operation: &Operation) -> IndexMap<String, String> {
    operation
        .bindings()
        .iter()
        .filter_map(|(name, binding)| match binding {
            Binding::Fixed(value) => Some((name.clone(), value.to_string())),
            Binding::Wired(_) => None,
        })
        .collect()
}

fn connection_to_record(connection: &Connection) -> ConnectionRecord {
    match connection {
        Connection::FromOperation { operation, output } => ConnectionRecord::Operation {
            from: operation.clone(),
            output: output.clone(),
        },
        Connection::FromProcessInput { input } => ConnectionRecord::Process {
            input: input.clone(),
        },
    }
}

fn record_to_connection(record: &ConnectionRecord) -> Connection {
    match record {
        ConnectionRecord::Operation { from, output } => Connection::FromOperation {
            operation: from.clone(),
            output: output.clone(),
        },
        ConnectionRecord::Process { input } => Connection::FromProcessInput {
            input: input.clone(),
        },
    }
}
