use crate::value::IoType;
use thiserror::Error;

/// Errors raised by graph-editing and loading calls.
///
/// Every one of these rejects the offending edit before anything mutates,
/// so the graph keeps its prior valid state.
#[derive(Error, Debug, Clone)]
pub enum GraphError {
    #[error("Function '{function_id}' is not registered")]
    UnknownFunction { function_id: String },

    #[error("Process '{process_id}' does not exist")]
    UnknownProcess { process_id: String },

    #[error("Process '{process_id}' has no operation '{operation_id}'")]
    UnknownOperation {
        process_id: String,
        operation_id: String,
    },

    #[error("Process '{process_id}' already contains an operation '{operation_id}'")]
    DuplicateOperation {
        process_id: String,
        operation_id: String,
    },

    #[error("A process '{process_id}' already exists")]
    DuplicateProcess { process_id: String },

    #[error("Operation '{operation_id}' has no input slot named '{input}'")]
    UnknownInput {
        operation_id: String,
        input: String,
    },

    #[error("Operation '{operation_id}' has no output named '{output}'")]
    UnknownOutput {
        operation_id: String,
        output: String,
    },

    #[error("Process '{process_id}' declares no input named '{input}'")]
    UnknownProcessInput { process_id: String, input: String },

    #[error("Process '{process_id}' declares no output named '{output}'")]
    UnknownProcessOutput { process_id: String, output: String },

    #[error("Process '{process_id}' already declares a {slot_kind} named '{name}'")]
    DuplicateDeclaredSlot {
        process_id: String,
        slot_kind: &'static str,
        name: String,
    },

    #[error("Function '{function_id}' has no parameter named '{parameter}'")]
    UnknownParameter {
        function_id: String,
        parameter: String,
    },

    #[error("Parameter '{parameter}' of function '{function_id}' cannot be wired as an input")]
    ParameterNotInputEligible {
        function_id: String,
        parameter: String,
    },

    #[error("Input '{input}' of operation '{operation_id}' is fixed to a configuration value")]
    ParameterIsFixed {
        operation_id: String,
        input: String,
    },

    #[error("'{value}' is not a valid value for parameter '{parameter}'")]
    InvalidConfigValue { parameter: String, value: String },

    #[error("Parameter '{parameter}' of operation '{operation_id}' has no fixed value to remove")]
    ParameterNotFixed {
        operation_id: String,
        parameter: String,
    },

    #[error("Connection carries {found} but the '{slot}' slot expects {expected}")]
    TypeMismatch {
        slot: String,
        expected: IoType,
        found: IoType,
    },

    #[error("Wrapping process '{process_id}' here would make it contain itself")]
    RecursiveComposition { process_id: String },

    #[error("Input '{input}' of process '{process_id}' is still connected")]
    InputInUse { process_id: String, input: String },

    #[error("Output '{output}' of process '{process_id}' is still connected")]
    OutputInUse { process_id: String, output: String },

    #[error("Process '{process_id}' cannot drop its last declared {slot_kind}")]
    LastDeclaredSlot {
        process_id: String,
        slot_kind: &'static str,
    },

    #[error("Process '{process_id}' is still used as an operation by: {used_by}")]
    ProcessInUse { process_id: String, used_by: String },
}

/// The operation graph admits no order in which every operation runs after
/// its producers. The named operation sits on one of the cycles.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Operation '{operation_id}' is part of a dependency cycle")]
pub struct CycleError {
    pub operation_id: String,
}

/// Errors raised while executing a process.
#[derive(Error, Debug, Clone)]
pub enum RunError {
    #[error("Run is missing a value for declared input '{input}'")]
    MissingInput { input: String },

    #[error("Run supplied a value for '{input}', which the process does not declare")]
    UnexpectedInput { input: String },

    #[error("Input '{input}' expects {expected} but was given {found}")]
    InputTypeMismatch {
        input: String,
        expected: IoType,
        found: IoType,
    },

    #[error(transparent)]
    Cycle(#[from] CycleError),

    #[error("Input '{input}' of operation '{operation_id}' is neither wired nor configured")]
    UnwiredInput {
        operation_id: String,
        input: String,
    },

    #[error("Declared output '{output}' has no connection to resolve it")]
    UnwiredOutput { output: String },

    #[error("Function '{function_id}' is not registered")]
    UnknownFunction { function_id: String },

    #[error("Process '{process_id}' does not exist")]
    UnknownProcess { process_id: String },

    #[error("Parameter '{parameter}' is missing or carries the wrong type")]
    ParameterMismatch { parameter: String },

    /// Invariant violation: the schedule placed a consumer before its
    /// producer. Signals a resolver defect, not a user error.
    #[error("Output '{output}' of operation '{operation_id}' was read before it resolved")]
    UnresolvedValue {
        operation_id: String,
        output: String,
    },

    /// Invariant violation: the cached schedule references an operation
    /// that no longer exists.
    #[error("Schedule references operation '{operation_id}', which no longer exists")]
    StaleSchedule { operation_id: String },
}

/// Errors raised while saving or loading a stored workspace.
#[derive(Error, Debug)]
pub enum ArtifactError {
    #[error("Malformed workspace data: {0}")]
    Malformed(String),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("IO failure on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
