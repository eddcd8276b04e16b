use super::process::RunFrame;
use super::OperationId;
use crate::error::RunError;
use crate::value::IoValue;

/// A directed edge that resolves to a value on demand: either another
/// operation's named output or one of the enclosing process's inputs.
///
/// The type a connection carries is always derived from its source, never
/// stored on the edge, so a retyped output cannot drift out of sync with
/// the edges reading it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Connection {
    /// Reads the named output of another operation in the same process.
    FromOperation {
        operation: OperationId,
        output: String,
    },
    /// Reads one of the enclosing process's external input values.
    FromProcessInput { input: String },
}

impl Connection {
    /// Resolves the connection against the current run's frame.
    ///
    /// Valid only after the referenced producer has executed within this
    /// run; anything else is a scheduling defect and surfaces as
    /// `UnresolvedValue`.
    pub(crate) fn resolve(&self, frame: &RunFrame<'_>) -> Result<IoValue, RunError> {
        match self {
            Connection::FromOperation { operation, output } => frame
                .resolved(operation)
                .and_then(|outputs| outputs.get(output))
                .cloned()
                .ok_or_else(|| RunError::UnresolvedValue {
                    operation_id: operation.clone(),
                    output: output.clone(),
                }),
            Connection::FromProcessInput { input } => frame
                .external(input)
                .cloned()
                .ok_or_else(|| RunError::MissingInput {
                    input: input.clone(),
                }),
        }
    }
}
