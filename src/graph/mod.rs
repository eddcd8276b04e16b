//! The dataflow graph model: operations, the connections between them,
//! processes that contain them, and the execution-order resolver.

mod connection;
mod operation;
mod process;
mod resolver;

pub use connection::Connection;
pub use operation::{Binding, FunctionOperation, Operation, Position, ProcessOperation};
pub use process::Process;
pub use resolver::resolve_execution_order;

use indexmap::IndexMap;

/// Stable identifier of an operation within its process.
pub type OperationId = String;

/// Stable identifier of a process within a workspace.
pub type ProcessId = String;

/// Every process of a workspace, keyed by id in insertion order.
pub type ProcessTable = IndexMap<ProcessId, Process>;
