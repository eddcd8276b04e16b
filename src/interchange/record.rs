use crate::graph::Position;
use crate::value::IoType;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Interchange form of a connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ConnectionRecord {
    /// Sourced from another operation's named output.
    Operation { from: String, output: String },
    /// Sourced from the enclosing process's named input.
    Process { input: String },
}

/// Interchange form of an operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OperationRecord {
    Function {
        id: String,
        position: Position,
        function: String,
        #[serde(default)]
        config: IndexMap<String, String>,
        #[serde(default)]
        inputs: IndexMap<String, ConnectionRecord>,
    },
    Process {
        id: String,
        position: Position,
        process: String,
        /// Fixed literals for declared inputs of the wrapped process.
        /// Absent in records written by editors that only wire them.
        #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
        config: IndexMap<String, String>,
        #[serde(default)]
        inputs: IndexMap<String, ConnectionRecord>,
    },
}

impl OperationRecord {
    pub fn id(&self) -> &str {
        match self {
            OperationRecord::Function { id, .. } | OperationRecord::Process { id, .. } => id,
        }
    }
}

/// Interchange form of a process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessRecord {
    pub id: String,
    pub inputs: IndexMap<String, IoType>,
    pub outputs: IndexMap<String, IoType>,
    #[serde(default)]
    pub output_connections: IndexMap<String, ConnectionRecord>,
    #[serde(default)]
    pub operations: Vec<OperationRecord>,
}

/// A complete saved workspace.
///
/// Processes appear wrapped-before-wrapper, so each one can be loaded as
/// soon as it is reached.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WorkspaceRecord {
    pub processes: Vec<ProcessRecord>,
}
