//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types from the kairo
//! crate. Import this module to get access to the core functionality
//! without having to import each type individually.
//!
//! # Example
//!
//! ```rust,no_run
//! use kairo::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let record = WorkspaceRecord::from_file("path/to/workspace.json")?;
//! let workspace = Workspace::from_record(record, FunctionRegistry::with_builtins())?;
//!
//! let inputs = IoValues::from([("raw".to_string(), IoValue::Text("  hi  ".to_string()))]);
//! let outputs = workspace.run("tidy", &inputs)?;
//!
//! println!("Outputs: {:?}", outputs);
//! # Ok(())
//! # }
//! ```

// Workspace and graph model
pub use crate::graph::{
    Binding, Connection, Operation, OperationId, Position, Process, ProcessId,
};
pub use crate::workspace::Workspace;

// Values and function capabilities
pub use crate::functions::{CodeFunction, FunctionConfig, FunctionId, FunctionRegistry};
pub use crate::value::{IoType, IoValue, IoValues, ParameterDefinition};

// Interchange records
pub use crate::interchange::{
    ConnectionRecord, OperationRecord, ProcessRecord, WorkspaceRecord,
};

// Error types
pub use crate::error::{ArtifactError, CycleError, GraphError, RunError};

// Ordered map used throughout the public surface
pub use indexmap::IndexMap;

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
