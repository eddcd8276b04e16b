//! The interchange format: language-agnostic records for saving and
//! loading processes, plus the conversions to and from the graph model.

mod artifact;
mod convert;
mod record;

pub use record::{ConnectionRecord, OperationRecord, ProcessRecord, WorkspaceRecord};
