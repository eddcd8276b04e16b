//! # Kairo - Typed Dataflow Composition and Execution Engine
//!
//! **Kairo** wires named operations into directed dataflow graphs called
//! processes, infers a safe execution order for them, and runs them
//! deterministically against a set of typed input values. A process, once
//! defined, can itself be dropped into another process as a single
//! operation, so whole graphs compose hierarchically.
//!
//! ## Core Workflow
//!
//! 1. **Register functions**: a [`functions::FunctionRegistry`] maps stable
//!    function ids to leaf capabilities, each declaring typed parameters and
//!    outputs plus a pure computation.
//! 2. **Build processes**: a [`workspace::Workspace`] owns every process and
//!    validates each graph edit (adding operations, wiring connections,
//!    fixing configuration values) before applying it.
//! 3. **Run**: [`workspace::Workspace::run`] resolves the execution order
//!    (cached until the next structural edit), executes every operation in
//!    that order, and returns the process's declared outputs.
//!
//! ## Quick Start
//!
//! ```rust
//! use kairo::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let mut workspace = Workspace::new(FunctionRegistry::with_builtins());
//!
//!     // A process with one declared input and one declared output.
//!     workspace.add_process(Process::new(
//!         "tidy",
//!         [("raw".to_string(), IoType::Text)],
//!         [("clean".to_string(), IoType::Text)],
//!     ))?;
//!
//!     // One operation running the built-in trim function, wired to the
//!     // process input; the process output reads the operation's result.
//!     workspace.add_function_operation(
//!         "tidy",
//!         "trim-step",
//!         Position::default(),
//!         "trim",
//!         FunctionConfig::default(),
//!     )?;
//!     workspace.connect(
//!         "tidy",
//!         "trim-step",
//!         "in",
//!         Connection::FromProcessInput {
//!             input: "raw".to_string(),
//!         },
//!     )?;
//!     workspace.connect_output(
//!         "tidy",
//!         "clean",
//!         Connection::FromOperation {
//!             operation: "trim-step".to_string(),
//!             output: "result".to_string(),
//!         },
//!     )?;
//!
//!     let outputs = workspace.run(
//!         "tidy",
//!         &IoValues::from([("raw".to_string(), IoValue::Text("  hello  ".to_string()))]),
//!     )?;
//!     assert_eq!(
//!         outputs.get("clean"),
//!         Some(&IoValue::Text("hello".to_string()))
//!     );
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod functions;
pub mod graph;
pub mod interchange;
pub mod prelude;
pub mod value;
pub mod workspace;
