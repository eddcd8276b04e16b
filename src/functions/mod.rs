//! Registered leaf capabilities: pure functions with declared, typed
//! parameters and outputs.

use crate::error::RunError;
use crate::value::{IoType, IoValues, ParameterDefinition};
use ahash::AHashMap;
use indexmap::IndexMap;

mod trim;

/// Stable identifier of a registered function.
pub type FunctionId = String;

/// Raw configuration literals keyed by parameter name, as the editor
/// stores them.
pub type FunctionConfig = AHashMap<String, String>;

/// Signature of a capability's pure computation: resolved parameter values
/// plus the raw configuration, producing named outputs.
pub type RunFn = fn(&IoValues, &FunctionConfig) -> Result<IoValues, RunError>;

/// A leaf capability: declared typed parameters and outputs plus a pure
/// computation over resolved parameter values.
#[derive(Debug)]
pub struct CodeFunction {
    pub id: FunctionId,
    /// Short glyph shown on the operation in an editor, e.g. `TRM`.
    pub symbol: String,
    pub parameters: IndexMap<String, ParameterDefinition>,
    pub outputs: IndexMap<String, IoType>,
    /// Literals seeded into a new operation's configuration.
    pub default_config: Vec<(String, String)>,
    pub run: RunFn,
}

impl CodeFunction {
    pub fn parameter(&self, name: &str) -> Option<&ParameterDefinition> {
        self.parameters.get(name)
    }

    pub fn output_type(&self, name: &str) -> Option<IoType> {
        self.outputs.get(name).copied()
    }

    pub fn default_for(&self, parameter: &str) -> Option<&str> {
        self.default_config
            .iter()
            .find(|(name, _)| name == parameter)
            .map(|(_, literal)| literal.as_str())
    }
}

/// Lookup table from function id to capability.
#[derive(Debug)]
pub struct FunctionRegistry {
    functions: AHashMap<FunctionId, CodeFunction>,
}

impl FunctionRegistry {
    /// An empty registry with nothing registered.
    pub fn new() -> Self {
        Self {
            functions: AHashMap::new(),
        }
    }

    /// A registry pre-loaded with the built-in functions.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        register_builtin_functions(&mut registry);
        registry
    }

    pub fn register(&mut self, function: CodeFunction) {
        self.functions.insert(function.id.clone(), function);
    }

    pub fn get(&self, id: &str) -> Option<&CodeFunction> {
        self.functions.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

fn register_builtin_functions(registry: &mut FunctionRegistry) {
    registry.register(trim::trim());
}

/// Reads a required text parameter from a resolved parameter map.
pub fn text_parameter<'a>(values: &'a IoValues, name: &str) -> Result<&'a str, RunError> {
    values
        .get(name)
        .and_then(|value| value.as_text())
        .ok_or_else(|| RunError::ParameterMismatch {
            parameter: name.to_string(),
        })
}

/// Reads a required choice parameter from a resolved parameter map.
pub fn choice_parameter<'a>(values: &'a IoValues, name: &str) -> Result<&'a str, RunError> {
    values
        .get(name)
        .and_then(|value| value.as_choice())
        .ok_or_else(|| RunError::ParameterMismatch {
            parameter: name.to_string(),
        })
}

/// Reads a required toggle parameter from a resolved parameter map.
pub fn toggle_parameter(values: &IoValues, name: &str) -> Result<bool, RunError> {
    values
        .get(name)
        .and_then(|value| value.as_toggle())
        .ok_or_else(|| RunError::ParameterMismatch {
            parameter: name.to_string(),
        })
}
