use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The type of a value carried along a connection or declared on a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IoType {
    Text,
    Choice,
    Toggle,
}

impl fmt::Display for IoType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoType::Text => write!(f, "text"),
            IoType::Choice => write!(f, "choice"),
            IoType::Toggle => write!(f, "toggle"),
        }
    }
}

/// A typed scalar produced by an operation or supplied to a process.
/// Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IoValue {
    Text(String),
    Choice(String),
    Toggle(bool),
}

impl IoValue {
    pub fn io_type(&self) -> IoType {
        match self {
            IoValue::Text(_) => IoType::Text,
            IoValue::Choice(_) => IoType::Choice,
            IoValue::Toggle(_) => IoType::Toggle,
        }
    }

    /// Parses an editor-supplied literal against a declared type.
    /// Returns `None` when the literal cannot carry that type.
    pub fn parse(io_type: IoType, literal: &str) -> Option<Self> {
        match io_type {
            IoType::Text => Some(IoValue::Text(literal.to_string())),
            IoType::Choice => Some(IoValue::Choice(literal.to_string())),
            IoType::Toggle => match literal {
                "true" => Some(IoValue::Toggle(true)),
                "false" => Some(IoValue::Toggle(false)),
                _ => None,
            },
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            IoValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_choice(&self) -> Option<&str> {
        match self {
            IoValue::Choice(option) => Some(option),
            _ => None,
        }
    }

    pub fn as_toggle(&self) -> Option<bool> {
        match self {
            IoValue::Toggle(on) => Some(*on),
            _ => None,
        }
    }
}

impl fmt::Display for IoValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IoValue::Text(text) => write!(f, "{}", text),
            IoValue::Choice(option) => write!(f, "{}", option),
            IoValue::Toggle(on) => write!(f, "{}", on),
        }
    }
}

/// Named values flowing into or out of a process or operation, in
/// declaration order.
pub type IoValues = IndexMap<String, IoValue>;

/// Declares a single function parameter: its type, whether the editor may
/// rewire it as a dynamic input, an optional literal validation predicate,
/// and the allowed options for choice parameters.
#[derive(Debug, Clone)]
pub struct ParameterDefinition {
    pub io_type: IoType,
    pub input_eligible: bool,
    pub validation: Option<fn(&str) -> bool>,
    pub options: Vec<String>,
}

impl ParameterDefinition {
    /// A free-form text parameter, eligible for wiring.
    pub fn text() -> Self {
        Self {
            io_type: IoType::Text,
            input_eligible: true,
            validation: None,
            options: Vec::new(),
        }
    }

    /// A text parameter whose configured literals must pass `validation`.
    pub fn text_validated(validation: fn(&str) -> bool) -> Self {
        Self {
            validation: Some(validation),
            ..Self::text()
        }
    }

    /// A single-choice parameter. Choice parameters are always fixed at
    /// edit time, never wired.
    pub fn choice<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            io_type: IoType::Choice,
            input_eligible: false,
            validation: None,
            options: options.into_iter().map(Into::into).collect(),
        }
    }

    /// A boolean toggle parameter, always fixed at edit time.
    pub fn toggle() -> Self {
        Self {
            io_type: IoType::Toggle,
            input_eligible: false,
            validation: None,
            options: Vec::new(),
        }
    }

    /// Checks a configuration literal against the type, the option list
    /// and the validation predicate.
    pub fn accepts(&self, literal: &str) -> bool {
        match self.io_type {
            IoType::Text => self.validation.is_none_or(|accepts| accepts(literal)),
            IoType::Choice => self.options.iter().any(|option| option == literal),
            IoType::Toggle => matches!(literal, "true" | "false"),
        }
    }
}
