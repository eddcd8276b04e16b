//! Tests for the value model, parameter definitions and the function
//! registry, including the built-in trim function.
mod common;
use common::*;
use kairo::prelude::*;

#[test]
fn test_io_value_carries_its_type() {
    assert_eq!(IoValue::Text("x".to_string()).io_type(), IoType::Text);
    assert_eq!(IoValue::Choice("x".to_string()).io_type(), IoType::Choice);
    assert_eq!(IoValue::Toggle(true).io_type(), IoType::Toggle);
}

#[test]
fn test_literal_parsing_follows_declared_type() {
    assert_eq!(
        IoValue::parse(IoType::Text, "anything"),
        Some(IoValue::Text("anything".to_string()))
    );
    assert_eq!(
        IoValue::parse(IoType::Toggle, "true"),
        Some(IoValue::Toggle(true))
    );
    assert_eq!(
        IoValue::parse(IoType::Toggle, "false"),
        Some(IoValue::Toggle(false))
    );
    assert_eq!(IoValue::parse(IoType::Toggle, "yes"), None);
}

#[test]
fn test_value_display_round_trips_through_parse() {
    for value in [
        IoValue::Text("  padded  ".to_string()),
        IoValue::Choice("start only".to_string()),
        IoValue::Toggle(true),
    ] {
        let literal = value.to_string();
        assert_eq!(IoValue::parse(value.io_type(), &literal), Some(value));
    }
}

#[test]
fn test_choice_parameter_accepts_only_listed_options() {
    let definition = ParameterDefinition::choice(["start and end", "start only"]);
    assert!(definition.accepts("start only"));
    assert!(!definition.accepts("sideways"));
    assert!(!definition.input_eligible);
}

#[test]
fn test_toggle_parameter_accepts_only_bool_literals() {
    let definition = ParameterDefinition::toggle();
    assert!(definition.accepts("true"));
    assert!(definition.accepts("false"));
    assert!(!definition.accepts("1"));
}

#[test]
fn test_validated_text_parameter_applies_its_predicate() {
    let definition = ParameterDefinition::text_validated(|literal| !literal.is_empty());
    assert!(definition.accepts(" "));
    assert!(!definition.accepts(""));
}

#[test]
fn test_registry_lookup() {
    let registry = FunctionRegistry::with_builtins();
    assert!(registry.get("trim").is_some());
    assert!(registry.get("nope").is_none());

    let registry = test_registry();
    assert!(registry.get("concat").is_some());
    assert_eq!(registry.get("upper").map(|f| f.symbol.as_str()), Some("UPR"));
}

#[test]
fn test_trim_declares_whitespace_default() {
    let registry = FunctionRegistry::with_builtins();
    let trim = registry.get("trim").unwrap();
    assert_eq!(trim.default_for("characters"), Some(" \t\n"));
    assert_eq!(trim.default_for("location"), Some("start and end"));
    assert_eq!(trim.output_type("result"), Some(IoType::Text));
}

fn run_trim(input: &str, characters: &str, location: &str) -> String {
    let registry = FunctionRegistry::with_builtins();
    let trim = registry.get("trim").unwrap();
    let parameters = IoValues::from([
        ("in".to_string(), IoValue::Text(input.to_string())),
        (
            "characters".to_string(),
            IoValue::Text(characters.to_string()),
        ),
        (
            "location".to_string(),
            IoValue::Choice(location.to_string()),
        ),
    ]);
    let outputs = (trim.run)(&parameters, &FunctionConfig::default()).unwrap();
    outputs
        .get("result")
        .and_then(|value| value.as_text())
        .unwrap()
        .to_string()
}

#[test]
fn test_trim_strips_both_ends() {
    assert_eq!(run_trim("  hi  ", " ", "start and end"), "hi");
}

#[test]
fn test_trim_start_only() {
    assert_eq!(run_trim("  hi  ", " ", "start only"), "hi  ");
}

#[test]
fn test_trim_end_only() {
    assert_eq!(run_trim("  hi  ", " ", "end only"), "  hi");
}

#[test]
fn test_trim_empty_character_set_changes_nothing() {
    assert_eq!(run_trim("  hi  ", "", "start and end"), "  hi  ");
}

#[test]
fn test_trim_strips_every_character_in_the_set() {
    assert_eq!(run_trim("--=hi=--", "-=", "start and end"), "hi");
}
