use super::{choice_parameter, text_parameter, CodeFunction, FunctionConfig};
use crate::error::RunError;
use crate::value::{IoType, IoValue, IoValues, ParameterDefinition};
use indexmap::IndexMap;

/// Strips a configurable set of characters from the start and/or end of a
/// text value.
pub(super) fn trim() -> CodeFunction {
    CodeFunction {
        id: "trim".to_string(),
        symbol: "TRM".to_string(),
        parameters: IndexMap::from([
            ("in".to_string(), ParameterDefinition::text()),
            (
                "characters".to_string(),
                ParameterDefinition::text_validated(|literal| !literal.is_empty()),
            ),
            (
                "location".to_string(),
                ParameterDefinition::choice(["start and end", "start only", "end only"]),
            ),
        ]),
        outputs: IndexMap::from([("result".to_string(), IoType::Text)]),
        default_config: vec![
            ("characters".to_string(), " \t\n".to_string()),
            ("location".to_string(), "start and end".to_string()),
        ],
        run: run_trim,
    }
}

fn run_trim(parameters: &IoValues, _config: &FunctionConfig) -> Result<IoValues, RunError> {
    let input = text_parameter(parameters, "in")?;
    let characters = text_parameter(parameters, "characters")?;
    let location = choice_parameter(parameters, "location")?;

    // An empty character set trims nothing.
    let mut result = input;
    if !characters.is_empty() {
        let in_set = |c: char| characters.contains(c);
        if location != "end only" {
            result = result.trim_start_matches(in_set);
        }
        if location != "start only" {
            result = result.trim_end_matches(in_set);
        }
    }

    Ok(IoValues::from([(
        "result".to_string(),
        IoValue::Text(result.to_string()),
    )]))
}
