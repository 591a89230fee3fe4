//! Dispatch of the domain-parametric extension requests.
//!
//! These commands extend the base protocol with the breakpoint, step, and
//! element operations the IDE needs for a language it knows nothing about.
//! Arguments are validated structurally before deserialization: the
//! argument object's own keys must be exactly the expected set, including
//! the `sourceFile` root field.

use std::collections::BTreeSet;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use runtime_protocol::types::DomainBreakpoint;
use runtime_protocol::LanguageRuntime;

use crate::engine::DebugRuntime;
use crate::error::DebuggerError;

/// The extension command set.
const GET_BREAKPOINT_TYPES: &str = "getBreakpointTypes";
const SET_DOMAIN_BREAKPOINTS: &str = "setDomainSpecificBreakpoints";
const GET_AVAILABLE_STEPS: &str = "getAvailableSteps";
const SELECT_STEP: &str = "selectStep";
const GET_MODEL_ELEMENTS_REFERENCES: &str = "getModelElementsReferences";
const GET_MODEL_ELEMENT_FROM_SOURCE: &str = "getModelElementReferenceFromSource";

/// Whether `command` belongs to the extension request set.
pub fn is_custom_command(command: &str) -> bool {
    matches!(
        command,
        GET_BREAKPOINT_TYPES
            | SET_DOMAIN_BREAKPOINTS
            | GET_AVAILABLE_STEPS
            | SELECT_STEP
            | GET_MODEL_ELEMENTS_REFERENCES
            | GET_MODEL_ELEMENT_FROM_SOURCE
    )
}

/// Failure modes of a custom request.
#[derive(Debug, thiserror::Error)]
pub enum CustomRequestError {
    /// The argument object did not have exactly the expected shape.
    #[error("malformed arguments for {command}")]
    Malformed {
        command: String,
        arguments: serde_json::Value,
    },

    /// The command name is not part of the extension set.
    #[error("unknown custom command {0}")]
    UnknownCommand(String),

    #[error(transparent)]
    Engine(#[from] DebuggerError),
}

impl CustomRequestError {
    /// The diagnostic body attached to the error response.
    pub fn diagnostic_body(&self) -> serde_json::Value {
        match self {
            CustomRequestError::Malformed { command, arguments } => json!({
                "_exception": format!("malformed arguments for {command}"),
                "_args": [arguments],
            }),
            CustomRequestError::UnknownCommand(command) => json!({
                "_exception": format!("unknown custom command {command}"),
                "_args": [],
            }),
            CustomRequestError::Engine(err) => json!({
                "_exception": err.to_string(),
                "_args": [],
            }),
        }
    }
}

/// What a handled custom request produced.
#[derive(Debug)]
pub struct CustomRequestOutcome {
    pub body: Option<serde_json::Value>,
    /// The selected step changed, so cached stack state is stale.
    pub invalidate_stacks: bool,
}

impl CustomRequestOutcome {
    fn body(body: serde_json::Value) -> Self {
        Self {
            body: Some(body),
            invalidate_stacks: false,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SourceFileArguments {
    #[allow(dead_code)]
    source_file: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetDomainBreakpointsArguments {
    #[allow(dead_code)]
    source_file: String,
    breakpoints: Vec<DomainBreakpoint>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SelectStepArguments {
    #[allow(dead_code)]
    source_file: String,
    step_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ElementsOfTypeArguments {
    #[allow(dead_code)]
    source_file: String,
    r#type: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ElementFromSourceArguments {
    #[allow(dead_code)]
    source_file: String,
    line: i64,
    column: i64,
}

/// Route a custom request to the engine.
pub async fn dispatch<R: LanguageRuntime>(
    engine: &mut DebugRuntime<R>,
    command: &str,
    arguments: Option<&serde_json::Value>,
) -> Result<CustomRequestOutcome, CustomRequestError> {
    match command {
        GET_BREAKPOINT_TYPES => {
            let _: SourceFileArguments = validate(command, arguments, &["sourceFile"])?;
            Ok(CustomRequestOutcome::body(json!({
                "breakpointTypes": engine.breakpoint_types(),
            })))
        }
        SET_DOMAIN_BREAKPOINTS => {
            let args: SetDomainBreakpointsArguments =
                validate(command, arguments, &["sourceFile", "breakpoints"])?;
            let outcomes = engine.set_domain_breakpoints(args.breakpoints);
            let breakpoints: Vec<serde_json::Value> = outcomes
                .into_iter()
                .map(|verified| json!({"verified": verified}))
                .collect();
            Ok(CustomRequestOutcome::body(json!({
                "breakpoints": breakpoints,
            })))
        }
        GET_AVAILABLE_STEPS => {
            let _: SourceFileArguments = validate(command, arguments, &["sourceFile"])?;
            Ok(CustomRequestOutcome::body(json!({
                "availableSteps": engine.available_steps(),
            })))
        }
        SELECT_STEP => {
            let args: SelectStepArguments =
                validate(command, arguments, &["sourceFile", "stepId"])?;
            let changed = engine.select_step(&args.step_id)?;
            Ok(CustomRequestOutcome {
                body: Some(json!({})),
                invalidate_stacks: changed,
            })
        }
        GET_MODEL_ELEMENTS_REFERENCES => {
            let args: ElementsOfTypeArguments =
                validate(command, arguments, &["sourceFile", "type"])?;
            Ok(CustomRequestOutcome::body(json!({
                "elements": engine.elements_of_type(&args.r#type),
            })))
        }
        GET_MODEL_ELEMENT_FROM_SOURCE => {
            let args: ElementFromSourceArguments =
                validate(command, arguments, &["sourceFile", "line", "column"])?;
            let element = engine.element_reference_from_source(args.line, args.column);
            let body = match element {
                Some(element) => json!({"element": element}),
                None => json!({}),
            };
            Ok(CustomRequestOutcome::body(body))
        }
        other => Err(CustomRequestError::UnknownCommand(other.to_string())),
    }
}

/// Structural validation: the argument value must be an object whose own
/// keys are exactly `expected`, and must deserialize into the typed shape.
fn validate<T: DeserializeOwned>(
    command: &str,
    arguments: Option<&serde_json::Value>,
    expected: &[&str],
) -> Result<T, CustomRequestError> {
    let malformed = || CustomRequestError::Malformed {
        command: command.to_string(),
        arguments: arguments.cloned().unwrap_or(serde_json::Value::Null),
    };

    let Some(serde_json::Value::Object(map)) = arguments else {
        return Err(malformed());
    };

    let keys: BTreeSet<&str> = map.keys().map(String::as_str).collect();
    let expected: BTreeSet<&str> = expected.iter().copied().collect();
    if keys != expected {
        return Err(malformed());
    }

    serde_json::from_value(serde_json::Value::Object(map.clone())).map_err(|_| malformed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_set_is_recognized() {
        assert!(is_custom_command("selectStep"));
        assert!(is_custom_command("getModelElementReferenceFromSource"));
        assert!(!is_custom_command("stackTrace"));
        assert!(!is_custom_command("selectstep"));
    }

    #[test]
    fn validation_requires_exact_key_set() {
        // missing sourceFile
        let args = json!({"stepId": "s"});
        let result: Result<SelectStepArguments, _> =
            validate("selectStep", Some(&args), &["sourceFile", "stepId"]);
        assert!(matches!(result, Err(CustomRequestError::Malformed { .. })));

        // extra key
        let args = json!({"sourceFile": "p", "stepId": "s", "more": 1});
        let result: Result<SelectStepArguments, _> =
            validate("selectStep", Some(&args), &["sourceFile", "stepId"]);
        assert!(matches!(result, Err(CustomRequestError::Malformed { .. })));

        // not an object
        let args = json!(["sourceFile"]);
        let result: Result<SelectStepArguments, _> =
            validate("selectStep", Some(&args), &["sourceFile", "stepId"]);
        assert!(matches!(result, Err(CustomRequestError::Malformed { .. })));

        // exact match
        let args = json!({"sourceFile": "p", "stepId": "s"});
        let result: Result<SelectStepArguments, _> =
            validate("selectStep", Some(&args), &["sourceFile", "stepId"]);
        assert_eq!(result.unwrap().step_id, "s");
    }

    #[test]
    fn malformed_diagnostic_carries_the_arguments() {
        let error = CustomRequestError::Malformed {
            command: "selectStep".to_string(),
            arguments: json!({"bogus": true}),
        };
        let body = error.diagnostic_body();
        assert!(body["_exception"]
            .as_str()
            .unwrap()
            .contains("selectStep"));
        assert_eq!(body["_args"][0]["bogus"], true);
    }
}
