//! Model and payload types exchanged with the language runtime.
//!
//! The runtime exposes two element trees (the AST produced by `parse` and
//! the runtime state produced by `getRuntimeState`) plus the step and
//! breakpoint catalogs. All maps preserve the runtime's reported order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A node of the AST or the runtime-state tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelElement {
    /// Unique within the owning tree.
    pub id: String,
    /// Ordered, non-empty type tags used for polymorphic dispatch.
    pub types: Vec<String>,
    /// Containment: field name to owned child element(s). Acyclic.
    #[serde(default)]
    pub children: IndexMap<String, ChildValue>,
    /// Non-owning cross references: field name to element id(s).
    #[serde(default)]
    pub refs: IndexMap<String, RefValue>,
    /// Primitive-valued fields.
    #[serde(default)]
    pub attributes: IndexMap<String, AttributeValue>,
    /// Source span, in runtime-origin coordinates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// Display string; falls back to `id` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// The value of one containment field: a single element or an ordered
/// sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChildValue {
    Single(Box<ModelElement>),
    Many(Vec<ModelElement>),
}

/// The value of one reference field: a single element id or an ordered
/// sequence of ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RefValue {
    Single(String),
    Many(Vec<String>),
}

/// A primitive attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
}

/// A source span. `(line, column)` is never after `(end_line, end_column)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub line: i64,
    pub column: i64,
    pub end_line: i64,
    pub end_column: i64,
}

/// An execution step advertised by the runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Composite steps are containers: entering one exposes a new list of
    /// available sub-steps without advancing runtime state.
    pub is_composite: bool,
}

/// A breakpoint type declared by the runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakpointType {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub parameters: Vec<BreakpointParameter>,
}

/// One declared parameter of a [`BreakpointType`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakpointParameter {
    pub name: String,
    #[serde(default)]
    pub is_multivalued: bool,
    #[serde(flatten)]
    pub kind: BreakpointParameterKind,
}

/// What a breakpoint parameter accepts: a primitive value or a model element
/// (by id), distinguished on the wire by which type field is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BreakpointParameterKind {
    Primitive {
        #[serde(rename = "primitiveType")]
        primitive_type: PrimitiveType,
    },
    Element {
        #[serde(rename = "elementType")]
        element_type: String,
    },
}

/// Primitive value kinds accepted by breakpoint parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    Boolean,
    Number,
    String,
}

/// An instance of a [`BreakpointType`] with concrete parameter values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainBreakpoint {
    pub breakpoint_type_id: String,
    /// Parameter name to value; must match the declared parameters exactly.
    pub entries: IndexMap<String, serde_json::Value>,
}

// Wire payloads, one pair per runtime method.

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseArguments {
    pub source_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResult {
    pub ast_root: ModelElement,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeExecutionArguments {
    pub source_file: String,
    /// Opaque per-language settings forwarded from the launch request.
    pub entries: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetRuntimeStateArguments {
    pub source_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetRuntimeStateResult {
    pub runtime_state_root: ModelElement,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetBreakpointTypesResult {
    pub breakpoint_types: Vec<BreakpointType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckBreakpointArguments {
    pub source_file: String,
    pub step_id: String,
    pub type_id: String,
    pub entries: IndexMap<String, serde_json::Value>,
}

/// Result of `checkBreakpoint`: `{isActivated: true, message}` or
/// `{isActivated: false}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckBreakpointResult {
    pub is_activated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetAvailableStepsArguments {
    pub source_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetAvailableStepsResult {
    pub available_steps: Vec<Step>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnterCompositeStepArguments {
    pub source_file: String,
    pub step_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteAtomicStepArguments {
    pub source_file: String,
    pub step_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteAtomicStepResult {
    /// Ids of the steps this execution finished, innermost first.
    pub completed_steps: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetStepLocationArguments {
    pub source_file: String,
    pub step_id: String,
}

/// Result of `getStepLocation`; an empty object means the step has no
/// location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetStepLocationResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_element_distinguishes_child_shapes() {
        let json = r#"{
            "id": "root",
            "types": ["Program"],
            "children": {
                "body": [
                    {"id": "s1", "types": ["Statement"]}
                ],
                "entry": {"id": "s2", "types": ["Statement"]}
            },
            "refs": {
                "first": "s1",
                "all": ["s1", "s2"]
            },
            "attributes": {
                "name": "main",
                "count": 2,
                "frozen": false,
                "result": null
            }
        }"#;

        let element: ModelElement = serde_json::from_str(json).unwrap();
        assert!(matches!(element.children["body"], ChildValue::Many(ref v) if v.len() == 1));
        assert!(matches!(element.children["entry"], ChildValue::Single(_)));
        assert!(matches!(element.refs["first"], RefValue::Single(ref id) if id == "s1"));
        assert!(matches!(element.refs["all"], RefValue::Many(ref ids) if ids.len() == 2));
        assert_eq!(
            element.attributes["name"],
            AttributeValue::String("main".to_string())
        );
        assert_eq!(
            element.attributes["count"],
            AttributeValue::Number(2.into())
        );
        assert_eq!(element.attributes["frozen"], AttributeValue::Bool(false));
        assert_eq!(element.attributes["result"], AttributeValue::Null);
    }

    #[test]
    fn attribute_order_is_preserved() {
        let json = r#"{
            "id": "e",
            "types": ["T"],
            "attributes": {"z": 1, "a": 2, "m": 3}
        }"#;

        let element: ModelElement = serde_json::from_str(json).unwrap();
        let keys: Vec<&str> = element.attributes.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn breakpoint_parameter_kinds() {
        let primitive = r#"{"name": "limit", "isMultivalued": false, "primitiveType": "number"}"#;
        let parameter: BreakpointParameter = serde_json::from_str(primitive).unwrap();
        assert!(matches!(
            parameter.kind,
            BreakpointParameterKind::Primitive {
                primitive_type: PrimitiveType::Number
            }
        ));

        let element = r#"{"name": "target", "isMultivalued": true, "elementType": "State"}"#;
        let parameter: BreakpointParameter = serde_json::from_str(element).unwrap();
        assert!(parameter.is_multivalued);
        assert!(matches!(
            parameter.kind,
            BreakpointParameterKind::Element { ref element_type } if element_type == "State"
        ));
    }

    #[test]
    fn step_location_empty_object_is_none() {
        let result: GetStepLocationResult = serde_json::from_str("{}").unwrap();
        assert!(result.location.is_none());

        let result: GetStepLocationResult = serde_json::from_str(
            r#"{"location": {"line": 1, "column": 0, "endLine": 1, "endColumn": 5}}"#,
        )
        .unwrap();
        assert_eq!(result.location.unwrap().end_column, 5);
    }

    #[test]
    fn check_breakpoint_result_shapes() {
        let inactive: CheckBreakpointResult =
            serde_json::from_str(r#"{"isActivated": false}"#).unwrap();
        assert!(!inactive.is_activated);
        assert!(inactive.message.is_none());

        let active: CheckBreakpointResult =
            serde_json::from_str(r#"{"isActivated": true, "message": "hit"}"#).unwrap();
        assert!(active.is_activated);
        assert_eq!(active.message.as_deref(), Some("hit"));
    }
}
