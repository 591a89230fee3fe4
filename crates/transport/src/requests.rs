//! Typed argument payloads for the requests the adapter accepts.
//!
//! The framing layer delivers requests with raw JSON arguments; the session
//! deserializes into these shapes once it has routed on the command name.

use serde::{Deserialize, Serialize};

use crate::types::{Source, SourceBreakpoint, StackFrameId, ThreadId, VariablesReference};

/// Arguments of the `initialize` request.
///
/// Only the fields the adapter acts on are modeled; the remainder of the
/// client capability set is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeArguments {
    #[serde(rename = "adapterID")]
    pub adapter_id: Option<String>,
    #[serde(rename = "clientID")]
    pub client_id: Option<String>,
    /// Whether the client counts lines from 1. Defaults to true per protocol.
    pub lines_start_at1: Option<bool>,
    /// Whether the client counts columns from 1. Defaults to true per
    /// protocol.
    pub columns_start_at1: Option<bool>,
}

/// Arguments of the `launch` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchArguments {
    /// The program the language runtime should parse and execute.
    pub source_file: String,
    /// TCP port the language runtime listens on.
    pub language_runtime_port: u16,
    /// Stop before the first step executes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pause_on_start: Option<bool>,
    /// Stop (rather than terminate) when no steps remain.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pause_on_end: Option<bool>,
    /// Opaque payload forwarded to the runtime's execution initialization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_args: Option<serde_json::Value>,
    /// Running without debugging is not supported; must be false or absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_debug: Option<bool>,
}

/// Arguments of the `setBreakpoints` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetBreakpointsArguments {
    pub source: Source,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakpoints: Option<Vec<SourceBreakpoint>>,
}

/// Arguments of the `continue` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinueArguments {
    pub thread_id: ThreadId,
}

/// Arguments of the `next` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextArguments {
    pub thread_id: ThreadId,
}

/// Arguments of the `stepIn` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepInArguments {
    pub thread_id: ThreadId,
}

/// Arguments of the `stepOut` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepOutArguments {
    pub thread_id: ThreadId,
}

/// Arguments of the `pause` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PauseArguments {
    pub thread_id: ThreadId,
}

/// Arguments of the `stackTrace` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackTraceArguments {
    pub thread_id: ThreadId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_frame: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub levels: Option<i64>,
}

/// Arguments of the `scopes` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopesArguments {
    pub frame_id: StackFrameId,
}

/// Arguments of the `variables` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariablesArguments {
    pub variables_reference: VariablesReference,
}

/// Arguments of the `disconnect` request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisconnectArguments {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terminate_debuggee: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn launch_arguments_roundtrip() {
        let json = r#"{
            "sourceFile": "program.lang",
            "languageRuntimePort": 49200,
            "pauseOnStart": true
        }"#;

        let args: LaunchArguments = serde_json::from_str(json).unwrap();
        assert_eq!(args.source_file, "program.lang");
        assert_eq!(args.language_runtime_port, 49200);
        assert_eq!(args.pause_on_start, Some(true));
        assert!(args.no_debug.is_none());
    }

    #[test]
    fn initialize_arguments_accept_origin_flags() {
        let json = r#"{"adapterID": "x", "linesStartAt1": false, "columnsStartAt1": true}"#;

        let args: InitializeArguments = serde_json::from_str(json).unwrap();
        assert_eq!(args.lines_start_at1, Some(false));
        assert_eq!(args.columns_start_at1, Some(true));
    }
}
