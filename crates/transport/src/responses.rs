//! Typed response bodies for the requests in [`crate::requests`].

use serde::{Deserialize, Serialize};

use crate::types::{Breakpoint, Capabilities, Scope, StackFrame, Thread, Variable};

/// Body of a successful `initialize` response.
pub type InitializeResponseBody = Capabilities;

/// Body of a `setBreakpoints` response: one outcome per requested
/// breakpoint, in request order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetBreakpointsResponseBody {
    pub breakpoints: Vec<Breakpoint>,
}

/// Body of a `threads` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadsResponseBody {
    pub threads: Vec<Thread>,
}

/// Body of a `continue` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContinueResponseBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_threads_continued: Option<bool>,
}

/// Body of a `stackTrace` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackTraceResponseBody {
    pub stack_frames: Vec<StackFrame>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_frames: Option<i64>,
}

/// Body of a `scopes` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopesResponseBody {
    pub scopes: Vec<Scope>,
}

/// Body of a `variables` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariablesResponseBody {
    pub variables: Vec<Variable>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_trace_body_serializes_total_frames() {
        let body = StackTraceResponseBody {
            stack_frames: vec![],
            total_frames: Some(1),
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains(r#""stackFrames":[]"#));
        assert!(json.contains(r#""totalFrames":1"#));
    }
}
