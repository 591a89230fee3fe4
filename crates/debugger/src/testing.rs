//! Testing utilities for the debug session core.
//!
//! [`MockRuntime`] is a scripted [`LanguageRuntime`]: a step program laid
//! out as nested slots of alternatives, a breakpoint catalog, an activation
//! schedule, and canned element trees. Engine tests drive it directly;
//! session tests reach it through [`MockConnector`].

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;

use runtime_protocol::types::{
    BreakpointType, CheckBreakpointArguments, CheckBreakpointResult, EnterCompositeStepArguments,
    ExecuteAtomicStepArguments, ExecuteAtomicStepResult, GetAvailableStepsArguments,
    GetAvailableStepsResult, GetBreakpointTypesResult, GetRuntimeStateArguments,
    GetRuntimeStateResult, GetStepLocationArguments, InitializeExecutionArguments, Location,
    ModelElement, ParseArguments, ParseResult, Step,
};
use runtime_protocol::{LanguageRuntime, RpcError};

use crate::session::RuntimeConnector;

/// One scripted step, atomic or composite.
#[derive(Debug, Clone)]
pub struct MockStep {
    step: Step,
    /// For composites: the nested program exposed on entry.
    program: Vec<Vec<MockStep>>,
}

/// An atomic step.
pub fn atomic(id: &str) -> MockStep {
    MockStep {
        step: Step {
            id: id.to_string(),
            name: id.to_string(),
            description: None,
            is_composite: false,
        },
        program: Vec::new(),
    }
}

/// A composite step exposing `program` when entered.
///
/// A program is a sequence of slots; each slot holds the alternative steps
/// available at that point (more than one makes a choice point).
pub fn composite(id: &str, program: Vec<Vec<MockStep>>) -> MockStep {
    MockStep {
        step: Step {
            id: id.to_string(),
            name: id.to_string(),
            description: None,
            is_composite: true,
        },
        program,
    }
}

/// A slot with a single step in it.
pub fn slot(step: MockStep) -> Vec<MockStep> {
    vec![step]
}

/// A minimal located AST for tests: a root spanning ten lines with one
/// `State`-typed child per entry of `states`.
pub fn sample_ast(states: &[&str]) -> ModelElement {
    let children: Vec<serde_json::Value> = states
        .iter()
        .enumerate()
        .map(|(index, id)| {
            json!({
                "id": id,
                "types": ["State"],
                "label": format!("state {id}"),
                "location": {
                    "line": index as i64 + 1,
                    "column": 0,
                    "endLine": index as i64 + 1,
                    "endColumn": 20
                }
            })
        })
        .collect();

    serde_json::from_value(json!({
        "id": "program",
        "types": ["Program"],
        "attributes": {"name": "mock"},
        "location": {"line": 0, "column": 0, "endLine": 10, "endColumn": 0},
        "children": {"states": children}
    }))
    .expect("sample AST is well-formed")
}

/// A breakpoint catalog with one element-parameter type over `State`s.
pub fn sample_breakpoint_types() -> Vec<BreakpointType> {
    serde_json::from_value(json!([
        {
            "id": "state-reached",
            "name": "State reached",
            "description": "Break when the given state is about to run",
            "parameters": [
                {"name": "state", "isMultivalued": false, "elementType": "State"}
            ]
        }
    ]))
    .expect("sample catalog is well-formed")
}

struct Frame {
    program: Vec<Vec<MockStep>>,
    index: usize,
    /// The composite that opened this frame; `None` for the root program.
    composite_id: Option<String>,
}

/// A scripted language runtime.
pub struct MockRuntime {
    ast_root: ModelElement,
    runtime_state_root: ModelElement,
    breakpoint_types: Vec<BreakpointType>,
    /// Step id to breakpoint message: any installed breakpoint checked
    /// against that step activates.
    activations: HashMap<String, String>,
    locations: HashMap<String, Location>,
    /// When set, executing the named step flips the flag, as if the client
    /// pressed pause mid-run.
    pause_on_execute: Option<(String, Arc<AtomicBool>)>,
    /// When true, every breakpoint check returns a malformed result.
    malformed_checks: bool,
    frames: Vec<Frame>,
    initialized: bool,
}

impl MockRuntime {
    /// A runtime executing `program`, with the sample AST and catalog.
    pub fn new(program: Vec<Vec<MockStep>>) -> Self {
        Self {
            ast_root: sample_ast(&["s1", "s2"]),
            runtime_state_root: serde_json::from_value(json!({
                "id": "trace",
                "types": ["Trace"],
                "attributes": {"tick": 0},
                "refs": {"current": "s1"}
            }))
            .expect("runtime state is well-formed"),
            breakpoint_types: sample_breakpoint_types(),
            activations: HashMap::new(),
            locations: HashMap::new(),
            pause_on_execute: None,
            malformed_checks: false,
            frames: vec![Frame {
                program,
                index: 0,
                composite_id: None,
            }],
            initialized: false,
        }
    }

    pub fn with_ast(mut self, ast_root: ModelElement) -> Self {
        self.ast_root = ast_root;
        self
    }

    pub fn with_breakpoint_types(mut self, types: Vec<BreakpointType>) -> Self {
        self.breakpoint_types = types;
        self
    }

    /// Activate any installed breakpoint when `step_id` is about to run.
    pub fn with_activation(mut self, step_id: &str, message: &str) -> Self {
        self.activations
            .insert(step_id.to_string(), message.to_string());
        self
    }

    pub fn with_location(mut self, step_id: &str, location: Location) -> Self {
        self.locations.insert(step_id.to_string(), location);
        self
    }

    /// Flip `flag` while executing `step_id`, simulating a pause request
    /// arriving mid-run.
    pub fn with_pause_during(mut self, step_id: &str, flag: Arc<AtomicBool>) -> Self {
        self.pause_on_execute = Some((step_id.to_string(), flag));
        self
    }

    /// Make every breakpoint check return a malformed payload.
    pub fn with_malformed_checks(mut self) -> Self {
        self.malformed_checks = true;
        self
    }

    fn top(&self) -> &Frame {
        self.frames.last().expect("the root frame is never popped")
    }

    fn current_slot(&self) -> &[MockStep] {
        let frame = self.top();
        frame
            .program
            .get(frame.index)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn find_in_slot(&self, step_id: &str) -> Option<MockStep> {
        self.current_slot()
            .iter()
            .find(|s| s.step.id == step_id)
            .cloned()
    }
}

#[async_trait]
impl LanguageRuntime for MockRuntime {
    async fn parse(&mut self, _args: ParseArguments) -> Result<ParseResult, RpcError> {
        Ok(ParseResult {
            ast_root: self.ast_root.clone(),
        })
    }

    async fn initialize_execution(
        &mut self,
        _args: InitializeExecutionArguments,
    ) -> Result<(), RpcError> {
        assert!(!self.initialized, "initializeExecution called twice");
        self.initialized = true;
        Ok(())
    }

    async fn get_runtime_state(
        &mut self,
        _args: GetRuntimeStateArguments,
    ) -> Result<GetRuntimeStateResult, RpcError> {
        Ok(GetRuntimeStateResult {
            runtime_state_root: self.runtime_state_root.clone(),
        })
    }

    async fn get_breakpoint_types(&mut self) -> Result<GetBreakpointTypesResult, RpcError> {
        Ok(GetBreakpointTypesResult {
            breakpoint_types: self.breakpoint_types.clone(),
        })
    }

    async fn check_breakpoint(
        &mut self,
        args: CheckBreakpointArguments,
    ) -> Result<CheckBreakpointResult, RpcError> {
        if self.malformed_checks {
            let error = serde_json::from_str::<i64>("not a number")
                .expect_err("payload is intentionally malformed");
            return Err(RpcError::Deserialize(error));
        }

        match self.activations.get(&args.step_id) {
            Some(message) => Ok(CheckBreakpointResult {
                is_activated: true,
                message: Some(message.clone()),
            }),
            None => Ok(CheckBreakpointResult {
                is_activated: false,
                message: None,
            }),
        }
    }

    async fn get_available_steps(
        &mut self,
        _args: GetAvailableStepsArguments,
    ) -> Result<GetAvailableStepsResult, RpcError> {
        Ok(GetAvailableStepsResult {
            available_steps: self.current_slot().iter().map(|s| s.step.clone()).collect(),
        })
    }

    async fn enter_composite_step(
        &mut self,
        args: EnterCompositeStepArguments,
    ) -> Result<(), RpcError> {
        let step = self
            .find_in_slot(&args.step_id)
            .unwrap_or_else(|| panic!("step {} is not available", args.step_id));
        assert!(step.step.is_composite, "entering an atomic step");

        self.frames.push(Frame {
            program: step.program,
            index: 0,
            composite_id: Some(step.step.id),
        });
        Ok(())
    }

    async fn execute_atomic_step(
        &mut self,
        args: ExecuteAtomicStepArguments,
    ) -> Result<ExecuteAtomicStepResult, RpcError> {
        let step = self
            .find_in_slot(&args.step_id)
            .unwrap_or_else(|| panic!("step {} is not available", args.step_id));
        assert!(!step.step.is_composite, "executing a composite step");

        if let Some((trigger, flag)) = &self.pause_on_execute {
            if *trigger == args.step_id {
                flag.store(true, Ordering::SeqCst);
            }
        }

        let mut completed = vec![step.step.id];

        // advance, completing every composite whose program just ran dry
        let top = self.frames.last_mut().expect("root frame");
        top.index += 1;
        while self.frames.len() > 1 {
            let top = self.frames.last().expect("root frame");
            if top.index < top.program.len() {
                break;
            }
            let finished = self.frames.pop().expect("checked non-root");
            completed.push(finished.composite_id.expect("sub-frames have owners"));
            let parent = self.frames.last_mut().expect("root frame");
            parent.index += 1;
        }

        Ok(ExecuteAtomicStepResult {
            completed_steps: completed,
        })
    }

    async fn get_step_location(
        &mut self,
        args: GetStepLocationArguments,
    ) -> Result<Option<Location>, RpcError> {
        Ok(self.locations.get(&args.step_id).copied())
    }
}

/// Hands pre-built [`MockRuntime`]s to launching sessions.
pub struct MockConnector {
    runtimes: std::sync::Mutex<Vec<MockRuntime>>,
}

impl MockConnector {
    pub fn new(runtime: MockRuntime) -> Self {
        Self {
            runtimes: std::sync::Mutex::new(vec![runtime]),
        }
    }
}

#[async_trait]
impl RuntimeConnector for MockConnector {
    type Runtime = MockRuntime;

    async fn connect(&self, _port: u16) -> eyre::Result<Self::Runtime> {
        self.runtimes
            .lock()
            .expect("connector mutex")
            .pop()
            .ok_or_else(|| eyre::eyre!("no scripted runtime left"))
    }
}
