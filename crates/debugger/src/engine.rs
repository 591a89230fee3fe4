//! The execution engine.
//!
//! [`DebugRuntime`] drives an execution atomic-step by atomic-step,
//! stopping at checkpoints for user pauses, non-deterministic choice
//! points, breakpoint activations, step completion, and end of program.
//! It owns the step stack, the breakpoint manager, the element trees and
//! their indices, and the variable handle table, and reports stops and
//! termination over an event channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use runtime_protocol::types::{
    BreakpointType, DomainBreakpoint, EnterCompositeStepArguments, ExecuteAtomicStepArguments,
    GetAvailableStepsArguments, GetRuntimeStateArguments, GetStepLocationArguments,
    InitializeExecutionArguments, ParseArguments, Step,
};
use runtime_protocol::LanguageRuntime;
use transport::responses::StackTraceResponseBody;
use transport::types::{Breakpoint, Scope, Source, SourceBreakpoint, StackFrame, Variable};

use crate::breakpoints::BreakpointManager;
use crate::error::DebuggerError;
use crate::locator::{ElementLocator, Origin, TypeRegistry};
use crate::model::{ModelElementReference, ModelTree, TreeKind};
use crate::pause::{PauseInformation, PauseReason};
use crate::steps::StepManager;
use crate::variables::{VariableHandler, AST_ROOT_REFERENCE, RUNTIME_ROOT_REFERENCE};

/// Engine knobs taken from the launch request.
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineConfig {
    /// Stop with reason `start` before the first step.
    pub pause_on_start: bool,
    /// Stop with reason `end` instead of terminating when no steps remain.
    pub pause_on_end: bool,
    /// Skip the pre-step breakpoint re-check on the step the engine is
    /// already paused on.
    pub skip_redundant_pauses: bool,
}

impl EngineConfig {
    pub fn new(pause_on_start: bool, pause_on_end: bool) -> Self {
        Self {
            pause_on_start,
            pause_on_end,
            skip_redundant_pauses: true,
        }
    }
}

/// Events the engine pushes to the owning session.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// Execution stopped; `reason` is the composite reason string.
    Stopped {
        reason: String,
        description: Option<String>,
    },
    /// Execution finished.
    Terminated,
}

/// The per-session execution engine, generic over the runtime connection.
pub struct DebugRuntime<R> {
    runtime: R,
    source_file: String,
    config: EngineConfig,
    origin: Origin,
    event_tx: mpsc::UnboundedSender<RuntimeEvent>,
    /// Set by the session's pause handler, consumed at the next checkpoint.
    pause_requested: Arc<AtomicBool>,

    ast: ModelTree,
    runtime_state: Option<ModelTree>,
    locator: ElementLocator,
    registry: TypeRegistry,
    steps: StepManager,
    breakpoints: BreakpointManager,
    variables: VariableHandler,

    /// True right after a reported stop (and at session start); gates
    /// redundant choice and breakpoint re-checks on the step the client is
    /// already looking at. Cleared as soon as execution actually moves.
    paused_on_current_step: bool,
    execution_done: bool,
    terminated_event_sent: bool,
    next_frame_id: i64,
}

impl<R: LanguageRuntime> DebugRuntime<R> {
    /// Parse the program, initialize the runtime, and fetch the breakpoint
    /// catalog and the initial step list.
    ///
    /// Called exactly once per session. The initial stop decision is made
    /// separately by [`DebugRuntime::start`], after any deferred source
    /// breakpoints have been applied.
    pub async fn initialize(
        mut runtime: R,
        source_file: String,
        config: EngineConfig,
        entries: serde_json::Map<String, serde_json::Value>,
        origin: Origin,
        event_tx: mpsc::UnboundedSender<RuntimeEvent>,
        pause_requested: Arc<AtomicBool>,
    ) -> Result<Self, DebuggerError> {
        let parsed = runtime
            .parse(ParseArguments {
                source_file: source_file.clone(),
            })
            .await?;
        let ast = ModelTree::build(TreeKind::Ast, parsed.ast_root);
        tracing::debug!(elements = ast.len(), "parsed program");

        let locator = ElementLocator::new(&ast);
        let mut registry = TypeRegistry::new();
        registry.index_ast(&ast);

        runtime
            .initialize_execution(InitializeExecutionArguments {
                source_file: source_file.clone(),
                entries,
            })
            .await?;

        let catalog = runtime.get_breakpoint_types().await?.breakpoint_types;
        tracing::debug!(types = catalog.len(), "fetched breakpoint types");
        let breakpoints = BreakpointManager::new(source_file.clone(), catalog);

        let available = runtime
            .get_available_steps(GetAvailableStepsArguments {
                source_file: source_file.clone(),
            })
            .await?
            .available_steps;
        let mut steps = StepManager::new();
        steps.update(available, &[]);

        Ok(Self {
            runtime,
            source_file,
            config,
            origin,
            event_tx,
            pause_requested,
            ast,
            runtime_state: None,
            locator,
            registry,
            steps,
            breakpoints,
            variables: VariableHandler::new(),
            paused_on_current_step: true,
            execution_done: false,
            terminated_event_sent: false,
            next_frame_id: 1,
        })
    }

    /// Make the initial stop decision: `start`/`choice`/`breakpoint` when
    /// something asks for attention, termination when there is nothing to
    /// run, otherwise drive to the first ordinary stop.
    pub async fn start(&mut self) -> Result<(), DebuggerError> {
        if self.steps.available().is_empty() {
            self.execution_done = true;
            if self.config.pause_on_end {
                let mut pause = PauseInformation::new();
                pause.add(PauseReason::End);
                return self.report_stop(pause);
            }
            return self.terminate();
        }

        let mut pause = PauseInformation::new();
        if self.config.pause_on_start {
            pause.add(PauseReason::Start);
        }
        if self.steps.available().len() > 1 {
            pause.add(PauseReason::Choice);
        }
        self.collect_breakpoints(&mut pause).await?;

        if pause.is_empty() {
            self.resume(None).await
        } else {
            self.report_stop(pause)
        }
    }

    /// Run until the next stop or termination.
    pub async fn run(&mut self) -> Result<(), DebuggerError> {
        self.resume(None).await
    }

    /// Drive execution until the selected step's id is reported completed.
    pub async fn next_step(&mut self) -> Result<(), DebuggerError> {
        if self.execution_done {
            return self.resend_terminated();
        }
        let target = self
            .steps
            .selected()
            .map(|s| s.id.clone())
            .ok_or(DebuggerError::NoSelectedStep)?;
        self.resume(Some(target)).await
    }

    /// Enter the selected composite step, or execute the selected atomic
    /// step.
    pub async fn step_in(&mut self) -> Result<(), DebuggerError> {
        if self.execution_done {
            return self.resend_terminated();
        }
        let selected = self
            .steps
            .selected()
            .cloned()
            .ok_or(DebuggerError::NoSelectedStep)?;

        // pre-step breakpoint check, subject to the redundancy rule
        if !(self.paused_on_current_step && self.config.skip_redundant_pauses) {
            let mut pause = PauseInformation::new();
            self.collect_breakpoints(&mut pause).await?;
            if !pause.is_empty() {
                return self.report_stop(pause);
            }
        }

        if selected.is_composite {
            self.enter_composite(&selected).await?;
        } else {
            self.execute_atomic(&selected).await?;
        }

        if self.steps.available().is_empty() {
            self.execution_done = true;
            if self.config.pause_on_end {
                let mut pause = PauseInformation::new();
                pause.add(PauseReason::End);
                return self.report_stop(pause);
            }
            return self.terminate();
        }

        let mut pause = PauseInformation::new();
        pause.add(PauseReason::Step);
        self.collect_breakpoints(&mut pause).await?;
        self.report_stop(pause)
    }

    /// Drive execution until the innermost entered composite completes;
    /// with an empty stack this is equivalent to [`DebugRuntime::run`].
    pub async fn step_out(&mut self) -> Result<(), DebuggerError> {
        if self.execution_done {
            return self.resend_terminated();
        }
        let target = self.steps.stack().last().map(|s| s.id.clone());
        self.resume(target).await
    }

    /// A handle the session's pause handler flips; the engine consumes it
    /// at the next checkpoint.
    pub fn pause_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.pause_requested)
    }

    /// The checkpointed drive loop shared by run / next / stepOut.
    ///
    /// Per iteration: consume a pending pause request; surface a choice
    /// point (unless the client already saw this state); pre-check
    /// breakpoints on the step about to be performed (with the redundancy
    /// rule); then either enter the selected composite or execute the
    /// selected atomic step. After an execution, completion of `target`
    /// stops with reason `step`, and an exhausted step list ends the
    /// execution.
    async fn resume(&mut self, target: Option<String>) -> Result<(), DebuggerError> {
        if self.execution_done {
            return self.resend_terminated();
        }

        loop {
            if self.pause_requested.swap(false, Ordering::SeqCst) {
                let mut pause = PauseInformation::new();
                pause.add(PauseReason::Pause);
                return self.report_stop(pause);
            }

            if !self.paused_on_current_step && self.steps.available().len() > 1 {
                let mut pause = PauseInformation::new();
                pause.add(PauseReason::Choice);
                self.collect_breakpoints(&mut pause).await?;
                return self.report_stop(pause);
            }

            let selected = self
                .steps
                .selected()
                .cloned()
                .ok_or(DebuggerError::NoSelectedStep)?;

            if !(self.paused_on_current_step && self.config.skip_redundant_pauses) {
                let mut pause = PauseInformation::new();
                self.collect_breakpoints(&mut pause).await?;
                if !pause.is_empty() {
                    return self.report_stop(pause);
                }
            }

            if selected.is_composite {
                self.enter_composite(&selected).await?;
                if self.steps.available().is_empty() {
                    // a composite that exposes no sub-steps ends the run
                    self.execution_done = true;
                    if self.config.pause_on_end {
                        let mut pause = PauseInformation::new();
                        pause.add(PauseReason::End);
                        return self.report_stop(pause);
                    }
                    return self.terminate();
                }
                continue;
            }

            let completed = self.execute_atomic(&selected).await?;
            let target_completed = target
                .as_ref()
                .is_some_and(|t| completed.iter().any(|c| c == t));

            if self.steps.available().is_empty() {
                self.execution_done = true;
                if self.config.pause_on_end {
                    let mut pause = PauseInformation::new();
                    pause.add(PauseReason::End);
                    return self.report_stop(pause);
                }
                return self.terminate();
            }

            if target_completed {
                let mut pause = PauseInformation::new();
                pause.add(PauseReason::Step);
                self.collect_breakpoints(&mut pause).await?;
                return self.report_stop(pause);
            }
        }
    }

    /// Check the installed breakpoints against the currently selected step
    /// and record any activations.
    async fn collect_breakpoints(
        &mut self,
        pause: &mut PauseInformation,
    ) -> Result<(), DebuggerError> {
        let Some(step_id) = self.steps.selected().map(|s| s.id.clone()) else {
            return Ok(());
        };
        let activated = self.breakpoints.check(&mut self.runtime, &step_id).await?;
        for hit in activated {
            pause.add_breakpoint(hit.message);
        }
        Ok(())
    }

    /// Enter a composite step: cache its location, descend, refresh the
    /// step list (which pushes the composite onto the stack).
    async fn enter_composite(&mut self, step: &Step) -> Result<(), DebuggerError> {
        if !step.is_composite {
            return Err(DebuggerError::StepNotComposite(step.id.clone()));
        }

        let location = self
            .runtime
            .get_step_location(GetStepLocationArguments {
                source_file: self.source_file.clone(),
                step_id: step.id.clone(),
            })
            .await?;
        self.steps.cache_available_location(&step.id, location);

        self.runtime
            .enter_composite_step(EnterCompositeStepArguments {
                source_file: self.source_file.clone(),
                step_id: step.id.clone(),
            })
            .await?;

        let available = self
            .runtime
            .get_available_steps(GetAvailableStepsArguments {
                source_file: self.source_file.clone(),
            })
            .await?
            .available_steps;
        self.steps.update(available, &[]);
        self.paused_on_current_step = false;

        tracing::debug!(step = %step.id, depth = self.steps.stack().len(), "entered composite step");
        Ok(())
    }

    /// Execute an atomic step: advance the runtime, drop the stale variable
    /// handles and runtime-state tree, refresh the step list.
    async fn execute_atomic(&mut self, step: &Step) -> Result<Vec<String>, DebuggerError> {
        if step.is_composite {
            return Err(DebuggerError::StepNotAtomic(step.id.clone()));
        }

        let completed = self
            .runtime
            .execute_atomic_step(ExecuteAtomicStepArguments {
                source_file: self.source_file.clone(),
                step_id: step.id.clone(),
            })
            .await?
            .completed_steps;

        self.variables.invalidate();
        self.runtime_state = None;
        self.registry.clear_runtime();

        let available = self
            .runtime
            .get_available_steps(GetAvailableStepsArguments {
                source_file: self.source_file.clone(),
            })
            .await?
            .available_steps;
        self.steps.update(available, &completed);
        self.paused_on_current_step = false;

        tracing::debug!(step = %step.id, completed = ?completed, "executed atomic step");
        Ok(completed)
    }

    fn report_stop(&mut self, pause: PauseInformation) -> Result<(), DebuggerError> {
        self.paused_on_current_step = true;
        let reason = pause.reason();
        let description = pause.description();
        tracing::debug!(%reason, "execution stopped");
        let _ = self.event_tx.send(RuntimeEvent::Stopped {
            reason,
            description,
        });
        Ok(())
    }

    fn terminate(&mut self) -> Result<(), DebuggerError> {
        if self.terminated_event_sent {
            return Err(DebuggerError::TerminationEventAlreadySent);
        }
        self.terminated_event_sent = true;
        tracing::debug!("execution terminated");
        let _ = self.event_tx.send(RuntimeEvent::Terminated);
        Ok(())
    }

    /// Motion requested after termination: re-announce termination rather
    /// than failing the session.
    fn resend_terminated(&mut self) -> Result<(), DebuggerError> {
        tracing::debug!("motion request after termination");
        let _ = self.event_tx.send(RuntimeEvent::Terminated);
        Ok(())
    }

    // State queried by the session and the extension requests.

    pub fn breakpoint_types(&self) -> Vec<BreakpointType> {
        self.breakpoints.available_types()
    }

    pub fn set_domain_breakpoints(&mut self, list: Vec<DomainBreakpoint>) -> Vec<bool> {
        self.breakpoints.set_domain_breakpoints(list)
    }

    pub fn available_steps(&self) -> Vec<Step> {
        self.steps.available().to_vec()
    }

    /// Replace the selected step; returns whether the selection changed.
    pub fn select_step(&mut self, step_id: &str) -> Result<bool, DebuggerError> {
        let changed = self.steps.select(step_id)?;
        if changed {
            tracing::debug!(step = step_id, "selected step changed");
        }
        Ok(changed)
    }

    pub fn elements_of_type(&self, type_tag: &str) -> Vec<ModelElementReference> {
        self.registry
            .elements_of_type(type_tag, &self.ast, self.runtime_state.as_ref())
    }

    /// Resolve a client source position to the containing element.
    pub fn element_reference_from_source(
        &self,
        line: i64,
        column: i64,
    ) -> Option<ModelElementReference> {
        self.locator
            .element_from_position(&self.ast, line, column, self.origin)
            .map(|node| self.ast.reference(node))
    }

    /// Verify client source breakpoints against the AST.
    pub fn verify_source_breakpoints(&self, breakpoints: &[SourceBreakpoint]) -> Vec<Breakpoint> {
        self.breakpoints
            .verify_source_breakpoints(breakpoints, &self.locator, &self.ast, self.origin)
    }

    /// One frame per entered composite, innermost first, plus the `Main`
    /// root frame.
    pub fn stack_trace(&mut self) -> StackTraceResponseBody {
        let stack: Vec<Step> = self.steps.stack().to_vec();
        let mut frames = Vec::with_capacity(stack.len() + 1);
        for step in stack.iter().rev() {
            let location = self.steps.stack_location(&step.id);
            frames.push(self.make_frame(step.name.clone(), location));
        }
        frames.push(self.make_frame("Main".to_string(), None));

        let total = frames.len() as i64;
        StackTraceResponseBody {
            stack_frames: frames,
            total_frames: Some(total),
        }
    }

    fn make_frame(
        &mut self,
        name: String,
        location: Option<runtime_protocol::types::Location>,
    ) -> StackFrame {
        let id = self.next_frame_id;
        self.next_frame_id += 1;

        let source = Some(Source {
            name: None,
            path: Some(self.source_file.clone()),
        });

        match location {
            Some(location) => StackFrame {
                id,
                name,
                source,
                line: location.line + self.origin.line_base,
                column: location.column + self.origin.column_base,
                end_line: Some(location.end_line + self.origin.line_base),
                end_column: Some(location.end_column + self.origin.column_base),
                can_restart: false,
            },
            None => StackFrame {
                id,
                name,
                source,
                line: 0,
                column: 0,
                end_line: None,
                end_column: None,
                can_restart: false,
            },
        }
    }

    /// The two fixed scopes: the AST and the runtime state.
    pub fn scopes(&self) -> Vec<Scope> {
        vec![
            Scope {
                name: "AST".to_string(),
                variables_reference: AST_ROOT_REFERENCE,
                expensive: false,
            },
            Scope {
                name: "Runtime State".to_string(),
                variables_reference: RUNTIME_ROOT_REFERENCE,
                expensive: false,
            },
        ]
    }

    /// Resolve a variable handle, fetching and indexing the runtime-state
    /// tree on the first request after an invalidation.
    ///
    /// The fetch happens before any handle is minted so that the table
    /// reseed cannot drop handles the client just received.
    pub async fn variables(&mut self, reference: i64) -> Result<Vec<Variable>, DebuggerError> {
        if self.runtime_state.is_none() {
            let result = self
                .runtime
                .get_runtime_state(GetRuntimeStateArguments {
                    source_file: self.source_file.clone(),
                })
                .await?;
            let tree = ModelTree::build(TreeKind::RuntimeState, result.runtime_state_root);
            tracing::debug!(elements = tree.len(), "fetched runtime state");
            self.registry.index_runtime(&tree);
            self.runtime_state = Some(tree);
            self.variables.runtime_updated();
        }

        Ok(self
            .variables
            .variables(reference, &self.ast, self.runtime_state.as_ref())
            .unwrap_or_default())
    }
}
