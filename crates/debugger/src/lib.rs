//! Domain-parametric debug session core.
//!
//! The debugger owns no language semantics: it composes the parse / step /
//! check-breakpoint / get-state primitives of a language runtime (reached
//! over JSON-RPC) into an interactive debugging session behind a DAP-style
//! client protocol.

mod breakpoints;
mod custom;
mod engine;
mod error;
mod locator;
mod model;
mod pause;
mod session;
mod steps;
pub mod testing;
mod variables;

pub use breakpoints::{ActivatedBreakpoint, BreakpointManager};
pub use custom::{is_custom_command, CustomRequestError, CustomRequestOutcome};
pub use engine::{DebugRuntime, EngineConfig, RuntimeEvent};
pub use error::DebuggerError;
pub use locator::{ElementLocator, Origin, TypeRegistry};
pub use model::{ModelElementReference, ModelNode, ModelTree, NodeId, TreeKind};
pub use pause::{PauseInformation, PauseReason};
pub use session::{DebugSession, RuntimeConnector, TcpRuntimeConnector, THREAD_ID};
pub use steps::StepManager;
pub use variables::{VariableHandler, AST_ROOT_REFERENCE, RUNTIME_ROOT_REFERENCE};
