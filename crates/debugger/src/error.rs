//! Error kinds of the debug session core.

use runtime_protocol::RpcError;

/// Failures raised by the execution engine and its managers.
///
/// Runtime transport failures are fatal for the owning session. The other
/// variants are logic errors: a request asked for something the current
/// execution state cannot do.
#[derive(Debug, thiserror::Error)]
pub enum DebuggerError {
    /// The language runtime connection failed or answered garbage.
    #[error("language runtime failure: {0}")]
    Runtime(#[from] RpcError),

    /// A step operation was requested while no step is selected.
    #[error("no step is currently selected")]
    NoSelectedStep,

    /// `enterCompositeStep` was attempted on an atomic step.
    #[error("step {0} is not a composite step")]
    StepNotComposite(String),

    /// `executeAtomicStep` was attempted on a composite step.
    #[error("step {0} is not an atomic step")]
    StepNotAtomic(String),

    /// A step id was given that is not among the available steps.
    #[error("unknown step id {0}")]
    UnknownStep(String),

    /// The engine tried to terminate an execution twice.
    #[error("termination event was already sent")]
    TerminationEventAlreadySent,
}
