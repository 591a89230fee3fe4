//! The runtime operation seam.
//!
//! [`LanguageRuntime`] has one method per wire operation; the execution
//! engine is generic over it. [`RuntimeProxy`] is the production
//! implementation over an [`RpcClient`]; tests substitute scripted mocks.

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::client::RpcClient;
use crate::error::RpcError;
use crate::types::{
    CheckBreakpointArguments, CheckBreakpointResult, EnterCompositeStepArguments,
    ExecuteAtomicStepArguments, ExecuteAtomicStepResult, GetAvailableStepsArguments,
    GetAvailableStepsResult, GetBreakpointTypesResult, GetRuntimeStateArguments,
    GetRuntimeStateResult, GetStepLocationArguments, GetStepLocationResult,
    InitializeExecutionArguments, Location, ParseArguments, ParseResult,
};

/// The operations a language runtime offers over the wire.
///
/// Every method suspends on the runtime connection; between two calls the
/// caller's state is fully consistent.
#[async_trait]
pub trait LanguageRuntime: Send {
    /// Parse the program and return the AST root. Idempotent.
    async fn parse(&mut self, args: ParseArguments) -> Result<ParseResult, RpcError>;

    /// Prepare the runtime for execution. Called exactly once per session.
    async fn initialize_execution(
        &mut self,
        args: InitializeExecutionArguments,
    ) -> Result<(), RpcError>;

    /// Fetch the current runtime-state tree.
    async fn get_runtime_state(
        &mut self,
        args: GetRuntimeStateArguments,
    ) -> Result<GetRuntimeStateResult, RpcError>;

    /// Fetch the breakpoint type catalog. Called once, post-init.
    async fn get_breakpoint_types(&mut self) -> Result<GetBreakpointTypesResult, RpcError>;

    /// Evaluate one installed breakpoint against the step about to run.
    async fn check_breakpoint(
        &mut self,
        args: CheckBreakpointArguments,
    ) -> Result<CheckBreakpointResult, RpcError>;

    /// Fetch the currently available steps.
    async fn get_available_steps(
        &mut self,
        args: GetAvailableStepsArguments,
    ) -> Result<GetAvailableStepsResult, RpcError>;

    /// Enter a composite step, exposing its sub-steps.
    async fn enter_composite_step(
        &mut self,
        args: EnterCompositeStepArguments,
    ) -> Result<(), RpcError>;

    /// Execute an atomic step, advancing runtime state.
    async fn execute_atomic_step(
        &mut self,
        args: ExecuteAtomicStepArguments,
    ) -> Result<ExecuteAtomicStepResult, RpcError>;

    /// Fetch the source location of a step, when it has one.
    async fn get_step_location(
        &mut self,
        args: GetStepLocationArguments,
    ) -> Result<Option<Location>, RpcError>;
}

/// Typed wrapper over the JSON-RPC client.
pub struct RuntimeProxy<T> {
    client: RpcClient<T>,
}

impl<T> RuntimeProxy<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(client: RpcClient<T>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl<T> LanguageRuntime for RuntimeProxy<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn parse(&mut self, args: ParseArguments) -> Result<ParseResult, RpcError> {
        self.client.call_typed("parse", &args).await
    }

    async fn initialize_execution(
        &mut self,
        args: InitializeExecutionArguments,
    ) -> Result<(), RpcError> {
        let _: serde_json::Value = self.client.call_typed("initializeExecution", &args).await?;
        Ok(())
    }

    async fn get_runtime_state(
        &mut self,
        args: GetRuntimeStateArguments,
    ) -> Result<GetRuntimeStateResult, RpcError> {
        self.client.call_typed("getRuntimeState", &args).await
    }

    async fn get_breakpoint_types(&mut self) -> Result<GetBreakpointTypesResult, RpcError> {
        self.client
            .call_typed("getBreakpointTypes", &serde_json::json!({}))
            .await
    }

    async fn check_breakpoint(
        &mut self,
        args: CheckBreakpointArguments,
    ) -> Result<CheckBreakpointResult, RpcError> {
        self.client.call_typed("checkBreakpoint", &args).await
    }

    async fn get_available_steps(
        &mut self,
        args: GetAvailableStepsArguments,
    ) -> Result<GetAvailableStepsResult, RpcError> {
        self.client.call_typed("getAvailableSteps", &args).await
    }

    async fn enter_composite_step(
        &mut self,
        args: EnterCompositeStepArguments,
    ) -> Result<(), RpcError> {
        let _: serde_json::Value = self.client.call_typed("enterCompositeStep", &args).await?;
        Ok(())
    }

    async fn execute_atomic_step(
        &mut self,
        args: ExecuteAtomicStepArguments,
    ) -> Result<ExecuteAtomicStepResult, RpcError> {
        self.client.call_typed("executeAtomicStep", &args).await
    }

    async fn get_step_location(
        &mut self,
        args: GetStepLocationArguments,
    ) -> Result<Option<Location>, RpcError> {
        let result: GetStepLocationResult =
            self.client.call_typed("getStepLocation", &args).await?;
        Ok(result.location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedRuntimeServer;

    #[tokio::test]
    async fn proxy_round_trips_typed_payloads() {
        let (stream, server) = ScriptedRuntimeServer::start(vec![
            (
                "parse",
                serde_json::json!({"astRoot": {"id": "root", "types": ["Program"]}}),
            ),
            (
                "getAvailableSteps",
                serde_json::json!({"availableSteps": [
                    {"id": "s0", "name": "first", "isComposite": false}
                ]}),
            ),
            ("getStepLocation", serde_json::json!({})),
        ]);

        let mut proxy = RuntimeProxy::new(RpcClient::new(stream));

        let parsed = proxy
            .parse(ParseArguments {
                source_file: "p".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(parsed.ast_root.id, "root");

        let steps = proxy
            .get_available_steps(GetAvailableStepsArguments {
                source_file: "p".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(steps.available_steps.len(), 1);
        assert!(!steps.available_steps[0].is_composite);

        let location = proxy
            .get_step_location(GetStepLocationArguments {
                source_file: "p".to_string(),
                step_id: "s0".to_string(),
            })
            .await
            .unwrap();
        assert!(location.is_none());

        server.finish().await;
    }
}
