//! The per-connection debug session.
//!
//! A session owns one client connection and, once launched, one execution
//! engine. Requests are dispatched sequentially by a single loop; the only
//! long-running work (launching and driving the execution) happens on
//! spawned tasks over the shared engine, so the loop stays responsive to
//! `pause` and `disconnect`. Responses always precede the events their
//! requests cause: handlers enqueue the response before any drive task
//! starts.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use serde::Serialize;
use serde_json::json;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};

use runtime_protocol::{LanguageRuntime, RpcClient, RuntimeProxy};
use transport::events::{Event, InvalidatedEventBody, StoppedEventBody};
use transport::requests::{
    InitializeArguments, LaunchArguments, SetBreakpointsArguments, VariablesArguments,
};
use transport::responses::{
    ContinueResponseBody, ScopesResponseBody, SetBreakpointsResponseBody, ThreadsResponseBody,
    VariablesResponseBody,
};
use transport::types::{Breakpoint, Capabilities, SourceBreakpoint, Thread};
use transport::{
    DapReader, DapTransport, DapWriter, Message, OutgoingEvent, OutgoingMessage, OutgoingResponse,
    Request, Seq, ERROR_ALREADY_INITIALIZED, ERROR_NOT_IMPLEMENTED, ERROR_NOT_INITIALIZED,
};

use crate::custom::{self, CustomRequestError};
use crate::engine::{DebugRuntime, EngineConfig, RuntimeEvent};
use crate::error::DebuggerError;
use crate::locator::Origin;

/// The single mock thread every session reports.
pub const THREAD_ID: i64 = 1;

/// How a session reaches its language runtime.
///
/// Production connects a TCP JSON-RPC client; tests inject scripted mocks.
#[async_trait]
pub trait RuntimeConnector: Send + Sync + 'static {
    type Runtime: LanguageRuntime + Send + 'static;

    async fn connect(&self, port: u16) -> eyre::Result<Self::Runtime>;
}

/// Connects to a language runtime listening on localhost.
pub struct TcpRuntimeConnector;

#[async_trait]
impl RuntimeConnector for TcpRuntimeConnector {
    type Runtime = RuntimeProxy<TcpStream>;

    async fn connect(&self, port: u16) -> eyre::Result<Self::Runtime> {
        let client = RpcClient::connect(("127.0.0.1", port))
            .await
            .map_err(|e| eyre::eyre!("connecting to language runtime on port {port}: {e}"))?;
        Ok(RuntimeProxy::new(client))
    }
}

/// One debug session bound to one client connection.
pub struct DebugSession<C: RuntimeConnector> {
    connector: Arc<C>,
}

impl<C: RuntimeConnector> DebugSession<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector: Arc::new(connector),
        }
    }

    /// Serve the connection until the client disconnects.
    pub async fn run<T: DapTransport>(self, transport: T) -> eyre::Result<()> {
        let (reader, writer) = transport::split(transport);
        self.run_split(reader, writer).await
    }

    /// Serve a pre-split connection (used by tests over in-memory pairs).
    pub async fn run_split<Rd, Wr>(
        self,
        mut reader: DapReader<Rd>,
        mut writer: DapWriter<Wr>,
    ) -> eyre::Result<()>
    where
        Rd: AsyncRead + Unpin + Send,
        Wr: AsyncWrite + Unpin + Send + 'static,
    {
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Outgoing>();
        let (internal_tx, mut internal_rx) = mpsc::unbounded_channel::<Internal<C::Runtime>>();
        let (engine_event_tx, mut engine_event_rx) = mpsc::unbounded_channel::<RuntimeEvent>();

        // Single writer task: assigns outgoing sequence numbers and
        // serializes everything in enqueue order.
        let writer_task = tokio::spawn(async move {
            let mut next_seq: Seq = 1;
            while let Some(outgoing) = out_rx.recv().await {
                let seq = next_seq;
                next_seq += 1;
                let message = match outgoing {
                    Outgoing::Response {
                        request_seq,
                        command,
                        success,
                        message,
                        body,
                    } => OutgoingMessage::Response(OutgoingResponse {
                        seq,
                        request_seq,
                        success,
                        command,
                        message,
                        body,
                    }),
                    Outgoing::Event(event) => OutgoingMessage::Event(event_message(event, seq)),
                };
                if let Err(error) = writer.send(message).await {
                    tracing::error!(%error, "failed to write message, stopping writer");
                    break;
                }
            }
        });

        let mut inner = SessionLoop {
            connector: self.connector,
            out_tx,
            internal_tx,
            engine_event_tx,
            origin: Origin::default(),
            phase: Phase::Idle,
            deferred: None,
        };

        loop {
            tokio::select! {
                message = reader.next() => match message {
                    None => {
                        tracing::debug!("client closed the connection");
                        break;
                    }
                    Some(Err(error)) => {
                        tracing::error!(%error, "client transport error");
                        break;
                    }
                    Some(Ok(Message::Request(request))) => {
                        if inner.handle_request(request).await == Flow::Disconnect {
                            break;
                        }
                    }
                    Some(Ok(_)) => {
                        tracing::warn!("ignoring non-request message from client");
                    }
                },
                Some(internal) = internal_rx.recv() => inner.handle_internal(internal),
                Some(event) = engine_event_rx.recv() => inner.forward_runtime_event(event),
            }
        }

        drop(inner);
        let _ = writer_task.await;
        Ok(())
    }
}

fn event_message(event: Event, seq: Seq) -> OutgoingEvent {
    event.into_message(seq)
}

/// What goes onto the single outgoing queue.
enum Outgoing {
    Response {
        request_seq: Seq,
        command: String,
        success: bool,
        message: Option<String>,
        body: Option<serde_json::Value>,
    },
    Event(Event),
}

/// Completion notices from spawned tasks back to the session loop.
enum Internal<R> {
    LaunchFinished {
        request_seq: Seq,
        pause_flag: Arc<AtomicBool>,
        result: Result<DebugRuntime<R>, eyre::Report>,
    },
}

/// Session lifecycle.
enum Phase<R> {
    /// No launch request seen yet.
    Idle,
    /// Launch in flight: parsing and runtime initialization.
    Launching,
    /// Engine up and driving.
    Active(Active<R>),
}

struct Active<R> {
    engine: Arc<Mutex<DebugRuntime<R>>>,
    pause_flag: Arc<AtomicBool>,
    /// A motion drive is in progress.
    running: Arc<AtomicBool>,
    /// A drive hit a fatal runtime failure; the session is unusable.
    failed: Arc<AtomicBool>,
}

impl<R> Clone for Active<R> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            pause_flag: Arc::clone(&self.pause_flag),
            running: Arc::clone(&self.running),
            failed: Arc::clone(&self.failed),
        }
    }
}

/// A `setBreakpoints` that arrived before the engine existed. One slot;
/// last writer wins.
struct DeferredBreakpoints {
    request_seq: Seq,
    breakpoints: Vec<SourceBreakpoint>,
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Disconnect,
}

#[derive(Debug, Clone, Copy)]
enum MotionOp {
    Start,
    Continue,
    Next,
    StepIn,
    StepOut,
}

struct SessionLoop<C: RuntimeConnector> {
    connector: Arc<C>,
    out_tx: mpsc::UnboundedSender<Outgoing>,
    internal_tx: mpsc::UnboundedSender<Internal<C::Runtime>>,
    engine_event_tx: mpsc::UnboundedSender<RuntimeEvent>,
    origin: Origin,
    phase: Phase<C::Runtime>,
    deferred: Option<DeferredBreakpoints>,
}

impl<C: RuntimeConnector> SessionLoop<C> {
    async fn handle_request(&mut self, request: Request) -> Flow {
        tracing::debug!(command = %request.command, seq = request.seq, "handling request");
        let seq = request.seq;
        let command = request.command.clone();

        match command.as_str() {
            "initialize" => self.on_initialize(seq, &request),
            "launch" => self.on_launch(seq, &request),
            "configurationDone" => self.respond_ok(seq, &command, None),
            "threads" => self.respond_body(
                seq,
                &command,
                &ThreadsResponseBody {
                    threads: vec![Thread {
                        id: THREAD_ID,
                        name: "Unique Thread".to_string(),
                    }],
                },
            ),
            "disconnect" => {
                self.respond_ok(seq, &command, None);
                return Flow::Disconnect;
            }
            "setBreakpoints" => self.on_set_breakpoints(seq, &request).await,
            "continue" => self.on_motion(seq, &command, MotionOp::Continue),
            "next" => self.on_motion(seq, &command, MotionOp::Next),
            "stepIn" => self.on_motion(seq, &command, MotionOp::StepIn),
            "stepOut" => self.on_motion(seq, &command, MotionOp::StepOut),
            "pause" => self.on_pause(seq, &command),
            "stackTrace" => self.on_stack_trace(seq, &command).await,
            "scopes" => self.on_scopes(seq, &command).await,
            "variables" => self.on_variables(seq, &request).await,
            "evaluate" | "attach" | "source" => self.respond_error(
                seq,
                &command,
                ERROR_NOT_IMPLEMENTED,
                &format!("{command} is not supported"),
                None,
            ),
            other if custom::is_custom_command(other) => self.on_custom(seq, &request).await,
            other => self.respond_error(
                seq,
                &command,
                ERROR_NOT_IMPLEMENTED,
                &format!("unsupported command {other}"),
                None,
            ),
        }

        Flow::Continue
    }

    fn on_initialize(&mut self, seq: Seq, request: &Request) {
        let args = request
            .arguments
            .as_ref()
            .and_then(|v| serde_json::from_value::<InitializeArguments>(v.clone()).ok())
            .unwrap_or_default();
        self.origin = Origin::new(
            args.lines_start_at1.unwrap_or(true),
            args.columns_start_at1.unwrap_or(true),
        );

        let capabilities = Capabilities {
            supports_configuration_done_request: Some(true),
            supports_function_breakpoints: Some(false),
            supports_conditional_breakpoints: Some(false),
            supports_step_back: Some(false),
            supports_restart_request: Some(false),
            supports_terminate_request: Some(false),
            supports_single_thread_execution_requests: Some(false),
        };
        self.respond_body(seq, "initialize", &capabilities);
        self.send_event(Event::Initialized);
    }

    fn on_launch(&mut self, seq: Seq, request: &Request) {
        if !matches!(self.phase, Phase::Idle) {
            self.respond_error(
                seq,
                "launch",
                ERROR_ALREADY_INITIALIZED,
                "a debug session was already launched",
                None,
            );
            return;
        }

        let args: LaunchArguments = match parse_arguments(request) {
            Ok(args) => args,
            Err(error) => {
                self.respond_error(
                    seq,
                    "launch",
                    ERROR_NOT_IMPLEMENTED,
                    &format!("malformed launch arguments: {error}"),
                    None,
                );
                return;
            }
        };

        if args.no_debug == Some(true) {
            self.respond_error(
                seq,
                "launch",
                ERROR_NOT_IMPLEMENTED,
                "running without debugging is not supported",
                None,
            );
            return;
        }

        let config = EngineConfig::new(
            args.pause_on_start.unwrap_or(false),
            args.pause_on_end.unwrap_or(false),
        );
        let entries = match args.additional_args {
            Some(serde_json::Value::Object(map)) => map,
            Some(other) => {
                tracing::warn!(?other, "ignoring non-object additionalArgs");
                serde_json::Map::new()
            }
            None => serde_json::Map::new(),
        };

        self.phase = Phase::Launching;

        let connector = Arc::clone(&self.connector);
        let event_tx = self.engine_event_tx.clone();
        let internal_tx = self.internal_tx.clone();
        let origin = self.origin;
        let pause_flag = Arc::new(AtomicBool::new(false));
        let engine_pause_flag = Arc::clone(&pause_flag);
        let source_file = args.source_file;
        let port = args.language_runtime_port;

        tokio::spawn(async move {
            tracing::debug!(%source_file, port, "launching debug session");
            let result = async {
                let runtime = connector.connect(port).await?;
                let engine = DebugRuntime::initialize(
                    runtime,
                    source_file,
                    config,
                    entries,
                    origin,
                    event_tx,
                    engine_pause_flag,
                )
                .await?;
                Ok::<_, eyre::Report>(engine)
            }
            .await;
            let _ = internal_tx.send(Internal::LaunchFinished {
                request_seq: seq,
                pause_flag,
                result,
            });
        });
    }

    fn handle_internal(&mut self, internal: Internal<C::Runtime>) {
        match internal {
            Internal::LaunchFinished {
                request_seq,
                pause_flag,
                result,
            } => match result {
                Ok(engine) => self.finish_launch(request_seq, pause_flag, engine),
                Err(error) => {
                    tracing::error!(?error, "launch failed");
                    self.phase = Phase::Idle;
                    let deferred = self.deferred.take();
                    let respond_launch = |s: &Self| {
                        s.respond_failure(request_seq, "launch", &format!("launch failed: {error}"))
                    };
                    match deferred {
                        Some(deferred) if deferred.request_seq < request_seq => {
                            self.respond_unverified(&deferred);
                            respond_launch(self);
                        }
                        Some(deferred) => {
                            respond_launch(self);
                            self.respond_unverified(&deferred);
                        }
                        None => respond_launch(self),
                    }
                }
            },
        }
    }

    /// The engine is up: answer the launch (and any deferred breakpoint
    /// request, in request order) and kick off the initial drive.
    fn finish_launch(
        &mut self,
        request_seq: Seq,
        pause_flag: Arc<AtomicBool>,
        engine: DebugRuntime<C::Runtime>,
    ) {
        let deferred = self
            .deferred
            .take()
            .map(|d| (d.request_seq, engine.verify_source_breakpoints(&d.breakpoints)));

        match deferred {
            Some((deferred_seq, outcomes)) if deferred_seq < request_seq => {
                self.respond_breakpoints(deferred_seq, outcomes);
                self.respond_ok(request_seq, "launch", None);
            }
            Some((deferred_seq, outcomes)) => {
                self.respond_ok(request_seq, "launch", None);
                self.respond_breakpoints(deferred_seq, outcomes);
            }
            None => self.respond_ok(request_seq, "launch", None),
        }

        let active = Active {
            engine: Arc::new(Mutex::new(engine)),
            pause_flag,
            running: Arc::new(AtomicBool::new(false)),
            failed: Arc::new(AtomicBool::new(false)),
        };
        self.spawn_drive(&active, MotionOp::Start);
        self.phase = Phase::Active(active);
    }

    async fn on_set_breakpoints(&mut self, seq: Seq, request: &Request) {
        let args: SetBreakpointsArguments = match parse_arguments(request) {
            Ok(args) => args,
            Err(error) => {
                self.respond_error(
                    seq,
                    "setBreakpoints",
                    ERROR_NOT_IMPLEMENTED,
                    &format!("malformed setBreakpoints arguments: {error}"),
                    None,
                );
                return;
            }
        };
        let breakpoints = args.breakpoints.unwrap_or_default();

        match &self.phase {
            Phase::Active(active) => {
                let active = active.clone();
                if active.running.load(Ordering::SeqCst) {
                    self.respond_failure(seq, "setBreakpoints", "execution is running");
                    return;
                }
                let engine = active.engine.lock().await;
                let outcomes = engine.verify_source_breakpoints(&breakpoints);
                drop(engine);
                self.respond_breakpoints(seq, outcomes);
            }
            Phase::Idle | Phase::Launching => {
                // queue until the engine exists; a newer request replaces
                // the pending one, which answers unverified
                let previous = self.deferred.replace(DeferredBreakpoints {
                    request_seq: seq,
                    breakpoints,
                });
                if let Some(previous) = previous {
                    self.respond_unverified(&previous);
                }
            }
        }
    }

    fn on_motion(&mut self, seq: Seq, command: &str, op: MotionOp) {
        let Some(active) = self.active() else {
            self.respond_error(
                seq,
                command,
                ERROR_NOT_INITIALIZED,
                "no debug session has been launched",
                None,
            );
            return;
        };
        if active.failed.load(Ordering::SeqCst) {
            self.respond_failure(seq, command, "the debug session has failed");
            return;
        }
        if active.running.load(Ordering::SeqCst) {
            self.respond_failure(seq, command, "execution is already running");
            return;
        }

        // respond before the drive so the response precedes its events
        let body = match op {
            MotionOp::Continue => serde_json::to_value(ContinueResponseBody {
                all_threads_continued: Some(true),
            })
            .ok(),
            _ => None,
        };
        self.respond_ok(seq, command, body);
        self.spawn_drive(&active, op);
    }

    fn spawn_drive(&self, active: &Active<C::Runtime>, op: MotionOp) {
        active.running.store(true, Ordering::SeqCst);

        let engine = Arc::clone(&active.engine);
        let running = Arc::clone(&active.running);
        let failed = Arc::clone(&active.failed);
        let event_tx = self.engine_event_tx.clone();

        tokio::spawn(async move {
            let mut engine = engine.lock().await;
            let result = match op {
                MotionOp::Start => engine.start().await,
                MotionOp::Continue => engine.run().await,
                MotionOp::Next => engine.next_step().await,
                MotionOp::StepIn => engine.step_in().await,
                MotionOp::StepOut => engine.step_out().await,
            };
            drop(engine);
            running.store(false, Ordering::SeqCst);

            if let Err(error) = result {
                tracing::error!(%error, "execution drive failed, session is unusable");
                failed.store(true, Ordering::SeqCst);
                let _ = event_tx.send(RuntimeEvent::Terminated);
            }
        });
    }

    fn on_pause(&mut self, seq: Seq, command: &str) {
        let Some(active) = self.active() else {
            self.respond_error(
                seq,
                command,
                ERROR_NOT_INITIALIZED,
                "no debug session has been launched",
                None,
            );
            return;
        };

        // only a running drive observes the flag; pausing while paused is a
        // no-op
        if active.running.load(Ordering::SeqCst) {
            active.pause_flag.store(true, Ordering::SeqCst);
        }
        self.respond_ok(seq, command, None);
    }

    async fn on_stack_trace(&mut self, seq: Seq, command: &str) {
        let Some(active) = self.active() else {
            self.respond_error(
                seq,
                command,
                ERROR_NOT_INITIALIZED,
                "no debug session has been launched",
                None,
            );
            return;
        };
        if active.running.load(Ordering::SeqCst) {
            self.respond_failure(seq, command, "execution is running");
            return;
        }
        let mut engine = active.engine.lock().await;
        let body = engine.stack_trace();
        drop(engine);
        self.respond_body(seq, command, &body);
    }

    async fn on_scopes(&mut self, seq: Seq, command: &str) {
        let Some(active) = self.active() else {
            self.respond_error(
                seq,
                command,
                ERROR_NOT_INITIALIZED,
                "no debug session has been launched",
                None,
            );
            return;
        };
        if active.running.load(Ordering::SeqCst) {
            self.respond_failure(seq, command, "execution is running");
            return;
        }
        let engine = active.engine.lock().await;
        let body = ScopesResponseBody {
            scopes: engine.scopes(),
        };
        drop(engine);
        self.respond_body(seq, command, &body);
    }

    async fn on_variables(&mut self, seq: Seq, request: &Request) {
        let command = "variables";
        let Some(active) = self.active() else {
            self.respond_error(
                seq,
                command,
                ERROR_NOT_INITIALIZED,
                "no debug session has been launched",
                None,
            );
            return;
        };
        let args: VariablesArguments = match parse_arguments(request) {
            Ok(args) => args,
            Err(error) => {
                self.respond_error(
                    seq,
                    command,
                    ERROR_NOT_IMPLEMENTED,
                    &format!("malformed variables arguments: {error}"),
                    None,
                );
                return;
            }
        };

        if active.running.load(Ordering::SeqCst) {
            self.respond_failure(seq, command, "execution is running");
            return;
        }
        let mut engine = active.engine.lock().await;
        match engine.variables(args.variables_reference).await {
            Ok(variables) => {
                drop(engine);
                self.respond_body(seq, command, &VariablesResponseBody { variables });
            }
            Err(error) => {
                drop(engine);
                tracing::error!(%error, "variables request failed");
                if matches!(error, DebuggerError::Runtime(_)) {
                    active.failed.store(true, Ordering::SeqCst);
                }
                self.respond_failure(seq, command, &error.to_string());
            }
        }
    }

    async fn on_custom(&mut self, seq: Seq, request: &Request) {
        let command = request.command.clone();
        let Some(active) = self.active() else {
            self.respond_error(
                seq,
                &command,
                ERROR_NOT_INITIALIZED,
                "no debug session has been launched",
                None,
            );
            return;
        };

        if active.running.load(Ordering::SeqCst) {
            self.respond_failure(seq, &command, "execution is running");
            return;
        }
        let mut engine = active.engine.lock().await;
        let result = custom::dispatch(&mut engine, &command, request.arguments.as_ref()).await;
        drop(engine);

        match result {
            Ok(outcome) => {
                self.respond_ok(seq, &command, outcome.body);
                if outcome.invalidate_stacks {
                    self.send_event(Event::Invalidated(InvalidatedEventBody {
                        areas: vec!["stacks".to_string()],
                    }));
                }
            }
            Err(error @ (CustomRequestError::Malformed { .. }
            | CustomRequestError::UnknownCommand(_))) => {
                self.respond_error(
                    seq,
                    &command,
                    ERROR_NOT_IMPLEMENTED,
                    &error.to_string(),
                    Some(error.diagnostic_body()),
                );
            }
            Err(CustomRequestError::Engine(error)) => {
                if matches!(error, DebuggerError::Runtime(_)) {
                    active.failed.store(true, Ordering::SeqCst);
                }
                self.respond_failure(seq, &command, &error.to_string());
            }
        }
    }

    fn forward_runtime_event(&self, event: RuntimeEvent) {
        let event = match event {
            RuntimeEvent::Stopped {
                reason,
                description,
            } => Event::Stopped(StoppedEventBody {
                reason,
                description,
                thread_id: THREAD_ID,
                all_threads_stopped: true,
            }),
            RuntimeEvent::Terminated => Event::Terminated,
        };
        self.send_event(event);
    }

    fn active(&self) -> Option<Active<C::Runtime>> {
        match &self.phase {
            Phase::Active(active) => Some(active.clone()),
            _ => None,
        }
    }

    fn respond_breakpoints(&self, request_seq: Seq, breakpoints: Vec<Breakpoint>) {
        self.respond_body(
            request_seq,
            "setBreakpoints",
            &SetBreakpointsResponseBody { breakpoints },
        );
    }

    fn respond_unverified(&self, deferred: &DeferredBreakpoints) {
        let outcomes = deferred
            .breakpoints
            .iter()
            .map(|_| Breakpoint {
                id: None,
                verified: false,
                message: None,
            })
            .collect();
        self.respond_breakpoints(deferred.request_seq, outcomes);
    }

    fn respond_ok(&self, request_seq: Seq, command: &str, body: Option<serde_json::Value>) {
        let _ = self.out_tx.send(Outgoing::Response {
            request_seq,
            command: command.to_string(),
            success: true,
            message: None,
            body,
        });
    }

    fn respond_body<T: Serialize>(&self, request_seq: Seq, command: &str, body: &T) {
        self.respond_ok(request_seq, command, serde_json::to_value(body).ok());
    }

    fn respond_failure(&self, request_seq: Seq, command: &str, message: &str) {
        let _ = self.out_tx.send(Outgoing::Response {
            request_seq,
            command: command.to_string(),
            success: false,
            message: Some(message.to_string()),
            body: None,
        });
    }

    fn respond_error(
        &self,
        request_seq: Seq,
        command: &str,
        code: i64,
        message: &str,
        extra: Option<serde_json::Value>,
    ) {
        let mut body = json!({
            "error": {"id": code, "format": message},
        });
        if let (Some(serde_json::Value::Object(extra)), Some(target)) =
            (extra, body.as_object_mut())
        {
            for (key, value) in extra {
                target.insert(key, value);
            }
        }

        let _ = self.out_tx.send(Outgoing::Response {
            request_seq,
            command: command.to_string(),
            success: false,
            message: Some(message.to_string()),
            body: Some(body),
        });
    }

    fn send_event(&self, event: Event) {
        let _ = self.out_tx.send(Outgoing::Event(event));
    }
}

fn parse_arguments<T: serde::de::DeserializeOwned>(
    request: &Request,
) -> Result<T, serde_json::Error> {
    let value = request
        .arguments
        .clone()
        .unwrap_or(serde_json::Value::Null);
    serde_json::from_value(value)
}
