// trendlens-mcp/src/server.rs
// ============================================================================
// Module: MCP Server
// Description: JSON-RPC 2.0 server over framed stdio and HTTP transports.
// Purpose: Expose the capability dispatcher to MCP clients.
// Dependencies: crate::{config, dispatch, telemetry}, axum, tokio
// ============================================================================

//! ## Overview
//! The server decodes JSON-RPC 2.0 requests from either a Content-Length
//! framed stdio stream or an HTTP POST endpoint, routes them through the
//! shared [`Dispatcher`], and encodes structured results or errors back.
//! Inputs are untrusted: body size limits apply before parsing, and raw
//! provider error text is never forwarded to clients.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;
use std::io::Write;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::post;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use trendlens_core::CapabilityError;

use crate::catalog::PromptDefinition;
use crate::catalog::ResourceDefinition;
use crate::catalog::ToolDefinition;
use crate::config::ServerTransport;
use crate::config::TrendlensConfig;
use crate::dispatch::DispatchError;
use crate::dispatch::Dispatcher;
use crate::telemetry::McpMethod;
use crate::telemetry::McpMetricEvent;
use crate::telemetry::McpMetrics;
use crate::telemetry::McpOutcome;
use crate::telemetry::NoopMetrics;

// ============================================================================
// SECTION: MCP Server
// ============================================================================

/// MCP server instance.
pub struct McpServer {
    /// Server configuration.
    config: TrendlensConfig,
    /// Capability dispatcher.
    dispatcher: Dispatcher,
    /// Metrics sink for requests and latencies.
    metrics: Arc<dyn McpMetrics>,
}

impl McpServer {
    /// Builds a new MCP server from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError`] when initialization fails.
    pub fn from_config(config: TrendlensConfig) -> Result<Self, McpServerError> {
        config.validate().map_err(|err| McpServerError::Config(err.to_string()))?;
        let dispatcher =
            Dispatcher::from_config(&config).map_err(|err| McpServerError::Init(err.to_string()))?;
        Ok(Self::new(config, dispatcher))
    }

    /// Builds a server around an existing dispatcher.
    #[must_use]
    pub fn new(config: TrendlensConfig, dispatcher: Dispatcher) -> Self {
        Self {
            config,
            dispatcher,
            metrics: Arc::new(NoopMetrics),
        }
    }

    /// Replaces the metrics sink.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn McpMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Serves requests using the configured transport.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError`] when the server fails.
    pub async fn serve(self) -> Result<(), McpServerError> {
        let transport = self.config.server.transport;
        let state = Arc::new(ServerState {
            dispatcher: self.dispatcher,
            metrics: self.metrics,
            transport,
            max_body_bytes: self.config.server.max_body_bytes,
        });
        match transport {
            ServerTransport::Stdio => serve_stdio(&state),
            ServerTransport::Http => serve_http(&self.config, state).await,
        }
    }
}

/// Shared state for request handling across transports.
struct ServerState {
    /// Capability dispatcher.
    dispatcher: Dispatcher,
    /// Metrics sink for requests and latencies.
    metrics: Arc<dyn McpMetrics>,
    /// Transport label for metric events.
    transport: ServerTransport,
    /// Maximum allowed request body size.
    max_body_bytes: usize,
}

// ============================================================================
// SECTION: Stdio Transport
// ============================================================================

/// Serves JSON-RPC requests over stdin/stdout until the stream closes.
fn serve_stdio(state: &ServerState) -> Result<(), McpServerError> {
    let mut reader = BufReader::new(std::io::stdin());
    let mut writer = std::io::stdout();
    loop {
        let Some(bytes) = read_framed(&mut reader, state.max_body_bytes)? else {
            return Ok(());
        };
        let response = dispatch_blocking(state, &bytes)?;
        let payload = serde_json::to_vec(&response.1)
            .map_err(|_| McpServerError::Transport("json-rpc serialization failed".to_string()))?;
        write_framed(&mut writer, &payload)?;
    }
}

/// Runs async dispatch from the blocking stdio loop.
fn dispatch_blocking(
    state: &ServerState,
    bytes: &[u8],
) -> Result<(StatusCode, JsonRpcResponse), McpServerError> {
    let handle = tokio::runtime::Handle::try_current()
        .map_err(|_| McpServerError::Transport("stdio transport requires a runtime".to_string()))?;
    Ok(tokio::task::block_in_place(|| handle.block_on(parse_and_handle(state, bytes))))
}

// ============================================================================
// SECTION: HTTP Transport
// ============================================================================

/// Serves JSON-RPC requests over HTTP.
async fn serve_http(config: &TrendlensConfig, state: Arc<ServerState>) -> Result<(), McpServerError> {
    let bind = config
        .server
        .bind
        .as_ref()
        .ok_or_else(|| McpServerError::Config("bind address required".to_string()))?;
    let addr: SocketAddr =
        bind.parse().map_err(|_| McpServerError::Config("invalid bind address".to_string()))?;
    let app = Router::new().route("/rpc", post(handle_http)).with_state(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|_| McpServerError::Transport("http bind failed".to_string()))?;
    axum::serve(listener, app.into_make_service())
        .await
        .map_err(|_| McpServerError::Transport("http server failed".to_string()))
}

/// Handles HTTP JSON-RPC requests.
async fn handle_http(State(state): State<Arc<ServerState>>, bytes: Bytes) -> impl IntoResponse {
    let response = parse_and_handle(&state, bytes.as_ref()).await;
    (response.0, axum::Json(response.1))
}

// ============================================================================
// SECTION: JSON-RPC Envelope
// ============================================================================

/// Incoming JSON-RPC request payload.
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    /// JSON-RPC protocol version.
    jsonrpc: String,
    /// Request identifier.
    id: Value,
    /// Method name.
    method: String,
    /// Optional parameters payload.
    params: Option<Value>,
}

/// JSON-RPC response envelope.
#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    /// JSON-RPC protocol version.
    jsonrpc: &'static str,
    /// Request identifier.
    id: Value,
    /// Successful result payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    /// Error payload when the request fails.
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

/// JSON-RPC error payload.
#[derive(Debug, Serialize)]
struct JsonRpcError {
    /// Error code.
    code: i64,
    /// Human-readable error message.
    message: String,
}

/// Tool call parameters.
#[derive(Debug, Deserialize)]
struct ToolCallParams {
    /// Tool name.
    name: String,
    /// Raw JSON arguments.
    #[serde(default)]
    arguments: Value,
}

/// Resource read parameters.
#[derive(Debug, Deserialize)]
struct ResourceReadParams {
    /// Resource URI to resolve.
    uri: String,
}

/// Prompt fetch parameters.
#[derive(Debug, Deserialize)]
struct PromptGetParams {
    /// Prompt name.
    name: String,
    /// Raw JSON arguments.
    #[serde(default)]
    arguments: Value,
}

/// Tool list response payload.
#[derive(Debug, Serialize)]
struct ToolListResult {
    /// Registered tool definitions.
    tools: Vec<ToolDefinition>,
}

/// Resource list response payload.
#[derive(Debug, Serialize)]
struct ResourceListResult {
    /// Registered resource template definitions.
    resources: Vec<ResourceDefinition>,
}

/// Prompt list response payload.
#[derive(Debug, Serialize)]
struct PromptListResult {
    /// Registered prompt definitions.
    prompts: Vec<PromptDefinition>,
}

/// Tool call response payload.
#[derive(Debug, Serialize)]
struct ToolCallResult {
    /// Tool output content.
    content: Vec<ToolContent>,
}

/// Tool output payloads.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ToolContent {
    /// JSON tool output.
    Json {
        /// JSON payload.
        json: Value,
    },
}

/// Resource read response payload.
#[derive(Debug, Serialize)]
struct ResourceReadResult {
    /// Resolved resource contents.
    contents: Vec<ResourceContents>,
}

/// One resolved resource body.
#[derive(Debug, Serialize)]
struct ResourceContents {
    /// URI the contents were resolved from.
    uri: String,
    /// Media type of the body.
    #[serde(rename = "mimeType")]
    mime_type: &'static str,
    /// Serialized resource body.
    text: String,
}

// ============================================================================
// SECTION: Request Handling
// ============================================================================

/// Parses a raw payload, dispatches it, and records metrics.
async fn parse_and_handle(state: &ServerState, bytes: &[u8]) -> (StatusCode, JsonRpcResponse) {
    let started = Instant::now();
    let (method, capability, response) = route_payload(state, bytes).await;
    let outcome = if response.1.error.is_some() { McpOutcome::Error } else { McpOutcome::Ok };
    let event = McpMetricEvent {
        transport: state.transport,
        method,
        capability,
        outcome,
        error_code: response.1.error.as_ref().map(|error| error.code),
    };
    state.metrics.record_request(event.clone());
    state.metrics.record_latency(event, started.elapsed());
    response
}

/// Validates the payload and routes it to the method handler.
async fn route_payload(
    state: &ServerState,
    bytes: &[u8],
) -> (McpMethod, Option<String>, (StatusCode, JsonRpcResponse)) {
    if bytes.len() > state.max_body_bytes {
        return (
            McpMethod::Invalid,
            None,
            (
                StatusCode::PAYLOAD_TOO_LARGE,
                error_response(Value::Null, -32070, "request body too large"),
            ),
        );
    }
    let Ok(request) = serde_json::from_slice::<JsonRpcRequest>(bytes) else {
        return (
            McpMethod::Invalid,
            None,
            (
                StatusCode::BAD_REQUEST,
                error_response(Value::Null, -32600, "invalid json-rpc request"),
            ),
        );
    };
    if request.jsonrpc != "2.0" {
        return (
            McpMethod::Invalid,
            None,
            (
                StatusCode::BAD_REQUEST,
                error_response(request.id, -32600, "invalid json-rpc version"),
            ),
        );
    }
    let method = method_label(&request.method);
    let (capability, response) = handle_request(state, request).await;
    (method, capability, response)
}

/// Dispatches one validated JSON-RPC request.
async fn handle_request(
    state: &ServerState,
    request: JsonRpcRequest,
) -> (Option<String>, (StatusCode, JsonRpcResponse)) {
    let id = request.id;
    let params = request.params.unwrap_or(Value::Null);
    match request.method.as_str() {
        "tools/list" => (
            None,
            ok_or_serialization(
                id,
                serde_json::to_value(ToolListResult {
                    tools: state.dispatcher.list_tools(),
                }),
            ),
        ),
        "tools/call" => match serde_json::from_value::<ToolCallParams>(params) {
            Ok(call) => {
                let name = call.name.clone();
                let outcome = state.dispatcher.call_tool(&call.name, &call.arguments).await;
                let response = match outcome {
                    Ok(result) => ok_or_serialization(
                        id,
                        serde_json::to_value(ToolCallResult {
                            content: vec![ToolContent::Json {
                                json: result,
                            }],
                        }),
                    ),
                    Err(err) => capability_error(id, &err),
                };
                (Some(name), response)
            }
            Err(_) => {
                (None, (StatusCode::BAD_REQUEST, error_response(id, -32602, "invalid tool params")))
            }
        },
        "resources/list" => (
            None,
            ok_or_serialization(
                id,
                serde_json::to_value(ResourceListResult {
                    resources: state.dispatcher.list_resources(),
                }),
            ),
        ),
        "resources/read" => match serde_json::from_value::<ResourceReadParams>(params) {
            Ok(read) => {
                let uri = read.uri.clone();
                let outcome = state.dispatcher.read_resource(&read.uri).await;
                let response = match outcome {
                    Ok(payload) => ok_or_serialization(
                        id,
                        serde_json::to_value(ResourceReadResult {
                            contents: vec![ResourceContents {
                                uri: read.uri,
                                mime_type: "application/json",
                                text: payload.to_string(),
                            }],
                        }),
                    ),
                    Err(err) => capability_error(id, &err),
                };
                (Some(uri), response)
            }
            Err(_) => (
                None,
                (StatusCode::BAD_REQUEST, error_response(id, -32602, "invalid resource params")),
            ),
        },
        "prompts/list" => (
            None,
            ok_or_serialization(
                id,
                serde_json::to_value(PromptListResult {
                    prompts: state.dispatcher.list_prompts(),
                }),
            ),
        ),
        "prompts/get" => match serde_json::from_value::<PromptGetParams>(params) {
            Ok(get) => {
                let name = get.name.clone();
                let response = match state.dispatcher.get_prompt(&get.name, &get.arguments) {
                    Ok(payload) => (
                        StatusCode::OK,
                        JsonRpcResponse {
                            jsonrpc: "2.0",
                            id,
                            result: Some(payload),
                            error: None,
                        },
                    ),
                    Err(err) => capability_error(id, &err),
                };
                (Some(name), response)
            }
            Err(_) => {
                (None, (StatusCode::BAD_REQUEST, error_response(id, -32602, "invalid prompt params")))
            }
        },
        _ => (None, (StatusCode::BAD_REQUEST, error_response(id, -32601, "method not found"))),
    }
}

/// Maps a JSON-RPC method name to its metric label.
fn method_label(method: &str) -> McpMethod {
    match method {
        "tools/list" => McpMethod::ToolsList,
        "tools/call" => McpMethod::ToolsCall,
        "resources/list" => McpMethod::ResourcesList,
        "resources/read" => McpMethod::ResourcesRead,
        "prompts/list" => McpMethod::PromptsList,
        "prompts/get" => McpMethod::PromptsGet,
        _ => McpMethod::Other,
    }
}

/// Wraps a serialized result or degrades to a serialization error.
fn ok_or_serialization(
    id: Value,
    serialized: Result<Value, serde_json::Error>,
) -> (StatusCode, JsonRpcResponse) {
    match serialized {
        Ok(value) => (
            StatusCode::OK,
            JsonRpcResponse {
                jsonrpc: "2.0",
                id,
                result: Some(value),
                error: None,
            },
        ),
        Err(_) => (StatusCode::OK, error_response(id, -32060, "serialization failed")),
    }
}

/// Builds a JSON-RPC error response for a capability failure.
fn capability_error(id: Value, error: &CapabilityError) -> (StatusCode, JsonRpcResponse) {
    let (status, code, message) = match error {
        CapabilityError::ValidationFailed(_) => {
            (StatusCode::BAD_REQUEST, -32602, error.to_string())
        }
        CapabilityError::NotFound(name) => (StatusCode::OK, -32004, format!("not found: {name}")),
        CapabilityError::SourceUnavailable {
            source_id,
            cause,
        } => (StatusCode::OK, -32020, format!("source {source_id} unavailable: {cause}")),
        CapabilityError::Internal(_) => (StatusCode::OK, -32050, "internal error".to_string()),
    };
    (status, error_response(id, code, &message))
}

/// Builds a JSON-RPC error response envelope.
fn error_response(id: Value, code: i64, message: &str) -> JsonRpcResponse {
    JsonRpcResponse {
        jsonrpc: "2.0",
        id,
        result: None,
        error: Some(JsonRpcError {
            code,
            message: message.to_string(),
        }),
    }
}

// ============================================================================
// SECTION: Framing Helpers
// ============================================================================

/// Reads a framed stdio payload using MCP Content-Length headers.
///
/// Returns `Ok(None)` on a clean end of stream before any header.
fn read_framed(
    reader: &mut BufReader<impl Read>,
    max_body_bytes: usize,
) -> Result<Option<Vec<u8>>, McpServerError> {
    let mut content_length: Option<usize> = None;
    let mut line = String::new();
    loop {
        line.clear();
        let bytes = reader
            .read_line(&mut line)
            .map_err(|_| McpServerError::Transport("stdio read failed".to_string()))?;
        if bytes == 0 {
            if content_length.is_none() {
                return Ok(None);
            }
            return Err(McpServerError::Transport("stdio closed mid-frame".to_string()));
        }
        if line.trim().is_empty() {
            if content_length.is_some() {
                break;
            }
            continue;
        }
        if let Some(value) = line.strip_prefix("Content-Length:") {
            let parsed = value
                .trim()
                .parse::<usize>()
                .map_err(|_| McpServerError::Transport("invalid content length".to_string()))?;
            content_length = Some(parsed);
        }
    }
    let len = content_length
        .ok_or_else(|| McpServerError::Transport("missing content length".to_string()))?;
    if len > max_body_bytes {
        return Err(McpServerError::Transport("payload too large".to_string()));
    }
    let mut buf = vec![0u8; len];
    reader
        .read_exact(&mut buf)
        .map_err(|_| McpServerError::Transport("stdio read failed".to_string()))?;
    Ok(Some(buf))
}

/// Writes a framed stdio payload using MCP Content-Length headers.
fn write_framed(writer: &mut impl Write, payload: &[u8]) -> Result<(), McpServerError> {
    let header = format!("Content-Length: {}\r\n\r\n", payload.len());
    writer
        .write_all(header.as_bytes())
        .map_err(|_| McpServerError::Transport("stdio write failed".to_string()))?;
    writer
        .write_all(payload)
        .map_err(|_| McpServerError::Transport("stdio write failed".to_string()))?;
    writer.flush().map_err(|_| McpServerError::Transport("stdio write failed".to_string()))
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// MCP server errors.
#[derive(Debug, thiserror::Error)]
pub enum McpServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<DispatchError> for McpServerError {
    fn from(error: DispatchError) -> Self {
        Self::Init(error.to_string())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
