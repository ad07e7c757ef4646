//! Structured Logging
//!
//! Tracing setup plus the event helpers used by the dispatcher and the
//! transports. All output goes to standard error; standard output belongs
//! to the stdio transport.

use {
    anyhow::{Context, Result},
    std::time::{Duration, Instant},
    tracing::{debug, error, info, span, trace, warn, Level, Span},
    tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter},
    uuid::Uuid,
};

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` takes precedence over `level`.
pub fn init_tracing(level: &str, format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(format!("mockery_mcp={level},warp=warn"))
            .with_context(|| format!("invalid log level '{level}'"))
    })?;

    match format {
        LogFormat::Json => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .with_current_span(true)
                .with_span_list(true);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()
                .context("failed to install tracing subscriber")?;
        }
        LogFormat::Text => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_level(true)
                .with_ansi(false);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()
                .context("failed to install tracing subscriber")?;
        }
    }

    debug!(?format, "Tracing initialized");
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct McpConnectionId(pub String);

impl McpConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for McpConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for McpConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Create a span for tracking a connection lifecycle
pub fn connection_span(connection_id: &McpConnectionId) -> Span {
    span!(
        Level::INFO,
        "mcp_connection",
        connection_id = %connection_id,
        start_time = ?Instant::now()
    )
}

/// Create a span for tracking a request
pub fn request_span(method: &str, id: Option<&serde_json::Value>) -> Span {
    span!(
        Level::INFO,
        "mcp_request",
        method = %method,
        request_id = ?id,
    )
}

/// Log connection events
pub fn log_connection_upgrade(connection_id: &McpConnectionId) {
    info!(
        connection_id = %connection_id,
        event = "websocket_upgrade",
        "WebSocket connection upgraded"
    );
}

pub fn log_connection_closed(connection_id: &McpConnectionId, duration: Duration) {
    info!(
        connection_id = %connection_id,
        event = "connection_closed",
        duration_ms = duration.as_millis(),
        "Connection closed"
    );
}

/// Log message events
pub fn log_message_received(message_type: &str, message_size: usize) {
    debug!(
        message_type = %message_type,
        message_size = message_size,
        event = "message_received",
        "Received message"
    );
}

pub fn log_message_parsed(method: &str, id: Option<&serde_json::Value>) {
    trace!(
        method = %method,
        message_id = ?id,
        event = "message_parsed",
        "Parsed message"
    );
}

pub fn log_handler_success(method: &str, duration: Duration) {
    info!(
        method = %method,
        duration_ms = duration.as_millis(),
        event = "handler_success",
        "Successfully handled method"
    );
}

pub fn log_handler_error(method: &str, error: &str, duration: Duration) {
    error!(
        method = %method,
        error = %error,
        duration_ms = duration.as_millis(),
        event = "handler_error",
        "Failed to handle method"
    );
}

/// Log response events
pub fn log_response_sent(response_size: usize) {
    debug!(
        response_size = response_size,
        event = "response_sent",
        "Sent response"
    );
}

pub fn log_response_error(error: &str) {
    error!(
        error = %error,
        event = "response_error",
        "Failed to send response"
    );
}

/// Log tool events
pub fn log_tool_call(tool: &str, args: &serde_json::Value) {
    info!(
        tool = %tool,
        args = ?args,
        event = "tool_call",
        "Tool call requested"
    );
}

/// Log error events with context
pub fn log_parse_error(error: &str, raw_message: &str) {
    error!(
        error = %error,
        raw_message = %raw_message,
        event = "parse_error",
        "Failed to parse message"
    );
}

pub fn log_unknown_method(method: &str) {
    warn!(
        method = %method,
        event = "unknown_method",
        "Unknown MCP method requested"
    );
}

/// Server lifecycle logging
pub fn log_server_ready(addr: &str) {
    info!(
        address = %addr,
        event = "server_ready",
        "MCP Server ready and listening"
    );
}

pub fn log_server_shutdown() {
    info!(event = "server_shutdown", "MCP Server shutting down");
}

/// Log the outcome of one tool execution.
#[macro_export]
macro_rules! log_tool_execution {
    ($tool_name:expr, $duration:expr, $result:expr) => {
        match $result {
            Ok(_) => tracing::info!(
                tool = $tool_name,
                duration_ms = $duration.as_millis(),
                event = "tool_execution_success",
                "Tool executed successfully"
            ),
            Err(e) => tracing::error!(
                tool = $tool_name,
                duration_ms = $duration.as_millis(),
                error = %e,
                event = "tool_execution_error",
                "Tool execution failed"
            ),
        }
    };
}
