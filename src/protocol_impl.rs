//! MCP Protocol Implementation
//!
//! Stateless dispatcher routing requests to the bootstrap methods and the
//! tool catalog.

use {
    super::generator::MockGenerator,
    super::logging::{
        log_handler_error, log_handler_success, log_message_parsed, log_tool_call,
        log_unknown_method, request_span,
    },
    super::protocol::{JsonRpcRequest, McpProtocol, ParsedMessage},
    super::protocol_testable::McpProtocolHandler,
    super::tools::McpTools,
    crate::error::{McpError, McpResult},
    serde_json::{json, Value},
    std::sync::Arc,
    std::time::Instant,
    tracing::{debug, info, warn, Instrument},
};

pub struct McpProtocolHandlerImpl {
    protocol: McpProtocol,
    tools: McpTools,
}

impl McpProtocolHandlerImpl {
    pub fn new(tools: McpTools) -> Self {
        Self {
            protocol: McpProtocol::new(),
            tools,
        }
    }

    pub fn with_generator(generator: Arc<dyn MockGenerator>) -> Self {
        Self::new(McpTools::new(generator))
    }

    /// Route one decoded request to its handler.
    pub async fn dispatch(&self, request: &JsonRpcRequest) -> McpResult<Value> {
        let parsed = match request.parse_params() {
            Ok(parsed) => parsed,
            Err(McpError::UnknownMethod(method)) => {
                log_unknown_method(&method);
                return Err(McpError::UnknownMethod(method));
            }
            Err(e) => return Err(e),
        };

        match parsed {
            ParsedMessage::Initialize(params) => {
                info!(
                    client_version = ?params.protocol_version,
                    client_info = ?params.client_info,
                    "MCP client initializing"
                );
                Ok(self
                    .protocol
                    .create_initialize_response(params.protocol_version.as_deref()))
            }
            ParsedMessage::Initialized => {
                info!("MCP client sent initialized notification");
                Ok(json!({ "status": "initialized" }))
            }
            ParsedMessage::Ping => Ok(json!({ "status": "pong" })),
            ParsedMessage::ToolsList => Ok(self.tools.get_tools_list()),
            ParsedMessage::ToolsCall(params) => {
                let arguments = params.arguments.unwrap_or_else(|| json!({}));
                log_tool_call(&params.name, &arguments);
                let response = self.tools.execute_tool(&params.name, arguments).await?;
                serde_json::to_value(response)
                    .map_err(|e| McpError::Internal(format!("failed to encode tool result: {e}")))
            }
        }
    }
}

#[async_trait::async_trait]
impl McpProtocolHandler for McpProtocolHandlerImpl {
    async fn handle_message(&self, message: Value) -> Option<Value> {
        let raw_id = message.get("id").filter(|id| !id.is_null()).cloned();

        let request = match JsonRpcRequest::from_value(message) {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, id = ?raw_id, "Rejected malformed request");
                return raw_id.map(|id| e.to_json_rpc_error(Some(id)));
            }
        };
        log_message_parsed(&request.method, request.id.as_ref());

        let span = request_span(&request.method, request.id.as_ref());
        let start = Instant::now();
        let result = self.dispatch(&request).instrument(span).await;

        match (request.id, result) {
            (Some(id), Ok(result)) => {
                log_handler_success(&request.method, start.elapsed());
                Some(self.protocol.create_success_response(id, result))
            }
            (Some(id), Err(e)) => {
                log_handler_error(&request.method, &e.to_string(), start.elapsed());
                Some(e.to_json_rpc_error(Some(id)))
            }
            (None, Ok(_)) => {
                debug!(method = %request.method, "Notification handled");
                None
            }
            (None, Err(e)) => {
                log_handler_error(&request.method, &e.to_string(), start.elapsed());
                None
            }
        }
    }

    fn protocol_version(&self) -> &str {
        self.protocol.version()
    }
}
