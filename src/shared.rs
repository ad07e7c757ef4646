//! MCP Protocol Engine
//!
//! The framing-independent half of both transports: size check, envelope
//! parsing, dispatch and response encoding.

use {
    super::logging::log_message_received,
    super::protocol::parse_envelope,
    super::protocol_testable::McpProtocolHandler,
    crate::error::{McpError, McpResult},
    std::sync::Arc,
};

/// Largest accepted line or message unless configured otherwise.
pub const DEFAULT_MAX_MESSAGE_SIZE: usize = 2 * 1024 * 1024;

pub struct McpProtocolEngine {
    handler: Arc<dyn McpProtocolHandler>,
    max_message_size: usize,
}

impl McpProtocolEngine {
    pub fn new(handler: Arc<dyn McpProtocolHandler>) -> Self {
        Self::with_max_message_size(handler, DEFAULT_MAX_MESSAGE_SIZE)
    }

    pub fn with_max_message_size(handler: Arc<dyn McpProtocolHandler>, max_message_size: usize) -> Self {
        Self {
            handler,
            max_message_size,
        }
    }

    pub fn max_message_size(&self) -> usize {
        self.max_message_size
    }

    pub fn handler(&self) -> &Arc<dyn McpProtocolHandler> {
        &self.handler
    }

    /// Handle one framed message.
    ///
    /// `Ok(None)` means nothing is sent back. `Err` means the frame itself
    /// was unusable (oversized or not JSON); the transport decides what to do.
    pub async fn handle_text(&self, text: &str) -> McpResult<Option<String>> {
        log_message_received("text", text.len());
        if text.len() > self.max_message_size {
            return Err(McpError::MessageTooLarge(text.len(), self.max_message_size));
        }

        let message = parse_envelope(text)?;
        match self.handler.handle_message(message).await {
            Some(response) => serde_json::to_string(&response)
                .map(Some)
                .map_err(|e| McpError::Internal(format!("failed to encode response: {e}"))),
            None => Ok(None),
        }
    }
}
