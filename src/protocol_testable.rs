//! MCP Protocol Trait
//!
//! The seam between the transports and the dispatcher, so transports can be
//! exercised against a stub handler.

use serde_json::Value;

/// Trait for MCP protocol handling
#[async_trait::async_trait]
pub trait McpProtocolHandler: Send + Sync {
    /// Handle one parsed JSON message.
    ///
    /// Returns the response envelope, or `None` when the message was a
    /// notification (or undecodable without an id) and nothing must be sent.
    async fn handle_message(&self, message: Value) -> Option<Value>;

    /// Protocol version answered when the client does not ask for one
    fn protocol_version(&self) -> &str;
}
