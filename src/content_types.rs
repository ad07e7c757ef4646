//! Typed tool results
//!
//! Every tool returns an [`McpResponse`]: a `content` array with the
//! human-readable summary that MCP clients display, plus an optional `data`
//! field carrying the same result in structured form.
//!
//! ```rust
//! use mockery_mcp::content_types::McpResponse;
//! use serde_json::json;
//!
//! let response = McpResponse::with_text_and_data(
//!     "Found 1 interfaces in /src/demo:",
//!     json!({"count": 1}),
//! );
//! assert_eq!(response.text_content(), "Found 1 interfaces in /src/demo:");
//! ```

use {
    serde::{Deserialize, Serialize},
    serde_json::Value,
};

/// One content item of a tool result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum McpContent {
    #[serde(rename = "text")]
    Text { text: String },
}

impl McpContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

/// Complete tool result as sent in `tools/call` responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpResponse {
    /// Content array for client display
    pub content: Vec<McpContent>,

    /// Structured result for programmatic access
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    #[serde(rename = "isError", default)]
    pub is_error: bool,
}

impl McpResponse {
    /// Create a simple text response
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![McpContent::text(text)],
            data: None,
            is_error: false,
        }
    }

    /// Create a text response with structured data
    pub fn with_text_and_data(text: impl Into<String>, data: Value) -> Self {
        Self::text(text).with_data(data)
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// All text content joined by newlines.
    pub fn text_content(&self) -> String {
        self.content
            .iter()
            .map(|item| match item {
                McpContent::Text { text } => text.as_str(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
