//! MCP Protocol
//!
//! Protocol versioning, server identity and response envelopes.

pub mod message;

pub use message::{parse_envelope, InitializeParams, JsonRpcRequest, ParsedMessage, ToolCallParams};

// Re-export the main protocol struct
pub use self::protocol::McpProtocol;

/// Version answered when the client asks for one we do not know.
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

/// Versions echoed back verbatim during negotiation.
pub const SUPPORTED_PROTOCOL_VERSIONS: [&str; 3] = ["2024-11-05", "2025-03-26", "2025-06-18"];

/// Name reported in `serverInfo`.
pub const SERVER_NAME: &str = "mockery-mcp-server";

mod protocol {
    use {
        super::{DEFAULT_PROTOCOL_VERSION, SERVER_NAME, SUPPORTED_PROTOCOL_VERSIONS},
        serde_json::{json, Value},
    };

    pub struct McpProtocol {
        server_name: String,
        server_version: String,
    }

    impl McpProtocol {
        pub fn new() -> Self {
            Self {
                server_name: SERVER_NAME.to_string(),
                server_version: env!("CARGO_PKG_VERSION").to_string(),
            }
        }

        /// Default protocol version
        pub fn version(&self) -> &str {
            DEFAULT_PROTOCOL_VERSION
        }

        pub fn server_name(&self) -> &str {
            &self.server_name
        }

        pub fn server_version(&self) -> &str {
            &self.server_version
        }

        /// Pick the version to answer with: the client's when supported.
        pub fn negotiate_version<'a>(&self, requested: Option<&'a str>) -> &'a str {
            match requested {
                Some(version) if SUPPORTED_PROTOCOL_VERSIONS.contains(&version) => version,
                _ => DEFAULT_PROTOCOL_VERSION,
            }
        }

        /// Create initialization response
        pub fn create_initialize_response(&self, requested: Option<&str>) -> Value {
            json!({
                "protocolVersion": self.negotiate_version(requested),
                "capabilities": {
                    "tools": {
                        "listChanged": false
                    }
                },
                "serverInfo": {
                    "name": self.server_name,
                    "version": self.server_version
                }
            })
        }

        /// Create success response
        pub fn create_success_response(&self, id: Value, result: Value) -> Value {
            json!({
                "jsonrpc": "2.0",
                "id": id,
                "result": result
            })
        }
    }

    impl Default for McpProtocol {
        fn default() -> Self {
            Self::new()
        }
    }

}
