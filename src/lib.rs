//! Mockery MCP Server Library
//!
//! A Model Context Protocol server that discovers Go interfaces with a
//! tree-sitter parser, maintains `.mockery.yaml` configurations and runs
//! `mockery` to generate mocks. Served over WebSocket or line-delimited
//! stdio.

pub mod config;
pub mod content_types;
pub mod core;
pub mod error;
pub mod generator;
pub mod health;
pub mod logging;
pub mod protocol;
pub mod protocol_impl;
pub mod protocol_testable;
pub mod scanner;
pub mod settings;
pub mod shared;
pub mod stdio;
pub mod tools;
pub mod types;
pub mod websocket;

// Test modules
#[cfg(test)]
pub mod tests;

// Re-export key types
pub use core::McpServer;
pub use error::{McpError, McpResult};
pub use generator::{MockGenerator, MockeryInvoker};
pub use protocol::McpProtocol;
pub use protocol_impl::McpProtocolHandlerImpl;
pub use protocol_testable::McpProtocolHandler;
pub use shared::McpProtocolEngine;
pub use tools::McpTools;
