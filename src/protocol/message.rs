//! JSON-RPC envelope decoding
//!
//! A message is decoded in two steps: the raw text becomes a generic JSON
//! value (failure is a parse error), then the value is decoded into a
//! [`JsonRpcRequest`] and its params into a typed [`ParsedMessage`].

use {
    crate::error::{McpError, McpResult},
    serde::{Deserialize, Serialize},
    serde_json::Value,
};

/// A decoded request or notification envelope.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    /// Absent (or `null`) for notifications
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// Request with its params decoded for the method it names.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedMessage {
    Initialize(InitializeParams),
    Initialized,
    Ping,
    ToolsList,
    ToolsCall(ToolCallParams),
}

/// Initialize method parameters
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    #[serde(default)]
    pub protocol_version: Option<String>,
    #[serde(default)]
    pub capabilities: Option<Value>,
    #[serde(default)]
    pub client_info: Option<Value>,
}

/// Tool call parameters
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ToolCallParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Option<Value>,
}

/// Parse raw message text into a JSON value.
pub fn parse_envelope(text: &str) -> McpResult<Value> {
    Ok(serde_json::from_str(text)?)
}

impl JsonRpcRequest {
    /// Decode the envelope structure of an already parsed message.
    pub fn from_value(message: Value) -> McpResult<Self> {
        if !message.is_object() {
            return Err(McpError::InvalidRequest(
                "message must be a JSON object".to_string(),
            ));
        }
        let mut request: Self = serde_json::from_value(message)
            .map_err(|e| McpError::InvalidRequest(e.to_string()))?;

        if request.jsonrpc != "2.0" {
            return Err(McpError::InvalidRequest(format!(
                "Invalid jsonrpc version: {}",
                request.jsonrpc
            )));
        }
        if request.method.is_empty() {
            return Err(McpError::InvalidRequest("Empty method name".to_string()));
        }
        if request.id.as_ref().is_some_and(Value::is_null) {
            request.id = None;
        }
        Ok(request)
    }

    /// Whether the sender expects no response.
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }

    /// Decode params for the named method.
    pub fn parse_params(&self) -> McpResult<ParsedMessage> {
        match self.method.as_str() {
            "initialize" => {
                let params = match &self.params {
                    Some(params) if !params.is_null() => {
                        serde_json::from_value(params.clone()).map_err(|e| {
                            McpError::InvalidParams(format!("Invalid initialize params: {e}"))
                        })?
                    }
                    _ => InitializeParams::default(),
                };
                Ok(ParsedMessage::Initialize(params))
            }
            "notifications/initialized" => Ok(ParsedMessage::Initialized),
            "ping" => Ok(ParsedMessage::Ping),
            "tools/list" => Ok(ParsedMessage::ToolsList),
            "tools/call" => {
                let params = self.params.clone().ok_or_else(|| {
                    McpError::InvalidParams("Missing params for tools/call".to_string())
                })?;
                let mut parsed: ToolCallParams = serde_json::from_value(params).map_err(|e| {
                    McpError::InvalidParams(format!("Invalid tools/call params: {e}"))
                })?;
                match &parsed.arguments {
                    None | Some(Value::Null) => {
                        parsed.arguments = Some(Value::Object(Default::default()))
                    }
                    Some(Value::Object(_)) => {}
                    Some(_) => {
                        return Err(McpError::InvalidParams(
                            "Arguments must be an object".to_string(),
                        ))
                    }
                }
                Ok(ParsedMessage::ToolsCall(parsed))
            }
            method => Err(McpError::UnknownMethod(method.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(text: &str) -> McpResult<JsonRpcRequest> {
        JsonRpcRequest::from_value(parse_envelope(text)?)
    }

    #[test]
    fn test_request_decoding() {
        let request =
            decode(r#"{"jsonrpc":"2.0","id":1,"method":"ping","params":{"foo":"bar"}}"#).unwrap();

        assert_eq!(request.method, "ping");
        assert_eq!(request.id, Some(json!(1)));
        assert!(!request.is_notification());
        assert_eq!(request.parse_params().unwrap(), ParsedMessage::Ping);
    }

    #[test]
    fn test_missing_and_null_id_are_notifications() {
        let absent = decode(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#).unwrap();
        let null =
            decode(r#"{"jsonrpc":"2.0","id":null,"method":"notifications/initialized"}"#).unwrap();
        assert!(absent.is_notification());
        assert!(null.is_notification());
    }

    #[test]
    fn test_initialize_parsing() {
        let request = decode(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","capabilities":{},"clientInfo":{"name":"test"}}}"#,
        )
        .unwrap();

        match request.parse_params().unwrap() {
            ParsedMessage::Initialize(params) => {
                assert_eq!(params.protocol_version.as_deref(), Some("2024-11-05"));
                assert!(params.client_info.is_some());
            }
            other => panic!("Expected Initialize message, got {other:?}"),
        }
    }

    #[test]
    fn test_tools_call_parsing() {
        let request = decode(
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"discover_interfaces","arguments":{"project_path":"."}}}"#,
        )
        .unwrap();

        match request.parse_params().unwrap() {
            ParsedMessage::ToolsCall(params) => {
                assert_eq!(params.name, "discover_interfaces");
                assert_eq!(params.arguments.unwrap()["project_path"], ".");
            }
            other => panic!("Expected ToolsCall message, got {other:?}"),
        }
    }

    #[test]
    fn test_tools_call_defaults_arguments() {
        let request =
            decode(r#"{"jsonrpc":"2.0","id":2,"method":"tools/call","params":{"name":"x"}}"#)
                .unwrap();
        match request.parse_params().unwrap() {
            ParsedMessage::ToolsCall(params) => assert_eq!(params.arguments, Some(json!({}))),
            other => panic!("Expected ToolsCall message, got {other:?}"),
        }
    }

    #[test]
    fn test_tools_call_rejects_bad_params() {
        let missing = decode(r#"{"jsonrpc":"2.0","id":3,"method":"tools/call"}"#).unwrap();
        assert!(matches!(missing.parse_params(), Err(McpError::InvalidParams(_))));

        let no_name =
            decode(r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"arguments":{}}}"#)
                .unwrap();
        assert!(matches!(no_name.parse_params(), Err(McpError::InvalidParams(_))));

        let array_args = decode(
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"x","arguments":[1]}}"#,
        )
        .unwrap();
        assert!(matches!(array_args.parse_params(), Err(McpError::InvalidParams(_))));
    }

    #[test]
    fn test_envelope_errors() {
        assert!(matches!(decode("{not json"), Err(McpError::Parse(_))));
        assert!(matches!(
            decode(r#"{"jsonrpc":"1.0","id":1,"method":"ping"}"#),
            Err(McpError::InvalidRequest(_))
        ));
        assert!(matches!(decode(r#"{"jsonrpc":"2.0","id":1}"#), Err(McpError::InvalidRequest(_))));
        assert!(matches!(decode("[1,2,3]"), Err(McpError::InvalidRequest(_))));
    }

    #[test]
    fn test_unknown_method() {
        let request = decode(r#"{"jsonrpc":"2.0","id":4,"method":"resources/list"}"#).unwrap();
        assert!(matches!(request.parse_params(), Err(McpError::UnknownMethod(m)) if m == "resources/list"));
    }
}
