//! MCP wire protocol types
//!
//! Based on the Model Context Protocol specification (JSON-RPC 2.0), one
//! message per line.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Protocol version announced in the initialize handshake
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// JSON-RPC request to an MCP server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpRequest {
    pub jsonrpc: String,
    pub id: u64,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

impl McpRequest {
    /// Create a new MCP request
    pub fn new(id: u64, method: impl Into<String>, params: Value) -> Self {
        McpRequest {
            jsonrpc: "2.0".to_string(),
            id,
            method: method.into(),
            params,
        }
    }

    /// Create an initialize request
    pub fn initialize(id: u64, client_name: &str, client_version: &str) -> Self {
        Self::new(id, "initialize", serde_json::json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "clientInfo": {
                "name": client_name,
                "version": client_version
            }
        }))
    }

    /// Create a tools/list request
    pub fn list_tools(id: u64) -> Self {
        Self::new(id, "tools/list", Value::Object(Map::new()))
    }

    /// Create a tools/call request
    pub fn call_tool(id: u64, call: &ToolCall) -> Self {
        Self::new(id, "tools/call", serde_json::json!({
            "name": call.name,
            "arguments": call.arguments
        }))
    }
}

/// JSON-RPC response from an MCP server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpResponse {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<Value>,
    /// Set on notifications and server-initiated requests, never on responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<McpError>,
}

impl McpResponse {
    /// Whether this response may answer the request with the given id.
    ///
    /// A null or missing id is accepted: with one request in flight per
    /// transport it can only refer to the outstanding request.
    pub fn answers(&self, id: u64) -> bool {
        match &self.id {
            None | Some(Value::Null) => true,
            Some(Value::Number(n)) => n.as_u64() == Some(id),
            Some(Value::String(s)) => s.parse::<u64>().ok() == Some(id),
            Some(_) => false,
        }
    }
}

/// MCP error descriptor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpError {
    #[serde(default)]
    pub code: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Tool definition from an MCP server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpTool {
    /// Tool name
    pub name: String,
    /// Tool description
    #[serde(default)]
    pub description: String,
    /// Input schema (JSON Schema), passed through untouched
    #[serde(rename = "inputSchema", default)]
    pub input_schema: Value,
}

/// Payload of a tools/list response
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ListToolsResult {
    #[serde(default)]
    pub tools: Vec<McpTool>,
}

/// A tool invocation: tool name plus named arguments
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl ToolCall {
    pub fn new(name: impl Into<String>) -> Self {
        ToolCall {
            name: name.into(),
            arguments: Map::new(),
        }
    }

    /// Add one argument
    pub fn arg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.arguments.insert(key.into(), value.into());
        self
    }
}

/// One piece of a tool result.
///
/// `Text` carries a string; `Binary` carries a mime type with an opaque
/// payload (typically base64); anything else is kept verbatim as `Data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawContent", into = "RawContent")]
pub enum McpContent {
    Text(String),
    Binary {
        kind: String,
        mime_type: String,
        data: Value,
    },
    Data(Value),
}

impl McpContent {
    pub fn text(text: impl Into<String>) -> Self {
        McpContent::Text(text.into())
    }

    /// Text payload, if this is a text chunk
    pub fn as_text(&self) -> Option<&str> {
        match self {
            McpContent::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Wire shape of a content block
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RawContent {
    #[serde(rename = "type", default)]
    content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "mimeType", default, skip_serializing_if = "Option::is_none")]
    mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

impl From<RawContent> for McpContent {
    fn from(raw: RawContent) -> Self {
        let RawContent { content_type, text, mime_type, data, rest } = raw;
        if content_type == "text" {
            return McpContent::Text(text.unwrap_or_default());
        }

        match (mime_type, data) {
            (Some(mime_type), Some(data)) => McpContent::Binary {
                kind: content_type,
                mime_type,
                data,
            },
            (mime_type, data) => {
                let mut object = rest;
                object.insert("type".to_string(), Value::String(content_type));
                if let Some(text) = text {
                    object.insert("text".to_string(), Value::String(text));
                }
                if let Some(mime_type) = mime_type {
                    object.insert("mimeType".to_string(), Value::String(mime_type));
                }
                if let Some(data) = data {
                    object.insert("data".to_string(), data);
                }
                McpContent::Data(Value::Object(object))
            }
        }
    }
}

impl From<McpContent> for RawContent {
    fn from(content: McpContent) -> Self {
        match content {
            McpContent::Text(text) => RawContent {
                content_type: "text".to_string(),
                text: Some(text),
                ..RawContent::default()
            },
            McpContent::Binary { kind, mime_type, data } => RawContent {
                content_type: kind,
                mime_type: Some(mime_type),
                data: Some(data),
                ..RawContent::default()
            },
            McpContent::Data(value) => {
                let mut rest = match value {
                    Value::Object(map) => map,
                    other => {
                        let mut map = Map::new();
                        map.insert("data".to_string(), other);
                        map
                    }
                };
                let content_type = rest
                    .remove("type")
                    .and_then(|t| t.as_str().map(str::to_string))
                    .unwrap_or_else(|| "resource".to_string());
                RawContent {
                    content_type,
                    rest,
                    ..RawContent::default()
                }
            }
        }
    }
}

/// Result of a tools/call response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpToolResult {
    #[serde(default)]
    pub content: Vec<McpContent>,
    #[serde(rename = "isError", default)]
    pub is_error: bool,
}

impl McpToolResult {
    /// Failed result carrying a server-reported message
    pub fn error(message: &str) -> Self {
        McpToolResult {
            content: vec![McpContent::text(format!("Error: {}", message))],
            is_error: true,
        }
    }

    /// Text chunks joined with newlines, in order
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(McpContent::as_text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let req = McpRequest::list_tools(7);
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"jsonrpc\":\"2.0\""));
        assert!(json.contains("\"id\":7"));
        assert!(json.contains("\"params\":{}"));
        assert!(!json.contains('\n'));
    }

    #[test]
    fn test_initialize_params() {
        let req = McpRequest::initialize(1, "skillbridge", "0.1.0");
        assert_eq!(req.method, "initialize");
        assert_eq!(req.params["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(req.params["clientInfo"]["name"], "skillbridge");
        assert!(req.params["capabilities"].is_object());
    }

    #[test]
    fn test_call_tool_params() {
        let call = ToolCall::new("query_osquery").arg("sql", "SELECT 1");
        let req = McpRequest::call_tool(3, &call);
        assert_eq!(req.params["name"], "query_osquery");
        assert_eq!(req.params["arguments"]["sql"], "SELECT 1");
    }

    #[test]
    fn test_response_id_matching() {
        let resp: McpResponse =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":4,"result":{}}"#).unwrap();
        assert!(resp.answers(4));
        assert!(!resp.answers(5));

        let resp: McpResponse =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":"4","result":{}}"#).unwrap();
        assert!(resp.answers(4));

        let resp: McpResponse = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":null,"error":{"code":-32700,"message":"Parse error"}}"#,
        )
        .unwrap();
        assert!(resp.answers(9));
        assert!(resp.method.is_none());
        assert_eq!(resp.error.unwrap().code, -32700);
    }

    #[test]
    fn test_notification_is_not_a_reply() {
        let msg: McpResponse = serde_json::from_str(
            r#"{"jsonrpc":"2.0","method":"notifications/message","params":{"level":"info"}}"#,
        )
        .unwrap();
        assert!(msg.id.is_none());
        assert_eq!(msg.method.as_deref(), Some("notifications/message"));
    }

    #[test]
    fn test_error_without_code() {
        let resp: McpResponse =
            serde_json::from_str(r#"{"jsonrpc":"2.0","id":1,"error":{"message":"nope"}}"#)
                .unwrap();
        let err = resp.error.unwrap();
        assert_eq!(err.code, 0);
        assert_eq!(err.message, "nope");
    }

    #[test]
    fn test_tool_definition_defaults() {
        let tool: McpTool = serde_json::from_str(r#"{"name": "query_osquery"}"#).unwrap();
        assert_eq!(tool.description, "");
        assert!(tool.input_schema.is_null());
    }

    #[test]
    fn test_content_chunks_keep_order_and_kind() {
        let result: McpToolResult = serde_json::from_str(
            r#"{"content":[
                {"type":"text","text":"first"},
                {"type":"image","data":"aGk=","mimeType":"image/png"},
                {"type":"resource","resource":{"uri":"file:///tmp/x"}},
                {"type":"text","text":"second"}
            ]}"#,
        )
        .unwrap();

        assert!(!result.is_error);
        assert_eq!(result.content.len(), 4);
        assert_eq!(result.content[0], McpContent::text("first"));
        match &result.content[1] {
            McpContent::Binary { kind, mime_type, data } => {
                assert_eq!(kind, "image");
                assert_eq!(mime_type, "image/png");
                assert_eq!(data, "aGk=");
            }
            other => panic!("expected binary chunk, got {:?}", other),
        }
        match &result.content[2] {
            McpContent::Data(value) => {
                assert_eq!(value["type"], "resource");
                assert_eq!(value["resource"]["uri"], "file:///tmp/x");
            }
            other => panic!("expected data chunk, got {:?}", other),
        }
        assert_eq!(result.text(), "first\nsecond");
    }

    #[test]
    fn test_binary_chunk_serializes_wire_shape() {
        let chunk = McpContent::Binary {
            kind: "image".to_string(),
            mime_type: "image/png".to_string(),
            data: Value::String("aGk=".to_string()),
        };
        let json = serde_json::to_value(&chunk).unwrap();
        assert_eq!(json["type"], "image");
        assert_eq!(json["mimeType"], "image/png");
        assert_eq!(json["data"], "aGk=");
    }

    #[test]
    fn test_error_result() {
        let result = McpToolResult::error("boom");
        assert!(result.is_error);
        assert_eq!(result.content, vec![McpContent::text("Error: boom")]);
        assert_eq!(result.text(), "Error: boom");
    }
}
