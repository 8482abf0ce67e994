//! Gateway WebSocket protocol: JSON messages between the chat page and the server

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Client → Gateway request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayRequest {
    pub method: String,
    #[serde(default)]
    pub params: Value,
    /// Optional request ID for correlating responses
    #[serde(default)]
    pub id: Option<String>,
}

/// Gateway → Client response (to a specific request)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayResponse {
    /// Echoed from the request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<GatewayError>,
}

/// Error in a gateway response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayError {
    pub code: i32,
    pub message: String,
}

/// Gateway → Client event (no request ID)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayEvent {
    pub event: String,
    pub data: Value,
}

/// Anything written back to a single connection
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Outbound {
    Response(GatewayResponse),
    Event(GatewayEvent),
}

// ── Well-known methods ──

/// Methods the client can call
pub mod methods {
    pub const AGENT_LIST: &str = "agent.list";
    pub const MESSAGE_SEND: &str = "message.send";
    pub const TRANSCRIPT_GET: &str = "transcript.get";
    pub const STATUS_GET: &str = "status.get";
}

/// Events the server pushes
pub mod events {
    pub const MESSAGE_RECEIVED: &str = "message.received";
    pub const TYPING_START: &str = "typing.start";
    pub const TYPING_STOP: &str = "typing.stop";
}

// ── Error codes ──

pub const ERR_INVALID_METHOD: i32 = -32601;
pub const ERR_INVALID_PARAMS: i32 = -32602;
pub const ERR_INTERNAL: i32 = -32603;

impl GatewayResponse {
    pub fn ok(id: Option<String>, result: Value) -> Self {
        Self {
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn err(id: Option<String>, code: i32, message: impl Into<String>) -> Self {
        Self {
            id,
            result: None,
            error: Some(GatewayError {
                code,
                message: message.into(),
            }),
        }
    }
}

impl GatewayEvent {
    pub fn new(event: impl Into<String>, data: Value) -> Self {
        Self {
            event: event.into(),
            data,
        }
    }
}

impl From<GatewayResponse> for Outbound {
    fn from(response: GatewayResponse) -> Self {
        Self::Response(response)
    }
}

impl From<GatewayEvent> for Outbound {
    fn from(event: GatewayEvent) -> Self {
        Self::Event(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_send_request() {
        let json = r#"{"method":"message.send","params":{"message":"hello","agent":"architect"}}"#;
        let req: GatewayRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.method, methods::MESSAGE_SEND);
        assert_eq!(req.params["agent"], "architect");
        assert!(req.id.is_none());
    }

    #[test]
    fn test_transcript_get_request_with_agent_filter() {
        let json = r#"{"method":"transcript.get","params":{"agent":"monitor"},"id":"t-1"}"#;
        let req: GatewayRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.method, methods::TRANSCRIPT_GET);
        assert_eq!(req.params["agent"], "monitor");
        assert_eq!(req.id.as_deref(), Some("t-1"));
    }

    #[test]
    fn test_agent_list_request_without_params() {
        let req: GatewayRequest = serde_json::from_str(r#"{"method":"agent.list"}"#).unwrap();
        assert_eq!(req.method, methods::AGENT_LIST);
        assert!(req.params.is_null());
    }

    #[test]
    fn test_method_and_event_names() {
        assert_eq!(methods::AGENT_LIST, "agent.list");
        assert_eq!(methods::TRANSCRIPT_GET, "transcript.get");
        assert_eq!(methods::STATUS_GET, "status.get");
        assert_eq!(events::MESSAGE_RECEIVED, "message.received");
        assert_eq!(events::TYPING_STOP, "typing.stop");
    }

    #[test]
    fn test_invalid_params_response_shape() {
        let resp = GatewayResponse::err(
            Some("m-2".to_string()),
            ERR_INVALID_PARAMS,
            "Message cannot be empty",
        );
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(
            json,
            json!({
                "id": "m-2",
                "error": { "code": -32602, "message": "Message cannot be empty" }
            })
        );
    }

    #[test]
    fn test_ok_response_omits_error_and_missing_id() {
        let resp = GatewayResponse::ok(None, json!({ "entries": [] }));
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json, json!({ "result": { "entries": [] } }));
    }

    #[test]
    fn test_outbound_untagged() {
        let evt: Outbound = GatewayEvent::new(events::TYPING_START, json!({"agent": "tester"})).into();
        let json = serde_json::to_value(&evt).unwrap();
        assert_eq!(json["event"], "typing.start");
        assert_eq!(json["data"]["agent"], "tester");

        let resp: Outbound = GatewayResponse::ok(None, json!(1)).into();
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["result"], 1);
        assert!(json.get("event").is_none());
    }
}
