//! Wire messages
//!
//! Everything the host and client exchange is one of these variants,
//! serialized as JSON with a `type` tag. Capability traffic is addressed
//! by channel name; root traffic uses [`ROOT_CHANNEL_NAME`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Channel name of the root bridge object.
pub const ROOT_CHANNEL_NAME: &str = "HostBridge";

/// Prefix for per-capability channel names, e.g. `HostApi_example`.
pub const CAPABILITY_CHANNEL_PREFIX: &str = "HostApi_";

/// Build the channel name for an exported capability.
pub fn capability_channel_name(export_name: &str) -> String {
    format!("{}{}", CAPABILITY_CHANNEL_PREFIX, export_name)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ChannelMessage {
    /// Client greeting that opens the handshake.
    Hello,

    /// Host reply carrying everything the client needs to build proxies.
    #[serde(rename_all = "camelCase")]
    Welcome {
        /// Channel names the host serves, root included.
        objects: Vec<String>,
        version: String,
        /// Schema document as JSON text, parsed lazily on the client.
        schema_json: String,
        valid_event_types: Vec<String>,
    },

    /// Method invocation on a named channel.
    #[serde(rename_all = "camelCase")]
    Call {
        object: String,
        method: String,
        args: Vec<Value>,
        /// Present when the caller expects a reply.
        call_id: Option<u64>,
    },

    /// Reply to a [`ChannelMessage::Call`] that carried a call id.
    #[serde(rename_all = "camelCase")]
    CallResult { call_id: u64, value: Value },

    /// Signal emission from a capability object.
    #[serde(rename_all = "camelCase")]
    Signal {
        object: String,
        signal: String,
        args: Vec<Value>,
    },

    /// Broadcast event from the host application layer.
    #[serde(rename_all = "camelCase")]
    Event { event_type: String, payload: Value },

    /// Host answer to an earlier input request, keyed by token.
    #[serde(rename_all = "camelCase")]
    InputProvided { token: String, value: Value },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_messages_tag_with_type() {
        let text = serde_json::to_string(&ChannelMessage::Hello).unwrap();
        assert_eq!(text, r#"{"type":"hello"}"#);

        let call = ChannelMessage::Call {
            object: "HostApi_example".to_string(),
            method: "echo".to_string(),
            args: vec![json!("ping")],
            call_id: Some(7),
        };
        let value: Value = serde_json::from_str(&serde_json::to_string(&call).unwrap()).unwrap();
        assert_eq!(value["type"], "call");
        assert_eq!(value["callId"], 7);
    }

    #[test]
    fn test_welcome_round_trips_camel_case() {
        let welcome = ChannelMessage::Welcome {
            objects: vec!["HostBridge".to_string(), "HostApi_example".to_string()],
            version: "0.1.0".to_string(),
            schema_json: "{}".to_string(),
            valid_event_types: vec!["actionOne".to_string()],
        };
        let text = serde_json::to_string(&welcome).unwrap();
        assert!(text.contains(r#""schemaJson""#));
        assert!(text.contains(r#""validEventTypes""#));
        let back: ChannelMessage = serde_json::from_str(&text).unwrap();
        assert_eq!(back, welcome);
    }

    #[test]
    fn test_capability_channel_name() {
        assert_eq!(capability_channel_name("example"), "HostApi_example");
    }
}
