//! Telegram Bot API wire types.
//!
//! Only the slice of the Bot API this service touches: the response
//! envelope, inbound updates from `getUpdates`, and the `sendMessage`
//! request body. Field names already match the API's snake_case.

use serde::{Deserialize, Serialize};

/// Envelope every Bot API method responds with.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub result: Option<T>,
}

/// One inbound event from long polling.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Message {
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct SendMessageRequest<'a> {
    pub chat_id: i64,
    pub text: &'a str,
    pub parse_mode: &'a str,
}

#[derive(Debug, Serialize)]
pub struct GetUpdatesRequest {
    pub offset: i64,
    /// Long-poll hold time in seconds.
    pub timeout: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_updates_envelope() {
        let json = r#"{
            "ok": true,
            "result": [
                {
                    "update_id": 857,
                    "message": {
                        "message_id": 12,
                        "chat": {"id": 42, "type": "private"},
                        "text": "/status"
                    }
                },
                {
                    "update_id": 858,
                    "message": {
                        "message_id": 13,
                        "chat": {"id": 42, "type": "private"}
                    }
                }
            ]
        }"#;

        let response: ApiResponse<Vec<Update>> = serde_json::from_str(json).unwrap();
        assert!(response.ok);

        let updates = response.result.unwrap();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].update_id, 857);
        assert_eq!(updates[0].message.as_ref().unwrap().chat.id, 42);
        assert_eq!(
            updates[0].message.as_ref().unwrap().text.as_deref(),
            Some("/status")
        );
        assert!(updates[1].message.as_ref().unwrap().text.is_none());
    }

    #[test]
    fn test_deserialize_error_envelope() {
        let json = r#"{"ok": false, "error_code": 401, "description": "Unauthorized"}"#;

        let response: ApiResponse<Vec<Update>> = serde_json::from_str(json).unwrap();
        assert!(!response.ok);
        assert_eq!(response.description.as_deref(), Some("Unauthorized"));
        assert!(response.result.is_none());
    }

    #[test]
    fn test_serialize_send_message_request() {
        let request = SendMessageRequest {
            chat_id: 42,
            text: "ping",
            parse_mode: "Markdown",
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["chat_id"], 42);
        assert_eq!(json["text"], "ping");
        assert_eq!(json["parse_mode"], "Markdown");
    }
}
