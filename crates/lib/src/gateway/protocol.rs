//! Gateway HTTP wire types (completion and image endpoints).

use crate::conversation::Message;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/chat`: the new message, recent history, optional system prompt override.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    pub message: String,
    /// Recent conversation history, oldest first.
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_prompt: Option<String>,
}

/// Success body of `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub response: String,
}

/// Error body returned with a non-2xx status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Body of `POST /api/image`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageRequest {
    pub query: String,
}

/// Success body of `POST /api/image`. Failures are plain text, not JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageResponse {
    pub image_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Sender;

    #[test]
    fn completion_request_from_ui_body() {
        let req: CompletionRequest = serde_json::from_str(
            r#"{"message":"How are you?","messages":[{"id":1,"text":"Hello!","sender":"user"}],"customPrompt":"Be brief."}"#,
        )
        .unwrap();
        assert_eq!(req.message, "How are you?");
        assert_eq!(req.messages.len(), 1);
        assert_eq!(req.messages[0].sender, Sender::User);
        assert_eq!(req.custom_prompt.as_deref(), Some("Be brief."));
    }

    #[test]
    fn completion_request_optional_fields() {
        let req: CompletionRequest = serde_json::from_str(r#"{"message":"hi"}"#).unwrap();
        assert!(req.messages.is_empty());
        assert!(req.custom_prompt.is_none());
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("customPrompt").is_none());
    }

    #[test]
    fn completion_request_requires_message() {
        assert!(serde_json::from_str::<CompletionRequest>(r#"{"messages":[]}"#).is_err());
    }

    #[test]
    fn image_response_is_camel_case() {
        let json = serde_json::to_value(ImageResponse {
            image_url: "https://x/y.png".to_string(),
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({ "imageUrl": "https://x/y.png" }));
    }
}
