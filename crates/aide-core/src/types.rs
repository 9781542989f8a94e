//! Request and response bodies for `/chat/completions`.
//!
//! OpenAI and Groq share this format. Queries are always single-turn, so
//! only user messages are ever built; a vision query carries its image as a
//! second content part.

use serde::{Deserialize, Serialize};

/// One message of a completion request.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: MessageContent::Text(text.into()),
        }
    }

    /// A user message made of several parts, e.g. a prompt and an image.
    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Self {
            role: "user",
            content: MessageContent::Parts(parts),
        }
    }
}

/// Plain string, or an array of typed parts.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageRef },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        ContentPart::Text { text: text.into() }
    }

    /// Image part; `url` may be an `https://` URL or a `data:` URL.
    pub fn image_url(url: impl Into<String>) -> Self {
        ContentPart::ImageUrl {
            image_url: ImageRef { url: url.into() },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ImageRef {
    pub url: String,
}

/// Request body. Unset sampling fields are left for the server to default.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
}

/// Response body; fields we never read are ignored.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

impl ChatCompletionResponse {
    /// Text content of the first choice, if any.
    pub fn first_text(self) -> Option<String> {
        self.choices.into_iter().next()?.message.content
    }
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_text_is_a_plain_string() {
        let value = serde_json::to_value(ChatMessage::user("hello there")).unwrap();
        assert_eq!(value, json!({"role": "user", "content": "hello there"}));
    }

    #[test]
    fn vision_message_has_text_and_image_parts() {
        let message = ChatMessage::user_parts(vec![
            ContentPart::text("What's in this image?"),
            ContentPart::image_url("data:image/jpeg;base64,/9j/AA=="),
        ]);
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({
                "role": "user",
                "content": [
                    {"type": "text", "text": "What's in this image?"},
                    {"type": "image_url", "image_url": {"url": "data:image/jpeg;base64,/9j/AA=="}}
                ]
            })
        );
    }

    #[test]
    fn request_carries_sampling_params() {
        let request = ChatCompletionRequest {
            model: "gpt-3.5-turbo".into(),
            messages: vec![ChatMessage::user("hi")],
            max_tokens: Some(600),
            temperature: Some(0.2),
            top_p: Some(0.999),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["max_tokens"], 600);
        assert_eq!(value["temperature"], 0.2);
        assert_eq!(value["top_p"], 0.999);
    }

    #[test]
    fn unset_params_are_omitted() {
        let request = ChatCompletionRequest {
            model: "llava".into(),
            messages: vec![ChatMessage::user("hi")],
            max_tokens: None,
            temperature: None,
            top_p: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert!(object.contains_key("model"));
        assert!(object.contains_key("messages"));
    }

    #[test]
    fn first_choice_wins() {
        let response: ChatCompletionResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "first"}},
                {"index": 1, "message": {"role": "assistant", "content": "second"}}
            ],
            "usage": {"prompt_tokens": 3, "completion_tokens": 1, "total_tokens": 4}
        }))
        .unwrap();
        assert_eq!(response.usage.unwrap().total_tokens, 4);
        assert_eq!(response.first_text().as_deref(), Some("first"));
    }

    #[test]
    fn missing_or_null_content_yields_none() {
        let empty: ChatCompletionResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(empty.first_text().is_none());

        let null: ChatCompletionResponse =
            serde_json::from_value(json!({"choices": [{"message": {"content": null}}]})).unwrap();
        assert!(null.first_text().is_none());
    }
}
