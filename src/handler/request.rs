//! Inbound invocation payloads and their validation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ValidationError;

/// An invocation as delivered by the host.
///
/// Proxy-style hosts deliver `body` as a JSON-encoded string; others hand
/// over the already parsed document. Both are accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvocationEvent {
    #[serde(default)]
    pub body: Option<Value>,
}

impl InvocationEvent {
    /// Wraps a raw request body as received over HTTP. An empty body counts as missing.
    pub fn from_raw_body(body: &str) -> Self {
        Self {
            body: Some(Value::String(body.to_string())),
        }
    }

    pub fn from_json(body: Value) -> Self {
        Self { body: Some(body) }
    }
}

/// Validated input of the transcribe handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscribeRequest {
    pub audio_file_url: String,
}

/// Extracts the audio URI from an invocation.
///
/// # Errors
/// - [`ValidationError::MissingBody`] if the body is absent, null or empty
/// - [`ValidationError::MalformedBody`] if a string body is not valid JSON
/// - [`ValidationError::MissingAudioUrl`] if `audioFileUrl` is absent, empty or not a string
pub fn parse_transcribe_request(event: &InvocationEvent) -> Result<TranscribeRequest, ValidationError> {
    let parsed;
    let document = match &event.body {
        None | Some(Value::Null) => return Err(ValidationError::MissingBody),
        Some(Value::String(raw)) if raw.trim().is_empty() => {
            return Err(ValidationError::MissingBody)
        }
        Some(Value::String(raw)) => {
            parsed = serde_json::from_str::<Value>(raw)
                .map_err(|e| ValidationError::MalformedBody(e.to_string()))?;
            &parsed
        }
        Some(structured) => structured,
    };

    match document.get("audioFileUrl").and_then(Value::as_str) {
        Some(url) if !url.trim().is_empty() => Ok(TranscribeRequest {
            audio_file_url: url.trim().to_string(),
        }),
        _ => Err(ValidationError::MissingAudioUrl),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_string_body_is_parsed() {
        let event = InvocationEvent::from_raw_body(r#"{"audioFileUrl":"s3://bucket/a.mp3"}"#);
        let request = parse_transcribe_request(&event).unwrap();
        assert_eq!(request.audio_file_url, "s3://bucket/a.mp3");
    }

    #[test]
    fn test_structured_body_is_accepted() {
        let event = InvocationEvent::from_json(json!({"audioFileUrl": "s3://bucket/b.wav"}));
        let request = parse_transcribe_request(&event).unwrap();
        assert_eq!(request.audio_file_url, "s3://bucket/b.wav");
    }

    #[test]
    fn test_missing_body() {
        assert_eq!(
            parse_transcribe_request(&InvocationEvent::default()),
            Err(ValidationError::MissingBody)
        );
        assert_eq!(
            parse_transcribe_request(&InvocationEvent::from_json(Value::Null)),
            Err(ValidationError::MissingBody)
        );
        assert_eq!(
            parse_transcribe_request(&InvocationEvent::from_raw_body("")),
            Err(ValidationError::MissingBody)
        );
    }

    #[test]
    fn test_malformed_body() {
        let err = parse_transcribe_request(&InvocationEvent::from_raw_body("{audioFileUrl:")).unwrap_err();
        assert!(matches!(err, ValidationError::MalformedBody(_)));
    }

    #[test]
    fn test_missing_or_empty_field() {
        for body in [
            json!({}),
            json!({"audioFileUrl": ""}),
            json!({"audioFileUrl": "   "}),
            json!({"audioFileUrl": 42}),
            json!({"audio_file_url": "s3://bucket/a.mp3"}),
            json!(["s3://bucket/a.mp3"]),
        ] {
            assert_eq!(
                parse_transcribe_request(&InvocationEvent::from_json(body.clone())),
                Err(ValidationError::MissingAudioUrl),
                "body {body}"
            );
        }
        assert_eq!(
            parse_transcribe_request(&InvocationEvent::from_raw_body("42")),
            Err(ValidationError::MissingAudioUrl)
        );
    }

    #[test]
    fn test_event_deserializes_from_host_payload() {
        let event: InvocationEvent = serde_json::from_str(
            r#"{"body":"{\"audioFileUrl\":\"s3://bucket/a.mp3\"}","headers":{}}"#,
        )
        .unwrap();
        assert!(parse_transcribe_request(&event).is_ok());

        let event: InvocationEvent = serde_json::from_str("{}").unwrap();
        assert_eq!(event.body, None);
    }
}
