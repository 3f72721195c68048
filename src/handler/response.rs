//! Uniform response shaping.
//!
//! Every invocation ends in exactly one [`HandlerResponse`]: 200 with a
//! message and a payload on success, 500 with a message and an `error`
//! detail on any failure.

use serde::{Deserialize, Serialize, Serializer};

use super::error::HandlerError;

pub const STATUS_OK: u16 = 200;
pub const STATUS_ERROR: u16 = 500;

pub const TRANSCRIPTION_COMPLETED: &str = "Transcription job completed successfully.";
pub const TRANSCRIPTION_STARTED: &str = "Transcription job started successfully.";

/// Structured response body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcription: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Response envelope handed back to the host.
///
/// Serializes as `{"statusCode": .., "body": "<json>"}`: the body is a
/// JSON-encoded string, which is what proxy-style hosts expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerResponse {
    pub status_code: u16,
    #[serde(serialize_with = "body_as_json_string")]
    pub body: ResponseBody,
}

impl HandlerResponse {
    pub fn is_success(&self) -> bool {
        self.status_code == STATUS_OK
    }
}

fn body_as_json_string<S: Serializer>(body: &ResponseBody, serializer: S) -> Result<S::Ok, S::Error> {
    let encoded = serde_json::to_string(body).map_err(serde::ser::Error::custom)?;
    serializer.serialize_str(&encoded)
}

/// 200 response carrying a transcript.
pub fn success_response(message: impl Into<String>, transcription: impl Into<String>) -> HandlerResponse {
    HandlerResponse {
        status_code: STATUS_OK,
        body: ResponseBody {
            message: message.into(),
            transcription: Some(transcription.into()),
            ..ResponseBody::default()
        },
    }
}

/// 200 response acknowledging a started job.
pub fn started_response(job_name: impl Into<String>, job_status: impl Into<String>) -> HandlerResponse {
    HandlerResponse {
        status_code: STATUS_OK,
        body: ResponseBody {
            message: TRANSCRIPTION_STARTED.to_string(),
            job_name: Some(job_name.into()),
            job_status: Some(job_status.into()),
            ..ResponseBody::default()
        },
    }
}

/// 500 response; `error` is empty when no detail is available.
pub fn error_response(message: impl Into<String>, error: Option<String>) -> HandlerResponse {
    HandlerResponse {
        status_code: STATUS_ERROR,
        body: ResponseBody {
            message: message.into(),
            error: Some(error.unwrap_or_default()),
            ..ResponseBody::default()
        },
    }
}

impl From<&HandlerError> for HandlerResponse {
    fn from(err: &HandlerError) -> Self {
        error_response(err.message(), Some(err.detail()))
    }
}
