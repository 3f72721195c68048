//! Run one transcription invocation from an event document.
//!
//! Reads `{"body": ...}` from a file or stdin, runs the transcribe handler and
//! prints the response envelope, the way a serverless host would see it.

use anyhow::anyhow;
use std::io::Read;
use std::path::Path;

use crate::handler::{HandlerResponse, InvocationEvent, TranscribeHandler};

/// Handles the `invoke` command.
///
/// # Arguments
/// * `handler` - The transcribe handler built at startup
/// * `event_path` - Event file; `None` or `-` reads stdin
///
/// # Errors
/// - If the event cannot be read or is not a JSON object
/// - If the response cannot be serialized
pub async fn handle_invoke(
    handler: &TranscribeHandler,
    event_path: Option<&Path>,
) -> Result<HandlerResponse, anyhow::Error> {
    let raw = read_event(event_path)?;
    let event = parse_event(&raw)?;

    let response = handler.handle(event).await;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(response)
}

fn read_event(event_path: Option<&Path>) -> Result<String, anyhow::Error> {
    match event_path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read event file '{}': {e}", path.display())),
        _ => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .map_err(|e| anyhow!("Failed to read event from stdin: {e}"))?;
            Ok(raw)
        }
    }
}

/// Parses an event document. Blank input is an event without a body.
fn parse_event(raw: &str) -> Result<InvocationEvent, anyhow::Error> {
    if raw.trim().is_empty() {
        return Ok(InvocationEvent::default());
    }
    serde_json::from_str(raw).map_err(|e| anyhow!("Event is not a valid JSON object: {e}"))
}
