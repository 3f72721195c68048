//! Start a transcription job for the configured audio without waiting for it.

use crate::handler::{HandlerResponse, StartJobHandler};

/// Handles the `start` command and prints the response envelope.
///
/// # Errors
/// - If the response cannot be serialized
pub async fn handle_start(handler: &StartJobHandler) -> Result<HandlerResponse, anyhow::Error> {
    let response = handler.handle().await;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(response)
}
