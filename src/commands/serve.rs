//! Run the HTTP host.

use crate::config::RelayConfig;
use crate::server::{self, AppState};

/// Serves both handlers until a shutdown signal arrives.
///
/// # Errors
/// - If the configured address cannot be bound
pub async fn handle_serve(state: AppState, config: &RelayConfig) -> Result<(), anyhow::Error> {
    tracing::info!("=== transcribe-relay server ===");
    if config.start_job.media_uri.is_none() || config.start_job.output_bucket.is_none() {
        tracing::warn!("Start job target not configured; /transcription-jobs will return errors");
    }
    server::serve(state, &config.server.bind).await
}
