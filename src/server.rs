//! HTTP host for the handlers.
//!
//! Delivers each HTTP request to a handler as one invocation and turns the
//! handler response back into HTTP: `statusCode` becomes the status line and
//! the structured body is returned as JSON.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;

use crate::handler::{
    HandlerError, HandlerResponse, InvocationEvent, StartJobHandler, TranscribeHandler,
    ValidationError,
};

/// Handlers shared by all requests.
#[derive(Clone)]
pub struct AppState {
    pub transcribe: TranscribeHandler,
    pub start: StartJobHandler,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/transcriptions", post(transcribe_handler))
        .route("/transcription-jobs", post(start_job_handler))
        .with_state(state)
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "healthy" }))
}

async fn transcribe_handler(State(state): State<AppState>, body: Bytes) -> Response {
    let event = if body.is_empty() {
        InvocationEvent::default()
    } else {
        match std::str::from_utf8(&body) {
            Ok(raw) => InvocationEvent::from_raw_body(raw),
            Err(e) => {
                let err = HandlerError::Validation(ValidationError::MalformedBody(e.to_string()));
                tracing::warn!("Rejected request: {err}");
                return into_http(HandlerResponse::from(&err));
            }
        }
    };
    into_http(state.transcribe.handle(event).await)
}

async fn start_job_handler(State(state): State<AppState>) -> Response {
    into_http(state.start.handle().await)
}

fn into_http(response: HandlerResponse) -> Response {
    let status =
        StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(response.body)).into_response()
}

/// Serves until Ctrl-C or SIGTERM.
///
/// # Errors
/// - If the address cannot be bound
/// - If the server fails while running
pub async fn serve(state: AppState, bind: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind {bind}: {e}"))?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{ResponseBody, StartJobSettings, TranscribeSettings};
    use crate::transcription::{
        FetchError, JobSnapshot, JobStatus, StartJobRequest, TranscriptFetcher,
        TranscriptionService,
    };
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use std::sync::Arc;
    use tower::ServiceExt;

    struct CompletingService;

    #[async_trait]
    impl TranscriptionService for CompletingService {
        async fn start_job(&self, request: &StartJobRequest) -> anyhow::Result<JobSnapshot> {
            Ok(JobSnapshot::new(&request.job_name, JobStatus::InProgress))
        }

        async fn get_job(&self, job_name: &str) -> anyhow::Result<JobSnapshot> {
            let mut snapshot = JobSnapshot::new(job_name, JobStatus::Completed);
            snapshot.transcript_uri = Some("https://x/out.json".to_string());
            Ok(snapshot)
        }
    }

    struct RecordingService {
        submitted: Arc<std::sync::atomic::AtomicBool>,
    }

    #[async_trait]
    impl TranscriptionService for RecordingService {
        async fn start_job(&self, request: &StartJobRequest) -> anyhow::Result<JobSnapshot> {
            self.submitted.store(true, std::sync::atomic::Ordering::SeqCst);
            Ok(JobSnapshot::new(&request.job_name, JobStatus::InProgress))
        }

        async fn get_job(&self, job_name: &str) -> anyhow::Result<JobSnapshot> {
            Ok(JobSnapshot::new(job_name, JobStatus::Failed))
        }
    }

    struct StaticFetcher;

    #[async_trait]
    impl TranscriptFetcher for StaticFetcher {
        async fn fetch(&self, _uri: &str) -> Result<String, FetchError> {
            Ok("hello world".to_string())
        }
    }

    fn app() -> Router {
        let service: Arc<dyn TranscriptionService> = Arc::new(CompletingService);
        let settings = TranscribeSettings {
            poll: crate::transcription::PollPolicy {
                initial_delay: std::time::Duration::from_millis(1),
                max_delay: std::time::Duration::from_millis(1),
                ..Default::default()
            },
            ..TranscribeSettings::default()
        };
        create_router(AppState {
            transcribe: TranscribeHandler::new(service.clone(), Arc::new(StaticFetcher), settings),
            start: StartJobHandler::new(service, StartJobSettings::default()),
        })
    }

    async fn read_body(response: Response) -> ResponseBody {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_transcription_success_maps_to_200() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/transcriptions")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"audioFileUrl":"s3://bucket/a.mp3"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = read_body(response).await;
        assert_eq!(body.message, "Transcription job completed successfully.");
        assert_eq!(body.transcription.as_deref(), Some("hello world"));
    }

    #[tokio::test]
    async fn test_empty_body_maps_to_500() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/transcriptions")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = read_body(response).await;
        assert_eq!(body.message, "Request body is missing.");
        assert_eq!(body.error.as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_invalid_utf8_body_is_rejected_before_submission() {
        let submitted = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let service: Arc<dyn TranscriptionService> = Arc::new(RecordingService {
            submitted: submitted.clone(),
        });
        let router = create_router(AppState {
            transcribe: TranscribeHandler::new(
                service.clone(),
                Arc::new(StaticFetcher),
                TranscribeSettings::default(),
            ),
            start: StartJobHandler::new(service, StartJobSettings::default()),
        });

        let mut raw = br#"{"audioFileUrl":"s3://bucket/a"#.to_vec();
        raw.push(0xff);
        raw.extend_from_slice(br#".mp3"}"#);

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/transcriptions")
                    .body(Body::from(raw))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = read_body(response).await;
        assert_eq!(body.message, "Invalid JSON format in request body.");
        assert!(!body.error.unwrap_or_default().is_empty());
        assert!(!submitted.load(std::sync::atomic::Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_unconfigured_start_job_maps_to_500() {
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/transcription-jobs")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = read_body(response).await;
        assert_eq!(body.message, "Transcription start job is not configured.");
    }
}
