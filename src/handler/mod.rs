//! Request handlers.
//!
//! Two entry points share the transcription building blocks:
//! - [`TranscribeHandler`]: submit a job for the requested audio, poll it to
//!   completion and return the transcript inline.
//! - [`StartJobHandler`]: submit a job for the configured audio and output
//!   location and return straight away.
//!
//! Both always produce a [`HandlerResponse`]. Errors and panics inside a
//! workflow are converted at this boundary.

pub mod error;
pub mod request;
pub mod response;
pub mod start;
pub mod transcribe;

use std::any::Any;
use std::future::Future;

use tokio::task::JoinHandle;

pub use error::{HandlerError, ValidationError};
pub use request::{parse_transcribe_request, InvocationEvent, TranscribeRequest};
pub use response::{error_response, started_response, success_response, HandlerResponse, ResponseBody};
pub use start::{StartJobHandler, StartJobSettings};
pub use transcribe::{TranscribeHandler, TranscribeSettings};

/// Aborts the task when the caller stops waiting for it.
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Runs a workflow on its own task so that a panic becomes
/// [`HandlerError::Unexpected`] instead of tearing down the host.
///
/// The task lives only as long as the returned future: if the caller goes
/// away (client disconnect, host timeout) polling stops at the next await.
async fn run_isolated<F, T>(workflow: F) -> Result<T, HandlerError>
where
    F: Future<Output = Result<T, HandlerError>> + Send + 'static,
    T: Send + 'static,
{
    let mut task = AbortOnDrop(tokio::spawn(workflow));
    match (&mut task.0).await {
        Ok(result) => result,
        Err(join_error) if join_error.is_panic() => Err(HandlerError::Unexpected(
            panic_message(join_error.into_panic()),
        )),
        Err(join_error) => Err(HandlerError::Unexpected(join_error.to_string())),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "handler panicked".to_string()
    }
}

/// Logs a failed invocation and formats it.
fn failure(err: HandlerError) -> HandlerResponse {
    match &err {
        HandlerError::Validation(_) => tracing::warn!("Rejected request: {err}"),
        _ => tracing::error!("Error processing transcription job: {err}"),
    }
    HandlerResponse::from(&err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_isolated_passes_results_through() {
        let ok = run_isolated(async { Ok::<_, HandlerError>(7) }).await.unwrap();
        assert_eq!(ok, 7);

        let err = run_isolated(async { Err::<u8, _>(HandlerError::Unexpected("x".to_string())) })
            .await
            .unwrap_err();
        assert!(matches!(err, HandlerError::Unexpected(detail) if detail == "x"));
    }

    #[tokio::test]
    async fn test_run_isolated_converts_panics() {
        let err = run_isolated(async {
            if true {
                panic!("result shape changed");
            }
            Ok::<u8, HandlerError>(0)
        })
        .await
        .unwrap_err();

        match err {
            HandlerError::Unexpected(detail) => assert_eq!(detail, "result shape changed"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_caller_stops_workflow() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;
        use std::time::Duration;

        let finished = Arc::new(AtomicBool::new(false));
        let flag = finished.clone();
        let workflow = run_isolated(async move {
            tokio::time::sleep(Duration::from_secs(60)).await;
            flag.store(true, Ordering::SeqCst);
            Ok::<_, HandlerError>(())
        });

        let waited = tokio::time::timeout(Duration::from_secs(1), workflow).await;
        assert!(waited.is_err());

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert!(!finished.load(Ordering::SeqCst));
    }
}
