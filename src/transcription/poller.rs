//! Job status polling with adaptive backoff.
//!
//! Polls a submitted job until the service reports a terminal status or the
//! attempt budget runs out. The wait before each query starts at
//! `initial_delay` and is multiplied by `backoff_factor` after every attempt,
//! capped at `max_delay`. The delay never shrinks within one poll.

use std::time::Duration;

use super::job::{JobSnapshot, JobStatus};
use super::service::TranscriptionService;

/// Maximum number of status queries per job.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 20;

/// Wait before the first status query.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(1000);

/// Upper bound for the wait between queries.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(5000);

/// Growth applied to the wait after every attempt.
pub const DEFAULT_BACKOFF_FACTOR: f64 = 1.25;

/// How a job is polled.
#[derive(Debug, Clone, PartialEq)]
pub struct PollPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub backoff_factor: f64,
    /// Also wait `delay` while each status query is in flight, so an attempt
    /// costs roughly two delays. Off by default.
    pub settle_wait: bool,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            initial_delay: DEFAULT_INITIAL_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            backoff_factor: DEFAULT_BACKOFF_FACTOR,
            settle_wait: false,
        }
    }
}

impl PollPolicy {
    /// Delay schedule for one poll, starting from `initial_delay`.
    pub fn backoff(&self) -> Backoff {
        Backoff {
            current: self.initial_delay.min(self.max_delay),
            max: self.max_delay,
            factor: self.backoff_factor,
        }
    }
}

/// Geometric delay schedule, capped. Never ends.
#[derive(Debug, Clone)]
pub struct Backoff {
    current: Duration,
    max: Duration,
    factor: f64,
}

impl Backoff {
    /// Returns the current delay and grows it for the next call.
    pub fn advance(&mut self) -> Duration {
        let delay = self.current;
        // Saturate at the cap; `mul_f64` panics when the product overflows.
        self.current = Duration::try_from_secs_f64(self.current.as_secs_f64() * self.factor)
            .map_or(self.max, |next| next.min(self.max));
        delay
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        Some(self.advance())
    }
}

/// Terminal state reached by a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The job completed; the snapshot carries the transcript URI.
    Completed(JobSnapshot),
    /// The service gave up on the job; the snapshot carries the reason.
    Failed(JobSnapshot),
    /// The attempt budget ran out while the job was still running.
    TimedOut { attempts: u32, last_status: JobStatus },
}

/// Polls `job_name` until it completes, fails, or `policy.max_attempts` queries
/// have been made.
///
/// Statuses other than `COMPLETED` and `FAILED` (queued, in progress, or values
/// the service adds later) keep the loop going.
///
/// # Errors
/// - If a status query fails. Queries are not retried.
pub async fn poll_until_terminal(
    service: &dyn TranscriptionService,
    job_name: &str,
    policy: &PollPolicy,
) -> anyhow::Result<PollOutcome> {
    let mut backoff = policy.backoff();
    let mut last_status = JobStatus::InProgress;

    for attempt in 1..=policy.max_attempts {
        let delay = backoff.advance();
        tokio::time::sleep(delay).await;

        let snapshot = if policy.settle_wait {
            let (snapshot, _) = tokio::join!(service.get_job(job_name), tokio::time::sleep(delay));
            snapshot?
        } else {
            service.get_job(job_name).await?
        };

        tracing::debug!(
            "Poll attempt {}/{}: status={}, job={}",
            attempt,
            policy.max_attempts,
            snapshot.status,
            job_name
        );

        match snapshot.status {
            JobStatus::Completed => return Ok(PollOutcome::Completed(snapshot)),
            JobStatus::Failed => return Ok(PollOutcome::Failed(snapshot)),
            _ => last_status = snapshot.status,
        }
    }

    Ok(PollOutcome::TimedOut {
        attempts: policy.max_attempts,
        last_status,
    })
}
