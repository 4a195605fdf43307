// src/store/retry.rs

use std::{future::Future, time::Duration};

use crate::{config::Config, error::AppError};

/// How many times a storage call may be attempted and how long each attempt
/// may take.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub attempt_timeout: Duration,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            attempt_timeout: Duration::from_secs(3),
            backoff: Duration::from_millis(100),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            attempts: config.db_retry_attempts.max(1),
            attempt_timeout: config.db_timeout,
            ..Self::default()
        }
    }
}

/// Connectivity problems worth another attempt. Anything the database
/// actively rejected (constraint, syntax, decode) is returned immediately.
pub fn is_transient(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::WorkerCrashed
    )
}

/// Runs `op` until it succeeds, fails permanently, or runs out of attempts.
///
/// Each attempt is bounded by `policy.attempt_timeout`; a timed-out attempt
/// counts as transient. Dropping the returned future cancels the in-flight
/// attempt.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    operation: &'static str,
    mut op: F,
) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, sqlx::Error>>,
{
    let mut attempt = 0;
    loop {
        attempt += 1;

        let failure = match tokio::time::timeout(policy.attempt_timeout, op()).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(err)) if is_transient(&err) => err.to_string(),
            Ok(Err(err)) => {
                tracing::error!("{} failed: {:?}", operation, err);
                return Err(err.into());
            }
            Err(_) => format!("timed out after {:?}", policy.attempt_timeout),
        };

        if attempt >= policy.attempts {
            tracing::error!(
                "{} failed after {} attempts: {}",
                operation,
                attempt,
                failure
            );
            return Err(AppError::Storage(format!(
                "{} failed after {} attempts: {}",
                operation, attempt, failure
            )));
        }

        tracing::warn!(
            "{} failed, retrying... (Attempt {}): {}",
            operation,
            attempt,
            failure
        );
        tokio::time::sleep(policy.backoff * attempt).await;
    }
}
