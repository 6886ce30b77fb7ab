use crate::error::{Result, WorkspaceError};
use std::future::Future;
use std::time::Duration;

/// Bounded, fixed-delay retry budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            delay: Duration::from_millis(100),
        }
    }
}

impl RetryPolicy {
    /// A zero attempt count is raised to one
    #[must_use]
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }
}

/// Run `op` until it succeeds or the budget is spent.
///
/// `op` receives the 1-based attempt number. Every failure is logged; the
/// last one is returned wrapped in [`WorkspaceError::RetryExhausted`].
pub async fn retry_async<T, F, Fut>(policy: RetryPolicy, label: &str, mut op: F) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = policy.attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    log::debug!("{label} succeeded on attempt {attempt}");
                }
                return Ok(value);
            }
            Err(err) => {
                log::warn!("{label} failed (attempt {attempt}/{attempts}): {err}");
                if attempt >= attempts {
                    return Err(WorkspaceError::RetryExhausted {
                        label: label.to_string(),
                        attempts,
                        source: Box::new(err),
                    });
                }
            }
        }
        attempt += 1;
        if !policy.delay.is_zero() {
            tokio::time::sleep(policy.delay).await;
        }
    }
}
