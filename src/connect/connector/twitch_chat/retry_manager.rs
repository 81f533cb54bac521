use crate::connect::error::ConnectorError;
use futures_retry::{ErrorHandler, RetryPolicy};
use std::time::Duration;

/// Doubles the wait after every failed attempt, up to `max_wait_time`.
/// Without `max_num_attempts` it never gives up.
pub struct ExponentialRetryManager {
    init_wait_time: Duration,
    max_wait_time: Duration,
    max_num_attempts: Option<usize>,
}

impl ExponentialRetryManager {
    pub fn new(
        init_wait_time: Duration,
        max_wait_time: Duration,
        max_num_attempts: Option<usize>,
    ) -> Self {
        Self {
            init_wait_time,
            max_wait_time,
            max_num_attempts,
        }
    }

    fn wait_time(&self, attempt: usize) -> Duration {
        let exponent = u32::try_from(attempt.saturating_sub(1)).unwrap_or(u32::MAX);
        let factor = 2_u32.checked_pow(exponent).unwrap_or(u32::MAX);
        self.init_wait_time
            .checked_mul(factor)
            .map_or(self.max_wait_time, |wait_time| wait_time.min(self.max_wait_time))
    }
}

impl ErrorHandler<ConnectorError> for ExponentialRetryManager {
    type OutError = ConnectorError;

    fn handle(&mut self, attempt: usize, err: ConnectorError) -> RetryPolicy<Self::OutError> {
        if matches!(self.max_num_attempts, Some(max) if attempt > max) {
            log::error!("Giving up after {} attempts: {}", attempt, err);
            RetryPolicy::ForwardError(err)
        } else {
            let wait_time = self.wait_time(attempt);
            log::warn!(
                "Attempt {} failed ({}), retrying in {:?}",
                attempt,
                err,
                wait_time
            );
            RetryPolicy::WaitRetry(wait_time)
        }
    }

    fn ok(&mut self, attempt: usize) {
        if attempt > 1 {
            log::info!("Succeeded after {} attempts", attempt);
        }
    }
}
