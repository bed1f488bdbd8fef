//! Request pacing for retailer fetches.
//!
//! The collector fetches one retailer at a time. Before each fetch it
//! waits until at least `1 / requests_per_second` has passed since the
//! previous request *finished*.

use anyhow::{bail, Result};
use std::time::{Duration, Instant};

/// Interval implied by a request rate.
pub fn min_interval(requests_per_second: f64) -> Result<Duration> {
    if !(requests_per_second.is_finite() && requests_per_second > 0.0) {
        bail!("requests_per_second must be > 0, got {}", requests_per_second);
    }
    match Duration::try_from_secs_f64(1.0 / requests_per_second) {
        Ok(interval) => Ok(interval),
        Err(_) => bail!("requests_per_second {} is too small", requests_per_second),
    }
}

#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_finished: Option<Instant>,
}

impl RateLimiter {
    /// Fails unless `1 / requests_per_second` is a representable interval.
    pub fn new(requests_per_second: f64) -> Result<Self> {
        Ok(Self {
            min_interval: min_interval(requests_per_second)?,
            last_finished: None,
        })
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// How long a request starting at `now` still has to wait.
    pub fn delay_at(&self, now: Instant) -> Duration {
        match self.last_finished {
            Some(last) => self
                .min_interval
                .saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        }
    }

    /// Sleep until the next request is allowed.
    pub async fn wait(&self) {
        let delay = self.delay_at(Instant::now());
        if !delay.is_zero() {
            tracing::debug!(delay_ms = delay.as_millis() as u64, "rate limit");
            tokio::time::sleep(delay).await;
        }
    }

    /// Record that a request just completed.
    pub fn finish(&mut self) {
        self.finish_at(Instant::now());
    }

    pub fn finish_at(&mut self, at: Instant) {
        self.last_finished = Some(at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_request_is_not_delayed() {
        let limiter = RateLimiter::new(0.5).unwrap();
        assert_eq!(limiter.delay_at(Instant::now()), Duration::ZERO);
        assert_eq!(limiter.min_interval(), Duration::from_secs(2));
    }

    #[test]
    fn delay_is_measured_from_end_of_previous_request() {
        let mut limiter = RateLimiter::new(0.5).unwrap();
        let finished = Instant::now();
        limiter.finish_at(finished);

        assert_eq!(limiter.delay_at(finished), Duration::from_secs(2));
        assert_eq!(
            limiter.delay_at(finished + Duration::from_millis(500)),
            Duration::from_millis(1500)
        );
        assert_eq!(
            limiter.delay_at(finished + Duration::from_secs(5)),
            Duration::ZERO
        );
    }

    #[test]
    fn unrepresentable_rates_are_rejected() {
        assert!(RateLimiter::new(1e-310).is_err());
        assert!(RateLimiter::new(0.0).is_err());
        assert!(RateLimiter::new(f64::NAN).is_err());
        assert_eq!(min_interval(4.0).unwrap(), Duration::from_millis(250));
    }

    #[tokio::test]
    async fn wait_returns_quickly_for_fast_rates() {
        let mut limiter = RateLimiter::new(1000.0).unwrap();
        limiter.finish();
        let start = Instant::now();
        limiter.wait().await;
        assert!(start.elapsed() < Duration::from_millis(500));
    }
}
