use std::time::Duration;

use tokio::time::Instant;

/// Keeps at least `delay` between the end of one request and the start of
/// the next, however long the response took or whether it failed. The
/// first request is never delayed.
#[derive(Debug)]
pub struct RequestThrottle {
    delay: Duration,
    last_finished: Option<Instant>,
}

impl RequestThrottle {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_finished: None,
        }
    }

    /// Wait until the next request may start
    pub async fn ready(&mut self) {
        if let Some(finished) = self.last_finished {
            let next = finished + self.delay;
            if next > Instant::now() {
                tracing::debug!("Throttling for {:?}", next - Instant::now());
                tokio::time::sleep_until(next).await;
            }
        }
    }

    /// Record that the current request is over, successful or not
    pub fn finished(&mut self) {
        self.last_finished = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_request_not_delayed() {
        let mut throttle = RequestThrottle::new(Duration::from_secs(1));
        let start = Instant::now();
        throttle.ready().await;
        assert_eq!(Instant::now(), start);
    }

    #[tokio::test(start_paused = true)]
    async fn test_requests_spaced_by_delay() {
        let mut throttle = RequestThrottle::new(Duration::from_secs(1));
        let start = Instant::now();

        for _ in 0..3 {
            throttle.ready().await;
            throttle.finished();
        }
        assert!(Instant::now() - start >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_delay_after_slow_response() {
        let mut throttle = RequestThrottle::new(Duration::from_secs(1));
        throttle.ready().await;

        // response took three times the delay
        tokio::time::advance(Duration::from_secs(3)).await;
        throttle.finished();
        let response_end = Instant::now();

        throttle.ready().await;
        assert!(Instant::now() - response_end >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_partial_wait() {
        let mut throttle = RequestThrottle::new(Duration::from_millis(1000));
        throttle.ready().await;
        throttle.finished();
        tokio::time::advance(Duration::from_millis(400)).await;

        let before = Instant::now();
        throttle.ready().await;
        let waited = Instant::now() - before;
        assert!(waited >= Duration::from_millis(600));
        assert!(waited < Duration::from_millis(1000));
    }
}
