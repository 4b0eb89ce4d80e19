use std::time::Duration;

/// Sleeps for roughly `timeout_ms` milliseconds.
///
/// Zero, negative, NaN and infinite timeouts complete immediately instead of failing.
/// Finite timeouts too large for a [`Duration`] sleep for as long as the timer allows.
pub async fn sleep_ms(timeout_ms: f64) {
    if !timeout_ms.is_finite() || timeout_ms <= 0.0 {
        return;
    }
    let duration = Duration::try_from_secs_f64(timeout_ms / 1000.0).unwrap_or(Duration::MAX);
    tokio::time::sleep(duration).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_invalid_timeouts_resolve_immediately() {
        for value in [0.0, -5.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            timeout(Duration::from_millis(50), sleep_ms(value))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_oversized_timeouts_sleep_without_panicking() {
        for value in [f64::MAX, 1e300, 1e25] {
            let outcome = timeout(Duration::from_millis(20), sleep_ms(value)).await;
            assert!(outcome.is_err(), "{value} ms must still be sleeping");
        }
    }

    #[tokio::test]
    async fn test_sleeps_for_requested_duration() {
        let started = Instant::now();
        sleep_ms(30.0).await;
        assert!(started.elapsed() >= Duration::from_millis(30));
    }
}
