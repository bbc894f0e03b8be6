//! Bounded polling
//!
//! A condition is checked immediately, then re-checked with growing pauses
//! (100ms, 250ms, 500ms, then every second) until it holds or the timeout
//! elapses. Expiry is always an [`E2eError::Timeout`]; errors raised by the
//! probe itself abort the wait at once.

use std::fmt::Debug;
use std::future::Future;
use std::time::{Duration, Instant};

use tokio::time::sleep;

use crate::error::{E2eError, E2eResult};

const POLL_INTERVALS_MS: [u64; 4] = [100, 250, 500, 1000];

fn poll_delay(attempt: usize) -> Duration {
    let ms = POLL_INTERVALS_MS
        .get(attempt)
        .or(POLL_INTERVALS_MS.last())
        .copied()
        .unwrap_or(1000);
    Duration::from_millis(ms)
}

/// Probe until `accept` holds for the observed value, returning that value
pub async fn poll_value<T, F, Fut, A>(
    what: &str,
    timeout: Duration,
    mut probe: F,
    accept: A,
) -> E2eResult<T>
where
    T: Debug,
    F: FnMut() -> Fut,
    Fut: Future<Output = E2eResult<T>>,
    A: Fn(&T) -> bool,
{
    let start = Instant::now();
    let mut attempt = 0;

    loop {
        let value = probe().await?;
        if accept(&value) {
            return Ok(value);
        }

        let elapsed = start.elapsed();
        if elapsed >= timeout {
            return Err(E2eError::Timeout {
                what: format!("{} (last observed: {:?})", what, value),
                timeout_ms: timeout.as_millis() as u64,
            });
        }

        let remaining = timeout - elapsed;
        sleep(poll_delay(attempt).min(remaining)).await;
        attempt += 1;
    }
}

/// Probe until the condition returns `true`
pub async fn poll_until<F, Fut>(what: &str, timeout: Duration, probe: F) -> E2eResult<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = E2eResult<bool>>,
{
    poll_value(what, timeout, probe, |ok| *ok).await.map(|_| ())
}
