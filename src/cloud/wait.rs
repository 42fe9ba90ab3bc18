// ABOUTME: Bounded polling helper for eventually-consistent cloud state.
// ABOUTME: Repeats a check at a fixed interval until it succeeds or time runs out.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

/// Why a poll stopped without a value.
#[derive(Debug)]
pub enum PollError<E> {
    TimedOut,
    Check(E),
}

/// Run `check` every `interval` until it yields `Some`, failing once `timeout` has elapsed.
///
/// The check runs once more at the deadline before giving up. Errors from
/// `check` abort the poll immediately.
pub async fn poll_until<T, E, F, Fut>(
    interval: Duration,
    timeout: Duration,
    mut check: F,
) -> Result<T, PollError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>, E>>,
{
    let deadline = Instant::now() + timeout;

    loop {
        if let Some(value) = check().await.map_err(PollError::Check)? {
            return Ok(value);
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(PollError::TimedOut);
        }

        tokio::time::sleep(interval.min(deadline - now)).await;
    }
}
