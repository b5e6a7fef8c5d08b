//! Wall-clock timing for resolution attempts

use std::future::Future;
use std::time::{Duration, Instant};

/// Outcome of a timed execution.
#[derive(Debug)]
pub struct Timed<T, E> {
    /// What the future produced.
    pub outcome: Result<T, E>,
    /// How long the future took to complete.
    pub elapsed: Duration,
}

impl<T, E> Timed<T, E> {
    /// Whether the underlying execution succeeded.
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// Elapsed time in seconds.
    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

/// Await a future and record how long it took.
///
/// Intended for wrapping `resolve` calls when callers want attempt timing
/// next to the outcome:
///
/// ```ignore
/// let timed = with_timing(resolver.resolve(&mut task)).await;
/// ```
pub async fn with_timing<T, E, F>(future: F) -> Timed<T, E>
where
    F: Future<Output = Result<T, E>>,
{
    let started = Instant::now();
    let outcome = future.await;
    Timed {
        outcome,
        elapsed: started.elapsed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opswell_core::TaskFault;

    #[tokio::test]
    async fn test_with_timing_success() {
        let timed = with_timing(async { Ok::<_, TaskFault>(5) }).await;
        assert!(timed.is_success());
        assert_eq!(timed.outcome.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_with_timing_failure_keeps_error() {
        let timed = with_timing(async {
            Err::<u32, _>(TaskFault::transient_msg("down"))
        })
        .await;
        assert!(!timed.is_success());
        assert_eq!(timed.outcome.unwrap_err().to_string(), "down");
    }

    #[tokio::test]
    async fn test_with_timing_measures_elapsed() {
        let timed = with_timing(async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok::<_, TaskFault>(())
        })
        .await;
        assert!(timed.elapsed >= Duration::from_millis(20));
        assert!(timed.elapsed_seconds() >= 0.02);
    }
}
