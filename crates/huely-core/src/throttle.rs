// ── Fetch throttling ──
//
// Front ends re-fetch on every view refresh. `FetchGate` delays each fetch
// by a short debounce and drops a new fetch while one is still in flight,
// so a burst of refreshes turns into a single round trip.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::trace;

/// Default delay before a scheduled fetch runs.
pub const FETCH_DEBOUNCE: Duration = Duration::from_millis(500);

/// Debounce plus skip-while-outstanding for a single kind of fetch.
#[derive(Debug)]
pub struct FetchGate {
    in_flight: AtomicBool,
    debounce: Duration,
}

impl Default for FetchGate {
    fn default() -> Self {
        Self::new(FETCH_DEBOUNCE)
    }
}

/// Held while a fetch is outstanding; releases the gate on drop.
struct Permit<'a>(&'a AtomicBool);

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl FetchGate {
    pub fn new(debounce: Duration) -> Self {
        Self {
            in_flight: AtomicBool::new(false),
            debounce,
        }
    }

    /// Whether a fetch is currently outstanding.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Run `fetch` after the debounce, unless another fetch is outstanding.
    ///
    /// Returns `None` when skipped.
    pub async fn run<F, Fut, T>(&self, fetch: F) -> Option<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            trace!("fetch already outstanding, skipping");
            return None;
        }
        let _permit = Permit(&self.in_flight);

        if !self.debounce.is_zero() {
            tokio::time::sleep(self.debounce).await;
        }
        Some(fetch().await)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn concurrent_fetch_is_skipped() {
        let gate = FetchGate::default();
        let calls = AtomicUsize::new(0);
        let fetch = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            7
        };

        let (first, second) = tokio::join!(gate.run(fetch), gate.run(fetch));

        assert_eq!(first, Some(7));
        assert_eq!(second, None);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(!gate.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn fetch_waits_for_debounce() {
        let gate = FetchGate::default();
        let started = tokio::time::Instant::now();

        let out = gate.run(|| async { tokio::time::Instant::now() }).await;

        let ran_at = out.expect("not skipped");
        assert!(ran_at - started >= FETCH_DEBOUNCE);
    }

    #[tokio::test(start_paused = true)]
    async fn gate_reopens_after_fetch() {
        let gate = FetchGate::new(Duration::ZERO);
        assert_eq!(gate.run(|| async { 1 }).await, Some(1));
        assert_eq!(gate.run(|| async { 2 }).await, Some(2));
    }
}
