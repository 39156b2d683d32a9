//! Countdown latch for completion tracking
//!
//! Both engines signal per-operation completion by counting down a shared
//! latch; the submitting thread blocks until the count reaches zero. The
//! latch can also be poisoned by a failed completion, which releases the
//! waiter with the recorded error - this is how a callback-thread failure
//! reaches the caller blocked on the unbounded wait.

use crate::Result;
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

struct LatchState {
    remaining: usize,
    failure: Option<anyhow::Error>,
}

/// Thread-safe countdown latch with an optional failure channel
///
/// Up to one count_down per expected completion may race from worker
/// threads; the mutex-guarded count keeps the decrements atomic.
pub struct CompletionLatch {
    state: Mutex<LatchState>,
    drained: Condvar,
}

impl CompletionLatch {
    /// Create a latch expecting `count` completions
    pub fn new(count: usize) -> Self {
        Self {
            state: Mutex::new(LatchState {
                remaining: count,
                failure: None,
            }),
            drained: Condvar::new(),
        }
    }

    /// Record one completion; releases waiters when the count reaches zero
    pub fn count_down(&self) {
        let mut state = self.state.lock().unwrap();
        state.remaining = state.remaining.saturating_sub(1);
        if state.remaining == 0 {
            self.drained.notify_all();
        }
    }

    /// Poison the latch with a failure, releasing all waiters
    ///
    /// The first recorded failure wins; later ones are logged and dropped.
    pub fn fail(&self, err: anyhow::Error) {
        let mut state = self.state.lock().unwrap();
        if state.failure.is_none() {
            state.failure = Some(err);
        } else {
            eprintln!("additional completion failure after latch poisoned: {:#}", err);
        }
        self.drained.notify_all();
    }

    /// Completions still outstanding
    pub fn remaining(&self) -> usize {
        self.state.lock().unwrap().remaining
    }

    /// Block until the count reaches zero, with no timeout
    ///
    /// # Errors
    ///
    /// Returns the poisoning error if any completion failed.
    pub fn wait(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        while state.remaining > 0 && state.failure.is_none() {
            state = self.drained.wait(state).unwrap();
        }
        match state.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Block until the count reaches zero or `timeout` elapses
    ///
    /// Returns `Ok(true)` if the latch drained, `Ok(false)` on timeout.
    ///
    /// # Errors
    ///
    /// Returns the poisoning error if any completion failed.
    pub fn wait_timeout(&self, timeout: Duration) -> Result<bool> {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock().unwrap();
        while state.remaining > 0 && state.failure.is_none() {
            let now = Instant::now();
            if now >= deadline {
                return Ok(false);
            }
            let (next, _) = self.drained.wait_timeout(state, deadline - now).unwrap();
            state = next;
        }
        match state.failure.take() {
            Some(err) => Err(err),
            None => Ok(true),
        }
    }
}

impl Default for CompletionLatch {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_latch_drains_to_zero() {
        let latch = CompletionLatch::new(3);
        latch.count_down();
        latch.count_down();
        assert_eq!(latch.remaining(), 1);
        latch.count_down();
        assert!(latch.wait().is_ok());
    }

    #[test]
    fn test_zero_count_wait_returns_immediately() {
        let latch = CompletionLatch::new(0);
        assert!(latch.wait().is_ok());
        assert!(latch.wait_timeout(Duration::from_millis(1)).unwrap());
    }

    #[test]
    fn test_wait_timeout_reports_undrained_latch() {
        let latch = CompletionLatch::new(1);
        let drained = latch.wait_timeout(Duration::from_millis(10)).unwrap();
        assert!(!drained);
        assert_eq!(latch.remaining(), 1);
    }

    #[test]
    fn test_concurrent_count_down_releases_waiter() {
        let latch = Arc::new(CompletionLatch::new(8));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let latch = latch.clone();
            handles.push(thread::spawn(move || {
                thread::sleep(Duration::from_millis(5));
                latch.count_down();
            }));
        }

        assert!(latch.wait().is_ok());
        assert_eq!(latch.remaining(), 0);
        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn test_failure_releases_waiter_with_error() {
        let latch = Arc::new(CompletionLatch::new(2));
        let poisoner = latch.clone();
        let handle = thread::spawn(move || {
            poisoner.fail(anyhow!("disk on fire"));
        });

        let err = latch.wait().unwrap_err();
        assert!(err.to_string().contains("disk on fire"));
        handle.join().unwrap();
    }

    #[test]
    fn test_first_failure_wins() {
        let latch = CompletionLatch::new(2);
        latch.fail(anyhow!("first"));
        latch.fail(anyhow!("second"));
        let err = latch.wait().unwrap_err();
        assert_eq!(err.to_string(), "first");
    }
}
