//! Synchronous pool engine
//!
//! Executes the full access plan as blocking positional IO dispatched over a
//! crossbeam channel to a bounded pool of OS worker threads. The submitting
//! thread records the start timestamp immediately before submission, closes
//! the channel once everything is queued, and takes the stop timestamp only
//! after a countdown latch confirms the pool has drained.
//!
//! # Failure policy
//!
//! Fire and forget per operation: a unit whose pread/pwrite fails is logged,
//! its index recorded in the outcome, and it still counts toward drain. The
//! only fatal condition is the drain wait exceeding its bound (10 minutes by
//! default), which yields no measurement at all.

use super::{build_units, execute, open_for, Direction, EngineError, IoUnit};
use crate::buffer::SegmentPool;
use crate::plan::AccessPlan;
use crate::util::latch::CompletionLatch;
use crate::Result;
use crossbeam::channel;
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Upper bound on the pool drain wait
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Result of one synchronous pool run
#[derive(Debug)]
pub struct SyncOutcome {
    /// Wall-clock time from submission start to confirmed drain
    pub elapsed: Duration,

    /// Indices of operations whose IO failed (tolerated, not fatal)
    pub failed_ops: Vec<usize>,
}

/// Bounded worker-thread pool executing blocking positional IO
pub struct SyncPoolEngine {
    threads: usize,
    drain_timeout: Duration,
    /// Artificial per-unit stall, used to exercise the drain timeout
    op_stall: Option<Duration>,
}

impl SyncPoolEngine {
    /// Create an engine backed by `threads` workers with the default
    /// 10-minute drain bound
    pub fn new(threads: usize) -> Self {
        Self {
            threads,
            drain_timeout: DRAIN_TIMEOUT,
            op_stall: None,
        }
    }

    /// Override the drain bound
    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    #[cfg(test)]
    pub(crate) fn with_op_stall(mut self, stall: Duration) -> Self {
        self.op_stall = Some(stall);
        self
    }

    /// Run the full plan against `path` and measure submission-to-drain time
    ///
    /// Resets the pool cursors, opens the file for `direction` only, then
    /// dispatches one unit per plan entry to the workers. Per-unit failures
    /// are tolerated; see the module docs.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, or
    /// [`EngineError::DrainTimeout`] if the pool does not drain within the
    /// bound - in that case no valid measurement exists.
    pub fn run(
        &self,
        direction: Direction,
        path: &Path,
        pool: &mut SegmentPool,
        plan: &AccessPlan,
    ) -> Result<SyncOutcome> {
        pool.reset_all();

        let file = open_for(direction, path)?;
        let fd = file.as_raw_fd();
        let units = build_units(plan, pool);

        let latch = Arc::new(CompletionLatch::new(units.len()));
        let failed = Arc::new(Mutex::new(Vec::new()));
        let (tx, rx) = channel::unbounded::<IoUnit>();

        let mut workers = Vec::with_capacity(self.threads);
        for _ in 0..self.threads {
            let rx = rx.clone();
            let latch = latch.clone();
            let failed = failed.clone();
            let op_stall = self.op_stall;
            workers.push(thread::spawn(move || {
                for unit in rx.iter() {
                    if let Some(stall) = op_stall {
                        thread::sleep(stall);
                    }
                    // SAFETY: the plan is a permutation, so this worker is
                    // the sole referent of the buffer, and the pool outlives
                    // the run (workers are joined before it returns).
                    let buf = unsafe { &mut *unit.buffer };
                    if let Err(err) = execute(direction, fd, buf, unit.offset) {
                        eprintln!("operation {} failed: {:#}", unit.index, err);
                        failed.lock().unwrap().push(unit.index);
                    }
                    latch.count_down();
                }
            }));
        }
        drop(rx);

        let start = Instant::now();
        for unit in units {
            // A send can only fail if a worker died; the unit then never
            // completes and the drain timeout reports it.
            let _ = tx.send(unit);
        }
        // Initiate pool shutdown; workers exit once the queue drains.
        drop(tx);

        let drained = latch.wait_timeout(self.drain_timeout)?;
        let elapsed = start.elapsed();

        for worker in workers {
            let _ = worker.join();
        }

        if !drained {
            return Err(EngineError::DrainTimeout(self.drain_timeout).into());
        }

        let mut failed_ops = Arc::try_unwrap(failed)
            .expect("workers joined, no other holders")
            .into_inner()
            .unwrap();
        failed_ops.sort_unstable();

        Ok(SyncOutcome { elapsed, failed_ops })
    }
}
