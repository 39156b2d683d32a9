//! Completion-callback engine
//!
//! Executes the access plan through a [`CallbackChannel`]: submissions return
//! immediately and a completion callback fires on one of the channel's
//! dedicated worker threads once the positional transfer finishes. The
//! submitting thread counts completions on a latch and blocks with **no
//! timeout** until all of them land - the deliberate counterpart to the sync
//! engine's bounded drain wait.
//!
//! # Failure policy
//!
//! A failed completion poisons the latch and surfaces as an error from the
//! blocked caller. Unlike the sync pool, one bad operation fails the whole
//! run; the asymmetry between the two engines is part of the benchmark's
//! contract.

use super::{build_units, execute, open_for, Direction, IoUnit};
use crate::buffer::SegmentPool;
use crate::plan::AccessPlan;
use crate::util::latch::CompletionLatch;
use crate::Result;
use anyhow::Context;
use crossbeam::channel;
use std::fs::File;
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// One queued request: a unit of work plus its completion callback
struct Request {
    unit: IoUnit,
    complete: Box<dyn FnOnce(Result<usize>) + Send>,
}

/// Completion-based channel over one file, backed by a dedicated worker pool
///
/// `submit` enqueues and returns immediately; the callback runs on a worker
/// thread with the transfer result. The channel owns the file handle for its
/// whole lifetime, so worker-held descriptors stay valid until shutdown.
pub struct CallbackChannel {
    tx: Option<channel::Sender<Request>>,
    workers: Vec<JoinHandle<()>>,
    _file: File,
}

impl CallbackChannel {
    /// Open `path` for `direction` and spin up `threads` workers
    pub fn open(path: &Path, direction: Direction, threads: usize) -> Result<Self> {
        let file = open_for(direction, path)?;
        let fd = file.as_raw_fd();
        let (tx, rx) = channel::unbounded::<Request>();

        let workers = (0..threads)
            .map(|_| {
                let rx = rx.clone();
                thread::spawn(move || {
                    for req in rx.iter() {
                        // SAFETY: the plan is a permutation, so this worker
                        // is the sole referent of the buffer; the engine
                        // shuts the channel down (joining us) before the
                        // pool borrow ends.
                        let buf = unsafe { &mut *req.unit.buffer };
                        let result = execute(direction, fd, buf, req.unit.offset);
                        (req.complete)(result);
                    }
                })
            })
            .collect();

        Ok(Self {
            tx: Some(tx),
            workers,
            _file: file,
        })
    }

    /// Queue one unit; `complete` fires on a worker thread with the result
    pub fn submit<F>(&self, unit: IoUnit, complete: F)
    where
        F: FnOnce(Result<usize>) + Send + 'static,
    {
        if let Some(tx) = &self.tx {
            // A send can only fail if every worker died; the caller's latch
            // then reports the missing completions.
            let _ = tx.send(Request {
                unit,
                complete: Box::new(complete),
            });
        }
    }

    /// Close the submission side and join all workers
    pub fn shutdown(mut self) {
        self.close();
    }

    fn close(&mut self) {
        self.tx.take();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

impl Drop for CallbackChannel {
    fn drop(&mut self) {
        self.close();
    }
}

/// Engine issuing the plan through a completion-callback channel
pub struct CallbackEngine {
    threads: usize,
}

impl CallbackEngine {
    /// Create an engine whose channel is backed by `threads` workers
    pub fn new(threads: usize) -> Self {
        Self { threads }
    }

    /// Run the full plan against `path` and measure submission-to-last-completion time
    ///
    /// Resets the pool cursors, opens a fresh channel, then submits one
    /// request per plan entry with a callback that counts down a shared
    /// latch. The caller blocks on the latch unboundedly; the stop timestamp
    /// is taken the instant the wait releases, before the channel is shut
    /// down.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel cannot be opened, or if any
    /// completion reports a failure - a single failed operation is fatal to
    /// the run.
    pub fn run(
        &self,
        direction: Direction,
        path: &Path,
        pool: &mut SegmentPool,
        plan: &AccessPlan,
    ) -> Result<Duration> {
        pool.reset_all();

        let channel = CallbackChannel::open(path, direction, self.threads)?;
        let units = build_units(plan, pool);
        let latch = Arc::new(CompletionLatch::new(units.len()));

        let start = Instant::now();
        for unit in units {
            let latch = latch.clone();
            channel.submit(unit, move |result| match result {
                Ok(_) => latch.count_down(),
                Err(err) => latch.fail(err),
            });
        }

        let waited = latch.wait();
        let elapsed = start.elapsed();

        // Pool shutdown does not gate the measured duration, but it must
        // finish before the pool borrow ends.
        channel.shutdown();

        waited.context("completion callback reported a failed operation")?;
        Ok(elapsed)
    }
}
