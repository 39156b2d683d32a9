//! Workload instances
//!
//! A workload instance binds one configuration and direction to one access
//! plan and one segment buffer pool, then sequences exactly two engine
//! invocations against the same logical file: the synchronous pool first,
//! the callback channel second. Instances are consumed by `invoke` - one
//! measurement per instance, no reuse across configurations.
//!
//! The write variant recreates the backing file before each engine phase,
//! so both phases write into a freshly truncated file at the same logical
//! name, and returns a [`PopulatedFile`] receipt. The read variant is
//! constructed from that receipt - the write-before-read ordering is a
//! compile-time dependency here, not an accident of driver loop order.

use crate::buffer::SegmentPool;
use crate::config::BenchConfig;
use crate::engine::callback::CallbackEngine;
use crate::engine::sync::{SyncOutcome, SyncPoolEngine};
use crate::engine::Direction;
use crate::plan::AccessPlan;
use crate::target::PathProvider;
use crate::Result;
use std::time::Duration;

/// Logical name of the benchmark's backing file
pub const DEFAULT_FILE: &str = "file.txt";

/// The two durations measured by one workload invocation
#[derive(Debug, Clone)]
pub struct InvokeResult {
    /// Sync pool: submission start to confirmed drain
    pub sync_elapsed: Duration,

    /// Callback channel: submission start to last completion
    pub async_elapsed: Duration,

    /// Operation indices whose synchronous IO failed (tolerated)
    pub sync_failed_ops: Vec<usize>,
}

impl InvokeResult {
    fn new(sync: SyncOutcome, async_elapsed: Duration) -> Self {
        Self {
            sync_elapsed: sync.elapsed,
            async_elapsed,
            sync_failed_ops: sync.failed_ops,
        }
    }
}

/// Receipt proving a write workload populated the backing file
///
/// Required to construct a [`ReadWorkload`]; the read direction has no
/// meaning against a file nothing has written.
#[derive(Debug, Clone)]
pub struct PopulatedFile {
    filename: String,
}

impl PopulatedFile {
    /// Logical filename the write workload populated
    pub fn filename(&self) -> &str {
        &self.filename
    }
}

/// Write-direction workload instance
pub struct WriteWorkload {
    config: BenchConfig,
    plan: AccessPlan,
    pool: SegmentPool,
}

impl WriteWorkload {
    /// Build the instance: one plan and one frozen-content pool
    pub fn new(config: BenchConfig) -> Self {
        Self {
            config,
            plan: AccessPlan::shuffled(config.operations),
            pool: SegmentPool::build(Direction::Write, config.operations, config.segment_len),
        }
    }

    /// Run both engine phases and return the timings plus the receipt
    ///
    /// Each phase gets a freshly recreated file at the same logical name;
    /// handles are never shared across phases.
    pub fn invoke(mut self, paths: &PathProvider) -> Result<(InvokeResult, PopulatedFile)> {
        let sync_path = paths.create_file(DEFAULT_FILE, false)?;
        let sync = SyncPoolEngine::new(self.config.sync_threads).run(
            Direction::Write,
            &sync_path,
            &mut self.pool,
            &self.plan,
        )?;

        let async_path = paths.create_file(DEFAULT_FILE, false)?;
        let async_elapsed = CallbackEngine::new(self.config.async_threads).run(
            Direction::Write,
            &async_path,
            &mut self.pool,
            &self.plan,
        )?;

        let receipt = PopulatedFile {
            filename: DEFAULT_FILE.to_string(),
        };
        Ok((InvokeResult::new(sync, async_elapsed), receipt))
    }
}

/// Read-direction workload instance
pub struct ReadWorkload {
    config: BenchConfig,
    filename: String,
    plan: AccessPlan,
    pool: SegmentPool,
}

impl ReadWorkload {
    /// Build the instance against a file a write workload has populated
    pub fn new(config: BenchConfig, populated: &PopulatedFile) -> Self {
        Self {
            config,
            filename: populated.filename().to_string(),
            plan: AccessPlan::shuffled(config.operations),
            pool: SegmentPool::build(Direction::Read, config.operations, config.segment_len),
        }
    }

    /// Run both engine phases against the populated path
    ///
    /// The path is obtained by lookup only; both phases read the same file
    /// through their own handles.
    pub fn invoke(mut self, paths: &PathProvider) -> Result<InvokeResult> {
        let path = paths.get_file(&self.filename);

        let sync = SyncPoolEngine::new(self.config.sync_threads).run(
            Direction::Read,
            &path,
            &mut self.pool,
            &self.plan,
        )?;

        let async_elapsed = CallbackEngine::new(self.config.async_threads).run(
            Direction::Read,
            &path,
            &mut self.pool,
            &self.plan,
        )?;

        Ok(InvokeResult::new(sync, async_elapsed))
    }
}
