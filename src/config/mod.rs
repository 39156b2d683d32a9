//! Benchmark configuration
//!
//! A [`BenchConfig`] binds the four knobs of one benchmark instance: how many
//! positional operations to issue, how long each segment is, and how many
//! worker threads back the synchronous pool and the callback channel
//! respectively. Configurations are immutable for the lifetime of a workload
//! instance.

use anyhow::bail;
use crate::Result;

/// Configuration for one benchmark instance
///
/// All fields must be strictly positive; `validate()` enforces this before a
/// workload is constructed from the configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchConfig {
    /// Number of positional IO operations per engine phase
    pub operations: usize,

    /// Payload length of each IO segment in bytes
    pub segment_len: usize,

    /// Worker threads backing the synchronous pool engine
    pub sync_threads: usize,

    /// Worker threads backing the completion-callback channel
    pub async_threads: usize,
}

impl BenchConfig {
    /// Create a new configuration
    pub fn new(operations: usize, segment_len: usize, sync_threads: usize, async_threads: usize) -> Self {
        Self {
            operations,
            segment_len,
            sync_threads,
            async_threads,
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error naming the offending field if any value is zero.
    pub fn validate(&self) -> Result<()> {
        if self.operations == 0 {
            bail!("operations must be greater than 0");
        }
        if self.segment_len == 0 {
            bail!("segment_len must be greater than 0");
        }
        if self.sync_threads == 0 {
            bail!("sync_threads must be greater than 0");
        }
        if self.async_threads == 0 {
            bail!("async_threads must be greater than 0");
        }
        Ok(())
    }
}

/// The fixed configuration grid iterated by the driver
///
/// Two operation counts swept across five synchronous pool sizes, with a
/// single-threaded callback channel throughout.
pub fn default_grid() -> Vec<BenchConfig> {
    let mut grid = Vec::new();
    for &operations in &[50_000, 150_000] {
        for sync_threads in (10..=50).step_by(10) {
            grid.push(BenchConfig::new(operations, 10_000, sync_threads, 1));
        }
    }
    grid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let config = BenchConfig::new(100, 16, 4, 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_fields_rejected() {
        assert!(BenchConfig::new(0, 16, 4, 1).validate().is_err());
        assert!(BenchConfig::new(100, 0, 4, 1).validate().is_err());
        assert!(BenchConfig::new(100, 16, 0, 1).validate().is_err());
        assert!(BenchConfig::new(100, 16, 4, 0).validate().is_err());
    }

    #[test]
    fn test_default_grid() {
        let grid = default_grid();
        assert_eq!(grid.len(), 10);
        assert!(grid.iter().all(|c| c.validate().is_ok()));
        assert!(grid.iter().all(|c| c.segment_len == 10_000 && c.async_threads == 1));

        // Sync pool sizes sweep 10..=50 for each operation count
        let sync_counts: Vec<usize> = grid.iter().take(5).map(|c| c.sync_threads).collect();
        assert_eq!(sync_counts, vec![10, 20, 30, 40, 50]);
        assert_eq!(grid[0].operations, 50_000);
        assert_eq!(grid[5].operations, 150_000);
    }
}
