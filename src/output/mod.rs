//! Result reporting
//!
//! One line per direction per configuration, blank line between
//! configurations; the format mirrors the configuration fields so result
//! logs are self-describing.

use crate::config::BenchConfig;
use crate::engine::Direction;
use crate::workload::InvokeResult;

/// Render one result line
pub fn format_result(direction: Direction, config: &BenchConfig, result: &InvokeResult) -> String {
    format!(
        "{}: operationsCount - {}, ioSegmentLen - {}, syncIOThreadCount - {}, asyncIOThreadCount - {}. Runtime in MS: sync: {}, async: {}",
        direction,
        config.operations,
        config.segment_len,
        config.sync_threads,
        config.async_threads,
        result.sync_elapsed.as_millis(),
        result.async_elapsed.as_millis(),
    )
}

/// Print one result line to stdout
pub fn print_result(direction: Direction, config: &BenchConfig, result: &InvokeResult) {
    println!("{}", format_result(direction, config, result));
    if !result.sync_failed_ops.is_empty() {
        eprintln!(
            "note: {} synchronous operations failed and were tolerated",
            result.sync_failed_ops.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_result_line_format() {
        let config = BenchConfig::new(50_000, 10_000, 10, 1);
        let result = InvokeResult {
            sync_elapsed: Duration::from_millis(1234),
            async_elapsed: Duration::from_millis(567),
            sync_failed_ops: Vec::new(),
        };

        assert_eq!(
            format_result(Direction::Write, &config, &result),
            "WRITE: operationsCount - 50000, ioSegmentLen - 10000, syncIOThreadCount - 10, \
             asyncIOThreadCount - 1. Runtime in MS: sync: 1234, async: 567"
        );
        assert!(format_result(Direction::Read, &config, &result).starts_with("READ:"));
    }
}
