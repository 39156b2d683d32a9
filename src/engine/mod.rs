//! Dual-mode IO execution engines
//!
//! This module defines the shared plumbing for the two execution models the
//! benchmark compares:
//!
//! - [`sync::SyncPoolEngine`]: blocking pread/pwrite dispatched from a
//!   bounded worker-thread pool, drained under a hard timeout
//! - [`callback::CallbackEngine`]: the same positional operations issued
//!   through a completion-callback channel with an unbounded wait
//!
//! Both engines consume the same inputs - a file path, a segment buffer pool
//! and an access plan - and both turn each plan entry into one [`IoUnit`]: a
//! single positional transfer at `index * capacity` into or out of that
//! index's buffer. Only the dispatch-and-wait protocol differs, and with it
//! the failure policy:
//!
//! - the sync pool tolerates per-operation failures (logged and recorded,
//!   still counted toward drain) and is fatal only on drain timeout;
//! - the callback channel treats any failed completion as fatal to the run.
//!
//! The asymmetry is part of the benchmark's contract, not an oversight.

use crate::buffer::SegmentBuffer;
use crate::Result;
use anyhow::Context;
use std::fs::{File, OpenOptions};
use std::os::unix::io::RawFd;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub mod callback;
pub mod sync;

/// Transfer direction of a benchmark instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Positional reads into the segment buffers
    Read,
    /// Positional writes from the segment buffers
    Write,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Read => write!(f, "READ"),
            Direction::Write => write!(f, "WRITE"),
        }
    }
}

/// Engine-level fatal conditions
#[derive(Debug, Error)]
pub enum EngineError {
    /// The synchronous pool did not drain within the bounded wait
    #[error("submitted operations did not complete within {0:?}")]
    DrainTimeout(Duration),
}

/// One unit of work: a single positional transfer for one operation index
///
/// Units carry a raw pointer into the pool so they can cross the channel to
/// a worker thread.
///
/// # Safety
///
/// The access plan is a permutation, so each buffer is referenced by exactly
/// one unit and no two workers ever alias the same buffer. Engines keep the
/// pool borrowed for the whole run and join their workers before returning,
/// so the pointee outlives every in-flight unit.
#[derive(Debug)]
pub struct IoUnit {
    /// Operation index (also the buffer index)
    pub index: usize,

    /// Byte offset in the backing file: `index * capacity`
    pub offset: u64,

    /// The buffer owned by this unit for the duration of the transfer
    pub buffer: *mut SegmentBuffer,
}

// Safety: each unit is the sole referent of its buffer (plan permutation
// invariant) and the pool outlives the worker threads.
unsafe impl Send for IoUnit {}

/// Build one unit per plan entry, in submission order
///
/// The offset mapping uses each buffer's own capacity, so read and write
/// directions address their own layouts in the same file.
pub(crate) fn build_units(plan: &crate::plan::AccessPlan, pool: &mut crate::buffer::SegmentPool) -> Vec<IoUnit> {
    let mut units = Vec::with_capacity(plan.len());
    for index in plan.iter() {
        let buffer: *mut SegmentBuffer = pool.get_mut(index);
        let capacity = pool.get(index).capacity();
        units.push(IoUnit {
            index,
            offset: index as u64 * capacity as u64,
            buffer,
        });
    }
    units
}

/// Open the backing file for the requested direction
///
/// Read-only or write-only, never both; creation and truncation are the
/// path provider's responsibility.
pub(crate) fn open_for(direction: Direction, path: &Path) -> Result<File> {
    let open = match direction {
        Direction::Read => OpenOptions::new().read(true).open(path),
        Direction::Write => OpenOptions::new().write(true).open(path),
    };
    open.with_context(|| format!("failed to open {} for {}", path.display(), direction))
}

/// Execute one positional transfer, advancing the buffer cursor
pub(crate) fn execute(direction: Direction, fd: RawFd, buf: &mut SegmentBuffer, offset: u64) -> Result<usize> {
    match direction {
        Direction::Read => read_into(fd, buf, offset),
        Direction::Write => write_from(fd, buf, offset),
    }
}

/// pread from `offset` into the buffer's unfilled span
///
/// Partial reads are retried until the span is full; EOF ends the transfer
/// early and is not an error.
fn read_into(fd: RawFd, buf: &mut SegmentBuffer, offset: u64) -> Result<usize> {
    let mut total = 0usize;

    while buf.remaining() > 0 {
        let current_offset = offset + total as u64;
        let result = {
            let dst = buf.unfilled();
            // SAFETY: dst is a live mutable slice; pread writes at most
            // dst.len() bytes into it.
            unsafe {
                libc::pread(
                    fd,
                    dst.as_mut_ptr() as *mut libc::c_void,
                    dst.len(),
                    current_offset as i64,
                )
            }
        };

        if result < 0 {
            let err = std::io::Error::last_os_error();
            return Err(err).context(format!(
                "pread failed: fd={}, offset={}, length={}",
                fd,
                current_offset,
                buf.remaining()
            ));
        }

        if result == 0 {
            // EOF - return what we have
            break;
        }

        let bytes = result as usize;
        buf.advance(bytes);
        total += bytes;
    }

    Ok(total)
}

/// pwrite the buffer's unconsumed span to `offset`
///
/// Partial writes are retried until the full span is transferred.
fn write_from(fd: RawFd, buf: &mut SegmentBuffer, offset: u64) -> Result<usize> {
    let mut total = 0usize;

    while buf.remaining() > 0 {
        let current_offset = offset + total as u64;
        let result = {
            let src = buf.unread();
            // SAFETY: src is a live slice; pwrite reads at most src.len()
            // bytes from it.
            unsafe {
                libc::pwrite(
                    fd,
                    src.as_ptr() as *const libc::c_void,
                    src.len(),
                    current_offset as i64,
                )
            }
        };

        if result < 0 {
            let err = std::io::Error::last_os_error();
            return Err(err).context(format!(
                "pwrite failed: fd={}, offset={}, length={}",
                fd,
                current_offset,
                buf.remaining()
            ));
        }

        let bytes = result as usize;
        buf.advance(bytes);
        total += bytes;
    }

    Ok(total)
}
