//! Segment buffers and the per-instance buffer pool
//!
//! Each operation index owns one fixed-capacity [`SegmentBuffer`] with an
//! internal cursor, allocated up front and reused across the sync and
//! callback phases of a workload instance. Write buffers are content-frozen
//! at build time (filler bytes followed by a line terminator); read buffers
//! hold whatever the latest read produced. `reset_all` rewinds every cursor
//! without reallocating, and must run before each phase because the first
//! phase leaves every cursor at end-of-buffer.

use crate::engine::Direction;

/// Filler byte for write-direction buffer content
pub const FILLER: u8 = b'-';

/// Line terminator appended to each write segment
#[cfg(windows)]
pub const LINE_TERMINATOR: &[u8] = b"\r\n";
#[cfg(not(windows))]
pub const LINE_TERMINATOR: &[u8] = b"\n";

/// Fixed-capacity byte buffer with a transfer cursor
///
/// The cursor marks how far the buffer has been consumed (write direction)
/// or filled (read direction). Positional IO always transfers the span from
/// the cursor to capacity; a completed operation leaves the cursor at
/// end-of-buffer.
#[derive(Debug)]
pub struct SegmentBuffer {
    data: Box<[u8]>,
    pos: usize,
}

impl SegmentBuffer {
    /// Content-frozen write buffer: `segment_len` filler bytes plus the
    /// line terminator
    fn frozen(segment_len: usize) -> Self {
        let mut data = vec![FILLER; segment_len];
        data.extend_from_slice(LINE_TERMINATOR);
        Self {
            data: data.into_boxed_slice(),
            pos: 0,
        }
    }

    /// Read buffer of capacity `segment_len + 1`, content undefined until a
    /// read lands
    fn uninit(segment_len: usize) -> Self {
        Self {
            data: vec![0u8; segment_len + 1].into_boxed_slice(),
            pos: 0,
        }
    }

    /// Total capacity in bytes
    #[inline]
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Current cursor position
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes between the cursor and capacity
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Rewind the cursor to the buffer start, leaving content untouched
    #[inline]
    pub fn reset(&mut self) {
        self.pos = 0;
    }

    /// Advance the cursor by `n` transferred bytes
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds the remaining span.
    #[inline]
    pub(crate) fn advance(&mut self, n: usize) {
        assert!(n <= self.remaining(), "cursor advanced past capacity");
        self.pos += n;
    }

    /// Unconsumed content from the cursor to capacity (write source)
    #[inline]
    pub(crate) fn unread(&self) -> &[u8] {
        &self.data[self.pos..]
    }

    /// Unfilled span from the cursor to capacity (read destination)
    #[inline]
    pub(crate) fn unfilled(&mut self) -> &mut [u8] {
        &mut self.data[self.pos..]
    }

    /// Full buffer content regardless of cursor
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

/// Pool of one segment buffer per operation index
///
/// Built once per workload instance and shared in place by both engine
/// phases, which run strictly sequentially.
#[derive(Debug)]
pub struct SegmentPool {
    buffers: Vec<SegmentBuffer>,
}

impl SegmentPool {
    /// Allocate all buffers for `operations` indices up front
    ///
    /// Write-direction buffers are frozen at `segment_len + terminator`
    /// capacity; read-direction buffers are `segment_len + 1`. The two
    /// formulas are kept distinct deliberately - the offset layouts they
    /// induce in the backing file are part of the benchmark's behavior.
    pub fn build(direction: Direction, operations: usize, segment_len: usize) -> Self {
        let buffers = (0..operations)
            .map(|_| match direction {
                Direction::Write => SegmentBuffer::frozen(segment_len),
                Direction::Read => SegmentBuffer::uninit(segment_len),
            })
            .collect();
        Self { buffers }
    }

    /// Rewind every buffer's cursor to its start
    pub fn reset_all(&mut self) {
        for buf in &mut self.buffers {
            buf.reset();
        }
    }

    /// Number of buffers in the pool
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    /// True if the pool holds no buffers
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    /// Borrow a buffer by operation index
    pub fn get(&self, index: usize) -> &SegmentBuffer {
        &self.buffers[index]
    }

    /// Mutably borrow a buffer by operation index
    pub fn get_mut(&mut self, index: usize) -> &mut SegmentBuffer {
        &mut self.buffers[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_pool_capacity_and_content() {
        let pool = SegmentPool::build(Direction::Write, 4, 16);
        assert_eq!(pool.len(), 4);

        for i in 0..4 {
            let buf = pool.get(i);
            assert_eq!(buf.capacity(), 16 + LINE_TERMINATOR.len());
            assert_eq!(&buf.as_slice()[..16], &[FILLER; 16]);
            assert_eq!(&buf.as_slice()[16..], LINE_TERMINATOR);
        }
    }

    #[test]
    fn test_write_content_deterministic_across_builds() {
        let a = SegmentPool::build(Direction::Write, 2, 32);
        let b = SegmentPool::build(Direction::Write, 2, 32);
        assert_eq!(a.get(0).as_slice(), b.get(0).as_slice());
        assert_eq!(a.get(1).as_slice(), b.get(1).as_slice());
    }

    #[test]
    fn test_read_pool_capacity() {
        let pool = SegmentPool::build(Direction::Read, 3, 16);
        for i in 0..3 {
            assert_eq!(pool.get(i).capacity(), 17);
        }
    }

    #[test]
    fn test_reset_all_rewinds_cursors() {
        let mut pool = SegmentPool::build(Direction::Write, 3, 8);
        let caps: Vec<usize> = (0..3).map(|i| pool.get(i).capacity()).collect();

        for i in 0..3 {
            let buf = pool.get_mut(i);
            let remaining = buf.remaining();
            buf.advance(remaining);
            assert_eq!(buf.remaining(), 0);
        }

        pool.reset_all();
        for i in 0..3 {
            let buf = pool.get(i);
            assert_eq!(buf.position(), 0);
            assert_eq!(buf.capacity(), caps[i]);
        }
    }

    #[test]
    fn test_cursor_advance() {
        let mut pool = SegmentPool::build(Direction::Read, 1, 8);
        let buf = pool.get_mut(0);
        assert_eq!(buf.remaining(), 9);

        buf.advance(4);
        assert_eq!(buf.position(), 4);
        assert_eq!(buf.unfilled().len(), 5);

        buf.reset();
        assert_eq!(buf.remaining(), 9);
    }

    #[test]
    #[should_panic(expected = "cursor advanced past capacity")]
    fn test_cursor_overrun_panics() {
        let mut pool = SegmentPool::build(Direction::Read, 1, 8);
        pool.get_mut(0).advance(10);
    }
}
