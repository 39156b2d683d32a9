//! Shared utilities

pub mod latch;
