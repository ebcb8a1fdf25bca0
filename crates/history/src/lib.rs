//! `history` crate — a bounded undo/redo log over immutable snapshots.
//!
//! Knows nothing about workflows: any `Clone` value can be recorded.

pub mod ring;

pub use ring::{History, DEFAULT_CAPACITY};
