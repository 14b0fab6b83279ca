//! Streaming: pulls a bounded number of samples from a point source each tick
//! and appends them to a persistent render batch.
//!
//! # Invariants
//! - The batcher is the only writer of its [`RenderBatch`].
//! - Exhaustion is silent: a drained source makes `step` a no-op until replaced.
//! - A step that pulls nothing appends nothing.

mod batch;
mod batcher;

pub use batch::{PrimitiveGroup, RenderBatch};
pub use batcher::{BatchConfig, BatchStats, PointBatcher};
