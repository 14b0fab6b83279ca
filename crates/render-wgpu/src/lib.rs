//! wgpu render backend for the field viewer.
//!
//! Draws each primitive group of the render batch as a point list, with a
//! depth test and a configurable background.
//!
//! # Invariants
//! - Renderer never mutates the batch.
//! - One GPU vertex buffer per primitive group; buffers for groups that left
//!   the batch are released on the next sync.
//! - Generation tick is separate from render frame rate.

mod gpu;
mod shaders;

pub use gpu::WgpuRenderer;
